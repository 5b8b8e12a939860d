//! The minimal retained-layer model the sequencing engine runs against.
//!
//! A [`ShapeLayer`] holds paint state (path, opacity, scale, stroke width, colors, shadow) plus
//! a table of active tween jobs. The host drives it by calling
//! [`LayerHandle::advance`] once per frame; the layer interpolates every active job, then
//! returns the batch of [`JobEvent`]s produced during that frame. Completion events are the
//! *only* upward signal in the system — the sequence state machine consumes them and nothing
//! else.
//!
//! Everything here is single-threaded by design: handles are `Rc<RefCell<…>>` clones, and all
//! mutation happens on the thread that owns the host's frame loop.

use crate::geometry::{Bounds, Path};
use crate::tween::Tween;
use palette::Srgba;
use std::cell::RefCell;
use std::rc::Rc;

/// Identity of one attached job, unique within its layer for the layer's lifetime.
///
/// Ids are monotonically increasing and never reused, so a stale completion event from an
/// interrupted run can always be told apart from the current job's.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct JobId(u64);

/// A completion notification for one attached job. Exactly one event is delivered per job:
/// `finished` is true for natural completion and false when the job was interrupted (removed
/// before reaching its duration).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct JobEvent {
    pub id: JobId,
    pub finished: bool,
}

/// Drop shadow paint parameters. Carried for renderers; the engine itself never animates them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub color: Srgba,
    pub radius: f32,
    pub opacity: f32,
    pub offset: (f32, f32),
}

impl Shadow {
    /// The soft black shadow the effect layers use.
    pub fn soft_black(radius: f32) -> Self {
        Self {
            color: Srgba::new(0.0, 0.0, 0.0, 1.0),
            radius,
            opacity: 0.4,
            offset: (0.0, 0.0),
        }
    }
}

struct ActiveJob {
    id: JobId,
    duration: f32,
    elapsed: f32,
    tweens: Vec<Tween>,
}

/// A drawable shape layer: retained paint state plus the active job table.
pub struct ShapeLayer {
    pub bounds: Bounds,
    pub path: Option<Path>,
    pub opacity: f32,
    pub scale: f32,
    pub line_width: f32,
    pub fill_color: Option<Srgba>,
    pub stroke_color: Option<Srgba>,
    pub shadow: Option<Shadow>,
    jobs: Vec<ActiveJob>,
    interrupted: Vec<JobId>,
    next_job: u64,
}

impl ShapeLayer {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            path: None,
            opacity: 1.0,
            scale: 1.0,
            line_width: 1.0,
            fill_color: None,
            stroke_color: None,
            shadow: None,
            jobs: Vec::new(),
            interrupted: Vec::new(),
            next_job: 0,
        }
    }

    fn add_job(&mut self, tweens: Vec<Tween>, duration: f32) -> JobId {
        let id = JobId(self.next_job);
        self.next_job += 1;
        self.jobs.push(ActiveJob {
            id,
            duration,
            elapsed: 0.0,
            tweens,
        });
        id
    }

    fn remove_all_jobs(&mut self) {
        self.interrupted.extend(self.jobs.drain(..).map(|job| job.id));
    }

    fn advance(&mut self, elapsed_seconds: f32) -> Vec<JobEvent> {
        let mut events: Vec<JobEvent> = self
            .interrupted
            .drain(..)
            .map(|id| JobEvent { id, finished: false })
            .collect();

        // The jobs are taken out for the duration of the pass so the tweens can write through
        // &mut self without aliasing the table.
        let mut jobs = std::mem::take(&mut self.jobs);
        jobs.retain_mut(|job| {
            job.elapsed += elapsed_seconds;
            for tween in &job.tweens {
                let progress = if tween.duration() > 0.0 {
                    job.elapsed / tween.duration()
                } else {
                    1.0
                };
                tween.apply(self, progress);
            }
            if job.elapsed >= job.duration {
                events.push(JobEvent {
                    id: job.id,
                    finished: true,
                });
                false
            } else {
                true
            }
        });
        self.jobs = jobs;
        events
    }
}

/// Cheap cloneable handle to a [`ShapeLayer`].
#[derive(Clone)]
pub struct LayerHandle {
    inner: Rc<RefCell<ShapeLayer>>,
}

impl LayerHandle {
    pub fn new(layer: ShapeLayer) -> Self {
        Self {
            inner: Rc::new(RefCell::new(layer)),
        }
    }

    /// Registers a merged set of tweens as one job with a single aggregate completion after
    /// `duration` seconds. Multiple jobs may coexist on one layer.
    pub fn add_job(&self, tweens: Vec<Tween>, duration: f32) -> JobId {
        self.inner.borrow_mut().add_job(tweens, duration)
    }

    /// Interrupts every active job. Each interrupted job reports `finished: false` from the
    /// next [`advance`](Self::advance) call, mirroring how a removed platform animation still
    /// delivers its (unsuccessful) completion notification.
    pub fn remove_all_jobs(&self) {
        self.inner.borrow_mut().remove_all_jobs();
    }

    /// Advances every active job by `elapsed_seconds`, writing interpolated property values
    /// into the layer, and returns the completion events produced this frame.
    ///
    /// The borrow is released before returning, so event consumers are free to mutate the
    /// layer (attach follow-up jobs, swap paths) from their callbacks.
    pub fn advance(&self, elapsed_seconds: f32) -> Vec<JobEvent> {
        self.inner.borrow_mut().advance(elapsed_seconds)
    }

    pub fn active_jobs(&self) -> usize {
        self.inner.borrow().jobs.len()
    }

    pub fn bounds(&self) -> Bounds {
        self.inner.borrow().bounds
    }

    pub fn opacity(&self) -> f32 {
        self.inner.borrow().opacity
    }

    pub fn set_opacity(&self, opacity: f32) {
        self.inner.borrow_mut().opacity = opacity;
    }

    pub fn scale(&self) -> f32 {
        self.inner.borrow().scale
    }

    pub fn set_scale(&self, scale: f32) {
        self.inner.borrow_mut().scale = scale;
    }

    pub fn line_width(&self) -> f32 {
        self.inner.borrow().line_width
    }

    pub fn set_line_width(&self, line_width: f32) {
        self.inner.borrow_mut().line_width = line_width;
    }

    pub fn path(&self) -> Option<Path> {
        self.inner.borrow().path.clone()
    }

    pub fn set_path(&self, path: Option<Path>) {
        self.inner.borrow_mut().path = path;
    }

    pub fn fill_color(&self) -> Option<Srgba> {
        self.inner.borrow().fill_color
    }

    pub fn set_fill_color(&self, color: Option<Srgba>) {
        self.inner.borrow_mut().fill_color = color;
    }

    pub fn stroke_color(&self) -> Option<Srgba> {
        self.inner.borrow().stroke_color
    }

    pub fn set_stroke_color(&self, color: Option<Srgba>) {
        self.inner.borrow_mut().stroke_color = color;
    }

    pub fn shadow(&self) -> Option<Shadow> {
        self.inner.borrow().shadow
    }

    pub fn set_shadow(&self, shadow: Option<Shadow>) {
        self.inner.borrow_mut().shadow = shadow;
    }

    /// Whether two handles refer to the same layer.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// A host surface: a bounds rectangle and a list of attached child layers.
///
/// This is the thinnest possible stand-in for a real view/layer host — just enough for the
/// effect's "must be attached before running" precondition and idempotent layer attachment.
pub struct Surface {
    bounds: Bounds,
    layers: Vec<LayerHandle>,
}

/// Cheap cloneable handle to a [`Surface`].
#[derive(Clone)]
pub struct SurfaceHandle {
    inner: Rc<RefCell<Surface>>,
}

impl SurfaceHandle {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Surface {
                bounds,
                layers: Vec::new(),
            })),
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.inner.borrow().bounds
    }

    /// Attaches `layer` as a child. Attaching an already-attached layer is a no-op.
    pub fn add_layer(&self, layer: &LayerHandle) {
        let mut surface = self.inner.borrow_mut();
        if !surface.layers.iter().any(|existing| existing.ptr_eq(layer)) {
            surface.layers.push(layer.clone());
        }
    }

    pub fn contains(&self, layer: &LayerHandle) -> bool {
        self.inner.borrow().layers.iter().any(|existing| existing.ptr_eq(layer))
    }

    pub fn layer_count(&self) -> usize {
        self.inner.borrow().layers.len()
    }
}
