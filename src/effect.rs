//! The like-button effect: configuration, validation, and the three-phase orchestration built
//! on [`Sequence`]s.
//!
//! [`LikeEffect::run`] validates the configuration, notifies the observer, and starts three
//! independent sequences (circle rings, heart, particles) on three retained layers, each a
//! hand-tuned decomposition of the total duration. The host then pumps
//! [`LikeEffect::advance`] once per frame; completions flow from the layers into the sequence
//! state machines, and the end signal eventually fires [`LikeEffectObserver::effect_did_end`]
//! exactly once.

use crate::geometry::{self, Bounds};
use crate::layer::{LayerHandle, Shadow, ShapeLayer, SurfaceHandle};
use crate::sequence::{Sequence, SequenceState, Step};
use crate::tween::Tween;
use enum_map::{Enum, EnumMap};
use palette::Srgba;
use std::rc::{Rc, Weak};
use thiserror::Error;
use tracing::warn;

/// Documented bounds for every configurable field. `run()` refuses configurations outside
/// them. The zero lower bounds (circles, small particles) are structural: the counters are
/// unsigned.
pub mod limits {
    pub const DURATION_MIN: f32 = 0.5;
    pub const DURATION_MAX: f32 = 3.0;
    pub const CIRCLES_MAX: u32 = 3;
    pub const MAIN_PARTICLES_MIN: u32 = 3;
    pub const MAIN_PARTICLES_MAX: u32 = 13;
    pub const SMALL_PARTICLES_MAX: u32 = 13;
}

/// The three independent visual tracks composing the effect. Each phase owns one layer and,
/// while a run is in flight, one sequence; there is no cross-phase ordering beyond what the
/// shared duration fractions imply.
#[derive(Clone, Copy, Debug, Enum, Eq, PartialEq)]
pub enum Phase {
    Circles,
    Heart,
    Particles,
}

/// Particle counts: `main` spokes on equal angles, and `small` secondary particles spread
/// through each gap between two spokes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ParticleCounts {
    pub main: u32,
    pub small: u32,
}

impl Default for ParticleCounts {
    fn default() -> Self {
        Self { main: 6, small: 7 }
    }
}

/// Heart fill colors: `initial` before the collapse midway through the phase, `animated` for
/// the regrown heart afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeartColors {
    pub initial: Srgba,
    pub animated: Srgba,
}

impl Default for HeartColors {
    fn default() -> Self {
        let white = Srgba::new(1.0, 1.0, 1.0, 1.0);
        Self {
            initial: white,
            animated: white,
        }
    }
}

/// How the effect decides that it has ended.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum EndSignal {
    /// Fires unconditionally `2 × duration` after the run starts. The three phases finish well
    /// inside that window, so this is an upper bound rather than a join; it is the documented
    /// default behavior.
    #[default]
    FixedDelay,
    /// Fires as soon as all three sequences report completion — a strict join for hosts that
    /// want the exact end instead of the estimate.
    SequenceBarrier,
}

/// A rejected `run()`. The configuration is left untouched and nothing is attached or
/// notified.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EffectError {
    #[error("effect must be attached to a surface before it can run")]
    Detached,
    #[error(
        "duration {0}s is outside the supported {min}s..={max}s range",
        min = limits::DURATION_MIN,
        max = limits::DURATION_MAX
    )]
    DurationOutOfRange(f32),
    #[error("circles counter {0} exceeds the maximum of {max}", max = limits::CIRCLES_MAX)]
    CirclesOutOfRange(u32),
    #[error(
        "main particles counter {0} is outside {min}..={max}",
        min = limits::MAIN_PARTICLES_MIN,
        max = limits::MAIN_PARTICLES_MAX
    )]
    MainParticlesOutOfRange(u32),
    #[error(
        "small particles counter {0} exceeds the maximum of {max}",
        max = limits::SMALL_PARTICLES_MAX
    )]
    SmallParticlesOutOfRange(u32),
}

/// Receives the effect's two lifecycle notifications.
///
/// The effect holds the observer weakly: it never keeps the observer alive, and an observer
/// that has already been dropped when a notification is due simply misses it.
pub trait LikeEffectObserver {
    /// Fired synchronously from `run()` once the configuration checks pass, before any layer
    /// paint mutation is observable.
    fn effect_will_begin(&self, effect: &LikeEffect);

    /// Fired once per run, when the configured [`EndSignal`] triggers.
    fn effect_did_end(&self, effect: &LikeEffect);
}

struct ActiveRun {
    sequences: EnumMap<Phase, Sequence>,
    remaining: f32,
}

/// The like-button animation effect.
///
/// Configuration fields are plain and mutable; they are read once per [`run`](Self::run), and
/// mutating them during an in-flight run has no effect on it.
pub struct LikeEffect {
    /// Total wall-clock duration of one run, in seconds. See [`limits`].
    pub duration: f32,
    /// Number of concentric rings in the circle phase.
    pub circles: u32,
    pub particles: ParticleCounts,
    pub heart_colors: HeartColors,
    /// Fill for the particles layer and stroke for the circle rings.
    pub particles_color: Srgba,
    pub end_signal: EndSignal,
    bounds: Bounds,
    host: Option<SurfaceHandle>,
    layers: Option<EnumMap<Phase, LayerHandle>>,
    observer: Option<Weak<dyn LikeEffectObserver>>,
    active: Option<ActiveRun>,
}

impl LikeEffect {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            duration: 1.5,
            circles: 1,
            particles: ParticleCounts::default(),
            heart_colors: HeartColors::default(),
            particles_color: Srgba::new(1.0, 1.0, 1.0, 1.0),
            end_signal: EndSignal::default(),
            bounds,
            host: None,
            layers: None,
            observer: None,
            active: None,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Attaches the effect to its host surface. Required before [`run`](Self::run); checked
    /// there, not enforced structurally.
    pub fn attach_to(&mut self, surface: &SurfaceHandle) {
        self.host = Some(surface.clone());
    }

    pub fn is_attached(&self) -> bool {
        self.host.is_some()
    }

    /// Registers the observer. Only a weak reference is kept.
    pub fn set_observer<O: LikeEffectObserver + 'static>(&mut self, observer: &Rc<O>) {
        let observer: Rc<dyn LikeEffectObserver> = observer.clone();
        let weak: Weak<dyn LikeEffectObserver> = Rc::downgrade(&observer);
        self.observer = Some(weak);
    }

    /// Whether a run is in flight, i.e. the end signal has not fired yet.
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// The phase's layer, once layers have been created (first successful `run()`).
    pub fn layer(&self, phase: Phase) -> Option<LayerHandle> {
        self.layers.as_ref().map(|layers| layers[phase].clone())
    }

    /// The phase's sequence state for the in-flight run, if any.
    pub fn sequence_state(&self, phase: Phase) -> Option<SequenceState> {
        self.active.as_ref().map(|run| run.sequences[phase].state())
    }

    /// Starts the effect.
    ///
    /// On success: layers are attached to the host (idempotent), the observer is notified that
    /// the effect is beginning, and the three phase sequences start. On failure nothing is
    /// attached, mutated or notified — the error names the violated precondition.
    ///
    /// A run that is still in flight is interrupted and replaced; its leftover jobs report
    /// unsuccessful completions that no longer match any live sequence.
    pub fn run(&mut self) -> Result<(), EffectError> {
        let host = self.check_properties().map_err(|error| {
            warn!(%error, "refusing to run like effect");
            error
        })?;

        let layers = self.ensure_layers();
        for layer in layers.values() {
            host.add_layer(layer);
        }

        self.notify_will_begin();

        for (phase, layer) in &layers {
            layer.remove_all_jobs();
            self.apply_base_style(layer, phase);
        }

        layers[Phase::Circles].set_path(Some(geometry::circle_path(
            self.bounds,
            self.bounds.height / 2.0,
            self.circles,
        )));
        layers[Phase::Heart].set_path(Some(geometry::heart_path(self.bounds)));

        let mut sequences = EnumMap::from_fn(|phase| self.phase_sequence(phase, &layers[phase]));
        for (phase, sequence) in sequences.iter_mut() {
            sequence.run_on(&layers[phase]);
        }
        self.active = Some(ActiveRun {
            sequences,
            remaining: self.duration * 2.0,
        });
        Ok(())
    }

    /// Advances the in-flight run by `elapsed_seconds`: ticks every layer, routes the resulting
    /// completion events into the phase sequences, and fires the end signal when due.
    ///
    /// A no-op when nothing is running.
    pub fn advance(&mut self, elapsed_seconds: f32) {
        let Some(layers) = self.layers.as_ref() else {
            return;
        };
        let Some(run) = self.active.as_mut() else {
            return;
        };
        for (phase, sequence) in run.sequences.iter_mut() {
            for event in layers[phase].advance(elapsed_seconds) {
                sequence.job_finished(event.id, event.finished);
            }
        }
        let ended = match self.end_signal {
            EndSignal::FixedDelay => {
                run.remaining -= elapsed_seconds;
                run.remaining <= 0.0
            }
            EndSignal::SequenceBarrier => run.sequences.values().all(Sequence::is_completed),
        };
        if ended {
            self.active = None;
            self.notify_did_end();
        }
    }

    fn check_properties(&self) -> Result<SurfaceHandle, EffectError> {
        let Some(host) = self.host.clone() else {
            return Err(EffectError::Detached);
        };
        if self.circles > limits::CIRCLES_MAX {
            return Err(EffectError::CirclesOutOfRange(self.circles));
        }
        if !(limits::MAIN_PARTICLES_MIN..=limits::MAIN_PARTICLES_MAX)
            .contains(&self.particles.main)
        {
            return Err(EffectError::MainParticlesOutOfRange(self.particles.main));
        }
        if self.particles.small > limits::SMALL_PARTICLES_MAX {
            return Err(EffectError::SmallParticlesOutOfRange(self.particles.small));
        }
        if !(limits::DURATION_MIN..=limits::DURATION_MAX).contains(&self.duration) {
            return Err(EffectError::DurationOutOfRange(self.duration));
        }
        Ok(host)
    }

    fn ensure_layers(&mut self) -> EnumMap<Phase, LayerHandle> {
        if let Some(layers) = &self.layers {
            return layers.clone();
        }
        let bounds = self.bounds;
        let layers = EnumMap::from_fn(|phase| {
            let layer = LayerHandle::new(ShapeLayer::new(bounds));
            self.apply_base_style(&layer, phase);
            layer
        });
        self.layers = Some(layers.clone());
        layers
    }

    fn apply_base_style(&self, layer: &LayerHandle, phase: Phase) {
        layer.set_opacity(1.0);
        layer.set_scale(1.0);
        layer.set_path(None);
        match phase {
            Phase::Circles => {
                layer.set_fill_color(None);
                layer.set_stroke_color(Some(self.particles_color));
                layer.set_line_width(0.5);
                layer.set_shadow(Some(Shadow::soft_black(3.0)));
            }
            Phase::Heart => {
                layer.set_fill_color(Some(self.heart_colors.initial));
                layer.set_stroke_color(None);
                layer.set_shadow(Some(Shadow::soft_black(7.0)));
            }
            Phase::Particles => {
                layer.set_fill_color(Some(self.particles_color));
                layer.set_stroke_color(None);
                layer.set_shadow(Some(Shadow::soft_black(3.0)));
            }
        }
    }

    fn notify_will_begin(&self) {
        if let Some(observer) = self.observer.as_ref().and_then(Weak::upgrade) {
            observer.effect_will_begin(self);
        }
    }

    fn notify_did_end(&self) {
        if let Some(observer) = self.observer.as_ref().and_then(Weak::upgrade) {
            observer.effect_did_end(self);
        }
    }

    fn phase_sequence(&self, phase: Phase, layer: &LayerHandle) -> Sequence {
        match phase {
            Phase::Circles => self.circle_sequence(layer),
            Phase::Heart => self.heart_sequence(layer),
            Phase::Particles => self.particles_sequence(layer),
        }
    }

    /// Rings hide through the opening delay, expand from the center while the stroke thins,
    /// then fade out.
    fn circle_sequence(&self, layer: &LayerHandle) -> Sequence {
        let d = self.duration;
        let height = self.bounds.height;
        let hide = {
            let layer = layer.clone();
            move || layer.set_opacity(0.0)
        };
        let reveal = {
            let layer = layer.clone();
            move || layer.set_opacity(1.0)
        };
        Sequence::new()
            .step(Step::delay(d / 5.0 + d / 20.0).before(hide).after(reveal))
            .step(Step::group(
                d / 2.0,
                vec![
                    Step::single(Tween::path(
                        geometry::circle_path(self.bounds, 0.0, self.circles),
                        geometry::circle_path(self.bounds, height / 2.0, self.circles),
                        d / 3.0,
                    )),
                    Step::single(Tween::line_width(height / 3.0, 0.5, d / 3.0)),
                ],
            ))
            .step(Step::single(Tween::opacity(1.0, 0.0, d / 5.0)))
    }

    /// The heart pops in, collapses to nothing (switching to the animated fill), regrows with
    /// an overshoot, settles through three damped bounces, holds, then fades out.
    fn heart_sequence(&self, layer: &LayerHandle) -> Sequence {
        let d = self.duration;
        let bounds = self.bounds;
        let refill = {
            let layer = layer.clone();
            let color = self.heart_colors.animated;
            move || {
                layer.set_path(None);
                layer.set_fill_color(Some(color));
            }
        };
        let regrow = {
            let layer = layer.clone();
            move || layer.set_path(Some(geometry::heart_path(bounds)))
        };
        let clear = {
            let layer = layer.clone();
            move || layer.set_path(None)
        };
        Sequence::new()
            .step(Step::group(
                d / 3.0,
                vec![
                    Step::single(Tween::scale(0.8, 1.0, d / 10.0)),
                    Step::single(Tween::opacity(0.0, 1.0, d / 20.0)),
                ],
            ))
            .step(Step::single(Tween::scale(1.0, 0.0, d / 20.0)).after(refill))
            .step(Step::single(Tween::scale(0.0, 1.1, d / 4.0)).before(regrow))
            .step(Step::single(Tween::scale(1.1, 0.9, d / 8.0)))
            .step(Step::single(Tween::scale(0.9, 1.05, d / 7.0)))
            .step(Step::single(Tween::scale(1.05, 1.0, d / 6.0)))
            .delay(d / 5.0)
            .step(Step::single(Tween::opacity(1.0, 0.0, d / 5.0)).after(clear))
    }

    /// Particles wait out roughly the first half of the run, burst in while spreading to half
    /// scale, then finish the spread as every dot collapses, and vanish.
    fn particles_sequence(&self, layer: &LayerHandle) -> Sequence {
        let d = self.duration;
        let bounds = self.bounds;
        let ParticleCounts { main, small } = self.particles;
        let seed = {
            let layer = layer.clone();
            move || {
                layer.set_path(Some(geometry::particles_path(bounds, main, small, 0.0, false)))
            }
        };
        let vanish = {
            let layer = layer.clone();
            move || layer.set_opacity(0.0)
        };
        Sequence::new()
            .delay(d / 5.0 + d / 20.0 + d / 3.0 * 0.85)
            .step(Step::group(
                d / 5.0,
                vec![
                    Step::single(Tween::opacity(0.0, 1.0, d / 5.0)).before(seed),
                    Step::single(Tween::path(
                        geometry::particles_path(bounds, main, small, 0.0, false),
                        geometry::particles_path(bounds, main, small, 0.5, false),
                        d / 5.0,
                    )),
                ],
            ))
            .step(
                Step::group(
                    d / 3.0,
                    vec![Step::single(Tween::path(
                        geometry::particles_path(bounds, main, small, 0.5, false),
                        geometry::particles_path(bounds, main, small, 1.0, true),
                        d / 3.0,
                    ))],
                )
                .after(vanish),
            )
    }
}
