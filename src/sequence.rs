//! Declarative animation steps and the [`Sequence`] state machine that plays them in order.
//!
//! A [`Step`] is either a single [`Tween`] or a group of child steps merged into one concurrent
//! job, each with optional before/after callbacks. A [`Sequence`] owns an ordered list of steps
//! and advances strictly on completion events: each step's job must report natural completion
//! before the next step is attached. The sequence never polls time itself — the only input is
//! [`Sequence::job_finished`], which makes the whole machine testable without a rendering
//! surface by injecting events by hand.

use crate::layer::{JobId, LayerHandle};
use crate::tween::Tween;
use tracing::{debug, warn};

/// A zero-argument callback fired at a step boundary. Callbacks typically capture a
/// [`LayerHandle`] clone and mutate paint state (swap a path, reset opacity).
pub type Action = Box<dyn FnMut()>;

enum StepKind {
    /// One tween, one job.
    Single(Tween),
    /// Child steps merged into one job: all child tweens run concurrently and the job delivers
    /// a single aggregate completion after `duration` seconds. Children are kept as steps so
    /// their `before` callbacks fire on attachment; their `after` callbacks never fire — only
    /// the group's own `after` does, through the normal completion path.
    Group { duration: f32, children: Vec<Step> },
}

/// One unit of a [`Sequence`]: a single tween or a concurrent group, plus optional callbacks
/// around it.
pub struct Step {
    kind: StepKind,
    before: Option<Action>,
    after: Option<Action>,
}

impl Step {
    /// A step that runs one tween.
    pub fn single(tween: Tween) -> Self {
        Self {
            kind: StepKind::Single(tween),
            before: None,
            after: None,
        }
    }

    /// A pure delay step: occupies `seconds`, changes nothing, still reports completion so the
    /// sequence keeps moving.
    pub fn delay(seconds: f32) -> Self {
        Self::single(Tween::delay(seconds))
    }

    /// A group step: every child's tweens run concurrently inside one merged job that completes
    /// once, after `duration` seconds.
    pub fn group(duration: f32, children: Vec<Step>) -> Self {
        Self {
            kind: StepKind::Group { duration, children },
            before: None,
            after: None,
        }
    }

    /// Sets the callback fired synchronously just before this step's job is registered.
    pub fn before(mut self, action: impl FnMut() + 'static) -> Self {
        self.before = Some(Box::new(action));
        self
    }

    /// Sets the callback fired when this step's job reports natural completion. Interrupted
    /// jobs never fire it.
    pub fn after(mut self, action: impl FnMut() + 'static) -> Self {
        self.after = Some(Box::new(action));
        self
    }

    /// The wall-clock time this step occupies on the sequence: the tween duration for a single
    /// step, the merged job duration for a group.
    pub fn duration(&self) -> f32 {
        match &self.kind {
            StepKind::Single(tween) => tween.duration(),
            StepKind::Group { duration, .. } => *duration,
        }
    }

    /// Fires `before` callbacks bottom-up: children first (they are conceptually simultaneous,
    /// so their relative order carries no meaning), then this step's own.
    fn fire_before(&mut self) {
        if let StepKind::Group { children, .. } = &mut self.kind {
            for child in children {
                child.fire_before();
            }
        }
        if let Some(before) = self.before.as_mut() {
            before();
        }
    }

    fn fire_after(&mut self) {
        if let Some(after) = self.after.as_mut() {
            after();
        }
    }

    fn collect_tweens(&self, out: &mut Vec<Tween>) {
        match &self.kind {
            StepKind::Single(tween) => out.push(tween.clone()),
            StepKind::Group { children, .. } => {
                for child in children {
                    child.collect_tweens(out);
                }
            }
        }
    }

    /// Runs the before callbacks, then registers this step's merged job on `layer`.
    fn attach_to(&mut self, layer: &LayerHandle) -> JobId {
        self.fire_before();
        let mut tweens = Vec::new();
        self.collect_tweens(&mut tweens);
        layer.add_job(tweens, self.duration())
    }
}

/// Where a [`Sequence`] is in its life cycle.
///
/// The cursor is only meaningful while `Running`; before the first step attaches and after the
/// last one completes there is no "current step".
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SequenceState {
    /// Constructed; nothing attached yet.
    #[default]
    Idle,
    /// The step at `cursor` is animating as job `job` on the target layer.
    Running { cursor: usize, job: JobId },
    /// The cursor advanced past the last step. A completed sequence emits nothing further and
    /// cannot be re-run.
    Completed,
}

/// An ordered chain of [`Step`]s advanced strictly by completion events.
///
/// A sequence is single-use: build it, call [`run_on`](Self::run_on) once, then feed it the
/// layer's completion events until it reports [`SequenceState::Completed`]. Events that do not
/// belong to the current step (stale ids from an interrupted run, late deliveries) are ignored
/// defensively rather than advancing the cursor.
#[derive(Default)]
pub struct Sequence {
    steps: Vec<Step>,
    layer: Option<LayerHandle>,
    state: SequenceState,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step; insertion order is playback order.
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Appends a pure delay step.
    pub fn delay(self, seconds: f32) -> Self {
        self.step(Step::delay(seconds))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, SequenceState::Completed)
    }

    /// Per-step wall-clock durations in playback order.
    pub fn step_durations(&self) -> Vec<f32> {
        self.steps.iter().map(Step::duration).collect()
    }

    /// Sum of all step durations: how long the sequence takes end to end when every completion
    /// arrives on time.
    pub fn total_duration(&self) -> f32 {
        self.steps.iter().map(Step::duration).sum()
    }

    /// Starts playback on `layer`: records the target layer, then attaches the first step (its
    /// `before` fires just before the job registers).
    ///
    /// Starting an empty sequence is a silent no-op. Starting a sequence that already ran is
    /// unsupported and is refused with a diagnostic rather than corrupting the cursor.
    pub fn run_on(&mut self, layer: &LayerHandle) {
        if self.steps.is_empty() {
            return;
        }
        if !matches!(self.state, SequenceState::Idle) {
            warn!("ignoring run_on for a sequence that has already been started");
            return;
        }
        let job = self.steps[0].attach_to(layer);
        self.layer = Some(layer.clone());
        self.state = SequenceState::Running { cursor: 0, job };
    }

    /// Injects a completion event.
    ///
    /// Only an event carrying the current step's job id moves the machine, and only when the
    /// job finished naturally: the current step's `after` fires, then either the next step
    /// attaches to the recorded layer or the sequence completes. Interrupted completions and
    /// mismatched ids are absorbed without advancing and without firing callbacks.
    pub fn job_finished(&mut self, id: JobId, finished: bool) {
        let SequenceState::Running { cursor, job } = self.state else {
            return;
        };
        if id != job {
            debug!(?id, "ignoring completion for a job that is not the current step");
            return;
        }
        if !finished {
            return;
        }

        self.steps[cursor].fire_after();

        let next = cursor + 1;
        if next >= self.steps.len() {
            self.layer = None;
            self.state = SequenceState::Completed;
            return;
        }
        let Some(layer) = self.layer.clone() else {
            // Unreachable by construction; bail out rather than panic if it ever is.
            warn!("sequence lost its target layer mid-run");
            self.state = SequenceState::Completed;
            return;
        };
        let job = self.steps[next].attach_to(&layer);
        self.state = SequenceState::Running { cursor: next, job };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;
    use crate::layer::ShapeLayer;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn layer() -> LayerHandle {
        LayerHandle::new(ShapeLayer::new(Bounds::new(100.0, 100.0)))
    }

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn logging(log: &Log, label: &'static str) -> impl FnMut() {
        let log = log.clone();
        move || log.borrow_mut().push(label)
    }

    fn current_job(sequence: &Sequence) -> JobId {
        match sequence.state() {
            SequenceState::Running { job, .. } => job,
            state => panic!("expected a running sequence, got {state:?}"),
        }
    }

    #[test]
    fn empty_sequence_does_not_start() {
        let layer = layer();
        let mut sequence = Sequence::new();
        sequence.run_on(&layer);
        assert_eq!(sequence.state(), SequenceState::Idle);
        assert_eq!(layer.active_jobs(), 0);
    }

    #[test]
    fn steps_fire_callbacks_in_list_order() {
        let layer = layer();
        let log: Log = Rc::default();

        let mut sequence = Sequence::new()
            .step(
                Step::delay(0.1)
                    .before(logging(&log, "before 0"))
                    .after(logging(&log, "after 0")),
            )
            .step(
                Step::delay(0.1)
                    .before(logging(&log, "before 1"))
                    .after(logging(&log, "after 1")),
            )
            .step(
                Step::delay(0.1)
                    .before(logging(&log, "before 2"))
                    .after(logging(&log, "after 2")),
            );

        sequence.run_on(&layer);
        for _ in 0..3 {
            let job = current_job(&sequence);
            sequence.job_finished(job, true);
        }

        assert!(sequence.is_completed());
        assert_eq!(
            *log.borrow(),
            ["before 0", "after 0", "before 1", "after 1", "before 2", "after 2"]
        );
    }

    #[test]
    fn cursor_walks_each_step_exactly_once() {
        let layer = layer();
        let mut sequence = Sequence::new().delay(0.1).delay(0.1).delay(0.1).delay(0.1);
        sequence.run_on(&layer);

        for expected in 0..4 {
            let SequenceState::Running { cursor, job } = sequence.state() else {
                panic!("sequence stopped early");
            };
            assert_eq!(cursor, expected);
            sequence.job_finished(job, true);
        }
        assert_eq!(sequence.state(), SequenceState::Completed);
    }

    #[test]
    fn interrupted_completion_does_not_advance() {
        let layer = layer();
        let log: Log = Rc::default();
        let mut sequence = Sequence::new()
            .step(Step::delay(0.1).after(logging(&log, "after 0")))
            .delay(0.1);

        sequence.run_on(&layer);
        let job = current_job(&sequence);
        sequence.job_finished(job, false);

        assert!(log.borrow().is_empty());
        assert_eq!(sequence.state(), SequenceState::Running { cursor: 0, job });
    }

    #[test]
    fn stale_job_ids_are_ignored() {
        let layer = layer();
        let mut sequence = Sequence::new().delay(0.1).delay(0.1);
        sequence.run_on(&layer);

        // Simulate a late delivery from a job that is not the cursor's.
        let stale = layer.add_job(Vec::new(), 1.0);
        let current = current_job(&sequence);
        assert_ne!(stale, current);

        sequence.job_finished(stale, true);
        assert_eq!(
            sequence.state(),
            SequenceState::Running { cursor: 0, job: current }
        );
    }

    #[test]
    fn events_after_completion_are_ignored() {
        let layer = layer();
        let mut sequence = Sequence::new().delay(0.1);
        sequence.run_on(&layer);
        let job = current_job(&sequence);
        sequence.job_finished(job, true);
        assert!(sequence.is_completed());

        sequence.job_finished(job, true);
        assert!(sequence.is_completed());
    }

    #[test]
    fn group_runs_child_befores_before_the_job_registers() {
        let layer = layer();
        let log: Log = Rc::default();
        let jobs_at_before = Rc::new(RefCell::new(usize::MAX));

        let counting = {
            let layer = layer.clone();
            let jobs_at_before = jobs_at_before.clone();
            move || *jobs_at_before.borrow_mut() = layer.active_jobs()
        };

        let mut sequence = Sequence::new().step(
            Step::group(
                0.5,
                vec![
                    Step::single(Tween::opacity(0.0, 1.0, 0.5)).before(counting),
                    Step::single(Tween::scale(1.0, 2.0, 0.5)).before(logging(&log, "child 1")),
                ],
            )
            .after(logging(&log, "group after")),
        );
        sequence.run_on(&layer);

        // Both child befores ran while no job was registered yet.
        assert_eq!(*jobs_at_before.borrow(), 0);
        assert_eq!(*log.borrow(), ["child 1"]);
        assert_eq!(layer.active_jobs(), 1);
    }

    #[test]
    fn group_delivers_one_aggregate_completion() {
        let layer = layer();
        let log: Log = Rc::default();
        let mut sequence = Sequence::new()
            .step(
                Step::group(
                    0.5,
                    vec![
                        Step::single(Tween::opacity(0.0, 1.0, 0.3)),
                        Step::single(Tween::scale(1.0, 2.0, 0.5)),
                    ],
                )
                .after(logging(&log, "group after")),
            )
            .step(Step::delay(0.1).before(logging(&log, "next before")));

        sequence.run_on(&layer);

        // Drive the real layer: the merged job completes once, at the group duration.
        let mut events = Vec::new();
        for _ in 0..5 {
            events.extend(layer.advance(0.1));
        }
        assert_eq!(events.len(), 1);
        assert!(events[0].finished);

        sequence.job_finished(events[0].id, true);
        assert_eq!(*log.borrow(), ["group after", "next before"]);
    }

    #[test]
    fn child_afters_never_fire() {
        let layer = layer();
        let log: Log = Rc::default();
        let mut sequence = Sequence::new().step(Step::group(
            0.2,
            vec![Step::single(Tween::opacity(0.0, 1.0, 0.2)).after(logging(&log, "child after"))],
        ));

        sequence.run_on(&layer);
        let job = current_job(&sequence);
        sequence.job_finished(job, true);

        assert!(sequence.is_completed());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn rerunning_a_started_sequence_is_refused() {
        let layer = layer();
        let mut sequence = Sequence::new().delay(0.1);
        sequence.run_on(&layer);
        let job = current_job(&sequence);

        sequence.run_on(&layer);
        assert_eq!(sequence.state(), SequenceState::Running { cursor: 0, job });
        assert_eq!(layer.active_jobs(), 1);
    }
}
