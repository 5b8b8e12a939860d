//! Includes the types commonly used for configuring and driving the effect.

pub use crate::{
    Bounds, Easing, EffectError, EndSignal, HeartColors, LikeEffect, LikeEffectObserver,
    ParticleCounts, Phase, Sequence, SequenceState, Step, SurfaceHandle, Tween,
};
