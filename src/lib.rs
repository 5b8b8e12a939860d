//! A layered, completion-driven "like" button animation effect.
//!
//! Heartburst plays three concurrent tracks — expanding circle rings, a bouncing heart, and a
//! radiating particle burst — on three retained shape layers. Each track is an ordered
//! [`Sequence`](sequence::Sequence) of tweens and concurrent tween groups that advances
//! strictly on completion events, with callback injection points at every step boundary. The
//! host owns the clock: it calls [`LikeEffect::advance`](effect::LikeEffect::advance) once per
//! frame and renders the layers' paint state however it likes.
//!
//! # Example
//!
//! ```
//! use heartburst::{Bounds, LikeEffect, SurfaceHandle};
//!
//! let bounds = Bounds::new(100.0, 100.0);
//! let surface = SurfaceHandle::new(bounds);
//!
//! let mut effect = LikeEffect::new(bounds);
//! effect.duration = 1.5;
//! effect.circles = 1;
//! effect.attach_to(&surface);
//!
//! effect.run().expect("configuration is within bounds");
//! while effect.is_running() {
//!     effect.advance(1.0 / 60.0); // normally driven by the host's frame loop
//! }
//! ```

pub mod easing;
pub mod effect;
pub mod geometry;
pub mod interpolation;
pub mod layer;
pub mod prelude;
pub mod sequence;
pub mod tween;

pub use easing::{Easing, EasingFunction};
pub use effect::{
    limits, EffectError, EndSignal, HeartColors, LikeEffect, LikeEffectObserver, ParticleCounts,
    Phase,
};
pub use geometry::{Bounds, Path};
pub use interpolation::Lerp;
pub use layer::{JobEvent, JobId, LayerHandle, ShapeLayer, SurfaceHandle};
pub use sequence::{Sequence, SequenceState, Step};
pub use tween::{Tween, TweenProperty};
