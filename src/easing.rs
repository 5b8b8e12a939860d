//! The [`Easing`] curves available to tweens, and the [`EasingFunction`] trait for custom curves.

use dyn_clone::{clone_trait_object, DynClone};
use lazy_static::lazy_static;
use lyon_geom::{CubicBezierSegment, Point};
use std::fmt::Debug;

/// Provides an easing function, AKA animation timing function, for non-linear interpolation of
/// values along some curve.
///
/// Easing and [`Lerp`](crate::interpolation::Lerp) are complementary: the lerp always produces
/// the property value for a given `x`, and the easing function remaps which `x` the lerp
/// receives. Linear interpolation is the identity remap.
pub trait EasingFunction: Debug + DynClone {
    /// Computes the `y` value along the curve for a given `x` position.
    ///
    /// Expects `x` to be normalized (from 0 to 1) and returns a normalized y-value which is
    /// typically between 0 and 1, but may be outside that range (e.g. [`Easing::OutBack`]).
    fn calc(&self, x: f32) -> f32;
}

clone_trait_object!(EasingFunction);

/// Specifies a standard or custom [`EasingFunction`].
///
/// The standard set covers what a short fire-and-forget effect actually reaches for: the CSS
/// quartet (`ease`, `ease-in`, `ease-out`, `ease-in-out`), the gentle quadratic/cubic pairs, and
/// [`OutBack`](Easing::OutBack) for overshoot-and-settle motion. Anything else can be supplied as
/// an ad-hoc bezier through [`Custom`](Easing::Custom).
#[derive(Clone, Debug, Default)]
pub enum Easing {
    /// Straight-line interpolation. This is the default, matching the behavior of a bare
    /// property interpolator with no timing curve attached.
    #[default]
    Linear,
    /// Curve equivalent to CSS `ease`.
    Ease,
    /// Curve equivalent to CSS `ease-in`.
    In,
    /// Curve equivalent to CSS `ease-out`.
    Out,
    /// Curve equivalent to CSS `ease-in-out`.
    InOut,
    /// Quadratic start: slow, then fast.
    InQuad,
    /// Quadratic end: fast, then slow.
    OutQuad,
    /// Cubic start; steeper than [`InQuad`](Self::InQuad).
    InCubic,
    /// Cubic end; steeper than [`OutQuad`](Self::OutQuad).
    OutCubic,
    /// Overshoots the terminal value (goes above 1.0) before settling back at it.
    OutBack,
    /// User-defined easing, such as an ad-hoc [`CubicBezierEasing`].
    Custom(Box<dyn EasingFunction>),
}

impl EasingFunction for Easing {
    fn calc(&self, x: f32) -> f32 {
        match self {
            Self::Linear => EASE_LINEAR.calc(x),
            Self::Ease => EASE_WEB.calc(x),
            Self::In => EASE_IN.calc(x),
            Self::Out => EASE_OUT.calc(x),
            Self::InOut => EASE_IN_OUT.calc(x),
            Self::InQuad => EASE_IN_QUAD.calc(x),
            Self::OutQuad => EASE_OUT_QUAD.calc(x),
            Self::InCubic => EASE_IN_CUBIC.calc(x),
            Self::OutCubic => EASE_OUT_CUBIC.calc(x),
            Self::OutBack => EASE_OUT_BACK.calc(x),
            Self::Custom(custom) => custom.calc(x),
        }
    }
}

lazy_static! {
    static ref EASE_LINEAR: LinearEasing = LinearEasing;
    static ref EASE_WEB: CubicBezierEasing = cubic_bezier(0.25, 0.1, 0.25, 1.0);
    static ref EASE_IN: CubicBezierEasing = cubic_bezier(0.42, 0.0, 1.0, 1.0);
    static ref EASE_OUT: CubicBezierEasing = cubic_bezier(0.0, 0.0, 0.58, 1.0);
    static ref EASE_IN_OUT: CubicBezierEasing = cubic_bezier(0.42, 0.0, 0.58, 1.0);
    static ref EASE_IN_QUAD: CubicBezierEasing = cubic_bezier(0.11, 0.0, 0.5, 0.0);
    static ref EASE_OUT_QUAD: CubicBezierEasing = cubic_bezier(0.5, 1.0, 0.89, 1.0);
    static ref EASE_IN_CUBIC: CubicBezierEasing = cubic_bezier(0.32, 0.0, 0.67, 0.0);
    static ref EASE_OUT_CUBIC: CubicBezierEasing = cubic_bezier(0.33, 1.0, 0.68, 1.0);
    static ref EASE_OUT_BACK: CubicBezierEasing = cubic_bezier(0.34, 1.56, 0.64, 1.0);
}

/// Linear easing which returns the `x` value as the `y` result. Has the same behavior as
/// [`Easing::Linear`] or [`Easing::default`].
#[derive(Clone, Debug)]
pub struct LinearEasing;

impl EasingFunction for LinearEasing {
    fn calc(&self, x: f32) -> f32 {
        x
    }
}

/// Easing function defined by a cubic bezier curve with the start and end points fixed at
/// `(0, 0)` and `(1, 1)`, i.e. only the control points are specified.
///
/// All standard easings other than [`Easing::Linear`] are instances of this; it can also be used
/// in [`Easing::Custom`] when the standard set does not suffice.
#[derive(Clone, Debug)]
pub struct CubicBezierEasing {
    segment: CubicBezierSegment<f32>,
}

impl CubicBezierEasing {
    /// Creates a new [`CubicBezierEasing`] with control points `(x1, y1)` and `(x2, y2)`.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            segment: CubicBezierSegment {
                from: Point::new(0.0, 0.0),
                to: Point::new(1.0, 1.0),
                ctrl1: Point::new(x1, y1),
                ctrl2: Point::new(x2, y2),
            },
        }
    }
}

impl EasingFunction for CubicBezierEasing {
    fn calc(&self, x: f32) -> f32 {
        self.segment.y(x)
    }
}

fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32) -> CubicBezierEasing {
    CubicBezierEasing::new(x1, y1, x2, y2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linear_is_identity() {
        assert_eq!(Easing::Linear.calc(0.0), 0.0);
        assert_eq!(Easing::Linear.calc(0.37), 0.37);
        assert_eq!(Easing::Linear.calc(1.0), 1.0);
    }

    #[test]
    fn bezier_easings_preserve_endpoints() {
        for easing in [Easing::Ease, Easing::In, Easing::Out, Easing::InOut, Easing::OutBack] {
            assert_relative_eq!(easing.calc(0.0), 0.0, epsilon = 1e-5);
            assert_relative_eq!(easing.calc(1.0), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn out_back_overshoots() {
        let peak = (1..20)
            .map(|i| Easing::OutBack.calc(i as f32 / 20.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn custom_easing_is_used() {
        #[derive(Clone, Debug)]
        struct Step;
        impl EasingFunction for Step {
            fn calc(&self, x: f32) -> f32 {
                if x < 0.5 {
                    0.0
                } else {
                    1.0
                }
            }
        }

        let easing = Easing::Custom(Box::new(Step));
        assert_eq!(easing.calc(0.25), 0.0);
        assert_eq!(easing.calc(0.75), 1.0);
    }
}
