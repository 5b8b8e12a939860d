//! The [`Tween`] primitive: a single property interpolation job with a duration and an easing.
//!
//! A tween is the one thing a [`ShapeLayer`](crate::layer::ShapeLayer) knows how to run. It is
//! immutable once built; the layer's job runtime samples it with a normalized progress each
//! frame and writes the interpolated value straight into the layer's paint state, so the final
//! value persists after the job completes.

use crate::easing::{Easing, EasingFunction};
use crate::geometry::Path;
use crate::interpolation::Lerp;
use crate::layer::ShapeLayer;

/// The layer property a tween drives, with its endpoint values.
#[derive(Clone, Debug)]
pub enum TweenProperty {
    /// Layer opacity, 0 (transparent) to 1 (opaque).
    Opacity { from: f32, to: f32 },
    /// Uniform scale about the layer center.
    Scale { from: f32, to: f32 },
    /// Stroke width.
    LineWidth { from: f32, to: f32 },
    /// Morph between two path snapshots. Snapshots are expected to share verb structure (see
    /// [`geometry`](crate::geometry)); the morph is a pointwise lerp.
    Path { from: Path, to: Path },
}

/// A property interpolation job: an optional [`TweenProperty`], a duration in seconds, and an
/// [`Easing`].
///
/// A tween without a property is the sanctioned pure-delay primitive — it changes nothing but
/// still occupies its full duration and reports completion, which is what lets a sequence
/// express "wait, then continue" without a separate timer mechanism.
#[derive(Clone, Debug)]
pub struct Tween {
    property: Option<TweenProperty>,
    duration: f32,
    easing: Easing,
}

impl Tween {
    /// Creates a tween for an explicit property.
    pub fn new(property: TweenProperty, duration: f32) -> Self {
        Self {
            property: Some(property),
            duration,
            easing: Easing::default(),
        }
    }

    /// Creates a pure delay: no property change, completion after `duration` seconds.
    pub fn delay(duration: f32) -> Self {
        Self {
            property: None,
            duration,
            easing: Easing::default(),
        }
    }

    pub fn opacity(from: f32, to: f32, duration: f32) -> Self {
        Self::new(TweenProperty::Opacity { from, to }, duration)
    }

    pub fn scale(from: f32, to: f32, duration: f32) -> Self {
        Self::new(TweenProperty::Scale { from, to }, duration)
    }

    pub fn line_width(from: f32, to: f32, duration: f32) -> Self {
        Self::new(TweenProperty::LineWidth { from, to }, duration)
    }

    pub fn path(from: Path, to: Path, duration: f32) -> Self {
        Self::new(TweenProperty::Path { from, to }, duration)
    }

    /// Replaces the default linear easing.
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn is_delay(&self) -> bool {
        self.property.is_none()
    }

    /// Writes the interpolated property value for normalized `progress` into `layer`.
    ///
    /// `progress` is clamped to 0..1 before easing; the easing result itself may leave that
    /// range (overshoot curves) and the lerp extrapolates accordingly.
    pub(crate) fn apply(&self, layer: &mut ShapeLayer, progress: f32) {
        let Some(property) = &self.property else {
            return;
        };
        let t = self.easing.calc(progress.clamp(0.0, 1.0));
        match property {
            TweenProperty::Opacity { from, to } => layer.opacity = from.lerp(to, t),
            TweenProperty::Scale { from, to } => layer.scale = from.lerp(to, t),
            TweenProperty::LineWidth { from, to } => layer.line_width = from.lerp(to, t),
            TweenProperty::Path { from, to } => layer.path = Some(from.lerp(to, t)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;

    fn layer() -> ShapeLayer {
        ShapeLayer::new(Bounds::new(100.0, 100.0))
    }

    #[test]
    fn apply_interpolates_scalar_properties() {
        let mut layer = layer();
        let tween = Tween::opacity(0.0, 1.0, 2.0);

        tween.apply(&mut layer, 0.25);
        assert_eq!(layer.opacity, 0.25);

        tween.apply(&mut layer, 1.0);
        assert_eq!(layer.opacity, 1.0);
    }

    #[test]
    fn apply_clamps_progress() {
        let mut layer = layer();
        let tween = Tween::scale(1.0, 2.0, 1.0);

        tween.apply(&mut layer, 1.75);
        assert_eq!(layer.scale, 2.0);

        tween.apply(&mut layer, -0.5);
        assert_eq!(layer.scale, 1.0);
    }

    #[test]
    fn delay_changes_nothing() {
        let mut layer = layer();
        layer.opacity = 0.4;
        layer.scale = 1.3;

        let tween = Tween::delay(0.5);
        assert!(tween.is_delay());
        tween.apply(&mut layer, 0.8);

        assert_eq!(layer.opacity, 0.4);
        assert_eq!(layer.scale, 1.3);
    }

    #[test]
    fn path_tween_swaps_in_an_interpolated_snapshot() {
        let bounds = Bounds::new(100.0, 100.0);
        let mut layer = layer();
        let tween = Tween::path(
            crate::geometry::circle_path(bounds, 0.0, 1),
            crate::geometry::circle_path(bounds, 40.0, 1),
            1.0,
        );

        tween.apply(&mut layer, 0.5);
        let path = layer.path.as_ref().expect("path written");
        assert!(!path.is_empty());
    }
}
