//! The flattened path model and the three shape generators (circle rings, heart, particle
//! starburst).
//!
//! Generators are pure functions of the effect bounds and a scale parameter. The sequencing
//! engine treats their output as opaque snapshots: it only ever requests a path at a step
//! boundary and leaves everything between two snapshots to the tween runtime. To make that
//! interpolation trivial, every shape is flattened to a uniform move/cubic/close verb list —
//! arcs are emitted as cubic Bézier runs — so two snapshots of the same shape at different
//! scales always share an identical verb structure and interpolate pointwise.

use crate::interpolation::Lerp;
use lyon_geom::{Angle, Arc, Point, Vector};
use std::f32::consts::PI;

/// Rectangular extent of an effect or layer, with the origin implicitly at the top left.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Center point, which every generator uses as its anchor.
    pub fn center(&self) -> Point<f32> {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// One drawing verb of a flattened [`Path`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathVerb {
    /// Starts a new subpath at the given point.
    MoveTo(Point<f32>),
    /// Cubic Bézier from the current point.
    CubicTo {
        ctrl1: Point<f32>,
        ctrl2: Point<f32>,
        to: Point<f32>,
    },
    /// Closes the current subpath.
    Close,
}

/// A flattened vector path: an ordered list of [`PathVerb`]s.
///
/// Two paths with the same verb structure (same kinds in the same order) interpolate pointwise
/// via [`Lerp`]; this is the invariant the generators below uphold for any two snapshots of the
/// same shape.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    verbs: Vec<PathVerb>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    pub fn verbs(&self) -> &[PathVerb] {
        &self.verbs
    }

    pub fn move_to(&mut self, to: Point<f32>) {
        self.verbs.push(PathVerb::MoveTo(to));
    }

    pub fn cubic_to(&mut self, ctrl1: Point<f32>, ctrl2: Point<f32>, to: Point<f32>) {
        self.verbs.push(PathVerb::CubicTo { ctrl1, ctrl2, to });
    }

    pub fn close(&mut self) {
        self.verbs.push(PathVerb::Close);
    }

    /// Appends an elliptical arc as a run of cubic Bézier segments, continuing from the current
    /// point (the arc's start point must coincide with it).
    pub fn arc_to(&mut self, arc: &Arc<f32>) {
        arc.for_each_cubic_bezier(&mut |segment| {
            self.verbs.push(PathVerb::CubicTo {
                ctrl1: segment.ctrl1,
                ctrl2: segment.ctrl2,
                to: segment.to,
            });
        });
    }

    /// Appends a full circle as its own closed subpath. A zero radius produces a degenerate
    /// subpath collapsed onto `center`, which is how dots shrink away under interpolation.
    pub fn circle(&mut self, center: Point<f32>, radius: f32) {
        let arc = Arc {
            center,
            radii: Vector::new(radius, radius),
            start_angle: Angle::radians(0.0),
            sweep_angle: Angle::radians(2.0 * PI),
            x_rotation: Angle::radians(0.0),
        };
        // The arc starts at angle zero, i.e. at (cx + r, cy).
        self.move_to(Point::new(center.x + radius, center.y));
        self.arc_to(&arc);
        self.close();
    }
}

impl Lerp for Path {
    fn lerp(&self, y1: &Self, x: f32) -> Self {
        if self.verbs.len() != y1.verbs.len() {
            // Snapshots from the same generator always match; anything else snaps to the target.
            return y1.clone();
        }
        let verbs = self
            .verbs
            .iter()
            .zip(&y1.verbs)
            .map(|(a, b)| match (a, b) {
                (PathVerb::MoveTo(p0), PathVerb::MoveTo(p1)) => PathVerb::MoveTo(p0.lerp(*p1, x)),
                (
                    PathVerb::CubicTo { ctrl1, ctrl2, to },
                    PathVerb::CubicTo {
                        ctrl1: c1,
                        ctrl2: c2,
                        to: t,
                    },
                ) => PathVerb::CubicTo {
                    ctrl1: ctrl1.lerp(*c1, x),
                    ctrl2: ctrl2.lerp(*c2, x),
                    to: to.lerp(*t, x),
                },
                (PathVerb::Close, PathVerb::Close) => PathVerb::Close,
                _ => *b,
            })
            .collect();
        Self { verbs }
    }
}

/// Concentric rings used by the circle phase: `rings` circles centered in `bounds`, ring `i`
/// drawn at `radius * (1 - 0.1 * i)`. Zero rings yields an empty path.
pub fn circle_path(bounds: Bounds, radius: f32, rings: u32) -> Path {
    let mut path = Path::new();
    let center = bounds.center();
    for i in 0..rings {
        path.circle(center, radius * (1.0 - i as f32 * 0.1));
    }
    path
}

/// The heart shape used by the heart phase, drawn inside `bounds` inset by a sixth per side
/// (plus a small extra nudge from the top): a bottom-center cusp, a cubic flank up the left
/// side, two half-circle lobes across the top, and a cubic flank back down the right side.
pub fn heart_path(bounds: Bounds) -> Path {
    let factor = 6.0;
    let top_space = bounds.height / 20.0;
    let origin = Point::new(
        bounds.width / factor,
        top_space + bounds.height / factor,
    );
    let width = bounds.width - 2.0 * (bounds.width / factor);
    let height = bounds.height - 2.0 * (bounds.height / factor);

    let bottom = Point::new(origin.x + width / 2.0, origin.y + height);
    let mut path = Path::new();
    path.move_to(bottom);

    // Left flank, bottom cusp up to the left edge.
    path.cubic_to(
        Point::new(origin.x + width / 2.0, origin.y + height),
        Point::new(origin.x, origin.y + height / 2.0),
        Point::new(origin.x, origin.y + height / 4.0),
    );

    // The two lobes bulge upward; in y-down coordinates that is a sweep from pi to 2*pi.
    for lobe in 0..2 {
        let arc = Arc {
            center: Point::new(
                origin.x + width / 4.0 + lobe as f32 * (width / 2.0),
                origin.y + height / 4.0,
            ),
            radii: Vector::new(width / 4.0, width / 4.0),
            start_angle: Angle::radians(PI),
            sweep_angle: Angle::radians(PI),
            x_rotation: Angle::radians(0.0),
        };
        path.arc_to(&arc);
    }

    // Right flank back down to the cusp.
    path.cubic_to(
        Point::new(origin.x + width, origin.y + height / 2.0),
        Point::new(origin.x + width / 2.0, origin.y + height),
        bottom,
    );
    path.close();
    path
}

/// Outward push applied to the secondary dots between two spokes, as a function of the dot's
/// normalized position within the gap. Hand-tuned staircase from the original effect.
fn spread_bump(t: f32) -> f32 {
    if (0.1..0.2).contains(&t) {
        0.1
    } else if (0.2..0.3).contains(&t) {
        0.3
    } else if (0.3..0.4).contains(&t) {
        0.6
    } else if (0.4..0.5).contains(&t) {
        0.85
    } else if (0.5..0.6).contains(&t) {
        0.1
    } else if (0.6..0.7).contains(&t) {
        0.85
    } else if (0.7..0.8).contains(&t) {
        0.6
    } else if (0.8..0.9).contains(&t) {
        0.3
    } else {
        0.0
    }
}

/// The particle starburst: `main` dots on equally spaced spokes, with `small` secondary dots
/// spread through each gap.
///
/// `scale` runs 0..1 over the life of the burst and drives both the radial distance
/// (`center.x * (0.8 + 0.4 * scale)`) and the dot radii (`8 * scale` for spoke dots,
/// `1 + scale` for secondary dots). With `reverse` set, every dot collapses to radius zero,
/// which is the final snapshot the burst fades out through.
pub fn particles_path(bounds: Bounds, main: u32, small: u32, scale: f32, reverse: bool) -> Path {
    let mut path = Path::new();
    let center = bounds.center();
    let spoke_angle = 2.0 * PI / main as f32;
    let sub_angle = spoke_angle / (small + 1) as f32;
    let radius = center.x * (0.8 + scale * 0.4);

    for i in 0..main {
        let angle = i as f32 * spoke_angle;
        let dot = Point::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        );
        path.circle(dot, if reverse { 0.0 } else { 8.0 * scale });

        for j in 0..small {
            let sub = angle + (j + 1) as f32 * sub_angle;
            let push = 1.0 + 0.5 * spread_bump(j as f32 / (small + 1) as f32);
            let dot = Point::new(
                center.x + radius * sub.cos() * push,
                center.y + radius * sub.sin() * push,
            );
            path.circle(dot, if reverse { 0.0 } else { 1.0 + scale });
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const BOUNDS: Bounds = Bounds {
        width: 100.0,
        height: 100.0,
    };

    fn verb_kinds(path: &Path) -> Vec<u8> {
        path.verbs()
            .iter()
            .map(|verb| match verb {
                PathVerb::MoveTo(_) => 0,
                PathVerb::CubicTo { .. } => 1,
                PathVerb::Close => 2,
            })
            .collect()
    }

    #[test]
    fn circle_path_with_zero_rings_is_empty() {
        assert!(circle_path(BOUNDS, 50.0, 0).is_empty());
    }

    #[test]
    fn circle_snapshots_share_structure_across_radii() {
        let collapsed = circle_path(BOUNDS, 0.0, 3);
        let expanded = circle_path(BOUNDS, 50.0, 3);
        assert_eq!(verb_kinds(&collapsed), verb_kinds(&expanded));
    }

    #[test]
    fn circle_path_interpolates_ring_radius() {
        let from = circle_path(BOUNDS, 0.0, 1);
        let to = circle_path(BOUNDS, 40.0, 1);
        let halfway = from.lerp(&to, 0.5);

        // The outer ring starts at angle zero, i.e. at (cx + r, cy).
        let PathVerb::MoveTo(start) = halfway.verbs()[0] else {
            panic!("expected a leading MoveTo");
        };
        assert_relative_eq!(start.x, 70.0, epsilon = 1e-4);
        assert_relative_eq!(start.y, 50.0, epsilon = 1e-4);
    }

    #[test]
    fn heart_path_is_closed_and_anchored_at_the_cusp() {
        let path = heart_path(BOUNDS);
        let verbs = path.verbs();
        assert_eq!(*verbs.last().expect("non-empty"), PathVerb::Close);

        let PathVerb::MoveTo(start) = verbs[0] else {
            panic!("expected a leading MoveTo");
        };
        let PathVerb::CubicTo { to: end, .. } = verbs[verbs.len() - 2] else {
            panic!("expected the final flank to be a cubic");
        };
        assert_relative_eq!(start.x, end.x, epsilon = 1e-4);
        assert_relative_eq!(start.y, end.y, epsilon = 1e-4);
    }

    #[test]
    fn particle_dot_count_follows_the_counters() {
        // Every dot is one closed degenerate-or-real circle subpath.
        let path = particles_path(BOUNDS, 6, 7, 0.5, false);
        let moves = path
            .verbs()
            .iter()
            .filter(|verb| matches!(verb, PathVerb::MoveTo(_)))
            .count();
        assert_eq!(moves, 6 * (7 + 1));
    }

    #[test]
    fn particle_snapshots_interpolate_between_scales() {
        let from = particles_path(BOUNDS, 6, 7, 0.5, false);
        let to = particles_path(BOUNDS, 6, 7, 1.0, true);
        assert_eq!(verb_kinds(&from), verb_kinds(&to));

        let halfway = from.lerp(&to, 0.5);
        assert_eq!(verb_kinds(&halfway), verb_kinds(&from));
    }

    #[test]
    fn mismatched_structures_snap_to_the_target() {
        let from = circle_path(BOUNDS, 20.0, 1);
        let to = circle_path(BOUNDS, 20.0, 2);
        assert_eq!(from.lerp(&to, 0.25), to);
    }
}
