// Easing curves for the camera transition.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    /// Constant velocity.
    Linear,
    /// Slow start and end, quadratic.
    #[default]
    QuadInOut,
    /// Slow start and end, cubic.
    CubicInOut,
    /// Slow start and end, sine.
    SineInOut,
}

impl Easing {
    /// Maps `t` in [0, 1] to eased progress. Both endpoints are exact.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::SineInOut => {
                if t == 1.0 {
                    1.0
                } else {
                    -((std::f32::consts::PI * t).cos() - 1.0) / 2.0
                }
            }
        }
    }
}

/// Interpolates so that `t == 0` yields `a` and `t == 1` yields `b` bit-for-bit.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

#[inline]
pub fn lerp_point(a: &Point3<f32>, b: &Point3<f32>, t: f32) -> Point3<f32> {
    Point3::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t), lerp(a.z, b.z, t))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 4] = [Easing::Linear, Easing::QuadInOut, Easing::CubicInOut, Easing::SineInOut];

    #[test]
    fn endpoints_are_exact() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{:?}", easing);
            assert_eq!(easing.apply(1.0), 1.0, "{:?}", easing);
        }
    }

    #[test]
    fn in_out_curves_hit_half_at_midpoint() {
        for easing in ALL {
            assert!((easing.apply(0.5) - 0.5).abs() < 1e-6, "{:?}", easing);
        }
    }

    #[test]
    fn curves_are_monotonic() {
        for easing in ALL {
            let mut prev = 0.0;
            for i in 0..=100 {
                let v = easing.apply(i as f32 / 100.0);
                assert!(v >= prev, "{:?} dipped at step {}", easing, i);
                prev = v;
            }
        }
    }

    #[test]
    fn input_is_clamped() {
        assert_eq!(Easing::QuadInOut.apply(-3.0), 0.0);
        assert_eq!(Easing::QuadInOut.apply(7.0), 1.0);
    }

    #[test]
    fn lerp_point_endpoints() {
        let a = Point3::new(0.1, 13.7, -5.3);
        let b = Point3::new(0.0, 13.0, 38.0);
        assert_eq!(lerp_point(&a, &b, 0.0), a);
        assert_eq!(lerp_point(&a, &b, 1.0), b);
    }
}
