//! Camera mode state machine.
//!
//! Exactly one [`CameraMode`] drives the camera each frame:
//!
//! * `Default` sweeps around the origin on its own clock, which keeps running
//!   while the planets are paused.
//! * `Following` tracks a planet's live position with a slowly rotating offset.
//! * `Transitioning` eases the camera between two fixed poses; the reset
//!   transition ends in `Default`.
//!
//! `Following` is never left directly for `Default`; [`CameraController::reset`]
//! goes through a reset transition.

use std::f64::consts::TAU;
use nalgebra::{Point3, Rotation3, Vector3};
use crate::config::MotionTiming;
use crate::control::easing::{lerp_point, Easing};
use crate::scene::bodies::BodyId;

pub const DEFAULT_POSE: CameraPose = CameraPose {
    position: Point3::new(0.0, 13.0, 38.0),
    look_at: Point3::new(0.0, 0.0, 0.0),
};

// Default sweep
const SWEEP_RADIUS: f32 = 38.0;
const SWEEP_BASE_HEIGHT: f32 = 13.0;
const SWEEP_AMPLITUDE: f32 = 2.7;
const SWEEP_RATE: f64 = 0.1;
const SWEEP_BOB_RATE: f64 = 0.05;

/// Seconds a transition takes from start to end.
pub const TRANSITION_DURATION: f32 = 1.1;

// Follow offset
const FOLLOW_DISTANCE: f32 = 7.0;
const FOLLOW_HEIGHT: f32 = 3.0;
/// Radians of offset rotation per wall-clock millisecond.
const FOLLOW_ORBIT_RATE: f64 = 0.0001;
const FOLLOW_SMOOTHING: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Point3<f32>,
    pub look_at: Point3<f32>,
}

/// Timing inputs for one animation tick.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    /// Seconds since the previous tick.
    pub dt: f32,
    /// Host high-resolution timestamp in milliseconds.
    pub wall_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: CameraPose,
    pub to: CameraPose,
    pub progress: f32,
    pub is_reset: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraMode {
    Default,
    Transitioning(Transition),
    Following { target: BodyId },
}

pub struct CameraController {
    mode: CameraMode,
    pose: CameraPose,
    /// Ambient clock for the default sweep, in seconds. Not affected by pause.
    sweep_time: f64,
    easing: Easing,
    motion: MotionTiming,
}

impl CameraController {
    pub fn new(easing: Easing, motion: MotionTiming) -> Self {
        CameraController {
            mode: CameraMode::Default,
            pose: DEFAULT_POSE,
            sweep_time: 0.0,
            easing,
            motion,
        }
    }

    pub fn mode(&self) -> &CameraMode {
        &self.mode
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn followed(&self) -> Option<BodyId> {
        match self.mode {
            CameraMode::Following { target } => Some(target),
            _ => None,
        }
    }

    pub fn reset_control_visible(&self) -> bool {
        !matches!(self.mode, CameraMode::Default)
    }

    /// Starts following `target` immediately. An in-flight transition is dropped.
    pub fn follow(&mut self, target: BodyId) {
        if let CameraMode::Transitioning(_) = self.mode {
            log::debug!("camera: follow request cancels running transition");
        }
        log::info!("camera: following {}", target.descriptor().name);
        self.mode = CameraMode::Following { target };
    }

    /// Eases back to the default pose. Only meaningful while following;
    /// returns `false` and does nothing otherwise.
    pub fn reset(&mut self) -> bool {
        if !matches!(self.mode, CameraMode::Following { .. }) {
            return false;
        }
        let from = CameraPose {
            position: self.pose.position,
            look_at: self.pose.position + self.view_direction(),
        };
        self.mode = CameraMode::Transitioning(Transition {
            from,
            to: DEFAULT_POSE,
            progress: 0.0,
            is_reset: true,
        });
        log::info!("camera: resetting to default view");
        true
    }

    /// Computes the camera pose for this tick. `body_position` returns the
    /// live world position of a planet.
    pub fn update(&mut self, frame: &FrameClock, body_position: impl Fn(BodyId) -> Point3<f32>) -> CameraPose {
        self.sweep_time += frame.dt as f64;

        match self.mode {
            CameraMode::Default => {
                self.pose = sweep_pose(self.sweep_time);
            }
            CameraMode::Transitioning(mut transition) => {
                transition.progress = (transition.progress + frame.dt / TRANSITION_DURATION).min(1.0);
                let t = self.easing.apply(transition.progress);
                self.pose = CameraPose {
                    position: lerp_point(&transition.from.position, &transition.to.position, t),
                    look_at: lerp_point(&transition.from.look_at, &transition.to.look_at, t),
                };
                self.mode = if transition.progress >= 1.0 && transition.is_reset {
                    log::info!("camera: reset transition finished");
                    CameraMode::Default
                } else {
                    CameraMode::Transitioning(transition)
                };
            }
            CameraMode::Following { target } => {
                let body = body_position(target);
                let goal = body + follow_offset(frame.wall_ms);
                let k = self.motion.smoothing(FOLLOW_SMOOTHING, frame.dt);
                self.pose = CameraPose {
                    position: self.pose.position + (goal - self.pose.position) * k,
                    look_at: body,
                };
            }
        }

        self.pose
    }

    fn view_direction(&self) -> Vector3<f32> {
        let d = self.pose.look_at - self.pose.position;
        if d.norm_squared() > f32::EPSILON {
            d.normalize()
        } else {
            -Vector3::z()
        }
    }
}

/// Pose of the ambient sweep at time `t` seconds.
pub fn sweep_pose(t: f64) -> CameraPose {
    let heading = wrap(t * SWEEP_RATE);
    let bob = wrap(t * SWEEP_BOB_RATE);
    CameraPose {
        position: Point3::new(
            heading.sin() * SWEEP_RADIUS,
            SWEEP_BASE_HEIGHT + bob.sin() * SWEEP_AMPLITUDE,
            heading.cos() * SWEEP_RADIUS,
        ),
        look_at: Point3::origin(),
    }
}

/// Behind-and-above offset, turning slowly about +Y with wall-clock time.
pub fn follow_offset(wall_ms: f64) -> Vector3<f32> {
    let angle = wrap(wall_ms * FOLLOW_ORBIT_RATE);
    Rotation3::from_axis_angle(&Vector3::y_axis(), angle) * Vector3::new(0.0, FOLLOW_HEIGHT, FOLLOW_DISTANCE)
}

/// Reduces a long-running phase to one turn before narrowing to `f32`.
fn wrap(angle: f64) -> f32 {
    angle.rem_euclid(TAU) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::bodies::find_planet;

    const FRAME: f32 = 1.0 / 60.0;

    fn controller() -> CameraController {
        CameraController::new(Easing::QuadInOut, MotionTiming::FrameCoupled)
    }

    fn tick(c: &mut CameraController, n: usize, at: Point3<f32>) -> CameraPose {
        let mut pose = c.pose();
        for i in 0..n {
            let frame = FrameClock { dt: FRAME, wall_ms: i as f64 * 16.0 };
            pose = c.update(&frame, |_| at);
        }
        pose
    }

    #[test]
    fn default_pose_stays_on_sweep_circle() {
        let mut c = controller();
        for _ in 0..500 {
            let pose = c.update(&FrameClock { dt: 0.37, wall_ms: 0.0 }, |_| Point3::origin());
            let horizontal = (pose.position.x.powi(2) + pose.position.z.powi(2)).sqrt();
            assert!((horizontal - SWEEP_RADIUS).abs() < 1e-3);
            assert!((pose.position.y - SWEEP_BASE_HEIGHT).abs() <= SWEEP_AMPLITUDE + 1e-4);
            assert_eq!(pose.look_at, Point3::origin());
        }
    }

    #[test]
    fn sweep_keeps_its_pace_after_days() {
        let mut c = controller();
        let start = 6.0 * 24.0 * 3600.0;
        c.update(&FrameClock { dt: start as f32, wall_ms: 0.0 }, |_| Point3::origin());
        let before = c.pose();
        let after = tick(&mut c, 60, Point3::origin());
        let expected = sweep_pose(start + 60.0 * FRAME as f64);
        assert!((after.position - expected.position).norm() < 1e-2);
        let moved = (after.position - before.position).norm();
        assert!((moved - 3.8).abs() < 0.2, "moved {}", moved);
    }

    #[test]
    fn sweep_starts_at_default_pose() {
        assert_eq!(sweep_pose(0.0), DEFAULT_POSE);
    }

    #[test]
    fn follow_switches_immediately() {
        let mut c = controller();
        let earth = find_planet("Earth").unwrap();
        c.follow(earth);
        assert_eq!(c.mode(), &CameraMode::Following { target: earth });
        assert_eq!(c.followed(), Some(earth));
        assert!(c.reset_control_visible());
    }

    #[test]
    fn follow_looks_at_live_body_position() {
        let mut c = controller();
        c.follow(BodyId::new(3).unwrap());
        let positions = [Point3::new(12.0, 0.0, 0.0), Point3::new(0.0, 0.0, -12.0), Point3::new(-8.5, 0.0, 8.5)];
        for (i, p) in positions.iter().enumerate() {
            let pose = c.update(&FrameClock { dt: FRAME, wall_ms: i as f64 * 100.0 }, |_| *p);
            assert_eq!(pose.look_at, *p);
        }
    }

    #[test]
    fn follow_converges_on_offset_target() {
        let mut c = controller();
        c.follow(BodyId::new(0).unwrap());
        let body = Point3::new(6.0, 0.0, 0.0);
        let mut pose = c.pose();
        for _ in 0..200 {
            pose = c.update(&FrameClock { dt: FRAME, wall_ms: 0.0 }, |_| body);
        }
        let goal = body + Vector3::new(0.0, FOLLOW_HEIGHT, FOLLOW_DISTANCE);
        assert!((pose.position - goal).norm() < 1e-3);
    }

    #[test]
    fn follow_smoothing_covers_a_fifth_per_frame() {
        let mut c = controller();
        c.follow(BodyId::new(0).unwrap());
        let start = c.pose().position;
        let body = Point3::new(6.0, 0.0, 0.0);
        let goal = body + follow_offset(0.0);
        let pose = c.update(&FrameClock { dt: 0.5, wall_ms: 0.0 }, |_| body);
        let expected = start + (goal - start) * 0.2;
        assert!((pose.position - expected).norm() < 1e-4);
    }

    #[test]
    fn follow_offset_rotates_about_vertical_axis() {
        let quarter = std::f64::consts::FRAC_PI_2 / FOLLOW_ORBIT_RATE;
        let offset = follow_offset(quarter);
        assert!((offset - Vector3::new(FOLLOW_DISTANCE, FOLLOW_HEIGHT, 0.0)).norm() < 1e-3);
        assert!((follow_offset(0.0) - Vector3::new(0.0, FOLLOW_HEIGHT, FOLLOW_DISTANCE)).norm() < 1e-6);
    }

    #[test]
    fn reset_is_ignored_unless_following() {
        let mut c = controller();
        assert!(!c.reset());
        assert_eq!(c.mode(), &CameraMode::Default);
        assert!(!c.reset_control_visible());
    }

    #[test]
    fn reset_captures_current_pose() {
        let mut c = controller();
        c.follow(BodyId::new(2).unwrap());
        let pose = tick(&mut c, 10, Point3::new(10.0, 0.0, 0.0));
        assert!(c.reset());
        match c.mode() {
            CameraMode::Transitioning(t) => {
                assert!(t.is_reset);
                assert_eq!(t.progress, 0.0);
                assert_eq!(t.from.position, pose.position);
                assert!(((t.from.look_at - t.from.position).norm() - 1.0).abs() < 1e-5);
                assert_eq!(t.to, DEFAULT_POSE);
            }
            other => panic!("expected transition, got {:?}", other),
        }
        assert!(c.reset_control_visible());
        assert!(!c.reset());
    }

    #[test]
    fn transition_progress_is_monotonic_and_clamped() {
        let mut c = controller();
        c.follow(BodyId::new(4).unwrap());
        tick(&mut c, 5, Point3::new(16.0, 0.0, 0.0));
        c.reset();
        let mut last = 0.0;
        while let CameraMode::Transitioning(t) = *c.mode() {
            assert!(t.progress >= last && t.progress <= 1.0);
            last = t.progress;
            c.update(&FrameClock { dt: 0.05, wall_ms: 0.0 }, |_| Point3::origin());
        }
        assert_eq!(c.mode(), &CameraMode::Default);
    }

    #[test]
    fn first_transition_frame_with_zero_dt_is_at_start() {
        let mut c = controller();
        c.follow(BodyId::new(1).unwrap());
        let before = tick(&mut c, 3, Point3::new(8.0, 0.0, 0.0));
        c.reset();
        let pose = c.update(&FrameClock { dt: 0.0, wall_ms: 0.0 }, |_| Point3::origin());
        assert_eq!(pose.position, before.position);
    }

    #[test]
    fn earth_follow_then_reset_returns_to_default() {
        let mut c = controller();
        let earth = find_planet("Earth").unwrap();
        tick(&mut c, 30, Point3::origin());
        c.follow(earth);
        assert_eq!(c.followed(), Some(earth));
        tick(&mut c, 60, Point3::new(10.0, 0.0, 0.0));
        assert!(c.reset());

        let mut pose = c.pose();
        let mut elapsed = 0.0;
        while elapsed < TRANSITION_DURATION {
            pose = c.update(&FrameClock { dt: FRAME, wall_ms: 0.0 }, |_| Point3::new(10.0, 0.0, 0.0));
            elapsed += FRAME;
            if matches!(c.mode(), CameraMode::Default) {
                break;
            }
        }
        // float accumulation may need one extra frame
        if !matches!(c.mode(), CameraMode::Default) {
            pose = c.update(&FrameClock { dt: FRAME, wall_ms: 0.0 }, |_| Point3::origin());
        }
        assert_eq!(c.mode(), &CameraMode::Default);
        assert_eq!(c.followed(), None);
        assert_eq!(pose, DEFAULT_POSE);
        assert!(!c.reset_control_visible());
    }

    #[test]
    fn follow_during_transition_cancels_it() {
        let mut c = controller();
        c.follow(BodyId::new(2).unwrap());
        tick(&mut c, 5, Point3::new(10.0, 0.0, 0.0));
        c.reset();
        c.update(&FrameClock { dt: 0.3, wall_ms: 0.0 }, |_| Point3::origin());
        c.follow(BodyId::new(6).unwrap());
        assert_eq!(c.mode(), &CameraMode::Following { target: BodyId::new(6).unwrap() });
        let target = Point3::new(24.0, 0.0, 0.0);
        let pose = c.update(&FrameClock { dt: FRAME, wall_ms: 0.0 }, |_| target);
        assert_eq!(pose.look_at, target);
    }

    #[test]
    fn exactly_one_mode_drives_the_pose() {
        let mut c = controller();
        let body = Point3::new(20.0, 0.0, 0.0);
        let frame = FrameClock { dt: FRAME, wall_ms: 0.0 };

        let pose = c.update(&frame, |_| body);
        assert_eq!(pose.look_at, Point3::origin());

        c.follow(BodyId::new(5).unwrap());
        let pose = c.update(&frame, |_| body);
        assert_eq!(pose.look_at, body);

        c.reset();
        let pose = c.update(&frame, |_| body);
        assert_ne!(pose.look_at, body);
        assert!(matches!(c.mode(), CameraMode::Transitioning(_)));
    }
}
