use std::f64::consts::TAU;
use nalgebra::Point3;
use crate::config::MotionTiming;

/// Self-rotation added to every body per unpaused frame.
pub const SPIN_STEP: f32 = 0.02;

/// Per-body angular speeds plus the pausable orbit clock.
///
/// The orbit angle of a body is `speed × elapsed`, so changing a speed
/// re-positions the body on the next frame rather than accelerating it.
/// Spin is accumulated per frame instead of derived from the clock.
///
/// The clock is `f64` so a 60 Hz step still registers after days of uptime;
/// angles are wrapped to one turn before narrowing to `f32`.
pub struct OrbitState {
    speeds: Vec<f32>,
    spins: Vec<f32>,
    elapsed: f64,
    paused: bool,
    motion: MotionTiming,
}

impl OrbitState {
    pub fn new(speeds: Vec<f32>, motion: MotionTiming) -> Self {
        let spins = vec![0.0; speeds.len()];
        OrbitState {
            speeds,
            spins,
            elapsed: 0.0,
            paused: false,
            motion,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        self.elapsed += dt as f64;
        let step = self.motion.per_frame(SPIN_STEP, dt);
        for spin in &mut self.spins {
            *spin = (*spin + step).rem_euclid(TAU as f32);
        }
    }

    /// The UI clamps slider values; this does not.
    pub fn set_speed(&mut self, index: usize, value: f32) {
        match self.speeds.get_mut(index) {
            Some(speed) => *speed = value,
            None => log::warn!("set_speed: no body at index {}", index),
        }
    }

    /// Flips the pause flag and returns the new value.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn speed(&self, index: usize) -> f32 {
        self.speeds.get(index).copied().unwrap_or(0.0)
    }

    /// `speed × elapsed`, wrapped into `[0, 2π)`.
    pub fn orbit_angle(&self, index: usize) -> f32 {
        (self.speed(index) as f64 * self.elapsed).rem_euclid(TAU) as f32
    }

    pub fn spin_angle(&self, index: usize) -> f32 {
        self.spins.get(index).copied().unwrap_or(0.0)
    }

    /// World position of a body sitting at `(distance, 0, 0)` inside a group
    /// rotated about +Y by its orbit angle.
    pub fn world_position(&self, index: usize, distance: f32) -> Point3<f32> {
        let angle = self.orbit_angle(index);
        Point3::new(distance * angle.cos(), 0.0, -distance * angle.sin())
    }
}
