use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::control::easing::Easing;

/// Display rate the per-frame constants were tuned against.
pub const REFERENCE_FPS: f32 = 60.0;

/// How per-frame motion constants (spin step, follow smoothing) relate to time.
///
/// `FrameCoupled` applies them once per frame, so motion speeds up on faster
/// displays. `DeltaScaled` rescales them by the measured frame delta so a
/// 120 Hz display moves the same amount per second as a 60 Hz one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionTiming {
    FrameCoupled,
    DeltaScaled,
}

impl MotionTiming {
    pub fn from_flag(frame_rate_coupled: bool) -> Self {
        if frame_rate_coupled {
            MotionTiming::FrameCoupled
        } else {
            MotionTiming::DeltaScaled
        }
    }

    /// Additive per-frame increment.
    pub fn per_frame(self, step: f32, dt: f32) -> f32 {
        match self {
            MotionTiming::FrameCoupled => step,
            MotionTiming::DeltaScaled => step * dt * REFERENCE_FPS,
        }
    }

    /// Exponential smoothing factor: the fraction of the remaining distance
    /// covered this frame.
    pub fn smoothing(self, factor: f32, dt: f32) -> f32 {
        match self {
            MotionTiming::FrameCoupled => factor,
            MotionTiming::DeltaScaled => 1.0 - (1.0 - factor).powf(dt * REFERENCE_FPS),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_star_count() -> usize {
    800
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_true")]
    pub frame_rate_coupled_motion: bool,
    #[serde(default)]
    pub transition_easing: Easing,
    #[serde(default = "default_star_count")]
    pub star_count: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Surface image URL per body name, plus `"Saturn ring"`.
    #[serde(default)]
    pub textures: HashMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            frame_rate_coupled_motion: true,
            transition_easing: Easing::default(),
            star_count: default_star_count(),
            log_level: default_log_level(),
            textures: HashMap::new(),
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn motion(&self) -> MotionTiming {
        MotionTiming::from_flag(self.frame_rate_coupled_motion)
    }

    pub fn texture(&self, key: &str) -> Option<&str> {
        self.textures.get(key).map(String::as_str)
    }

    /// Unknown names fall back to `Info`.
    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }
}
