use rand::Rng;
use crate::scene::bodies::hex_to_rgb;

const DARK_BACKGROUND: u32 = 0x101021;
const LIGHT_BACKGROUND: u32 = 0xf2f2f2;

// Starfield shell
const STAR_MIN_RADIUS: f32 = 65.0;
const STAR_RADIUS_SPREAD: f32 = 60.0;
pub const STAR_POINT_SIZE: f32 = 0.7;
pub const STAR_OPACITY: f32 = 0.66;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn background(self) -> (f32, f32, f32) {
        match self {
            Theme::Dark => hex_to_rgb(DARK_BACKGROUND),
            Theme::Light => hex_to_rgb(LIGHT_BACKGROUND),
        }
    }

    /// Caption for the theme button: names the theme it switches to.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Dark => "Light mode",
            Theme::Light => "Dark mode",
        }
    }
}

/// Star positions and grey levels, interleaved `[x, y, z, r, g, b]`.
pub struct Starfield {
    pub vertices: Vec<f32>,
}

impl Starfield {
    /// Scatters `count` stars uniformly over a spherical shell. In light mode
    /// the stars get random grey levels so some stay visible on the pale
    /// background.
    pub fn generate<R: Rng>(count: usize, theme: Theme, rng: &mut R) -> Self {
        let mut vertices = Vec::with_capacity(count * 6);
        for _ in 0..count {
            let theta = std::f32::consts::TAU * rng.gen::<f32>();
            let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
            let r = STAR_MIN_RADIUS + rng.gen::<f32>() * STAR_RADIUS_SPREAD;
            let grey = if theme.is_dark() { 1.0 } else { 0.3 + 0.7 * rng.gen::<f32>() };
            vertices.extend_from_slice(&[
                r * phi.sin() * theta.cos(),
                r * phi.sin() * theta.sin(),
                r * phi.cos(),
                grey,
                grey,
                grey,
            ]);
        }
        Starfield { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len() / 6
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}
