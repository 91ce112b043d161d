/// Static description of a celestial body. Distances and speeds are stylized
/// scene units, not astronomical values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDescriptor {
    pub name: &'static str,
    pub color: u32,
    pub radius: f32,
    pub distance: f32,
    pub speed: f32,
}

/// Stable index into [`PLANETS`]. Follow mode stores this instead of a
/// reference to the body. Always in range: handles come from [`BodyId::new`],
/// [`find_planet`] or [`planet_ids`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(usize);

impl BodyId {
    pub fn new(index: usize) -> Option<Self> {
        (index < PLANET_COUNT).then_some(BodyId(index))
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn descriptor(self) -> &'static BodyDescriptor {
        &PLANETS[self.0]
    }
}

pub const SUN: BodyDescriptor = BodyDescriptor {
    name: "Sun",
    color: 0xffe066,
    radius: 3.5,
    distance: 0.0,
    speed: 0.0,
};

/// Scale of the sun's glow sprite.
pub const SUN_GLOW: f32 = 12.0;

pub const PLANET_COUNT: usize = 8;

pub const PLANETS: [BodyDescriptor; PLANET_COUNT] = [
    BodyDescriptor { name: "Mercury", color: 0xb1b1b1, radius: 0.38, distance: 6.0, speed: 4.74 },
    BodyDescriptor { name: "Venus", color: 0xe6c47b, radius: 0.95, distance: 8.0, speed: 3.5 },
    BodyDescriptor { name: "Earth", color: 0x3a7ceb, radius: 1.0, distance: 10.0, speed: 2.98 },
    BodyDescriptor { name: "Mars", color: 0xd14b2c, radius: 0.53, distance: 12.0, speed: 2.41 },
    BodyDescriptor { name: "Jupiter", color: 0xe3c6a0, radius: 2.5, distance: 16.0, speed: 1.31 },
    BodyDescriptor { name: "Saturn", color: 0xe8d59e, radius: 2.1, distance: 20.0, speed: 0.97 },
    BodyDescriptor { name: "Uranus", color: 0x6fd1e7, radius: 1.2, distance: 24.0, speed: 0.68 },
    BodyDescriptor { name: "Neptune", color: 0x4563a0, radius: 1.19, distance: 28.0, speed: 0.54 },
];

/// Descriptor speeds are divided by this to get the initial angular speed.
const SPEED_DIVISOR: f32 = 10.0;

// Decorations
pub const ORBIT_RING_COLOR: u32 = 0xffe57b;
pub const ORBIT_RING_HALF_WIDTH: f32 = 0.025;
pub const ORBIT_RING_OPACITY: f32 = 0.16;
pub const PLANET_GLOW_SCALE: f32 = 2.2;
pub const PLANET_GLOW_OPACITY: f32 = 0.19;
pub const SATURN_RING_INNER: f32 = 1.25;
pub const SATURN_RING_OUTER: f32 = 2.3;
pub const SATURN_RING_OPACITY: f32 = 0.77;

impl BodyDescriptor {
    pub fn rgb(&self) -> (f32, f32, f32) {
        hex_to_rgb(self.color)
    }

    pub fn initial_speed(&self) -> f32 {
        self.speed / SPEED_DIVISOR
    }

    /// Mercury is too small for a halo to read well.
    pub fn has_glow(&self) -> bool {
        self.name != "Mercury"
    }

    pub fn has_ring(&self) -> bool {
        self.name == "Saturn"
    }

    /// The gas and ice giants plus Earth get a slightly stronger emissive tint.
    pub fn emissive_intensity(&self) -> f32 {
        match self.name {
            "Earth" | "Neptune" | "Uranus" => 0.07,
            _ => 0.045,
        }
    }
}

pub fn initial_speeds() -> Vec<f32> {
    PLANETS.iter().map(BodyDescriptor::initial_speed).collect()
}

pub fn find_planet(name: &str) -> Option<BodyId> {
    PLANETS
        .iter()
        .position(|p| p.name.eq_ignore_ascii_case(name))
        .map(BodyId)
}

pub fn planet_ids() -> impl Iterator<Item = BodyId> {
    (0..PLANET_COUNT).map(BodyId)
}

pub fn hex_to_rgb(hex: u32) -> (f32, f32, f32) {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    (r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planets_are_ordered_outward() {
        for pair in PLANETS.windows(2) {
            assert!(pair[0].distance < pair[1].distance, "{} before {}", pair[0].name, pair[1].name);
        }
    }

    #[test]
    fn initial_speed_is_a_tenth_of_descriptor_speed() {
        let speeds = initial_speeds();
        assert_eq!(speeds.len(), PLANET_COUNT);
        assert!((speeds[2] - 0.298).abs() < 1e-6);
    }

    #[test]
    fn find_planet_ignores_case() {
        assert_eq!(find_planet("earth"), Some(BodyId(2)));
        assert_eq!(find_planet("SATURN"), Some(BodyId(5)));
        assert_eq!(find_planet("Pluto"), None);
    }

    #[test]
    fn out_of_range_ids_cannot_be_built() {
        assert_eq!(BodyId::new(PLANET_COUNT - 1), Some(BodyId(7)));
        assert_eq!(BodyId::new(PLANET_COUNT), None);
        assert!(planet_ids().all(|id| id.descriptor().name == PLANETS[id.index()].name));
    }

    #[test]
    fn hex_to_rgb_splits_channels() {
        assert_eq!(hex_to_rgb(0xff0000), (1.0, 0.0, 0.0));
        let (r, g, b) = hex_to_rgb(0x101021);
        assert!((r - 16.0 / 255.0).abs() < 1e-6);
        assert!((g - 16.0 / 255.0).abs() < 1e-6);
        assert!((b - 33.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn only_saturn_is_ringed_and_mercury_has_no_glow() {
        assert!(PLANETS.iter().filter(|p| p.has_ring()).count() == 1);
        assert!(!PLANETS[0].has_glow());
        assert!(PLANETS[1..].iter().all(BodyDescriptor::has_glow));
    }
}
