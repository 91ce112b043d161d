/// Side length of the glow texture in pixels.
pub const GLOW_SIZE: u32 = 64;

// (offset, alpha) stops of the radial gradient, offset 0 at the inner radius.
const STOPS: [(f32, f32); 3] = [(0.0, 0.34), (0.6, 0.08), (1.0, 0.0)];

/// White RGBA texture whose alpha falls off radially, used for the sun and
/// planet halos. The gradient starts at an eighth of the size and ends at
/// the edge of the inscribed circle.
pub fn glow_texture(size: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    let center = size as f32 / 2.0;
    let inner = size as f32 / 8.0;
    let outer = size as f32 / 2.0;
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            let offset = ((dx * dx + dy * dy).sqrt() - inner) / (outer - inner);
            let alpha = gradient_alpha(offset);
            pixels.extend_from_slice(&[255, 255, 255, (alpha * 255.0).round() as u8]);
        }
    }
    pixels
}

fn gradient_alpha(offset: f32) -> f32 {
    let offset = offset.clamp(0.0, 1.0);
    for pair in STOPS.windows(2) {
        let (o0, a0) = pair[0];
        let (o1, a1) = pair[1];
        if offset <= o1 {
            let t = (offset - o0) / (o1 - o0);
            return a0 + (a1 - a0) * t;
        }
    }
    0.0
}
