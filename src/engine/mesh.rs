use std::f32::consts::{PI, TAU};

/// Floats per vertex: position (3), color (3), texture coordinate (2).
pub const VERTEX_STRIDE: usize = 8;

pub struct Mesh {
    pub vertices: Vec<f32>,
    pub indices: Vec<u16>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }

    /// UV sphere centered on the origin. `u` wraps around the equator,
    /// `v` runs from the north pole (0) to the south pole (1).
    pub fn sphere(radius: f32, segments: u16, rings: u16, color: (f32, f32, f32)) -> Self {
        let mut vertices = Vec::with_capacity((segments as usize + 1) * (rings as usize + 1) * VERTEX_STRIDE);
        let mut indices = Vec::with_capacity(segments as usize * rings as usize * 6);
        let (r, g, b) = color;

        for ring in 0..=rings {
            let v = ring as f32 / rings as f32;
            let phi = v * PI;
            for seg in 0..=segments {
                let u = seg as f32 / segments as f32;
                let theta = u * TAU;
                let x = -radius * theta.cos() * phi.sin();
                let y = radius * phi.cos();
                let z = radius * theta.sin() * phi.sin();
                vertices.extend_from_slice(&[x, y, z, r, g, b, u, v]);
            }
        }

        let row = segments + 1;
        for ring in 0..rings {
            for seg in 0..segments {
                let a = ring * row + seg;
                let b = a + row;
                indices.extend_from_slice(&[a, b, a + 1, b, b + 1, a + 1]);
            }
        }

        Mesh { vertices, indices }
    }

    /// Flat annulus in the XZ plane. `u` runs around the ring, `v` from the
    /// inner edge (0) to the outer edge (1).
    pub fn ring(inner: f32, outer: f32, segments: u16, color: (f32, f32, f32)) -> Self {
        let mut vertices = Vec::with_capacity((segments as usize + 1) * 2 * VERTEX_STRIDE);
        let mut indices = Vec::with_capacity(segments as usize * 6);
        let (r, g, b) = color;

        for seg in 0..=segments {
            let u = seg as f32 / segments as f32;
            let (sin, cos) = (u * TAU).sin_cos();
            vertices.extend_from_slice(&[inner * cos, 0.0, inner * sin, r, g, b, u, 0.0]);
            vertices.extend_from_slice(&[outer * cos, 0.0, outer * sin, r, g, b, u, 1.0]);
        }

        for seg in 0..segments {
            let i = seg * 2;
            indices.extend_from_slice(&[i, i + 1, i + 2, i + 1, i + 3, i + 2]);
        }

        Mesh { vertices, indices }
    }

    /// Unit square in the XY plane, for camera-facing sprites.
    pub fn quad() -> Self {
        let vertices = vec![
            -0.5, -0.5, 0.0, 1.0, 1.0, 1.0, 0.0, 1.0,
             0.5, -0.5, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0,
             0.5,  0.5, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0,
            -0.5,  0.5, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0,
        ];
        Mesh { vertices, indices: vec![0, 1, 2, 0, 2, 3] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = Mesh::sphere(2.5, 16, 12, (1.0, 0.5, 0.0));
        assert_eq!(mesh.vertex_count(), 17 * 13);
        assert_eq!(mesh.indices.len(), 16 * 12 * 6);
        for v in mesh.vertices.chunks(VERTEX_STRIDE) {
            let r = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!((r - 2.5).abs() < 1e-4);
        }
    }

    #[test]
    fn sphere_indices_in_range() {
        let mesh = Mesh::sphere(1.0, 44, 44, (1.0, 1.0, 1.0));
        let count = mesh.vertex_count() as u16;
        assert!(mesh.indices.iter().all(|&i| i < count));
    }

    #[test]
    fn ring_is_flat_between_radii() {
        let mesh = Mesh::ring(1.0, 2.0, 64, (1.0, 1.0, 1.0));
        assert_eq!(mesh.vertex_count(), 130);
        for v in mesh.vertices.chunks(VERTEX_STRIDE) {
            assert_eq!(v[1], 0.0);
            let r = (v[0] * v[0] + v[2] * v[2]).sqrt();
            assert!(r > 0.999 && r < 2.001);
        }
        let count = mesh.vertex_count() as u16;
        assert!(mesh.indices.iter().all(|&i| i < count));
    }

    #[test]
    fn quad_has_two_triangles() {
        let mesh = Mesh::quad();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices.len(), 6);
    }
}
