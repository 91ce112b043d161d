use nalgebra::{Matrix4, Perspective3, Point3, Vector3};

/// A ray in world space. `direction` is normalized.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

/// Perspective camera with a position and a look-at target, Y up.
pub struct PerspectiveCamera {
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Point3<f32>,
    pub look_at: Point3<f32>,
}

impl PerspectiveCamera {
    pub fn new(aspect: f32) -> Self {
        PerspectiveCamera {
            fov_y_deg: 48.0,
            aspect,
            near: 0.1,
            far: 200.0,
            position: Point3::new(0.0, 13.0, 38.0),
            look_at: Point3::origin(),
        }
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn projection(&self) -> Matrix4<f32> {
        Perspective3::new(self.aspect, self.fov_y_deg.to_radians(), self.near, self.far).to_homogeneous()
    }

    pub fn view(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.look_at, &Vector3::y())
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection() * self.view()
    }

    /// Unit vector the camera faces.
    pub fn direction(&self) -> Vector3<f32> {
        let d = self.look_at - self.position;
        if d.norm_squared() > f32::EPSILON {
            d.normalize()
        } else {
            -Vector3::z()
        }
    }

    /// Projects a world point to normalized device coordinates.
    pub fn project(&self, world: &Point3<f32>) -> Point3<f32> {
        self.view_projection().transform_point(world)
    }

    /// Ray from the camera through a point given in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc_x: f32, ndc_y: f32) -> Ray {
        let inverse = self
            .view_projection()
            .try_inverse()
            .unwrap_or_else(Matrix4::identity);
        let far = inverse.transform_point(&Point3::new(ndc_x, ndc_y, 0.5));
        let direction = far - self.position;
        let direction = if direction.norm_squared() > f32::EPSILON {
            direction.normalize()
        } else {
            self.direction()
        };
        Ray { origin: self.position, direction }
    }

    /// Camera-facing rotation used to orient sprites.
    pub fn billboard(&self) -> Matrix4<f32> {
        let mut rotation = self.view().try_inverse().unwrap_or_else(Matrix4::identity);
        rotation[(0, 3)] = 0.0;
        rotation[(1, 3)] = 0.0;
        rotation[(2, 3)] = 0.0;
        rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_at_target_projects_to_center() {
        let camera = PerspectiveCamera::new(16.0 / 9.0);
        let ndc = camera.project(&Point3::origin());
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > -1.0 && ndc.z < 1.0);
    }

    #[test]
    fn center_ray_points_at_target() {
        let camera = PerspectiveCamera::new(1.5);
        let ray = camera.ray_from_ndc(0.0, 0.0);
        assert!((ray.direction - camera.direction()).norm() < 1e-4);
        assert_eq!(ray.origin, camera.position);
    }

    #[test]
    fn ray_round_trips_through_projection() {
        let camera = PerspectiveCamera::new(1.2);
        let world = Point3::new(4.0, 1.0, 3.0);
        let ndc = camera.project(&world);
        let ray = camera.ray_from_ndc(ndc.x, ndc.y);
        let expected = (world - camera.position).normalize();
        assert!((ray.direction - expected).norm() < 1e-3);
    }

    #[test]
    fn points_above_center_have_positive_ndc_y() {
        let camera = PerspectiveCamera::new(1.0);
        assert!(camera.project(&Point3::new(0.0, 3.0, 0.0)).y > 0.0);
        assert!(camera.project(&Point3::new(3.0, 0.0, 0.0)).x > 0.0);
    }
}
