use nalgebra::Point3;
use crate::control::labels::Viewport;
use crate::engine::camera::Ray;
use crate::scene::bodies::BodyId;

/// Client pixel coordinates to normalized device coordinates (Y up).
pub fn pointer_to_ndc(client: (f32, f32), viewport: Viewport) -> (f32, f32) {
    (
        client.0 / viewport.width * 2.0 - 1.0,
        -(client.1 / viewport.height) * 2.0 + 1.0,
    )
}

/// Distance along `ray` to the nearest point of the sphere, if it is hit in
/// front of the origin.
pub fn intersect_sphere(ray: &Ray, center: &Point3<f32>, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(&ray.direction);
    let c = oc.norm_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let near = -b - root;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -b + root;
    if far >= 0.0 { Some(far) } else { None }
}

/// A pickable sphere.
#[derive(Debug, Clone, Copy)]
pub struct PickTarget {
    pub id: BodyId,
    pub center: Point3<f32>,
    pub radius: f32,
}

/// Nearest body hit by `ray`.
pub fn pick(ray: &Ray, targets: impl IntoIterator<Item = PickTarget>) -> Option<BodyId> {
    targets
        .into_iter()
        .filter_map(|t| intersect_sphere(ray, &t.center, t.radius).map(|d| (d, t.id)))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, id)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn ray_down_z() -> Ray {
        Ray { origin: Point3::new(0.0, 0.0, 50.0), direction: -Vector3::z() }
    }

    #[test]
    fn pointer_corners() {
        let vp = Viewport::new(1000.0, 500.0);
        assert_eq!(pointer_to_ndc((0.0, 0.0), vp), (-1.0, 1.0));
        assert_eq!(pointer_to_ndc((1000.0, 500.0), vp), (1.0, -1.0));
        assert_eq!(pointer_to_ndc((500.0, 250.0), vp), (0.0, 0.0));
    }

    #[test]
    fn sphere_hit_distance() {
        let d = intersect_sphere(&ray_down_z(), &Point3::origin(), 2.0).unwrap();
        assert!((d - 48.0).abs() < 1e-4);
    }

    #[test]
    fn sphere_miss_and_behind() {
        assert!(intersect_sphere(&ray_down_z(), &Point3::new(5.0, 0.0, 0.0), 1.0).is_none());
        assert!(intersect_sphere(&ray_down_z(), &Point3::new(0.0, 0.0, 60.0), 1.0).is_none());
    }

    #[test]
    fn origin_inside_sphere_hits_far_side() {
        let ray = Ray { origin: Point3::origin(), direction: Vector3::x() };
        let d = intersect_sphere(&ray, &Point3::origin(), 3.0).unwrap();
        assert!((d - 3.0).abs() < 1e-5);
    }

    #[test]
    fn pick_returns_nearest() {
        let targets = [
            PickTarget { id: BodyId::new(4).unwrap(), center: Point3::new(0.0, 0.0, -10.0), radius: 2.5 },
            PickTarget { id: BodyId::new(2).unwrap(), center: Point3::new(0.0, 0.0, 10.0), radius: 1.0 },
            PickTarget { id: BodyId::new(7).unwrap(), center: Point3::new(9.0, 0.0, 0.0), radius: 1.0 },
        ];
        assert_eq!(pick(&ray_down_z(), targets), Some(BodyId::new(2).unwrap()));
        assert_eq!(pick(&ray_down_z(), targets[2..].iter().copied()), None);
    }
}
