//! Screen placement of planet name labels.
//!
//! Two writers share the overlay state: the per-frame projector and the
//! pointer-move hover handler. Whichever ran last wins; the source of the
//! current placement is recorded in [`LabelSource`].

use nalgebra::Point3;
use crate::engine::camera::PerspectiveCamera;
use crate::scene::bodies::BodyId;

/// Pixels between a planet's projected center and its label.
pub const LABEL_LIFT: f32 = 36.0;
/// Hover tooltip offset from the pointer.
pub const HOVER_OFFSET: (f32, f32) = (16.0, -8.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    /// Placed by the per-frame projection. `x` is the label's horizontal center.
    Projected,
    /// Placed by the hover handler. `x` is the label's left edge.
    Hovered,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelOverlay {
    pub x: f32,
    pub y: f32,
    pub visible: bool,
    pub source: LabelSource,
}

impl Default for LabelOverlay {
    fn default() -> Self {
        LabelOverlay { x: 0.0, y: 0.0, visible: false, source: LabelSource::Projected }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Viewport { width, height }
    }

    /// Normalized device coordinates to CSS pixels, origin top-left.
    pub fn ndc_to_pixels(&self, ndc_x: f32, ndc_y: f32) -> (f32, f32) {
        ((ndc_x * 0.5 + 0.5) * self.width, (-ndc_y * 0.5 + 0.5) * self.height)
    }
}

pub struct LabelProjector {
    overlays: Vec<LabelOverlay>,
}

impl LabelProjector {
    pub fn new(count: usize) -> Self {
        LabelProjector { overlays: vec![LabelOverlay::default(); count] }
    }

    pub fn overlays(&self) -> &[LabelOverlay] {
        &self.overlays
    }

    pub fn get(&self, id: BodyId) -> Option<&LabelOverlay> {
        self.overlays.get(id.index())
    }

    /// Places every label above its body and shows it.
    pub fn project_all(&mut self, camera: &PerspectiveCamera, positions: &[Point3<f32>], viewport: Viewport) {
        for (overlay, world) in self.overlays.iter_mut().zip(positions) {
            let ndc = camera.project(world);
            let (x, y) = viewport.ndc_to_pixels(ndc.x, ndc.y);
            *overlay = LabelOverlay {
                x,
                y: y - LABEL_LIFT,
                visible: true,
                source: LabelSource::Projected,
            };
        }
    }

    /// Shows only the hovered body's label, next to the pointer.
    pub fn apply_hover(&mut self, hit: Option<BodyId>, pointer: (f32, f32)) {
        for (i, overlay) in self.overlays.iter_mut().enumerate() {
            overlay.source = LabelSource::Hovered;
            if hit.map(BodyId::index) == Some(i) {
                overlay.x = pointer.0 + HOVER_OFFSET.0;
                overlay.y = pointer.1 + HOVER_OFFSET.1;
                overlay.visible = true;
            } else {
                overlay.visible = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(800.0 / 600.0)
    }

    #[test]
    fn ndc_corners_map_to_viewport_corners() {
        let vp = Viewport::new(800.0, 600.0);
        assert_eq!(vp.ndc_to_pixels(-1.0, 1.0), (0.0, 0.0));
        assert_eq!(vp.ndc_to_pixels(1.0, -1.0), (800.0, 600.0));
        assert_eq!(vp.ndc_to_pixels(0.0, 0.0), (400.0, 300.0));
    }

    #[test]
    fn projected_labels_sit_above_body() {
        let mut labels = LabelProjector::new(2);
        let vp = Viewport::new(800.0, 600.0);
        labels.project_all(&camera(), &[Point3::origin(), Point3::new(10.0, 0.0, 0.0)], vp);

        let centered = labels.get(BodyId::new(0).unwrap()).unwrap();
        assert!((centered.x - 400.0).abs() < 1e-2);
        assert!((centered.y - (300.0 - LABEL_LIFT)).abs() < 1e-2);
        assert!(labels.overlays().iter().all(|o| o.visible && o.source == LabelSource::Projected));
        assert!(labels.get(BodyId::new(1).unwrap()).unwrap().x > 400.0);
    }

    #[test]
    fn hover_shows_only_hit_label_at_pointer() {
        let mut labels = LabelProjector::new(3);
        labels.project_all(&camera(), &[Point3::origin(); 3], Viewport::new(800.0, 600.0));
        labels.apply_hover(Some(BodyId::new(1).unwrap()), (100.0, 200.0));

        let hit = labels.get(BodyId::new(1).unwrap()).unwrap();
        assert_eq!((hit.x, hit.y), (116.0, 192.0));
        assert!(hit.visible);
        assert!(!labels.get(BodyId::new(0).unwrap()).unwrap().visible);
        assert!(!labels.get(BodyId::new(2).unwrap()).unwrap().visible);
        assert!(labels.overlays().iter().all(|o| o.source == LabelSource::Hovered));
    }

    #[test]
    fn hover_miss_hides_everything() {
        let mut labels = LabelProjector::new(4);
        labels.apply_hover(None, (5.0, 5.0));
        assert!(labels.overlays().iter().all(|o| !o.visible));
    }

    #[test]
    fn next_projection_overrides_hover() {
        let mut labels = LabelProjector::new(2);
        labels.apply_hover(None, (0.0, 0.0));
        labels.project_all(&camera(), &[Point3::origin(); 2], Viewport::new(640.0, 480.0));
        assert!(labels.overlays().iter().all(|o| o.visible && o.source == LabelSource::Projected));
    }
}
