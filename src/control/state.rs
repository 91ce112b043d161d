use nalgebra::Point3;
use crate::config::AppConfig;
use crate::control::camera_controller::{CameraController, CameraMode, FrameClock};
use crate::control::labels::{LabelProjector, Viewport};
use crate::control::picking::{pick, pointer_to_ndc, PickTarget};
use crate::engine::camera::PerspectiveCamera;
use crate::scene::bodies::{self, BodyId, PLANETS, PLANET_COUNT};
use crate::scene::orbit::OrbitState;
use crate::scene::theme::Theme;

/// Pointer style hint for the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Default,
    Pointer,
}

impl CursorHint {
    pub fn css(self) -> &'static str {
        match self {
            CursorHint::Default => "",
            CursorHint::Pointer => "pointer",
        }
    }
}

/// Everything the animation loop mutates, in one place.
pub struct SceneState {
    pub orbit: OrbitState,
    pub controller: CameraController,
    pub camera: PerspectiveCamera,
    pub labels: LabelProjector,
    pub theme: Theme,
    pub viewport: Viewport,
}

impl SceneState {
    pub fn new(config: &AppConfig, viewport: Viewport) -> Self {
        SceneState {
            orbit: OrbitState::new(bodies::initial_speeds(), config.motion()),
            controller: CameraController::new(config.transition_easing, config.motion()),
            camera: PerspectiveCamera::new(viewport.width / viewport.height.max(1.0)),
            labels: LabelProjector::new(PLANET_COUNT),
            theme: Theme::Dark,
            viewport,
        }
    }

    pub fn planet_position(&self, id: BodyId) -> Point3<f32> {
        self.orbit.world_position(id.index(), id.descriptor().distance)
    }

    pub fn planet_positions(&self) -> Vec<Point3<f32>> {
        bodies::planet_ids().map(|id| self.planet_position(id)).collect()
    }

    /// Advances the orbits, then poses the camera against the new positions.
    pub fn update(&mut self, frame: &FrameClock) {
        self.orbit.advance(frame.dt);

        let orbit = &self.orbit;
        let pose = self
            .controller
            .update(frame, |id| orbit.world_position(id.index(), id.descriptor().distance));
        self.camera.position = pose.position;
        self.camera.look_at = pose.look_at;
    }

    /// Re-projects labels from the current camera. Call after drawing.
    pub fn project_labels(&mut self) {
        let positions = self.planet_positions();
        self.labels.project_all(&self.camera, &positions, self.viewport);
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.set_aspect(viewport.width, viewport.height);
    }

    pub fn set_speed(&mut self, index: usize, value: f32) {
        self.orbit.set_speed(index, value);
    }

    pub fn toggle_pause(&mut self) -> bool {
        let paused = self.orbit.toggle_pause();
        log::info!("orbits {}", if paused { "paused" } else { "resumed" });
        paused
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn reset_camera(&mut self) -> bool {
        self.controller.reset()
    }

    pub fn camera_mode(&self) -> &CameraMode {
        self.controller.mode()
    }

    fn hit_test(&self, client: (f32, f32)) -> Option<BodyId> {
        let (x, y) = pointer_to_ndc(client, self.viewport);
        let ray = self.camera.ray_from_ndc(x, y);
        let targets = bodies::planet_ids().map(|id| PickTarget {
            id,
            center: self.planet_position(id),
            radius: PLANETS[id.index()].radius,
        });
        pick(&ray, targets)
    }

    pub fn pointer_move(&mut self, client: (f32, f32)) -> CursorHint {
        let hit = self.hit_test(client);
        self.labels.apply_hover(hit, client);
        if hit.is_some() { CursorHint::Pointer } else { CursorHint::Default }
    }

    /// Starts following the body under the pointer, if any.
    pub fn pointer_down(&mut self, client: (f32, f32)) -> Option<BodyId> {
        let hit = self.hit_test(client);
        match hit {
            Some(id) => {
                log::debug!("pointer down hit {}", id.descriptor().name);
                self.controller.follow(id);
            }
            None => log::debug!("pointer down missed at {:?}", client),
        }
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::camera_controller::{DEFAULT_POSE, TRANSITION_DURATION};
    use crate::control::labels::LabelSource;
    use crate::scene::bodies::find_planet;

    const FRAME: f32 = 1.0 / 60.0;

    fn state() -> SceneState {
        SceneState::new(&AppConfig::default(), Viewport::new(1200.0, 800.0))
    }

    fn frame(i: usize) -> FrameClock {
        FrameClock { dt: FRAME, wall_ms: i as f64 * 1000.0 / 60.0 }
    }

    /// Client pixel position of a planet's center as seen by the current camera.
    fn screen_position(s: &SceneState, id: BodyId) -> (f32, f32) {
        let ndc = s.camera.project(&s.planet_position(id));
        s.viewport.ndc_to_pixels(ndc.x, ndc.y)
    }

    #[test]
    fn clicking_earth_follows_it_then_reset_returns_home() {
        let mut s = state();
        s.update(&frame(0));
        let earth = find_planet("Earth").unwrap();

        let hit = s.pointer_down(screen_position(&s, earth));
        assert_eq!(hit, Some(earth));
        assert_eq!(s.camera_mode(), &CameraMode::Following { target: earth });

        for i in 1..90 {
            s.update(&frame(i));
        }
        assert_eq!(s.camera.look_at, s.planet_position(earth));

        assert!(s.reset_camera());
        let mut i = 90;
        let mut elapsed = 0.0;
        while !matches!(s.camera_mode(), CameraMode::Default) {
            s.update(&frame(i));
            elapsed += FRAME;
            i += 1;
            assert!(elapsed < TRANSITION_DURATION + 2.0 * FRAME);
        }
        assert_eq!(s.camera.position, DEFAULT_POSE.position);
        assert_eq!(s.camera.look_at, DEFAULT_POSE.look_at);
    }

    #[test]
    fn clicking_empty_space_keeps_default_mode() {
        let mut s = state();
        s.update(&frame(0));
        assert_eq!(s.pointer_down((2.0, 2.0)), None);
        assert_eq!(s.camera_mode(), &CameraMode::Default);
    }

    #[test]
    fn hover_marks_labels_until_next_projection() {
        let mut s = state();
        s.update(&frame(0));
        let jupiter = find_planet("Jupiter").unwrap();
        let at = screen_position(&s, jupiter);

        assert_eq!(s.pointer_move(at), CursorHint::Pointer);
        let overlay = s.labels.get(jupiter).unwrap();
        assert!(overlay.visible);
        assert_eq!(overlay.source, LabelSource::Hovered);
        assert_eq!(s.labels.overlays().iter().filter(|o| o.visible).count(), 1);

        s.project_labels();
        assert!(s.labels.overlays().iter().all(|o| o.visible && o.source == LabelSource::Projected));

        assert_eq!(s.pointer_move((1.0, 1.0)), CursorHint::Default);
        assert!(s.labels.overlays().iter().all(|o| !o.visible));
    }

    #[test]
    fn followed_planet_is_tracked_while_paused() {
        let mut s = state();
        s.controller.follow(BodyId::new(1).unwrap());
        s.toggle_pause();
        for i in 0..30 {
            s.update(&frame(i));
            assert_eq!(s.camera.look_at, s.planet_position(BodyId::new(1).unwrap()));
        }
        assert_eq!(s.orbit.elapsed(), 0.0);
    }

    #[test]
    fn default_sweep_keeps_moving_while_paused() {
        let mut s = state();
        s.toggle_pause();
        s.update(&frame(0));
        let first = s.camera.position;
        for i in 1..60 {
            s.update(&frame(i));
        }
        assert_ne!(s.camera.position, first);
        assert_eq!(s.orbit.elapsed(), 0.0);
    }

    #[test]
    fn theme_toggles_back_and_forth() {
        let mut s = state();
        assert_eq!(s.toggle_theme(), Theme::Light);
        assert_eq!(s.toggle_theme(), Theme::Dark);
    }

    #[test]
    fn resize_updates_aspect() {
        let mut s = state();
        s.resize(Viewport::new(400.0, 400.0));
        assert_eq!(s.camera.aspect, 1.0);
    }
}
