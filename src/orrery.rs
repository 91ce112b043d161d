use nalgebra::{Matrix4, Point3, Vector3};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;
use web_sys::{Document, WebGlTexture};

use crate::config::AppConfig;
use crate::control::camera_controller::FrameClock;
use crate::control::labels::Viewport;
use crate::control::state::{CursorHint, SceneState};
use crate::dom::panel;
use crate::dom::tooltips::Tooltips;
use crate::engine::mesh::Mesh;
use crate::engine::renderer::{DrawParams, GpuMesh, GpuPoints, Renderer, Shading};
use crate::scene::bodies::{self, hex_to_rgb, BodyDescriptor, PLANETS, SUN, SUN_GLOW};
use crate::scene::glow::{glow_texture, GLOW_SIZE};
use crate::scene::theme::{Starfield, STAR_OPACITY, STAR_POINT_SIZE};

const SUN_GLOW_COLOR: u32 = 0xfff8b0;
const SUN_GLOW_OPACITY: f32 = 0.5;
const SPHERE_DETAIL: u16 = 44;
const SUN_DETAIL: u16 = 48;
const ORBIT_RING_SEGMENTS: u16 = 120;
const SATURN_RING_SEGMENTS: u16 = 64;
const SATURN_RING_KEY: &str = "Saturn ring";

struct PlanetAssets {
    sphere: GpuMesh,
    orbit_ring: GpuMesh,
    texture: Option<WebGlTexture>,
    ring: Option<(GpuMesh, Option<WebGlTexture>)>,
}

/// Owns the scene state, the GPU resources and the DOM overlays, and runs
/// one animation tick at a time.
pub struct Orrery {
    pub state: SceneState,
    renderer: Renderer,
    document: Document,
    tooltips: Tooltips,
    config: AppConfig,
    sun: GpuMesh,
    planets: Vec<PlanetAssets>,
    glow_quad: GpuMesh,
    glow: WebGlTexture,
    stars: Option<GpuPoints>,
    rng: SmallRng,
    last_frame_ms: Option<f64>,
    reset_visible: bool,
}

impl Orrery {
    pub fn new(renderer: Renderer, document: Document, config: AppConfig, viewport: Viewport) -> Result<Self, JsValue> {
        let state = SceneState::new(&config, viewport);
        let tooltips = Tooltips::create(&document)?;

        let sun = renderer.upload(&Mesh::sphere(SUN.radius, SUN_DETAIL, SUN_DETAIL, SUN.rgb()))?;
        let glow_quad = renderer.upload(&Mesh::quad())?;
        let glow = renderer.create_texture_rgba(GLOW_SIZE as i32, GLOW_SIZE as i32, &glow_texture(GLOW_SIZE))?;

        let mut planets = Vec::with_capacity(PLANETS.len());
        for planet in PLANETS.iter() {
            planets.push(load_planet(&renderer, &config, planet)?);
        }

        let mut orrery = Orrery {
            state,
            renderer,
            document,
            tooltips,
            config,
            sun,
            planets,
            glow_quad,
            glow,
            stars: None,
            rng: SmallRng::from_entropy(),
            last_frame_ms: None,
            reset_visible: false,
        };
        orrery.rebuild_stars()?;
        orrery.renderer.enable_depth_test();
        orrery.renderer.enable_blend();
        orrery.resize(viewport, 1.0);
        Ok(orrery)
    }

    /// One animation tick at host timestamp `now_ms`.
    pub fn frame(&mut self, now_ms: f64) {
        let dt = match self.last_frame_ms {
            Some(last) => ((now_ms - last) / 1000.0).max(0.0) as f32,
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);

        self.state.update(&FrameClock { dt, wall_ms: now_ms });
        self.render();
        self.state.project_labels();
        self.tooltips.apply(self.state.labels.overlays());
        self.sync_reset_button();
    }

    fn render(&self) {
        let r = &self.renderer;
        let camera = &self.state.camera;
        r.clear(self.state.theme.background());
        r.set_camera(&camera.view(), &camera.projection());

        if let Some(stars) = &self.stars {
            r.set_depth_write(false);
            r.draw_points(stars, STAR_POINT_SIZE, STAR_OPACITY);
            r.set_depth_write(true);
        }

        r.draw(&self.sun, &DrawParams {
            model: Matrix4::identity(),
            color: SUN.rgb(),
            opacity: 1.0,
            texture: None,
            shading: Shading::Unlit,
        });

        for (i, (planet, assets)) in PLANETS.iter().zip(&self.planets).enumerate() {
            let position = self.state.orbit.world_position(i, planet.distance);
            let body = Matrix4::new_translation(&position.coords)
                * Matrix4::from_axis_angle(&Vector3::y_axis(), self.state.orbit.spin_angle(i));

            r.draw(&assets.sphere, &DrawParams {
                model: body,
                color: planet.rgb(),
                opacity: 1.0,
                texture: assets.texture.as_ref(),
                shading: Shading::Lit { emissive: emissive(planet) },
            });

            r.draw(&assets.orbit_ring, &DrawParams {
                model: Matrix4::new_translation(&Vector3::new(0.0, 0.001, 0.0)),
                color: hex_to_rgb(bodies::ORBIT_RING_COLOR),
                opacity: bodies::ORBIT_RING_OPACITY,
                texture: None,
                shading: Shading::Unlit,
            });

            if let Some((ring, texture)) = &assets.ring {
                r.draw(ring, &DrawParams {
                    model: body * Matrix4::new_translation(&Vector3::new(0.0, 0.01, 0.0)),
                    color: (1.0, 1.0, 1.0),
                    opacity: bodies::SATURN_RING_OPACITY,
                    texture: texture.as_ref(),
                    shading: Shading::Unlit,
                });
            }
        }

        // Halos last, without depth writes
        r.set_depth_write(false);
        self.draw_glow(&Point3::origin(), SUN_GLOW, hex_to_rgb(SUN_GLOW_COLOR), SUN_GLOW_OPACITY);
        for (i, planet) in PLANETS.iter().enumerate().filter(|(_, p)| p.has_glow()) {
            let position = self.state.orbit.world_position(i, planet.distance);
            self.draw_glow(
                &position,
                planet.radius * bodies::PLANET_GLOW_SCALE,
                planet.rgb(),
                bodies::PLANET_GLOW_OPACITY,
            );
        }
        r.set_depth_write(true);
    }

    fn draw_glow(&self, at: &Point3<f32>, scale: f32, color: (f32, f32, f32), opacity: f32) {
        let model = Matrix4::new_translation(&at.coords)
            * self.state.camera.billboard()
            * Matrix4::new_nonuniform_scaling(&Vector3::new(scale, scale, 1.0));
        self.renderer.draw(&self.glow_quad, &DrawParams {
            model,
            color,
            opacity,
            texture: Some(&self.glow),
            shading: Shading::Unlit,
        });
    }

    fn sync_reset_button(&mut self) {
        let visible = self.state.controller.reset_control_visible();
        if visible != self.reset_visible {
            panel::set_reset_visible(&self.document, visible);
            self.reset_visible = visible;
        }
    }

    fn rebuild_stars(&mut self) -> Result<(), JsValue> {
        let field = Starfield::generate(self.config.star_count, self.state.theme, &mut self.rng);
        let points = self.renderer.upload_points(&field.vertices)?;
        if let Some(old) = self.stars.replace(points) {
            self.renderer.release_points(old);
        }
        Ok(())
    }

    /// `viewport` is in CSS pixels; the drawing buffer is scaled by `pixel_ratio`.
    pub fn resize(&mut self, viewport: Viewport, pixel_ratio: f64) {
        self.state.resize(viewport);
        let width = (viewport.width as f64 * pixel_ratio).round() as u32;
        let height = (viewport.height as f64 * pixel_ratio).round() as u32;
        if let Some(canvas) = self.renderer.canvas() {
            canvas.set_width(width);
            canvas.set_height(height);
            let style = canvas.style();
            style.set_property("width", &format!("{}px", viewport.width)).ok();
            style.set_property("height", &format!("{}px", viewport.height)).ok();
        }
        self.renderer.resize(width as i32, height as i32);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> CursorHint {
        let hint = self.state.pointer_move((x, y));
        self.tooltips.apply(self.state.labels.overlays());
        hint
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if self.state.pointer_down((x, y)).is_some() {
            self.sync_reset_button();
        }
    }

    pub fn set_speed(&mut self, index: usize, value: f32) {
        self.state.set_speed(index, value);
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.state.toggle_pause()
    }

    /// Switches theme and returns the new caption for the theme button.
    pub fn toggle_theme(&mut self) -> &'static str {
        let theme = self.state.toggle_theme();
        if let Some(body) = self.document.body() {
            body.class_list().toggle_with_force("lightmode", !theme.is_dark()).ok();
        }
        self.tooltips.set_light_mode(!theme.is_dark());
        if let Err(e) = self.rebuild_stars() {
            log::error!("starfield rebuild failed: {:?}", e);
        }
        theme.toggle_label()
    }

    pub fn reset_camera(&mut self) -> bool {
        let started = self.state.reset_camera();
        self.sync_reset_button();
        started
    }
}

fn load_planet(renderer: &Renderer, config: &AppConfig, planet: &BodyDescriptor) -> Result<PlanetAssets, JsValue> {
    let sphere = renderer.upload(&Mesh::sphere(planet.radius, SPHERE_DETAIL, SPHERE_DETAIL, planet.rgb()))?;
    let orbit_ring = renderer.upload(&Mesh::ring(
        planet.distance - bodies::ORBIT_RING_HALF_WIDTH,
        planet.distance + bodies::ORBIT_RING_HALF_WIDTH,
        ORBIT_RING_SEGMENTS,
        (1.0, 1.0, 1.0),
    ))?;
    let texture = load_texture(renderer, config.texture(planet.name));

    let ring = if planet.has_ring() {
        let mesh = renderer.upload(&Mesh::ring(
            planet.radius * bodies::SATURN_RING_INNER,
            planet.radius * bodies::SATURN_RING_OUTER,
            SATURN_RING_SEGMENTS,
            (1.0, 1.0, 1.0),
        ))?;
        Some((mesh, load_texture(renderer, config.texture(SATURN_RING_KEY))))
    } else {
        None
    };

    Ok(PlanetAssets { sphere, orbit_ring, texture, ring })
}

fn load_texture(renderer: &Renderer, url: Option<&str>) -> Option<WebGlTexture> {
    let url = url?;
    match renderer.create_texture(url) {
        Ok(texture) => Some(texture),
        Err(e) => {
            log::warn!("could not create texture for {}: {:?}", url, e);
            None
        }
    }
}

/// Base color pulled a little toward white, scaled by the body's emissive intensity.
fn emissive(planet: &BodyDescriptor) -> (f32, f32, f32) {
    let (r, g, b) = planet.rgb();
    let k = planet.emissive_intensity();
    let lift = |c: f32| (c + (1.0 - c) * 0.15) * k;
    (lift(r), lift(g), lift(b))
}
