pub mod config;
pub mod control;
pub mod dom;
pub mod engine;
pub mod orrery;
pub mod scene;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlCanvasElement, PointerEvent, Request, RequestInit, RequestMode, Response, WebGlRenderingContext, Window};
use std::cell::RefCell;
use std::rc::Rc;
use crate::config::AppConfig;
use crate::control::labels::Viewport;
use crate::engine::renderer::Renderer;
use crate::orrery::Orrery;

const CONFIG_URL: &str = "/assets/config.json";

thread_local! {
    static ORRERY: RefCell<Option<Orrery>> = RefCell::new(None);
}

/// Runs `f` against the live orrery. `None` before start-up has finished.
pub(crate) fn with_orrery<R>(f: impl FnOnce(&mut Orrery) -> R) -> Option<R> {
    ORRERY.with(|cell| cell.borrow_mut().as_mut().map(f))
}

#[wasm_bindgen]
pub async fn init_orrery() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;

    let loaded = fetch_config(&window).await;
    let config = loaded.clone().unwrap_or_default();
    let _ = console_log::init_with_level(config.log_level());
    if let Err(reason) = loaded {
        log::warn!("using default config: {}", reason);
    }

    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()?;
    document
        .get_element_by_id("container")
        .ok_or("No #container")?
        .append_child(&canvas)?;

    let gl = canvas
        .get_context("webgl")?
        .ok_or("No WebGL")?
        .dyn_into::<WebGlRenderingContext>()?;
    let renderer = Renderer::new(gl)?;

    let viewport = window_viewport(&window)?;
    let mut orrery = Orrery::new(renderer, document.clone(), config, viewport)?;
    orrery.resize(viewport, window.device_pixel_ratio());
    let speeds: Vec<f32> = (0..scene::bodies::PLANET_COUNT).map(|i| orrery.state.orbit.speed(i)).collect();
    let theme_label = orrery.state.theme.toggle_label();
    ORRERY.with(|cell| *cell.borrow_mut() = Some(orrery));

    dom::panel::setup(&document, &speeds, theme_label)?;
    dom::panel::set_reset_visible(&document, false);

    // Pointer input
    let move_canvas = canvas.clone();
    let on_move = Closure::wrap(Box::new(move |event: PointerEvent| {
        let hint = with_orrery(|o| o.pointer_move(event.client_x() as f32, event.client_y() as f32));
        if let Some(hint) = hint {
            move_canvas.style().set_property("cursor", hint.css()).ok();
        }
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("pointermove", on_move.as_ref().unchecked_ref())?;
    on_move.forget();

    let on_down = Closure::wrap(Box::new(move |event: PointerEvent| {
        with_orrery(|o| o.pointer_down(event.client_x() as f32, event.client_y() as f32));
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("pointerdown", on_down.as_ref().unchecked_ref())?;
    on_down.forget();

    // Responsive
    let resize_window = window.clone();
    let on_resize = Closure::wrap(Box::new(move || {
        match window_viewport(&resize_window) {
            Ok(viewport) => {
                let ratio = resize_window.device_pixel_ratio();
                with_orrery(|o| o.resize(viewport, ratio));
            }
            Err(e) => log::warn!("resize: {:?}", e),
        }
    }) as Box<dyn FnMut()>);
    window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
    on_resize.forget();

    // Animation loop
    let f: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();

    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
        with_orrery(|o| o.frame(timestamp));
        if let Some(callback) = f.borrow().as_ref() {
            if let Err(e) = request_animation_frame(callback) {
                log::error!("animation loop stopped: {:?}", e);
            }
        }
    }) as Box<dyn FnMut(f64)>));

    if let Some(callback) = g.borrow().as_ref() {
        request_animation_frame(callback)?;
    }

    log::info!("solar-orrery: initialized with {} planets", scene::bodies::PLANET_COUNT);
    Ok(())
}

fn request_animation_frame(f: &Closure<dyn FnMut(f64)>) -> Result<i32, JsValue> {
    web_sys::window()
        .ok_or("No window")?
        .request_animation_frame(f.as_ref().unchecked_ref())
}

fn window_viewport(window: &Window) -> Result<Viewport, JsValue> {
    let width = window.inner_width()?.as_f64().ok_or("innerWidth is not a number")?;
    let height = window.inner_height()?.as_f64().ok_or("innerHeight is not a number")?;
    Ok(Viewport::new(width as f32, height as f32))
}

/// Fetches and decodes the app config. Any failure is reported as a string
/// so start-up can fall back to defaults.
async fn fetch_config(window: &Window) -> Result<AppConfig, String> {
    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(CONFIG_URL, &opts).map_err(|e| format!("{:?}", e))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| format!("fetch failed: {:?}", e))?;
    let resp: Response = resp_value.dyn_into().map_err(|_| "not a Response".to_string())?;
    if !resp.ok() {
        return Err(format!("{} returned {}", CONFIG_URL, resp.status()));
    }
    let json = JsFuture::from(resp.json().map_err(|e| format!("{:?}", e))?)
        .await
        .map_err(|e| format!("invalid JSON: {:?}", e))?;
    serde_wasm_bindgen::from_value(json).map_err(|e| e.to_string())
}

#[wasm_bindgen]
pub fn reset_camera() {
    with_orrery(|o| o.reset_camera());
}

/// Sets a planet's orbit speed by name; `false` if no such planet.
#[wasm_bindgen]
pub fn set_planet_speed(name: &str, speed: f32) -> bool {
    match scene::bodies::find_planet(name) {
        Some(id) => with_orrery(|o| o.set_speed(id.index(), speed)).is_some(),
        None => false,
    }
}
