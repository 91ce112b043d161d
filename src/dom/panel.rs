//! Side panel: one speed slider per planet, pause, theme, reset and the
//! collapse toggle. Handlers reach the running orrery through
//! [`crate::with_orrery`].

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, EventTarget, HtmlElement, HtmlInputElement};
use crate::scene::bodies::PLANETS;

pub const SLIDER_MIN: f32 = 0.05;
pub const SLIDER_MAX: f32 = 10.0;
pub const SLIDER_STEP: f32 = 0.01;

const RESET_BUTTON_ID: &str = "reset-camera-btn";

/// Slider text to a speed inside the slider range.
pub fn parse_slider(value: &str) -> Option<f32> {
    let v: f32 = value.trim().parse().ok()?;
    if v.is_finite() {
        Some(v.clamp(SLIDER_MIN, SLIDER_MAX))
    } else {
        None
    }
}

fn on<F>(target: &EventTarget, event: &str, handler: F) -> Result<(), JsValue>
where
    F: FnMut(web_sys::Event) + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn element(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("No #{}", id)))
}

pub fn setup(document: &Document, speeds: &[f32], light_label: &str) -> Result<(), JsValue> {
    setup_sliders(document, speeds)?;
    setup_pause(document)?;
    setup_theme(document, light_label)?;
    setup_reset(document)?;
    setup_collapse(document)?;
    Ok(())
}

fn setup_sliders(document: &Document, speeds: &[f32]) -> Result<(), JsValue> {
    let controls = element(document, "controls")?;
    controls.set_inner_html("");

    for (i, (planet, speed)) in PLANETS.iter().zip(speeds).enumerate() {
        let row = document.create_element("div")?;
        row.set_class_name("planet-control");

        let label = document.create_element("label")?;
        label.set_class_name("planet-label");
        label.set_text_content(Some(planet.name));
        label.set_attribute("for", &format!("slider-{}", i))?;

        let slider = document.create_element("input")?.dyn_into::<HtmlInputElement>()?;
        slider.set_type("range");
        slider.set_class_name("slider");
        slider.set_id(&format!("slider-{}", i));
        slider.set_min(&SLIDER_MIN.to_string());
        slider.set_max(&SLIDER_MAX.to_string());
        slider.set_step(&SLIDER_STEP.to_string());
        slider.set_value(&speed.to_string());
        slider.set_title(&format!("Adjust {} speed", planet.name));

        let readout = document.create_element("span")?;
        readout.set_class_name("slider-value");
        readout.set_text_content(Some(&slider.value()));

        let input = slider.clone();
        let shown = readout.clone();
        on(&slider, "input", move |_| {
            let raw = input.value();
            match parse_slider(&raw) {
                Some(value) => {
                    crate::with_orrery(|o| o.set_speed(i, value));
                    shown.set_text_content(Some(&raw));
                }
                None => log::warn!("ignoring slider value {:?}", raw),
            }
        })?;

        row.append_child(&label)?;
        row.append_child(&slider)?;
        row.append_child(&readout)?;
        controls.append_child(&row)?;
    }
    Ok(())
}

fn setup_pause(document: &Document) -> Result<(), JsValue> {
    let button = element(document, "pause-btn")?;
    let target = button.clone();
    on(&button, "click", move |_| {
        if let Some(paused) = crate::with_orrery(|o| o.toggle_pause()) {
            target.set_text_content(Some(if paused { "Resume" } else { "Pause" }));
        }
    })
}

fn setup_theme(document: &Document, label: &str) -> Result<(), JsValue> {
    let button = match document.get_element_by_id("theme-toggle-btn") {
        Some(button) => button,
        None => {
            let button = document.create_element("button")?.dyn_into::<HtmlElement>()?;
            button.set_id("theme-toggle-btn");
            button.set_class_name("theme-toggle-btn");
            button.style().set_property("margin-top", "12px")?;
            button.style().set_property("width", "100%")?;
            element(document, "controls-panel")?.append_child(&button)?;
            button.into()
        }
    };
    button.set_text_content(Some(label));

    let target = button.clone();
    on(&button, "click", move |_| {
        if let Some(caption) = crate::with_orrery(|o| o.toggle_theme()) {
            target.set_text_content(Some(caption));
        }
    })
}

fn setup_reset(document: &Document) -> Result<(), JsValue> {
    let button = element(document, RESET_BUTTON_ID)?;
    on(&button, "click", move |_| {
        crate::with_orrery(|o| o.reset_camera());
    })
}

fn setup_collapse(document: &Document) -> Result<(), JsValue> {
    let panel = element(document, "controls-panel")?;
    let button = element(document, "toggle-panel-btn")?;
    let target = button.clone();
    let mut collapsed = false;
    on(&button, "click", move |_| {
        collapsed = !collapsed;
        panel.class_list().toggle_with_force("collapsed", collapsed).ok();
        target
            .set_attribute("aria-label", if collapsed { "Show controls" } else { "Hide controls" })
            .ok();
        target.set_inner_html(if collapsed { "&#9776;" } else { "&#x22EE;" });
    })
}

pub fn set_reset_visible(document: &Document, visible: bool) {
    if let Some(button) = document
        .get_element_by_id(RESET_BUTTON_ID)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    {
        button
            .style()
            .set_property("display", if visible { "block" } else { "none" })
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_values_are_clamped() {
        assert_eq!(parse_slider("7.5"), Some(7.5));
        assert_eq!(parse_slider("0"), Some(SLIDER_MIN));
        assert_eq!(parse_slider("25"), Some(SLIDER_MAX));
        assert_eq!(parse_slider(" 1.25 "), Some(1.25));
    }

    #[test]
    fn slider_garbage_is_rejected() {
        assert_eq!(parse_slider(""), None);
        assert_eq!(parse_slider("fast"), None);
        assert_eq!(parse_slider("NaN"), None);
    }
}
