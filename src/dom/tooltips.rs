use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};
use crate::control::labels::{LabelOverlay, LabelSource};
use crate::scene::bodies::PLANETS;

/// Floating name labels, one per planet, positioned in viewport pixels.
pub struct Tooltips {
    elements: Vec<HtmlElement>,
}

impl Tooltips {
    pub fn create(document: &Document) -> Result<Self, JsValue> {
        let body = document.body().ok_or("No body")?;
        let mut elements = Vec::with_capacity(PLANETS.len());
        for planet in PLANETS.iter() {
            let el = document.create_element("div")?.dyn_into::<HtmlElement>()?;
            el.set_class_name("planet-tooltip");
            el.set_text_content(Some(planet.name));
            let style = el.style();
            style.set_property("display", "none")?;
            style.set_property("position", "absolute")?;
            style.set_property("pointer-events", "none")?;
            body.append_child(&el)?;
            elements.push(el);
        }
        Ok(Tooltips { elements })
    }

    pub fn apply(&self, overlays: &[LabelOverlay]) {
        for (el, overlay) in self.elements.iter().zip(overlays) {
            let style = el.style();
            if !overlay.visible {
                style.set_property("display", "none").ok();
                continue;
            }
            let left = match overlay.source {
                LabelSource::Projected => overlay.x - el.offset_width() as f32 / 2.0,
                LabelSource::Hovered => overlay.x,
            };
            style.set_property("left", &format!("{}px", left)).ok();
            style.set_property("top", &format!("{}px", overlay.y)).ok();
            style.set_property("display", "block").ok();
        }
    }

    pub fn set_light_mode(&self, light: bool) {
        for el in &self.elements {
            el.class_list().toggle_with_force("lightmode", light).ok();
        }
    }
}
