//! Browser glue: finding elements, listening to events, Bootstrap modals.

pub mod budget;
pub mod chart;
pub mod currency_select;
pub mod expenses;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, Window};

use crate::config::{Ignored, PageConfig};

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

pub fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

/// Content of `<meta name="{name}">`, if present.
pub fn meta_content(document: &Document, name: &str) -> Option<String> {
    document
        .query_selector(&format!("meta[name=\"{name}\"]"))
        .ok()
        .flatten()
        .and_then(|meta| meta.get_attribute("content"))
}

pub fn read_page_config(document: &Document) -> (PageConfig, Vec<Ignored>) {
    PageConfig::from_meta(|name| meta_content(document, name))
}

/// All elements matching `selector`, cast to `T`. Elements of another type
/// are skipped.
pub fn query_all<T: JsCast>(root: &Document, selector: &str) -> Result<Vec<T>, JsValue> {
    let list = root.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<T>().ok())
        .collect())
}

pub fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<T>().ok())
}

/// Registers `handler` for `event` on `target` for the life of the page.
pub fn listen<F>(target: &EventTarget, event: &str, handler: F) -> Result<(), JsValue>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::wrap(Box::new(handler));
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Blocking `window.alert`.
pub fn alert(message: &str) {
    let shown = window().and_then(|window| window.alert_with_message(message));
    if let Err(err) = shown {
        log::warn!("could not show alert {message:?}: {err:?}");
    }
}

pub fn set_text(element: &Element, text: &str) {
    element.set_text_content(Some(text));
}

pub fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(err) = element.style().set_property(property, value) {
        log::warn!("could not set {property} on #{}: {err:?}", element.id());
    }
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = bootstrap, js_name = Modal)]
    type BootstrapModal;

    #[wasm_bindgen(catch, static_method_of = BootstrapModal, js_namespace = bootstrap, js_class = "Modal", js_name = getInstance)]
    fn get_instance(element: &Element) -> Result<Option<BootstrapModal>, JsValue>;

    #[wasm_bindgen(catch, constructor, js_namespace = bootstrap, js_class = "Modal")]
    fn new(element: &Element) -> Result<BootstrapModal, JsValue>;

    #[wasm_bindgen(method)]
    fn hide(this: &BootstrapModal);
}

/// Hides the `.modal` dialog enclosing `inner`, reusing Bootstrap's
/// controller for it or creating one.
pub fn hide_enclosing_modal(inner: &Element) {
    let modal_element = match inner.closest(".modal") {
        Ok(Some(element)) => element,
        _ => return,
    };

    let controller = match BootstrapModal::get_instance(&modal_element) {
        Ok(Some(existing)) => Ok(existing),
        Ok(None) => BootstrapModal::new(&modal_element),
        Err(err) => Err(err),
    };

    match controller {
        Ok(modal) => modal.hide(),
        Err(err) => log::warn!("could not close modal #{}: {err:?}", modal_element.id()),
    }
}
