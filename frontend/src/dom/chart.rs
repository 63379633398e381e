use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use crate::chart::{CategoryPieChart, CategoryPieChartProps, DATA_ENDPOINT, HOST_ID};
use crate::currency::CurrencyCode;

/// A `<canvas>` placeholder cannot hold markup, so it is swapped for a
/// `<div>` with the same id and classes.
fn chart_host(document: &Document, placeholder: Element) -> Result<Element, JsValue> {
    if !placeholder.tag_name().eq_ignore_ascii_case("canvas") {
        return Ok(placeholder);
    }

    let host = document.create_element("div")?;
    host.set_id(&placeholder.id());
    host.set_class_name(&placeholder.class_name());
    if let Some(style) = placeholder.get_attribute("style") {
        host.set_attribute("style", &style)?;
    }
    placeholder.replace_with_with_node_1(&host)?;
    Ok(host)
}

/// Renders the category chart when the page has a slot for it.
pub fn mount(document: &Document, currency: CurrencyCode) -> Result<bool, JsValue> {
    let Some(placeholder) = document.get_element_by_id(HOST_ID) else {
        return Ok(false);
    };

    let endpoint = placeholder
        .get_attribute("data-endpoint")
        .unwrap_or_else(|| DATA_ENDPOINT.to_string());
    let host = chart_host(document, placeholder)?;

    yew::Renderer::<CategoryPieChart>::with_root_and_props(
        host,
        CategoryPieChartProps {
            endpoint: endpoint.into(),
            currency,
        },
    )
    .render();
    Ok(true)
}
