//! Thin helpers over `web-sys` lookups.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, NodeList};

use crate::error::{Result, WebError};

pub fn document() -> Result<Document> {
    web_sys::window()
        .ok_or(WebError::NoWindow)?
        .document()
        .ok_or(WebError::NoDocument)
}

pub fn element_by_id(document: &Document, id: &str) -> Result<HtmlElement> {
    document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| WebError::ElementNotFound(id.to_string()))
}

pub fn query(document: &Document, selector: &str) -> Result<Element> {
    document
        .query_selector(selector)
        .map_err(|e| WebError::js(format!("invalid selector {selector}"), &e))?
        .ok_or_else(|| WebError::ElementNotFound(selector.to_string()))
}

/// Every element matching `selector`, in document order.
pub fn query_all(root: &Document, selector: &str) -> Result<Vec<Element>> {
    let nodes = root
        .query_selector_all(selector)
        .map_err(|e| WebError::js(format!("invalid selector {selector}"), &e))?;
    Ok(elements(&nodes))
}

/// Descendants of `root` matching `selector`, in document order.
pub fn query_all_within(root: &Element, selector: &str) -> Result<Vec<Element>> {
    let nodes = root
        .query_selector_all(selector)
        .map_err(|e| WebError::js(format!("invalid selector {selector}"), &e))?;
    Ok(elements(&nodes))
}

fn elements(nodes: &NodeList) -> Vec<Element> {
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn set_display(element: &HtmlElement, visible: bool) -> Result<()> {
    element
        .style()
        .set_property("display", display_value(visible))
        .map_err(|e| WebError::js("failed to set display", &e))
}

/// Inline `display` for a shown or hidden element. Shown removes the
/// override so the stylesheet decides.
pub const fn display_value(visible: bool) -> &'static str {
    if visible { "" } else { "none" }
}

/// Selector for the controls of `name`.
pub fn named(name: &str) -> String {
    format!("[name=\"{name}\"]")
}

/// Selector for the layer of `field` inside `target`.
pub fn layer_selector(target: &str, field: &str) -> String {
    format!("{target} img[data-for=\"{field}\"]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectors() {
        assert_eq!(named("wizard-garment_type"), "[name=\"wizard-garment_type\"]");
        assert_eq!(
            layer_selector("#schematic", "sleeve_length"),
            "#schematic img[data-for=\"sleeve_length\"]"
        );
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(true), "");
        assert_eq!(display_value(false), "none");
    }
}
