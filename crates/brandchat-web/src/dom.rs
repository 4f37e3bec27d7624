use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, HtmlButtonElement, HtmlElement, HtmlTextAreaElement};

/// Get element by ID
pub fn get_element_by_id(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Element not found: {}", id)))
}

/// Get HTML element by ID
pub fn get_html_element_by_id(document: &Document, id: &str) -> Result<HtmlElement, JsValue> {
    let element = get_element_by_id(document, id)?;
    element
        .dyn_into::<HtmlElement>()
        .map_err(|_| JsValue::from_str(&format!("Element is not HtmlElement: {}", id)))
}

/// Get textarea element by ID
pub fn get_textarea_by_id(document: &Document, id: &str) -> Result<HtmlTextAreaElement, JsValue> {
    let element = get_element_by_id(document, id)?;
    element
        .dyn_into::<HtmlTextAreaElement>()
        .map_err(|_| JsValue::from_str(&format!("Element is not HtmlTextAreaElement: {}", id)))
}

/// Get button element by ID
pub fn get_button_by_id(document: &Document, id: &str) -> Result<HtmlButtonElement, JsValue> {
    let element = get_element_by_id(document, id)?;
    element
        .dyn_into::<HtmlButtonElement>()
        .map_err(|_| JsValue::from_str(&format!("Element is not HtmlButtonElement: {}", id)))
}

/// Attach a listener for `event_name` that lives as long as the page
pub fn add_listener<F>(element: &Element, event_name: &str, callback: F) -> Result<(), JsValue>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut(Event)>);
    element.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref())?;
    closure.forget(); // Keep the closure alive
    Ok(())
}

/// Nearest ancestor of the event target (inclusive) matching `selector`
pub fn closest_target(event: &Event, selector: &str) -> Option<Element> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    target.closest(selector).ok().flatten()
}

/// Show or hide element
pub fn set_visible(element: &HtmlElement, visible: bool) {
    let display = if visible { "" } else { "none" };
    let _ = element.style().set_property("display", display);
}

/// Reset an auto-grown textarea to its natural height
pub fn reset_height(textarea: &HtmlTextAreaElement) {
    let _ = textarea.style().set_property("height", "auto");
}

/// Grow a textarea to fit its content
pub fn fit_height(textarea: &HtmlTextAreaElement) {
    reset_height(textarea);
    let scroll_height = textarea.scroll_height();
    let _ = textarea
        .style()
        .set_property("height", &format!("{}px", scroll_height));
}

/// Scroll element to bottom
pub fn scroll_to_bottom(element: &Element) {
    element.set_scroll_top(element.scroll_height());
}
