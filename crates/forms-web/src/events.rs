//! DOM event wiring: user edits become [`Form::input`] calls.

use std::cell::RefCell;
use std::rc::Rc;

use customfit_forms::image_radio::ImageRadios;
use customfit_forms::Form;
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, HtmlInputElement};

use crate::controls;
use crate::dom;
use crate::error::{Result, WebError};

/// A registered DOM listener. Dropping it without [`EventBinding::remove`]
/// leaves the listener attached but invalidates the callback.
pub struct EventBinding {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl EventBinding {
    pub fn remove(self) -> Result<()> {
        self.target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref())
            .map_err(|e| WebError::js(format!("failed to remove {} listener", self.event), &e))
    }
}

pub fn listen(
    target: &EventTarget,
    event: &'static str,
    handler: impl FnMut(Event) + 'static,
) -> Result<EventBinding> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(|e| WebError::js(format!("failed to add {event} listener"), &e))?;
    Ok(EventBinding {
        target: target.clone(),
        event,
        closure,
    })
}

/// Current value of a control, or `None` for an unchecked radio.
pub fn control_value(element: &Element) -> Option<String> {
    controls::describe(element).and_then(|control| control.value())
}

fn event_name(element: &Element) -> &'static str {
    match element.dyn_ref::<HtmlInputElement>().map(HtmlInputElement::type_) {
        Some(kind) if kind == "radio" || kind == "checkbox" => "change",
        Some(_) => "input",
        None => "change",
    }
}

/// Forward edits of every registered field's controls into `form`.
pub fn bind_field_inputs(
    document: &Document,
    form: &Form,
    prefix: Option<&str>,
) -> Result<Vec<EventBinding>> {
    let mut bindings = Vec::new();
    for field in form.field_names() {
        let name = format!("{}{field}", prefix.unwrap_or_default());
        for control in dom::query_all(document, &dom::named(&name))? {
            let form = form.clone();
            let field = field.clone();
            let event = event_name(&control);
            let binding = listen(&control, event, move |event: Event| {
                let value = event
                    .target()
                    .and_then(|target| target.dyn_into::<Element>().ok())
                    .and_then(|element| control_value(&element));
                if let Some(value) = value {
                    if let Err(err) = form.input(&field, &value) {
                        warn!(field = %field, error = %err, "input rejected");
                    }
                }
            })?;
            bindings.push(binding);
        }
    }
    Ok(bindings)
}

/// Select the radio option bound to `image_id` when the image is clicked.
pub fn bind_image_radio(
    document: &Document,
    form: &Form,
    radios: &Rc<RefCell<ImageRadios>>,
    image_id: &str,
) -> Result<EventBinding> {
    let element = dom::element_by_id(document, image_id)?;
    let form = form.clone();
    let radios = Rc::clone(radios);
    let id = image_id.to_string();
    listen(&element, "click", move |_| {
        if let Err(err) = radios.borrow().click(&form, &id) {
            warn!(image = %id, error = %err, "image radio click failed");
        }
    })
}
