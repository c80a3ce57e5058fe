//! [`Surface`] implementation that renders onto the live document.

use std::cell::RefCell;
use std::collections::HashMap;

use customfit_forms::form::container_id;
use customfit_forms::overlay::{COMPILATION_CLASS, COMPILATION_LAYER_CLASS};
use customfit_forms::{
    CompilationRegistry, ControlState, ImageRequest, LoadTicket, OverlayEngine, Spacing, Surface,
    WeakForm,
};
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlImageElement};

use crate::controls;
use crate::dom;
use crate::error::{Result, WebError};

/// Where completed image loads are reported.
#[derive(Clone)]
struct LoadSink {
    form: WeakForm,
    registry: CompilationRegistry,
}

impl LoadSink {
    fn report(&self, ticket: LoadTicket, loaded: bool) {
        let Some(form) = self.form.upgrade() else {
            return;
        };
        let engine = OverlayEngine::new(form, self.registry.clone());
        if loaded {
            engine.image_loaded(ticket);
        } else {
            engine.image_failed(ticket);
        }
    }
}

/// Renders form effects with inline styles and off-document image loads.
pub struct DomSurface {
    document: Document,
    prefix: Option<String>,
    sink: RefCell<Option<LoadSink>>,
    /// Latest image requested per (target, field), attached once loaded.
    loading: RefCell<HashMap<(String, String), HtmlImageElement>>,
}

impl DomSurface {
    pub fn new(prefix: Option<&str>) -> Result<Self> {
        Ok(Self {
            document: dom::document()?,
            prefix: prefix.map(str::to_string),
            sink: RefCell::new(None),
            loading: RefCell::new(HashMap::new()),
        })
    }

    /// Route image completions to `engine`. Holds the form weakly.
    pub fn connect(&self, engine: &OverlayEngine) {
        *self.sink.borrow_mut() = Some(LoadSink {
            form: engine.form().downgrade(),
            registry: engine.registry().clone(),
        });
    }

    fn control_name(&self, field: &str) -> String {
        format!("{}{field}", self.prefix.as_deref().unwrap_or_default())
    }

    fn try_field_visibility(&self, field: &str, visible: bool) -> Result<()> {
        let id = container_id(self.prefix.as_deref(), field);
        dom::set_display(&dom::element_by_id(&self.document, &id)?, visible)
    }

    fn try_field_spacing(&self, field: &str, spacing: Spacing) -> Result<()> {
        let id = container_id(self.prefix.as_deref(), field);
        dom::element_by_id(&self.document, &id)?
            .style()
            .set_property("margin-bottom", spacing.margin_bottom())
            .map_err(|e| WebError::js("failed to set margin", &e))
    }

    fn try_control_state(&self, field: &str, state: &ControlState) -> Result<()> {
        let rendered = dom::query_all(&self.document, &dom::named(&self.control_name(field)))?;
        for element in rendered {
            if let Some(control) = controls::describe(&element) {
                controls::apply(&element, &control.update(state));
            }
        }
        Ok(())
    }

    fn try_element_visibility(&self, element_id: &str, visible: bool) -> Result<()> {
        dom::set_display(&dom::element_by_id(&self.document, element_id)?, visible)
    }

    fn try_request_image(&self, request: &ImageRequest) -> Result<()> {
        let sink = self.sink.borrow().clone();
        let Some(sink) = sink else {
            warn!(field = %request.field, "image requested before the surface was connected");
            return Ok(());
        };
        let image = self
            .document
            .create_element("img")
            .map_err(|e| WebError::js("failed to create image", &e))?
            .dyn_into::<HtmlImageElement>()
            .map_err(|_| WebError::ElementNotFound("img".to_string()))?;

        let ticket = request.ticket;
        let on_load = sink.clone();
        let onload = Closure::once_into_js(move || on_load.report(ticket, true));
        let onerror = Closure::once_into_js(move || sink.report(ticket, false));
        image.set_onload(Some(onload.unchecked_ref::<js_sys::Function>()));
        image.set_onerror(Some(onerror.unchecked_ref::<js_sys::Function>()));
        image.set_src(&request.source);

        self.loading
            .borrow_mut()
            .insert((request.target.clone(), request.field.clone()), image);
        Ok(())
    }

    fn try_layer_attached(&self, target: &str, field: &str, source: &str) -> Result<()> {
        let container = dom::query(&self.document, target)?;
        // Only ever called from an onload handler, so the image is ready.
        let pending = self
            .loading
            .borrow_mut()
            .remove(&(target.to_string(), field.to_string()));
        let image = match pending {
            Some(image) => image,
            None => self
                .document
                .create_element("img")
                .map_err(|e| WebError::js("failed to create image", &e))?
                .dyn_into::<HtmlImageElement>()
                .map_err(|_| WebError::ElementNotFound("img".to_string()))?,
        };
        image.set_src(source);
        image.set_class_name(COMPILATION_LAYER_CLASS);
        image
            .set_attribute("data-for", field)
            .map_err(|e| WebError::js("failed to tag layer", &e))?;
        container
            .class_list()
            .add_1(COMPILATION_CLASS)
            .map_err(|e| WebError::js("failed to mark compilation", &e))?;
        container
            .append_child(&image)
            .map_err(|e| WebError::js("failed to attach layer", &e))?;
        Ok(())
    }

    fn try_layer_detached(&self, target: &str, field: &str) -> Result<()> {
        for layer in dom::query_all(&self.document, &dom::layer_selector(target, field))? {
            layer.remove();
        }
        Ok(())
    }
}

fn report(operation: &str, result: Result<()>) {
    if let Err(err) = result {
        warn!(operation, error = %err, "surface update failed");
    }
}

impl Surface for DomSurface {
    fn field_visibility(&self, field: &str, visible: bool) {
        report("field_visibility", self.try_field_visibility(field, visible));
    }

    fn field_spacing(&self, field: &str, spacing: Spacing) {
        report("field_spacing", self.try_field_spacing(field, spacing));
    }

    fn control_state(&self, field: &str, state: &ControlState) {
        report("control_state", self.try_control_state(field, state));
    }

    fn element_visibility(&self, element_id: &str, visible: bool) {
        report("element_visibility", self.try_element_visibility(element_id, visible));
    }

    fn element_text(&self, element_id: &str, text: &str) {
        report(
            "element_text",
            dom::element_by_id(&self.document, element_id).map(|e| e.set_text_content(Some(text))),
        );
    }

    fn request_image(&self, request: &ImageRequest) {
        debug!(field = %request.field, source = %request.source, "loading layer image");
        report("request_image", self.try_request_image(request));
    }

    fn layer_attached(&self, target: &str, field: &str, source: &str) {
        report("layer_attached", self.try_layer_attached(target, field, source));
    }

    fn layer_detached(&self, target: &str, field: &str) {
        report("layer_detached", self.try_layer_detached(target, field));
    }
}
