//! The design wizard page, exported to JavaScript.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use customfit_forms::image_radio::ImageRadios;
use customfit_forms::wizard::{self, WizardDependencies, WizardOverlay};
use customfit_forms::{CompilationRegistry, FieldAccessor, Form, OverlayEngine};
use tracing::{debug, info};
use wasm_bindgen::prelude::*;

use crate::controls;
use crate::dom;
use crate::error::Result;
use crate::events::{self, EventBinding};
use crate::surface::DomSurface;

/// Everything wired onto one design wizard form. Keep it alive for as long
/// as the page is shown.
#[wasm_bindgen]
pub struct DesignWizardPage {
    form: Form,
    radios: Rc<RefCell<ImageRadios>>,
    _engine: OverlayEngine,
    _dependencies: WizardDependencies,
    _overlay: WizardOverlay,
    bindings: Vec<EventBinding>,
}

#[wasm_bindgen]
impl DesignWizardPage {
    /// Wire the wizard. `sources_json` maps schematic image names to URLs.
    #[wasm_bindgen(constructor)]
    pub fn new(
        prefix: Option<String>,
        target: &str,
        sources_json: &str,
    ) -> std::result::Result<DesignWizardPage, JsValue> {
        console_error_panic_hook::set_once();
        Ok(Self::mount(prefix.as_deref(), target, sources_json)?)
    }

    /// Show the neckline depth orientation option.
    #[wasm_bindgen(js_name = revealNecklineDepth)]
    pub fn reveal_neckline_depth(&self) -> std::result::Result<(), JsValue> {
        wizard::reveal_neckline_depth(&self.form).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Ignore image clicks for the radio group `field`.
    #[wasm_bindgen(js_name = disableImageGroup)]
    pub fn disable_image_group(&self, field: &str) {
        self.radios.borrow_mut().disable_group(field);
    }

    #[wasm_bindgen(js_name = enableImageGroup)]
    pub fn enable_image_group(&self, field: &str) {
        self.radios.borrow_mut().enable_group(field);
    }

    /// Let clicks on `image_id` select `value` of `field`.
    #[wasm_bindgen(js_name = bindImageRadio)]
    pub fn bind_image_radio(
        &mut self,
        image_id: &str,
        field: &str,
        value: &str,
    ) -> std::result::Result<(), JsValue> {
        self.radios
            .borrow_mut()
            .bind(&self.form, image_id, field, value)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let document = dom::document()?;
        let binding = events::bind_image_radio(&document, &self.form, &self.radios, image_id)?;
        self.bindings.push(binding);
        Ok(())
    }
}

impl DesignWizardPage {
    fn mount(prefix: Option<&str>, target: &str, sources_json: &str) -> Result<Self> {
        let document = dom::document()?;
        let surface = Rc::new(DomSurface::new(prefix)?);

        let mut builder = Form::builder().surface(surface.clone());
        if let Some(prefix) = prefix {
            builder = builder.prefix(prefix);
        }
        for (name, values) in wizard::wizard_fields() {
            let rendered = controls::field_controls(&document, prefix, name)?;
            let accessor = match controls::resolve_accessor(name, &rendered) {
                Some(accessor) => accessor,
                None if values.is_empty() => FieldAccessor::text_input(name),
                None => FieldAccessor::radio_group(name, values),
            };
            debug!(field = name, kind = %accessor.kind(), "field resolved");
            builder = builder.field(accessor);
        }
        let form = builder.build()?;

        let engine = OverlayEngine::new(form.clone(), CompilationRegistry::new());
        surface.connect(&engine);

        let dependencies = wizard::install_dependencies(&form)?;
        let sources: HashMap<String, String> = serde_json::from_str(sources_json)?;
        let overlay = wizard::install_overlay(&engine, target, sources)?;
        let bindings = events::bind_field_inputs(&document, &form, prefix)?;

        info!(fields = form.field_names().len(), listeners = bindings.len(), "design wizard mounted");
        Ok(Self {
            form,
            radios: Rc::new(RefCell::new(ImageRadios::new())),
            _engine: engine,
            _dependencies: dependencies,
            _overlay: overlay,
            bindings,
        })
    }
}
