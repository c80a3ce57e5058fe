//! Value-mapped image overlays.
//!
//! A compilation target is a shared container stacking one image layer per
//! controlling field. When a field changes, its mapping picks a source, the
//! surface loads it off-document, and only once it has loaded is the old layer
//! for that field swapped out. A failed load leaves the old layer in place.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::form::Form;
use crate::surface::{ImageRequest, LoadTicket, Surface};

/// Class given to a configured compilation container.
pub const COMPILATION_CLASS: &str = "compilation-configured";

/// Class given to each loaded layer.
pub const COMPILATION_LAYER_CLASS: &str = "compilation-layer";

/// What a computed source can see.
pub struct OverlayContext<'a> {
    form: &'a Form,
    value: Option<&'a str>,
}

impl<'a> OverlayContext<'a> {
    pub const fn form(&self) -> &'a Form {
        self.form
    }

    /// Value of the controlling field.
    pub const fn value(&self) -> Option<&'a str> {
        self.value
    }

    /// Read another field; unknown fields read as empty.
    pub fn read(&self, field: &str) -> Option<String> {
        self.form.read(field).ok().flatten()
    }
}

/// Computes an image source from the page state.
pub type SourceFn = Rc<dyn Fn(&OverlayContext<'_>) -> Option<String>>;

/// A mapping entry.
#[derive(Clone)]
pub enum LayerSource {
    Static(String),
    Computed(SourceFn),
}

impl LayerSource {
    fn resolve(&self, context: &OverlayContext<'_>) -> Option<String> {
        match self {
            Self::Static(source) => Some(source.clone()),
            Self::Computed(f) => f(context),
        }
    }
}

impl fmt::Debug for LayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(source) => f.debug_tuple("Static").field(source).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Controlling value to image source, with an explicit fallback for values
/// that have no entry (including an empty field).
#[derive(Debug, Clone, Default)]
pub struct OverlayMapping {
    entries: HashMap<String, LayerSource>,
    fallback: Option<LayerSource>,
}

impl OverlayMapping {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entry(mut self, value: impl Into<String>, source: impl Into<String>) -> Self {
        self.entries
            .insert(value.into(), LayerSource::Static(source.into()));
        self
    }

    #[must_use]
    pub fn computed(
        mut self,
        value: impl Into<String>,
        f: impl Fn(&OverlayContext<'_>) -> Option<String> + 'static,
    ) -> Self {
        self.entries
            .insert(value.into(), LayerSource::Computed(Rc::new(f)));
        self
    }

    #[must_use]
    pub fn fallback(mut self, source: impl Into<String>) -> Self {
        self.fallback = Some(LayerSource::Static(source.into()));
        self
    }

    #[must_use]
    pub fn computed_fallback(
        mut self,
        f: impl Fn(&OverlayContext<'_>) -> Option<String> + 'static,
    ) -> Self {
        self.fallback = Some(LayerSource::Computed(Rc::new(f)));
        self
    }

    /// Entry for the exact value, else the fallback. A computed entry that
    /// yields nothing does not fall through to the fallback.
    pub fn lookup(&self, value: Option<&str>) -> Option<&LayerSource> {
        value
            .and_then(|v| self.entries.get(v))
            .or(self.fallback.as_ref())
    }

    pub fn resolve(&self, context: &OverlayContext<'_>) -> Option<String> {
        self.lookup(context.value)
            .and_then(|source| source.resolve(context))
    }
}

#[derive(Debug, Default)]
struct Compilation {
    /// Controlling field to the source of its attached layer.
    layers: BTreeMap<String, String>,
    /// Latest request generation per field; older loads are stale.
    generations: HashMap<String, u64>,
}

#[derive(Debug)]
struct PendingLoad {
    target: String,
    field: String,
    source: String,
    generation: u64,
}

#[derive(Debug, Default)]
struct RegistryState {
    targets: HashMap<String, Compilation>,
    pending: HashMap<LoadTicket, PendingLoad>,
    next_ticket: u64,
}

/// Owner of every compilation target on a page.
#[derive(Debug, Clone, Default)]
pub struct CompilationRegistry {
    state: Rc<RefCell<RegistryState>>,
}

impl CompilationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `target` if it is not known yet.
    pub fn configure(&self, target: &str) {
        let mut state = self.state.borrow_mut();
        if !state.targets.contains_key(target) {
            debug!(target, "compilation configured");
            state
                .targets
                .insert(target.to_string(), Compilation::default());
        }
    }

    /// Attached layers of `target` as (field, source), ordered by field.
    pub fn layers(&self, target: &str) -> Vec<(String, String)> {
        self.state
            .borrow()
            .targets
            .get(target)
            .map(|c| {
                c.layers
                    .iter()
                    .map(|(field, source)| (field.clone(), source.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn layer(&self, target: &str, field: &str) -> Option<String> {
        self.state
            .borrow()
            .targets
            .get(target)
            .and_then(|c| c.layers.get(field).cloned())
    }

    pub fn pending_loads(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Ask `surface` to load `source` for `field`, superseding earlier loads.
    pub fn request(&self, surface: &dyn Surface, target: &str, field: &str, source: &str) {
        let request = {
            let mut state = self.state.borrow_mut();
            let ticket = LoadTicket(state.next_ticket);
            state.next_ticket = state.next_ticket.wrapping_add(1);
            let generation = bump_generation(&mut state, target, field);
            state.pending.insert(
                ticket,
                PendingLoad {
                    target: target.to_string(),
                    field: field.to_string(),
                    source: source.to_string(),
                    generation,
                },
            );
            ImageRequest {
                ticket,
                target: target.to_string(),
                field: field.to_string(),
                source: source.to_string(),
            }
        };
        debug!(target, field, source, ticket = request.ticket.0, "layer requested");
        surface.request_image(&request);
    }

    /// The image for `ticket` finished loading. Swaps the layer in unless a
    /// newer request or a detach superseded it. Returns whether it was attached.
    pub fn complete(&self, surface: &dyn Surface, ticket: LoadTicket) -> bool {
        let swap = {
            let mut state = self.state.borrow_mut();
            let Some(load) = state.pending.remove(&ticket) else {
                warn!(ticket = ticket.0, "completion for unknown image load");
                return false;
            };
            let Some(compilation) = state.targets.get_mut(&load.target) else {
                return false;
            };
            if compilation.generations.get(&load.field) != Some(&load.generation) {
                debug!(field = %load.field, ticket = ticket.0, "stale layer discarded");
                return false;
            }
            let replaced = compilation
                .layers
                .insert(load.field.clone(), load.source.clone())
                .is_some();
            (load, replaced)
        };

        let (load, replaced) = swap;
        if replaced {
            surface.layer_detached(&load.target, &load.field);
        }
        surface.layer_attached(&load.target, &load.field, &load.source);
        debug!(target = %load.target, field = %load.field, source = %load.source, "layer swapped");
        true
    }

    /// Cancel in-flight loads for `field` without touching its layer.
    pub fn supersede(&self, target: &str, field: &str) {
        let mut state = self.state.borrow_mut();
        bump_generation(&mut state, target, field);
    }

    /// The image for `ticket` failed to load. The previous layer stays.
    pub fn fail(&self, ticket: LoadTicket) {
        if let Some(load) = self.state.borrow_mut().pending.remove(&ticket) {
            debug!(field = %load.field, source = %load.source, "layer failed to load, keeping previous");
        }
    }

    /// Remove the layer for `field` and cancel its in-flight loads.
    pub fn detach(&self, surface: &dyn Surface, target: &str, field: &str) {
        let removed = {
            let mut state = self.state.borrow_mut();
            bump_generation(&mut state, target, field);
            state
                .targets
                .get_mut(target)
                .and_then(|c| c.layers.remove(field))
                .is_some()
        };
        if removed {
            surface.layer_detached(target, field);
        }
    }
}

fn bump_generation(state: &mut RegistryState, target: &str, field: &str) -> u64 {
    let compilation = state.targets.entry(target.to_string()).or_default();
    let generation = compilation.generations.entry(field.to_string()).or_insert(0);
    *generation = generation.wrapping_add(1);
    *generation
}

struct OverlayBinding {
    target: String,
    field: String,
    mapping: OverlayMapping,
    registry: CompilationRegistry,
}

impl OverlayBinding {
    fn update(&self, form: &Form) -> Result<Option<String>> {
        // A hidden field carries no layer until it is shown again.
        if !form.is_displayed(&self.field)? {
            return Ok(None);
        }
        let value = form.read(&self.field)?;
        let context = OverlayContext {
            form,
            value: value.as_deref(),
        };
        let source = self.mapping.resolve(&context);
        match &source {
            Some(source) => {
                self.registry
                    .request(form.surface(), &self.target, &self.field, source);
            }
            // The attached layer stays, but a load for an earlier value must not land.
            None => self.registry.supersede(&self.target, &self.field),
        }
        Ok(source)
    }

    fn refresh(&self, form: &Form) {
        if let Err(err) = self.update(form) {
            warn!(field = %self.field, error = %err, "overlay update failed");
        }
    }
}

/// Installed overlay for one (target, field) pair.
#[derive(Clone)]
pub struct OverlayHandle {
    binding: Rc<OverlayBinding>,
}

impl OverlayHandle {
    /// Resolve and request the current layer. Returns the resolved source.
    pub fn update(&self, form: &Form) -> Result<Option<String>> {
        self.binding.update(form)
    }

    /// Also refresh whenever `field` changes, for computed sources reading it.
    pub fn follow(&self, form: &Form, field: &str) -> Result<()> {
        let binding = Rc::clone(&self.binding);
        form.on_change(field, move |f| binding.refresh(f))
    }

    pub fn field(&self) -> &str {
        &self.binding.field
    }

    pub fn target(&self) -> &str {
        &self.binding.target
    }
}

impl fmt::Debug for OverlayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayHandle")
            .field("target", &self.binding.target)
            .field("field", &self.binding.field)
            .finish_non_exhaustive()
    }
}

/// Binds overlay mappings to a form and routes image load completions.
#[derive(Debug, Clone)]
pub struct OverlayEngine {
    form: Form,
    registry: CompilationRegistry,
}

impl OverlayEngine {
    pub fn new(form: Form, registry: CompilationRegistry) -> Self {
        Self { form, registry }
    }

    pub const fn registry(&self) -> &CompilationRegistry {
        &self.registry
    }

    pub const fn form(&self) -> &Form {
        &self.form
    }

    /// Bind `mapping` for `field` into `target` and request the initial layer.
    pub fn bind(
        &self,
        target: &str,
        field: &str,
        mapping: OverlayMapping,
    ) -> Result<OverlayHandle> {
        self.form.ensure(field)?;
        self.registry.configure(target);

        let binding = Rc::new(OverlayBinding {
            target: target.to_string(),
            field: field.to_string(),
            mapping,
            registry: self.registry.clone(),
        });

        let on_change = Rc::clone(&binding);
        self.form.on_change(field, move |f| on_change.refresh(f))?;
        let on_hidden = Rc::clone(&binding);
        self.form.on_hidden(field, move |f| {
            on_hidden
                .registry
                .detach(f.surface(), &on_hidden.target, &on_hidden.field);
        })?;

        let handle = OverlayHandle { binding };
        handle.update(&self.form)?;
        Ok(handle)
    }

    pub fn image_loaded(&self, ticket: LoadTicket) -> bool {
        self.registry.complete(self.form.surface(), ticket)
    }

    pub fn image_failed(&self, ticket: LoadTicket) {
        self.registry.fail(ticket);
    }
}
