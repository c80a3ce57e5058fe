//! Field registry and signal dispatch.
//!
//! A [`Form`] owns every [`FieldAccessor`] on a page together with its
//! visibility and subscriptions. Handles are cheap clones of one shared,
//! single-threaded registry. Signals are dispatched synchronously in
//! registration order; the registry is never borrowed while a listener runs,
//! so listeners may freely read, write, show and hide other fields.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::error::{FormError, Result};
use crate::field::{FieldAccessor, FieldKind};
use crate::surface::{NullSurface, Spacing, Surface};

/// Callback run when a field signal fires.
pub type Listener = Rc<dyn Fn(&Form)>;

/// Lifecycle signals a field can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldSignal {
    Changed,
    Shown,
    Hidden,
}

/// Display state of a field's container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Not yet touched by any rule; rendered as the markup left it.
    #[default]
    Unknown,
    Shown,
    Hidden,
}

impl Visibility {
    pub const fn is_displayed(self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    /// Value changes, and the field being shown again.
    Refresh,
    Shown,
    Hidden,
}

impl Trigger {
    const fn fires_on(self, signal: FieldSignal) -> bool {
        matches!(
            (self, signal),
            (Self::Refresh, FieldSignal::Changed | FieldSignal::Shown)
                | (Self::Shown, FieldSignal::Shown)
                | (Self::Hidden, FieldSignal::Hidden)
        )
    }
}

struct FieldSlot {
    accessor: FieldAccessor,
    visibility: Visibility,
    listeners: Vec<(Trigger, Listener)>,
}

#[derive(Default)]
struct FormState {
    prefix: Option<String>,
    order: Vec<String>,
    fields: HashMap<String, FieldSlot>,
}

/// Shared handle to a page's fields.
#[derive(Clone)]
pub struct Form {
    state: Rc<RefCell<FormState>>,
    surface: Rc<dyn Surface>,
}

/// Non-owning handle, for closures the form itself keeps alive.
#[derive(Clone)]
pub struct WeakForm {
    state: Weak<RefCell<FormState>>,
    surface: Rc<dyn Surface>,
}

impl WeakForm {
    pub fn upgrade(&self) -> Option<Form> {
        self.state.upgrade().map(|state| Form {
            state,
            surface: Rc::clone(&self.surface),
        })
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("fields", &self.field_names())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Form`].
#[derive(Default)]
pub struct FormBuilder {
    prefix: Option<String>,
    surface: Option<Rc<dyn Surface>>,
    fields: Vec<FieldAccessor>,
}

impl FormBuilder {
    /// Prefix inserted between `div_id_` and the field name in container ids.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn surface(mut self, surface: Rc<dyn Surface>) -> Self {
        self.surface = Some(surface);
        self
    }

    #[must_use]
    pub fn field(mut self, accessor: FieldAccessor) -> Self {
        self.fields.push(accessor);
        self
    }

    /// Build the form, rejecting duplicate field names.
    pub fn build(self) -> Result<Form> {
        let surface = self.surface.unwrap_or_else(|| Rc::new(NullSurface));
        let form = Form {
            state: Rc::new(RefCell::new(FormState {
                prefix: self.prefix,
                ..FormState::default()
            })),
            surface,
        };
        self.fields
            .into_iter()
            .try_for_each(|accessor| form.register(accessor))?;
        Ok(form)
    }
}

/// Container id for `field` under an optional form prefix.
pub fn container_id(prefix: Option<&str>, field: &str) -> String {
    format!("div_id_{}{}", prefix.unwrap_or_default(), field)
}

impl Form {
    pub fn builder() -> FormBuilder {
        FormBuilder::default()
    }

    /// An empty form rendering onto `surface`.
    pub fn new(surface: Rc<dyn Surface>) -> Self {
        Self {
            state: Rc::new(RefCell::new(FormState::default())),
            surface,
        }
    }

    pub fn downgrade(&self) -> WeakForm {
        WeakForm {
            state: Rc::downgrade(&self.state),
            surface: Rc::clone(&self.surface),
        }
    }

    pub fn surface(&self) -> &dyn Surface {
        self.surface.as_ref()
    }

    pub fn register(&self, accessor: FieldAccessor) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let name = accessor.name().to_string();
        if state.fields.contains_key(&name) {
            return Err(FormError::DuplicateField(name));
        }
        debug!(field = %name, kind = %accessor.kind(), "field registered");
        state.order.push(name.clone());
        state.fields.insert(
            name,
            FieldSlot {
                accessor,
                visibility: Visibility::Unknown,
                listeners: Vec::new(),
            },
        );
        Ok(())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.state.borrow().fields.contains_key(field)
    }

    /// Fail with [`FormError::UnknownField`] unless `field` is registered.
    pub fn ensure(&self, field: &str) -> Result<()> {
        if self.contains(field) {
            Ok(())
        } else {
            Err(FormError::unknown_field(field))
        }
    }

    /// Field names in registration order.
    pub fn field_names(&self) -> Vec<String> {
        self.state.borrow().order.clone()
    }

    pub fn container_id(&self, field: &str) -> String {
        container_id(self.state.borrow().prefix.as_deref(), field)
    }

    pub fn kind(&self, field: &str) -> Result<FieldKind> {
        self.with_slot(field, |slot| slot.accessor.kind())
    }

    /// Clone of the accessor behind `field`.
    pub fn accessor(&self, field: &str) -> Result<FieldAccessor> {
        self.with_slot(field, |slot| slot.accessor.clone())
    }

    pub fn read(&self, field: &str) -> Result<Option<String>> {
        self.with_slot(field, |slot| slot.accessor.read())
    }

    pub fn visibility(&self, field: &str) -> Result<Visibility> {
        self.with_slot(field, |slot| slot.visibility)
    }

    pub fn is_displayed(&self, field: &str) -> Result<bool> {
        self.visibility(field).map(Visibility::is_displayed)
    }

    /// Programmatic write. Pushes the new control state to the surface but does
    /// not emit `Changed`; call [`Form::notify_changed`] for that.
    pub fn write(&self, field: &str, value: &str) -> Result<()> {
        let control = self.with_slot_mut(field, |slot| {
            slot.accessor.write(value);
            slot.accessor.control_state()
        })?;
        self.surface.control_state(field, &control);
        Ok(())
    }

    /// Empty the field and push the cleared state to the surface.
    pub fn clear(&self, field: &str) -> Result<()> {
        let control = self.with_slot_mut(field, |slot| {
            slot.accessor.clear();
            slot.accessor.control_state()
        })?;
        self.surface.control_state(field, &control);
        Ok(())
    }

    /// A user edit: store the value as entered and emit `Changed`.
    pub fn input(&self, field: &str, value: &str) -> Result<()> {
        self.with_slot_mut(field, |slot| slot.accessor.input(value))??;
        trace!(field, value, "field input");
        self.emit(field, FieldSignal::Changed);
        Ok(())
    }

    pub fn notify_changed(&self, field: &str) -> Result<()> {
        self.ensure(field)?;
        self.emit(field, FieldSignal::Changed);
        Ok(())
    }

    /// Display `field`. Emits `Shown` only when the field was not already shown.
    pub fn show(&self, field: &str) -> Result<()> {
        let transition = self.with_slot_mut(field, |slot| {
            (slot.visibility != Visibility::Shown).then(|| {
                slot.visibility = Visibility::Shown;
                slot.accessor.is_control_group()
            })
        })?;
        let Some(control_group) = transition else {
            return Ok(());
        };

        self.surface.field_visibility(field, true);
        if control_group {
            self.surface.field_spacing(field, Spacing::Spaced);
        }
        self.emit(field, FieldSignal::Shown);
        Ok(())
    }

    /// Hide and clear `field`. Emits `Hidden` only when the field was not
    /// already hidden, so a field is cleared once per transition.
    pub fn hide(&self, field: &str) -> Result<()> {
        let transition = self.with_slot_mut(field, |slot| {
            (slot.visibility != Visibility::Hidden).then(|| {
                slot.visibility = Visibility::Hidden;
                slot.accessor.clear();
                (slot.accessor.is_control_group(), slot.accessor.control_state())
            })
        })?;
        let Some((control_group, control)) = transition else {
            return Ok(());
        };

        self.surface.field_visibility(field, false);
        if control_group {
            self.surface.field_spacing(field, Spacing::Collapsed);
        }
        self.surface.control_state(field, &control);
        self.emit(field, FieldSignal::Hidden);
        Ok(())
    }

    /// Run `listener` on every value change and whenever the field is shown again.
    pub fn on_change(&self, field: &str, listener: impl Fn(&Self) + 'static) -> Result<()> {
        self.subscribe(field, Trigger::Refresh, Rc::new(listener))
    }

    pub fn on_shown(&self, field: &str, listener: impl Fn(&Self) + 'static) -> Result<()> {
        self.subscribe(field, Trigger::Shown, Rc::new(listener))
    }

    /// Run `listener` after the field has been hidden and cleared.
    pub fn on_hidden(&self, field: &str, listener: impl Fn(&Self) + 'static) -> Result<()> {
        self.subscribe(field, Trigger::Hidden, Rc::new(listener))
    }

    fn subscribe(&self, field: &str, trigger: Trigger, listener: Listener) -> Result<()> {
        self.with_slot_mut(field, |slot| slot.listeners.push((trigger, listener)))
    }

    fn emit(&self, field: &str, signal: FieldSignal) {
        // Snapshot so listeners can subscribe or mutate without a live borrow.
        let listeners: Vec<Listener> = self
            .state
            .borrow()
            .fields
            .get(field)
            .map(|slot| {
                slot.listeners
                    .iter()
                    .filter(|(trigger, _)| trigger.fires_on(signal))
                    .map(|(_, listener)| Rc::clone(listener))
                    .collect()
            })
            .unwrap_or_default();

        trace!(field, ?signal, listeners = listeners.len(), "dispatching signal");
        listeners.iter().for_each(|listener| listener(self));
    }

    fn with_slot<T>(&self, field: &str, f: impl FnOnce(&FieldSlot) -> T) -> Result<T> {
        self.state
            .borrow()
            .fields
            .get(field)
            .map(f)
            .ok_or_else(|| FormError::unknown_field(field))
    }

    fn with_slot_mut<T>(&self, field: &str, f: impl FnOnce(&mut FieldSlot) -> T) -> Result<T> {
        self.state
            .borrow_mut()
            .fields
            .get_mut(field)
            .map(f)
            .ok_or_else(|| FormError::unknown_field(field))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::cell::Cell;

    use super::*;
    use crate::field::ControlState;
    use crate::surface::{Effect, RecordingSurface};

    fn form_with(surface: &Rc<RecordingSurface>) -> Form {
        Form::builder()
            .surface(surface.clone())
            .field(FieldAccessor::text_input("stitches_length").in_control_group())
            .field(FieldAccessor::radio_group("garment_type", ["PULLOVER_VEST", "CARDIGAN_VEST"]))
            .build()
            .unwrap()
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let form = Form::new(Rc::new(NullSurface));
        form.register(FieldAccessor::text_input("bust_circ")).unwrap();
        let err = form.register(FieldAccessor::text_input("bust_circ")).unwrap_err();
        assert_eq!(err, FormError::DuplicateField("bust_circ".to_string()));
    }

    #[test]
    fn test_unknown_field_is_an_error() {
        let form = Form::new(Rc::new(NullSurface));
        assert_eq!(form.read("nope"), Err(FormError::unknown_field("nope")));
        assert!(form.on_change("nope", |_| {}).is_err());
    }

    #[test]
    fn test_container_id_uses_prefix() {
        let form = Form::builder().prefix("body-").build().unwrap();
        assert_eq!(form.container_id("bust_circ"), "div_id_body-bust_circ");
        assert_eq!(container_id(None, "bust_circ"), "div_id_bust_circ");
    }

    #[test]
    fn test_input_fires_change_listeners_in_order() {
        let surface = Rc::new(RecordingSurface::new());
        let form = form_with(&surface);
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            form.on_change("garment_type", move |f| {
                let value = f.read("garment_type").unwrap();
                seen.borrow_mut().push((tag, value));
            })
            .unwrap();
        }

        form.input("garment_type", "CARDIGAN_VEST").unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![
                ("first", Some("CARDIGAN_VEST".to_string())),
                ("second", Some("CARDIGAN_VEST".to_string())),
            ]
        );
    }

    #[test]
    fn test_write_does_not_emit_change() {
        let form = form_with(&Rc::new(RecordingSurface::new()));
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        form.on_change("stitches_length", move |_| counter.set(counter.get() + 1))
            .unwrap();

        form.write("stitches_length", "4").unwrap();
        assert_eq!(fired.get(), 0);
        form.notify_changed("stitches_length").unwrap();
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_hide_clears_once_per_transition() {
        let surface = Rc::new(RecordingSurface::new());
        let form = form_with(&surface);
        form.input("stitches_length", "4").unwrap();
        let hidden = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hidden);
        form.on_hidden("stitches_length", move |_| counter.set(counter.get() + 1))
            .unwrap();

        form.hide("stitches_length").unwrap();
        form.hide("stitches_length").unwrap();

        assert_eq!(hidden.get(), 1);
        assert_eq!(form.read("stitches_length").unwrap(), None);
        assert_eq!(form.visibility("stitches_length").unwrap(), Visibility::Hidden);
        assert!(surface.effects().contains(&Effect::ControlState {
            field: "stitches_length".to_string(),
            state: ControlState::Text(String::new()),
        }));
    }

    #[test]
    fn test_show_refreshes_change_listeners() {
        let form = form_with(&Rc::new(RecordingSurface::new()));
        let refreshed = Rc::new(Cell::new(0));
        let counter = Rc::clone(&refreshed);
        form.on_change("stitches_length", move |_| counter.set(counter.get() + 1))
            .unwrap();

        form.show("stitches_length").unwrap();
        form.show("stitches_length").unwrap();
        assert_eq!(refreshed.get(), 1);
    }

    #[test]
    fn test_control_group_spacing_follows_visibility() {
        let surface = Rc::new(RecordingSurface::new());
        let form = form_with(&surface);
        form.show("stitches_length").unwrap();
        form.hide("stitches_length").unwrap();
        form.show("garment_type").unwrap();

        let spacing: Vec<_> = surface
            .effects()
            .into_iter()
            .filter_map(|effect| match effect {
                Effect::FieldSpacing { field, spacing } => Some((field, spacing)),
                _ => None,
            })
            .collect();
        assert_eq!(
            spacing,
            vec![
                ("stitches_length".to_string(), Spacing::Spaced),
                ("stitches_length".to_string(), Spacing::Collapsed),
            ]
        );
    }

    #[test]
    fn test_listener_may_mutate_other_fields() {
        let form = form_with(&Rc::new(RecordingSurface::new()));
        form.on_change("garment_type", |f| {
            f.hide("stitches_length").unwrap();
        })
        .unwrap();
        form.input("garment_type", "PULLOVER_VEST").unwrap();
        assert_eq!(form.visibility("stitches_length").unwrap(), Visibility::Hidden);
    }

    #[test]
    fn test_weak_form_upgrades_while_alive() {
        let form = form_with(&Rc::new(RecordingSurface::new()));
        let weak = form.downgrade();
        assert!(weak.upgrade().is_some());
        drop(form);
        assert!(weak.upgrade().is_none());
    }
}
