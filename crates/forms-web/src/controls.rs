//! Rendered form controls, read into plain data.
//!
//! The server decides whether a field renders as a `<select>`, a single
//! `<input>` or a set of radio inputs. [`Control`] captures what was rendered
//! so the accessor shape and every control update are decided without a
//! browser; only [`describe`] and [`apply`] touch the DOM.

use customfit_forms::form::container_id;
use customfit_forms::{ControlState, FieldAccessor};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement, HtmlOptionElement, HtmlSelectElement};

use crate::dom;
use crate::error::Result;

/// One rendered control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Select { value: String, options: Vec<String> },
    Input { kind: String, value: String, checked: bool },
}

/// What to do to a rendered control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlUpdate {
    Value(String),
    Checked(bool),
}

impl Control {
    pub fn select<I, S>(value: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Select {
            value: value.into(),
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    pub fn input(kind: impl Into<String>, value: impl Into<String>, checked: bool) -> Self {
        Self::Input {
            kind: kind.into(),
            value: value.into(),
            checked,
        }
    }

    fn is_checkable(&self) -> bool {
        matches!(self, Self::Input { kind, .. } if kind == "radio" || kind == "checkbox")
    }

    fn is_hidden_input(&self) -> bool {
        matches!(self, Self::Input { kind, .. } if kind == "hidden")
    }

    /// Current value, or `None` for an unchecked radio or checkbox.
    pub fn value(&self) -> Option<String> {
        match self {
            Self::Select { value, .. } => Some(value.clone()),
            Self::Input { checked: false, .. } if self.is_checkable() => None,
            Self::Input { value, .. } => Some(value.clone()),
        }
    }

    /// How this control shows `state`, whichever accessor produced it.
    /// Checkable inputs are checked when their value is the one selected;
    /// everything else takes the value, empty when the state has none.
    pub fn update(&self, state: &ControlState) -> ControlUpdate {
        let wanted = match state {
            ControlState::Selected(value) | ControlState::Checked(value) => value.as_deref(),
            ControlState::Text(value) => Some(value.as_str()),
        };
        match self {
            Self::Input { value, .. } if self.is_checkable() => {
                ControlUpdate::Checked(wanted == Some(value.as_str()))
            }
            _ => ControlUpdate::Value(wanted.unwrap_or_default().to_string()),
        }
    }
}

/// Accessor for `name` matching its rendered controls: a select makes a
/// dropdown, a lone input a text input, several inputs a radio group. The
/// rendered value is carried over. `None` when nothing is rendered.
pub fn resolve_accessor(name: &str, controls: &[Control]) -> Option<FieldAccessor> {
    let select = controls
        .iter()
        .find(|control| matches!(control, Control::Select { .. }));
    if let Some(Control::Select { value, options }) = select {
        let accessor =
            FieldAccessor::dropdown(name, options.iter().filter(|o| !o.is_empty()).cloned());
        return Some(with_rendered_value(accessor, Some(value.clone())));
    }

    let inputs: Vec<&Control> = controls
        .iter()
        .filter(|control| !control.is_hidden_input())
        .collect();
    let accessor = match inputs.as_slice() {
        [] => return None,
        [_] => FieldAccessor::text_input(name),
        many => FieldAccessor::radio_group(
            name,
            many.iter().filter_map(|control| match control {
                Control::Input { value, .. } => Some(value.clone()),
                Control::Select { .. } => None,
            }),
        ),
    };
    let rendered = inputs.iter().find_map(|control| control.value());
    Some(with_rendered_value(accessor, rendered))
}

fn with_rendered_value(accessor: FieldAccessor, value: Option<String>) -> FieldAccessor {
    match value.filter(|v| !v.is_empty()) {
        Some(value) => accessor.with_value(value),
        None => accessor,
    }
}

/// Read a `<select>` or `<input>` element.
pub fn describe(element: &Element) -> Option<Control> {
    if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
        let options = dom::query_all_within(element, "option")
            .unwrap_or_default()
            .iter()
            .filter_map(|option| option.dyn_ref::<HtmlOptionElement>().map(HtmlOptionElement::value))
            .collect::<Vec<_>>();
        return Some(Control::select(select.value(), options));
    }
    let input = element.dyn_ref::<HtmlInputElement>()?;
    Some(Control::input(input.type_(), input.value(), input.checked()))
}

pub fn apply(element: &Element, update: &ControlUpdate) {
    match update {
        ControlUpdate::Value(value) => {
            if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
                select.set_value(value);
            } else if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
                input.set_value(value);
            }
        }
        ControlUpdate::Checked(checked) => {
            if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
                input.set_checked(*checked);
            }
        }
    }
}

/// Controls rendered inside the container of `field`, in document order.
pub fn field_controls(document: &Document, prefix: Option<&str>, field: &str) -> Result<Vec<Control>> {
    let id = container_id(prefix, field);
    Ok(dom::query_all(document, &format!("#{id} select, #{id} input"))?
        .iter()
        .filter_map(describe)
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::rc::Rc;

    use customfit_forms::wizard::{self, GARMENT_TYPE};
    use customfit_forms::{Effect, FieldKind, Form, RecordingSurface};

    use super::*;

    fn stitch_select() -> Control {
        Control::select("", ["", "1x1 rib", "garter"])
    }

    #[test]
    fn test_select_resolves_to_dropdown_before_inputs() {
        let controls = [Control::input("text", "", false), Control::select("garter", ["", "garter"])];
        let accessor = resolve_accessor("neck_edging_stitch", &controls).unwrap();
        assert_eq!(accessor.kind(), FieldKind::Dropdown);
        assert_eq!(accessor.read().as_deref(), Some("garter"));
    }

    #[test]
    fn test_single_input_resolves_to_text_input() {
        let controls = [Control::input("number", "1.5", false)];
        let accessor = resolve_accessor("neck_edging_height", &controls).unwrap();
        assert_eq!(accessor.kind(), FieldKind::TextInput);
        assert_eq!(accessor.read().as_deref(), Some("1.5"));
    }

    #[test]
    fn test_several_inputs_resolve_to_radio_group() {
        let controls = [
            Control::input("hidden", "token", false),
            Control::input("radio", "SLEEVE_SHORT", false),
            Control::input("radio", "SLEEVE_FULL", true),
        ];
        let accessor = resolve_accessor("sleeve_length", &controls).unwrap();
        assert_eq!(accessor.kind(), FieldKind::RadioGroup);
        assert_eq!(accessor.read().as_deref(), Some("SLEEVE_FULL"));
    }

    #[test]
    fn test_nothing_rendered_resolves_to_none() {
        assert!(resolve_accessor("bell_type", &[]).is_none());
    }

    #[test]
    fn test_unchecked_radio_has_no_value() {
        assert_eq!(Control::input("radio", "NECK_VEE", false).value(), None);
        assert_eq!(Control::input("text", "36", false).value().as_deref(), Some("36"));
        assert_eq!(stitch_select().value().as_deref(), Some(""));
    }

    #[test]
    fn test_updates_follow_the_rendered_element() {
        let cleared = ControlState::Text(String::new());
        assert_eq!(stitch_select().update(&cleared), ControlUpdate::Value(String::new()));
        assert_eq!(
            Control::input("text", "3", false).update(&ControlState::Selected(Some("4".into()))),
            ControlUpdate::Value("4".to_string())
        );

        let crew = Control::input("radio", "NECK_CREW", true);
        assert_eq!(
            crew.update(&ControlState::Checked(Some("NECK_VEE".into()))),
            ControlUpdate::Checked(false)
        );
        assert_eq!(
            crew.update(&ControlState::Checked(Some("NECK_CREW".into()))),
            ControlUpdate::Checked(true)
        );
    }

    #[test]
    fn test_hiding_a_select_backed_field_clears_the_select() {
        // Given a vest whose sleeve edging stitch renders as a select
        let surface = Rc::new(RecordingSurface::new());
        let mut builder = Form::builder().surface(surface.clone());
        for (name, values) in wizard::wizard_fields() {
            let rendered: Vec<Control> = if name.ends_with("_stitch") {
                vec![Control::select("garter", ["", "1x1 rib", "garter"])]
            } else if values.is_empty() {
                vec![Control::input("text", "", false)]
            } else {
                values
                    .iter()
                    .map(|value| Control::input("radio", *value, false))
                    .collect()
            };
            builder = builder.field(resolve_accessor(name, &rendered).unwrap());
        }
        let form = builder.build().unwrap();
        form.write(GARMENT_TYPE, "PULLOVER_SLEEVED").unwrap();
        wizard::install_dependencies(&form).unwrap();
        surface.take();

        // When
        form.input(GARMENT_TYPE, "PULLOVER_VEST").unwrap();

        // Then
        let pushed = surface.take().into_iter().find_map(|effect| match effect {
            Effect::ControlState { field, state } if field == "sleeve_edging_stitch" => Some(state),
            _ => None,
        });
        let state = pushed.unwrap();
        assert_eq!(state, ControlState::Selected(None));
        assert_eq!(
            Control::select("garter", ["", "1x1 rib", "garter"]).update(&state),
            ControlUpdate::Value(String::new())
        );
        assert_eq!(form.read("sleeve_edging_stitch").unwrap(), None);
    }
}
