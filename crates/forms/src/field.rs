//! Field accessors.
//!
//! A logical field is backed by exactly one control shape, chosen when the
//! accessor is built: a dropdown, a single text input or a radio group. Every
//! shape answers the same read/write/clear calls.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FormError, Result};
use crate::numeric::{is_numeric, parse_float};
use crate::units::write_rescale;

/// The control shape behind a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Dropdown,
    TextInput,
    RadioGroup,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dropdown => write!(f, "dropdown"),
            Self::TextInput => write!(f, "text input"),
            Self::RadioGroup => write!(f, "radio group"),
        }
    }
}

/// One option of a radio group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioMember {
    pub value: String,
    pub checked: bool,
}

/// Underlying control state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Representation {
    /// An empty `options` list accepts any value.
    Dropdown {
        options: Vec<String>,
        selected: Option<String>,
    },
    TextInput {
        value: String,
    },
    RadioGroup {
        members: Vec<RadioMember>,
    },
}

/// Snapshot pushed to a surface after a programmatic write or clear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ControlState {
    Selected(Option<String>),
    Text(String),
    Checked(Option<String>),
}

/// Uniform read/write access to a named field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAccessor {
    name: String,
    representation: Representation,
    rescale: Option<f64>,
    default: Option<String>,
    control_group: bool,
}

impl FieldAccessor {
    /// A dropdown restricted to `options`.
    pub fn dropdown<I, S>(name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_representation(
            name,
            Representation::Dropdown {
                options: options.into_iter().map(Into::into).collect(),
                selected: None,
            },
        )
    }

    /// A single free-text input.
    pub fn text_input(name: impl Into<String>) -> Self {
        Self::with_representation(
            name,
            Representation::TextInput {
                value: String::new(),
            },
        )
    }

    /// A radio group with one member per value, none checked.
    pub fn radio_group<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_representation(
            name,
            Representation::RadioGroup {
                members: values
                    .into_iter()
                    .map(|value| RadioMember {
                        value: value.into(),
                        checked: false,
                    })
                    .collect(),
            },
        )
    }

    fn with_representation(name: impl Into<String>, representation: Representation) -> Self {
        Self {
            name: name.into(),
            representation,
            rescale: None,
            default: None,
            control_group: false,
        }
    }

    /// Start with `value` already entered, as a re-rendered form would.
    #[must_use]
    pub fn with_value(mut self, value: impl AsRef<str>) -> Self {
        self.store(value.as_ref());
        self
    }

    /// Value reported by a radio group with nothing checked.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Multiply numeric writes by `factor` and round.
    #[must_use]
    pub const fn with_rescale(mut self, factor: f64) -> Self {
        self.rescale = Some(factor);
        self
    }

    /// Configure rescaling from the unit add-on label next to the control.
    #[must_use]
    pub fn with_unit_label(mut self, label: &str) -> Self {
        self.rescale = write_rescale(label);
        self
    }

    /// Mark the container as a control group, which gets bottom spacing when shown.
    #[must_use]
    pub const fn in_control_group(mut self) -> Self {
        self.control_group = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn kind(&self) -> FieldKind {
        match self.representation {
            Representation::Dropdown { .. } => FieldKind::Dropdown,
            Representation::TextInput { .. } => FieldKind::TextInput,
            Representation::RadioGroup { .. } => FieldKind::RadioGroup,
        }
    }

    pub const fn representation(&self) -> &Representation {
        &self.representation
    }

    pub const fn is_control_group(&self) -> bool {
        self.control_group
    }

    /// Current value. Empty controls read as `None`; an unchecked radio group
    /// falls back to its default.
    pub fn read(&self) -> Option<String> {
        match &self.representation {
            Representation::Dropdown { selected, .. } => {
                selected.clone().filter(|v| !v.is_empty())
            }
            Representation::TextInput { value } => {
                Some(value.clone()).filter(|v| !v.is_empty())
            }
            Representation::RadioGroup { members } => members
                .iter()
                .find(|m| m.checked)
                .map(|m| m.value.clone())
                .or_else(|| self.default.clone()),
        }
    }

    /// Programmatic write. Numeric values are rescaled when configured; a
    /// radio value with no matching member leaves the group unchecked.
    pub fn write(&mut self, value: &str) {
        let rescaled = match self.rescale {
            Some(factor) if is_numeric(value) => {
                Some(format!("{}", (parse_float(value) * factor).round()))
            }
            _ => None,
        };
        let value = rescaled.as_deref().unwrap_or(value);
        self.store(value);
    }

    /// A user edit: stored as typed, and radio values must exist.
    pub fn input(&mut self, value: &str) -> Result<()> {
        if let Representation::RadioGroup { members } = &self.representation {
            if !members.iter().any(|m| m.value == value) {
                return Err(FormError::unknown_radio_value(&self.name, value));
            }
        }
        self.store(value);
        Ok(())
    }

    /// Empty the control, or uncheck every radio member.
    pub fn clear(&mut self) {
        match &mut self.representation {
            Representation::Dropdown { selected, .. } => *selected = None,
            Representation::TextInput { value } => value.clear(),
            Representation::RadioGroup { members } => {
                members.iter_mut().for_each(|m| m.checked = false);
            }
        }
    }

    pub fn control_state(&self) -> ControlState {
        match &self.representation {
            Representation::Dropdown { selected, .. } => ControlState::Selected(selected.clone()),
            Representation::TextInput { value } => ControlState::Text(value.clone()),
            Representation::RadioGroup { members } => ControlState::Checked(
                members.iter().find(|m| m.checked).map(|m| m.value.clone()),
            ),
        }
    }

    fn store(&mut self, value: &str) {
        match &mut self.representation {
            Representation::Dropdown { options, selected } => {
                let known = options.is_empty() || options.iter().any(|o| o == value);
                *selected = known.then(|| value.to_string());
            }
            Representation::TextInput { value: current } => {
                value.clone_into(current);
            }
            Representation::RadioGroup { members } => {
                // Uncheck everything first so at most one member is checked.
                members.iter_mut().for_each(|m| m.checked = false);
                if let Some(member) = members.iter_mut().find(|m| m.value == value) {
                    member.checked = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_dropdown_read_write_clear() {
        let mut field = FieldAccessor::dropdown("torso_length", ["high_hip_length", "tunic_length"]);
        assert_eq!(field.read(), None);

        field.write("tunic_length");
        assert_eq!(field.read().as_deref(), Some("tunic_length"));

        field.write("knee_length");
        assert_eq!(field.read(), None, "unknown option selects nothing");

        field.write("high_hip_length");
        field.clear();
        assert_eq!(field.read(), None);
    }

    #[test]
    fn test_text_input_empty_reads_as_none() {
        let mut field = FieldAccessor::text_input("bust_circ").with_value("36");
        assert_eq!(field.read().as_deref(), Some("36"));
        field.clear();
        assert_eq!(field.read(), None);
        assert_eq!(field.control_state(), ControlState::Text(String::new()));
    }

    #[test]
    fn test_radio_group_checks_at_most_one_member() {
        let mut field = FieldAccessor::radio_group("sleeve_length", ["SLEEVE_SHORT", "SLEEVE_FULL"]);
        field.write("SLEEVE_SHORT");
        field.write("SLEEVE_FULL");

        let checked = match field.representation() {
            Representation::RadioGroup { members } => members.iter().filter(|m| m.checked).count(),
            _ => 0,
        };
        assert_eq!(checked, 1);
        assert_eq!(field.read().as_deref(), Some("SLEEVE_FULL"));
    }

    #[test]
    fn test_radio_group_unchecked_reads_default() {
        let mut field = FieldAccessor::radio_group("neckline_style", ["NECK_VEE", "NECK_CREW"])
            .with_default("NECK_CREW");
        assert_eq!(field.read().as_deref(), Some("NECK_CREW"));

        field.write("NECK_BOAT");
        assert_eq!(field.read().as_deref(), Some("NECK_CREW"));
        assert_eq!(field.control_state(), ControlState::Checked(None));
    }

    #[test]
    fn test_radio_input_rejects_unknown_value() {
        let mut field = FieldAccessor::radio_group("garment_type", ["PULLOVER_VEST"]);
        let err = field.input("PONCHO").unwrap_err();
        assert_eq!(err, FormError::unknown_radio_value("garment_type", "PONCHO"));
        assert!(field.input("PULLOVER_VEST").is_ok());
    }

    #[test]
    fn test_rescale_applies_to_numeric_writes_only() {
        let mut field = FieldAccessor::text_input("yardage").with_unit_label("metres");
        field.write("100");
        assert_eq!(field.read().as_deref(), Some("91"));

        field.write("lots");
        assert_eq!(field.read().as_deref(), Some("lots"));

        field.input("100").unwrap();
        assert_eq!(field.read().as_deref(), Some("100"), "user input is not rescaled");
    }

    #[test]
    fn test_unlabelled_field_is_not_rescaled() {
        let mut field = FieldAccessor::text_input("stitches_length");
        field.write("4.5");
        assert_eq!(field.read().as_deref(), Some("4.5"));
    }
}
