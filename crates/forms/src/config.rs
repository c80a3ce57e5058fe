//! Declarative form descriptions.
//!
//! A page's fields and visibility rules can be described in TOML or JSON and
//! turned into a wired [`Form`]:
//!
//! ```toml
//! prefix = "wizard-"
//!
//! [[field]]
//! name = "garment_type"
//! kind = "radio_group"
//! options = ["PULLOVER_VEST", "CARDIGAN_SLEEVED"]
//!
//! [[field]]
//! name = "number_of_buttons"
//! kind = "text_input"
//!
//! [[rule]]
//! field = "garment_type"
//! values = ["CARDIGAN_SLEEVED"]
//! show = ["number_of_buttons"]
//! ```

use std::path::Path;
use std::rc::Rc;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigError, FormError};
use crate::field::{FieldAccessor, FieldKind};
use crate::form::Form;
use crate::surface::Surface;
use crate::units::Units;
use crate::visibility::{RuleHandle, VisibilityRule};

/// A whole form: its fields and the rules between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDeclaration {
    pub prefix: Option<String>,
    pub units: Units,
    #[serde(rename = "field")]
    pub fields: Vec<FieldDeclaration>,
    #[serde(rename = "rule")]
    pub rules: Vec<RuleDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    pub name: String,
    pub kind: FieldKind,
    /// Dropdown options or radio values. Ignored for text inputs.
    #[serde(default)]
    pub options: Vec<String>,
    /// Add-on label rendered next to the input, e.g. `"metres"`.
    #[serde(default)]
    pub unit_label: Option<String>,
    /// Value an unchecked radio group reports.
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub control_group: bool,
    /// Initial value.
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDeclaration {
    #[serde(alias = "field")]
    pub controlling: String,
    pub values: Vec<String>,
    #[serde(default)]
    pub show: Vec<DependentDeclaration>,
    #[serde(default)]
    pub hide: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependentDeclaration {
    Field(String),
    Nested(RuleDeclaration),
}

/// A form built from a declaration, with its installed rules.
#[derive(Debug, Clone)]
pub struct DeclaredForm {
    pub form: Form,
    pub rules: Vec<RuleHandle>,
    pub units: Units,
}

impl FieldDeclaration {
    fn accessor(&self) -> FieldAccessor {
        let mut accessor = match self.kind {
            FieldKind::Dropdown => FieldAccessor::dropdown(&self.name, self.options.iter().cloned()),
            FieldKind::TextInput => FieldAccessor::text_input(&self.name),
            FieldKind::RadioGroup => {
                FieldAccessor::radio_group(&self.name, self.options.iter().cloned())
            }
        };
        if let Some(label) = &self.unit_label {
            accessor = accessor.with_unit_label(label);
        }
        if let Some(default) = &self.default {
            accessor = accessor.with_default(default.clone());
        }
        if self.control_group {
            accessor = accessor.in_control_group();
        }
        if let Some(value) = &self.value {
            accessor = accessor.with_value(value);
        }
        accessor
    }
}

impl RuleDeclaration {
    fn rule(&self) -> VisibilityRule {
        let rule = self.show.iter().fold(
            VisibilityRule::when_in(&self.controlling, self.values.iter().cloned()),
            |rule, dependent| match dependent {
                DependentDeclaration::Field(name) => rule.show(name),
                DependentDeclaration::Nested(nested) => rule.show_nested(nested.rule()),
            },
        );
        rule.hide_all(self.hide.iter().cloned())
    }
}

impl FormDeclaration {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Load a declaration, choosing the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::read_failed(path, e.to_string()))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Register every field and install every rule.
    pub fn build(&self, surface: Rc<dyn Surface>) -> Result<DeclaredForm, ConfigError> {
        if let Some(name) = self.fields.iter().map(|f| f.name.as_str()).duplicates().next() {
            return Err(FormError::DuplicateField(name.to_string()).into());
        }

        let form = self
            .fields
            .iter()
            .fold(Form::builder().surface(surface), |builder, field| {
                builder.field(field.accessor())
            });
        let form = match &self.prefix {
            Some(prefix) => form.prefix(prefix.clone()),
            None => form,
        }
        .build()?;

        let rules = self
            .rules
            .iter()
            .map(|rule| rule.rule().install(&form))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            fields = self.fields.len(),
            rules = rules.len(),
            "form declaration built"
        );
        debug!(fields = ?form.field_names(), "declared fields");

        Ok(DeclaredForm {
            form,
            rules,
            units: self.units,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Write;

    use super::*;
    use crate::form::Visibility;
    use crate::surface::{NullSurface, RecordingSurface};

    const WIZARD: &str = r#"
prefix = "wizard-"
units = "centimeters"

[[field]]
name = "garment_type"
kind = "radio_group"
options = ["PULLOVER_VEST", "CARDIGAN_SLEEVED"]
default = "PULLOVER_VEST"

[[field]]
name = "number_of_buttons"
kind = "text_input"
control_group = true

[[field]]
name = "sleeve_shape"
kind = "dropdown"
options = ["SLEEVE_STRAIGHT", "SLEEVE_BELL"]

[[field]]
name = "bell_type"
kind = "dropdown"

[[rule]]
field = "garment_type"
values = ["CARDIGAN_SLEEVED"]
show = ["number_of_buttons", { controlling = "sleeve_shape", values = ["SLEEVE_BELL"], show = ["bell_type"] }]
"#;

    #[test]
    fn test_toml_declaration_builds_wired_form() {
        let declaration = FormDeclaration::from_toml_str(WIZARD).unwrap();
        assert_eq!(declaration.units, Units::Centimeters);
        assert_eq!(declaration.fields.len(), 4);

        let surface = Rc::new(RecordingSurface::new());
        let declared = declaration.build(surface.clone()).unwrap();
        let form = &declared.form;

        assert_eq!(form.container_id("bell_type"), "div_id_wizard-bell_type");
        assert_eq!(form.visibility("number_of_buttons").unwrap(), Visibility::Hidden);

        form.input("garment_type", "CARDIGAN_SLEEVED").unwrap();
        assert_eq!(form.visibility("number_of_buttons").unwrap(), Visibility::Shown);
        assert_eq!(form.visibility("sleeve_shape").unwrap(), Visibility::Shown);
        assert_eq!(form.visibility("bell_type").unwrap(), Visibility::Hidden);

        form.input("sleeve_shape", "SLEEVE_BELL").unwrap();
        assert_eq!(form.visibility("bell_type").unwrap(), Visibility::Shown);
    }

    #[test]
    fn test_json_declaration_parses() {
        let json = r#"{
            "field": [{"name": "yardage", "kind": "text_input", "unit_label": "metres"}],
            "rule": []
        }"#;
        let declaration = FormDeclaration::from_json_str(json).unwrap();
        let declared = declaration.build(Rc::new(NullSurface)).unwrap();
        declared.form.write("yardage", "100").unwrap();
        assert_eq!(declared.form.read("yardage").unwrap().as_deref(), Some("91"));
    }

    #[test]
    fn test_rule_naming_missing_field_fails() {
        let declaration = FormDeclaration::from_toml_str(
            r#"
[[field]]
name = "garment_type"
kind = "text_input"

[[rule]]
field = "garment_type"
values = ["X"]
show = ["ghost"]
"#,
        )
        .unwrap();
        let err = declaration.build(Rc::new(NullSurface)).unwrap_err();
        assert!(matches!(err, ConfigError::Form(FormError::UnknownField(name)) if name == "ghost"));
    }

    #[test]
    fn test_duplicate_fields_rejected() {
        let declaration = FormDeclaration::from_toml_str(
            r#"
[[field]]
name = "a"
kind = "text_input"

[[field]]
name = "a"
kind = "dropdown"
"#,
        )
        .unwrap();
        let err = declaration.build(Rc::new(NullSurface)).unwrap_err();
        assert!(matches!(err, ConfigError::Form(FormError::DuplicateField(name)) if name == "a"));
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("wizard.toml");
        std::fs::File::create(&toml_path)
            .unwrap()
            .write_all(WIZARD.as_bytes())
            .unwrap();
        assert_eq!(FormDeclaration::from_file(&toml_path).unwrap().fields.len(), 4);

        let yaml_path = dir.path().join("wizard.yaml");
        std::fs::write(&yaml_path, "fields: []").unwrap();
        assert!(matches!(
            FormDeclaration::from_file(&yaml_path),
            Err(ConfigError::UnsupportedFormat { .. })
        ));

        assert!(matches!(
            FormDeclaration::from_file(dir.path().join("missing.toml")),
            Err(ConfigError::ReadFailed { .. })
        ));
    }
}
