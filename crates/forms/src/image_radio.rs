//! Illustrated radio options.
//!
//! Clicking an option's picture selects the option, exactly as clicking its
//! input would, unless the option's group has been disabled.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{FormError, Result};
use crate::field::{FieldKind, Representation};
use crate::form::Form;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ImageOption {
    field: String,
    value: String,
}

/// Maps image element ids to the radio option they stand for.
#[derive(Debug, Clone, Default)]
pub struct ImageRadios {
    images: HashMap<String, ImageOption>,
    disabled: HashSet<String>,
}

impl ImageRadios {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `image_id` with `value` of the radio group `field`.
    pub fn bind(&mut self, form: &Form, image_id: &str, field: &str, value: &str) -> Result<()> {
        let accessor = form.accessor(field)?;
        let Representation::RadioGroup { members } = accessor.representation() else {
            return Err(FormError::WrongKind {
                field: field.to_string(),
                expected: FieldKind::RadioGroup.to_string(),
                actual: accessor.kind().to_string(),
            });
        };
        if !members.iter().any(|m| m.value == value) {
            return Err(FormError::unknown_radio_value(field, value));
        }
        self.images.insert(
            image_id.to_string(),
            ImageOption {
                field: field.to_string(),
                value: value.to_string(),
            },
        );
        Ok(())
    }

    /// Ids of every bound image.
    pub fn image_ids(&self) -> impl Iterator<Item = &str> {
        self.images.keys().map(String::as_str)
    }

    pub fn disable_group(&mut self, field: &str) {
        self.disabled.insert(field.to_string());
    }

    pub fn enable_group(&mut self, field: &str) {
        self.disabled.remove(field);
    }

    pub fn is_disabled(&self, field: &str) -> bool {
        self.disabled.contains(field)
    }

    /// Handle a click on `image_id`. Returns whether an option was selected.
    pub fn click(&self, form: &Form, image_id: &str) -> Result<bool> {
        let Some(option) = self.images.get(image_id) else {
            return Ok(false);
        };
        if self.is_disabled(&option.field) {
            debug!(field = %option.field, "image click ignored, group disabled");
            return Ok(false);
        }
        form.input(&option.field, &option.value)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::field::FieldAccessor;

    fn form() -> Form {
        Form::builder()
            .field(FieldAccessor::radio_group("torso_length", ["high_hip_length", "tunic_length"]))
            .field(FieldAccessor::text_input("bust_circ"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_click_selects_and_notifies() {
        let form = form();
        let mut radios = ImageRadios::new();
        radios.bind(&form, "img-tunic", "torso_length", "tunic_length").unwrap();

        let changes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&changes);
        form.on_change("torso_length", move |_| counter.set(counter.get() + 1))
            .unwrap();

        assert!(radios.click(&form, "img-tunic").unwrap());
        assert_eq!(form.read("torso_length").unwrap().as_deref(), Some("tunic_length"));
        assert_eq!(changes.get(), 1);
    }

    #[test]
    fn test_disabled_group_ignores_clicks() {
        let form = form();
        let mut radios = ImageRadios::new();
        radios.bind(&form, "img-tunic", "torso_length", "tunic_length").unwrap();
        radios.disable_group("torso_length");

        assert!(!radios.click(&form, "img-tunic").unwrap());
        assert_eq!(form.read("torso_length").unwrap(), None);

        radios.enable_group("torso_length");
        assert!(radios.click(&form, "img-tunic").unwrap());
    }

    #[test]
    fn test_bind_validates_target() {
        let form = form();
        let mut radios = ImageRadios::new();
        assert!(matches!(
            radios.bind(&form, "img", "bust_circ", "36"),
            Err(FormError::WrongKind { .. })
        ));
        assert_eq!(
            radios.bind(&form, "img", "torso_length", "knee_length"),
            Err(FormError::unknown_radio_value("torso_length", "knee_length"))
        );
        assert!(!radios.click(&form, "img").unwrap());
    }
}
