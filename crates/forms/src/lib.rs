//! Headless behaviour for the CustomFit pattern forms.
//!
//! Every side effect (showing a container, checking a radio, loading a
//! schematic image) goes through a [`Surface`], so the same wiring runs in
//! the browser, in tests and on the command line. Key pieces:
//!
//! - **Fields**: [`FieldAccessor`] reads and writes dropdowns, text inputs
//!   and radio groups uniformly
//! - **Form**: [`Form`] owns fields, their visibility and signal dispatch
//! - **Visibility rules**: [`VisibilityRule`] shows or hides dependents from
//!   a controlling field's value
//! - **Overlay**: [`OverlayEngine`] stacks one image layer per field into a
//!   composite schematic
//! - **Warnings**: gauge and body measurement plausibility checks
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use customfit_forms::{FieldAccessor, Form, RecordingSurface, VisibilityRule};
//!
//! let surface = Rc::new(RecordingSurface::new());
//! let form = Form::builder()
//!     .surface(surface.clone())
//!     .field(FieldAccessor::radio_group("garment_type", ["PULLOVER_VEST", "CARDIGAN_VEST"]))
//!     .field(FieldAccessor::text_input("number_of_buttons"))
//!     .build()?;
//!
//! VisibilityRule::when_in("garment_type", ["CARDIGAN_VEST"])
//!     .show("number_of_buttons")
//!     .install(&form)?;
//! assert_eq!(surface.field_visible("number_of_buttons"), Some(false));
//!
//! form.input("garment_type", "CARDIGAN_VEST")?;
//! assert_eq!(surface.field_visible("number_of_buttons"), Some(true));
//! # Ok::<(), customfit_forms::FormError>(())
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod ajax;
pub mod config;
pub mod error;
pub mod field;
pub mod form;
pub mod image_radio;
pub mod measurement;
pub mod numeric;
pub mod overlay;
pub mod pricing;
pub mod surface;
pub mod text;
pub mod units;
pub mod visibility;
pub mod warnings;
pub mod wizard;

#[cfg(test)]
mod tests;

// Re-export main types
pub use config::{DeclaredForm, FormDeclaration};
pub use error::{ConfigError, FormError, Result};
pub use field::{ControlState, FieldAccessor, FieldKind, Representation};
pub use form::{container_id, FieldSignal, Form, FormBuilder, Visibility, WeakForm};
pub use numeric::{is_numeric, parse_float};
pub use overlay::{
    CompilationRegistry, LayerSource, OverlayContext, OverlayEngine, OverlayHandle,
    OverlayMapping,
};
pub use surface::{
    Effect, ImageRequest, LoadTicket, NullSurface, RecordingSurface, Spacing, Surface,
};
pub use units::Units;
pub use visibility::{Dependent, Predicate, RuleHandle, RuleState, VisibilityRule};
pub use warnings::{GaugeVerdict, InputCheck, WarningToggle};
