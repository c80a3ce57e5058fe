//! Browser adapter for `customfit-forms`.
//!
//! - **Surface**: [`DomSurface`] renders visibility, control values and
//!   schematic layers with inline styles and off-document image loads
//! - **Events**: user edits on the page's controls become `Form::input`
//!   calls
//! - **Pages**: [`DesignWizardPage`] wires the design wizard and is exported
//!   to JavaScript
//!
//! # Example
//!
//! ```ignore
//! import init, { DesignWizardPage } from "./customfit_forms_web.js";
//!
//! await init();
//! const page = new DesignWizardPage(null, "#schematic", JSON.stringify(sources));
//! page.revealNecklineDepth();
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod controls;
pub mod dom;
pub mod error;
pub mod events;
pub mod page;
pub mod surface;

pub use controls::{Control, ControlUpdate};
pub use error::{Result, WebError};
pub use events::EventBinding;
pub use page::DesignWizardPage;
pub use surface::DomSurface;
