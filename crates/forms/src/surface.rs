//! Rendering seam.
//!
//! The engines never touch a document directly. Every visible side effect is
//! handed to a [`Surface`]; the browser adapter applies it to the DOM, tests
//! and the CLI record it.

use std::cell::RefCell;

use serde::Serialize;

use crate::field::ControlState;

/// Bottom spacing applied to control-group containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Spacing {
    /// 20px below a shown group.
    Spaced,
    /// No margin below a hidden group.
    Collapsed,
}

impl Spacing {
    pub const fn margin_bottom(self) -> &'static str {
        match self {
            Self::Spaced => "20px",
            Self::Collapsed => "0",
        }
    }
}

/// Identifies one off-document image load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LoadTicket(pub u64);

/// An image the surface should start loading off-document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRequest {
    pub ticket: LoadTicket,
    pub target: String,
    pub field: String,
    pub source: String,
}

/// Receiver of every visible side effect. All methods default to no-ops.
pub trait Surface {
    fn field_visibility(&self, _field: &str, _visible: bool) {}

    fn field_spacing(&self, _field: &str, _spacing: Spacing) {}

    fn control_state(&self, _field: &str, _state: &ControlState) {}

    fn element_visibility(&self, _element_id: &str, _visible: bool) {}

    fn element_text(&self, _element_id: &str, _text: &str) {}

    /// Start loading `request.source`; report back through
    /// `OverlayEngine::image_loaded` or `OverlayEngine::image_failed`.
    fn request_image(&self, _request: &ImageRequest) {}

    fn layer_attached(&self, _target: &str, _field: &str, _source: &str) {}

    fn layer_detached(&self, _target: &str, _field: &str) {}
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl Surface for NullSurface {}

/// One recorded side effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    FieldVisibility { field: String, visible: bool },
    FieldSpacing { field: String, spacing: Spacing },
    ControlState { field: String, state: ControlState },
    ElementVisibility { element: String, visible: bool },
    ElementText { element: String, text: String },
    ImageRequested(ImageRequest),
    LayerAttached { target: String, field: String, source: String },
    LayerDetached { target: String, field: String },
}

/// Records effects in the order they were issued.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    effects: RefCell<Vec<Effect>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effects(&self) -> Vec<Effect> {
        self.effects.borrow().clone()
    }

    /// Drain and return everything recorded so far.
    pub fn take(&self) -> Vec<Effect> {
        self.effects.borrow_mut().drain(..).collect()
    }

    /// Last visibility issued for `field`, if any.
    pub fn field_visible(&self, field: &str) -> Option<bool> {
        self.effects.borrow().iter().rev().find_map(|effect| match effect {
            Effect::FieldVisibility { field: f, visible } if f == field => Some(*visible),
            _ => None,
        })
    }

    /// Last visibility issued for a non-field element, if any.
    pub fn element_visible(&self, element_id: &str) -> Option<bool> {
        self.effects.borrow().iter().rev().find_map(|effect| match effect {
            Effect::ElementVisibility { element, visible } if element == element_id => {
                Some(*visible)
            }
            _ => None,
        })
    }

    /// Image requests in issue order.
    pub fn image_requests(&self) -> Vec<ImageRequest> {
        self.effects
            .borrow()
            .iter()
            .filter_map(|effect| match effect {
                Effect::ImageRequested(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, effect: Effect) {
        self.effects.borrow_mut().push(effect);
    }
}

impl Surface for RecordingSurface {
    fn field_visibility(&self, field: &str, visible: bool) {
        self.push(Effect::FieldVisibility {
            field: field.to_string(),
            visible,
        });
    }

    fn field_spacing(&self, field: &str, spacing: Spacing) {
        self.push(Effect::FieldSpacing {
            field: field.to_string(),
            spacing,
        });
    }

    fn control_state(&self, field: &str, state: &ControlState) {
        self.push(Effect::ControlState {
            field: field.to_string(),
            state: state.clone(),
        });
    }

    fn element_visibility(&self, element_id: &str, visible: bool) {
        self.push(Effect::ElementVisibility {
            element: element_id.to_string(),
            visible,
        });
    }

    fn element_text(&self, element_id: &str, text: &str) {
        self.push(Effect::ElementText {
            element: element_id.to_string(),
            text: text.to_string(),
        });
    }

    fn request_image(&self, request: &ImageRequest) {
        self.push(Effect::ImageRequested(request.clone()));
    }

    fn layer_attached(&self, target: &str, field: &str, source: &str) {
        self.push(Effect::LayerAttached {
            target: target.to_string(),
            field: field.to_string(),
            source: source.to_string(),
        });
    }

    fn layer_detached(&self, target: &str, field: &str) {
        self.push(Effect::LayerDetached {
            target: target.to_string(),
            field: field.to_string(),
        });
    }
}
