//! Dependent-field visibility rules.
//!
//! A rule watches one controlling field. When its predicate matches, the
//! show-listed fields are displayed and the hide-listed fields hidden; when it
//! does not, the roles swap. Rules are re-evaluated on every change of the
//! controlling field, whenever it is shown again, and once at install time.
//! Hiding the controlling field forces the non-matching state, so a nested
//! rule's dependents never stay visible under a hidden parent.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::form::Form;

/// Predicate function: current value of the controlling field, and the form
/// for rules that also look at other fields.
pub type PredicateFn = Rc<dyn Fn(Option<&str>, &Form) -> bool>;

/// When a rule is in its SHOWN state.
#[derive(Clone)]
pub enum Predicate {
    /// Exact string membership; an empty field never matches.
    Values(Vec<String>),
    Function(PredicateFn),
}

impl Predicate {
    pub fn values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Values(values.into_iter().map(Into::into).collect())
    }

    pub fn function(f: impl Fn(Option<&str>, &Form) -> bool + 'static) -> Self {
        Self::Function(Rc::new(f))
    }

    pub fn evaluate(&self, value: Option<&str>, form: &Form) -> bool {
        match self {
            Self::Values(values) => value.is_some_and(|v| values.iter().any(|s| s == v)),
            Self::Function(f) => f(value, form),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Values(values) => f.debug_tuple("Values").field(values).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// A field revealed by a rule, optionally carrying its own rule.
#[derive(Debug, Clone)]
pub enum Dependent {
    Field(String),
    /// Shows the nested rule's controlling field, which then governs its own dependents.
    Nested(VisibilityRule),
}

impl Dependent {
    pub fn field(&self) -> &str {
        match self {
            Self::Field(name) => name,
            Self::Nested(rule) => &rule.controlling,
        }
    }
}

/// Declarative show/hide rule.
#[derive(Debug, Clone)]
pub struct VisibilityRule {
    controlling: String,
    predicate: Predicate,
    show: Vec<Dependent>,
    hide: Vec<String>,
}

impl VisibilityRule {
    pub fn new(controlling: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            controlling: controlling.into(),
            predicate,
            show: Vec::new(),
            hide: Vec::new(),
        }
    }

    /// Rule matching when the controlling value is one of `values`.
    pub fn when_in<I, S>(controlling: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(controlling, Predicate::values(values))
    }

    #[must_use]
    pub fn show(mut self, field: impl Into<String>) -> Self {
        self.show.push(Dependent::Field(field.into()));
        self
    }

    #[must_use]
    pub fn show_all<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.show
            .extend(fields.into_iter().map(|f| Dependent::Field(f.into())));
        self
    }

    #[must_use]
    pub fn show_nested(mut self, rule: Self) -> Self {
        self.show.push(Dependent::Nested(rule));
        self
    }

    #[must_use]
    pub fn hide(mut self, field: impl Into<String>) -> Self {
        self.hide.push(field.into());
        self
    }

    #[must_use]
    pub fn hide_all<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hide.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn controlling(&self) -> &str {
        &self.controlling
    }

    pub const fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn dependents(&self) -> &[Dependent] {
        &self.show
    }

    pub fn hidden_when_matched(&self) -> &[String] {
        &self.hide
    }

    /// Every field this rule and its nested rules refer to.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.controlling.as_str()];
        for dependent in &self.show {
            match dependent {
                Dependent::Field(name) => fields.push(name),
                Dependent::Nested(rule) => fields.extend(rule.referenced_fields()),
            }
        }
        fields.extend(self.hide.iter().map(String::as_str));
        fields
    }

    /// Bind the rule to `form` and evaluate it once.
    pub fn install(self, form: &Form) -> Result<RuleHandle> {
        self.referenced_fields()
            .into_iter()
            .try_for_each(|field| form.ensure(field))?;
        self.bind(form)
    }

    fn bind(self, form: &Form) -> Result<RuleHandle> {
        let mut nested = Vec::new();
        let mut show = Vec::with_capacity(self.show.len());
        for dependent in self.show {
            match dependent {
                Dependent::Field(name) => show.push(name),
                Dependent::Nested(rule) => {
                    show.push(rule.controlling.clone());
                    nested.push(rule.bind(form)?);
                }
            }
        }

        let binding = Rc::new(RuleBinding {
            controlling: self.controlling,
            predicate: self.predicate,
            show,
            hide: self.hide,
            state: Cell::new(None),
            nested,
        });

        let on_change = Rc::clone(&binding);
        form.on_change(&binding.controlling, move |f| on_change.refresh(f))?;
        let on_hidden = Rc::clone(&binding);
        form.on_hidden(&binding.controlling, move |f| {
            if let Err(err) = on_hidden.apply(f, RuleState::Hidden) {
                warn!(field = %on_hidden.controlling, error = %err, "failed to hide dependents");
            }
        })?;

        let handle = RuleHandle { binding };
        handle.update(form)?;
        Ok(handle)
    }
}

/// Which side of a rule is currently displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleState {
    Shown,
    Hidden,
}

struct RuleBinding {
    controlling: String,
    predicate: Predicate,
    show: Vec<String>,
    hide: Vec<String>,
    state: Cell<Option<RuleState>>,
    nested: Vec<RuleHandle>,
}

impl RuleBinding {
    fn evaluate(&self, form: &Form) -> Result<RuleState> {
        let displayed = form.is_displayed(&self.controlling)?;
        let value = form.read(&self.controlling)?;
        let matched = displayed && self.predicate.evaluate(value.as_deref(), form);
        debug!(
            field = %self.controlling,
            value = value.as_deref().unwrap_or_default(),
            matched,
            "visibility rule evaluated"
        );
        Ok(if matched {
            RuleState::Shown
        } else {
            RuleState::Hidden
        })
    }

    fn apply(&self, form: &Form, state: RuleState) -> Result<()> {
        self.state.set(Some(state));
        match state {
            RuleState::Shown => {
                self.show.iter().try_for_each(|f| form.show(f))?;
                self.hide.iter().try_for_each(|f| form.hide(f))
            }
            RuleState::Hidden => {
                self.show.iter().try_for_each(|f| form.hide(f))?;
                self.hide.iter().try_for_each(|f| form.show(f))
            }
        }
    }

    fn update(&self, form: &Form) -> Result<RuleState> {
        let state = self.evaluate(form)?;
        self.apply(form, state)?;
        Ok(state)
    }

    fn refresh(&self, form: &Form) {
        if let Err(err) = self.update(form) {
            warn!(field = %self.controlling, error = %err, "visibility rule failed");
        }
    }
}

/// Installed rule. Cloning shares the binding.
#[derive(Clone)]
pub struct RuleHandle {
    binding: Rc<RuleBinding>,
}

impl RuleHandle {
    /// Re-evaluate now, e.g. when a field read by a predicate function changes.
    pub fn update(&self, form: &Form) -> Result<RuleState> {
        self.binding.update(form)
    }

    /// Also re-evaluate whenever `field` changes.
    pub fn follow(&self, form: &Form, field: &str) -> Result<()> {
        let binding = Rc::clone(&self.binding);
        form.on_change(field, move |f| binding.refresh(f))
    }

    pub fn state(&self) -> Option<RuleState> {
        self.binding.state.get()
    }

    pub fn controlling(&self) -> &str {
        &self.binding.controlling
    }

    /// Handles for the nested rules, in declaration order.
    pub fn nested(&self) -> &[Self] {
        &self.binding.nested
    }
}

impl fmt::Debug for RuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleHandle")
            .field("controlling", &self.binding.controlling)
            .field("state", &self.binding.state.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::rc::Rc;

    use super::*;
    use crate::error::FormError;
    use crate::field::FieldAccessor;
    use crate::form::Visibility;
    use crate::surface::RecordingSurface;

    fn sleeve_form() -> Form {
        Form::builder()
            .surface(Rc::new(RecordingSurface::new()))
            .field(FieldAccessor::radio_group(
                "garment_type",
                ["PULLOVER_VEST", "PULLOVER_SLEEVED"],
            ))
            .field(FieldAccessor::radio_group("sleeve_shape", ["SLEEVE_TAPERED", "SLEEVE_BELL"]))
            .field(FieldAccessor::text_input("bell_type"))
            .field(FieldAccessor::text_input("armhole_edging_height"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_static_predicate_uses_exact_equality() {
        let form = sleeve_form();
        let predicate = Predicate::values(["4"]);
        assert!(predicate.evaluate(Some("4"), &form));
        assert!(!predicate.evaluate(Some("4.0"), &form));
        assert!(!predicate.evaluate(None, &form));
    }

    #[test]
    fn test_install_rejects_unknown_fields() {
        let form = sleeve_form();
        let err = VisibilityRule::when_in("garment_type", ["PULLOVER_SLEEVED"])
            .show("sleeve_length")
            .install(&form)
            .unwrap_err();
        assert_eq!(err, FormError::unknown_field("sleeve_length"));
    }

    #[test]
    fn test_install_evaluates_immediately() {
        let form = sleeve_form();
        let rule = VisibilityRule::when_in("garment_type", ["PULLOVER_SLEEVED"])
            .show("sleeve_shape")
            .hide("armhole_edging_height")
            .install(&form)
            .unwrap();

        assert_eq!(rule.state(), Some(RuleState::Hidden));
        assert_eq!(form.visibility("sleeve_shape").unwrap(), Visibility::Hidden);
        assert_eq!(
            form.visibility("armhole_edging_height").unwrap(),
            Visibility::Shown
        );
    }

    #[test]
    fn test_nested_rule_follows_parent_hide() {
        let form = sleeve_form();
        let rule = VisibilityRule::when_in("garment_type", ["PULLOVER_SLEEVED"])
            .show_nested(VisibilityRule::when_in("sleeve_shape", ["SLEEVE_BELL"]).show("bell_type"))
            .install(&form)
            .unwrap();
        assert_eq!(rule.nested().len(), 1);

        form.input("garment_type", "PULLOVER_SLEEVED").unwrap();
        form.input("sleeve_shape", "SLEEVE_BELL").unwrap();
        assert_eq!(form.visibility("bell_type").unwrap(), Visibility::Shown);

        form.input("garment_type", "PULLOVER_VEST").unwrap();
        assert_eq!(form.visibility("sleeve_shape").unwrap(), Visibility::Hidden);
        assert_eq!(form.visibility("bell_type").unwrap(), Visibility::Hidden);
        assert_eq!(form.read("sleeve_shape").unwrap(), None);
    }

    #[test]
    fn test_function_predicate_with_follow() {
        let form = sleeve_form();
        let rule = VisibilityRule::new(
            "garment_type",
            Predicate::function(|value, form| {
                value == Some("PULLOVER_SLEEVED")
                    && form.read("sleeve_shape").ok().flatten().as_deref() == Some("SLEEVE_BELL")
            }),
        )
        .hide("armhole_edging_height")
        .install(&form)
        .unwrap();
        rule.follow(&form, "sleeve_shape").unwrap();

        form.input("garment_type", "PULLOVER_SLEEVED").unwrap();
        assert_eq!(rule.state(), Some(RuleState::Hidden));
        form.input("sleeve_shape", "SLEEVE_BELL").unwrap();
        assert_eq!(rule.state(), Some(RuleState::Shown));
        assert_eq!(
            form.visibility("armhole_edging_height").unwrap(),
            Visibility::Hidden
        );
    }
}
