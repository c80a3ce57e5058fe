//! Warnings for numbers the database accepts but a knitter probably did not mean.
//!
//! Every check is a pure function over raw field strings plus a binding that
//! re-runs it whenever one of its inputs changes. Unparseable input yields NaN,
//! which fails every comparison, so the warning simply stays hidden.

use std::rc::Rc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::form::Form;
use crate::numeric::parse_float;
use crate::units::Units;

/// Classification of a stitch or row gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeVerdict {
    Workable,
    /// Too many per inch.
    Tiny,
    /// Too few per inch.
    Big,
}

/// Per-inch bounds outside which a gauge is suspicious.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeLimits {
    pub tiny_above: f64,
    pub big_below: f64,
}

pub const STITCH_GAUGE: GaugeLimits = GaugeLimits {
    tiny_above: 10.0,
    big_below: 2.0,
};

pub const ROW_GAUGE: GaugeLimits = GaugeLimits {
    tiny_above: 15.0,
    big_below: 3.0,
};

impl GaugeLimits {
    pub fn classify(&self, per_inch: f64) -> GaugeVerdict {
        if per_inch > self.tiny_above {
            GaugeVerdict::Tiny
        } else if per_inch < self.big_below {
            GaugeVerdict::Big
        } else {
            GaugeVerdict::Workable
        }
    }
}

/// Stitches or rows per inch, or `None` until both inputs are filled in.
///
/// A zero length divides to infinity and reads as "tiny".
pub fn gauge_per_inch(number: Option<&str>, length: Option<&str>, units: Units) -> Option<f64> {
    match (number, length) {
        (Some(number), Some(length)) if !number.is_empty() && !length.is_empty() => {
            Some(parse_float(number) * units.conversion() / parse_float(length))
        }
        _ => None,
    }
}

pub fn check_gauge(
    number: Option<&str>,
    length: Option<&str>,
    units: Units,
    limits: GaugeLimits,
) -> Option<GaugeVerdict> {
    gauge_per_inch(number, length, units).map(|ratio| limits.classify(ratio))
}

/// Smallest plausible bust circumference, in the units shown to the knitter.
pub const fn bust_minimum(units: Units) -> f64 {
    match units {
        Units::Inches => 23.0,
        Units::Centimeters => 59.0,
    }
}

pub fn bust_circumference_warning(value: Option<&str>, units: Units) -> bool {
    parse_float(value.unwrap_or_default()) < bust_minimum(units)
}

pub fn cross_chest_warning(cross_chest: Option<&str>, upper_torso: Option<&str>, units: Units) -> bool {
    let cross_chest = parse_float(cross_chest.unwrap_or_default());
    let upper_torso = parse_float(upper_torso.unwrap_or_default());

    let wider_than_torso = upper_torso > 0.0 && cross_chest > upper_torso / 2.0 - 2.5;
    wider_than_torso || cross_chest / units.conversion() >= 17.0
}

/// Armpit-to-waist must sit at least 3 above the deepest hip length given.
pub fn armpit_to_waist_warning(
    to_waist: Option<&str>,
    to_high_hip: Option<&str>,
    to_med_hip: Option<&str>,
) -> bool {
    let to_waist = parse_float(to_waist.unwrap_or_default());
    if to_waist.is_nan() || to_waist <= 0.0 {
        return false;
    }
    let to_high_hip = parse_float(to_high_hip.unwrap_or_default());
    let hip = if to_high_hip > 0.0 {
        to_high_hip
    } else {
        parse_float(to_med_hip.unwrap_or_default())
    };
    to_waist > hip - 3.0
}

/// Desired visibility of one warning element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningToggle {
    pub element: String,
    pub visible: bool,
}

impl WarningToggle {
    pub fn new(element: impl Into<String>, visible: bool) -> Self {
        Self {
            element: element.into(),
            visible,
        }
    }
}

/// A warning check wired to form fields.
pub trait InputCheck {
    /// Fields whose changes re-run the check.
    fn inputs(&self) -> Vec<&str>;

    /// Toggles applied once at install time.
    fn initial(&self) -> Vec<WarningToggle> {
        Vec::new()
    }

    /// Toggles for the current values. Empty leaves the warnings as they are.
    fn evaluate(&self, form: &Form) -> Result<Vec<WarningToggle>>;
}

fn apply(form: &Form, toggles: &[WarningToggle]) {
    for toggle in toggles {
        form.surface()
            .element_visibility(&toggle.element, toggle.visible);
    }
}

/// Validate the check's inputs, apply its initial state and re-run it on
/// every change of an input.
pub fn install<C: InputCheck + 'static>(form: &Form, check: C) -> Result<Rc<C>> {
    check
        .inputs()
        .into_iter()
        .try_for_each(|field| form.ensure(field))?;
    apply(form, &check.initial());

    let check = Rc::new(check);
    let inputs: Vec<String> = check.inputs().into_iter().map(str::to_string).collect();
    for field in &inputs {
        let check = Rc::clone(&check);
        form.on_change(field, move |f| match check.evaluate(f) {
            Ok(toggles) => apply(f, &toggles),
            Err(err) => warn!(error = %err, "input check failed"),
        })?;
    }
    Ok(check)
}

/// Stitch or row gauge check with separate "tiny" and "big" warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeCheck {
    pub number_field: String,
    pub length_field: String,
    pub tiny_element: String,
    pub big_element: String,
    pub limits: GaugeLimits,
    pub units: Units,
}

impl GaugeCheck {
    pub fn stitches(units: Units) -> Self {
        Self {
            number_field: "stitches_number".to_string(),
            length_field: "stitches_length".to_string(),
            tiny_element: "sts_warning_tiny".to_string(),
            big_element: "sts_warning_big".to_string(),
            limits: STITCH_GAUGE,
            units,
        }
    }

    pub fn rows(units: Units) -> Self {
        Self {
            number_field: "rows_number".to_string(),
            length_field: "rows_length".to_string(),
            tiny_element: "rows_warning_tiny".to_string(),
            big_element: "rows_warning_big".to_string(),
            limits: ROW_GAUGE,
            units,
        }
    }

    pub fn verdict(&self, form: &Form) -> Result<Option<GaugeVerdict>> {
        let number = form.read(&self.number_field)?;
        let length = form.read(&self.length_field)?;
        let verdict = check_gauge(number.as_deref(), length.as_deref(), self.units, self.limits);
        debug!(field = %self.number_field, ?verdict, "gauge checked");
        Ok(verdict)
    }
}

impl InputCheck for GaugeCheck {
    fn inputs(&self) -> Vec<&str> {
        vec![self.number_field.as_str(), self.length_field.as_str()]
    }

    fn evaluate(&self, form: &Form) -> Result<Vec<WarningToggle>> {
        Ok(self
            .verdict(form)?
            .map(|verdict| {
                vec![
                    WarningToggle::new(&self.tiny_element, verdict == GaugeVerdict::Tiny),
                    WarningToggle::new(&self.big_element, verdict == GaugeVerdict::Big),
                ]
            })
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BustCheck {
    pub field: String,
    pub element: String,
    pub units: Units,
}

impl BustCheck {
    pub fn new(units: Units) -> Self {
        Self {
            field: "bust_circ".to_string(),
            element: "bust_circ_warning".to_string(),
            units,
        }
    }
}

impl InputCheck for BustCheck {
    fn inputs(&self) -> Vec<&str> {
        vec![self.field.as_str()]
    }

    fn initial(&self) -> Vec<WarningToggle> {
        vec![WarningToggle::new(&self.element, false)]
    }

    fn evaluate(&self, form: &Form) -> Result<Vec<WarningToggle>> {
        let value = form.read(&self.field)?;
        Ok(vec![WarningToggle::new(
            &self.element,
            bust_circumference_warning(value.as_deref(), self.units),
        )])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossChestCheck {
    pub cross_chest_field: String,
    pub upper_torso_field: String,
    pub element: String,
    pub units: Units,
}

impl CrossChestCheck {
    pub fn new(units: Units) -> Self {
        Self {
            cross_chest_field: "cross_chest_distance".to_string(),
            upper_torso_field: "upper_torso_circ".to_string(),
            element: "cross_chest_warning".to_string(),
            units,
        }
    }
}

impl InputCheck for CrossChestCheck {
    fn inputs(&self) -> Vec<&str> {
        vec![self.cross_chest_field.as_str(), self.upper_torso_field.as_str()]
    }

    fn initial(&self) -> Vec<WarningToggle> {
        vec![WarningToggle::new(&self.element, false)]
    }

    fn evaluate(&self, form: &Form) -> Result<Vec<WarningToggle>> {
        let cross_chest = form.read(&self.cross_chest_field)?;
        let upper_torso = form.read(&self.upper_torso_field)?;
        Ok(vec![WarningToggle::new(
            &self.element,
            cross_chest_warning(cross_chest.as_deref(), upper_torso.as_deref(), self.units),
        )])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmpitToWaistCheck {
    pub to_waist_field: String,
    pub to_high_hip_field: String,
    pub to_med_hip_field: String,
    pub element: String,
}

impl Default for ArmpitToWaistCheck {
    fn default() -> Self {
        Self {
            to_waist_field: "armpit_to_waist".to_string(),
            to_high_hip_field: "armpit_to_high_hip".to_string(),
            to_med_hip_field: "armpit_to_med_hip".to_string(),
            element: "armpit_to_waist_warning".to_string(),
        }
    }
}

impl InputCheck for ArmpitToWaistCheck {
    fn inputs(&self) -> Vec<&str> {
        vec![
            self.to_waist_field.as_str(),
            self.to_high_hip_field.as_str(),
            self.to_med_hip_field.as_str(),
        ]
    }

    fn initial(&self) -> Vec<WarningToggle> {
        vec![WarningToggle::new(&self.element, false)]
    }

    fn evaluate(&self, form: &Form) -> Result<Vec<WarningToggle>> {
        let to_waist = form.read(&self.to_waist_field)?;
        let to_high_hip = form.read(&self.to_high_hip_field)?;
        let to_med_hip = form.read(&self.to_med_hip_field)?;
        Ok(vec![WarningToggle::new(
            &self.element,
            armpit_to_waist_warning(
                to_waist.as_deref(),
                to_high_hip.as_deref(),
                to_med_hip.as_deref(),
            ),
        )])
    }
}
