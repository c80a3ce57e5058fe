//! Measurement formatting and the +/- steppers on schematic pages.

use crate::numeric::parse_float;
use crate::units::CM_PER_INCH;

/// Inches added or removed per stepper click.
pub const STEP_INCHES: f64 = 0.25;

/// Round `value` to the nearest multiple of `multiple`.
pub fn nearest(value: f64, multiple: f64) -> f64 {
    let per_unit = 1.0 / multiple;
    (value * per_unit).round() / per_unit
}

pub fn inches_to_cm(value: f64) -> f64 {
    value * CM_PER_INCH
}

/// Render `value`, using ¼ ½ ¾ entities when `fraction_format` is set and the
/// fractional part is one of those quarters.
pub fn represent_fraction(value: f64, fraction_format: bool) -> String {
    let whole = value.trunc();
    let fraction = value - whole;

    if fraction == 0.0 {
        return format!("{whole}");
    }
    if !fraction_format {
        return format!("{value}");
    }

    let entity = if fraction == 0.25 {
        "&frac14;"
    } else if fraction == 0.5 {
        "&frac12;"
    } else if fraction == 0.75 {
        "&frac34;"
    } else {
        return format!("{value}");
    };

    if whole == 0.0 {
        entity.to_string()
    } else {
        format!("{whole} {entity}")
    }
}

/// `XX" / YY cm`, inches to the nearest quarter and centimetres to the nearest half.
pub fn format_measurement(inches: f64) -> String {
    let inches_text = represent_fraction(nearest(inches, 0.25), true);
    let cm_text = represent_fraction(nearest(inches_to_cm(inches), 0.5), false);
    format!("{inches_text}\" / {cm_text} cm")
}

/// Replace the fraction entities with their Unicode glyphs.
pub fn to_plain_text(html: &str) -> String {
    html.replace("&frac14;", "¼")
        .replace("&frac12;", "½")
        .replace("&frac34;", "¾")
}

/// A measurement input replaced by a label and +/- buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementStepper {
    value: String,
    locked: bool,
}

impl MeasurementStepper {
    /// `None` for zero or non-numeric values, which keep their plain input.
    pub fn new(raw: &str) -> Option<Self> {
        let value = parse_float(raw);
        (!value.is_nan() && value != 0.0).then(|| Self {
            value: raw.to_string(),
            locked: false,
        })
    }

    /// Start with the buttons hidden until [`MeasurementStepper::unlock`].
    #[must_use]
    pub const fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Value written back into the hidden input.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn label(&self) -> String {
        format_measurement(parse_float(&self.value))
    }

    pub fn increment(&mut self) -> bool {
        self.step(STEP_INCHES)
    }

    /// Never steps down to zero or below.
    pub fn decrement(&mut self) -> bool {
        self.step(-STEP_INCHES)
    }

    fn step(&mut self, delta: f64) -> bool {
        if self.locked {
            return false;
        }
        let next = format!("{:.2}", parse_float(&self.value) + delta);
        if parse_float(&next) > 0.0 {
            self.value = next;
            true
        } else {
            false
        }
    }
}
