//! Gift certificate price quotes.
//!
//! Bulk discounts here mirror the ones the server charges; keep them in step.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;
use crate::form::Form;

/// Price of one pattern, in cents.
pub const PATTERN_PRICE_CENTS: u64 = 999;

static WHOLE_NUMBER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[0-9]+$").ok());

/// Text for the total and bonus lines under the quantity input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub total: String,
    pub bonus: String,
}

impl Quote {
    /// Quote for the raw contents of the quantity field.
    pub fn for_quantity(raw: &str) -> Self {
        match parse_quantity(raw) {
            Some(patterns) => Self::for_patterns(patterns),
            None => Self {
                total: "Please enter the number of patterns you want to purchase.".to_string(),
                bonus: String::new(),
            },
        }
    }

    fn for_patterns(patterns: u64) -> Self {
        let cents = u128::from(patterns).saturating_mul(u128::from(PATTERN_PRICE_CENTS));
        let amount = format!("{}.{:02}", cents / 100, cents % 100);
        let total = if patterns == 1 {
            format!("${amount} for 1 pattern")
        } else {
            format!("${amount} for {patterns} patterns.")
        };
        let bonus = match patterns {
            0..=3 => "",
            4..=6 => "Plus, you'll get one free bonus pattern!",
            _ => "Plus, you'll get three free bonus patterns!",
        };
        Self {
            total,
            bonus: bonus.to_string(),
        }
    }
}

/// A positive whole number of patterns.
fn parse_quantity(raw: &str) -> Option<u64> {
    let matches = WHOLE_NUMBER
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(raw));
    if !matches {
        return None;
    }
    raw.parse::<u64>().ok().filter(|n| *n > 0)
}

/// Quantity input on the gift certificate form.
pub const QUANTITY_FIELD: &str = "quantity_purchased";
pub const TOTAL_ELEMENT: &str = "display_total_price";
pub const BONUS_ELEMENT: &str = "display_total_bonus";

/// Re-quote into the total and bonus elements whenever the quantity changes.
pub fn install(form: &Form) -> Result<()> {
    form.ensure(QUANTITY_FIELD)?;
    form.on_change(QUANTITY_FIELD, |f| {
        let raw = f.read(QUANTITY_FIELD).ok().flatten().unwrap_or_default();
        let quote = Quote::for_quantity(&raw);
        f.surface().element_text(TOTAL_ELEMENT, &quote.total);
        f.surface().element_text(BONUS_ELEMENT, &quote.bonus);
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::rc::Rc;

    use super::*;
    use crate::field::FieldAccessor;
    use crate::surface::{Effect, RecordingSurface};

    #[test]
    fn test_quantity_edits_rewrite_quote() {
        let surface = Rc::new(RecordingSurface::new());
        let form = Form::builder()
            .surface(surface.clone())
            .field(FieldAccessor::text_input(QUANTITY_FIELD))
            .build()
            .unwrap();
        install(&form).unwrap();

        form.input(QUANTITY_FIELD, "5").unwrap();
        assert_eq!(
            surface.take(),
            vec![
                Effect::ElementText {
                    element: TOTAL_ELEMENT.to_string(),
                    text: "$49.95 for 5 patterns.".to_string(),
                },
                Effect::ElementText {
                    element: BONUS_ELEMENT.to_string(),
                    text: "Plus, you'll get one free bonus pattern!".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_single_pattern() {
        let quote = Quote::for_quantity("1");
        assert_eq!(quote.total, "$9.99 for 1 pattern");
        assert_eq!(quote.bonus, "");
    }

    #[test]
    fn test_bulk_bonus_tiers() {
        assert_eq!(Quote::for_quantity("3").total, "$29.97 for 3 patterns.");
        assert_eq!(Quote::for_quantity("3").bonus, "");
        assert_eq!(
            Quote::for_quantity("4").bonus,
            "Plus, you'll get one free bonus pattern!"
        );
        assert_eq!(
            Quote::for_quantity("7").bonus,
            "Plus, you'll get three free bonus patterns!"
        );
        assert_eq!(Quote::for_quantity("10").total, "$99.90 for 10 patterns.");
    }

    #[test]
    fn test_quantity_beyond_u32_is_quoted() {
        let quote = Quote::for_quantity("5000000000");
        assert_eq!(quote.total, "$49950000000.00 for 5000000000 patterns.");
        assert_eq!(quote.bonus, "Plus, you'll get three free bonus patterns!");
    }

    #[test]
    fn test_invalid_quantities() {
        for raw in ["", "0", "-2", "2.5", "two", " 3"] {
            let quote = Quote::for_quantity(raw);
            assert_eq!(
                quote.total, "Please enter the number of patterns you want to purchase.",
                "quantity {raw:?}"
            );
            assert!(quote.bonus.is_empty());
        }
    }
}
