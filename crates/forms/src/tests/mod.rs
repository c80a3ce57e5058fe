//! Behavioral tests for form wiring
//!
//! BDD-style tests using given-when-then naming. Each file exercises one
//! engine end to end through a recording surface.
