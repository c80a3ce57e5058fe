//! Integration tests for the customfit binary.

#![allow(clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn customfit() -> Command {
    let mut cmd = Command::cargo_bin("customfit").unwrap();
    cmd.env_remove("CUSTOMFIT_UNITS").env("RUST_LOG", "off");
    cmd
}

// ============================================================================
// Gauge and body checks
// ============================================================================

#[test]
fn test_gauge_workable() {
    customfit()
        .args(["gauge", "-n", "21", "-l", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stitches per inch: 5.25"))
        .stdout(predicate::str::contains("workable"));
}

#[test]
fn test_gauge_tiny_when_length_shrinks() {
    customfit()
        .args(["gauge", "-n", "21", "-l", "1.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("very fine"));
}

#[test]
fn test_row_gauge_in_centimetres() {
    customfit()
        .args(["--units", "cm", "--json", "gauge", "--rows", "-n", "5", "-l", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"verdict\": \"big\""));
}

#[test]
fn test_units_from_environment() {
    customfit()
        .env("CUSTOMFIT_UNITS", "cm")
        .args(["body", "--bust-circ", "40"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bust_circ_warning"));
}

#[test]
fn test_bust_boundary() {
    customfit()
        .args(["body", "--bust-circ", "22"])
        .assert()
        .success()
        .stdout(predicate::str::contains("warning: bust_circ_warning"));

    customfit()
        .args(["body", "--bust-circ", "23"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no warnings"));
}

// ============================================================================
// Measurements and pricing
// ============================================================================

#[test]
fn test_measure_formats_inches_and_cm() {
    customfit()
        .args(["measure", "21.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("21 ½\" / 54.5 cm"));
}

#[test]
fn test_quote_with_bonus() {
    customfit()
        .args(["quote", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$39.96 for 4 patterns."))
        .stdout(predicate::str::contains("one free bonus pattern"));
}

#[test]
fn test_quote_rejects_garbage() {
    customfit()
        .args(["quote", "two"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Please enter the number of patterns you want to purchase.",
        ));
}

// ============================================================================
// Wizard simulation
// ============================================================================

#[test]
fn test_wizard_full_sleeves_layer() {
    customfit()
        .args([
            "--json",
            "wizard",
            "--set",
            "garment_type=CARDIGAN_SLEEVED",
            "--set",
            "sleeve_length=SLEEVE_FULL",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"source\": \"long_sleeves.png\""))
        .stdout(predicate::str::contains("\"source\": \"mid_hip_pullover.png\""));
}

#[test]
fn test_wizard_vest_hides_sleeves() {
    customfit()
        .args(["wizard", "--set", "garment_type=PULLOVER_VEST"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"sleeve_length\s+hidden").unwrap())
        .stdout(predicate::str::is_match(r"armhole_edging_stitch\s+shown").unwrap());
}

#[test]
fn test_wizard_rejects_unknown_radio_value() {
    customfit()
        .args(["wizard", "--set", "garment_type=PONCHO"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot set garment_type"));
}

#[test]
fn test_wizard_rejects_malformed_set() {
    customfit()
        .args(["wizard", "--set", "garment_type"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected FIELD=VALUE"));
}

// ============================================================================
// Declarations
// ============================================================================

const DECLARATION: &str = r#"
[[field]]
name = "garment_type"
kind = "radio_group"
options = ["PULLOVER_VEST", "CARDIGAN_VEST"]

[[field]]
name = "number_of_buttons"
kind = "text_input"

[[rule]]
field = "garment_type"
values = ["CARDIGAN_VEST"]
show = ["number_of_buttons"]
"#;

#[test]
fn test_check_declaration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("buttons.toml");
    std::fs::write(&path, DECLARATION).unwrap();

    customfit()
        .arg("check")
        .arg(&path)
        .args(["--set", "garment_type=CARDIGAN_VEST"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 fields, 1 rules"))
        .stdout(predicate::str::is_match(r"number_of_buttons\s+shown").unwrap());
}

#[test]
fn test_check_rejects_unknown_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("buttons.ini");
    std::fs::write(&path, DECLARATION).unwrap();

    customfit()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported declaration format"));
}
