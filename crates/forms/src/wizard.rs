//! Design wizard wiring: which options depend on which, and the schematic
//! overlay assembled from the knitter's choices.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Result;
use crate::form::Form;
use crate::overlay::{OverlayContext, OverlayEngine, OverlayHandle, OverlayMapping};
use crate::visibility::{Predicate, RuleHandle, VisibilityRule};

pub const PULLOVER: [&str; 2] = ["PULLOVER_VEST", "PULLOVER_SLEEVED"];
pub const CARDIGAN: [&str; 2] = ["CARDIGAN_VEST", "CARDIGAN_SLEEVED"];
pub const VEST: [&str; 2] = ["PULLOVER_VEST", "CARDIGAN_VEST"];
pub const SLEEVED: [&str; 2] = ["PULLOVER_SLEEVED", "CARDIGAN_SLEEVED"];

pub const GARMENT_TYPE: &str = "garment_type";
pub const NECKLINE_STYLE: &str = "neckline_style";
pub const NECKLINE_DEPTH_ORIENTATION: &str = "neckline_depth_orientation";

/// Every schematic image name the overlay can ask for.
pub const SCHEMATIC_IMAGES: [&str; 22] = [
    "V_PULLOVER_NECK",
    "V_CARDI_NECK",
    "CREW_NECK_PULLOVER",
    "CREW_NECK_CARDI",
    "SCOOP_NECK_PULLOVER",
    "SCOOP_NECK_CARDI",
    "BOAT_NECK_PULLOVER",
    "BOAT_NECK_CARDI",
    "TANK_NECK_PULLOVER",
    "SHORT_SLEEVES",
    "ELBOW_SLEEVES",
    "3_4_SLEEVES",
    "LONG_SLEEVES",
    "VEST_PULLOVER_CARDI",
    "HIGH_HIP_PULLOVER",
    "HIGH_HIP_CARDI",
    "MID_HIP_PULLOVER",
    "MID_HIP_CARDI",
    "LOW_HIP_PULLOVER",
    "LOW_HIP_CARDI",
    "TUNIC_PULLOVER",
    "TUNIC_CARDI",
];

pub fn is_one_of(group: &[&str], value: Option<&str>) -> bool {
    value.is_some_and(|v| group.contains(&v))
}

/// Installed design wizard rules.
#[derive(Debug, Clone)]
pub struct WizardDependencies {
    pub sleeves: RuleHandle,
    pub button_band: RuleHandle,
    pub sleeve_shape: RuleHandle,
    pub neck_edging: RuleHandle,
}

/// Install the dependent-field rules of the design wizard.
pub fn install_dependencies(form: &Form) -> Result<WizardDependencies> {
    let sleeves = VisibilityRule::when_in(GARMENT_TYPE, SLEEVED)
        .show("sleeve_length")
        .show_nested(VisibilityRule::when_in("sleeve_shape", ["SLEEVE_BELL"]).show("bell_type"))
        .show_all(["sleeve_edging_stitch", "sleeve_edging_height"])
        .hide_all(["armhole_edging_stitch", "armhole_edging_height"])
        .install(form)?;

    let button_band = VisibilityRule::when_in(GARMENT_TYPE, CARDIGAN)
        .show_all([
            "button_band_allowance",
            "button_band_edging_stitch",
            "button_band_edging_height",
            "number_of_buttons",
        ])
        .install(form)?;

    let sleeve_shape = VisibilityRule::when_in(
        "sleeve_length",
        ["SLEEVE_ELBOW", "SLEEVE_THREEQUARTER", "SLEEVE_FULL"],
    )
    .show("sleeve_shape")
    .install(form)?;

    // A V-neck cardigan's neck edging continues the button band.
    form.ensure(NECKLINE_STYLE)?;
    let neck_edging = VisibilityRule::new(
        GARMENT_TYPE,
        Predicate::function(|garment, form| {
            is_one_of(&CARDIGAN, garment)
                && form.read(NECKLINE_STYLE).ok().flatten().as_deref() == Some("NECK_VEE")
        }),
    )
    .hide_all(["neck_edging_stitch", "neck_edging_height"])
    .install(form)?;
    neck_edging.follow(form, NECKLINE_STYLE)?;

    Ok(WizardDependencies {
        sleeves,
        button_band,
        sleeve_shape,
        neck_edging,
    })
}

/// Reveal the neckline depth orientation option, hidden by default because
/// it confuses newer knitters.
pub fn reveal_neckline_depth(form: &Form) -> Result<()> {
    form.show(NECKLINE_DEPTH_ORIENTATION)
}

/// Installed schematic overlay layers.
#[derive(Debug, Clone)]
pub struct WizardOverlay {
    pub neckline: OverlayHandle,
    pub sleeve_length: OverlayHandle,
    pub torso_length: OverlayHandle,
}

type Sources = Rc<HashMap<String, String>>;

/// Source chosen by garment family: pullover, cardigan, or nothing.
fn by_garment(
    sources: &Sources,
    pullover: &'static str,
    cardigan: &'static str,
) -> impl Fn(&OverlayContext<'_>) -> Option<String> + 'static {
    let sources = Rc::clone(sources);
    move |context| {
        let garment = context.read(GARMENT_TYPE);
        let key = if is_one_of(&PULLOVER, garment.as_deref()) {
            pullover
        } else if is_one_of(&CARDIGAN, garment.as_deref()) {
            cardigan
        } else {
            return None;
        };
        sources.get(key).cloned()
    }
}

fn with_static(mapping: OverlayMapping, sources: &Sources, value: &str, key: &str) -> OverlayMapping {
    match sources.get(key) {
        Some(source) => mapping.entry(value, source.as_str()),
        None => mapping,
    }
}

fn with_fallback(mapping: OverlayMapping, sources: &Sources, key: &str) -> OverlayMapping {
    match sources.get(key) {
        Some(source) => mapping.fallback(source.as_str()),
        None => mapping,
    }
}

/// Bind the neckline, sleeve and torso layers into `target`. `sources` maps
/// schematic image names (e.g. `V_PULLOVER_NECK`) to URLs.
pub fn install_overlay(
    engine: &OverlayEngine,
    target: &str,
    sources: HashMap<String, String>,
) -> Result<WizardOverlay> {
    let sources: Sources = Rc::new(sources);
    let form = engine.form();
    form.ensure(GARMENT_TYPE)?;

    let neckline_mapping = OverlayMapping::new()
        .computed("NECK_VEE", by_garment(&sources, "V_PULLOVER_NECK", "V_CARDI_NECK"))
        .computed(
            "NECK_CREW",
            by_garment(&sources, "CREW_NECK_PULLOVER", "CREW_NECK_CARDI"),
        )
        .computed(
            "NECK_SCOOP",
            by_garment(&sources, "SCOOP_NECK_PULLOVER", "SCOOP_NECK_CARDI"),
        )
        .computed(
            "NECK_BOAT",
            by_garment(&sources, "BOAT_NECK_PULLOVER", "BOAT_NECK_CARDI"),
        );
    let neckline_mapping = with_fallback(neckline_mapping, &sources, "TANK_NECK_PULLOVER");
    let neckline = engine.bind(target, NECKLINE_STYLE, neckline_mapping)?;
    neckline.follow(form, GARMENT_TYPE)?;

    let mut sleeve_mapping = OverlayMapping::new();
    for (value, key) in [
        ("SLEEVE_SHORT", "SHORT_SLEEVES"),
        ("SLEEVE_ELBOW", "ELBOW_SLEEVES"),
        ("SLEEVE_THREEQUARTER", "3_4_SLEEVES"),
        ("SLEEVE_FULL", "LONG_SLEEVES"),
    ] {
        sleeve_mapping = with_static(sleeve_mapping, &sources, value, key);
    }
    let sleeve_mapping = with_fallback(sleeve_mapping, &sources, "VEST_PULLOVER_CARDI");
    let sleeve_length = engine.bind(target, "sleeve_length", sleeve_mapping)?;
    sleeve_length.follow(form, GARMENT_TYPE)?;

    let torso_mapping = OverlayMapping::new()
        .computed(
            "high_hip_length",
            by_garment(&sources, "HIGH_HIP_PULLOVER", "HIGH_HIP_CARDI"),
        )
        .computed(
            "med_hip_length",
            by_garment(&sources, "MID_HIP_PULLOVER", "MID_HIP_CARDI"),
        )
        .computed(
            "low_hip_length",
            by_garment(&sources, "LOW_HIP_PULLOVER", "LOW_HIP_CARDI"),
        )
        .computed(
            "tunic_length",
            by_garment(&sources, "TUNIC_PULLOVER", "TUNIC_CARDI"),
        );
    let torso_mapping = with_fallback(torso_mapping, &sources, "MID_HIP_PULLOVER");
    let torso_length = engine.bind(target, "torso_length", torso_mapping)?;
    torso_length.follow(form, GARMENT_TYPE)?;

    Ok(WizardOverlay {
        neckline,
        sleeve_length,
        torso_length,
    })
}

/// Every field the design wizard binds, with the radio values it offers.
pub fn wizard_fields() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        (
            GARMENT_TYPE,
            vec![
                "PULLOVER_VEST",
                "PULLOVER_SLEEVED",
                "CARDIGAN_VEST",
                "CARDIGAN_SLEEVED",
            ],
        ),
        (
            "sleeve_length",
            vec![
                "SLEEVE_SHORT",
                "SLEEVE_ELBOW",
                "SLEEVE_THREEQUARTER",
                "SLEEVE_FULL",
            ],
        ),
        (
            "sleeve_shape",
            vec!["SLEEVE_STRAIGHT", "SLEEVE_TAPERED", "SLEEVE_BELL"],
        ),
        ("bell_type", vec!["BELL_SLIGHT", "BELL_MODERATE", "BELL_EXTREME"]),
        (
            NECKLINE_STYLE,
            vec!["NECK_VEE", "NECK_CREW", "NECK_SCOOP", "NECK_BOAT"],
        ),
        (
            "torso_length",
            vec![
                "high_hip_length",
                "med_hip_length",
                "low_hip_length",
                "tunic_length",
            ],
        ),
        ("sleeve_edging_stitch", vec![]),
        ("sleeve_edging_height", vec![]),
        ("armhole_edging_stitch", vec![]),
        ("armhole_edging_height", vec![]),
        ("button_band_allowance", vec![]),
        ("button_band_edging_stitch", vec![]),
        ("button_band_edging_height", vec![]),
        ("number_of_buttons", vec![]),
        ("neck_edging_stitch", vec![]),
        ("neck_edging_height", vec![]),
        (NECKLINE_DEPTH_ORIENTATION, vec![]),
    ]
}
