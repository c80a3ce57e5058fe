//! CLI command handlers.

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use customfit_forms::measurement::{format_measurement, to_plain_text};
use customfit_forms::pricing::Quote;
use customfit_forms::warnings::{
    ROW_GAUGE, STITCH_GAUGE, armpit_to_waist_warning, bust_circumference_warning,
    cross_chest_warning, gauge_per_inch,
};
use customfit_forms::wizard::{self, SCHEMATIC_IMAGES};
use customfit_forms::{
    CompilationRegistry, FieldAccessor, Form, FormDeclaration, GaugeVerdict, OverlayEngine,
    RecordingSurface, Units, Visibility,
};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use crate::cli::Commands;

/// Route `command` to its handler.
pub fn execute_command(command: Commands, units: Units, json: bool) -> Result<()> {
    match command {
        Commands::Gauge {
            number,
            length,
            rows,
        } => cmd_gauge(&number, &length, rows, units, json),

        Commands::Body {
            bust_circ,
            upper_torso_circ,
            cross_chest_distance,
            armpit_to_waist,
            armpit_to_high_hip,
            armpit_to_med_hip,
        } => cmd_body(
            &BodyInput {
                bust_circ,
                upper_torso_circ,
                cross_chest_distance,
                armpit_to_waist,
                armpit_to_high_hip,
                armpit_to_med_hip,
            },
            units,
            json,
        ),

        Commands::Measure { inches } => cmd_measure(inches, json),

        Commands::Wizard {
            sets,
            sources,
            reveal_neckline_depth,
        } => cmd_wizard(&sets, sources.as_deref(), reveal_neckline_depth, json),

        Commands::Quote { quantity } => cmd_quote(&quantity, json),

        Commands::Check { declaration, sets } => cmd_check(&declaration, &sets, json),
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to serialize output")?
    );
    Ok(())
}

const fn verdict_label(verdict: GaugeVerdict) -> &'static str {
    match verdict {
        GaugeVerdict::Workable => "workable",
        GaugeVerdict::Tiny => "tiny",
        GaugeVerdict::Big => "big",
    }
}

fn cmd_gauge(number: &str, length: &str, rows: bool, units: Units, json: bool) -> Result<()> {
    let limits = if rows { ROW_GAUGE } else { STITCH_GAUGE };
    let Some(per_inch) = gauge_per_inch(Some(number), Some(length), units) else {
        bail!("both a count and a length are required");
    };
    let verdict = limits.classify(per_inch);
    let kind = if rows { "rows" } else { "stitches" };

    if json {
        return print_json(&json!({
            "kind": kind,
            "per_inch": per_inch.is_finite().then_some(per_inch),
            "verdict": verdict_label(verdict),
        }));
    }
    println!("{kind} per inch: {per_inch:.2}");
    match verdict {
        GaugeVerdict::Workable => println!("gauge looks workable"),
        GaugeVerdict::Tiny => println!("warning: that gauge is very fine, check your swatch"),
        GaugeVerdict::Big => println!("warning: that gauge is very loose, check your swatch"),
    }
    Ok(())
}

#[derive(Debug)]
struct BodyInput {
    bust_circ: Option<String>,
    upper_torso_circ: Option<String>,
    cross_chest_distance: Option<String>,
    armpit_to_waist: Option<String>,
    armpit_to_high_hip: Option<String>,
    armpit_to_med_hip: Option<String>,
}

fn cmd_body(input: &BodyInput, units: Units, json: bool) -> Result<()> {
    let mut warnings = Vec::new();
    if bust_circumference_warning(input.bust_circ.as_deref(), units) {
        warnings.push("bust_circ_warning");
    }
    if input.cross_chest_distance.is_some()
        && cross_chest_warning(
            input.cross_chest_distance.as_deref(),
            input.upper_torso_circ.as_deref(),
            units,
        )
    {
        warnings.push("cross_chest_warning");
    }
    if armpit_to_waist_warning(
        input.armpit_to_waist.as_deref(),
        input.armpit_to_high_hip.as_deref(),
        input.armpit_to_med_hip.as_deref(),
    ) {
        warnings.push("armpit_to_waist_warning");
    }
    debug!(?input, ?warnings, "body measurements checked");

    if json {
        return print_json(&json!({ "units": units.to_string(), "warnings": warnings }));
    }
    if warnings.is_empty() {
        println!("no warnings");
    }
    for warning in warnings {
        println!("warning: {warning}");
    }
    Ok(())
}

fn cmd_measure(inches: f64, json: bool) -> Result<()> {
    if !inches.is_finite() {
        bail!("measurement must be a finite number of inches");
    }
    let text = to_plain_text(&format_measurement(inches));
    if json {
        return print_json(&json!({ "inches": inches, "text": text }));
    }
    println!("{text}");
    Ok(())
}

fn cmd_quote(quantity: &str, json: bool) -> Result<()> {
    let quote = Quote::for_quantity(quantity);
    if json {
        return print_json(&json!({ "total": quote.total, "bonus": quote.bonus }));
    }
    println!("{}", quote.total);
    if !quote.bonus.is_empty() {
        println!("{}", quote.bonus);
    }
    Ok(())
}

fn parse_set(raw: &str) -> Result<(&str, &str)> {
    raw.split_once('=')
        .filter(|(field, _)| !field.is_empty())
        .with_context(|| format!("expected FIELD=VALUE, got '{raw}'"))
}

/// Feed every simulated image load back into the engine.
fn settle(surface: &RecordingSurface, engine: &OverlayEngine) {
    for request in surface.image_requests() {
        engine.image_loaded(request.ticket);
    }
    surface.take();
}

fn visibility_label(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Unknown => "unknown",
        Visibility::Shown => "shown",
        Visibility::Hidden => "hidden",
    }
}

#[derive(Debug, Serialize)]
struct FieldReport {
    field: String,
    visibility: &'static str,
    value: Option<String>,
}

#[derive(Debug, Serialize)]
struct LayerReport {
    field: String,
    source: String,
}

fn field_reports(form: &Form) -> Result<Vec<FieldReport>> {
    form.field_names()
        .into_iter()
        .map(|field| {
            Ok(FieldReport {
                visibility: visibility_label(form.visibility(&field)?),
                value: form.read(&field)?,
                field,
            })
        })
        .collect()
}

fn print_fields(fields: &[FieldReport]) {
    for report in fields {
        println!(
            "{:<28} {:<8} {}",
            report.field,
            report.visibility,
            report.value.as_deref().unwrap_or("-")
        );
    }
}

fn load_sources(path: Option<&Path>) -> Result<HashMap<String, String>> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("invalid image sources in {}", path.display()))
        }
        None => Ok(SCHEMATIC_IMAGES
            .iter()
            .map(|name| ((*name).to_string(), format!("{}.png", name.to_lowercase())))
            .collect()),
    }
}

fn cmd_wizard(sets: &[String], sources: Option<&Path>, reveal: bool, json: bool) -> Result<()> {
    let surface = Rc::new(RecordingSurface::new());
    let form = wizard::wizard_fields()
        .into_iter()
        .fold(
            Form::builder().surface(surface.clone()),
            |builder, (name, values)| {
                if values.is_empty() {
                    builder.field(FieldAccessor::text_input(name))
                } else {
                    builder.field(FieldAccessor::radio_group(name, values))
                }
            },
        )
        .build()?;

    let engine = OverlayEngine::new(form.clone(), CompilationRegistry::new());
    wizard::install_dependencies(&form)?;
    wizard::install_overlay(&engine, "#schematic", load_sources(sources)?)?;
    settle(&surface, &engine);

    for raw in sets {
        let (field, value) = parse_set(raw)?;
        form.input(field, value)
            .with_context(|| format!("cannot set {field}"))?;
        settle(&surface, &engine);
    }
    if reveal {
        wizard::reveal_neckline_depth(&form)?;
    }
    info!(edits = sets.len(), "wizard simulated");

    let fields = field_reports(&form)?;
    let layers: Vec<LayerReport> = engine
        .registry()
        .layers("#schematic")
        .into_iter()
        .map(|(field, source)| LayerReport { field, source })
        .collect();

    if json {
        return print_json(&json!({ "fields": fields, "layers": layers }));
    }
    print_fields(&fields);
    println!();
    println!("schematic layers:");
    for layer in &layers {
        println!("  {:<20} {}", layer.field, layer.source);
    }
    Ok(())
}

fn cmd_check(path: &Path, sets: &[String], json: bool) -> Result<()> {
    let declaration = FormDeclaration::from_file(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let declared = declaration
        .build(Rc::new(RecordingSurface::new()))
        .with_context(|| format!("invalid declaration {}", path.display()))?;

    for raw in sets {
        let (field, value) = parse_set(raw)?;
        declared
            .form
            .input(field, value)
            .with_context(|| format!("cannot set {field}"))?;
    }

    let fields = field_reports(&declared.form)?;
    if json {
        return print_json(&json!({
            "units": declared.units.to_string(),
            "rules": declared.rules.len(),
            "fields": fields,
        }));
    }
    println!(
        "{}: {} fields, {} rules",
        path.display(),
        fields.len(),
        declared.rules.len()
    );
    print_fields(&fields);
    Ok(())
}
