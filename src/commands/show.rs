use std::fs;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde_json::Value;

use crate::cli::{Cli, ShowArgs};
use crate::common::geog::{all_state_codes, state_name};
use crate::metrics::{HttpMetrics, MetricsCache};
use crate::render::SvgSurface;
use crate::source::{GeometrySource, HttpTransport, SourceUrls};
use crate::{Drilldown, GenerateOutcome};

const SVG_WIDTH: f64 = 960.0;
const SVG_HEIGHT: f64 = 600.0;

pub fn run(cli: &Cli, args: &ShowArgs) -> Result<()> {
    if !args.force && args.out.exists() {
        bail!("Refusing to overwrite existing file: {} (use --force)", args.out.display());
    }

    let urls = SourceUrls {
        states: args.states_url.clone(),
        districts: args.districts_url.clone(),
    };
    let source = Arc::new(GeometrySource::new(Arc::new(HttpTransport::new()?), urls));
    let metrics = Arc::new(MetricsCache::new(Arc::new(HttpMetrics::new(&args.metrics_url)?)));
    let mut drill = Drilldown::new(source, metrics.clone(), SvgSurface::new(SVG_WIDTH, SVG_HEIGHT));

    // Warm every state's metrics so the nationwide overlay is colored
    // by classification instead of rendering all-unknown.
    if cli.verbose > 0 { eprintln!("[show] warming metrics for the national overlay"); }
    let codes: Vec<String> = all_state_codes().map(str::to_string).collect();
    metrics.warm(&codes);

    if cli.verbose > 0 { eprintln!("[show] loading national boundaries"); }
    drill.init()?;

    if cli.verbose > 0 { eprintln!("[show] selecting {}", args.state); }
    drill.select_state(&args.state)?;

    if let Some(mode) = args.plan {
        if cli.verbose > 0 { eprintln!("[show] generating {:?} plan styling", mode); }
        if drill.generate_plan(&args.state, mode.into()) == GenerateOutcome::Skipped {
            eprintln!("[show] plan generation skipped: no districts to restyle");
        }
    }

    let code = args.state.to_ascii_uppercase();
    let districts = drill.view().districts.as_ref().map(|d| d.len()).unwrap_or(0);
    println!("{} ({code}): {districts} districts", state_name(&code).unwrap_or(code.as_str()));

    let record = metrics.get(&code);
    {
        let record = record.lock();
        println!("classification: {}", record.classification);
        if !record.summary.extra.is_empty() {
            let summary = Value::Object(record.summary.extra.clone());
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        for note in &record.summary.notes {
            println!("- {note}");
        }
    }

    let svg = drill.into_surface().to_svg();
    fs::write(&args.out, svg)
        .with_context(|| format!("write {}", args.out.display()))?;
    println!("Wrote {}", args.out.display());
    Ok(())
}
