//! `render` command: replay visibility updates against an in-memory map.
//!
//! Loads an entity file, builds the entity map on a recording surface and
//! applies each `--show` vector in order, printing the surface calls each
//! update issued and what ends up on the map. `--click` delivers marker
//! clicks after the last update.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use clap::Args;
use entitymap::{
    load_entities, ConfigFile, Entity, EntityMap, RecordingSurface, RenderableKey, Rgba,
    SurfaceOp, UpdateSummary,
};

use crate::error::CliError;

/// Arguments for the render command.
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// JSON file with an array of {"id", "label"?, "lat", "lon"} records
    #[arg(long, short = 'e')]
    pub entities: PathBuf,

    /// Visibility vector, one flag per entity (e.g. 1,0,1). Repeat to apply several updates
    #[arg(long = "show", short = 's')]
    pub show: Vec<Visibility>,

    /// Connector line color as #rrggbb (defaults to map.line_color from config)
    #[arg(long)]
    pub line_color: Option<Rgba>,

    /// Marker index to click after the last update. Repeatable
    #[arg(long)]
    pub click: Vec<usize>,
}

/// A parsed visibility vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visibility(pub Vec<bool>);

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Visibility(Vec::new()));
        }

        s.split(',')
            .map(|token| match token.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "y" | "yes" | "on" => Ok(true),
                "0" | "false" | "n" | "no" | "off" => Ok(false),
                other => Err(format!("invalid visibility flag '{}'", other)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Visibility)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags: Vec<&str> = self.0.iter().map(|&b| if b { "1" } else { "0" }).collect();
        write!(f, "[{}]", flags.join(" "))
    }
}

/// What one update did.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub requested: Visibility,
    pub summary: UpdateSummary,
    pub ops: Vec<SurfaceOp>,
    pub present: Vec<RenderableKey>,
}

/// Outcome of a full render session.
#[derive(Debug, Clone)]
pub struct RenderReport {
    pub steps: Vec<StepReport>,
    /// Entity ids notified by clicks, in click order.
    pub clicked: Vec<String>,
    pub released: usize,
}

/// Run the render command.
pub fn run(args: RenderArgs) -> Result<(), CliError> {
    let line_color = match args.line_color {
        Some(color) => color,
        None => ConfigFile::load()?.map.line_color,
    };

    let entities = load_entities(&args.entities)?;
    println!(
        "Loaded {} entities from {}",
        entities.len(),
        args.entities.display()
    );

    let report = render(entities, line_color, &args.show, &args.click)?;
    print_report(&report);
    Ok(())
}

/// Build the entity map and replay updates and clicks against it.
///
/// Vector lengths are checked up front so a bad argument is reported rather
/// than aborting inside the update.
pub fn render(
    entities: Vec<Entity>,
    line_color: Rgba,
    updates: &[Visibility],
    clicks: &[usize],
) -> Result<RenderReport, CliError> {
    let n = entities.len();
    if let Some((i, bad)) = updates.iter().enumerate().find(|(_, v)| v.0.len() != n) {
        return Err(CliError::Usage(format!(
            "--show #{} has {} flags but there are {} entities",
            i + 1,
            bad.0.len(),
            n
        )));
    }
    if let Some(&bad) = clicks.iter().find(|&&index| index >= n) {
        return Err(CliError::Usage(format!(
            "--click {} is out of range for {} entities",
            bad, n
        )));
    }

    let surface = Arc::new(RecordingSurface::new());
    let clicked = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&clicked);

    let map = EntityMap::new(
        surface.clone(),
        move |e: &Entity| {
            if let Ok(mut sink) = sink.lock() {
                sink.push(e.id.clone());
            }
        },
        line_color,
        entities,
    );

    let mut steps = Vec::with_capacity(updates.len());
    for requested in updates {
        let summary = map.update(&requested.0);
        steps.push(StepReport {
            requested: requested.clone(),
            summary,
            ops: surface.drain_log(),
            present: surface.present(),
        });
    }

    for &index in clicks {
        map.click_marker(index);
    }
    let released = map.release();

    let clicked = clicked.lock().map(|c| c.clone()).unwrap_or_default();

    Ok(RenderReport {
        steps,
        clicked,
        released,
    })
}

fn print_report(report: &RenderReport) {
    for (i, step) in report.steps.iter().enumerate() {
        let kind = if step.summary.initial { " (initial)" } else { "" };
        println!();
        println!("Update {}{}: {}", i + 1, kind, step.requested);

        if step.ops.is_empty() {
            println!("  (no changes)");
        }
        for op in &step.ops {
            println!("  {}", op);
        }

        let present: Vec<String> = step.present.iter().map(|k| k.to_string()).collect();
        println!("  on map: {}", if present.is_empty() { "(nothing)".to_string() } else { present.join(", ") });
    }

    if !report.clicked.is_empty() {
        println!();
        for id in &report.clicked {
            println!("Clicked: {}", id);
        }
    }

    println!();
    println!("Released {} click handlers", report.released);
}
