//! Trace the net under a point of a JSON layout library
//!
//! Usage:
//!   cargo run --release --bin net_trace -- <library.json> <layers.json> <x> <y> [options]
//!
//! Options:
//!   --config <file>     JSON trace configuration
//!   --top <cell>        Root cell (default: first unreferenced cell)
//!   --no-collapse       Keep the hierarchy as loaded
//!   --hierarchy         Log the cell tree (with RUST_LOG=debug)
//!
//! The traced polygons are written to stdout as JSON; logs go to stderr.

use std::env;
use std::io::{self, Write};
use std::time::Instant;

use anyhow::{bail, Context};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use layout_trace::trace::InstantClock;
use layout_trace::{LayerTable, LibrarySource, NetTracer, Point, SearchContext, SearchState, TraceConfig, TracedPolygon};

#[derive(Serialize)]
struct TraceReport {
    state: SearchState,
    instances: usize,
    polygons: Vec<TracedPolygon>,
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <library.json> <layers.json> <x> <y> [options]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <file>    JSON trace configuration");
    eprintln!("  --top <cell>       Root cell (default: first unreferenced cell)");
    eprintln!("  --no-collapse      Keep the hierarchy as loaded");
    eprintln!("  --hierarchy        Log the cell tree (with RUST_LOG=debug)");
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 5 {
        print_usage(&args[0]);
        return Ok(());
    }

    let library_path = &args[1];
    let layers_path = &args[2];
    let x: f64 = args[3].parse().with_context(|| format!("Invalid x coordinate '{}'", args[3]))?;
    let y: f64 = args[4].parse().with_context(|| format!("Invalid y coordinate '{}'", args[4]))?;

    let mut config = TraceConfig::default();
    let mut top: Option<String> = None;
    let mut print_hierarchy = false;

    let mut i = 5;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                if i >= args.len() {
                    bail!("--config needs a file");
                }
                config = TraceConfig::from_json_file(&args[i])?;
            }
            "--top" => {
                i += 1;
                if i >= args.len() {
                    bail!("--top needs a cell name");
                }
                top = Some(args[i].clone());
            }
            "--no-collapse" => config.collapse = false,
            "--hierarchy" => print_hierarchy = true,
            other => {
                print_usage(&args[0]);
                bail!("Unknown option '{}'", other);
            }
        }
        i += 1;
    }
    config.validate()?;

    let start = Instant::now();
    let layers = LayerTable::from_json_file(layers_path)?;
    let mut source = LibrarySource::from_json_file(library_path)?;
    if top.is_some() {
        source.top = top;
    }
    let mut library = source.build(&layers)?;
    info!("Loaded {} cells and {} layers in {:?}", library.len(), layers.len(), start.elapsed());

    if config.collapse {
        library.collapse_hierarchy(&layers, config.hierarchy_threshold, config.child_threshold);
    } else {
        library.count_total_points(library.top());
    }
    if print_hierarchy {
        library.log_hierarchy();
    }
    library.prepare_triangulations();

    let tracer = NetTracer::new(&library, &layers, config);
    let mut ctx = SearchContext::new();
    let mut clock = InstantClock::new();

    if tracer.pick(&mut ctx, Point::new(x, y)) {
        let trace_start = Instant::now();
        let mut steps = 0usize;
        while ctx.is_tracing() {
            ctx = tracer.step(ctx, &mut clock);
            steps += 1;
        }
        info!("Traced {} polygons in {} steps, {:?}", ctx.checked_count(), steps, trace_start.elapsed());
    } else {
        info!("No metal polygon at ({}, {})", x, y);
    }

    let report = TraceReport {
        state: ctx.state(),
        instances: ctx.instance_count(),
        polygons: tracer.current_polygons(&ctx),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &report).context("Failed to write trace result")?;
    writeln!(out)?;
    Ok(())
}
