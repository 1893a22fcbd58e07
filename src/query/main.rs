//! Query CLI for the earthquake catalog.
//!
//! Loads a catalog, applies user-supplied track shapes and attribute range
//! filters, and prints the matching records as report rows or JSON.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use geo::Coord;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use epicenter::config::Config;
use epicenter::report::QueryReport;
use epicenter::{
    EarthquakeCatalog, FilterSet, QuerySession, RangeFilter, Track, UnknownYearRule,
};

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Spatial and attribute queries over an earthquake catalog")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Catalog CSV path (overrides the config file)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Rectangle track: "minX,minY,maxX,maxY" (repeatable)
    #[arg(long)]
    rect: Vec<String>,

    /// Polygon track as space-separated vertices: "x,y x,y x,y" (repeatable)
    #[arg(long)]
    polygon: Vec<String>,

    /// Magnitude range override: "lower,upper"
    #[arg(long)]
    magnitude: Option<String>,

    /// Depth range override in km: "lower,upper"
    #[arg(long)]
    depth: Option<String>,

    /// Year range override: "lower,upper"
    #[arg(long)]
    year: Option<String>,

    /// Boundary tolerance override in map units
    #[arg(long)]
    tolerance: Option<f64>,

    /// Use the legacy rule where an unknown year bypasses all filters
    #[arg(long)]
    legacy_year_rule: bool,

    /// Emit the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Some(Config::load_from_file(path)?),
        None => None,
    };

    let data_path = args
        .data
        .clone()
        .or_else(|| config.as_ref().map(|c| c.catalog.path.clone()))
        .context("no catalog: pass --data or a config file with [catalog] path")?;

    let catalog = EarthquakeCatalog::load_csv(&data_path)?;

    let filters = build_filters(&args, config.as_ref())?;
    let tolerance = args
        .tolerance
        .or_else(|| config.as_ref().map(|c| c.query.boundary_tolerance))
        .unwrap_or(epicenter::DEFAULT_BOUNDARY_TOLERANCE);

    let session = QuerySession::with_settings(&catalog, tolerance, filters);

    for spec in &args.rect {
        session.add_track(parse_rect(spec)?);
    }
    for spec in &args.polygon {
        session.add_track(parse_polygon(spec)?);
    }
    info!(
        "Querying {} records with {} track(s)",
        session.catalog_size(),
        session.track_count()
    );

    let result = session.run_query();
    let report = QueryReport::new(&result);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary);
        for row in &report.rows {
            println!("{}", row);
        }
    }

    Ok(())
}

fn build_filters(args: &Args, config: Option<&Config>) -> Result<FilterSet> {
    let rule = if args.legacy_year_rule {
        UnknownYearRule::BypassAll
    } else {
        config
            .map(|c| c.query.unknown_year_rule)
            .unwrap_or_default()
    };

    let mut filters = match config {
        Some(c) => c.filters.to_filter_set(rule),
        None => FilterSet {
            unknown_year_rule: rule,
            ..FilterSet::permissive()
        },
    };

    if let Some(spec) = &args.magnitude {
        filters.magnitude = parse_range(spec).context("invalid --magnitude range")?;
    }
    if let Some(spec) = &args.depth {
        filters.depth_km = parse_range(spec).context("invalid --depth range")?;
    }
    if let Some(spec) = &args.year {
        filters.year = parse_range(spec).context("invalid --year range")?;
    }

    Ok(filters)
}

/// Parse a "lower,upper" pair.
fn parse_range(spec: &str) -> Result<RangeFilter> {
    let parts: Vec<f64> = spec
        .split(',')
        .filter_map(|p| p.trim().parse().ok())
        .collect();
    if parts.len() != 2 {
        bail!("expected \"lower,upper\", got {:?}", spec);
    }
    Ok(RangeFilter::new(parts[0], parts[1]))
}

/// Parse a "minX,minY,maxX,maxY" rectangle.
fn parse_rect(spec: &str) -> Result<Track> {
    let parts: Vec<f64> = spec
        .split(',')
        .filter_map(|p| p.trim().parse().ok())
        .collect();
    if parts.len() != 4 {
        bail!("expected \"minX,minY,maxX,maxY\", got {:?}", spec);
    }
    Ok(Track::rect(parts[0], parts[1], parts[2], parts[3])?)
}

/// Parse a polygon given as space-separated "x,y" vertices.
fn parse_polygon(spec: &str) -> Result<Track> {
    let mut vertices = Vec::new();
    for vertex in spec.split_whitespace() {
        let parts: Vec<f64> = vertex
            .split(',')
            .filter_map(|p| p.trim().parse().ok())
            .collect();
        if parts.len() != 2 {
            bail!("expected vertex \"x,y\", got {:?}", vertex);
        }
        vertices.push(Coord {
            x: parts[0],
            y: parts[1],
        });
    }
    Ok(Track::new(vertices)?)
}
