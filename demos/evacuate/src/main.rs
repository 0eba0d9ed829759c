//! evacuate: command-line front end for the evacuation route engine.
//!
//! Resolves a free-text location to a region, then lists the nearest
//! low-flood-risk regions reachable by road with distance and ETA under the
//! chosen weather and hour.  Runs on a built-in synthetic city unless region
//! and road CSVs are supplied.
//!
//! ```text
//! evacuate "andheri eest" -k 3 --weather heavy-rain --hour 18
//! evacuate kurla --regions wards.csv --nodes nodes.csv --edges edges.csv --json
//! RUST_LOG=evac_planner=debug evacuate dadar
//! ```

mod network;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use evac_planner::{
    PlanError, PlannerConfig, RouteOptions, RoutePlan, RoutePlanner, RoutePlannerBuilder,
    Snapshot, SnapshotStore, WeatherCondition,
};
use evac_regions::load_regions_csv;
use evac_spatial::{DijkstraRouter, load_network_csv};

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WeatherArg {
    Clear,
    LightRain,
    HeavyRain,
    Storm,
    Flood,
}

impl From<WeatherArg> for WeatherCondition {
    fn from(w: WeatherArg) -> Self {
        match w {
            WeatherArg::Clear     => WeatherCondition::Clear,
            WeatherArg::LightRain => WeatherCondition::LightRain,
            WeatherArg::HeavyRain => WeatherCondition::HeavyRain,
            WeatherArg::Storm     => WeatherCondition::Storm,
            WeatherArg::Flood     => WeatherCondition::Flood,
        }
    }
}

#[derive(Parser)]
#[command(name = "evacuate")]
#[command(about = "Find the nearest low-flood-risk regions reachable by road", long_about = None)]
struct Args {
    /// Where you are: a region name, typos allowed
    location: String,

    /// Number of destinations to list (capped at 10)
    #[arg(short, long)]
    k: Option<usize>,

    /// Base travel speed in km/h before weather and traffic
    #[arg(long)]
    speed: Option<f64>,

    /// Current weather
    #[arg(long, value_enum, default_value = "clear")]
    weather: WeatherArg,

    /// Hour of departure, 0–23
    #[arg(long, default_value = "12")]
    hour: u8,

    /// Require a closer name match before picking the origin
    #[arg(long)]
    strict: bool,

    /// Region CSV (name, lat, lon, risk)
    #[arg(long, env = "EVAC_REGIONS")]
    regions: Option<PathBuf>,

    /// Road node CSV (id, lat, lon); needs --edges
    #[arg(long, requires = "edges")]
    nodes: Option<PathBuf>,

    /// Road edge CSV (from, to, length_m[, oneway]); needs --nodes
    #[arg(long, requires = "nodes")]
    edges: Option<PathBuf>,

    /// Planner configuration as JSON
    #[arg(long, env = "EVAC_CONFIG")]
    config: Option<PathBuf>,

    /// Print the plan as JSON instead of a table
    #[arg(long)]
    json: bool,
}

// ── Data loading ──────────────────────────────────────────────────────────────

fn load_snapshot(args: &Args) -> Result<Snapshot, PlanError> {
    let regions = match &args.regions {
        Some(path) => load_regions_csv(path)?,
        None => network::build_regions()?,
    };
    let net = match (&args.nodes, &args.edges) {
        (Some(nodes), Some(edges)) => load_network_csv(nodes, edges)?,
        _ => network::build_network()?,
    };
    Snapshot::build(regions, net)
}

fn load_config(args: &Args) -> Result<PlannerConfig> {
    let Some(path) = &args.config else {
        return Ok(PlannerConfig::default());
    };
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening config {}", path.display()))?;
    serde_json::from_reader(file).with_context(|| format!("parsing config {}", path.display()))
}

// ── Output ────────────────────────────────────────────────────────────────────

fn print_plan(planner: &RoutePlanner, snapshot: &Snapshot, plan: &RoutePlan, base_speed: f64) {
    let speed = &planner.config().speed;
    let stats = snapshot.stats();

    println!("=== evacuate: risk-aware evacuation routes ===");
    println!(
        "Dataset: {} regions ({} safe zones)  |  {} road nodes, {} edges",
        stats.regions, stats.safe_zones, stats.nodes, stats.edges
    );
    println!(
        "Conditions: {} at {:02}:00  |  weather {:+.0}%  traffic {:+.0}%  |  effective {:.1} km/h (base {:.1})",
        plan.weather,
        plan.hour_of_day,
        speed.weather_impact_pct(plan.weather),
        speed.congestion_impact_pct(plan.hour_of_day),
        speed.effective_speed_kmph(base_speed, plan.weather, plan.hour_of_day),
        base_speed,
    );
    println!(
        "Origin: {} (match {})  →  road node {}",
        plan.matched_region,
        plan.match_score,
        snapshot.network().source_id(plan.origin_node),
    );
    println!();

    if plan.routes.is_empty() {
        println!("No low-risk region is reachable from here.");
        return;
    }

    let edge_risks = snapshot.edge_risks();
    println!("{:<3} {:<18} {:>9} {:>9} {:>6}  {}", "#", "Destination", "km", "ETA min", "Hops", "Risk along route");
    println!("{}", "-".repeat(72));
    for (i, route) in plan.routes.iter().enumerate() {
        let risks: Vec<&str> = edge_risks
            .path_risks(snapshot.network(), &route.path)
            .into_iter()
            .map(|r| r.as_str())
            .collect();
        println!(
            "{:<3} {:<18} {:>9.2} {:>9.1} {:>6}  {}",
            i + 1,
            route.destination_region,
            route.distance_km,
            route.eta_min,
            route.path.len().saturating_sub(1),
            if risks.is_empty() { "-".to_string() } else { risks.join(" → ") },
        );
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // 1. Planner.
    let planner = RoutePlannerBuilder::new(DijkstraRouter)
        .config(load_config(&args)?)
        .build()
        .context("invalid planner configuration")?;

    // 2. Snapshot, built on first use.
    let t0 = Instant::now();
    let store = SnapshotStore::new();
    let snapshot = store
        .get_or_try_init(|| load_snapshot(&args))
        .context("loading dataset")?;
    tracing::info!(elapsed_ms = t0.elapsed().as_millis() as u64, "dataset ready");

    // 3. Request.
    let mut options = if args.strict {
        planner.config().strict_options()
    } else {
        RouteOptions::default()
    };
    options = options.weather(args.weather.into()).hour(args.hour);
    if let Some(k) = args.k {
        options = options.k(k);
    }
    if let Some(speed) = args.speed {
        options = options.base_speed(speed);
    }

    let plan = match planner.compute_routes(&snapshot, &args.location, &options) {
        Ok(plan) => plan,
        Err(PlanError::UnmatchedLocation { query, best }) => {
            eprintln!("No region matches {query:?}.");
            if let Some(m) = best {
                eprintln!("Closest was {:?} (score {}).", m.matched_name, m.score);
            }
            let suggestions = snapshot.regions().suggest(&query, 5);
            if !suggestions.is_empty() {
                eprintln!("Did you mean: {}", suggestions.join(", "));
            }
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e.into()),
    };

    // 4. Report.
    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        let base = args.speed.unwrap_or(planner.config().speed.base_speed_kmph);
        print_plan(&planner, &snapshot, &plan, base);
    }
    Ok(ExitCode::SUCCESS)
}
