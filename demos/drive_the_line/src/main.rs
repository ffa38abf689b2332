//! drive_the_line — walk a marker along a route across San Francisco.
//!
//! Loads a route (a directions response, a GeoJSON LineString, or the
//! built-in street-grid walk from the office to one of four destinations),
//! drives a `RouteSimulator` along it, prints a progress line every few
//! ticks, and optionally writes the full position trace to CSV.
//!
//! By default time is synthetic: ticks of the configured interval are
//! delivered as fast as possible.  `--realtime` uses a wall-clock
//! scheduler instead.

mod route;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use drive_core::{Coordinate, SimulatorConfig, TravelProfile};
use drive_output::{CsvTraceWriter, TraceListener};
use drive_path::{GeoPath, PathIndex};
use drive_sim::{IntervalScheduler, ManualScheduler, RouteSimulator, Scheduler};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Route geometry (directions response or GeoJSON LineString).
    #[arg(short, long)]
    route: Option<PathBuf>,

    /// JSON file holding a `SimulatorConfig`; missing fields take defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Built-in destination when no `--route` is given.
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..4))]
    destination: u8,

    /// Derive the speed from a routing profile (walking, cycling, driving, driving-traffic).
    #[arg(long)]
    profile: Option<TravelProfile>,

    /// Simulated seconds per real second when deriving speed from `--profile`.
    #[arg(long, default_value_t = 1.0)]
    time_scale: f64,

    /// Override the speed, in path units per simulated second.
    #[arg(short, long)]
    speed: Option<f64>,

    /// Start from the point on the route closest to `LON,LAT`.
    #[arg(long, value_parser = parse_lon_lat)]
    resume_from: Option<Coordinate>,

    /// Directory to write `trace.csv` into.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Tick on a wall-clock thread instead of as fast as possible.
    #[arg(long)]
    realtime: bool,

    /// Print a progress line every N ticks.
    #[arg(long, default_value_t = 250)]
    every: u64,

    /// Safety cap on synthetic ticks.
    #[arg(long, default_value_t = 10_000_000)]
    max_ticks: u64,

    #[arg(short, long)]
    debug: bool,
}

fn parse_lon_lat(s: &str) -> Result<Coordinate, String> {
    let (lon, lat) = s.split_once(',').ok_or("expected LON,LAT")?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("longitude: {e}"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("latitude: {e}"))?;
    Ok(Coordinate::new(lon, lat))
}

// ── Setup ─────────────────────────────────────────────────────────────────────

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(cli: &Cli) -> Result<SimulatorConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => SimulatorConfig::default(),
    };
    if let Some(profile) = cli.profile {
        config = SimulatorConfig {
            tick_interval_ms: config.tick_interval_ms,
            ..SimulatorConfig::for_profile(profile, cli.time_scale)
        };
    }
    if let Some(speed) = cli.speed {
        config.speed = speed;
    }
    config.validate()?;
    Ok(config)
}

// ── Run ───────────────────────────────────────────────────────────────────────

/// Build the simulator on `scheduler`, attach listeners, then hand control
/// to `drive` until the run is over.
fn simulate<S: Scheduler>(
    path:      Arc<GeoPath>,
    config:    &SimulatorConfig,
    scheduler: S,
    cli:       &Cli,
    drive:     impl FnOnce(&RouteSimulator<S>),
) -> Result<()> {
    let mut sim = RouteSimulator::from_config(Arc::clone(&path), config, scheduler)?;
    let unit = config.metric.unit().map_or("units", |u| u.as_str());

    let every = cli.every.max(1);
    let progress_path = Arc::clone(&path);
    sim.add_listener(move |e| {
        if e.tick.0 % every == 0 || e.is_final() {
            let line = progress_path.traveled_path(e.traveled_distance);
            println!(
                "{:>8}  {}  {:>5.1}°  {:>9.3} {unit}  {:>5.1} %  vertex {:>3}  progress line {} pts",
                e.tick.to_string(),
                e.coordinate,
                e.bearing,
                e.traveled_distance,
                e.fraction_complete * 100.0,
                e.nearest_index,
                line.len(),
            );
        }
        Ok(())
    });

    let trace = match &cli.output {
        Some(dir) => Some(open_trace(dir)?),
        None => None,
    };
    if let Some(trace) = &trace {
        sim.add_weak_listener(trace);
    }

    sim.start();
    if let Some(at) = cli.resume_from {
        let d = PathIndex::new(&path).snap_distance(at);
        info!(%at, distance = d, "resuming from snapped position");
        sim.seek(d);
    }

    let wall = Instant::now();
    drive(&sim);
    let phase = sim.phase();
    sim.stop();

    let last = sim.current_position();
    let clock = sim.clock();
    println!();
    println!("Phase: {phase:?}");
    println!("Ticks: {}  |  Simulated: {:.1} s  |  Wall: {:.2?}", clock.current_tick.0, clock.elapsed_secs(), wall.elapsed());
    println!("Final position: {}  ({:.1} % of route)", last.coordinate, last.fraction_complete * 100.0);
    if let Some(u) = config.metric.unit() {
        println!("Distance covered: {:.0} m", u.to_meters(last.traveled_distance));
    }
    if sim.failed_notifications() > 0 {
        warn!(failed = sim.failed_notifications(), "some notifications failed");
    }

    if let Some(trace) = trace {
        let mut trace = trace.lock();
        trace.finish();
        if let Some(e) = trace.take_error() {
            eprintln!("output error: {e}");
        } else if let Some(file) = trace.writer().path() {
            println!("Trace: {} rows → {}", trace.written(), file.display());
        }
    }
    Ok(())
}

type SharedTrace = Arc<parking_lot::Mutex<TraceListener<CsvTraceWriter>>>;

fn open_trace(dir: &Path) -> Result<SharedTrace> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let writer = CsvTraceWriter::new(dir)?;
    Ok(Arc::new(parking_lot::Mutex::new(TraceListener::new(writer))))
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = load_config(&cli)?;
    let coords = match &cli.route {
        Some(file) => route::load(file)?,
        None => route::builtin(route::DESTINATIONS[cli.destination as usize]),
    };
    let path = Arc::new(GeoPath::with_metric(coords, config.metric)?);

    println!("=== drive_the_line ===");
    println!(
        "Route: {} vertices, {:.3} {}  |  Speed: {} per s  |  Tick: {} ms{}",
        path.len(),
        path.total_length(),
        config.metric.unit().map_or("units", |u| u.as_str()),
        config.speed,
        config.tick_interval_ms,
        if cli.realtime { "  |  realtime" } else { "" },
    );
    println!("From {}  to {}", path.first(), path.last());
    println!();

    if cli.realtime {
        simulate(path, &config, IntervalScheduler::new(), &cli, |sim| {
            while sim.is_running() {
                thread::sleep(Duration::from_millis(50));
            }
        })
    } else {
        let clock = ManualScheduler::new();
        let dt = config.tick_interval();
        simulate(path, &config, clock.clone(), &cli, |_| {
            let n = clock.run(dt, cli.max_ticks);
            info!(ticks = n, "synthetic run complete");
        })
    }
}
