use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use chrono::NaiveTime;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use talispod::{
    creature::ElementCounters,
    engine::{EngineBuilder, EngineSettings},
    preview_tick,
    rank::CompatibilityEngine,
    scenario::ScenarioLoader,
    snapshot::SnapshotWriter,
    systems::install_default_systems,
    web::{self, WebServerConfig},
    world::World,
    AreaCatalog, Creature, Element, EnvironmentReading, GrowthTable,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Creature habitat growth simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a scenario headless for a fixed number of ticks
    Run(RunArgs),
    /// Resolve a single reading to an area and rank it for the stock creature
    Resolve(ResolveArgs),
    /// Run a scenario in real time behind the HTTP API
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/windragon.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override snapshot interval in ticks
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Continue from a previously written snapshot file
    #[arg(long)]
    resume: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ResolveArgs {
    #[arg(long, allow_hyphen_values = true)]
    temperature: i32,

    #[arg(long)]
    humidity: i32,

    /// Light level on land, water depth at sea
    #[arg(long, alias = "depth")]
    light: i32,

    /// Hour of day used for the light check
    #[arg(long, default_value_t = 12)]
    hour: u32,
}

#[derive(Debug, Args)]
struct ServeArgs {
    #[arg(long, default_value = "scenarios/windragon.yaml")]
    scenario: PathBuf,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Real seconds per simulated tick
    #[arg(long, default_value_t = 60.0)]
    tick_seconds: f64,

    /// Stop after this many ticks instead of running until Ctrl+C
    #[arg(long)]
    ticks: Option<u64>,

    #[arg(long)]
    snapshot_interval: Option<u64>,

    #[arg(long)]
    snapshot_dir: Option<PathBuf>,
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(true)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args),
        Command::Resolve(args) => {
            init_tracing("warn");
            resolve(args)
        }
        Command::Serve(args) => serve(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let scenario = ScenarioLoader::new(".").load(&args.scenario)?;
    init_tracing(&scenario.logging.level);

    let mut world = match &args.resume {
        Some(path) => {
            let saved = SnapshotWriter::load(path)
                .with_context(|| format!("Failed to resume from {}", path.display()))?;
            info!(tick = saved.tick, path = %path.display(), "resuming from snapshot");
            World::restore(saved, scenario.tick_minutes)
        }
        None => scenario.build_world(),
    };
    let ticks = scenario.ticks(args.ticks);
    let settings = EngineSettings {
        scenario_name: scenario.name.clone(),
        growth: scenario.growth,
        snapshot_interval_ticks: args
            .snapshot_interval
            .unwrap_or(scenario.snapshot_interval_ticks),
        snapshot_dir: args
            .snapshot_dir
            .unwrap_or_else(|| PathBuf::from("snapshots")),
    };

    let mut schedule = scenario.schedule();
    schedule.retain(|entry| entry.at_tick >= world.tick());
    let mut engine = install_default_systems(EngineBuilder::new(settings), schedule).build();

    info!(scenario = %scenario.name, ticks, "running scenario");
    engine.run(&mut world, ticks)?;

    let creature = &world.creature;
    info!(
        tick = world.tick(),
        hp = creature.current_hp,
        max_hp = creature.max_hp(),
        grow_hp = creature.grow_hp,
        exhausted_ticks = world.bookkeeping.exhausted_ticks,
        "scenario finished"
    );
    println!(
        "Scenario '{}' completed {} ticks. HP {}/{} (+{} grown), stats fire {} wind {} earth {} water {}",
        scenario.name,
        ticks,
        creature.current_hp,
        creature.max_hp(),
        creature.grow_hp,
        creature.stat(Element::Fire),
        creature.stat(Element::Wind),
        creature.stat(Element::Earth),
        creature.stat(Element::Water),
    );
    Ok(())
}

fn resolve(args: ResolveArgs) -> Result<()> {
    let reading = EnvironmentReading::new(args.temperature, args.humidity, args.light);
    let now = NaiveTime::from_hms_opt(args.hour, 0, 0)
        .with_context(|| format!("hour {} is outside 0..=23", args.hour))?;
    let catalog = AreaCatalog::standard();
    let compatibility = CompatibilityEngine::new(&catalog);
    let creature = Creature::windragon();
    let area = compatibility.resolver().resolve_reading(&reading).area().cloned();
    let rank = compatibility.compute_rank(&creature, &reading, &now, creature.attribute);
    let forecast = preview_tick(
        &creature,
        &rank,
        &ElementCounters::default(),
        &GrowthTable::default(),
    );
    let report = serde_json::json!({
        "reading": reading,
        "area": area,
        "rank": rank,
        "forecast": forecast,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn serve(args: ServeArgs) -> Result<()> {
    let scenario = ScenarioLoader::new(".").load(&args.scenario)?;
    init_tracing(&scenario.logging.level);

    let tick_period = Duration::try_from_secs_f64(args.tick_seconds)
        .with_context(|| format!("invalid --tick-seconds {}", args.tick_seconds))?;
    let snapshot_interval = args
        .snapshot_interval
        .unwrap_or(scenario.snapshot_interval_ticks);
    let config = WebServerConfig {
        scenario,
        ticks: args.ticks,
        tick_period,
        snapshot_interval,
        snapshot_dir: args
            .snapshot_dir
            .unwrap_or_else(|| PathBuf::from("snapshots")),
        host: args.host,
        port: args.port,
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(web::run(config))
}
