use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use civitas::{
    names::NameCatalog,
    scenario::ScenarioLoader,
    snapshot::SnapshotWriter,
    web::{self, ObserverConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "civitas city simulation runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/riverton.yaml")]
    scenario: PathBuf,

    /// Override cycle count (uses the scenario default when omitted)
    #[arg(long)]
    cycles: Option<u32>,

    /// Override the scenario's random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the snapshot interval in cycles (0 disables snapshots)
    #[arg(long)]
    snapshot_interval: Option<u32>,

    /// Directory for snapshot frames
    #[arg(long, default_value = "snapshots")]
    snapshot_dir: PathBuf,

    /// Building-name catalog (falls back to built-in names when missing)
    #[arg(long, default_value = "data/building-names.json")]
    names: PathBuf,

    /// Serve the observation API instead of running headless
    #[arg(long)]
    serve: bool,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 4280)]
    port: u16,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    if let Some(interval) = cli.snapshot_interval {
        scenario.snapshot_interval_cycles = interval;
    }
    let names = NameCatalog::load(&cli.names);
    let cycles = scenario.cycles(cli.cycles);

    if cli.serve {
        let config = ObserverConfig {
            scenario,
            names,
            cycles,
            host: cli.host,
            port: cli.port,
        };
        return tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(web::run(config));
    }

    let mut simulation = scenario.build_simulation(&names)?;
    let writer = SnapshotWriter::new(&cli.snapshot_dir, scenario.snapshot_interval_cycles);
    let mut snapshot_error = None;
    simulation.run_cycles_with_hook(cycles, |sim| {
        if let Err(err) = writer.maybe_write(sim) {
            snapshot_error.get_or_insert(err);
        }
    });
    if let Some(err) = snapshot_error {
        return Err(err);
    }

    let city = simulation.city();
    println!(
        "Scenario '{}' ran {} cycles ({:?}). Population: {}, budget: {:.2}, satisfaction: {}, pollution: {:.1}",
        scenario.name,
        simulation.cycle(),
        simulation.state(),
        city.population(),
        city.budget(),
        city.satisfaction(),
        city.pollution(),
    );
    Ok(())
}
