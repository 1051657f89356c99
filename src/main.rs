use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use structure_markers::webmap::{MarkerApi, MarkerSpec, MemoryMarkerApi};
use structure_markers::world::FixedWorld;
use structure_markers::{
    Biome, BiomeTable, Chunk, Config, GameVersion, PlatformCapabilities, Settings, StructureMarkers,
    SyncReport,
};

#[derive(Parser, Debug)]
#[command(name = "structure-markers")]
#[command(about = "Marks generated Minecraft structures on a web-map overlay layer")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Game version of the host platform
    #[arg(short, long, default_value_t = GameVersion::LATEST, global = true)]
    platform: GameVersion,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the biome to structure table as JSON
    Table {
        /// Only print the structures of this biome
        #[arg(short, long)]
        biome: Option<String>,
    },
    /// Print the resolved per-structure settings as JSON
    Check,
    /// Run a world snapshot through the marker pipeline and print the markers
    Replay {
        /// World snapshot (JSON)
        world: PathBuf,
    },
}

#[derive(Serialize)]
struct ReplayOutput {
    chunks: usize,
    scheduled: usize,
    reports: Vec<SyncReport>,
    markers: Vec<MarkerSpec>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = match args.verbose {
        0 => "structure_markers=info",
        1 => "structure_markers=debug",
        _ => "structure_markers=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("structure-markers v{} for platform {}", env!("CARGO_PKG_VERSION"), args.platform);
    let caps = PlatformCapabilities::for_version(args.platform);

    match args.command {
        Command::Init { force } => {
            if args.config.exists() && !force {
                bail!("{} already exists, use --force to overwrite", args.config.display());
            }
            Config::default().save(&args.config)?;
            info!("Wrote default configuration to {}", args.config.display());
        }
        Command::Table { biome } => {
            let table = BiomeTable::build(&caps);
            let json = match biome {
                Some(key) => {
                    let biome = Biome::parse(&key).with_context(|| format!("unknown biome {key}"))?;
                    serde_json::to_string_pretty(&table.eligible(biome))?
                }
                None => serde_json::to_string_pretty(&table)?,
            };
            println!("{json}");
        }
        Command::Check => {
            let config = load_config(&args.config)?;
            let settings = Settings::resolve(&config, &caps);
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Command::Replay { world } => {
            let config = load_config(&args.config)?;
            let output = replay(&config, &caps, &world).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Read the config file if there is one; fall back to the defaults
fn load_config(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        Ok(Config::from_file(path)?)
    } else {
        info!("No config at {}, using defaults", path.display());
        Ok(Config::default())
    }
}

async fn replay(config: &Config, caps: &PlatformCapabilities, path: &Path) -> anyhow::Result<ReplayOutput> {
    let world = Arc::new(
        FixedWorld::from_file(path)
            .with_context(|| format!("could not load world snapshot {}", path.display()))?,
    );
    let api = Arc::new(MemoryMarkerApi::new());
    let webmap: Arc<dyn MarkerApi> = api.clone();

    let mut plugin = StructureMarkers::enable(config, caps, Some(webmap));
    let worker = plugin.take_worker().context("web-map layer could not be set up")?;
    let runner = tokio::spawn(worker.run());

    let chunks = world.snapshot_chunks();
    let mut scheduled = 0;
    for (x, z) in &chunks {
        if plugin.on_chunk_generated(Chunk::new(world.clone(), *x, *z)) {
            scheduled += 1;
        }
    }
    plugin.disable();
    let reports = runner.await?;

    let layer_id = config.layer.name.to_lowercase();
    let markers = api.memory_set(&layer_id).map(|set| set.markers()).unwrap_or_default();
    info!("Replayed {} chunks, {} markers on layer {}", chunks.len(), markers.len(), layer_id);

    Ok(ReplayOutput {
        chunks: chunks.len(),
        scheduled,
        reports,
        markers,
    })
}
