// src/main.rs
//! # ArenaForge command line
//!
//! Generates arenas into map files, checks hand-edited maps against the
//! generator's rules, and lists saved maps.

use arena_forge::document::{list_maps, MapDocument};
use arena_forge::generation::{resolve_seed, GenerationParams, LoggingObserver, MapGenerator};
use arena_forge::map::rules::revalidate;
use arena_forge::map::MapReport;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "arena_forge")]
#[command(about = "Generate symmetric, fully connected tile arenas")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an arena and save it as a map file
    Generate {
        /// JSON file with generation parameters (missing fields use defaults)
        #[arg(short, long)]
        params: Option<PathBuf>,

        /// Grid width in tiles
        #[arg(short = 'W', long)]
        width: Option<usize>,

        /// Grid height in tiles
        #[arg(short = 'H', long)]
        height: Option<usize>,

        /// Random seed (uses a random seed if not specified)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Prefab library: "builtin", a path, or "" for none
        #[arg(long)]
        prefabs: Option<String>,

        /// Skip both prefab passes
        #[arg(long)]
        no_prefabs: bool,

        /// Skip corridor carving and region merging
        #[arg(long)]
        no_connect: bool,

        /// Output map file
        #[arg(short, long, default_value = "maps/generated.json")]
        out: PathBuf,

        /// Log a summary of every intermediate snapshot
        #[arg(long)]
        trace_stages: bool,
    },
    /// Report rule violations in a saved map
    Check {
        path: PathBuf,

        /// Re-apply the border and hidden-wall rules and rewrite the file
        #[arg(long)]
        fix: bool,
    },
    /// List saved maps
    List {
        #[arg(short, long, default_value = "maps")]
        dir: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            params,
            width,
            height,
            seed,
            prefabs,
            no_prefabs,
            no_connect,
            out,
            trace_stages,
        } => {
            let mut params = match params {
                Some(path) => GenerationParams::from_file(&path)?,
                None => GenerationParams::default(),
            };
            if let Some(width) = width {
                params.width = width;
            }
            if let Some(height) = height {
                params.height = height;
            }
            if let Some(reference) = prefabs {
                params.prefabs_json_path = reference;
            }
            if no_prefabs {
                params.prefabs_enabled = false;
            }
            if no_connect {
                params.enforce_connected_floor = false;
            }
            if seed.is_some() {
                params.seed = seed;
            }
            let seed = resolve_seed(&params);
            params.seed = Some(seed);
            info!("using seed {}", seed);

            let mut generator = MapGenerator::new(&params, seed);
            let map = if trace_stages {
                let mut observer = LoggingObserver::default();
                let map = generator.generate_with(&mut observer);
                info!("observed {} snapshots", observer.snapshots);
                map
            } else {
                generator.generate()
            };

            let report = MapReport::inspect(&map, generator.params().spawn_clear_radius);
            if !report.is_valid() {
                warn!("generated map breaks a rule:\n{}", report);
            }
            let saved = MapDocument::from_map(&map, &params).save(&out)?;
            println!("{}", saved.display());
        }
        Command::Check { path, fix } => {
            let doc = MapDocument::load(&path)?;
            let radius = doc.generation_params.sanitized().spawn_clear_radius;
            let params = doc.generation_params.clone();
            let mut map = doc.into_map()?;

            let report = MapReport::inspect(&map, radius);
            println!("{}", report);
            println!("valid:             {}", report.is_valid());

            if fix {
                let converted = revalidate(&mut map.grid);
                let saved = MapDocument::from_map(&map, &params).save(&path)?;
                info!("fixed {}: {} walls made indestructible", saved.display(), converted);
                println!("{}", MapReport::inspect(&map, radius));
            }
        }
        Command::List { dir } => {
            for name in list_maps(&dir)? {
                println!("{}", name);
            }
        }
    }
    Ok(())
}
