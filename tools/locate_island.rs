// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Island location finder.
//!
//! Runs consecutive island searches for one world against in-memory
//! registries and prints each location found. Every location is registered
//! before the next search, so the output traces the spiral outward.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process::{self, ExitCode};
use std::sync::Arc;

use islegrid::config::{
    apply_cli_overrides, apply_environment_overrides, load_config, validate_config, ConfigError,
    IslegridConfig, LogFormat,
};
use islegrid::locator::impls::{
    ConfiguredWorlds, InMemoryDeletionRegistry, InMemoryIslandRegistry, InMemoryOriginStore,
    InMemoryTerrain, TracingSink,
};
use islegrid::locator::{
    BlockKind, Cell, IslandLocator, IslandRegistry, LocatorHost, LocatorSettings, WorldId,
};
use islegrid::observability::{
    debug_flags_help, init_logging, parse_debug_flags, ConsoleFormat, ObservabilityConfig,
};
use tracing::{error, info};

struct Args {
    world: String,
    count: usize,
    config_path: Option<PathBuf>,
    obstructed: Vec<Cell>,
    json: bool,
    overrides: HashMap<String, String>,
    #[cfg(feature = "file-logging")]
    log_dir: Option<PathBuf>,
}

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: locate_island [--world <name>] [--count <n>] [--config <path>]\n\
         \x20                    [--obstruct <x>,<z>]... [--tolerance <n>] [--max-in-flight <n>]\n\
         \x20                    [--probe-timeout-ms <ms>] [--log-level <level>] [--json]\n\n\
         Defaults:\n\
         - world: world\n\
         - count: 1\n\
         - config: discovered islegrid.toml, built-in defaults if none\n\n\
         {}",
        debug_flags_help()
    );
    process::exit(2);
}

fn parse_cell(raw: &str) -> Option<Cell> {
    let (x, z) = raw.split_once(',')?;
    Some(Cell::new(x.trim().parse().ok()?, z.trim().parse().ok()?))
}

fn parse_args() -> Args {
    let mut parsed = Args {
        world: "world".to_string(),
        count: 1,
        config_path: None,
        obstructed: Vec::new(),
        json: false,
        overrides: HashMap::new(),
        #[cfg(feature = "file-logging")]
        log_dir: None,
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--world" => parsed.world = args.next().unwrap_or_else(|| usage_and_exit()),
            "--count" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                parsed.count = v.parse().unwrap_or_else(|_| usage_and_exit());
            }
            "--config" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                parsed.config_path = Some(PathBuf::from(v));
            }
            "--obstruct" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                let cell = parse_cell(&v).unwrap_or_else(|| {
                    eprintln!("Invalid cell '{v}', expected <x>,<z>");
                    usage_and_exit()
                });
                parsed.obstructed.push(cell);
            }
            "--tolerance" | "--max-in-flight" | "--probe-timeout-ms" | "--log-level" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                let key = arg.trim_start_matches("--").replace('-', "_");
                parsed.overrides.insert(key, v);
            }
            #[cfg(feature = "file-logging")]
            "--log-dir" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                parsed.log_dir = Some(PathBuf::from(v));
            }
            "--json" => parsed.json = true,
            "-h" | "--help" => usage_and_exit(),
            other if other.starts_with("--debug-") => {}
            other => {
                eprintln!("Unknown argument: {other}");
                usage_and_exit();
            }
        }
    }

    parsed
}

/// Load the configuration, falling back to defaults when no file exists
fn resolve_config(args: &Args) -> Result<IslegridConfig, ConfigError> {
    match load_config(args.config_path.as_deref(), Some(&args.overrides)) {
        Err(ConfigError::FileNotFound(_)) if args.config_path.is_none() => {
            let mut config = IslegridConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, &args.overrides);
            validate_config(&config)?;
            Ok(config)
        }
        other => other,
    }
}

fn observability_config(config: &IslegridConfig, _args: &Args) -> ObservabilityConfig {
    ObservabilityConfig {
        level: config.logging.level.clone(),
        format: match config.logging.format {
            LogFormat::Text => ConsoleFormat::Text,
            LogFormat::Json => ConsoleFormat::Json,
        },
        #[cfg(feature = "file-logging")]
        log_dir: _args.log_dir.clone(),
        ..ObservabilityConfig::default()
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = parse_args();

    let config = resolve_config(&args).unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {e}");
        process::exit(2);
    });

    let logging = init_logging(&parse_debug_flags(), &observability_config(&config, &args))
        .unwrap_or_else(|e| {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(2);
        });

    let code = run(&args, &config).await;
    // Flushes buffered file output before the process exits
    drop(logging);
    code
}

async fn run(args: &Args, config: &IslegridConfig) -> ExitCode {
    let world = WorldId::new(&args.world);
    let worlds = Arc::new(ConfiguredWorlds::from_config(config));
    let islands = Arc::new(InMemoryIslandRegistry::new(worlds.clone()));
    let terrain = Arc::new(InMemoryTerrain::new());

    if let Some(grid) = config.world(&args.world) {
        for cell in &args.obstructed {
            terrain.set_block(&world, cell.at_height(grid.island_height), BlockKind::Solid);
        }
    }

    let locator = IslandLocator::new(
        LocatorSettings::from(&config.search),
        LocatorHost {
            worlds: worlds.clone(),
            islands: islands.clone(),
            deletions: Arc::new(InMemoryDeletionRegistry::new(worlds)),
            terrain,
            origins: Arc::new(InMemoryOriginStore::new()),
            diagnostics: Arc::new(TracingSink),
        },
    );

    let mut found = Vec::with_capacity(args.count);
    for _ in 0..args.count {
        match locator.find_next_location(&world).await {
            Ok(cell) => {
                islands.register_island(&world, cell);
                if !args.json {
                    println!("{cell}");
                }
                found.push(cell);
            }
            Err(e) => {
                error!(target: "islegrid-locator", %world, "Search failed: {e}");
                eprintln!("Search failed after {} location(s): {e}", found.len());
                return ExitCode::FAILURE;
            }
        }
    }

    if args.json {
        match serde_json::to_string_pretty(&found) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("Failed to encode locations: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    info!(
        target: "islegrid-locator",
        %world,
        located = found.len(),
        registered = islands.island_count(&world),
        "Done"
    );
    ExitCode::SUCCESS
}
