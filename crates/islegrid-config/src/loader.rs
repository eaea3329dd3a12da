// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{validate_config, ConfigError, ConfigResult, IslegridConfig, LogFormat};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "islegrid.toml";

/// Find the islegrid configuration file
///
/// Search order:
/// 1. `ISLEGRID_CONFIG_PATH` environment variable
/// 2. Current working directory: `./islegrid.toml`
/// 3. Parent directories (up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("ISLEGRID_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by ISLEGRID_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "configuration file '{}' not found in any of these locations:\n{}\n\nSet ISLEGRID_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found, contains invalid TOML, or fails validation
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<IslegridConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: IslegridConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    validate_config(&config)?;
    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `ISLEGRID_SEARCH_TOLERANCE` -> `search.tolerance`
/// - `ISLEGRID_MAX_IN_FLIGHT` -> `search.max_in_flight`
/// - `ISLEGRID_PROBE_TIMEOUT_MS` -> `search.probe_timeout_ms`
/// - `ISLEGRID_LOG_LEVEL` -> `logging.level`
/// - `ISLEGRID_LOG_FORMAT` -> `logging.format`
pub fn apply_environment_overrides(config: &mut IslegridConfig) {
    if let Ok(value) = env::var("ISLEGRID_SEARCH_TOLERANCE") {
        if let Ok(tolerance) = value.parse::<u32>() {
            config.search.tolerance = tolerance;
        }
    }
    if let Ok(value) = env::var("ISLEGRID_MAX_IN_FLIGHT") {
        if let Ok(max) = value.parse::<usize>() {
            config.search.max_in_flight = max;
        }
    }
    if let Ok(value) = env::var("ISLEGRID_PROBE_TIMEOUT_MS") {
        if let Ok(timeout) = value.parse::<u64>() {
            config.search.probe_timeout_ms = timeout;
        }
    }
    if let Ok(value) = env::var("ISLEGRID_LOG_LEVEL") {
        config.logging.level = value;
    }
    if let Ok(value) = env::var("ISLEGRID_LOG_FORMAT") {
        if let Ok(format) = value.parse::<LogFormat>() {
            config.logging.format = format;
        }
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"tolerance": "40", "log_level": "debug"}`)
pub fn apply_cli_overrides(config: &mut IslegridConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("tolerance") {
        if let Ok(tolerance) = value.parse::<u32>() {
            config.search.tolerance = tolerance;
        }
    }
    if let Some(value) = cli_args.get("max_in_flight") {
        if let Ok(max) = value.parse::<usize>() {
            config.search.max_in_flight = max;
        }
    }
    if let Some(value) = cli_args.get("probe_timeout_ms") {
        if let Ok(timeout) = value.parse::<u64>() {
            config.search.probe_timeout_ms = timeout;
        }
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
}
