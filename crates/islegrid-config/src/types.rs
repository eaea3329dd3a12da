// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `islegrid.toml`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Name of the world configured when no file provides one
pub const DEFAULT_WORLD_NAME: &str = "world";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IslegridConfig {
    pub search: SearchConfig,
    pub logging: LoggingConfig,
    /// Island grid settings keyed by world name
    pub worlds: BTreeMap<String, WorldConfig>,
}

impl Default for IslegridConfig {
    fn default() -> Self {
        let mut worlds = BTreeMap::new();
        worlds.insert(DEFAULT_WORLD_NAME.to_string(), WorldConfig::default());
        Self {
            search: SearchConfig::default(),
            logging: LoggingConfig::default(),
            worlds,
        }
    }
}

impl IslegridConfig {
    /// Look up the grid settings of a world by name
    pub fn world(&self, name: &str) -> Option<&WorldConfig> {
        self.worlds.get(name)
    }
}

/// Search coordination settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Blocked outcomes tolerated before the search reports saturation
    pub tolerance: u32,
    /// Upper bound on probes outstanding at the same time
    pub max_in_flight: usize,
    /// Terrain load timeout for a single probe
    pub probe_timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tolerance: 20,
            max_in_flight: 32,
            probe_timeout_ms: 5000,
        }
    }
}

/// Per-world island grid settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Half the spacing between island anchors, in blocks
    pub island_distance: i32,
    pub start_x: i32,
    pub start_z: i32,
    pub x_offset: i32,
    pub z_offset: i32,
    /// Y level islands are pasted at
    pub island_height: i32,
    /// True when the world is fully synthetic and terrain never obstructs
    pub use_own_generator: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            island_distance: 400,
            start_x: 0,
            start_z: 0,
            x_offset: 0,
            z_offset: 0,
            island_height: 120,
            use_own_generator: false,
        }
    }
}

/// Logging configuration consumed by `islegrid-observability`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level (trace, debug, info, warn, error)
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Console log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_world_section_uses_defaults() {
        let config: IslegridConfig = toml::from_str(
            r#"
            [worlds.oneblock]
            island_distance = 100
            use_own_generator = true
            "#,
        )
        .unwrap();

        let world = config.world("oneblock").unwrap();
        assert_eq!(world.island_distance, 100);
        assert!(world.use_own_generator);
        assert_eq!(world.island_height, 120);
        // An explicit worlds table replaces the default world
        assert!(config.world(DEFAULT_WORLD_NAME).is_none());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert!("yaml".parse::<LogFormat>().is_err());

        let logging: LoggingConfig = toml::from_str("format = \"json\"").unwrap();
        assert_eq!(logging.format, LogFormat::Json);
    }

    #[test]
    fn test_config_serializes_to_json() {
        let json = serde_json::to_value(IslegridConfig::default()).unwrap();
        assert_eq!(json["search"]["tolerance"], 20);
        assert_eq!(json["worlds"]["world"]["island_distance"], 400);
    }
}
