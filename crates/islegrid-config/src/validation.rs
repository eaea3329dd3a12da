//! Configuration validation
//!
//! Ensures search settings are usable and every configured world describes a
//! grid the locator can walk.

use crate::{ConfigError, ConfigResult, IslegridConfig, WorldConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Lowest and highest (exclusive) build heights islands may be placed at
const MIN_ISLAND_HEIGHT: i32 = -64;
const MAX_ISLAND_HEIGHT: i32 = 320;

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Non-zero search limits
/// - A known log level
/// - Positive island distance and a placeable island height per world
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &IslegridConfig) -> ConfigResult<()> {
    let errors = collect_errors(config);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

/// Run every check and return the problems found, in a stable order
pub fn collect_errors(config: &IslegridConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_search(config, &mut errors);
    validate_logging(config, &mut errors);
    for (name, world) in &config.worlds {
        validate_world(name, world, &mut errors);
    }
    errors
}

fn validate_search(config: &IslegridConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.search.tolerance == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "search.tolerance".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if config.search.max_in_flight == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "search.max_in_flight".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if config.search.probe_timeout_ms == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "search.probe_timeout_ms".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }
}

fn validate_logging(config: &IslegridConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("'{}' is not one of {}", config.logging.level, LOG_LEVELS.join(", ")),
        });
    }
}

fn validate_world(name: &str, world: &WorldConfig, errors: &mut Vec<ConfigValidationError>) {
    if name.trim().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "worlds.<name>".to_string(),
        });
    }
    if world.island_distance <= 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: format!("worlds.{}.island_distance", name),
            reason: format!("must be positive, got {}", world.island_distance),
        });
    }
    if !(MIN_ISLAND_HEIGHT..MAX_ISLAND_HEIGHT).contains(&world.island_height) {
        errors.push(ConfigValidationError::InvalidValue {
            field: format!("worlds.{}.island_height", name),
            reason: format!(
                "{} is outside [{}, {})",
                world.island_height, MIN_ISLAND_HEIGHT, MAX_ISLAND_HEIGHT
            ),
        });
    }
}
