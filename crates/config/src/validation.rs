//! Configuration validation
//!
//! Validates config consistency:
//! - Required fields are present
//! - Buffer size is usable
//! - Path template braces are balanced
//! - Policy parameters are well-formed (size limits, rollover times)
//!
//! Semantic checks that need the writer's own parsers (charset names,
//! placeholder names, date format strings) happen at writer construction.

use std::str::FromStr;

use chrono::{NaiveTime, Weekday};

use crate::error::{ConfigError, Result};
use crate::writer::{FileWriterConfig, PolicyConfig};
use crate::Config;

/// Smallest accepted write buffer; below this the charset header would not
/// reliably fit into a single chunk.
const MIN_BUFFER_SIZE: usize = 16;

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_writer(&config.writer)
}

/// Validate the rolling file writer section
pub fn validate_writer(config: &FileWriterConfig) -> Result<()> {
    if config.path.is_empty() {
        return Err(ConfigError::missing_field("writer", "path"));
    }

    if config.buffer_size < MIN_BUFFER_SIZE {
        return Err(ConfigError::invalid_value(
            "writer",
            "buffer_size",
            format!("must be at least {MIN_BUFFER_SIZE} bytes"),
        ));
    }

    if !braces_balanced(&config.path) {
        return Err(ConfigError::invalid_value(
            "writer",
            "path",
            format!("unbalanced braces in '{}'", config.path),
        ));
    }

    for policy in &config.policies {
        validate_policy(policy)?;
    }

    Ok(())
}

fn validate_policy(policy: &PolicyConfig) -> Result<()> {
    match policy {
        PolicyConfig::Endless | PolicyConfig::Startup => Ok(()),
        PolicyConfig::Size { limit } => {
            if *limit == 0 {
                Err(ConfigError::invalid_value(
                    "policy",
                    "limit",
                    "size limit must not be zero",
                ))
            } else {
                Ok(())
            }
        }
        PolicyConfig::Daily { time } | PolicyConfig::Monthly { time } => validate_time(time),
        PolicyConfig::Weekly { day, time } => {
            if let Some(day) = day {
                Weekday::from_str(day).map_err(|_| {
                    ConfigError::invalid_value("policy", "day", format!("unknown weekday '{day}'"))
                })?;
            }
            validate_time(time)
        }
    }
}

fn validate_time(time: &Option<String>) -> Result<()> {
    match time {
        None => Ok(()),
        Some(text) => parse_rollover_time(text).map(|_| ()).map_err(|_| {
            ConfigError::invalid_value(
                "policy",
                "time",
                format!("'{text}' is not a valid HH:MM time"),
            )
        }),
    }
}

/// Parse a rollover time of day, accepting "HH:MM" and "HH:MM:SS"
pub fn parse_rollover_time(text: &str) -> std::result::Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(text, "%H:%M").or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
}

fn braces_balanced(template: &str) -> bool {
    let mut open = false;
    for c in template.chars() {
        match c {
            '{' if open => return false,
            '{' => open = true,
            '}' if !open => return false,
            '}' => open = false,
            _ => {}
        }
    }
    !open
}
