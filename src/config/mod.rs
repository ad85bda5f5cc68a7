mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;
use std::str::FromStr;

use crate::eligibility::ScheduleZone;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from the given path or the first default location that exists.
///
/// There is no usable built-in default: the queue locations are specific to
/// each installation.
pub fn load_config_from(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./config.toml",
        "./livestream-scheduler.toml",
        "~/.config/livestream-scheduler/config.toml",
        "/etc/livestream-scheduler/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    anyhow::bail!(
        "No config file found (tried {}); pass one with --config",
        default_paths.join(", ")
    )
}

impl Config {
    /// Zone the thumbnail timestamps are interpreted in
    pub fn schedule_zone(&self) -> Result<ScheduleZone> {
        match &self.timezone {
            None => Ok(ScheduleZone::Local),
            Some(name) => name
                .parse::<chrono_tz::Tz>()
                .map(ScheduleZone::Named)
                .map_err(|e| anyhow::anyhow!("Invalid timezone {:?}: {}", name, e)),
        }
    }

    /// Lead-time window as a signed duration for instant arithmetic
    pub fn creation_window(&self) -> Result<chrono::TimeDelta> {
        chrono::TimeDelta::from_std(self.creation_distance)
            .with_context(|| format!("creation_distance {:?} is too large", self.creation_distance))
    }
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.creation_distance.is_zero() {
        anyhow::bail!("creation_distance must be greater than zero");
    }
    config.creation_window()?;

    config.schedule_zone()?;

    for (name, level) in [
        ("logging.level", &config.logging.level),
        ("logging.mail_level", &config.logging.mail_level),
    ] {
        tracing::Level::from_str(level)
            .map_err(|_| anyhow::anyhow!("Invalid {}: {:?}", name, level))?;
    }

    let queue = &config.queue;
    if queue.queue.trim().is_empty() || queue.done.trim().is_empty() {
        anyhow::bail!("queue.queue and queue.done must both be set");
    }
    if queue.queue == queue.done {
        anyhow::bail!("queue.queue and queue.done must differ");
    }
    if queue.backend == QueueBackend::Local && !Path::new(&queue.queue).is_dir() {
        tracing::warn!("Queue directory does not exist: {:?}", queue.queue);
    }

    if config.template.document.is_none() && config.template.path.is_none() {
        anyhow::bail!("template needs either a document name or a path");
    }

    if config.mail.enabled && config.mail.to.trim().is_empty() {
        anyhow::bail!("mail is enabled but has no recipient");
    }

    if config.region_code.len() != 2 {
        anyhow::bail!(
            "region_code must be an ISO 3166-1 alpha-2 code, got {:?}",
            config.region_code
        );
    }

    Ok(())
}
