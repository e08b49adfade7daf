//! Configuration Manager

use super::{Options, TagFormat, MAX_UDP_PAYLOAD};
use crate::Result;
use anyhow::{bail, Context};
use std::path::Path;

pub const ENV_NAMESPACE: &str = "OC_DATADOG_NAMESPACE";
pub const ENV_ENDPOINT: &str = "OC_DATADOG_ENDPOINT";
pub const ENV_TAGS: &str = "OC_DATADOG_TAGS";
pub const ENV_TAG_FORMAT: &str = "OC_DATADOG_TAG_FORMAT";
pub const ENV_FLUSH_INTERVAL: &str = "OC_DATADOG_FLUSH_INTERVAL";

/// Loads and validates exporter options
pub struct ConfigManager;

impl ConfigManager {
    /// Load options from a TOML file, falling back to defaults when it is missing
    pub fn load_from_file(path: &Path) -> Result<Options> {
        if path.exists() {
            tracing::info!("Loading exporter options from: {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            let options: Options = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

            options.validate()
                .with_context(|| "Exporter options validation failed")?;

            Ok(options)
        } else {
            tracing::warn!("Configuration file not found at {}, using defaults", path.display());
            let options = Options::default();
            options.validate()?;
            Ok(options)
        }
    }

    /// Load options from `OC_DATADOG_*` environment variables
    pub fn load_from_env() -> Result<Options> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load options from defaults overridden by `lookup`
    pub fn load_with<F>(lookup: F) -> Result<Options>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Options::default();

        if let Some(namespace) = lookup(ENV_NAMESPACE) {
            options.namespace = namespace;
        }

        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            options.endpoint = endpoint;
        }

        if let Some(tags) = lookup(ENV_TAGS) {
            options.tags = tags
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(format) = lookup(ENV_TAG_FORMAT) {
            options.tag_format = match format.as_str() {
                "key_value" => TagFormat::KeyValue,
                "legacy_keys_only" => TagFormat::LegacyKeysOnly,
                other => bail!("Invalid {}: {}", ENV_TAG_FORMAT, other),
            };
        }

        if let Some(interval) = lookup(ENV_FLUSH_INTERVAL) {
            options.flush_interval = humantime::parse_duration(&interval)
                .with_context(|| format!("Invalid {}: {}", ENV_FLUSH_INTERVAL, interval))?;
        }

        options.validate()?;
        Ok(options)
    }
}

impl Options {
    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.max_packet_size == 0 {
            bail!("max_packet_size must be greater than 0");
        }

        if self.max_packet_size > MAX_UDP_PAYLOAD {
            bail!("max_packet_size cannot exceed {} bytes", MAX_UDP_PAYLOAD);
        }

        if self.flush_interval.is_zero() {
            bail!("flush_interval must be greater than 0");
        }

        for (i, tag) in self.tags.iter().enumerate() {
            if tag.is_empty() {
                bail!("Global tag {} is empty", i);
            }

            if tag.contains(',') || tag.contains('|') {
                bail!("Global tag {} contains a reserved character: {}", i, tag);
            }
        }

        Ok(())
    }
}
