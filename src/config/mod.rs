//! Service configuration
//!
//! A TOML file with three sections: the HTTP listener, the source pipeline
//! policies, and the diagnostic probe. A missing config file is replaced
//! with written-out defaults on first start. The sources file referenced by
//! `[sources].file` is a separate JSON document, re-read per request (see
//! [`crate::models::SourcesConfig`]).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

pub mod defaults;

use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub sources: SourcesSection,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Source pipeline policies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesSection {
    /// Path of the JSON sources file
    #[serde(default = "default_sources_file")]
    pub file: PathBuf,
    /// Load and execute every unit fresh on every request; when false,
    /// unchanged units are served from the content cache
    #[serde(default = "default_reload_every_request")]
    pub reload_every_request: bool,
    /// Per-source execution deadline (humantime string); "0s" disables
    #[serde(default = "default_source_timeout")]
    pub source_timeout: String,
    /// Emit a comment line for failed sources instead of dropping them silently
    #[serde(default = "default_include_failure_markers")]
    pub include_failure_markers: bool,
}

/// Diagnostic probe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Public IP-echo endpoint used as the baseline reachability check
    #[serde(default = "default_ip_echo_url")]
    pub ip_echo_url: String,
    /// Per-request timeout for probe HTTP checks (humantime string)
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SourcesSection {
    fn default() -> Self {
        Self {
            file: default_sources_file(),
            reload_every_request: default_reload_every_request(),
            source_timeout: default_source_timeout(),
            include_failure_markers: default_include_failure_markers(),
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            ip_echo_url: default_ip_echo_url(),
            probe_timeout: default_probe_timeout(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web: WebConfig::default(),
            sources: SourcesSection::default(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }

    /// Parsed per-source deadline; `None` when disabled
    pub fn source_timeout(&self) -> Result<Option<Duration>> {
        let parsed = humantime::parse_duration(&self.sources.source_timeout)?;
        Ok((!parsed.is_zero()).then_some(parsed))
    }

    /// Parsed probe HTTP timeout
    pub fn probe_timeout(&self) -> Result<Duration> {
        Ok(humantime::parse_duration(&self.diagnostics.probe_timeout)?)
    }
}
