//! Configuration module for ttlguess

use crate::error::{GuessError, GuessResult};
use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the per-user config file looked up in the home directory
pub const DEFAULT_CONFIG_FILE: &str = ".ttlguess.toml";

/// Main configuration structure for a guessing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuessConfig {
    /// Number of trials per target
    pub retries: usize,

    /// Maximum allowed distance between a signature TTL and the measured mean
    pub tolerance: u64,

    /// Echo raw probe output and the aggregate statistics
    pub verbose: bool,

    /// Deadline for a single probe invocation in milliseconds, unbounded when unset
    pub probe_timeout_ms: Option<u64>,

    /// Hop ceiling handed to the route tracer
    pub max_hops: u32,

    /// Program used for the ICMP echo probe
    pub ping_command: String,

    /// Program used for the route tracing probe
    pub traceroute_command: String,

    /// Report format
    pub output_format: OutputFormat,

    /// Signature table file, the embedded table is used when unset
    pub signatures: Option<PathBuf>,
}

impl Default for GuessConfig {
    fn default() -> Self {
        Self {
            retries: 1,
            tolerance: 0,
            verbose: false,
            probe_timeout_ms: None,
            max_hops: 64,
            ping_command: "ping".to_string(),
            traceroute_command: "traceroute".to_string(),
            output_format: OutputFormat::Text,
            signatures: None,
        }
    }
}

impl GuessConfig {
    /// Set the number of trials per target
    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    /// Set the matcher tolerance
    pub fn with_tolerance(mut self, tolerance: u64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the per-probe deadline
    pub fn with_probe_timeout(mut self, timeout_ms: u64) -> Self {
        self.probe_timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_max_hops(mut self, max_hops: u32) -> Self {
        self.max_hops = max_hops;
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Use a signature table file instead of the embedded one
    pub fn with_signatures<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.signatures = Some(path.into());
        self
    }

    /// Get the probe deadline as a Duration
    pub fn probe_timeout(&self) -> Option<Duration> {
        self.probe_timeout_ms.map(Duration::from_millis)
    }

    /// Load configuration from TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> GuessResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            GuessError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: GuessConfig = toml::from_str(&content)
            .map_err(|e| GuessError::Config(format!("Failed to parse TOML: {}", e)))?;

        Ok(config)
    }

    /// Load configuration from ~/.ttlguess.toml, falling back to defaults
    pub fn load_default_config() -> Self {
        let Some(home_dir) = dirs::home_dir() else {
            return Self::default();
        };

        let config_path = home_dir.join(DEFAULT_CONFIG_FILE);
        if config_path.exists() {
            match Self::from_toml_file(&config_path) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    return config;
                }
                Err(e) => log::warn!("Ignoring {}: {}", config_path.display(), e),
            }
        }

        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> GuessResult<()> {
        if self.retries == 0 {
            return Err(GuessError::Config(
                "Number of tries must be at least 1".to_string(),
            ));
        }

        if self.max_hops == 0 {
            return Err(GuessError::Config(
                "Hop ceiling must be greater than 0".to_string(),
            ));
        }

        if self.ping_command.trim().is_empty() || self.traceroute_command.trim().is_empty() {
            return Err(GuessError::Config(
                "Probe commands cannot be empty".to_string(),
            ));
        }

        if self.probe_timeout_ms == Some(0) {
            return Err(GuessError::Config(
                "Probe timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
