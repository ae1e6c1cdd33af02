//! # Studio Configuration
//!
//! Timing, storage location and the diagnostic token.
//! Supports loading from environment variables and programmatic defaults.

use crate::secret::Credential;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Global configuration for the studio pipeline.
///
/// # Example
/// ```rust
/// use studio_core::StudioConfig;
///
/// // Load from environment
/// let config = StudioConfig::from_env();
///
/// // Or customize
/// let config = StudioConfig::default()
///     .with_latency_ms(0)
///     .with_tick_ms(5);
/// assert_eq!(config.tick_ms, 5);
/// ```
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Simulated provider latency.
    /// Default: 1500, Env: STUDIO_LATENCY_MS
    pub latency_ms: u64,

    /// Extra pause between the result arriving and the first character.
    /// Default: 0, Env: STUDIO_PREFACE_MS
    pub preface_ms: u64,

    /// Delay between revealed characters.
    /// Default: 30, Env: STUDIO_TICK_MS
    pub tick_ms: u64,

    /// How long a copy confirmation stays visible.
    /// Default: 2000, Env: STUDIO_COPY_CONFIRM_MS
    pub copy_confirm_ms: u64,

    /// How long a success message stays visible.
    /// Default: 2500, Env: STUDIO_SUCCESS_CLEAR_MS
    pub success_clear_ms: u64,

    /// Directory holding the history file.
    /// Default: platform data dir + "content-studio", Env: STUDIO_DATA_DIR
    pub data_dir: Option<PathBuf>,

    /// Token read for diagnostics only.
    /// Env: STUDIO_HF_TOKEN, then HF_TOKEN
    pub token: Option<Credential>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            latency_ms: 1500,
            preface_ms: 0,
            tick_ms: 30,
            copy_confirm_ms: 2000,
            success_clear_ms: 2500,
            data_dir: dirs::data_dir().map(|p| p.join("content-studio")),
            token: None,
        }
    }
}

fn parse_ms(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl StudioConfig {
    /// Create a new config from environment variables.
    /// Falls back to defaults for missing or unparsable variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(n) = parse_ms("STUDIO_LATENCY_MS") {
            config.latency_ms = n;
        }
        if let Some(n) = parse_ms("STUDIO_PREFACE_MS") {
            config.preface_ms = n;
        }
        if let Some(n) = parse_ms("STUDIO_TICK_MS") {
            config.tick_ms = n;
        }
        if let Some(n) = parse_ms("STUDIO_COPY_CONFIRM_MS") {
            config.copy_confirm_ms = n;
        }
        if let Some(n) = parse_ms("STUDIO_SUCCESS_CLEAR_MS") {
            config.success_clear_ms = n;
        }
        if let Ok(v) = env::var("STUDIO_DATA_DIR") {
            if !v.trim().is_empty() {
                config.data_dir = Some(PathBuf::from(v));
            }
        }
        config.token = Credential::from_env_vars(&["STUDIO_HF_TOKEN", "HF_TOKEN"]);

        config
    }

    /// Builder: Set simulated latency.
    pub fn with_latency_ms(mut self, ms: u64) -> Self {
        self.latency_ms = ms;
        self
    }

    /// Builder: Set preface interval.
    pub fn with_preface_ms(mut self, ms: u64) -> Self {
        self.preface_ms = ms;
        self
    }

    /// Builder: Set reveal tick.
    pub fn with_tick_ms(mut self, ms: u64) -> Self {
        self.tick_ms = ms;
        self
    }

    /// Builder: Set copy confirmation window.
    pub fn with_copy_confirm_ms(mut self, ms: u64) -> Self {
        self.copy_confirm_ms = ms;
        self
    }

    /// Builder: Set success message lifetime.
    pub fn with_success_clear_ms(mut self, ms: u64) -> Self {
        self.success_clear_ms = ms;
        self
    }

    /// Builder: Set history directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn preface(&self) -> Duration {
        Duration::from_millis(self.preface_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn copy_confirm(&self) -> Duration {
        Duration::from_millis(self.copy_confirm_ms)
    }

    pub fn success_clear(&self) -> Duration {
        Duration::from_millis(self.success_clear_ms)
    }

    /// Directory for the history file, or an error when none is known.
    pub fn require_data_dir(&self) -> crate::Result<PathBuf> {
        self.data_dir.clone().ok_or_else(|| {
            crate::StudioError::Config(
                "no data directory found; set STUDIO_DATA_DIR".to_string(),
            )
        })
    }
}
