//! Settings model loaded from a TOML file, with environment overrides.

use std::path::Path;

use arbor_router::Thresholds as RouterThresholds;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Default period, in seconds, between retry sweeps over incomplete items.
pub const DEFAULT_RETRY_SWEEP_SECS: u64 = 600;

/// Default cutoff (see [`Thresholds::season_scraper_drop_at`]).
pub const DEFAULT_SEASON_SCRAPER_DROP_AT: u32 = 3;

/// Top-level settings for an `arbor` pipeline instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Source services to poll for new items.
    #[serde(default)]
    pub sources: Vec<SourceSettings>,
    /// Router/dispatcher cutoffs.
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Seconds between retry sweeps over incomplete items.
    #[serde(default = "default_retry_sweep_secs")]
    pub retry_sweep_secs: u64,
    /// Explicit worker pool size; `None` defers to available parallelism.
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

const fn default_retry_sweep_secs() -> u64 {
    DEFAULT_RETRY_SWEEP_SECS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            thresholds: Thresholds::default(),
            retry_sweep_secs: DEFAULT_RETRY_SWEEP_SECS,
            worker_threads: None,
        }
    }
}

impl Settings {
    /// Load and validate settings from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Parse`] if its contents are not valid TOML, or
    /// [`ConfigError::InvalidField`] if a parsed value fails validation.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate cross-field and range constraints that `serde` cannot
    /// express on its own.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] describing the first
    /// violated constraint.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.retry_sweep_secs == 0 {
            return Err(invalid("retry_sweep_secs", "must be greater than zero"));
        }
        if self.thresholds.season_scraper_drop_at == 0 {
            return Err(invalid(
                "thresholds.season_scraper_drop_at",
                "must be greater than zero",
            ));
        }
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(invalid("sources[].name", "must not be empty"));
            }
            if source.update_interval_secs == 0 {
                return Err(invalid(
                    "sources[].update_interval_secs",
                    "must be greater than zero",
                ));
            }
        }
        Ok(())
    }

    /// The router's own view of the season cutoffs.
    #[must_use]
    pub const fn router_thresholds(&self) -> RouterThresholds {
        RouterThresholds {
            season_episode_fanout_at: self.thresholds.season_episode_fanout_at,
        }
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidField {
        field,
        reason: reason.to_string(),
    }
}

/// Router- and dispatcher-level cutoffs. Kept as two distinct fields per
/// `DESIGN.md`'s Open Question resolution rather than unified into one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thresholds {
    /// Dispatcher-level cutoff: once a season has been submitted to the
    /// scraper this many times, the dispatcher stops submitting it again
    /// as a whole, regardless of what the router decides.
    #[serde(default = "default_season_scraper_drop_at")]
    pub season_scraper_drop_at: u32,
    /// Router-level cutoff: once a season has been scraped this many
    /// times, the router fans out to its individual incomplete episodes
    /// instead of resubmitting the season as a unit.
    #[serde(default = "default_season_episode_fanout_at")]
    pub season_episode_fanout_at: u32,
}

const fn default_season_scraper_drop_at() -> u32 {
    DEFAULT_SEASON_SCRAPER_DROP_AT
}

const fn default_season_episode_fanout_at() -> u32 {
    RouterThresholds::DEFAULT_FANOUT_AT
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            season_scraper_drop_at: DEFAULT_SEASON_SCRAPER_DROP_AT,
            season_episode_fanout_at: RouterThresholds::DEFAULT_FANOUT_AT,
        }
    }
}

/// Settings for a single source service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Human-readable name, used in logs and as the scheduler job id.
    pub name: String,
    /// Seconds between scheduled polls of this source.
    pub update_interval_secs: u64,
    /// Whether the source is active. Disabled sources are still validated
    /// but never scheduled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}
