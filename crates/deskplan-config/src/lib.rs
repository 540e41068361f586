//! Configuration system for deskplan.
//!
//! Load planner configuration from TOML or YAML files to control attendance
//! bounds, per-phase solver budgets, the satisfaction target that drives the
//! epsilon floor, batch behavior and artifact output without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use deskplan_config::{PlannerConfig, SatisfactionTarget};
//! use std::time::Duration;
//!
//! let config = PlannerConfig::from_toml_str(r#"
//!     [attendance]
//!     min_days = 1
//!     max_days = 2
//!
//!     [cohesion]
//!     time_limit_seconds = 600
//!
//!     [epsilon]
//!     target = "fixed"
//!     ratio = 0.8
//! "#).unwrap();
//!
//! assert_eq!(config.attendance.min_days, 1);
//! assert_eq!(config.cohesion_time_limit(), Duration::from_secs(600));
//! assert_eq!(config.preference_time_limit(), Duration::from_secs(300));
//! assert_eq!(config.epsilon, SatisfactionTarget::Fixed { ratio: 0.8 });
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use deskplan_config::PlannerConfig;
//!
//! let config = PlannerConfig::load("deskplan.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use deskplan_core::AttendanceBounds;

/// Default phase-2 (preference) time limit.
pub const DEFAULT_PREFERENCE_TIME_LIMIT_SECS: u64 = 300;

/// Default phase-1 (cohesion) time limit.
pub const DEFAULT_COHESION_TIME_LIMIT_SECS: u64 = 3600;

/// Default relative optimality gap for both phases.
pub const DEFAULT_RELATIVE_GAP: f64 = 0.01;

/// Default desired-satisfaction ratio for the epsilon floor.
pub const DEFAULT_SATISFACTION_RATIO: f64 = 0.65;

/// Default extra phase-1 seconds granted per large instance in a batch.
pub const DEFAULT_LARGE_INSTANCE_INCREMENT_SECS: u64 = 1800;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main planner configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PlannerConfig {
    /// Weekly attendance window.
    #[serde(default)]
    pub attendance: AttendanceBounds,

    /// Budget of the preference phase (phase 2).
    #[serde(default)]
    pub preference: PhaseBudget,

    /// Budget of the cohesion phase (phase 1).
    #[serde(default)]
    pub cohesion: PhaseBudget,

    /// How the desired-satisfaction ratio is chosen.
    #[serde(default)]
    pub epsilon: SatisfactionTarget,

    /// Batch processing options.
    #[serde(default)]
    pub batch: BatchConfig,

    /// Artifact output options.
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            attendance: AttendanceBounds::default(),
            preference: PhaseBudget::default(),
            cohesion: PhaseBudget::default(),
            epsilon: SatisfactionTarget::default(),
            batch: BatchConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl PlannerConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the attendance window.
    pub fn with_attendance(mut self, min_days: u32, max_days: u32) -> Self {
        self.attendance = AttendanceBounds { min_days, max_days };
        self
    }

    /// Sets the preference-phase time limit.
    pub fn with_preference_time_limit(mut self, seconds: u64) -> Self {
        self.preference.time_limit_seconds = Some(seconds);
        self
    }

    /// Sets the cohesion-phase time limit.
    pub fn with_cohesion_time_limit(mut self, seconds: u64) -> Self {
        self.cohesion.time_limit_seconds = Some(seconds);
        self
    }

    /// Sets the relative gap of both phases.
    pub fn with_relative_gap(mut self, gap: f64) -> Self {
        self.preference.relative_gap = Some(gap);
        self.cohesion.relative_gap = Some(gap);
        self
    }

    /// Sets the satisfaction target.
    pub fn with_satisfaction_target(mut self, target: SatisfactionTarget) -> Self {
        self.epsilon = target;
        self
    }

    /// Sets the artifact directory.
    pub fn with_output_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.output.directory = directory.into();
        self
    }

    /// Enables or disables artifact persistence.
    pub fn with_persist(mut self, persist: bool) -> Self {
        self.output.persist = persist;
        self
    }

    /// Enables or disables parallel batch processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.batch.parallel = parallel;
        self
    }

    /// Marks an instance as large for cohesion budget widening.
    pub fn with_large_instance(mut self, instance_id: impl Into<String>) -> Self {
        self.batch.large_instances.push(instance_id.into());
        self
    }

    /// Phase-2 time limit.
    pub fn preference_time_limit(&self) -> Duration {
        self.preference
            .time_limit_or(DEFAULT_PREFERENCE_TIME_LIMIT_SECS)
    }

    /// Phase-1 time limit before any batch widening.
    pub fn cohesion_time_limit(&self) -> Duration {
        self.cohesion.time_limit_or(DEFAULT_COHESION_TIME_LIMIT_SECS)
    }

    /// Checks value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] on inverted attendance bounds, a zero
    /// time limit, a gap outside `[0, 1)` or a fixed ratio outside `(0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let AttendanceBounds { min_days, max_days } = self.attendance;
        if min_days > max_days {
            return Err(ConfigError::Invalid(format!(
                "attendance.min_days ({min_days}) exceeds attendance.max_days ({max_days})"
            )));
        }
        for (name, budget) in [("preference", &self.preference), ("cohesion", &self.cohesion)] {
            if budget.time_limit_seconds == Some(0) {
                return Err(ConfigError::Invalid(format!(
                    "{name}.time_limit_seconds must be positive"
                )));
            }
            let gap = budget.relative_gap();
            if !(0.0..1.0).contains(&gap) {
                return Err(ConfigError::Invalid(format!(
                    "{name}.relative_gap must lie in [0, 1), got {gap}"
                )));
            }
        }
        if let SatisfactionTarget::Fixed { ratio } = self.epsilon {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "epsilon.ratio must lie in (0, 1], got {ratio}"
                )));
            }
        }
        Ok(())
    }
}

/// Solver budget for one phase. Unset fields fall back to the phase default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PhaseBudget {
    /// Wall-clock limit in seconds.
    pub time_limit_seconds: Option<u64>,

    /// Relative optimality gap at which the solver may stop.
    pub relative_gap: Option<f64>,
}

impl PhaseBudget {
    /// Returns the configured time limit, or `default_seconds`.
    pub fn time_limit_or(&self, default_seconds: u64) -> Duration {
        Duration::from_secs(self.time_limit_seconds.unwrap_or(default_seconds))
    }

    /// Returns the configured relative gap, or the default.
    pub fn relative_gap(&self) -> f64 {
        self.relative_gap.unwrap_or(DEFAULT_RELATIVE_GAP)
    }
}

/// Desired-satisfaction ratio used to derive the epsilon floor.
///
/// Always an explicit choice: a fixed ratio, or the ratio phase 2 actually
/// achieved (which pins phase 1 to the full phase-2 satisfaction).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum SatisfactionTarget {
    /// Keep at least `ratio` of phase 2's total presence as satisfied days.
    Fixed { ratio: f64 },

    /// Use phase 2's achieved satisfaction percentage divided by 100.
    MatchAchieved,
}

impl Default for SatisfactionTarget {
    fn default() -> Self {
        SatisfactionTarget::Fixed {
            ratio: DEFAULT_SATISFACTION_RATIO,
        }
    }
}

/// Batch configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BatchConfig {
    /// Instances whose cohesion budget is widened.
    #[serde(default)]
    pub large_instances: Vec<String>,

    /// Extra cohesion seconds accumulated per large instance.
    #[serde(default)]
    pub large_instance_increment_seconds: Option<u64>,

    /// Solve instances on the rayon thread pool instead of sequentially.
    #[serde(default)]
    pub parallel: bool,
}

impl BatchConfig {
    /// Returns the per-large-instance increment as a Duration.
    pub fn large_instance_increment(&self) -> Duration {
        Duration::from_secs(
            self.large_instance_increment_seconds
                .unwrap_or(DEFAULT_LARGE_INSTANCE_INCREMENT_SECS),
        )
    }

    /// Returns true if `instance_id` is listed as large.
    pub fn is_large(&self, instance_id: &str) -> bool {
        self.large_instances.iter().any(|id| id == instance_id)
    }
}

/// Artifact output configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct OutputConfig {
    /// Root directory for solved snapshots and completion records.
    #[serde(default = "OutputConfig::default_directory")]
    pub directory: PathBuf,

    /// Whether solved snapshots are written at all.
    #[serde(default = "OutputConfig::default_persist")]
    pub persist: bool,
}

impl OutputConfig {
    fn default_directory() -> PathBuf {
        PathBuf::from("model_outputs")
    }

    fn default_persist() -> bool {
        true
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: Self::default_directory(),
            persist: Self::default_persist(),
        }
    }
}

#[cfg(test)]
mod tests;
