//! Configuration loading and typed config structures for watchers-wave.
//!
//! The canonical configuration lives in `watchers-wave.yaml` in the
//! working directory (override the path with `WAVE_CONFIG`). This module
//! defines strongly-typed structs mirroring the YAML structure, and a
//! loader that reads, overrides from the environment, and validates it.
//! Every field has a default, so an empty or missing file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Default config file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "watchers-wave.yaml";

/// File name of the tuned-config artifact inside `paths.config_dir`.
pub const TUNED_CONFIG_FILE: &str = "auto_config.json";

/// File name of the wave event log inside `paths.events_dir`.
pub const EVENT_LOG_FILE: &str = "monitor_test.txt";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override could not be parsed.
    #[error("invalid environment override {name}: {message}")]
    Env {
        /// The variable name.
        name: &'static str,
        /// Why the value was rejected.
        message: String,
    },

    /// A value is out of its allowed range.
    #[error("invalid config value {field}: {message}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        message: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WaveConfig {
    /// Oscillator constants and run length.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// File locations for logs and the tuned-config artifact.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Error analysis loop settings.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Mesh state poll loop settings.
    #[serde(default)]
    pub poller: PollerConfig,

    /// API server bind address.
    #[serde(default)]
    pub server: ServerSection,

    /// Source of the `/api/malla` payload.
    #[serde(default)]
    pub mesh: MeshConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WaveConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment overrides are applied and the result is validated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or a
    /// validation error.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or a
    /// validation error.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `WAVE_CONFIG` or [`DEFAULT_CONFIG_FILE`], falling back to
    /// defaults (with overrides applied) when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns any error from [`WaveConfig::from_file`], or a validation
    /// error for the defaulted config.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("WAVE_CONFIG")
            .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from);
        if path.exists() {
            Self::from_file(&path)
        } else {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            Self::parse("")
        }
    }

    /// Override selected values with environment variables when set.
    ///
    /// - `WAVE_PORT` overrides `server.port`
    /// - `WAVE_MESH_URL` overrides `poller.url`
    /// - `WAVE_ERROR_LOG` overrides `paths.error_log`
    /// - `WAVE_CONFIG_DIR` overrides `paths.config_dir`
    /// - `WAVE_EVENTS_DIR` overrides `paths.events_dir`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] if `WAVE_PORT` is not a valid port.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("WAVE_PORT") {
            self.server.port = val.parse().map_err(|e| ConfigError::Env {
                name: "WAVE_PORT",
                message: format!("{e}"),
            })?;
        }
        if let Ok(val) = std::env::var("WAVE_MESH_URL") {
            self.poller.url = val;
        }
        if let Ok(val) = std::env::var("WAVE_ERROR_LOG") {
            self.paths.error_log = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("WAVE_CONFIG_DIR") {
            self.paths.config_dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("WAVE_EVENTS_DIR") {
            self.paths.events_dir = PathBuf::from(val);
        }
        Ok(())
    }

    /// Reject values the loops cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if !(sim.dt.is_finite() && sim.dt > 0.0) {
            return Err(invalid("simulation.dt", "must be a positive number"));
        }
        if !(sim.total_time.is_finite() && sim.total_time >= 0.0) {
            return Err(invalid("simulation.total_time", "must be zero or positive"));
        }
        if !(sim.omega.is_finite() && sim.damping.is_finite()) {
            return Err(invalid("simulation.omega", "constants must be finite"));
        }
        if self.analyzer.interval_secs == 0 {
            return Err(invalid("analyzer.interval_secs", "must be positive"));
        }
        if self.analyzer.tail_lines == 0 {
            return Err(invalid("analyzer.tail_lines", "must be positive"));
        }
        if self.analyzer.marker.is_empty() {
            return Err(invalid("analyzer.marker", "must not be empty"));
        }
        if self.poller.interval_secs == 0 {
            return Err(invalid("poller.interval_secs", "must be positive"));
        }
        if self.poller.timeout_secs == 0 {
            return Err(invalid("poller.timeout_secs", "must be positive"));
        }
        if self.mesh.update_interval_secs == 0 {
            return Err(invalid("mesh.update_interval_secs", "must be positive"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.to_owned(),
    }
}

/// Oscillator constants and run length.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Angular frequency.
    #[serde(default = "default_omega")]
    pub omega: f64,

    /// Linear damping coefficient.
    #[serde(default = "default_damping")]
    pub damping: f64,

    /// Integration step size.
    #[serde(default = "default_dt")]
    pub dt: f64,

    /// Total simulated duration; the run stops after `total_time / dt` steps.
    #[serde(default = "default_total_time")]
    pub total_time: f64,

    /// Amplitude at or above which a wave event is emitted.
    #[serde(default = "default_amplitude_threshold")]
    pub amplitude_threshold: f64,

    /// Wall-clock pause between steps in milliseconds (0 disables pacing).
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,

    /// Initial position and velocity.
    #[serde(default)]
    pub initial: InitialConditions,
}

impl SimulationConfig {
    /// Number of integration steps in a full run: `total_time / dt`
    /// truncated toward zero.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn steps(&self) -> u64 {
        let steps = (self.total_time / self.dt).trunc();
        if steps.is_finite() && steps > 0.0 {
            steps as u64
        } else {
            0
        }
    }

    /// Pause between steps.
    pub const fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            omega: default_omega(),
            damping: default_damping(),
            dt: default_dt(),
            total_time: default_total_time(),
            amplitude_threshold: default_amplitude_threshold(),
            step_delay_ms: default_step_delay_ms(),
            initial: InitialConditions::default(),
        }
    }
}

/// Initial oscillator state.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct InitialConditions {
    /// Initial x position.
    #[serde(default = "default_x0")]
    pub x: f64,
    /// Initial y position.
    #[serde(default)]
    pub y: f64,
    /// Initial x velocity.
    #[serde(default)]
    pub vx: f64,
    /// Initial y velocity.
    #[serde(default = "default_vy0")]
    pub vy: f64,
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            x: default_x0(),
            y: 0.0,
            vx: 0.0,
            vy: default_vy0(),
        }
    }
}

/// File locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathsConfig {
    /// Directory receiving the wave event log.
    #[serde(default = "default_events_dir")]
    pub events_dir: PathBuf,

    /// Error log written by the watcher tooling.
    #[serde(default = "default_error_log")]
    pub error_log: PathBuf,

    /// Directory holding the tuned-config artifact.
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,
}

impl PathsConfig {
    /// Full path of the wave event log.
    pub fn event_log(&self) -> PathBuf {
        self.events_dir.join(EVENT_LOG_FILE)
    }

    /// Full path of the tuned-config artifact.
    pub fn tuned_config(&self) -> PathBuf {
        self.config_dir.join(TUNED_CONFIG_FILE)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            events_dir: default_events_dir(),
            error_log: default_error_log(),
            config_dir: default_config_dir(),
        }
    }
}

/// Error analysis loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalyzerConfig {
    /// Seconds between analysis ticks.
    #[serde(default = "default_analyzer_interval_secs")]
    pub interval_secs: u64,

    /// Number of trailing log lines inspected per tick.
    #[serde(default = "default_tail_lines")]
    pub tail_lines: usize,

    /// Tuning fires when the error count is strictly greater than this.
    #[serde(default = "default_error_threshold")]
    pub error_threshold: u32,

    /// Case-insensitive marker identifying an error line.
    #[serde(default = "default_marker")]
    pub marker: String,
}

impl AnalyzerConfig {
    /// Tick interval.
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_analyzer_interval_secs(),
            tail_lines: default_tail_lines(),
            error_threshold: default_error_threshold(),
            marker: default_marker(),
        }
    }
}

/// Mesh state poll loop settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PollerConfig {
    /// Mesh state endpoint.
    #[serde(default = "default_mesh_url")]
    pub url: String,

    /// Seconds between poll ticks.
    #[serde(default = "default_poller_interval_secs")]
    pub interval_secs: u64,

    /// Request timeout in seconds.
    #[serde(default = "default_poller_timeout_secs")]
    pub timeout_secs: u64,

    /// Mean amplitude above which the corrective action fires.
    #[serde(default = "default_amplitude_threshold")]
    pub amplitude_threshold: f64,
}

impl PollerConfig {
    /// Tick interval.
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Request timeout.
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            url: default_mesh_url(),
            interval_secs: default_poller_interval_secs(),
            timeout_secs: default_poller_timeout_secs(),
            amplitude_threshold: default_amplitude_threshold(),
        }
    }
}

/// API server bind address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Host to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Which payload `/api/malla` serves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshMode {
    /// A fixed single-cell payload.
    #[default]
    Fixed,
    /// A lattice evolved by a background task.
    Live,
}

/// Mesh source settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MeshConfig {
    /// Payload source.
    #[serde(default)]
    pub mode: MeshMode,

    /// Seconds between lattice updates in live mode.
    #[serde(default = "default_mesh_update_interval_secs")]
    pub update_interval_secs: u64,

    /// Lattice rows in live mode.
    #[serde(default = "default_mesh_dimension")]
    pub rows: usize,

    /// Lattice columns in live mode.
    #[serde(default = "default_mesh_dimension")]
    pub columns: usize,
}

impl MeshConfig {
    /// Lattice update interval.
    pub const fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            mode: MeshMode::Fixed,
            update_interval_secs: default_mesh_update_interval_secs(),
            rows: default_mesh_dimension(),
            columns: default_mesh_dimension(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_omega() -> f64 {
    2.0
}

const fn default_damping() -> f64 {
    0.2
}

const fn default_dt() -> f64 {
    0.05
}

const fn default_total_time() -> f64 {
    10.0
}

const fn default_amplitude_threshold() -> f64 {
    1.5
}

const fn default_step_delay_ms() -> u64 {
    200
}

const fn default_x0() -> f64 {
    1.0
}

const fn default_vy0() -> f64 {
    1.0
}

fn default_events_dir() -> PathBuf {
    PathBuf::from("monitor_text")
}

fn default_error_log() -> PathBuf {
    PathBuf::from("watchers").join("error.log")
}

fn default_config_dir() -> PathBuf {
    PathBuf::from("monitor_text")
}

const fn default_analyzer_interval_secs() -> u64 {
    60
}

const fn default_tail_lines() -> usize {
    20
}

const fn default_error_threshold() -> u32 {
    5
}

fn default_marker() -> String {
    "error".to_owned()
}

fn default_mesh_url() -> String {
    "http://localhost:5000/api/malla".to_owned()
}

const fn default_poller_interval_secs() -> u64 {
    10
}

const fn default_poller_timeout_secs() -> u64 {
    5
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    5000
}

const fn default_mesh_update_interval_secs() -> u64 {
    5
}

const fn default_mesh_dimension() -> usize {
    5
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = WaveConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.steps(), 200);
        assert_eq!(config.analyzer.tail_lines, 20);
        assert_eq!(config.analyzer.error_threshold, 5);
        assert_eq!(config.analyzer.interval(), Duration::from_secs(60));
        assert_eq!(config.poller.interval(), Duration::from_secs(10));
        assert_eq!(config.poller.timeout(), Duration::from_secs(5));
        assert_eq!(config.mesh.mode, MeshMode::Fixed);
    }

    #[test]
    fn step_count_truncates_the_quotient() {
        let config = SimulationConfig {
            dt: 0.1,
            total_time: 0.3,
            ..SimulationConfig::default()
        };
        assert_eq!(config.steps(), 2);

        let config = SimulationConfig {
            dt: 0.05,
            total_time: 0.25,
            ..SimulationConfig::default()
        };
        assert_eq!(config.steps(), 5);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
simulation:
  omega: 3.0
  damping: 0.0
  dt: 0.01
  total_time: 2.0
  amplitude_threshold: 1.2
  step_delay_ms: 0
  initial:
    x: 2.0
    vy: 0.5

paths:
  events_dir: "/tmp/wave/events"
  error_log: "/tmp/wave/error.log"
  config_dir: "/tmp/wave/config"

analyzer:
  interval_secs: 30
  tail_lines: 50
  error_threshold: 3
  marker: "fail"

poller:
  url: "http://mesh:6000/api/malla"
  interval_secs: 2
  timeout_secs: 1
  amplitude_threshold: 2.5

server:
  host: "127.0.0.1"
  port: 5050

mesh:
  mode: live
  update_interval_secs: 1
  rows: 3
  columns: 4

logging:
  level: "debug"
"#;

        let config = WaveConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.simulation.steps(), 200);
        assert!(config.simulation.step_delay().is_zero());
        assert!((config.simulation.initial.x - 2.0).abs() < f64::EPSILON);
        assert!(config.simulation.initial.y.abs() < f64::EPSILON);
        assert_eq!(
            config.paths.tuned_config(),
            PathBuf::from("/tmp/wave/config/auto_config.json")
        );
        assert_eq!(config.analyzer.marker, "fail");
        assert_eq!(config.poller.url, "http://mesh:6000/api/malla");
        assert_eq!(config.mesh.mode, MeshMode::Live);
        assert_eq!(config.mesh.columns, 4);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = WaveConfig::parse("analyzer:\n  tail_lines: 7\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.analyzer.tail_lines, 7);
        // Everything else uses defaults
        assert_eq!(config.analyzer.interval_secs, 60);
        assert!((config.simulation.dt - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(WaveConfig::parse("").is_ok());
    }

    #[test]
    fn zero_interval_rejected() {
        let result = WaveConfig::parse("poller:\n  interval_secs: 0\n");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "poller.interval_secs",
                ..
            })
        ));
    }

    #[test]
    fn non_positive_dt_rejected() {
        let result = WaveConfig::parse("simulation:\n  dt: 0.0\n");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "simulation.dt",
                ..
            })
        ));
    }

    #[test]
    fn unknown_mesh_mode_rejected() {
        let result = WaveConfig::parse("mesh:\n  mode: spiral\n");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }
}
