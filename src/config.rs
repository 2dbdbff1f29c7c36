/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub timing: TimingConfig,
    pub runner: RunnerConfig,
}

/// Building layout. `floor_count` is the index of the top floor, so a
/// building with `floor_count = 5` has floors `0..=5`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub floor_count: u8,
    pub lift_count: u8,
    pub requeue_policy: RequeuePolicy,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct TimingConfig {
    pub unit_travel_time_ms: u64,
    pub door_open_ms: u64,
    pub door_close_ms: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RunnerConfig {
    /// Virtual milliseconds per wall-clock millisecond.
    pub speed: f64,
    pub idle_poll_ms: u64,
}

/// Where a request deferred because of a duplicate destination goes back
/// into the queue.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequeuePolicy {
    #[default]
    Tail,
    Front,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/***************************************/
/*              Defaults               */
/***************************************/
impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            floor_count: 5,
            lift_count: 2,
            requeue_policy: RequeuePolicy::Tail,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            unit_travel_time_ms: 2000,
            door_open_ms: 2500,
            door_close_ms: 2500,
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            speed: 1.0,
            idle_poll_ms: 100,
        }
    }
}

/***************************************/
/*             Public API              */
/***************************************/
impl Config {
    pub fn from_toml_str(config_str: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.lift_count == 0 {
            return Err(ConfigError::Invalid(
                "lift_count must be at least 1".to_string(),
            ));
        }
        if self.runner.speed.is_nan() || self.runner.speed <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "runner speed must be positive, got {}",
                self.runner.speed
            )));
        }
        Ok(())
    }
}

/// Loads the configuration from `path`. A missing file falls back to the
/// defaults; a file that exists but does not parse is an error.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(config_str) => Config::from_toml_str(&config_str),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!(
                "No configuration file at {}, using default settings",
                path.display()
            );
            Ok(Config::default())
        }
        Err(e) => Err(ConfigError::Io(e)),
    }
}
