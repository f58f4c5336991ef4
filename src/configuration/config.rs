//! Configuration types for loading simulation runs from YAML.
//!
//! A run is described by four sections:
//!
//! - [`EngineConfig`]     – force algorithm and stepper pacing
//! - [`ParametersConfig`] – timestep, physical constant, trajectory length, world extent
//! - [`DisplayConfig`]    – display size used for the scale factor, frame rate, overlay info
//! - [`PresetConfig`]     – which initial-condition generator populates the run
//!
//! # YAML format
//! Every section and field is optional; omitted values fall back to the defaults
//! shown here:
//!
//! ```yaml
//! engine:
//!   algorithm: "pairwise"   # or "vectorized"
//!   target_rate: 60.0       # logical steps per second
//!   poll_interval_ms: 1
//!
//! parameters:
//!   dt: 86400.0             # one day per step
//!   G: 6.67e-11
//!   trajectory_capacity: 1000
//!   world_extent: 2.508e11  # meters from the display centre to its edge
//!
//! display:
//!   width: 800
//!   height: 800
//!   fps: 60
//!   info: ["days"]
//!
//! scenario:
//!   preset: "solar_system"
//! ```

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::configuration::error::SimError;
use crate::simulation::clock::ClockSettings;

/// Gravitational constant used by the source model, N m^2 kg^-2
pub const DEFAULT_G: f64 = 6.67e-11;

/// One day in seconds
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Mars-Sun distance with a 10% margin, meters
pub const DEFAULT_WORLD_EXTENT: f64 = 1.1 * 228e9;

/// Which force computation strategy the engine uses
/// `algorithm: "pairwise"` or `algorithm: "vectorized"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    #[default]
    #[serde(rename = "pairwise")] // Direct O(n^2) loop, each unordered pair once with equal and opposite updates
    Pairwise,

    #[serde(rename = "vectorized")] // Whole-matrix form over the mass/position collections
    Vectorized,
}

impl FromStr for Algorithm {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pairwise" => Ok(Algorithm::Pairwise),
            "vectorized" => Ok(Algorithm::Vectorized),
            other => Err(SimError::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Pairwise => f.write_str("pairwise"),
            Algorithm::Vectorized => f.write_str("vectorized"),
        }
    }
}

/// Overlay text a render sink may be asked to show
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoRequest {
    #[serde(rename = "days")] // elapsed simulated time in days
    Days,
}

impl FromStr for InfoRequest {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "days" => Ok(InfoRequest::Days),
            other => Err(SimError::UnknownInfo(other.to_string())),
        }
    }
}

/// Engine-level options
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub algorithm: Algorithm, // force strategy, fixed for the run
    pub target_rate: f64,     // maximum logical steps per second
    pub poll_interval_ms: u64, // stepper sleep between polls, bounds shutdown latency
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Pairwise,
            target_rate: 60.0,
            poll_interval_ms: 1,
        }
    }
}

/// Numerical and physical parameters
#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ParametersConfig {
    pub dt: f64,                    // seconds simulated per step
    pub G: f64,                     // gravitational constant
    pub trajectory_capacity: usize, // points kept per body
    pub world_extent: f64,          // meters between display centre and edge
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            dt: SECONDS_PER_DAY,
            G: DEFAULT_G,
            trajectory_capacity: 1000,
            world_extent: DEFAULT_WORLD_EXTENT,
        }
    }
}

/// Display surface the scale factor is derived from
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,                // render cadence, independent of target_rate
    pub info: Vec<InfoRequest>,  // overlay lines drawn every frame
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            fps: 60,
            info: vec![InfoRequest::Days],
        }
    }
}

/// Initial-condition generator selection
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PresetConfig {
    pub preset: String,
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            preset: "solar_system".to_string(),
        }
    }
}

/// Top-level configuration loaded from YAML
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct SimulationConfig {
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    pub display: DisplayConfig,
    pub scenario: PresetConfig,
}

impl SimulationConfig {
    /// Parse and validate a configuration from YAML text
    pub fn from_yaml_str(text: &str) -> Result<Self, SimError> {
        let cfg: SimulationConfig = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a configuration from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SimError> {
        let cfg: SimulationConfig = serde_yaml::from_reader(reader)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load a configuration file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Reject values that would make the run meaningless or divide by zero
    pub fn validate(&self) -> Result<(), SimError> {
        positive("dt", self.parameters.dt)?;
        positive("G", self.parameters.G)?;
        positive("world_extent", self.parameters.world_extent)?;
        positive("target_rate", self.engine.target_rate)?;
        ClockSettings::from_config(&self.engine).step_period()?;
        positive("width", self.display.width as f64)?;
        positive("height", self.display.height as f64)?;
        positive("fps", self.display.fps as f64)?;
        positive("trajectory_capacity", self.parameters.trajectory_capacity as f64)?;
        Ok(())
    }
}

pub(crate) fn positive(name: &'static str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidParameter { name, value })
    }
}
