//! Error type shared by configuration loading and the simulation core

use thiserror::Error;

/// Errors raised while configuring, populating, or stepping a simulation
#[derive(Debug, Error)]
pub enum SimError {
    #[error("unknown force algorithm `{0}` (expected `pairwise` or `vectorized`)")]
    UnknownAlgorithm(String),

    #[error("body `{name}` has non-positive mass {mass}")]
    InvalidMass { name: String, mass: f64 },

    #[error("body name `{0}` is used more than once")]
    DuplicateName(String),

    #[error("body `{name}` has a non-finite position or velocity")]
    NonFiniteState { name: String },

    #[error("invalid value {value} for parameter `{name}`")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("unknown scenario preset `{0}`")]
    UnknownPreset(String),

    #[error("unknown overlay info request `{0}`")]
    UnknownInfo(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
