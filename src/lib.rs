pub mod simulation;
pub mod configuration;
pub mod visualization;
pub mod benchmark;

pub use simulation::states::{Body, Color, Motion, NVec2, Trajectory};
pub use simulation::params::{Parameters, Scale};
pub use simulation::forces::{Acceleration, ForceModel, PairwiseGravity, VectorizedGravity, MIN_SEPARATION2};
pub use simulation::integrator::{commit_step, euler_step, stage_step};
pub use simulation::engine::{Simulation, StepOutcome};
pub use simulation::scenario::{preset, InitialConditions, SolarSystem, ThreeBody};
pub use simulation::snapshot::{BodyView, Snapshot};
pub use simulation::clock::{ClockSettings, ClockStatus, SimulationClock};

pub use configuration::config::{Algorithm, InfoRequest, SimulationConfig, EngineConfig, ParametersConfig, DisplayConfig, PresetConfig};
pub use configuration::error::SimError;

pub use visualization::render::{overlay_lines, RenderSink};
pub use visualization::headless::{run_frames, LogSink};

pub use benchmark::benchmark::bench_gravity;
