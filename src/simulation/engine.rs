//! Simulation state and the single-step operation
//!
//! `Simulation` owns the bodies, elapsed time, pause flag, force model and
//! parameters of one run. It is single-threaded; `SimulationClock` wraps it
//! for background stepping.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::configuration::config::{Algorithm, SimulationConfig};
use crate::configuration::error::SimError;
use crate::simulation::forces::ForceModel;
use crate::simulation::integrator::{commit_step, stage_step};
use crate::simulation::params::Parameters;
use crate::simulation::scenario::{preset, InitialConditions};
use crate::simulation::snapshot::{BodyView, Snapshot};
use crate::simulation::states::{Body, NVec2, Trajectory};

/// Result of asking the simulation to step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced, // all bodies moved and recorded, time advanced by dt
    Paused,   // nothing changed
}

pub struct Simulation {
    bodies: Vec<Body>,
    t: f64,       // elapsed simulated seconds
    steps: u64,   // completed steps
    paused: bool,
    params: Parameters,
    forces: ForceModel,
    generator: Option<Box<dyn InitialConditions>>,
    scratch: Vec<NVec2>, // acceleration buffer reused between steps
}

impl Simulation {
    /// Create an empty simulation; call `reset` or `add_body` to populate it
    pub fn new(
        params: Parameters,
        algorithm: Algorithm,
        generator: Option<Box<dyn InitialConditions>>,
    ) -> Result<Self, SimError> {
        params.validate()?;
        info!(%algorithm, dt = params.dt, meters_per_pixel = params.scale.meters_per_pixel, "simulation created");
        let forces = ForceModel::new(algorithm, params.G);
        Ok(Self {
            bodies: Vec::new(),
            t: 0.0,
            steps: 0,
            paused: false,
            params,
            forces,
            generator,
            scratch: Vec::new(),
        })
    }

    /// Like `new` but with the algorithm given by name
    pub fn with_algorithm_name(
        params: Parameters,
        algorithm: &str,
        generator: Option<Box<dyn InitialConditions>>,
    ) -> Result<Self, SimError> {
        let algorithm: Algorithm = algorithm.parse()?;
        Self::new(params, algorithm, generator)
    }

    /// Build and populate a simulation from a validated configuration
    pub fn from_config(cfg: &SimulationConfig) -> Result<Self, SimError> {
        let params = Parameters::from_config(cfg)?;
        let generator = preset(&cfg.scenario.preset, &params)?;
        let mut sim = Self::new(params, cfg.engine.algorithm, Some(generator))?;
        sim.reset()?;
        Ok(sim)
    }

    /// Insert one body after validating it against the current set
    pub fn add_body(&mut self, body: Body) -> Result<(), SimError> {
        let prepared = self.prepare(body)?;
        if self.bodies.iter().any(|b| b.name == prepared.name) {
            return Err(SimError::DuplicateName(prepared.name));
        }
        self.bodies.push(prepared);
        Ok(())
    }

    pub fn add_bodies(&mut self, bodies: impl IntoIterator<Item = Body>) -> Result<(), SimError> {
        for body in bodies {
            self.add_body(body)?;
        }
        Ok(())
    }

    /// Clear bodies and time, then repopulate from the generator
    ///
    /// Without a generator the simulation is left empty. If the generator
    /// produces an invalid body the error is returned and the simulation is
    /// left empty rather than partially populated.
    pub fn reset(&mut self) -> Result<(), SimError> {
        self.bodies.clear();
        self.t = 0.0;
        self.steps = 0;

        let Some(generator) = &self.generator else {
            warn!("reset without an initial-condition generator, simulation is empty");
            return Ok(());
        };

        let generated = generator.generate(self.params.width, self.params.height);
        let mut seen = HashSet::with_capacity(generated.len());
        let mut prepared = Vec::with_capacity(generated.len());
        for body in generated {
            let body = self.prepare(body)?;
            if !seen.insert(body.name.clone()) {
                return Err(SimError::DuplicateName(body.name));
            }
            prepared.push(body);
        }

        self.bodies = prepared;
        info!(bodies = self.bodies.len(), "simulation reset");
        Ok(())
    }

    /// Check invariants and give the body a fresh trajectory seeded with its start point
    fn prepare(&self, mut body: Body) -> Result<Body, SimError> {
        if !(body.m.is_finite() && body.m > 0.0) {
            return Err(SimError::InvalidMass { name: body.name, mass: body.m });
        }
        if !body.is_finite() {
            return Err(SimError::NonFiniteState { name: body.name });
        }
        body.a = NVec2::zeros();
        body.trajectory = Trajectory::new(self.params.trajectory_capacity);
        body.record_trajectory();
        Ok(body)
    }

    /// Advance every body by one `dt`
    ///
    /// The new kinematics are staged first and committed only if every body
    /// stays finite, so a failed step leaves the state untouched.
    pub fn step(&mut self) -> Result<StepOutcome, SimError> {
        if self.paused {
            return Ok(StepOutcome::Paused);
        }

        let staged = stage_step(&self.bodies, &self.forces, &self.params, &mut self.scratch);

        if let Some(i) = staged.iter().position(|m| !m.is_finite()) {
            return Err(SimError::NonFiniteState { name: self.bodies[i].name.clone() });
        }

        commit_step(&mut self.bodies, &staged);
        self.t += self.params.dt;
        self.steps += 1;
        debug!(step = self.steps, t = self.t, "step complete");
        Ok(StepOutcome::Advanced)
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, name: &str) -> Option<&Body> {
        self.bodies.iter().find(|b| b.name == name)
    }

    /// Elapsed simulated time in seconds
    pub fn elapsed(&self) -> f64 {
        self.t
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Flip the pause flag and return the new value
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn algorithm(&self) -> Algorithm {
        self.forces.algorithm()
    }

    pub fn forces(&self) -> &ForceModel {
        &self.forces
    }

    /// Sum of m v over all bodies
    pub fn total_momentum(&self) -> NVec2 {
        self.bodies.iter().map(Body::momentum).sum()
    }

    /// Kinetic plus pairwise potential energy, J
    pub fn total_energy(&self) -> f64 {
        let kinetic: f64 = self.bodies.iter().map(|b| 0.5 * b.m * b.v.norm_squared()).sum();
        let mut potential = 0.0;
        for (i, bi) in self.bodies.iter().enumerate() {
            for bj in &self.bodies[i + 1..] {
                let d = (bj.x - bi.x).norm();
                if d > 0.0 {
                    potential -= self.params.G * bi.m * bj.m / d;
                }
            }
        }
        kinetic + potential
    }

    /// Copy the render-facing state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            elapsed: self.t,
            steps: self.steps,
            paused: self.paused,
            bodies: self.bodies.iter().map(BodyView::from).collect(),
        }
    }
}
