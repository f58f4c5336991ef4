//! Immutable views of the simulation published for rendering

use crate::configuration::config::SECONDS_PER_DAY;
use crate::simulation::states::{Body, Color, NVec2};

/// What a renderer needs from one body
#[derive(Debug, Clone, PartialEq)]
pub struct BodyView {
    pub name: String,
    pub x: NVec2,               // physical position, m
    pub x_vis: NVec2,           // display position, px
    pub radius: f64,
    pub color: Color,
    pub trajectory: Vec<NVec2>, // oldest first
}

impl From<&Body> for BodyView {
    fn from(b: &Body) -> Self {
        Self {
            name: b.name.clone(),
            x: b.x,
            x_vis: b.x_vis,
            radius: b.radius,
            color: b.color,
            trajectory: b.trajectory.to_vec(),
        }
    }
}

/// Consistent copy of every body after a completed step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub elapsed: f64, // simulated seconds
    pub steps: u64,   // completed steps since the last reset
    pub paused: bool,
    pub bodies: Vec<BodyView>,
}

impl Snapshot {
    pub fn elapsed_days(&self) -> f64 {
        self.elapsed / SECONDS_PER_DAY
    }

    pub fn body(&self, name: &str) -> Option<&BodyView> {
        self.bodies.iter().find(|b| b.name == name)
    }
}
