//! Numerical and physical parameters for a run
//!
//! `Parameters` is built once from a validated configuration and handed to the
//! simulation by value; nothing here is global or mutable after construction.
//! - timestep `dt` and gravitational constant `G`
//! - trajectory capacity
//! - `Scale`, the meters-per-pixel projection derived from world extent and width

use crate::configuration::config::{positive, SimulationConfig};
use crate::configuration::error::SimError;
use crate::simulation::states::NVec2;

/// World-to-display projection, constant for a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub meters_per_pixel: f64,
}

impl Scale {
    /// `world_extent` meters span half the display width
    pub fn from_extent(world_extent: f64, width: f64) -> Self {
        Self {
            meters_per_pixel: world_extent / (width / 2.0),
        }
    }

    /// Project a physical position relative to a pixel-space origin
    pub fn to_visual(&self, x: NVec2, origin_px: NVec2) -> NVec2 {
        origin_px + x / self.meters_per_pixel
    }

    /// Convert a physical length to pixels
    pub fn to_pixels(&self, meters: f64) -> f64 {
        meters / self.meters_per_pixel
    }
}

#[allow(non_snake_case)]
#[derive(Debug, Clone)]
pub struct Parameters {
    pub dt: f64,                    // seconds per step
    pub G: f64,                     // gravitational constant
    pub trajectory_capacity: usize, // points kept per body
    pub scale: Scale,               // meters per pixel
    pub width: f64,                 // display width, px
    pub height: f64,                // display height, px
}

impl Parameters {
    pub fn from_config(cfg: &SimulationConfig) -> Result<Self, SimError> {
        cfg.validate()?;
        Ok(Self::build(cfg))
    }

    /// Check a hand-built parameter set the same way a config is checked
    pub fn validate(&self) -> Result<(), SimError> {
        positive("dt", self.dt)?;
        positive("G", self.G)?;
        positive("meters_per_pixel", self.scale.meters_per_pixel)?;
        positive("trajectory_capacity", self.trajectory_capacity as f64)?;
        positive("width", self.width)?;
        positive("height", self.height)?;
        Ok(())
    }

    fn build(cfg: &SimulationConfig) -> Self {
        let p = &cfg.parameters;
        let width = cfg.display.width as f64;
        Self {
            dt: p.dt,
            G: p.G,
            trajectory_capacity: p.trajectory_capacity,
            scale: Scale::from_extent(p.world_extent, width),
            width,
            height: cfg.display.height as f64,
        }
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self::build(&SimulationConfig::default())
    }
}
