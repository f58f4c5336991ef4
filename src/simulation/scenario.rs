//! Initial-condition generators
//!
//! A generator is anything implementing [`InitialConditions`]: given the display
//! size it returns the bodies a run starts with, already placed in meters and
//! projected into pixels with the run's [`Scale`]. Closures of the form
//! `Fn(f64, f64) -> Vec<Body>` qualify directly.
//!
//! The simulation only calls `generate` from `reset`; it never inspects which
//! preset produced the bodies.

use crate::configuration::error::SimError;
use crate::simulation::params::{Parameters, Scale};
use crate::simulation::states::{Body, Color, NVec2};

/// Produces the starting bodies for a run
pub trait InitialConditions: Send {
    fn generate(&self, width: f64, height: f64) -> Vec<Body>;
}

impl<F> InitialConditions for F
where
    F: Fn(f64, f64) -> Vec<Body> + Send,
{
    fn generate(&self, width: f64, height: f64) -> Vec<Body> {
        self(width, height)
    }
}

/// Sun and the four inner planets plus the Moon, all starting on the -x axis
pub struct SolarSystem {
    pub scale: Scale,
}

impl SolarSystem {
    pub fn new(scale: Scale) -> Self {
        Self { scale }
    }
}

/// (name, color, physical radius m, display exaggeration, mass kg, distance from Sun m, tangential speed m/s)
const SOLAR_BODIES: [(&str, Color, f64, f64, f64, f64, f64); 6] = [
    ("Sun", Color(252, 229, 112), 696e6, 10.0, 2e30, 0.0, 0.0),
    ("Venus", Color(255, 198, 73), 6.05e6, 500.0, 4.57e24, 108.2e9, 35e3),
    ("Mercury", Color(183, 184, 185), 2.44e6, 1000.0, 3.3e23, 57.9e9, 47e3),
    ("Earth", Color(0, 94, 184), 6371e3, 500.0, 5.97e24, 149e9, 30e3),
    ("Moon", Color(246, 241, 213), 1737e3, 400.0, 7.35e22, 149e9 + 384.4e6, 30e3 + 1.022e3),
    ("Mars", Color(156, 46, 53), 3.4e6, 500.0, 6.42e23, 228e9, 24e3),
];

impl InitialConditions for SolarSystem {
    fn generate(&self, width: f64, height: f64) -> Vec<Body> {
        let centre = NVec2::new(width / 2.0, height / 2.0);

        SOLAR_BODIES
            .iter()
            .map(|&(name, color, radius, exaggeration, m, distance, speed)| {
                let x = NVec2::new(-distance, 0.0);
                Body::new(name, m, x, self.scale.to_visual(x, centre))
                    .with_velocity(NVec2::new(0.0, speed))
                    .with_radius(self.scale.to_pixels(radius * exaggeration).max(1.0))
                    .with_color(color)
            })
            .collect()
    }
}

/// Three comparable masses: one central, two on opposite circular-ish orbits
#[allow(non_snake_case)]
pub struct ThreeBody {
    pub scale: Scale,
    pub G: f64,
}

impl ThreeBody {
    #[allow(non_snake_case)]
    pub fn new(scale: Scale, G: f64) -> Self {
        Self { scale, G }
    }
}

impl InitialConditions for ThreeBody {
    fn generate(&self, width: f64, height: f64) -> Vec<Body> {
        let centre = NVec2::new(width / 2.0, height / 2.0);
        let m_a: f64 = 30e4;
        let m_b: f64 = 10e4;
        let separation: f64 = 100.0; // meters
        let speed = (self.G * m_a / separation).sqrt();

        let place = |name: &str, m: f64, x: NVec2, v: NVec2, color: Color| {
            Body::new(name, m, x, self.scale.to_visual(x, centre))
                .with_velocity(v)
                .with_radius(6.0)
                .with_color(color)
        };

        vec![
            place("A", m_a, NVec2::zeros(), NVec2::zeros(), Color(252, 229, 112)),
            place("B", m_b, NVec2::new(separation, 0.0), NVec2::new(0.0, speed), Color(255, 198, 73)),
            place("C", m_b, NVec2::new(-separation, 0.0), NVec2::new(0.0, -speed), Color(0, 94, 184)),
        ]
    }
}

/// Look up a generator by preset name
/// `solar_system`, `three_body`, or `empty`
pub fn preset(name: &str, params: &Parameters) -> Result<Box<dyn InitialConditions>, SimError> {
    match name {
        "solar_system" => Ok(Box::new(SolarSystem::new(params.scale))),
        "three_body" => Ok(Box::new(ThreeBody::new(params.scale, params.G))),
        "empty" => Ok(Box::new(|_w: f64, _h: f64| Vec::<Body>::new())),
        other => Err(SimError::UnknownPreset(other.to_string())),
    }
}
