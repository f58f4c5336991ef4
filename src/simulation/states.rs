//! Core state types for the simulation.
//!
//! - `Body` holds one point mass: physical state in meters, its projection into
//!   display pixels, presentation attributes, and a bounded `Trajectory`
//! - `Trajectory` is a fixed-capacity FIFO of past visual positions

use std::collections::VecDeque;

use nalgebra::Vector2;
pub type NVec2 = Vector2<f64>;

/// RGB display color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Default for Color {
    fn default() -> Self {
        Color(255, 255, 255)
    }
}

/// Bounded history of visual positions, oldest first
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    points: VecDeque<NVec2>,
    capacity: usize,
}

impl Trajectory {
    /// Create an empty trajectory keeping at most `capacity` points
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a point, evicting the oldest once capacity is exceeded
    pub fn push(&mut self, p: NVec2) {
        self.points.push_back(p);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// A connected path needs at least two points
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn oldest(&self) -> Option<&NVec2> {
        self.points.front()
    }

    pub fn latest(&self) -> Option<&NVec2> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NVec2> {
        self.points.iter()
    }

    pub fn to_vec(&self) -> Vec<NVec2> {
        self.points.iter().copied().collect()
    }
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub name: String,           // unique within a simulation
    pub m: f64,                 // mass, kg
    pub x: NVec2,               // position, m
    pub v: NVec2,               // velocity, m/s
    pub a: NVec2,               // acceleration from the latest step, m/s^2
    pub x_vis: NVec2,           // position projected into display space, px
    pub radius: f64,            // display radius, px
    pub color: Color,           // display color
    pub trajectory: Trajectory, // past visual positions
}

impl Body {
    /// A body at rest with default presentation attributes
    pub fn new(name: impl Into<String>, m: f64, x: NVec2, x_vis: NVec2) -> Self {
        Self {
            name: name.into(),
            m,
            x,
            v: NVec2::zeros(),
            a: NVec2::zeros(),
            x_vis,
            radius: 1.0,
            color: Color::default(),
            trajectory: Trajectory::default(),
        }
    }

    pub fn with_velocity(mut self, v: NVec2) -> Self {
        self.v = v;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Semi-implicit Euler update using the acceleration already stored in `a`
    ///
    /// `meters_per_pixel` keeps `x_vis` moving in lockstep with `x`
    pub fn advance(&mut self, dt: f64, meters_per_pixel: f64) {
        let mut motion = self.motion();
        motion.advance(dt, meters_per_pixel);
        self.set_motion(motion);
    }

    /// Kinematic state without mass, presentation or trajectory
    pub fn motion(&self) -> Motion {
        Motion { x: self.x, v: self.v, a: self.a, x_vis: self.x_vis }
    }

    pub fn set_motion(&mut self, motion: Motion) {
        self.x = motion.x;
        self.v = motion.v;
        self.a = motion.a;
        self.x_vis = motion.x_vis;
    }

    /// Append the current visual position to the trajectory
    pub fn record_trajectory(&mut self) {
        self.trajectory.push(self.x_vis);
    }

    /// Linear momentum m v
    pub fn momentum(&self) -> NVec2 {
        self.m * self.v
    }

    pub fn is_finite(&self) -> bool {
        self.motion().is_finite()
    }
}

/// The part of a body a step changes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub x: NVec2,     // position, m
    pub v: NVec2,     // velocity, m/s
    pub a: NVec2,     // acceleration, m/s^2
    pub x_vis: NVec2, // display position, px
}

impl Motion {
    /// Semi-implicit Euler with the stored acceleration
    pub fn advance(&mut self, dt: f64, meters_per_pixel: f64) {
        // v_n+1 = v_n + a_n dt
        self.v += self.a * dt;
        // x_n+1 = x_n + v_n+1 dt, using the updated velocity
        let dx = self.v * dt;
        self.x += dx;
        self.x_vis += dx / meters_per_pixel;
    }

    pub fn is_finite(&self) -> bool {
        self.x.iter().chain(self.v.iter()).chain(self.x_vis.iter()).all(|c| c.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trajectory_evicts_oldest_first() {
        let mut tr = Trajectory::new(3);
        for i in 0..5 {
            tr.push(NVec2::new(i as f64, 0.0));
        }
        assert_eq!(tr.len(), 3);
        assert_eq!(tr.oldest(), Some(&NVec2::new(2.0, 0.0)));
        assert_eq!(tr.latest(), Some(&NVec2::new(4.0, 0.0)));
    }

    #[test]
    fn single_point_is_not_drawable() {
        let mut tr = Trajectory::new(10);
        tr.push(NVec2::zeros());
        assert!(!tr.is_drawable());
        tr.push(NVec2::new(1.0, 1.0));
        assert!(tr.is_drawable());
    }

    #[test]
    fn advance_uses_updated_velocity() {
        let mut b = Body::new("mover", 1.0, NVec2::zeros(), NVec2::zeros());
        b.a = NVec2::new(2.0, 0.0);
        b.advance(0.5, 10.0);
        assert_eq!(b.v, NVec2::new(1.0, 0.0));
        assert_eq!(b.x, NVec2::new(0.5, 0.0));
        assert_eq!(b.x_vis, NVec2::new(0.05, 0.0));
    }
}
