//! Gravitational acceleration strategies
//!
//! Two interchangeable implementations of [`Acceleration`]:
//! - [`PairwiseGravity`]: direct loop over body pairs, the reference
//! - [`VectorizedGravity`]: the same law evaluated as whole-matrix operations
//!
//! Both skip pairs closer than [`MIN_SEPARATION2`] so coincident bodies
//! exert no force on each other for that step instead of dividing by zero.

use nalgebra::{DMatrix, DVector};

use crate::configuration::config::Algorithm;
use crate::configuration::error::SimError;
use crate::simulation::states::{Body, NVec2};

/// Squared separation (m^2) below which a pair contributes nothing
pub const MIN_SEPARATION2: f64 = 1.0e-12;

/// Trait for acceleration sources operating on a body slice
/// Implementations add their contribution into `out[i]` for each body
pub trait Acceleration {
    fn acceleration(&self, bodies: &[Body], out: &mut [NVec2]);
}

/// Newtonian gravity by direct summation over pairs
#[allow(non_snake_case)]
pub struct PairwiseGravity {
    pub G: f64, // gravitational constant
}

impl Acceleration for PairwiseGravity {
    fn acceleration(&self, bodies: &[Body], out: &mut [NVec2]) {
        let n = bodies.len();

        // Each unordered pair once, applied to both sides
        for i in 0..n {
            let bi = &bodies[i];

            for j in (i + 1)..n {
                let bj = &bodies[j];

                // displacement from i to j: i is pulled along +r, j along -r
                let r = bj.x - bi.x;
                let d2 = r.dot(&r);
                if d2 < MIN_SEPARATION2 {
                    continue;
                }

                // G / d^3
                let inv_d = d2.sqrt().recip();
                let coef = self.G * inv_d * inv_d * inv_d;

                // a_i +=  G m_j r / d^3
                // a_j += -G m_i r / d^3
                out[i] += coef * bj.m * r;
                out[j] -= coef * bi.m * r;
            }
        }
    }
}

/// Newtonian gravity evaluated over n x n matrices
///
/// Builds the pairwise displacement and squared-distance matrices, masks
/// self-pairs and near-coincident pairs to zero, forms the acceleration
/// magnitude matrix `G m_j / d^2`, projects it onto unit directions and
/// reduces each row to a net acceleration per body. Only the source mass
/// enters the matrix.
#[allow(non_snake_case)]
pub struct VectorizedGravity {
    pub G: f64, // gravitational constant
}

impl Acceleration for VectorizedGravity {
    fn acceleration(&self, bodies: &[Body], out: &mut [NVec2]) {
        let n = bodies.len();
        if n == 0 {
            return;
        }

        let m = DVector::from_iterator(n, bodies.iter().map(|b| b.m));
        let px = DVector::from_iterator(n, bodies.iter().map(|b| b.x.x));
        let py = DVector::from_iterator(n, bodies.iter().map(|b| b.x.y));
        let ones = DVector::<f64>::from_element(n, 1.0);

        // dx[(i, j)] = x_j - x_i
        let dx: DMatrix<f64> = &ones * px.transpose() - &px * ones.transpose();
        let dy: DMatrix<f64> = &ones * py.transpose() - &py * ones.transpose();
        let d2 = dx.component_mul(&dx) + dy.component_mul(&dy);

        // the diagonal is always masked since d2 is exactly zero there
        let inv_d2 = d2.map(|v| if v < MIN_SEPARATION2 { 0.0 } else { v.recip() });
        let inv_d = d2.map(|v| if v < MIN_SEPARATION2 { 0.0 } else { v.sqrt().recip() });

        // |a_ij| = G m_j / d_ij^2
        let magnitude = (&ones * m.transpose()).component_mul(&inv_d2) * self.G;

        // a_ij along the unit vector from i toward j
        let ax = magnitude.component_mul(&dx.component_mul(&inv_d));
        let ay = magnitude.component_mul(&dy.component_mul(&inv_d));

        // sum over j for each row i
        let net_x = ax.column_sum();
        let net_y = ay.column_sum();

        for (i, a) in out.iter_mut().enumerate() {
            *a += NVec2::new(net_x[i], net_y[i]);
        }
    }
}

/// The active force strategy, chosen once when the simulation is built
pub struct ForceModel {
    algorithm: Algorithm,
    term: Box<dyn Acceleration + Send + Sync>,
}

impl ForceModel {
    #[allow(non_snake_case)]
    pub fn new(algorithm: Algorithm, G: f64) -> Self {
        let term: Box<dyn Acceleration + Send + Sync> = match algorithm {
            Algorithm::Pairwise => Box::new(PairwiseGravity { G }),
            Algorithm::Vectorized => Box::new(VectorizedGravity { G }),
        };
        Self { algorithm, term }
    }

    /// Build from a strategy name, failing on anything unrecognized
    #[allow(non_snake_case)]
    pub fn from_name(name: &str, G: f64) -> Result<Self, SimError> {
        Ok(Self::new(name.parse()?, G))
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Compute accelerations for all bodies
    /// - `out[i]` is overwritten with the net acceleration of `bodies[i]`
    pub fn accumulate_accels(&self, bodies: &[Body], out: &mut [NVec2]) {
        for a in out.iter_mut() {
            *a = NVec2::zeros();
        }
        self.term.acceleration(bodies, out);
    }

    /// Convenience allocation of one acceleration per body
    pub fn accelerations(&self, bodies: &[Body]) -> Vec<NVec2> {
        let mut out = vec![NVec2::zeros(); bodies.len()];
        self.accumulate_accels(bodies, &mut out);
        out
    }
}
