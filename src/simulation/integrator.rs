//! Fixed-step semi-implicit Euler integration
//!
//! All accelerations are computed from the pre-step positions before any body
//! moves, so the result does not depend on body order. A step can be split
//! into `stage_step`, which leaves the bodies untouched, and `commit_step`.

use super::forces::ForceModel;
use super::params::Parameters;
use super::states::{Body, Motion, NVec2};

/// Advance `bodies` by one step of `params.dt`
/// Computes accelerations, advances every body, then records one trajectory
/// point per body. `scratch` is reused across calls to avoid reallocating.
pub fn euler_step(bodies: &mut [Body], forces: &ForceModel, params: &Parameters, scratch: &mut Vec<NVec2>) {
    let staged = stage_step(bodies, forces, params, scratch);
    commit_step(bodies, &staged);
}

/// Post-step kinematics for every body, in body order
pub fn stage_step(bodies: &[Body], forces: &ForceModel, params: &Parameters, scratch: &mut Vec<NVec2>) -> Vec<Motion> {
    let n = bodies.len();
    if n == 0 { // no bodies, nothing to do
        return Vec::new();
    }

    scratch.resize(n, NVec2::zeros());

    // a_n for every body from x_n
    forces.accumulate_accels(bodies, scratch);

    // Kick then drift with the updated velocity
    bodies
        .iter()
        .zip(scratch.iter())
        .map(|(b, a)| {
            let mut motion = Motion { a: *a, ..b.motion() };
            motion.advance(params.dt, params.scale.meters_per_pixel);
            motion
        })
        .collect()
}

/// Write staged kinematics back and record one trajectory point per body
pub fn commit_step(bodies: &mut [Body], staged: &[Motion]) {
    for (b, motion) in bodies.iter_mut().zip(staged) {
        b.set_motion(*motion);
        b.record_trajectory();
    }
}
