use std::time::Instant;

use crate::configuration::config::{Algorithm, DEFAULT_G};
use crate::simulation::forces::ForceModel;
use crate::simulation::states::{Body, NVec2};

/// Helper to build `n` bodies on a deterministic spread, no rand needed
fn make_bodies(n: usize) -> Vec<Body> {
    (0..n)
        .map(|i| {
            let i_f = i as f64;
            let x = NVec2::new((i_f * 0.37).sin() * 5.0e9, (i_f * 0.13).cos() * 5.0e9);
            Body::new(format!("b{i}"), 1.0e24 * (1.0 + (i_f * 0.7).sin().abs()), x, NVec2::zeros())
        })
        .collect()
}

/// Time one acceleration pass of each strategy for a range of body counts
/// Output is a plain table, paste into a spreadsheet to graph
pub fn bench_gravity() {
    let ns = [2, 4, 8, 16, 32, 64, 128, 256];
    let repeats = 50;

    let pairwise = ForceModel::new(Algorithm::Pairwise, DEFAULT_G);
    let vectorized = ForceModel::new(Algorithm::Vectorized, DEFAULT_G);

    println!("N,pairwise_us,vectorized_us,max_rel_diff");

    for n in ns {
        let bodies = make_bodies(n);
        let mut out_p = vec![NVec2::zeros(); n];
        let mut out_v = vec![NVec2::zeros(); n];

        // Warm up
        pairwise.accumulate_accels(&bodies, &mut out_p);
        vectorized.accumulate_accels(&bodies, &mut out_v);

        let t0 = Instant::now();
        for _ in 0..repeats {
            pairwise.accumulate_accels(&bodies, &mut out_p);
        }
        let us_pairwise = t0.elapsed().as_secs_f64() * 1e6 / repeats as f64;

        let t1 = Instant::now();
        for _ in 0..repeats {
            vectorized.accumulate_accels(&bodies, &mut out_v);
        }
        let us_vectorized = t1.elapsed().as_secs_f64() * 1e6 / repeats as f64;

        // sanity: both strategies should agree
        let max_rel = out_p
            .iter()
            .zip(out_v.iter())
            .map(|(p, v)| (p - v).norm() / p.norm().max(f64::MIN_POSITIVE))
            .fold(0.0, f64::max);

        println!("{},{:.3},{:.3},{:.3e}", n, us_pairwise, us_vectorized, max_rel);
    }
}
