//! Escape-time field evaluation.
//!
//! Iterates a compiled recurrence at a single starting quaternion and
//! reports when (if ever) the orbit leaves the escape radius. The
//! resulting scalar is the density the grid sampler and marching cubes
//! operate on: low counts escape quickly (outside), the saturated count
//! never escapes (inside).

pub mod grid;

pub use grid::{sample_field, ConfigError, SamplingGrid};

use crate::parse::CompiledRecurrence;
use crate::types::Quaternion;

/// Iteration budget and escape radius for one invocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldParams {
    /// Constant parameter `C` of the recurrence
    pub constant: Quaternion,
    /// Fourth component of every starting quaternion
    pub z_w: f32,
    /// Iteration budget per grid point
    pub max_iterations: u16,
    /// Escape radius; doubles as the marching-cubes iso level
    pub threshold: f32,
}

/// Density of a fully-outside sample (border shell, immediate escape)
pub const OUTSIDE_DENSITY: f32 = 0.0;

/// Iterate the recurrence from `start` and return the escape time.
///
/// The magnitude is tested *before* each step, so a starting point
/// already beyond the threshold reports 0 without any work. Points that
/// never escape within the budget saturate at `max_iterations`, the
/// sentinel maximal density. The squared magnitude is compared against
/// the squared threshold to keep the hot loop sqrt-free.
///
/// Increasing `max_iterations` can only raise or saturate the result,
/// never lower it.
#[inline]
pub fn escape_time(
    recurrence: &CompiledRecurrence,
    start: Quaternion,
    params: &FieldParams,
) -> f32 {
    let limit_sq = params.threshold * params.threshold;
    let mut state = start;

    for i in 0..params.max_iterations {
        if state.norm_sq() > limit_sq {
            return f32::from(i);
        }
        state = recurrence.step(state, params.constant);
    }

    f32::from(params.max_iterations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::compile;

    fn params(max_iterations: u16, threshold: f32) -> FieldParams {
        FieldParams {
            constant: Quaternion::ZERO,
            z_w: 0.0,
            max_iterations,
            threshold,
        }
    }

    #[test]
    fn test_immediate_escape_costs_zero_iterations() {
        let rec = compile("Z*Z + C").unwrap();
        let start = Quaternion::new(0.0, 5.0, 0.0, 0.0);
        assert_eq!(escape_time(&rec, start, &params(20, 2.0)), 0.0);
    }

    #[test]
    fn test_bounded_orbit_saturates() {
        let rec = compile("Z*Z + C").unwrap();
        // |Z| < 1 with C = 0 never escapes
        let start = Quaternion::new(0.0, 0.5, 0.1, 0.0);
        assert_eq!(escape_time(&rec, start, &params(20, 2.0)), 20.0);
        assert_eq!(escape_time(&rec, start, &params(100, 2.0)), 100.0);
    }

    #[test]
    fn test_escaping_orbit_reports_finite_count() {
        let rec = compile("Z*Z + C").unwrap();
        // |Z| = 1.5 with C = 0: magnitude squares each step, escapes fast
        let start = Quaternion::new(0.0, 1.5, 0.0, 0.0);
        let t = escape_time(&rec, start, &params(20, 2.0));
        assert!(t > 0.0 && t < 5.0, "escape time {t} out of expected range");
    }

    #[test]
    fn test_monotone_in_iteration_budget() {
        let rec = compile("Z*Z + C").unwrap();
        let starts = [
            Quaternion::new(0.0, 0.3, 0.2, 0.1),
            Quaternion::new(0.0, 1.1, 0.0, 0.0),
            Quaternion::new(0.0, 1.9, 0.4, 0.0),
            Quaternion::new(0.0, 3.0, 0.0, 0.0),
        ];
        for start in starts {
            let mut prev = 0.0;
            for budget in [1u16, 2, 4, 8, 16, 32, 64] {
                let t = escape_time(&rec, start, &params(budget, 2.0));
                assert!(t >= prev, "density decreased from {prev} to {t} at budget {budget}");
                prev = t;
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let rec = compile("Z*Z + C").unwrap();
        let p = FieldParams {
            constant: Quaternion::new(0.1, -0.2, 0.3, 0.0),
            z_w: 0.05,
            max_iterations: 30,
            threshold: 2.0,
        };
        let start = Quaternion::new(p.z_w, 0.7, -0.4, 0.2);
        let first = escape_time(&rec, start, &p);
        for _ in 0..5 {
            assert_eq!(escape_time(&rec, start, &p).to_bits(), first.to_bits());
        }
    }
}
