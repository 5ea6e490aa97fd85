//! Race time solver
//!
//! Inverts the VDOT estimate: for a known score and distance, finds the race
//! time that reproduces it.

use crate::error::PaceError;
use crate::vdot::VdotCalculator;

/// Fastest race time considered, in minutes
pub const SEARCH_MIN_MINUTES: f64 = 0.5;

/// Slowest race time considered, in minutes
pub const SEARCH_MAX_MINUTES: f64 = 600.0;

/// Bisection always runs this many halvings
pub const BISECTION_ITERATIONS: usize = 100;

/// Find the time (minutes) over `distance_m` that yields `vdot`.
///
/// The VDOT estimate falls as time grows for a fixed distance, so a midpoint
/// scoring above the target is too fast and moves the lower bound up. Runs a
/// fixed number of iterations without an early exit; targets outside the
/// search window converge to its nearest edge.
pub fn solve_time_for_score(vdot: f64, distance_m: f64) -> Result<f64, PaceError> {
    let mut low = SEARCH_MIN_MINUTES;
    let mut high = SEARCH_MAX_MINUTES;

    for _ in 0..BISECTION_ITERATIONS {
        let mid = (low + high) / 2.0;
        let mid_vdot = VdotCalculator::estimate_fitness_score(distance_m, mid)?;

        if mid_vdot > vdot {
            low = mid;
        } else {
            high = mid;
        }
    }

    Ok((low + high) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_recovers_5k_time() {
        let vdot = VdotCalculator::estimate_fitness_score(5000.0, 20.0).unwrap();
        let time = solve_time_for_score(vdot, 5000.0).unwrap();
        assert!((time - 20.0).abs() < 1e-6, "got {}", time);
    }

    #[test]
    fn test_equivalent_times_grow_with_distance() {
        let vdot = VdotCalculator::estimate_fitness_score(5000.0, 20.0).unwrap();
        let distances = [400.0, 1600.0, 5000.0, 10000.0, 21097.5, 42195.0];

        let times: Vec<f64> = distances
            .iter()
            .map(|&d| solve_time_for_score(vdot, d).unwrap())
            .collect();

        for pair in times.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        // A 20 minute 5K is roughly a 41:28 10K and a 3:11 marathon
        assert!((times[3] - 41.46).abs() < 0.05);
        assert!((times[5] - 191.29).abs() < 0.05);
    }

    #[test]
    fn test_estimate_decreases_with_time() {
        for &distance in &[400.0, 800.0, 1600.0, 3000.0, 5000.0, 10000.0, 21097.5, 42195.0] {
            let mut previous = f64::INFINITY;
            let mut time = SEARCH_MIN_MINUTES;
            while time < SEARCH_MAX_MINUTES {
                let vdot = VdotCalculator::estimate_fitness_score(distance, time).unwrap();
                assert!(vdot < previous, "not decreasing at {}m, {} min", distance, time);
                previous = vdot;
                time += 0.25;
            }
        }
    }

    #[test]
    fn test_unreachable_score_converges_to_window_edge() {
        let too_fast = solve_time_for_score(1.0e6, 5000.0).unwrap();
        assert!((too_fast - SEARCH_MIN_MINUTES).abs() < 1e-9);

        let too_slow = solve_time_for_score(-100.0, 5000.0).unwrap();
        assert!((too_slow - SEARCH_MAX_MINUTES).abs() < 1e-9);
    }

    #[test]
    fn test_non_positive_distance_propagates() {
        assert_eq!(
            solve_time_for_score(50.0, 0.0),
            Err(PaceError::NonPositiveDistance(0.0))
        );
    }

    proptest! {
        #[test]
        fn test_round_trip(
            distance in prop::sample::select(vec![1600.0, 3000.0, 5000.0, 10000.0, 21097.5, 42195.0]),
            pace_min_per_km in 3.0f64..7.0,
        ) {
            let time = distance / 1000.0 * pace_min_per_km;
            let vdot = VdotCalculator::estimate_fitness_score(distance, time).unwrap();
            let solved = solve_time_for_score(vdot, distance).unwrap();
            prop_assert!((solved - time).abs() < 1e-6, "time {} solved {}", time, solved);
        }
    }
}
