//! VDOT pace model
//!
//! Maps a race performance to a VDOT score and a VDOT score back to training
//! paces, using Jack Daniels' oxygen cost and drop-dead formulas:
//!
//! - VO2 = -4.60 + 0.182258·v + 0.000104·v² (v in meters per minute)
//! - %max = 0.8 + 0.1894393·e^(-0.012778·t) + 0.2989558·e^(-0.1932605·t)
//!
//! Paces come from solving the VO2 formula as a quadratic in velocity.

use crate::error::PaceError;
use crate::models::{PaceResult, PaceTime};

/// Coefficient of the velocity-squared term
const VO2_A: f64 = 0.000_104;

/// Coefficient of the velocity term
const VO2_B: f64 = 0.182_258;

/// Constant term
const VO2_C: f64 = -4.60;

/// Upper bound for a target intensity, in percent of VDOT
const MAX_INTENSITY_PERCENT: f64 = 200.0;

/// Pace model calculations
pub struct VdotCalculator;

impl VdotCalculator {
    /// Estimate VDOT from a race performance
    pub fn estimate_fitness_score(distance_m: f64, time_minutes: f64) -> Result<f64, PaceError> {
        if time_minutes <= 0.0 || time_minutes.is_nan() {
            return Err(PaceError::NonPositiveTime(time_minutes));
        }
        if distance_m <= 0.0 || distance_m.is_nan() {
            return Err(PaceError::NonPositiveDistance(distance_m));
        }

        let velocity = distance_m / time_minutes;
        let vo2 = Self::oxygen_cost(velocity);
        let percent_max = Self::percent_max(time_minutes);

        Ok(vo2 / percent_max)
    }

    /// Oxygen cost (ml/kg/min) of running at `velocity` m/min
    pub fn oxygen_cost(velocity: f64) -> f64 {
        (VO2_A * velocity).mul_add(velocity, VO2_B.mul_add(velocity, VO2_C))
    }

    /// Fraction of VO2max sustainable for a race lasting `time_minutes`
    pub fn percent_max(time_minutes: f64) -> f64 {
        0.8 + 0.189_439_3 * (-0.012_778 * time_minutes).exp()
            + 0.298_955_8 * (-0.193_260_5 * time_minutes).exp()
    }

    /// Velocity in m/min at which the oxygen cost equals `intensity_percent` of VDOT
    pub fn velocity_from_fitness(vdot: f64, intensity_percent: f64) -> Result<f64, PaceError> {
        let target_vo2 = vdot * (intensity_percent / 100.0);

        let c = VO2_C - target_vo2;
        let discriminant = VO2_B.mul_add(VO2_B, -4.0 * VO2_A * c);
        if discriminant < 0.0 || discriminant.is_nan() {
            return Err(PaceError::NegativeDiscriminant {
                vdot,
                intensity: intensity_percent,
            });
        }

        let velocity = (-VO2_B + discriminant.sqrt()) / (2.0 * VO2_A);
        if velocity <= 0.0 {
            return Err(PaceError::NonPositiveVelocity(velocity));
        }

        Ok(velocity)
    }

    /// Target pace for a distance and pace per kilometer at an intensity
    pub fn pace_from_fitness(
        vdot: f64,
        intensity_percent: f64,
        target_distance_m: f64,
    ) -> Result<PaceResult, PaceError> {
        if !(intensity_percent > 0.0 && intensity_percent <= MAX_INTENSITY_PERCENT) {
            return Err(PaceError::IntensityOutOfRange(intensity_percent));
        }

        let velocity = Self::velocity_from_fitness(vdot, intensity_percent)?;

        Ok(PaceResult {
            target_pace: PaceTime::from_minutes(target_distance_m / velocity),
            pace_per_km: PaceTime::from_minutes(1000.0 / velocity),
        })
    }
}
