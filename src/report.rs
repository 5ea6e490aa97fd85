//! Standalone VDOT calculator
//!
//! Builds the reference tables for a single performance: equivalent race
//! times, per-zone pace ranges and typical interval targets.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{PaceError, Result};
use crate::models::{format_race_time, round_to, PaceResult, PaceTime, PerformanceInput};
use crate::solver::solve_time_for_score;
use crate::vdot::VdotCalculator;
use crate::zones::{IntensityZone, ZoneCalculator, COMMON_INTERVALS};

/// A named race distance for the equivalent-times table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceDistance {
    pub name: String,
    pub distance_m: f64,
}

impl RaceDistance {
    pub fn new(name: impl Into<String>, distance_m: f64) -> Self {
        Self {
            name: name.into(),
            distance_m,
        }
    }

    /// 400m, 1600m, 5k, 10k, half marathon and marathon
    pub fn standard() -> Vec<RaceDistance> {
        vec![
            RaceDistance::new("400m", 400.0),
            RaceDistance::new("1600m", 1600.0),
            RaceDistance::new("5k", 5000.0),
            RaceDistance::new("10k", 10000.0),
            RaceDistance::new("Half Marathon", 21097.5),
            RaceDistance::new("Marathon", 42195.0),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquivalentTime {
    pub name: String,
    pub distance_m: f64,
    pub time_minutes: f64,
    /// MM:SS, or HH:MM:SS from one hour up
    pub formatted: String,
}

/// Pace range for a zone; `fast` is at the zone's max intensity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaceTarget {
    pub zone: IntensityZone,
    pub fast: PaceTime,
    pub slow: PaceTime,
}

impl PaceTarget {
    pub fn display(&self) -> String {
        format!("{} - {} min/km", self.fast, self.slow)
    }
}

/// Target time range for a common interval, with 400m lap splits
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalTarget {
    pub name: String,
    pub distance_m: f64,
    pub zone: IntensityZone,
    pub fast: PaceTime,
    pub slow: PaceTime,
    pub lap_fast: PaceTime,
    pub lap_slow: PaceTime,
}

impl IntervalTarget {
    pub fn display(&self) -> String {
        format!(
            "{} - {} (Lap: {} - {})",
            self.fast, self.slow, self.lap_fast, self.lap_slow
        )
    }
}

/// Full calculator output for one performance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VdotReport {
    pub vdot_score: f64,
    pub equivalent_times: Vec<EquivalentTime>,
    pub pace_targets: Vec<PaceTarget>,
    pub target_interval_times: Vec<IntervalTarget>,
}

impl VdotReport {
    /// Calculate the VDOT score and all reference tables for a performance
    pub fn calculate(performance: &PerformanceInput, distances: &[RaceDistance]) -> Result<Self> {
        let vdot = VdotCalculator::estimate_fitness_score(
            performance.distance_m,
            performance.time_minutes,
        )?;

        let mut equivalent_times = Vec::with_capacity(distances.len());
        for race in distances {
            let time_minutes = solve_time_for_score(vdot, race.distance_m)?;
            equivalent_times.push(EquivalentTime {
                name: race.name.clone(),
                distance_m: race.distance_m,
                time_minutes,
                formatted: format_race_time(time_minutes),
            });
        }

        let pace_targets = IntensityZone::ALL
            .iter()
            .filter_map(|&zone| match Self::zone_pace_target(vdot, zone) {
                Ok(target) => Some(target),
                Err(e) => {
                    warn!(zone = %zone, error = %e, "Skipping zone pace target");
                    None
                }
            })
            .collect();

        let target_interval_times = COMMON_INTERVALS
            .iter()
            .filter_map(|preset| {
                let range = preset.zone.range();
                let targets = (
                    VdotCalculator::pace_from_fitness(vdot, range.max, preset.distance_m),
                    VdotCalculator::pace_from_fitness(vdot, range.min, preset.distance_m),
                    VdotCalculator::pace_from_fitness(vdot, range.max, 400.0),
                    VdotCalculator::pace_from_fitness(vdot, range.min, 400.0),
                );
                match targets {
                    (Ok(fast), Ok(slow), Ok(lap_fast), Ok(lap_slow)) => Some(IntervalTarget {
                        name: preset.name.to_string(),
                        distance_m: preset.distance_m,
                        zone: preset.zone,
                        fast: fast.target_pace,
                        slow: slow.target_pace,
                        lap_fast: lap_fast.target_pace,
                        lap_slow: lap_slow.target_pace,
                    }),
                    _ => None,
                }
            })
            .collect();

        info!(vdot, "Calculated VDOT report");

        Ok(Self {
            vdot_score: round_to(vdot, 2),
            equivalent_times,
            pace_targets,
            target_interval_times,
        })
    }

    fn zone_pace_target(vdot: f64, zone: IntensityZone) -> std::result::Result<PaceTarget, PaceError> {
        let range = zone.range();
        let fast = VdotCalculator::pace_from_fitness(vdot, range.max, 1000.0)?;
        let slow = VdotCalculator::pace_from_fitness(vdot, range.min, 1000.0)?;
        Ok(PaceTarget {
            zone,
            fast: fast.pace_per_km,
            slow: slow.pace_per_km,
        })
    }
}

/// Single pace for a VDOT, zone name and distance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaceCalculation {
    pub vdot_score: f64,
    pub intensity_zone: IntensityZone,
    pub target_distance_m: f64,
    pub calculated_pace: PaceResult,
}

impl PaceCalculation {
    /// Pace at the top of the named zone; unknown zone names are an error
    pub fn calculate(vdot: f64, zone_name: &str, distance_m: f64) -> Result<Self> {
        let zone: IntensityZone = zone_name.parse()?;
        let intensity = ZoneCalculator::target_intensity(zone);
        let calculated_pace = VdotCalculator::pace_from_fitness(vdot, intensity, distance_m)?;

        info!(vdot, zone = %zone, distance_m, "Calculated pace");

        Ok(Self {
            vdot_score: vdot,
            intensity_zone: zone,
            target_distance_m: distance_m,
            calculated_pace,
        })
    }
}
