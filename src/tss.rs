use serde::Serialize;
use tracing::warn;

use crate::error::PaceError;
use crate::models::EffectiveSegment;
use crate::vdot::VdotCalculator;
use crate::zones::{IntensityZone, ZoneCalculator};

/// Load contributed by one segment of a workout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentTss {
    pub zone: IntensityZone,
    pub effective_reps: u32,
    pub duration_seconds: f64,
    pub intensity_factor: f64,
    pub tss: f64,
}

/// TSS calculation result with the per-segment breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TssResult {
    /// Rounded score, 100 = one hour at threshold
    pub tss: u32,
    pub raw_tss: f64,
    /// Threshold velocity in m/s, zero when no fitness basis
    pub threshold_velocity_mps: f64,
    pub segments: Vec<SegmentTss>,
}

impl TssResult {
    pub fn zero() -> Self {
        Self {
            tss: 0,
            raw_tss: 0.0,
            threshold_velocity_mps: 0.0,
            segments: Vec::new(),
        }
    }
}

/// Pace-based TSS engine for prescribed workouts
pub struct TssCalculator;

impl TssCalculator {
    /// Velocity in m/s at the top of a zone
    pub fn zone_velocity_mps(vdot: f64, zone: IntensityZone) -> Result<f64, PaceError> {
        let intensity = ZoneCalculator::target_intensity(zone);
        Ok(VdotCalculator::velocity_from_fitness(vdot, intensity)? / 60.0)
    }

    /// Threshold pace velocity, the intensity factor 1.0 reference
    pub fn threshold_velocity_mps(vdot: f64) -> Result<f64, PaceError> {
        Self::zone_velocity_mps(vdot, IntensityZone::Threshold)
    }

    /// Calculate TSS for a workout given as effective segments
    ///
    /// Per segment: TSS = duration × v × IF / (v_threshold × 3600) × 100,
    /// with IF = v / v_threshold. Segments whose velocity cannot be computed
    /// are skipped.
    pub fn calculate_tss(vdot: f64, segments: &[EffectiveSegment<'_>]) -> TssResult {
        if vdot <= 0.0 {
            return TssResult::zero();
        }

        let threshold_velocity = match Self::threshold_velocity_mps(vdot) {
            Ok(v) => v,
            Err(e) => {
                warn!(vdot, error = %e, "No threshold velocity, TSS is zero");
                return TssResult::zero();
            }
        };

        let mut breakdown = Vec::with_capacity(segments.len());
        let mut total = 0.0;

        for effective in segments {
            let segment = effective.segment;
            let velocity = match Self::zone_velocity_mps(vdot, segment.zone) {
                Ok(v) => v,
                Err(e) => {
                    warn!(zone = %segment.zone, error = %e, "Skipping segment in TSS calculation");
                    continue;
                }
            };

            let duration_seconds =
                segment.distance_m * f64::from(effective.effective_reps) / velocity;
            let intensity_factor = velocity / threshold_velocity;
            let tss = (duration_seconds * velocity * intensity_factor)
                / (threshold_velocity * 3600.0)
                * 100.0;

            total += tss;
            breakdown.push(SegmentTss {
                zone: segment.zone,
                effective_reps: effective.effective_reps,
                duration_seconds,
                intensity_factor,
                tss,
            });
        }

        TssResult {
            tss: total.round_ties_even().max(0.0) as u32,
            raw_tss: total,
            threshold_velocity_mps: threshold_velocity,
            segments: breakdown,
        }
    }
}
