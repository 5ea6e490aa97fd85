//! Structured workout aggregation
//!
//! Turns a workout skeleton plus a VDOT into per-segment paces, distance and
//! time totals, and a TSS score.

use serde::Serialize;
use tracing::debug;

use crate::models::{
    CalculatedItem, CalculatedSegment, StructuredWorkout, WorkoutItem, WorkoutSegment,
    WorkoutSummary,
};
use crate::tss::{TssCalculator, TssResult};
use crate::vdot::VdotCalculator;
use crate::zones::ZoneCalculator;

/// Lap distance used for the per-lap pace column
const LAP_DISTANCE_M: f64 = 400.0;

/// Calculated workout for one fitness score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedWorkout {
    pub items: Vec<CalculatedItem>,
    pub summary: WorkoutSummary,
    /// Per-segment load behind `summary.tss`
    pub tss: TssResult,
}

/// Workout aggregation engine
pub struct WorkoutAggregator;

impl WorkoutAggregator {
    /// Calculate paces, totals and TSS for `workout` at `vdot`.
    ///
    /// A score of zero or below is a valid incomplete input and yields an
    /// empty result. Segments whose pace cannot be computed are left out and
    /// contribute nothing to the totals.
    pub fn aggregate(vdot: f64, workout: &StructuredWorkout) -> AggregatedWorkout {
        if vdot <= 0.0 || vdot.is_nan() {
            debug!(vdot, "No fitness basis, returning empty workout");
            return AggregatedWorkout {
                items: Vec::new(),
                summary: WorkoutSummary::empty(),
                tss: TssResult::zero(),
            };
        }

        let mut items = Vec::with_capacity(workout.items.len());
        for item in &workout.items {
            match item {
                WorkoutItem::Segment(segment) => {
                    if let Some(calculated) = Self::calculate_segment(vdot, segment, 1) {
                        items.push(CalculatedItem::Segment(calculated));
                    }
                }
                WorkoutItem::Block(block) => {
                    let segments: Vec<CalculatedSegment> = block
                        .segments
                        .iter()
                        .filter_map(|segment| {
                            Self::calculate_segment(vdot, segment, block.multiplier)
                        })
                        .collect();
                    if !segments.is_empty() {
                        items.push(CalculatedItem::Block {
                            multiplier: block.multiplier,
                            segments,
                        });
                    }
                }
            }
        }

        let flattened = flatten(&items);
        let mut total_distance_m = 0.0;
        let mut active_seconds = 0.0;
        for segment in &flattened {
            let reps = f64::from(segment.effective_reps);
            total_distance_m += segment.distance_m * reps;
            active_seconds += segment.target_pace.total_seconds() * reps;
        }
        let rest_seconds = Self::rest_seconds(&flattened);

        let tss = TssCalculator::calculate_tss(vdot, &workout.effective_segments());
        for segment in &tss.segments {
            debug!(
                zone = %segment.zone,
                effective_reps = segment.effective_reps,
                duration_seconds = segment.duration_seconds,
                intensity_factor = segment.intensity_factor,
                tss = segment.tss,
                "Segment load"
            );
        }

        debug!(
            vdot,
            segments = flattened.len(),
            total_distance_m,
            active_seconds,
            rest_seconds,
            tss = tss.tss,
            raw_tss = tss.raw_tss,
            threshold_velocity_mps = tss.threshold_velocity_mps,
            "Aggregated workout"
        );

        AggregatedWorkout {
            items,
            summary: WorkoutSummary::new(total_distance_m, active_seconds, rest_seconds, tss.tss),
            tss,
        }
    }

    /// Rest over the flattened segment sequence.
    ///
    /// Each segment rests `(reps - 1) × rest` between its own repetitions,
    /// using the unmultiplied rep count, plus one more `rest` before the next
    /// segment unless it is the last one.
    pub fn rest_seconds(flattened: &[&CalculatedSegment]) -> f64 {
        let count = flattened.len();
        flattened
            .iter()
            .enumerate()
            .map(|(index, segment)| {
                let between_reps = f64::from(segment.reps.saturating_sub(1)) * segment.rest_seconds;
                let after_segment = if index + 1 < count {
                    segment.rest_seconds
                } else {
                    0.0
                };
                between_reps + after_segment
            })
            .sum()
    }

    fn calculate_segment(
        vdot: f64,
        segment: &WorkoutSegment,
        multiplier: u32,
    ) -> Option<CalculatedSegment> {
        let intensity = ZoneCalculator::target_intensity(segment.zone);

        let paces = VdotCalculator::pace_from_fitness(vdot, intensity, segment.distance_m)
            .and_then(|pace| {
                VdotCalculator::pace_from_fitness(vdot, intensity, LAP_DISTANCE_M)
                    .map(|lap| (pace, lap))
            });

        match paces {
            Ok((pace, lap)) => Some(CalculatedSegment {
                reps: segment.reps,
                effective_reps: segment.reps.saturating_mul(multiplier),
                distance_m: segment.distance_m,
                zone: segment.zone,
                rest_seconds: segment.rest_seconds,
                target_pace: pace.target_pace,
                lap_pace: lap.target_pace,
                pace_per_km: pace.pace_per_km,
            }),
            Err(e) => {
                debug!(zone = %segment.zone, distance_m = segment.distance_m, error = %e, "Dropping segment");
                None
            }
        }
    }
}

/// Calculated segments in workout order, block contents inlined once
pub fn flatten(items: &[CalculatedItem]) -> Vec<&CalculatedSegment> {
    let mut flattened = Vec::new();
    for item in items {
        match item {
            CalculatedItem::Segment(segment) => flattened.push(segment),
            CalculatedItem::Block { segments, .. } => flattened.extend(segments.iter()),
        }
    }
    flattened
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RepeatBlock;
    use crate::zones::IntensityZone;
    use rust_decimal_macros::dec;

    fn segment(reps: u32, distance_m: f64, zone: IntensityZone, rest_seconds: f64) -> WorkoutSegment {
        WorkoutSegment::new(reps, distance_m, zone, rest_seconds)
    }

    fn block_of_400s(multiplier: u32) -> StructuredWorkout {
        StructuredWorkout::new(vec![WorkoutItem::Block(RepeatBlock {
            multiplier,
            segments: vec![segment(1, 400.0, IntensityZone::Interval, 60.0)],
        })])
    }

    #[test]
    fn test_block_multiplier_scales_totals_not_pace() {
        let tripled = WorkoutAggregator::aggregate(50.0, &block_of_400s(3));
        let single = WorkoutAggregator::aggregate(50.0, &block_of_400s(1));

        let tripled_segments = flatten(&tripled.items);
        let single_segments = flatten(&single.items);
        assert_eq!(tripled_segments[0].effective_reps, 3);
        assert_eq!(tripled_segments[0].target_pace, single_segments[0].target_pace);
        assert_eq!(tripled_segments[0].lap_pace, tripled_segments[0].target_pace);

        assert_eq!(tripled.summary.total_distance_m, 1200.0);
        assert_eq!(tripled.summary.distance_km, dec!(1.20));
        assert_eq!(tripled.summary.distance, "1.20 km");
        assert!(
            (tripled.summary.active_seconds - 3.0 * single.summary.active_seconds).abs() < 1e-9
        );
        assert_eq!(tripled.summary.tss, 9);
    }

    #[test]
    fn test_tss_breakdown_matches_summary() {
        let workout = StructuredWorkout::new(vec![
            WorkoutItem::Segment(segment(1, 3000.0, IntensityZone::Easy, 60.0)),
            WorkoutItem::Block(RepeatBlock {
                multiplier: 2,
                segments: vec![segment(5, 400.0, IntensityZone::Interval, 60.0)],
            }),
        ]);

        let result = WorkoutAggregator::aggregate(50.0, &workout);

        assert_eq!(result.tss.segments.len(), 2);
        assert_eq!(result.tss.segments[1].effective_reps, 10);
        let sum: f64 = result.tss.segments.iter().map(|s| s.tss).sum();
        assert!((sum - result.tss.raw_tss).abs() < 1e-9);
        assert_eq!(result.summary.tss, result.tss.raw_tss.round_ties_even() as u32);
        assert!(result.tss.threshold_velocity_mps > 0.0);
        assert!(result.tss.segments[0].intensity_factor < 1.0);
        assert!(result.tss.segments[1].intensity_factor > 1.0);
    }

    #[test]
    fn test_rest_accounting() {
        let workout = StructuredWorkout::new(vec![
            WorkoutItem::Segment(segment(4, 400.0, IntensityZone::Interval, 60.0)),
            WorkoutItem::Segment(segment(1, 1000.0, IntensityZone::Threshold, 0.0)),
        ]);

        let result = WorkoutAggregator::aggregate(50.0, &workout);

        // 3 x 60 within the first segment, 60 before the second, none after the last
        assert_eq!(result.summary.rest_seconds, 240.0);
        assert!(
            (result.summary.total_seconds - (result.summary.active_seconds + 240.0)).abs() < 1e-9
        );
    }

    #[test]
    fn test_rest_inside_block_uses_unmultiplied_reps() {
        let workout = StructuredWorkout::new(vec![WorkoutItem::Block(RepeatBlock {
            multiplier: 4,
            segments: vec![
                segment(3, 200.0, IntensityZone::Repetition, 45.0),
                segment(1, 400.0, IntensityZone::Easy, 90.0),
            ],
        })]);

        let result = WorkoutAggregator::aggregate(50.0, &workout);

        // (3 - 1) x 45 + 45 between segments, the last segment adds nothing
        assert_eq!(result.summary.rest_seconds, 135.0);
        assert_eq!(result.summary.total_distance_m, 4.0 * (600.0 + 400.0));
    }

    #[test]
    fn test_active_time_uses_own_distance_pace() {
        let workout = StructuredWorkout::new(vec![WorkoutItem::Segment(segment(
            2,
            1000.0,
            IntensityZone::Interval,
            120.0,
        ))]);

        let result = WorkoutAggregator::aggregate(50.0, &workout);
        let calculated = flatten(&result.items)[0];

        assert_eq!(calculated.target_pace.to_string(), "3:50.09");
        assert!((result.summary.active_seconds - 2.0 * 230.09).abs() < 1e-9);
        assert_eq!(result.summary.active_time, "07:40");
        assert_eq!(result.summary.total_time, "09:40");
    }

    #[test]
    fn test_zero_fitness_is_empty_not_error() {
        let workout = block_of_400s(3);
        for vdot in [0.0, -12.5] {
            let result = WorkoutAggregator::aggregate(vdot, &workout);
            assert!(result.items.is_empty());
            assert_eq!(result.summary, WorkoutSummary::empty());
            assert_eq!(result.tss, TssResult::zero());
            assert_eq!(result.summary.tss, 0);
            assert_eq!(result.summary.active_time, "00:00");
        }
    }

    #[test]
    fn test_order_is_preserved() {
        let workout = StructuredWorkout::new(vec![
            WorkoutItem::Segment(segment(1, 2000.0, IntensityZone::Easy, 0.0)),
            WorkoutItem::Block(RepeatBlock {
                multiplier: 2,
                segments: vec![segment(4, 400.0, IntensityZone::Interval, 60.0)],
            }),
            WorkoutItem::Segment(segment(1, 2000.0, IntensityZone::Easy, 0.0)),
        ]);

        let result = WorkoutAggregator::aggregate(55.0, &workout);

        assert_eq!(result.items.len(), 3);
        assert!(matches!(result.items[0], CalculatedItem::Segment(_)));
        assert!(matches!(result.items[1], CalculatedItem::Block { multiplier: 2, .. }));
        let zones: Vec<IntensityZone> = flatten(&result.items).iter().map(|s| s.zone).collect();
        assert_eq!(
            zones,
            vec![IntensityZone::Easy, IntensityZone::Interval, IntensityZone::Easy]
        );
        assert_eq!(result.summary.total_distance_m, 2000.0 + 3200.0 + 2000.0);
    }

    #[test]
    fn test_harder_zones_are_faster() {
        let workout = StructuredWorkout::new(
            IntensityZone::ALL
                .iter()
                .map(|&zone| WorkoutItem::Segment(segment(1, 1000.0, zone, 0.0)))
                .collect(),
        );

        let result = WorkoutAggregator::aggregate(48.0, &workout);
        let seconds: Vec<f64> = flatten(&result.items)
            .iter()
            .map(|s| s.target_pace.total_seconds())
            .collect();

        assert_eq!(seconds.len(), 5);
        for pair in seconds.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }
}
