use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::InputError;
use crate::zones::IntensityZone;

/// A completed or target race effort
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceInput {
    /// Race distance in meters
    pub distance_m: f64,
    /// Race time in minutes
    pub time_minutes: f64,
}

impl PerformanceInput {
    pub fn new(distance_m: f64, time_minutes: f64) -> Self {
        Self { distance_m, time_minutes }
    }
}

/// A duration shown as whole minutes plus seconds rounded to 2 decimals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaceTime {
    pub minutes: u32,
    pub seconds: f64,
}

impl PaceTime {
    /// Split decimal minutes into truncated minutes and rounded seconds.
    ///
    /// Seconds that round up to 60.00 carry into the minutes, so the seconds
    /// component always stays in `[0, 60)`.
    pub fn from_minutes(time_minutes: f64) -> Self {
        let mut minutes = time_minutes.trunc();
        let mut seconds = round_to(((time_minutes - minutes) * 60.0).max(0.0), 2);
        if seconds >= 60.0 {
            minutes += 1.0;
            seconds = 0.0;
        }
        Self {
            minutes: minutes as u32,
            seconds,
        }
    }

    pub fn total_seconds(&self) -> f64 {
        f64::from(self.minutes) * 60.0 + self.seconds
    }
}

impl fmt::Display for PaceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:05.2}", self.minutes, self.seconds)
    }
}

/// Paces derived from a fitness score at one intensity
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PaceResult {
    /// Time to cover the requested distance
    pub target_pace: PaceTime,
    /// Time per kilometer
    pub pace_per_km: PaceTime,
}

/// One homogeneous repeated effort, e.g. 6 x 400m at Interval pace with 90s rest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSegment {
    pub reps: u32,
    pub distance_m: f64,
    pub zone: IntensityZone,
    #[serde(default)]
    pub rest_seconds: f64,
}

impl WorkoutSegment {
    pub fn new(reps: u32, distance_m: f64, zone: IntensityZone, rest_seconds: f64) -> Self {
        Self {
            reps,
            distance_m,
            zone,
            rest_seconds,
        }
    }

    fn validate(&self) -> Result<(), InputError> {
        if self.reps == 0 {
            return Err(InputError::OutOfRange {
                field: "reps".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.distance_m.is_finite() || self.distance_m <= 0.0 {
            return Err(InputError::OutOfRange {
                field: "distance".to_string(),
                reason: format!("must be a positive number of meters, got {}", self.distance_m),
            });
        }
        if !self.rest_seconds.is_finite() || self.rest_seconds < 0.0 {
            return Err(InputError::OutOfRange {
                field: "rest".to_string(),
                reason: format!("must not be negative, got {}", self.rest_seconds),
            });
        }
        Ok(())
    }
}

/// A group of segments repeated as a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatBlock {
    pub multiplier: u32,
    pub segments: Vec<WorkoutSegment>,
}

/// One entry of a structured workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkoutItem {
    Segment(WorkoutSegment),
    Block(RepeatBlock),
}

/// A segment paired with its repetition count after block expansion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveSegment<'a> {
    pub segment: &'a WorkoutSegment,
    pub effective_reps: u32,
}

/// Ordered workout made of bare segments and repeat blocks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredWorkout {
    pub items: Vec<WorkoutItem>,
}

impl StructuredWorkout {
    pub fn new(items: Vec<WorkoutItem>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Every segment in order, block contents inlined once with the block
    /// multiplier folded into the repetition count
    pub fn effective_segments(&self) -> Vec<EffectiveSegment<'_>> {
        let mut flattened = Vec::new();
        for item in &self.items {
            match item {
                WorkoutItem::Segment(segment) => flattened.push(EffectiveSegment {
                    segment,
                    effective_reps: segment.reps,
                }),
                WorkoutItem::Block(block) => {
                    for segment in &block.segments {
                        flattened.push(EffectiveSegment {
                            segment,
                            effective_reps: segment.reps.saturating_mul(block.multiplier),
                        });
                    }
                }
            }
        }
        flattened
    }

    /// Check reps, distances, rests and multipliers
    pub fn validate(&self) -> Result<(), InputError> {
        for item in &self.items {
            match item {
                WorkoutItem::Segment(segment) => segment.validate()?,
                WorkoutItem::Block(block) => {
                    if block.multiplier == 0 {
                        return Err(InputError::OutOfRange {
                            field: "block_multiplier".to_string(),
                            reason: "must be at least 1".to_string(),
                        });
                    }
                    if block.segments.is_empty() {
                        return Err(InputError::Structure(
                            "repeat block has no segments".to_string(),
                        ));
                    }
                    for segment in &block.segments {
                        segment.validate()?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// A workout segment with the paces prescribed for one fitness score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculatedSegment {
    pub reps: u32,
    pub effective_reps: u32,
    pub distance_m: f64,
    pub zone: IntensityZone,
    pub rest_seconds: f64,
    /// Time for one repetition of this segment's distance
    pub target_pace: PaceTime,
    /// Time per 400m lap at the same intensity
    pub lap_pace: PaceTime,
    pub pace_per_km: PaceTime,
}

/// Calculated counterpart of [`WorkoutItem`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalculatedItem {
    Segment(CalculatedSegment),
    Block {
        multiplier: u32,
        segments: Vec<CalculatedSegment>,
    },
}

/// Totals for a calculated workout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutSummary {
    pub total_distance_m: f64,
    pub distance_km: Decimal,
    pub active_seconds: f64,
    pub rest_seconds: f64,
    pub total_seconds: f64,
    /// Distance formatted as "X.XX km"
    pub distance: String,
    /// Active time as MM:SS
    pub active_time: String,
    /// Active plus rest time as MM:SS
    pub total_time: String,
    pub tss: u32,
}

impl WorkoutSummary {
    pub fn new(total_distance_m: f64, active_seconds: f64, rest_seconds: f64, tss: u32) -> Self {
        let total_seconds = active_seconds + rest_seconds;
        let distance_km = (Decimal::from_f64(total_distance_m).unwrap_or_default()
            / Decimal::from(1000))
        .round_dp(2);

        Self {
            total_distance_m,
            distance_km,
            active_seconds,
            rest_seconds,
            total_seconds,
            distance: format!("{:.2} km", distance_km),
            active_time: format_clock(active_seconds),
            total_time: format_clock(total_seconds),
            tss,
        }
    }

    pub fn empty() -> Self {
        Self::new(0.0, 0.0, 0.0, 0)
    }
}

/// Plan for one named training group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupPlan {
    pub name: String,
    pub vdot: f64,
    pub workout: Vec<CalculatedItem>,
    pub summary: WorkoutSummary,
}

/// Format seconds as MM:SS; minutes are not wrapped into hours
pub fn format_clock(seconds: f64) -> String {
    let whole = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", whole / 60, whole % 60)
}

/// Format decimal minutes as MM:SS, or HH:MM:SS from one hour up
pub fn format_race_time(time_minutes: f64) -> String {
    let total_seconds = (time_minutes * 60.0).max(0.0) as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Round half away from zero to `places` decimals
pub(crate) fn round_to(value: f64, places: u32) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}
