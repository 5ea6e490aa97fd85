//! Multi-group session planner
//!
//! Parses a shared workout skeleton and per-group fitness inputs, either from
//! a serialized plan request or from raw form fields, and produces one
//! [`GroupPlan`] per group. Groups are independent: a group with unusable
//! input is reported in [`PlanResponse::skipped`] without affecting the rest.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::error::{InputError, PlanError, Result};
use crate::models::{round_to, GroupPlan, RepeatBlock, StructuredWorkout, WorkoutItem, WorkoutSegment};
use crate::vdot::VdotCalculator;
use crate::workout::WorkoutAggregator;
use crate::zones::IntensityZone;

/// Distance of the race behind the `5k_time` metric
const FIVE_K_METERS: f64 = 5000.0;

/// How a group's VDOT is obtained
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric", rename_all = "snake_case")]
pub enum FitnessInput {
    /// VDOT supplied directly
    Vdot { value: f64 },
    /// A 5K race time, MM:SS or HH:MM:SS
    #[serde(rename = "5k_time")]
    FiveKTime { time: String },
    /// A race time over any distance
    RaceTime { distance_m: f64, time: String },
}

impl FitnessInput {
    /// Resolve to a VDOT score; race-derived scores are rounded to 2 decimals
    pub fn resolve_vdot(&self) -> Result<f64> {
        match self {
            FitnessInput::Vdot { value } => {
                if !value.is_finite() {
                    return Err(InputError::OutOfRange {
                        field: "vdot".to_string(),
                        reason: format!("must be a finite number, got {}", value),
                    }
                    .into());
                }
                Ok(*value)
            }
            FitnessInput::FiveKTime { time } => Self::vdot_from_race(FIVE_K_METERS, time),
            FitnessInput::RaceTime { distance_m, time } => Self::vdot_from_race(*distance_m, time),
        }
    }

    fn vdot_from_race(distance_m: f64, time: &str) -> Result<f64> {
        let minutes = parse_time_string(time)?;
        let vdot = VdotCalculator::estimate_fitness_score(distance_m, minutes)?;
        Ok(round_to(vdot, 2))
    }
}

/// A named training group and its fitness input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupInput {
    pub name: String,
    #[serde(flatten)]
    pub fitness: FitnessInput,
}

/// A group left out of the response and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedGroup {
    pub name: String,
    pub reason: String,
}

/// One workout shared by several groups
///
/// Deserializing reads each group on its own, so a group with an unknown
/// metric or a malformed value lands in `skipped` instead of failing the
/// whole request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPlanRequest")]
pub struct PlanRequest {
    pub workout: StructuredWorkout,
    #[serde(default)]
    pub groups: Vec<GroupInput>,
    /// Groups already rejected while parsing
    #[serde(skip)]
    pub skipped: Vec<SkippedGroup>,
}

#[derive(Deserialize)]
struct RawPlanRequest {
    workout: StructuredWorkout,
    #[serde(default)]
    groups: Vec<serde_json::Value>,
}

impl From<RawPlanRequest> for PlanRequest {
    fn from(raw: RawPlanRequest) -> Self {
        let mut groups = Vec::with_capacity(raw.groups.len());
        let mut skipped = Vec::new();

        for (index, value) in raw.groups.into_iter().enumerate() {
            let name = value
                .get("name")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("group {}", index + 1));

            match serde_json::from_value::<GroupInput>(value) {
                Ok(group) => groups.push(group),
                Err(e) => {
                    warn!(group = %name, error = %e, "Skipping group with invalid input");
                    skipped.push(SkippedGroup {
                        name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Self {
            workout: raw.workout,
            groups,
            skipped,
        }
    }
}

/// Planner behavior switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerOptions {
    /// Evaluate groups on the rayon pool
    pub parallel: bool,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Calculated plans for every usable group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanResponse {
    pub groups: Vec<GroupPlan>,
    pub skipped: Vec<SkippedGroup>,
}

/// Convert `MM:SS` or `HH:MM:SS` to decimal minutes
pub fn parse_time_string(value: &str) -> std::result::Result<f64, InputError> {
    let invalid = || InputError::InvalidTime(value.to_string());

    let parts: Vec<&str> = value.trim().split(':').map(str::trim).collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => (0u32, *m, *s),
        [h, m, s] => (h.parse::<u32>().map_err(|_| invalid())?, *m, *s),
        _ => return Err(invalid()),
    };

    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    let seconds: f64 = seconds.parse().map_err(|_| invalid())?;
    if !(0.0..60.0).contains(&seconds) || (parts.len() == 3 && minutes >= 60) {
        return Err(invalid());
    }

    Ok(f64::from(hours) * 60.0 + f64::from(minutes) + seconds / 60.0)
}

impl PlanRequest {
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| PlanError::Serialization(e.to_string()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PlanError::Serialization(e.to_string()))
    }

    /// Build a request from multi-valued form fields in submission order.
    ///
    /// Workout rows use the `reps`, `distance`, `intensity` and `rest` fields;
    /// a row ends when one of its fields repeats or a block marker appears.
    /// `block_multiplier=N` opens a repeat block and `block_end` closes it.
    /// Groups use `group_<id>_name`, `group_<id>_metric`, `group_<id>_value`
    /// and optionally `group_<id>_distance`.
    pub fn from_form(fields: &[(String, String)]) -> Result<Self> {
        let mut builder = FormWorkoutBuilder::default();
        for (key, value) in fields {
            builder.field(key, value)?;
        }
        let workout = builder.finish()?;

        let (groups, skipped) = parse_form_groups(fields);

        Ok(Self {
            workout,
            groups,
            skipped,
        })
    }
}

#[derive(Debug, Default)]
struct FormRow {
    reps: Option<String>,
    distance: Option<String>,
    intensity: Option<String>,
    rest: Option<String>,
}

impl FormRow {
    fn slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            "reps" => Some(&mut self.reps),
            "distance" => Some(&mut self.distance),
            "intensity" => Some(&mut self.intensity),
            "rest" => Some(&mut self.rest),
            _ => None,
        }
    }

    /// Rows without reps or distance are blank form rows and yield nothing
    fn into_segment(self) -> Result<Option<WorkoutSegment>> {
        let reps = non_blank(self.reps.as_deref());
        let distance = non_blank(self.distance.as_deref());
        let (Some(reps), Some(distance)) = (reps, distance) else {
            return Ok(None);
        };

        let reps: u32 = parse_number("reps", reps)?;
        let distance_m: f64 = parse_number("distance", distance)?;
        let zone: IntensityZone = self.intensity.as_deref().unwrap_or_default().trim().parse()?;
        let rest_seconds: f64 = match non_blank(self.rest.as_deref()) {
            Some(rest) => parse_number("rest", rest)?,
            None => 0.0,
        };

        Ok(Some(WorkoutSegment::new(reps, distance_m, zone, rest_seconds)))
    }
}

#[derive(Debug, Default)]
struct FormWorkoutBuilder {
    items: Vec<WorkoutItem>,
    open_block: Option<RepeatBlock>,
    row: Option<FormRow>,
}

impl FormWorkoutBuilder {
    fn field(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "block_multiplier" => {
                self.flush_row()?;
                if self.open_block.is_some() {
                    return Err(InputError::Structure("nested repeat blocks are not supported".to_string()).into());
                }
                let multiplier: u32 = parse_number("block_multiplier", value.trim())?;
                self.open_block = Some(RepeatBlock {
                    multiplier,
                    segments: Vec::new(),
                });
            }
            "block_end" => {
                self.flush_row()?;
                if self.open_block.is_none() {
                    return Err(InputError::Structure("block_end without an open block".to_string()).into());
                }
                self.close_block();
            }
            "reps" | "distance" | "intensity" | "rest" => {
                let repeated = self
                    .row
                    .as_mut()
                    .and_then(|row| row.slot(key))
                    .is_some_and(|slot| slot.is_some());
                if repeated {
                    self.flush_row()?;
                }
                let row = self.row.get_or_insert_with(FormRow::default);
                if let Some(slot) = row.slot(key) {
                    *slot = Some(value.to_string());
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn flush_row(&mut self) -> Result<()> {
        let Some(row) = self.row.take() else {
            return Ok(());
        };
        if let Some(segment) = row.into_segment()? {
            match self.open_block.as_mut() {
                Some(block) => block.segments.push(segment),
                None => self.items.push(WorkoutItem::Segment(segment)),
            }
        }
        Ok(())
    }

    fn close_block(&mut self) {
        if let Some(block) = self.open_block.take() {
            if block.segments.is_empty() {
                debug!(multiplier = block.multiplier, "Dropping empty repeat block");
            } else {
                self.items.push(WorkoutItem::Block(block));
            }
        }
    }

    fn finish(mut self) -> Result<StructuredWorkout> {
        self.flush_row()?;
        self.close_block();
        Ok(StructuredWorkout::new(self.items))
    }
}

#[derive(Debug, Default)]
struct FormGroup {
    name: Option<String>,
    metric: Option<String>,
    value: Option<String>,
    distance: Option<String>,
}

fn parse_form_groups(fields: &[(String, String)]) -> (Vec<GroupInput>, Vec<SkippedGroup>) {
    let mut collected: Vec<(String, FormGroup)> = Vec::new();

    for (key, value) in fields {
        let Some((id, field)) = key.strip_prefix("group_").and_then(|rest| rest.rsplit_once('_'))
        else {
            continue;
        };
        let index = match collected.iter().position(|(existing, _)| existing == id) {
            Some(index) => index,
            None => {
                collected.push((id.to_string(), FormGroup::default()));
                collected.len() - 1
            }
        };
        let group = &mut collected[index].1;
        let slot = match field {
            "name" => &mut group.name,
            "metric" => &mut group.metric,
            "value" => &mut group.value,
            "distance" => &mut group.distance,
            _ => continue,
        };
        *slot = Some(value.to_string());
    }

    let mut groups = Vec::new();
    let mut skipped = Vec::new();

    for (id, group) in collected {
        let (Some(name), Some(value)) = (
            non_blank(group.name.as_deref()),
            non_blank(group.value.as_deref()),
        ) else {
            debug!(group = %id, "Ignoring group without name or value");
            continue;
        };

        let fitness = match non_blank(group.metric.as_deref()) {
            Some("vdot") => parse_number::<f64>("vdot", value).map(|value| FitnessInput::Vdot { value }),
            Some("5k_time") => Ok(FitnessInput::FiveKTime {
                time: value.to_string(),
            }),
            Some("race_time") => non_blank(group.distance.as_deref())
                .ok_or_else(|| {
                    PlanError::from(InputError::OutOfRange {
                        field: "distance".to_string(),
                        reason: "race_time needs a distance".to_string(),
                    })
                })
                .and_then(|distance| parse_number::<f64>("distance", distance))
                .map(|distance_m| FitnessInput::RaceTime {
                    distance_m,
                    time: value.to_string(),
                }),
            other => Err(PlanError::from(InputError::OutOfRange {
                field: "metric".to_string(),
                reason: format!("unsupported metric {:?}", other.unwrap_or("")),
            })),
        };

        match fitness {
            Ok(fitness) => groups.push(GroupInput {
                name: name.to_string(),
                fitness,
            }),
            Err(e) => {
                warn!(group = %name, error = %e, "Skipping group with invalid input");
                skipped.push(SkippedGroup {
                    name: name.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    (groups, skipped)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| {
        InputError::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        }
        .into()
    })
}

/// Calculate a plan for every group of `request`.
///
/// A malformed workout rejects the whole request since all groups share it;
/// per-group problems only skip that group.
pub fn build_plans(request: &PlanRequest, options: &PlannerOptions) -> Result<PlanResponse> {
    request.workout.validate()?;

    info!(
        groups = request.groups.len(),
        items = request.workout.items.len(),
        parallel = options.parallel,
        "Building differentiated plan"
    );

    let outcomes: Vec<std::result::Result<GroupPlan, SkippedGroup>> = if options.parallel {
        request
            .groups
            .par_iter()
            .map(|group| build_group(group, &request.workout))
            .collect()
    } else {
        request
            .groups
            .iter()
            .map(|group| build_group(group, &request.workout))
            .collect()
    };

    let mut groups = Vec::with_capacity(outcomes.len());
    let mut skipped = request.skipped.clone();
    for outcome in outcomes {
        match outcome {
            Ok(plan) => groups.push(plan),
            Err(skip) => {
                warn!(group = %skip.name, reason = %skip.reason, "Skipping group");
                skipped.push(skip);
            }
        }
    }

    Ok(PlanResponse { groups, skipped })
}

fn build_group(group: &GroupInput, workout: &StructuredWorkout) -> std::result::Result<GroupPlan, SkippedGroup> {
    let _span = info_span!("group", name = %group.name).entered();

    let vdot = group.fitness.resolve_vdot().map_err(|e| SkippedGroup {
        name: group.name.clone(),
        reason: e.to_string(),
    })?;

    let aggregated = WorkoutAggregator::aggregate(vdot, workout);
    info!(vdot, tss = aggregated.summary.tss, "Calculated group plan");

    Ok(GroupPlan {
        name: group.name.clone(),
        vdot: round_to(vdot, 2),
        workout: aggregated.items,
        summary: aggregated.summary,
    })
}
