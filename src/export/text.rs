use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{format_race_time, CalculatedItem, CalculatedSegment, GroupPlan};
use crate::planner::PlanResponse;
use crate::report::{PaceCalculation, VdotReport};
use crate::zones::{IntensityZone, COMMON_INTERVALS};

#[derive(Tabled)]
struct SegmentRow {
    #[tabled(rename = "Block")]
    block: String,
    #[tabled(rename = "Reps")]
    reps: u32,
    #[tabled(rename = "Distance")]
    distance: String,
    #[tabled(rename = "Zone")]
    zone: IntensityZone,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Lap (400m)")]
    lap: String,
    #[tabled(rename = "Per km")]
    per_km: String,
    #[tabled(rename = "Rest")]
    rest: String,
}

impl SegmentRow {
    fn new(segment: &CalculatedSegment, block: String) -> Self {
        Self {
            block,
            reps: segment.reps,
            distance: format!("{}m", segment.distance_m),
            zone: segment.zone,
            target: segment.target_pace.to_string(),
            lap: segment.lap_pace.to_string(),
            per_km: segment.pace_per_km.to_string(),
            rest: format!("{}s", segment.rest_seconds),
        }
    }
}

#[derive(Tabled)]
struct EquivalentRow {
    #[tabled(rename = "Race")]
    race: String,
    #[tabled(rename = "Time")]
    time: String,
}

#[derive(Tabled)]
struct PaceRow {
    #[tabled(rename = "Zone")]
    zone: IntensityZone,
    #[tabled(rename = "Pace")]
    pace: String,
}

#[derive(Tabled)]
struct IntervalRow {
    #[tabled(rename = "Interval")]
    name: String,
    #[tabled(rename = "Target")]
    target: String,
}

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "Zone")]
    zone: IntensityZone,
    #[tabled(rename = "Min %")]
    min: String,
    #[tabled(rename = "Max %")]
    max: String,
}

fn heading(out: &mut String, title: &str) {
    out.push_str(title);
    out.push('\n');
    out.push_str(&"-".repeat(title.len()));
    out.push('\n');
}

fn table<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::modern());
    table.to_string()
}

fn render_group(out: &mut String, plan: &GroupPlan) {
    heading(out, &format!("{} (VDOT {:.2})", plan.name, plan.vdot));

    if plan.workout.is_empty() {
        out.push_str("No workout for this fitness level\n\n");
        return;
    }

    let mut rows = Vec::new();
    for item in &plan.workout {
        match item {
            CalculatedItem::Segment(segment) => rows.push(SegmentRow::new(segment, String::new())),
            CalculatedItem::Block {
                multiplier,
                segments,
            } => {
                for segment in segments {
                    rows.push(SegmentRow::new(segment, format!("{}x", multiplier)));
                }
            }
        }
    }
    out.push_str(&table(rows));
    out.push('\n');

    let summary = &plan.summary;
    out.push_str(&format!(
        "Distance: {}  Active: {}  Total: {}  TSS: {}\n\n",
        summary.distance, summary.active_time, summary.total_time, summary.tss
    ));
}

/// Plain text tables, one per group
pub fn render_plans(response: &PlanResponse) -> String {
    let mut out = String::new();

    for plan in &response.groups {
        render_group(&mut out, plan);
    }

    if !response.skipped.is_empty() {
        heading(&mut out, "Skipped groups");
        for skipped in &response.skipped {
            out.push_str(&format!("• {}: {}\n", skipped.name, skipped.reason));
        }
    }

    out
}

pub fn render_report(report: &VdotReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("VDOT: {:.2}\n\n", report.vdot_score));

    heading(&mut out, "Equivalent race times");
    let rows: Vec<EquivalentRow> = report
        .equivalent_times
        .iter()
        .map(|t| EquivalentRow {
            race: t.name.clone(),
            time: format_race_time(t.time_minutes),
        })
        .collect();
    out.push_str(&table(rows));
    out.push_str("\n\n");

    heading(&mut out, "Training paces");
    let rows: Vec<PaceRow> = report
        .pace_targets
        .iter()
        .map(|p| PaceRow {
            zone: p.zone,
            pace: p.display(),
        })
        .collect();
    out.push_str(&table(rows));
    out.push_str("\n\n");

    heading(&mut out, "Interval targets");
    let rows: Vec<IntervalRow> = report
        .target_interval_times
        .iter()
        .map(|i| IntervalRow {
            name: i.name.clone(),
            target: i.display(),
        })
        .collect();
    out.push_str(&table(rows));
    out.push('\n');

    out
}

pub fn render_pace(pace: &PaceCalculation) -> String {
    format!(
        "VDOT {:.2} at {} for {}m: {} ({} min/km)\n",
        pace.vdot_score,
        pace.intensity_zone,
        pace.target_distance_m,
        pace.calculated_pace.target_pace,
        pace.calculated_pace.pace_per_km
    )
}

pub fn render_zones() -> String {
    let mut out = String::new();

    heading(&mut out, "Intensity zones (% of VDOT)");
    let rows: Vec<ZoneRow> = IntensityZone::ALL
        .iter()
        .map(|&zone| ZoneRow {
            zone,
            min: format!("{:.0}", zone.range().min),
            max: format!("{:.0}", zone.range().max),
        })
        .collect();
    out.push_str(&table(rows));
    out.push_str("\n\n");

    heading(&mut out, "Common intervals");
    for preset in COMMON_INTERVALS {
        out.push_str(&format!("• {} ({}m, {})\n", preset.name, preset.distance_m, preset.zone));
    }

    out
}
