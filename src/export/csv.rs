use ::csv::Writer;

use super::ExportError;
use crate::models::{CalculatedItem, CalculatedSegment};
use crate::planner::PlanResponse;
use crate::report::{PaceCalculation, VdotReport};
use crate::zones::IntensityZone;

fn finish(writer: Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::SerializationError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::SerializationError(e.to_string()))
}

fn segment_record(
    group: &str,
    vdot: f64,
    multiplier: u32,
    segment: &CalculatedSegment,
) -> Vec<String> {
    vec![
        group.to_string(),
        format!("{:.2}", vdot),
        multiplier.to_string(),
        segment.reps.to_string(),
        segment.effective_reps.to_string(),
        segment.distance_m.to_string(),
        segment.zone.to_string(),
        segment.rest_seconds.to_string(),
        segment.target_pace.to_string(),
        segment.lap_pace.to_string(),
        segment.pace_per_km.to_string(),
    ]
}

/// One row per calculated segment per group; bare segments have multiplier 1
pub fn render_plans(response: &PlanResponse) -> Result<String, ExportError> {
    let mut writer = Writer::from_writer(Vec::new());

    writer.write_record([
        "group",
        "vdot",
        "multiplier",
        "reps",
        "effective_reps",
        "distance_m",
        "zone",
        "rest_seconds",
        "target_pace",
        "lap_pace",
        "pace_per_km",
    ])?;

    for plan in &response.groups {
        for item in &plan.workout {
            match item {
                CalculatedItem::Segment(segment) => {
                    writer.write_record(segment_record(&plan.name, plan.vdot, 1, segment))?;
                }
                CalculatedItem::Block {
                    multiplier,
                    segments,
                } => {
                    for segment in segments {
                        writer.write_record(segment_record(&plan.name, plan.vdot, *multiplier, segment))?;
                    }
                }
            }
        }
    }

    writer.flush()?;
    finish(writer)
}

/// Report as `section,name,value` rows
pub fn render_report(report: &VdotReport) -> Result<String, ExportError> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(["section", "name", "value"])?;
    writer.write_record(["vdot", "score", format!("{:.2}", report.vdot_score).as_str()])?;

    for time in &report.equivalent_times {
        writer.write_record(["equivalent_time", time.name.as_str(), time.formatted.as_str()])?;
    }
    for target in &report.pace_targets {
        writer.write_record(["pace", target.zone.name(), target.display().as_str()])?;
    }
    for interval in &report.target_interval_times {
        writer.write_record(["interval", interval.name.as_str(), interval.display().as_str()])?;
    }

    writer.flush()?;
    finish(writer)
}

pub fn render_pace(pace: &PaceCalculation) -> Result<String, ExportError> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(["vdot", "zone", "distance_m", "target_pace", "pace_per_km"])?;
    writer.write_record([
        pace.vdot_score.to_string(),
        pace.intensity_zone.to_string(),
        pace.target_distance_m.to_string(),
        pace.calculated_pace.target_pace.to_string(),
        pace.calculated_pace.pace_per_km.to_string(),
    ])?;
    writer.flush()?;
    finish(writer)
}

pub fn render_zones() -> Result<String, ExportError> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(["zone", "min", "max"])?;
    for zone in IntensityZone::ALL {
        let range = zone.range();
        writer.write_record([zone.to_string(), range.min.to_string(), range.max.to_string()])?;
    }
    writer.flush()?;
    finish(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PerformanceInput;
    use crate::planner::{build_plans, PlanRequest, PlannerOptions};
    use crate::report::RaceDistance;

    #[test]
    fn test_plan_rows() {
        let request = PlanRequest::from_json_str(
            r#"{
                "workout": [
                    {"type": "segment", "reps": 1, "distance_m": 2000, "zone": "Easy"},
                    {"type": "block", "multiplier": 3, "segments": [
                        {"reps": 2, "distance_m": 300, "zone": "Repetition", "rest_seconds": 90}
                    ]}
                ],
                "groups": [
                    {"name": "A", "metric": "vdot", "value": 45},
                    {"name": "B", "metric": "vdot", "value": 60}
                ]
            }"#,
        )
        .unwrap();
        let response = build_plans(&request, &PlannerOptions::default()).unwrap();

        let output = render_plans(&response).unwrap();
        let mut reader = ::csv::Reader::from_reader(output.as_bytes());
        let records: Vec<::csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        assert_eq!(records.len(), 4);
        assert_eq!(&records[0][0], "A");
        assert_eq!(&records[0][2], "1");
        assert_eq!(&records[1][2], "3");
        assert_eq!(&records[1][4], "6");
        assert_eq!(&records[1][6], "Repetition");
        assert_eq!(&records[3][1], "60.00");
    }

    #[test]
    fn test_report_rows() {
        let report =
            VdotReport::calculate(&PerformanceInput::new(5000.0, 20.0), &RaceDistance::standard())
                .unwrap();
        let output = render_report(&report).unwrap();
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("section,name,value"));
        assert_eq!(lines.next(), Some("vdot,score,49.81"));
        assert!(output.contains("equivalent_time,Marathon,03:11:17"));
    }

    #[test]
    fn test_zone_rows() {
        let output = render_zones().unwrap();
        assert!(output.contains("Threshold,83,88"));
        assert_eq!(output.lines().count(), 6);
    }
}
