use paceplan::config::AppConfig;
use paceplan::export::{self, OutputFormat};
use paceplan::{
    build_plans, solve_time_for_score, CalculatedItem, FitnessInput, GroupInput, IntensityZone,
    PaceCalculation, PerformanceInput, PlanRequest, PlannerOptions, RaceDistance, VdotCalculator,
    VdotReport, WorkoutAggregator,
};
use rust_decimal_macros::dec;
use tempfile::TempDir;

/// Integration tests that exercise the complete calculator workflows

#[cfg(test)]
mod integration_tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn track_session_form() -> Vec<(String, String)> {
        form(&[
            ("reps", "1"),
            ("distance", "2000"),
            ("intensity", "Easy"),
            ("rest", "60"),
            ("block_multiplier", "2"),
            ("reps", "4"),
            ("distance", "400"),
            ("intensity", "Interval"),
            ("rest", "60"),
            ("block_end", ""),
            ("reps", "1"),
            ("distance", "1600"),
            ("intensity", "Easy"),
            ("rest", ""),
            ("group_1_name", "Varsity"),
            ("group_1_metric", "vdot"),
            ("group_1_value", "58"),
            ("group_2_name", "Club"),
            ("group_2_metric", "5k_time"),
            ("group_2_value", "20:00"),
            ("group_3_name", "Walk-ons"),
            ("group_3_metric", "hr_max"),
            ("group_3_value", "190"),
        ])
    }

    /// Form submission through to per-group plans
    #[test]
    fn test_form_to_plans_workflow() {
        let request = PlanRequest::from_form(&track_session_form()).unwrap();
        let response = build_plans(&request, &PlannerOptions::default()).unwrap();

        let names: Vec<&str> = response.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Varsity", "Club"]);
        assert_eq!(response.skipped.len(), 1);
        assert_eq!(response.skipped[0].name, "Walk-ons");

        let club = &response.groups[1];
        assert_eq!(club.vdot, 49.81);
        assert_eq!(club.workout.len(), 3);
        assert!(matches!(club.workout[1], CalculatedItem::Block { multiplier: 2, .. }));

        // 2000 + 2 x 4 x 400 + 1600
        assert_eq!(club.summary.total_distance_m, 6800.0);
        assert_eq!(club.summary.distance_km, dec!(6.80));

        // 60 after the warm-up, 3 x 60 inside the block, 60 before the cool-down
        assert_eq!(club.summary.rest_seconds, 300.0);

        // Same workout, fitter group: faster and therefore less time, same distance
        let varsity = &response.groups[0];
        assert_eq!(varsity.summary.total_distance_m, club.summary.total_distance_m);
        assert!(varsity.summary.active_seconds < club.summary.active_seconds);
    }

    /// A group given as a race time matches the same score given directly
    #[test]
    fn test_race_time_group_matches_direct_score() {
        let mut request = PlanRequest::from_form(&track_session_form()).unwrap();
        request.groups = vec![
            GroupInput {
                name: "From race".to_string(),
                fitness: FitnessInput::FiveKTime {
                    time: "20:00".to_string(),
                },
            },
            GroupInput {
                name: "Direct".to_string(),
                fitness: FitnessInput::Vdot { value: 49.81 },
            },
        ];

        let response = build_plans(&request, &PlannerOptions { parallel: false }).unwrap();
        assert_eq!(response.groups[0].workout, response.groups[1].workout);
        assert_eq!(response.groups[0].summary, response.groups[1].summary);
    }

    /// Plan request file rendered in every output format
    #[test]
    fn test_plan_file_renders_all_formats() {
        let request = PlanRequest::from_toml_str(
            r#"
            [[workout]]
            type = "segment"
            reps = 3
            distance_m = 1600.0
            zone = "Threshold"
            rest_seconds = 90.0

            [[groups]]
            name = "Masters"
            metric = "race_time"
            distance_m = 10000.0
            time = "45:00"
            "#,
        )
        .unwrap();
        let response = build_plans(&request, &PlannerOptions::default()).unwrap();

        let text = export::render_plans(&response, OutputFormat::Text).unwrap();
        assert!(text.contains("Masters"));
        assert!(text.contains("Distance: 4.80 km"));

        let json = export::render_plans(&response, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["groups"][0]["summary"]["rest_seconds"], 180.0);

        let csv = export::render_plans(&response, OutputFormat::Csv).unwrap();
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.lines().nth(1).unwrap().starts_with("Masters,"));
    }

    /// Report built from the configured race table
    #[test]
    fn test_report_uses_configured_distances() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.calculator.equivalent_distances = vec![
            RaceDistance::new("3k", 3000.0),
            RaceDistance::new("10 mile", 16093.44),
        ];
        config.save_to_file(&config_path).unwrap();

        let loaded = AppConfig::load_or_default(Some(&config_path)).unwrap();
        let report = VdotReport::calculate(
            &PerformanceInput::new(5000.0, 20.0),
            &loaded.calculator.equivalent_distances,
        )
        .unwrap();

        assert_eq!(report.equivalent_times.len(), 2);
        assert_eq!(report.equivalent_times[0].name, "3k");
        // Shorter races are run faster per meter
        let three_k = &report.equivalent_times[0];
        assert!(three_k.time_minutes / 3000.0 < 20.0 / 5000.0);
    }

    /// Score and solver agree across the standard race table
    #[test]
    fn test_score_solver_round_trip() {
        let vdot = VdotCalculator::estimate_fitness_score(10000.0, 42.0).unwrap();
        for race in RaceDistance::standard() {
            let minutes = solve_time_for_score(vdot, race.distance_m).unwrap();
            let back = VdotCalculator::estimate_fitness_score(race.distance_m, minutes).unwrap();
            assert!((back - vdot).abs() < 1e-6, "{}: {} vs {}", race.name, back, vdot);
        }
    }

    /// Single pace lookups follow the zone ordering
    #[test]
    fn test_pace_calculation_across_zones() {
        let mut previous = f64::MAX;
        for zone in IntensityZone::ALL {
            let pace = PaceCalculation::calculate(52.0, zone.name(), 1000.0).unwrap();
            let seconds = pace.calculated_pace.pace_per_km.total_seconds();
            assert!(seconds < previous, "{} not faster than the easier zone", zone);
            previous = seconds;
        }

        assert!(PaceCalculation::calculate(52.0, "easy", 1000.0).is_err());
    }

    /// No fitness basis yields an empty plan, not an error
    #[test]
    fn test_zero_score_workflow() {
        let request = PlanRequest::from_form(&track_session_form()).unwrap();
        let aggregated = WorkoutAggregator::aggregate(0.0, &request.workout);

        assert!(aggregated.items.is_empty());
        assert_eq!(aggregated.summary.tss, 0);
        assert_eq!(aggregated.summary.distance, "0.00 km");
        assert_eq!(aggregated.summary.total_time, "00:00");
    }
}
