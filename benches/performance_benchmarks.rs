use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use paceplan::{
    build_plans, solve_time_for_score, FitnessInput, GroupInput, IntensityZone, PlanRequest,
    PlannerOptions, RaceDistance, RepeatBlock, StructuredWorkout, WorkoutAggregator, WorkoutItem,
    WorkoutSegment,
};

/// Performance benchmarks for the pace and planning engine
///
/// Plans are recomputed on every request, so these track how the solver,
/// the aggregator and the multi-group planner scale with input size.

fn create_workout(blocks: usize) -> StructuredWorkout {
    let mut items = vec![WorkoutItem::Segment(WorkoutSegment::new(
        1,
        2000.0,
        IntensityZone::Easy,
        60.0,
    ))];
    for i in 0..blocks {
        items.push(WorkoutItem::Block(RepeatBlock {
            multiplier: 2 + (i % 3) as u32,
            segments: vec![
                WorkoutSegment::new(4, 400.0, IntensityZone::Interval, 60.0),
                WorkoutSegment::new(2, 200.0, IntensityZone::Repetition, 90.0),
            ],
        }));
    }
    items.push(WorkoutItem::Segment(WorkoutSegment::new(
        1,
        1600.0,
        IntensityZone::Easy,
        0.0,
    )));
    StructuredWorkout::new(items)
}

fn create_request(groups: usize) -> PlanRequest {
    PlanRequest {
        workout: create_workout(4),
        groups: (0..groups)
            .map(|i| GroupInput {
                name: format!("Group {}", i + 1),
                fitness: if i % 2 == 0 {
                    FitnessInput::Vdot {
                        value: 35.0 + i as f64 * 0.5,
                    }
                } else {
                    FitnessInput::FiveKTime {
                        time: format!("{}:{:02}", 18 + i % 10, (i * 7) % 60),
                    }
                },
            })
            .collect(),
        skipped: Vec::new(),
    }
}

fn bench_time_solver(c: &mut Criterion) {
    let mut group = c.benchmark_group("Time Solver");

    for race in RaceDistance::standard() {
        group.bench_with_input(
            BenchmarkId::new("solve_time_for_score", &race.name),
            &race.distance_m,
            |b, &distance_m| {
                b.iter(|| solve_time_for_score(black_box(50.0), black_box(distance_m)));
            },
        );
    }

    group.finish();
}

fn bench_workout_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Workout Aggregation");

    for &blocks in &[1, 10, 100] {
        let workout = create_workout(blocks);

        group.throughput(Throughput::Elements(blocks as u64));
        group.bench_with_input(
            BenchmarkId::new("aggregate", blocks),
            &workout,
            |b, workout| {
                b.iter(|| WorkoutAggregator::aggregate(black_box(50.0), workout));
            },
        );
    }

    group.finish();
}

fn bench_plan_building(c: &mut Criterion) {
    let mut group = c.benchmark_group("Plan Building");

    for &groups in &[1, 10, 100] {
        let request = create_request(groups);
        group.throughput(Throughput::Elements(groups as u64));

        for parallel in [false, true] {
            let label = if parallel { "parallel" } else { "sequential" };
            group.bench_with_input(BenchmarkId::new(label, groups), &request, |b, request| {
                b.iter(|| build_plans(request, &PlannerOptions { parallel }));
            });
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_time_solver,
    bench_workout_aggregation,
    bench_plan_building
);
criterion_main!(benches);
