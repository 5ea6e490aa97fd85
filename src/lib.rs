// Library interface for the paceplan modules
// The binary and the integration tests both build on these

pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod planner;
pub mod report;
pub mod solver;
pub mod tss;
pub mod vdot;
pub mod workout;
pub mod zones;

// Re-export commonly used types for convenience
pub use models::*;
pub use error::{InputError, PaceError, PlanError, Result};
pub use export::OutputFormat;
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use planner::{build_plans, FitnessInput, GroupInput, PlanRequest, PlanResponse, PlannerOptions};
pub use report::{PaceCalculation, RaceDistance, VdotReport};
pub use solver::solve_time_for_score;
pub use tss::TssCalculator;
pub use vdot::VdotCalculator;
pub use workout::WorkoutAggregator;
pub use zones::{IntensityZone, ZoneCalculator};
