// Library interface for LiftRS modules
// Exposes the calculation core and storage collaborators to the CLI and to
// integration tests

pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod models;
pub mod plates;
pub mod records;
pub mod routine;
pub mod session;
pub mod storage;
pub mod units;

// Re-export commonly used types for convenience
pub use models::*;
pub use error::{LiftRsError, Result, RoutineError, StorageError};
pub use health::{HealthCalculator, HealthScoringConfig, HealthService};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use plates::{calculate_plates, PlateCalculation, PlateCalculator};
pub use records::{check_personal_record, get_workout_prs, PersonalRecord, PrType, SetPerformance};
pub use routine::progress_routine_day;
pub use session::complete_workout;
pub use storage::{
    Database, HealthMetricsCache, MemoryStore, RawHealthSource, RoutineStore, SessionLog,
};
pub use units::{convert_weight, round_weight};
