//! Error classification as seen by callers of the public API

use liftrs::error::{ErrorSeverity, LiftRsError, RoutineError, StorageError};
use liftrs::models::WeightUnit;
use liftrs::plates::calculate_plates;
use liftrs::routine::{parse_generated_day, parse_generated_routine, progress_routine_day};
use liftrs::storage::{Database, MemoryStore, RoutineStore};

#[test]
fn test_malformed_generated_routine_is_parse_failure() {
    let text = "```json\n{\"routineName\": \"PPL\", \"days\": [\n```";
    let err: LiftRsError = parse_generated_routine(text).unwrap_err().into();

    assert!(matches!(err, LiftRsError::Routine(RoutineError::Parse { .. })));
    assert!(err.is_retryable());
    assert_eq!(err.severity(), ErrorSeverity::Warning);
    assert_eq!(err.user_message(), "Failed to parse the generated routine. Please try again.");
}

#[test]
fn test_missing_fields_are_parse_failures() {
    let text = r#"{"dayName": "Legs", "exercises": [{"name": "Squat"}]}"#;
    let err = parse_generated_day(text).unwrap_err();
    match err {
        RoutineError::Parse { reason } => assert!(reason.contains("sets")),
        other => panic!("expected parse failure, got {:?}", other),
    }
}

#[test]
fn test_invalid_routine_message_is_shown_verbatim() {
    let text = r#"{"routineName": "Rest", "days": [{"dayName": "Off", "exercises": []}]}"#;
    let generated = parse_generated_routine(text).unwrap();
    let err: LiftRsError = generated.into_routine().unwrap_err().into();

    assert!(!err.is_retryable());
    assert_eq!(err.user_message(), "Each day must have at least one exercise");
}

#[test]
fn test_unknown_routine_in_each_store() {
    let memory = MemoryStore::new();
    let db = Database::in_memory().unwrap();
    let stores: [&dyn RoutineStore; 2] = [&memory, &db];

    for store in stores {
        let err = progress_routine_day(store, "r-404").unwrap_err();
        assert!(matches!(err, LiftRsError::Storage(StorageError::NotFound { .. })));
        assert_eq!(err.user_message(), "Could not find routine 'r-404'");
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::WARN);
    }
}

#[test]
fn test_plate_failures_are_results_not_errors() {
    let below_bar = calculate_plates(10.0, WeightUnit::Lbs);
    assert!(!below_bar.is_valid);
    assert_eq!(
        below_bar.error_message.as_deref(),
        Some("Weight must be at least 45lbs (barbell weight)")
    );

    let unmatched = calculate_plates(46.0, WeightUnit::Lbs);
    assert!(!unmatched.is_valid);
    assert_eq!(
        unmatched.error_message.as_deref(),
        Some("Cannot load exactly 46lbs. Closest: 45lbs")
    );
}
