//! Personal record detection and per-exercise history
//!
//! A candidate set is compared against every eligible historical set of the
//! same exercise. Exercises are matched by case-insensitive name, so the same
//! lift logged under different routines forms one continuous history.
//!
//! Three independent record categories are tracked:
//! - **Heaviest weight**: more load than any previous set, regardless of reps
//! - **Most reps**: more reps than ever before at this exact load (the first
//!   set ever performed at a load counts)
//! - **Best volume**: higher weight × reps than any previous set

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::models::WorkoutSession;

/// Loads closer than this are considered the same weight
pub const WEIGHT_EPSILON: f64 = 0.01;

/// Personal record categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrType {
    MaxWeight,
    MaxReps,
    MaxVolume,
}

impl PrType {
    /// All categories in display order
    pub const ALL: [PrType; 3] = [PrType::MaxWeight, PrType::MaxReps, PrType::MaxVolume];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            PrType::MaxWeight => "Heaviest Weight",
            PrType::MaxReps => "Most Reps",
            PrType::MaxVolume => "Best Volume",
        }
    }
}

impl fmt::Display for PrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrType::MaxWeight => write!(f, "max_weight"),
            PrType::MaxReps => write!(f, "max_reps"),
            PrType::MaxVolume => write!(f, "max_volume"),
        }
    }
}

/// Weight × reps pair being evaluated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetPerformance {
    pub weight: f64,
    pub reps: u32,
}

impl SetPerformance {
    pub fn new(weight: f64, reps: u32) -> Self {
        SetPerformance { weight, reps }
    }

    pub fn volume(&self) -> f64 {
        self.weight * self.reps as f64
    }
}

/// Outcome of a personal record check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub is_pr: bool,

    /// Categories broken, in display order
    pub types: Vec<PrType>,
}

impl PersonalRecord {
    fn from_types(types: Vec<PrType>) -> Self {
        PersonalRecord {
            is_pr: !types.is_empty(),
            types,
        }
    }

    pub fn has(&self, pr_type: PrType) -> bool {
        self.types.contains(&pr_type)
    }
}

/// A record set within a finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPr {
    pub exercise_name: String,
    pub set_number: u32,
    pub pr_types: Vec<PrType>,
}

/// Collect every eligible historical (weight, reps) for an exercise
fn historical_sets(exercise_name: &str, workouts: &[WorkoutSession]) -> Vec<SetPerformance> {
    let wanted = exercise_name.to_lowercase();

    workouts
        .iter()
        .flat_map(|w| w.exercises.iter())
        .filter(|e| e.name.to_lowercase() == wanted)
        .flat_map(|e| e.eligible_sets())
        .filter_map(|s| s.performed())
        .map(|(weight, reps)| SetPerformance { weight, reps })
        .collect()
}

/// Determine which record categories `current` breaks for `exercise_name`
///
/// With no history at all the set is a record in every category.
pub fn check_personal_record(
    exercise_name: &str,
    current: SetPerformance,
    all_workouts: &[WorkoutSession],
) -> PersonalRecord {
    let history = historical_sets(exercise_name, all_workouts);

    if history.is_empty() {
        debug!(exercise = exercise_name, "No history, first set is a clean sweep");
        return PersonalRecord::from_types(PrType::ALL.to_vec());
    }

    let mut types = Vec::new();

    let max_weight = history
        .iter()
        .map(|s| s.weight)
        .fold(f64::NEG_INFINITY, f64::max);
    if current.weight > max_weight {
        types.push(PrType::MaxWeight);
    }

    let max_reps_at_weight = history
        .iter()
        .filter(|s| (s.weight - current.weight).abs() < WEIGHT_EPSILON)
        .map(|s| s.reps)
        .max();
    match max_reps_at_weight {
        Some(reps) if current.reps <= reps => {}
        _ => types.push(PrType::MaxReps),
    }

    let max_volume = history
        .iter()
        .map(|s| s.volume())
        .fold(f64::NEG_INFINITY, f64::max);
    if current.volume() > max_volume {
        types.push(PrType::MaxVolume);
    }

    debug!(
        exercise = exercise_name,
        weight = current.weight,
        reps = current.reps,
        history = history.len(),
        records = types.len(),
        "Personal record check"
    );

    PersonalRecord::from_types(types)
}

/// Every record set in `session`, compared against all other sessions
///
/// The session itself is excluded from the history so it cannot compete
/// with its own sets.
pub fn get_workout_prs(
    session: &WorkoutSession,
    all_workouts: &[WorkoutSession],
) -> Vec<WorkoutPr> {
    let history: Vec<WorkoutSession> = all_workouts
        .iter()
        .filter(|w| w.id != session.id)
        .cloned()
        .collect();

    let mut prs = Vec::new();

    for exercise in &session.exercises {
        for set in exercise.eligible_sets() {
            let Some((weight, reps)) = set.performed() else {
                continue;
            };

            let performance = SetPerformance::new(weight, reps);
            let record = check_personal_record(&exercise.name, performance, &history);
            if record.is_pr {
                prs.push(WorkoutPr {
                    exercise_name: exercise.name.clone(),
                    set_number: set.set_number,
                    pr_types: record.types,
                });
            }
        }
    }

    prs
}

/// Stable label for a set of record types, e.g. `"Heaviest Weight • Best Volume"`
pub fn get_pr_description(types: &[PrType]) -> String {
    PrType::ALL
        .iter()
        .filter(|t| types.contains(t))
        .map(|t| t.label())
        .collect::<Vec<_>>()
        .join(" • ")
}

/// One session's performance of a single exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSessionStats {
    pub date: NaiveDate,
    pub session_id: String,
    pub max_weight: f64,
    pub total_volume: f64,
    pub total_sets: u32,
    pub total_reps: u32,
}

/// Lifetime statistics for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseHistory {
    pub exercise_name: String,

    /// Per-session entries, oldest first
    pub sessions: Vec<ExerciseSessionStats>,

    pub total_volume: f64,
    pub max_weight_ever: f64,
    pub total_sets: u32,
}

impl ExerciseHistory {
    /// Build the history of `exercise_name`, optionally limited to one routine
    pub fn build(
        exercise_name: &str,
        workouts: &[WorkoutSession],
        routine_id: Option<&str>,
    ) -> Self {
        let mut sessions = Vec::new();

        for workout in workouts {
            if routine_id.is_some_and(|id| workout.routine_id != id) {
                continue;
            }
            let Some(exercise) = workout.exercises.iter().find(|e| e.is_named(exercise_name)) else {
                continue;
            };

            let completed: Vec<_> = exercise.sets.iter().filter(|s| s.completed).collect();
            if completed.is_empty() {
                continue;
            }

            sessions.push(ExerciseSessionStats {
                date: workout.date(),
                session_id: workout.id.clone(),
                max_weight: completed
                    .iter()
                    .map(|s| s.weight.unwrap_or(0.0))
                    .fold(0.0, f64::max),
                total_volume: completed.iter().map(|s| s.volume()).sum(),
                total_sets: completed.len() as u32,
                total_reps: completed.iter().map(|s| s.reps.unwrap_or(0)).sum(),
            });
        }

        sessions.sort_by_key(|s| s.date);

        ExerciseHistory {
            exercise_name: exercise_name.to_string(),
            total_volume: sessions.iter().map(|s| s.total_volume).sum(),
            max_weight_ever: sessions.iter().map(|s| s.max_weight).fold(0.0, f64::max),
            total_sets: sessions.iter().map(|s| s.total_sets).sum(),
            sessions,
        }
    }

    /// Number of sessions the exercise appears in
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
