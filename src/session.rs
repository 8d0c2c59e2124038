//! Workout session assembly and completion
//!
//! Covers the life of a session outside the live UI: preparing the set
//! grid for a routine day (with last session's numbers copied in), optional
//! progressive overload, sealing the finished session with its totals, and
//! recording it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Routine, RoutineDay, WeightUnit, WorkoutExercise, WorkoutSession, WorkoutSet};
use crate::records::{get_workout_prs, WorkoutPr};
use crate::routine::{progress_routine_day, DEFAULT_REST_SECONDS};
use crate::storage::{RoutineStore, SessionLog};
use crate::units::round_weight;

/// Total volume and number of eligible sets
pub fn session_totals(exercises: &[WorkoutExercise]) -> (f64, u32) {
    exercises
        .iter()
        .flat_map(|e| e.eligible_sets())
        .fold((0.0, 0), |(volume, sets), set| (volume + set.volume(), sets + 1))
}

impl WorkoutSession {
    /// Seal a finished workout, computing its totals and duration
    pub fn new(
        routine: &Routine,
        day: &RoutineDay,
        exercises: Vec<WorkoutExercise>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        weight_unit: WeightUnit,
    ) -> Self {
        let (total_volume, total_sets) = session_totals(&exercises);
        let duration_seconds = (end_time - start_time).num_seconds().max(0) as u32;

        WorkoutSession {
            id: format!("workout-{}", Uuid::new_v4()),
            routine_id: routine.id.clone(),
            routine_name: routine.name.clone(),
            day_id: day.id.clone(),
            day_name: day.name.clone(),
            exercises,
            start_time,
            end_time: Some(end_time),
            total_volume,
            total_sets,
            duration_seconds,
            weight_unit,
            notes: None,
            ai_feedback: None,
        }
    }

    /// Rederive totals and duration from the recorded sets and times
    pub fn recompute_totals(&mut self) {
        let (total_volume, total_sets) = session_totals(&self.exercises);
        self.total_volume = total_volume;
        self.total_sets = total_sets;
        if let Some(end_time) = self.end_time {
            self.duration_seconds = (end_time - self.start_time).num_seconds().max(0) as u32;
        }
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = non_blank(notes);
        self
    }

    pub fn with_feedback(mut self, feedback: &str) -> Self {
        self.ai_feedback = non_blank(feedback);
        self
    }
}

fn non_blank(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Empty set grid for a routine day
///
/// Each set gets last session's weight and reps for the same slot. "Last
/// session" is the latest session of the same routine day; exercises are
/// matched by exact name.
pub fn build_session_exercises(
    day: &RoutineDay,
    previous_sessions: &[WorkoutSession],
) -> Vec<WorkoutExercise> {
    let last_session = previous_sessions
        .iter()
        .filter(|s| s.day_id == day.id)
        .max_by_key(|s| s.start_time);

    day.exercises
        .iter()
        .map(|exercise| {
            let previous = last_session
                .and_then(|s| s.exercises.iter().find(|e| e.name == exercise.name));

            let sets = (0..exercise.sets)
                .map(|index| {
                    let previous_set = previous.and_then(|e| e.sets.get(index as usize));
                    WorkoutSet {
                        previous_weight: previous_set.and_then(|s| s.weight).filter(|w| *w > 0.0),
                        previous_reps: previous_set.and_then(|s| s.reps).filter(|r| *r > 0),
                        ..WorkoutSet::new(index + 1)
                    }
                })
                .collect();

            WorkoutExercise {
                id: exercise.id.clone(),
                name: exercise.name.clone(),
                sets,
                rest_time: exercise.rest_time.filter(|r| *r > 0).unwrap_or(DEFAULT_REST_SECONDS),
            }
        })
        .collect()
}

/// Whether any set carries a weight from the previous session
pub fn has_previous_weights(exercises: &[WorkoutExercise]) -> bool {
    exercises
        .iter()
        .flat_map(|e| &e.sets)
        .any(|s| s.previous_weight.is_some())
}

/// Start from last session's weights increased by `percentage`
///
/// Adjusted weights are rounded to the nearest 0.5. Sets without a previous
/// weight are left alone.
pub fn apply_progressive_overload(exercises: &mut [WorkoutExercise], percentage: f64) {
    let mut adjusted = 0;
    for set in exercises.iter_mut().flat_map(|e| e.sets.iter_mut()) {
        if let Some(previous) = set.previous_weight {
            set.weight = Some(round_weight(previous * (1.0 + percentage / 100.0), WeightUnit::Kg));
            adjusted += 1;
        }
    }
    debug!(percentage, sets = adjusted, "Applied progressive overload");
}

/// Start from last session's weights unchanged
pub fn prefill_previous_weights(exercises: &mut [WorkoutExercise]) {
    for set in exercises.iter_mut().flat_map(|e| e.sets.iter_mut()) {
        set.weight = set.previous_weight;
    }
}

/// How often an exercise appears in a routine's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseFrequency {
    pub name: String,

    /// Sessions containing the exercise
    pub count: u32,

    /// Volume of the exercise in its most recent session
    pub last_volume: f64,
}

/// Aggregate view over all sessions of one routine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineHistory {
    pub routine_id: String,

    /// Newest first
    pub sessions: Vec<WorkoutSession>,

    pub total_volume: f64,
    pub total_sets: u32,

    /// Mean session duration in whole seconds
    pub average_duration_seconds: u32,

    /// Most frequent first
    pub exercises: Vec<ExerciseFrequency>,
}

impl RoutineHistory {
    pub fn build(routine_id: &str, all_workouts: &[WorkoutSession]) -> Self {
        let mut sessions: Vec<WorkoutSession> = all_workouts
            .iter()
            .filter(|s| s.routine_id == routine_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));

        let total_volume = sessions.iter().map(|s| s.total_volume).sum();
        let total_sets = sessions.iter().map(|s| s.total_sets).sum();
        let average_duration_seconds = if sessions.is_empty() {
            0
        } else {
            let total: f64 = sessions.iter().map(|s| s.duration_seconds as f64).sum();
            (total / sessions.len() as f64).round() as u32
        };

        // Walk oldest to newest so the last write per name is the newest volume
        let mut order: Vec<String> = Vec::new();
        let mut stats: HashMap<String, ExerciseFrequency> = HashMap::new();
        for session in sessions.iter().rev() {
            for exercise in &session.exercises {
                let volume: f64 = exercise.sets.iter().map(|s| s.volume()).sum();
                let entry = stats.entry(exercise.name.clone()).or_insert_with(|| {
                    order.push(exercise.name.clone());
                    ExerciseFrequency {
                        name: exercise.name.clone(),
                        count: 0,
                        last_volume: 0.0,
                    }
                });
                entry.count += 1;
                entry.last_volume = volume;
            }
        }

        let mut exercises: Vec<ExerciseFrequency> =
            order.iter().filter_map(|name| stats.remove(name)).collect();
        exercises.sort_by(|a, b| b.count.cmp(&a.count));

        RoutineHistory {
            routine_id: routine_id.to_string(),
            sessions,
            total_volume,
            total_sets,
            average_duration_seconds,
            exercises,
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

/// Outcome of recording a finished workout
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutCompletion {
    /// Records set in the session, measured against earlier sessions
    pub personal_records: Vec<WorkoutPr>,

    /// Routine day suggested next
    pub next_day_index: usize,
}

/// Record a finished session and move its routine to the next day
///
/// The routine always advances by one day, whichever day was performed.
pub fn complete_workout(
    session: &WorkoutSession,
    log: &dyn SessionLog,
    routines: &dyn RoutineStore,
) -> Result<WorkoutCompletion> {
    let history = log.load_all_sessions()?;
    let personal_records = get_workout_prs(session, &history);

    log.append_session(session)?;
    let next_day_index = progress_routine_day(routines, &session.routine_id)?;

    info!(
        session = %session.id,
        routine = %session.routine_id,
        volume = session.total_volume,
        sets = session.total_sets,
        prs = personal_records.len(),
        "Workout completed"
    );

    Ok(WorkoutCompletion {
        personal_records,
        next_day_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Exercise;
    use crate::records::PrType;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn create_test_routine() -> Routine {
        let day = |id: &str, name: &str, exercises: &[(&str, u32)]| RoutineDay {
            id: id.to_string(),
            day_number: 0,
            name: name.to_string(),
            exercises: exercises
                .iter()
                .map(|(n, sets)| Exercise {
                    id: format!("{}-{}", id, n),
                    name: n.to_string(),
                    sets: *sets,
                    rest_time: None,
                    notes: None,
                })
                .collect(),
        };
        let mut routine = Routine::new(
            "Push Pull",
            vec![
                day("push", "Push", &[("Bench Press", 3), ("Dips", 2)]),
                day("pull", "Pull", &[("Row", 3)]),
            ],
        )
        .unwrap();
        routine.id = "r1".to_string();
        routine
    }

    fn performed(
        routine: &Routine,
        day: usize,
        start: DateTime<Utc>,
        sets: Vec<(&str, Vec<WorkoutSet>)>,
    ) -> WorkoutSession {
        let exercises = sets
            .into_iter()
            .map(|(name, sets)| WorkoutExercise {
                id: name.to_lowercase(),
                name: name.to_string(),
                sets,
                rest_time: 90,
            })
            .collect();
        WorkoutSession::new(
            routine,
            &routine.days[day],
            exercises,
            start,
            start + chrono::Duration::minutes(50),
            WeightUnit::Kg,
        )
    }

    fn bench(sets: &[(f64, u32)]) -> Vec<(&'static str, Vec<WorkoutSet>)> {
        let sets = sets
            .iter()
            .enumerate()
            .map(|(i, &(weight, reps))| WorkoutSet::completed(i as u32 + 1, weight, reps))
            .collect();
        vec![("Bench Press", sets)]
    }

    fn at(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, d, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_session_totals() {
        let routine = create_test_routine();
        let mut skipped = WorkoutSet::completed(3, 80.0, 5);
        skipped.completed = false;

        let session = performed(
            &routine,
            0,
            at(2),
            vec![(
                "Bench Press",
                vec![WorkoutSet::completed(1, 80.0, 5), WorkoutSet::completed(2, 80.0, 4), skipped],
            )],
        );

        assert_eq!(session.total_volume, 720.0);
        assert_eq!(session.total_sets, 2);
        assert_eq!(session.duration_seconds, 3000);
        assert_eq!(session.day_name, "Push");
        assert!(session.id.starts_with("workout-"));
    }

    #[test]
    fn test_recompute_totals_overrides_recorded_values() {
        let routine = create_test_routine();
        let mut session = performed(&routine, 0, at(2), bench(&[(100.0, 5)]));
        session.total_volume = 99_999.0;
        session.total_sets = 40;
        session.duration_seconds = 1;

        session.recompute_totals();

        assert_eq!(session.total_volume, 500.0);
        assert_eq!(session.total_sets, 1);
        assert_eq!(session.duration_seconds, 3000);
    }

    #[test]
    fn test_notes_trimmed() {
        let routine = create_test_routine();
        let session = performed(&routine, 0, at(2), Vec::new())
            .with_notes("  felt strong ")
            .with_feedback("   ");
        assert_eq!(session.notes.as_deref(), Some("felt strong"));
        assert!(session.ai_feedback.is_none());
    }

    #[test]
    fn test_build_session_exercises() {
        let routine = create_test_routine();
        let older = performed(&routine, 0, at(1), bench(&[(70.0, 5)]));
        let latest = performed(&routine, 0, at(3), bench(&[(80.0, 5), (77.5, 6)]));
        let other_day = performed(&routine, 1, at(4), bench(&[(90.0, 5)]));

        let exercises = build_session_exercises(&routine.days[0], &[latest, older, other_day]);

        assert_eq!(exercises.len(), 2);
        let bench = &exercises[0];
        assert_eq!(bench.sets.len(), 3);
        assert_eq!(bench.rest_time, 90);
        assert_eq!(bench.sets[0].previous_weight, Some(80.0));
        assert_eq!(bench.sets[1].previous_reps, Some(6));
        assert_eq!(bench.sets[2].previous_weight, None);
        assert!(bench.sets.iter().all(|s| s.weight.is_none() && !s.completed));

        // No previous Dips in that session
        assert!(exercises[1].sets.iter().all(|s| s.previous_weight.is_none()));
        assert!(has_previous_weights(&exercises));
    }

    #[test]
    fn test_progressive_overload() {
        let routine = create_test_routine();
        let last = performed(&routine, 0, at(1), bench(&[(100.0, 5), (61.0, 5)]));
        let mut exercises = build_session_exercises(&routine.days[0], &[last]);

        apply_progressive_overload(&mut exercises, 2.0);

        // 102.0 and 62.22 → 62.0
        assert_eq!(exercises[0].sets[0].weight, Some(102.0));
        assert_eq!(exercises[0].sets[1].weight, Some(62.0));
        assert_eq!(exercises[0].sets[2].weight, None);
    }

    #[test]
    fn test_prefill_previous_weights() {
        let routine = create_test_routine();
        let last = performed(&routine, 0, at(1), bench(&[(82.5, 5)]));
        let mut exercises = build_session_exercises(&routine.days[0], &[last]);

        prefill_previous_weights(&mut exercises);
        assert_eq!(exercises[0].sets[0].weight, Some(82.5));
        assert_eq!(exercises[0].sets[1].weight, None);
    }

    #[test]
    fn test_routine_history() {
        let routine = create_test_routine();
        let first = performed(&routine, 0, at(1), bench(&[(60.0, 10)]));
        let row = vec![("Row", vec![WorkoutSet::completed(1, 50.0, 10)])];
        let second = performed(&routine, 1, at(3), row);
        let third = performed(&routine, 0, at(5), bench(&[(70.0, 10)]));
        let mut unrelated = third.clone();
        unrelated.routine_id = "r2".to_string();

        let history = RoutineHistory::build("r1", &[first, third, second, unrelated]);

        assert_eq!(history.session_count(), 3);
        assert_eq!(history.sessions[0].start_time, at(5));
        assert_eq!(history.total_volume, 1800.0);
        assert_eq!(history.total_sets, 3);
        assert_eq!(history.average_duration_seconds, 3000);

        assert_eq!(history.exercises[0].name, "Bench Press");
        assert_eq!(history.exercises[0].count, 2);
        assert_eq!(history.exercises[0].last_volume, 700.0);
        assert_eq!(history.exercises[1].count, 1);
    }

    #[test]
    fn test_empty_routine_history() {
        let history = RoutineHistory::build("r1", &[]);
        assert_eq!(history.average_duration_seconds, 0);
        assert!(history.exercises.is_empty());
    }

    #[test]
    fn test_complete_workout() {
        let store = MemoryStore::new();
        let routine = create_test_routine();
        store.save_routine(&routine).unwrap();

        let first = performed(&routine, 0, at(1), bench(&[(80.0, 5)]));
        let completion = complete_workout(&first, &store, &store).unwrap();
        assert_eq!(completion.next_day_index, 1);
        assert_eq!(completion.personal_records.len(), 1);
        assert_eq!(completion.personal_records[0].pr_types, PrType::ALL.to_vec());

        // Performing day 0 again still advances the pointer
        let second = performed(&routine, 0, at(2), bench(&[(75.0, 5)]));
        let completion = complete_workout(&second, &store, &store).unwrap();
        assert_eq!(completion.next_day_index, 0);
        assert_eq!(completion.personal_records.len(), 1);
        assert_eq!(completion.personal_records[0].pr_types, vec![PrType::MaxReps]);

        assert_eq!(store.load_all_sessions().unwrap().len(), 2);
    }

    #[test]
    fn test_complete_workout_unknown_routine() {
        let store = MemoryStore::new();
        let routine = create_test_routine();
        let session = performed(&routine, 0, at(1), Vec::new());

        assert!(complete_workout(&session, &store, &store).is_err());
        // The session itself is still recorded
        assert_eq!(store.load_all_sessions().unwrap().len(), 1);
    }
}
