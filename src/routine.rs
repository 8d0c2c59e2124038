//! Routine creation and day progression
//!
//! A routine cycles through its days: `current_day_index` points at the day
//! suggested next and advances by one (wrapping) each time a workout is
//! completed. Starting a session for any other day leaves the pointer alone.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Result, RoutineError};
use crate::models::{Exercise, Routine, RoutineDay};
use crate::storage::RoutineStore;

/// Overload percentage given to new routines
pub const DEFAULT_OVERLOAD_PERCENTAGE: f64 = 2.0;

/// Rest time for generated exercises that do not specify one
pub const DEFAULT_REST_SECONDS: u32 = 90;

/// Next index in a cycle of `day_count` days
pub fn next_day_index(current: usize, day_count: usize) -> Option<usize> {
    if day_count == 0 {
        return None;
    }
    Some((current + 1) % day_count)
}

impl Routine {
    /// Validate and build a new routine
    ///
    /// Names are trimmed, days are renumbered from 1 and the day pointer
    /// starts at the first day.
    pub fn new(name: &str, days: Vec<RoutineDay>) -> std::result::Result<Self, RoutineError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid("Please enter a routine name"));
        }
        if days.is_empty() {
            return Err(invalid("Please add at least one day"));
        }
        if days.iter().any(|d| d.exercises.is_empty()) {
            return Err(invalid("Each day must have at least one exercise"));
        }
        if days
            .iter()
            .flat_map(|d| &d.exercises)
            .any(|e| e.name.trim().is_empty())
        {
            return Err(invalid("Please fill in all exercise names"));
        }

        let days = days
            .into_iter()
            .enumerate()
            .map(|(index, day)| RoutineDay {
                day_number: index as u32 + 1,
                name: day.name.trim().to_string(),
                exercises: day
                    .exercises
                    .into_iter()
                    .map(|e| Exercise {
                        name: e.name.trim().to_string(),
                        notes: e.notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
                        ..e
                    })
                    .collect(),
                ..day
            })
            .collect();

        Ok(Routine {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            days,
            current_day_index: 0,
            progressive_overload_percentage: DEFAULT_OVERLOAD_PERCENTAGE,
            created_at: Utc::now(),
            notes: None,
            image_url: None,
        })
    }

    /// Attach free-text notes; blank notes are dropped
    pub fn with_notes(mut self, notes: &str) -> Self {
        let notes = notes.trim();
        self.notes = if notes.is_empty() { None } else { Some(notes.to_string()) };
        self
    }

    /// Day the user is prompted to do next
    pub fn suggested_day(&self) -> Option<&RoutineDay> {
        self.days.get(self.current_day_index)
    }

    /// Advance the day pointer, wrapping to the first day after the last
    pub fn progress_day(&mut self) -> std::result::Result<usize, RoutineError> {
        let next = next_day_index(self.current_day_index, self.days.len()).ok_or_else(|| {
            RoutineError::NoDays {
                routine_id: self.id.clone(),
            }
        })?;
        self.current_day_index = next;
        Ok(next)
    }
}

fn invalid(reason: &str) -> RoutineError {
    RoutineError::Invalid {
        reason: reason.to_string(),
    }
}

/// Advance the stored routine to its next day and return the new index
pub fn progress_routine_day(store: &dyn RoutineStore, routine_id: &str) -> Result<usize> {
    let mut routine = store.get_routine(routine_id)?;
    let previous = routine.current_day_index;
    let next = routine.progress_day()?;

    store.set_current_day_index(routine_id, next)?;

    info!(
        routine = %routine_id,
        from = previous,
        to = next,
        days = routine.days.len(),
        "Routine day progressed"
    );
    Ok(next)
}

/// Exercise as returned by the routine generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedExercise {
    pub name: String,
    pub sets: u32,
    #[serde(default)]
    pub rest_time: Option<u32>,
}

/// Single training day as returned by the routine generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDay {
    pub day_name: String,
    pub exercises: Vec<GeneratedExercise>,
}

/// Multi-day routine as returned by the routine generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRoutine {
    pub routine_name: String,
    pub days: Vec<GeneratedDay>,
}

impl GeneratedDay {
    /// Routine day with fresh ids and default rest times filled in
    pub fn into_routine_day(self, day_number: u32) -> RoutineDay {
        let day_id = Uuid::new_v4().to_string();
        let exercises = self
            .exercises
            .into_iter()
            .enumerate()
            .map(|(index, e)| Exercise {
                id: format!("{}-ex-{}", day_id, index),
                name: e.name,
                sets: e.sets,
                rest_time: Some(e.rest_time.filter(|r| *r > 0).unwrap_or(DEFAULT_REST_SECONDS)),
                notes: None,
            })
            .collect();

        RoutineDay {
            id: day_id,
            day_number,
            name: self.day_name,
            exercises,
        }
    }
}

impl GeneratedRoutine {
    /// Validated routine built from the generated structure
    pub fn into_routine(self) -> std::result::Result<Routine, RoutineError> {
        let days = self
            .days
            .into_iter()
            .enumerate()
            .map(|(index, day)| day.into_routine_day(index as u32 + 1))
            .collect();
        Routine::new(&self.routine_name, days)
    }
}

/// The outermost `{ ... }` span of a response that may carry extra prose
fn extract_json_object(text: &str) -> std::result::Result<&str, RoutineError> {
    let text = text.trim();
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&text[start..=end]),
        _ => Err(RoutineError::Parse {
            reason: "no JSON object found in response".to_string(),
        }),
    }
}

fn parse_error(err: serde_json::Error) -> RoutineError {
    RoutineError::Parse {
        reason: err.to_string(),
    }
}

/// Parse generated routine text
///
/// Any text before the first `{` or after the last `}` is ignored.
pub fn parse_generated_routine(text: &str) -> std::result::Result<GeneratedRoutine, RoutineError> {
    let json = extract_json_object(text)?;
    let routine: GeneratedRoutine = serde_json::from_str(json).map_err(parse_error)?;

    if routine.routine_name.trim().is_empty() {
        return Err(RoutineError::Parse {
            reason: "routineName is empty".to_string(),
        });
    }

    debug!(name = %routine.routine_name, days = routine.days.len(), "Parsed generated routine");
    Ok(routine)
}

/// Parse a generated single day
pub fn parse_generated_day(text: &str) -> std::result::Result<GeneratedDay, RoutineError> {
    let json = extract_json_object(text)?;
    let day: GeneratedDay = serde_json::from_str(json).map_err(parse_error)?;

    if day.day_name.trim().is_empty() {
        return Err(RoutineError::Parse {
            reason: "dayName is empty".to_string(),
        });
    }

    debug!(name = %day.day_name, exercises = day.exercises.len(), "Parsed generated day");
    Ok(day)
}
