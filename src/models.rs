use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weight unit a session was recorded in or a value is displayed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightUnit::Kg => write!(f, "kg"),
            WeightUnit::Lbs => write!(f, "lbs"),
        }
    }
}

impl std::str::FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kg" | "kgs" => Ok(WeightUnit::Kg),
            "lb" | "lbs" => Ok(WeightUnit::Lbs),
            _ => Err(format!("Invalid weight unit: {}", s)),
        }
    }
}

/// One performed set within a workout exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    /// Ordinal position of the set (1-based)
    pub set_number: u32,

    /// Load lifted, in the session's recorded unit
    pub weight: Option<f64>,

    /// Repetitions performed
    pub reps: Option<u32>,

    /// Whether the set was marked as done
    pub completed: bool,

    /// Weight performed in the same slot last session (copied at session start)
    pub previous_weight: Option<f64>,

    /// Reps performed in the same slot last session (copied at session start)
    pub previous_reps: Option<u32>,
}

impl WorkoutSet {
    /// Create an empty, not yet performed set
    pub fn new(set_number: u32) -> Self {
        WorkoutSet {
            set_number,
            weight: None,
            reps: None,
            completed: false,
            previous_weight: None,
            previous_reps: None,
        }
    }

    /// Create a completed set with the given load
    pub fn completed(set_number: u32, weight: f64, reps: u32) -> Self {
        WorkoutSet {
            weight: Some(weight),
            reps: Some(reps),
            completed: true,
            ..WorkoutSet::new(set_number)
        }
    }

    /// A set counts toward records and volume only when completed with a
    /// positive weight and rep count.
    pub fn is_eligible(&self) -> bool {
        self.completed && self.performed().is_some()
    }

    /// Positive (weight, reps) pair if both are present
    pub fn performed(&self) -> Option<(f64, u32)> {
        match (self.weight, self.reps) {
            (Some(w), Some(r)) if w > 0.0 && r > 0 => Some((w, r)),
            _ => None,
        }
    }

    /// Weight × reps for eligible sets, zero otherwise
    pub fn volume(&self) -> f64 {
        if !self.completed {
            return 0.0;
        }
        self.performed().map(|(w, r)| w * r as f64).unwrap_or(0.0)
    }
}

/// A named exercise performed within a session
///
/// Exercises are identified across sessions by case-insensitive name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub id: String,
    pub name: String,
    pub sets: Vec<WorkoutSet>,

    /// Rest between sets in seconds
    pub rest_time: u32,
}

impl WorkoutExercise {
    /// Case-insensitive exercise name match
    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    /// Sets eligible for record and volume computation
    pub fn eligible_sets(&self) -> impl Iterator<Item = &WorkoutSet> {
        self.sets.iter().filter(|s| s.is_eligible())
    }
}

/// Immutable record of a finished workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    /// Unique identifier for the session
    pub id: String,

    /// Routine the session was started from
    pub routine_id: String,
    pub routine_name: String,

    /// Which day of the routine was performed
    pub day_id: String,
    pub day_name: String,

    pub exercises: Vec<WorkoutExercise>,

    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,

    /// Sum of weight × reps over eligible sets
    pub total_volume: f64,

    /// Number of eligible sets
    pub total_sets: u32,

    /// Duration of the workout in seconds
    pub duration_seconds: u32,

    /// Unit used when recording this workout
    pub weight_unit: WeightUnit,

    /// User's notes about the workout
    pub notes: Option<String>,

    /// Generated feedback/summary text
    pub ai_feedback: Option<String>,
}

impl WorkoutSession {
    /// Calendar date (UTC) the session started on
    pub fn date(&self) -> NaiveDate {
        self.start_time.date_naive()
    }
}

/// Exercise definition inside a routine day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,

    /// Target number of sets
    pub sets: u32,

    /// Rest time between sets in seconds
    pub rest_time: Option<u32>,

    pub notes: Option<String>,
}

/// One training day of a routine (e.g. "Push Day")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineDay {
    pub id: String,

    /// 1-based position of the day within the routine
    pub day_number: u32,

    pub name: String,
    pub exercises: Vec<Exercise>,
}

/// Multi-day training template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub id: String,
    pub name: String,
    pub days: Vec<RoutineDay>,

    /// Which day to suggest next (0-based, always < days.len())
    pub current_day_index: usize,

    /// Percentage offered when adjusting last session's weights (e.g. 2.0 for 2%)
    pub progressive_overload_percentage: f64,

    pub created_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub image_url: Option<String>,
}

/// Raw daily sample from the health data source
///
/// Every field is independently optional; missing values fall back to
/// documented defaults during scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHealthSample {
    /// Total sleep in hours
    pub sleep_hours: Option<f64>,

    /// Heart rate variability in milliseconds
    pub hrv: Option<f64>,

    /// Resting heart rate in bpm
    pub resting_heart_rate: Option<f64>,

    /// Active energy burned (kcal)
    pub calories_burned: Option<f64>,

    /// Dietary energy consumed (kcal)
    pub calories_consumed: Option<f64>,
}

/// Computed wellness record for one calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetrics {
    pub date: NaiveDate,

    pub calories_burned: f64,
    pub calories_consumed: f64,

    /// Total sleep in hours
    pub sleep_hours: f64,

    /// Sleep as a rounded percentage of the sleep target
    pub sleep_percentage: i64,

    /// Heart rate variability in ms
    pub hrv: f64,

    /// Resting heart rate in bpm
    pub resting_heart_rate: f64,

    /// 0-100, lower is better
    pub stress_score: u8,

    /// 0-100, higher is better
    pub recovery_score: u8,

    /// 0-10 based on workout volume and duration
    pub exertion_score: f64,

    /// Consumed minus burned (negative = deficit)
    pub energy_balance: f64,

    /// When this record was computed; governs cache freshness
    pub last_calculated: DateTime<Utc>,
}

/// Arithmetic means over the rolling summary window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAverages {
    pub avg_sleep_hours: f64,
    pub avg_calories_burned: f64,
    pub avg_stress: f64,
    pub avg_recovery: f64,
}

/// One day's metrics with its trailing week for charting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyHealthSummary {
    pub metrics: HealthMetrics,
    pub weekly_averages: WeeklyAverages,

    /// Oldest first, ending with the target date
    pub last_7_days: Vec<HealthMetrics>,

    /// Total training volume on the target date, if any workout was logged
    pub workout_volume: Option<f64>,
}
