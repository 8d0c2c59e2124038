//! Health scoring
//!
//! Maps raw daily physiological samples and same-day training load onto
//! bounded wellness scores:
//!
//! - **Stress** (0-100, lower is better): inverse HRV and direct resting
//!   heart rate, normalized over fixed physiological ranges and weighted 70/30
//! - **Recovery** (0-100, higher is better): sleep (≤33), HRV (≤44) and
//!   resting heart rate (≤23) points, summed and clamped
//! - **Exertion** (0-10): training volume (≤7) and duration (≤3) points
//!
//! Daily records are cached per date. The freshness policy trusts OLD data
//! more than new data: once a day is far enough behind today it cannot
//! change any more, so its cached record is always reused.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{
    DailyHealthSummary, HealthMetrics, RawHealthSample, WeeklyAverages, WorkoutSession,
};
use crate::storage::{HealthMetricsCache, RawHealthSource, SessionLog};

/// Weight of the HRV term in the stress score
const STRESS_HRV_WEIGHT: f64 = 0.7;
/// Weight of the resting heart rate term in the stress score
const STRESS_RHR_WEIGHT: f64 = 0.3;

const RECOVERY_SLEEP_POINTS: f64 = 33.0;
const RECOVERY_HRV_POINTS: f64 = 44.0;
const RECOVERY_RHR_POINTS: f64 = 23.0;

const EXERTION_VOLUME_POINTS: f64 = 7.0;
const EXERTION_DURATION_POINTS: f64 = 3.0;

/// Reference ranges and fallbacks used by the scoring formulas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthScoringConfig {
    /// Nightly sleep target in hours (default: 8)
    pub sleep_target_hours: f64,

    /// HRV normalization range in ms (default: 20-200)
    pub hrv_min: f64,
    pub hrv_max: f64,

    /// Resting heart rate normalization range in bpm (default: 40-100)
    pub rhr_min: f64,
    pub rhr_max: f64,

    /// Substituted when the source has no HRV for the day (default: 50 ms)
    pub default_hrv: f64,

    /// Substituted when the source has no resting heart rate (default: 65 bpm)
    pub default_rhr: f64,

    /// Daily volume that earns the full volume component (default: 10000)
    pub exertion_volume_reference: f64,

    /// Daily training minutes that earn the full duration component (default: 120)
    pub exertion_duration_reference_minutes: f64,

    /// Days behind today after which a cached record is never recomputed (default: 2)
    pub settled_age_days: i64,

    /// Length of the rolling summary window including the target day (default: 7)
    pub summary_window_days: u32,
}

impl Default for HealthScoringConfig {
    fn default() -> Self {
        HealthScoringConfig {
            sleep_target_hours: 8.0,
            hrv_min: 20.0,
            hrv_max: 200.0,
            rhr_min: 40.0,
            rhr_max: 100.0,
            default_hrv: 50.0,
            default_rhr: 65.0,
            exertion_volume_reference: 10_000.0,
            exertion_duration_reference_minutes: 120.0,
            settled_age_days: 2,
            summary_window_days: 7,
        }
    }
}

/// Pure scoring formulas parameterized by [`HealthScoringConfig`]
#[derive(Debug, Clone, Default)]
pub struct HealthCalculator {
    config: HealthScoringConfig,
}

impl HealthCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HealthScoringConfig) -> Self {
        HealthCalculator { config }
    }

    pub fn config(&self) -> &HealthScoringConfig {
        &self.config
    }

    fn hrv_ratio(&self, hrv: f64) -> f64 {
        (hrv - self.config.hrv_min) / (self.config.hrv_max - self.config.hrv_min)
    }

    fn rhr_ratio(&self, rhr: f64) -> f64 {
        (rhr - self.config.rhr_min) / (self.config.rhr_max - self.config.rhr_min)
    }

    /// Stress score in [0, 100]; lower means less stressed
    pub fn stress_score(&self, hrv: f64, rhr: f64) -> u8 {
        let hrv_normalized = (100.0 - self.hrv_ratio(hrv) * 100.0).clamp(0.0, 100.0);
        let rhr_normalized = (self.rhr_ratio(rhr) * 100.0).clamp(0.0, 100.0);

        let score = hrv_normalized * STRESS_HRV_WEIGHT + rhr_normalized * STRESS_RHR_WEIGHT;
        score.round() as u8
    }

    /// Recovery score in [0, 100]; higher means better recovered
    ///
    /// Each component is only capped from above. A component can go negative
    /// (HRV below range, RHR above range) and pull the total down before the
    /// final clamp.
    pub fn recovery_score(&self, sleep_hours: f64, hrv: f64, rhr: f64) -> u8 {
        let sleep = (sleep_hours / self.config.sleep_target_hours * RECOVERY_SLEEP_POINTS)
            .min(RECOVERY_SLEEP_POINTS);
        let hrv = (self.hrv_ratio(hrv) * RECOVERY_HRV_POINTS).min(RECOVERY_HRV_POINTS);
        let rhr = ((1.0 - self.rhr_ratio(rhr)) * RECOVERY_RHR_POINTS).min(RECOVERY_RHR_POINTS);

        (sleep + hrv + rhr).clamp(0.0, 100.0).round() as u8
    }

    /// Exertion score in [0, 10], rounded to one decimal
    pub fn exertion_score(&self, volume: f64, duration_minutes: f64) -> f64 {
        let volume_points = (volume / self.config.exertion_volume_reference
            * EXERTION_VOLUME_POINTS)
            .min(EXERTION_VOLUME_POINTS);
        let duration_points = (duration_minutes / self.config.exertion_duration_reference_minutes
            * EXERTION_DURATION_POINTS)
            .min(EXERTION_DURATION_POINTS);

        ((volume_points + duration_points) * 10.0).round() / 10.0
    }

    /// Sleep as a rounded percentage of the target
    pub fn sleep_percentage(&self, sleep_hours: f64) -> i64 {
        (sleep_hours / self.config.sleep_target_hours * 100.0).round() as i64
    }

    /// Build the daily record from a raw sample and the day's sessions
    ///
    /// Missing or non-positive HRV and resting heart rate fall back to the
    /// configured defaults; missing sleep and calories count as zero.
    pub fn daily_metrics(
        &self,
        date: NaiveDate,
        sample: &RawHealthSample,
        day_sessions: &[&WorkoutSession],
        now: DateTime<Utc>,
    ) -> HealthMetrics {
        let hrv = positive(sample.hrv).unwrap_or_else(|| {
            warn!(%date, fallback = self.config.default_hrv, "No HRV sample, using default");
            self.config.default_hrv
        });
        let rhr = positive(sample.resting_heart_rate).unwrap_or_else(|| {
            warn!(
                %date,
                fallback = self.config.default_rhr,
                "No resting heart rate sample, using default"
            );
            self.config.default_rhr
        });
        let sleep_hours = sample.sleep_hours.unwrap_or(0.0);
        let calories_burned = sample.calories_burned.unwrap_or(0.0);
        let calories_consumed = sample.calories_consumed.unwrap_or(0.0);

        let total_volume: f64 = day_sessions.iter().map(|s| s.total_volume).sum();
        let total_seconds: f64 = day_sessions.iter().map(|s| s.duration_seconds as f64).sum();

        let exertion_score = if total_volume > 0.0 {
            self.exertion_score(total_volume, total_seconds / 60.0)
        } else {
            0.0
        };

        HealthMetrics {
            date,
            calories_burned,
            calories_consumed,
            sleep_hours,
            sleep_percentage: self.sleep_percentage(sleep_hours),
            hrv,
            resting_heart_rate: rhr,
            stress_score: self.stress_score(hrv, rhr),
            recovery_score: self.recovery_score(sleep_hours, hrv, rhr),
            exertion_score,
            energy_balance: calories_consumed - calories_burned,
            last_calculated: now,
        }
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

/// Stress score with the default reference ranges
pub fn calculate_stress_score(hrv: f64, rhr: f64) -> u8 {
    HealthCalculator::new().stress_score(hrv, rhr)
}

/// Recovery score with the default reference ranges
pub fn calculate_recovery_score(sleep_hours: f64, hrv: f64, rhr: f64) -> u8 {
    HealthCalculator::new().recovery_score(sleep_hours, hrv, rhr)
}

/// Exertion score with the default references
pub fn calculate_exertion_score(volume: f64, duration_minutes: f64) -> f64 {
    HealthCalculator::new().exertion_score(volume, duration_minutes)
}

/// Why a daily record has to be computed again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeReason {
    /// Nothing cached for the date
    Missing,
    /// Caller asked for a fresh computation
    Forced,
    /// Cached record is too recent to trust for a day that is still open
    Stale,
}

/// Outcome of the freshness policy for one date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    UseCached,
    Recompute(RecomputeReason),
}

/// Whether a date is far enough behind `now` that its data can no longer change
pub fn is_settled_day(date: NaiveDate, now: DateTime<Utc>, settled_age_days: i64) -> bool {
    (now.date_naive() - date).num_days() >= settled_age_days
}

/// Staleness predicate over `last_calculated`
///
/// Counts whole days since the record was computed. A record computed
/// within the last `settled_age_days` days was computed while its data may
/// still have been arriving, so it is recomputed.
pub fn should_recalculate(
    cached: Option<&HealthMetrics>,
    now: DateTime<Utc>,
    settled_age_days: i64,
) -> bool {
    match cached {
        None => true,
        Some(metrics) => (now - metrics.last_calculated).num_days() < settled_age_days,
    }
}

/// Age-based cache policy for a daily record
///
/// The cached record is reused when it exists, no recomputation was forced,
/// and either the date itself is settled or the record was computed long
/// enough ago.
pub fn cache_decision(
    cached: Option<&HealthMetrics>,
    date: NaiveDate,
    force: bool,
    now: DateTime<Utc>,
    config: &HealthScoringConfig,
) -> CacheDecision {
    if cached.is_none() {
        return CacheDecision::Recompute(RecomputeReason::Missing);
    }
    if force {
        return CacheDecision::Recompute(RecomputeReason::Forced);
    }

    if is_settled_day(date, now, config.settled_age_days)
        || !should_recalculate(cached, now, config.settled_age_days)
    {
        CacheDecision::UseCached
    } else {
        CacheDecision::Recompute(RecomputeReason::Stale)
    }
}

/// Daily health records over the external collaborators
pub struct HealthService<'a> {
    sessions: &'a dyn SessionLog,
    cache: &'a dyn HealthMetricsCache,
    source: &'a dyn RawHealthSource,
    calculator: HealthCalculator,
}

impl<'a> HealthService<'a> {
    pub fn new(
        sessions: &'a dyn SessionLog,
        cache: &'a dyn HealthMetricsCache,
        source: &'a dyn RawHealthSource,
    ) -> Self {
        Self::with_config(sessions, cache, source, HealthScoringConfig::default())
    }

    pub fn with_config(
        sessions: &'a dyn SessionLog,
        cache: &'a dyn HealthMetricsCache,
        source: &'a dyn RawHealthSource,
        config: HealthScoringConfig,
    ) -> Self {
        HealthService {
            sessions,
            cache,
            source,
            calculator: HealthCalculator::with_config(config),
        }
    }

    /// Cached or freshly computed metrics for `date`
    ///
    /// `as_of` pins "now" for the freshness policy and the `last_calculated`
    /// stamp; `None` uses the current time.
    pub fn get_health_metrics_for_day(
        &self,
        date: NaiveDate,
        force: bool,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<HealthMetrics> {
        let now = as_of.unwrap_or_else(Utc::now);
        let mut sessions = None;
        self.resolve_day(date, force, now, &mut sessions)
    }

    /// Target day metrics plus the rolling window ending on it
    pub fn get_daily_health_summary(
        &self,
        date: NaiveDate,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<DailyHealthSummary> {
        let now = as_of.unwrap_or_else(Utc::now);
        let mut sessions = None;

        let metrics = self.resolve_day(date, false, now, &mut sessions)?;

        let window = self.calculator.config().summary_window_days.max(1);
        let mut last_7_days = Vec::with_capacity(window as usize);
        for offset in (0..window).rev() {
            let day = date - Duration::days(offset as i64);
            if day == date {
                last_7_days.push(metrics.clone());
            } else {
                last_7_days.push(self.resolve_day(day, false, now, &mut sessions)?);
            }
        }

        let days = last_7_days.len() as f64;
        let weekly_averages = WeeklyAverages {
            avg_sleep_hours: last_7_days.iter().map(|m| m.sleep_hours).sum::<f64>() / days,
            avg_calories_burned: last_7_days.iter().map(|m| m.calories_burned).sum::<f64>() / days,
            avg_stress: last_7_days.iter().map(|m| m.stress_score as f64).sum::<f64>() / days,
            avg_recovery: last_7_days.iter().map(|m| m.recovery_score as f64).sum::<f64>() / days,
        };

        let all = self.loaded_sessions(&mut sessions)?;
        let volume: f64 = sessions_on(all, date).map(|s| s.total_volume).sum();
        let workout_volume = if volume > 0.0 { Some(volume) } else { None };

        Ok(DailyHealthSummary {
            metrics,
            weekly_averages,
            last_7_days,
            workout_volume,
        })
    }

    fn resolve_day(
        &self,
        date: NaiveDate,
        force: bool,
        now: DateTime<Utc>,
        sessions: &mut Option<Vec<WorkoutSession>>,
    ) -> Result<HealthMetrics> {
        let cached = self.cache.get_metrics(date)?;

        let decision = cache_decision(cached.as_ref(), date, force, now, self.calculator.config());
        let reason = match decision {
            CacheDecision::UseCached => {
                if let Some(metrics) = cached {
                    debug!(%date, "Using cached health metrics");
                    return Ok(metrics);
                }
                RecomputeReason::Missing
            }
            CacheDecision::Recompute(reason) => reason,
        };

        let sample = self.source.fetch_raw_sample(date);
        let all = self.loaded_sessions(sessions)?;
        let day_sessions: Vec<&WorkoutSession> = sessions_on(all, date).collect();

        let metrics = self.calculator.daily_metrics(date, &sample, &day_sessions, now);
        self.cache.put_metrics(date, &metrics)?;

        info!(
            %date,
            ?reason,
            stress = metrics.stress_score,
            recovery = metrics.recovery_score,
            exertion = metrics.exertion_score,
            "Health metrics recomputed"
        );

        Ok(metrics)
    }

    fn loaded_sessions<'s>(
        &self,
        sessions: &'s mut Option<Vec<WorkoutSession>>,
    ) -> Result<&'s [WorkoutSession]> {
        if sessions.is_none() {
            *sessions = Some(self.sessions.load_all_sessions()?);
        }
        Ok(sessions.as_deref().unwrap_or(&[]))
    }
}

/// Sessions that started on `date` (UTC)
fn sessions_on(
    sessions: &[WorkoutSession],
    date: NaiveDate,
) -> impl Iterator<Item = &WorkoutSession> {
    sessions.iter().filter(move |s| s.date() == date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeightUnit;
    use crate::storage::{MemoryStore, NoHealthData, StaticHealthSource};
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    fn at(d: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, d, hour, 0, 0).unwrap()
    }

    fn create_test_session(
        id: &str,
        start: DateTime<Utc>,
        volume: f64,
        seconds: u32,
    ) -> WorkoutSession {
        WorkoutSession {
            id: id.to_string(),
            routine_id: "r1".to_string(),
            routine_name: "Full Body".to_string(),
            day_id: "d1".to_string(),
            day_name: "Day A".to_string(),
            exercises: Vec::new(),
            start_time: start,
            end_time: None,
            total_volume: volume,
            total_sets: 10,
            duration_seconds: seconds,
            weight_unit: WeightUnit::Kg,
            notes: None,
            ai_feedback: None,
        }
    }

    fn cached_metrics(date: NaiveDate, last_calculated: DateTime<Utc>) -> HealthMetrics {
        let sample = RawHealthSample::default();
        HealthCalculator::new().daily_metrics(date, &sample, &[], last_calculated)
    }

    #[test]
    fn test_stress_score() {
        // HRV 50: 100 - 30/180*100 = 83.33; RHR 65: 25/60*100 = 41.67
        assert_eq!(calculate_stress_score(50.0, 65.0), 71);
        assert_eq!(calculate_stress_score(200.0, 40.0), 0);
        assert_eq!(calculate_stress_score(20.0, 100.0), 100);
    }

    #[test]
    fn test_stress_score_clamps_terms() {
        assert_eq!(calculate_stress_score(500.0, 20.0), 0);
        assert_eq!(calculate_stress_score(5.0, 150.0), 100);
    }

    #[test]
    fn test_recovery_score() {
        // 33 + 44 + 23 at the best end of every range
        assert_eq!(calculate_recovery_score(8.0, 200.0, 40.0), 100);
        // Extra sleep and HRV above range are capped
        assert_eq!(calculate_recovery_score(12.0, 300.0, 30.0), 100);
        // 7/8*33 = 28.875; 30/180*44 = 7.33; (1 - 25/60)*23 = 13.42
        assert_eq!(calculate_recovery_score(7.0, 50.0, 65.0), 50);
    }

    #[test]
    fn test_recovery_score_negative_components() {
        // HRV and RHR components both negative, clamped total
        assert_eq!(calculate_recovery_score(0.0, 10.0, 120.0), 0);
    }

    #[test]
    fn test_exertion_score() {
        assert_eq!(calculate_exertion_score(10_000.0, 120.0), 10.0);
        assert_eq!(calculate_exertion_score(50_000.0, 600.0), 10.0);
        // 5000/10000*7 = 3.5; 60/120*3 = 1.5
        assert_eq!(calculate_exertion_score(5_000.0, 60.0), 5.0);
        // 1234/10000*7 = 0.8638; 45/120*3 = 1.125 → 1.9888
        assert_eq!(calculate_exertion_score(1_234.0, 45.0), 2.0);
    }

    #[test]
    fn test_daily_metrics_defaults() {
        let metrics = cached_metrics(day(2), at(2, 20));

        assert_eq!(metrics.hrv, 50.0);
        assert_eq!(metrics.resting_heart_rate, 65.0);
        assert_eq!(metrics.sleep_hours, 0.0);
        assert_eq!(metrics.sleep_percentage, 0);
        assert_eq!(metrics.exertion_score, 0.0);
        assert_eq!(metrics.energy_balance, 0.0);
        assert_eq!(metrics.stress_score, 71);
    }

    #[test]
    fn test_daily_metrics_from_sample() {
        let sample = RawHealthSample {
            sleep_hours: Some(6.0),
            hrv: Some(0.0),
            resting_heart_rate: Some(58.0),
            calories_burned: Some(650.0),
            calories_consumed: Some(2400.0),
        };
        let session = create_test_session("s1", at(2, 7), 5_000.0, 3_600);
        let metrics =
            HealthCalculator::new().daily_metrics(day(2), &sample, &[&session], at(2, 20));

        // Zero HRV is treated as missing
        assert_eq!(metrics.hrv, 50.0);
        assert_eq!(metrics.resting_heart_rate, 58.0);
        assert_eq!(metrics.sleep_percentage, 75);
        assert_eq!(metrics.exertion_score, 5.0);
        assert_eq!(metrics.energy_balance, 1750.0);
    }

    #[test]
    fn test_cache_decision() {
        let config = HealthScoringConfig::default();
        let now = at(10, 12);

        assert_eq!(
            cache_decision(None, day(1), false, now, &config),
            CacheDecision::Recompute(RecomputeReason::Missing)
        );

        // Settled day: cached record used even if it was computed just now
        let fresh = cached_metrics(day(8), at(10, 11));
        assert_eq!(
            cache_decision(Some(&fresh), day(8), false, now, &config),
            CacheDecision::UseCached
        );
        assert_eq!(
            cache_decision(Some(&fresh), day(8), true, now, &config),
            CacheDecision::Recompute(RecomputeReason::Forced)
        );

        // Yesterday, computed an hour ago: still open, recompute
        let recent = cached_metrics(day(9), at(10, 11));
        assert_eq!(
            cache_decision(Some(&recent), day(9), false, now, &config),
            CacheDecision::Recompute(RecomputeReason::Stale)
        );

        // Yesterday, computed three days before now
        let old = cached_metrics(day(9), at(7, 11));
        assert_eq!(
            cache_decision(Some(&old), day(9), false, now, &config),
            CacheDecision::UseCached
        );
    }

    #[test]
    fn test_is_settled_day() {
        assert!(is_settled_day(day(8), at(10, 0), 2));
        assert!(!is_settled_day(day(9), at(10, 23), 2));
        assert!(!is_settled_day(day(10), at(10, 23), 2));
    }

    #[test]
    fn test_service_caches_settled_days() {
        let store = MemoryStore::new();
        let mut source = StaticHealthSource::new();
        source.insert(
            day(1),
            RawHealthSample {
                sleep_hours: Some(8.0),
                ..RawHealthSample::default()
            },
        );
        let service = HealthService::new(&store, &store, &source);

        let first = service.get_health_metrics_for_day(day(1), false, Some(at(10, 12))).unwrap();
        assert_eq!(first.sleep_hours, 8.0);
        assert_eq!(store.cached_metrics_count().unwrap(), 1);

        // Later call returns the cached record untouched
        let second = service.get_health_metrics_for_day(day(1), false, Some(at(11, 12))).unwrap();
        assert_eq!(second.last_calculated, at(10, 12));

        let forced = service.get_health_metrics_for_day(day(1), true, Some(at(11, 12))).unwrap();
        assert_eq!(forced.last_calculated, at(11, 12));
    }

    #[test]
    fn test_service_recomputes_today() {
        let store = MemoryStore::new();
        let service = HealthService::new(&store, &store, &NoHealthData);

        service.get_health_metrics_for_day(day(10), false, Some(at(10, 8))).unwrap();
        store.append_session(&create_test_session("s1", at(10, 9), 5_000.0, 3_600)).unwrap();

        let updated = service.get_health_metrics_for_day(day(10), false, Some(at(10, 12))).unwrap();
        assert_eq!(updated.exertion_score, 5.0);
        assert_eq!(updated.last_calculated, at(10, 12));
    }

    #[test]
    fn test_daily_summary() {
        let store = MemoryStore::new();
        let source = StaticHealthSource::from_samples((4..=10).map(|d| {
            (
                day(d),
                RawHealthSample {
                    sleep_hours: Some(d as f64 - 3.0),
                    calories_burned: Some(700.0),
                    ..RawHealthSample::default()
                },
            )
        }));
        store.append_session(&create_test_session("s1", at(10, 18), 4_200.0, 3_000)).unwrap();
        store.append_session(&create_test_session("s2", at(9, 18), 3_000.0, 3_000)).unwrap();

        let service = HealthService::new(&store, &store, &source);
        let summary = service.get_daily_health_summary(day(10), Some(at(10, 21))).unwrap();

        assert_eq!(summary.last_7_days.len(), 7);
        assert_eq!(summary.last_7_days[0].date, day(4));
        assert_eq!(summary.last_7_days[6], summary.metrics);
        // Sleep 1..=7 hours
        assert_eq!(summary.weekly_averages.avg_sleep_hours, 4.0);
        assert_eq!(summary.weekly_averages.avg_calories_burned, 700.0);
        assert_eq!(summary.workout_volume, Some(4_200.0));
        assert_eq!(store.cached_metrics_count().unwrap(), 7);
    }

    #[test]
    fn test_daily_summary_without_workout() {
        let store = MemoryStore::new();
        let service = HealthService::new(&store, &store, &NoHealthData);

        let summary = service.get_daily_health_summary(day(10), Some(at(10, 21))).unwrap();
        assert_eq!(summary.workout_volume, None);
        assert_eq!(summary.weekly_averages.avg_stress, 71.0);
    }

    proptest! {
        #[test]
        fn test_stress_monotonic_in_hrv(
            hrv in 0.0f64..300.0,
            delta in 0.0f64..100.0,
            rhr in 30.0f64..120.0,
        ) {
            let base = calculate_stress_score(hrv, rhr);
            prop_assert!(calculate_stress_score(hrv + delta, rhr) <= base);
        }

        #[test]
        fn test_stress_monotonic_in_rhr(
            rhr in 20.0f64..140.0,
            delta in 0.0f64..50.0,
            hrv in 10.0f64..250.0,
        ) {
            let base = calculate_stress_score(hrv, rhr);
            prop_assert!(calculate_stress_score(hrv, rhr + delta) >= base);
        }

        #[test]
        fn test_scores_bounded(sleep in 0.0f64..16.0, hrv in 0.0f64..400.0, rhr in 0.0f64..200.0) {
            prop_assert!(calculate_stress_score(hrv, rhr) <= 100);
            prop_assert!(calculate_recovery_score(sleep, hrv, rhr) <= 100);
        }

        #[test]
        fn test_exertion_bounded(volume in 0.0f64..100_000.0, minutes in 0.0f64..600.0) {
            let score = calculate_exertion_score(volume, minutes);
            prop_assert!((0.0..=10.0).contains(&score));
        }
    }
}
