//! Barbell plate loading
//!
//! Works out which plates go on each side of the bar for a target load.
//! The search is a greedy pass over the plate denominations from heaviest to
//! lightest, taking as many of each as fit. Both standard inventories are
//! canonical systems (every plate is a multiple of the smallest one), so the
//! greedy answer is also the minimal one for any reachable target.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::WeightUnit;

/// Leftover weight per side that is still accepted as an exact match
pub const PLATE_TOLERANCE: f64 = 0.1;

/// Bar weight and available plates (one side) for a single unit system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateSet {
    /// Empty barbell weight
    pub bar_weight: f64,

    /// Plate denominations, heaviest first
    pub plates: Vec<f64>,
}

impl PlateSet {
    /// Olympic kilogram set: 20 kg bar, 20/15/10/5/2.5/1.25 plates
    pub fn standard_kg() -> Self {
        PlateSet {
            bar_weight: 20.0,
            plates: vec![20.0, 15.0, 10.0, 5.0, 2.5, 1.25],
        }
    }

    /// Pound set: 45 lb bar, 45/35/25/10/5/2.5 plates
    pub fn standard_lbs() -> Self {
        PlateSet {
            bar_weight: 45.0,
            plates: vec![45.0, 35.0, 25.0, 10.0, 5.0, 2.5],
        }
    }
}

/// Plate inventories per unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateConfig {
    pub kg: PlateSet,
    pub lbs: PlateSet,
}

impl Default for PlateConfig {
    fn default() -> Self {
        PlateConfig {
            kg: PlateSet::standard_kg(),
            lbs: PlateSet::standard_lbs(),
        }
    }
}

impl PlateConfig {
    pub fn for_unit(&self, unit: WeightUnit) -> &PlateSet {
        match unit {
            WeightUnit::Kg => &self.kg,
            WeightUnit::Lbs => &self.lbs,
        }
    }
}

/// Number of plates of one denomination on a single side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlateCount {
    pub weight: f64,
    pub count: u32,
}

/// Result of a plate calculation. Callers must check `is_valid` before
/// relying on `plates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateCalculation {
    pub is_valid: bool,

    /// Plates for ONE side of the bar, heaviest first
    pub plates: Vec<PlateCount>,

    /// Weight accounted for on each side
    pub total_per_side: f64,

    pub error_message: Option<String>,
}

impl PlateCalculation {
    fn invalid(plates: Vec<PlateCount>, total_per_side: f64, message: String) -> Self {
        PlateCalculation {
            is_valid: false,
            plates,
            total_per_side,
            error_message: Some(message),
        }
    }
}

/// Plate loading calculator
pub struct PlateCalculator {
    config: PlateConfig,
}

impl PlateCalculator {
    /// Calculator with the standard kg/lbs inventories
    pub fn new() -> Self {
        PlateCalculator {
            config: PlateConfig::default(),
        }
    }

    /// Calculator with a custom bar/plate inventory
    pub fn with_config(config: PlateConfig) -> Self {
        PlateCalculator { config }
    }

    /// Compute the plates per side needed to reach `target_weight`
    pub fn calculate(&self, target_weight: f64, unit: WeightUnit) -> PlateCalculation {
        let set = self.config.for_unit(unit);
        let bar_weight = set.bar_weight;

        if !target_weight.is_finite() {
            return PlateCalculation::invalid(
                Vec::new(),
                0.0,
                format!("Invalid target weight: {}", target_weight),
            );
        }

        if target_weight < bar_weight {
            return PlateCalculation::invalid(
                Vec::new(),
                0.0,
                format!("Weight must be at least {}{} (barbell weight)", bar_weight, unit),
            );
        }

        let weight_per_side = (target_weight - bar_weight) / 2.0;
        let mut remaining = weight_per_side;
        let mut plates = Vec::new();

        for &plate in &set.plates {
            if plate <= 0.0 || remaining < plate {
                continue;
            }
            let count = (remaining / plate).floor();
            plates.push(PlateCount {
                weight: plate,
                count: count as u32,
            });
            remaining -= count * plate;
        }

        if remaining > PLATE_TOLERANCE {
            let matched = weight_per_side - remaining;
            let closest = bar_weight + matched * 2.0;
            warn!(
                target = target_weight,
                closest,
                unit = %unit,
                "Target weight cannot be loaded exactly"
            );
            return PlateCalculation::invalid(
                plates,
                matched,
                format!(
                    "Cannot load exactly {}{}. Closest: {}{}",
                    target_weight, unit, closest, unit
                ),
            );
        }

        debug!(target = target_weight, unit = %unit, plates = plates.len(), "Plates calculated");

        PlateCalculation {
            is_valid: true,
            plates,
            total_per_side: weight_per_side,
            error_message: None,
        }
    }
}

impl Default for PlateCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Plates per side with the standard inventory for `unit`
pub fn calculate_plates(target_weight: f64, unit: WeightUnit) -> PlateCalculation {
    PlateCalculator::new().calculate(target_weight, unit)
}

/// Readable description, e.g. `"Each side: 1×20kg, 2×5kg, 1×2.5kg"`
pub fn format_plate_calculation(calculation: &PlateCalculation, unit: WeightUnit) -> String {
    if !calculation.is_valid {
        return calculation
            .error_message
            .clone()
            .unwrap_or_else(|| "Cannot calculate plates".to_string());
    }

    if calculation.plates.is_empty() {
        return "No plates needed (bar only)".to_string();
    }

    let plates = calculation
        .plates
        .iter()
        .map(|p| format!("{}×{}{}", p.count, p.weight, unit))
        .collect::<Vec<_>>()
        .join(", ");

    format!("Each side: {}", plates)
}

/// Compact form for quick reference, e.g. `"2×20 + 1×5 + 1×2.5"`
pub fn format_plate_compact(calculation: &PlateCalculation) -> String {
    if !calculation.is_valid || calculation.plates.is_empty() {
        return String::new();
    }

    calculation
        .plates
        .iter()
        .map(|p| format!("{}×{}", p.count, p.weight))
        .collect::<Vec<_>>()
        .join(" + ")
}
