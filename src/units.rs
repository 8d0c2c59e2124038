//! Weight unit conversion and equipment-realistic rounding

use crate::models::WeightUnit;

/// Kilograms to pounds factor
pub const KG_TO_LBS: f64 = 2.20462;

/// Pounds to kilograms factor
pub const LBS_TO_KG: f64 = 0.453592;

/// Convert a weight between units. No rounding is applied.
pub fn convert_weight(weight: f64, from: WeightUnit, to: WeightUnit) -> f64 {
    match (from, to) {
        (WeightUnit::Kg, WeightUnit::Lbs) => weight * KG_TO_LBS,
        (WeightUnit::Lbs, WeightUnit::Kg) => weight * LBS_TO_KG,
        _ => weight,
    }
}

/// Round to the smallest practical increment: 0.5 kg or 1 lb
pub fn round_weight(weight: f64, unit: WeightUnit) -> f64 {
    match unit {
        WeightUnit::Kg => (weight * 2.0).round() / 2.0,
        WeightUnit::Lbs => weight.round(),
    }
}

/// Format a weight for display, e.g. `"82.5 kg"`
pub fn format_weight(weight: f64, unit: WeightUnit, decimals: usize) -> String {
    format!("{:.*} {}", decimals, weight, unit)
}
