//! Weight unit conversion between kilograms and pounds.

use shared::WeightUnit;

/// Kilograms per international avoirdupois pound
pub const KG_PER_LB: f64 = 0.453_592_37;

pub fn lb_to_kg(pounds: f64) -> f64 {
    pounds * KG_PER_LB
}

pub fn kg_to_lb(kilograms: f64) -> f64 {
    kilograms / KG_PER_LB
}

/// Convert a weight entered in `unit` to kilograms
pub fn to_kg(value: f64, unit: WeightUnit) -> f64 {
    match unit {
        WeightUnit::Kg => value,
        WeightUnit::Lb => lb_to_kg(value),
    }
}
