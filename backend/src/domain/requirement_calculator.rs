//! Requirement calculation domain logic.
//!
//! Turns a validated [`Profile`] into a daily water volume and four
//! electrolyte targets. Every function here is pure and total: categorical
//! values this version does not recognize fall back to a neutral multiplier
//! (1.0) or a zero addend instead of failing, so profiles saved by newer
//! versions still calculate.
//!
//! ## Water
//!
//! ```text
//! base  = weight_kg * 35
//! base *= activity multiplier
//! base += exercise_minutes / 60 * 500 * intensity multiplier
//! base *= climate multiplier
//! base += altitude addend
//! base += 300 pregnant, 700 breastfeeding, 1000 illness
//! base  = min(base, 2000)               kidney disease only
//! water = round(clamp(base, 1500, 10000))
//! ```
//!
//! ## Electrolytes
//!
//! Sodium and potassium grow with sweat losses and climate; magnesium and
//! calcium depend only on gender and age. Each target stays 100 mg below its
//! danger threshold.

use log::debug;
use shared::{ActivityLevel, Altitude, Climate, Electrolytes, ExerciseIntensity, Gender, Profile};

pub const ML_PER_KG: f64 = 35.0;
pub const EXERCISE_ML_PER_HOUR: f64 = 500.0;
pub const MIN_WATER_ML: f64 = 1500.0;
pub const MAX_WATER_ML: f64 = 10000.0;
pub const KIDNEY_DISEASE_CAP_ML: f64 = 2000.0;

pub const PREGNANCY_ADDEND_ML: f64 = 300.0;
pub const BREASTFEEDING_ADDEND_ML: f64 = 700.0;
pub const ILLNESS_ADDEND_ML: f64 = 1000.0;

pub const SODIUM_BASE_MG: f64 = 2000.0;
pub const SODIUM_SWEAT_MG_PER_HOUR: f64 = 1000.0;
pub const POTASSIUM_SWEAT_MG_PER_HOUR: f64 = 200.0;

/// Danger thresholds; targets are clamped to `threshold - SAFETY_MARGIN_MG`
pub const SODIUM_DANGER_MG: f64 = 5000.0;
pub const POTASSIUM_DANGER_MG: f64 = 6000.0;
pub const MAGNESIUM_DANGER_MG: f64 = 700.0;
pub const CALCIUM_DANGER_MG: f64 = 2500.0;
pub const SAFETY_MARGIN_MG: f64 = 100.0;

pub fn activity_multiplier(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 1.0,
        ActivityLevel::Light => 1.1,
        ActivityLevel::Moderate => 1.2,
        ActivityLevel::Active => 1.3,
        ActivityLevel::Athlete => 1.4,
        ActivityLevel::Unknown => 1.0,
    }
}

pub fn intensity_multiplier(intensity: ExerciseIntensity) -> f64 {
    match intensity {
        ExerciseIntensity::Low => 0.8,
        ExerciseIntensity::Medium => 1.0,
        ExerciseIntensity::High => 1.3,
        ExerciseIntensity::Unknown => 1.0,
    }
}

pub fn water_climate_multiplier(climate: Climate) -> f64 {
    match climate {
        Climate::Cool | Climate::Moderate => 1.0,
        Climate::Hot => 1.2,
        Climate::VeryHot => 1.4,
        Climate::Unknown => 1.0,
    }
}

pub fn altitude_addend_ml(altitude: Altitude) -> f64 {
    match altitude {
        Altitude::SeaLevel => 0.0,
        Altitude::Moderate => 500.0,
        Altitude::High => 1000.0,
        Altitude::Unknown => 0.0,
    }
}

pub fn sweat_multiplier(intensity: ExerciseIntensity) -> f64 {
    match intensity {
        ExerciseIntensity::Low => 0.5,
        ExerciseIntensity::Medium => 1.0,
        ExerciseIntensity::High => 1.5,
        ExerciseIntensity::Unknown => 1.0,
    }
}

pub fn electrolyte_climate_multiplier(climate: Climate) -> f64 {
    match climate {
        Climate::Cool | Climate::Moderate => 1.0,
        Climate::Hot => 1.15,
        Climate::VeryHot => 1.3,
        Climate::Unknown => 1.0,
    }
}

/// Stateless calculator for daily water and electrolyte requirements
#[derive(Clone, Default)]
pub struct RequirementCalculator;

impl RequirementCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Daily water requirement in millilitres, always within 1500..=10000
    pub fn calculate_water(&self, profile: &Profile) -> u32 {
        let mut base = profile.weight_kg * ML_PER_KG;
        base *= activity_multiplier(profile.activity_level);

        let exercise_hours = f64::from(profile.exercise_minutes) / 60.0;
        base += exercise_hours * EXERCISE_ML_PER_HOUR * intensity_multiplier(profile.exercise_intensity);

        base *= water_climate_multiplier(profile.climate);
        base += altitude_addend_ml(profile.altitude);

        if profile.flags.pregnant {
            base += PREGNANCY_ADDEND_ML;
        }
        if profile.flags.breastfeeding {
            base += BREASTFEEDING_ADDEND_ML;
        }
        if profile.flags.illness {
            base += ILLNESS_ADDEND_ML;
        }

        // Kidney cap overrides every adjustment above
        if profile.flags.kidney_disease {
            base = base.min(KIDNEY_DISEASE_CAP_ML);
        }

        let water_ml = clamp_non_finite(base, MIN_WATER_ML, MAX_WATER_ML).round() as u32;
        debug!("Calculated water requirement: {} ml (raw {:.1})", water_ml, base);
        water_ml
    }

    /// Daily electrolyte targets in milligrams
    pub fn calculate_electrolytes(&self, profile: &Profile) -> Electrolytes {
        let is_male = profile.gender == Gender::Male;

        let mut sodium = SODIUM_BASE_MG;
        let mut potassium = if is_male { 3400.0 } else { 2600.0 };
        let magnesium = if is_male { 420.0 } else { 320.0 };
        let calcium = if profile.age >= 65 { 1200.0 } else { 1000.0 };

        let exercise_hours = f64::from(profile.exercise_minutes) / 60.0;
        let sweat = sweat_multiplier(profile.exercise_intensity);
        sodium += exercise_hours * SODIUM_SWEAT_MG_PER_HOUR * sweat;
        potassium += exercise_hours * POTASSIUM_SWEAT_MG_PER_HOUR * sweat;

        let climate = electrolyte_climate_multiplier(profile.climate);
        sodium *= climate;
        potassium *= climate;

        let electrolytes = Electrolytes {
            sodium_mg: cap_below_danger(sodium, SODIUM_DANGER_MG),
            potassium_mg: cap_below_danger(potassium, POTASSIUM_DANGER_MG),
            magnesium_mg: cap_below_danger(magnesium, MAGNESIUM_DANGER_MG),
            calcium_mg: cap_below_danger(calcium, CALCIUM_DANGER_MG),
        };
        debug!("Calculated electrolytes: {:?}", electrolytes);
        electrolytes
    }
}

fn cap_below_danger(value: f64, danger_threshold: f64) -> u32 {
    clamp_non_finite(value, 0.0, danger_threshold - SAFETY_MARGIN_MG).round() as u32
}

/// Clamp that also maps NaN to the lower bound
fn clamp_non_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}
