//! Profile service domain logic.
//!
//! Validates the raw profile form, runs the calculation engines and stores
//! the resulting profile and goals.
//!
//! ## Business Rules
//!
//! - Weight must be a number and convert to 9-136 kg (20-300 lb)
//! - Age is a whole number from 1 to 120
//! - Exercise minutes is a whole number from 0 to 1440; blank means 0
//! - Categorical fields never fail validation; unknown values are neutral
//! - Every successful calculation replaces the stored goals and runs the
//!   ledger retention sweep

use log::{info, warn};
use shared::{CalculationResult, Goals, Profile, ProfileInput, ValidationError, WeightUnit};
use std::sync::Arc;

use crate::domain::clock::Clock;
use crate::domain::consistency_checker::ConsistencyChecker;
use crate::domain::models::errors::TrackerError;
use crate::domain::recommendation_generator::RecommendationGenerator;
use crate::domain::requirement_calculator::RequirementCalculator;
use crate::domain::unit_converter;
use crate::storage::StateRepository;

pub const MIN_WEIGHT_KG: f64 = 9.0;
/// 300 lb is 136.08 kg
pub const MAX_WEIGHT_KG: f64 = 136.1;
pub const MIN_AGE: i64 = 1;
pub const MAX_AGE: i64 = 120;
pub const MAX_EXERCISE_MINUTES: i64 = 1440;

#[derive(Clone)]
pub struct ProfileService {
    repository: Arc<StateRepository>,
    clock: Arc<dyn Clock>,
    retention_days: u32,
    calculator: RequirementCalculator,
    checker: ConsistencyChecker,
    generator: RecommendationGenerator,
}

impl ProfileService {
    pub fn new(repository: Arc<StateRepository>, clock: Arc<dyn Clock>, retention_days: u32) -> Self {
        Self {
            repository,
            clock,
            retention_days,
            calculator: RequirementCalculator::new(),
            checker: ConsistencyChecker::new(),
            generator: RecommendationGenerator::new(),
        }
    }

    /// Validate raw form input into a [`Profile`], collecting every field error
    pub fn validate(&self, input: &ProfileInput) -> Result<Profile, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let weight_kg = match parse_number::<f64>("weight", &input.weight) {
            Ok(weight) if weight.is_finite() => {
                let weight_kg = unit_converter::to_kg(weight, WeightUnit::from(input.weight_unit.as_str()));
                if (MIN_WEIGHT_KG..=MAX_WEIGHT_KG).contains(&weight_kg) {
                    Some(weight_kg)
                } else {
                    errors.push(ValidationError::WeightOutOfRange { weight_kg });
                    None
                }
            }
            Ok(_) => {
                errors.push(ValidationError::NotANumber {
                    field: "weight".to_string(),
                    input: input.weight.trim().to_string(),
                });
                None
            }
            Err(e) => {
                errors.push(e);
                None
            }
        };

        let age = match parse_number::<i64>("age", &input.age) {
            Ok(age) if (MIN_AGE..=MAX_AGE).contains(&age) => Some(age as u32),
            Ok(age) => {
                errors.push(ValidationError::AgeOutOfRange(age));
                None
            }
            Err(e) => {
                errors.push(e);
                None
            }
        };

        let exercise_minutes = if input.exercise_minutes.trim().is_empty() {
            Some(0)
        } else {
            match parse_number::<i64>("exercise minutes", &input.exercise_minutes) {
                Ok(minutes) if (0..=MAX_EXERCISE_MINUTES).contains(&minutes) => Some(minutes as u32),
                Ok(minutes) => {
                    errors.push(ValidationError::ExerciseMinutesOutOfRange(minutes));
                    None
                }
                Err(e) => {
                    errors.push(e);
                    None
                }
            }
        };

        match (weight_kg, age, exercise_minutes) {
            (Some(weight_kg), Some(age), Some(exercise_minutes)) if errors.is_empty() => Ok(Profile {
                weight_kg,
                age,
                gender: input.gender.as_str().into(),
                activity_level: input.activity_level.as_str().into(),
                exercise_minutes,
                exercise_intensity: input.exercise_intensity.as_str().into(),
                climate: input.climate.as_str().into(),
                altitude: input.altitude.as_str().into(),
                flags: input.flags,
            }),
            _ => Err(errors),
        }
    }

    /// Run all three engines over an already validated profile
    pub fn evaluate(&self, profile: &Profile) -> CalculationResult {
        let water_ml = self.calculator.calculate_water(profile);
        let electrolytes = self.calculator.calculate_electrolytes(profile);
        let warnings = self.checker.check(profile);
        let recommendations = self.generator.generate(profile, water_ml, &electrolytes);

        CalculationResult {
            profile: profile.clone(),
            water_ml,
            electrolytes,
            recommendations,
            warnings,
        }
    }

    /// Validate, calculate and persist a new profile
    pub fn calculate(&self, input: &ProfileInput) -> Result<CalculationResult, TrackerError> {
        let profile = self.validate(input).map_err(TrackerError::Validation)?;
        let result = self.evaluate(&profile);

        let goals = Goals::new(result.water_ml, result.electrolytes, Some(self.clock.now().to_rfc3339()));
        let cutoff = self.clock.date_days_ago(self.retention_days);
        let pruned = self.repository.save_calculation(&profile, &goals, &cutoff)?;

        info!(
            "Calculated {} ml water with {} warning(s); pruned {} old ledger(s)",
            result.water_ml,
            result.warnings.len(),
            pruned
        );
        Ok(result)
    }

    pub fn current_profile(&self) -> Option<Profile> {
        self.repository.load_profile()
    }

    pub fn current_goals(&self) -> Option<Goals> {
        self.repository.load_goals()
    }

    /// Rebuild the last calculation from the stored profile and goals
    ///
    /// Targets come from the stored goals when present, so the result always
    /// agrees with the goal the tracker measures against. Warnings are
    /// re-derived from the profile.
    pub fn stored_result(&self) -> Option<CalculationResult> {
        let profile = self.current_profile()?;
        let mut result = self.evaluate(&profile);
        if let Some(goals) = self.current_goals() {
            self.apply_goals(&mut result, &goals);
        }
        Some(result)
    }

    /// [`stored_result`](Self::stored_result), re-saving goals that are
    /// missing or unreadable next to a valid profile
    pub fn restore(&self) -> Result<Option<CalculationResult>, TrackerError> {
        let Some(profile) = self.current_profile() else {
            return Ok(None);
        };
        let mut result = self.evaluate(&profile);

        match self.current_goals() {
            Some(goals) => self.apply_goals(&mut result, &goals),
            None => {
                warn!("Stored profile has no readable goals; saving {} ml from the profile", result.water_ml);
                let goals = Goals::new(result.water_ml, result.electrolytes, Some(self.clock.now().to_rfc3339()));
                self.repository.save_goals(&goals, &self.clock.date_days_ago(self.retention_days))?;
            }
        }
        Ok(Some(result))
    }

    fn apply_goals(&self, result: &mut CalculationResult, goals: &Goals) {
        result.water_ml = goals.water_ml;
        result.electrolytes = goals.electrolytes();
        result.recommendations = self.generator.generate(&result.profile, goals.water_ml, &result.electrolytes);
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, input: &str) -> Result<T, ValidationError> {
    let trimmed = input.trim();
    trimmed.parse::<T>().map_err(|_| ValidationError::NotANumber {
        field: field.to_string(),
        input: trimmed.to_string(),
    })
}
