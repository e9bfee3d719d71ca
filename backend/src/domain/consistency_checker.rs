//! Consistency checks for contradictory or risky profile combinations.
//!
//! Every rule is evaluated independently and warnings come back in rule
//! order. Warnings are advisory only and never block a calculation.

use shared::{ActivityLevel, ConsistencyWarning, ExerciseIntensity, Profile, WarningKind};

/// More exercise than this contradicts a sedentary activity level
pub const SEDENTARY_EXERCISE_LIMIT_MINUTES: u32 = 60;
/// Children below this age need supervision for high intensity exercise
pub const SUPERVISION_AGE: u32 = 12;
pub const MULTI_CONDITION_THRESHOLD: usize = 2;

#[derive(Clone, Default)]
pub struct ConsistencyChecker;

impl ConsistencyChecker {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, profile: &Profile) -> Vec<ConsistencyWarning> {
        let mut warnings = Vec::new();

        if profile.activity_level == ActivityLevel::Sedentary
            && profile.exercise_minutes > SEDENTARY_EXERCISE_LIMIT_MINUTES
        {
            warnings.push(ConsistencyWarning {
                kind: WarningKind::ActivityMismatch,
                message: format!(
                    "You selected a sedentary activity level but reported {} minutes of exercise. \
                     Consider choosing a higher activity level for a more accurate estimate.",
                    profile.exercise_minutes
                ),
            });
        }

        if profile.age < SUPERVISION_AGE && profile.exercise_intensity == ExerciseIntensity::High {
            warnings.push(ConsistencyWarning {
                kind: WarningKind::YouthHighIntensity,
                message: "High intensity exercise for children under 12 should be supervised by an adult, \
                          with regular drink breaks."
                    .to_string(),
            });
        }

        if profile.flags.active_count() >= MULTI_CONDITION_THRESHOLD {
            warnings.push(ConsistencyWarning {
                kind: WarningKind::MultipleConditions,
                message: "Several health conditions are selected. Please consult a healthcare professional \
                          about your fluid and electrolyte needs."
                    .to_string(),
            });
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Altitude, Climate, Gender, HealthFlags};

    fn profile() -> Profile {
        Profile {
            weight_kg: 70.0,
            age: 30,
            gender: Gender::Female,
            activity_level: ActivityLevel::Moderate,
            exercise_minutes: 30,
            exercise_intensity: ExerciseIntensity::Medium,
            climate: Climate::Moderate,
            altitude: Altitude::SeaLevel,
            flags: HealthFlags::default(),
        }
    }

    fn kinds(warnings: &[ConsistencyWarning]) -> Vec<WarningKind> {
        warnings.iter().map(|w| w.kind).collect()
    }

    #[test]
    fn test_consistent_profile_has_no_warnings() {
        assert!(ConsistencyChecker::new().check(&profile()).is_empty());
    }

    #[test]
    fn test_sedentary_with_long_exercise() {
        let checker = ConsistencyChecker::new();

        let at_limit = Profile {
            activity_level: ActivityLevel::Sedentary,
            exercise_minutes: 60,
            ..profile()
        };
        assert!(checker.check(&at_limit).is_empty());

        let over_limit = Profile { exercise_minutes: 61, ..at_limit };
        let warnings = checker.check(&over_limit);
        assert_eq!(kinds(&warnings), vec![WarningKind::ActivityMismatch]);
        assert!(warnings[0].message.contains("61 minutes"));
    }

    #[test]
    fn test_child_with_high_intensity() {
        let checker = ConsistencyChecker::new();
        let child = Profile {
            age: 11,
            exercise_intensity: ExerciseIntensity::High,
            ..profile()
        };
        assert_eq!(kinds(&checker.check(&child)), vec![WarningKind::YouthHighIntensity]);

        let twelve = Profile { age: 12, ..child };
        assert!(checker.check(&twelve).is_empty());
    }

    #[test]
    fn test_single_condition_is_not_flagged() {
        let checker = ConsistencyChecker::new();
        let pregnant = Profile {
            flags: HealthFlags {
                pregnant: true,
                ..Default::default()
            },
            ..profile()
        };
        assert!(checker.check(&pregnant).is_empty());
    }

    #[test]
    fn test_all_rules_fire_in_order() {
        let checker = ConsistencyChecker::new();
        let everything = Profile {
            age: 10,
            activity_level: ActivityLevel::Sedentary,
            exercise_minutes: 120,
            exercise_intensity: ExerciseIntensity::High,
            flags: HealthFlags {
                illness: true,
                kidney_disease: true,
                ..Default::default()
            },
            ..profile()
        };
        assert_eq!(
            kinds(&checker.check(&everything)),
            vec![
                WarningKind::ActivityMismatch,
                WarningKind::YouthHighIntensity,
                WarningKind::MultipleConditions,
            ]
        );
    }
}
