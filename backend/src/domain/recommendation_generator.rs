//! Recommendation generation domain logic.
//!
//! Produces the ordered list of guidance messages shown next to the computed
//! targets. Order is fixed:
//!
//! 1. distribution tip (always)
//! 2. high water volume warning (water >= 5000 ml)
//! 3. kidney disease cap notice
//! 4. long exercise tip (> 60 minutes)
//! 5. dehydration signs warning (hot / very hot climate)
//! 6. sodium food sources (sodium > 3000 mg)
//! 7. potassium food sources (always)
//! 8. magnesium food sources (always)

use shared::{Climate, Electrolytes, Profile, Recommendation, RecommendationKind, Severity};

pub const HIGH_WATER_THRESHOLD_ML: u32 = 5000;
pub const LONG_EXERCISE_MINUTES: u32 = 60;
pub const HIGH_SODIUM_THRESHOLD_MG: u32 = 3000;
/// Servings the daily volume is split into for the distribution tip
pub const DAILY_SERVINGS: u32 = 8;

#[derive(Clone, Default)]
pub struct RecommendationGenerator;

impl RecommendationGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, profile: &Profile, water_ml: u32, electrolytes: &Electrolytes) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        let per_serving = (f64::from(water_ml) / f64::from(DAILY_SERVINGS)).round() as u32;
        recommendations.push(info(
            RecommendationKind::Distribution,
            format!(
                "Spread your intake through the day: drink about {} ml every 1-2 hours rather than large amounts at once.",
                per_serving
            ),
        ));

        if water_ml >= HIGH_WATER_THRESHOLD_ML {
            recommendations.push(warning(
                RecommendationKind::HighWaterVolume,
                format!(
                    "Your estimated requirement of {} ml is very high. Never drink more than about 1 litre per hour, \
                     and include electrolytes to avoid hyponatremia.",
                    water_ml
                ),
            ));
        }

        if profile.flags.kidney_disease {
            recommendations.push(warning(
                RecommendationKind::KidneyCap,
                "Your water target is capped at 2000 ml because of kidney disease. Follow the fluid limit set by your nephrologist."
                    .to_string(),
            ));
        }

        if profile.exercise_minutes > LONG_EXERCISE_MINUTES {
            recommendations.push(info(
                RecommendationKind::LongExercise,
                "For exercise longer than an hour, drink 150-250 ml every 15-20 minutes and consider an electrolyte drink."
                    .to_string(),
            ));
        }

        if matches!(profile.climate, Climate::Hot | Climate::VeryHot) {
            recommendations.push(warning(
                RecommendationKind::HotClimate,
                "In hot weather watch for signs of dehydration: dark urine, dizziness, headache, dry mouth and fatigue."
                    .to_string(),
            ));
        }

        if electrolytes.sodium_mg > HIGH_SODIUM_THRESHOLD_MG {
            recommendations.push(info(
                RecommendationKind::SodiumSources,
                format!(
                    "To reach {} mg of sodium, add salty foods such as broth, salted nuts, pickles or an electrolyte drink.",
                    electrolytes.sodium_mg
                ),
            ));
        }

        recommendations.push(info(
            RecommendationKind::PotassiumSources,
            format!(
                "Potassium ({} mg): bananas, potatoes, spinach, beans, avocado and yogurt.",
                electrolytes.potassium_mg
            ),
        ));

        recommendations.push(info(
            RecommendationKind::MagnesiumSources,
            format!(
                "Magnesium ({} mg): nuts, seeds, whole grains, leafy greens and dark chocolate.",
                electrolytes.magnesium_mg
            ),
        ));

        recommendations
    }
}

fn info(kind: RecommendationKind, text: String) -> Recommendation {
    Recommendation {
        kind,
        severity: Severity::Info,
        text,
    }
}

fn warning(kind: RecommendationKind, text: String) -> Recommendation {
    Recommendation {
        kind,
        severity: Severity::Warning,
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{ActivityLevel, Altitude, ExerciseIntensity, Gender, HealthFlags};

    fn profile() -> Profile {
        Profile {
            weight_kg: 70.0,
            age: 30,
            gender: Gender::Male,
            activity_level: ActivityLevel::Sedentary,
            exercise_minutes: 0,
            exercise_intensity: ExerciseIntensity::Medium,
            climate: Climate::Moderate,
            altitude: Altitude::SeaLevel,
            flags: HealthFlags::default(),
        }
    }

    fn electrolytes() -> Electrolytes {
        Electrolytes {
            sodium_mg: 2000,
            potassium_mg: 3400,
            magnesium_mg: 420,
            calcium_mg: 1000,
        }
    }

    fn kinds(recommendations: &[Recommendation]) -> Vec<RecommendationKind> {
        recommendations.iter().map(|r| r.kind).collect()
    }

    #[test]
    fn test_minimal_recommendations() {
        let generated = RecommendationGenerator::new().generate(&profile(), 2450, &electrolytes());
        assert_eq!(
            kinds(&generated),
            vec![
                RecommendationKind::Distribution,
                RecommendationKind::PotassiumSources,
                RecommendationKind::MagnesiumSources,
            ]
        );
        assert!(generated.iter().all(|r| r.severity == Severity::Info));
        // 2450 / 8 = 306.25
        assert!(generated[0].text.contains("306 ml"));
        assert!(generated[1].text.contains("3400 mg"));
        assert!(generated[2].text.contains("420 mg"));
    }

    #[test]
    fn test_every_conditional_in_fixed_order() {
        let profile = Profile {
            exercise_minutes: 90,
            climate: Climate::VeryHot,
            flags: HealthFlags {
                kidney_disease: true,
                ..Default::default()
            },
            ..profile()
        };
        let electrolytes = Electrolytes {
            sodium_mg: 3500,
            ..electrolytes()
        };
        let generated = RecommendationGenerator::new().generate(&profile, 5000, &electrolytes);
        assert_eq!(
            kinds(&generated),
            vec![
                RecommendationKind::Distribution,
                RecommendationKind::HighWaterVolume,
                RecommendationKind::KidneyCap,
                RecommendationKind::LongExercise,
                RecommendationKind::HotClimate,
                RecommendationKind::SodiumSources,
                RecommendationKind::PotassiumSources,
                RecommendationKind::MagnesiumSources,
            ]
        );

        let severities: Vec<Severity> = generated.iter().map(|r| r.severity).collect();
        assert_eq!(
            severities,
            vec![
                Severity::Info,
                Severity::Warning,
                Severity::Warning,
                Severity::Info,
                Severity::Warning,
                Severity::Info,
                Severity::Info,
                Severity::Info,
            ]
        );
    }

    #[test]
    fn test_thresholds_are_exclusive_where_specified() {
        let generator = RecommendationGenerator::new();
        let at_limits = Profile {
            exercise_minutes: 60,
            ..profile()
        };
        let electrolytes = Electrolytes {
            sodium_mg: 3000,
            ..electrolytes()
        };
        let generated = generator.generate(&at_limits, 4999, &electrolytes);
        assert_eq!(generated.len(), 3);
    }

    #[test]
    fn test_hot_climate_warning() {
        let hot = Profile {
            climate: Climate::Hot,
            ..profile()
        };
        let generated = RecommendationGenerator::new().generate(&hot, 2940, &electrolytes());
        assert!(kinds(&generated).contains(&RecommendationKind::HotClimate));

        let cool = Profile {
            climate: Climate::Cool,
            ..profile()
        };
        let generated = RecommendationGenerator::new().generate(&cool, 2450, &electrolytes());
        assert!(!kinds(&generated).contains(&RecommendationKind::HotClimate));
    }
}
