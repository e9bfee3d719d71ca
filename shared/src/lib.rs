use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Biological sex used for the electrolyte base values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
    Male,
    Female,
    /// Any value this version does not recognize; uses the non-male bases
    #[serde(other)]
    Unspecified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    Athlete,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseIntensity {
    Low,
    Medium,
    High,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Climate {
    Cool,
    Moderate,
    Hot,
    VeryHot,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Altitude {
    SeaLevel,
    Moderate,
    High,
    #[serde(other)]
    Unknown,
}

/// Unit the user entered their weight in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

// Form values arrive as free text. Unrecognized values never fail, they map
// to the catch-all variant and get neutral treatment downstream.

impl From<&str> for Gender {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" => Gender::Male,
            "female" => Gender::Female,
            _ => Gender::Unspecified,
        }
    }
}

impl From<&str> for ActivityLevel {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "sedentary" => ActivityLevel::Sedentary,
            "light" => ActivityLevel::Light,
            "moderate" => ActivityLevel::Moderate,
            "active" => ActivityLevel::Active,
            "athlete" => ActivityLevel::Athlete,
            _ => ActivityLevel::Unknown,
        }
    }
}

impl From<&str> for ExerciseIntensity {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => ExerciseIntensity::Low,
            "medium" => ExerciseIntensity::Medium,
            "high" => ExerciseIntensity::High,
            _ => ExerciseIntensity::Unknown,
        }
    }
}

impl From<&str> for Climate {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "cool" => Climate::Cool,
            "moderate" => Climate::Moderate,
            "hot" => Climate::Hot,
            "very-hot" | "very_hot" => Climate::VeryHot,
            _ => Climate::Unknown,
        }
    }
}

impl From<&str> for Altitude {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "sea-level" | "sea_level" => Altitude::SeaLevel,
            "moderate" => Altitude::Moderate,
            "high" => Altitude::High,
            _ => Altitude::Unknown,
        }
    }
}

impl From<&str> for WeightUnit {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "lb" | "lbs" => WeightUnit::Lb,
            _ => WeightUnit::Kg,
        }
    }
}

/// Health conditions that adjust the water requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HealthFlags {
    pub pregnant: bool,
    pub breastfeeding: bool,
    pub illness: bool,
    pub kidney_disease: bool,
}

impl HealthFlags {
    /// Number of conditions currently flagged
    pub fn active_count(&self) -> usize {
        [self.pregnant, self.breastfeeding, self.illness, self.kidney_disease]
            .iter()
            .filter(|flag| **flag)
            .count()
    }
}

/// Validated physiological and environmental inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Body weight in kilograms, after unit conversion
    pub weight_kg: f64,
    pub age: u32,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    /// Daily exercise duration (0..=1440)
    pub exercise_minutes: u32,
    pub exercise_intensity: ExerciseIntensity,
    pub climate: Climate,
    pub altitude: Altitude,
    #[serde(default)]
    pub flags: HealthFlags,
}

/// Raw form input as the presentation layer collects it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProfileInput {
    pub weight: String,
    pub weight_unit: String,
    pub age: String,
    pub gender: String,
    pub activity_level: String,
    pub exercise_minutes: String,
    pub exercise_intensity: String,
    pub climate: String,
    pub altitude: String,
    #[serde(default)]
    pub flags: HealthFlags,
}

/// Daily electrolyte targets in milligrams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Electrolytes {
    pub sodium_mg: u32,
    pub potassium_mg: u32,
    pub magnesium_mg: u32,
    pub calcium_mg: u32,
}

/// Daily targets derived from the most recent calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goals {
    pub water_ml: u32,
    pub sodium_mg: u32,
    pub potassium_mg: u32,
    pub magnesium_mg: u32,
    pub calcium_mg: u32,
    /// When the goals were calculated (RFC 3339); absent in older saves
    #[serde(default)]
    pub calculated_at: Option<String>,
}

impl Goals {
    pub fn new(water_ml: u32, electrolytes: Electrolytes, calculated_at: Option<String>) -> Self {
        Self {
            water_ml,
            sodium_mg: electrolytes.sodium_mg,
            potassium_mg: electrolytes.potassium_mg,
            magnesium_mg: electrolytes.magnesium_mg,
            calcium_mg: electrolytes.calcium_mg,
            calculated_at,
        }
    }

    pub fn electrolytes(&self) -> Electrolytes {
        Electrolytes {
            sodium_mg: self.sodium_mg,
            potassium_mg: self.potassium_mg,
            magnesium_mg: self.magnesium_mg,
            calcium_mg: self.calcium_mg,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Info,
    Warning,
}

/// Kind of guidance message, in the order they are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationKind {
    Distribution,
    HighWaterVolume,
    KidneyCap,
    LongExercise,
    HotClimate,
    SodiumSources,
    PotassiumSources,
    MagnesiumSources,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub severity: Severity,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// Sedentary activity level with more than an hour of exercise
    ActivityMismatch,
    /// High intensity exercise for a child under 12
    YouthHighIntensity,
    /// Two or more health conditions flagged at once
    MultipleConditions,
}

/// Advisory note about a contradictory or risky input combination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyWarning {
    pub kind: WarningKind,
    pub message: String,
}

/// A single recorded drink
///
/// Entry ID format: UUID v4 string. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeEntry {
    /// Stable identifier; empty in ledgers written before IDs existed
    #[serde(default)]
    pub id: String,
    pub amount_ml: u32,
    /// Local wall-clock time the entry was recorded (HH:MM)
    pub time_label: String,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

impl IntakeEntry {
    /// Generate a new stable entry ID
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// All intake entries for one calendar day, in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLedger {
    /// Local calendar date, YYYY-MM-DD
    pub date: String,
    #[serde(default)]
    pub entries: Vec<IntakeEntry>,
}

impl DailyLedger {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            entries: Vec::new(),
        }
    }

    pub fn total_ml(&self) -> u32 {
        self.entries.iter().map(|entry| entry.amount_ml).sum()
    }
}

/// Lifecycle of a day ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LedgerState {
    /// Nothing recorded today (or today was reset)
    Absent,
    /// At least one entry was recorded today, even if all were deleted since
    Active,
}

/// Everything the store keeps between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PersistedState {
    pub profile: Option<Profile>,
    pub goals: Option<Goals>,
    /// Ledgers keyed by YYYY-MM-DD
    #[serde(default)]
    pub ledgers: BTreeMap<String, DailyLedger>,
}

/// Field-level validation failures for user input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationError {
    /// A numeric field was empty or not a number
    NotANumber { field: String, input: String },
    /// Weight after conversion falls outside the supported range
    WeightOutOfRange { weight_kg: f64 },
    AgeOutOfRange(i64),
    ExerciseMinutesOutOfRange(i64),
    /// Intake amount must be 1..=5000 ml
    IntakeAmountOutOfRange(i64),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NotANumber { field, input } => {
                write!(f, "{} must be a number (got '{}')", field, input)
            }
            ValidationError::WeightOutOfRange { weight_kg } => {
                write!(f, "Weight {:.1} kg is outside the supported range (9-136 kg / 20-300 lb)", weight_kg)
            }
            ValidationError::AgeOutOfRange(age) => write!(f, "Age {} must be between 1 and 120", age),
            ValidationError::ExerciseMinutesOutOfRange(minutes) => {
                write!(f, "Exercise minutes {} must be between 0 and 1440", minutes)
            }
            ValidationError::IntakeAmountOutOfRange(amount) => {
                write!(f, "Intake amount {} ml must be between 1 and 5000 ml", amount)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Everything a calculation produces for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub profile: Profile,
    pub water_ml: u32,
    pub electrolytes: Electrolytes,
    pub recommendations: Vec<Recommendation>,
    pub warnings: Vec<ConsistencyWarning>,
}

/// Result of recording a drink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddIntakeResponse {
    pub entry: IntakeEntry,
    pub total_ml: u32,
    pub goal_ml: Option<u32>,
    pub progress_percent: u32,
    /// True only on the add that moved the total from below to at/above the goal
    pub goal_reached: bool,
}

/// Today's tracking view for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingSummary {
    pub date: String,
    pub state: LedgerState,
    /// Entries newest first
    pub entries: Vec<IntakeEntry>,
    pub total_ml: u32,
    pub goal_ml: Option<u32>,
    pub progress_percent: u32,
}

/// Read-only data for the report/export collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    pub generated_at: String,
    pub profile: Option<Profile>,
    pub goals: Option<Goals>,
    pub recommendations: Vec<Recommendation>,
    pub warnings: Vec<ConsistencyWarning>,
    pub today: TrackingSummary,
}

/// One-shot messages the presentation layer shows and dismisses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notice {
    GoalReached { date: String, total_ml: u32, goal_ml: u32 },
    DayRolledOver { previous_date: String, current_date: String },
    StorageDegraded { reason: String },
}
