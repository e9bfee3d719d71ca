//! # Domain Module
//!
//! Contains all business logic for the hydration tracker.
//!
//! The calculation engines are pure functions of a [`shared::Profile`]; the
//! services layer them over the [`crate::storage::StateRepository`] and an
//! injected [`clock::Clock`]. Nothing here knows about any user interface.
//!
//! ## Module Organization
//!
//! - **unit_converter**: Pound/kilogram conversion
//! - **requirement_calculator**: Daily water and electrolyte targets
//! - **consistency_checker**: Warnings for implausible profile combinations
//! - **recommendation_generator**: Ordered guidance messages
//! - **profile_service**: Form validation, calculation and goal persistence
//! - **tracking_service**: Today's intake ledger and the day boundary
//! - **report_service**: Read-only snapshot and CSV history export
//! - **clock**: Wall-clock abstraction so the day boundary is testable
//!
//! ## Business Rules
//!
//! - Calculations never fail; out-of-range intermediate values are clamped
//! - Unknown categorical values use neutral multipliers
//! - Only the most recent calculation's goals are kept
//! - Ledgers older than the retention window are pruned on every save

pub mod clock;
pub mod consistency_checker;
pub mod models;
pub mod profile_service;
pub mod recommendation_generator;
pub mod report_service;
pub mod requirement_calculator;
pub mod tracking_service;
pub mod unit_converter;

pub use clock::{Clock, FixedClock, SystemClock};
pub use consistency_checker::ConsistencyChecker;
pub use models::errors::TrackerError;
pub use profile_service::ProfileService;
pub use recommendation_generator::RecommendationGenerator;
pub use report_service::ReportService;
pub use requirement_calculator::RequirementCalculator;
pub use tracking_service::{DayRollover, TrackingService};
