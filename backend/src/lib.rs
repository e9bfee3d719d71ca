//! # Hydration Backend
//!
//! Non-UI logic for the hydration tracker: daily water and electrolyte
//! requirements from a personal profile, and a per-day intake ledger
//! tracked against the resulting goal.
//!
//! ## Architecture
//!
//! ```text
//! Presentation (any UI)
//!     ↓
//! IO Layer (action dispatch, view state)
//!     ↓
//! Session (services, notices, day boundary)
//!     ↓
//! Domain Layer (calculators, tracking, reports)
//!     ↓
//! Storage Layer (key-value store, JSON files)
//! ```
//!
//! Everything is synchronous. Each read-modify-write of stored state is
//! serialized inside [`storage::StateRepository`].

pub mod config;
pub mod domain;
pub mod io;
pub mod logging;
pub mod session;
pub mod storage;

pub use config::TrackerConfig;
pub use domain::{Clock, FixedClock, SystemClock, TrackerError};
pub use io::{ActionDispatcher, ActionError, UserAction, ViewState};
pub use session::HydrationSession;
