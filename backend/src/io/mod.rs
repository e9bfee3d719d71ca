//! # IO Module
//!
//! The boundary between a presentation layer and the hydration session.
//!
//! A UI sends [`commands::UserAction`]s and renders the returned
//! [`commands::ViewState`]. Failed actions come back as an
//! [`commands::ActionError`] carrying field-level validation errors, and the
//! previous view stays on screen.

pub mod commands;

pub use commands::{ActionDispatcher, ActionError, UserAction, ViewState};
