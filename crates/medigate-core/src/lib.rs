//! # Medigate Core
//! Shared foundation for the Medigate workspace: configuration,
//! the error type, patient data types, and symptom normalization.

pub mod config;
pub mod error;
pub mod normalize;
pub mod types;

pub use error::{MedigateError, Result};
pub use normalize::normalize_symptoms;
