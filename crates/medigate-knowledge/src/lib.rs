//! # Medigate Knowledge Base
//!
//! Loads and holds the localized condition knowledge: a small JSON file of
//! condition records, each mapping a symptom set to a named condition and
//! its associated advice.
//!
//! ## Design
//! - **Fail-soft load** — a missing, unreadable, or malformed source yields
//!   an empty store and a warning log, never an error. The matching engine
//!   degrades to its default response.
//! - **Validated at load** — records without a condition name or a usable
//!   symptom set are skipped; entry symptoms are normalized once here so
//!   every later comparison is case-insensitive.
//! - **Immutable after load** — shared read-only across callers; hot reload
//!   is a fresh store published as a new `Arc` snapshot.

pub mod store;

pub use store::{ConditionEntry, KnowledgeStore};
