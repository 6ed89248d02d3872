//! # Medigate Gateway
//! HTTP API for patient intake and analysis. Receives patient payloads,
//! persists them, runs the matching engine against the current knowledge
//! snapshot, and stores the resulting recommendation alongside the patient.

pub mod db;
pub mod routes;
pub mod server;

pub use db::PatientDb;
pub use server::AppState;
