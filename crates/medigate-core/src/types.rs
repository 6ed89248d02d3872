//! Patient data types shared between the gateway and the CLI tooling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Incoming patient payload from the request layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub age: u32,
    pub gender: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub history: Vec<String>,
    /// Blood pressure as reported, e.g. "120/80".
    #[serde(default)]
    pub bp: String,
    #[serde(default)]
    pub temperature: String,
    #[serde(default)]
    pub heart_rate: String,
}

impl NewPatient {
    /// Systolic reading parsed from the "sys/dia" string, if present.
    pub fn systolic(&self) -> Option<u32> {
        self.bp.split('/').next()?.trim().parse().ok()
    }
}

/// A stored patient record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub symptoms: Vec<String>,
    pub history: Vec<String>,
    pub bp: String,
    pub temperature: String,
    pub heart_rate: String,
    pub created_at: DateTime<Utc>,
}
