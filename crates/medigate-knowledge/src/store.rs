//! Knowledge store: load, validate, and hold condition entries.

use std::path::Path;
use std::sync::Arc;

use medigate_core::normalize_symptoms;
use serde::{Deserialize, Serialize};

/// One knowledge-base record: a symptom set mapped to a named condition
/// and its associated advice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionEntry {
    pub condition: String,
    /// Symptom names, normalized (lower-case, trimmed, deduplicated) at load.
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub tests: Vec<String>,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub precautions: Vec<String>,
}

/// Immutable in-memory list of condition entries.
pub struct KnowledgeStore {
    entries: Arc<Vec<ConditionEntry>>,
}

impl KnowledgeStore {
    /// Load the knowledge base from a JSON file (a top-level array of records).
    ///
    /// Fails soft: any read or parse problem is logged and produces an empty
    /// store, so analysis can always run against the default response.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(
                    "Knowledge base not readable at {}: {e} — starting empty",
                    path.display()
                );
                return Self::empty();
            }
        };
        let parsed: Vec<ConditionEntry> = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(
                    "Knowledge base at {} is malformed: {e} — starting empty",
                    path.display()
                );
                return Self::empty();
            }
        };
        let store = Self::from_entries(parsed);
        tracing::info!(
            "Knowledge base loaded: {} condition(s) from {}",
            store.len(),
            path.display()
        );
        store
    }

    /// Build a store from already-parsed records, validating each one.
    pub fn from_entries(parsed: Vec<ConditionEntry>) -> Self {
        let mut entries = Vec::with_capacity(parsed.len());
        for mut entry in parsed {
            entry.condition = entry.condition.trim().to_string();
            if entry.condition.is_empty() {
                tracing::debug!("Skipping knowledge record with empty condition name");
                continue;
            }
            entry.symptoms = normalize_symptoms(&entry.symptoms);
            if entry.symptoms.is_empty() {
                tracing::debug!(
                    "Skipping knowledge record '{}': no usable symptoms",
                    entry.condition
                );
                continue;
            }
            entries.push(entry);
        }
        Self { entries: Arc::new(entries) }
    }

    /// An empty store. Every analysis against it falls back to the default response.
    pub fn empty() -> Self {
        Self { entries: Arc::new(Vec::new()) }
    }

    /// Condition entries in knowledge-base order.
    pub fn entries(&self) -> &[ConditionEntry] {
        &self.entries
    }

    /// Cheap shared snapshot for lock-free concurrent readers.
    pub fn snapshot(&self) -> Arc<Vec<ConditionEntry>> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(condition: &str, symptoms: &[&str]) -> ConditionEntry {
        ConditionEntry {
            condition: condition.into(),
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            tests: vec!["CBC".into()],
            dosage: "as directed".into(),
            precautions: vec!["Rest".into()],
        }
    }

    #[test]
    fn test_missing_file_yields_empty_store() {
        let store = KnowledgeStore::load(Path::new("/nonexistent/medigate-kb.json"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_malformed_file_yields_empty_store() {
        let dir = std::env::temp_dir().join("medigate-kb-test-malformed");
        std::fs::create_dir_all(&dir).ok();
        let path = dir.join("kb.json");
        std::fs::write(&path, "{ not json at all").unwrap();
        let store = KnowledgeStore::load(&path);
        assert!(store.is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_valid_file() {
        let dir = std::env::temp_dir().join("medigate-kb-test-valid");
        std::fs::create_dir_all(&dir).ok();
        let path = dir.join("kb.json");
        let json = serde_json::json!([
            {
                "condition": "Common Cold",
                "symptoms": ["Fever", "cough", "fatigue"],
                "tests": ["CBC"],
                "dosage": "Paracetamol 500mg (consult doctor)",
                "precautions": ["Rest", "Hydration"]
            }
        ]);
        std::fs::write(&path, serde_json::to_string_pretty(&json).unwrap()).unwrap();
        let store = KnowledgeStore::load(&path);
        assert_eq!(store.len(), 1);
        // Entry symptoms are normalized at load.
        assert_eq!(store.entries()[0].symptoms, vec!["fever", "cough", "fatigue"]);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_skips_degenerate_records() {
        let store = KnowledgeStore::from_entries(vec![
            entry("", &["fever"]),
            entry("No Symptoms", &["", "   "]),
            entry("Kept", &["headache"]),
        ]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.entries()[0].condition, "Kept");
    }

    #[test]
    fn test_entry_symptom_duplicates_collapse() {
        let store = KnowledgeStore::from_entries(vec![entry(
            "Flu",
            &["fever", "FEVER", " fever ", "chills"],
        )]);
        assert_eq!(store.entries()[0].symptoms, vec!["fever", "chills"]);
    }

    #[test]
    fn test_snapshot_is_shared() {
        let store = KnowledgeStore::from_entries(vec![entry("Flu", &["fever"])]);
        let a = store.snapshot();
        let b = store.snapshot();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
