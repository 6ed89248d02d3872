//! # Medigate Matching Engine
//!
//! Matches a patient's reported symptoms against the condition knowledge
//! base and returns the single best-matching condition with its advice.
//!
//! The engine is a pure function of (input, knowledge snapshot): no I/O,
//! no shared mutable state, safe to call from any number of tasks without
//! synchronization. All degenerate inputs resolve to a well-defined
//! default recommendation — nothing in here panics or returns an error.

use medigate_core::config::EngineConfig;
use medigate_core::normalize_symptoms;
use medigate_knowledge::ConditionEntry;
use serde::{Deserialize, Serialize};

/// The recommendation produced for one analysis. Owned entirely by the
/// caller; the engine keeps nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub possible_condition: String,
    pub suggested_tests: Vec<String>,
    pub dosage_recommendation: String,
    pub precautionary_measures: Vec<String>,
    pub ai_analysis_summary: String,
}

/// Scores reported symptoms against condition entries and picks a winner.
#[derive(Debug, Clone)]
pub struct MatchingEngine {
    weights: EngineConfig,
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl MatchingEngine {
    pub fn new(weights: EngineConfig) -> Self {
        Self { weights }
    }

    /// Analyze reported symptoms against the knowledge snapshot.
    ///
    /// Scoring per candidate entry:
    /// `(matches / entry_symptom_count) * specificity_weight + matches * overlap_weight`.
    /// The first term rewards covering most of a condition's own symptom
    /// profile, the second rewards absolute overlap so a broad condition
    /// matching many symptoms can outrank a narrow fully-matched one.
    /// Ties resolve to the entry that appears earliest in the knowledge base.
    pub fn analyze(&self, raw_symptoms: &[String], entries: &[ConditionEntry]) -> Recommendation {
        let input = normalize_symptoms(raw_symptoms);
        if input.is_empty() {
            return self.default_recommendation(Some("Please provide symptoms for analysis."));
        }

        let mut best: Option<(&ConditionEntry, f64, usize)> = None;
        for entry in entries {
            if entry.symptoms.is_empty() {
                // Cannot contribute to any score; skipping also avoids
                // dividing by zero below.
                continue;
            }
            let matches = input
                .iter()
                .filter(|s| entry.symptoms.iter().any(|e| e == *s))
                .count();
            if matches == 0 {
                continue;
            }
            let score = (matches as f64 / entry.symptoms.len() as f64)
                * self.weights.specificity_weight
                + matches as f64 * self.weights.overlap_weight;
            // Strictly-greater keeps the earliest entry on ties.
            if best.map_or(true, |(_, s, _)| score > s) {
                best = Some((entry, score, matches));
            }
        }

        let Some((winner, score, matches)) = best else {
            return self.default_recommendation(None);
        };
        tracing::debug!(
            condition = %winner.condition,
            score,
            matches,
            "matched condition"
        );

        let mut summary = format!(
            "Based on the reported symptoms ({}), the agent has identified \
             characteristics highly consistent with {}.",
            input.join(", "),
            winner.condition
        );
        if matches < input.len() {
            summary.push_str(" Some symptoms may require further specific investigation.");
        }

        Recommendation {
            possible_condition: winner.condition.clone(),
            suggested_tests: winner.tests.clone(),
            dosage_recommendation: winner.dosage.clone(),
            precautionary_measures: winner.precautions.clone(),
            ai_analysis_summary: summary,
        }
    }

    /// The fixed fallback recommendation, used when no confident match
    /// exists. A custom message replaces the generic summary wording.
    fn default_recommendation(&self, custom_msg: Option<&str>) -> Recommendation {
        Recommendation {
            possible_condition: "Undetermined Clinical Presentation".into(),
            suggested_tests: vec![
                "Complete Blood Count (CBC)".into(),
                "Metabolic Panel".into(),
                "General Vital Check".into(),
            ],
            dosage_recommendation:
                "Maintain hydration. Consult a physician for a customized treatment plan.".into(),
            precautionary_measures: vec![
                "Monitor temperature".into(),
                "Balanced diet".into(),
                "Rest".into(),
                "Avoid self-medication".into(),
            ],
            ai_analysis_summary: custom_msg
                .unwrap_or(
                    "The provided symptoms do not clearly map to the current localized \
                     knowledge base. A comprehensive clinical examination is recommended.",
                )
                .into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(condition: &str, symptoms: &[&str]) -> ConditionEntry {
        ConditionEntry {
            condition: condition.into(),
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            tests: vec![format!("{condition} panel")],
            dosage: format!("Standard {condition} protocol"),
            precautions: vec!["Rest".into()],
        }
    }

    fn symptoms(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_specific_condition_beats_broad_one() {
        // Common Cold: 3/3 matched → (3/3)*10 + 3 = 13
        // Flu: 3/5 matched → (3/5)*10 + 3 = 9
        let kb = vec![
            entry("Flu", &["fever", "cough", "fatigue", "chills", "headache"]),
            entry("Common Cold", &["fever", "cough", "fatigue"]),
        ];
        let engine = MatchingEngine::default();
        let rec = engine.analyze(&symptoms(&["fever", "cough", "fatigue"]), &kb);
        assert_eq!(rec.possible_condition, "Common Cold");
    }

    #[test]
    fn test_partial_match_scores_and_no_suffix_when_all_input_matched() {
        // Migraine: 1/3 matched → (1/3)*10 + 1 ≈ 4.33; the single input
        // symptom is part of the profile, so no follow-up suffix.
        let kb = vec![entry("Migraine", &["headache", "nausea", "light sensitivity"])];
        let engine = MatchingEngine::default();
        let rec = engine.analyze(&symptoms(&["headache"]), &kb);
        assert_eq!(rec.possible_condition, "Migraine");
        assert!(!rec.ai_analysis_summary.contains("further specific investigation"));
    }

    #[test]
    fn test_summary_suffix_when_some_input_unexplained() {
        let kb = vec![entry("Migraine", &["headache", "nausea"])];
        let engine = MatchingEngine::default();
        let rec = engine.analyze(&symptoms(&["headache", "toe pain"]), &kb);
        assert_eq!(rec.possible_condition, "Migraine");
        assert!(rec.ai_analysis_summary.contains("Some symptoms may require further specific investigation."));
    }

    #[test]
    fn test_summary_base_sentence_lists_normalized_input() {
        let kb = vec![entry("Common Cold", &["fever", "cough"])];
        let engine = MatchingEngine::default();
        let rec = engine.analyze(&symptoms(&[" Fever ", "COUGH"]), &kb);
        assert_eq!(
            rec.ai_analysis_summary,
            "Based on the reported symptoms (fever, cough), the agent has identified \
             characteristics highly consistent with Common Cold."
        );
    }

    #[test]
    fn test_empty_input_returns_prompt_message() {
        let kb = vec![entry("Flu", &["fever"])];
        let engine = MatchingEngine::default();
        let rec = engine.analyze(&[], &kb);
        assert_eq!(rec.possible_condition, "Undetermined Clinical Presentation");
        assert_eq!(rec.ai_analysis_summary, "Please provide symptoms for analysis.");
    }

    #[test]
    fn test_whitespace_only_input_counts_as_empty() {
        let kb = vec![entry("Flu", &["fever"])];
        let engine = MatchingEngine::default();
        let rec = engine.analyze(&symptoms(&["  ", ""]), &kb);
        assert_eq!(rec.ai_analysis_summary, "Please provide symptoms for analysis.");
    }

    #[test]
    fn test_no_overlap_returns_generic_default() {
        let kb = vec![entry("Flu", &["fever", "chills"])];
        let engine = MatchingEngine::default();
        let rec = engine.analyze(&symptoms(&["rash"]), &kb);
        assert_eq!(rec.possible_condition, "Undetermined Clinical Presentation");
        assert!(rec.ai_analysis_summary.contains("do not clearly map"));
        assert_eq!(rec.suggested_tests[0], "Complete Blood Count (CBC)");
        assert_eq!(rec.precautionary_measures.len(), 4);
    }

    #[test]
    fn test_empty_knowledge_base_returns_generic_default() {
        let engine = MatchingEngine::default();
        let rec = engine.analyze(&symptoms(&["fever"]), &[]);
        assert_eq!(rec.possible_condition, "Undetermined Clinical Presentation");
        assert!(rec.ai_analysis_summary.contains("comprehensive clinical examination"));
    }

    #[test]
    fn test_tie_breaks_to_earliest_entry() {
        // Identical profiles → identical scores; the first one must win.
        let kb = vec![
            entry("First", &["fever", "cough"]),
            entry("Second", &["fever", "cough"]),
        ];
        let engine = MatchingEngine::default();
        let rec = engine.analyze(&symptoms(&["fever", "cough"]), &kb);
        assert_eq!(rec.possible_condition, "First");
    }

    #[test]
    fn test_more_matches_never_scores_lower_for_equal_profiles() {
        // Monotonicity in absolute match count when |symptoms| is equal.
        let kb_one = vec![entry("A", &["a", "b", "c", "d"])];
        let engine = MatchingEngine::default();
        let one = engine.analyze(&symptoms(&["a"]), &kb_one);
        assert_eq!(one.possible_condition, "A");

        let kb_pair = vec![
            entry("OneMatch", &["a", "x", "y", "z"]),
            entry("TwoMatches", &["a", "b", "p", "q"]),
        ];
        let rec = engine.analyze(&symptoms(&["a", "b"]), &kb_pair);
        assert_eq!(rec.possible_condition, "TwoMatches");
    }

    #[test]
    fn test_absolute_overlap_can_outrank_full_specificity() {
        // Narrow: 1/1 matched → 10 + 1 = 11.
        // Broad: 5/6 matched → (5/6)*10 + 5 ≈ 13.33 → wins.
        let kb = vec![
            entry("Narrow", &["fever"]),
            entry("Broad", &["fever", "cough", "fatigue", "chills", "headache", "nausea"]),
        ];
        let engine = MatchingEngine::default();
        let rec = engine.analyze(
            &symptoms(&["fever", "cough", "fatigue", "chills", "headache"]),
            &kb,
        );
        assert_eq!(rec.possible_condition, "Broad");
    }

    #[test]
    fn test_degenerate_entry_is_skipped() {
        let mut empty = entry("Empty", &[]);
        empty.symptoms.clear();
        let kb = vec![empty, entry("Flu", &["fever"])];
        let engine = MatchingEngine::default();
        let rec = engine.analyze(&symptoms(&["fever"]), &kb);
        assert_eq!(rec.possible_condition, "Flu");
    }

    #[test]
    fn test_matching_is_case_insensitive_against_input() {
        let kb = vec![entry("Flu", &["fever", "chills"])];
        let engine = MatchingEngine::default();
        let rec = engine.analyze(&symptoms(&["FEVER", " Chills "]), &kb);
        assert_eq!(rec.possible_condition, "Flu");
    }

    #[test]
    fn test_custom_weights_change_ranking() {
        // With overlap weight zeroed, pure specificity decides.
        let kb = vec![
            entry("Broad", &["a", "b", "c", "d", "e", "f"]),
            entry("Narrow", &["a"]),
        ];
        let engine = MatchingEngine::new(EngineConfig {
            specificity_weight: 10.0,
            overlap_weight: 0.0,
        });
        let rec = engine.analyze(&symptoms(&["a", "b", "c", "d", "e"]), &kb);
        assert_eq!(rec.possible_condition, "Narrow");
    }
}
