//! Symptom token normalization.
//!
//! Every comparison in the matching engine is case-insensitive, so both
//! caller input and stored knowledge entries go through this one function
//! before any intersection is computed.

/// Normalize a list of symptom tokens: trim whitespace, lower-case,
/// drop empties, and collapse duplicates preserving first-seen order.
///
/// Idempotent: normalizing an already-normalized list yields the same list.
pub fn normalize_symptoms(raw: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for s in raw {
        let token = s.trim().to_lowercase();
        if token.is_empty() {
            continue;
        }
        if seen.insert(token.clone()) {
            out.push(token);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_trims_lowercases_and_drops_empties() {
        let out = normalize_symptoms(&v(&["  Fever ", "COUGH", "", "   "]));
        assert_eq!(out, v(&["fever", "cough"]));
    }

    #[test]
    fn test_collapses_duplicates_keeping_first_order() {
        let out = normalize_symptoms(&v(&["fever", "Fever", "cough", "fever"]));
        assert_eq!(out, v(&["fever", "cough"]));
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_symptoms(&v(&[" Headache", "nausea", "HEADACHE"]));
        let twice = normalize_symptoms(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize_symptoms(&[]).is_empty());
    }
}
