// src/memory/dedup.rs
// Write-time near-duplicate detection for memories: normalized-token
// Jaccard similarity. The threshold comes from config; 1.0-equality after
// normalization always dedups.

use std::collections::HashSet;

/// Lowercase, strip punctuation, collapse whitespace.
pub fn normalize(content: &str) -> String {
    content
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn token_set(content: &str) -> HashSet<String> {
    normalize(content)
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}

/// Jaccard similarity over normalized token sets, in [0, 1].
pub fn similarity(a: &str, b: &str) -> f32 {
    let set_a = token_set(a);
    let set_b = token_set(b);

    if set_a.is_empty() && set_b.is_empty() {
        return 1.0;
    }
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count() as f32;
    let union = set_a.union(&set_b).count() as f32;
    intersection / union
}

/// True if `candidate` restates any existing memory.
pub fn is_near_duplicate<'a, I>(candidate: &str, existing: I, threshold: f32) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let normalized = normalize(candidate);
    for prior in existing {
        if normalize(prior) == normalized {
            return true;
        }
        if similarity(candidate, prior) >= threshold {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(
            normalize("Wants to start their own tech company!"),
            "wants to start their own tech company"
        );
    }

    #[test]
    fn test_identical_after_normalization_is_duplicate() {
        let existing = ["Wants to start their own tech company"];
        assert!(is_near_duplicate(
            "wants to start their own tech company.",
            existing,
            0.8
        ));
    }

    #[test]
    fn test_restatement_is_duplicate() {
        let existing = ["Wants to start their own tech company"];
        assert!(is_near_duplicate(
            "Wants to start their tech company",
            existing,
            0.8
        ));
    }

    #[test]
    fn test_unrelated_fact_is_not_duplicate() {
        let existing = ["Wants to start their own tech company"];
        assert!(!is_near_duplicate(
            "Is afraid of public speaking",
            existing,
            0.8
        ));
    }

    #[test]
    fn test_empty_existing_never_matches() {
        assert!(!is_near_duplicate("Anything at all", [], 0.8));
    }
}
