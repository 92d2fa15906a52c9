//! Title Normalizer & Matcher.
//!
//! The generator paraphrases and reformats titles ("Design Review (Part 1 of
//! 2)" for "design review"), so reconciliation compares normalized stems and
//! falls back to word-overlap matching. The match order is a deliberate
//! tie-break: split-part identity, then exact equality, then fuzzy overlap —
//! the safer checks run before the heuristic one.

/// Minimum word length considered significant for fuzzy overlap.
const MIN_FUZZY_WORD_LEN: usize = 3;

/// Lowercases, trims, drops any "(Part X of Y)" suffix, and collapses
/// punctuation to spaces, leaving the comparable base stem.
pub fn normalize_title(title: &str) -> String {
    let lower = title.to_lowercase();
    let stem = match lower.find("(part") {
        Some(idx) => &lower[..idx],
        None => lower.as_str(),
    };
    let cleaned: String = stem
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Finds the candidate that represents the same logical title as `search`.
///
/// 1. A candidate carrying a "(Part" suffix whose stem equals the search stem
///    wins (split parts represent one logical task) — returns the stem.
/// 2. Exact normalized equality — returns the candidate.
/// 3. Fuzzy overlap: words of at least 3 characters, counted as overlapping
///    when either contains the other; accepted when the overlap reaches
///    `min(2, wordCount(search))` — returns the candidate.
pub fn match_title(search: &str, candidates: &[String]) -> Option<String> {
    let search_stem = normalize_title(search);

    for candidate in candidates {
        if candidate.to_lowercase().contains("(part")
            && normalize_title(candidate) == search_stem
        {
            return Some(normalize_title(candidate));
        }
    }

    for candidate in candidates {
        if normalize_title(candidate) == search_stem {
            return Some(candidate.clone());
        }
    }

    let search_words: Vec<&str> = search_stem
        .split(' ')
        .filter(|w| w.len() >= MIN_FUZZY_WORD_LEN)
        .collect();
    if search_words.is_empty() {
        return None;
    }
    let needed = search_words.len().min(2);

    for candidate in candidates {
        let candidate_stem = normalize_title(candidate);
        let candidate_words: Vec<&str> = candidate_stem
            .split(' ')
            .filter(|w| w.len() >= MIN_FUZZY_WORD_LEN)
            .collect();

        let overlap = search_words
            .iter()
            .filter(|sw| {
                candidate_words
                    .iter()
                    .any(|cw| cw.contains(**sw) || sw.contains(cw))
            })
            .count();

        if overlap >= needed {
            return Some(candidate.clone());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_strips_part_suffix_and_case() {
        assert_eq!(
            normalize_title("Design Review (Part 1 of 2)"),
            "design review"
        );
        assert_eq!(normalize_title("  design review  "), "design review");
    }

    #[test]
    fn test_normalize_collapses_punctuation() {
        assert_eq!(normalize_title("Fix: login-page bug!"), "fix login page bug");
    }

    #[test]
    fn test_split_part_match_returns_stem() {
        let candidates = titles(&["Design Review (Part 1 of 2)", "Design Review"]);
        // The part candidate wins over the exact one and yields the stem.
        assert_eq!(
            match_title("design review", &candidates),
            Some("design review".to_string())
        );
    }

    #[test]
    fn test_exact_match_before_fuzzy() {
        let candidates = titles(&["Quarterly planning session", "Quarterly Planning"]);
        assert_eq!(
            match_title("quarterly planning", &candidates),
            Some("Quarterly Planning".to_string())
        );
    }

    #[test]
    fn test_fuzzy_match_on_word_overlap() {
        let candidates = titles(&["Write the launch announcement draft"]);
        assert_eq!(
            match_title("Launch announcement", &candidates),
            Some("Write the launch announcement draft".to_string())
        );
    }

    #[test]
    fn test_fuzzy_substring_counts_both_directions() {
        // "reviews" contains "review"
        let candidates = titles(&["Code reviews and testing"]);
        assert!(match_title("code review", &candidates).is_some());
    }

    #[test]
    fn test_single_significant_word_needs_one_overlap() {
        let candidates = titles(&["Gym session"]);
        assert!(match_title("gym", &candidates).is_some());
    }

    #[test]
    fn test_no_match_reported() {
        let candidates = titles(&["Grocery shopping", "Tax filing"]);
        assert_eq!(match_title("Design review", &candidates), None);
    }

    #[test]
    fn test_short_words_do_not_drive_fuzzy_matches() {
        // Only words under 3 chars in common; must not match.
        let candidates = titles(&["Go to gym"]);
        assert_eq!(match_title("Do it up", &candidates), None);
    }
}
