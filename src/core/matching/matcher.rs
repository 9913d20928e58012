use log::{debug, info};
use serde::Serialize;

use crate::core::matching::reference::ReferenceNames;

/// An extracted name that shares a token with a reference entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub name: String,
    /// First reference entry that matched.
    pub reference: String,
}

/// Partial-name matcher.
///
/// A name matches when one of its whitespace tokens equals a whole reference
/// entry, case-insensitively. Entries are not split, so a `"first last"`
/// entry only matches a name that has that exact string as a single token.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameMatcher;

impl NameMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Matches in input order; repeated names stay repeated.
    pub fn match_names(&self, reference: &ReferenceNames, extracted: &[String]) -> Vec<MatchRecord> {
        if reference.is_empty() || extracted.is_empty() {
            debug!("🔎 Nothing to match ({} refs, {} names)", reference.len(), extracted.len());
            return Vec::new();
        }

        let mut matches = Vec::new();
        for name in extracted {
            let tokens: Vec<String> = name.split_whitespace().map(str::to_lowercase).collect();
            let hit = reference
                .entries()
                .iter()
                .find(|entry| {
                    let entry = entry.to_lowercase();
                    tokens.iter().any(|t| *t == entry)
                });
            if let Some(entry) = hit {
                debug!("🔎 {:?} matched reference {:?}", name, entry);
                matches.push(MatchRecord {
                    name: name.clone(),
                    reference: entry.clone(),
                });
            }
        }

        info!("🔎 {}/{} extracted names matched", matches.len(), extracted.len());
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matching::reference::ReferenceMode;

    fn refs(lines: &[&str]) -> ReferenceNames {
        ReferenceNames::from_lines(lines.iter().copied(), ReferenceMode::Tokens)
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn matched(records: &[MatchRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_repeats_kept_and_non_matches_dropped() {
        let matcher = NameMatcher::new();
        let result = matcher.match_names(
            &refs(&["doe", "lee"]),
            &names(&["Jane Doe", "Jane Doe", "John Smith"]),
        );
        assert_eq!(matched(&result), vec!["Jane Doe", "Jane Doe"]);
        assert!(result.iter().all(|r| r.reference == "doe"));
    }

    #[test]
    fn test_case_insensitive_on_both_sides() {
        let matcher = NameMatcher::new();
        for stored in ["DOE", "doe", "Doe"] {
            let result = matcher.match_names(&refs(&[stored]), &names(&["Jane Doe"]));
            assert_eq!(matched(&result), vec!["Jane Doe"]);
        }
        let result = matcher.match_names(&refs(&["doe"]), &names(&["JANE DOE"]));
        assert_eq!(matched(&result), vec!["JANE DOE"]);
    }

    #[test]
    fn test_first_name_also_matches() {
        let result = NameMatcher::new().match_names(&refs(&["jane"]), &names(&["Jane Doe"]));
        assert_eq!(matched(&result), vec!["Jane Doe"]);
    }

    #[test]
    fn test_name_contributes_once_even_with_several_hits() {
        let result =
            NameMatcher::new().match_names(&refs(&["doe", "jane"]), &names(&["Jane Doe"]));
        assert_eq!(result.len(), 1);
        // entries are held sorted in token mode, so "doe" is tried first
        assert_eq!(result[0].reference, "doe");
    }

    #[test]
    fn test_full_name_entries_do_not_match_tokens() {
        let reference = ReferenceNames::from_lines(["Jane Doe"], ReferenceMode::FullNames);
        let result = NameMatcher::new().match_names(&reference, &names(&["Jane Doe"]));
        assert!(result.is_empty());
    }

    #[test]
    fn test_substring_is_not_a_match() {
        let result = NameMatcher::new().match_names(&refs(&["do"]), &names(&["Jane Doe"]));
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_inputs_yield_empty_result() {
        let matcher = NameMatcher::new();
        assert!(matcher.match_names(&refs(&[]), &names(&["Jane Doe"])).is_empty());
        assert!(matcher.match_names(&refs(&["doe"]), &[]).is_empty());
    }
}
