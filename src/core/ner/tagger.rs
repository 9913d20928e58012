//! Offline fallback tagger for credit text.
//!
//! Tags every run of Title-case words that sits on one line as `PERSON`,
//! splitting runs at common credit role words ("Directed", "Starring", ...).
//! Far cruder than a statistical model, but needs nothing installed.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::core::error::ScanResult;
use crate::core::ner::entity::{Entity, NerModel};

const WORD: &str = r"\p{Lu}['’]?\p{L}*\p{Ll}(?:-\p{Lu}\p{L}*\p{Ll})*";

static RUN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b{w}(?:[ \t]+{w})+\b", w = WORD)).expect("static regex")
});

static ROLE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "And", "By", "Camera", "Cast", "Casting", "Cinematography", "Co", "Composer", "Costume",
        "Costumes", "Design", "Designer", "Directed", "Director", "Editor", "Editing", "Executive",
        "Featuring", "Music", "Photography", "Produced", "Producer", "Producers", "Screenplay",
        "Sound", "Special", "Starring", "Story", "Thanks", "The", "With", "Written",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Default)]
pub struct CapitalizedRunTagger;

impl CapitalizedRunTagger {
    pub fn new() -> Self {
        Self
    }
}

impl NerModel for CapitalizedRunTagger {
    fn entities(&self, text: &str) -> ScanResult<Vec<Entity>> {
        let mut entities = Vec::new();
        for m in RUN_RE.find_iter(text) {
            let mut current: Vec<&str> = Vec::new();
            for token in m.as_str().split_whitespace() {
                if ROLE_WORDS.contains(token) {
                    if !current.is_empty() {
                        entities.push(Entity::person(current.join(" ")));
                        current.clear();
                    }
                } else {
                    current.push(token);
                }
            }
            if !current.is_empty() {
                entities.push(Entity::person(current.join(" ")));
            }
        }
        Ok(entities)
    }

    fn name(&self) -> &str {
        "capitalized-runs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(text: &str) -> Vec<String> {
        CapitalizedRunTagger::new()
            .entities(text)
            .unwrap()
            .into_iter()
            .map(|e| e.text)
            .collect()
    }

    #[test]
    fn test_finds_title_case_runs() {
        assert_eq!(texts("directed by Jane Doe"), vec!["Jane Doe"]);
        assert_eq!(
            texts("Mary-Jane O'Neil and Jean-Luc McDonald"),
            vec!["Mary-Jane O'Neil", "Jean-Luc McDonald"]
        );
    }

    #[test]
    fn test_role_words_split_runs() {
        assert_eq!(
            texts("Starring John Smith\nDirected By Amy Lee"),
            vec!["John Smith", "Amy Lee"]
        );
    }

    #[test]
    fn test_runs_do_not_cross_lines() {
        assert_eq!(texts("Jane\nDoe"), Vec::<String>::new());
    }

    #[test]
    fn test_all_caps_and_single_words_ignored() {
        assert_eq!(texts("JANE DOE"), Vec::<String>::new());
        assert_eq!(texts("Madonna"), Vec::<String>::new());
    }

    #[test]
    fn test_everything_tagged_person() {
        let entities = CapitalizedRunTagger::new().entities("Jane Doe").unwrap();
        assert!(entities.iter().all(|e| e.is_person()));
    }
}
