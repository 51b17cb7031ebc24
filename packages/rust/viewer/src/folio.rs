//! Folio navigation matcher.
//!
//! Maps a folio identifier taken from the transcription ("12v", "3") to the
//! first canvas of a manifest whose label or metadata mentions it. Three
//! case-insensitive, unanchored patterns are tried per canvas, in order:
//!
//! 1. `f.?<folio>[rv]?` : "f12v", "f.12v", "f12"
//! 2. `<folio>[rv]?`    : "12v", "12r"
//! 3. `folio.?<folio>`  : "folio 12", "folio.12"
//!
//! Canvases are scanned in manifest order and the first one matching any
//! pattern wins. No match is an ordinary outcome.

use regex::{Regex, RegexBuilder};
use tracing::{debug, trace};

use crate::manifest::Canvas;

/// Compiled patterns for one folio identifier.
#[derive(Debug, Clone)]
pub struct FolioMatcher {
    folio: String,
    patterns: [Regex; 3],
}

impl FolioMatcher {
    /// Compile the patterns for `folio`. Returns `None` for a blank identifier.
    pub fn new(folio: &str) -> Option<Self> {
        let folio = folio.trim();
        if folio.is_empty() {
            return None;
        }

        let escaped = regex::escape(folio);
        let compile = |pattern: String| {
            RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .ok()
        };

        Some(Self {
            folio: folio.to_string(),
            patterns: [
                compile(format!("f.?{escaped}[rv]?"))?,
                compile(format!("{escaped}[rv]?"))?,
                compile(format!("folio.?{escaped}"))?,
            ],
        })
    }

    pub fn folio(&self) -> &str {
        &self.folio
    }

    /// Index of the first pattern matching `text`.
    pub fn matching_pattern(&self, text: &str) -> Option<usize> {
        self.patterns.iter().position(|p| p.is_match(text))
    }

    /// Whether the canvas label or any metadata value matches.
    pub fn matches_canvas(&self, canvas: &Canvas) -> bool {
        let labels = canvas.label_texts();
        let values = canvas.metadata_texts();

        self.patterns.iter().any(|pattern| {
            let hit = labels.iter().chain(values.iter()).any(|t| pattern.is_match(t));
            if hit {
                trace!(pattern = %pattern, labels = ?labels, "canvas matched");
            }
            hit
        })
    }

    /// Index of the first matching canvas.
    pub fn find_canvas(&self, canvases: &[Canvas]) -> Option<usize> {
        let found = canvases.iter().position(|c| self.matches_canvas(c));
        match found {
            Some(index) => debug!(folio = %self.folio, index, "folio matched canvas"),
            None => debug!(folio = %self.folio, canvases = canvases.len(), "no canvas matches folio"),
        }
        found
    }
}

/// Index of the first canvas matching `folio`, `None` if none does.
pub fn find_folio_canvas(folio: &str, canvases: &[Canvas]) -> Option<usize> {
    FolioMatcher::new(folio)?.find_canvas(canvases)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvases(labels: &[&str]) -> Vec<Canvas> {
        labels.iter().map(|l| Canvas::labelled(l)).collect()
    }

    #[test]
    fn first_canvas_wins_for_bare_number() {
        let list = canvases(&["f1r", "f1v", "f2r"]);
        assert_eq!(find_folio_canvas("1", &list), Some(0));
    }

    #[test]
    fn later_canvas_found_when_earlier_do_not_match() {
        let list = canvases(&["f1r", "f1v", "f2r"]);
        assert_eq!(find_folio_canvas("2", &list), Some(2));
        assert_eq!(find_folio_canvas("1v", &list), Some(1));
    }

    #[test]
    fn no_match_is_none() {
        let list = canvases(&["f1r", "f1v", "f2r"]);
        assert_eq!(find_folio_canvas("9", &list), None);
        assert_eq!(find_folio_canvas("", &list), None);
        assert_eq!(find_folio_canvas("3", &[]), None);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let list = canvases(&["Cover", "F. 12V"]);
        assert_eq!(find_folio_canvas("12v", &list), Some(1));
    }

    #[test]
    fn pattern_priority_order() {
        let matcher = FolioMatcher::new("12").unwrap();
        assert_eq!(matcher.matching_pattern("f.12r"), Some(0));
        assert_eq!(matcher.matching_pattern("c. 12r"), Some(1));
        assert_eq!(matcher.matching_pattern("spine"), None);
    }

    #[test]
    fn folio_word_pattern() {
        let matcher = FolioMatcher::new("x").unwrap();
        assert_eq!(matcher.matching_pattern("Folio x"), Some(1));
        assert_eq!(matcher.matching_pattern("folio_x"), Some(1));
        assert!(matcher.patterns[2].is_match("folio_x"));
    }

    #[test]
    fn metadata_values_are_searched() {
        let list = vec![
            Canvas::labelled("image 001"),
            Canvas::labelled("image 002").with_metadata("Folio", "12v"),
        ];
        assert_eq!(find_folio_canvas("12v", &list), Some(1));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let list = canvases(&["f1r", "f(2)r"]);
        assert_eq!(find_folio_canvas("(2)", &list), Some(1));
        assert_eq!(find_folio_canvas(".", &list), None);
    }
}
