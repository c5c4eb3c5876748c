use crate::types::Dimensions;
use anyhow::Result;
use regex::Regex;

// Module-with-triple variants, tried in this order on every line.
// Drawings are inconsistent about separators, so both run and may overlap.
const MODULE_TRIPLE_PATTERNS: &[(&str, &str)] = &[
    (
        "separator",
        r"(?P<mod>[A-Za-z0-9\-_/]+)\s*[-: ]\s*(?P<w>[0-9]{2,4})\s*[x×]\s*(?P<d>[0-9]{2,4})\s*[x×]\s*(?P<h>[0-9]{2,4})",
    ),
    (
        "space",
        r"(?P<mod>[A-Za-z0-9\-_/]+)\s+(?P<w>[0-9]{2,4})\s*[x×]\s*(?P<d>[0-9]{2,4})\s*[x×]\s*(?P<h>[0-9]{2,4})",
    ),
];

// Cheap filter: 3+ numbers joined by '+' or whitespace
const CHAIN_ANCHOR_PATTERN: &str =
    r"\b([0-9]{2,4})(?:\s*\+\s*|\s+)([0-9]{2,4})(?:(?:\s*\+\s*|\s+)([0-9]{2,4})){1,20}";

// Every standalone 2-4 digit token on a chain line
const CHAIN_NUMBER_PATTERN: &str = r"\b[0-9]{2,4}\b";

/// Minimum harvested numbers for a line to count as a chain
pub const MIN_CHAIN_NUMBERS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMatch {
    pub module: String,
    pub dimensions: Dimensions,
    /// Name of the pattern variant that produced the match
    pub variant: &'static str,
}

struct NamedPattern {
    name: &'static str,
    regex: Regex,
}

/// Heuristic scanner for module size callouts and dimension chains in drawing text.
///
/// Text layers exported from CAD have no semantic markup, so these are
/// pragmatic patterns rather than exact parsers; false positives and misses
/// are expected.
pub struct PatternExtractor {
    module_patterns: Vec<NamedPattern>,
    chain_anchor: Regex,
    chain_number: Regex,
}

impl PatternExtractor {
    pub fn new() -> Result<Self> {
        // Compile patterns from the declarative tables
        let mut module_patterns = Vec::new();
        for (name, pattern_str) in MODULE_TRIPLE_PATTERNS {
            module_patterns.push(NamedPattern {
                name,
                regex: Regex::new(pattern_str)?,
            });
        }

        Ok(Self {
            module_patterns,
            chain_anchor: Regex::new(CHAIN_ANCHOR_PATTERN)?,
            chain_number: Regex::new(CHAIN_NUMBER_PATTERN)?,
        })
    }

    /// All module triples on the line: every variant in table order, each
    /// scanned left to right for non-overlapping matches
    pub fn module_matches(&self, line: &str) -> Vec<ModuleMatch> {
        let mut matches = Vec::new();
        for pattern in &self.module_patterns {
            for caps in pattern.regex.captures_iter(line) {
                // Groups are 2-4 ASCII digits, parsing can't overflow
                let dim = |group: &str| -> u32 {
                    caps.name(group)
                        .and_then(|m| m.as_str().parse().ok())
                        .unwrap_or_default()
                };
                matches.push(ModuleMatch {
                    module: caps["mod"].to_string(),
                    dimensions: Dimensions::new(dim("w"), dim("d"), dim("h")),
                    variant: pattern.name,
                });
            }
        }
        matches
    }

    /// Numbers of a dimension chain, if the line looks like one
    pub fn chain_numbers(&self, line: &str) -> Option<Vec<u32>> {
        if !self.chain_anchor.is_match(line) {
            return None;
        }

        let numbers: Vec<u32> = self
            .chain_number
            .find_iter(line)
            .filter_map(|m| m.as_str().parse().ok())
            .collect();

        if numbers.len() >= MIN_CHAIN_NUMBERS {
            Some(numbers)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> PatternExtractor {
        PatternExtractor::new().expect("patterns compile")
    }

    #[test]
    fn test_separator_variants() {
        let ex = extractor();
        for line in ["B1-600x560x720", "B1: 600 x 560 x 720", "B1 - 600×560×720"] {
            let matches = ex.module_matches(line);
            assert!(!matches.is_empty(), "no match for {line}");
            assert_eq!(matches[0].module, "B1");
            assert_eq!(matches[0].dimensions, Dimensions::new(600, 560, 720));
            assert_eq!(matches[0].variant, "separator");
        }
    }

    #[test]
    fn test_space_separated_line_matches_both_variants() {
        let matches = extractor().module_matches("W3 900x350x720");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].variant, "separator");
        assert_eq!(matches[1].variant, "space");
        assert!(matches.iter().all(|m| m.module == "W3"));
        assert!(matches
            .iter()
            .all(|m| m.dimensions == Dimensions::new(900, 350, 720)));
    }

    #[test]
    fn test_multiple_modules_on_one_line() {
        let matches = extractor().module_matches("B1-600x560x720   B2-450x560x720");
        let separator: Vec<_> = matches.iter().filter(|m| m.variant == "separator").collect();
        assert_eq!(separator.len(), 2);
        assert_eq!(separator[0].module, "B1");
        assert_eq!(separator[1].module, "B2");
        assert_eq!(separator[1].dimensions.width, 450);
    }

    #[test]
    fn test_identifier_charset() {
        let matches = extractor().module_matches("TALL_2/L: 600x600x2100");
        assert_eq!(matches[0].module, "TALL_2/L");
        assert_eq!(matches[0].dimensions.height, 2100);
    }

    #[test]
    fn test_out_of_range_dimensions_do_not_match() {
        assert!(extractor().module_matches("B1-6x560x720").is_empty());
        assert!(extractor().module_matches("no sizes here").is_empty());
    }

    #[test]
    fn test_chain_with_plus_and_spaces() {
        let ex = extractor();
        assert_eq!(
            ex.chain_numbers("600 + 450 + 900 = 1950"),
            Some(vec![600, 450, 900, 1950])
        );
        assert_eq!(ex.chain_numbers("300 600 300 1200"), Some(vec![300, 600, 300, 1200]));
    }

    #[test]
    fn test_chain_harvests_all_tokens_on_line() {
        assert_eq!(
            extractor().chain_numbers("Run 12 : 600 450 900 total 1950 mm"),
            Some(vec![12, 600, 450, 900, 1950])
        );
    }

    #[test]
    fn test_two_numbers_are_not_a_chain() {
        assert_eq!(extractor().chain_numbers("600 450"), None);
        assert_eq!(extractor().chain_numbers("600 + 450"), None);
    }

    #[test]
    fn test_triples_are_not_chains() {
        // 'x' glues the numbers into one word, so no anchor
        assert_eq!(extractor().chain_numbers("B1-600x560x720"), None);
    }

    #[test]
    fn test_long_numbers_break_the_anchor() {
        assert_eq!(extractor().chain_numbers("12345 678 90"), None);
    }
}
