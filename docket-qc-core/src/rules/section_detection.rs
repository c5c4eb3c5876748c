use super::pattern_detection::PatternExtractor;
use crate::classifier::LineClassifier;
use crate::types::*;
use anyhow::Result;

/// Running state of a document scan.
///
/// Context starts at Unknown for every document and is only changed by a
/// section marker line. Page breaks do not reset it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    pub context: SectionContext,
}

/// Characters that end a line of page text, besides `\r\n`.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c'..='\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Split page text into lines on every Unicode line break, not only `\n`.
/// Text from an unnormalized source can use bare `\r` or U+2028.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split("\r\n").flat_map(|chunk| chunk.split(is_line_break))
}

/// Builds the flat record table for one document.
pub struct RecordBuilder {
    classifier: LineClassifier,
    extractor: PatternExtractor,
}

impl RecordBuilder {
    pub fn new() -> Result<Self> {
        Ok(Self {
            classifier: LineClassifier::new(),
            extractor: PatternExtractor::new()?,
        })
    }

    /// One fold step: consume a line under the current state, return the next
    /// state and the records the line produced.
    pub fn step(&self, state: ScanState, page: u32, line: &str) -> (ScanState, Vec<Record>) {
        let context = match self.classifier.classify(line) {
            Some(label) => {
                if label != state.context {
                    log::debug!("   📍 Page {}: context {} -> {}", page, state.context, label);
                }
                label
            }
            None => state.context,
        };

        let source_line = line.trim();
        let mut records: Vec<Record> = self
            .extractor
            .module_matches(line)
            .into_iter()
            .map(|m| {
                Record::ModuleDim(ModuleDimensionRecord {
                    page,
                    context,
                    module: m.module,
                    dimensions: m.dimensions,
                    line: source_line.to_string(),
                })
            })
            .collect();

        if let Some(numbers) = self.extractor.chain_numbers(line) {
            records.push(Record::Chain(ChainRecord {
                page,
                context,
                numbers,
                line: source_line.to_string(),
            }));
        }

        (ScanState { context }, records)
    }

    /// Scan every line of every page in order. Pages are numbered from 1.
    pub fn build_records<S: AsRef<str>>(&self, pages: &[S]) -> Vec<Record> {
        let mut state = ScanState::default();
        let mut records = Vec::new();

        for (index, text) in pages.iter().enumerate() {
            let page = index as u32 + 1;
            for line in split_lines(text.as_ref()) {
                let (next, emitted) = self.step(state, page, line);
                state = next;
                records.extend(emitted);
            }
        }

        let counts = RecordCounts::from_records(&records);
        log::info!(
            "📝 Built {} records from {} pages ({} module dims, {} chains)",
            records.len(),
            pages.len(),
            counts.module_dims,
            counts.chains
        );
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn builder() -> RecordBuilder {
        RecordBuilder::new().expect("builder")
    }

    #[test]
    fn test_step_keeps_context_without_marker() {
        let b = builder();
        let state = ScanState {
            context: SectionContext::ElevationB,
        };
        let (next, records) = b.step(state, 3, "B4-600x560x720");
        assert_eq!(next.context, SectionContext::ElevationB);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].context(), SectionContext::ElevationB);
        assert_eq!(records[0].page(), 3);
    }

    #[test]
    fn test_marker_line_applies_to_its_own_records() {
        let (next, records) =
            builder().step(ScanState::default(), 1, "ELEVATION A   B1-600x560x720");
        assert_eq!(next.context, SectionContext::ElevationA);
        assert_eq!(records[0].context(), SectionContext::ElevationA);
    }

    #[test]
    fn test_internal_elevation_keeps_previous_context() {
        let state = ScanState {
            context: SectionContext::PlanWall,
        };
        let (next, _) = builder().step(state, 1, "ELEVATION A INTERNAL");
        assert_eq!(next.context, SectionContext::PlanWall);
    }

    #[test]
    fn test_context_spans_page_breaks() {
        let pages = vec!["CONSOLIDATED CABINETS LIST\n", "B1-600x560x720\n"];
        let records = builder().build_records(&pages);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].page(), 2);
        assert_eq!(records[0].context(), SectionContext::Consolidated);
    }

    #[test]
    fn test_unknown_before_first_marker() {
        let records = builder().build_records(&["300 600 300 1200"]);
        assert_eq!(records[0].context(), SectionContext::Unknown);
    }

    #[test]
    fn test_module_and_chain_on_same_line() {
        let records = builder().build_records(&["B1-600x560x720  600 450 900 1950"]);
        let chains: Vec<_> = records.iter().filter_map(Record::as_chain).collect();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].numbers, vec![600, 450, 900, 1950]);
        assert!(records.iter().any(|r| r.as_module_dim().is_some()));
        // module records come before the chain
        assert!(records.last().unwrap().as_chain().is_some());
    }

    #[test]
    fn test_source_line_is_trimmed() {
        let records = builder().build_records(&["   B1-600x560x720   "]);
        assert_eq!(records[0].as_module_dim().unwrap().line, "B1-600x560x720");
    }

    #[test]
    fn test_split_lines_on_any_break() {
        let lines: Vec<&str> = split_lines("a\rb\r\nc\u{2028}d\x0be").collect();
        assert_eq!(lines, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_carriage_return_lines_switch_context() {
        let pages = ["ELEVATION A\rB1-610x560x720\rCONSOLIDATED CABINETS LIST\rB1-600x560x720"];
        let records = builder().build_records(&pages);
        let contexts: Vec<SectionContext> = records.iter().map(Record::context).collect();
        assert_eq!(
            contexts,
            vec![SectionContext::ElevationA, SectionContext::Consolidated]
        );

        let rows = crate::rules::compare(&records, 0);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].remark().starts_with("Width"));
    }

    #[test]
    fn test_empty_pages_produce_nothing() {
        let pages: Vec<String> = vec![String::new(), String::new()];
        assert!(builder().build_records(&pages).is_empty());
    }

    #[test]
    fn test_rebuild_is_identical() {
        let pages = vec![
            "PLAN VIEW - BASE\n600 + 450 + 900 = 1950\n",
            "ELEVATION A\nB1-600x560x720\nCONSOLIDATED CABINETS LIST\nB1 600x560x720",
        ];
        let b = builder();
        assert_eq!(b.build_records(&pages), b.build_records(&pages));
    }
}
