// Main rules module - delegates to semantic sub-modules
// This file coordinates the check pipeline but actual implementations are in:
// - pattern_detection.rs: Module triple and dimension chain patterns
// - section_detection.rs: Context-tracking scan that builds the record table
// - cross_reference.rs: Elevation vs consolidated list comparison
// - sum_check.rs: Dimension chain arithmetic
// - engine.rs: RuleEngine, CheckRule trait and issue aggregation

pub mod cross_reference;
pub mod engine;
pub mod pattern_detection;
pub mod section_detection;
pub mod sum_check;

pub use cross_reference::{compare, compare_with_audit, CrossReferenceOutcome};
pub use engine::{CheckRule, Findings, RuleEngine};
pub use pattern_detection::PatternExtractor;
pub use section_detection::{RecordBuilder, ScanState};
pub use sum_check::{check_chains, evaluate_chain, SumCheckOptions};
