use serde::{Deserialize, Serialize};
use std::fmt;

// ===== SECTION CONTEXT =====
// Which logical drawing section a line belongs to. Set by the line classifier,
// carried across lines and page breaks until another marker is seen.

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionContext {
    #[serde(rename = "Plan Base")]
    PlanBase,
    #[serde(rename = "Plan Wall")]
    PlanWall,
    #[serde(rename = "Plan Loft")]
    PlanLoft,
    #[serde(rename = "Elevation A")]
    ElevationA,
    #[serde(rename = "Elevation B")]
    ElevationB,
    #[serde(rename = "Elevation C")]
    ElevationC,
    #[serde(rename = "Elevation D")]
    ElevationD,
    Consolidated,
    Unknown,
}

impl SectionContext {
    pub const ALL: [SectionContext; 9] = [
        SectionContext::PlanBase,
        SectionContext::PlanWall,
        SectionContext::PlanLoft,
        SectionContext::ElevationA,
        SectionContext::ElevationB,
        SectionContext::ElevationC,
        SectionContext::ElevationD,
        SectionContext::Consolidated,
        SectionContext::Unknown,
    ];

    /// Human label used in reports and config files
    pub fn label(&self) -> &'static str {
        match self {
            SectionContext::PlanBase => "Plan Base",
            SectionContext::PlanWall => "Plan Wall",
            SectionContext::PlanLoft => "Plan Loft",
            SectionContext::ElevationA => "Elevation A",
            SectionContext::ElevationB => "Elevation B",
            SectionContext::ElevationC => "Elevation C",
            SectionContext::ElevationD => "Elevation D",
            SectionContext::Consolidated => "Consolidated",
            SectionContext::Unknown => "Unknown",
        }
    }

    /// Parse a label, ignoring case and surrounding whitespace
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|ctx| ctx.label().eq_ignore_ascii_case(wanted))
    }

    pub fn is_elevation(&self) -> bool {
        matches!(
            self,
            SectionContext::ElevationA
                | SectionContext::ElevationB
                | SectionContext::ElevationC
                | SectionContext::ElevationD
        )
    }
}

impl Default for SectionContext {
    fn default() -> Self {
        SectionContext::Unknown
    }
}

impl fmt::Display for SectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ===== RECORDS =====

/// Width × depth × height in millimetres
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub depth: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, depth: u32, height: u32) -> Self {
        Self {
            width,
            depth,
            height,
        }
    }

    pub fn get(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Width => self.width,
            Axis::Depth => self.depth,
            Axis::Height => self.height,
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}×{}", self.width, self.depth, self.height)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Axis {
    Width,
    Depth,
    Height,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Width, Axis::Depth, Axis::Height];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Width => f.write_str("Width"),
            Axis::Depth => f.write_str("Depth"),
            Axis::Height => f.write_str("Height"),
        }
    }
}

/// A claimed size for a named cabinet module
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleDimensionRecord {
    /// Page number (1-indexed)
    pub page: u32,
    pub context: SectionContext,
    pub module: String,
    pub dimensions: Dimensions,
    pub line: String,
}

/// A run of numbers that may be a dimension breakdown ending in its total
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChainRecord {
    /// Page number (1-indexed)
    pub page: u32,
    pub context: SectionContext,
    pub numbers: Vec<u32>,
    pub line: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Record {
    ModuleDim(ModuleDimensionRecord),
    Chain(ChainRecord),
}

impl Record {
    pub fn page(&self) -> u32 {
        match self {
            Record::ModuleDim(r) => r.page,
            Record::Chain(r) => r.page,
        }
    }

    pub fn context(&self) -> SectionContext {
        match self {
            Record::ModuleDim(r) => r.context,
            Record::Chain(r) => r.context,
        }
    }

    pub fn as_module_dim(&self) -> Option<&ModuleDimensionRecord> {
        match self {
            Record::ModuleDim(r) => Some(r),
            Record::Chain(_) => None,
        }
    }

    pub fn as_chain(&self) -> Option<&ChainRecord> {
        match self {
            Record::Chain(r) => Some(r),
            Record::ModuleDim(_) => None,
        }
    }
}

/// Per-type record totals for report metadata
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordCounts {
    pub module_dims: usize,
    pub chains: usize,
}

impl RecordCounts {
    pub fn from_records(records: &[Record]) -> Self {
        records.iter().fold(Self::default(), |mut counts, record| {
            match record {
                Record::ModuleDim(_) => counts.module_dims += 1,
                Record::Chain(_) => counts.chains += 1,
            }
            counts
        })
    }
}

// ===== CHECK OUTPUT ROWS =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AxisMismatch {
    pub axis: Axis,
    pub elevation: u32,
    pub consolidated: u32,
    /// Signed: elevation - consolidated
    pub delta: i64,
}

impl fmt::Display for AxisMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Elev {} vs List {} (Δ{} mm)",
            self.axis, self.elevation, self.consolidated, self.delta
        )
    }
}

/// One module whose elevation and consolidated dimensions disagree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MismatchRow {
    pub module: String,
    pub elevation: Dimensions,
    pub consolidated: Dimensions,
    pub mismatches: Vec<AxisMismatch>,
    pub tolerance_mm: u32,
    pub elevation_context: SectionContext,
    pub elevation_page: u32,
    pub consolidated_page: u32,
}

impl MismatchRow {
    pub fn remark(&self) -> String {
        self.mismatches
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SumCheckResult {
    Match,
    Mismatch,
}

impl fmt::Display for SumCheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SumCheckResult::Match => f.write_str("Match"),
            SumCheckResult::Mismatch => f.write_str("Mismatch"),
        }
    }
}

/// Which number in the chain was taken as its stated total
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TotalSource {
    /// Last number in reading order
    Last,
    /// Largest number in the chain, when it isn't also the last (fallback guess)
    Max,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SumCheckRow {
    pub context: SectionContext,
    pub page: u32,
    pub parts: Vec<u32>,
    pub computed_sum: u64,
    pub stated_total: u32,
    /// Signed: computed_sum - stated_total
    pub delta: i64,
    pub result: SumCheckResult,
    pub total_source: TotalSource,
    pub line: String,
}

impl SumCheckRow {
    pub fn parts_display(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join("+")
    }
}

/// Modules seen on one side of the elevation/consolidated join only
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrossReferenceAudit {
    pub elevation_only: Vec<String>,
    pub consolidated_only: Vec<String>,
    pub compared: usize,
}

// ===== ISSUES =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "check_type")]
pub enum Issue {
    #[serde(rename = "Elevation vs Consolidated")]
    ElevationVsConsolidated(MismatchRow),
    #[serde(rename = "Sum Check")]
    SumCheck(SumCheckRow),
}

impl Issue {
    pub fn check_type(&self) -> &'static str {
        match self {
            Issue::ElevationVsConsolidated(_) => "Elevation vs Consolidated",
            Issue::SumCheck(_) => "Sum Check",
        }
    }
}
