use crate::config::QcConfig;
use crate::rules::Findings;
use crate::types::*;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::fs;
use uuid::Uuid;

/// Bumped whenever the report layout changes
pub const SCHEMA_VERSION: &str = "1.0";

/// Column order of the issue table. Each check fills the columns it has.
pub const ISSUE_COLUMNS: &[&str] = &[
    "Check Type",
    "Module",
    "Drawing Type",
    "Page",
    "Elevation (WxDxH)",
    "Consolidated (WxDxH)",
    "Parts",
    "Computed Sum",
    "Stated Total",
    "Result",
    "Remarks",
];

/// SHA-256 over the whole input file
pub fn calculate_document_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// SHA-256 over the page texts, for input that never was a file
pub fn calculate_pages_hash<S: AsRef<str>>(pages: &[S]) -> String {
    let mut hasher = Sha256::new();
    for page in pages {
        hasher.update(page.as_ref().as_bytes());
        hasher.update([0x0c]);
    }
    format!("{:x}", hasher.finalize())
}

/// Calculate hash for configuration data, so two reports can be compared
pub fn calculate_config_hash<T: Serialize>(config: &T) -> Result<String> {
    let config_json = serde_json::to_string(config)
        .map_err(|e| anyhow!("Failed to serialize config for hashing: {}", e))?;

    let mut hasher = Sha256::new();
    hasher.update(config_json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportMetadata {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub document_hash: String,
    pub config_hash: String,
    pub page_count: usize,
    /// 1-based numbers of pages with no text
    pub empty_pages: Vec<u32>,
    pub record_counts: RecordCounts,
}

/// Everything one QC pass found, plus enough metadata to trace it back
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QcReport {
    pub schema_version: String,
    pub metadata: ReportMetadata,
    pub config: QcConfig,
    pub mismatches: Vec<MismatchRow>,
    pub sum_checks: Vec<SumCheckRow>,
    pub audit: CrossReferenceAudit,
    pub issues: Vec<Issue>,
}

impl QcReport {
    pub fn new<S: AsRef<str>>(
        source: &str,
        document_hash: String,
        pages: &[S],
        records: &[Record],
        config: &QcConfig,
        findings: Findings,
    ) -> Self {
        let config_hash = calculate_config_hash(config).unwrap_or_else(|e| {
            log::warn!("⚠️  {}", e);
            String::new()
        });

        let empty_pages = pages
            .iter()
            .enumerate()
            .filter(|(_, text)| text.as_ref().trim().is_empty())
            .map(|(index, _)| index as u32 + 1)
            .collect();

        let issues = findings.issues();

        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            metadata: ReportMetadata {
                report_id: Uuid::new_v4(),
                generated_at: Utc::now(),
                source: source.to_string(),
                document_hash,
                config_hash,
                page_count: pages.len(),
                empty_pages,
                record_counts: RecordCounts::from_records(records),
            },
            config: config.clone(),
            mismatches: findings.mismatches,
            sum_checks: findings.sum_checks,
            audit: findings.audit,
            issues,
        }
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Rows of the issue table, in `ISSUE_COLUMNS` order
    pub fn issue_rows(&self) -> Vec<Vec<String>> {
        self.issues.iter().map(issue_row).collect()
    }

    /// Tab-separated issue table with a header row
    pub fn to_tsv(&self) -> String {
        let mut out = ISSUE_COLUMNS.join("\t");
        out.push('\n');
        for row in self.issue_rows() {
            let cells: Vec<String> = row.iter().map(|cell| tsv_cell(cell)).collect();
            out.push_str(&cells.join("\t"));
            out.push('\n');
        }
        out
    }

    /// Save the report in the given format: "json", "yaml" or "tsv"
    pub fn save_with_format(&self, path: &str, format: &str) -> Result<()> {
        let content = match format.to_ascii_lowercase().as_str() {
            "json" => serde_json::to_string_pretty(self)?,
            "yaml" | "yml" => serde_yaml::to_string(self)?,
            "tsv" => self.to_tsv(),
            other => {
                return Err(anyhow!(
                    "Unsupported output format: {} (expected json, yaml or tsv)",
                    other
                ))
            }
        };

        fs::write(path, content)?;
        log::info!("💾 Report saved to: {}", path);
        Ok(())
    }

    /// Human-readable report for the terminal
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let meta = &self.metadata;

        let _ = writeln!(out, "📋 QC report for {}", meta.source);
        let _ = writeln!(
            out,
            "   Pages: {} ({} empty) | Records: {} module dims, {} chains | Tolerance: {} mm",
            meta.page_count,
            meta.empty_pages.len(),
            meta.record_counts.module_dims,
            meta.record_counts.chains,
            self.config.tolerance_mm
        );

        let _ = writeln!(out, "\n❌ Elevation vs Consolidated - Mismatches");
        if !self.config.enable_checks.elevation_vs_consolidated {
            let _ = writeln!(out, "   (check disabled)");
        } else if self.mismatches.is_empty() {
            let _ = writeln!(
                out,
                "   ✅ No Elevation vs Consolidated mismatches found by module code."
            );
        } else {
            for row in &self.mismatches {
                let _ = writeln!(
                    out,
                    "   {} ({} p{} vs list p{}): {}",
                    row.module,
                    row.elevation_context,
                    row.elevation_page,
                    row.consolidated_page,
                    row.remark()
                );
            }
        }
        if !self.audit.elevation_only.is_empty() {
            let _ = writeln!(
                out,
                "   ↪️  Not in consolidated list: {}",
                self.audit.elevation_only.join(", ")
            );
        }
        if !self.audit.consolidated_only.is_empty() {
            let _ = writeln!(
                out,
                "   ↪️  Not on any elevation: {}",
                self.audit.consolidated_only.join(", ")
            );
        }

        let _ = writeln!(out, "\n🧮 Sum Check (Plan/Elevations)");
        if !self.config.enable_checks.sum_check {
            let _ = writeln!(out, "   (check disabled)");
        } else if self.sum_checks.is_empty() {
            let _ = writeln!(out, "   ℹ️  No dimension chains detected for sum-check.");
        } else {
            for row in &self.sum_checks {
                let marker = match row.result {
                    SumCheckResult::Match => "✅",
                    SumCheckResult::Mismatch => "❌",
                };
                let _ = writeln!(
                    out,
                    "   {} {} p{}: {} = {} vs stated {} (Δ{})",
                    marker,
                    row.context,
                    row.page,
                    row.parts_display(),
                    row.computed_sum,
                    row.stated_total,
                    row.delta
                );
            }
        }

        if self.has_issues() {
            let _ = writeln!(out, "\n⚠️  {} issue(s) found", self.issues.len());
        } else {
            let _ = writeln!(out, "\n✅ No issues detected by the current heuristics.");
        }
        out
    }
}

fn issue_row(issue: &Issue) -> Vec<String> {
    match issue {
        Issue::ElevationVsConsolidated(row) => vec![
            issue.check_type().to_string(),
            row.module.clone(),
            row.elevation_context.to_string(),
            format!("{}/{}", row.elevation_page, row.consolidated_page),
            row.elevation.to_string(),
            row.consolidated.to_string(),
            String::new(),
            String::new(),
            String::new(),
            "Mismatch".to_string(),
            row.remark(),
        ],
        Issue::SumCheck(row) => vec![
            issue.check_type().to_string(),
            String::new(),
            row.context.to_string(),
            row.page.to_string(),
            String::new(),
            String::new(),
            row.parts_display(),
            row.computed_sum.to_string(),
            row.stated_total.to_string(),
            row.result.to_string(),
            format!("Δ{} mm, total from {} number", row.delta, total_source_label(row.total_source)),
        ],
    }
}

fn total_source_label(source: TotalSource) -> &'static str {
    match source {
        TotalSource::Last => "last",
        TotalSource::Max => "largest",
    }
}

// Tabs and newlines would break the row structure
fn tsv_cell(cell: &str) -> String {
    cell.replace(['\t', '\n', '\r'], " ")
}
