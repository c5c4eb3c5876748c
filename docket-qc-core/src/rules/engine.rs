use super::cross_reference::compare_with_audit;
use super::sum_check::{check_chains, SumCheckOptions};
use crate::config::QcConfig;
use crate::types::*;

/// Tables produced by the checks for one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Findings {
    pub mismatches: Vec<MismatchRow>,
    pub sum_checks: Vec<SumCheckRow>,
    pub audit: CrossReferenceAudit,
}

impl Findings {
    /// Union of both checks' problem rows: every cross-reference row, and the
    /// sum-check rows that didn't match
    pub fn issues(&self) -> Vec<Issue> {
        let cross_reference = self
            .mismatches
            .iter()
            .cloned()
            .map(Issue::ElevationVsConsolidated);
        let sums = self
            .sum_checks
            .iter()
            .filter(|row| row.result == SumCheckResult::Mismatch)
            .cloned()
            .map(Issue::SumCheck);
        cross_reference.chain(sums).collect()
    }
}

/// A consistency check over the record table
pub trait CheckRule {
    fn apply(&self, records: &[Record], findings: &mut Findings);

    fn name(&self) -> &str;
}

// ElevationVsConsolidatedRule - module sizes on elevations against the cabinet list
pub struct ElevationVsConsolidatedRule<'a> {
    config: &'a QcConfig,
}

impl<'a> ElevationVsConsolidatedRule<'a> {
    pub fn new(config: &'a QcConfig) -> Self {
        Self { config }
    }
}

impl<'a> CheckRule for ElevationVsConsolidatedRule<'a> {
    fn apply(&self, records: &[Record], findings: &mut Findings) {
        let outcome = compare_with_audit(records, self.config.tolerance_mm);
        log::info!(
            "   ✅ Compared {} modules, {} mismatched ({} elevation-only, {} list-only)",
            outcome.audit.compared,
            outcome.rows.len(),
            outcome.audit.elevation_only.len(),
            outcome.audit.consolidated_only.len()
        );
        findings.mismatches = outcome.rows;
        findings.audit = outcome.audit;
    }

    fn name(&self) -> &str {
        "ElevationVsConsolidated"
    }
}

// SumCheckRule - dimension chains against their stated totals
pub struct SumCheckRule<'a> {
    config: &'a QcConfig,
}

impl<'a> SumCheckRule<'a> {
    pub fn new(config: &'a QcConfig) -> Self {
        Self { config }
    }
}

impl<'a> CheckRule for SumCheckRule<'a> {
    fn apply(&self, records: &[Record], findings: &mut Findings) {
        let options = SumCheckOptions {
            tolerance_mm: self.config.tolerance_mm,
            fallback_to_max: self.config.sum_check_fallback,
        };
        findings.sum_checks = check_chains(records, &self.config.sum_check_contexts, options);

        let failed = findings
            .sum_checks
            .iter()
            .filter(|row| row.result == SumCheckResult::Mismatch)
            .count();
        log::info!(
            "   ✅ Sum-checked {} chains, {} mismatched",
            findings.sum_checks.len(),
            failed
        );
    }

    fn name(&self) -> &str {
        "SumCheck"
    }
}

/// Runs the checks the config enables, in a fixed order
pub struct RuleEngine<'a> {
    config: &'a QcConfig,
}

impl<'a> RuleEngine<'a> {
    pub fn new(config: &'a QcConfig) -> Self {
        Self { config }
    }

    fn enabled_rules(&self) -> Vec<Box<dyn CheckRule + 'a>> {
        let mut rules: Vec<Box<dyn CheckRule + 'a>> = Vec::new();
        if self.config.enable_checks.elevation_vs_consolidated {
            rules.push(Box::new(ElevationVsConsolidatedRule::new(self.config)));
        } else {
            log::info!("   ⏭️  Skipping disabled rule: ElevationVsConsolidated");
        }
        if self.config.enable_checks.sum_check {
            rules.push(Box::new(SumCheckRule::new(self.config)));
        } else {
            log::info!("   ⏭️  Skipping disabled rule: SumCheck");
        }
        rules
    }

    pub fn run(&self, records: &[Record]) -> Findings {
        log::info!(
            "⚙️  Running checks on {} records (tolerance {} mm)",
            records.len(),
            self.config.tolerance_mm
        );

        let mut findings = Findings::default();
        for rule in self.enabled_rules() {
            log::info!("🔧 Applying rule: {}", rule.name());
            rule.apply(records, &mut findings);
        }
        findings
    }
}
