use crate::types::*;
use std::collections::BTreeMap;

/// Result of joining elevation callouts against the consolidated list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossReferenceOutcome {
    pub rows: Vec<MismatchRow>,
    pub audit: CrossReferenceAudit,
}

/// First record per module, in original record order
fn first_by_module<'a, F>(records: &'a [Record], keep: F) -> BTreeMap<&'a str, &'a ModuleDimensionRecord>
where
    F: Fn(SectionContext) -> bool,
{
    let mut firsts = BTreeMap::new();
    for record in records.iter().filter_map(Record::as_module_dim) {
        if keep(record.context) {
            firsts.entry(record.module.as_str()).or_insert(record);
        }
    }
    firsts
}

/// Compare elevation dimensions with the consolidated list, module by module.
///
/// Later mentions of a module within the same group are ignored. Modules seen
/// on only one side produce no row; they are listed in the audit instead.
pub fn compare_with_audit(records: &[Record], tolerance_mm: u32) -> CrossReferenceOutcome {
    let elevation = first_by_module(records, |ctx| ctx.is_elevation());
    let consolidated = first_by_module(records, |ctx| ctx == SectionContext::Consolidated);

    let mut outcome = CrossReferenceOutcome::default();

    for (module, elev) in &elevation {
        let Some(cons) = consolidated.get(module) else {
            outcome.audit.elevation_only.push(module.to_string());
            continue;
        };
        outcome.audit.compared += 1;

        let mismatches: Vec<AxisMismatch> = Axis::ALL
            .iter()
            .filter_map(|&axis| {
                let e = elev.dimensions.get(axis);
                let c = cons.dimensions.get(axis);
                let delta = i64::from(e) - i64::from(c);
                (delta.unsigned_abs() > u64::from(tolerance_mm)).then_some(AxisMismatch {
                    axis,
                    elevation: e,
                    consolidated: c,
                    delta,
                })
            })
            .collect();

        if mismatches.is_empty() {
            continue;
        }

        outcome.rows.push(MismatchRow {
            module: module.to_string(),
            elevation: elev.dimensions,
            consolidated: cons.dimensions,
            mismatches,
            tolerance_mm,
            elevation_context: elev.context,
            elevation_page: elev.page,
            consolidated_page: cons.page,
        });
    }

    outcome.audit.consolidated_only = consolidated
        .keys()
        .filter(|module| !elevation.contains_key(*module))
        .map(|module| module.to_string())
        .collect();

    if !outcome.audit.elevation_only.is_empty() {
        log::debug!(
            "   ↪️  Not in consolidated list, skipped: {}",
            outcome.audit.elevation_only.join(", ")
        );
    }
    if !outcome.audit.consolidated_only.is_empty() {
        log::debug!(
            "   ↪️  Not on any elevation, skipped: {}",
            outcome.audit.consolidated_only.join(", ")
        );
    }

    outcome
}

/// Mismatch rows only
pub fn compare(records: &[Record], tolerance_mm: u32) -> Vec<MismatchRow> {
    compare_with_audit(records, tolerance_mm).rows
}
