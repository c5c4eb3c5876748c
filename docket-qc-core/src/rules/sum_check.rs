use crate::types::*;

/// Shortest chain that gets sum-checked: at least 3 parts plus a total.
/// 3-number chains stay in the record table but are too weak to judge.
pub const MIN_CHECKED_CHAIN_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SumCheckOptions {
    pub tolerance_mm: u32,
    /// Retry with the largest number as the total when the last one fails
    pub fallback_to_max: bool,
}

impl Default for SumCheckOptions {
    fn default() -> Self {
        Self {
            tolerance_mm: 0,
            fallback_to_max: true,
        }
    }
}

fn within(delta: i64, tolerance_mm: u32) -> bool {
    delta.unsigned_abs() <= u64::from(tolerance_mm)
}

/// Judge one chain. Returns None for chains too short to check.
///
/// The last number is tried as the total first. If that fails, the largest
/// number in the chain is tried instead, since layout order doesn't always put
/// the total last. That second guess is a heuristic and can produce false
/// matches as well as false mismatches.
pub fn evaluate_chain(numbers: &[u32], options: SumCheckOptions) -> Option<ChainVerdict> {
    if numbers.len() < MIN_CHECKED_CHAIN_LEN {
        return None;
    }

    let (&last, parts) = numbers.split_last()?;
    let computed_sum: u64 = parts.iter().map(|&p| u64::from(p)).sum();
    let delta_against = |total: u32| computed_sum as i64 - i64::from(total);

    let primary_delta = delta_against(last);
    if within(primary_delta, options.tolerance_mm) || !options.fallback_to_max {
        return Some(ChainVerdict {
            parts: parts.to_vec(),
            computed_sum,
            stated_total: last,
            delta: primary_delta,
            result: if within(primary_delta, options.tolerance_mm) {
                SumCheckResult::Match
            } else {
                SumCheckResult::Mismatch
            },
            total_source: TotalSource::Last,
        });
    }

    let candidate = numbers.iter().copied().max().unwrap_or(last);
    let delta = delta_against(candidate);
    Some(ChainVerdict {
        parts: parts.to_vec(),
        computed_sum,
        stated_total: candidate,
        delta,
        result: if within(delta, options.tolerance_mm) {
            SumCheckResult::Match
        } else {
            SumCheckResult::Mismatch
        },
        total_source: if candidate == last {
            TotalSource::Last
        } else {
            TotalSource::Max
        },
    })
}

/// Arithmetic outcome for one chain, before it is tied back to its record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainVerdict {
    pub parts: Vec<u32>,
    pub computed_sum: u64,
    pub stated_total: u32,
    pub delta: i64,
    pub result: SumCheckResult,
    pub total_source: TotalSource,
}

/// Sum-check every chain record in an allowed context, in record order
pub fn check_chains(
    records: &[Record],
    allowed_contexts: &[SectionContext],
    options: SumCheckOptions,
) -> Vec<SumCheckRow> {
    records
        .iter()
        .filter_map(Record::as_chain)
        .filter(|chain| allowed_contexts.contains(&chain.context))
        .filter_map(|chain| {
            let verdict = evaluate_chain(&chain.numbers, options)?;
            Some(SumCheckRow {
                context: chain.context,
                page: chain.page,
                parts: verdict.parts,
                computed_sum: verdict.computed_sum,
                stated_total: verdict.stated_total,
                delta: verdict.delta,
                result: verdict.result,
                total_source: verdict.total_source,
                line: chain.line.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn exact() -> SumCheckOptions {
        SumCheckOptions::default()
    }

    fn chain(context: SectionContext, numbers: &[u32]) -> Record {
        Record::Chain(ChainRecord {
            page: 1,
            context,
            numbers: numbers.to_vec(),
            line: String::new(),
        })
    }

    #[test]
    fn test_last_number_is_total() {
        let v = evaluate_chain(&[10, 20, 30, 60], exact()).unwrap();
        assert_eq!(v.parts, vec![10, 20, 30]);
        assert_eq!(v.computed_sum, 60);
        assert_eq!(v.stated_total, 60);
        assert_eq!(v.delta, 0);
        assert_eq!(v.result, SumCheckResult::Match);
        assert_eq!(v.total_source, TotalSource::Last);
    }

    #[test]
    fn test_fallback_max_equal_to_last_still_mismatch() {
        let v = evaluate_chain(&[10, 20, 30, 65], exact()).unwrap();
        assert_eq!(v.result, SumCheckResult::Mismatch);
        assert_eq!(v.stated_total, 65);
        assert_eq!(v.delta, -5);
        // the largest number is the last one, so the total still came from the end
        assert_eq!(v.total_source, TotalSource::Last);
    }

    #[test]
    fn test_fallback_does_not_always_rescue() {
        let v = evaluate_chain(&[10, 20, 30, 55, 65], exact()).unwrap();
        assert_eq!(v.parts, vec![10, 20, 30, 55]);
        assert_eq!(v.computed_sum, 115);
        assert_eq!(v.stated_total, 65);
        assert_eq!(v.delta, 50);
        assert_eq!(v.result, SumCheckResult::Mismatch);
    }

    #[test]
    fn test_fallback_picks_max() {
        // total printed mid-chain: parts still include it
        let v = evaluate_chain(&[600, 2000, 450, 950], exact()).unwrap();
        assert_eq!(v.stated_total, 2000);
        assert_eq!(v.total_source, TotalSource::Max);
        assert_eq!(v.delta, 3050 - 2000);
    }

    #[test]
    fn test_fallback_can_match_within_tolerance() {
        let options = SumCheckOptions {
            tolerance_mm: 20,
            fallback_to_max: true,
        };
        let v = evaluate_chain(&[10, 10, 1000, 50], options).unwrap();
        assert_eq!(v.computed_sum, 1020);
        assert_eq!(v.stated_total, 1000);
        assert_eq!(v.delta, 20);
        assert_eq!(v.result, SumCheckResult::Match);
        assert_eq!(v.total_source, TotalSource::Max);
    }

    #[test]
    fn test_tolerance_on_primary_total() {
        let options = SumCheckOptions {
            tolerance_mm: 5,
            fallback_to_max: true,
        };
        let v = evaluate_chain(&[10, 20, 30, 65], options).unwrap();
        assert_eq!(v.result, SumCheckResult::Match);
        assert_eq!(v.delta, -5);
        assert_eq!(v.total_source, TotalSource::Last);
    }

    #[test]
    fn test_strict_mode_skips_fallback() {
        let options = SumCheckOptions {
            tolerance_mm: 0,
            fallback_to_max: false,
        };
        let v = evaluate_chain(&[600, 2000, 450, 950], options).unwrap();
        assert_eq!(v.stated_total, 950);
        assert_eq!(v.total_source, TotalSource::Last);
        assert_eq!(v.result, SumCheckResult::Mismatch);
    }

    #[test]
    fn test_short_chains_are_skipped() {
        assert!(evaluate_chain(&[10, 20, 30], exact()).is_none());
        assert!(evaluate_chain(&[], exact()).is_none());
    }

    #[test]
    fn test_only_allowed_contexts_are_checked() {
        let records = vec![
            chain(SectionContext::PlanBase, &[10, 20, 30, 60]),
            chain(SectionContext::Consolidated, &[10, 20, 30, 60]),
            chain(SectionContext::Unknown, &[10, 20, 30, 60]),
            chain(SectionContext::ElevationB, &[10, 20, 30, 65]),
        ];
        let allowed = [SectionContext::PlanBase, SectionContext::ElevationB];
        let rows = check_chains(&records, &allowed, exact());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].context, SectionContext::PlanBase);
        assert_eq!(rows[0].result, SumCheckResult::Match);
        assert_eq!(rows[1].context, SectionContext::ElevationB);
        assert_eq!(rows[1].result, SumCheckResult::Mismatch);
        assert_eq!(rows[1].parts_display(), "10+20+30");
    }

    #[test]
    fn test_no_eligible_chains_gives_empty_table() {
        let records = vec![chain(SectionContext::PlanBase, &[10, 20, 30])];
        assert!(check_chains(&records, &[SectionContext::PlanBase], exact()).is_empty());
        assert!(check_chains(&[], &[SectionContext::PlanBase], exact()).is_empty());
    }
}
