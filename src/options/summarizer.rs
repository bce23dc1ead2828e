use super::models::{ChainReport, ChainSummary, OptionChainSnapshot, OptionRecord};
use crate::config;
use crate::error::AnalysisError;

/// Top `n` records by `key`, descending. `sort_by` is stable, so equal keys
/// keep their input order.
fn top_by<F>(records: &[OptionRecord], n: usize, key: F) -> Vec<OptionRecord>
where
    F: Fn(&OptionRecord) -> u64,
{
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| key(b).cmp(&key(a)));
    sorted.truncate(n);
    sorted
}

/// First strike in `resistance` order that also appears in `support`
fn common_strike(resistance: &[OptionRecord], support: &[OptionRecord]) -> Option<f64> {
    resistance
        .iter()
        .map(|r| r.strike)
        .find(|strike| support.iter().any(|s| s.strike == *strike))
}

fn checked_total<F>(records: &[OptionRecord], side: &str, key: F) -> Result<u64, AnalysisError>
where
    F: Fn(&OptionRecord) -> u64,
{
    records
        .iter()
        .try_fold(0u64, |acc, r| acc.checked_add(key(r)))
        .ok_or_else(|| AnalysisError::InvalidInput(format!("total {} open interest overflows u64", side)))
}

/// Totals, put/call ratio, top-3 resistance/support and the approximate
/// max pain strike for a list of per-strike OI records.
pub fn summarize_chain(records: &[OptionRecord]) -> Result<ChainSummary, AnalysisError> {
    if records.is_empty() {
        return Err(AnalysisError::EmptySnapshot);
    }

    if let Some(bad) = records.iter().find(|r| !r.strike.is_finite() || r.strike <= 0.0) {
        return Err(AnalysisError::InvalidInput(format!(
            "strike must be a positive number, got {}",
            bad.strike
        )));
    }

    let total_call_oi = checked_total(records, "call", |r| r.call_oi)?;
    let total_put_oi = checked_total(records, "put", |r| r.put_oi)?;

    let put_call_ratio = if total_call_oi == 0 {
        0.0
    } else {
        total_put_oi as f64 / total_call_oi as f64
    };

    let top_resistance = top_by(records, config::TOP_STRIKES, |r| r.call_oi);
    let top_support = top_by(records, config::TOP_STRIKES, |r| r.put_oi);
    let max_pain_strike = common_strike(&top_resistance, &top_support);

    Ok(ChainSummary {
        total_call_oi,
        total_put_oi,
        put_call_ratio,
        top_resistance,
        top_support,
        max_pain_strike,
    })
}

/// Summarize a fetched snapshot and attach its metadata
pub fn build_chain_report(snapshot: &OptionChainSnapshot) -> Result<ChainReport, AnalysisError> {
    let summary = summarize_chain(&snapshot.records)?;
    Ok(ChainReport {
        symbol: snapshot.symbol.clone(),
        expiry: snapshot.expiry.clone(),
        timestamp: snapshot.timestamp.clone(),
        underlying_value: snapshot.underlying_value,
        strikes: snapshot.records.len(),
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strikes(records: &[OptionRecord]) -> Vec<f64> {
        records.iter().map(|r| r.strike).collect()
    }

    #[test]
    fn test_top_by_is_stable_on_ties() {
        let records = vec![
            OptionRecord::new(100.0, 50, 0),
            OptionRecord::new(105.0, 70, 0),
            OptionRecord::new(110.0, 50, 0),
            OptionRecord::new(115.0, 50, 0),
        ];
        let top = top_by(&records, 3, |r| r.call_oi);
        assert_eq!(strikes(&top), vec![105.0, 100.0, 110.0]);
    }

    #[test]
    fn test_common_strike_follows_resistance_order() {
        let resistance = vec![
            OptionRecord::new(120.0, 9, 0),
            OptionRecord::new(110.0, 8, 0),
        ];
        let support = vec![
            OptionRecord::new(110.0, 0, 9),
            OptionRecord::new(120.0, 0, 8),
        ];
        assert_eq!(common_strike(&resistance, &support), Some(120.0));
        assert_eq!(common_strike(&resistance, &[]), None);
    }

    #[test]
    fn test_rejects_non_positive_strike() {
        let err = summarize_chain(&[OptionRecord::new(0.0, 1, 1)]).unwrap_err();
        assert_eq!(err.kind(), "InvalidInput");
    }

    #[test]
    fn test_chain_report_carries_metadata() {
        let snapshot = OptionChainSnapshot {
            symbol: "NIFTY".to_string(),
            expiry: "30-Dec-2025".to_string(),
            timestamp: Some("26-Dec-2025 15:30:00".to_string()),
            underlying_value: Some(26_042.3),
            records: vec![OptionRecord::new(26_000.0, 10, 20)],
        };
        let report = build_chain_report(&snapshot).unwrap();
        assert_eq!(report.strikes, 1);
        assert_eq!(report.summary.put_call_ratio, 2.0);
        assert_eq!(report.summary.max_pain_strike, Some(26_000.0));
    }
}
