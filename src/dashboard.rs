use crate::error::AnalysisError;
use crate::indicators::{self, IndicatorParams, IndicatorReport, PriceSeries, Signal};
use crate::options::{self, ChainReport, OptionChainSnapshot};
use rayon::prelude::*;
use serde::Serialize;

/// Outcome of one dashboard section. A failed section carries the error
/// kind and a user-facing message instead of data.
#[derive(Debug, Clone, Serialize)]
pub struct SectionOutcome<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    pub error_kind: Option<&'static str>,
    pub message: Option<String>,
}

impl<T> From<Result<T, AnalysisError>> for SectionOutcome<T> {
    fn from(result: Result<T, AnalysisError>) -> Self {
        match result {
            Ok(data) => Self {
                data: Some(data),
                error: None,
                error_kind: None,
                message: None,
            },
            Err(e) => Self {
                data: None,
                error: Some(e.to_string()),
                error_kind: Some(e.kind()),
                message: Some(e.user_message()),
            },
        }
    }
}

impl<T> SectionOutcome<T> {
    pub fn is_ok(&self) -> bool {
        self.data.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub ticker: String,
    pub symbol: String,
    pub indicators: SectionOutcome<IndicatorReport>,
    pub option_chain: SectionOutcome<ChainReport>,
}

impl DashboardReport {
    /// Combine the two feed results. Each section is evaluated on its own,
    /// so a failure in one never hides the other.
    pub fn from_results(
        ticker: &str,
        symbol: &str,
        prices: Result<PriceSeries, AnalysisError>,
        snapshot: Result<OptionChainSnapshot, AnalysisError>,
        params: &IndicatorParams,
    ) -> Self {
        let indicators = prices.and_then(|series| indicators::build_report(&series, params));
        let option_chain = snapshot.and_then(|snap| options::build_chain_report(&snap));

        Self {
            ticker: ticker.to_string(),
            symbol: symbol.to_string(),
            indicators: indicators.into(),
            option_chain: option_chain.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub ticker: String,
    pub outcome: SectionOutcome<IndicatorReport>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub buy: usize,
    pub sell: usize,
    pub hold: usize,
}

/// Run the indicator engine over already-fetched series on the rayon pool.
/// Output order matches input order.
pub fn analyze_batch(
    fetched: Vec<(String, Result<PriceSeries, AnalysisError>)>,
    params: &IndicatorParams,
) -> Vec<BatchEntry> {
    fetched
        .into_par_iter()
        .map(|(ticker, prices)| {
            let report = prices.and_then(|series| indicators::build_report(&series, params));
            BatchEntry {
                ticker,
                outcome: report.into(),
            }
        })
        .collect()
}

pub fn summarize_batch(entries: &[BatchEntry]) -> BatchSummary {
    let mut summary = BatchSummary {
        total: entries.len(),
        ..Default::default()
    };
    for entry in entries {
        match &entry.outcome.data {
            Some(report) => {
                summary.successful += 1;
                match report.signal {
                    Signal::Buy => summary.buy += 1,
                    Signal::Sell => summary.sell += 1,
                    Signal::Hold => summary.hold += 1,
                }
            }
            None => summary.failed += 1,
        }
    }
    summary
}
