use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SecurityType {
    Equity,
    Indices,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Security {
    pub symbol: String,
    pub security_type: SecurityType,
}

impl Security {
    pub fn equity(symbol: String) -> Self {
        Self { symbol, security_type: SecurityType::Equity }
    }

    pub fn index(symbol: String) -> Self {
        Self { symbol, security_type: SecurityType::Indices }
    }

    /// Index if the symbol is one of the known NSE indices, equity otherwise
    pub fn from_symbol(symbol: &str) -> Self {
        let symbol = symbol.trim().to_uppercase();
        if crate::config::NSE_INDICES.contains(&symbol.as_str()) {
            Self::index(symbol)
        } else {
            Self::equity(symbol)
        }
    }

    pub fn type_param(&self) -> &'static str {
        match self.security_type {
            SecurityType::Equity => "Equity",
            SecurityType::Indices => "Indices",
        }
    }
}

// -----------------------------------------------
// NSE WIRE FORMAT
// -----------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractInfo {
    #[serde(rename = "expiryDates")]
    pub expiry_dates: Vec<String>,

    #[serde(rename = "strikePrice", default)]
    pub strike_prices: Vec<String>,
}

/// Main response structure from NSE option chain API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionChain {
    pub records: Records,
    #[serde(default)]
    pub filtered: Option<FilteredData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Records {
    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(rename = "underlyingValue", default)]
    pub underlying_value: Option<f64>,

    #[serde(default)]
    pub data: Vec<OptionData>,
}

/// Current-expiry subset of the chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilteredData {
    #[serde(default)]
    pub data: Vec<OptionData>,
}

/// Option data for each strike price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionData {
    #[serde(rename = "expiryDates", default)]
    pub expiry_date: Option<String>,

    #[serde(rename = "strikePrice")]
    pub strike_price: Option<f64>,

    #[serde(rename = "CE")]
    pub call: Option<OptionDetail>,

    #[serde(rename = "PE")]
    pub put: Option<OptionDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionDetail {
    #[serde(rename = "openInterest")]
    pub open_interest: Option<f64>,
}

fn open_interest(detail: Option<&OptionDetail>, strike: f64, side: &str) -> Result<u64, AnalysisError> {
    let Some(oi) = detail.and_then(|d| d.open_interest) else {
        return Ok(0);
    };
    // u64::MAX as f64 rounds up to 2^64, which is itself out of range
    if !oi.is_finite() || oi < 0.0 || oi.fract() != 0.0 || oi >= u64::MAX as f64 {
        return Err(AnalysisError::FeedUnavailable(format!(
            "malformed payload: {} open interest {} at strike {}",
            side, oi, strike
        )));
    }
    Ok(oi as u64)
}

impl OptionData {
    /// Strict conversion; any missing strike or bad OI rejects the record.
    pub fn to_record(&self) -> Result<OptionRecord, AnalysisError> {
        let strike = self.strike_price.ok_or_else(|| {
            AnalysisError::FeedUnavailable("malformed payload: strike without strikePrice".to_string())
        })?;
        Ok(OptionRecord {
            strike,
            call_oi: open_interest(self.call.as_ref(), strike, "CE")?,
            put_oi: open_interest(self.put.as_ref(), strike, "PE")?,
        })
    }
}

impl OptionChain {
    /// Records for `expiry`: the filtered section when NSE provides it,
    /// otherwise the full record list narrowed to that expiry.
    pub fn into_snapshot(self, symbol: &str, expiry: &str) -> Result<OptionChainSnapshot, AnalysisError> {
        let data: Vec<OptionData> = match self.filtered {
            Some(filtered) if !filtered.data.is_empty() => filtered.data,
            _ => self
                .records
                .data
                .into_iter()
                .filter(|d| d.expiry_date.as_deref().is_none_or(|e| e.eq_ignore_ascii_case(expiry)))
                .collect(),
        };

        let records = data
            .iter()
            .map(OptionData::to_record)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OptionChainSnapshot {
            symbol: symbol.to_string(),
            expiry: expiry.to_string(),
            timestamp: self.records.timestamp,
            underlying_value: self.records.underlying_value,
            records,
        })
    }
}

// -----------------------------------------------
// SUMMARIZER TYPES
// -----------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionRecord {
    pub strike: f64,
    pub call_oi: u64,
    pub put_oi: u64,
}

impl OptionRecord {
    pub fn new(strike: f64, call_oi: u64, put_oi: u64) -> Self {
        Self { strike, call_oi, put_oi }
    }
}

/// Option chain for one expiry, records in the order the feed sent them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChainSnapshot {
    pub symbol: String,
    pub expiry: String,
    pub timestamp: Option<String>,
    pub underlying_value: Option<f64>,
    pub records: Vec<OptionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSummary {
    pub total_call_oi: u64,
    pub total_put_oi: u64,
    pub put_call_ratio: f64,
    /// Highest call OI first
    pub top_resistance: Vec<OptionRecord>,
    /// Highest put OI first
    pub top_support: Vec<OptionRecord>,
    /// First resistance strike that is also a support strike. An
    /// approximation; not the writer-loss definition of max pain.
    pub max_pain_strike: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainReport {
    pub symbol: String,
    pub expiry: String,
    pub timestamp: Option<String>,
    pub underlying_value: Option<f64>,
    pub strikes: usize,
    pub summary: ChainSummary,
}
