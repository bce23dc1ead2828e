use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One daily bar from the price feed. `close` is `None` when the provider
/// returned a null bar (holiday, halted session, partial day).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: Option<f64>,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close: Some(close) }
    }

    pub fn missing(date: NaiveDate) -> Self {
        Self { date, close: None }
    }
}

/// Daily closes for a single ticker, ordered by date ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub ticker: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self { ticker: ticker.into(), points }
    }

    /// Build a series of consecutive calendar days starting at `start`.
    pub fn from_closes(ticker: impl Into<String>, start: NaiveDate, closes: &[f64]) -> Self {
        let points = closes
            .iter()
            .zip(start.iter_days())
            .map(|(&close, date)| PricePoint::new(date, close))
            .collect();
        Self::new(ticker, points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.points.iter().filter(|p| p.close.is_none()).count()
    }
}

/// SMA and RSI aligned with the usable closes they were computed from.
/// `None` marks positions without enough history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<f64>,
    pub sma_window: usize,
    pub rsi_window: usize,
    pub sma: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
}

/// Latest point where price, SMA and RSI are all defined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatestReading {
    pub date: NaiveDate,
    pub close: f64,
    pub sma: f64,
    pub rsi: f64,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn latest(&self) -> Option<LatestReading> {
        (0..self.len()).rev().find_map(|i| match (self.sma[i], self.rsi[i]) {
            (Some(sma), Some(rsi)) => Some(LatestReading {
                date: self.dates[i],
                close: self.closes[i],
                sma,
                rsi,
            }),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        };
        write!(f, "{}", label)
    }
}

/// Where the RSI sits relative to the overbought/oversold bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiZone {
    Overbought,
    Neutral,
    Oversold,
}

/// Window sizes and thresholds used by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub sma_window: usize,
    pub rsi_window: usize,
    pub overbought: f64,
    pub oversold: f64,
    /// Floor on usable closes, applied on top of `max(sma, rsi) + 1`
    pub min_points: usize,
    pub max_missing: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        use crate::config;
        Self {
            sma_window: config::SMA_WINDOW,
            rsi_window: config::RSI_WINDOW,
            overbought: config::RSI_OVERBOUGHT,
            oversold: config::RSI_OVERSOLD,
            min_points: config::MIN_CLEAN_POINTS,
            max_missing: config::MAX_MISSING_CLOSES,
        }
    }
}

impl IndicatorParams {
    pub fn required_points(&self) -> usize {
        (self.sma_window.max(self.rsi_window) + 1).max(self.min_points)
    }

    pub fn rsi_zone(&self, rsi: f64) -> RsiZone {
        if rsi >= self.overbought {
            RsiZone::Overbought
        } else if rsi <= self.oversold {
            RsiZone::Oversold
        } else {
            RsiZone::Neutral
        }
    }
}

/// Everything the presentation layer needs for one ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorReport {
    pub ticker: String,
    pub signal: Signal,
    pub latest: LatestReading,
    pub rsi_zone: RsiZone,
    pub series: IndicatorSeries,
}
