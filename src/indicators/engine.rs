use super::models::{
    IndicatorParams, IndicatorReport, IndicatorSeries, PriceSeries, Signal,
};
use crate::error::AnalysisError;
use chrono::NaiveDate;

/// Simple Moving Average
///
/// Arithmetic mean of the trailing `window` values. Entries before
/// `window - 1` are `None`. A window of identical values yields that value
/// exactly, so a flat price never sits above or below its own average.
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return result;
    }

    for i in (window - 1)..values.len() {
        let slice = &values[(i + 1 - window)..=i];
        let first = slice[0];
        result[i] = if slice.iter().all(|v| *v == first) {
            Some(first)
        } else {
            Some(slice.iter().sum::<f64>() / window as f64)
        };
    }
    result
}

/// Relative Strength Index with simple (not Wilder) averaging.
///
/// delta[i] = values[i] - values[i-1]; AvgGain/AvgLoss are plain means of the
/// trailing `window` gains/losses, so RSI is defined from index `window`.
/// When AvgLoss is exactly zero the value saturates: 100 if there were gains,
/// 50 if the window had no movement at all.
pub fn rsi(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if window == 0 || values.len() <= window {
        return result;
    }

    let gains: Vec<f64> = values.windows(2).map(|w| (w[1] - w[0]).max(0.0)).collect();
    let losses: Vec<f64> = values.windows(2).map(|w| (w[0] - w[1]).max(0.0)).collect();

    // gains[j] is the delta ending at values[j + 1]
    for i in window..values.len() {
        let range = (i - window)..i;
        let avg_gain = gains[range.clone()].iter().sum::<f64>() / window as f64;
        let avg_loss = losses[range].iter().sum::<f64>() / window as f64;
        result[i] = Some(rsi_from_averages(avg_gain, avg_loss));
    }
    result
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return if avg_gain > 0.0 { 100.0 } else { 50.0 };
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Buy/Sell/Hold from the latest price, SMA and RSI.
///
/// RSI gates the crossover: an uptrend that is already overbought, or a
/// downtrend already oversold, is a Hold.
pub fn derive_signal(price: f64, sma: f64, rsi: f64, params: &IndicatorParams) -> Signal {
    if price > sma && rsi < params.overbought {
        Signal::Buy
    } else if price < sma && rsi > params.oversold {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

fn validate(prices: &PriceSeries) -> Result<(), AnalysisError> {
    let mut previous: Option<NaiveDate> = None;
    for point in &prices.points {
        if let Some(prev) = previous {
            if point.date <= prev {
                return Err(AnalysisError::InvalidInput(format!(
                    "dates must be strictly increasing ({} follows {})",
                    point.date, prev
                )));
            }
        }
        previous = Some(point.date);

        if let Some(close) = point.close {
            if !close.is_finite() || close < 0.0 {
                return Err(AnalysisError::InvalidInput(format!(
                    "close on {} is not a finite non-negative number: {}",
                    point.date, close
                )));
            }
        }
    }
    Ok(())
}

/// Compute SMA, RSI and the current signal for a price series.
///
/// Missing closes are dropped first; the resulting series is indexed by the
/// usable closes only.
pub fn compute_indicators(
    prices: &PriceSeries,
    params: &IndicatorParams,
) -> Result<(IndicatorSeries, Signal), AnalysisError> {
    validate(prices)?;

    let (dates, closes): (Vec<NaiveDate>, Vec<f64>) = prices
        .points
        .iter()
        .filter_map(|p| p.close.map(|c| (p.date, c)))
        .unzip();

    let required = params.required_points();
    if prices.missing_count() > params.max_missing || closes.len() < required {
        return Err(AnalysisError::InsufficientData {
            required,
            available: closes.len(),
        });
    }

    let series = IndicatorSeries {
        sma: sma(&closes, params.sma_window),
        rsi: rsi(&closes, params.rsi_window),
        sma_window: params.sma_window,
        rsi_window: params.rsi_window,
        dates,
        closes,
    };

    let latest = series.latest().ok_or(AnalysisError::InsufficientData {
        required,
        available: series.len(),
    })?;
    let signal = derive_signal(latest.close, latest.sma, latest.rsi, params);

    Ok((series, signal))
}

/// [`compute_indicators`] plus the fields the dashboard renders.
pub fn build_report(
    prices: &PriceSeries,
    params: &IndicatorParams,
) -> Result<IndicatorReport, AnalysisError> {
    let (series, signal) = compute_indicators(prices, params)?;
    let latest = series.latest().ok_or(AnalysisError::InsufficientData {
        required: params.required_points(),
        available: series.len(),
    })?;

    Ok(IndicatorReport {
        ticker: prices.ticker.clone(),
        signal,
        rsi_zone: params.rsi_zone(latest.rsi),
        latest,
        series,
    })
}
