use super::models::{PricePoint, PriceSeries};
use crate::config;
use crate::error::AnalysisError;
use crate::http::{self, StatusError};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

// -----------------------------------------------
// YAHOO CHART WIRE FORMAT
// -----------------------------------------------
#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub timestamp: Option<Vec<i64>>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    pub quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

/// Convert a chart payload into a price series.
///
/// An unknown symbol yields an empty series rather than an error; the
/// indicator engine reports that as insufficient data. Repeated dates keep
/// the latest bar.
pub fn parse_chart(ticker: &str, body: &str) -> Result<PriceSeries, AnalysisError> {
    let response: ChartResponse = serde_json::from_str(body)?;

    if let Some(err) = response.chart.error {
        if err.code.eq_ignore_ascii_case("Not Found") {
            return Ok(PriceSeries::new(ticker, Vec::new()));
        }
        return Err(AnalysisError::FeedUnavailable(format!(
            "{}: {}",
            err.code, err.description
        )));
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceSeries::new(ticker, Vec::new()));
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    if closes.len() != timestamps.len() {
        return Err(AnalysisError::FeedUnavailable(format!(
            "malformed payload: {} timestamps but {} closes",
            timestamps.len(),
            closes.len()
        )));
    }

    let mut points: Vec<PricePoint> = Vec::with_capacity(timestamps.len());
    for (ts, close) in timestamps.into_iter().zip(closes) {
        let date = timestamp_to_date(ts)?;
        let point = PricePoint { date, close };
        match points.last_mut() {
            Some(last) if last.date == date => *last = point,
            _ => points.push(point),
        }
    }

    Ok(PriceSeries::new(ticker, points))
}

fn timestamp_to_date(ts: i64) -> Result<NaiveDate, AnalysisError> {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| AnalysisError::FeedUnavailable(format!("bad timestamp {}", ts)))
}

// -----------------------------------------------
// PRICE FEED CLIENT
// -----------------------------------------------
pub struct PriceClient {
    client: Client,
}

impl PriceClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: http::build_client()?,
        })
    }

    async fn fetch_chart_body(&self, ticker: &str, range: &str) -> Result<Option<String>> {
        let url = config::yahoo_chart_url(ticker, range, config::DEFAULT_PRICE_INTERVAL);
        info!(ticker, range, "Fetching price history");

        match http::fetch_json(&self.client, &url, &[]).await {
            Ok(text) => Ok(Some(text)),
            Err(e) => {
                // Yahoo answers unknown symbols with a 404 JSON body
                let not_found = matches!(
                    e.downcast_ref::<StatusError>(),
                    Some(s) if s.status == StatusCode::NOT_FOUND
                );
                if not_found {
                    warn!(ticker, "Symbol not found by price feed");
                    return Ok(None);
                }
                Err(e).with_context(|| format!("Price feed failed for {}", ticker))
            }
        }
    }

    /// Daily closes for `ticker` over `range` (e.g. "6mo").
    pub async fn fetch_price_series(
        &self,
        ticker: &str,
        range: &str,
    ) -> Result<PriceSeries, AnalysisError> {
        match self.fetch_chart_body(ticker, range).await? {
            Some(body) => parse_chart(ticker, &body),
            None => Ok(PriceSeries::new(ticker, Vec::new())),
        }
    }

    /// Fetch several tickers with at most `max_concurrent` requests in flight.
    /// Results keep the input order.
    pub async fn fetch_many(
        self: Arc<Self>,
        tickers: Vec<String>,
        range: String,
        max_concurrent: usize,
    ) -> Vec<(String, Result<PriceSeries, AnalysisError>)> {
        let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
        let mut handles = vec![];

        for ticker in tickers.iter().cloned() {
            let client = Arc::clone(&self);
            let sem = Arc::clone(&semaphore);
            let range = range.clone();

            let handle = tokio::spawn(async move {
                let _permit = sem
                    .acquire_owned()
                    .await
                    .map_err(|e| AnalysisError::FeedUnavailable(format!("Semaphore error: {}", e)))?;
                client.fetch_price_series(&ticker, &range).await
            });

            handles.push(handle);
        }

        let joined = futures::future::join_all(handles).await;
        tickers
            .into_iter()
            .zip(joined)
            .map(|(ticker, res)| {
                let result = res.unwrap_or_else(|e| {
                    Err(AnalysisError::FeedUnavailable(format!("Task error: {}", e)))
                });
                (ticker, result)
            })
            .collect()
    }
}
