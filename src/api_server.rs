use crate::config;
use crate::dashboard::{self, BatchEntry, BatchSummary, DashboardReport};
use crate::error::AnalysisError;
use crate::indicators::{self, IndicatorParams, IndicatorReport, PriceClient, PriceSeries};
use crate::options::{self, ChainReport, NSEClient, OptionChainSnapshot};
use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

// -----------------------------------------------
// API REQUEST/RESPONSE MODELS
// -----------------------------------------------

#[derive(Debug, Deserialize)]
pub struct IndicatorsQuery {
    pub ticker: String,
    pub range: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OptionChainQuery {
    pub symbol: String,
    pub expiry: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub ticker: String,
    pub symbol: Option<String>,
    pub range: Option<String>,
    pub expiry: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub tickers: Vec<String>,
    pub range: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub error_kind: Option<&'static str>,
    pub processing_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    fn from_result(result: Result<T, AnalysisError>, start_time: Instant) -> Self {
        let processing_time_ms = Some(start_time.elapsed().as_millis() as u64);
        match result {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
                error_kind: None,
                processing_time_ms,
            },
            Err(e) => Self {
                success: false,
                data: None,
                error: Some(e.to_string()),
                error_kind: Some(e.kind()),
                processing_time_ms,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub summary: BatchSummary,
    pub results: Vec<BatchEntry>,
}

// -----------------------------------------------
// APPLICATION STATE
// -----------------------------------------------

/// Feed results cached for a fixed time-to-live. Only successful fetches are
/// stored; the indicator and chain computations always rerun.
#[derive(Default)]
struct Cache {
    prices: HashMap<(String, String), (PriceSeries, Instant)>,
    snapshots: HashMap<(String, String), (OptionChainSnapshot, Instant)>,
}

impl Cache {
    /// Drop every entry older than `ttl`. Run on each write so keys from
    /// one-off requests do not pile up.
    fn evict_expired(&mut self, ttl: Duration) {
        self.prices.retain(|_, (_, cached_at)| cached_at.elapsed() < ttl);
        self.snapshots.retain(|_, (_, cached_at)| cached_at.elapsed() < ttl);
    }
}

#[derive(Clone)]
pub struct AppState {
    price_client: Arc<PriceClient>,
    nse_client: Arc<NSEClient>,
    cache: Arc<RwLock<Cache>>,
    cache_ttl: Duration,
    params: IndicatorParams,
}

impl AppState {
    pub fn new(cache_ttl: Duration) -> Result<Self> {
        Ok(Self {
            price_client: Arc::new(PriceClient::new()?),
            nse_client: Arc::new(NSEClient::new()?),
            cache: Arc::new(RwLock::new(Cache::default())),
            cache_ttl,
            params: IndicatorParams::default(),
        })
    }

    async fn prices(&self, ticker: &str, range: &str) -> Result<PriceSeries, AnalysisError> {
        let key = (ticker.to_uppercase(), range.to_string());
        {
            let cache = self.cache.read().await;
            if let Some((series, cached_at)) = cache.prices.get(&key) {
                if cached_at.elapsed() < self.cache_ttl {
                    debug!(ticker, "Price cache hit");
                    return Ok(series.clone());
                }
            }
        }

        let series = self.price_client.fetch_price_series(&key.0, range).await?;
        let mut cache = self.cache.write().await;
        cache.evict_expired(self.cache_ttl);
        cache.prices.insert(key, (series.clone(), Instant::now()));
        Ok(series)
    }

    async fn snapshot(
        &self,
        symbol: &str,
        expiry: Option<&str>,
    ) -> Result<OptionChainSnapshot, AnalysisError> {
        let key = (symbol.to_uppercase(), expiry.unwrap_or_default().to_string());
        {
            let cache = self.cache.read().await;
            if let Some((snapshot, cached_at)) = cache.snapshots.get(&key) {
                if cached_at.elapsed() < self.cache_ttl {
                    debug!(symbol, "Option chain cache hit");
                    return Ok(snapshot.clone());
                }
            }
        }

        let snapshot = self.nse_client.fetch_snapshot(&key.0, expiry).await?;
        let mut cache = self.cache.write().await;
        cache.evict_expired(self.cache_ttl);
        cache.snapshots.insert(key, (snapshot.clone(), Instant::now()));
        Ok(snapshot)
    }
}

// -----------------------------------------------
// API HANDLERS
// -----------------------------------------------

/// GET /api/health
async fn health() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::from_result(Ok("ok"), Instant::now()))
}

/// GET /api/indicators?ticker=RELIANCE.NS
async fn get_indicators(
    Query(query): Query<IndicatorsQuery>,
    State(app_state): State<AppState>,
) -> Json<ApiResponse<IndicatorReport>> {
    let start_time = Instant::now();
    let range = query.range.unwrap_or_else(|| config::DEFAULT_PRICE_RANGE.to_string());

    let result = app_state
        .prices(&query.ticker, &range)
        .await
        .and_then(|series| indicators::build_report(&series, &app_state.params));

    Json(ApiResponse::from_result(result, start_time))
}

/// GET /api/option-chain?symbol=NIFTY[&expiry=30-Dec-2025]
async fn get_option_chain(
    Query(query): Query<OptionChainQuery>,
    State(app_state): State<AppState>,
) -> Json<ApiResponse<ChainReport>> {
    let start_time = Instant::now();

    let result = app_state
        .snapshot(&query.symbol, query.expiry.as_deref())
        .await
        .and_then(|snapshot| options::build_chain_report(&snapshot));

    Json(ApiResponse::from_result(result, start_time))
}

/// GET /api/dashboard?ticker=RELIANCE.NS&symbol=NIFTY
async fn get_dashboard(
    Query(query): Query<DashboardQuery>,
    State(app_state): State<AppState>,
) -> Json<ApiResponse<DashboardReport>> {
    let start_time = Instant::now();
    let range = query.range.unwrap_or_else(|| config::DEFAULT_PRICE_RANGE.to_string());
    let symbol = query.symbol.unwrap_or_else(|| "NIFTY".to_string());

    let (prices, snapshot) = tokio::join!(
        app_state.prices(&query.ticker, &range),
        app_state.snapshot(&symbol, query.expiry.as_deref()),
    );

    let report =
        DashboardReport::from_results(&query.ticker, &symbol, prices, snapshot, &app_state.params);
    Json(ApiResponse::from_result(Ok(report), start_time))
}

/// POST /api/batch-indicators
async fn run_batch_indicators(
    State(app_state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<ApiResponse<BatchResponse>>, StatusCode> {
    let start_time = Instant::now();
    if request.tickers.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let range = request.range.unwrap_or_else(|| config::DEFAULT_PRICE_RANGE.to_string());

    let state = &app_state;
    let range = range.as_str();
    let fetched = futures::future::join_all(
        request
            .tickers
            .iter()
            .map(|ticker| async move { (ticker.clone(), state.prices(ticker, range).await) }),
    )
    .await;

    let params = app_state.params;
    let results = tokio::task::spawn_blocking(move || dashboard::analyze_batch(fetched, &params))
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let summary = dashboard::summarize_batch(&results);

    Ok(Json(ApiResponse::from_result(
        Ok(BatchResponse { summary, results }),
        start_time,
    )))
}

// -----------------------------------------------
// SERVER SETUP
// -----------------------------------------------

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/indicators", get(get_indicators))
        .route("/api/option-chain", get(get_option_chain))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/batch-indicators", post(run_batch_indicators))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state)
}

pub async fn start_server(port: u16, cache_ttl: Duration) -> Result<()> {
    let app = router(AppState::new(cache_ttl)?);

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, cache_ttl_secs = cache_ttl.as_secs(), "Stock AI API server listening");
    println!("🚀 Stock AI API Server running on http://{}", addr);
    println!("📋 Available endpoints:");
    println!("   GET  /api/health");
    println!("   GET  /api/indicators?ticker=RELIANCE.NS");
    println!("   GET  /api/option-chain?symbol=NIFTY");
    println!("   GET  /api/dashboard?ticker=RELIANCE.NS&symbol=NIFTY");
    println!("   POST /api/batch-indicators  {{\"tickers\": [\"TCS.NS\", \"INFY.NS\"]}}");
    println!();

    axum::serve(listener, app).await?;
    Ok(())
}
