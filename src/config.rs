use std::time::Duration;

// -----------------------------------------------
// PRICE FEED ENDPOINTS
// -----------------------------------------------
pub const YAHOO_CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
pub const DEFAULT_PRICE_RANGE: &str = "6mo";
pub const DEFAULT_PRICE_INTERVAL: &str = "1d";

pub fn yahoo_chart_url(ticker: &str, range: &str, interval: &str) -> String {
    format!(
        "{}/{}?range={}&interval={}&includePrePost=false",
        YAHOO_CHART_BASE_URL,
        urlencoding::encode(ticker),
        urlencoding::encode(range),
        urlencoding::encode(interval)
    )
}

// -----------------------------------------------
// NSE API ENDPOINTS
// -----------------------------------------------
pub const NSE_BASE_URL: &str = "https://www.nseindia.com";

pub fn nse_contract_info_url(symbol: &str) -> String {
    format!(
        "{}/api/option-chain-contract-info?symbol={}",
        NSE_BASE_URL,
        urlencoding::encode(symbol)
    )
}

pub fn nse_option_chain_url(typ: &str, symbol: &str, expiry: &str) -> String {
    format!(
        "{}/api/option-chain-v3?type={}&symbol={}&expiry={}",
        NSE_BASE_URL,
        typ,
        urlencoding::encode(symbol),
        urlencoding::encode(expiry)
    )
}

pub const NSE_INDICES: &[&str] = &["NIFTY", "BANKNIFTY", "FINNIFTY", "MIDCPNIFTY", "NIFTYNXT50"];

// -----------------------------------------------
// HTTP CLIENT CONFIG
// -----------------------------------------------
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                               AppleWebKit/537.36 (KHTML, like Gecko) \
                               Chrome/131.0.0.0 Safari/537.36";

pub const ACCEPT_LANGUAGES: &[&str] = &[
    "en-US,en;q=0.9",
    "en-GB,en;q=0.8",
    "en-IN,en;q=0.9",
];

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

// -----------------------------------------------
// SESSION WARMUP
// -----------------------------------------------
pub const WARMUP_DELAY_MS: u64 = 200;

// NSE stops serving the current day's expiry after market close.
pub const EXPIRY_CUTOFF_HOUR: u32 = 15;
pub const EXPIRY_CUTOFF_MINUTE: u32 = 30;
pub const EXPIRY_DATE_FORMAT: &str = "%d-%b-%Y";

// -----------------------------------------------
// RETRY CONFIG
// -----------------------------------------------
pub const RETRY_BASE_DELAY_MS: u64 = 100;
pub const RETRY_FACTOR: u64 = 2;
pub const RETRY_MAX_DELAY_SECS: u64 = 3;
pub const RETRY_MAX_ATTEMPTS: usize = 3;

// -----------------------------------------------
// CONCURRENCY LIMITS
// -----------------------------------------------
pub const DEFAULT_MAX_CONCURRENT: usize = 5;

// -----------------------------------------------
// HTTP HEADERS
// -----------------------------------------------
pub const HEADER_REFERER: &str = "https://www.nseindia.com/";
pub const HEADER_X_REQUESTED_WITH: &str = "XMLHttpRequest";
pub const HEADER_ACCEPT_HTML: &str = "text/html";

// -----------------------------------------------
// INDICATOR DEFAULTS
// -----------------------------------------------
pub const SMA_WINDOW: usize = 20;
pub const RSI_WINDOW: usize = 14;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;
pub const MIN_CLEAN_POINTS: usize = 30;
pub const MAX_MISSING_CLOSES: usize = 5;

// -----------------------------------------------
// OPTION CHAIN SUMMARY
// -----------------------------------------------
pub const TOP_STRIKES: usize = 3;

// -----------------------------------------------
// SERVER CACHE
// -----------------------------------------------
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_PORT: u16 = 3001;

// -----------------------------------------------
// RUNTIME CONFIGURATION
// -----------------------------------------------

/// Get the execution mode from environment or default to dashboard
pub fn get_execution_mode() -> String {
    std::env::var("STOCK_AI_MODE").unwrap_or_else(|_| "dashboard".to_string())
}

pub fn get_ticker() -> String {
    std::env::var("STOCK_AI_TICKER").unwrap_or_else(|_| "RELIANCE.NS".to_string())
}

/// Tickers for batch mode, comma separated
pub fn get_batch_tickers() -> Vec<String> {
    let raw = std::env::var("STOCK_AI_TICKERS")
        .unwrap_or_else(|_| "RELIANCE.NS,TCS.NS,INFY.NS".to_string());
    parse_ticker_list(&raw)
}

pub fn parse_ticker_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_uppercase())
        .collect()
}

pub fn get_index_symbol() -> String {
    std::env::var("STOCK_AI_INDEX").unwrap_or_else(|_| "NIFTY".to_string())
}

/// Explicit expiry; `None` means pick the nearest valid one
pub fn get_expiry() -> Option<String> {
    std::env::var("STOCK_AI_EXPIRY").ok().filter(|e| !e.trim().is_empty())
}

pub fn get_price_range() -> String {
    std::env::var("STOCK_AI_RANGE").unwrap_or_else(|_| DEFAULT_PRICE_RANGE.to_string())
}

pub fn get_port() -> u16 {
    std::env::var("STOCK_AI_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT)
}

pub fn get_cache_ttl() -> Duration {
    let secs = std::env::var("STOCK_AI_CACHE_TTL_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_CACHE_TTL_SECS);
    Duration::from_secs(secs)
}

pub fn get_max_concurrent() -> usize {
    if let Ok(val) = std::env::var("STOCK_AI_MAX_CONCURRENT") {
        if let Ok(num) = val.parse::<usize>() {
            return num.clamp(1, 50);
        }
    }
    DEFAULT_MAX_CONCURRENT
}
