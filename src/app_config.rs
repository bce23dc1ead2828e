use crate::config;
use std::time::Duration;

/// Application configuration gathered from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: String,
    pub ticker: String,
    pub tickers: Vec<String>,
    pub index_symbol: String,
    pub expiry: Option<String>,
    pub range: String,
    pub port: u16,
    pub cache_ttl: Duration,
    pub max_concurrent: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            mode: config::get_execution_mode(),
            ticker: config::get_ticker().trim().to_uppercase(),
            tickers: config::get_batch_tickers(),
            index_symbol: config::get_index_symbol().trim().to_uppercase(),
            expiry: config::get_expiry(),
            range: config::get_price_range(),
            port: config::get_port(),
            cache_ttl: config::get_cache_ttl(),
            max_concurrent: config::get_max_concurrent(),
        }
    }
}
