pub mod api_server;
pub mod app_config;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod indicators;
pub mod logging;
pub mod options;

// Re-exports for convenience
pub use error::AnalysisError;
pub use indicators::{
    compute_indicators, IndicatorParams, IndicatorSeries, PricePoint, PriceSeries, Signal,
};
pub use options::{summarize_chain, ChainSummary, OptionChainSnapshot, OptionRecord};
