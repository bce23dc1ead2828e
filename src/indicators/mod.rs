pub mod engine;
pub mod models;
pub mod price_client;

// Re-exports (public API)
pub use engine::{build_report, compute_indicators, derive_signal, rsi, sma};
pub use models::{
    IndicatorParams, IndicatorReport, IndicatorSeries, LatestReading, PricePoint, PriceSeries,
    RsiZone, Signal,
};
pub use price_client::PriceClient;
