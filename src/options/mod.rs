pub mod models;
pub mod nse_client;
pub mod summarizer;

// Re-exports (public API)
pub use models::{
    ChainReport, ChainSummary, OptionChain, OptionChainSnapshot, OptionData, OptionDetail,
    OptionRecord, Security, SecurityType,
};
pub use nse_client::{select_expiry, NSEClient};
pub use summarizer::{build_chain_report, summarize_chain};
