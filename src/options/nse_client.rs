use super::models::{ContractInfo, OptionChain, OptionChainSnapshot, Security};
use crate::config;
use crate::error::AnalysisError;
use crate::http;
use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use reqwest::Client;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

// -----------------------------------------------
// CLIENT WRAPPER WITH SESSION STATE
// -----------------------------------------------
pub struct NSEClient {
    client: Client,
    warmed_up: RwLock<bool>,
}

/// Nearest usable expiry as of `now`.
///
/// Past dates are skipped; today's expiry is usable until the 15:30 cutoff.
pub fn select_expiry(expiry_dates: &[String], now: NaiveDateTime) -> Result<&String> {
    if expiry_dates.is_empty() {
        return Err(anyhow!("No expiry dates found"));
    }

    let mut parsed: Vec<(NaiveDate, usize)> = Vec::with_capacity(expiry_dates.len());
    for (idx, s) in expiry_dates.iter().enumerate() {
        let d = NaiveDate::parse_from_str(s, config::EXPIRY_DATE_FORMAT)
            .with_context(|| format!("Failed to parse expiry date: {}", s))?;
        parsed.push((d, idx));
    }
    parsed.sort_by_key(|(d, _)| *d);

    let today = now.date();
    let cutoff = NaiveTime::from_hms_opt(config::EXPIRY_CUTOFF_HOUR, config::EXPIRY_CUTOFF_MINUTE, 0)
        .ok_or_else(|| anyhow!("Invalid expiry cutoff time"))?;

    parsed
        .into_iter()
        .find(|(date, _)| *date > today || (*date == today && now.time() < cutoff))
        .map(|(_, idx)| &expiry_dates[idx])
        .ok_or_else(|| anyhow!("No valid expiry found (all past or after cutoff)"))
}

impl NSEClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: http::build_client()?,
            warmed_up: RwLock::new(false),
        })
    }

    /// Warmup NSE session (only once per client); NSE hands out the cookies
    /// its API checks on the HTML home page.
    async fn warmup_if_needed(&self) -> Result<()> {
        if *self.warmed_up.read().await {
            return Ok(());
        }

        let mut warmed = self.warmed_up.write().await;
        if !*warmed {
            debug!("Warming up NSE session");
            let _ = self
                .client
                .get(config::NSE_BASE_URL)
                .header("Accept", config::HEADER_ACCEPT_HTML)
                .send()
                .await
                .context("Failed to warm up NSE session")?;

            tokio::time::sleep(Duration::from_millis(config::WARMUP_DELAY_MS)).await;
            *warmed = true;
        }

        Ok(())
    }

    async fn fetch_json(&self, url: &str) -> Result<String> {
        self.warmup_if_needed().await?;
        http::fetch_json(
            &self.client,
            url,
            &[
                ("Referer", config::HEADER_REFERER),
                ("X-Requested-With", config::HEADER_X_REQUESTED_WITH),
            ],
        )
        .await
    }

    pub async fn fetch_contract_info(&self, symbol: &str) -> Result<ContractInfo> {
        let url = config::nse_contract_info_url(symbol);
        let text = self.fetch_json(&url).await?;
        let info: ContractInfo =
            serde_json::from_str(&text).context("Failed to parse contract info")?;

        Ok(info)
    }

    pub async fn fetch_option_chain(&self, security: &Security, expiry: &str) -> Result<OptionChain> {
        let url = config::nse_option_chain_url(security.type_param(), &security.symbol, expiry);
        let text = self.fetch_json(&url).await?;
        let chain: OptionChain =
            serde_json::from_str(&text).context("Failed to parse option chain")?;

        Ok(chain)
    }

    async fn resolve_expiry(&self, security: &Security, expiry: Option<&str>) -> Result<String> {
        if let Some(expiry) = expiry {
            return Ok(expiry.to_string());
        }
        let contract_info = self.fetch_contract_info(&security.symbol).await?;
        let expiry = select_expiry(&contract_info.expiry_dates, Local::now().naive_local())?;
        info!(symbol = %security.symbol, %expiry, "Selected nearest expiry");
        Ok(expiry.clone())
    }

    /// Fetch and convert a full snapshot. Every failure on the way, including
    /// a single malformed strike, comes back as `FeedUnavailable`.
    pub async fn fetch_snapshot(
        &self,
        symbol: &str,
        expiry: Option<&str>,
    ) -> Result<OptionChainSnapshot, AnalysisError> {
        let security = Security::from_symbol(symbol);
        let expiry = self.resolve_expiry(&security, expiry).await?;

        info!(symbol = %security.symbol, %expiry, "Fetching option chain");
        let chain = self.fetch_option_chain(&security, &expiry).await?;
        let snapshot = chain.into_snapshot(&security.symbol, &expiry)?;
        debug!(strikes = snapshot.records.len(), "Option chain converted");

        Ok(snapshot)
    }
}
