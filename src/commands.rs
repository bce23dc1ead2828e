use crate::api_server;
use crate::app_config::AppConfig;
use crate::config;
use crate::dashboard::{self, BatchEntry, DashboardReport, SectionOutcome};
use crate::indicators::{IndicatorParams, IndicatorReport, PriceClient, RsiZone, Signal};
use crate::options::{ChainReport, NSEClient, OptionRecord};

use anyhow::Result;
use colored::{ColoredString, Colorize};
use std::sync::Arc;
use tracing::info;

/// Price with two decimals and the rupee sign
pub fn format_price(value: f64) -> String {
    format!("₹{:.2}", value)
}

/// Thousands separators for open interest
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn signal_badge(signal: Signal) -> ColoredString {
    let label = format!(" {} ", signal);
    match signal {
        Signal::Buy => label.black().on_green().bold(),
        Signal::Sell => label.white().on_red().bold(),
        Signal::Hold => label.black().on_yellow().bold(),
    }
}

fn banner(title: &str) {
    println!("{}", "=".repeat(60).blue());
    println!("{}", title.green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();
}

/// Command handler for every execution mode
pub struct Commands;

impl Commands {
    /// Indicators for one ticker
    pub async fn run_indicators(cfg: &AppConfig) -> Result<()> {
        banner("Stock AI - Price & Indicators");

        let client = PriceClient::new()?;
        println!("{} Fetching {} of daily closes for {}...", "→".cyan(), cfg.range, cfg.ticker.yellow());

        let report = client
            .fetch_price_series(&cfg.ticker, &cfg.range)
            .await
            .and_then(|series| crate::indicators::build_report(&series, &IndicatorParams::default()));
        let outcome: SectionOutcome<IndicatorReport> = report.into();
        Self::display_indicators(&cfg.ticker, &outcome);
        Ok(())
    }

    /// Option chain summary for one index
    pub async fn run_chain(cfg: &AppConfig) -> Result<()> {
        banner("Stock AI - Option Chain Levels");

        let client = NSEClient::new()?;
        println!("{} Fetching option chain for {}...", "→".cyan(), cfg.index_symbol.yellow());

        let report = client
            .fetch_snapshot(&cfg.index_symbol, cfg.expiry.as_deref())
            .await
            .and_then(|snapshot| crate::options::build_chain_report(&snapshot));
        let outcome: SectionOutcome<ChainReport> = report.into();
        Self::display_chain(&cfg.index_symbol, &outcome);
        Ok(())
    }

    /// Both sections; the two feeds are fetched concurrently and reported
    /// independently.
    pub async fn run_dashboard(cfg: &AppConfig) -> Result<()> {
        banner(&format!("📈 Stock AI with {} Call/Put Indicators", cfg.index_symbol));

        let price_client = PriceClient::new()?;
        let nse_client = NSEClient::new()?;

        let (prices, snapshot) = tokio::join!(
            price_client.fetch_price_series(&cfg.ticker, &cfg.range),
            nse_client.fetch_snapshot(&cfg.index_symbol, cfg.expiry.as_deref()),
        );

        let report = DashboardReport::from_results(
            &cfg.ticker,
            &cfg.index_symbol,
            prices,
            snapshot,
            &IndicatorParams::default(),
        );
        info!(
            ticker = %report.ticker,
            indicators_ok = report.indicators.is_ok(),
            chain_ok = report.option_chain.is_ok(),
            "Dashboard evaluated"
        );

        Self::display_indicators(&report.ticker, &report.indicators);
        println!();
        Self::display_chain(&report.symbol, &report.option_chain);
        Ok(())
    }

    /// Indicators for many tickers: bounded concurrent fetch, parallel compute
    pub async fn run_batch(cfg: &AppConfig) -> Result<()> {
        banner("Stock AI - Batch Signals");

        let client = Arc::new(PriceClient::new()?);
        println!("{} Tickers: {}", "ℹ".blue(), cfg.tickers.len());
        println!("{} Max concurrent requests: {}", "ℹ".blue(), cfg.max_concurrent);
        println!();

        let start_time = std::time::Instant::now();
        let fetched = client
            .fetch_many(cfg.tickers.clone(), cfg.range.clone(), cfg.max_concurrent)
            .await;

        let params = IndicatorParams::default();
        let entries = tokio::task::spawn_blocking(move || dashboard::analyze_batch(fetched, &params)).await?;
        let elapsed = start_time.elapsed();

        Self::display_batch(&entries);

        let summary = dashboard::summarize_batch(&entries);
        println!();
        println!("{}", "=".repeat(60).blue());
        println!("{}", "Summary".cyan().bold());
        println!("{}", "=".repeat(60).blue());
        println!("{} Successful: {}", "✓".green(), summary.successful);
        println!("{} Failed: {}", "✗".red(), summary.failed);
        println!(
            "{} Buy: {}  Sell: {}  Hold: {}",
            "ℹ".blue(),
            summary.buy.to_string().green(),
            summary.sell.to_string().red(),
            summary.hold.to_string().yellow()
        );
        println!("{} Time taken: {:.2}s", "⏱".yellow(), elapsed.as_secs_f64());
        Ok(())
    }

    pub async fn run_server(cfg: &AppConfig) -> Result<()> {
        banner("Stock AI API Server");
        api_server::start_server(cfg.port, cfg.cache_ttl).await
    }

    fn display_indicators(ticker: &str, outcome: &SectionOutcome<IndicatorReport>) {
        println!("{} {}", "Stock Price & Indicators:".cyan().bold(), ticker.yellow());

        let Some(report) = &outcome.data else {
            Self::display_failure(outcome);
            return;
        };

        let latest = report.latest;
        println!("{} As of: {}", "✓".green(), latest.date);
        println!("{} Close: {}", "✓".green(), format_price(latest.close));
        println!(
            "{} SMA {}: {}",
            "✓".green(),
            report.series.sma_window,
            format_price(latest.sma)
        );

        let zone = match report.rsi_zone {
            RsiZone::Overbought => "overbought".red(),
            RsiZone::Oversold => "oversold".green(),
            RsiZone::Neutral => "neutral".normal(),
        };
        println!("{} RSI {}: {:.2} ({})", "✓".green(), report.series.rsi_window, latest.rsi, zone);
        println!();
        println!("{} Signal: {}", "→".cyan(), signal_badge(report.signal));
    }

    fn display_chain(symbol: &str, outcome: &SectionOutcome<ChainReport>) {
        println!("{} {}", "Call/Put Open Interest:".cyan().bold(), symbol.yellow());

        let Some(report) = &outcome.data else {
            Self::display_failure(outcome);
            return;
        };

        let summary = &report.summary;
        println!("{} Expiry: {}", "✓".green(), report.expiry);
        if let Some(underlying) = report.underlying_value {
            println!("{} Underlying: {}", "✓".green(), format_price(underlying));
        }
        println!("{} Total Call OI: {}", "✓".green(), format_count(summary.total_call_oi));
        println!("{} Total Put OI: {}", "✓".green(), format_count(summary.total_put_oi));
        println!("{} Put/Call Ratio: {:.2}", "✓".green(), summary.put_call_ratio);
        println!();

        Self::display_levels("Resistance (highest Call OI)", &summary.top_resistance, |r| r.call_oi);
        Self::display_levels("Support (highest Put OI)", &summary.top_support, |r| r.put_oi);

        match summary.max_pain_strike {
            Some(strike) => println!("{} Max pain (approx.): {:.2}", "→".cyan(), strike),
            None => println!("{} Max pain (approx.): n/a", "→".cyan()),
        }
    }

    fn display_levels(title: &str, levels: &[OptionRecord], oi: impl Fn(&OptionRecord) -> u64) {
        println!("{}", title.cyan());
        for record in levels {
            println!("  {:>10.2}  {:>14}", record.strike, format_count(oi(record)));
        }
    }

    fn display_batch(entries: &[BatchEntry]) {
        for entry in entries {
            match &entry.outcome.data {
                Some(report) => println!(
                    "  {} {:<14} {:>12}  RSI {:>6.2}  {}",
                    "✓".green(),
                    entry.ticker.yellow(),
                    format_price(report.latest.close),
                    report.latest.rsi,
                    signal_badge(report.signal)
                ),
                None => println!(
                    "  {} {:<14} {}",
                    "✗".red(),
                    entry.ticker.yellow(),
                    entry.outcome.error.as_deref().unwrap_or("unknown error")
                ),
            }
        }
    }

    fn display_failure<T>(outcome: &SectionOutcome<T>) {
        let message = outcome.message.as_deref().unwrap_or("Section unavailable.");
        match outcome.error_kind {
            Some("FeedUnavailable") => println!("{} {}", "❌".red(), message.red()),
            _ => println!("{} {}", "⚠️".yellow(), message.yellow()),
        }
        if let Some(detail) = &outcome.error {
            println!("   {}", detail.dimmed());
        }
    }

    /// Print usage instructions
    pub fn print_usage(mode: &str) {
        eprintln!(
            "Invalid mode '{}'. Use 'dashboard', 'indicators', 'chain', 'batch' or 'server'",
            mode
        );
        eprintln!("Set STOCK_AI_MODE environment variable to control execution mode");
        eprintln!("Examples:");
        eprintln!("  STOCK_AI_TICKER=TCS.NS cargo run                          # Dashboard for TCS");
        eprintln!("  STOCK_AI_MODE=chain STOCK_AI_INDEX=BANKNIFTY cargo run   # Option chain levels");
        eprintln!("  STOCK_AI_MODE=batch STOCK_AI_TICKERS=TCS.NS,INFY.NS cargo run");
        eprintln!(
            "  STOCK_AI_MODE=server STOCK_AI_PORT={} cargo run         # Start API server",
            config::DEFAULT_PORT
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(1234.5), "₹1234.50");
        assert_eq!(format_price(0.004), "₹0.00");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(12_345_678), "12,345,678");
    }
}
