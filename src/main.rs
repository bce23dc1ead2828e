use anyhow::Result;
use colored::Colorize;
use stock_ai::app_config::AppConfig;
use stock_ai::commands::Commands;
use stock_ai::logging;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging()?;

    let cfg = AppConfig::from_env();
    info!(mode = %cfg.mode, ticker = %cfg.ticker, index = %cfg.index_symbol, "Starting");

    match cfg.mode.as_str() {
        "dashboard" => Commands::run_dashboard(&cfg).await?,
        "indicators" => Commands::run_indicators(&cfg).await?,
        "chain" => Commands::run_chain(&cfg).await?,
        "batch" => Commands::run_batch(&cfg).await?,
        "server" => Commands::run_server(&cfg).await?,
        other => {
            Commands::print_usage(other);
            std::process::exit(1);
        }
    }

    println!();
    println!("{}", "Done!".green().bold());
    Ok(())
}
