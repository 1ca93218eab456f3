//! ETN Wallet - demonstration driver
//!
//! Runs the wallet core end to end against the configured mock data:
//!
//! ```text
//! ┌──────────┐    ┌────────────┐    ┌───────────┐    ┌──────────┐
//! │  Config  │───▶│ Conversion │───▶│  Receive  │───▶│ Transfer │
//! │  (YAML)  │    │   table    │    │  request  │    │ workflow │
//! └──────────┘    └────────────┘    └───────────┘    └──────────┘
//! ```
//!
//! Usage: `etn_wallet [--env dev] [--recipient <addr>] [--amount <n>] [--request <n>]`

use anyhow::{Context, bail};
use tracing::{info, warn};

use etn_wallet::config::{AppConfig, WalletConfig};
use etn_wallet::conversion::{
    ConversionQuote, ConversionRequest, QuoteBook, format_converted, rate_label,
};
use etn_wallet::money::{format_amount, parse_decimal};
use etn_wallet::receive::{ReceiveRequestBuilder, fiat_estimate};
use etn_wallet::transfer::TransferWorkflow;

const DEFAULT_RECIPIENT: &str = "0x7F42a78904f87ad658f1Ed3099cB3E9858cb6b1c";

fn get_arg(name: &str) -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == name && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

fn get_env() -> String {
    get_arg("--env")
        .or_else(|| get_arg("-e"))
        .unwrap_or_else(|| "dev".to_string())
}

// ============================================================
// CONVERSION
// ============================================================

fn print_conversion_table(wallet: &WalletConfig, quotes: &QuoteBook) -> anyhow::Result<()> {
    let amount = parse_decimal("100").context("demo amount")?;
    println!("Conversion of 100 {}:", wallet.base_code);

    for quote in quotes.iter() {
        let request = ConversionRequest::new(amount, &wallet.base_code, &quote.code);
        println!(
            "  {:>14} {:>4} | {}",
            format_converted(&request, quotes),
            quote.code,
            rate_label(&request.from_code, &request.to_code, quotes)
        );
    }
    Ok(())
}

// ============================================================
// RECEIVE
// ============================================================

fn print_receive_request(wallet: &WalletConfig, requested: Option<&str>) -> anyhow::Result<()> {
    let builder = ReceiveRequestBuilder::new(&wallet.scheme);
    let requested = requested.unwrap_or("");
    println!("Receive request: {}", builder.build_from_text(&wallet.address, requested));

    let fiat = ConversionQuote::new(&wallet.fiat_code, "", wallet.fiat_rate)?;
    if let Some(estimate) = fiat_estimate(requested, &fiat) {
        println!("  ≈ {}", estimate);
    }
    Ok(())
}

// ============================================================
// TRANSFER
// ============================================================

async fn run_transfer(wallet: &WalletConfig, recipient: &str, amount: &str) -> anyhow::Result<()> {
    let (workflow, mut events) = TransferWorkflow::from_config(wallet)?;

    println!(
        "Available: {} {}",
        format_amount(workflow.balance().available, 3),
        wallet.base_code
    );

    workflow.set_recipient(recipient)?;
    workflow.set_amount(amount)?;

    let preview = workflow.preview();
    if let Some(total) = preview.total_display() {
        println!("Total with fee: {} {}", total, wallet.base_code);
    }
    if let Some(fiat) = preview.fiat_display() {
        println!("  ≈ {}", fiat);
    }

    let request = match workflow.review() {
        Ok(request) => request,
        Err(e) if e.is_validation() => {
            warn!(code = e.code(), "Transfer not sent");
            bail!("{}", e);
        }
        Err(e) => return Err(e.into()),
    };
    println!("Reviewing: {}", request);

    let handle = workflow.confirm()?;
    println!("Submitting {} ...", handle.transfer_id());
    handle
        .wait()
        .await
        .context("confirmation did not finish")?;

    if let Some(event) = events.recv().await {
        println!("{}", event.summary(&wallet.base_code));
        println!("{}", serde_json::to_string_pretty(&event)?);
    }

    workflow.acknowledge()?;
    Ok(())
}

// ============================================================
// MAIN
// ============================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config =
        AppConfig::load(&env).with_context(|| format!("loading config for env {}", env))?;
    let _log_guard = etn_wallet::logging::init_logging(&app_config);

    info!(
        git_hash = env!("GIT_HASH"),
        "Starting ETN wallet demo in {} mode", env
    );

    let wallet = &app_config.wallet;
    let quotes = wallet.quote_book()?;

    print_conversion_table(wallet, &quotes)?;
    print_receive_request(wallet, get_arg("--request").as_deref())?;

    let recipient = get_arg("--recipient").unwrap_or_else(|| DEFAULT_RECIPIENT.to_string());
    let amount = get_arg("--amount").unwrap_or_else(|| "10".to_string());
    run_transfer(wallet, &recipient, &amount).await?;

    info!("Demo finished");
    Ok(())
}
