//! Token Decimals
//!
//! Reads `decimals()` from an ERC-20 contract. Use it to fill in a new
//! token entry in the pair config.
//!
//! Usage:
//!   cargo run --bin token-decimals -- 0x539bdE0d7Dbd336b79148AA742883198BBF60342

use alloy::primitives::Address;
use alloy::providers::ProviderBuilder;
use anyhow::{Context, Result};
use clap::Parser;
use roundtrip_arb::chain::token_decimals;
use roundtrip_arb::logging::init_tracing;
use tracing::info;

#[derive(Parser)]
#[command(name = "token-decimals")]
struct Args {
    #[arg(long, env = "RPC_URL")]
    rpc_url: String,

    /// Token contract address
    token: Address,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();

    let provider = ProviderBuilder::new()
        .connect(&args.rpc_url)
        .await
        .context("Failed to connect to RPC endpoint")?;

    let decimals = token_decimals(&provider, args.token)
        .await
        .with_context(|| format!("decimals() call on {} failed", args.token))?;
    info!("Decimals of token {}: {}", args.token, decimals);
    Ok(())
}
