//! Contract Balances
//!
//! Prints the settlement contract's collateral: base and quote token
//! balances from the pair config, plus any extra token addresses given on
//! the command line (e.g. a bridged vs native USDC sent by mistake).
//!
//! Usage:
//!   cargo run --bin contract-balances -- --extra-token 0xaf88d065e77c8cC2239327C5EDb3A432268e5831

use alloy::primitives::Address;
use alloy::providers::ProviderBuilder;
use anyhow::{Context, Result};
use clap::Parser;
use roundtrip_arb::chain::{token_balance, token_decimals};
use roundtrip_arb::config::load_pair_config;
use roundtrip_arb::logging::init_tracing;
use roundtrip_arb::types::TokenDescriptor;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "contract-balances")]
struct Args {
    #[arg(long, env = "RPC_URL")]
    rpc_url: String,

    /// Settlement contract to inspect
    #[arg(long, env = "ARBITRAGE_CONTRACT_ADDRESS")]
    contract: Address,

    #[arg(long, env = "PAIR_CONFIG", default_value = "config/magic_usdc.toml")]
    pair_config: PathBuf,

    /// Additional ERC-20 tokens to check (repeatable)
    #[arg(long = "extra-token")]
    extra_tokens: Vec<Address>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();

    let pair = load_pair_config(&args.pair_config)?;
    let provider = ProviderBuilder::new()
        .connect(&args.rpc_url)
        .await
        .context("Failed to connect to RPC endpoint")?;

    info!("Settlement contract: {}", args.contract);
    for token in [&pair.tokens.base, &pair.tokens.quote] {
        print_balance(&provider, token, args.contract).await?;
    }

    for address in &args.extra_tokens {
        let decimals = match token_decimals(&provider, *address).await {
            Ok(d) => d,
            Err(e) => {
                warn!("{}: decimals() failed, skipping: {}", address, e);
                continue;
            }
        };
        let token = TokenDescriptor::new(address.to_string(), *address, decimals)?;
        print_balance(&provider, &token, args.contract).await?;
    }

    Ok(())
}

async fn print_balance<P: alloy::providers::Provider>(
    provider: &P,
    token: &TokenDescriptor,
    owner: Address,
) -> Result<()> {
    let raw = token_balance(provider, token.address, owner)
        .await
        .with_context(|| format!("Failed to read {} balance", token.symbol))?;
    info!(
        "{} ({}): {} ({} base units)",
        token.symbol,
        token.address,
        token.to_human(raw)?,
        raw
    );
    Ok(())
}
