//! Round-trip arbitrage bot
//!
//! Main entry point. Loads the env file and pair config, connects to the
//! RPC node, runs the startup checks, then polls the two venues on a fixed
//! interval and dispatches profitable round trips to the settlement contract.
//!
//! Startup failures (bad config, unreachable node, decimals mismatch) exit
//! non-zero before the loop starts. Nothing inside the loop is fatal.

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use clap::Parser;
use roundtrip_arb::arbitrage::{
    ArbitrageEngine, GasCostEstimator, ProfitNormalizer, RouteSimulator, SafetyGovernor, TradeDispatcher,
};
use roundtrip_arb::audit::TradeAuditLog;
use roundtrip_arb::chain::{sushiswap_pair, token_balance, token_decimals, AlloyChainClient};
use roundtrip_arb::config::{load_config_from_file, BotConfig};
use roundtrip_arb::logging::init_tracing;
use roundtrip_arb::quoter::{FeeTierQuoter, PathQuoter};
use roundtrip_arb::types::TokenDescriptor;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

/// Two-venue round-trip arbitrage bot
#[derive(Parser)]
#[command(name = "roundtrip-arb")]
struct Args {
    /// Env file with RPC_URL, PRIVATE_KEY, ARBITRAGE_CONTRACT_ADDRESS, LIVE_MODE
    #[arg(long, env = "ENV_FILE", default_value = ".env")]
    env_file: PathBuf,

    /// Pair config (TOML)
    #[arg(long, env = "PAIR_CONFIG", default_value = "config/magic_usdc.toml")]
    pair_config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config_from_file(&args.env_file, &args.pair_config)?;

    init_tracing();

    let pair = &config.pair;
    info!("Round-trip arbitrage bot starting, pair {}", pair.tokens.symbol());
    info!("Configuration loaded from {} + {}", args.env_file.display(), args.pair_config.display());
    info!("RPC URL: {}", config.rpc_url_preview());
    info!("Settlement contract: {}", config.settlement_contract);
    info!(
        "Trade sizes: {} {} / {} {} (base units)",
        pair.trade_sizes.base, pair.tokens.base.symbol, pair.trade_sizes.quote, pair.tokens.quote.symbol
    );
    info!(
        "Fee tiers: {:?}, gas units: {}, gas multiplier: {}, poll interval: {:?}",
        pair.fee_tiers, pair.settlement_gas_units, pair.gas_multiplier, pair.poll_interval
    );
    info!(
        "Daily trade limit: {} ({})",
        pair.safety.max_trades_per_day,
        if pair.safety.enforce_trade_limit { "enforced" } else { "advisory" }
    );
    if config.live_mode {
        warn!("LIVE MODE: settlement transactions will be submitted");
    } else {
        info!("Dry run: set LIVE_MODE=true to submit transactions");
    }

    let signer = PrivateKeySigner::from_str(config.private_key.trim().trim_start_matches("0x"))
        .context("Invalid PRIVATE_KEY")?;
    let sender = signer.address();
    if let Some(expected) = config.wallet_address {
        if expected != sender {
            anyhow::bail!("WALLET_ADDRESS {} does not match PRIVATE_KEY address {}", expected, sender);
        }
    }
    info!("Wallet: {}", sender);

    info!("Connecting to RPC...");
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect(&config.rpc_url)
        .await
        .context("Failed to connect to RPC endpoint")?;
    let chain_id = provider
        .get_chain_id()
        .await
        .context("RPC endpoint unreachable")?;
    let provider = Arc::new(provider);
    info!("Connected! chain_id: {}", chain_id);

    startup_checks(provider.as_ref(), &config, sender).await?;

    let uniswap = Arc::new(FeeTierQuoter::new(
        Arc::clone(&provider),
        pair.uniswap_v3_quoter,
        pair.fee_tiers.clone(),
    ));
    let sushiswap = Arc::new(PathQuoter::new(Arc::clone(&provider), pair.sushiswap_router));
    let chain = Arc::new(AlloyChainClient::new(
        Arc::clone(&provider),
        config.settlement_contract,
        sender,
        pair.settlement_gas_units,
        pair.gas_multiplier,
    ));

    let reference = pair.tokens.token(pair.reference).clone();
    let mut dispatcher = TradeDispatcher::new(
        chain.clone(),
        pair.tokens.clone(),
        pair.trade_sizes,
        config.live_mode,
        reference.symbol.clone(),
    );
    match TradeAuditLog::new(&config.audit_log_dir) {
        Ok(audit) => {
            info!("Audit log: {}", config.audit_log_dir.display());
            dispatcher = dispatcher.with_audit_log(audit);
        }
        Err(e) => warn!("Audit log disabled: {:#}", e),
    }

    let governor = SafetyGovernor::new(&pair.safety);
    let engine = ArbitrageEngine::new(
        RouteSimulator::new(uniswap.clone(), sushiswap, pair.tokens.clone(), pair.trade_sizes),
        GasCostEstimator::new(
            chain,
            uniswap.clone(),
            pair.tokens.native.clone(),
            reference.clone(),
            pair.settlement_gas_units,
        ),
        ProfitNormalizer::new(uniswap, pair.tokens.clone(), pair.reference),
        dispatcher,
        governor,
        reference.symbol.clone(),
    );

    let mut state = engine.governor().initial_state(chrono::Utc::now());
    info!("Entering main loop (next counter reset {})", state.next_reset);
    engine.run(&mut state, pair.poll_interval).await;

    info!("Bot stopped");
    Ok(())
}

/// Fail on a decimals mismatch; log balances and the SushiSwap pool address.
async fn startup_checks<P: Provider>(provider: &P, config: &BotConfig, wallet: Address) -> Result<()> {
    let tokens = &config.pair.tokens;

    for token in [&tokens.base, &tokens.quote, &tokens.native] {
        verify_decimals(provider, token).await?;
    }

    for token in [&tokens.base, &tokens.quote] {
        match token_balance(provider, token.address, wallet).await {
            Ok(raw) => match token.to_human(raw) {
                Ok(amount) => info!("Wallet {} balance: {}", token.symbol, amount),
                Err(e) => warn!("Wallet {} balance unreadable: {}", token.symbol, e),
            },
            Err(e) => warn!("Could not read wallet {} balance: {}", token.symbol, e),
        }
    }

    match sushiswap_pair(provider, config.pair.sushiswap_factory, tokens.base.address, tokens.quote.address).await {
        Ok(pool) if pool == Address::ZERO => warn!("No SushiSwap pool for {}", tokens.symbol()),
        Ok(pool) => info!("SushiSwap {} pool: {}", tokens.symbol(), pool),
        Err(e) => warn!("SushiSwap pool lookup failed: {}", e),
    }

    Ok(())
}

async fn verify_decimals<P: Provider>(provider: &P, token: &TokenDescriptor) -> Result<()> {
    let onchain = token_decimals(provider, token.address)
        .await
        .with_context(|| format!("Failed to read {} decimals", token.symbol))?;
    if onchain != token.decimals {
        anyhow::bail!(
            "{} ({}) has {} decimals on-chain but {} configured",
            token.symbol,
            token.address,
            onchain,
            token.decimals
        );
    }
    info!("{} decimals verified: {}", token.symbol, onchain);
    Ok(())
}
