//! Chain access for the decision engine
//!
//! `ChainClient` is the narrow seam between the engine and the RPC node:
//! gas price, settlement-contract collateral, and settlement submission.
//! `AlloyChainClient` is the production implementation; tests use mocks.
//!
//! The free functions at the bottom are the read-only helpers used by the
//! startup checks and the operator binaries.

use crate::arbitrage::route::SettlementEntry;
use crate::contracts::{IArbitrageSettlement, IUniswapV2Factory, IERC20};
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("RPC call {call} failed: {message}")]
    Rpc { call: &'static str, message: String },
    #[error("{entry} submission failed: {message}")]
    Submission {
        entry: SettlementEntry,
        message: String,
    },
}

fn rpc(call: &'static str) -> impl FnOnce(String) -> ChainError {
    move |message| ChainError::Rpc { call, message }
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current network gas price in wei
    async fn gas_price(&self) -> Result<u128, ChainError>;

    /// Settlement contract's balance of `token`, in base units
    async fn collateral_balance(&self, token: Address) -> Result<U256, ChainError>;

    /// Sign and broadcast one settlement transaction. Returns once the node
    /// has accepted it; does not wait for inclusion.
    async fn submit_settlement(&self, entry: SettlementEntry, amount_in: U256) -> Result<TxHash, ChainError>;
}

/// Scale a gas price by a multiplier (>= 1.0, validated at config load)
pub fn apply_gas_multiplier(gas_price: u128, multiplier: f64) -> u128 {
    (gas_price as f64 * multiplier) as u128
}

/// Calldata for one settlement entry point
pub fn settlement_calldata(entry: SettlementEntry, amount_in: U256) -> Bytes {
    let encoded = match entry {
        SettlementEntry::BaseForward => {
            IArbitrageSettlement::executeArbitrageWithMagicCall { amountIn: amount_in }.abi_encode()
        }
        SettlementEntry::BaseReverse => {
            IArbitrageSettlement::executeArbitrageWithMagicReverseCall { amountIn: amount_in }.abi_encode()
        }
        SettlementEntry::QuoteForward => {
            IArbitrageSettlement::executeArbitrageCall { amountIn: amount_in }.abi_encode()
        }
        SettlementEntry::QuoteReverse => {
            IArbitrageSettlement::executeArbitrageReverseCall { amountIn: amount_in }.abi_encode()
        }
    };
    Bytes::from(encoded)
}

/// Production `ChainClient` over an alloy provider with a wallet filler
pub struct AlloyChainClient<P> {
    provider: Arc<P>,
    settlement_contract: Address,
    sender: Address,
    gas_limit: u64,
    gas_multiplier: f64,
}

impl<P: Provider + 'static> AlloyChainClient<P> {
    pub fn new(
        provider: Arc<P>,
        settlement_contract: Address,
        sender: Address,
        gas_limit: u64,
        gas_multiplier: f64,
    ) -> Self {
        Self {
            provider,
            settlement_contract,
            sender,
            gas_limit,
            gas_multiplier,
        }
    }
}

#[async_trait]
impl<P: Provider + 'static> ChainClient for AlloyChainClient<P> {
    async fn gas_price(&self) -> Result<u128, ChainError> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| rpc("eth_gasPrice")(e.to_string()))
    }

    async fn collateral_balance(&self, token: Address) -> Result<U256, ChainError> {
        token_balance(self.provider.as_ref(), token, self.settlement_contract).await
    }

    async fn submit_settlement(&self, entry: SettlementEntry, amount_in: U256) -> Result<TxHash, ChainError> {
        let submission = |message: String| ChainError::Submission { entry, message };

        let gas_price = self.gas_price().await.map_err(|e| submission(e.to_string()))?;
        let gas_price = apply_gas_multiplier(gas_price, self.gas_multiplier);

        let tx = TransactionRequest::default()
            .with_from(self.sender)
            .with_to(self.settlement_contract)
            .with_input(settlement_calldata(entry, amount_in))
            .with_gas_limit(self.gas_limit)
            .with_gas_price(gas_price);

        debug!(
            "Submitting {}({}) gas_limit={} gas_price={}",
            entry, amount_in, self.gas_limit, gas_price
        );

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| submission(e.to_string()))?;

        Ok(*pending.tx_hash())
    }
}

/// ERC-20 `balanceOf(owner)`
pub async fn token_balance<P: Provider>(provider: &P, token: Address, owner: Address) -> Result<U256, ChainError> {
    IERC20::new(token, provider)
        .balanceOf(owner)
        .call()
        .await
        .map_err(|e| rpc("balanceOf")(e.to_string()))
}

/// ERC-20 `decimals()`
pub async fn token_decimals<P: Provider>(provider: &P, token: Address) -> Result<u8, ChainError> {
    IERC20::new(token, provider)
        .decimals()
        .call()
        .await
        .map_err(|e| rpc("decimals")(e.to_string()))
}

/// SushiSwap factory `getPair`. `Address::ZERO` means no pool exists.
pub async fn sushiswap_pair<P: Provider>(
    provider: &P,
    factory: Address,
    token_a: Address,
    token_b: Address,
) -> Result<Address, ChainError> {
    IUniswapV2Factory::new(factory, provider)
        .getPair(token_a, token_b)
        .call()
        .await
        .map_err(|e| rpc("getPair")(e.to_string()))
}
