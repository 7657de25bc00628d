//! SushiSwap path quoter
//!
//! One `getAmountsOut(amountIn, [tokenIn, tokenOut])` call; the last
//! element of the returned array is the output of the final hop.

use super::{Quote, QuoteError, QuoteSource, Venue};
use crate::contracts::IUniswapV2Router02;
use crate::types::TokenDescriptor;
use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

/// Venue-2 quote provider
pub struct PathQuoter<P> {
    provider: Arc<P>,
    router_address: Address,
}

impl<P: Provider + 'static> PathQuoter<P> {
    pub fn new(provider: Arc<P>, router_address: Address) -> Self {
        Self {
            provider,
            router_address,
        }
    }

    fn rpc_error(
        token_in: &TokenDescriptor,
        token_out: &TokenDescriptor,
        amount_in: U256,
        message: String,
    ) -> QuoteError {
        error!(
            "SushiSwap quote failed ({} -> {}, input: {}): {}",
            token_in.symbol, token_out.symbol, amount_in, message
        );
        QuoteError::Rpc {
            venue: Venue::SushiSwap,
            token_in: token_in.symbol.clone(),
            token_out: token_out.symbol.clone(),
            amount_in,
            message,
        }
    }
}

#[async_trait]
impl<P: Provider + 'static> QuoteSource for PathQuoter<P> {
    fn venue(&self) -> Venue {
        Venue::SushiSwap
    }

    async fn quote(
        &self,
        token_in: &TokenDescriptor,
        token_out: &TokenDescriptor,
        amount_in: U256,
    ) -> Result<Quote, QuoteError> {
        let router = IUniswapV2Router02::new(self.router_address, self.provider.clone());

        let amounts = router
            .getAmountsOut(amount_in, vec![token_in.address, token_out.address])
            .call()
            .await
            .map_err(|e| Self::rpc_error(token_in, token_out, amount_in, e.to_string()))?;

        let raw_out = *amounts.last().ok_or_else(|| {
            Self::rpc_error(token_in, token_out, amount_in, "empty amounts array".to_string())
        })?;

        let amount_out = token_out.to_human(raw_out)?;
        debug!(
            "SushiSwap: {} {} -> {} {}",
            amount_in, token_in.symbol, amount_out, token_out.symbol
        );

        Ok(Quote {
            venue: Venue::SushiSwap,
            token_in: token_in.symbol.clone(),
            token_out: token_out.symbol.clone(),
            amount_in,
            amount_out,
            fee_tier: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrage::mock::pair;
    use alloy::primitives::Bytes;
    use alloy::providers::ProviderBuilder;
    use alloy::sol_types::SolCall;
    use alloy::transports::mock::Asserter;
    use rust_decimal_macros::dec;

    fn quoter(asserter: &Asserter) -> PathQuoter<impl Provider + 'static> {
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_mocked_client(asserter.clone());
        PathQuoter::new(Arc::new(provider), Address::repeat_byte(0x1b))
    }

    fn push_amounts(asserter: &Asserter, amounts: Vec<U256>) {
        let data = IUniswapV2Router02::getAmountsOutCall::abi_encode_returns(&amounts);
        asserter.push_success(&Bytes::from(data));
    }

    #[tokio::test]
    async fn test_quote_takes_last_amount() {
        let asserter = Asserter::new();
        let tokens = pair();
        let amount_in = U256::from(105_000_000u64);
        let raw_out = U256::from(103u64) * U256::from(10u64).pow(U256::from(18u64));
        push_amounts(&asserter, vec![amount_in, raw_out]);

        let quote = quoter(&asserter)
            .quote(&tokens.quote, &tokens.base, amount_in)
            .await
            .unwrap();

        assert_eq!(quote.venue, Venue::SushiSwap);
        assert_eq!(quote.amount_out, dec!(103));
        assert_eq!(quote.token_in, "USDC");
        assert_eq!(quote.fee_tier, None);
    }

    #[tokio::test]
    async fn test_revert_becomes_rpc_error() {
        let asserter = Asserter::new();
        asserter.push_failure_msg("execution reverted: UniswapV2Library: INSUFFICIENT_LIQUIDITY");
        let tokens = pair();

        let err = quoter(&asserter)
            .quote(&tokens.base, &tokens.quote, U256::from(1u64))
            .await
            .unwrap_err();

        match err {
            QuoteError::Rpc { venue, message, .. } => {
                assert_eq!(venue, Venue::SushiSwap);
                assert!(message.contains("INSUFFICIENT_LIQUIDITY"));
            }
            other => panic!("expected Rpc error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_amounts_becomes_rpc_error() {
        let asserter = Asserter::new();
        push_amounts(&asserter, Vec::new());
        let tokens = pair();

        let err = quoter(&asserter)
            .quote(&tokens.base, &tokens.quote, U256::from(1u64))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            QuoteError::Rpc { ref message, .. } if message == "empty amounts array"
        ));
    }
}
