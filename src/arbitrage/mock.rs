//! Hand-written test doubles for the engine's two seams

use super::route::SettlementEntry;
use crate::chain::{ChainClient, ChainError};
use crate::config::{PairFile, TradeSizes};
use crate::quoter::{Quote, QuoteError, QuoteSource, Venue};
use crate::types::{HumanAmount, TokenDescriptor, TokenPair};
use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

pub fn pair() -> TokenPair {
    PairFile::default().validate().unwrap().tokens
}

pub fn sizes() -> TradeSizes {
    // 100 MAGIC, 100 USDC
    TradeSizes {
        base: U256::from(100u64) * U256::from(10u64).pow(U256::from(18u64)),
        quote: U256::from(100_000_000u64),
    }
}

/// Quote source answering from a fixed (token_in, token_out) table.
/// An answer either matches any input amount or one exact amount.
/// Anything without a matching answer fails.
pub struct MockQuoteSource {
    venue: Venue,
    answers: HashMap<(String, String), Vec<(Option<U256>, HumanAmount)>>,
    pub calls: Mutex<Vec<(String, String, U256)>>,
}

impl MockQuoteSource {
    pub fn new(venue: Venue) -> Self {
        Self {
            venue,
            answers: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, token_in: &str, token_out: &str, amount_out: HumanAmount) -> Self {
        self.answers
            .entry((token_in.to_string(), token_out.to_string()))
            .or_default()
            .push((None, amount_out));
        self
    }

    pub fn with_exact(mut self, token_in: &str, token_out: &str, amount_in: U256, amount_out: HumanAmount) -> Self {
        self.answers
            .entry((token_in.to_string(), token_out.to_string()))
            .or_default()
            .push((Some(amount_in), amount_out));
        self
    }

    fn answer(&self, token_in: &str, token_out: &str, amount_in: U256) -> Option<HumanAmount> {
        let answers = self.answers.get(&(token_in.to_string(), token_out.to_string()))?;
        answers
            .iter()
            .find(|(exact, _)| *exact == Some(amount_in))
            .or_else(|| answers.iter().find(|(exact, _)| exact.is_none()))
            .map(|(_, out)| *out)
    }

    pub fn call_count(&self, token_in: &str, token_out: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(i, o, _)| i == token_in && o == token_out)
            .count()
    }
}

#[async_trait]
impl QuoteSource for MockQuoteSource {
    fn venue(&self) -> Venue {
        self.venue
    }

    async fn quote(
        &self,
        token_in: &TokenDescriptor,
        token_out: &TokenDescriptor,
        amount_in: U256,
    ) -> Result<Quote, QuoteError> {
        self.calls
            .lock()
            .unwrap()
            .push((token_in.symbol.clone(), token_out.symbol.clone(), amount_in));

        match self.answer(&token_in.symbol, &token_out.symbol, amount_in) {
            Some(amount_out) => Ok(Quote {
                venue: self.venue,
                token_in: token_in.symbol.clone(),
                token_out: token_out.symbol.clone(),
                amount_in,
                amount_out,
                fee_tier: None,
            }),
            None => Err(QuoteError::NoLiquidity {
                venue: self.venue,
                token_in: token_in.symbol.clone(),
                token_out: token_out.symbol.clone(),
                amount_in,
            }),
        }
    }
}

pub struct MockChainClient {
    pub gas_price: Option<u128>,
    pub balances: HashMap<Address, U256>,
    pub fail_submission: bool,
    pub submissions: Mutex<Vec<(SettlementEntry, U256)>>,
}

impl MockChainClient {
    pub fn new() -> Self {
        Self {
            gas_price: Some(0),
            balances: HashMap::new(),
            fail_submission: false,
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_balance(mut self, token: Address, amount: U256) -> Self {
        self.balances.insert(token, amount);
        self
    }

    pub fn submitted(&self) -> Vec<(SettlementEntry, U256)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn gas_price(&self) -> Result<u128, ChainError> {
        self.gas_price.ok_or_else(|| ChainError::Rpc {
            call: "eth_gasPrice",
            message: "connection refused".to_string(),
        })
    }

    async fn collateral_balance(&self, token: Address) -> Result<U256, ChainError> {
        Ok(self.balances.get(&token).copied().unwrap_or(U256::ZERO))
    }

    async fn submit_settlement(&self, entry: SettlementEntry, amount_in: U256) -> Result<TxHash, ChainError> {
        if self.fail_submission {
            return Err(ChainError::Submission {
                entry,
                message: "nonce too low".to_string(),
            });
        }
        let mut submissions = self.submissions.lock().unwrap();
        submissions.push((entry, amount_in));
        Ok(TxHash::with_last_byte(submissions.len() as u8))
    }
}
