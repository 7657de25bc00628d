//! Trade audit log
//!
//! Durable record of every settlement transaction the bot submitted.
//! Annual JSONL files: `<dir>/successful_trades_YYYY.jsonl`, one record per line.

use crate::arbitrage::route::{RouteId, SettlementEntry};
use crate::types::HumanAmount;
use alloy::primitives::{TxHash, U256};
use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub pair: String,
    pub route: String,
    pub entry_point: String,
    /// Trade size in base units of the starting token
    pub amount_in: String,
    pub net_profit: HumanAmount,
    pub reference_symbol: String,
    pub tx_hash: String,
    /// Trade count after this submission
    pub trade_count: u32,
}

impl AuditRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        timestamp: DateTime<Utc>,
        pair: String,
        route: RouteId,
        entry: SettlementEntry,
        amount_in: U256,
        net_profit: HumanAmount,
        reference_symbol: String,
        tx_hash: TxHash,
        trade_count: u32,
    ) -> Self {
        Self {
            timestamp,
            pair,
            route: route.to_string(),
            entry_point: entry.function_name().to_string(),
            amount_in: amount_in.to_string(),
            net_profit,
            reference_symbol,
            tx_hash: format!("{:#x}", tx_hash),
            trade_count,
        }
    }
}

pub struct TradeAuditLog {
    base_dir: PathBuf,
}

impl TradeAuditLog {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("Failed to create audit directory: {:?}", base_dir))?;
        Ok(Self { base_dir })
    }

    pub fn file_path_for_year(&self, year: i32) -> PathBuf {
        self.base_dir.join(format!("successful_trades_{}.jsonl", year))
    }

    /// Append one record to the file for the record's year
    pub fn append(&self, record: &AuditRecord) -> Result<()> {
        let file_path = self.file_path_for_year(record.timestamp.year());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .with_context(|| format!("Failed to open audit file: {:?}", file_path))?;

        let json = serde_json::to_string(record).context("Failed to serialize audit record")?;
        writeln!(file, "{}", json)?;
        Ok(())
    }

    /// Read back every record for a year (missing file = no records)
    pub fn read_year(&self, year: i32) -> Result<Vec<AuditRecord>> {
        let file_path = self.file_path_for_year(year);
        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&file_path)
            .with_context(|| format!("Failed to open audit file: {:?}", file_path))?;

        let mut records = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: AuditRecord = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse line {} in {:?}", line_num + 1, file_path))?;
            records.push(record);
        }
        Ok(records)
    }
}
