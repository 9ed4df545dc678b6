use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::{collections::BTreeMap, fmt, str::FromStr};

pub mod constants;
pub mod error;
pub mod ledger;
pub mod verify;

pub use error::{LedgerError, Result, ValidationError};
pub use ledger::Ledger;
pub use verify::{verify_chain, IntegrityViolation, ViolationReason};

use constants::{GENESIS_INDEX, GENESIS_PREVIOUS_HASH, HASH_HEX_SIZE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transportation,
    Entertainment,
    Others,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transportation => "Transportation",
            Category::Entertainment => "Entertainment",
            Category::Others => "Others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    /// Case-insensitive match against the known set.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        constants::CATEGORIES
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

/// A single recorded expense.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transaction {
    user_id: String,
    date: NaiveDate,
    category: Category,
    amount: f64,
    description: String,
}

impl Transaction {
    /// Builds a transaction without checking it. The ledger validates on staging.
    pub fn new(
        user_id: impl Into<String>,
        date: NaiveDate,
        category: Category,
        amount: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            date,
            category,
            amount,
            description: description.into(),
        }
    }

    /// Parses raw form input (ISO date, category name) and validates the result.
    pub fn parse(
        user_id: &str,
        date: &str,
        category: &str,
        amount: f64,
        description: &str,
    ) -> std::result::Result<Self, ValidationError> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(date.to_string()))?;
        let category = category.parse()?;
        let tx = Self::new(user_id, date, category, amount, description);
        tx.validate()?;
        Ok(tx)
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::EmptyUserId);
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ValidationError::InvalidAmount(self.amount));
        }
        Ok(())
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Hashed portion of a block: everything except `hash` itself.
#[derive(Serialize)]
struct BlockContent<'a> {
    index: u64,
    timestamp: &'a str,
    transactions: &'a [Transaction],
    previous_hash: &'a str,
}

/// A sealed batch of transactions. Fields are only readable; a block is never
/// modified after `seal`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Block {
    index: u64,
    timestamp: String,
    transactions: Vec<Transaction>,
    previous_hash: String,
    hash: String,
}

impl Block {
    pub fn seal(
        index: u64,
        transactions: Vec<Transaction>,
        previous_hash: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Result<Self> {
        let previous_hash = previous_hash.into();
        check_linkage(index, &previous_hash)?;

        let timestamp = timestamp.into();
        let hash = block_digest(index, &timestamp, &transactions, &previous_hash)?;
        Ok(Self {
            index,
            timestamp,
            transactions,
            previous_hash,
            hash,
        })
    }

    /// Index 1, no transactions, `previous_hash = "0"`.
    pub fn genesis(timestamp: impl Into<String>) -> Result<Self> {
        Self::seal(GENESIS_INDEX, vec![], GENESIS_PREVIOUS_HASH, timestamp)
    }

    /// Recomputes the digest over the stored content. Equal to `hash()` for an
    /// untouched block.
    pub fn content_digest(&self) -> Result<String> {
        block_digest(
            self.index,
            &self.timestamp,
            &self.transactions,
            &self.previous_hash,
        )
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn is_genesis(&self) -> bool {
        self.index == GENESIS_INDEX && self.previous_hash == GENESIS_PREVIOUS_HASH
    }
}

fn check_linkage(index: u64, previous_hash: &str) -> Result<()> {
    if index < GENESIS_INDEX {
        return Err(LedgerError::InvalidBlock(format!(
            "index must be >= {GENESIS_INDEX}, got {index}"
        )));
    }
    if index == GENESIS_INDEX {
        if previous_hash != GENESIS_PREVIOUS_HASH {
            return Err(LedgerError::InvalidBlock(format!(
                "genesis previous_hash must be \"{GENESIS_PREVIOUS_HASH}\""
            )));
        }
        return Ok(());
    }
    if !is_digest(previous_hash) {
        return Err(LedgerError::InvalidBlock(format!(
            "block {index} previous_hash is not a {HASH_HEX_SIZE}-char hex digest"
        )));
    }
    Ok(())
}

fn is_digest(s: &str) -> bool {
    s.len() == HASH_HEX_SIZE && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// SHA-256 over the canonical encoding of a block's content, as lowercase hex.
pub fn block_digest(
    index: u64,
    timestamp: &str,
    transactions: &[Transaction],
    previous_hash: &str,
) -> Result<String> {
    let content = BlockContent {
        index,
        timestamp,
        transactions,
        previous_hash,
    };
    let bytes = canonical_bytes(&content)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Compact JSON with object keys sorted at every level. Array order is kept.
pub fn canonical_bytes<T: Serialize>(content: &T) -> Result<Vec<u8>> {
    let value = canonicalize(serde_json::to_value(content)?);
    Ok(serde_json::to_vec(&value)?)
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
            Value::Object(sorted.into_iter().collect::<Map<String, Value>>())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Seal-time timestamp: RFC 3339, UTC, microsecond precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub mod chain {
    use super::*;
    use parking_lot::Mutex;

    /// Durable home of a chain. Lives in `expense-core` so the ledger can be
    /// generic over backends without depending on `expense-storage`.
    pub trait ChainStore: Send + Sync {
        /// `Ok(None)` means nothing has been stored yet.
        fn load(&self) -> Result<Option<Vec<Block>>>;
        /// Replaces the stored chain with `chain`, all or nothing.
        fn save(&self, chain: &[Block]) -> Result<()>;
        /// Human readable location for logs and errors.
        fn location(&self) -> String;
    }

    /// Volatile store, for tests and throwaway ledgers.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        blocks: Mutex<Option<Vec<Block>>>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_chain(chain: Vec<Block>) -> Self {
            Self {
                blocks: Mutex::new(Some(chain)),
            }
        }

        pub fn snapshot(&self) -> Option<Vec<Block>> {
            self.blocks.lock().clone()
        }
    }

    impl ChainStore for MemoryStore {
        fn load(&self) -> Result<Option<Vec<Block>>> {
            Ok(self.blocks.lock().clone())
        }

        fn save(&self, chain: &[Block]) -> Result<()> {
            *self.blocks.lock() = Some(chain.to_vec());
            Ok(())
        }

        fn location(&self) -> String {
            "memory".to_string()
        }
    }
}
