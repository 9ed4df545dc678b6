use crate::Category;

pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;

/// `previous_hash` carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";
pub const GENESIS_INDEX: u64 = 1;

pub const DEFAULT_LEDGER_FILE: &str = "blockchain.json";

pub const CATEGORIES: [Category; 4] = [
    Category::Food,
    Category::Transportation,
    Category::Entertainment,
    Category::Others,
];
