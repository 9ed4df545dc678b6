pub mod json_store;

use expense_core::{Ledger, Result};
use std::path::Path;

pub use json_store::JsonFileStore;

/// Opens (or initialises) the ledger kept in the JSON document at `path`.
pub fn open_ledger<P: AsRef<Path>>(path: P) -> Result<Ledger<JsonFileStore>> {
    Ledger::open(JsonFileStore::new(path.as_ref()))
}
