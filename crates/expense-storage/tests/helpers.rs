#![allow(dead_code)]

use std::{fs, path::PathBuf};

use expense_core::Ledger;
use expense_storage::JsonFileStore;
use serde_json::Value;
use tempfile::{tempdir, TempDir};

pub fn create_temp_ledger_path() -> (TempDir, PathBuf) {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("blockchain.json");
    (temp_dir, path)
}

pub fn create_temp_ledger() -> (TempDir, Ledger<JsonFileStore>) {
    let (temp_dir, path) = create_temp_ledger_path();
    let ledger = expense_storage::open_ledger(&path).expect("Failed to open ledger");
    (temp_dir, ledger)
}

pub fn read_document(path: &PathBuf) -> Value {
    let bytes = fs::read(path).expect("Failed to read ledger file");
    serde_json::from_slice(&bytes).expect("Ledger file should be JSON")
}

pub fn write_document(path: &PathBuf, doc: &Value) {
    let bytes = serde_json::to_vec_pretty(doc).expect("Failed to encode document");
    fs::write(path, bytes).expect("Failed to write ledger file");
}

/// Applies `edit` to the stored JSON document in place.
pub fn tamper_document(path: &PathBuf, edit: impl FnOnce(&mut Value)) {
    let mut doc = read_document(path);
    edit(&mut doc);
    write_document(path, &doc);
}

pub fn teardown(temp_dir: TempDir) {
    let dir = temp_dir.path().to_path_buf();
    temp_dir.close().expect("Failed to delete temp dir");
    assert!(!dir.exists(), "Ledger directory should be removed");
}
