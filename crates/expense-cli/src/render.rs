use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use expense_core::{Block, Transaction};

use crate::report::{CategoryTotal, CSV_HEADER};

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

pub fn blocks(chain: &[Block]) -> String {
    let mut out = String::new();
    for block in chain {
        out.push_str(&format!("Block #{}\n", block.index()));
        out.push_str(&format!("Timestamp: {}\n", block.timestamp()));
        if block.transactions().is_empty() {
            out.push_str("Transactions: none\n");
        } else {
            out.push_str("Transactions:\n");
            out.push_str(&transactions(block.transactions()).to_string());
            out.push('\n');
        }
        out.push_str(&format!("Block Hash: {}\n", block.hash()));
        out.push_str(&format!("Previous Hash: {}\n", block.previous_hash()));
        out.push_str("---\n");
    }
    out
}

pub fn transactions<'a, I>(txs: I) -> Table
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut t = table(&CSV_HEADER);
    for tx in txs {
        t.add_row(vec![
            tx.user_id().to_string(),
            tx.date().to_string(),
            tx.category().to_string(),
            format!("{:.2}", tx.amount()),
            tx.description().to_string(),
        ]);
    }
    t
}

pub fn summary(totals: &[CategoryTotal]) -> Table {
    let mut t = table(&["user_id", "category", "amount"]);
    for row in totals {
        t.add_row(vec![
            row.user_id.clone(),
            row.category.to_string(),
            format!("{:.2}", row.total),
        ]);
    }
    t
}
