//! Aggregation and export over the flattened transaction feed.

use expense_core::{Category, Transaction};
use serde::Serialize;
use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet},
    io::{self, Write},
};

pub const CSV_HEADER: [&str; 5] = ["user_id", "date", "category", "amount", "description"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub user_id: String,
    pub category: Category,
    pub total: f64,
}

/// Sums amounts per (user, category), ordered by user then category.
pub fn summarize<'a, I>(txs: I) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals: BTreeMap<(&str, Category), f64> = BTreeMap::new();
    for tx in txs {
        *totals.entry((tx.user_id(), tx.category())).or_default() += tx.amount();
    }
    totals
        .into_iter()
        .map(|((user_id, category), total)| CategoryTotal {
            user_id: user_id.to_string(),
            category,
            total,
        })
        .collect()
}

/// Distinct user ids, sorted.
pub fn users(txs: &[Transaction]) -> Vec<String> {
    txs.iter()
        .map(|t| t.user_id())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub fn filter_by_user<'a>(txs: &'a [Transaction], user: Option<&str>) -> Vec<&'a Transaction> {
    txs.iter()
        .filter(|t| user.map_or(true, |u| t.user_id() == u))
        .collect()
}

pub fn write_csv<'a, W, I>(mut out: W, txs: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Transaction>,
{
    writeln!(out, "{}", CSV_HEADER.join(","))?;
    for tx in txs {
        writeln!(
            out,
            "{},{},{},{},{}",
            csv_field(tx.user_id()),
            tx.date(),
            tx.category(),
            csv_amount(tx.amount()),
            csv_field(tx.description()),
        )?;
    }
    out.flush()
}

/// Shortest round-trip form, always with a decimal point (`9.0`, `12.5`).
fn csv_amount(amount: f64) -> String {
    let s = amount.to_string();
    if s.contains('.') {
        s
    } else {
        format!("{s}.0")
    }
}

fn csv_field(s: &str) -> Cow<'_, str> {
    if s.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", s.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(s)
    }
}
