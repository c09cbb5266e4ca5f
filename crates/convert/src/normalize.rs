use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use sterling_core::{Direction, Transaction};

use crate::clean::clean_description;

/// What the normaliser did, for logging and confidence scoring. Rejected
/// rows are counted, never fatal.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NormalizeReport {
    pub input: usize,
    pub kept: usize,
    pub rejected: usize,
    pub deduplicated: usize,
}

/// Canonicalise a tier's raw output: tidy descriptions, drop rows violating
/// the transaction invariants, collapse exact repeats from page-boundary
/// overlap, and restore source order. Deterministic and idempotent.
pub fn normalize(transactions: Vec<Transaction>) -> (Vec<Transaction>, NormalizeReport) {
    let mut report = NormalizeReport {
        input: transactions.len(),
        ..NormalizeReport::default()
    };

    let mut seen: HashSet<(NaiveDate, String, i64, Option<i64>)> = HashSet::new();
    let mut kept: Vec<Transaction> = Vec::new();

    for mut tx in transactions {
        tx.description = clean_description(&tx.description);

        if tx.amount.is_zero() || tx.description.is_empty() {
            report.rejected += 1;
            tracing::debug!(date = %tx.date, "row rejected by invariants");
            continue;
        }

        let signed_cents = match tx.direction {
            Direction::Debit => -tx.amount.to_cents(),
            Direction::Credit => tx.amount.to_cents(),
        };
        let key = (
            tx.date,
            tx.description.clone(),
            signed_cents,
            tx.balance.map(|b| b.to_cents()),
        );
        if !seen.insert(key) {
            report.deduplicated += 1;
            continue;
        }

        kept.push(tx);
    }

    // Stable sort on source position; callers wanting date order re-sort.
    kept.sort_by_key(|tx| tx.row);
    for (i, tx) in kept.iter_mut().enumerate() {
        tx.row = i;
    }

    report.kept = kept.len();
    (kept, report)
}
