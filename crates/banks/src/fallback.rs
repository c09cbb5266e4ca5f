//! Last-ditch tier: anything that visibly resembles a transaction line
//! becomes one. Accepts matches the structured tiers would refuse; by
//! construction it cannot fail, only come back empty.

use regex::Regex;
use std::sync::OnceLock;

use sterling_core::dates::parse_uk_date;
use sterling_core::{parse_signed_amount, Money, Transaction};

fn re_date() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"\b(\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4}|\d{4}-\d{2}-\d{2})\b")
            .expect("invalid regex")
    })
}

fn re_amount() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"[-+(]?£?\d{1,3}(?:,\d{3})*\.\d{2}\)?(?:\s?[CD]R)?")
            .expect("invalid regex")
    })
}

pub fn parse(raw_text: &str) -> Vec<Transaction> {
    let mut txs = Vec::new();

    for line in raw_text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some(date_match) = re_date().find(line) else {
            continue;
        };
        let Some(date) = parse_uk_date(date_match.as_str()) else {
            continue;
        };

        // Dotted dates would otherwise re-match as amounts, so anything
        // overlapping the date span is out.
        let amounts: Vec<_> = re_amount()
            .find_iter(line)
            .filter(|m| m.start() >= date_match.end() || m.end() <= date_match.start())
            .collect();
        let Some(first) = amounts.first() else {
            continue;
        };
        let Some(signed) = parse_signed_amount(first.as_str()) else {
            continue;
        };
        // With several figures on the line the last one is most likely a
        // running balance.
        let balance = if amounts.len() > 1 {
            amounts
                .last()
                .and_then(|m| parse_signed_amount(m.as_str()))
                .map(Money::from_decimal)
        } else {
            None
        };

        let mut description = line.to_string();
        description = description.replace(date_match.as_str(), " ");
        for m in &amounts {
            description = description.replace(m.as_str(), " ");
        }
        let description = description
            .replace('£', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let description = if description.is_empty() {
            "TRANSACTION".to_string()
        } else {
            description
        };

        txs.push(Transaction::from_signed(
            date,
            description,
            signed,
            balance,
            txs.len(),
        ));
    }

    txs
}
