//! Wise statements are narrative rather than tabular: each transaction is a
//! short block ("Sent money to J Smith", amount and date on nearby lines),
//! which no column layout can express.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

use sterling_core::dates::month_to_num;
use sterling_core::{parse_signed_amount, Direction, Money, Transaction};
use sterling_extract::ExtractedText;

use crate::rows::ParseError;

fn re_block_start() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"(?i)^(sent money to|received money from|card transaction|converted|topped up)")
            .expect("invalid regex")
    })
}

fn re_long_date() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"(?i)\b(\d{1,2})\s+(january|february|march|april|may|june|july|august|september|october|november|december)\s+(\d{4})\b")
            .expect("invalid regex")
    })
}

fn re_amount() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"[-+]?\d{1,3}(?:,\d{3})*\.\d{2}\b").expect("invalid regex")
    })
}

fn re_transaction_tail() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?i)\s*transaction:\s*\S+.*$").expect("invalid regex"))
}

const BLOCK_WINDOW: usize = 5;

pub fn parse(text: &ExtractedText) -> Result<Vec<Transaction>, ParseError> {
    let full = text.full_text();
    let lines: Vec<&str> = full
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut txs: Vec<Transaction> = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if !re_block_start().is_match(line) {
            i += 1;
            continue;
        }

        let window = lines[i..lines.len().min(i + BLOCK_WINDOW)].join(" ");
        let Some(date) = block_date(&window) else {
            i += 1;
            continue;
        };
        let Some(signed) = re_amount()
            .find(&window)
            .and_then(|m| parse_signed_amount(m.as_str()))
        else {
            i += 1;
            continue;
        };

        // Outflows are worded, not always signed.
        let lower = line.to_lowercase();
        let outflow = signed.is_sign_negative()
            || lower.starts_with("sent money")
            || lower.starts_with("card transaction");

        let description = re_transaction_tail().replace(line, "").trim().to_string();

        txs.push(Transaction {
            date,
            description,
            amount: Money::from_decimal(signed.abs()),
            direction: if outflow { Direction::Debit } else { Direction::Credit },
            balance: None,
            row: txs.len(),
        });

        // Skip the lines the block consumed.
        i += 2;
    }

    Ok(txs)
}

fn block_date(window: &str) -> Option<NaiveDate> {
    let c = re_long_date().captures(window)?;
    let day: u32 = c[1].parse().ok()?;
    let month = month_to_num(&c[2])?;
    let year: i32 = c[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
