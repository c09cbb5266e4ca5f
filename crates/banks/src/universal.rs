//! Format-agnostic tier: no bank grammar, just "a date, some words, some
//! money". Handles comma-separated exports (including our own CSV output)
//! and falls back to a free-text line scan. Never fails; an empty result is
//! the orchestrator's signal to move on.

use rust_decimal::Decimal;

use sterling_core::dates::parse_uk_date;
use sterling_core::{parse_signed_amount, Direction, Money, Transaction};
use sterling_extract::ExtractedText;

use crate::layout::{scan_lines, GENERIC};

pub fn parse(text: &ExtractedText) -> Vec<Transaction> {
    let full = text.full_text();

    let txs = parse_delimited(&full);
    if !txs.is_empty() {
        return txs;
    }

    let (txs, malformed, _) = scan_lines(&GENERIC, &full);
    if malformed > 0 {
        tracing::debug!(malformed, "universal free-text scan rejected rows");
    }
    txs
}

// ── Comma-separated pass ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    date: usize,
    description: usize,
    debit: Option<usize>,
    credit: Option<usize>,
    amount: Option<usize>,
    balance: Option<usize>,
}

fn parse_delimited(full: &str) -> Vec<Transaction> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(full.as_bytes());

    let mut txs = Vec::new();
    let mut columns: Option<ColumnMap> = None;

    for result in reader.records() {
        let Ok(record) = result else { continue };
        if record.len() < 2 {
            continue;
        }
        if columns.is_none() && txs.is_empty() {
            if let Some(map) = header_columns(&record) {
                columns = Some(map);
                continue;
            }
        }
        let tx = match columns {
            Some(map) => mapped_row(&record, map, txs.len()),
            None => positional_row(&record, txs.len()),
        };
        if let Some(tx) = tx {
            txs.push(tx);
        }
    }
    txs
}

fn header_columns(record: &csv::StringRecord) -> Option<ColumnMap> {
    let mut map = ColumnMap {
        date: usize::MAX,
        description: usize::MAX,
        debit: None,
        credit: None,
        amount: None,
        balance: None,
    };
    for (i, field) in record.iter().enumerate() {
        // First claim wins so a later "Reference" column cannot displace the
        // real description.
        match field.to_lowercase().as_str() {
            "date" | "transaction date" if map.date == usize::MAX => map.date = i,
            "description" | "narrative" | "details" | "merchant" | "reference"
                if map.description == usize::MAX =>
            {
                map.description = i
            }
            "debit" | "money out" | "paid out" | "out" if map.debit.is_none() => {
                map.debit = Some(i)
            }
            "credit" | "money in" | "paid in" | "in" if map.credit.is_none() => {
                map.credit = Some(i)
            }
            "amount" | "value" if map.amount.is_none() => map.amount = Some(i),
            "balance" | "running balance" if map.balance.is_none() => map.balance = Some(i),
            _ => {}
        }
    }
    (map.date != usize::MAX && map.description != usize::MAX).then_some(map)
}

fn mapped_row(record: &csv::StringRecord, map: ColumnMap, row: usize) -> Option<Transaction> {
    let date = parse_uk_date(record.get(map.date)?)?;
    let description = record.get(map.description)?.to_string();

    let field = |i: Option<usize>| -> Option<Decimal> {
        i.and_then(|i| record.get(i))
            .filter(|s| !s.trim().is_empty())
            .and_then(parse_signed_amount)
    };
    let balance = field(map.balance).map(Money::from_decimal);

    if let Some(debit) = field(map.debit) {
        return Some(Transaction {
            date,
            description,
            amount: Money::from_decimal(debit.abs()),
            direction: Direction::Debit,
            balance,
            row,
        });
    }
    if let Some(credit) = field(map.credit) {
        return Some(Transaction {
            date,
            description,
            amount: Money::from_decimal(credit.abs()),
            direction: Direction::Credit,
            balance,
            row,
        });
    }
    let signed = field(map.amount)?;
    Some(Transaction::from_signed(date, description, signed, balance, row))
}

/// No header: assume `date, description, …amounts`. Two trailing values are
/// amount and balance; three are debit, credit, balance with exactly one of
/// the first pair populated.
fn positional_row(record: &csv::StringRecord, row: usize) -> Option<Transaction> {
    let date = parse_uk_date(record.get(0)?)?;
    let description = record.get(1)?.to_string();

    let values: Vec<Option<Decimal>> = (2..record.len())
        .map(|i| {
            record
                .get(i)
                .filter(|s| !s.trim().is_empty())
                .and_then(parse_signed_amount)
        })
        .collect();

    let build = |signed: Decimal, balance: Option<Decimal>| {
        Some(Transaction::from_signed(
            date,
            description.clone(),
            signed,
            balance.map(Money::from_decimal),
            row,
        ))
    };

    match values.as_slice() {
        [Some(signed)] => build(*signed, None),
        [Some(signed), balance] => build(*signed, *balance),
        [debit, credit, balance] => match (debit, credit) {
            (Some(d), None) => build(-d.abs(), *balance),
            (None, Some(c)) => build(c.abs(), *balance),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn text(s: &str) -> ExtractedText {
        ExtractedText::from_plain(s)
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn headerless_csv_with_signed_amounts() {
        let input = "01/03/2024,TESCO STORE,-12.50\n02/03/2024,SALARY,2500.00\n";
        let txs = parse(&text(input));
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].date, ymd(2024, 3, 1));
        assert_eq!(txs[0].description, "TESCO STORE");
        assert_eq!(txs[0].direction, Direction::Debit);
        assert_eq!(txs[0].amount, Money::from_cents(1250));
        assert_eq!(txs[1].direction, Direction::Credit);
        assert_eq!(txs[1].amount, Money::from_cents(250000));
    }

    #[test]
    fn our_own_csv_header_round_trips() {
        let input = "Date,Description,Debit,Credit,Balance\n\
                     01/03/2024,\"Payment, ref 123\",12.50,,100.00\n\
                     02/03/2024,SALARY,,2500.00,2600.00\n";
        let txs = parse(&text(input));
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].description, "Payment, ref 123");
        assert_eq!(txs[0].direction, Direction::Debit);
        assert_eq!(txs[0].balance, Some(Money::from_cents(10000)));
        assert_eq!(txs[1].direction, Direction::Credit);
        assert_eq!(txs[1].balance, Some(Money::from_cents(260000)));
    }

    #[test]
    fn free_text_lines_parse_when_no_commas() {
        let input = "Statement 2024\n01/03/2024 COFFEE SHOP 3.20 96.80\n";
        let txs = parse(&text(input));
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].description, "COFFEE SHOP");
    }

    #[test]
    fn prose_yields_nothing() {
        let input = "Dear customer,\nthank you for banking with us.\nKind regards.";
        assert!(parse(&text(input)).is_empty());
    }

    #[test]
    fn zero_amount_rows_pass_through_for_normaliser() {
        // The universal tier does not enforce invariants; it only finds rows.
        let input = "01/03/2024,FEE WAIVED,0.00\n";
        let txs = parse(&text(input));
        assert_eq!(txs.len(), 1);
        assert!(txs[0].amount.is_zero());
    }
}
