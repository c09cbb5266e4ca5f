//! Monzo's PDF export splits a transaction across lines: the merchant sits
//! on its own line and the following line carries date, signed amount and
//! balance. The plain layout scan sees date-and-amounts rows with no
//! description and drops them, so this parser recovers the merchant by
//! looking backwards. It runs as the refinement pass when the flat layout
//! comes back empty despite a confident detection.

use regex::Regex;
use std::sync::OnceLock;

use sterling_core::dates::parse_uk_date;
use sterling_core::{Money, Transaction};
use sterling_extract::ExtractedText;

use crate::layout::trailing_amounts;
use crate::rows::{is_noise_line, ParseError};

fn re_slash_date() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}\b").expect("invalid regex"))
}

fn re_reference() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?i)^reference:").expect("invalid regex"))
}

pub fn parse_multiline(text: &ExtractedText) -> Result<Vec<Transaction>, ParseError> {
    let full = text.full_text();
    let lines: Vec<&str> = full.lines().map(str::trim).collect();
    let mut txs: Vec<Transaction> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if !re_slash_date().is_match(line) {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(date) = parse_uk_date(tokens[0]) else {
            continue;
        };

        let amounts = trailing_amounts(&tokens);
        if amounts.is_empty() {
            continue;
        }
        let amount_tokens: usize = amounts.iter().map(|a| a.tokens).sum();

        // Inline description when the row carries one; otherwise the
        // merchant is on an earlier line.
        let inline = tokens[1..tokens.len() - amount_tokens].join(" ");
        let description = if inline.is_empty() {
            match merchant_above(&lines, i) {
                Some(m) => m.to_string(),
                None => continue,
            }
        } else {
            inline
        };

        // Line order: amount first, balance last when both are present.
        let ordered: Vec<_> = amounts.iter().rev().collect();
        let (signed, balance) = match ordered.as_slice() {
            [single] => (single.value, None),
            [amount, .., balance] => (amount.value, Some(Money::from_decimal(balance.value))),
            [] => continue,
        };

        txs.push(Transaction::from_signed(
            date,
            description,
            signed,
            balance,
            txs.len(),
        ));
    }

    // Monzo lists newest first; restore statement order.
    txs.reverse();
    for (i, tx) in txs.iter_mut().enumerate() {
        tx.row = i;
    }

    Ok(txs)
}

/// Nearest preceding line that can plausibly name a merchant: non-noise, not
/// a reference line, not itself a transaction row.
fn merchant_above<'a>(lines: &[&'a str], from: usize) -> Option<&'a str> {
    lines[..from].iter().rev().take(3).find_map(|l| {
        let line = l.trim();
        if line.is_empty()
            || is_noise_line(line)
            || re_reference().is_match(line)
            || re_slash_date().is_match(line)
        {
            None
        } else {
            Some(line)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sterling_core::Direction;

    fn text(s: &str) -> ExtractedText {
        ExtractedText::from_plain(s)
    }

    #[test]
    fn merchant_recovered_from_previous_line() {
        let stmt = "Monzo Bank Limited\n\
                    PRET A MANGER\n\
                    05/03/2024 -4.50 95.50\n\
                    Reference: lunch\n\
                    SALARY ACME\n\
                    01/03/2024 100.00 100.00\n";
        let txs = parse_multiline(&text(stmt)).unwrap();
        assert_eq!(txs.len(), 2);
        // Reversed to statement order: oldest first.
        assert_eq!(txs[0].description, "SALARY ACME");
        assert_eq!(txs[0].direction, Direction::Credit);
        assert_eq!(txs[1].description, "PRET A MANGER");
        assert_eq!(txs[1].direction, Direction::Debit);
        assert_eq!(txs[1].amount, Money::from_cents(450));
        assert_eq!(txs[1].date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn inline_description_kept_when_present() {
        let stmt = "02/03/2024 TESCO STORES -12.50 87.50\n";
        let txs = parse_multiline(&text(stmt)).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].description, "TESCO STORES");
    }

    #[test]
    fn reference_lines_never_become_merchants() {
        let stmt = "Reference: abc123\n05/03/2024 -4.50 95.50\n";
        let txs = parse_multiline(&text(stmt)).unwrap();
        assert!(txs.is_empty());
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(parse_multiline(&text("")).unwrap().is_empty());
    }
}
