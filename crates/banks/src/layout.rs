use chrono::NaiveDate;
use rust_decimal::Decimal;

use sterling_core::dates::{parse_day_month, parse_uk_date};
use sterling_core::{parse_signed_amount, Direction, Money, Transaction};
use sterling_extract::ExtractedText;

use crate::rows::{infer_statement_year, is_noise_line, ParseError};

/// How a layout writes its dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// Complete dates (`03/04/2023`, `3 Apr 2023`, `2023-04-03`).
    Full,
    /// Day and month only (`03 Apr`); the year comes from the statement
    /// header. Full dates are still accepted.
    DayMonth,
}

/// How a layout writes its amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountStyle {
    /// One signed amount column; negative means money out. App banks
    /// (Monzo, Starling, Revolut) print this way.
    SignedSingle,
    /// Separate money-out / money-in columns that collapse to one unsigned
    /// figure per row in linear text; direction is recovered from sign
    /// markers or description keywords.
    MoneyInOut,
}

/// Declarative description of one bank's statement grammar. Most banks are
/// expressible this way; the ones that are not get bespoke parser modules.
pub struct Layout {
    pub date: DateStyle,
    pub amounts: AmountStyle,
    /// Statement lists newest transaction first.
    pub reverse_chronological: bool,
    /// Bank-specific boilerplate beyond the shared noise set, matched
    /// case-insensitively as substrings.
    pub extra_noise: &'static [&'static str],
}

pub static BARCLAYS: Layout = Layout {
    date: DateStyle::DayMonth,
    amounts: AmountStyle::MoneyInOut,
    reverse_chronological: false,
    extra_noise: &["your transactions", "anything wrong"],
};

pub static HSBC: Layout = Layout {
    date: DateStyle::DayMonth,
    amounts: AmountStyle::MoneyInOut,
    reverse_chronological: false,
    extra_noise: &["your hsbc"],
};

pub static LLOYDS: Layout = Layout {
    date: DateStyle::Full,
    amounts: AmountStyle::MoneyInOut,
    reverse_chronological: false,
    extra_noise: &["payment type"],
};

pub static NATWEST: Layout = Layout {
    date: DateStyle::DayMonth,
    amounts: AmountStyle::MoneyInOut,
    reverse_chronological: false,
    extra_noise: &["period covered"],
};

pub static SANTANDER: Layout = Layout {
    date: DateStyle::Full,
    amounts: AmountStyle::MoneyInOut,
    reverse_chronological: false,
    extra_noise: &["123 account"],
};

pub static MONZO: Layout = Layout {
    date: DateStyle::Full,
    amounts: AmountStyle::SignedSingle,
    reverse_chronological: true,
    extra_noise: &["reference:", "pot transfer"],
};

pub static STARLING: Layout = Layout {
    date: DateStyle::Full,
    amounts: AmountStyle::SignedSingle,
    reverse_chronological: true,
    extra_noise: &["goals", "spaces"],
};

pub static REVOLUT: Layout = Layout {
    date: DateStyle::Full,
    amounts: AmountStyle::SignedSingle,
    reverse_chronological: false,
    extra_noise: &["exchange rate", "vault"],
};

pub static ANNA: Layout = Layout {
    date: DateStyle::Full,
    amounts: AmountStyle::SignedSingle,
    reverse_chronological: false,
    extra_noise: &["anna subscription"],
};

pub static TIDE: Layout = Layout {
    date: DateStyle::Full,
    amounts: AmountStyle::SignedSingle,
    reverse_chronological: false,
    extra_noise: &[],
};

pub static FIRST_DIRECT: Layout = Layout {
    date: DateStyle::DayMonth,
    amounts: AmountStyle::MoneyInOut,
    reverse_chronological: false,
    extra_noise: &[],
};

pub static METRO: Layout = Layout {
    date: DateStyle::Full,
    amounts: AmountStyle::MoneyInOut,
    reverse_chronological: false,
    extra_noise: &[],
};

pub static COOP: Layout = Layout {
    date: DateStyle::Full,
    amounts: AmountStyle::MoneyInOut,
    reverse_chronological: false,
    extra_noise: &[],
};

pub static TSB: Layout = Layout {
    date: DateStyle::Full,
    amounts: AmountStyle::MoneyInOut,
    reverse_chronological: false,
    extra_noise: &[],
};

pub static NATIONWIDE: Layout = Layout {
    date: DateStyle::DayMonth,
    amounts: AmountStyle::MoneyInOut,
    reverse_chronological: false,
    extra_noise: &["flexaccount", "flexdirect"],
};

pub static CHASE: Layout = Layout {
    date: DateStyle::Full,
    amounts: AmountStyle::SignedSingle,
    reverse_chronological: false,
    extra_noise: &["round-up"],
};

pub static VIRGIN_MONEY: Layout = Layout {
    date: DateStyle::Full,
    amounts: AmountStyle::MoneyInOut,
    reverse_chronological: false,
    extra_noise: &[],
};

pub static HALIFAX: Layout = Layout {
    date: DateStyle::Full,
    amounts: AmountStyle::MoneyInOut,
    reverse_chronological: false,
    extra_noise: &["reward extras"],
};

pub static RBS: Layout = Layout {
    date: DateStyle::DayMonth,
    amounts: AmountStyle::MoneyInOut,
    reverse_chronological: false,
    extra_noise: &["period covered"],
};

pub static BANK_OF_SCOTLAND: Layout = Layout {
    date: DateStyle::Full,
    amounts: AmountStyle::MoneyInOut,
    reverse_chronological: false,
    extra_noise: &[],
};

pub static ULSTER: Layout = Layout {
    date: DateStyle::DayMonth,
    amounts: AmountStyle::MoneyInOut,
    reverse_chronological: false,
    extra_noise: &["period covered"],
};

/// Permissive settings for the universal tier: every date form, keyword
/// direction inference, no bank noise.
pub static GENERIC: Layout = Layout {
    date: DateStyle::DayMonth,
    amounts: AmountStyle::MoneyInOut,
    reverse_chronological: false,
    extra_noise: &[],
};

/// Description keywords that mark an unsigned amount as money in. Checked
/// only when the amount itself carries no sign or marker.
const CREDIT_HINTS: &[&str] = &[
    "salary",
    "refund",
    "interest",
    "deposit",
    "received",
    "bgc",
    "fpi",
    "credit from",
    "transfer in",
    "cash in",
];

/// Parse a whole statement under one layout, enforcing the grammar
/// tolerance: a profile that mostly fails its own rows is the wrong profile.
pub fn parse(layout: &Layout, text: &ExtractedText) -> Result<Vec<Transaction>, ParseError> {
    let full = text.full_text();
    let (mut txs, malformed, first_failure) = scan_lines(layout, &full);

    if malformed >= 3 {
        if txs.is_empty() {
            let (line, details) = first_failure.unwrap_or((0, "no rows parsed".to_string()));
            return Err(ParseError::MalformedRow { line, details });
        }
        if txs.len() < malformed {
            return Err(ParseError::GrammarMismatch(format!(
                "{malformed} of {} candidate rows malformed",
                malformed + txs.len(),
            )));
        }
    }

    if layout.reverse_chronological {
        txs.reverse();
        for (i, tx) in txs.iter_mut().enumerate() {
            tx.row = i;
        }
    }

    Ok(txs)
}

/// Line scan without the tolerance check; the universal tier reuses this and
/// simply keeps whatever parsed.
pub(crate) fn scan_lines(
    layout: &Layout,
    full: &str,
) -> (Vec<Transaction>, usize, Option<(usize, String)>) {
    let year = infer_statement_year(full);
    let mut txs = Vec::new();
    let mut malformed = 0usize;
    let mut first_failure: Option<(usize, String)> = None;

    for (line_no, raw) in full.lines().enumerate() {
        let line = raw.trim();
        if is_noise_line(line) || has_extra_noise(layout, line) {
            continue;
        }
        match scan_row(layout, line, year, txs.len()) {
            RowScan::Transaction(tx) => txs.push(tx),
            RowScan::Malformed(reason) => {
                malformed += 1;
                tracing::debug!(line = line_no + 1, "row rejected: {reason}");
                if first_failure.is_none() {
                    first_failure = Some((line_no + 1, reason));
                }
            }
            RowScan::NotARow => {}
        }
    }

    (txs, malformed, first_failure)
}

fn has_extra_noise(layout: &Layout, line: &str) -> bool {
    if layout.extra_noise.is_empty() {
        return false;
    }
    let lower = line.to_lowercase();
    layout.extra_noise.iter().any(|n| lower.contains(n))
}

enum RowScan {
    Transaction(Transaction),
    Malformed(String),
    NotARow,
}

fn scan_row(layout: &Layout, line: &str, year: Option<i32>, row: usize) -> RowScan {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return RowScan::NotARow;
    }

    let Some((date, consumed)) = leading_date(layout, &tokens, year) else {
        return RowScan::NotARow;
    };

    let amounts = trailing_amounts(&tokens);
    if amounts.is_empty() {
        return RowScan::Malformed("date present but no amount".to_string());
    }
    let amount_tokens: usize = amounts.iter().map(|a| a.tokens).sum();

    if consumed + amount_tokens >= tokens.len() {
        return RowScan::Malformed("no description between date and amounts".to_string());
    }
    let description = tokens[consumed..tokens.len() - amount_tokens].join(" ");

    let ordered: Vec<&AmountToken> = amounts.iter().rev().collect();
    let (signed, credit_marker, balance) = split_amounts(&ordered);
    let direction = if credit_marker {
        Direction::Credit
    } else {
        resolve_direction(layout, signed, &description)
    };

    RowScan::Transaction(Transaction {
        date,
        description,
        amount: Money::from_decimal(signed.abs()),
        direction,
        balance,
        row,
    })
}

/// Match a date at the start of the token list, longest form first. Returns
/// the date and how many tokens it consumed.
fn leading_date(layout: &Layout, tokens: &[&str], year: Option<i32>) -> Option<(NaiveDate, usize)> {
    for take in (1..=3usize.min(tokens.len())).rev() {
        let candidate = tokens[..take].join(" ");
        if let Some(date) = parse_uk_date(&candidate) {
            return Some((date, take));
        }
    }
    if layout.date == DateStyle::DayMonth && tokens.len() >= 2 {
        let candidate = tokens[..2].join(" ");
        if let Some(date) = parse_day_month(&candidate, year?) {
            return Some((date, 2));
        }
    }
    None
}

pub(crate) struct AmountToken {
    pub(crate) tokens: usize,
    pub(crate) value: Decimal,
    pub(crate) credit_marker: bool,
}

/// Walk tokens from the line's end collecting up to three amount values.
/// A bare `CR`/`DR` token merges with the figure before it. Returned in
/// end-of-line order, each with the token count it consumed.
pub(crate) fn trailing_amounts(tokens: &[&str]) -> Vec<AmountToken> {
    let mut out = Vec::new();
    let mut idx = tokens.len();
    while idx > 0 && out.len() < 3 {
        let token = tokens[idx - 1];
        let (text, used) = if token.eq_ignore_ascii_case("cr") || token.eq_ignore_ascii_case("dr") {
            if idx < 2 {
                break;
            }
            (format!("{} {}", tokens[idx - 2], token), 2)
        } else {
            (token.to_string(), 1)
        };
        // Amounts in statements always carry pence; a bare integer is more
        // likely a card number fragment or a date.
        if !text.contains('.') {
            break;
        }
        match parse_signed_amount(&text) {
            Some(value) => {
                let credit_marker = text.to_uppercase().trim_end().ends_with("CR");
                out.push(AmountToken { tokens: used, value, credit_marker });
                idx -= used;
            }
            None => break,
        }
    }
    out
}

/// `ordered` is in line order. One value is the amount; two or more make the
/// last the running balance.
fn split_amounts(ordered: &[&AmountToken]) -> (Decimal, bool, Option<Money>) {
    match ordered {
        [single] => (single.value, single.credit_marker, None),
        [amount, .., balance] => (
            amount.value,
            amount.credit_marker,
            Some(Money::from_decimal(balance.value)),
        ),
        [] => (Decimal::ZERO, false, None),
    }
}

fn resolve_direction(layout: &Layout, signed: Decimal, description: &str) -> Direction {
    if signed.is_sign_negative() {
        return Direction::Debit;
    }
    match layout.amounts {
        AmountStyle::SignedSingle => Direction::Credit,
        AmountStyle::MoneyInOut => {
            let lower = description.to_lowercase();
            if CREDIT_HINTS.iter().any(|h| lower.contains(h)) {
                Direction::Credit
            } else {
                Direction::Debit
            }
        }
    }
}
