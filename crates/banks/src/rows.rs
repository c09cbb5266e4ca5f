use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: {details}")]
    MalformedRow { line: usize, details: String },
    #[error("statement grammar not recognised: {0}")]
    GrammarMismatch(String),
}

macro_rules! re {
    ($name:ident, $pat:expr) => {
        pub(crate) fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_year, r"\b(20\d{2})\b");
re!(re_page_marker, r"(?i)^page\s+\d+(\s+of\s+\d+)?$");

/// Boilerplate that every bank sprinkles between transaction rows: column
/// headers, page furniture, carried-forward balances, marketing lines.
const NOISE_FRAGMENTS: &[&str] = &[
    "statement period",
    "statement date",
    "account number",
    "account name",
    "sort code",
    "iban",
    "swiftbic",
    "swift/bic",
    "balance brought forward",
    "balance carried forward",
    "brought forward",
    "carried forward",
    "balance b/f",
    "balance c/f",
    "start balance",
    "end balance",
    "opening balance",
    "closing balance",
    "money out",
    "money in",
    "paid out",
    "paid in",
    "continued on next page",
    "continued overleaf",
    "this statement",
    "www.",
    "registered office",
    "authorised by the prudential regulation authority",
];

pub(crate) fn is_noise_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || re_page_marker().is_match(trimmed) {
        return true;
    }
    let lower = trimmed.to_lowercase();
    // Column header rows: all of date/description present, no digits.
    if lower.contains("date") && lower.contains("description") && !lower.chars().any(|c| c.is_ascii_digit()) {
        return true;
    }
    NOISE_FRAGMENTS.iter().any(|f| lower.contains(f))
}

/// Year for day+month-only rows, read from the statement header. The first
/// four-digit year in the opening lines is the statement period's year.
pub(crate) fn infer_statement_year(text: &str) -> Option<i32> {
    for line in text.lines().take(50) {
        if let Some(c) = re_year().captures(line) {
            if let Ok(y) = c[1].parse() {
                return Some(y);
            }
        }
    }
    None
}
