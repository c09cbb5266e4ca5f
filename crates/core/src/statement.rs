use serde::{Deserialize, Serialize};

use super::transaction::Transaction;

/// Which fallback tier produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseTier {
    BankSpecific,
    Universal,
    TextFallback,
}

impl std::fmt::Display for ParseTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseTier::BankSpecific => write!(f, "bank-specific"),
            ParseTier::Universal => write!(f, "universal"),
            ParseTier::TextFallback => write!(f, "text-fallback"),
        }
    }
}

/// The finished product of one conversion: never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedStatement {
    pub bank_name: String,
    pub detected_format: String,
    pub account_number: Option<String>,
    pub sort_code: Option<String>,
    pub transactions: Vec<Transaction>,
}

impl ParsedStatement {
    pub fn total_transactions(&self) -> usize {
        self.transactions.len()
    }
}
