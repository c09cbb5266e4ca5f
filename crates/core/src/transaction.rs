use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Debit,
    Credit,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Debit => write!(f, "debit"),
            Direction::Credit => write!(f, "credit"),
        }
    }
}

/// One statement row. `amount` is the unsigned magnitude; `direction` says
/// which way the money moved. `row` preserves the position the row held in
/// the source document so ties on date sort stably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub direction: Direction,
    pub balance: Option<Money>,
    pub row: usize,
}

impl Transaction {
    pub fn debit(date: NaiveDate, description: impl Into<String>, amount: Money, row: usize) -> Self {
        Transaction {
            date,
            description: description.into(),
            amount,
            direction: Direction::Debit,
            balance: None,
            row,
        }
    }

    pub fn credit(date: NaiveDate, description: impl Into<String>, amount: Money, row: usize) -> Self {
        Transaction {
            date,
            description: description.into(),
            amount,
            direction: Direction::Credit,
            balance: None,
            row,
        }
    }

    /// Build from a signed amount using the statement convention that
    /// negative means money out.
    pub fn from_signed(
        date: NaiveDate,
        description: impl Into<String>,
        signed: Decimal,
        balance: Option<Money>,
        row: usize,
    ) -> Self {
        let direction = if signed.is_sign_negative() {
            Direction::Debit
        } else {
            Direction::Credit
        };
        Transaction {
            date,
            description: description.into(),
            amount: Money::from_decimal(signed.abs()),
            direction,
            balance,
            row,
        }
    }

    /// The debit half of the CSV split; zero for credits.
    pub fn debit_amount(&self) -> Money {
        match self.direction {
            Direction::Debit => self.amount,
            Direction::Credit => Money::zero(),
        }
    }

    /// The credit half of the CSV split; zero for debits.
    pub fn credit_amount(&self) -> Money {
        match self.direction {
            Direction::Debit => Money::zero(),
            Direction::Credit => self.amount,
        }
    }

    /// Signed value: credits positive, debits negative.
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            Direction::Debit => -self.amount.as_decimal(),
            Direction::Credit => self.amount.as_decimal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn from_signed_negative_is_debit() {
        let tx = Transaction::from_signed(
            date(2024, 3, 1),
            "TESCO STORE",
            Decimal::from_str("-12.50").unwrap(),
            None,
            0,
        );
        assert_eq!(tx.direction, Direction::Debit);
        assert_eq!(tx.amount, Money::from_cents(1250));
    }

    #[test]
    fn from_signed_positive_is_credit() {
        let tx = Transaction::from_signed(
            date(2024, 3, 2),
            "SALARY",
            Decimal::from_str("2500.00").unwrap(),
            None,
            1,
        );
        assert_eq!(tx.direction, Direction::Credit);
        assert_eq!(tx.amount, Money::from_cents(250000));
    }

    #[test]
    fn exactly_one_split_side_is_nonzero() {
        let d = Transaction::debit(date(2024, 1, 1), "COFFEE", Money::from_cents(450), 0);
        assert_eq!(d.debit_amount(), Money::from_cents(450));
        assert!(d.credit_amount().is_zero());

        let c = Transaction::credit(date(2024, 1, 1), "REFUND", Money::from_cents(450), 1);
        assert!(c.debit_amount().is_zero());
        assert_eq!(c.credit_amount(), Money::from_cents(450));
    }

    #[test]
    fn signed_amount_reflects_direction() {
        let d = Transaction::debit(date(2024, 1, 1), "A", Money::from_cents(100), 0);
        assert!(d.signed_amount().is_sign_negative());
        let c = Transaction::credit(date(2024, 1, 1), "B", Money::from_cents(100), 0);
        assert!(c.signed_amount().is_sign_positive());
    }
}
