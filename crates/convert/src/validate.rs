use rust_decimal::Decimal;
use sterling_core::Transaction;

/// Check that running balances agree with the amounts between them. Rows
/// without a balance contribute their amount to the next checkable gap.
/// Returns human-readable warnings; rows are never dropped for failing this,
/// since extraction frequently loses a column the arithmetic needs.
pub fn balance_warnings(transactions: &[Transaction]) -> Vec<String> {
    let tolerance = Decimal::new(1, 2); // 1p of extraction rounding
    let mut warnings = Vec::new();

    let mut anchor: Option<(String, Decimal)> = None;
    let mut pending = Decimal::ZERO;

    for tx in transactions {
        if let (Some((desc, prev_bal)), Some(bal)) = (&anchor, tx.balance) {
            let expected = *prev_bal + pending + tx.signed_amount();
            let diff = (expected - bal.as_decimal()).abs();
            if diff > tolerance {
                warnings.push(format!(
                    "balance discontinuity after \"{desc}\": expected {expected:.2}, statement shows {bal}",
                ));
            }
        }
        match tx.balance {
            Some(bal) => {
                anchor = Some((tx.description.clone(), bal.as_decimal()));
                pending = Decimal::ZERO;
            }
            None => pending += tx.signed_amount(),
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sterling_core::{Money, Transaction};

    fn tx(day: u32, desc: &str, cents: i64, balance: Option<i64>, row: usize) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        let mut t = if cents < 0 {
            Transaction::debit(date, desc, Money::from_cents(-cents), row)
        } else {
            Transaction::credit(date, desc, Money::from_cents(cents), row)
        };
        t.balance = balance.map(Money::from_cents);
        t
    }

    #[test]
    fn consistent_run_produces_no_warnings() {
        let txs = vec![
            tx(1, "OPEN", 10000, Some(10000), 0),
            tx(2, "SHOP", -2500, Some(7500), 1),
            tx(3, "SHOP2", -500, Some(7000), 2),
        ];
        assert!(balance_warnings(&txs).is_empty());
    }

    #[test]
    fn discontinuity_flagged() {
        let txs = vec![
            tx(1, "OPEN", 10000, Some(10000), 0),
            tx(2, "SHOP", -2500, Some(9000), 1),
        ];
        let warnings = balance_warnings(&txs);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("OPEN"));
    }

    #[test]
    fn balance_less_rows_carry_their_amount_forward() {
        let txs = vec![
            tx(1, "A", 10000, Some(10000), 0),
            tx(2, "B", -100, None, 1),
            tx(3, "C", -500, Some(9400), 2),
        ];
        assert!(balance_warnings(&txs).is_empty());
    }

    #[test]
    fn penny_differences_tolerated() {
        let txs = vec![
            tx(1, "A", 10000, Some(10000), 0),
            tx(2, "B", -2500, Some(7501), 1),
        ];
        assert!(balance_warnings(&txs).is_empty());
    }

    #[test]
    fn no_balances_no_warnings() {
        let txs = vec![tx(1, "A", -100, None, 0), tx(2, "B", -200, None, 1)];
        assert!(balance_warnings(&txs).is_empty());
    }
}
