use sterling_core::dates::format_uk;
use sterling_core::{Direction, Transaction};

/// Render the fixed five-column CSV. Descriptions containing a comma (or
/// quote) come out quoted; a debit row's Credit cell is empty and vice
/// versa; absent balances are empty. Pure function of its input.
pub fn to_csv(transactions: &[Transaction]) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    // Writing to an in-memory Vec cannot hit I/O errors.
    let _ = writer.write_record(["Date", "Description", "Debit", "Credit", "Balance"]);

    for tx in transactions {
        let (debit, credit) = match tx.direction {
            Direction::Debit => (tx.amount.to_string(), String::new()),
            Direction::Credit => (String::new(), tx.amount.to_string()),
        };
        let balance = tx.balance.map(|b| b.to_string()).unwrap_or_default();
        let _ = writer.write_record([
            format_uk(tx.date).as_str(),
            tx.description.as_str(),
            debit.as_str(),
            credit.as_str(),
            balance.as_str(),
        ]);
    }

    let bytes = writer.into_inner().unwrap_or_default();
    String::from_utf8(bytes).unwrap_or_default()
}

/// Render the Quicken Interchange Format `!Type:Bank` block: one
/// `D`/`T`/`P` group per transaction terminated by `^`, debits signed
/// negative.
pub fn to_qif(transactions: &[Transaction]) -> String {
    let mut out = String::from("!Type:Bank\n");
    for tx in transactions {
        out.push_str(&format!("D{}\n", format_uk(tx.date)));
        let sign = match tx.direction {
            Direction::Debit => "-",
            Direction::Credit => "",
        };
        out.push_str(&format!("T{sign}{}\n", tx.amount));
        out.push_str(&format!("P{}\n", tx.description));
        out.push('^');
        out.push('\n');
    }
    out
}
