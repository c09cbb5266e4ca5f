pub mod detect;
pub mod fallback;
pub mod layout;
pub mod monzo;
pub mod profile;
pub(crate) mod rows;
pub mod universal;
pub mod wise;

pub use detect::{detect, Detection, CONFIDENT_SCORE};
pub use profile::{BankId, BankProfile, Signature, PROFILES, UNKNOWN_PROFILE};
pub use rows::ParseError;

use sterling_core::Transaction;
use sterling_extract::ExtractedText;

/// Run the grammar for one bank. Closed dispatch: every supported bank is a
/// variant here, most expressed as a declarative layout, the rest as bespoke
/// modules. `Unknown` has no grammar and yields nothing.
pub fn parse_bank(id: BankId, text: &ExtractedText) -> Result<Vec<Transaction>, ParseError> {
    match id {
        BankId::Wise => wise::parse(text),
        BankId::Monzo => layout::parse(&layout::MONZO, text),
        BankId::Starling => layout::parse(&layout::STARLING, text),
        BankId::Revolut => layout::parse(&layout::REVOLUT, text),
        BankId::Anna => layout::parse(&layout::ANNA, text),
        BankId::Tide => layout::parse(&layout::TIDE, text),
        BankId::Chase => layout::parse(&layout::CHASE, text),
        BankId::FirstDirect => layout::parse(&layout::FIRST_DIRECT, text),
        BankId::Metro => layout::parse(&layout::METRO, text),
        BankId::Coop => layout::parse(&layout::COOP, text),
        BankId::Tsb => layout::parse(&layout::TSB, text),
        BankId::Nationwide => layout::parse(&layout::NATIONWIDE, text),
        BankId::VirginMoney => layout::parse(&layout::VIRGIN_MONEY, text),
        BankId::Barclays => layout::parse(&layout::BARCLAYS, text),
        BankId::Hsbc => layout::parse(&layout::HSBC, text),
        BankId::Lloyds => layout::parse(&layout::LLOYDS, text),
        BankId::Halifax => layout::parse(&layout::HALIFAX, text),
        BankId::Natwest => layout::parse(&layout::NATWEST, text),
        BankId::Rbs => layout::parse(&layout::RBS, text),
        BankId::BankOfScotland => layout::parse(&layout::BANK_OF_SCOTLAND, text),
        BankId::Ulster => layout::parse(&layout::ULSTER, text),
        BankId::Santander => layout::parse(&layout::SANTANDER, text),
        BankId::Unknown => Ok(Vec::new()),
    }
}

/// Secondary grammar for profiles whose statements sometimes defeat their
/// primary layout. The orchestrator invokes this only when detection was
/// confident yet the primary parse produced nothing.
pub fn refine_bank(id: BankId, text: &ExtractedText) -> Option<Result<Vec<Transaction>, ParseError>> {
    match id {
        // App banks put the merchant on the line above the figures.
        BankId::Monzo | BankId::Starling => Some(monzo::parse_multiline(text)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_bank_parses_to_nothing() {
        let text = ExtractedText::from_plain("01/03/2024 TESCO 12.50");
        assert!(parse_bank(BankId::Unknown, &text).unwrap().is_empty());
    }

    #[test]
    fn refinement_exists_only_for_multiline_profiles() {
        let text = ExtractedText::from_plain("");
        assert!(refine_bank(BankId::Monzo, &text).is_some());
        assert!(refine_bank(BankId::Barclays, &text).is_none());
        assert!(refine_bank(BankId::Unknown, &text).is_none());
    }

    #[test]
    fn monzo_refinement_recovers_multiline_statement() {
        let stmt = "Monzo Bank Limited\n\
                    PRET A MANGER\n\
                    05/03/2024 -4.50 95.50\n";
        let text = ExtractedText::from_plain(stmt);
        // Primary layout sees no description on the figures line.
        let primary = parse_bank(BankId::Monzo, &text).unwrap();
        assert!(primary.is_empty());
        let refined = refine_bank(BankId::Monzo, &text).unwrap().unwrap();
        assert_eq!(refined.len(), 1);
        assert_eq!(refined[0].description, "PRET A MANGER");
    }
}
