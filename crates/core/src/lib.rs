pub mod dates;
pub mod money;
pub mod statement;
pub mod transaction;

pub use money::{parse_signed_amount, Money};
pub use statement::{ParseTier, ParsedStatement};
pub use transaction::{Direction, Transaction};
