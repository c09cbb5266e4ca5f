pub mod clean;
pub mod export;
pub mod normalize;
pub mod pipeline;
pub mod validate;

pub use clean::clean_description;
pub use export::{to_csv, to_qif};
pub use normalize::{normalize, NormalizeReport};
pub use pipeline::{Conversion, ConvertError, Converter, TierAttempt};
pub use validate::balance_warnings;
