//! Supported currencies and conversion arithmetic.

pub mod code;
pub mod convert;

pub use code::CurrencyCode;
pub use convert::{Conversion, ConversionError, MAX_AMOUNT, convert};
