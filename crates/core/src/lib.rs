//! Core business logic for fxserve.
//!
//! Pure conversion arithmetic with no web or database dependencies:
//! - Supported currency codes and their minor-unit precision
//! - Decimal conversion with banker's rounding and overflow detection

pub mod currency;

pub use currency::{Conversion, ConversionError, CurrencyCode, convert};
