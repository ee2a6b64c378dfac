//! Repository abstractions for data access.

pub mod conversion;
pub mod rate;

pub use conversion::{AuditError, ConversionAuditWriter, NewConversion};
pub use rate::{RateError, RateRepository};
