//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when a donation or profile field is malformed.
//! - [`UnknownCurrency`] thrown when a currency code is not in the table.
//! - [`KeyNotFound`] thrown when a profile is not found.
//! - [`ChargeDeclined`] thrown when the gateway declines a charge and the
//!   staged transaction has been rolled back cleanly.
//! - [`Inconsistency`] thrown when staged transaction state cannot be located
//!   at commit or rollback time.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`UnknownCurrency`]: EngineError::UnknownCurrency
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ChargeDeclined`]: EngineError::ChargeDeclined
//!  [`Inconsistency`]: EngineError::Inconsistency
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Invalid currency: {0}")]
    UnknownCurrency(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Transaction failed! Charge was unsuccessful. Donation not saved.")]
    ChargeDeclined,
    #[error("Transaction state inconsistent: {0}")]
    Inconsistency(String),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::UnknownCurrency(a), Self::UnknownCurrency(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ChargeDeclined, Self::ChargeDeclined) => true,
            (Self::Inconsistency(a), Self::Inconsistency(b)) => a == b,
            _ => false,
        }
    }
}
