//! Error types for the wallet service.

use crate::domain::{CurrencyCode, CurrencyPair};

/// Domain-level errors (business logic violations).
///
/// These are rejected before any I/O is attempted.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Amount must be positive")]
    NonPositiveAmount,

    #[error("Malformed currency code: {0:?}")]
    InvalidCurrency(String),

    #[error("Insufficient funds in {currency}")]
    InsufficientFunds { currency: CurrencyCode },
}

/// Rate resolution errors.
///
/// A failed rate lookup never mutates the ledger, so callers may retry.
#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("Rate unavailable for {pair}: {reason}")]
    Unavailable { pair: CurrencyPair, reason: String },
}

/// Ledger-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Wallet row not found")]
    WalletNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Insufficient funds in {currency}")]
    InsufficientFunds { currency: CurrencyCode },

    #[error("Rate unavailable: {0}")]
    RateUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Domain(DomainError::InsufficientFunds { currency }) => {
                AppError::InsufficientFunds { currency }
            }
            LedgerError::Domain(e) => AppError::BadRequest(e.to_string()),
            LedgerError::WalletNotFound => AppError::NotFound("Wallet not found".into()),
            LedgerError::UserNotFound => AppError::NotFound("User not found".into()),
            LedgerError::Conflict(msg) => AppError::Conflict(msg),
            LedgerError::Database(e) => AppError::Internal(e),
            LedgerError::Transaction(e) => AppError::Internal(e),
        }
    }
}

impl From<RateError> for AppError {
    fn from(err: RateError) -> Self {
        AppError::RateUnavailable(err.to_string())
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InsufficientFunds { currency } => {
                AppError::InsufficientFunds { currency }
            }
            e => AppError::BadRequest(e.to_string()),
        }
    }
}
