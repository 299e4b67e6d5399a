//! Ledger store port.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (SQLite today, Postgres later) implement this trait.

use std::sync::Arc;

use crate::domain::{CurrencyCode, User, UserId, WalletBalance};
use crate::error::LedgerError;

/// Persistent record of per-user, per-currency balances.
///
/// The two-leg exchange mutation is driven through the transactional
/// primitives (`begin` / `conditional_debit` / `credit` / `commit` /
/// `rollback`). `commit` and `rollback` consume the handle, so each
/// transaction ends exactly once; implementations must also roll back
/// when a handle is dropped without either, which covers cancellation.
#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    /// Transaction handle. Holding one scopes all conditional updates
    /// until `commit` or `rollback`.
    type Tx: Send;

    // ─────────────────────────────────────────────────────────────────────────
    // User operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates a user and seeds their wallet rows atomically.
    /// Duplicate username or email yields `LedgerError::Conflict`.
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, LedgerError>;

    /// Looks up a user by login name.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, LedgerError>;

    // ─────────────────────────────────────────────────────────────────────────
    // Single-statement wallet operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns all balance rows for a user.
    async fn balances(&self, user_id: UserId) -> Result<Vec<WalletBalance>, LedgerError>;

    /// Adds to one balance row. Missing row yields `WalletNotFound`.
    async fn deposit(
        &self,
        user_id: UserId,
        currency: &CurrencyCode,
        amount: f64,
    ) -> Result<(), LedgerError>;

    /// Conditionally removes from one balance row.
    ///
    /// The check-then-decrement is a single conditional statement; when it
    /// affects zero rows (insufficient funds or no such wallet) the result
    /// is `DomainError::InsufficientFunds`.
    async fn withdraw(
        &self,
        user_id: UserId,
        currency: &CurrencyCode,
        amount: f64,
    ) -> Result<(), LedgerError>;

    // ─────────────────────────────────────────────────────────────────────────
    // Transactional primitives (driven by the exchange coordinator)
    // ─────────────────────────────────────────────────────────────────────────

    /// Opens a transaction scope.
    async fn begin(&self) -> Result<Self::Tx, LedgerError>;

    /// Decrements a balance only if it currently holds at least `amount`.
    ///
    /// Returns the number of rows affected; zero means insufficient funds
    /// or no such wallet row. Callers must inspect the count - the absence
    /// of an error is not success.
    async fn conditional_debit(
        &self,
        tx: &mut Self::Tx,
        user_id: UserId,
        currency: &CurrencyCode,
        amount: f64,
    ) -> Result<u64, LedgerError>;

    /// Increments a balance inside the same transaction scope.
    /// A missing destination row is an error, not a silent no-op.
    async fn credit(
        &self,
        tx: &mut Self::Tx,
        user_id: UserId,
        currency: &CurrencyCode,
        amount: f64,
    ) -> Result<(), LedgerError>;

    /// Commits the transaction, making both legs visible atomically.
    async fn commit(&self, tx: Self::Tx) -> Result<(), LedgerError>;

    /// Rolls the transaction back, discarding all staged updates.
    async fn rollback(&self, tx: Self::Tx) -> Result<(), LedgerError>;
}

#[async_trait::async_trait]
impl<T: LedgerStore> LedgerStore for Arc<T> {
    type Tx = T::Tx;

    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, LedgerError> {
        (**self).create_user(username, email, password_hash).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, LedgerError> {
        (**self).find_user_by_username(username).await
    }

    async fn balances(&self, user_id: UserId) -> Result<Vec<WalletBalance>, LedgerError> {
        (**self).balances(user_id).await
    }

    async fn deposit(
        &self,
        user_id: UserId,
        currency: &CurrencyCode,
        amount: f64,
    ) -> Result<(), LedgerError> {
        (**self).deposit(user_id, currency, amount).await
    }

    async fn withdraw(
        &self,
        user_id: UserId,
        currency: &CurrencyCode,
        amount: f64,
    ) -> Result<(), LedgerError> {
        (**self).withdraw(user_id, currency, amount).await
    }

    async fn begin(&self) -> Result<Self::Tx, LedgerError> {
        (**self).begin().await
    }

    async fn conditional_debit(
        &self,
        tx: &mut Self::Tx,
        user_id: UserId,
        currency: &CurrencyCode,
        amount: f64,
    ) -> Result<u64, LedgerError> {
        (**self).conditional_debit(tx, user_id, currency, amount).await
    }

    async fn credit(
        &self,
        tx: &mut Self::Tx,
        user_id: UserId,
        currency: &CurrencyCode,
        amount: f64,
    ) -> Result<(), LedgerError> {
        (**self).credit(tx, user_id, currency, amount).await
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), LedgerError> {
        (**self).commit(tx).await
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), LedgerError> {
        (**self).rollback(tx).await
    }
}
