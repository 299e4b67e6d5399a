//! # Wallet Ledger
//!
//! Concrete ledger adapter for the wallet service.
//! This crate provides the SQLite implementation of the `LedgerStore` port.

pub mod sqlite;

mod types;


pub use sqlite::SqliteLedger;

/// Build and initialize a ledger from a database URL.
///
/// This function:
/// 1. Connects to the database
/// 2. Runs migrations to create tables
/// 3. Returns a ready-to-use `SqliteLedger`
///
/// # Examples
///
/// ```ignore
/// let ledger = build_ledger("sqlite://wallet.db?mode=rwc").await?;
/// ```
pub async fn build_ledger(database_url: &str) -> anyhow::Result<SqliteLedger> {
    SqliteLedger::new(database_url).await
}
