//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod ledger;
mod rates;

pub use ledger::LedgerStore;
pub use rates::RateProvider;
