//! Domain models for the wallet service.

pub mod currency;
pub mod exchange;
pub mod user;
pub mod wallet;

pub use currency::{CurrencyCode, CurrencyPair};
pub use exchange::ExchangeReceipt;
pub use user::{User, UserId};
pub use wallet::WalletBalance;
