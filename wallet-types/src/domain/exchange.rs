//! Result of a completed currency exchange.

use serde::{Deserialize, Serialize};

use super::currency::CurrencyCode;

/// Ephemeral record of one exchange operation.
///
/// Only the balance effects persist; the receipt itself exists for the
/// duration of the request and is returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeReceipt {
    /// Currency that was debited
    pub from_currency: CurrencyCode,
    /// Currency that was credited
    pub to_currency: CurrencyCode,
    /// Rate applied: units of `to_currency` per unit of `from_currency`
    pub rate: f64,
    /// Amount removed from the source balance
    pub debited: f64,
    /// Amount added to the destination balance (`debited * rate`)
    pub credited: f64,
}
