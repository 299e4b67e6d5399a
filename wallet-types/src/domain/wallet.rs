//! Per-user, per-currency balance row.

use serde::{Deserialize, Serialize};

use super::currency::CurrencyCode;
use super::user::UserId;

/// One ledger row: how much of one currency a user holds.
///
/// `amount >= 0` holds for every committed row; it may only be violated
/// transiently inside an uncommitted ledger transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletBalance {
    pub user_id: UserId,
    pub currency: CurrencyCode,
    pub amount: f64,
}
