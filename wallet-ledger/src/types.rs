//! Database row structs and their mapping into domain types.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use wallet_types::{CurrencyCode, LedgerError, User, UserId, WalletBalance};

/// User row from database.
#[derive(FromRow)]
pub struct DbUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

impl DbUser {
    pub fn into_domain(self) -> Result<User, LedgerError> {
        let id: UserId = self
            .id
            .parse()
            .map_err(|e| LedgerError::Database(format!("invalid user id: {e}")))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| LedgerError::Database(format!("invalid timestamp: {e}")))?
            .with_timezone(&Utc);

        Ok(User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            created_at,
        })
    }
}

/// Wallet balance row from database.
#[derive(FromRow)]
pub struct DbWallet {
    pub currency: String,
    pub amount: f64,
}

impl DbWallet {
    pub fn into_domain(self, user_id: UserId) -> Result<WalletBalance, LedgerError> {
        let currency = CurrencyCode::new(self.currency)
            .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(WalletBalance {
            user_id,
            currency,
            amount: self.amount,
        })
    }
}
