//! Data Transfer Objects (DTOs) for requests and responses.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{CurrencyCode, ExchangeReceipt, UserId, WalletBalance};

// ─────────────────────────────────────────────────────────────────────────────
// Auth DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Response after registering a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: UserId,
}

/// Request to log in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response carrying a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Wallet DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to deposit into one currency balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositRequest {
    pub currency: CurrencyCode,
    pub amount: f64,
}

/// Request to withdraw from one currency balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub currency: CurrencyCode,
    pub amount: f64,
}

/// Request to exchange between two currencies at the current rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRequest {
    pub from_currency: CurrencyCode,
    pub to_currency: CurrencyCode,
    pub amount: f64,
}

/// Balances keyed by currency code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalancesResponse {
    pub balances: HashMap<String, f64>,
}

impl From<Vec<WalletBalance>> for BalancesResponse {
    fn from(rows: Vec<WalletBalance>) -> Self {
        Self {
            balances: rows
                .into_iter()
                .map(|row| (row.currency.to_string(), row.amount))
                .collect(),
        }
    }
}

/// Response after a successful exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeResponse {
    pub message: String,
    #[serde(flatten)]
    pub receipt: ExchangeReceipt,
}

impl From<ExchangeReceipt> for ExchangeResponse {
    fn from(receipt: ExchangeReceipt) -> Self {
        Self {
            message: "Exchange successful".into(),
            receipt,
        }
    }
}
