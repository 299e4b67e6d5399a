//! # Wallet Service
//!
//! Application service and HTTP adapter for the currency wallet.
//! `WalletService` orchestrates the ports (`LedgerStore`, `RateProvider`
//! via `ExchangeRateService`); `inbound` exposes it over HTTP with JWT
//! bearer authentication.

pub mod inbound;
pub mod password;

mod service;

#[cfg(test)]
mod service_tests;

pub use service::WalletService;
