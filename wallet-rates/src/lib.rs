//! # Wallet Rates
//!
//! Exchange rate resolution for the currency wallet:
//! - `RateCache` - in-memory TTL cache keyed by directed currency pair
//! - `ExchangeRateService` - cache-first rate resolution with single-flight
//!   collapsing of concurrent misses
//! - `HttpRateProvider` - reqwest adapter for the remote pricing service

mod cache;
mod provider;
mod service;

pub use cache::{InvalidCacheConfig, RateCache, RateCacheConfig};
pub use provider::HttpRateProvider;
pub use service::ExchangeRateService;
