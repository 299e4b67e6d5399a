//! Rate provider port.
//!
//! The remote pricing service is consumed through this narrow interface.
//! Implementations can be HTTP clients, mock providers, etc.

use std::sync::Arc;

use crate::domain::CurrencyCode;
use crate::error::RateError;

/// Port trait for external rate providers.
#[async_trait::async_trait]
pub trait RateProvider: Send + Sync + 'static {
    /// Fetches the current rate for converting one unit of `from` into
    /// units of `to`.
    ///
    /// Failures are opaque network/service errors; callers must not
    /// cache anything on failure.
    async fn fetch_rate(&self, from: &CurrencyCode, to: &CurrencyCode)
    -> Result<f64, RateError>;
}

#[async_trait::async_trait]
impl<T: RateProvider> RateProvider for Arc<T> {
    async fn fetch_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<f64, RateError> {
        (**self).fetch_rate(from, to).await
    }
}
