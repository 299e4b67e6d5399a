//! Cache-first rate resolution.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use wallet_types::{CurrencyCode, CurrencyPair, RateError, RateProvider};

use crate::cache::{RateCache, RateCacheConfig};

/// Resolves rates for currency pairs, preferring the cache and falling back
/// to the configured provider.
///
/// Concurrent misses for the same pair are collapsed: one task fetches
/// upstream while late arrivals queue on a per-pair gate and then read the
/// freshly populated cache. At most one outstanding upstream fetch exists
/// per pair at a time.
pub struct ExchangeRateService<P: RateProvider> {
    cache: RateCache,
    provider: P,
    config: RateCacheConfig,
    in_flight: DashMap<CurrencyPair, Arc<Mutex<()>>>,
}

impl<P: RateProvider> ExchangeRateService<P> {
    pub fn new(provider: P, cache: RateCache, config: RateCacheConfig) -> Self {
        Self {
            cache,
            provider,
            config,
            in_flight: DashMap::new(),
        }
    }

    /// The cache this service populates. Handy for wiring the sweeper.
    pub fn cache(&self) -> &RateCache {
        &self.cache
    }

    /// Resolves the rate for converting `from` into `to`.
    ///
    /// Within the TTL window repeated calls return the identical rate
    /// without touching the provider. The pair is directed: resolving
    /// EUR->USD never reuses a cached USD->EUR entry.
    pub async fn resolve_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<f64, RateError> {
        let pair = CurrencyPair::new(from.clone(), to.clone());

        loop {
            if let Some(rate) = self.cache.get(&pair) {
                return Ok(rate);
            }

            let gate = self
                .in_flight
                .entry(pair.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone();
            let _fetching = gate.lock().await;

            // A concurrent miss may have fetched while we queued on the gate.
            if let Some(rate) = self.cache.get(&pair) {
                return Ok(rate);
            }

            // Each completed fetch retires its gate on the way out. Holding
            // a retired gate does not license a fetch: rejoin whichever
            // gate is current so at most one upstream call is ever in
            // flight per pair.
            let current = self
                .in_flight
                .get(&pair)
                .is_some_and(|entry| Arc::ptr_eq(entry.value(), &gate));
            if !current {
                continue;
            }

            let result = self.provider.fetch_rate(from, to).await;
            self.in_flight.remove(&pair);
            let rate = result?;

            if !rate.is_finite() || rate <= 0.0 {
                return Err(RateError::Unavailable {
                    pair,
                    reason: format!("provider returned non-positive rate {rate}"),
                });
            }

            tracing::debug!(%pair, rate, "fetched rate from provider");
            self.cache.set(pair, rate, self.config.default_ttl);
            return Ok(rate);
        }
    }
}
