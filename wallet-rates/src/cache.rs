//! In-memory TTL cache for currency-pair rates.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use wallet_types::CurrencyPair;

/// Cache durations. Both must be strictly positive.
#[derive(Debug, Clone, Copy)]
pub struct RateCacheConfig {
    /// How long a freshly fetched rate is considered valid.
    pub default_ttl: Duration,
    /// Cadence of the background sweep that purges expired entries.
    pub sweep_interval: Duration,
}

/// Rejected cache configuration.
#[derive(Debug, thiserror::Error)]
#[error(
    "cache durations must be positive: default_ttl={default_ttl:?}, sweep_interval={sweep_interval:?}"
)]
pub struct InvalidCacheConfig {
    pub default_ttl: Duration,
    pub sweep_interval: Duration,
}

impl RateCacheConfig {
    pub fn new(
        default_ttl: Duration,
        sweep_interval: Duration,
    ) -> Result<Self, InvalidCacheConfig> {
        if default_ttl.is_zero() || sweep_interval.is_zero() {
            return Err(InvalidCacheConfig {
                default_ttl,
                sweep_interval,
            });
        }
        Ok(Self {
            default_ttl,
            sweep_interval,
        })
    }
}

struct CachedRate {
    rate: f64,
    expires_at: Instant,
}

/// Keyed TTL store mapping a directed currency pair to a rate.
///
/// `get` never returns expired data; expired entries linger in memory only
/// until the next sweep, which is a hygiene concern, not a correctness one.
/// Safe for concurrent use from many request tasks; neither `get` nor `set`
/// blocks on I/O.
#[derive(Clone, Default)]
pub struct RateCache {
    entries: Arc<DashMap<CurrencyPair, CachedRate>>,
}

impl RateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached rate if the entry exists and has not expired.
    pub fn get(&self, pair: &CurrencyPair) -> Option<f64> {
        let entry = self.entries.get(pair)?;
        if Instant::now() < entry.expires_at {
            Some(entry.rate)
        } else {
            None
        }
    }

    /// Stores or overwrites the rate for a pair with a fresh expiry.
    pub fn set(&self, pair: CurrencyPair, rate: f64, ttl: Duration) {
        self.entries.insert(
            pair,
            CachedRate {
                rate,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Drops every entry whose expiry has passed.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    /// Number of entries currently stored, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Spawns the periodic reclamation task.
    ///
    /// The task runs until the returned handle is aborted or the runtime
    /// shuts down.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tick.tick().await;
                let before = cache.len();
                cache.purge_expired();
                let purged = before - cache.len();
                if purged > 0 {
                    tracing::debug!(purged, "purged expired rate cache entries");
                }
            }
        })
    }
}
