//! HTTP adapter for the remote pricing service.

use serde::Deserialize;

use wallet_types::{CurrencyCode, CurrencyPair, RateError, RateProvider};

#[derive(Deserialize)]
struct RateBody {
    rate: f64,
}

/// Fetches rates over HTTP from a pricing service exposing
/// `GET {base_url}/rates?from=USD&to=EUR` returning `{"rate": 0.9}`.
#[derive(Clone)]
pub struct HttpRateProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRateProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn unavailable(from: &CurrencyCode, to: &CurrencyCode, reason: impl ToString) -> RateError {
        RateError::Unavailable {
            pair: CurrencyPair::new(from.clone(), to.clone()),
            reason: reason.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl RateProvider for HttpRateProvider {
    async fn fetch_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<f64, RateError> {
        let url = format!("{}/rates", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .query(&[("from", from.as_str()), ("to", to.as_str())])
            .send()
            .await
            .map_err(|e| Self::unavailable(from, to, e))?;

        let response = response
            .error_for_status()
            .map_err(|e| Self::unavailable(from, to, e))?;

        let body: RateBody = response
            .json()
            .await
            .map_err(|e| Self::unavailable(from, to, e))?;

        Ok(body.rate)
    }
}
