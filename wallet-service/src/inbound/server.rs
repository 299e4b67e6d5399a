//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use wallet_types::{LedgerStore, RateProvider};

use super::auth::{AuthKeys, auth_middleware};
use super::handlers::{self, AppState};
use crate::WalletService;

/// HTTP Server for the Wallet API.
pub struct HttpServer<L: LedgerStore, P: RateProvider> {
    state: Arc<AppState<L, P>>,
}

impl<L: LedgerStore, P: RateProvider> HttpServer<L, P> {
    /// Creates a new HTTP server with the given service and auth keys.
    pub fn new(service: WalletService<L, P>, auth: AuthKeys) -> Self {
        Self {
            state: Arc::new(AppState { service, auth }),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/api/v1/register", post(handlers::register::<L, P>))
            .route("/api/v1/login", post(handlers::login::<L, P>))
            .route("/api/v1/wallet", get(handlers::get_balance::<L, P>))
            .route("/api/v1/wallet/deposit", post(handlers::deposit::<L, P>))
            .route("/api/v1/wallet/withdraw", post(handlers::withdraw::<L, P>))
            .route("/api/v1/wallet/exchange", post(handlers::exchange::<L, P>))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth_middleware::<L, P>,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use wallet_rates::{ExchangeRateService, RateCache, RateCacheConfig};
    use wallet_types::UserId;

    use crate::service_tests::tests::{MockLedger, MockProvider};

    fn auth_keys() -> AuthKeys {
        AuthKeys::new("test-secret", Duration::from_secs(3600))
    }

    fn test_router(auth: AuthKeys) -> Router {
        let ledger = Arc::new(MockLedger::new());
        let provider = Arc::new(MockProvider::with_rate("USD", "EUR", 0.9));
        let config =
            RateCacheConfig::new(Duration::from_secs(300), Duration::from_secs(600)).unwrap();
        let rates = ExchangeRateService::new(provider, RateCache::new(), config);
        HttpServer::new(WalletService::new(ledger, rates), auth).router()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let response = test_router(auth_keys())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_wallet_routes_require_token() {
        for (method, path) in [
            ("GET", "/api/v1/wallet"),
            ("POST", "/api/v1/wallet/deposit"),
            ("POST", "/api/v1/wallet/withdraw"),
            ("POST", "/api/v1/wallet/exchange"),
        ] {
            let request = Request::builder()
                .method(method)
                .uri(path)
                .body(Body::empty())
                .unwrap();
            let response = test_router(auth_keys()).oneshot(request).await.unwrap();

            assert_eq!(
                response.status(),
                StatusCode::UNAUTHORIZED,
                "{method} {path}"
            );
        }
    }

    #[tokio::test]
    async fn test_balances_served_at_wallet_path() {
        let auth = auth_keys();
        let token = auth.issue_token(UserId::new()).unwrap();

        let request = Request::get("/api/v1/wallet")
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response = test_router(auth).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
