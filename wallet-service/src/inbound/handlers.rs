//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use wallet_types::{
    AppError, BalancesResponse, DepositRequest, ExchangeRequest, ExchangeResponse, LedgerStore,
    LoginRequest, RateProvider, RegisterRequest, RegisterResponse, TokenResponse, WithdrawRequest,
};

use super::auth::{AuthKeys, AuthUser};
use crate::WalletService;

/// Application state shared across handlers.
pub struct AppState<L: LedgerStore, P: RateProvider> {
    pub service: WalletService<L, P>,
    pub auth: AuthKeys,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::InsufficientFunds { currency } => (
                StatusCode::BAD_REQUEST,
                format!("Insufficient funds in {currency}"),
            ),
            AppError::RateUnavailable(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Register a new user; their wallets are seeded with zero balances.
#[tracing::instrument(skip(state, req), fields(username = %req.username))]
pub async fn register<L: LedgerStore, P: RateProvider>(
    State(state): State<Arc<AppState<L, P>>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.service.register(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse { user_id: user.id }),
    ))
}

/// Log in with username and password; returns a bearer token.
#[tracing::instrument(skip(state, req), fields(username = %req.username))]
pub async fn login<L: LedgerStore, P: RateProvider>(
    State(state): State<Arc<AppState<L, P>>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.service.login(req).await?;
    let token = state.auth.issue_token(user.id)?;
    Ok(Json(TokenResponse { token }))
}

/// Get all balances for the authenticated user.
#[tracing::instrument(skip(state), fields(user_id = %user.0))]
pub async fn get_balance<L: LedgerStore, P: RateProvider>(
    State(state): State<Arc<AppState<L, P>>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let balances = state.service.balances(user.0).await?;
    Ok(Json(BalancesResponse::from(balances)))
}

/// Deposit into one currency balance.
#[tracing::instrument(skip(state), fields(user_id = %user.0, currency = %req.currency, amount = req.amount))]
pub async fn deposit<L: LedgerStore, P: RateProvider>(
    State(state): State<Arc<AppState<L, P>>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<DepositRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.service.deposit(user.0, req).await?;
    Ok(Json(serde_json::json!({ "message": "Deposit successful" })))
}

/// Withdraw from one currency balance.
#[tracing::instrument(skip(state), fields(user_id = %user.0, currency = %req.currency, amount = req.amount))]
pub async fn withdraw<L: LedgerStore, P: RateProvider>(
    State(state): State<Arc<AppState<L, P>>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<WithdrawRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.service.withdraw(user.0, req).await?;
    Ok(Json(
        serde_json::json!({ "message": "Withdrawal successful" }),
    ))
}

/// Exchange between two currencies at the current rate.
#[tracing::instrument(skip(state), fields(user_id = %user.0, from = %req.from_currency, to = %req.to_currency, amount = req.amount))]
pub async fn exchange<L: LedgerStore, P: RateProvider>(
    State(state): State<Arc<AppState<L, P>>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ExchangeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let receipt = state.service.exchange(user.0, req).await?;
    Ok(Json(ExchangeResponse::from(receipt)))
}
