//! Wallet Application Service
//!
//! Orchestrates domain operations through the ledger and rate ports.
//! Contains NO infrastructure logic - pure business orchestration,
//! including the exchange transaction coordinator.

use wallet_types::{
    AppError, DepositRequest, DomainError, ExchangeReceipt, ExchangeRequest, LedgerStore,
    LoginRequest, RateProvider, RegisterRequest, User, UserId, WalletBalance, WithdrawRequest,
};

use wallet_rates::ExchangeRateService;

use crate::password;

/// Application service for wallet operations.
///
/// Generic over `L: LedgerStore` and `P: RateProvider` - the adapters are
/// injected at compile time. This enables:
/// - Swapping the ledger backend without code changes
/// - Testing with in-memory mocks
/// - Compile-time checks for port implementation
pub struct WalletService<L: LedgerStore, P: RateProvider> {
    ledger: L,
    rates: ExchangeRateService<P>,
}

impl<L: LedgerStore, P: RateProvider> WalletService<L, P> {
    /// Creates a new wallet service over the given adapters.
    pub fn new(ledger: L, rates: ExchangeRateService<P>) -> Self {
        Self { ledger, rates }
    }

    /// Returns a reference to the underlying ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    // ─────────────────────────────────────────────────────────────────────────
    // User operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Registers a new user and seeds their wallets.
    pub async fn register(&self, req: RegisterRequest) -> Result<User, AppError> {
        if req.username.trim().is_empty() {
            return Err(AppError::BadRequest("Username cannot be empty".into()));
        }
        if !req.email.contains('@') {
            return Err(AppError::BadRequest("Invalid email address".into()));
        }
        if req.password.len() < 6 {
            return Err(AppError::BadRequest(
                "Password must be at least 6 characters".into(),
            ));
        }

        let password_hash = password::hash_password(&req.password)?;
        self.ledger
            .create_user(req.username.trim(), &req.email, &password_hash)
            .await
            .map_err(Into::into)
    }

    /// Verifies credentials and returns the user on success.
    ///
    /// Unknown username and wrong password are indistinguishable to the
    /// caller.
    pub async fn login(&self, req: LoginRequest) -> Result<User, AppError> {
        let user = self
            .ledger
            .find_user_by_username(&req.username)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::Unauthorized("Invalid username or password".into()))?;

        if !password::verify_password(&user.password_hash, &req.password) {
            return Err(AppError::Unauthorized(
                "Invalid username or password".into(),
            ));
        }
        Ok(user)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Wallet operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns all balance rows for a user.
    pub async fn balances(&self, user_id: UserId) -> Result<Vec<WalletBalance>, AppError> {
        self.ledger.balances(user_id).await.map_err(Into::into)
    }

    /// Deposits into one currency balance.
    pub async fn deposit(&self, user_id: UserId, req: DepositRequest) -> Result<(), AppError> {
        validate_amount(req.amount)?;
        self.ledger
            .deposit(user_id, &req.currency, req.amount)
            .await
            .map_err(Into::into)
    }

    /// Withdraws from one currency balance.
    pub async fn withdraw(&self, user_id: UserId, req: WithdrawRequest) -> Result<(), AppError> {
        validate_amount(req.amount)?;
        self.ledger
            .withdraw(user_id, &req.currency, req.amount)
            .await
            .map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Exchange coordinator
    // ─────────────────────────────────────────────────────────────────────────

    /// Performs one currency exchange as a single atomic balance mutation.
    ///
    /// Steps: resolve the rate (no ledger I/O on failure), then inside one
    /// ledger transaction conditionally debit the source currency and credit
    /// `amount * rate` to the destination. Every failure path after `begin`
    /// rolls back before returning; the debit is judged by its affected-row
    /// count, not by the absence of a driver error.
    pub async fn exchange(
        &self,
        user_id: UserId,
        req: ExchangeRequest,
    ) -> Result<ExchangeReceipt, AppError> {
        validate_amount(req.amount)?;

        let rate = self
            .rates
            .resolve_rate(&req.from_currency, &req.to_currency)
            .await?;
        let credited = req.amount * rate;

        let mut tx = self.ledger.begin().await.map_err(AppError::from)?;

        let rows = match self
            .ledger
            .conditional_debit(&mut tx, user_id, &req.from_currency, req.amount)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                self.abort(tx).await;
                return Err(e.into());
            }
        };

        if rows == 0 {
            self.abort(tx).await;
            return Err(AppError::InsufficientFunds {
                currency: req.from_currency,
            });
        }

        if let Err(e) = self
            .ledger
            .credit(&mut tx, user_id, &req.to_currency, credited)
            .await
        {
            self.abort(tx).await;
            return Err(e.into());
        }

        self.ledger.commit(tx).await.map_err(AppError::from)?;

        tracing::info!(
            %user_id,
            from = %req.from_currency,
            to = %req.to_currency,
            amount = req.amount,
            rate,
            "exchange committed"
        );

        Ok(ExchangeReceipt {
            from_currency: req.from_currency,
            to_currency: req.to_currency,
            rate,
            debited: req.amount,
            credited,
        })
    }

    /// Rolls back a failed exchange transaction. A rollback failure cannot
    /// change the outcome (the causal error is already being surfaced), so
    /// it is only logged.
    async fn abort(&self, tx: L::Tx) {
        if let Err(e) = self.ledger.rollback(tx).await {
            tracing::warn!(error = %e, "rollback after failed exchange also failed");
        }
    }
}

fn validate_amount(amount: f64) -> Result<(), AppError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(DomainError::NonPositiveAmount.into());
    }
    Ok(())
}
