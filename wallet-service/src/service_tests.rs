//! WalletService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::OwnedMutexGuard;

    use wallet_types::{
        AppError, CurrencyCode, CurrencyPair, DepositRequest, ExchangeRequest, LedgerError,
        LedgerStore, LoginRequest, RateError, RateProvider, RegisterRequest, User, UserId,
        WalletBalance, WithdrawRequest,
    };

    use wallet_rates::{ExchangeRateService, RateCache, RateCacheConfig};

    use crate::WalletService;

    // ─────────────────────────────────────────────────────────────────────────
    // Mock ledger
    // ─────────────────────────────────────────────────────────────────────────

    type BalanceKey = (UserId, String);

    /// In-memory ledger for testing the service layer.
    ///
    /// Transactions stage updates against a snapshot and publish them on
    /// commit; a per-store async mutex serializes transaction scopes the way
    /// the database's isolation would, so concurrent exchange tests exercise
    /// the same "second debit sees the committed first debit" behavior.
    pub struct MockLedger {
        balances: Mutex<HashMap<BalanceKey, f64>>,
        users: Mutex<HashMap<String, User>>,
        tx_gate: Arc<tokio::sync::Mutex<()>>,
        begins: AtomicUsize,
        fail_credit: AtomicBool,
        fail_commit: AtomicBool,
    }

    pub struct MockTx {
        _isolation: OwnedMutexGuard<()>,
        staged: HashMap<BalanceKey, f64>,
    }

    impl MockLedger {
        pub fn new() -> Self {
            Self {
                balances: Mutex::new(HashMap::new()),
                users: Mutex::new(HashMap::new()),
                tx_gate: Arc::new(tokio::sync::Mutex::new(())),
                begins: AtomicUsize::new(0),
                fail_credit: AtomicBool::new(false),
                fail_commit: AtomicBool::new(false),
            }
        }

        pub fn set_balance(&self, user: UserId, currency: &str, amount: f64) {
            self.balances
                .lock()
                .unwrap()
                .insert((user, currency.to_string()), amount);
        }

        pub fn balance(&self, user: UserId, currency: &str) -> Option<f64> {
            self.balances
                .lock()
                .unwrap()
                .get(&(user, currency.to_string()))
                .copied()
        }

        pub fn begins(&self) -> usize {
            self.begins.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LedgerStore for MockLedger {
        type Tx = MockTx;

        async fn create_user(
            &self,
            username: &str,
            email: &str,
            password_hash: &str,
        ) -> Result<User, LedgerError> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(username) {
                return Err(LedgerError::Conflict("username already exists".into()));
            }
            let user = User {
                id: UserId::new(),
                username: username.to_string(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                created_at: chrono::Utc::now(),
            };
            users.insert(username.to_string(), user.clone());
            drop(users);

            let mut balances = self.balances.lock().unwrap();
            for currency in ["USD", "EUR", "RUB"] {
                balances.insert((user.id, currency.to_string()), 0.0);
            }
            Ok(user)
        }

        async fn find_user_by_username(
            &self,
            username: &str,
        ) -> Result<Option<User>, LedgerError> {
            Ok(self.users.lock().unwrap().get(username).cloned())
        }

        async fn balances(&self, user_id: UserId) -> Result<Vec<WalletBalance>, LedgerError> {
            Ok(self
                .balances
                .lock()
                .unwrap()
                .iter()
                .filter(|((user, _), _)| *user == user_id)
                .map(|((_, currency), amount)| WalletBalance {
                    user_id,
                    currency: CurrencyCode::new(currency.clone()).unwrap(),
                    amount: *amount,
                })
                .collect())
        }

        async fn deposit(
            &self,
            user_id: UserId,
            currency: &CurrencyCode,
            amount: f64,
        ) -> Result<(), LedgerError> {
            let mut balances = self.balances.lock().unwrap();
            let slot = balances
                .get_mut(&(user_id, currency.to_string()))
                .ok_or(LedgerError::WalletNotFound)?;
            *slot += amount;
            Ok(())
        }

        async fn withdraw(
            &self,
            user_id: UserId,
            currency: &CurrencyCode,
            amount: f64,
        ) -> Result<(), LedgerError> {
            let mut balances = self.balances.lock().unwrap();
            match balances.get_mut(&(user_id, currency.to_string())) {
                Some(slot) if *slot >= amount => {
                    *slot -= amount;
                    Ok(())
                }
                _ => Err(LedgerError::Domain(
                    wallet_types::DomainError::InsufficientFunds {
                        currency: currency.clone(),
                    },
                )),
            }
        }

        async fn begin(&self) -> Result<Self::Tx, LedgerError> {
            self.begins.fetch_add(1, Ordering::SeqCst);
            let guard = self.tx_gate.clone().lock_owned().await;
            let staged = self.balances.lock().unwrap().clone();
            Ok(MockTx {
                _isolation: guard,
                staged,
            })
        }

        async fn conditional_debit(
            &self,
            tx: &mut Self::Tx,
            user_id: UserId,
            currency: &CurrencyCode,
            amount: f64,
        ) -> Result<u64, LedgerError> {
            match tx.staged.get_mut(&(user_id, currency.to_string())) {
                Some(slot) if *slot >= amount => {
                    *slot -= amount;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }

        async fn credit(
            &self,
            tx: &mut Self::Tx,
            user_id: UserId,
            currency: &CurrencyCode,
            amount: f64,
        ) -> Result<(), LedgerError> {
            if self.fail_credit.load(Ordering::SeqCst) {
                return Err(LedgerError::Database("disk I/O error".into()));
            }
            let slot = tx
                .staged
                .get_mut(&(user_id, currency.to_string()))
                .ok_or(LedgerError::WalletNotFound)?;
            *slot += amount;
            Ok(())
        }

        async fn commit(&self, tx: Self::Tx) -> Result<(), LedgerError> {
            if self.fail_commit.load(Ordering::SeqCst) {
                return Err(LedgerError::Transaction("commit failed".into()));
            }
            *self.balances.lock().unwrap() = tx.staged;
            Ok(())
        }

        async fn rollback(&self, _tx: Self::Tx) -> Result<(), LedgerError> {
            Ok(())
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mock rate provider
    // ─────────────────────────────────────────────────────────────────────────

    pub struct MockProvider {
        rates: HashMap<String, f64>,
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl MockProvider {
        pub(crate) fn with_rate(from: &str, to: &str, rate: f64) -> Self {
            let mut rates = HashMap::new();
            rates.insert(format!("{from}->{to}"), rate);
            Self {
                rates,
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            }
        }

        fn failing() -> Self {
            let provider = Self::with_rate("USD", "EUR", 0.9);
            provider.fail.store(true, Ordering::SeqCst);
            provider
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateProvider for MockProvider {
        async fn fetch_rate(
            &self,
            from: &CurrencyCode,
            to: &CurrencyCode,
        ) -> Result<f64, RateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let pair = CurrencyPair::new(from.clone(), to.clone());
            if self.fail.load(Ordering::SeqCst) {
                return Err(RateError::Unavailable {
                    pair,
                    reason: "connection refused".into(),
                });
            }
            self.rates
                .get(&pair.to_string())
                .copied()
                .ok_or(RateError::Unavailable {
                    pair,
                    reason: "unknown pair".into(),
                })
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    type Service = WalletService<Arc<MockLedger>, Arc<MockProvider>>;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    fn build_service(
        ledger: Arc<MockLedger>,
        provider: Arc<MockProvider>,
    ) -> Service {
        let config =
            RateCacheConfig::new(Duration::from_secs(300), Duration::from_secs(600)).unwrap();
        let rates = ExchangeRateService::new(provider, RateCache::new(), config);
        WalletService::new(ledger, rates)
    }

    fn exchange_req(from: &str, to: &str, amount: f64) -> ExchangeRequest {
        ExchangeRequest {
            from_currency: code(from),
            to_currency: code(to),
            amount,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Exchange scenarios
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_exchange_moves_both_legs() {
        let ledger = Arc::new(MockLedger::new());
        let user = UserId::new();
        ledger.set_balance(user, "USD", 100.0);
        ledger.set_balance(user, "EUR", 0.0);
        let svc = build_service(ledger.clone(), Arc::new(MockProvider::with_rate("USD", "EUR", 0.9)));

        let receipt = svc
            .exchange(user, exchange_req("USD", "EUR", 50.0))
            .await
            .unwrap();

        assert_eq!(receipt.rate, 0.9);
        assert_eq!(receipt.debited, 50.0);
        assert_eq!(receipt.credited, 45.0);
        assert_eq!(ledger.balance(user, "USD"), Some(50.0));
        assert_eq!(ledger.balance(user, "EUR"), Some(45.0));
    }

    #[tokio::test]
    async fn test_exchange_insufficient_funds_rolls_back() {
        let ledger = Arc::new(MockLedger::new());
        let user = UserId::new();
        ledger.set_balance(user, "USD", 10.0);
        ledger.set_balance(user, "EUR", 0.0);
        let svc = build_service(ledger.clone(), Arc::new(MockProvider::with_rate("USD", "EUR", 0.9)));

        let result = svc.exchange(user, exchange_req("USD", "EUR", 50.0)).await;

        assert!(matches!(result, Err(AppError::InsufficientFunds { .. })));
        assert_eq!(ledger.balance(user, "USD"), Some(10.0));
        assert_eq!(ledger.balance(user, "EUR"), Some(0.0));
    }

    #[tokio::test]
    async fn test_exchange_rate_unavailable_touches_no_ledger() {
        let ledger = Arc::new(MockLedger::new());
        let user = UserId::new();
        ledger.set_balance(user, "USD", 100.0);
        let provider = Arc::new(MockProvider::failing());
        let svc = build_service(ledger.clone(), provider);

        let result = svc.exchange(user, exchange_req("USD", "EUR", 50.0)).await;

        assert!(matches!(result, Err(AppError::RateUnavailable(_))));
        assert_eq!(ledger.balance(user, "USD"), Some(100.0));
        assert_eq!(ledger.begins(), 0);
    }

    #[tokio::test]
    async fn test_exchange_failed_credit_preserves_source_balance() {
        let ledger = Arc::new(MockLedger::new());
        let user = UserId::new();
        ledger.set_balance(user, "USD", 100.0);
        ledger.set_balance(user, "EUR", 0.0);
        ledger.fail_credit.store(true, Ordering::SeqCst);
        let svc = build_service(ledger.clone(), Arc::new(MockProvider::with_rate("USD", "EUR", 0.9)));

        let result = svc.exchange(user, exchange_req("USD", "EUR", 50.0)).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        // the attempted debit must not persist
        assert_eq!(ledger.balance(user, "USD"), Some(100.0));
        assert_eq!(ledger.balance(user, "EUR"), Some(0.0));
    }

    #[tokio::test]
    async fn test_exchange_commit_failure_surfaces() {
        let ledger = Arc::new(MockLedger::new());
        let user = UserId::new();
        ledger.set_balance(user, "USD", 100.0);
        ledger.set_balance(user, "EUR", 0.0);
        ledger.fail_commit.store(true, Ordering::SeqCst);
        let svc = build_service(ledger.clone(), Arc::new(MockProvider::with_rate("USD", "EUR", 0.9)));

        let result = svc.exchange(user, exchange_req("USD", "EUR", 50.0)).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert_eq!(ledger.balance(user, "USD"), Some(100.0));
    }

    #[tokio::test]
    async fn test_exchange_rejects_non_positive_amount_before_io() {
        let ledger = Arc::new(MockLedger::new());
        let user = UserId::new();
        let provider = Arc::new(MockProvider::with_rate("USD", "EUR", 0.9));
        let svc = build_service(ledger.clone(), provider.clone());

        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let result = svc.exchange(user, exchange_req("USD", "EUR", amount)).await;
            assert!(matches!(result, Err(AppError::BadRequest(_))));
        }
        assert_eq!(provider.calls(), 0);
        assert_eq!(ledger.begins(), 0);
    }

    #[tokio::test]
    async fn test_exchange_reuses_cached_rate() {
        let ledger = Arc::new(MockLedger::new());
        let user = UserId::new();
        ledger.set_balance(user, "USD", 100.0);
        ledger.set_balance(user, "EUR", 0.0);
        let provider = Arc::new(MockProvider::with_rate("USD", "EUR", 0.9));
        let svc = build_service(ledger.clone(), provider.clone());

        svc.exchange(user, exchange_req("USD", "EUR", 10.0))
            .await
            .unwrap();
        svc.exchange(user, exchange_req("USD", "EUR", 10.0))
            .await
            .unwrap();

        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_exchanges_exactly_one_wins() {
        let ledger = Arc::new(MockLedger::new());
        let user = UserId::new();
        ledger.set_balance(user, "USD", 100.0);
        ledger.set_balance(user, "EUR", 0.0);
        let svc = Arc::new(build_service(
            ledger.clone(),
            Arc::new(MockProvider::with_rate("USD", "EUR", 0.9)),
        ));

        let mut tasks = Vec::new();
        for _ in 0..2 {
            let svc = svc.clone();
            tasks.push(tokio::spawn(async move {
                svc.exchange(user, exchange_req("USD", "EUR", 60.0)).await
            }));
        }

        let mut successes = 0;
        let mut insufficient = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => successes += 1,
                Err(AppError::InsufficientFunds { .. }) => insufficient += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(insufficient, 1);
        assert_eq!(ledger.balance(user, "USD"), Some(40.0));
        assert_eq!(ledger.balance(user, "EUR"), Some(54.0));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Deposit / withdraw / auth
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_deposit_and_withdraw_validate_amount() {
        let ledger = Arc::new(MockLedger::new());
        let user = UserId::new();
        ledger.set_balance(user, "USD", 100.0);
        let svc = build_service(ledger.clone(), Arc::new(MockProvider::with_rate("USD", "EUR", 0.9)));

        let deposit = svc
            .deposit(
                user,
                DepositRequest {
                    currency: code("USD"),
                    amount: -1.0,
                },
            )
            .await;
        assert!(matches!(deposit, Err(AppError::BadRequest(_))));

        let withdraw = svc
            .withdraw(
                user,
                WithdrawRequest {
                    currency: code("USD"),
                    amount: 0.0,
                },
            )
            .await;
        assert!(matches!(withdraw, Err(AppError::BadRequest(_))));

        assert_eq!(ledger.balance(user, "USD"), Some(100.0));
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let ledger = Arc::new(MockLedger::new());
        let svc = build_service(ledger.clone(), Arc::new(MockProvider::with_rate("USD", "EUR", 0.9)));

        let user = svc
            .register(RegisterRequest {
                username: "alice".into(),
                email: "alice@example.com".into(),
                password: "hunter22".into(),
            })
            .await
            .unwrap();

        // wallets seeded at zero
        let balances = svc.balances(user.id).await.unwrap();
        assert_eq!(balances.len(), 3);

        let logged_in = svc
            .login(LoginRequest {
                username: "alice".into(),
                password: "hunter22".into(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);

        let wrong = svc
            .login(LoginRequest {
                username: "alice".into(),
                password: "wrong".into(),
            })
            .await;
        assert!(matches!(wrong, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_weak_input() {
        let ledger = Arc::new(MockLedger::new());
        let svc = build_service(ledger, Arc::new(MockProvider::with_rate("USD", "EUR", 0.9)));

        let short_password = svc
            .register(RegisterRequest {
                username: "bob".into(),
                email: "bob@example.com".into(),
                password: "123".into(),
            })
            .await;
        assert!(matches!(short_password, Err(AppError::BadRequest(_))));

        let bad_email = svc
            .register(RegisterRequest {
                username: "bob".into(),
                email: "not-an-email".into(),
                password: "hunter22".into(),
            })
            .await;
        assert!(matches!(bad_email, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_username_conflicts() {
        let ledger = Arc::new(MockLedger::new());
        let svc = build_service(ledger, Arc::new(MockProvider::with_rate("USD", "EUR", 0.9)));

        let req = RegisterRequest {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "hunter22".into(),
        };
        svc.register(req.clone()).await.unwrap();

        let duplicate = svc.register(req).await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));
    }
}
