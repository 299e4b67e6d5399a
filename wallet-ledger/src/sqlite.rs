//! SQLite ledger adapter.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use uuid::Uuid;

use wallet_types::{
    CurrencyCode, DomainError, LedgerError, LedgerStore, User, UserId, WalletBalance,
};

use crate::types::{DbUser, DbWallet};

/// Currencies every new user starts with, at zero balance.
const SEED_CURRENCIES: [&str; 3] = ["USD", "EUR", "RUB"];

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Ledger
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite implementation of the `LedgerStore` port.
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    /// Creates a new SQLite ledger with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Each pooled connection to an in-memory database gets its own
        // private copy, so in-memory ledgers must stay on one connection.
        let mut pool_options = SqlitePoolOptions::new();
        if database_url.contains(":memory:") {
            pool_options = pool_options.max_connections(1);
        }
        let pool = pool_options.connect_with(options).await?;

        let ddl = include_str!("../migrations/0001_create_tables.sql");
        sqlx::query(ddl).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn db_err(e: sqlx::Error) -> LedgerError {
        LedgerError::Database(e.to_string())
    }

    fn tx_err(e: sqlx::Error) -> LedgerError {
        LedgerError::Transaction(e.to_string())
    }

    fn is_unique_violation(e: &sqlx::Error) -> bool {
        e.as_database_error()
            .is_some_and(|db| db.is_unique_violation())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LedgerStore implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl LedgerStore for SqliteLedger {
    type Tx = Transaction<'static, Sqlite>;

    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, LedgerError> {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();
        let id_str = id.to_string();
        let created_at_str = now.to_rfc3339();

        let mut db_tx = self.pool.begin().await.map_err(Self::tx_err)?;

        let inserted = sqlx::query(
            r#"INSERT INTO users (id, username, email, password_hash, created_at) VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(&id_str)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(&created_at_str)
        .execute(&mut *db_tx)
        .await;

        if let Err(e) = inserted {
            if Self::is_unique_violation(&e) {
                return Err(LedgerError::Conflict(
                    "username or email already exists".into(),
                ));
            }
            return Err(Self::db_err(e));
        }

        // Seed one zero-balance wallet row per supported currency, in the
        // same transaction as the user row.
        for currency in SEED_CURRENCIES {
            sqlx::query(r#"INSERT INTO wallets (user_id, currency, amount) VALUES (?, ?, 0)"#)
                .bind(&id_str)
                .bind(currency)
                .execute(&mut *db_tx)
                .await
                .map_err(Self::db_err)?;
        }

        db_tx.commit().await.map_err(Self::tx_err)?;

        Ok(User {
            id: UserId::from_uuid(id),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
        })
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, LedgerError> {
        let row: Option<DbUser> = sqlx::query_as(
            r#"SELECT id, username, email, password_hash, created_at FROM users WHERE username = ?"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::db_err)?;

        row.map(DbUser::into_domain).transpose()
    }

    async fn balances(&self, user_id: UserId) -> Result<Vec<WalletBalance>, LedgerError> {
        let user_id_str = user_id.to_string();

        let rows: Vec<DbWallet> = sqlx::query_as(
            r#"SELECT currency, amount FROM wallets WHERE user_id = ? ORDER BY currency"#,
        )
        .bind(&user_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::db_err)?;

        rows.into_iter()
            .map(|row| row.into_domain(user_id))
            .collect()
    }

    async fn deposit(
        &self,
        user_id: UserId,
        currency: &CurrencyCode,
        amount: f64,
    ) -> Result<(), LedgerError> {
        let result = sqlx::query(
            r#"UPDATE wallets SET amount = amount + ? WHERE user_id = ? AND currency = ?"#,
        )
        .bind(amount)
        .bind(user_id.to_string())
        .bind(currency.as_str())
        .execute(&self.pool)
        .await
        .map_err(Self::db_err)?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::WalletNotFound);
        }
        Ok(())
    }

    async fn withdraw(
        &self,
        user_id: UserId,
        currency: &CurrencyCode,
        amount: f64,
    ) -> Result<(), LedgerError> {
        // Single conditional statement: the funds check and the decrement
        // are atomic at the store level.
        let result = sqlx::query(
            r#"UPDATE wallets SET amount = amount - ?1 WHERE user_id = ?2 AND currency = ?3 AND amount >= ?1"#,
        )
        .bind(amount)
        .bind(user_id.to_string())
        .bind(currency.as_str())
        .execute(&self.pool)
        .await
        .map_err(Self::db_err)?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::Domain(DomainError::InsufficientFunds {
                currency: currency.clone(),
            }));
        }
        Ok(())
    }

    async fn begin(&self) -> Result<Self::Tx, LedgerError> {
        self.pool.begin().await.map_err(Self::tx_err)
    }

    async fn conditional_debit(
        &self,
        tx: &mut Self::Tx,
        user_id: UserId,
        currency: &CurrencyCode,
        amount: f64,
    ) -> Result<u64, LedgerError> {
        let result = sqlx::query(
            r#"UPDATE wallets SET amount = amount - ?1 WHERE user_id = ?2 AND currency = ?3 AND amount >= ?1"#,
        )
        .bind(amount)
        .bind(user_id.to_string())
        .bind(currency.as_str())
        .execute(&mut **tx)
        .await
        .map_err(Self::db_err)?;

        let rows = result.rows_affected();
        tracing::debug!(%user_id, %currency, amount, rows, "conditional debit");
        Ok(rows)
    }

    async fn credit(
        &self,
        tx: &mut Self::Tx,
        user_id: UserId,
        currency: &CurrencyCode,
        amount: f64,
    ) -> Result<(), LedgerError> {
        let result = sqlx::query(
            r#"UPDATE wallets SET amount = amount + ? WHERE user_id = ? AND currency = ?"#,
        )
        .bind(amount)
        .bind(user_id.to_string())
        .bind(currency.as_str())
        .execute(&mut **tx)
        .await
        .map_err(Self::db_err)?;

        // Crediting a currency the user holds no row for would silently
        // drop the converted amount; surface it so the caller rolls back.
        if result.rows_affected() == 0 {
            return Err(LedgerError::WalletNotFound);
        }
        Ok(())
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), LedgerError> {
        tx.commit().await.map_err(Self::tx_err)
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), LedgerError> {
        tx.rollback().await.map_err(Self::tx_err)
    }
}
