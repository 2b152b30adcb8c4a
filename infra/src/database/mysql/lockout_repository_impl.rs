//! MySQL implementation of the LockoutRepository trait.
//!
//! `update` runs inside one transaction holding the identity's row lock. A
//! placeholder row is upserted first so that two callers racing on an identity
//! with no state yet still serialize on the same record.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, Utc};
use sqlx::{mysql::MySqlRow, MySqlPool, Row};

use sw_core::{Identity, LockoutRepository, LockoutState, StorageResult};

use crate::InfrastructureError;

// Earliest DATETIME value; real rows always carry a recent attempt instant.
const PLACEHOLDER_AT: &str = "1000-01-01 00:00:00";

/// MySQL implementation of LockoutRepository
pub struct MySqlLockoutRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlLockoutRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_state(row: &MySqlRow) -> Result<LockoutState, InfrastructureError> {
        let identity: String = row.try_get("identity")?;

        Ok(LockoutState {
            identity: Identity::parse(&identity)
                .map_err(|e| InfrastructureError::Malformed(e.to_string()))?,
            failure_count: row.try_get("failure_count")?,
            last_attempt_at: row.try_get::<DateTime<Utc>, _>("last_attempt_at")?,
            lockout_until: row.try_get::<Option<DateTime<Utc>>, _>("lockout_until")?,
            window_started_at: row.try_get::<Option<DateTime<Utc>>, _>("window_started_at")?,
            window_failures: row.try_get("window_failures")?,
        })
    }
}

/// Whether a loaded row is the transient placeholder written by `update`
pub(crate) fn is_placeholder(state: &LockoutState) -> bool {
    state.last_attempt_at.year() <= 1000
}

#[async_trait]
impl LockoutRepository for MySqlLockoutRepository {
    async fn load(&self, identity: &Identity) -> StorageResult<Option<LockoutState>> {
        let row = sqlx::query(
            r#"
            SELECT identity, failure_count, last_attempt_at, lockout_until,
                   window_started_at, window_failures
            FROM identity_lockouts
            WHERE identity = ?
            "#,
        )
        .bind(identity.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(InfrastructureError::from)?;

        match row {
            Some(row) => Ok(Some(Self::row_to_state(&row)?)),
            None => Ok(None),
        }
    }

    async fn update<F>(&self, identity: &Identity, transition: F) -> StorageResult<Option<LockoutState>>
    where
        F: FnOnce(Option<LockoutState>) -> Option<LockoutState> + Send + 'static,
    {
        let mut tx = self.pool.begin().await.map_err(InfrastructureError::from)?;

        sqlx::query(
            r#"
            INSERT INTO identity_lockouts (identity, last_attempt_at)
            VALUES (?, ?)
            ON DUPLICATE KEY UPDATE identity = identity
            "#,
        )
        .bind(identity.as_str())
        .bind(PLACEHOLDER_AT)
        .execute(&mut *tx)
        .await
        .map_err(InfrastructureError::from)?;

        let row = sqlx::query(
            r#"
            SELECT identity, failure_count, last_attempt_at, lockout_until,
                   window_started_at, window_failures
            FROM identity_lockouts
            WHERE identity = ?
            FOR UPDATE
            "#,
        )
        .bind(identity.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(InfrastructureError::from)?;

        let stored = Self::row_to_state(&row)?;
        let current = if is_placeholder(&stored) { None } else { Some(stored) };

        let next = transition(current);

        match &next {
            Some(state) => {
                sqlx::query(
                    r#"
                    UPDATE identity_lockouts
                    SET failure_count = ?, last_attempt_at = ?, lockout_until = ?,
                        window_started_at = ?, window_failures = ?
                    WHERE identity = ?
                    "#,
                )
                .bind(state.failure_count)
                .bind(state.last_attempt_at)
                .bind(state.lockout_until)
                .bind(state.window_started_at)
                .bind(state.window_failures)
                .bind(identity.as_str())
                .execute(&mut *tx)
                .await
                .map_err(InfrastructureError::from)?;
            }
            None => {
                sqlx::query("DELETE FROM identity_lockouts WHERE identity = ?")
                    .bind(identity.as_str())
                    .execute(&mut *tx)
                    .await
                    .map_err(InfrastructureError::from)?;
            }
        }

        tx.commit().await.map_err(InfrastructureError::from)?;
        Ok(next)
    }

    async fn clear(&self, identity: &Identity) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM identity_lockouts WHERE identity = ?")
            .bind(identity.as_str())
            .execute(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_stale(&self, now: DateTime<Utc>, retention: Duration) -> StorageResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM identity_lockouts
            WHERE (lockout_until IS NULL OR lockout_until <= ?)
              AND last_attempt_at <= ?
            "#,
        )
        .bind(now)
        .bind(now - retention)
        .execute(&self.pool)
        .await
        .map_err(InfrastructureError::from)?;

        Ok(result.rows_affected())
    }
}
