//! MySQL implementation of the VerificationCodeRepository trait.
//!
//! Codes live in `verification_codes`. A generated `live_marker` column backs a
//! unique index on (identity, purpose) for unconsumed rows, so the single-live-code
//! rule holds even if two issuers race.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{mysql::MySqlRow, MySqlPool, Row};
use uuid::Uuid;

use sw_core::{Identity, Purpose, StorageResult, VerificationCode, VerificationCodeRepository};

use crate::InfrastructureError;

const SELECT_COLUMNS: &str = r#"
    SELECT id, identity, purpose, code_hash, salt, attempts, max_attempts,
           created_at, expires_at, consumed_at
    FROM verification_codes
"#;

/// MySQL implementation of VerificationCodeRepository
pub struct MySqlVerificationCodeRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlVerificationCodeRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Map a database row onto the domain record
    fn row_to_code(row: &MySqlRow) -> Result<VerificationCode, InfrastructureError> {
        let id: String = row.try_get("id")?;
        let identity: String = row.try_get("identity")?;
        let purpose: String = row.try_get("purpose")?;

        Ok(VerificationCode {
            id: Uuid::parse_str(&id)
                .map_err(|e| InfrastructureError::Malformed(format!("Invalid code UUID: {}", e)))?,
            identity: Identity::parse(&identity)
                .map_err(|e| InfrastructureError::Malformed(e.to_string()))?,
            purpose: purpose
                .parse::<Purpose>()
                .map_err(|e| InfrastructureError::Malformed(e.to_string()))?,
            code_hash: row.try_get("code_hash")?,
            salt: row.try_get("salt")?,
            attempts: row.try_get("attempts")?,
            max_attempts: row.try_get("max_attempts")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            expires_at: row.try_get::<DateTime<Utc>, _>("expires_at")?,
            consumed_at: row.try_get::<Option<DateTime<Utc>>, _>("consumed_at")?,
        })
    }
}

#[async_trait]
impl VerificationCodeRepository for MySqlVerificationCodeRepository {
    async fn replace_active(&self, code: VerificationCode) -> StorageResult<()> {
        let mut tx = self.pool.begin().await.map_err(InfrastructureError::from)?;

        sqlx::query(
            r#"
            DELETE FROM verification_codes
            WHERE identity = ? AND purpose = ? AND consumed_at IS NULL
            "#,
        )
        .bind(code.identity.as_str())
        .bind(code.purpose.as_str())
        .execute(&mut *tx)
        .await
        .map_err(InfrastructureError::from)?;

        sqlx::query(
            r#"
            INSERT INTO verification_codes (
                id, identity, purpose, code_hash, salt, attempts, max_attempts,
                created_at, expires_at, consumed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(code.id.to_string())
        .bind(code.identity.as_str())
        .bind(code.purpose.as_str())
        .bind(&code.code_hash)
        .bind(&code.salt)
        .bind(code.attempts)
        .bind(code.max_attempts)
        .bind(code.created_at)
        .bind(code.expires_at)
        .bind(code.consumed_at)
        .execute(&mut *tx)
        .await
        .map_err(InfrastructureError::from)?;

        tx.commit().await.map_err(InfrastructureError::from)?;
        Ok(())
    }

    async fn find_active(
        &self,
        identity: &Identity,
        purpose: Purpose,
    ) -> StorageResult<Option<VerificationCode>> {
        let query = format!(
            "{} WHERE identity = ? AND purpose = ? AND consumed_at IS NULL LIMIT 1",
            SELECT_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(identity.as_str())
            .bind(purpose.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;

        match row {
            Some(row) => Ok(Some(Self::row_to_code(&row)?)),
            None => Ok(None),
        }
    }

    async fn increment_attempts(&self, id: Uuid) -> StorageResult<Option<u32>> {
        let mut tx = self.pool.begin().await.map_err(InfrastructureError::from)?;

        let current: Option<u32> = sqlx::query_scalar(
            r#"
            SELECT attempts FROM verification_codes
            WHERE id = ? AND consumed_at IS NULL
            FOR UPDATE
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(InfrastructureError::from)?;

        let Some(attempts) = current else {
            tx.rollback().await.map_err(InfrastructureError::from)?;
            return Ok(None);
        };

        sqlx::query("UPDATE verification_codes SET attempts = attempts + 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(InfrastructureError::from)?;

        tx.commit().await.map_err(InfrastructureError::from)?;
        Ok(Some(attempts + 1))
    }

    async fn consume(&self, id: Uuid, at: DateTime<Utc>) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE verification_codes
            SET consumed_at = ?
            WHERE id = ? AND consumed_at IS NULL AND attempts < max_attempts
            "#,
        )
        .bind(at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(InfrastructureError::from)?;

        Ok(result.rows_affected() == 1)
    }

    async fn purge(&self, before: DateTime<Utc>) -> StorageResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM verification_codes
            WHERE expires_at < ?
               OR (consumed_at IS NOT NULL AND consumed_at < ?)
            "#,
        )
        .bind(before)
        .bind(before)
        .execute(&self.pool)
        .await
        .map_err(InfrastructureError::from)?;

        Ok(result.rows_affected())
    }
}
