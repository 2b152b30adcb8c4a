//! In-memory implementation of VerificationCodeRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::VerificationCode;
use crate::domain::value_objects::{Identity, Purpose};
use crate::errors::StorageResult;

use super::r#trait::VerificationCodeRepository;

/// Process-local code store for development and tests
#[derive(Clone, Default)]
pub struct InMemoryVerificationCodeRepository {
    codes: Arc<RwLock<HashMap<Uuid, VerificationCode>>>,
}

impl InMemoryVerificationCodeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, consumed ones included
    pub async fn len(&self) -> usize {
        self.codes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.codes.read().await.is_empty()
    }

    /// Fetch any record by id
    pub async fn get(&self, id: Uuid) -> Option<VerificationCode> {
        self.codes.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl VerificationCodeRepository for InMemoryVerificationCodeRepository {
    async fn replace_active(&self, code: VerificationCode) -> StorageResult<()> {
        let mut codes = self.codes.write().await;
        codes.retain(|_, existing| {
            existing.is_consumed()
                || existing.identity != code.identity
                || existing.purpose != code.purpose
        });
        codes.insert(code.id, code);
        Ok(())
    }

    async fn find_active(
        &self,
        identity: &Identity,
        purpose: Purpose,
    ) -> StorageResult<Option<VerificationCode>> {
        let codes = self.codes.read().await;
        Ok(codes
            .values()
            .find(|c| !c.is_consumed() && &c.identity == identity && c.purpose == purpose)
            .cloned())
    }

    async fn increment_attempts(&self, id: Uuid) -> StorageResult<Option<u32>> {
        let mut codes = self.codes.write().await;
        Ok(codes
            .get_mut(&id)
            .filter(|c| !c.is_consumed())
            .map(|c| {
                c.attempts += 1;
                c.attempts
            }))
    }

    async fn consume(&self, id: Uuid, at: DateTime<Utc>) -> StorageResult<bool> {
        let mut codes = self.codes.write().await;
        match codes.get_mut(&id) {
            Some(code) if !code.is_consumed() && !code.is_exhausted() => {
                code.consumed_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn purge(&self, before: DateTime<Utc>) -> StorageResult<u64> {
        let mut codes = self.codes.write().await;
        let initial = codes.len();
        codes.retain(|_, c| {
            let consumed_long_ago = c.consumed_at.map_or(false, |at| at < before);
            !(consumed_long_ago || c.expires_at < before)
        });
        Ok((initial - codes.len()) as u64)
    }
}
