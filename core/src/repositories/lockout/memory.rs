//! In-memory implementation of LockoutRepository

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::LockoutState;
use crate::domain::value_objects::Identity;
use crate::errors::StorageResult;

use super::r#trait::LockoutRepository;

/// Process-local lockout store; the write lock serializes transitions
#[derive(Clone, Default)]
pub struct InMemoryLockoutRepository {
    states: Arc<RwLock<HashMap<Identity, LockoutState>>>,
}

impl InMemoryLockoutRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }
}

#[async_trait]
impl LockoutRepository for InMemoryLockoutRepository {
    async fn load(&self, identity: &Identity) -> StorageResult<Option<LockoutState>> {
        Ok(self.states.read().await.get(identity).cloned())
    }

    async fn update<F>(&self, identity: &Identity, transition: F) -> StorageResult<Option<LockoutState>>
    where
        F: FnOnce(Option<LockoutState>) -> Option<LockoutState> + Send + 'static,
    {
        let mut states = self.states.write().await;
        let current = states.remove(identity);
        let next = transition(current);
        if let Some(state) = &next {
            states.insert(identity.clone(), state.clone());
        }
        Ok(next)
    }

    async fn clear(&self, identity: &Identity) -> StorageResult<bool> {
        Ok(self.states.write().await.remove(identity).is_some())
    }

    async fn purge_stale(&self, now: DateTime<Utc>, retention: Duration) -> StorageResult<u64> {
        let mut states = self.states.write().await;
        let initial = states.len();
        states.retain(|_, state| !state.is_stale_at(now, retention));
        Ok((initial - states.len()) as u64)
    }
}
