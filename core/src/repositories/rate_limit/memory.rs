//! In-memory implementation of RateLimitStore

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::RateLimitCounter;
use crate::errors::StorageResult;

use super::r#trait::RateLimitStore;

#[derive(Clone, Default)]
pub struct InMemoryRateLimitStore {
    counters: Arc<RwLock<HashMap<String, RateLimitCounter>>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.counters.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.counters.read().await.is_empty()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn hit(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> StorageResult<RateLimitCounter> {
        let mut counters = self.counters.write().await;
        let counter = counters
            .entry(key.to_string())
            .and_modify(|c| c.hit(limit, window, now))
            .or_insert_with(|| RateLimitCounter::start(key, limit, window, now));
        Ok(counter.clone())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> StorageResult<u64> {
        let mut counters = self.counters.write().await;
        let initial = counters.len();
        counters.retain(|_, c| !c.is_expired_at(now));
        Ok((initial - counters.len()) as u64)
    }
}
