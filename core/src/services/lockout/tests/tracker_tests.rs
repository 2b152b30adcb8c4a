//! Tests for the identity lockout tracker

use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::domain::entities::LockoutPolicy;
use crate::domain::value_objects::Identity;
use crate::errors::DomainError;
use crate::repositories::InMemoryLockoutRepository;
use crate::services::clock::{Clock, ManualClock};
use crate::services::lockout::{AdmitResult, IdentityLockoutTracker};

fn setup(policy: LockoutPolicy) -> (IdentityLockoutTracker<InMemoryLockoutRepository>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let tracker = IdentityLockoutTracker::new(
        Arc::new(InMemoryLockoutRepository::new()),
        clock.clone(),
        policy,
    );
    (tracker, clock)
}

fn identity() -> Identity {
    Identity::parse("frank@example.com").unwrap()
}

#[tokio::test]
async fn test_unknown_identity_is_allowed() {
    let (tracker, _) = setup(LockoutPolicy::default());
    let result = tracker.admit_attempt(&identity()).await.unwrap();
    assert_eq!(
        result,
        AdmitResult::Allowed {
            remaining_attempts: LockoutPolicy::default().max_failures
        }
    );
}

#[tokio::test]
async fn test_failures_reduce_allowance_then_lock() {
    let policy = LockoutPolicy::default();
    let (tracker, clock) = setup(policy);
    let id = identity();

    tracker.record_outcome(&id, false).await.unwrap();
    tracker.record_outcome(&id, false).await.unwrap();
    assert_eq!(
        tracker.admit_attempt(&id).await.unwrap(),
        AdmitResult::Allowed {
            remaining_attempts: policy.max_failures - 2
        }
    );

    for _ in 2..policy.max_failures {
        tracker.record_outcome(&id, false).await.unwrap();
    }

    let expected_until = clock.now() + policy.lockout_duration;
    assert_eq!(
        tracker.admit_attempt(&id).await.unwrap(),
        AdmitResult::Locked {
            lockout_expires_at: expected_until
        }
    );

    // lockout expires on its own and the allowance is back in full
    clock.set(expected_until);
    assert_eq!(
        tracker.admit_attempt(&id).await.unwrap(),
        AdmitResult::Allowed {
            remaining_attempts: policy.max_failures
        }
    );
}

#[tokio::test]
async fn test_window_rate_limit_when_lockout_threshold_is_higher() {
    let policy = LockoutPolicy {
        max_failures: 10,
        ..LockoutPolicy::default()
    };
    let (tracker, clock) = setup(policy);
    let id = identity();
    let window_start = clock.now();

    for _ in 0..policy.window_max_failures {
        tracker.record_outcome(&id, false).await.unwrap();
        clock.advance(Duration::seconds(10));
    }

    let result = tracker.admit_attempt(&id).await.unwrap();
    assert_eq!(
        result,
        AdmitResult::RateLimited {
            next_allowed_at: window_start + policy.window
        }
    );
    assert!(matches!(
        result.into_result(),
        Err(DomainError::RateLimited { .. })
    ));

    clock.set(window_start + policy.window);
    assert!(tracker.admit_attempt(&id).await.unwrap().is_allowed());
}

#[tokio::test]
async fn test_success_clears_state() {
    let (tracker, _) = setup(LockoutPolicy::default());
    let id = identity();

    tracker.record_outcome(&id, false).await.unwrap();
    assert!(tracker.state(&id).await.unwrap().is_some());

    tracker.record_outcome(&id, true).await.unwrap();
    assert!(tracker.state(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_state_is_shared_across_normalized_forms() {
    let (tracker, _) = setup(LockoutPolicy::default());

    tracker
        .record_outcome(&Identity::parse(" Frank@Example.com ").unwrap(), false)
        .await
        .unwrap();
    let state = tracker.state(&identity()).await.unwrap().unwrap();
    assert_eq!(state.failure_count, 1);
}

#[tokio::test]
async fn test_purge_stale_uses_retention() {
    let policy = LockoutPolicy::default();
    let (tracker, clock) = setup(policy);

    tracker.record_outcome(&identity(), false).await.unwrap();
    assert_eq!(tracker.purge_stale().await.unwrap(), 0);

    clock.advance(policy.retention);
    assert_eq!(tracker.purge_stale().await.unwrap(), 1);
}
