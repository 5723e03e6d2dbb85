use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const AI_CALL_ACTION: &str = "aiCall";
pub const GENERATE_ACTION: &str = "generate";

/// Token-bucket settings for one action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitPolicy {
    pub capacity: f64,
    pub refill_per_second: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketState {
    pub tokens: f64,
    pub last_refill: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BucketDecision {
    /// A token was consumed; the state must be persisted.
    Allowed(BucketState),
    /// Nothing was consumed and nothing should be written.
    Limited { available: f64 },
}

impl RateLimitPolicy {
    pub fn new(capacity: f64, refill_per_second: f64) -> Self {
        Self {
            capacity,
            refill_per_second,
        }
    }

    /// Refills `current` up to `now` and tries to take one token.
    /// A missing bucket starts full.
    pub fn take(&self, current: Option<BucketState>, now: DateTime<Utc>) -> BucketDecision {
        let available = match current {
            None => self.capacity,
            Some(state) => {
                let elapsed_ms = (now - state.last_refill).num_milliseconds().max(0);
                let elapsed_secs = elapsed_ms as f64 / 1000.0;
                (state.tokens + elapsed_secs * self.refill_per_second).min(self.capacity)
            }
        };

        if available < 1.0 {
            return BucketDecision::Limited { available };
        }

        BucketDecision::Allowed(BucketState {
            tokens: available - 1.0,
            last_refill: now,
        })
    }
}

/// Immutable action -> policy table, built once at startup.
#[derive(Debug, Clone)]
pub struct RateLimitTable {
    policies: HashMap<String, RateLimitPolicy>,
}

impl RateLimitTable {
    pub fn new(policies: HashMap<String, RateLimitPolicy>) -> Self {
        Self { policies }
    }

    /// Actions missing from the table are not limited.
    pub fn policy_for(&self, action: &str) -> Option<RateLimitPolicy> {
        self.policies.get(action).copied()
    }

    pub fn with_override(mut self, action: &str, policy: RateLimitPolicy) -> Self {
        self.policies.insert(action.to_string(), policy);
        self
    }

    pub fn bucket_key(user_id: Uuid, action: &str) -> String {
        format!("{}:{}", user_id, action)
    }
}

impl Default for RateLimitTable {
    fn default() -> Self {
        Self::new(HashMap::from([
            // ~3/min sustained, burst of 10
            (AI_CALL_ACTION.to_string(), RateLimitPolicy::new(10.0, 0.05)),
            (GENERATE_ACTION.to_string(), RateLimitPolicy::new(5.0, 0.03)),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn drain(policy: &RateLimitPolicy, now: DateTime<Utc>, count: usize) -> Option<BucketState> {
        let mut state = None;
        for _ in 0..count {
            match policy.take(state, now) {
                BucketDecision::Allowed(next) => state = Some(next),
                BucketDecision::Limited { .. } => panic!("bucket emptied too early"),
            }
        }
        state
    }

    #[test]
    fn new_bucket_starts_full() {
        let policy = RateLimitPolicy::new(10.0, 0.05);
        let now = Utc::now();

        match policy.take(None, now) {
            BucketDecision::Allowed(state) => {
                assert_eq!(state.tokens, 9.0);
                assert_eq!(state.last_refill, now);
            }
            other => panic!("unexpected decision: {other:?}"),
        }
    }

    #[test]
    fn rejects_eleventh_request_then_refills_exactly_one() {
        let policy = RateLimitPolicy::new(10.0, 0.05);
        let start = Utc::now();

        let drained = drain(&policy, start, 10);
        assert!(matches!(
            policy.take(drained, start),
            BucketDecision::Limited { .. }
        ));

        let later = start + Duration::seconds(20);
        let refilled = match policy.take(drained, later) {
            BucketDecision::Allowed(state) => state,
            other => panic!("expected a refilled token, got {other:?}"),
        };
        assert!(matches!(
            policy.take(Some(refilled), later),
            BucketDecision::Limited { .. }
        ));
    }

    #[test]
    fn refill_is_capped_at_capacity() {
        let policy = RateLimitPolicy::new(5.0, 1.0);
        let start = Utc::now();
        let state = BucketState {
            tokens: 0.0,
            last_refill: start,
        };

        match policy.take(Some(state), start + Duration::hours(1)) {
            BucketDecision::Allowed(next) => assert_eq!(next.tokens, 4.0),
            other => panic!("unexpected decision: {other:?}"),
        }
    }

    #[test]
    fn clock_skew_does_not_drain_tokens() {
        let policy = RateLimitPolicy::new(5.0, 1.0);
        let start = Utc::now();
        let state = BucketState {
            tokens: 2.0,
            last_refill: start,
        };

        match policy.take(Some(state), start - Duration::seconds(30)) {
            BucketDecision::Allowed(next) => assert_eq!(next.tokens, 1.0),
            other => panic!("unexpected decision: {other:?}"),
        }
    }

    #[test]
    fn default_table_only_knows_configured_actions() {
        let table = RateLimitTable::default();
        assert_eq!(
            table.policy_for(AI_CALL_ACTION),
            Some(RateLimitPolicy::new(10.0, 0.05))
        );
        assert!(table.policy_for("export").is_none());
    }
}
