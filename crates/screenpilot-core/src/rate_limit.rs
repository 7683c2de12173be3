// Per-identifier request throttling: a daily cap plus a fixed minimum gap
// between consecutive requests.

use chrono::{DateTime, Duration, Utc};
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

pub const DAILY_LIMIT: u32 = 50;
pub const MINUTE_LIMIT: u32 = 5;

/// Idle records are dropped after this long; longer than the day window so
/// an active record never loses its count.
pub const DEFAULT_IDLE_TTL: std::time::Duration = std::time::Duration::from_secs(25 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    pub daily_limit: u32,
    pub per_minute: u32,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            daily_limit: DAILY_LIMIT,
            per_minute: MINUTE_LIMIT,
        }
    }
}

impl RateLimitPolicy {
    /// Minimum gap between two allowed requests (60s / per_minute).
    ///
    /// This is strict spacing, not a sliding count: five requests cannot be
    /// sent back to back even though the label says "5 per minute".
    pub fn min_spacing(&self) -> Duration {
        Duration::milliseconds(60_000 / i64::from(self.per_minute.max(1)))
    }

    pub fn window(&self) -> Duration {
        Duration::hours(24)
    }
}

/// Counters for one caller identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRecord {
    pub identifier: String,
    pub count: u32,
    pub window_reset_at: DateTime<Utc>,
    pub last_request_at: Option<DateTime<Utc>>,
}

impl RateLimitRecord {
    pub fn new(identifier: impl Into<String>, now: DateTime<Utc>, window: Duration) -> Self {
        Self {
            identifier: identifier.into(),
            count: 0,
            window_reset_at: now + window,
            last_request_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitViolation {
    /// Request came sooner than the minimum spacing
    Burst { per_minute: u32 },
    /// Daily cap already used up
    DailyCap { daily_limit: u32 },
}

impl RateLimitViolation {
    pub fn message(&self) -> String {
        match self {
            RateLimitViolation::Burst { per_minute } => format!(
                "1分間に{}回までリクエスト可能です。少し待ってから再試行してください。",
                per_minute
            ),
            RateLimitViolation::DailyCap { daily_limit } => format!(
                "本日の利用上限（{}回）に達しました。明日またお試しください。",
                daily_limit
            ),
        }
    }
}

/// Remaining quota as reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub remaining: u32,
    pub reset_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: Option<DateTime<Utc>>,
    pub violation: Option<RateLimitViolation>,
}

impl RateLimitDecision {
    pub fn quota(&self) -> Quota {
        Quota {
            remaining: self.remaining,
            reset_at: self.reset_at,
        }
    }

    pub fn error(&self) -> Option<String> {
        self.violation.map(|v| v.message())
    }
}

/// Keyed storage for rate-limit records.
///
/// `update` must run `apply` with exclusive access to the record so that
/// concurrent requests from one identifier cannot both pass the cap.
pub trait RateLimitStore: Send + Sync {
    fn get(&self, identifier: &str) -> Option<RateLimitRecord>;

    fn update(
        &self,
        identifier: &str,
        fresh: &dyn Fn() -> RateLimitRecord,
        apply: &mut dyn FnMut(&mut RateLimitRecord) -> RateLimitDecision,
    ) -> RateLimitDecision;

    fn reset(&self, identifier: &str);
}

/// In-process store with idle eviction and a lock per identifier
pub struct MokaRateLimitStore {
    records: Cache<String, Arc<Mutex<RateLimitRecord>>>,
}

impl MokaRateLimitStore {
    pub fn new(idle_ttl: std::time::Duration) -> Self {
        Self {
            records: Cache::builder().time_to_idle(idle_ttl).build(),
        }
    }
}

impl Default for MokaRateLimitStore {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TTL)
    }
}

impl RateLimitStore for MokaRateLimitStore {
    fn get(&self, identifier: &str) -> Option<RateLimitRecord> {
        self.records
            .get(identifier)
            .map(|record| record.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn update(
        &self,
        identifier: &str,
        fresh: &dyn Fn() -> RateLimitRecord,
        apply: &mut dyn FnMut(&mut RateLimitRecord) -> RateLimitDecision,
    ) -> RateLimitDecision {
        let record = self
            .records
            .get_with(identifier.to_string(), || Arc::new(Mutex::new(fresh())));

        let mut guard = record.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut *guard)
    }

    fn reset(&self, identifier: &str) {
        self.records.invalidate(identifier);
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    policy: RateLimitPolicy,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self::with_store(Arc::new(MokaRateLimitStore::default()), policy)
    }

    pub fn with_store(store: Arc<dyn RateLimitStore>, policy: RateLimitPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    pub fn store(&self) -> &Arc<dyn RateLimitStore> {
        &self.store
    }

    pub fn check(&self, identifier: &str) -> RateLimitDecision {
        self.check_at(identifier, Utc::now())
    }

    /// Check and, if allowed, consume one request at `now`.
    ///
    /// Order: window rollover, then burst spacing, then the daily cap. A
    /// denied request never increments the count.
    pub fn check_at(&self, identifier: &str, now: DateTime<Utc>) -> RateLimitDecision {
        let policy = self.policy;
        let window = policy.window();
        let spacing = policy.min_spacing();

        let decision = self.store.update(
            identifier,
            &|| RateLimitRecord::new(identifier, now, window),
            &mut |record: &mut RateLimitRecord| {
                if now > record.window_reset_at {
                    record.count = 0;
                    record.window_reset_at = now + window;
                }

                if let Some(last) = record.last_request_at {
                    if now - last < spacing {
                        return RateLimitDecision {
                            allowed: false,
                            remaining: policy.daily_limit.saturating_sub(record.count),
                            reset_at: None,
                            violation: Some(RateLimitViolation::Burst {
                                per_minute: policy.per_minute,
                            }),
                        };
                    }
                }

                if record.count >= policy.daily_limit {
                    return RateLimitDecision {
                        allowed: false,
                        remaining: 0,
                        reset_at: Some(record.window_reset_at),
                        violation: Some(RateLimitViolation::DailyCap {
                            daily_limit: policy.daily_limit,
                        }),
                    };
                }

                record.count += 1;
                record.last_request_at = Some(now);

                RateLimitDecision {
                    allowed: true,
                    remaining: policy.daily_limit - record.count,
                    reset_at: Some(record.window_reset_at),
                    violation: None,
                }
            },
        );

        if !decision.allowed {
            tracing::warn!(
                identifier = %identifier,
                violation = ?decision.violation,
                remaining = decision.remaining,
                "Rate limit denied request"
            );
        }

        decision
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitPolicy::default())
    }
}
