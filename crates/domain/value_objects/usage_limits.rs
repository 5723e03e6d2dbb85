use chrono::{DateTime, Datelike, NaiveDate, Utc};

use super::enums::plans::Plan;

/// Usage counters as stored on a profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageSnapshot {
    pub plan: Plan,
    pub monthly_usage_count: i32,
    pub usage_reset_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UsageDecision {
    /// Values to write back to the profile.
    Allowed {
        monthly_usage_count: i32,
        usage_reset_at: Option<DateTime<Utc>>,
    },
    Exceeded { plan: Plan, limit: i32 },
}

/// First instant of the UTC calendar month containing `now`.
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or(now)
}

impl UsageSnapshot {
    /// Counts one use against the plan's monthly allowance, resetting the
    /// counter when the last reset happened before the current month.
    pub fn consume(&self, now: DateTime<Utc>) -> UsageDecision {
        let needs_reset = match self.usage_reset_at {
            None => true,
            Some(reset_at) => reset_at < month_start(now),
        };
        let current = if needs_reset {
            0
        } else {
            self.monthly_usage_count
        };

        if let Some(limit) = self.plan.monthly_usage_limit() {
            if current >= limit {
                return UsageDecision::Exceeded {
                    plan: self.plan,
                    limit,
                };
            }
        }

        UsageDecision::Allowed {
            monthly_usage_count: current + 1,
            usage_reset_at: if needs_reset {
                Some(now)
            } else {
                self.usage_reset_at
            },
        }
    }
}
