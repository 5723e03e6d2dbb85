use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::enums::{audit_categories::AuditCategory, dev_log_levels::DevLogLevel};

pub const DEFAULT_LIST_LIMIT: i64 = 100;
pub const MAX_LIST_LIMIT: i64 = 1000;

pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLogQuery {
    pub category: Option<AuditCategory>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DevLogQuery {
    pub level: Option<DevLogLevel>,
    pub component: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuditStatsDto {
    pub total_24h: i64,
    pub by_category: HashMap<String, i64>,
}

impl AuditStatsDto {
    pub fn from_counts(counts: Vec<(String, i64)>) -> Self {
        let total_24h = counts.iter().map(|(_, count)| count).sum();
        Self {
            total_24h,
            by_category: counts.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(clamp_limit(None), 100);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(50_000)), 1000);
    }

    #[test]
    fn stats_total_sums_categories() {
        let stats = AuditStatsDto::from_counts(vec![
            ("billing".to_string(), 3),
            ("admin".to_string(), 2),
        ]);
        assert_eq!(stats.total_24h, 5);
        assert_eq!(stats.by_category.get("billing"), Some(&3));
    }
}
