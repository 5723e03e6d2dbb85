use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
    Enterprise,
}

impl Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let plan = match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
            Plan::Enterprise => "enterprise",
        };
        write!(f, "{}", plan)
    }
}

impl Plan {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "free" => Some(Plan::Free),
            "pro" => Some(Plan::Pro),
            "enterprise" => Some(Plan::Enterprise),
            _ => None,
        }
    }

    /// Plans that can be bought through Checkout.
    pub fn is_paid(&self) -> bool {
        matches!(self, Plan::Pro | Plan::Enterprise)
    }

    /// Monthly AI usage allowance. `None` means unlimited.
    pub fn monthly_usage_limit(&self) -> Option<i32> {
        match self {
            Plan::Free => Some(10),
            Plan::Pro | Plan::Enterprise => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display() {
        for plan in [Plan::Free, Plan::Pro, Plan::Enterprise] {
            assert_eq!(Plan::from_str(&plan.to_string()), Some(plan));
        }
        assert_eq!(Plan::from_str("gold"), None);
    }

    #[test]
    fn only_free_plan_is_capped() {
        assert_eq!(Plan::Free.monthly_usage_limit(), Some(10));
        assert_eq!(Plan::Pro.monthly_usage_limit(), None);
        assert!(!Plan::Free.is_paid());
        assert!(Plan::Enterprise.is_paid());
    }
}
