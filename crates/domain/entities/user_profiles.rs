use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    domain::value_objects::{
        enums::{plans::Plan, user_roles::UserRole},
        usage_limits::UsageSnapshot,
    },
    infra::db::postgres::schema::user_profiles,
};

/// One row per user. Holds the billing plan and the Stripe customer link.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable, Serialize)]
#[diesel(table_name = user_profiles)]
pub struct UserProfileEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub role: String,
    pub stripe_customer_id: Option<String>,
    pub plan: String,
    pub monthly_usage_count: i32,
    pub usage_reset_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserProfileEntity {
    pub fn plan(&self) -> Plan {
        Plan::from_str(&self.plan).unwrap_or_default()
    }

    pub fn role(&self) -> UserRole {
        UserRole::from_str(&self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == UserRole::Admin
    }

    pub fn usage_snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            plan: self.plan(),
            monthly_usage_count: self.monthly_usage_count,
            usage_reset_at: self.usage_reset_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_profiles)]
pub struct InsertUserProfileEntity {
    pub user_id: Uuid,
    pub name: String,
    pub role: String,
    pub stripe_customer_id: Option<String>,
    pub plan: String,
}
