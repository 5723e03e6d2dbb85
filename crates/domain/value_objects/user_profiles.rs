use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{plans::Plan, user_roles::UserRole};
use crate::domain::entities::user_profiles::UserProfileEntity;

/// Profile as returned to clients. Users without a stored profile get a
/// free `user` placeholder with `has_profile = false`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserProfileDto {
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub email: Option<String>,
    pub name: String,
    pub role: UserRole,
    pub plan: Plan,
    pub stripe_customer_id: Option<String>,
    pub monthly_usage_count: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub has_profile: bool,
}

impl UserProfileDto {
    pub fn from_entity(entity: UserProfileEntity, email: Option<String>) -> Self {
        Self {
            id: Some(entity.id),
            user_id: entity.user_id,
            email,
            role: entity.role(),
            plan: entity.plan(),
            name: entity.name,
            stripe_customer_id: entity.stripe_customer_id,
            monthly_usage_count: entity.monthly_usage_count,
            created_at: Some(entity.created_at),
            has_profile: true,
        }
    }

    pub fn placeholder(user_id: Uuid, email: Option<String>) -> Self {
        Self {
            id: None,
            user_id,
            email,
            name: String::new(),
            role: UserRole::User,
            plan: Plan::Free,
            stripe_customer_id: None,
            monthly_usage_count: 0,
            created_at: None,
            has_profile: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileModel {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetRoleModel {
    pub role: UserRole,
}
