use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::user_profiles::UserProfileEntity;
use crate::domain::value_objects::enums::user_roles::UserRole;

#[async_trait]
#[automock]
pub trait UserProfileRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<UserProfileEntity>>;

    async fn find_by_id(&self, profile_id: Uuid) -> Result<Option<UserProfileEntity>>;

    /// Creates a free `user` profile when none exists and returns the stored row.
    async fn ensure_profile(&self, user_id: Uuid, name: &str) -> Result<UserProfileEntity>;

    async fn update_name(&self, user_id: Uuid, name: &str) -> Result<bool>;

    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<bool>;

    async fn list_profiles(&self) -> Result<Vec<UserProfileEntity>>;

    async fn set_role(&self, profile_id: Uuid, role: UserRole) -> Result<bool>;
}
