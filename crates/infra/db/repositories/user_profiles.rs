use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::user_profiles},
};
use domain::{
    entities::user_profiles::{InsertUserProfileEntity, UserProfileEntity},
    repositories::user_profiles::UserProfileRepository,
    value_objects::enums::{plans::Plan, user_roles::UserRole},
};

pub struct UserProfilePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UserProfilePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserProfileRepository for UserProfilePostgres {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<UserProfileEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = user_profiles::table
            .filter(user_profiles::user_id.eq(user_id))
            .select(UserProfileEntity::as_select())
            .first::<UserProfileEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_id(&self, profile_id: Uuid) -> Result<Option<UserProfileEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = user_profiles::table
            .find(profile_id)
            .select(UserProfileEntity::as_select())
            .first::<UserProfileEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn ensure_profile(&self, user_id: Uuid, name: &str) -> Result<UserProfileEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let insert_entity = InsertUserProfileEntity {
            user_id,
            name: name.to_string(),
            role: UserRole::User.to_string(),
            stripe_customer_id: None,
            plan: Plan::Free.to_string(),
        };

        insert_into(user_profiles::table)
            .values(&insert_entity)
            .on_conflict(user_profiles::user_id)
            .do_nothing()
            .execute(&mut conn)?;

        let result = user_profiles::table
            .filter(user_profiles::user_id.eq(user_id))
            .select(UserProfileEntity::as_select())
            .first::<UserProfileEntity>(&mut conn)?;

        Ok(result)
    }

    async fn update_name(&self, user_id: Uuid, name: &str) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(user_profiles::table)
            .filter(user_profiles::user_id.eq(user_id))
            .set(user_profiles::name.eq(name))
            .execute(&mut conn)?;

        Ok(affected > 0)
    }

    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = delete(user_profiles::table)
            .filter(user_profiles::user_id.eq(user_id))
            .execute(&mut conn)?;

        Ok(affected > 0)
    }

    async fn list_profiles(&self) -> Result<Vec<UserProfileEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = user_profiles::table
            .order(user_profiles::created_at.desc())
            .select(UserProfileEntity::as_select())
            .load::<UserProfileEntity>(&mut conn)?;

        Ok(results)
    }

    async fn set_role(&self, profile_id: Uuid, role: UserRole) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(user_profiles::table.find(profile_id))
            .set(user_profiles::role.eq(role.to_string()))
            .execute(&mut conn)?;

        Ok(affected > 0)
    }
}
