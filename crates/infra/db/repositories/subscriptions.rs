use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::user_profiles},
};
use domain::{
    entities::user_profiles::{InsertUserProfileEntity, UserProfileEntity},
    repositories::subscriptions::SubscriptionRepository,
    value_objects::{
        enums::{plans::Plan, user_roles::UserRole},
        usage_limits::UsageDecision,
    },
};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<UserProfileEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = user_profiles::table
            .filter(user_profiles::user_id.eq(user_id))
            .select(UserProfileEntity::as_select())
            .first::<UserProfileEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_stripe_customer_id(
        &self,
        stripe_customer_id: &str,
    ) -> Result<Option<UserProfileEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = user_profiles::table
            .filter(user_profiles::stripe_customer_id.eq(stripe_customer_id))
            .select(UserProfileEntity::as_select())
            .first::<UserProfileEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn activate_subscription(
        &self,
        user_id: Uuid,
        stripe_customer_id: &str,
        plan: Plan,
    ) -> Result<UserProfileEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let insert_entity = InsertUserProfileEntity {
            user_id,
            name: String::new(),
            role: UserRole::User.to_string(),
            stripe_customer_id: Some(stripe_customer_id.to_string()),
            plan: plan.to_string(),
        };

        let result = insert_into(user_profiles::table)
            .values(&insert_entity)
            .on_conflict(user_profiles::user_id)
            .do_update()
            .set((
                user_profiles::plan.eq(plan.to_string()),
                user_profiles::stripe_customer_id.eq(Some(stripe_customer_id)),
            ))
            .returning(UserProfileEntity::as_returning())
            .get_result::<UserProfileEntity>(&mut conn)?;

        Ok(result)
    }

    async fn downgrade_by_customer_id(&self, stripe_customer_id: &str) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(user_profiles::table)
            .filter(user_profiles::stripe_customer_id.eq(stripe_customer_id))
            .set(user_profiles::plan.eq(Plan::Free.to_string()))
            .execute(&mut conn)?;

        Ok(affected > 0)
    }

    async fn set_stripe_customer_id(&self, user_id: Uuid, stripe_customer_id: &str) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(user_profiles::table)
            .filter(user_profiles::user_id.eq(user_id))
            .set(user_profiles::stripe_customer_id.eq(Some(stripe_customer_id)))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn record_usage(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<UsageDecision>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        conn.transaction::<_, anyhow::Error, _>(|conn| {
            let profile = user_profiles::table
                .filter(user_profiles::user_id.eq(user_id))
                .select(UserProfileEntity::as_select())
                .for_update()
                .first::<UserProfileEntity>(conn)
                .optional()?;

            let Some(profile) = profile else {
                return Ok(None);
            };

            let decision = profile.usage_snapshot().consume(now);
            if let UsageDecision::Allowed {
                monthly_usage_count,
                usage_reset_at,
            } = decision
            {
                update(user_profiles::table)
                    .filter(user_profiles::id.eq(profile.id))
                    .set((
                        user_profiles::monthly_usage_count.eq(monthly_usage_count),
                        user_profiles::usage_reset_at.eq(usage_reset_at),
                    ))
                    .execute(conn)?;
            }

            Ok(Some(decision))
        })
    }
}
