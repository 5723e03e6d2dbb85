use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::rate_limits},
};
use domain::{
    entities::rate_limits::RateLimitEntity,
    repositories::rate_limits::RateLimitRepository,
    value_objects::rate_limits::{BucketDecision, BucketState, RateLimitPolicy},
};

pub struct RateLimitPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl RateLimitPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl RateLimitRepository for RateLimitPostgres {
    async fn take_token(
        &self,
        key: &str,
        policy: RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> Result<BucketDecision> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        conn.transaction::<_, anyhow::Error, _>(|conn| {
            let current = rate_limits::table
                .find(key)
                .select(RateLimitEntity::as_select())
                .for_update()
                .first::<RateLimitEntity>(conn)
                .optional()?;

            let decision = policy.take(current.as_ref().map(BucketState::from), now);

            if let BucketDecision::Allowed(state) = decision {
                let row = RateLimitEntity {
                    key: key.to_string(),
                    tokens: state.tokens,
                    last_refill: state.last_refill,
                };

                insert_into(rate_limits::table)
                    .values(&row)
                    .on_conflict(rate_limits::key)
                    .do_update()
                    .set((
                        rate_limits::tokens.eq(state.tokens),
                        rate_limits::last_refill.eq(state.last_refill),
                    ))
                    .execute(conn)?;
            }

            Ok(decision)
        })
    }
}
