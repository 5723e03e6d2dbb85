use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::{
    domain::value_objects::rate_limits::BucketState, infra::db::postgres::schema::rate_limits,
};

#[derive(Debug, Clone, Selectable, Queryable, Insertable)]
#[diesel(table_name = rate_limits)]
pub struct RateLimitEntity {
    pub key: String,
    pub tokens: f64,
    pub last_refill: DateTime<Utc>,
}

impl From<&RateLimitEntity> for BucketState {
    fn from(value: &RateLimitEntity) -> Self {
        Self {
            tokens: value.tokens,
            last_refill: value.last_refill,
        }
    }
}
