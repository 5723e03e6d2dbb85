use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, delete, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::dev_logs},
};
use domain::{
    entities::dev_logs::{DevLogEntity, InsertDevLogEntity},
    repositories::dev_logs::DevLogRepository,
    value_objects::enums::dev_log_levels::DevLogLevel,
};

pub struct DevLogPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl DevLogPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl DevLogRepository for DevLogPostgres {
    async fn insert(&self, entry: InsertDevLogEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(dev_logs::table)
            .values(&entry)
            .returning(dev_logs::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(result)
    }

    async fn list(
        &self,
        level: Option<DevLogLevel>,
        component: Option<String>,
        limit: i64,
    ) -> Result<Vec<DevLogEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = dev_logs::table
            .select(DevLogEntity::as_select())
            .into_boxed();

        if let Some(level) = level {
            query = query.filter(dev_logs::level.eq(level.to_string()));
        }

        if let Some(component) = component {
            query = query.filter(dev_logs::component.eq(component));
        }

        let results = query
            .order(dev_logs::created_at.desc())
            .limit(limit)
            .load::<DevLogEntity>(&mut conn)?;

        Ok(results)
    }

    async fn delete_non_error_older_than(
        &self,
        cutoff: DateTime<Utc>,
        batch_size: i64,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let ids = dev_logs::table
            .filter(dev_logs::created_at.lt(cutoff))
            .filter(dev_logs::level.ne(DevLogLevel::Error.to_string()))
            .order(dev_logs::created_at.asc())
            .limit(batch_size)
            .select(dev_logs::id)
            .load::<Uuid>(&mut conn)?;

        if ids.is_empty() {
            return Ok(0);
        }

        let deleted = delete(dev_logs::table)
            .filter(dev_logs::id.eq_any(&ids))
            .execute(&mut conn)?;

        Ok(deleted)
    }
}
