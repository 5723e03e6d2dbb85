use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, dsl::count_star, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::audit_logs},
};
use domain::{
    entities::audit_logs::{AuditLogEntity, InsertAuditLogEntity},
    repositories::audit_logs::AuditLogRepository,
    value_objects::enums::audit_categories::AuditCategory,
};

pub struct AuditLogPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AuditLogPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AuditLogRepository for AuditLogPostgres {
    async fn insert(&self, entry: InsertAuditLogEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(audit_logs::table)
            .values(&entry)
            .returning(audit_logs::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(result)
    }

    async fn list(
        &self,
        category: Option<AuditCategory>,
        limit: i64,
    ) -> Result<Vec<AuditLogEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = audit_logs::table
            .select(AuditLogEntity::as_select())
            .into_boxed();

        if let Some(category) = category {
            query = query.filter(audit_logs::category.eq(category.to_string()));
        }

        let results = query
            .order(audit_logs::created_at.desc())
            .limit(limit)
            .load::<AuditLogEntity>(&mut conn)?;

        Ok(results)
    }

    async fn count_by_category_since(&self, since: DateTime<Utc>) -> Result<Vec<(String, i64)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = audit_logs::table
            .filter(audit_logs::created_at.ge(since))
            .group_by(audit_logs::category)
            .select((audit_logs::category, count_star()))
            .load::<(String, i64)>(&mut conn)?;

        Ok(results)
    }
}
