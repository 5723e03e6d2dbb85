use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::ai_logs},
};
use domain::{
    entities::ai_logs::{AiLogEntity, InsertAiLogEntity},
    repositories::ai_logs::AiLogRepository,
};

pub struct AiLogPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AiLogPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AiLogRepository for AiLogPostgres {
    async fn insert(&self, log: InsertAiLogEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(ai_logs::table)
            .values(&log)
            .returning(ai_logs::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(result)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<AiLogEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = ai_logs::table
            .order(ai_logs::started_at.desc())
            .limit(limit)
            .select(AiLogEntity::as_select())
            .load::<AiLogEntity>(&mut conn)?;

        Ok(results)
    }
}
