use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*, upsert::excluded};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::model_costs},
};
use domain::{
    entities::model_costs::{ModelCostEntity, UpsertModelCostEntity},
    repositories::model_costs::ModelCostRepository,
};

pub struct ModelCostPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ModelCostPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ModelCostRepository for ModelCostPostgres {
    async fn list(&self) -> Result<Vec<ModelCostEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = model_costs::table
            .order(model_costs::model.asc())
            .select(ModelCostEntity::as_select())
            .load::<ModelCostEntity>(&mut conn)?;

        Ok(results)
    }

    async fn find_by_model(&self, model: &str) -> Result<Option<ModelCostEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = model_costs::table
            .filter(model_costs::model.eq(model))
            .select(ModelCostEntity::as_select())
            .first::<ModelCostEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn upsert(&self, cost: UpsertModelCostEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(model_costs::table)
            .values(&cost)
            .on_conflict(model_costs::model)
            .do_update()
            .set((
                model_costs::display_name.eq(excluded(model_costs::display_name)),
                model_costs::input_cost_per_1k.eq(excluded(model_costs::input_cost_per_1k)),
                model_costs::output_cost_per_1k.eq(excluded(model_costs::output_cost_per_1k)),
                model_costs::updated_at.eq(excluded(model_costs::updated_at)),
            ))
            .returning(model_costs::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(result)
    }
}
