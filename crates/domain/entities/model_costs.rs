use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::infra::db::postgres::schema::model_costs;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, Serialize)]
#[diesel(table_name = model_costs)]
pub struct ModelCostEntity {
    pub id: Uuid,
    pub model: String,
    pub display_name: Option<String>,
    pub input_cost_per_1k: f64,
    pub output_cost_per_1k: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = model_costs)]
pub struct UpsertModelCostEntity {
    pub model: String,
    pub display_name: Option<String>,
    pub input_cost_per_1k: f64,
    pub output_cost_per_1k: f64,
    pub updated_at: DateTime<Utc>,
}
