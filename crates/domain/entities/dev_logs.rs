use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::infra::db::postgres::schema::dev_logs;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, Serialize)]
#[diesel(table_name = dev_logs)]
pub struct DevLogEntity {
    pub id: Uuid,
    pub level: String,
    pub message: String,
    pub context: Option<String>,
    pub component: String,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = dev_logs)]
pub struct InsertDevLogEntity {
    pub level: String,
    pub message: String,
    pub context: Option<String>,
    pub component: String,
    pub user_id: Option<Uuid>,
}
