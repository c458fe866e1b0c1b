use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// 购买记录，每个 (user_id, course_id) 至多一条
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub purchased_at: DateTime<Utc>,
}
