use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- 用户记录，id 与时间戳由数据库生成
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
