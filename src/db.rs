use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};

use crate::{config::DatabaseConfig, dtos::UserRequestDto, error::StoreError, models::User};

const USER_COLUMNS: &str = "id, first_name, last_name, email, created_at, updated_at";

// -- 数据库客户端，持有连接池
#[derive(Debug, Clone)]
pub struct DBClient {
    pool: PgPool,
}

impl DBClient {
    pub fn new(pool: PgPool) -> Self {
        DBClient { pool }
    }
}

/// 用户存储接口，处理器只通过它访问持久化层
#[async_trait]
pub trait UserExt: Send + Sync {
    async fn create_user(&self, user: &UserRequestDto) -> Result<User, StoreError>;

    async fn get_user(&self, user_id: u64) -> Result<User, StoreError>;

    /// 全量替换姓名与邮箱，并刷新 `updated_at`
    async fn update_user(&self, user_id: u64, user: &UserRequestDto) -> Result<User, StoreError>;

    /// 释放底层资源，进程退出前调用一次
    async fn close(&self);
}

#[async_trait]
impl UserExt for DBClient {
    async fn create_user(&self, user: &UserRequestDto) -> Result<User, StoreError> {
        let query = format!(
            "INSERT INTO users (first_name, last_name, email) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match err {
                // -- 邮箱唯一约束冲突
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    StoreError::AlreadyExists
                }
                other => StoreError::Database(other),
            })
    }

    async fn get_user(&self, user_id: u64) -> Result<User, StoreError> {
        // -- 超出 BIGSERIAL 范围的 id 不可能存在
        let id = i64::try_from(user_id).map_err(|_| StoreError::NotFound)?;
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn update_user(&self, user_id: u64, user: &UserRequestDto) -> Result<User, StoreError> {
        let id = i64::try_from(user_id).map_err(|_| StoreError::NotFound)?;
        let query = format!(
            "UPDATE users SET first_name = $1, last_name = $2, email = $3, updated_at = now() \
             WHERE id = $4 RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

// -- 创建数据库连接池
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let ssl_mode: PgSslMode = config.ssl_mode.parse()?;

    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.name)
        .ssl_mode(ssl_mode);

    // -- 配置连接池选项
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await?;

    // -- 运行简单查询来测试连接
    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(pool)
}

// -- 执行 migrations 目录下的迁移脚本
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
