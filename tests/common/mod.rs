#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

use users_api::{
    api::UserApi,
    config::OpenApiConfig,
    db::UserExt,
    dtos::UserRequestDto,
    error::StoreError,
    handlers::users::UserHandler,
    models::User,
    openapi::OpenApiDoc,
    routes::{create_router, RouterOptions},
};

pub const SPEC_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/openapi/openapi.yaml");

/// 内存版用户存储：自增 id，邮箱唯一
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    users: Arc<Mutex<Vec<User>>>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserExt for MemoryStore {
    async fn create_user(&self, user: &UserRequestDto) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::AlreadyExists);
        }

        let now = Utc::now();
        let created = User {
            id: users.len() as i64 + 1,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn get_user(&self, user_id: u64) -> Result<User, StoreError> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id as u64 == user_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_user(&self, user_id: u64, user: &UserRequestDto) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        let existing = users
            .iter_mut()
            .find(|u| u.id as u64 == user_id)
            .ok_or(StoreError::NotFound)?;

        existing.first_name = user.first_name.clone();
        existing.last_name = user.last_name.clone();
        existing.email = user.email.clone();
        // -- 时钟精度不足时也保证 updated_at 严格递增
        existing.updated_at = Utc::now().max(existing.updated_at + chrono::Duration::microseconds(1));
        Ok(existing.clone())
    }

    async fn close(&self) {}
}

/// 所有操作都会 panic 的存储
pub struct PanickingStore;

#[async_trait]
impl UserExt for PanickingStore {
    async fn create_user(&self, _user: &UserRequestDto) -> Result<User, StoreError> {
        panic!("connection lost")
    }

    async fn get_user(&self, _user_id: u64) -> Result<User, StoreError> {
        panic!("connection lost")
    }

    async fn update_user(&self, _user_id: u64, _user: &UserRequestDto) -> Result<User, StoreError> {
        panic!("connection lost")
    }

    async fn close(&self) {}
}

/// 在测试时限内不会返回的存储
pub struct SlowStore;

#[async_trait]
impl UserExt for SlowStore {
    async fn create_user(&self, _user: &UserRequestDto) -> Result<User, StoreError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Err(StoreError::NotFound)
    }

    async fn get_user(&self, _user_id: u64) -> Result<User, StoreError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Err(StoreError::NotFound)
    }

    async fn update_user(&self, _user_id: u64, _user: &UserRequestDto) -> Result<User, StoreError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Err(StoreError::NotFound)
    }

    async fn close(&self) {}
}

pub fn options() -> RouterOptions {
    RouterOptions {
        api_prefix: "/api/v1".to_string(),
        swagger_ui: "/swagger".to_string(),
        read_timeout: Duration::from_secs(5),
        request_timeout: Duration::from_secs(5),
    }
}

pub fn app_with<S: UserExt + 'static>(store: S, options: &RouterOptions) -> Router {
    let api: Arc<dyn UserApi> = Arc::new(UserHandler::new(store));
    let doc = OpenApiDoc::load(&OpenApiConfig {
        spec_path: SPEC_PATH.to_string(),
        api_prefix: options.api_prefix.clone(),
    })
    .unwrap();
    create_router(api, doc, options)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
    let body = body.map(|v| Body::from(v.to_string())).unwrap_or_else(Body::empty);
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    TestResponse {
        status,
        headers,
        body: body.to_vec(),
    }
}
