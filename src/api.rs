//! HTTP 接口契约：每个操作对应一个结果枚举，每个变体对应一个状态码。

use async_trait::async_trait;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    dtos::{HealthResponseDto, UserRequestDto},
    error::ErrorResponse,
    models::User,
};

/// 服务端需要实现的四个操作。请求绑定与校验已在边界层完成，
/// 实现方只负责调用存储并挑选结果变体
#[async_trait]
pub trait UserApi: Send + Sync {
    async fn health(&self) -> HealthResponse;

    async fn create_user(&self, body: Option<UserRequestDto>) -> CreateUserResponse;

    async fn get_user(&self, id: u64) -> GetUserResponse;

    async fn update_user(&self, id: u64, body: Option<UserRequestDto>) -> UpdateUserResponse;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthResponse {
    Ok(HealthResponseDto),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateUserResponse {
    Created(User),
    BadRequest(ErrorResponse),
    Conflict(ErrorResponse),
    InternalServerError(ErrorResponse),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetUserResponse {
    Ok(User),
    NotFound(ErrorResponse),
    InternalServerError(ErrorResponse),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateUserResponse {
    Ok(User),
    BadRequest(ErrorResponse),
    NotFound(ErrorResponse),
    InternalServerError(ErrorResponse),
}

impl HealthResponse {
    pub fn status(&self) -> StatusCode {
        match self {
            HealthResponse::Ok(_) => StatusCode::OK,
        }
    }
}

impl CreateUserResponse {
    pub fn status(&self) -> StatusCode {
        match self {
            CreateUserResponse::Created(_) => StatusCode::CREATED,
            CreateUserResponse::BadRequest(_) => StatusCode::BAD_REQUEST,
            CreateUserResponse::Conflict(_) => StatusCode::CONFLICT,
            CreateUserResponse::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl GetUserResponse {
    pub fn status(&self) -> StatusCode {
        match self {
            GetUserResponse::Ok(_) => StatusCode::OK,
            GetUserResponse::NotFound(_) => StatusCode::NOT_FOUND,
            GetUserResponse::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl UpdateUserResponse {
    pub fn status(&self) -> StatusCode {
        match self {
            UpdateUserResponse::Ok(_) => StatusCode::OK,
            UpdateUserResponse::BadRequest(_) => StatusCode::BAD_REQUEST,
            UpdateUserResponse::NotFound(_) => StatusCode::NOT_FOUND,
            UpdateUserResponse::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            HealthResponse::Ok(body) => (status, Json(body)).into_response(),
        }
    }
}

impl IntoResponse for CreateUserResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            CreateUserResponse::Created(user) => (status, Json(user)).into_response(),
            CreateUserResponse::BadRequest(err)
            | CreateUserResponse::Conflict(err)
            | CreateUserResponse::InternalServerError(err) => (status, Json(err)).into_response(),
        }
    }
}

impl IntoResponse for GetUserResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            GetUserResponse::Ok(user) => (status, Json(user)).into_response(),
            GetUserResponse::NotFound(err) | GetUserResponse::InternalServerError(err) => {
                (status, Json(err)).into_response()
            }
        }
    }
}

impl IntoResponse for UpdateUserResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            UpdateUserResponse::Ok(user) => (status, Json(user)).into_response(),
            UpdateUserResponse::BadRequest(err)
            | UpdateUserResponse::NotFound(err)
            | UpdateUserResponse::InternalServerError(err) => (status, Json(err)).into_response(),
        }
    }
}
