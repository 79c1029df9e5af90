use std::fmt;

use axum::{
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// -- 存储层错误分类，处理器只识别 NotFound 与 AlreadyExists
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("user already exists")]
    AlreadyExists,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// -- 统一的错误响应体
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error)
    }
}

// -- 对外暴露的固定错误信息
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorMessage {
    MissingRequestBody,
    InvalidRequest,
    UserAlreadyExists,
    UserNotFound,
    InternalServerError,
    RouteNotFound,
    MethodNotAllowed,
    RequestTimeout,
}

impl ErrorMessage {
    fn to_str(self) -> &'static str {
        match self {
            ErrorMessage::MissingRequestBody => "Missing request body",
            ErrorMessage::InvalidRequest => "Invalid request",
            ErrorMessage::UserAlreadyExists => "User already exists",
            ErrorMessage::UserNotFound => "User not found",
            ErrorMessage::InternalServerError => "Internal server error",
            ErrorMessage::RouteNotFound => "Not found",
            ErrorMessage::MethodNotAllowed => "Method not allowed",
            ErrorMessage::RequestTimeout => "Request timeout",
        }
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl From<ErrorMessage> for ErrorResponse {
    fn from(message: ErrorMessage) -> Self {
        ErrorResponse::new(message.to_string())
    }
}

/// 边界层错误：请求绑定失败、路由未命中等，在进入处理器之前产生
#[derive(Debug, Clone)]
pub struct HttpError {
    pub message: String,
    pub status: StatusCode,
}

impl HttpError {
    pub fn new(message: impl Into<String>, status: StatusCode) -> Self {
        HttpError {
            message: message.into(),
            status,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        HttpError::new(message, StatusCode::BAD_REQUEST)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        HttpError::new(message, StatusCode::NOT_FOUND)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        HttpError::new(message, StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn into_http_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HttpError: message: {}, status: {}", self.message, self.status)
    }
}

impl std::error::Error for HttpError {}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

impl From<PathRejection> for HttpError {
    fn from(rejection: PathRejection) -> Self {
        tracing::warn!(error = %rejection.body_text(), "request validation error");
        HttpError::bad_request(ErrorMessage::InvalidRequest.to_string())
    }
}
