use std::{
    any::Any,
    net::SocketAddr,
    time::{Duration, Instant},
};

use axum::{
    body::{Body, HttpBody},
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, Method, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::error::{ErrorMessage, HttpError};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

// -- 为缺少 x-request-id 的请求生成 UUID
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

// -- 每个请求一个 span，处理器内的日志会带上 request_id
pub fn make_request_span(request: &axum::http::Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

// -- 请求日志中间件
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    // -- 提取请求信息
    let method: Method = request.method().clone();
    let uri: Uri = request.uri().clone();
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
        .to_owned();
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());
    let start: Instant = Instant::now();

    // -- 处理请求
    let response: Response = next.run(request).await;

    // -- 获取响应状态码
    let status: StatusCode = response.status();
    let duration = start.elapsed();
    let bytes = response.body().size_hint().exact();

    // -- 记录请求信息
    match status.as_u16() {
        100..=399 => {
            tracing::info!(
                target: "request",
                method = %method,
                path = %uri.path(),
                status = status.as_u16(),
                duration = ?duration,
                bytes = bytes,
                remote_addr = %remote_addr,
                request_id = %request_id,
                "请求成功"
            );
        }
        400..=499 => {
            tracing::warn!(
                target: "request",
                method = %method,
                path = %uri.path(),
                status = status.as_u16(),
                duration = ?duration,
                bytes = bytes,
                remote_addr = %remote_addr,
                request_id = %request_id,
                "客户端错误"
            );
        }
        _ => {
            tracing::error!(
                target: "request",
                method = %method,
                path = %uri.path(),
                status = status.as_u16(),
                duration = ?duration,
                bytes = bytes,
                remote_addr = %remote_addr,
                request_id = %request_id,
                "服务器错误"
            );
        }
    }

    response
}

// -- 单个请求的处理时限，超时返回 408
pub async fn request_timeout(State(limit): State<Duration>, request: Request, next: Next) -> Response {
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(limit = ?limit, "request timed out");
            HttpError::new(
                ErrorMessage::RequestTimeout.to_string(),
                StatusCode::REQUEST_TIMEOUT,
            )
            .into_response()
        }
    }
}

// -- 处理器 panic 时返回统一的 500 响应
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = err.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(panic = %detail, "request handler panicked");
    HttpError::server_error(ErrorMessage::InternalServerError.to_string()).into_response()
}

// -- 未匹配任何路由
pub async fn fallback() -> HttpError {
    HttpError::not_found(ErrorMessage::RouteNotFound.to_string())
}

// -- 路由存在但方法不支持
pub async fn method_not_allowed() -> HttpError {
    HttpError::new(
        ErrorMessage::MethodNotAllowed.to_string(),
        StatusCode::METHOD_NOT_ALLOWED,
    )
}
