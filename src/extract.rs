use std::error::Error as _;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, FromRequest, Request},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use tower_http::timeout::TimeoutError;
use validator::{Validate, ValidationErrors};

use crate::error::{ErrorMessage, HttpError};

/// 可选的 JSON 请求体：空请求体或 `null` 得到 `None`，
/// 非法 JSON 与字段校验失败直接返回 400，不会进入处理器
#[derive(Debug, Clone)]
pub struct OptionalJson<T>(pub Option<T>);

impl<S, T> FromRequest<S> for OptionalJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(body_rejection)?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(OptionalJson(None));
        }

        let value: Option<T> = serde_json::from_slice(&bytes).map_err(|err| {
            tracing::warn!(error = %err, "request validation error");
            HttpError::bad_request(ErrorMessage::InvalidRequest.to_string())
        })?;

        if let Some(value) = &value {
            value
                .validate()
                .map_err(|errors| HttpError::bad_request(validation_message(&errors)))?;
        }

        Ok(OptionalJson(value))
    }
}

// -- 读取请求体失败：读超时返回 408，其余按非法请求处理
fn body_rejection(err: BytesRejection) -> HttpError {
    let timed_out = std::iter::successors(err.source(), |&source| source.source())
        .any(|source| source.is::<TimeoutError>());

    if timed_out {
        tracing::warn!("timed out reading request body");
        return HttpError::new(
            ErrorMessage::RequestTimeout.to_string(),
            StatusCode::REQUEST_TIMEOUT,
        );
    }

    tracing::warn!(error = %err.body_text(), "failed to read request body");
    HttpError::bad_request(ErrorMessage::InvalidRequest.to_string())
}

// -- 按字段名排序后拼接校验信息
fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid"))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}
