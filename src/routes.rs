use std::{sync::Arc, time::Duration};

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::RequestBodyTimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    api::UserApi,
    config::Config,
    handlers::users_handler,
    middleware::{
        fallback, handle_panic, logging_middleware, make_request_span, method_not_allowed,
        request_timeout, MakeRequestUuidV4,
    },
    openapi::{spec_document, OpenApiDoc},
};

// -- 路由构建参数
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub api_prefix: String,
    /// 为空时不暴露 OpenAPI 文档
    pub swagger_ui: String,
    /// 读取请求体的时限
    pub read_timeout: Duration,
    /// 单个请求从进入到响应的时限
    pub request_timeout: Duration,
}

impl RouterOptions {
    pub fn from_config(config: &Config) -> Self {
        RouterOptions {
            api_prefix: config.openapi.api_prefix.clone(),
            swagger_ui: config.app.swagger_ui.clone(),
            read_timeout: config.http.read_timeout,
            request_timeout: config.http.write_timeout,
        }
    }
}

// -- 配置所有路由
pub fn create_router(api: Arc<dyn UserApi>, doc: OpenApiDoc, options: &RouterOptions) -> Router {
    let api_routes = users_handler().layer(Extension(api));

    let prefix = normalize_prefix(&options.api_prefix);
    let mut router = if prefix.is_empty() {
        Router::new().merge(api_routes)
    } else {
        Router::new().nest(&prefix, api_routes)
    };

    if !options.swagger_ui.is_empty() {
        let docs = Router::new()
            .route(
                &format!("{}/doc.yaml", normalize_prefix(&options.swagger_ui)),
                get(spec_document),
            )
            .layer(Extension(doc));
        router = router.merge(docs);
    }

    // -- 由外到内：生成 request id -> 回写 request id -> span -> 访问日志 -> panic 恢复 -> 超时 -> 请求体读取时限
    router
        .fallback(fallback)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(make_request_span)
                        .on_request(())
                        .on_response(())
                        .on_failure(()),
                )
                .layer(from_fn(logging_middleware))
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(from_fn_with_state(options.request_timeout, request_timeout))
                .layer(RequestBodyTimeoutLayer::new(options.read_timeout)),
        )
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_take_timeouts_from_http_config() {
        let config = Config::from_lookup(|key| match key {
            "APP_MODE" => Some("dev".to_string()),
            "HTTP_READ_TIMEOUT" => Some("2".to_string()),
            "HTTP_WRITE_TIMEOUT" => Some("7".to_string()),
            _ => None,
        })
        .unwrap();

        let options = RouterOptions::from_config(&config);

        assert_eq!(options.read_timeout, Duration::from_secs(2));
        assert_eq!(options.request_timeout, Duration::from_secs(7));
        assert_eq!(options.swagger_ui, "/swagger");
        assert_eq!(options.api_prefix, "/api/v1");
    }

    #[test]
    fn prefixes_are_normalized() {
        assert_eq!(normalize_prefix("/api/v1"), "/api/v1");
        assert_eq!(normalize_prefix("api/v1/"), "/api/v1");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix(""), "");
    }
}
