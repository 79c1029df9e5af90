pub mod users;

use std::sync::Arc;

use axum::{
    extract::Path,
    routing::{get, post},
    Extension, Router,
};
use axum_extra::extract::WithRejection;

use crate::{
    api::{CreateUserResponse, GetUserResponse, HealthResponse, UpdateUserResponse, UserApi},
    dtos::UserRequestDto,
    error::HttpError,
    extract::OptionalJson,
};

// -- API 前缀下的全部路由，UserApi 通过 Extension 注入
pub fn users_handler() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user).put(update_user))
}

pub async fn health(Extension(api): Extension<Arc<dyn UserApi>>) -> HealthResponse {
    api.health().await
}

pub async fn create_user(
    Extension(api): Extension<Arc<dyn UserApi>>,
    OptionalJson(body): OptionalJson<UserRequestDto>,
) -> CreateUserResponse {
    api.create_user(body).await
}

pub async fn get_user(
    Extension(api): Extension<Arc<dyn UserApi>>,
    WithRejection(Path(id), _): WithRejection<Path<u64>, HttpError>,
) -> GetUserResponse {
    api.get_user(id).await
}

pub async fn update_user(
    Extension(api): Extension<Arc<dyn UserApi>>,
    WithRejection(Path(id), _): WithRejection<Path<u64>, HttpError>,
    OptionalJson(body): OptionalJson<UserRequestDto>,
) -> UpdateUserResponse {
    api.update_user(id, body).await
}
