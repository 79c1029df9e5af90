use async_trait::async_trait;

use crate::{
    api::{CreateUserResponse, GetUserResponse, HealthResponse, UpdateUserResponse, UserApi},
    db::{DBClient, UserExt},
    dtos::{HealthResponseDto, UserRequestDto},
    error::{ErrorMessage, StoreError},
};

// -- 编译期确认 UserHandler<DBClient> 实现了 UserApi
const _: fn() = || {
    fn assert_user_api<T: UserApi>() {}
    assert_user_api::<UserHandler<DBClient>>();
};

// -- 用户资源处理器，只做字段转发与错误分类
#[derive(Debug, Clone)]
pub struct UserHandler<S> {
    store: S,
}

impl<S: UserExt> UserHandler<S> {
    pub fn new(store: S) -> Self {
        UserHandler { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<S: UserExt> UserApi for UserHandler<S> {
    async fn health(&self) -> HealthResponse {
        HealthResponse::Ok(HealthResponseDto::ok())
    }

    /// 创建用户
    ///
    /// # 参数
    /// - `body` -- 已通过校验的请求体，缺失时为 `None`
    ///
    /// # 返回
    /// - `Created` -- 创建成功，返回数据库中的完整用户
    /// - `BadRequest` -- 缺少请求体，不访问存储
    /// - `Conflict` -- 邮箱已存在
    /// - `InternalServerError` -- 其他存储错误，原始错误只写日志
    async fn create_user(&self, body: Option<UserRequestDto>) -> CreateUserResponse {
        let Some(body) = body else {
            return CreateUserResponse::BadRequest(ErrorMessage::MissingRequestBody.into());
        };

        match self.store.create_user(&body).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "user created");
                CreateUserResponse::Created(user)
            }
            Err(StoreError::AlreadyExists) => {
                CreateUserResponse::Conflict(ErrorMessage::UserAlreadyExists.into())
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to create user");
                CreateUserResponse::InternalServerError(ErrorMessage::InternalServerError.into())
            }
        }
    }

    async fn get_user(&self, id: u64) -> GetUserResponse {
        match self.store.get_user(id).await {
            Ok(user) => GetUserResponse::Ok(user),
            Err(StoreError::NotFound) => GetUserResponse::NotFound(ErrorMessage::UserNotFound.into()),
            Err(err) => {
                tracing::error!(user_id = id, error = %err, "failed to get user");
                GetUserResponse::InternalServerError(ErrorMessage::InternalServerError.into())
            }
        }
    }

    async fn update_user(&self, id: u64, body: Option<UserRequestDto>) -> UpdateUserResponse {
        let Some(body) = body else {
            return UpdateUserResponse::BadRequest(ErrorMessage::MissingRequestBody.into());
        };

        match self.store.update_user(id, &body).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "user updated");
                UpdateUserResponse::Ok(user)
            }
            Err(StoreError::NotFound) => {
                UpdateUserResponse::NotFound(ErrorMessage::UserNotFound.into())
            }
            Err(err) => {
                tracing::error!(user_id = id, error = %err, "failed to update user");
                UpdateUserResponse::InternalServerError(ErrorMessage::InternalServerError.into())
            }
        }
    }
}
