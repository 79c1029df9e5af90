use serde::{Deserialize, Serialize};
use validator::Validate;

// -- 创建与全量更新共用的请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UserRequestDto {
    #[validate(length(min = 1, message = "first_name must not be empty"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "last_name must not be empty"))]
    pub last_name: String,

    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponseDto {
    pub status: String,
}

impl HealthResponseDto {
    pub fn ok() -> Self {
        Self {
            status: "OK".to_string(),
        }
    }
}
