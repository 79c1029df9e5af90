use std::{
    io,
    path::{Path, PathBuf},
};

use axum::{
    body::Bytes,
    http::header,
    response::IntoResponse,
    Extension,
};
use thiserror::Error;

use crate::config::OpenApiConfig;

/// 未配置路径时，在可执行文件同级目录查找的文件名
pub const DEFAULT_SPEC_FILE: &str = "openapi.yaml";

#[derive(Debug, Error)]
pub enum OpenApiError {
    #[error("failed to get executable path: {0}")]
    Executable(#[source] io::Error),

    #[error("OpenAPI specification file not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read OpenAPI specification at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// -- 启动时读入内存的 OpenAPI 文档
#[derive(Debug, Clone)]
pub struct OpenApiDoc {
    path: PathBuf,
    content: Bytes,
}

impl OpenApiDoc {
    pub fn load(config: &OpenApiConfig) -> Result<Self, OpenApiError> {
        let path = resolve_spec_path(&config.spec_path)?;
        if !path.is_file() {
            return Err(OpenApiError::NotFound(path));
        }

        let content = std::fs::read(&path).map_err(|source| OpenApiError::Read {
            path: path.clone(),
            source,
        })?;

        Ok(OpenApiDoc {
            path,
            content: Bytes::from(content),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }
}

fn resolve_spec_path(spec_path: &str) -> Result<PathBuf, OpenApiError> {
    if !spec_path.is_empty() {
        return Ok(PathBuf::from(spec_path));
    }

    let exe = std::env::current_exe().map_err(OpenApiError::Executable)?;
    Ok(exe
        .parent()
        .map(|dir| dir.join(DEFAULT_SPEC_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SPEC_FILE)))
}

// -- 返回 YAML 格式的接口文档
pub async fn spec_document(Extension(doc): Extension<OpenApiDoc>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/yaml")],
        doc.content.clone(),
    )
}
