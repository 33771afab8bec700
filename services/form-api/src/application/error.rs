//! APIエラーハンドリング
//!
//! ストア・GitHubクライアントの失敗を固定のステータスコードと
//! 最小限のメッセージに変換する。内部エラーの詳細はログにのみ出力し、
//! レスポンスには含めない。

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::infrastructure::{IdentityError, StoreError};

/// APIエラーレスポンスのボディ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    /// HTTPステータスコード
    pub status_code: u16,
    /// エラー種別（例: "bad_request", "unauthorized", "not_found", "internal_error"）
    pub error: String,
    /// 詳細なエラーメッセージ
    pub message: String,
}

/// APIエラー
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody {
                status_code: status.as_u16(),
                error: error.into(),
                message: message.into(),
            },
        }
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    /// 401 Unauthorized
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    /// 404 Not Found
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    /// 500 Internal Server Error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }

    pub fn error(&self) -> &str {
        &self.body.error
    }

    pub fn message(&self) -> &str {
        &self.body.message
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::NotFound(id) => ApiError::not_found(format!("Form data {id} not found")),
            StoreError::InvalidInput(reason) => ApiError::bad_request(reason.to_string()),
            StoreError::Database(_) | StoreError::Pool(_) | StoreError::Build(_) => {
                tracing::error!(error = %err, "ストレージエラー");
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match &err {
            IdentityError::Unauthenticated => ApiError::unauthorized("Invalid GitHub token"),
            IdentityError::Upstream(_) => {
                tracing::error!(error = %err, "GitHubユーザー情報の取得に失敗");
                ApiError::internal_error("Failed to fetch GitHub user information")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "リクエストボディの解析に失敗");
        ApiError::bad_request("Request body must be a valid JSON object")
    }
}
