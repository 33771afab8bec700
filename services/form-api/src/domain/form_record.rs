/// フォームデータレコードと入力値の検証
///
/// 作成リクエストは`name`と`email`の両方を必須とし、
/// 更新リクエストは指定されたフィールドのみを変更する。
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// フォームデータ入力の検証エラー
///
/// メッセージはそのままクライアントに返却される。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormDataValidationError {
    /// 必須フィールドが存在しない
    #[error("{0} is required")]
    MissingField(&'static str),

    /// フィールドが空文字（空白のみを含む）
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}

/// 永続化されたフォームデータ
///
/// `id`と`created_at`はストアが採番・設定し、以後変更されない。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FormRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// 作成リクエストのボディ
///
/// 欠落フィールドをJSONデシリアライズエラーではなく検証エラーとして
/// 扱うため、全フィールドを`Option`で受け取る。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateFormData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// 検証済みの作成入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFormRecord {
    pub name: String,
    pub email: String,
}

/// 部分更新リクエストのボディ
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateFormData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

fn require(field: &'static str, value: Option<String>) -> Result<String, FormDataValidationError> {
    let value = value.ok_or(FormDataValidationError::MissingField(field))?;
    if value.trim().is_empty() {
        return Err(FormDataValidationError::EmptyField(field));
    }
    Ok(value)
}

impl CreateFormData {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }

    /// 必須フィールドを検証して`NewFormRecord`に変換する
    ///
    /// `name`を先に検証するため、両方欠落している場合は`name`のエラーになる。
    pub fn validate(self) -> Result<NewFormRecord, FormDataValidationError> {
        let name = require("name", self.name)?;
        let email = require("email", self.email)?;
        Ok(NewFormRecord { name, email })
    }
}

impl UpdateFormData {
    /// 変更対象のフィールドが一つもないか
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }

    /// 指定されたフィールドが空でないことを検証する
    pub fn validate(&self) -> Result<(), FormDataValidationError> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err(FormDataValidationError::EmptyField("name"));
        }
        if let Some(email) = &self.email
            && email.trim().is_empty()
        {
            return Err(FormDataValidationError::EmptyField("email"));
        }
        Ok(())
    }
}
