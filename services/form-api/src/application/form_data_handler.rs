// フォームデータCRUDハンドラー
//
// パスのIDを整数として検証し、FormDataStoreの結果をJSONで返す。
// ログにはレコードIDのみを出力し、名前やメールアドレスは出力しない。

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::info;

use super::error::ApiError;
use super::router::AppState;
use crate::domain::{CreateFormData, FormRecord, UpdateFormData};

/// パスパラメータをレコードIDに変換
///
/// 整数として解釈できない値は400。前後の空白も許容しない。
pub fn parse_record_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::bad_request("Validation failed (numeric string is expected)"))
}

/// POST /form-data
///
/// # Returns
/// - 201 Created: 作成したレコード
/// - 400 Bad Request: ボディが不正、または必須フィールドが欠落
pub async fn create_form_data(
    State(state): State<AppState>,
    payload: Result<Json<CreateFormData>, JsonRejection>,
) -> Result<(StatusCode, Json<FormRecord>), ApiError> {
    let Json(input) = payload?;
    let record = state.store.create(input).await?;

    info!(record_id = record.id, "フォームデータを作成");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /form-data
///
/// 作成日時の降順で全件を返す。
pub async fn list_form_data(
    State(state): State<AppState>,
) -> Result<Json<Vec<FormRecord>>, ApiError> {
    let records = state.store.list().await?;

    info!(count = records.len(), "フォームデータ一覧を返却");
    Ok(Json(records))
}

/// GET /form-data/{id}
pub async fn get_form_data(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<FormRecord>, ApiError> {
    let id = parse_record_id(&raw_id)?;
    let record = state.store.get(id).await?;
    Ok(Json(record))
}

/// PATCH /form-data/{id}
///
/// 指定されたフィールドのみ更新する。
pub async fn update_form_data(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpdateFormData>, JsonRejection>,
) -> Result<Json<FormRecord>, ApiError> {
    let id = parse_record_id(&raw_id)?;
    let Json(patch) = payload?;
    let record = state.store.update(id, patch).await?;

    info!(record_id = id, "フォームデータを更新");
    Ok(Json(record))
}

/// DELETE /form-data/{id}
///
/// 削除したレコードを返す。既に削除済みのIDは404。
pub async fn delete_form_data(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<FormRecord>, ApiError> {
    let id = parse_record_id(&raw_id)?;
    let record = state.store.delete(id).await?;

    info!(record_id = id, "フォームデータを削除");
    Ok(Json(record))
}
