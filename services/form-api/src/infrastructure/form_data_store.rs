//! フォームデータストア
//!
//! - `StorageGateway`: 接続プール（本番はPostgreSQL、ローカル開発とテストはSQLite）
//! - `FormDataStore`: フォームデータに対するCRUD操作
//!
//! 各操作は単一のSQL文として独立にコミットされる。

mod postgres;
mod sqlite;

use chrono::Utc;
use thiserror::Error;
use tracing::debug;

use super::config::DatabaseTarget;
use crate::domain::{CreateFormData, FormDataValidationError, FormRecord, UpdateFormData};

pub use postgres::PostgresGateway;
pub use sqlite::SqliteGateway;

/// ストアエラー
#[derive(Debug, Error)]
pub enum StoreError {
    /// 指定IDのレコードが存在しない
    #[error("レコードが見つかりません: id={0}")]
    NotFound(i64),

    /// 入力値が不正
    #[error("入力値が不正です: {0}")]
    InvalidInput(#[from] FormDataValidationError),

    /// データベースエラー
    #[error("データベースエラー: {0}")]
    Database(String),

    /// プール取得エラー
    #[error("プールエラー: {0}")]
    Pool(String),

    /// 接続構築エラー
    #[error("接続構築エラー: {0}")]
    Build(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<deadpool_sqlite::BuildError> for StoreError {
    fn from(err: deadpool_sqlite::BuildError) -> Self {
        StoreError::Build(err.to_string())
    }
}

impl From<deadpool_sqlite::PoolError> for StoreError {
    fn from(err: deadpool_sqlite::PoolError) -> Self {
        StoreError::Pool(err.to_string())
    }
}

impl From<deadpool_sqlite::InteractError> for StoreError {
    fn from(err: deadpool_sqlite::InteractError) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(err: tokio_postgres::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<deadpool_postgres::CreatePoolError> for StoreError {
    fn from(err: deadpool_postgres::CreatePoolError) -> Self {
        StoreError::Build(err.to_string())
    }
}

impl From<deadpool_postgres::PoolError> for StoreError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        StoreError::Pool(err.to_string())
    }
}

/// 永続ストレージへの接続
///
/// プロセス内で一度だけ開き、以後すべてのストア操作で共有する。
/// 同時実行されるクエリの制御はプールに任せる。
#[derive(Debug)]
pub enum StorageGateway {
    Postgres(PostgresGateway),
    Sqlite(SqliteGateway),
}

impl StorageGateway {
    /// 接続先に応じた接続プールを開く
    pub async fn open(target: DatabaseTarget<'_>, max_size: usize) -> Result<Self, StoreError> {
        match target {
            DatabaseTarget::Postgres(url) => {
                Ok(Self::Postgres(PostgresGateway::open(url, max_size).await?))
            }
            DatabaseTarget::Sqlite(path) => {
                Ok(Self::Sqlite(SqliteGateway::open(path, max_size).await?))
            }
        }
    }

    /// バックエンド名（ログ用）
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Sqlite(_) => "sqlite",
        }
    }
}

/// フォームデータのCRUDストア
#[derive(Debug)]
pub struct FormDataStore {
    gateway: StorageGateway,
}

impl FormDataStore {
    pub fn new(gateway: StorageGateway) -> Self {
        Self { gateway }
    }

    /// 接続文字列から接続を開いてストアを作成
    pub async fn open(database_url: &str, max_size: usize) -> Result<Self, StoreError> {
        let gateway = StorageGateway::open(DatabaseTarget::from_url(database_url), max_size).await?;
        Ok(Self::new(gateway))
    }

    pub fn backend(&self) -> &'static str {
        self.gateway.backend()
    }

    /// レコードを作成
    ///
    /// `name`と`email`はどちらも必須かつ空でないこと。
    ///
    /// # Returns
    /// * `Ok(FormRecord)` - 採番されたIDと作成日時を含むレコード
    /// * `Err(StoreError::InvalidInput)` - 入力値が不正
    pub async fn create(&self, input: CreateFormData) -> Result<FormRecord, StoreError> {
        let new_record = input.validate()?;
        let created_at = Utc::now();

        let record = match &self.gateway {
            StorageGateway::Postgres(gateway) => gateway.insert(new_record, created_at).await?,
            StorageGateway::Sqlite(gateway) => gateway.insert(new_record, created_at).await?,
        };

        debug!(record_id = record.id, "レコードを挿入");
        Ok(record)
    }

    /// 全レコードを作成日時の降順で取得
    ///
    /// 作成日時が同じ場合はIDの降順（後に挿入したものが先）。
    pub async fn list(&self) -> Result<Vec<FormRecord>, StoreError> {
        match &self.gateway {
            StorageGateway::Postgres(gateway) => gateway.list().await,
            StorageGateway::Sqlite(gateway) => gateway.list().await,
        }
    }

    /// IDでレコードを取得
    pub async fn get(&self, id: i64) -> Result<FormRecord, StoreError> {
        match &self.gateway {
            StorageGateway::Postgres(gateway) => gateway.get(id).await,
            StorageGateway::Sqlite(gateway) => gateway.get(id).await,
        }
    }

    /// 指定されたフィールドのみ更新
    ///
    /// 未指定のフィールドは変更しない。変更対象がない場合は現在の値を返す。
    pub async fn update(&self, id: i64, patch: UpdateFormData) -> Result<FormRecord, StoreError> {
        patch.validate()?;
        if patch.is_empty() {
            return self.get(id).await;
        }

        match &self.gateway {
            StorageGateway::Postgres(gateway) => gateway.update(id, patch).await,
            StorageGateway::Sqlite(gateway) => gateway.update(id, patch).await,
        }
    }

    /// レコードを削除し、削除したレコードを返す
    ///
    /// 存在しないIDは`NotFound`。同じIDを2回削除すると2回目は`NotFound`になる。
    pub async fn delete(&self, id: i64) -> Result<FormRecord, StoreError> {
        match &self.gateway {
            StorageGateway::Postgres(gateway) => gateway.delete(id).await,
            StorageGateway::Sqlite(gateway) => gateway.delete(id).await,
        }
    }
}
