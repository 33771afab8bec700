// SQLiteバックエンド
//
// ローカル開発とテスト用。deadpool-sqliteの接続プールでrusqliteの同期処理を
// ブロッキングスレッドに逃がして実行する。

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use deadpool_sqlite::{Config, Pool, Runtime};
use rusqlite::{Connection, OptionalExtension, Row, types::Type};
use tracing::info;

use super::StoreError;
use crate::domain::{FormRecord, NewFormRecord, UpdateFormData};

/// `form_data`テーブルを用意するSQL
const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode=WAL;
PRAGMA synchronous=NORMAL;

CREATE TABLE IF NOT EXISTS form_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,  -- 削除済みIDは再利用しない
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    created_at TEXT NOT NULL               -- RFC 3339 (UTC, マイクロ秒固定)
);

CREATE INDEX IF NOT EXISTS idx_form_data_created_at ON form_data(created_at DESC);
"#;

const RECORD_COLUMNS: &str = "id, name, email, created_at";

/// SQLite接続プール
pub struct SqliteGateway {
    pool: Pool,
}

impl std::fmt::Debug for SqliteGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteGateway")
            .field("status", &self.pool.status())
            .finish()
    }
}

impl SqliteGateway {
    /// 接続プールを作成し、最初の接続でスキーマを用意する
    ///
    /// # Arguments
    /// * `db_path` - データベースファイルのパス
    /// * `max_size` - プールの最大接続数
    pub async fn open(db_path: &str, max_size: usize) -> Result<Self, StoreError> {
        let pool = Config::new(db_path)
            .builder(Runtime::Tokio1)
            .map_err(|e| StoreError::Build(e.to_string()))?
            .max_size(max_size)
            .build()?;

        let conn = pool.get().await?;
        conn.interact(|conn| conn.execute_batch(SCHEMA_SQL)).await??;

        info!(backend = "sqlite", max_size, "ストレージ接続を確立");

        Ok(Self { pool })
    }

    /// プールから接続を取得してクロージャを実行する
    pub async fn interact<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<R, StoreError> + Send + 'static,
        R: Send + 'static,
    {
        let conn = self.pool.get().await?;
        conn.interact(f).await?
    }

    pub async fn insert(
        &self,
        record: NewFormRecord,
        created_at: DateTime<Utc>,
    ) -> Result<FormRecord, StoreError> {
        let NewFormRecord { name, email } = record;
        let created_at = format_timestamp(&created_at.trunc_subsecs(6));

        self.interact(move |conn| {
            let sql = format!(
                "INSERT INTO form_data (name, email, created_at) VALUES (?1, ?2, ?3) RETURNING {RECORD_COLUMNS}"
            );
            Ok(conn.query_row(
                &sql,
                rusqlite::params![name, email, created_at],
                row_to_record,
            )?)
        })
        .await
    }

    /// 作成日時の降順（同時刻はIDの降順）
    pub async fn list(&self) -> Result<Vec<FormRecord>, StoreError> {
        self.interact(|conn| {
            let sql = format!(
                "SELECT {RECORD_COLUMNS} FROM form_data ORDER BY created_at DESC, id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let records = stmt
                .query_map([], row_to_record)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
    }

    pub async fn get(&self, id: i64) -> Result<FormRecord, StoreError> {
        self.interact(move |conn| {
            let sql = format!("SELECT {RECORD_COLUMNS} FROM form_data WHERE id = ?1");
            conn.query_row(&sql, [id], row_to_record)
                .optional()?
                .ok_or(StoreError::NotFound(id))
        })
        .await
    }

    /// 指定されたフィールドのみ更新（`None`のフィールドは現在値を維持）
    pub async fn update(&self, id: i64, patch: UpdateFormData) -> Result<FormRecord, StoreError> {
        self.interact(move |conn| {
            let sql = format!(
                "UPDATE form_data SET name = COALESCE(?2, name), email = COALESCE(?3, email) WHERE id = ?1 RETURNING {RECORD_COLUMNS}"
            );
            conn.query_row(
                &sql,
                rusqlite::params![id, patch.name, patch.email],
                row_to_record,
            )
            .optional()?
            .ok_or(StoreError::NotFound(id))
        })
        .await
    }

    pub async fn delete(&self, id: i64) -> Result<FormRecord, StoreError> {
        self.interact(move |conn| {
            let sql = format!("DELETE FROM form_data WHERE id = ?1 RETURNING {RECORD_COLUMNS}");
            conn.query_row(&sql, [id], row_to_record)
                .optional()?
                .ok_or(StoreError::NotFound(id))
        })
        .await
    }
}

/// 文字列比較で時刻順に並ぶよう桁数を固定する
fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<FormRecord> {
    let created_at: String = row.get(3)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);

    Ok(FormRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        created_at,
    })
}
