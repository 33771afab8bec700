/// アプリケーション設定
///
/// 環境変数からデータベース接続文字列、GitHub APIのベースURL、
/// 静的ファイルディレクトリ、接続プールサイズを読み込む。
use std::path::{Path, PathBuf};

use thiserror::Error;

/// データベース接続文字列を探す環境変数（優先順）
///
/// AWS本番DBの設定がある場合はSupabaseより優先する。
pub const DATABASE_URL_VARS: [&str; 3] =
    ["AWS_DATABASE_URL", "DATABASE_URL", "SUPABASE_DATABASE_URL"];

/// GitHub APIベースURL環境変数名
const GITHUB_API_BASE_URL_ENV: &str = "GITHUB_API_BASE_URL";

/// 静的ファイルディレクトリ環境変数名
const STATIC_ASSETS_DIR_ENV: &str = "STATIC_ASSETS_DIR";

/// 接続プールサイズ環境変数名
const DB_POOL_MAX_SIZE_ENV: &str = "DB_POOL_MAX_SIZE";

const DEFAULT_GITHUB_API_BASE_URL: &str = "https://api.github.com";
const DEFAULT_STATIC_ASSETS_DIR: &str = "public";
const DEFAULT_DB_POOL_MAX_SIZE: usize = 4;

/// 設定読み込みエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// どの接続文字列環境変数も設定されていない
    #[error(
        "データベース接続文字列が設定されていません: AWS_DATABASE_URL / DATABASE_URL / SUPABASE_DATABASE_URL のいずれかを設定してください"
    )]
    MissingDatabaseUrl,
}

/// 接続先データベース
///
/// `postgres://`・`postgresql://`で始まる接続文字列はPostgreSQL、
/// それ以外はSQLiteのファイルパスとして扱う。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseTarget<'a> {
    /// PostgreSQL接続URL（そのままドライバに渡す）
    Postgres(&'a str),
    /// SQLiteファイルパス（`sqlite://`、`sqlite:`、`file:`は除去済み）
    Sqlite(&'a str),
}

impl<'a> DatabaseTarget<'a> {
    /// 接続文字列から接続先を判定
    pub fn from_url(url: &'a str) -> Self {
        let url = url.trim();
        let scheme = url
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_lowercase());
        if matches!(scheme.as_deref(), Some("postgres" | "postgresql")) {
            return DatabaseTarget::Postgres(url);
        }

        let path = ["sqlite://", "sqlite:", "file:"]
            .iter()
            .find_map(|scheme| url.strip_prefix(scheme))
            .unwrap_or(url);
        DatabaseTarget::Sqlite(path)
    }
}

/// アプリケーション設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    database_url: String,
    github_api_base_url: String,
    static_assets_dir: PathBuf,
    db_pool_max_size: usize,
}

/// 接続文字列を優先順に解決する
///
/// 空文字の変数は未設定として扱う。
pub fn resolve_database_url(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    DATABASE_URL_VARS
        .iter()
        .filter_map(|var| lookup(var))
        .find(|value| !value.trim().is_empty())
}

impl AppConfig {
    /// 接続文字列のみを指定し、残りをデフォルト値で作成
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            github_api_base_url: DEFAULT_GITHUB_API_BASE_URL.to_string(),
            static_assets_dir: PathBuf::from(DEFAULT_STATIC_ASSETS_DIR),
            db_pool_max_size: DEFAULT_DB_POOL_MAX_SIZE,
        }
    }

    /// 環境変数から設定を読み込み
    ///
    /// # 環境変数
    /// - `AWS_DATABASE_URL` / `DATABASE_URL` / `SUPABASE_DATABASE_URL`: 接続文字列（いずれか必須）
    /// - `GITHUB_API_BASE_URL`: GitHub APIのベースURL（デフォルト: https://api.github.com）
    /// - `STATIC_ASSETS_DIR`: 静的ファイルディレクトリ（デフォルト: public）
    /// - `DB_POOL_MAX_SIZE`: 接続プールの最大接続数（デフォルト: 4）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の値取得関数から設定を読み込み
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url =
            resolve_database_url(&lookup).ok_or(ConfigError::MissingDatabaseUrl)?;

        let github_api_base_url = lookup(GITHUB_API_BASE_URL_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GITHUB_API_BASE_URL.to_string());

        let static_assets_dir = lookup(STATIC_ASSETS_DIR_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_ASSETS_DIR));

        // 不正値・0はデフォルトにフォールバック
        let db_pool_max_size = lookup(DB_POOL_MAX_SIZE_ENV)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_DB_POOL_MAX_SIZE);

        Ok(Self {
            database_url,
            github_api_base_url,
            static_assets_dir,
            db_pool_max_size,
        })
    }

    pub fn with_github_api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.github_api_base_url = base_url.into();
        self
    }

    pub fn with_static_assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_assets_dir = dir.into();
        self
    }

    /// 接続文字列（設定値そのまま）
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// 接続先データベース
    pub fn database_target(&self) -> DatabaseTarget<'_> {
        DatabaseTarget::from_url(&self.database_url)
    }

    pub fn github_api_base_url(&self) -> &str {
        &self.github_api_base_url
    }

    pub fn static_assets_dir(&self) -> &Path {
        &self.static_assets_dir
    }

    pub fn db_pool_max_size(&self) -> usize {
        self.db_pool_max_size
    }
}
