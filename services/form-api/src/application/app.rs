// アプリケーションの組み立て
//
// 設定 → StorageGateway → FormDataStore + GitHubClient → Router の順に
// オブジェクトグラフを構築する。構築はプロセスごとに一度だけ行い、
// 以後の呼び出しで使い回す。

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tracing::info;

use super::router::{AppState, create_router};
use crate::infrastructure::{
    AppConfig, ConfigError, FormDataStore, GitHubClient, StorageGateway, StoreError,
    UserInfoProvider,
};

/// アプリケーション構築エラー
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// 設定の読み込みに失敗
    #[error("設定エラー: {0}")]
    Config(#[from] ConfigError),

    /// ストレージ接続の確立に失敗
    #[error("ストレージ初期化エラー: {0}")]
    Storage(#[from] StoreError),

    /// HTTPクライアントの構築に失敗
    #[error("HTTPクライアント初期化エラー: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// 構築済みのアプリケーション
///
/// ルーターはストレージ接続プールとGitHubクライアントを共有状態として保持する。
#[derive(Clone)]
pub struct App {
    router: Router,
}

impl App {
    /// 設定からアプリケーションを構築
    pub async fn build(config: &AppConfig) -> Result<Self, BootstrapError> {
        let gateway =
            StorageGateway::open(config.database_target(), config.db_pool_max_size()).await?;
        let store = FormDataStore::new(gateway);
        let github = GitHubClient::new(config.github_api_base_url())?;

        info!(
            backend = store.backend(),
            github_api_base_url = config.github_api_base_url(),
            static_assets_dir = %config.static_assets_dir().display(),
            "アプリケーションを構築"
        );

        Ok(Self::from_parts(
            store,
            Arc::new(github),
            Some(config.static_assets_dir()),
        ))
    }

    /// 構築済みの部品からアプリケーションを作成
    pub fn from_parts(
        store: FormDataStore,
        identity: Arc<dyn UserInfoProvider>,
        static_dir: Option<&Path>,
    ) -> Self {
        let state = AppState {
            store: Arc::new(store),
            identity,
        };
        Self {
            router: create_router(state, static_dir),
        }
    }

    /// ルーターを取得（共有状態はArcで共有される）
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// 環境変数から設定を読み込んでアプリケーションを構築
pub async fn build_from_env() -> Result<App, BootstrapError> {
    let config = AppConfig::from_env()?;
    App::build(&config).await
}
