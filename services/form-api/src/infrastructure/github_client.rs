// GitHubClient - GitHubユーザー情報取得用HTTPクライアント
//
// 呼び出し元から受け取ったアクセストークンで GET /user を1回だけ呼び出し、
// 正規化したユーザープロファイルを返す。再試行・キャッシュは行わない。

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::domain::UserProfile;

/// GitHub APIに送るクライアント識別子（User-Agent）
pub const USER_AGENT: &str = concat!("form-api/", env!("CARGO_PKG_VERSION"));

/// GitHub REST APIのメディアタイプ
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// リクエストタイムアウト（秒）
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// 接続タイムアウト（秒）
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// ユーザー情報取得のエラー型
///
/// # エラー種別
/// - `Unauthenticated`: GitHubがトークンを拒否した（401）
/// - `Upstream`: それ以外のHTTPエラー、通信エラー、レスポンス解析エラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// トークンが無効
    #[error("GitHubトークンが無効です")]
    Unauthenticated,

    /// 外部API呼び出しの失敗
    #[error("GitHub API呼び出しに失敗: {0}")]
    Upstream(String),
}

/// アクセストークンをユーザープロファイルに交換するトレイト
///
/// 実際のGitHubクライアントとテスト用のスタブを差し替えられるようにする。
#[async_trait]
pub trait UserInfoProvider: Send + Sync {
    /// トークンに対応するユーザー情報を取得
    ///
    /// # 引数
    /// * `token` - `Bearer `/`token `プレフィックスを除去済みのトークン
    async fn get_user_info(&self, token: &str) -> Result<UserProfile, IdentityError>;
}

/// GitHub REST APIクライアント
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// ベースURLを指定してクライアントを作成
    ///
    /// # 引数
    /// * `base_url` - GitHub APIのベースURL（例: "https://api.github.com"）
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// ユーザー情報エンドポイントURLを構築
    fn user_url(&self) -> String {
        format!("{}/user", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl UserInfoProvider for GitHubClient {
    #[instrument(skip(self, token))]
    async fn get_user_info(&self, token: &str) -> Result<UserProfile, IdentityError> {
        let url = self.user_url();
        debug!(url = %url, "GitHubユーザー情報を取得");

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("token {token}"))
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "GitHub APIリクエスト失敗");
                IdentityError::Upstream(e.to_string())
            })?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!(status = %status, "GitHubがトークンを拒否");
            return Err(IdentityError::Unauthenticated);
        }

        if !status.is_success() {
            warn!(status = %status, "GitHub APIエラーレスポンス");
            return Err(IdentityError::Upstream(format!("status={status}")));
        }

        response.json::<UserProfile>().await.map_err(|e| {
            warn!(error = %e, "GitHubレスポンスの解析に失敗");
            IdentityError::Upstream(e.to_string())
        })
    }
}
