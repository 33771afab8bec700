// テスト用のスタブとヘルパー

use async_trait::async_trait;
use serde_json::json;
use tempfile::TempDir;

use crate::domain::UserProfile;
use crate::infrastructure::{FormDataStore, IdentityError, UserInfoProvider};

/// 固定の応答を返すユーザー情報プロバイダー
///
/// `accepted`と一致するトークンにはプロファイルを返し、それ以外は`Unauthenticated`。
/// `failure`が設定されている場合は常にそのエラーを返す。
pub struct StaticIdentity {
    accepted: String,
    failure: Option<IdentityError>,
}

impl StaticIdentity {
    pub fn accepting(token: &str) -> Self {
        Self {
            accepted: token.to_string(),
            failure: None,
        }
    }

    pub fn failing(error: IdentityError) -> Self {
        Self {
            accepted: String::new(),
            failure: Some(error),
        }
    }

    pub fn profile() -> UserProfile {
        serde_json::from_value(json!({
            "id": 1,
            "login": "octocat",
            "name": "The Octocat",
            "email": null,
            "avatar_url": "https://example.com/octocat.png",
            "bio": null,
            "public_repos": 3,
            "followers": 5,
            "following": 0,
            "created_at": "2011-01-25T18:44:36Z"
        }))
        .unwrap()
    }
}

#[async_trait]
impl UserInfoProvider for StaticIdentity {
    async fn get_user_info(&self, token: &str) -> Result<UserProfile, IdentityError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        if token == self.accepted {
            Ok(Self::profile())
        } else {
            Err(IdentityError::Unauthenticated)
        }
    }
}

/// 一時ディレクトリにSQLiteストアを作成
///
/// 返した`TempDir`がドロップされるとファイルも削除される。
pub async fn temp_store() -> (FormDataStore, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    let store = FormDataStore::open(path.to_str().unwrap(), 2).await.unwrap();
    (store, dir)
}
