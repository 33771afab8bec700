/// GitHubユーザープロファイル
///
/// `GET /user`のレスポンスから必要なフィールドだけを取り出した正規化済みの値。
/// 取得のたびに外部APIから読み出し、キャッシュも永続化もしない。
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: u64,
    pub login: String,
    /// 表示名（未設定の場合はnull）
    #[serde(default)]
    pub name: Option<String>,
    /// 公開メールアドレス（非公開の場合はnull）
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub public_repos: u32,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
    pub created_at: DateTime<Utc>,
}
