// GitHubユーザー情報プロキシハンドラー
//
// Authorizationヘッダーからトークンを取り出してUserInfoProviderに渡す。
// トークンとプロファイルはログに出力しない。

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header::AUTHORIZATION},
};

use super::error::ApiError;
use super::router::AppState;
use crate::domain::UserProfile;

/// Authorizationヘッダー値からトークンを取り出す
///
/// `Bearer <token>`、`token <token>`、`<token>`の形式を受け付ける。
/// スキームの大文字小文字は区別しない。トークンが空の場合は`None`。
pub fn extract_token(header: &str) -> Option<&str> {
    let header = header.trim();
    let token = match header.split_once(char::is_whitespace) {
        Some((scheme, rest))
            if scheme.eq_ignore_ascii_case("bearer") || scheme.eq_ignore_ascii_case("token") =>
        {
            rest.trim()
        }
        None if header.eq_ignore_ascii_case("bearer") || header.eq_ignore_ascii_case("token") => {
            ""
        }
        _ => header,
    };

    (!token.is_empty()).then_some(token)
}

/// GET /github/user
///
/// # Returns
/// - 200 OK: 正規化したユーザープロファイル
/// - 400 Bad Request: Authorizationヘッダーまたはトークンがない
/// - 401 Unauthorized: GitHubがトークンを拒否
/// - 500 Internal Server Error: GitHub API呼び出しの失敗
pub async fn get_github_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Authorization header is required"))?;

    let token =
        extract_token(header).ok_or_else(|| ApiError::bad_request("GitHub token is required"))?;

    let profile = state.identity.get_user_info(token).await?;
    Ok(Json(profile))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token_strips_bearer_prefix() {
        assert_eq!(extract_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_token("bearer abc123"), Some("abc123"));
    }

    #[test]
    fn test_extract_token_strips_token_prefix() {
        assert_eq!(extract_token("token abc123"), Some("abc123"));
        assert_eq!(extract_token("Token   abc123 "), Some("abc123"));
    }

    #[test]
    fn test_extract_token_accepts_raw_token() {
        assert_eq!(extract_token("gho_abc123"), Some("gho_abc123"));
    }

    #[test]
    fn test_extract_token_empty_after_prefix() {
        assert_eq!(extract_token("Bearer "), None);
        assert_eq!(extract_token("Bearer"), None);
        assert_eq!(extract_token("token"), None);
        assert_eq!(extract_token("   "), None);
    }
}
