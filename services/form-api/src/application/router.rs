// HTTPルーター
//
// `/api`配下に form-data と github/user の2つの機能をまとめる。
// ルーターは汎用のHTTPリクエストのみを扱い、Lambdaイベントの形式には依存しない。

use std::path::Path;
use std::sync::Arc;

use axum::{Router, handler::HandlerWithoutStateExt, http::Uri, routing::get};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use super::error::ApiError;
use super::form_data_handler::{
    create_form_data, delete_form_data, get_form_data, list_form_data, update_form_data,
};
use super::github_handler::get_github_user;
use crate::infrastructure::{FormDataStore, UserInfoProvider};

/// APIのパスプレフィックス
pub const API_PREFIX: &str = "/api";

/// ルーター全体で共有される状態
#[derive(Clone)]
pub struct AppState {
    /// フォームデータストア（プロセス内で1つの接続プールを共有）
    pub store: Arc<FormDataStore>,
    /// GitHubユーザー情報プロバイダー
    pub identity: Arc<dyn UserInfoProvider>,
}

/// 未定義パスへのフォールバック
async fn api_not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Cannot resolve {}", uri.path()))
}

/// `/api`配下のルートを定義
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/form-data", get(list_form_data).post(create_form_data))
        .route(
            "/form-data/{id}",
            get(get_form_data)
                .patch(update_form_data)
                .delete(delete_form_data),
        )
        .route("/github/user", get(get_github_user))
        .fallback(api_not_found)
}

/// ルーターを構築する
///
/// `/api`以外のパスは`static_dir`の静的ファイル配信にフォールバックする。
/// 該当ファイルがない場合と`static_dir`が`None`の場合はJSONの404。
/// CORSは全オリジンを許可し、TraceLayerでリクエストを記録する。
///
/// # Arguments
/// * `state` - 共有状態
/// * `static_dir` - 静的ファイルディレクトリ
pub fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let router = Router::new().nest(API_PREFIX, api_routes().with_state(state));

    let router = match static_dir {
        Some(dir) => router.fallback_service(
            ServeDir::new(dir).not_found_service(api_not_found.into_service()),
        ),
        None => router.fallback(api_not_found),
    };

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserProfile;
    use crate::infrastructure::IdentityError;
    use crate::test_support::{StaticIdentity, temp_store};
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
        response::Response,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn create_test_router() -> (Router, tempfile::TempDir) {
        let (store, dir) = temp_store().await;
        let state = AppState {
            store: Arc::new(store),
            identity: Arc::new(StaticIdentity::accepting("good-token")),
        };
        (create_router(state, None), dir)
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    // ========================================
    // POST /api/form-data
    // ========================================

    #[tokio::test]
    async fn test_post_form_data_returns_201_with_record() {
        let (app, _dir) = create_test_router().await;

        let response = send(
            &app,
            json_request("POST", "/api/form-data", json!({"name": "Ann", "email": "a@x.com"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["name"], "Ann");
        assert_eq!(body["email"], "a@x.com");
        assert!(body["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_post_form_data_missing_field_returns_400() {
        let (app, _dir) = create_test_router().await;

        let response = send(
            &app,
            json_request("POST", "/api/form-data", json!({"name": "Ann"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["message"], "email is required");
    }

    #[tokio::test]
    async fn test_post_form_data_empty_field_returns_400() {
        let (app, _dir) = create_test_router().await;

        let response = send(
            &app,
            json_request("POST", "/api/form-data", json!({"name": "", "email": "a@x.com"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_form_data_invalid_json_returns_400() {
        let (app, _dir) = create_test_router().await;

        let request = Request::builder()
            .method("POST")
            .uri("/api/form-data")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ invalid json }"))
            .unwrap();
        let response = send(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_post_form_data_wrong_types_returns_400() {
        let (app, _dir) = create_test_router().await;

        let response = send(
            &app,
            json_request("POST", "/api/form-data", json!({"name": 1, "email": true})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // ========================================
    // GET /api/form-data
    // ========================================

    #[tokio::test]
    async fn test_list_returns_newest_first() {
        let (app, _dir) = create_test_router().await;
        send(
            &app,
            json_request("POST", "/api/form-data", json!({"name": "A", "email": "a@x.com"})),
        )
        .await;
        send(
            &app,
            json_request("POST", "/api/form-data", json!({"name": "B", "email": "b@x.com"})),
        )
        .await;

        let response = send(&app, empty_request("GET", "/api/form-data")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[tokio::test]
    async fn test_list_empty_returns_empty_array() {
        let (app, _dir) = create_test_router().await;

        let response = send(&app, empty_request("GET", "/api/form-data")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    // ========================================
    // /api/form-data/{id}
    // ========================================

    #[tokio::test]
    async fn test_get_non_integer_id_returns_400() {
        let (app, _dir) = create_test_router().await;

        let response = send(&app, empty_request("GET", "/api/form-data/abc")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    /// パーセントエンコードされた空白付きのIDは受け付けない
    #[tokio::test]
    async fn test_get_whitespace_padded_id_returns_400() {
        let (app, _dir) = create_test_router().await;
        send(
            &app,
            json_request(
                "POST",
                "/api/form-data",
                json!({"name": "Ann", "email": "a@x.com"}),
            ),
        )
        .await;

        for uri in ["/api/form-data/%201", "/api/form-data/1%20"] {
            let response = send(&app, empty_request("GET", uri)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri={uri}");
            assert_eq!(body_json(response).await["error"], "bad_request");
        }
    }

    #[tokio::test]
    async fn test_get_missing_id_returns_404() {
        let (app, _dir) = create_test_router().await;

        let response = send(&app, empty_request("GET", "/api/form-data/99")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "Form data 99 not found");
    }

    #[tokio::test]
    async fn test_patch_missing_id_returns_404() {
        let (app, _dir) = create_test_router().await;

        let response = send(
            &app,
            json_request("PATCH", "/api/form-data/5", json!({"name": "X"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_patch_non_integer_id_returns_400() {
        let (app, _dir) = create_test_router().await;

        let response = send(
            &app,
            json_request("PATCH", "/api/form-data/x1", json!({"name": "X"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_twice_second_returns_404() {
        let (app, _dir) = create_test_router().await;
        send(
            &app,
            json_request("POST", "/api/form-data", json!({"name": "Ann", "email": "a@x.com"})),
        )
        .await;

        let first = send(&app, empty_request("DELETE", "/api/form-data/1")).await;
        let second = send(&app, empty_request("DELETE", "/api/form-data/1")).await;

        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(second.status(), StatusCode::NOT_FOUND);
    }

    /// POST → GET → PATCH → DELETE → GET の一連の流れ
    #[tokio::test]
    async fn test_crud_scenario() {
        let (app, _dir) = create_test_router().await;

        let created = send(
            &app,
            json_request("POST", "/api/form-data", json!({"name": "Ann", "email": "a@x.com"})),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let created = body_json(created).await;
        assert_eq!(created["id"], 1);

        let fetched = send(&app, empty_request("GET", "/api/form-data/1")).await;
        assert_eq!(fetched.status(), StatusCode::OK);
        assert_eq!(body_json(fetched).await, created);

        let patched = send(
            &app,
            json_request("PATCH", "/api/form-data/1", json!({"email": "b@x.com"})),
        )
        .await;
        assert_eq!(patched.status(), StatusCode::OK);
        let patched = body_json(patched).await;
        assert_eq!(patched["id"], 1);
        assert_eq!(patched["name"], "Ann");
        assert_eq!(patched["email"], "b@x.com");
        assert_eq!(patched["createdAt"], created["createdAt"]);

        let deleted = send(&app, empty_request("DELETE", "/api/form-data/1")).await;
        assert_eq!(deleted.status(), StatusCode::OK);

        let gone = send(&app, empty_request("GET", "/api/form-data/1")).await;
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    }

    // ========================================
    // GET /api/github/user
    // ========================================

    fn github_request(authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri("/api/github/user");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_github_user_without_header_returns_400() {
        let (app, _dir) = create_test_router().await;

        let response = send(&app, github_request(None)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["message"],
            "Authorization header is required"
        );
    }

    #[tokio::test]
    async fn test_github_user_with_empty_token_returns_400() {
        let (app, _dir) = create_test_router().await;

        let response = send(&app, github_request(Some("Bearer "))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "GitHub token is required");
    }

    #[tokio::test]
    async fn test_github_user_returns_profile() {
        let (app, _dir) = create_test_router().await;

        let response = send(&app, github_request(Some("Bearer good-token"))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["login"], "octocat");
        assert_eq!(body["public_repos"], 3);
    }

    #[tokio::test]
    async fn test_github_user_accepts_token_prefix() {
        let (app, _dir) = create_test_router().await;

        let response = send(&app, github_request(Some("token good-token"))).await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_github_user_invalid_token_returns_401() {
        let (app, _dir) = create_test_router().await;

        let response = send(&app, github_request(Some("Bearer bad-token"))).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Invalid GitHub token");
    }

    #[tokio::test]
    async fn test_github_user_upstream_failure_returns_500() {
        let (store, _dir) = temp_store().await;
        let state = AppState {
            store: Arc::new(store),
            identity: Arc::new(StaticIdentity::failing(IdentityError::Upstream(
                "connection refused".to_string(),
            ))),
        };
        let app = create_router(state, None);

        let response = send(&app, github_request(Some("Bearer good-token"))).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Failed to fetch GitHub user information");
        assert!(!body.to_string().contains("connection refused"));
    }

    // ========================================
    // ルーティング全般
    // ========================================

    #[tokio::test]
    async fn test_unknown_api_path_returns_404() {
        let (app, _dir) = create_test_router().await;

        let response = send(&app, empty_request("GET", "/api/unknown")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "not_found");
    }

    #[tokio::test]
    async fn test_unprefixed_path_returns_404() {
        let (app, _dir) = create_test_router().await;

        let response = send(&app, empty_request("GET", "/form-data")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unsupported_method_returns_405() {
        let (app, _dir) = create_test_router().await;

        let response = send(&app, empty_request("PUT", "/api/form-data/1")).await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_cors_header_present() {
        let (app, _dir) = create_test_router().await;

        let request = Request::builder()
            .method("GET")
            .uri("/api/form-data")
            .header(header::ORIGIN, "https://example.com")
            .body(Body::empty())
            .unwrap();
        let response = send(&app, request).await;

        assert!(
            response
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
    }

    #[tokio::test]
    async fn test_static_assets_served_outside_api() {
        let (store, _db_dir) = temp_store().await;
        let static_dir = tempfile::tempdir().unwrap();
        std::fs::write(static_dir.path().join("index.html"), "<h1>form</h1>").unwrap();

        let state = AppState {
            store: Arc::new(store),
            identity: Arc::new(StaticIdentity::accepting("good-token")),
        };
        let app = create_router(state, Some(static_dir.path()));

        let response = send(&app, empty_request("GET", "/index.html")).await;
        assert_eq!(response.status(), StatusCode::OK);

        // API側の未定義パスは静的ファイルにフォールバックしない
        let response = send(&app, empty_request("GET", "/api/index.html")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    /// 静的ディレクトリにないファイルはJSONの404
    #[tokio::test]
    async fn test_missing_static_asset_returns_json_404() {
        let (store, _db_dir) = temp_store().await;
        let static_dir = tempfile::tempdir().unwrap();

        let state = AppState {
            store: Arc::new(store),
            identity: Arc::new(StaticIdentity::accepting("good-token")),
        };
        let app = create_router(state, Some(static_dir.path()));

        let response = send(&app, empty_request("GET", "/missing.html")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["statusCode"], 404);
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "Cannot resolve /missing.html");
    }

    /// スタブのプロファイルはGitHubの形式から読み込める
    #[test]
    fn test_static_identity_profile_shape() {
        let profile: UserProfile = StaticIdentity::profile();
        assert_eq!(profile.login, "octocat");
    }
}
