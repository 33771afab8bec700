// InvocationAdapter - Lambda呼び出しとルーターの橋渡し
//
// コールドスタート時にアプリケーションを一度だけ構築してキャッシュし、
// 各呼び出しのAPI Gatewayイベントを汎用HTTPリクエストに変換してルーターへ渡す。

use std::future::Future;
use std::pin::Pin;

use axum::body::Bytes;
use axum::http::{Request, Response, Uri};
use lambda_http::request::RequestContext;
use lambda_http::{Body, RequestExt};
use tokio::sync::OnceCell;
use tower::ServiceExt;
use tracing::{debug, error, info};

use crate::application::{App, BootstrapError, build_from_env};

type BuildFuture = Pin<Box<dyn Future<Output = Result<App, BootstrapError>> + Send>>;
type Builder = Box<dyn Fn() -> BuildFuture + Send + Sync>;

/// Lambda呼び出しアダプター
///
/// 構築済みアプリケーションは`OnceCell`で保持する。
/// 同時に来たコールドスタートの呼び出しは進行中の1回の構築を待ち合わせる。
/// 構築に失敗した場合はキャッシュせず、次の呼び出しで再度構築する。
pub struct InvocationAdapter {
    app: OnceCell<App>,
    build: Builder,
}

impl std::fmt::Debug for InvocationAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationAdapter")
            .field("warm", &self.is_warm())
            .finish_non_exhaustive()
    }
}

impl InvocationAdapter {
    /// 構築処理を指定してアダプターを作成
    ///
    /// # Arguments
    /// * `build` - アプリケーションを構築する非同期関数（コールドスタート時のみ呼ばれる）
    pub fn new<F, Fut>(build: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<App, BootstrapError>> + Send + 'static,
    {
        Self {
            app: OnceCell::new(),
            build: Box::new(move || Box::pin(build())),
        }
    }

    /// 環境変数から構築するアダプターを作成
    pub fn from_env() -> Self {
        Self::new(build_from_env)
    }

    /// 構築済みアプリケーションを保持しているか
    pub fn is_warm(&self) -> bool {
        self.app.initialized()
    }

    /// アプリケーションを取得（未構築なら構築）
    pub async fn app(&self) -> Result<&App, BootstrapError> {
        if self.is_warm() {
            debug!("ウォームスタート: 構築済みアプリケーションを再利用");
        }

        self.app
            .get_or_try_init(|| {
                info!("コールドスタート: アプリケーションを構築");
                (self.build)()
            })
            .await
            .inspect_err(|e| error!(error = %e, "アプリケーションの構築に失敗"))
    }

    /// Lambda呼び出しを処理する
    ///
    /// 構築に失敗した場合はHTTPレスポンスではなくエラーをランタイムに返す。
    pub async fn handle(&self, event: lambda_http::Request) -> Result<Response<Body>, lambda_http::Error> {
        let app = self.app().await?;

        let request = into_router_request(event)?;
        debug!(method = %request.method(), path = %request.uri().path(), "リクエストを受信");

        let response = app.router().oneshot(request).await?;
        debug!(status = %response.status(), "レスポンスを返却");

        into_lambda_response(response).await
    }
}

/// Lambdaイベントをルーター用のリクエストに変換
///
/// メソッド・パスとクエリ・ヘッダー・ボディを引き継ぐ。
/// パスはAPI Gatewayが受け取った生のパスからステージ名を除いたものを使い、
/// URIはスキームとホストを除いた形式にする。
fn into_router_request(
    event: lambda_http::Request,
) -> Result<Request<axum::body::Body>, lambda_http::Error> {
    let raw_path = event.raw_http_path().to_string();
    let stage = request_stage(&event);
    let (mut parts, body) = event.into_parts();

    // lambda_httpのURIパスにはステージ名が付与されている
    let path = if raw_path.is_empty() {
        parts.uri.path()
    } else {
        raw_path.as_str()
    };
    let path = strip_stage(path, stage.as_deref());

    let path_and_query = match parts.uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };
    parts.uri = Uri::try_from(path_and_query)?;

    let body = match body {
        Body::Empty => axum::body::Body::empty(),
        Body::Text(text) => axum::body::Body::from(text),
        Body::Binary(bytes) => axum::body::Body::from(bytes),
    };

    Ok(Request::from_parts(parts, body))
}

/// イベントのステージ名（REST API / HTTP API）
fn request_stage(event: &lambda_http::Request) -> Option<String> {
    match event.request_context_ref()? {
        RequestContext::ApiGatewayV1(context) => context.stage.clone(),
        RequestContext::ApiGatewayV2(context) => context.stage.clone(),
        _ => None,
    }
}

/// パス先頭の`/{stage}`を取り除く
///
/// `$default`ステージはパスに現れないため何もしない。
fn strip_stage<'a>(path: &'a str, stage: Option<&str>) -> &'a str {
    let Some(stage) = stage.filter(|s| !s.is_empty() && *s != "$default") else {
        return path;
    };

    match path
        .strip_prefix('/')
        .and_then(|rest| rest.strip_prefix(stage))
    {
        Some("") => "/",
        Some(rest) if rest.starts_with('/') => rest,
        _ => path,
    }
}

/// ルーターのレスポンスをLambdaレスポンスに変換
///
/// 空のボディは`Body::Empty`、UTF-8として読めるボディは`Body::Text`、
/// それ以外は`Body::Binary`にする。
async fn into_lambda_response(
    response: Response<axum::body::Body>,
) -> Result<Response<Body>, lambda_http::Error> {
    let (parts, body) = response.into_parts();
    let bytes: Bytes = axum::body::to_bytes(body, usize::MAX).await?;

    let body = if bytes.is_empty() {
        Body::Empty
    } else {
        match String::from_utf8(bytes.to_vec()) {
            Ok(text) => Body::Text(text),
            Err(e) => Body::Binary(e.into_bytes()),
        }
    };

    Ok(Response::from_parts(parts, body))
}
