//! フォームAPI Lambdaエントリポイント
//!
//! API Gatewayプロキシイベントを受け取り、キャッシュ済みのアプリケーションに委譲する。
//! アプリケーションは最初の呼び出しで構築され、同じ実行環境の以後の呼び出しで再利用される。
//!
//! # 環境変数
//! - `AWS_DATABASE_URL` / `DATABASE_URL` / `SUPABASE_DATABASE_URL`: データベース接続文字列（この順に優先、`postgres://`ならPostgreSQL）
//! - `GITHUB_API_BASE_URL`: GitHub APIのベースURL（デフォルト: https://api.github.com）
//! - `DB_POOL_MAX_SIZE`: 接続プールの最大接続数（デフォルト: 4）
//! - `RUST_LOG`: ログレベル（デフォルト: info）
use form_api::infrastructure::{InvocationAdapter, init_logging};
use lambda_http::{Error, Request, run, service_fn};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    // 構築はコールドスタート時の最初の呼び出しまで遅延する
    let adapter = InvocationAdapter::from_env();

    run(service_fn(|event: Request| adapter.handle(event))).await
}
