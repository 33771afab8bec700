//! フォームAPI ローカル開発サーバー
//!
//! Lambdaと同じアプリケーションを通常のHTTPサーバーとして起動する。
//!
//! # 使用方法
//! ```bash
//! DATABASE_URL=sqlite://form.db form-api-local --addr 127.0.0.1:3000
//! ```
use std::net::SocketAddr;
use std::process::ExitCode;

use clap::Parser;
use form_api::application::build_from_env;
use form_api::infrastructure::init_logging;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

/// コマンドライン引数
#[derive(Parser, Debug)]
#[command(name = "form-api-local")]
#[command(about = "フォームAPIをローカルHTTPサーバーとして起動")]
struct Args {
    /// 待ち受けアドレス
    #[arg(long, short = 'a', default_value = "127.0.0.1:3000")]
    addr: SocketAddr,
}

/// シャットダウンシグナルを待機する
///
/// SIGINT（Ctrl+C）またはSIGTERMを受信すると完了する。
/// ハンドラーの登録に失敗したシグナルは待機しない。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Ctrl+C シグナルハンドラーの登録に失敗");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "SIGTERM シグナルハンドラーの登録に失敗");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Ctrl+C (SIGINT) を受信しました。graceful shutdownを開始します");
        }
        _ = terminate => {
            info!("SIGTERM を受信しました。graceful shutdownを開始します");
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    let app = match build_from_env().await {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "アプリケーションの構築に失敗");
            return ExitCode::FAILURE;
        }
    };

    let listener = match TcpListener::bind(args.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, addr = %args.addr, "アドレスのバインドに失敗");
            return ExitCode::FAILURE;
        }
    };

    info!(addr = %args.addr, "サーバーを起動");

    if let Err(e) = axum::serve(listener, app.router())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "サーバーが異常終了");
        return ExitCode::FAILURE;
    }

    info!("サーバーが正常に停止しました");
    ExitCode::SUCCESS
}
