/// ログ基盤モジュール
///
/// Lambda/CloudWatch向けにJSON形式の構造化ログを出力する。
/// トークンやユーザープロファイルはログに含めないこと。
use std::sync::Once;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// ログサブスクライバーを初期化する
///
/// `RUST_LOG`でフィルタリングし、未設定時は`info`。
/// 複数回呼び出しても初回のみ初期化される。他のサブスクライバーが
/// 既に登録済みの場合は何もしない。
pub fn init_logging() {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        // 時刻はCloudWatch側で付与されるため出力しない
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .without_time()
            .with_target(true)
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false);

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init();
    });
}

/// テスト用のログサブスクライバーを初期化する（人間が読みやすい形式）
#[cfg(test)]
pub fn init_test_logging() {
    static TEST_INIT: Once = Once::new();

    TEST_INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .compact();

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();
    });
}
