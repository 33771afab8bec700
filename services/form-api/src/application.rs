// アプリケーション層モジュール
pub mod app;
pub mod error;
pub mod form_data_handler;
pub mod github_handler;
pub mod router;

// 再エクスポート
pub use app::{App, BootstrapError, build_from_env};
pub use error::{ApiError, ApiErrorBody};
pub use router::{API_PREFIX, AppState, create_router};
