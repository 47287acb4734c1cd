/// ログ出力の初期化
///
/// stdout は `--machine` のJSON専用なので、ログは常に stderr に出す。
/// フィルタは QABOT_LOG（EnvFilter 構文）、未設定なら warn。
use crate::config::APP_CONFIG;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// グローバルなサブスクライバを登録する
///
/// 二重に呼ばれた場合（テストなど）は何もしない。
pub fn init() {
    let filter = EnvFilter::try_from_env(APP_CONFIG.logging.filter_env)
        .unwrap_or_else(|_| EnvFilter::new(APP_CONFIG.logging.default_level));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();

    if let Err(e) = result {
        tracing::debug!(error = %e, "logging already initialized");
    }
}
