/// 設定管理モジュール
///
/// このモジュールは3種類の設定を提供します:
/// 1. AppConfig - コンパイル時定数として定義される静的設定（APP_CONFIG）
/// 2. ServiceSettings - 起動時に一度だけ環境変数から読む解析サービスのベースURL
/// 3. UserConfig - 実行時に読み込まれるユーザー設定（表示テーマ）
///
/// # 使用例
///
/// ```rust
/// use crate::config::{APP_CONFIG, ServiceSettings, UserConfig};
///
/// let field = APP_CONFIG.api.upload_field;
/// let settings = ServiceSettings::from_env()?;
/// let user_config = UserConfig::load()?;
/// ```
pub mod app;
pub mod error;
pub mod service;
pub mod user;

pub use app::{APP_CONFIG, BYTES_PER_MB};
pub use service::ServiceSettings;
pub use user::{ThemePreference, UserConfig};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_independent_config_usage() {
        // 静的設定と環境設定が独立して使えることを確認
        let max_size = APP_CONFIG.upload.max_file_size;
        assert!(max_size > BYTES_PER_MB);

        let settings = ServiceSettings::from_value(Some("http://127.0.0.1:8080")).unwrap();
        assert_eq!(settings.base_url(), "http://127.0.0.1:8080");

        assert_eq!(UserConfig::default().theme, ThemePreference::Light);
    }
}
