/// アプリケーション設定モジュール
///
/// コンパイル時定数として定義される静的設定を管理します。
/// これらの設定は実行時には変更できません。
/// 実行時に変わるのは解析サービスのベースURL（`ServiceSettings`）と
/// ユーザー設定（`UserConfig`）のみです。

/// 1MBあたりのバイト数
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// アプリケーション全体の設定
#[derive(Debug, Clone, Copy)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub upload: UploadConfig,
    pub logging: LoggingConfig,
}

/// 解析サービスAPI関連の設定
#[derive(Debug, Clone, Copy)]
pub struct ApiConfig {
    /// QABOT_API_URL 未設定時のベースURL
    pub default_endpoint: &'static str,

    /// アップロード（解析要求）エンドポイントのパス
    pub upload_path: &'static str,

    /// multipart フォームで音声ファイルを載せるフィールド名
    pub upload_field: &'static str,

    /// APIリクエストのタイムアウト(秒)
    ///
    /// 解析はサーバ側で文字起こしまで行うため長めに取る。
    pub timeout_seconds: u64,

    /// ベースURLを上書きする環境変数名
    pub base_url_env: &'static str,
}

/// アップロード関連の設定
#[derive(Debug, Clone, Copy)]
pub struct UploadConfig {
    /// 受け付ける最大ファイルサイズ (バイト)
    pub max_file_size: u64,

    /// 対応する音声フォーマット（拡張子、小文字）
    pub supported_formats: &'static [&'static str],
}

/// ロギング関連の設定
#[derive(Debug, Clone, Copy)]
pub struct LoggingConfig {
    /// デフォルトのログレベル
    pub default_level: &'static str,

    /// ログフィルタを上書きする環境変数名
    pub filter_env: &'static str,
}

/// ビルド時に確定するアプリケーション設定
pub const APP_CONFIG: AppConfig = AppConfig {
    api: ApiConfig {
        default_endpoint: "http://localhost:5000",
        upload_path: "/api/upload_file",
        upload_field: "audio_file",
        timeout_seconds: 300,
        base_url_env: "QABOT_API_URL",
    },
    upload: UploadConfig {
        max_file_size: 200 * BYTES_PER_MB,
        supported_formats: &["mp3", "wav", "m4a"],
    },
    logging: LoggingConfig {
        default_level: "warn",
        filter_env: "QABOT_LOG",
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_values() {
        assert_eq!(APP_CONFIG.api.upload_path, "/api/upload_file");
        assert_eq!(APP_CONFIG.api.upload_field, "audio_file");
        assert!(APP_CONFIG.api.timeout_seconds > 0);
        assert_eq!(APP_CONFIG.upload.supported_formats, &["mp3", "wav", "m4a"]);
    }
}
