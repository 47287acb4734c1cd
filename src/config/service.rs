/// 解析サービス接続設定
///
/// ベースURLは起動時に一度だけ環境変数から読み込み、以降は値として引き回す。
use crate::config::app::APP_CONFIG;
use crate::config::error::ConfigError;
use reqwest::Url;
use std::time::Duration;

/// 解析サービスへの接続設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    /// 末尾スラッシュを除いたベースURL
    base_url: String,
    timeout: Duration,
}

impl ServiceSettings {
    /// 環境変数 QABOT_API_URL から設定を読み込む
    ///
    /// 未設定（または空）の場合は APP_CONFIG のデフォルトを使う。
    pub fn from_env() -> Result<Self, ConfigError> {
        let value = std::env::var(APP_CONFIG.api.base_url_env).ok();
        Self::from_value(value.as_deref())
    }

    /// 環境変数の値（あれば）から設定を構築する
    pub fn from_value(value: Option<&str>) -> Result<Self, ConfigError> {
        let raw = match value.map(str::trim) {
            Some(v) if !v.is_empty() => v,
            _ => APP_CONFIG.api.default_endpoint,
        };

        let url = Url::parse(raw)
            .map_err(|e| ConfigError::invalid_service_url(raw, e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid_service_url(
                raw,
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        Ok(Self {
            base_url: raw.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(APP_CONFIG.api.timeout_seconds),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_when_unset() {
        let settings = ServiceSettings::from_value(None).unwrap();
        assert_eq!(settings.base_url(), "http://localhost:5000");
        assert_eq!(settings.timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_blank_value_uses_default() {
        let settings = ServiceSettings::from_value(Some("   ")).unwrap();
        assert_eq!(settings.base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let settings = ServiceSettings::from_value(Some("https://qa.example.com/")).unwrap();
        assert_eq!(settings.base_url(), "https://qa.example.com");
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let result = ServiceSettings::from_value(Some("ftp://qa.example.com"));
        assert!(matches!(result, Err(ConfigError::InvalidServiceUrl { .. })));
    }

    #[test]
    fn test_rejects_unparseable_url() {
        let result = ServiceSettings::from_value(Some("not a url"));
        assert!(matches!(result, Err(ConfigError::InvalidServiceUrl { .. })));
    }
}
