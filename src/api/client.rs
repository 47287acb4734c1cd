/// HTTPクライアント
///
/// 解析サービスとの通信を担当する低レベルのHTTPクライアント。
/// タイムアウト、トランスポートエラーの分類、エラーレスポンスの解釈を含みます。
use crate::api::error::AnalysisError;
use crate::api::types::ErrorPayload;
use crate::config::ServiceSettings;
use reqwest::multipart::Form;
use reqwest::{Client, Response};

/// APIクライアントの結果型
type ApiResult<T> = Result<T, AnalysisError>;

/// APIクライアント
///
/// 内部の `reqwest::Client` は参照カウントされているため、クローンは安価。
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// 新しいAPIクライアントを作成
    ///
    /// # Arguments
    /// * `settings` - ベースURLとタイムアウト
    pub fn new(settings: &ServiceSettings) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| AnalysisError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.base_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// multipart/form-data でPOSTする
    ///
    /// # Arguments
    /// * `endpoint` - エンドポイントパス（例: "/api/upload_file"）
    /// * `form` - 送信するフォーム
    pub async fn post_multipart(&self, endpoint: &str, form: Form) -> ApiResult<Response> {
        let url = self.build_url(endpoint);
        let request = self.client.post(&url).multipart(form);

        Self::send_with_error_handling(request, endpoint, "POST").await
    }

    /// URLを構築
    fn build_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// リクエストを送信し、トランスポートエラーを分類する
    async fn send_with_error_handling(
        request: reqwest::RequestBuilder,
        endpoint: &str,
        method: &str,
    ) -> ApiResult<Response> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                AnalysisError::timeout(format!("{} {}", method, endpoint))
            } else if e.is_connect() {
                AnalysisError::network(format!(
                    "Connection failed for {} {}: {}",
                    method, endpoint, e
                ))
            } else {
                AnalysisError::network(format!("Request failed for {} {}: {}", method, endpoint, e))
            }
        })
    }

    /// レスポンスをチェックしてエラーを返す
    ///
    /// エラーボディが `{"error": "..."}` ならそのメッセージを、
    /// 解釈できなければ汎用メッセージを使う。
    pub async fn check_response(response: Response, endpoint: &str) -> ApiResult<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let status_code = status.as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = service_error_message(status_code, &body);

        tracing::debug!(endpoint, status_code, %message, "analysis service returned an error");
        Err(AnalysisError::service(endpoint, message, status_code))
    }

    /// JSONレスポンスをデシリアライズ
    ///
    /// ボディが読めない・JSONでない場合は不正応答として扱う。
    pub async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> ApiResult<T> {
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                AnalysisError::timeout("reading response body")
            } else {
                AnalysisError::network(format!("Failed to read response body: {}", e))
            }
        })?;

        serde_json::from_slice(&body)
            .map_err(|e| AnalysisError::malformed(format!("Failed to parse JSON response: {}", e)))
    }
}

/// エラーボディから表示用メッセージを取り出す
pub fn service_error_message(status_code: u16, body: &str) -> String {
    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .and_then(ErrorPayload::into_message)
        .unwrap_or_else(|| format!("analysis service returned HTTP {}", status_code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let settings = ServiceSettings::from_value(Some("http://127.0.0.1:5000/")).unwrap();
        let client = ApiClient::new(&settings).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:5000");
        assert_eq!(
            client.build_url("/api/upload_file"),
            "http://127.0.0.1:5000/api/upload_file"
        );
    }

    #[test]
    fn test_service_error_message_from_payload() {
        assert_eq!(
            service_error_message(500, r#"{"error":"decode failed"}"#),
            "decode failed"
        );
    }

    #[test]
    fn test_service_error_message_generic_fallback() {
        assert_eq!(
            service_error_message(502, "<html>Bad Gateway</html>"),
            "analysis service returned HTTP 502"
        );
        assert_eq!(service_error_message(500, ""), "analysis service returned HTTP 500");
        assert_eq!(
            service_error_message(400, r#"{"detail":"x"}"#),
            "analysis service returned HTTP 400"
        );
    }
}
