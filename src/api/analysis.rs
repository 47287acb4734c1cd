/// 解析クライアント
///
/// 音声ファイルを単一パートの multipart で POST /api/upload_file に送り、
/// 応答を正規化済みの解析結果に変換する。
/// リトライもキャッシュもしない。1回の呼び出しは常に独立した1回の送信。
use crate::api::client::ApiClient;
use crate::api::error::AnalysisError;
use crate::config::{APP_CONFIG, ServiceSettings};
use crate::domain::file::AudioFile;
use crate::domain::model::{self, AnalysisResult};
use crate::domain::session::AnalysisService;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

/// 解析サービスのクライアント
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    api: ApiClient,
}

impl AnalysisClient {
    pub fn new(settings: &ServiceSettings) -> Result<Self, AnalysisError> {
        Ok(Self {
            api: ApiClient::new(settings)?,
        })
    }

    /// 音声ファイルを送信して解析結果を得る
    pub async fn analyze(&self, file: &AudioFile) -> Result<AnalysisResult, AnalysisError> {
        let endpoint = APP_CONFIG.api.upload_path;
        let form = build_upload_form(file)?;

        tracing::debug!(
            base_url = self.api.base_url(),
            endpoint,
            file = %file.name,
            size_bytes = file.size_bytes,
            "posting recording"
        );

        let response = self.api.post_multipart(endpoint, form).await?;
        let response = ApiClient::check_response(response, endpoint).await?;
        let payload: Value = ApiClient::parse_json(response).await?;

        Ok(model::normalize(&payload)?)
    }
}

impl AnalysisService for AnalysisClient {
    type Error = AnalysisError;

    async fn analyze(&self, file: &AudioFile) -> Result<AnalysisResult, AnalysisError> {
        AnalysisClient::analyze(self, file).await
    }
}

/// `audio_file` フィールド1つだけのフォームを組み立てる
fn build_upload_form(file: &AudioFile) -> Result<Form, AnalysisError> {
    let part = Part::bytes(file.bytes().to_vec())
        .file_name(file.name.clone())
        .mime_str(&file.mime_type)
        .map_err(|e| {
            AnalysisError::invalid_file(format!("invalid MIME type '{}': {}", file.mime_type, e))
        })?;

    Ok(Form::new().part(APP_CONFIG.api.upload_field, part))
}
