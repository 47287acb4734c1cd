/// インフラ層のエラー定義
///
/// 解析サービスとのやり取りで発生するエラーを構造化して定義。
/// 呼び出し側には `kind()` で3分類（到達不可・サービスエラー・不正応答）を見せる。
use crate::domain::error::{DomainError, SessionError, SessionErrorKind};
use crate::error_severity::ErrorSeverity;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// ネットワークエラー
    #[error("network error: {message}")]
    Network { message: String },

    /// タイムアウトエラー
    #[error("operation timed out: {operation}")]
    Timeout { operation: String },

    /// サービスがエラーステータスを返した
    ///
    /// 表示はサービスのメッセージそのもの。
    #[error("{message}")]
    Service {
        endpoint: String,
        message: String,
        status_code: u16,
    },

    /// 応答を解析結果として解釈できない
    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },

    /// 送信前にリクエストを組み立てられなかった（ファイル側の問題）
    #[error("cannot upload file: {reason}")]
    InvalidFile { reason: String },
}

/// 呼び出し側に見せるエラー分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnalysisErrorKind {
    NetworkError,
    ServiceError,
    MalformedResponseError,
    /// 送信していない
    InvalidFileError,
}

impl AnalysisError {
    /// ネットワークエラーを作成
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// タイムアウトエラーを作成
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// サービスエラーを作成
    pub fn service(endpoint: impl Into<String>, message: impl Into<String>, status_code: u16) -> Self {
        Self::Service {
            endpoint: endpoint.into(),
            message: message.into(),
            status_code,
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    pub fn invalid_file(reason: impl Into<String>) -> Self {
        Self::InvalidFile {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> AnalysisErrorKind {
        match self {
            Self::Network { .. } | Self::Timeout { .. } => AnalysisErrorKind::NetworkError,
            Self::Service { .. } => AnalysisErrorKind::ServiceError,
            Self::MalformedResponse { .. } => AnalysisErrorKind::MalformedResponseError,
            Self::InvalidFile { .. } => AnalysisErrorKind::InvalidFileError,
        }
    }

    /// エラーの深刻度を返す
    pub fn severity(&self) -> ErrorSeverity {
        match self.kind() {
            AnalysisErrorKind::NetworkError => ErrorSeverity::SystemError,
            AnalysisErrorKind::InvalidFileError => ErrorSeverity::UserError,
            AnalysisErrorKind::ServiceError | AnalysisErrorKind::MalformedResponseError => {
                ErrorSeverity::ServiceError
            }
        }
    }
}

impl From<DomainError> for AnalysisError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::MalformedPayload { reason } => Self::MalformedResponse { reason },
            other => Self::MalformedResponse {
                reason: other.to_string(),
            },
        }
    }
}

impl From<AnalysisError> for SessionError {
    fn from(error: AnalysisError) -> Self {
        let kind = match error.kind() {
            AnalysisErrorKind::NetworkError => SessionErrorKind::Network,
            AnalysisErrorKind::ServiceError => SessionErrorKind::Service,
            AnalysisErrorKind::MalformedResponseError => SessionErrorKind::MalformedResponse,
            AnalysisErrorKind::InvalidFileError => SessionErrorKind::Validation,
        };
        SessionError::new(kind, error.to_string())
    }
}
