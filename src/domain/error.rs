/// ドメイン層のエラー定義
///
/// ビジネスロジックに関連するエラーを構造化して定義。
/// 外部クレートのエラーは含まず、純粋にドメインの制約違反を表現する。
use crate::error_severity::ErrorSeverity;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// ドロップ/ファイル選択イベントにファイルが含まれていない
    #[error("no file provided")]
    NoFileProvided,

    /// 非対応の音声形式
    #[error("unsupported audio format: {name} (expected: {expected}, found: {found})")]
    UnsupportedFormat {
        name: String,
        expected: String,
        found: String,
    },

    /// MIMEタイプが "type/subtype" の形になっていない
    #[error("invalid MIME type for {name}: '{mime_type}'")]
    InvalidMimeType { name: String, mime_type: String },

    /// ファイルが見つからない
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// ディレクトリが指定された（ファイルが期待される場所）
    #[error("'{path}' is a directory, not a file")]
    NotAFile { path: String },

    /// ファイルが空
    #[error("file is empty: {name}")]
    EmptyFile { name: String },

    /// ファイルサイズが制限を超過
    #[error("file too large: {size} bytes (maximum allowed: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    /// 解析中のため操作できない
    #[error("cannot {action} while an analysis is in progress")]
    SessionBusy { action: &'static str },

    /// 解析を開始できる状態ではない
    #[error("no file ready for analysis (session is {status})")]
    NotReady { status: String },

    /// 解析結果のペイロードが期待した形ではない
    #[error("malformed analysis payload: {reason}")]
    MalformedPayload { reason: String },
}

impl DomainError {
    /// 非対応形式エラーを生成
    pub fn unsupported_format(
        name: impl Into<String>,
        supported_formats: &[&str],
        found: impl Into<String>,
    ) -> Self {
        Self::UnsupportedFormat {
            name: name.into(),
            expected: format!("one of: {}", supported_formats.join(", ")),
            found: found.into(),
        }
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            reason: reason.into(),
        }
    }

    /// エラーの深刻度を返す
    ///
    /// 終了コードの決定に使用できる
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MalformedPayload { .. } => ErrorSeverity::ServiceError,
            _ => ErrorSeverity::UserError,
        }
    }

    /// ユーザー向けのヒントメッセージを返す
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::NoFileProvided => Some("Drop or select exactly one audio file."),
            Self::UnsupportedFormat { .. } => Some("Supported formats: MP3, WAV, M4A"),
            Self::InvalidMimeType { .. } => {
                Some("Pass the file without a content type to infer it from the extension.")
            }
            Self::FileNotFound { .. } => {
                Some("Please check the file path and ensure the file exists.")
            }
            Self::NotAFile { .. } => Some("Please specify a file, not a directory."),
            Self::EmptyFile { .. } => Some("The file appears to be empty or corrupted."),
            Self::FileTooLarge { .. } => Some("Try trimming the recording or use a smaller file."),
            Self::SessionBusy { .. } => Some("Wait for the running analysis to finish."),
            Self::NotReady { .. } => Some("Select an audio file before starting the analysis."),
            Self::MalformedPayload { .. } => None,
        }
    }
}

/// 失敗したセッションが保持するエラーの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionErrorKind {
    /// 取得時の検証エラー（ファイルなし、非対応形式など）
    Validation,
    /// サービスに到達できなかった
    Network,
    /// サービスがエラーステータスを返した
    Service,
    /// 応答を解析結果として解釈できなかった
    MalformedResponse,
}

/// `Failed` セッションに載るエラー
///
/// `message` はそのままユーザーに表示する。
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{message}")]
pub struct SessionError {
    pub kind: SessionErrorKind,
    pub message: String,
}

impl SessionError {
    pub fn new(kind: SessionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// 取得時の検証エラーから作成
    pub fn validation(error: &DomainError) -> Self {
        Self::new(SessionErrorKind::Validation, error.to_string())
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.kind {
            SessionErrorKind::Validation => ErrorSeverity::UserError,
            SessionErrorKind::Network => ErrorSeverity::SystemError,
            SessionErrorKind::Service | SessionErrorKind::MalformedResponse => {
                ErrorSeverity::ServiceError
            }
        }
    }

    pub fn hint(&self) -> Option<&str> {
        match self.kind {
            SessionErrorKind::Validation => Some("Supported formats: MP3, WAV, M4A"),
            SessionErrorKind::Network => {
                Some("Check that the analysis service is running and QABOT_API_URL points to it.")
            }
            SessionErrorKind::Service => Some("The analysis service rejected the recording."),
            SessionErrorKind::MalformedResponse => {
                Some("The analysis service returned an unexpected response. Check its version.")
            }
        }
    }
}
