/// ドメインサービス: 取得ファイルのバリデーション
///
/// ドロップ/ファイル選択で取得した音声ファイルを検証する。
/// サーバ側では再検証しない前提のため、形式チェックはここで完結させる。
///
/// 設定値（最大ファイルサイズ、サポート形式）はAPP_CONFIGから取得します。
use crate::config::APP_CONFIG;
use crate::domain::error::DomainError;
use crate::domain::file::AudioFile;

/// 形式判定に使うMIMEタイプと対応する拡張子
const SUPPORTED_MIME_TYPES: &[(&str, &str)] = &[
    ("audio/mpeg", "mp3"),
    ("audio/mp3", "mp3"),
    ("audio/wav", "wav"),
    ("audio/x-wav", "wav"),
    ("audio/wave", "wav"),
    ("audio/mp4", "m4a"),
    ("audio/x-m4a", "m4a"),
    ("audio/m4a", "m4a"),
];

/// 取得ファイルをバリデーションし、判定した形式（拡張子）を返す
///
/// # エラー
/// - ファイルが空
/// - ファイルサイズが制限を超過
/// - 拡張子・MIMEタイプのどちらからも対応形式と判定できない
pub fn validate_audio_file(file: &AudioFile) -> Result<String, DomainError> {
    if file.size_bytes == 0 {
        return Err(DomainError::EmptyFile {
            name: file.name.clone(),
        });
    }

    let max_file_size = APP_CONFIG.upload.max_file_size;
    if file.size_bytes > max_file_size {
        return Err(DomainError::FileTooLarge {
            size: file.size_bytes,
            max: max_file_size,
        });
    }

    if !is_well_formed_mime(&file.mime_type) {
        return Err(DomainError::InvalidMimeType {
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
        });
    }

    detect_format(file).ok_or_else(|| {
        let found = file
            .extension()
            .unwrap_or_else(|| file.mime_type.clone());
        let found = if found.is_empty() {
            "no extension".to_string()
        } else {
            found
        };
        DomainError::unsupported_format(&file.name, APP_CONFIG.upload.supported_formats, found)
    })
}

/// "type/subtype" の各部がトークン文字だけで構成されているか
///
/// `;` 以降のパラメータは見ない。
fn is_well_formed_mime(mime: &str) -> bool {
    let essence = mime.split(';').next().unwrap_or_default().trim();
    let Some((kind, subtype)) = essence.split_once('/') else {
        return false;
    };

    let is_token = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c))
    };
    is_token(kind) && is_token(subtype)
}

/// 拡張子を優先し、だめならMIMEタイプで形式を判定する
fn detect_format(file: &AudioFile) -> Option<String> {
    let supported = APP_CONFIG.upload.supported_formats;

    if let Some(ext) = file.extension()
        && supported.contains(&ext.as_str())
    {
        return Some(ext);
    }

    let mime = file.mime_type.trim().to_ascii_lowercase();
    SUPPORTED_MIME_TYPES
        .iter()
        .find(|(candidate, _)| *candidate == mime)
        .map(|(_, ext)| ext.to_string())
}
