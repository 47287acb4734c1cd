/// 取得済み音声ファイル
///
/// ドロップ/ファイル選択で得られるバイナリへの参照。
/// クローンはバイト列を共有し、コピーはアップロード時の一度だけ。
use crate::config::APP_CONFIG;
use crate::domain::error::DomainError;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// 音声ファイル（名前・サイズ・MIMEタイプ・内容）
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct AudioFile {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    #[serde(skip)]
    data: Arc<Vec<u8>>,
}

impl AudioFile {
    /// メモリ上のバイト列から作成する
    ///
    /// `mime_type` が空の場合は拡張子から推定する。
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        let name = name.into();
        let mut mime_type = mime_type.into();
        if mime_type.trim().is_empty() {
            mime_type = mime_from_name(&name).to_string();
        }
        Self {
            size_bytes: data.len() as u64,
            name,
            mime_type,
            data: Arc::new(data),
        }
    }

    /// ファイルシステム上のパスから読み込む（ファイル選択ダイアログ相当）
    ///
    /// サイズ上限はメタデータで先に確認し、超過するファイルは読み込まない。
    pub async fn load(path: &Path) -> Result<Self, DomainError> {
        let display = path.display().to_string();

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|_| DomainError::file_not_found(&display))?;
        if metadata.is_dir() {
            return Err(DomainError::NotAFile { path: display });
        }

        let max_file_size = APP_CONFIG.upload.max_file_size;
        if metadata.len() > max_file_size {
            return Err(DomainError::FileTooLarge {
                size: metadata.len(),
                max: max_file_size,
            });
        }

        let data = tokio::fs::read(path)
            .await
            .map_err(|_| DomainError::file_not_found(&display))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or(display);

        Ok(Self::from_bytes(name, "", data))
    }

    /// ファイル内容
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// 小文字化した拡張子
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_ascii_lowercase())
    }
}

// 中身のバイト列はログに出さない
impl fmt::Debug for AudioFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioFile")
            .field("name", &self.name)
            .field("size_bytes", &self.size_bytes)
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// 拡張子からMIMEタイプを推定する
pub fn mime_from_name(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_ascii_lowercase());

    match ext.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        _ => "application/octet-stream",
    }
}
