/// プレゼンテーション層: セッション進捗表示DTO
///
/// ドメイン層の`SessionEvent`をUI表示に適した形式に変換します。
/// この変換により、プレゼンテーション層がドメイン層の実装詳細に
/// 依存しないようにします。
///
/// # 設計方針
/// - `From<&SessionEvent>`で借用による変換（所有権を奪わない）
/// - `Option<DisplayProgress>`で表示抑制を明示的に表現
use crate::domain::formatter::{format_offset, format_size_mb};
use crate::domain::progress::{SessionEvent, SessionPhase};

/// 進捗表示のカテゴリ
///
/// UIでの表示方法を決定するためのメタ情報
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressCategory {
    /// ファイルの取得・取り外し
    Selection,
    /// 取得時の検証で拒否
    Rejected,
    /// 解析待ち
    Analysis,
    /// 完了
    Completed,
    /// 解析失敗
    Failed,
}

/// プレゼンテーション層用の進捗情報
#[derive(Debug, Clone)]
pub struct DisplayProgress {
    /// 表示用メッセージ
    pub message: String,
    /// 進捗カテゴリ
    pub category: ProgressCategory,
    /// 詳細情報（オプション）
    pub details: Option<String>,
}

impl DisplayProgress {
    pub fn new(message: String, category: ProgressCategory) -> Self {
        Self {
            message,
            category,
            details: None,
        }
    }

    /// 詳細情報を追加
    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }
}

/// `SessionEvent` から表示用進捗への変換
///
/// # 戻り値
/// - `Some(DisplayProgress)`: 表示すべき進捗情報
/// - `None`: 表示を抑制（破棄済みセッション宛ての応答など）
impl From<&SessionEvent> for Option<DisplayProgress> {
    fn from(event: &SessionEvent) -> Self {
        match &event.phase {
            SessionPhase::FileAcquired {
                file_name,
                size_bytes,
                format,
                ..
            } => Some(DisplayProgress::new(
                format!(
                    "File selected: {} ({}, {})",
                    file_name,
                    format_size_mb(*size_bytes),
                    format
                ),
                ProgressCategory::Selection,
            )),
            SessionPhase::AcquisitionRejected { message } => Some(DisplayProgress::new(
                format!("File rejected: {}", message),
                ProgressCategory::Rejected,
            )),
            SessionPhase::FileRemoved => Some(DisplayProgress::new(
                "File removed".to_string(),
                ProgressCategory::Selection,
            )),
            SessionPhase::AnalysisStarted {
                file_name,
                size_bytes,
            } => Some(DisplayProgress::new(
                format!(
                    "Analyzing {} ({})...",
                    file_name,
                    format_size_mb(*size_bytes)
                ),
                ProgressCategory::Analysis,
            )),
            SessionPhase::AnalysisSucceeded {
                flagged_events,
                tone_samples,
                duration_seconds,
            } => Some(
                DisplayProgress::new(
                    format!("Analysis complete: {} flagged event(s)", flagged_events),
                    ProgressCategory::Completed,
                )
                .with_details(format!(
                    "{} tone sample(s) over {}",
                    tone_samples,
                    format_offset(*duration_seconds)
                )),
            ),
            SessionPhase::AnalysisFailed { message, .. } => Some(DisplayProgress::new(
                format!("Analysis failed: {}", message),
                ProgressCategory::Failed,
            )),
            SessionPhase::CompletionDiscarded { .. } => None,
        }
    }
}
