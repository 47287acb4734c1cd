/// コマンド実行結果を表す型
///
/// 各コマンドはこの型を返し、プレゼンテーション層（main.rs/cli.rs）で
/// 人間向けと機械向けの出力フォーマットを決定する。
use crate::config::ThemePreference;
use crate::domain::model::AnalysisResult;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// コマンド実行結果の統一型
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CommandResult {
    Analyze(AnalyzeResult),
    Theme(ThemeResult),
    Help,
}

/// 解析コマンドの結果
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResult {
    /// 指定されたパス
    pub file_path: String,
    pub file_name: String,
    /// ファイルサイズ（bytes）
    pub file_size: u64,
    pub mime_type: String,
    /// 結果を受け取った時刻
    pub analyzed_at: DateTime<Utc>,
    /// 正規化済みの解析結果
    pub analysis: AnalysisResult,
}

/// テーマコマンドの結果
#[derive(Debug, Clone, Serialize)]
pub struct ThemeResult {
    pub theme: ThemePreference,
    pub previous: ThemePreference,
    /// 設定ファイルを書き換えたか
    pub changed: bool,
}

impl CommandResult {
    /// 成功メッセージを取得（人間向け出力用）
    pub fn success_message(&self) -> String {
        match self {
            CommandResult::Analyze(r) => format!("Analysis of {} completed.", r.file_name),
            CommandResult::Theme(r) => {
                if r.changed {
                    format!("Theme switched to {}.", r.theme.label())
                } else {
                    format!("Current theme: {}", r.theme.label())
                }
            }
            CommandResult::Help => "".to_string(),
        }
    }
}
