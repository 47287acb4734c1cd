/// プレゼンテーション層: 表示テーマ
///
/// プロセス全体で1つのテーマを持つ。`main` がユーザー設定から一度だけ
/// `init` し、以降は `current` で読むだけ。解析パイプラインとは無関係。
use crate::config::ThemePreference;
use crate::domain::model::Severity;
use std::sync::OnceLock;

static THEME: OnceLock<ThemePreference> = OnceLock::new();

const RESET: &str = "\x1b[0m";

/// テーマを確定させる
///
/// 2回目以降の呼び出しは無視され、false を返す。
pub fn init(preference: ThemePreference) -> bool {
    THEME.set(preference).is_ok()
}

/// 現在のテーマ（未初期化ならライト）
pub fn current() -> ThemePreference {
    THEME.get().copied().unwrap_or_default()
}

/// テーマごとの ANSI 配色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub high: &'static str,
    pub medium: &'static str,
    pub low: &'static str,
    pub agent: &'static str,
    pub customer: &'static str,
    pub heading: &'static str,
}

impl Palette {
    pub const fn for_theme(theme: ThemePreference) -> Self {
        match theme {
            // 明るい背景では濃い色
            ThemePreference::Light => Self {
                high: "\x1b[31m",
                medium: "\x1b[33m",
                low: "\x1b[34m",
                agent: "\x1b[35m",
                customer: "\x1b[36m",
                heading: "\x1b[1m",
            },
            ThemePreference::Dark => Self {
                high: "\x1b[91m",
                medium: "\x1b[93m",
                low: "\x1b[94m",
                agent: "\x1b[95m",
                customer: "\x1b[96m",
                heading: "\x1b[1;97m",
            },
        }
    }

    pub fn current() -> Self {
        Self::for_theme(current())
    }

    pub fn severity(&self, severity: Severity) -> &'static str {
        match severity {
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}

/// 色付けが有効なときだけエスケープで囲む
pub fn paint(text: &str, color: &str, enabled: bool) -> String {
    if enabled && !text.is_empty() {
        format!("{}{}{}", color, text, RESET)
    } else {
        text.to_string()
    }
}
