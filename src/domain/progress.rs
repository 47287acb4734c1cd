/// ドメイン層: セッションイベント定義
///
/// アップロードセッションの状態遷移をイベントとして表現します。
/// ホスト（CLIの進捗表示、テストなど）はチャネル経由でこれを受け取り、
/// 表示や制御に使用します。
use crate::domain::error::SessionErrorKind;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// セッションの状態遷移を表すイベント
///
/// # 設計意図
/// - 描画コンポーネントとコントローラの分離（コールバックの代わり）
/// - 機械可読出力のためにSerialize可能
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionPhase {
    /// ファイル取得完了
    FileAcquired {
        file_name: String,
        size_bytes: u64,
        mime_type: String,
        format: String,
    },

    /// 取得時の検証で拒否された
    AcquisitionRejected { message: String },

    /// ファイルが取り除かれた
    FileRemoved,

    /// 解析要求を送信した
    AnalysisStarted { file_name: String, size_bytes: u64 },

    /// 解析結果を受け取った
    AnalysisSucceeded {
        flagged_events: usize,
        tone_samples: usize,
        duration_seconds: f64,
    },

    /// 解析に失敗した
    AnalysisFailed {
        kind: SessionErrorKind,
        message: String,
    },

    /// 破棄済みセッション宛ての応答を捨てた
    CompletionDiscarded { generation: u64 },
}

/// セッションイベント
#[derive(Debug, Clone, Serialize)]
pub struct SessionEvent {
    /// 遷移内容
    #[serde(flatten)]
    pub phase: SessionPhase,
    /// 発生時点のセッション世代
    pub generation: u64,
    /// イベント発生時刻
    pub timestamp: DateTime<Utc>,
}

impl SessionEvent {
    pub fn new(phase: SessionPhase, generation: u64) -> Self {
        Self {
            phase,
            generation,
            timestamp: Utc::now(),
        }
    }
}
