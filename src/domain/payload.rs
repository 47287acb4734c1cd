/// 解析サービスが返すペイロードの生の形
///
/// 受け入れは寛容にし（別名・"MM:SS" 形式の時刻）、
/// 正規化と検証は `domain::model::normalize` が行う。
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// POST /api/upload_file 成功時のボディ
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnalysisPayload {
    #[serde(alias = "tone_series")]
    pub tone_series: Vec<RawToneSample>,

    #[serde(alias = "flagged_events")]
    pub flagged_events: Vec<RawFlaggedEvent>,

    #[serde(default)]
    pub metrics: Option<BTreeMap<String, Value>>,
}

/// トーン系列の1点
#[derive(Debug, Clone, Deserialize)]
pub struct RawToneSample {
    #[serde(alias = "t", alias = "time")]
    pub timestamp: RawTimestamp,

    #[serde(alias = "channel")]
    pub speaker: String,

    pub score: f64,
}

/// フラグ付きイベント
#[derive(Debug, Clone, Deserialize)]
pub struct RawFlaggedEvent {
    #[serde(alias = "t", alias = "time")]
    pub timestamp: RawTimestamp,

    #[serde(alias = "description", alias = "issueDescription")]
    pub issue: String,

    pub severity: String,
}

/// 秒数、または "MM:SS" 形式の時刻
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Seconds(f64),
    Clock(String),
}
