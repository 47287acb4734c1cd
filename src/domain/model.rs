/// ドメインモデル: 解析結果
///
/// サービスのペイロードを描画側に依存しない正規形へ変換する。
/// 構築時に並び順と一意性を保証するため、描画側はソート不要。
use crate::domain::error::DomainError;
use crate::domain::formatter::parse_offset;
use crate::domain::payload::{RawAnalysisPayload, RawFlaggedEvent, RawTimestamp, RawToneSample};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// 話者チャネル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerChannel {
    Agent,
    Customer,
}

impl SpeakerChannel {
    /// 話者ラベルを解釈する（大文字小文字は区別しない）
    ///
    /// 文字起こし側は "Bot"/"Human" で話者を付けるため、それも受け付ける。
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "agent" | "bot" => Some(Self::Agent),
            "customer" | "human" => Some(Self::Customer),
            _ => None,
        }
    }
}

/// 重大度（Low < Medium < High）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// メトリクス名
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MetricName {
    ResponseTime,
    Accuracy,
    OverallSentiment,
    Compliance,
}

impl MetricName {
    pub const ALL: [MetricName; 4] = [
        Self::ResponseTime,
        Self::Accuracy,
        Self::OverallSentiment,
        Self::Compliance,
    ];

    /// "ResponseTime" / "responseTime" / "response_time" のいずれも受け付ける
    pub fn parse(key: &str) -> Option<Self> {
        let normalized: String = key
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "responsetime" => Some(Self::ResponseTime),
            "accuracy" => Some(Self::Accuracy),
            "overallsentiment" => Some(Self::OverallSentiment),
            "compliance" => Some(Self::Compliance),
            _ => None,
        }
    }

    /// メトリクスカードの見出し
    pub fn label(self) -> &'static str {
        match self {
            Self::ResponseTime => "Response Time",
            Self::Accuracy => "Accuracy",
            Self::OverallSentiment => "Overall Sentiment",
            Self::Compliance => "Compliance",
        }
    }
}

/// トーン系列の1点
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToneSample {
    pub timestamp_seconds: f64,
    pub channel: SpeakerChannel,
    /// 0..=100
    pub score: f64,
}

/// フラグ付きイベント
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedEvent {
    pub timestamp_seconds: f64,
    pub description: String,
    pub severity: Severity,
}

impl FlaggedEvent {
    pub fn new(timestamp_seconds: f64, description: impl Into<String>, severity: Severity) -> Self {
        Self {
            timestamp_seconds,
            description: description.into(),
            severity,
        }
    }
}

/// 正規化済みの解析結果
///
/// - `tone_series`: (時刻, チャネル) 昇順。チャネル内の時刻は狭義単調増加
/// - `flagged_events`: (時刻, 説明) 昇順。時刻+説明で一意
/// - `metrics`: メトリクス名順
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AnalysisResult {
    tone_series: Vec<ToneSample>,
    flagged_events: Vec<FlaggedEvent>,
    metrics: BTreeMap<MetricName, String>,
}

impl AnalysisResult {
    /// 部品から構築する（検証・整列・重複除去を行う）
    ///
    /// # Errors
    /// 負または非有限の時刻、0..=100 を外れるスコアがあれば MalformedPayload
    pub fn from_parts(
        mut tone_series: Vec<ToneSample>,
        mut flagged_events: Vec<FlaggedEvent>,
        metrics: BTreeMap<MetricName, String>,
    ) -> Result<Self, DomainError> {
        for sample in &tone_series {
            check_timestamp(sample.timestamp_seconds, "tone sample")?;
            if !sample.score.is_finite() || !(0.0..=100.0).contains(&sample.score) {
                return Err(DomainError::malformed(format!(
                    "tone score {} at {}s is outside 0..=100",
                    sample.score, sample.timestamp_seconds
                )));
            }
        }
        for event in &flagged_events {
            check_timestamp(event.timestamp_seconds, "flagged event")?;
        }

        // 安定ソートなので、重複時は入力で先に現れたものが残る
        tone_series.sort_by(|a, b| {
            a.channel
                .cmp(&b.channel)
                .then(a.timestamp_seconds.total_cmp(&b.timestamp_seconds))
        });
        let before = tone_series.len();
        tone_series.dedup_by(|later, kept| {
            later.channel == kept.channel && later.timestamp_seconds == kept.timestamp_seconds
        });
        if tone_series.len() != before {
            tracing::warn!(
                dropped = before - tone_series.len(),
                "dropped tone samples with duplicate timestamps"
            );
        }
        tone_series.sort_by(|a, b| {
            a.timestamp_seconds
                .total_cmp(&b.timestamp_seconds)
                .then(a.channel.cmp(&b.channel))
        });

        flagged_events.sort_by(|a, b| {
            a.timestamp_seconds
                .total_cmp(&b.timestamp_seconds)
                .then_with(|| a.description.cmp(&b.description))
        });
        flagged_events.dedup_by(|later, kept| {
            later.timestamp_seconds == kept.timestamp_seconds
                && later.description == kept.description
        });

        Ok(Self {
            tone_series,
            flagged_events,
            metrics,
        })
    }

    pub fn tone_series(&self) -> &[ToneSample] {
        &self.tone_series
    }

    /// 指定チャネルの系列（時刻昇順）
    pub fn series_for(&self, channel: SpeakerChannel) -> impl Iterator<Item = &ToneSample> {
        self.tone_series.iter().filter(move |s| s.channel == channel)
    }

    pub fn flagged_events(&self) -> &[FlaggedEvent] {
        &self.flagged_events
    }

    pub fn metric(&self, name: MetricName) -> Option<&str> {
        self.metrics.get(&name).map(String::as_str)
    }

    /// 録音長（秒）。保持せず毎回計算する
    pub fn duration_seconds(&self) -> f64 {
        derive_duration(self)
    }
}

fn check_timestamp(value: f64, what: &str) -> Result<(), DomainError> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::malformed(format!(
            "{} has invalid timestamp {}",
            what, value
        )));
    }
    Ok(())
}

/// 系列・イベントを通じた最大時刻。空なら 0
pub fn derive_duration(result: &AnalysisResult) -> f64 {
    result
        .tone_series
        .iter()
        .map(|s| s.timestamp_seconds)
        .chain(result.flagged_events.iter().map(|e| e.timestamp_seconds))
        .fold(0.0, f64::max)
}

/// 生ペイロードを検証し、正規化済みの解析結果に変換する
///
/// 同じペイロードからは常に同一の結果を返す。
///
/// # Errors
/// 必須フィールドの欠落・型違い、負の時刻、未知の話者/重大度ラベルは MalformedPayload
pub fn normalize(raw: &Value) -> Result<AnalysisResult, DomainError> {
    let payload = RawAnalysisPayload::deserialize_from(raw)?;

    let tone_series = payload
        .tone_series
        .iter()
        .map(convert_tone_sample)
        .collect::<Result<Vec<_>, _>>()?;

    let flagged_events = payload
        .flagged_events
        .iter()
        .map(convert_flagged_event)
        .collect::<Result<Vec<_>, _>>()?;

    let mut metrics = BTreeMap::new();
    for (key, value) in payload.metrics.iter().flatten() {
        let Some(name) = MetricName::parse(key) else {
            tracing::debug!(key = %key, "ignoring unknown metric");
            continue;
        };
        metrics.insert(name, format_metric(name, value)?);
    }

    let mut result = AnalysisResult::from_parts(tone_series, flagged_events, metrics)?;

    if !result.metrics.contains_key(&MetricName::OverallSentiment)
        && let Some(label) = derive_overall_sentiment(&result)
    {
        result
            .metrics
            .insert(MetricName::OverallSentiment, label.to_string());
    }

    Ok(result)
}

impl RawAnalysisPayload {
    fn deserialize_from(raw: &Value) -> Result<Self, DomainError> {
        use serde::Deserialize;
        Self::deserialize(raw).map_err(|e| DomainError::malformed(e.to_string()))
    }
}

fn convert_timestamp(raw: &RawTimestamp) -> Result<f64, DomainError> {
    match raw {
        RawTimestamp::Seconds(seconds) => Ok(*seconds),
        RawTimestamp::Clock(text) => parse_offset(text)
            .ok_or_else(|| DomainError::malformed(format!("unrecognised timestamp '{}'", text))),
    }
}

fn convert_tone_sample(raw: &RawToneSample) -> Result<ToneSample, DomainError> {
    let channel = SpeakerChannel::parse(&raw.speaker)
        .ok_or_else(|| DomainError::malformed(format!("unknown speaker '{}'", raw.speaker)))?;

    Ok(ToneSample {
        timestamp_seconds: convert_timestamp(&raw.timestamp)?,
        channel,
        score: raw.score,
    })
}

fn convert_flagged_event(raw: &RawFlaggedEvent) -> Result<FlaggedEvent, DomainError> {
    let severity = Severity::parse(&raw.severity)
        .ok_or_else(|| DomainError::malformed(format!("unknown severity '{}'", raw.severity)))?;

    Ok(FlaggedEvent::new(
        convert_timestamp(&raw.timestamp)?,
        raw.issue.trim(),
        severity,
    ))
}

/// メトリクス値を表示文字列にする
///
/// 文字列はそのまま、数値はメトリクスごとの単位で整形する。
fn format_metric(name: MetricName, value: &Value) -> Result<String, DomainError> {
    match value {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => {
            let v = n
                .as_f64()
                .ok_or_else(|| DomainError::malformed(format!("metric {:?} is not finite", name)))?;
            Ok(match name {
                MetricName::ResponseTime => format!("{:.1}s", v),
                MetricName::Accuracy | MetricName::Compliance => format_percent(v),
                MetricName::OverallSentiment => sentiment_label(v).to_string(),
            })
        }
        other => Err(DomainError::malformed(format!(
            "metric {:?} must be a string or number, found {}",
            name, other
        ))),
    }
}

fn format_percent(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}%", value)
    } else {
        format!("{:.1}%", value)
    }
}

/// compound スコア（-1..=1）を感情ラベルにする
pub fn sentiment_label(compound: f64) -> &'static str {
    if compound >= 0.05 {
        "Positive"
    } else if compound <= -0.05 {
        "Negative"
    } else {
        "Neutral"
    }
}

/// 顧客トーンの平均から総合感情を導出する
fn derive_overall_sentiment(result: &AnalysisResult) -> Option<&'static str> {
    let (sum, count) = result
        .series_for(SpeakerChannel::Customer)
        .fold((0.0, 0usize), |(sum, count), s| (sum + s.score, count + 1));

    if count == 0 {
        return None;
    }

    let mean = sum / count as f64;
    Some(sentiment_label(mean / 50.0 - 1.0))
}

/// 表の並び用の比較（重大度降順 → 時刻昇順 → 説明昇順）
pub fn table_order(a: &FlaggedEvent, b: &FlaggedEvent) -> Ordering {
    b.severity
        .cmp(&a.severity)
        .then(a.timestamp_seconds.total_cmp(&b.timestamp_seconds))
        .then_with(|| a.description.cmp(&b.description))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_payload() -> Value {
        json!({
            "toneSeries": [
                { "timestamp": 20, "speaker": "Agent", "score": 55 },
                { "timestamp": 10, "speaker": "Customer", "score": 30 },
                { "timestamp": 0, "speaker": "Agent", "score": 40 },
                { "timestamp": 0, "speaker": "Customer", "score": 35 }
            ],
            "flaggedEvents": [
                { "t": 192, "issue": "Negative sentiment detected", "severity": "high" },
                { "t": "00:23", "issue": "Extended silence", "severity": "medium" }
            ],
            "metrics": {
                "responseTime": 1.4,
                "Accuracy": 92,
                "overall_sentiment": "Positive",
                "Compliance": "98%",
                "talkRatio": 0.5
            }
        })
    }

    #[test]
    fn test_normalize_sorts_series_per_channel() {
        let result = normalize(&sample_payload()).unwrap();

        let agent: Vec<f64> = result
            .series_for(SpeakerChannel::Agent)
            .map(|s| s.timestamp_seconds)
            .collect();
        let customer: Vec<f64> = result
            .series_for(SpeakerChannel::Customer)
            .map(|s| s.timestamp_seconds)
            .collect();

        assert_eq!(agent, vec![0.0, 20.0]);
        assert_eq!(customer, vec![0.0, 10.0]);
    }

    #[test]
    fn test_normalize_parses_clock_timestamps_and_sorts_events() {
        let result = normalize(&sample_payload()).unwrap();
        let events = result.flagged_events();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].timestamp_seconds, 23.0);
        assert_eq!(events[0].description, "Extended silence");
        assert_eq!(events[0].severity, Severity::Medium);
        assert_eq!(events[1].timestamp_seconds, 192.0);
    }

    #[test]
    fn test_normalize_formats_metrics() {
        let result = normalize(&sample_payload()).unwrap();

        assert_eq!(result.metric(MetricName::ResponseTime), Some("1.4s"));
        assert_eq!(result.metric(MetricName::Accuracy), Some("92%"));
        assert_eq!(result.metric(MetricName::OverallSentiment), Some("Positive"));
        assert_eq!(result.metric(MetricName::Compliance), Some("98%"));
        assert_eq!(result.metrics.len(), 4);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let payload = sample_payload();
        let first = normalize(&payload).unwrap();
        let second = normalize(&payload).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_normalize_rejects_missing_field() {
        let err = normalize(&json!({ "toneSeries": [] })).unwrap_err();
        assert!(matches!(err, DomainError::MalformedPayload { .. }));
    }

    #[test]
    fn test_normalize_rejects_wrong_type() {
        let err = normalize(&json!({ "toneSeries": "none", "flaggedEvents": [] })).unwrap_err();
        assert!(matches!(err, DomainError::MalformedPayload { .. }));
    }

    #[test]
    fn test_normalize_rejects_negative_timestamp() {
        let err = normalize(&json!({
            "toneSeries": [],
            "flaggedEvents": [{ "t": -1, "issue": "x", "severity": "low" }]
        }))
        .unwrap_err();
        assert!(matches!(err, DomainError::MalformedPayload { ref reason } if reason.contains("-1")));
    }

    #[test]
    fn test_normalize_rejects_overflowing_clock_timestamp() {
        let err = normalize(&json!({
            "toneSeries": [],
            "flaggedEvents": [{ "t": "18446744073709551615:00:00", "issue": "x", "severity": "low" }]
        }))
        .unwrap_err();
        assert!(matches!(err, DomainError::MalformedPayload { ref reason } if reason.contains("unrecognised timestamp")));
    }

    #[test]
    fn test_normalize_rejects_out_of_range_score() {
        let err = normalize(&json!({
            "toneSeries": [{ "t": 1, "speaker": "agent", "score": 120 }],
            "flaggedEvents": []
        }))
        .unwrap_err();
        assert!(matches!(err, DomainError::MalformedPayload { .. }));
    }

    #[test]
    fn test_normalize_rejects_unknown_labels() {
        let speaker = normalize(&json!({
            "toneSeries": [{ "t": 1, "speaker": "narrator", "score": 50 }],
            "flaggedEvents": []
        }));
        assert!(speaker.is_err());

        let severity = normalize(&json!({
            "toneSeries": [],
            "flaggedEvents": [{ "t": 1, "issue": "x", "severity": "critical" }]
        }));
        assert!(severity.is_err());
    }

    #[test]
    fn test_duplicates_collapse_to_first() {
        let result = normalize(&json!({
            "toneSeries": [
                { "t": 5, "speaker": "agent", "score": 10 },
                { "t": 5, "speaker": "bot", "score": 90 }
            ],
            "flaggedEvents": [
                { "t": 2, "issue": "Interruption", "severity": "low" },
                { "t": 2, "issue": "Interruption", "severity": "high" }
            ]
        }))
        .unwrap();

        assert_eq!(result.tone_series().len(), 1);
        assert_eq!(result.tone_series()[0].score, 10.0);
        assert_eq!(result.flagged_events().len(), 1);
        assert_eq!(result.flagged_events()[0].severity, Severity::Low);
    }

    #[test]
    fn test_derive_duration() {
        assert_eq!(derive_duration(&AnalysisResult::default()), 0.0);

        let result = normalize(&sample_payload()).unwrap();
        assert_eq!(result.duration_seconds(), 192.0);
    }

    #[test]
    fn test_overall_sentiment_derived_from_customer_tone() {
        let result = normalize(&json!({
            "toneSeries": [
                { "t": 1, "speaker": "customer", "score": 20 },
                { "t": 2, "speaker": "customer", "score": 30 }
            ],
            "flaggedEvents": []
        }))
        .unwrap();

        // 平均 25 → compound -0.5
        assert_eq!(result.metric(MetricName::OverallSentiment), Some("Negative"));
    }

    #[test]
    fn test_metric_number_sentiment_and_bad_type() {
        let result = normalize(&json!({
            "toneSeries": [],
            "flaggedEvents": [],
            "metrics": { "OverallSentiment": 0.01 }
        }))
        .unwrap();
        assert_eq!(result.metric(MetricName::OverallSentiment), Some("Neutral"));

        let err = normalize(&json!({
            "toneSeries": [],
            "flaggedEvents": [],
            "metrics": { "Accuracy": true }
        }));
        assert!(err.is_err());
    }

    #[test]
    fn test_table_order() {
        let mut events = vec![
            FlaggedEvent::new(5.0, "A", Severity::Low),
            FlaggedEvent::new(2.0, "B", Severity::High),
            FlaggedEvent::new(2.0, "C", Severity::Medium),
        ];
        events.sort_by(table_order);

        let descriptions: Vec<&str> = events.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_speaker_and_metric_parsing() {
        assert_eq!(SpeakerChannel::parse("Bot"), Some(SpeakerChannel::Agent));
        assert_eq!(SpeakerChannel::parse(" HUMAN "), Some(SpeakerChannel::Customer));
        assert_eq!(MetricName::parse("response_time"), Some(MetricName::ResponseTime));
        assert_eq!(MetricName::parse("OverallSentiment"), Some(MetricName::OverallSentiment));
        assert_eq!(MetricName::parse("latency"), None);
    }
}
