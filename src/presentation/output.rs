/// プレゼンテーション層: コマンド結果の出力
///
/// コマンド実行結果をユーザー向け（人間可読）または
/// 機械向け（JSON）形式で出力する責務を担います。
/// CLI使用方法の表示もこのモジュールが担当します。
use crate::commands::result::{AnalyzeResult, CommandResult};
use crate::domain::formatter::{format_offset, format_size_mb};
use crate::domain::model::MetricName;
use crate::domain::progress::SessionEvent;
use crate::error_severity::ErrorSeverity;
use crate::presentation::chart::{AGENT_CHART_TITLE, CUSTOMER_CHART_TITLE, ToneChart};
use crate::presentation::progress::DisplayProgress;
use crate::presentation::theme::{self, Palette};
use crate::presentation::timeline;
use anyhow::Result;
use serde::Serialize;
use std::io::IsTerminal;

/// ヘルプテキスト（単一の情報源）
const HELP_TEXT: &str = "qabot
Analyze call-center recordings: tone timeline and flagged issues

Usage:
  qabot [--machine] <command> [args...]

Global Flags:
  --machine        - Output machine-readable JSON to stdout (for scripting)
                     Works for both success and error cases

Available commands:
  analyze <file> [--progress]
                   - Upload an MP3, WAV or M4A recording for analysis
                     --progress: Show session progress while analyzing
  theme [light|dark|toggle]
                   - Show or change the display theme
  help             - Display this help message

Environment:
  QABOT_API_URL    - Base URL of the analysis service (default: http://localhost:5000)
  QABOT_LOG        - Log filter, e.g. 'debug' or 'qabot=trace' (default: warn)

Error Output:
  Normal mode:   Human-readable error messages to stderr
  --machine:     JSON error object with exit_code and hint fields

Progress Output:
  analyze --progress             - Show human-readable progress to stderr
  --machine analyze --progress   - Output machine-readable JSON progress to stdout";

/// タイムラインとチャートの描画幅（文字数）
const TIMELINE_WIDTH: usize = 60;
const CHART_HEIGHT: usize = 10;

/// コマンド結果を適切な形式で出力する
///
/// # Output
/// * `machine_output = false`: 人間向けの詳細メッセージ（stderr）
/// * `machine_output = true`: 機械可読JSON（stdout）
pub fn output_result(result: &CommandResult, machine_output: bool) -> Result<()> {
    if machine_output {
        output_machine_readable(result)?;
    } else {
        output_human_readable(result)?;
    }

    Ok(())
}

/// 人間向けの詳細メッセージを出力（stderr）
fn output_human_readable(result: &CommandResult) -> Result<()> {
    match result {
        CommandResult::Analyze(r) => {
            for line in analysis_report_lines(r, color_enabled()) {
                eprintln!("{}", line);
            }
        }
        CommandResult::Theme(_) => {
            eprintln!("{}", result.success_message());
        }
        CommandResult::Help => {
            eprintln!("{}", HELP_TEXT);
        }
    }

    Ok(())
}

fn color_enabled() -> bool {
    std::io::stderr().is_terminal()
}

/// 解析結果の人間向けレポートを組み立てる
fn analysis_report_lines(r: &AnalyzeResult, color: bool) -> Vec<String> {
    let palette = Palette::current();
    let heading = |text: &str| theme::paint(text, palette.heading, color);
    let analysis = &r.analysis;
    let duration = analysis.duration_seconds();

    let mut lines = vec![
        String::new(),
        heading("Analysis completed successfully!"),
        "---".to_string(),
        format!(
            "File:        {} ({}, {})",
            r.file_name,
            format_size_mb(r.file_size),
            r.mime_type
        ),
        format!("Duration:    {}", format_offset(duration)),
        format!(
            "Analyzed at: {}",
            r.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        String::new(),
        heading("Metrics:"),
    ];

    for name in MetricName::ALL {
        lines.push(format!(
            "  {:<18} {}",
            name.label(),
            analysis.metric(name).unwrap_or("n/a")
        ));
    }

    lines.push(String::new());
    lines.push(heading("Timeline:"));
    let markers = timeline::layout(analysis.flagged_events(), duration);
    for track in timeline::render_timeline(&markers, TIMELINE_WIDTH) {
        lines.push(format!("  {}", track));
    }
    lines.push(format!("  {}", timeline::render_axis(duration, TIMELINE_WIDTH)));
    lines.push("  ! high   * medium   . low".to_string());

    lines.push(String::new());
    lines.push(heading("Flagged Issues:"));
    let rows = timeline::table_rows(analysis.flagged_events());
    if rows.is_empty() {
        lines.push("  No issues flagged.".to_string());
    } else {
        let rendered = timeline::render_table(&rows);
        let (header, body) = rendered.split_at(1);
        lines.extend(header.iter().map(|h| format!("  {}", h)));
        for (row, text) in rows.iter().zip(body) {
            lines.push(format!(
                "  {}",
                theme::paint(text, palette.severity(row.severity), color)
            ));
        }
    }

    lines.push(String::new());
    lines.push(heading(&format!(
        "{} (A) / {} (C)",
        AGENT_CHART_TITLE, CUSTOMER_CHART_TITLE
    )));
    let chart = ToneChart::from_result(analysis);
    if chart.is_empty() {
        lines.push("  No tone data.".to_string());
    } else {
        for row in chart.render(TIMELINE_WIDTH, CHART_HEIGHT) {
            lines.push(format!("  {}", row));
        }
        lines.push(format!(
            "       {}",
            timeline::render_axis(duration, TIMELINE_WIDTH)
        ));
        lines.push(format!(
            "  {} Agent   {} Customer   # both",
            theme::paint("A", palette.agent, color),
            theme::paint("C", palette.customer, color)
        ));
    }
    lines.push("---".to_string());

    lines
}

/// 機械可読JSONを出力（stdout）
fn output_machine_readable(result: &CommandResult) -> Result<()> {
    let json = match result {
        CommandResult::Analyze(r) => {
            let analysis = &r.analysis;
            let duration = analysis.duration_seconds();
            serde_json::json!({
                "success": true,
                "command": "analyze",
                "file_path": r.file_path,
                "file_name": r.file_name,
                "file_size": r.file_size,
                "mime_type": r.mime_type,
                "analyzed_at": r.analyzed_at,
                "duration_seconds": duration,
                "analysis": analysis,
                "markers": timeline::layout(analysis.flagged_events(), duration),
                "issues": timeline::table_rows(analysis.flagged_events()),
                "chart": ToneChart::from_result(analysis),
            })
        }
        CommandResult::Theme(r) => {
            serde_json::json!({
                "success": true,
                "command": "theme",
                "theme": r.theme,
                "previous": r.previous,
                "changed": r.changed
            })
        }
        CommandResult::Help => {
            serde_json::json!({
                "success": true,
                "command": "help"
            })
        }
    };

    println!("{}", serde_json::to_string(&json)?);
    Ok(())
}

/// セッションイベントを進捗として出力する
///
/// 機械向けは1イベント1行のJSON（stdout）、人間向けはメッセージ（stderr）。
pub fn output_progress(event: &SessionEvent, machine_output: bool) {
    if machine_output {
        let line = serde_json::json!({ "progress": event });
        match serde_json::to_string(&line) {
            Ok(text) => println!("{}", text),
            Err(e) => tracing::warn!(error = %e, "failed to serialize progress event"),
        }
        return;
    }

    if let Some(progress) = Option::<DisplayProgress>::from(event) {
        eprintln!("{}", progress.message);
        if let Some(details) = progress.details {
            eprintln!("  {}", details);
        }
    }
}

/// エラー出力の内容
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub message: String,
    pub causes: Vec<String>,
    pub severity: ErrorSeverity,
    pub exit_code: i32,
    pub hint: Option<String>,
}

/// エラーを適切な形式で出力する
pub fn output_error(report: &ErrorReport, machine_output: bool) {
    if machine_output {
        let json = serde_json::json!({
            "success": false,
            "error": report,
        });
        match serde_json::to_string(&json) {
            Ok(text) => println!("{}", text),
            // シリアライズできない場合でも最低限の情報は残す
            Err(_) => eprintln!("Error: {}", report.message),
        }
        return;
    }

    eprintln!("Error: {}", report.message);
    if !report.causes.is_empty() {
        eprintln!("\nCaused by:");
        for (i, cause) in report.causes.iter().enumerate() {
            eprintln!("  {}: {}", i + 1, cause);
        }
    }
    if let Some(hint) = &report.hint {
        eprintln!("\nHint: {}", hint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::result::ThemeResult;
    use crate::config::ThemePreference;
    use crate::domain::model::normalize;
    use chrono::{TimeZone, Utc};

    fn analyze_result() -> AnalyzeResult {
        let analysis = normalize(&serde_json::json!({
            "toneSeries": [
                { "t": 0, "speaker": "agent", "score": 60 },
                { "t": 48, "speaker": "customer", "score": 80 }
            ],
            "flaggedEvents": [
                { "t": 12, "issue": "Extended silence", "severity": "medium" },
                { "t": 30, "issue": "Interrupted customer", "severity": "high" }
            ],
            "metrics": { "ResponseTime": 1.4 }
        }))
        .unwrap();

        AnalyzeResult {
            file_path: "/tmp/call.wav".to_string(),
            file_name: "call.wav".to_string(),
            file_size: 2 * 1024 * 1024,
            mime_type: "audio/wav".to_string(),
            analyzed_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap(),
            analysis,
        }
    }

    #[test]
    fn test_analysis_report_plain() {
        let lines = analysis_report_lines(&analyze_result(), false);
        let report = lines.join("\n");

        assert!(report.contains("File:        call.wav (2.00 MB, audio/wav)"));
        assert!(report.contains("Duration:    00:48"));
        assert!(report.contains("Analyzed at: 2024-01-01 09:30:00 UTC"));
        assert!(report.contains("Response Time      1.4s"));
        assert!(report.contains("Overall Sentiment  Positive"));
        assert!(report.contains("Compliance         n/a"));
        assert!(report.contains(AGENT_CHART_TITLE));
        assert!(!report.contains('\x1b'));

        // 表は重大度の高い順
        let high = report.find("Interrupted customer").unwrap();
        let medium = report.find("Extended silence").unwrap();
        assert!(high < medium);
    }

    #[test]
    fn test_analysis_report_empty_result() {
        let mut result = analyze_result();
        result.analysis = Default::default();

        let report = analysis_report_lines(&result, false).join("\n");
        assert!(report.contains("No issues flagged."));
        assert!(report.contains("No tone data."));
    }

    #[test]
    fn test_output_machine_readable_analyze() {
        let result = CommandResult::Analyze(analyze_result());
        assert!(output_machine_readable(&result).is_ok());
    }

    #[test]
    fn test_output_machine_readable_theme() {
        let result = CommandResult::Theme(ThemeResult {
            theme: ThemePreference::Dark,
            previous: ThemePreference::Light,
            changed: true,
        });
        assert!(output_machine_readable(&result).is_ok());
    }

    #[test]
    fn test_output_result_modes() {
        assert!(output_result(&CommandResult::Help, true).is_ok());
        assert!(output_result(&CommandResult::Help, false).is_ok());
    }

    #[test]
    fn test_error_report_serializes() {
        let report = ErrorReport {
            message: "Analysis of 'call.wav' failed".to_string(),
            causes: vec!["decode failed".to_string()],
            severity: ErrorSeverity::ServiceError,
            exit_code: ErrorSeverity::ServiceError.exit_code(),
            hint: None,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["severity"], "service_error");
        assert_eq!(json["exit_code"], 4);
        assert_eq!(json["causes"][0], "decode failed");
    }
}
