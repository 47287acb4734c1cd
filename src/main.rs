mod api;
mod cli;
mod commands;
mod config;
mod domain;
mod error_severity;
mod logging;
mod presentation;

use anyhow::Result;
use api::error::AnalysisError;
use config::error::ConfigError;
use config::{ServiceSettings, UserConfig};
use domain::error::{DomainError, SessionError};
use error_severity::ErrorSeverity;
use presentation::output::{self, ErrorReport};
use std::env;

#[tokio::main]
async fn main() {
    logging::init();

    let args: Vec<String> = env::args().collect();
    let machine_output = cli::wants_machine_output(&args);

    if let Err(e) = run(&args).await {
        handle_error(e, machine_output);
    }
}

/// アプリケーションのメイン処理
async fn run(args: &[String]) -> Result<()> {
    let parsed = cli::parse_args(args)?;
    init_theme();

    let result = cli::dispatch(&parsed, ServiceSettings::from_env).await?;
    output::output_result(&result, parsed.machine_output)
}

/// ユーザー設定のテーマを反映する
///
/// テーマは表示だけの設定なので、読み込めなくても処理は続ける。
fn init_theme() {
    match UserConfig::load() {
        Ok(config) => {
            presentation::theme::init(config.theme);
        }
        Err(e) => tracing::warn!(error = %e, "failed to load user config; using default theme"),
    }
}

/// エラーハンドリングとユーザーへの表示
///
/// anyhow::Error から元のエラー型を downcast して、
/// エラーの種類に応じた exit code とメッセージを決定する。
fn handle_error(error: anyhow::Error, machine_output: bool) -> ! {
    let severity = determine_severity(&error);
    let report = ErrorReport {
        message: error.to_string(),
        causes: error.chain().skip(1).map(|c| c.to_string()).collect(),
        severity,
        exit_code: severity.exit_code(),
        hint: get_error_hint(&error),
    };

    output::output_error(&report, machine_output);
    std::process::exit(report.exit_code);
}

/// エラーチェーンから深刻度を決定
fn determine_severity(error: &anyhow::Error) -> ErrorSeverity {
    for cause in error.chain() {
        if let Some(domain_err) = cause.downcast_ref::<DomainError>() {
            return domain_err.severity();
        }

        if let Some(session_err) = cause.downcast_ref::<SessionError>() {
            return session_err.severity();
        }

        if let Some(analysis_err) = cause.downcast_ref::<AnalysisError>() {
            return analysis_err.severity();
        }

        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return config_err.severity();
        }
    }

    // 引数の誤りなど、型付けされていないエラーは利用者側の問題として扱う
    ErrorSeverity::UserError
}

/// エラーに対するユーザー向けヒントを取得
fn get_error_hint(error: &anyhow::Error) -> Option<String> {
    for cause in error.chain() {
        let hint = if let Some(domain_err) = cause.downcast_ref::<DomainError>() {
            domain_err.hint()
        } else if let Some(session_err) = cause.downcast_ref::<SessionError>() {
            session_err.hint()
        } else if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            config_err.hint()
        } else {
            None
        };

        if let Some(hint) = hint {
            return Some(hint.to_string());
        }
    }

    None
}
