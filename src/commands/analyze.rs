/// 解析コマンド
///
/// 1つの音声ファイルを読み込み、アップロードセッションに取得させてから
/// 解析サービスへ送信し、結果を `CommandResult` として返す。
use crate::api::analysis::AnalysisClient;
use crate::commands::result::{AnalyzeResult, CommandResult};
use crate::config::ServiceSettings;
use crate::domain::file::AudioFile;
use crate::domain::progress::SessionEvent;
use crate::domain::session::{AnalysisService, FileSource, SessionState, UploadController};
use crate::presentation::output;
use anyhow::{Context, Result, bail};
use chrono::Utc;
use std::path::Path;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// 解析コマンドを実行
///
/// # Arguments
/// * `file_path` - 解析する音声ファイルのパス
/// * `settings` - 起動時に読み込んだ解析サービス設定
/// * `show_progress` - セッションイベントを逐次表示するか
/// * `machine_output` - 進捗をJSONで出すか
pub async fn execute(
    file_path: &str,
    settings: &ServiceSettings,
    show_progress: bool,
    machine_output: bool,
) -> Result<CommandResult> {
    let client =
        AnalysisClient::new(settings).context("Failed to initialize the analysis client")?;

    run(client, file_path, show_progress, machine_output).await
}

/// サービスを差し替え可能な本体
async fn run<S: AnalysisService>(
    service: S,
    file_path: &str,
    show_progress: bool,
    machine_output: bool,
) -> Result<CommandResult> {
    let file = AudioFile::load(Path::new(file_path))
        .await
        .with_context(|| format!("Failed to read audio file '{}'", file_path))?;

    let mut controller = UploadController::new(service);
    let progress_task = show_progress
        .then(|| spawn_progress_printer(controller.subscribe(), machine_output));

    controller.acquire_file(FileSource::Picker(vec![file]))?;
    if let SessionState::Failed { error, .. } = controller.session().state() {
        let error = error.clone();
        finish_progress(controller, progress_task).await;
        return Err(anyhow::Error::new(error))
            .with_context(|| format!("'{}' cannot be analyzed", file_path));
    }

    controller
        .submit()
        .await
        .context("Failed to submit the recording")?;

    let outcome = match controller.session().state() {
        SessionState::Succeeded { file, result } => Ok(AnalyzeResult {
            file_path: file_path.to_string(),
            file_name: file.name.clone(),
            file_size: file.size_bytes,
            mime_type: file.mime_type.clone(),
            analyzed_at: Utc::now(),
            analysis: result.clone(),
        }),
        SessionState::Failed { error, .. } => Err(error.clone()),
        _ => bail!(
            "analysis ended in unexpected state: {}",
            controller.status()
        ),
    };
    finish_progress(controller, progress_task).await;

    match outcome {
        Ok(result) => Ok(CommandResult::Analyze(result)),
        Err(error) => Err(anyhow::Error::new(error))
            .with_context(|| format!("Analysis of '{}' failed", file_path)),
    }
}

fn spawn_progress_printer(
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
    machine_output: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            output::output_progress(&event, machine_output);
        }
    })
}

/// コントローラを破棄して送信側を閉じ、残りの進捗を出し切る
async fn finish_progress<S: AnalysisService>(
    controller: UploadController<S>,
    progress_task: Option<JoinHandle<()>>,
) {
    drop(controller);
    if let Some(task) = progress_task
        && let Err(e) = task.await
    {
        tracing::warn!(error = %e, "progress printer stopped unexpectedly");
    }
}
