/// ドメイン層: アップロードセッションとその状態機械
///
/// ファイル取得 → 解析要求 → 結果/エラー の遷移を一箇所で管理する。
/// 状態を変更するのは `UploadController` だけで、`&mut self` 経由の
/// 単一ミューテータなのでロックは持たない。
///
/// ```text
/// Empty --acquire--> Selected --submit--> Submitting --(ok)--> Succeeded
///                                              |--(err)--> Failed
/// Selected/Succeeded/Failed --remove--> Empty
/// ```
use crate::domain::error::{DomainError, SessionError};
use crate::domain::file::AudioFile;
use crate::domain::model::AnalysisResult;
use crate::domain::progress::{SessionEvent, SessionPhase};
use crate::domain::validator;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use tokio::sync::mpsc;

/// 解析サービスとの境界
///
/// コントローラは具体的な通信方法を知らない。
/// エラー型は `SessionError` に変換できれば何でもよい。
pub trait AnalysisService {
    type Error: Into<SessionError>;

    /// ファイルを1回だけ送信し、解析結果を待つ
    fn analyze(&self, file: &AudioFile)
    -> impl Future<Output = Result<AnalysisResult, Self::Error>>;
}

/// セッションの状態（`SessionState` の平坦な射影）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Empty,
    Selected,
    Submitting,
    Succeeded,
    Failed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Empty => "empty",
            Self::Selected => "selected",
            Self::Submitting => "submitting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// 状態ごとに保持するデータ
///
/// 取得時の検証で失敗した `Failed` だけはファイルを持たない。
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Empty,
    Selected {
        file: AudioFile,
    },
    Submitting {
        file: AudioFile,
    },
    Succeeded {
        file: AudioFile,
        result: AnalysisResult,
    },
    Failed {
        file: Option<AudioFile>,
        error: SessionError,
    },
}

/// 1ファイル分のセッション
#[derive(Debug, Clone, Default)]
pub struct UploadSession {
    state: SessionState,
}

impl UploadSession {
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn status(&self) -> SessionStatus {
        match self.state {
            SessionState::Empty => SessionStatus::Empty,
            SessionState::Selected { .. } => SessionStatus::Selected,
            SessionState::Submitting { .. } => SessionStatus::Submitting,
            SessionState::Succeeded { .. } => SessionStatus::Succeeded,
            SessionState::Failed { .. } => SessionStatus::Failed,
        }
    }

    pub fn file(&self) -> Option<&AudioFile> {
        match &self.state {
            SessionState::Empty => None,
            SessionState::Selected { file }
            | SessionState::Submitting { file }
            | SessionState::Succeeded { file, .. } => Some(file),
            SessionState::Failed { file, .. } => file.as_ref(),
        }
    }

    pub fn error(&self) -> Option<&SessionError> {
        match &self.state {
            SessionState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.state {
            SessionState::Succeeded { result, .. } => Some(result),
            _ => None,
        }
    }
}

/// ファイルの取得元
#[derive(Debug, Clone)]
pub enum FileSource {
    /// ドラッグ&ドロップ（CLIからは使わない）
    #[allow(dead_code)]
    Drop(Vec<AudioFile>),
    /// ファイル選択ダイアログ
    Picker(Vec<AudioFile>),
}

impl FileSource {
    fn origin(&self) -> &'static str {
        match self {
            Self::Drop(_) => "drop",
            Self::Picker(_) => "picker",
        }
    }

    fn into_files(self) -> Vec<AudioFile> {
        match self {
            Self::Drop(files) | Self::Picker(files) => files,
        }
    }
}

/// ドラッグ中の表示用イベント
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum DragEvent {
    Enter,
    Over,
    Leave,
}

/// 送信中の解析要求
///
/// `begin_submit` が発行し、`complete_submit` が消費する。
#[derive(Debug)]
pub struct SubmissionTicket {
    file: AudioFile,
    generation: u64,
}

impl SubmissionTicket {
    pub fn file(&self) -> &AudioFile {
        &self.file
    }
}

/// アップロードセッションの状態機械
pub struct UploadController<S> {
    service: S,
    session: UploadSession,
    /// 取得・削除・破棄のたびに進むセッション世代
    generation: u64,
    drag_active: bool,
    subscribers: Vec<mpsc::UnboundedSender<SessionEvent>>,
}

impl<S: AnalysisService> UploadController<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            session: UploadSession::default(),
            generation: 0,
            drag_active: false,
            subscribers: Vec::new(),
        }
    }

    pub fn session(&self) -> &UploadSession {
        &self.session
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    /// ドロップ領域の強調表示フラグ。状態遷移には関与しない
    #[allow(dead_code)]
    pub fn drag_active(&self) -> bool {
        self.drag_active
    }

    /// 状態遷移イベントの受信口を登録する
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    #[allow(dead_code)]
    pub fn handle_drag(&mut self, event: DragEvent) {
        self.drag_active = matches!(event, DragEvent::Enter | DragEvent::Over);
    }

    /// ドロップ: 強調表示を解除してからファイルを取得する
    #[allow(dead_code)]
    pub fn drop_files(&mut self, files: Vec<AudioFile>) -> Result<SessionStatus, DomainError> {
        self.drag_active = false;
        self.acquire_file(FileSource::Drop(files))
    }

    /// ファイルを取得する
    ///
    /// 先頭の1件だけを使う。ファイルなし・検証失敗はエラーを返さず
    /// `Failed` 状態として表現する。
    ///
    /// # Errors
    /// 解析中は `SessionBusy`
    pub fn acquire_file(&mut self, source: FileSource) -> Result<SessionStatus, DomainError> {
        self.ensure_not_submitting("acquire a file")?;

        self.generation += 1;
        let origin = source.origin();
        let files = source.into_files();
        if files.len() > 1 {
            tracing::debug!(
                origin,
                ignored = files.len() - 1,
                "multiple files provided; keeping the first"
            );
        }

        let Some(file) = files.into_iter().next() else {
            self.reject_acquisition(DomainError::NoFileProvided);
            return Ok(self.status());
        };

        match validator::validate_audio_file(&file) {
            Ok(format) => {
                tracing::debug!(origin, file = %file.name, %format, "file acquired");
                let phase = SessionPhase::FileAcquired {
                    file_name: file.name.clone(),
                    size_bytes: file.size_bytes,
                    mime_type: file.mime_type.clone(),
                    format,
                };
                self.session.state = SessionState::Selected { file };
                self.emit(phase);
            }
            Err(e) => self.reject_acquisition(e),
        }

        Ok(self.status())
    }

    fn reject_acquisition(&mut self, error: DomainError) {
        tracing::debug!(%error, "acquisition rejected");
        let error = SessionError::validation(&error);
        let phase = SessionPhase::AcquisitionRejected {
            message: error.message.clone(),
        };
        self.session.state = SessionState::Failed { file: None, error };
        self.emit(phase);
    }

    /// ファイルを取り除き `Empty` に戻す
    ///
    /// # Errors
    /// 解析中は `SessionBusy`（状態は変わらない）
    #[allow(dead_code)]
    pub fn remove_file(&mut self) -> Result<(), DomainError> {
        self.ensure_not_submitting("remove the file")?;

        self.generation += 1;
        let previous = std::mem::take(&mut self.session.state);
        if !matches!(previous, SessionState::Empty) {
            tracing::debug!(generation = self.generation, "file removed");
            self.emit(SessionPhase::FileRemoved);
        }
        Ok(())
    }

    /// ホスト側の後始末（画面離脱など）
    ///
    /// 解析中でも `Empty` に戻し、遅れて届く応答は世代不一致で捨てる。
    #[allow(dead_code)]
    pub fn discard(&mut self) {
        self.generation += 1;
        self.session.state = SessionState::Empty;
        self.drag_active = false;
        tracing::debug!(generation = self.generation, "session discarded");
    }

    /// 解析要求を開始する
    ///
    /// `Selected`、またはファイルを保持した `Failed`（再試行）から `Submitting` へ。
    /// すでに `Submitting` なら何もせず `None`。
    ///
    /// # Errors
    /// 送信できるファイルがない場合は `NotReady`（状態は変わらない）
    pub fn begin_submit(&mut self) -> Result<Option<SubmissionTicket>, DomainError> {
        let file = match &self.session.state {
            SessionState::Submitting { .. } => {
                tracing::debug!("analysis already in progress; submit ignored");
                return Ok(None);
            }
            SessionState::Selected { file }
            | SessionState::Failed {
                file: Some(file), ..
            } => file.clone(),
            _ => {
                return Err(DomainError::NotReady {
                    status: self.status().to_string(),
                });
            }
        };

        tracing::info!(file = %file.name, size_bytes = file.size_bytes, "submitting recording for analysis");
        self.session.state = SessionState::Submitting { file: file.clone() };
        self.emit(SessionPhase::AnalysisStarted {
            file_name: file.name.clone(),
            size_bytes: file.size_bytes,
        });

        Ok(Some(SubmissionTicket {
            file,
            generation: self.generation,
        }))
    }

    /// 解析結果を反映する
    ///
    /// 世代が変わっている（破棄済み）か、もう `Submitting` でない場合は捨てて `false`。
    pub fn complete_submit(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<AnalysisResult, S::Error>,
    ) -> bool {
        if ticket.generation != self.generation
            || self.status() != SessionStatus::Submitting
        {
            tracing::debug!(
                ticket_generation = ticket.generation,
                current_generation = self.generation,
                "discarding completion for an abandoned session"
            );
            self.emit(SessionPhase::CompletionDiscarded {
                generation: ticket.generation,
            });
            return false;
        }

        let file = ticket.file;
        match outcome {
            Ok(result) => {
                tracing::info!(
                    file = %file.name,
                    flagged_events = result.flagged_events().len(),
                    "analysis succeeded"
                );
                let phase = SessionPhase::AnalysisSucceeded {
                    flagged_events: result.flagged_events().len(),
                    tone_samples: result.tone_series().len(),
                    duration_seconds: result.duration_seconds(),
                };
                self.session.state = SessionState::Succeeded { file, result };
                self.emit(phase);
            }
            Err(e) => {
                let error: SessionError = e.into();
                tracing::info!(file = %file.name, kind = ?error.kind, error = %error, "analysis failed");
                let phase = SessionPhase::AnalysisFailed {
                    kind: error.kind,
                    message: error.message.clone(),
                };
                self.session.state = SessionState::Failed {
                    file: Some(file),
                    error,
                };
                self.emit(phase);
            }
        }
        true
    }

    /// 解析要求を送信し、結果を待って反映する
    ///
    /// 解析中に呼ばれた場合は新しい要求を出さない。
    pub async fn submit(&mut self) -> Result<SessionStatus, DomainError> {
        let Some(ticket) = self.begin_submit()? else {
            return Ok(self.status());
        };

        let outcome = self.service.analyze(ticket.file()).await;
        self.complete_submit(ticket, outcome);
        Ok(self.status())
    }

    fn ensure_not_submitting(&self, action: &'static str) -> Result<(), DomainError> {
        if self.status() == SessionStatus::Submitting {
            tracing::debug!(action, "rejected while submitting");
            return Err(DomainError::SessionBusy { action });
        }
        Ok(())
    }

    fn emit(&mut self, phase: SessionPhase) {
        let event = SessionEvent::new(phase, self.generation);
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
