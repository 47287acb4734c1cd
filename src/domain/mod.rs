/// ドメイン層モジュール
///
/// 外部I/O（HTTP、設定ファイル）に依存しない規則を置く。
/// ファイル読み込みだけは `file::AudioFile::load` が tokio::fs 経由で行う。
///
/// # モジュール
/// - `session`: アップロードセッションの状態機械
/// - `model` / `payload`: 解析結果の正規化
/// - `validator`: 取得時のファイル検証
/// - `progress`: ホストへ通知する遷移イベント
pub mod error;
pub mod file;
pub mod formatter;
pub mod model;
pub mod payload;
pub mod progress;
pub mod session;
pub mod validator;
