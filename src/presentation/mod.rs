/// プレゼンテーション層モジュール
///
/// ドメイン層のビジネスロジックとUI表示の橋渡しを行います。
/// Clean Architectureの依存方向に従い、プレゼンテーション層は
/// ドメイン層に依存しますが、その逆はありません。
///
/// # モジュール
/// - `output`: コマンド結果の出力（人間向け・機械向け）
/// - `progress`: セッションイベントの表示DTO変換
/// - `timeline`: フラグ付きイベントの配置と一覧表
/// - `chart`: トーン/感情の比較チャート
/// - `theme`: プロセス全体の表示テーマ
pub mod chart;
pub mod output;
pub mod progress;
pub mod theme;
pub mod timeline;
