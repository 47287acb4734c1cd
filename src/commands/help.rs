use crate::commands::result::CommandResult;

/// ヘルプコマンドを実行
///
/// # Returns
/// 表示自体はプレゼンテーション層が行う
pub async fn execute() -> anyhow::Result<CommandResult> {
    Ok(CommandResult::Help)
}
