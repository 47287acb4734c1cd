/// テーマコマンド
///
/// 表示テーマの確認・変更を行い、変更はユーザー設定ファイルに保存する。
use crate::commands::result::{CommandResult, ThemeResult};
use crate::config::{ThemePreference, UserConfig};
use anyhow::{Context, Result};
use std::path::Path;

/// テーマに対する操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeAction {
    Show,
    Set(ThemePreference),
    Toggle,
}

/// テーマコマンドを実行
pub async fn execute(action: ThemeAction) -> Result<CommandResult> {
    let config_path =
        UserConfig::config_path().context("Failed to locate the user configuration file")?;
    execute_with_path(action, &config_path)
}

/// 設定ファイルのパスを指定して実行する
pub fn execute_with_path(action: ThemeAction, config_path: &Path) -> Result<CommandResult> {
    let mut config = UserConfig::load_from(config_path)
        .context("Failed to load user configuration. Please check your config.toml file.")?;

    let previous = config.theme;
    let theme = match action {
        ThemeAction::Show => previous,
        ThemeAction::Set(theme) => theme,
        ThemeAction::Toggle => previous.toggled(),
    };

    let changed = theme != previous;
    if changed {
        config.theme = theme;
        config
            .save_to(config_path)
            .context("Failed to save the theme preference")?;
        tracing::debug!(%previous, %theme, "theme preference updated");
    }

    Ok(CommandResult::Theme(ThemeResult {
        theme,
        previous,
        changed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn theme_result(result: CommandResult) -> ThemeResult {
        match result {
            CommandResult::Theme(r) => r,
            other => panic!("expected theme result, got {:?}", other),
        }
    }

    #[test]
    fn test_show_does_not_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let r = theme_result(execute_with_path(ThemeAction::Show, &path).unwrap());
        assert_eq!(r.theme, ThemePreference::Light);
        assert!(!r.changed);
    }

    #[test]
    fn test_toggle_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let r = theme_result(execute_with_path(ThemeAction::Toggle, &path).unwrap());
        assert_eq!(r.previous, ThemePreference::Light);
        assert_eq!(r.theme, ThemePreference::Dark);
        assert!(r.changed);

        let reloaded = UserConfig::load_from(&path).unwrap();
        assert_eq!(reloaded.theme, ThemePreference::Dark);

        let r = theme_result(execute_with_path(ThemeAction::Toggle, &path).unwrap());
        assert_eq!(r.theme, ThemePreference::Light);
    }

    #[test]
    fn test_set_same_theme_is_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let r = theme_result(
            execute_with_path(ThemeAction::Set(ThemePreference::Light), &path).unwrap(),
        );
        assert!(!r.changed);

        let r = theme_result(
            execute_with_path(ThemeAction::Set(ThemePreference::Dark), &path).unwrap(),
        );
        assert!(r.changed);
    }

    #[test]
    fn test_invalid_config_reports_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "theme = \"sepia\"").unwrap();

        let err = execute_with_path(ThemeAction::Show, &path).unwrap_err();
        assert!(err.to_string().contains("Failed to load user configuration"));
    }
}
