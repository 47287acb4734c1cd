/// ユーザー設定モジュール
///
/// 実行時にユーザーディレクトリから読み込まれる動的設定を管理します。
/// Windows: C:\Users\<User>\AppData\Roaming\qabot\config.toml
/// macOS:   /Users/<User>/Library/Application Support/qabot/config.toml
/// Linux:   /home/<user>/.config/qabot/config.toml
///
/// 初回起動時にデフォルト値から自動的にconfig.tomlを作成します。
/// 保持するのは表示テーマのみで、解析パイプラインとは無関係です。
use crate::config::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 表示テーマ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    /// ライト/ダークを反転する
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// 画面表示用のラベル
    pub fn label(self) -> &'static str {
        match self {
            Self::Light => "Light Mode",
            Self::Dark => "Dark Mode",
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for ThemePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme '{}' (expected: light, dark)", other)),
        }
    }
}

/// ユーザー設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    /// 表示テーマ
    #[serde(default)]
    pub theme: ThemePreference,
}

impl UserConfig {
    /// ユーザー設定ファイルのパスを取得
    ///
    /// # Errors
    /// 設定ディレクトリが取得できない場合に ConfigError::DirectoryNotFound を返します。
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .ok_or_else(|| ConfigError::directory_not_found("Failed to get user config directory"))
            .map(|config_dir| config_dir.join("qabot").join("config.toml"))
    }

    /// ユーザー設定を読み込む
    ///
    /// 設定ファイルが存在しない場合は、デフォルトテンプレートから自動的に作成します。
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// 指定パスからユーザー設定を読み込む
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            Self::create_default_config(config_path)?;
        }

        let content = fs::read_to_string(config_path).map_err(|e| {
            ConfigError::file_system(
                format!("Failed to read config file: {}", config_path.display()),
                e,
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            ConfigError::parse_error(
                format!("Failed to parse config file ({})", config_path.display()),
                e,
            )
        })
    }

    /// デフォルト設定ファイルを作成
    fn create_default_config(config_path: &Path) -> Result<(), ConfigError> {
        Self::ensure_parent_dir(config_path)?;

        fs::write(config_path, Self::default_toml_content()).map_err(|e| {
            ConfigError::file_system(
                format!("Failed to create default config file: {}", config_path.display()),
                e,
            )
        })?;

        tracing::debug!(path = %config_path.display(), "created default user config");
        Ok(())
    }

    /// デフォルトTOML設定を生成
    ///
    /// Default 実装の値から生成し、Rust側のデフォルト値とテンプレートを同期させる。
    fn default_toml_content() -> String {
        format!(
            r#"# qabot - User Configuration
# Change the theme with 'qabot theme <light|dark|toggle>'

# Display theme: "light" or "dark"
theme = "{}"
"#,
            ThemePreference::default()
        )
    }

    /// 指定パスにユーザー設定を保存する
    pub fn save_to(&self, config_path: &Path) -> Result<(), ConfigError> {
        Self::ensure_parent_dir(config_path)?;

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::serialize_error("Failed to serialize config", e))?;

        // 同じディレクトリの一時ファイルに書いてから置き換える
        let temp_path = config_path.with_extension("toml.tmp");
        fs::write(&temp_path, content).map_err(|e| {
            ConfigError::file_system(
                format!("Failed to write config file: {}", temp_path.display()),
                e,
            )
        })?;

        fs::rename(&temp_path, config_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            ConfigError::file_system(
                format!("Failed to replace config file: {}", config_path.display()),
                e,
            )
        })
    }

    fn ensure_parent_dir(config_path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::file_system(
                    format!("Failed to create config directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let path = UserConfig::config_path().expect("Failed to get config path");
        assert!(path.to_string_lossy().contains("qabot"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn test_load_creates_default_if_not_exists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = UserConfig::load_from(&path).expect("default config should load");

        assert!(path.exists(), "Config file should be created");
        assert_eq!(config.theme, ThemePreference::Light);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("theme = \"light\""));
        assert!(content.contains("qabot theme"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = UserConfig {
            theme: ThemePreference::Dark,
        };
        config.save_to(&path).expect("Failed to save config");

        let loaded = UserConfig::load_from(&path).expect("Failed to load config");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_replaces_existing_without_leftovers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "theme = \"light\"\n").unwrap();

        let config = UserConfig {
            theme: ThemePreference::Dark,
        };
        config.save_to(&path).unwrap();

        assert_eq!(UserConfig::load_from(&path).unwrap(), config);
        assert!(!path.with_extension("toml.tmp").exists());
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_missing_theme_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "# empty\n").unwrap();

        let loaded = UserConfig::load_from(&path).unwrap();
        assert_eq!(loaded.theme, ThemePreference::Light);
    }

    #[test]
    fn test_invalid_theme_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "theme = \"sepia\"\n").unwrap();

        let result = UserConfig::load_from(&path);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_theme_toggle_and_parse() {
        assert_eq!(ThemePreference::Light.toggled(), ThemePreference::Dark);
        assert_eq!(ThemePreference::Dark.toggled(), ThemePreference::Light);
        assert_eq!("DARK".parse::<ThemePreference>(), Ok(ThemePreference::Dark));
        assert!("sepia".parse::<ThemePreference>().is_err());
        assert_eq!(ThemePreference::Dark.label(), "Dark Mode");
    }
}
