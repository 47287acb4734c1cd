use crate::commands::{self, CommandResult, theme::ThemeAction};
use crate::config::error::ConfigError;
use crate::config::{ServiceSettings, ThemePreference};
use anyhow::{Context, Result, bail};

/// 解釈済みのコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Analyze {
        file_path: String,
        show_progress: bool,
    },
    Theme(ThemeAction),
    Help,
}

/// 解釈済みのCLI引数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArgs {
    /// --machine が指定されたか
    pub machine_output: bool,
    pub command: Command,
}

/// 引数に --machine が含まれるか
///
/// 引数の解釈に失敗した場合でもエラー出力の形式を決めるために使う。
pub fn wants_machine_output(args: &[String]) -> bool {
    args.iter().skip(1).any(|a| a == "--machine")
}

/// CLI引数を解釈する
///
/// `args[0]` はプログラム名。--machine はコマンドより前に置く。
pub fn parse_args(args: &[String]) -> Result<ParsedArgs> {
    let mut rest = args.iter().skip(1).map(String::as_str).peekable();

    let mut machine_output = false;
    while rest.peek() == Some(&"--machine") {
        machine_output = true;
        rest.next();
    }

    let Some(command) = rest.next() else {
        return Ok(ParsedArgs {
            machine_output,
            command: Command::Help,
        });
    };
    let rest: Vec<&str> = rest.collect();

    let command = match command {
        "analyze" => parse_analyze(&rest)?,
        "theme" => parse_theme(&rest)?,
        "help" | "--help" | "-h" => Command::Help,
        _ => bail!(
            "Unknown command: '{}'. Use 'help' to see available commands.",
            command
        ),
    };

    Ok(ParsedArgs {
        machine_output,
        command,
    })
}

fn parse_analyze(args: &[&str]) -> Result<Command> {
    let mut file_path = None;
    let mut show_progress = false;

    for arg in args {
        match *arg {
            "--progress" => show_progress = true,
            flag if flag.starts_with("--") => {
                bail!("Unknown option for analyze: '{}'", flag)
            }
            path => {
                if file_path.is_some() {
                    bail!("analyze accepts exactly one file");
                }
                file_path = Some(path.to_string());
            }
        }
    }

    let file_path = file_path.context("Please specify an audio file for analyze command")?;
    Ok(Command::Analyze {
        file_path,
        show_progress,
    })
}

fn parse_theme(args: &[&str]) -> Result<Command> {
    let action = match args {
        [] => ThemeAction::Show,
        ["toggle"] => ThemeAction::Toggle,
        [name] => ThemeAction::Set(name.parse::<ThemePreference>().map_err(anyhow::Error::msg)?),
        _ => bail!("theme accepts at most one argument: light, dark or toggle"),
    };
    Ok(Command::Theme(action))
}

/// コマンドを実行する
///
/// 解析サービスの設定は analyze のときだけ `load_settings` で読む。
pub async fn dispatch<F>(parsed: &ParsedArgs, load_settings: F) -> Result<CommandResult>
where
    F: FnOnce() -> Result<ServiceSettings, ConfigError>,
{
    match &parsed.command {
        Command::Analyze {
            file_path,
            show_progress,
        } => {
            let settings = load_settings()?;
            commands::analyze::execute(
                file_path,
                &settings,
                *show_progress,
                parsed.machine_output,
            )
            .await
            .context("Analyze command failed")
        }
        Command::Theme(action) => commands::theme::execute(*action)
            .await
            .context("Theme command failed"),
        Command::Help => commands::help::execute().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("qabot")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_no_command_is_help() {
        let parsed = parse_args(&args(&[])).unwrap();
        assert_eq!(parsed.command, Command::Help);
        assert!(!parsed.machine_output);
    }

    #[test]
    fn test_analyze_with_flags() {
        let parsed = parse_args(&args(&["--machine", "analyze", "call.wav", "--progress"])).unwrap();
        assert!(parsed.machine_output);
        assert_eq!(
            parsed.command,
            Command::Analyze {
                file_path: "call.wav".to_string(),
                show_progress: true,
            }
        );
    }

    #[test]
    fn test_analyze_requires_exactly_one_file() {
        assert!(parse_args(&args(&["analyze"])).is_err());
        assert!(parse_args(&args(&["analyze", "a.wav", "b.wav"])).is_err());
        assert!(parse_args(&args(&["analyze", "a.wav", "--fast"])).is_err());
    }

    #[test]
    fn test_theme_actions() {
        assert_eq!(
            parse_args(&args(&["theme"])).unwrap().command,
            Command::Theme(ThemeAction::Show)
        );
        assert_eq!(
            parse_args(&args(&["theme", "toggle"])).unwrap().command,
            Command::Theme(ThemeAction::Toggle)
        );
        assert_eq!(
            parse_args(&args(&["theme", "Dark"])).unwrap().command,
            Command::Theme(ThemeAction::Set(ThemePreference::Dark))
        );
        assert!(parse_args(&args(&["theme", "sepia"])).is_err());
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_args(&args(&["upload", "x.wav"])).unwrap_err();
        assert!(err.to_string().contains("Unknown command"));
    }

    fn broken_settings() -> Result<ServiceSettings, ConfigError> {
        Err(ConfigError::invalid_service_url("ftp://x", "unsupported scheme"))
    }

    #[tokio::test]
    async fn test_bad_service_url_only_affects_analyze() {
        let help = parse_args(&args(&["help"])).unwrap();
        assert!(matches!(
            dispatch(&help, broken_settings).await.unwrap(),
            CommandResult::Help
        ));

        let analyze = parse_args(&args(&["analyze", "call.wav"])).unwrap();
        let err = dispatch(&analyze, broken_settings).await.unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn test_wants_machine_output() {
        assert!(wants_machine_output(&args(&["--machine", "bogus"])));
        assert!(!wants_machine_output(&args(&["help"])));
    }
}
