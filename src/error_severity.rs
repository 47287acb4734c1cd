//! プレゼンテーション層が使用するエラー深刻度
//!
//! このモジュールはアーキテクチャの最外層（プレゼンテーション層）に属し、
//! 終了コードの決定に使用される。
//!
//! **依存方向の原則:**
//! - 内側層（domain, api, config）はこのモジュールに依存してOK
//! - このモジュールは他のモジュールに依存しない（独立）

use serde::Serialize;
use std::fmt;

/// エラーの深刻度と対応する終了コード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    /// ユーザーの入力エラー
    ///
    /// ファイルが指定されていない、非対応の音声形式など、ユーザーが直せるもの。
    ///
    /// **Exit Code: 1**
    UserError,

    /// 設定エラー
    ///
    /// QABOT_API_URL が不正、設定ファイルが破損しているなど。
    ///
    /// **Exit Code: 2**
    ConfigError,

    /// システムエラー
    ///
    /// ネットワーク断、タイムアウト、ファイルシステム障害など。
    ///
    /// **Exit Code: 3**
    SystemError,

    /// 解析サービス側のエラー
    ///
    /// サービスには到達したが、エラーステータスや解釈できない応答が返った。
    ///
    /// **Exit Code: 4**
    ServiceError,
}

impl ErrorSeverity {
    /// 対応する Unix 終了コードを返す
    pub fn exit_code(self) -> i32 {
        match self {
            Self::UserError => 1,
            Self::ConfigError => 2,
            Self::SystemError => 3,
            Self::ServiceError => 4,
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserError => write!(f, "user error"),
            Self::ConfigError => write!(f, "configuration error"),
            Self::SystemError => write!(f, "system error"),
            Self::ServiceError => write!(f, "analysis service error"),
        }
    }
}
