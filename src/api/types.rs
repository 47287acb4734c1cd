/// API通信用の型定義
///
/// 解析サービスのエラーレスポンスをデシリアライズするための構造体を定義します。
/// 成功時のペイロードは `domain::payload` 側で扱います。
use serde::Deserialize;

/// エラーレスポンス
///
/// `{"error": "..."}` が基本形。`message` だけを返す実装もあるため両方見る。
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorPayload {
    /// 表示すべきメッセージ（空文字は無視）
    pub fn into_message(self) -> Option<String> {
        [self.error, self.message]
            .into_iter()
            .flatten()
            .map(|m| m.trim().to_string())
            .find(|m| !m.is_empty())
    }
}
