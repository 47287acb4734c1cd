/// ドメインサービス: 時刻・サイズのフォーマット
///
/// 録音内のオフセット（秒）を "MM:SS" 形式に相互変換し、
/// ファイルサイズを MB 表記に整形する。
use crate::config::BYTES_PER_MB;

/// 録音先頭からのオフセット（秒）を表示用に整形する
///
/// 1時間未満は "MM:SS"、以降は "HH:MM:SS"。端数は切り捨てる。
/// 負値・非有限値は 0 として扱う。
pub fn format_offset(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// "MM:SS" / "HH:MM:SS" 形式の文字列を秒に変換する
///
/// 先頭以外の分・秒は 60 未満でなければならない。秒のみ小数を許す。
/// 解釈できない場合や桁あふれする場合は None。
pub fn parse_offset(text: &str) -> Option<f64> {
    let parts: Vec<&str> = text.trim().split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }

    let (last, leading) = parts.split_last()?;
    let seconds: f64 = last.parse().ok()?;
    if !seconds.is_finite() || !(0.0..60.0).contains(&seconds) {
        return None;
    }

    let mut total = 0u64;
    for (idx, part) in leading.iter().enumerate() {
        let value: u64 = part.parse().ok()?;
        // 先頭の要素だけは上限なし（例: "75:00"）
        if idx > 0 && value >= 60 {
            return None;
        }
        total = total.checked_mul(60)?.checked_add(value)?;
    }

    Some(total as f64 * 60.0 + seconds)
}

/// バイト数を "12.34 MB" 形式に整形する
pub fn format_size_mb(size_bytes: u64) -> String {
    format!("{:.2} MB", size_bytes as f64 / BYTES_PER_MB as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_offset_minutes() {
        assert_eq!(format_offset(23.0), "00:23");
        assert_eq!(format_offset(105.9), "01:45");
        assert_eq!(format_offset(0.0), "00:00");
    }

    #[test]
    fn test_format_offset_hours() {
        assert_eq!(format_offset(3725.0), "01:02:05");
    }

    #[test]
    fn test_format_offset_invalid_is_zero() {
        assert_eq!(format_offset(-4.0), "00:00");
        assert_eq!(format_offset(f64::NAN), "00:00");
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("00:23"), Some(23.0));
        assert_eq!(parse_offset("03:12"), Some(192.0));
        assert_eq!(parse_offset("1:02:05"), Some(3725.0));
        assert_eq!(parse_offset("75:00"), Some(4500.0));
        assert_eq!(parse_offset("00:12.5"), Some(12.5));
    }

    #[test]
    fn test_parse_offset_rejects_garbage() {
        assert_eq!(parse_offset("12"), None);
        assert_eq!(parse_offset("aa:bb"), None);
        assert_eq!(parse_offset("1:75:00"), None);
        assert_eq!(parse_offset("00:60"), None);
        assert_eq!(parse_offset("-1:00"), None);
    }

    #[test]
    fn test_parse_offset_rejects_overflow() {
        assert_eq!(parse_offset("18446744073709551615:00:00"), None);
        assert_eq!(parse_offset("99999999999999999999:00"), None);
    }

    #[test]
    fn test_format_size_mb() {
        assert_eq!(format_size_mb(2 * 1024 * 1024), "2.00 MB");
        assert_eq!(format_size_mb(10_485_760), "10.00 MB");
    }
}
