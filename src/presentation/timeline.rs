/// プレゼンテーション層: タイムラインと問題一覧
///
/// フラグ付きイベントを録音長に対する相対位置へ写像し、
/// 重なるマーカーは決定的にレーンを分けて配置する。
/// 一覧表は重大度降順 → 時刻昇順 → 説明昇順。
use crate::domain::formatter::format_offset;
use crate::domain::model::{self, FlaggedEvent, Severity};
use serde::Serialize;

/// 同じレーンに並べられる最小間隔（トラック幅に対する比率）
pub const MIN_MARKER_GAP: f64 = 0.02;

// 0.52 - 0.50 のような差を取りこぼさないための許容誤差
const GAP_EPSILON: f64 = 1e-9;

/// タイムライン上に配置されたマーカー
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedMarker {
    pub event: FlaggedEvent,
    /// 0.0..=1.0
    pub position: f64,
    /// 0 が最上段
    pub lane: usize,
}

/// 一覧表の1行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    /// "MM:SS"
    pub time: String,
    pub issue: String,
    pub severity: Severity,
}

/// イベントをタイムライン上に配置する
///
/// `position = timestamp / duration` を 0..=1 に丸める。
/// 録音長が 0（または不正値）ならすべて位置 0。
/// 出力は入力と同じ順序。
pub fn layout(events: &[FlaggedEvent], duration_seconds: f64) -> Vec<PositionedMarker> {
    let positions: Vec<f64> = events
        .iter()
        .map(|e| relative_position(e.timestamp_seconds, duration_seconds))
        .collect();
    let lanes = assign_lanes(&positions);

    events
        .iter()
        .zip(positions)
        .zip(lanes)
        .map(|((event, position), lane)| PositionedMarker {
            event: event.clone(),
            position,
            lane,
        })
        .collect()
}

fn relative_position(timestamp_seconds: f64, duration_seconds: f64) -> f64 {
    if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
        return 0.0;
    }

    let ratio = timestamp_seconds / duration_seconds;
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

/// 位置昇順（同位置は入力順）に見て、左隣と MIN_MARKER_GAP 以上離れる
/// 最も上のレーンに置く
fn assign_lanes(positions: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..positions.len()).collect();
    order.sort_by(|&a, &b| positions[a].total_cmp(&positions[b]).then(a.cmp(&b)));

    let mut lane_ends: Vec<f64> = Vec::new();
    let mut lanes = vec![0; positions.len()];

    for idx in order {
        let position = positions[idx];
        let lane = match lane_ends
            .iter()
            .position(|&end| position - end + GAP_EPSILON >= MIN_MARKER_GAP)
        {
            Some(lane) => lane,
            None => {
                lane_ends.push(position);
                lane_ends.len() - 1
            }
        };
        lane_ends[lane] = position;
        lanes[idx] = lane;
    }

    lanes
}

/// 一覧表の並びにする
pub fn order_for_table(events: &[FlaggedEvent]) -> Vec<FlaggedEvent> {
    let mut ordered = events.to_vec();
    ordered.sort_by(model::table_order);
    ordered
}

/// 一覧表の行を作る（並びは `order_for_table` と同じ）
pub fn table_rows(events: &[FlaggedEvent]) -> Vec<TableRow> {
    order_for_table(events)
        .into_iter()
        .map(|event| TableRow {
            time: format_offset(event.timestamp_seconds),
            issue: event.description,
            severity: event.severity,
        })
        .collect()
}

/// 重大度ごとのマーカー記号
pub fn severity_glyph(severity: Severity) -> char {
    match severity {
        Severity::High => '!',
        Severity::Medium => '*',
        Severity::Low => '.',
    }
}

/// マーカーをレーンごとの文字列トラックに描く
///
/// 同じ桁に複数のマーカーが落ちた場合は重大度の高い方を描く。
pub fn render_timeline(markers: &[PositionedMarker], width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }

    let lane_count = markers.iter().map(|m| m.lane + 1).max().unwrap_or(1);
    let mut grid: Vec<Vec<Option<Severity>>> = vec![vec![None; width]; lane_count];

    for marker in markers {
        let column = (marker.position * (width - 1) as f64).round() as usize;
        let cell = &mut grid[marker.lane][column.min(width - 1)];
        if cell.is_none_or(|current| marker.event.severity > current) {
            *cell = Some(marker.event.severity);
        }
    }

    grid.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| cell.map_or('-', severity_glyph))
                .collect::<String>()
        })
        .collect()
}

/// タイムライン下の時間軸（左端 00:00、右端に録音長）
pub fn render_axis(duration_seconds: f64, width: usize) -> String {
    let start = format_offset(0.0);
    let end = format_offset(duration_seconds);
    let padding = width.saturating_sub(start.len() + end.len());
    format!("{}{}{}", start, " ".repeat(padding), end)
}

/// 一覧表をテキストにする（1行目は見出し）
pub fn render_table(rows: &[TableRow]) -> Vec<String> {
    let time_width = rows
        .iter()
        .map(|r| r.time.len())
        .chain(std::iter::once("Time".len()))
        .max()
        .unwrap_or(4);

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format!("{:<time_width$}  {:<8}  {}", "Time", "Severity", "Issue"));
    for row in rows {
        lines.push(format!(
            "{:<time_width$}  {:<8}  {}",
            row.time,
            row.severity.to_string(),
            row.issue
        ));
    }
    lines
}
