/// プレゼンテーション層: トーン/感情の比較チャート
///
/// チャネル別のトーン系列を共通の時間軸（0..録音長）と
/// 固定の縦軸（0..=100）に載せ、文字グリッドに描く。
/// 状態は持たない。
use crate::domain::model::{AnalysisResult, SpeakerChannel, ToneSample};
use serde::Serialize;

pub const AGENT_CHART_TITLE: &str = "Agent Tone Analysis";
pub const CUSTOMER_CHART_TITLE: &str = "Customer Sentiment Analysis";

const SCORE_MAX: f64 = 100.0;

/// チャート上の1点
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub time_seconds: f64,
    pub score: f64,
}

/// 2本の線を持つ比較チャート
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToneChart {
    agent: Vec<ChartPoint>,
    customer: Vec<ChartPoint>,
    duration_seconds: f64,
}

impl ToneChart {
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self::from_series(result.tone_series(), result.duration_seconds())
    }

    /// 系列をチャネルで分ける（入力は時刻昇順であること）
    pub fn from_series(series: &[ToneSample], duration_seconds: f64) -> Self {
        let points_for = |channel: SpeakerChannel| {
            series
                .iter()
                .filter(|s| s.channel == channel)
                .map(|s| ChartPoint {
                    time_seconds: s.timestamp_seconds,
                    score: s.score,
                })
                .collect::<Vec<_>>()
        };

        Self {
            agent: points_for(SpeakerChannel::Agent),
            customer: points_for(SpeakerChannel::Customer),
            duration_seconds: duration_seconds.max(0.0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.agent.is_empty() && self.customer.is_empty()
    }

    /// 軸なしのプロット本体
    ///
    /// 上端が 100、下端が 0。`A` はエージェント、`C` は顧客、
    /// 同じセルに両方が落ちたら `#`。
    pub fn plot(&self, width: usize, height: usize) -> Vec<String> {
        if width == 0 || height == 0 {
            return Vec::new();
        }

        let mut grid = vec![vec![' '; width]; height];

        for column in 0..width {
            let Some(t) = self.column_time(column, width) else {
                continue;
            };

            for (line, glyph) in [(&self.agent, 'A'), (&self.customer, 'C')] {
                let Some(score) = score_at(line, t) else {
                    continue;
                };
                let row = score_row(score, height);
                let cell = &mut grid[row][column];
                *cell = match *cell {
                    ' ' => glyph,
                    existing if existing == glyph => glyph,
                    _ => '#',
                };
            }
        }

        grid.into_iter()
            .map(|row| row.into_iter().collect::<String>())
            .collect()
    }

    /// 縦軸ラベル付きで描く
    pub fn render(&self, width: usize, height: usize) -> Vec<String> {
        let plot = self.plot(width, height);
        let last = plot.len().saturating_sub(1);

        let mut lines: Vec<String> = plot
            .into_iter()
            .enumerate()
            .map(|(idx, row)| {
                let label = if idx == 0 {
                    "100"
                } else if idx == last {
                    "0"
                } else {
                    ""
                };
                format!("{:>3} |{}", label, row)
            })
            .collect();

        if width > 0 && height > 0 {
            lines.push(format!("    +{}", "-".repeat(width)));
        }
        lines
    }

    /// 列に対応する時刻。録音長 0 なら先頭列だけが時刻 0 を持つ
    fn column_time(&self, column: usize, width: usize) -> Option<f64> {
        if column == 0 {
            return Some(0.0);
        }
        if width <= 1 || self.duration_seconds <= 0.0 {
            return None;
        }
        Some(column as f64 / (width - 1) as f64 * self.duration_seconds)
    }
}

/// 時刻 t における線の値（線形補間）。線の範囲外なら None
fn score_at(points: &[ChartPoint], t: f64) -> Option<f64> {
    let first = points.first()?;
    let last = points.last()?;
    if t < first.time_seconds || t > last.time_seconds {
        return None;
    }

    // 1点だけの線は windows が空なのでその点の値
    let interpolated = points.windows(2).find_map(|pair| {
        let (a, b) = (pair[0], pair[1]);
        if t < a.time_seconds || t > b.time_seconds {
            return None;
        }
        let span = b.time_seconds - a.time_seconds;
        if span <= 0.0 {
            return Some(a.score);
        }
        Some(a.score + (b.score - a.score) * (t - a.time_seconds) / span)
    });

    interpolated.or(Some(first.score))
}

fn score_row(score: f64, height: usize) -> usize {
    let clamped = score.clamp(0.0, SCORE_MAX);
    let row = ((SCORE_MAX - clamped) / SCORE_MAX * (height - 1) as f64).round() as usize;
    row.min(height - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(t: f64, channel: SpeakerChannel, score: f64) -> ToneSample {
        ToneSample {
            timestamp_seconds: t,
            channel,
            score,
        }
    }

    #[test]
    fn test_series_grouped_by_channel() {
        let chart = ToneChart::from_series(
            &[
                sample(0.0, SpeakerChannel::Agent, 40.0),
                sample(0.0, SpeakerChannel::Customer, 35.0),
                sample(10.0, SpeakerChannel::Customer, 30.0),
            ],
            10.0,
        );

        assert_eq!(chart.agent.len(), 1);
        assert_eq!(chart.customer.len(), 2);
        assert_eq!(chart.customer[1].time_seconds, 10.0);
        assert_eq!(chart.duration_seconds, 10.0);
    }

    #[test]
    fn test_plot_crossing_lines() {
        let chart = ToneChart::from_series(
            &[
                sample(0.0, SpeakerChannel::Agent, 100.0),
                sample(0.0, SpeakerChannel::Customer, 0.0),
                sample(10.0, SpeakerChannel::Agent, 0.0),
                sample(10.0, SpeakerChannel::Customer, 100.0),
            ],
            10.0,
        );

        assert_eq!(chart.plot(3, 3), vec!["A C", " # ", "C A"]);
    }

    #[test]
    fn test_plot_line_stops_at_last_sample() {
        let chart = ToneChart::from_series(
            &[
                sample(0.0, SpeakerChannel::Agent, 50.0),
                sample(5.0, SpeakerChannel::Agent, 50.0),
                sample(10.0, SpeakerChannel::Customer, 50.0),
            ],
            10.0,
        );

        assert_eq!(chart.plot(3, 3), vec!["   ", "AAC", "   "]);
    }

    #[test]
    fn test_render_has_axis_labels() {
        let chart = ToneChart::from_series(&[sample(0.0, SpeakerChannel::Agent, 100.0)], 0.0);
        let lines = chart.render(4, 3);

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "100 |A   ");
        assert_eq!(lines[2], "  0 |    ");
        assert_eq!(lines[3], "    +----");
    }

    #[test]
    fn test_empty_chart() {
        let chart = ToneChart::from_result(&AnalysisResult::default());
        assert!(chart.is_empty());
        assert_eq!(chart.plot(3, 2), vec!["   ", "   "]);
        assert!(chart.plot(0, 2).is_empty());
    }
}
