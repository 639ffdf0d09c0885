use chrono::NaiveDate;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use crate::dashboard::ChartView;

const SERIES_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::LightRed,
    Color::LightBlue,
];

pub struct ChartSeries<'a> {
    pub label: &'a str,
    pub values: Vec<Option<f64>>,
}

/// Dot-plot line chart of one or more date-aligned series.
pub struct LineChart<'a> {
    title: String,
    dates: Vec<NaiveDate>,
    series: Vec<ChartSeries<'a>>,
}

impl<'a> LineChart<'a> {
    pub fn new(title: impl Into<String>, dates: Vec<NaiveDate>) -> Self {
        Self {
            title: title.into(),
            dates,
            series: Vec::new(),
        }
    }

    pub fn series(mut self, label: &'a str, values: Vec<Option<f64>>) -> Self {
        self.series.push(ChartSeries { label, values });
        self
    }

    pub fn from_view(view: &'a ChartView) -> Self {
        match view {
            ChartView::Single { column, points, .. } => {
                let dates = points.iter().map(|(d, _)| *d).collect();
                let values = points.iter().map(|(_, v)| *v).collect();
                Self::new(view.title(), dates).series(column.label(), values)
            }
            ChartView::Comparison(table) => {
                let dates = table.rows.iter().map(|r| r.date).collect();
                table
                    .tickers
                    .iter()
                    .enumerate()
                    .fold(Self::new(view.title(), dates), |chart, (i, ticker)| {
                        let values = table.rows.iter().map(|r| r.values[i]).collect();
                        chart.series(ticker.as_str(), values)
                    })
            }
        }
    }

    fn bounds(&self) -> Option<(f64, f64)> {
        let mut finite = self
            .series
            .iter()
            .flat_map(|s| s.values.iter().flatten().copied())
            .filter(|v| v.is_finite())
            .peekable();
        finite.peek()?;
        let (lo, hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        Some((lo, hi))
    }
}

fn format_axis(v: f64) -> String {
    if v.abs() >= 1e6 {
        format!("{:.2e}", v)
    } else if v.abs() < 1.0 {
        format!("{:.4}", v)
    } else {
        format!("{:.2}", v)
    }
}

impl Widget for LineChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 4 || inner.width < 10 {
            return;
        }
        let Some((min_v, max_v)) = self.bounds() else {
            buf.set_string(
                inner.x,
                inner.y,
                "no values to plot",
                Style::default().fg(Color::DarkGray),
            );
            return;
        };

        // Legend on the first row, date axis on the last.
        let legend: Vec<Span> = self
            .series
            .iter()
            .enumerate()
            .flat_map(|(i, s)| {
                let color = SERIES_COLORS[i % SERIES_COLORS.len()];
                [
                    Span::styled("• ", Style::default().fg(color)),
                    Span::styled(format!("{}  ", s.label), Style::default().fg(Color::Gray)),
                ]
            })
            .collect();
        buf.set_line(inner.x, inner.y, &Line::from(legend), inner.width);

        let plot_top = inner.y + 1;
        let plot_height = (inner.height - 2) as usize;
        let plot_width = inner.width as usize;
        let n = self.dates.len();
        if n == 0 || plot_height == 0 {
            return;
        }
        let range = max_v - min_v;
        let range = if range.abs() < f64::EPSILON { 1.0 } else { range };

        for (si, s) in self.series.iter().enumerate() {
            let style = Style::default().fg(SERIES_COLORS[si % SERIES_COLORS.len()]);
            for col in 0..plot_width.min(n) {
                // Sample one point per terminal column.
                let idx = if n > plot_width {
                    col * (n - 1) / (plot_width - 1).max(1)
                } else {
                    col
                };
                let Some(v) = s.values.get(idx).copied().flatten().filter(|v| v.is_finite())
                else {
                    continue;
                };
                let normalized = (v - min_v) / range;
                let y_off = plot_height - 1
                    - ((normalized * (plot_height - 1) as f64).round() as usize).min(plot_height - 1);
                buf.set_string(inner.x + col as u16, plot_top + y_off as u16, "•", style);
            }
        }

        let axis_style = Style::default().fg(Color::DarkGray);
        buf.set_string(inner.x, plot_top, format_axis(max_v), axis_style);
        buf.set_string(
            inner.x,
            plot_top + plot_height as u16 - 1,
            format_axis(min_v),
            axis_style,
        );

        let axis_y = inner.y + inner.height - 1;
        let first = self.dates[0].to_string();
        let last = self.dates[n - 1].to_string();
        buf.set_string(inner.x, axis_y, &first, axis_style);
        if plot_width > first.len() + last.len() + 1 {
            buf.set_string(
                inner.x + (plot_width - last.len()) as u16,
                axis_y,
                &last,
                axis_style,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_ignore_missing_and_non_finite_values() {
        let chart = LineChart::new("t", vec![])
            .series("a", vec![None, Some(2.0), Some(f64::NAN)])
            .series("b", vec![Some(-1.0), None]);
        assert_eq!(chart.bounds(), Some((-1.0, 2.0)));
        assert_eq!(LineChart::new("t", vec![]).series("a", vec![None]).bounds(), None);
    }
}
