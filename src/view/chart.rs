//! Requests-per-second chart, redrawn wholesale on every snapshot

use super::braille::{BrailleCanvas, Dot};
use crate::chart_sync::SeriesSink;
use chrono::{DateTime, Local};

#[derive(Default)]
pub struct ActivityChart {
    labels: Vec<i64>,
    values: Vec<f64>,
}

impl SeriesSink for ActivityChart {
    fn replace_series(&mut self, labels: Vec<i64>, values: Vec<f64>) {
        self.labels = labels;
        self.values = values;
    }
}

impl ActivityChart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peak(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Clock labels for the oldest and newest sample
    pub fn axis_labels(&self) -> Option<(String, String)> {
        let first = *self.labels.first()?;
        let last = *self.labels.last()?;
        Some((format_clock(first), format_clock(last)))
    }

    /// One dot column per sample, newest at the right edge, scaled to the peak
    pub fn draw(&self, canvas: &mut BrailleCanvas) {
        let width = canvas.dot_width();
        let height = canvas.dot_height();
        let peak = self.peak();
        if width == 0 || height == 0 || peak <= 0.0 {
            return;
        }

        let shown = self.values.len().min(width);
        let visible = &self.values[self.values.len() - shown..];
        let x0 = width - shown;

        for (i, &value) in visible.iter().enumerate() {
            if value <= 0.0 {
                continue;
            }
            let frac = (value / peak).min(1.0);
            let bar = ((frac * height as f64).ceil() as usize).clamp(1, height);
            let shade = (frac * 3.0).round() as u8;
            let x = (x0 + i) as i32;
            for dy in 0..bar {
                canvas.plot(x, (height - 1 - dy) as i32, Dot::Shade(shade));
            }
        }
    }
}

/// Local wall-clock time for a unix timestamp
pub fn format_clock(unix_secs: i64) -> String {
    DateTime::from_timestamp(unix_secs, 0)
        .map(|dt| dt.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_height(canvas: &BrailleCanvas, x: i32) -> usize {
        (0..canvas.dot_height() as i32)
            .filter(|&y| canvas.get(x, y) != Dot::Empty)
            .count()
    }

    #[test]
    fn replace_discards_previous_series() {
        let mut chart = ActivityChart::new();
        chart.replace_series(vec![1, 2, 3], vec![1.0, 2.0, 3.0]);
        chart.replace_series(vec![10], vec![7.0]);
        assert_eq!(chart.latest(), Some(7.0));
        assert_eq!(chart.peak(), 7.0);
    }

    #[test]
    fn bars_scale_to_peak_newest_on_right() {
        let mut chart = ActivityChart::new();
        chart.replace_series(vec![1, 2], vec![2.0, 4.0]);
        let mut canvas = BrailleCanvas::new(2, 2);
        chart.draw(&mut canvas);

        // 4 dot columns, 8 dot rows; samples land on the last two columns
        assert_eq!(column_height(&canvas, 0), 0);
        assert_eq!(column_height(&canvas, 1), 0);
        assert_eq!(column_height(&canvas, 2), 4);
        assert_eq!(column_height(&canvas, 3), 8);
    }

    #[test]
    fn overflow_keeps_newest_samples() {
        let mut chart = ActivityChart::new();
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        chart.replace_series((1..=10).collect(), values);
        let mut canvas = BrailleCanvas::new(1, 1);
        chart.draw(&mut canvas);

        // Two columns: samples 9 and 10 out of peak 10
        assert_eq!(column_height(&canvas, 0), 4);
        assert_eq!(column_height(&canvas, 1), 4);
    }

    #[test]
    fn quiet_series_draws_nothing() {
        let mut chart = ActivityChart::new();
        chart.replace_series(vec![1, 2], vec![0.0, 0.0]);
        let mut canvas = BrailleCanvas::new(2, 1);
        chart.draw(&mut canvas);
        assert_eq!(canvas.cell(0, 0), None);
        assert_eq!(canvas.cell(1, 0), None);
    }

    #[test]
    fn clock_labels() {
        assert_eq!(format_clock(i64::MAX), "--:--:--");
        let label = format_clock(1_700_000_000);
        assert_eq!(label.len(), 8);
        assert_eq!(label.matches(':').count(), 2);

        let mut chart = ActivityChart::new();
        assert!(chart.axis_labels().is_none());
        chart.replace_series(vec![1_700_000_000, 1_700_000_059], vec![1.0, 1.0]);
        assert!(chart.axis_labels().is_some());
    }
}
