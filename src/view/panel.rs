//! Bordered side panels: traffic stats, top talkers, feed status

use crate::activity::{TopTalker, TrafficStats};
use crate::colors::{ColorState, StatusColor};
use crate::error::FeedError;
use crate::ingest::{CycleCounters, CyclePhase};
use crate::terminal::Terminal;
use crossterm::style::Color;

const BOX_TL: char = '╭';
const BOX_TR: char = '╮';
const BOX_BL: char = '╰';
const BOX_BR: char = '╯';
const BOX_H: char = '─';
const BOX_V: char = '│';
const BOX_TITLE_L: char = '┤';
const BOX_TITLE_R: char = '├';

/// A rounded box with a centered title
pub struct Panel {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
    pub title: String,
}

impl Panel {
    pub fn new(x: i32, y: i32, width: u16, height: u16, title: &str) -> Self {
        Self {
            x,
            y,
            width,
            height,
            title: title.to_string(),
        }
    }

    pub fn inner_x(&self) -> i32 {
        self.x + 1
    }
    pub fn inner_y(&self) -> i32 {
        self.y + 1
    }
    pub fn inner_width(&self) -> u16 {
        self.width.saturating_sub(2)
    }
    pub fn inner_height(&self) -> u16 {
        self.height.saturating_sub(2)
    }

    pub fn draw(&self, term: &mut Terminal, colors: &ColorState) {
        let w = self.width as i32;
        let h = self.height as i32;
        if w < 2 || h < 2 {
            return;
        }
        let bc = Some(colors.status(StatusColor::Muted));
        let right = self.x + w - 1;
        let bottom = self.y + h - 1;

        term.set(self.x, self.y, BOX_TL, bc, false);
        for x in self.x + 1..right {
            term.set(x, self.y, BOX_H, bc, false);
        }
        term.set(right, self.y, BOX_TR, bc, false);

        let title_w = self.title.chars().count() as i32 + 4;
        if !self.title.is_empty() && title_w <= w - 2 {
            let tx = self.x + 1 + (w - 2 - title_w) / 2;
            term.set(tx, self.y, BOX_TITLE_L, bc, false);
            term.set(tx + 1, self.y, ' ', None, false);
            term.set_str(tx + 2, self.y, &self.title, Some(Color::White), true);
            term.set(tx + title_w - 2, self.y, ' ', None, false);
            term.set(tx + title_w - 1, self.y, BOX_TITLE_R, bc, false);
        }

        for y in self.y + 1..bottom {
            term.set(self.x, y, BOX_V, bc, false);
            term.set(right, y, BOX_V, bc, false);
        }

        term.set(self.x, bottom, BOX_BL, bc, false);
        for x in self.x + 1..right {
            term.set(x, bottom, BOX_H, bc, false);
        }
        term.set(right, bottom, BOX_BR, bc, false);
    }

    /// Write lines inside the border, truncated to fit
    pub fn write_lines(&self, term: &mut Terminal, lines: &[(String, StatusColor)], colors: &ColorState) {
        let max_w = self.inner_width() as usize;
        for (i, (text, status)) in lines.iter().take(self.inner_height() as usize).enumerate() {
            let clipped: String = text.chars().take(max_w).collect();
            term.set_str(
                self.inner_x(),
                self.inner_y() + i as i32,
                &clipped,
                Some(colors.status(*status)),
                false,
            );
        }
    }
}

/// Everything the side panels show for one frame
pub struct PanelInfo<'a> {
    pub source: &'a str,
    pub stats: TrafficStats,
    pub top_talkers: &'a [TopTalker],
    pub phase: CyclePhase,
    pub in_flight: bool,
    pub skipped: u64,
    pub counters: CycleCounters,
    /// Index of the last ingested event
    pub cursor: Option<usize>,
    pub last_error: Option<&'a FeedError>,
    pub live_markers: usize,
    pub paused: bool,
}

pub fn stats_lines(info: &PanelInfo) -> Vec<(String, StatusColor)> {
    let suspicious = if info.stats.suspicious_markers > 0 {
        StatusColor::Critical
    } else {
        StatusColor::Muted
    };
    vec![
        (format!("Total       {:>6}", info.stats.total_markers), StatusColor::Info),
        (format!("Normal      {:>6}", info.stats.normal_markers()), StatusColor::Good),
        (format!("Suspicious  {:>6}", info.stats.suspicious_markers), suspicious),
        (format!("On globe    {:>6}", info.live_markers), StatusColor::Muted),
    ]
}

pub fn talker_lines(talkers: &[TopTalker]) -> Vec<(String, StatusColor)> {
    if talkers.is_empty() {
        return vec![("No data".to_string(), StatusColor::Muted)];
    }
    talkers
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let status = if i == 0 { StatusColor::Warning } else { StatusColor::Info };
            (format!("{:>2}. {:<14} {:>5}", i + 1, t.label(), t.count), status)
        })
        .collect()
}

pub fn status_lines(info: &PanelInfo) -> Vec<(String, StatusColor)> {
    let phase = if info.paused {
        ("paused".to_string(), StatusColor::Warning)
    } else if info.in_flight {
        ("fetching".to_string(), StatusColor::Info)
    } else {
        (info.phase.label().to_string(), StatusColor::Good)
    };

    let mut lines = vec![
        (info.source.to_string(), StatusColor::Muted),
        (format!("State  {}", phase.0), phase.1),
        (
            format!("Polls  {} ok / {} failed", info.counters.succeeded, info.counters.failed),
            if info.counters.failed > 0 { StatusColor::Warning } else { StatusColor::Good },
        ),
        (format!("Events {}", info.counters.ingested), StatusColor::Info),
        (
            match info.cursor {
                Some(index) => format!("Cursor #{index}"),
                None => "Cursor -".to_string(),
            },
            StatusColor::Muted,
        ),
        (
            format!("No-news polls {}", info.counters.unchanged),
            if info.counters.unchanged > 0 { StatusColor::Warning } else { StatusColor::Muted },
        ),
        (
            format!("Skipped ticks {}", info.skipped),
            if info.skipped > 0 { StatusColor::Warning } else { StatusColor::Muted },
        ),
    ];
    if let Some(err) = info.last_error {
        lines.push((format!("Last error: {err}"), StatusColor::Critical));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info<'a>(talkers: &'a [TopTalker], err: Option<&'a FeedError>) -> PanelInfo<'a> {
        PanelInfo {
            source: "demo feed",
            stats: TrafficStats {
                total_markers: 5,
                suspicious_markers: 2,
            },
            top_talkers: talkers,
            phase: CyclePhase::Idle,
            in_flight: false,
            skipped: 0,
            counters: CycleCounters::default(),
            cursor: None,
            last_error: err,
            live_markers: 5,
            paused: false,
        }
    }

    #[test]
    fn stats_split_normal_and_suspicious() {
        let lines = stats_lines(&info(&[], None));
        assert!(lines[0].0.ends_with('5'));
        assert!(lines[1].0.ends_with('3'));
        assert_eq!(lines[2].1, StatusColor::Critical);
    }

    #[test]
    fn talkers_fall_back_to_placeholder() {
        assert_eq!(talker_lines(&[])[0].0, "No data");
        let talkers = vec![
            TopTalker {
                country: Some("Japan".into()),
                count: 9,
            },
            TopTalker {
                country: None,
                count: 3,
            },
        ];
        let lines = talker_lines(&talkers);
        assert!(lines[0].0.contains("Japan"));
        assert!(lines[1].0.contains("Unknown"));
    }

    #[test]
    fn status_shows_cursor_and_no_news_polls() {
        let mut panel = info(&[], None);
        assert!(status_lines(&panel).iter().any(|(text, _)| text == "Cursor -"));

        panel.cursor = Some(41);
        panel.counters.unchanged = 3;
        let lines = status_lines(&panel);
        assert!(lines.iter().any(|(text, _)| text == "Cursor #41"));
        let stalled = lines
            .iter()
            .find(|(text, _)| text.starts_with("No-news polls"))
            .expect("no-news line");
        assert_eq!(stalled.0, "No-news polls 3");
        assert_eq!(stalled.1, StatusColor::Warning);
    }

    #[test]
    fn last_error_is_shown_critical() {
        let err = FeedError::Status(503);
        let lines = status_lines(&info(&[], Some(&err)));
        let last = lines.last().cloned().expect("status lines");
        assert_eq!(last.1, StatusColor::Critical);
        assert!(last.0.contains("503"));
    }
}
