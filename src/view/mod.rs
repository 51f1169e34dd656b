//! Interactive terminal view: globe, activity chart and side panels

pub mod braille;
pub mod chart;
pub mod globe;
pub mod panel;

use crate::colors::{ColorState, StatusColor};
use crate::feed::FeedSource;
use crate::help::{render_help_overlay, GLOBE_HELP};
use crate::pipeline::Pipeline;
use crate::settings::Settings;
use crate::terminal::Terminal;
use braille::BrailleCanvas;
use chart::ActivityChart;
use crossterm::event::{KeyCode, KeyModifiers};
use globe::{solar_longitude, GlobeView};
use panel::{stats_lines, status_lines, talker_lines, Panel, PanelInfo};
use std::io;
use std::sync::Arc;
use std::time::Instant;

const SPIN_STEP: f32 = 0.15;
const TILT_STEP: f32 = 0.1;
const ZOOM_STEP: f32 = 1.15;
const SIDE_WIDTH: u16 = 34;
const CHART_HEIGHT: u16 = 9;
const STATS_HEIGHT: u16 = 6;
const TALKERS_HEIGHT: u16 = 12;
/// Below this width the side column is dropped
const MIN_SIDE_LAYOUT_WIDTH: u16 = 70;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum KeyAction {
    None,
    Quit,
    Spin(f32),
    Tilt(f32),
    Zoom(f32),
    ResetView,
}

pub struct ViewState {
    pub paused: bool,
    pub show_help: bool,
    pub colors: ColorState,
}

impl ViewState {
    pub fn new(color_scheme: u8) -> Self {
        Self {
            paused: false,
            show_help: false,
            colors: ColorState::new(color_scheme),
        }
    }

    pub fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) -> KeyAction {
        if self.colors.handle_key(code) {
            return KeyAction::None;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return KeyAction::Quit,
            KeyCode::Char(' ') => self.paused = !self.paused,
            KeyCode::Char('?') => self.show_help = !self.show_help,
            KeyCode::Left | KeyCode::Char('h') => return KeyAction::Spin(-SPIN_STEP),
            KeyCode::Right | KeyCode::Char('l') => return KeyAction::Spin(SPIN_STEP),
            KeyCode::Up | KeyCode::Char('k') => return KeyAction::Tilt(TILT_STEP),
            KeyCode::Down | KeyCode::Char('j') => return KeyAction::Tilt(-TILT_STEP),
            KeyCode::Char('+') | KeyCode::Char('=') => return KeyAction::Zoom(ZOOM_STEP),
            KeyCode::Char('-') => return KeyAction::Zoom(1.0 / ZOOM_STEP),
            KeyCode::Char('0') => return KeyAction::ResetView,
            _ => {}
        }
        KeyAction::None
    }
}

/// Screen regions, in terminal cells
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    /// (x, y, cols, rows) of the globe canvas
    pub globe: (i32, i32, u16, u16),
    pub chart: (i32, i32, u16, u16),
    /// Side column; None on narrow terminals
    pub side: Option<(i32, i32, u16, u16)>,
}

impl Layout {
    pub fn compute(width: u16, height: u16) -> Self {
        let side_w = if width >= MIN_SIDE_LAYOUT_WIDTH { SIDE_WIDTH } else { 0 };
        let main_w = width - side_w;
        let chart_h = CHART_HEIGHT.min(height / 3);
        let globe_h = height - chart_h;

        Self {
            globe: (0, 0, main_w, globe_h),
            chart: (0, globe_h as i32, main_w, chart_h),
            side: (side_w > 0).then_some((main_w as i32, 0, side_w, height)),
        }
    }
}

pub fn run(settings: &Settings, source: Arc<dyn FeedSource>) -> io::Result<()> {
    let mut term = Terminal::new()?;
    let mut state = ViewState::new(settings.globe.color_scheme);
    let start = Instant::now();
    let mut pipeline = Pipeline::new(
        source,
        &settings.feed,
        GlobeView::new(settings.globe.tilt_deg),
        ActivityChart::new(),
        start,
    );
    let source_label = pipeline.poller().describe();
    let frame = settings.globe.frame_period();
    let spin_speed = settings.globe.spin_speed;

    tracing::info!(source = %source_label, interval = ?pipeline.poller().interval(), "globe view started");

    let mut layout = Layout::compute(term.size().0, term.size().1);
    let mut globe_canvas = BrailleCanvas::new(layout.globe.2 as usize, layout.globe.3 as usize);
    let mut chart_canvas = chart_canvas_for(&layout);
    let mut last_frame = start;

    loop {
        if term.refresh_size()? {
            let (w, h) = term.size();
            layout = Layout::compute(w, h);
            globe_canvas = BrailleCanvas::new(layout.globe.2 as usize, layout.globe.3 as usize);
            chart_canvas = chart_canvas_for(&layout);
        }

        while let Some((code, modifiers)) = term.check_key()? {
            match state.handle_key(code, modifiers) {
                KeyAction::Quit => {
                    let counters = pipeline.ingest().counters();
                    tracing::info!(
                        cycles = counters.succeeded,
                        failed = counters.failed,
                        "globe view closed"
                    );
                    return Ok(());
                }
                KeyAction::Spin(delta) => pipeline.marker_sink_mut().advance(delta),
                KeyAction::Tilt(delta) => pipeline.marker_sink_mut().nudge_tilt(delta),
                KeyAction::Zoom(factor) => pipeline.marker_sink_mut().zoom_by(factor),
                KeyAction::ResetView => pipeline.marker_sink_mut().reset_view(),
                KeyAction::None => {}
            }
        }

        let now = Instant::now();
        pipeline.poll(now);
        pipeline.sync_markers(now);

        if !state.paused {
            let dt = now.duration_since(last_frame).as_secs_f32();
            pipeline.marker_sink_mut().advance(spin_speed * dt);
        }
        last_frame = now;

        term.clear();

        globe_canvas.clear();
        pipeline.marker_sink().draw(&mut globe_canvas, solar_longitude());
        globe_canvas.blit(&mut term, layout.globe.0, layout.globe.1, &state.colors);

        draw_chart(&mut term, &layout, &mut chart_canvas, pipeline.series_sink(), &state.colors);

        if let Some(side) = layout.side {
            let ingest = pipeline.ingest();
            let info = PanelInfo {
                source: &source_label,
                stats: ingest.stats(),
                top_talkers: ingest.top_talkers(),
                phase: ingest.phase(),
                in_flight: pipeline.poller().in_flight(),
                skipped: pipeline.poller().skipped(),
                counters: ingest.counters(),
                cursor: ingest.cursor().current(),
                last_error: ingest.last_error(),
                live_markers: pipeline.marker_sink().marker_count(),
                paused: state.paused,
            };
            draw_side(&mut term, side, &info, &state.colors);
        }

        if state.show_help {
            render_help_overlay(&mut term, GLOBE_HELP);
        }

        term.present()?;
        term.sleep(frame);
    }
}

fn chart_canvas_for(layout: &Layout) -> BrailleCanvas {
    let (_, _, w, h) = layout.chart;
    // Border plus the axis label row
    BrailleCanvas::new(w.saturating_sub(2) as usize, h.saturating_sub(3) as usize)
}

fn draw_chart(
    term: &mut Terminal,
    layout: &Layout,
    canvas: &mut BrailleCanvas,
    chart: &ActivityChart,
    colors: &ColorState,
) {
    let (x, y, w, h) = layout.chart;
    if h < 4 {
        return;
    }
    let title = match chart.latest() {
        Some(latest) => format!("Requests/s  now {latest:.0}  peak {:.0}", chart.peak()),
        None => "Requests/s".to_string(),
    };
    let frame = Panel::new(x, y, w, h, &title);
    frame.draw(term, colors);

    canvas.clear();
    chart.draw(canvas);
    canvas.blit(term, frame.inner_x(), frame.inner_y(), colors);

    let label_y = frame.inner_y() + frame.inner_height() as i32 - 1;
    let muted = Some(colors.status(StatusColor::Muted));
    match chart.axis_labels() {
        Some((oldest, newest)) => {
            term.set_str(frame.inner_x(), label_y, &oldest, muted, false);
            let right = frame.inner_x() + frame.inner_width() as i32 - newest.len() as i32;
            term.set_str(right, label_y, &newest, muted, false);
        }
        None => term.set_str(frame.inner_x(), label_y, "waiting for data", muted, false),
    }
}

fn draw_side(term: &mut Terminal, side: (i32, i32, u16, u16), info: &PanelInfo, colors: &ColorState) {
    let (x, y, w, h) = side;

    let stats = Panel::new(x, y, w, STATS_HEIGHT.min(h), "Traffic");
    stats.draw(term, colors);
    stats.write_lines(term, &stats_lines(info), colors);

    let talkers_y = y + STATS_HEIGHT as i32;
    let talkers_h = TALKERS_HEIGHT.min(h.saturating_sub(STATS_HEIGHT));
    if talkers_h >= 3 {
        let talkers = Panel::new(x, talkers_y, w, talkers_h, "Top countries");
        talkers.draw(term, colors);
        talkers.write_lines(term, &talker_lines(info.top_talkers), colors);
    }

    let status_y = talkers_y + talkers_h as i32;
    let status_h = h.saturating_sub(STATS_HEIGHT + talkers_h);
    if status_h >= 3 {
        let status = Panel::new(x, status_y, w, status_h, "Feed");
        status.draw(term, colors);
        status.write_lines(term, &status_lines(info), colors);
    }
}
