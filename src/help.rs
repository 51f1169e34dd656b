use crate::terminal::Terminal;
use crossterm::style::Color;

pub const GLOBE_HELP: &str = "\
TRAFFIC GLOBE
─────────────────────
←/→ h/l  Spin
↑/↓ k/j  Tilt
+/-      Zoom in/out
0        Reset view
Space    Pause rotation
!-)      Color scheme
q/Esc    Quit
?        Close help";

/// Centered bordered box drawn into the back buffer
pub fn render_help_overlay(term: &mut Terminal, help_text: &str) {
    if help_text.is_empty() {
        return;
    }

    let (width, height) = term.size();
    let lines: Vec<&str> = help_text.lines().collect();
    let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_w = inner + 4;
    let box_h = lines.len() + 2;

    let x0 = ((width as usize).saturating_sub(box_w) / 2) as i32;
    let y0 = ((height as usize).saturating_sub(box_h) / 2) as i32;
    let right = x0 + box_w as i32 - 1;
    let bottom = y0 + box_h as i32 - 1;

    let border = Some(Color::White);
    let text = Some(Color::Grey);

    let rule = "─".repeat(box_w - 2);
    term.set(x0, y0, '┌', border, false);
    term.set_str(x0 + 1, y0, &rule, border, false);
    term.set(right, y0, '┐', border, false);

    for (i, line) in lines.iter().enumerate() {
        let y = y0 + 1 + i as i32;
        let pad = inner.saturating_sub(line.chars().count());
        term.set(x0, y, '│', border, false);
        term.set_str(x0 + 1, y, &format!(" {}{} ", line, " ".repeat(pad)), text, false);
        term.set(right, y, '│', border, false);
    }

    term.set(x0, bottom, '└', border, false);
    term.set_str(x0 + 1, bottom, &rule, border, false);
    term.set(right, bottom, '┘', border, false);
}
