use crossterm::event::KeyCode;
use crossterm::style::Color;

/// Shade ramps, dim to bright. Index = scheme number.
const SCHEMES: [[Color; 4]; 10] = [
    [Color::DarkGreen, Color::Green, Color::Green, Color::AnsiValue(10)],      // 0 matrix
    [Color::DarkRed, Color::Red, Color::DarkYellow, Color::Yellow],            // 1 fire
    [Color::DarkBlue, Color::Blue, Color::Cyan, Color::Cyan],                  // 2 ice
    [Color::DarkMagenta, Color::Magenta, Color::Magenta, Color::AnsiValue(13)], // 3 pink
    [Color::DarkYellow, Color::Yellow, Color::Yellow, Color::AnsiValue(11)],   // 4 gold
    [Color::DarkCyan, Color::Cyan, Color::Cyan, Color::AnsiValue(14)],         // 5 electric
    [Color::DarkRed, Color::Red, Color::Magenta, Color::AnsiValue(9)],         // 6 lava
    [Color::DarkGrey, Color::Grey, Color::White, Color::White],                // 7 mono
    [Color::Red, Color::Yellow, Color::Green, Color::Cyan],                    // 8 rainbow
    [Color::DarkBlue, Color::Blue, Color::Magenta, Color::AnsiValue(13)],      // 9 neon
];

const MONO: u8 = 7;

/// Active color scheme, switched with Shift+digit
#[derive(Clone, Copy)]
pub struct ColorState {
    pub scheme: u8,
}

impl ColorState {
    pub fn new(default_scheme: u8) -> Self {
        Self {
            scheme: default_scheme.min(SCHEMES.len() as u8 - 1),
        }
    }

    /// Shift+1..Shift+0 select schemes 1..9 and 0. Returns true if handled.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let scheme = match code {
            KeyCode::Char('!') => 1,
            KeyCode::Char('@') => 2,
            KeyCode::Char('#') => 3,
            KeyCode::Char('$') => 4,
            KeyCode::Char('%') => 5,
            KeyCode::Char('^') => 6,
            KeyCode::Char('&') => 7,
            KeyCode::Char('*') => 8,
            KeyCode::Char('(') => 9,
            KeyCode::Char(')') => 0,
            _ => return false,
        };
        self.scheme = scheme;
        true
    }

    pub fn is_mono(&self) -> bool {
        self.scheme == MONO
    }

    /// Color for intensity 0-3; the top intensity is drawn bold
    pub fn shade(&self, intensity: u8) -> (Color, bool) {
        let ramp = &SCHEMES[self.scheme as usize % SCHEMES.len()];
        let i = intensity.min(3) as usize;
        (ramp[i], i == 3)
    }

    /// Semantic status in mono mode, themed shade otherwise
    pub fn status(&self, status: StatusColor) -> Color {
        if self.is_mono() {
            return match status {
                StatusColor::Good => Color::Green,
                StatusColor::Warning => Color::Yellow,
                StatusColor::Critical => Color::Red,
                StatusColor::Info => Color::Cyan,
                StatusColor::Muted => Color::DarkGrey,
            };
        }
        let intensity = match status {
            StatusColor::Muted => 0,
            StatusColor::Info => 1,
            StatusColor::Good | StatusColor::Warning => 2,
            StatusColor::Critical => 3,
        };
        self.shade(intensity).0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusColor {
    Good,
    Warning,
    Critical,
    Info,
    Muted,
}
