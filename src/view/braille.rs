//! Braille dot canvas: 2x4 dots per terminal cell

use crate::colors::ColorState;
use crate::terminal::{rgb, Terminal};

/// What occupies a single dot
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Dot {
    #[default]
    Empty,
    /// Themed intensity 0-3
    Shade(u8),
    /// Fixed color, wins over shades in the same cell
    Ink((u8, u8, u8)),
}

// Dot offsets (row, col) within a cell, in braille bit order
const DOT_POSITIONS: [(usize, usize); 8] = [
    (0, 0), (1, 0), (2, 0),
    (0, 1), (1, 1), (2, 1),
    (3, 0), (3, 1),
];

pub struct BrailleCanvas {
    cols: usize,
    rows: usize,
    dots: Vec<Dot>,
}

impl BrailleCanvas {
    /// Canvas covering `cols` x `rows` terminal cells
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            dots: vec![Dot::Empty; cols * 2 * rows * 4],
        }
    }

    pub fn dot_width(&self) -> usize {
        self.cols * 2
    }

    pub fn dot_height(&self) -> usize {
        self.rows * 4
    }

    pub fn clear(&mut self) {
        self.dots.fill(Dot::Empty);
    }

    pub fn get(&self, x: i32, y: i32) -> Dot {
        self.index(x, y).map_or(Dot::Empty, |i| self.dots[i])
    }

    /// Shades never overwrite brighter shades or ink
    pub fn plot(&mut self, x: i32, y: i32, dot: Dot) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        let slot = &mut self.dots[i];
        *slot = match (*slot, dot) {
            (Dot::Ink(_), Dot::Shade(_)) => *slot,
            (Dot::Shade(old), Dot::Shade(new)) => Dot::Shade(old.max(new)),
            (_, Dot::Empty) => *slot,
            _ => dot,
        };
    }

    /// Filled disc, used for markers
    pub fn disc(&mut self, cx: i32, cy: i32, radius: i32, dot: Dot) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.plot(cx + dx, cy + dy, dot);
                }
            }
        }
    }

    /// Glyph and dominant dot for one terminal cell
    pub fn cell(&self, cx: usize, cy: usize) -> Option<(char, Dot)> {
        let mut bits: u32 = 0;
        let mut dominant = Dot::Empty;

        for (bit, &(dy, dx)) in DOT_POSITIONS.iter().enumerate() {
            let dot = self.get((cx * 2 + dx) as i32, (cy * 4 + dy) as i32);
            if dot == Dot::Empty {
                continue;
            }
            bits |= 1 << bit;
            dominant = match (dominant, dot) {
                (Dot::Ink(_), _) => dominant,
                (_, Dot::Ink(_)) => dot,
                (Dot::Shade(a), Dot::Shade(b)) => Dot::Shade(a.max(b)),
                _ => dot,
            };
        }

        if bits == 0 {
            return None;
        }
        char::from_u32(0x2800 + bits).map(|ch| (ch, dominant))
    }

    /// Copy onto the terminal back buffer with its top-left at (x, y)
    pub fn blit(&self, term: &mut Terminal, x: i32, y: i32, colors: &ColorState) {
        for cy in 0..self.rows {
            for cx in 0..self.cols {
                let Some((ch, dot)) = self.cell(cx, cy) else {
                    continue;
                };
                let (color, bold) = match dot {
                    Dot::Ink((r, g, b)) => (rgb(r, g, b), true),
                    Dot::Shade(level) => colors.shade(level),
                    Dot::Empty => continue,
                };
                term.set(x + cx as i32, y + cy as i32, ch, Some(color), bold);
            }
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        (x < self.dot_width() && y < self.dot_height()).then(|| y * self.dot_width() + x)
    }
}
