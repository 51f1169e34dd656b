/// Highest event index already turned into a marker
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    current: Option<usize>,
}

impl Cursor {
    pub fn new() -> Self {
        Self { current: None }
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Move forward to `max_index_seen`. Never moves backward.
    pub fn advance_to(&mut self, max_index_seen: usize) {
        match self.current {
            Some(current) if max_index_seen <= current => {}
            _ => self.current = Some(max_index_seen),
        }
    }

    /// First index that has not been ingested yet
    pub fn next_unprocessed_start_index(&self) -> usize {
        self.current.map_or(0, |c| c + 1)
    }
}
