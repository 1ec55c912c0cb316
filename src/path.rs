use glam::Vec2;

use crate::replay::{MalformedRecord, ReplayPath, ReplayRecord};

/// Which feed supplies the next position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceMode {
    #[value(alias = "mouse")]
    Pointer,
    #[value(alias = "csv")]
    Replay,
}

impl SourceMode {
    pub fn label(self) -> &'static str {
        match self {
            SourceMode::Pointer => "Mouse",
            SourceMode::Replay => "Replay",
        }
    }
}

/// Live pointer position, updated from window events.
#[derive(Debug, Clone, Copy)]
pub struct LiveCursor {
    pos: Vec2,
}

impl LiveCursor {
    pub fn new(start: Vec2) -> Self {
        Self { pos: start }
    }

    pub fn set(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    pub fn next(&self) -> Vec2 {
        self.pos
    }
}

/// Looping cursor over a recorded path. Invariant: `index < path.len()`.
#[derive(Debug, Clone)]
pub struct ReplayCursor {
    path: ReplayPath,
    index: usize,
    /// Completed passes over the path.
    loops: u64,
}

impl ReplayCursor {
    /// None for an empty path.
    pub fn new(path: ReplayPath) -> Option<Self> {
        if path.is_empty() {
            return None;
        }
        Some(Self {
            path,
            index: 0,
            loops: 0,
        })
    }

    /// Current row, then advance (wrapping to 0). A malformed row still
    /// consumes its slot.
    pub fn next(&mut self) -> Result<Vec2, MalformedRecord> {
        let record = &self.path.records()[self.index];
        self.index += 1;
        if self.index == self.path.len() {
            self.index = 0;
            self.loops += 1;
        }
        match record {
            ReplayRecord::Point(p) => Ok(*p),
            ReplayRecord::Malformed(m) => Err(m.clone()),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn loops(&self) -> u64 {
        self.loops
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }
}

/// The dual-source position feed. `mode` selects which variant `next()` reads;
/// switching keeps both variants' state intact.
pub struct PathFeed {
    mode: SourceMode,
    live: LiveCursor,
    replay: Option<ReplayCursor>,
}

impl PathFeed {
    pub fn new(start: Vec2, replay: Option<ReplayCursor>) -> Self {
        Self {
            mode: SourceMode::Pointer,
            live: LiveCursor::new(start),
            replay,
        }
    }

    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    /// Switch the active source. Returns false (mode unchanged) when replay is
    /// requested but no path is loaded.
    pub fn set_mode(&mut self, mode: SourceMode) -> bool {
        if mode == SourceMode::Replay && self.replay.is_none() {
            return false;
        }
        self.mode = mode;
        true
    }

    pub fn set_pointer(&mut self, pos: Vec2) {
        self.live.set(pos);
    }

    pub fn replay(&self) -> Option<&ReplayCursor> {
        self.replay.as_ref()
    }

    pub fn has_replay(&self) -> bool {
        self.replay.is_some()
    }

    /// Next position from the active source.
    pub fn next(&mut self) -> Result<Vec2, MalformedRecord> {
        match (self.mode, self.replay.as_mut()) {
            (SourceMode::Replay, Some(cursor)) => cursor.next(),
            _ => Ok(self.live.next()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::parse_replay;
    use proptest::prelude::*;

    fn cursor(points: &[(f32, f32)]) -> ReplayCursor {
        ReplayCursor::new(ReplayPath::from_points(
            points.iter().map(|&(x, y)| Vec2::new(x, y)),
        ))
        .unwrap()
    }

    #[test]
    fn empty_path_has_no_cursor() {
        assert!(ReplayCursor::new(ReplayPath::from_points(Vec::new())).is_none());
    }

    #[test]
    fn replay_walks_in_order_and_wraps() {
        let mut c = cursor(&[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        assert_eq!(c.next().unwrap(), Vec2::new(1.0, 1.0));
        assert_eq!(c.next().unwrap(), Vec2::new(2.0, 2.0));
        assert_eq!(c.next().unwrap(), Vec2::new(3.0, 3.0));
        assert_eq!(c.index(), 0);
        assert_eq!(c.loops(), 1);
        assert_eq!(c.next().unwrap(), Vec2::new(1.0, 1.0));
        assert_eq!(c.index(), 1);
    }

    #[test]
    fn malformed_row_advances_index() {
        let mut c = ReplayCursor::new(parse_replay("0,1,1\n1,x,y\n2,3,3\n")).unwrap();
        assert!(c.next().is_ok());
        let err = c.next().unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(c.index(), 2);
        assert_eq!(c.next().unwrap(), Vec2::new(3.0, 3.0));
    }

    #[test]
    fn live_cursor_is_idempotent_between_moves() {
        let mut feed = PathFeed::new(Vec2::new(5.0, 5.0), None);
        assert_eq!(feed.next().unwrap(), Vec2::new(5.0, 5.0));
        assert_eq!(feed.next().unwrap(), Vec2::new(5.0, 5.0));
        feed.set_pointer(Vec2::new(9.0, 1.0));
        assert_eq!(feed.next().unwrap(), Vec2::new(9.0, 1.0));
    }

    #[test]
    fn replay_mode_refused_without_path() {
        let mut feed = PathFeed::new(Vec2::ZERO, None);
        assert!(!feed.set_mode(SourceMode::Replay));
        assert_eq!(feed.mode(), SourceMode::Pointer);
    }

    #[test]
    fn switching_preserves_replay_position() {
        let mut feed = PathFeed::new(Vec2::ZERO, Some(cursor(&[(1.0, 0.0), (2.0, 0.0), (3.0, 0.0)])));
        assert!(feed.set_mode(SourceMode::Replay));
        assert_eq!(feed.next().unwrap().x, 1.0);
        feed.set_mode(SourceMode::Pointer);
        feed.set_pointer(Vec2::new(7.0, 7.0));
        assert_eq!(feed.next().unwrap(), Vec2::new(7.0, 7.0));
        feed.set_mode(SourceMode::Replay);
        assert_eq!(feed.next().unwrap().x, 2.0);
    }

    proptest! {
        #[test]
        fn loops_back_on_call_len_plus_one(
            pts in prop::collection::vec((-1000.0f32..1000.0, -1000.0f32..1000.0), 1..64)
        ) {
            let mut c = cursor(&pts);
            let first = c.next().unwrap();
            for _ in 1..pts.len() {
                c.next().unwrap();
            }
            prop_assert_eq!(c.next().unwrap(), first);
            prop_assert!(c.index() < c.len());
        }
    }
}
