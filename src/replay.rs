//! Recorded path loader.
//!
//! The file is CSV with one position per row, `frame,x,y` (the column layout
//! written by the path generator) or bare `x,y`. An optional header line is
//! skipped. Rows that do not yield two numbers are kept in sequence as
//! [`ReplayRecord::Malformed`] so replay timing stays aligned with the file.

use std::path::{Path, PathBuf};

use glam::Vec2;

/// A row that could not be read as two numeric coordinates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("malformed record on line {line}: {reason}")]
pub struct MalformedRecord {
    /// 1-based line number in the source file.
    pub line: usize,
    pub reason: String,
}

/// Load-time failures. All of these are fatal for replay mode.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// File absent or unreadable.
    #[error("replay file {} could not be read: {source}", .path.display())]
    MissingInputSource {
        path: PathBuf,
        source: std::io::Error,
    },
    /// File readable but holds no usable positions.
    #[error("replay file {} contains no {}", .path.display(), empty_detail(.malformed))]
    EmptyInputSource { path: PathBuf, malformed: usize },
}

fn empty_detail(malformed: &usize) -> String {
    match *malformed {
        0 => "records".to_string(),
        n => format!("valid records ({n} malformed)"),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplayRecord {
    Point(Vec2),
    Malformed(MalformedRecord),
}

/// Ordered, finite, pre-loaded position sequence.
#[derive(Debug, Clone)]
pub struct ReplayPath {
    records: Vec<ReplayRecord>,
}

impl ReplayPath {
    /// Build from already-valid points (every row well-formed).
    #[cfg(test)]
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Self {
        Self {
            records: points.into_iter().map(ReplayRecord::Point).collect(),
        }
    }

    pub fn records(&self) -> &[ReplayRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn malformed_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r, ReplayRecord::Malformed(_)))
            .count()
    }
}

/// Read and parse a replay file.
pub fn load_replay(path: &Path) -> Result<ReplayPath, ReplayError> {
    let text = std::fs::read_to_string(path).map_err(|source| ReplayError::MissingInputSource {
        path: path.to_path_buf(),
        source,
    })?;

    let replay = parse_replay(&text);
    let malformed = replay.malformed_count();
    if replay.len() == malformed {
        return Err(ReplayError::EmptyInputSource {
            path: path.to_path_buf(),
            malformed,
        });
    }

    for record in replay.records() {
        if let ReplayRecord::Malformed(m) = record {
            log::warn!("{}: {m}", path.display());
        }
    }
    log::info!(
        "Loaded {} replay positions from {} ({} malformed)",
        replay.len() - malformed,
        path.display(),
        malformed
    );
    Ok(replay)
}

/// Parse CSV text. Blank lines are ignored; a non-numeric first line is a header.
pub fn parse_replay(text: &str) -> ReplayPath {
    let mut records = Vec::new();
    let mut seen_first = false;

    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let parsed = parse_row(line, i + 1);
        if !seen_first {
            seen_first = true;
            if parsed.is_err() && line.chars().any(|c| c.is_ascii_alphabetic()) {
                continue;
            }
        }
        records.push(match parsed {
            Ok(p) => ReplayRecord::Point(p),
            Err(m) => ReplayRecord::Malformed(m),
        });
    }

    ReplayPath { records }
}

fn parse_row(line: &str, line_no: usize) -> Result<Vec2, MalformedRecord> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let (xs, ys) = match fields.as_slice() {
        [x, y] => (*x, *y),
        [_frame, x, y] => (*x, *y),
        _ => {
            return Err(MalformedRecord {
                line: line_no,
                reason: format!("expected 2 or 3 fields, found {}", fields.len()),
            })
        }
    };
    let x = parse_coord(xs, "x", line_no)?;
    let y = parse_coord(ys, "y", line_no)?;
    Ok(Vec2::new(x, y))
}

fn parse_coord(field: &str, name: &str, line_no: usize) -> Result<f32, MalformedRecord> {
    match field.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(MalformedRecord {
            line: line_no,
            reason: format!("{name} value {field:?} is not a number"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn points(replay: &ReplayPath) -> Vec<Vec2> {
        replay
            .records()
            .iter()
            .filter_map(|r| match r {
                ReplayRecord::Point(p) => Some(*p),
                ReplayRecord::Malformed(_) => None,
            })
            .collect()
    }

    #[test]
    fn parses_generator_format_with_header() {
        let replay = parse_replay("frame,x,y\n0,400.5,300\n1,401.25,298.75\n");
        assert_eq!(replay.len(), 2);
        assert_eq!(
            points(&replay),
            vec![Vec2::new(400.5, 300.0), Vec2::new(401.25, 298.75)]
        );
    }

    #[test]
    fn parses_two_column_rows_without_header() {
        let replay = parse_replay("10,20\n\n30, 40\n");
        assert_eq!(points(&replay), vec![Vec2::new(10.0, 20.0), Vec2::new(30.0, 40.0)]);
    }

    #[test]
    fn malformed_rows_keep_their_slot() {
        let replay = parse_replay("frame,x,y\n0,1,2\n1,abc,3\n2,4\n3,5,6,7\n4,8,9\n");
        assert_eq!(replay.len(), 5);
        assert_eq!(replay.malformed_count(), 2);
        match &replay.records()[1] {
            ReplayRecord::Malformed(m) => {
                assert_eq!(m.line, 3);
                assert!(m.to_string().starts_with("malformed record on line 3: x value"));
            }
            other => panic!("expected malformed, got {other:?}"),
        }
        // "2,4" is a valid two-column row.
        assert_eq!(replay.records()[2], ReplayRecord::Point(Vec2::new(2.0, 4.0)));
    }

    #[test]
    fn non_finite_values_are_malformed() {
        let replay = parse_replay("0,1,1\n1,NaN,2\n2,inf,3\n");
        assert_eq!(replay.malformed_count(), 2);
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_replay(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, ReplayError::MissingInputSource { .. }));
        assert!(err.to_string().contains("nope.csv"));
        let io = std::error::Error::source(&err).and_then(|e| e.downcast_ref::<std::io::Error>());
        assert_eq!(io.map(|e| e.kind()), Some(std::io::ErrorKind::NotFound));
    }

    #[test]
    fn empty_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "frame,x,y").unwrap();
        let err = load_replay(file.path()).unwrap_err();
        assert!(matches!(err, ReplayError::EmptyInputSource { malformed: 0, .. }));
        assert!(err.to_string().ends_with("contains no records"));
    }

    #[test]
    fn all_malformed_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "frame,x,y\n0,a,b\n1,c,d").unwrap();
        let err = load_replay(file.path()).unwrap_err();
        assert!(matches!(err, ReplayError::EmptyInputSource { malformed: 2, .. }));
        assert!(err.to_string().ends_with("contains no valid records (2 malformed)"));
    }

    #[test]
    fn loads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "frame,x,y\n0,100,100\n1,200,100\n2,100,200").unwrap();
        let replay = load_replay(file.path()).unwrap();
        assert_eq!(replay.len(), 3);
        assert_eq!(replay.malformed_count(), 0);
    }
}
