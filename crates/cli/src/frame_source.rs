use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use facetag_core::detection::domain::face_landmarks::FaceLandmarks;
use facetag_core::shared::display_geometry::DisplayGeometry;
use facetag_core::shared::point::Point;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameSourceError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed frame on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeometryRecord {
    pub display_width: f64,
    pub display_height: f64,
    pub video_width: f64,
    pub video_height: f64,
}

impl From<GeometryRecord> for DisplayGeometry {
    fn from(g: GeometryRecord) -> Self {
        DisplayGeometry::new(g.display_width, g.display_height, g.video_width, g.video_height)
    }
}

/// One recorded detector frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FrameRecord {
    /// Landmark meshes, one per face, as `[x, y]` pairs.
    #[serde(default)]
    pub faces: Vec<Vec<[f64; 2]>>,
    pub timestamp_ms: Option<u64>,
    /// Layout change taking effect from this frame on.
    pub display: Option<GeometryRecord>,
}

impl FrameRecord {
    pub fn landmarks(&self) -> Vec<FaceLandmarks> {
        self.faces
            .iter()
            .map(|face| FaceLandmarks::new(face.iter().map(|&[x, y]| Point::new(x, y)).collect()))
            .collect()
    }
}

/// JSON Lines reader yielding one `FrameRecord` per non-blank line.
pub struct FrameSource<R: BufRead> {
    lines: Lines<R>,
    line: usize,
}

impl FrameSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, FrameSourceError> {
        let file = File::open(path).map_err(|source| FrameSourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> FrameSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }
}

impl<R: BufRead> Iterator for FrameSource<R> {
    type Item = Result<FrameRecord, FrameSourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = self.lines.next()?;
            self.line += 1;
            let line = self.line;
            let text = match text {
                Ok(t) => t,
                Err(source) => return Some(Err(FrameSourceError::Read { line, source })),
            };
            if text.trim().is_empty() {
                continue;
            }
            return Some(
                serde_json::from_str(&text).map_err(|source| FrameSourceError::Parse { line, source }),
            );
        }
    }
}
