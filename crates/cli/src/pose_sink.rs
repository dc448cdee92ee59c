use std::io::Write;

use facetag_core::overlay::domain::smoothed_pose::SmoothedPose;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct PoseRecord {
    id: u64,
    slot: u32,
    mask: String,
    x: f64,
    y: f64,
    rotation: f64,
    size: f64,
}

impl From<&SmoothedPose> for PoseRecord {
    fn from(p: &SmoothedPose) -> Self {
        Self {
            id: p.id,
            slot: p.slot,
            mask: p.mask_asset(),
            x: p.x,
            y: p.y,
            rotation: p.rotation,
            size: p.size,
        }
    }
}

#[derive(Debug, Serialize)]
struct FrameLine {
    frame: usize,
    poses: Vec<PoseRecord>,
}

/// Writes one JSON line per frame.
pub struct PoseSink<W: Write> {
    writer: W,
}

impl<W: Write> PoseSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_frame(&mut self, frame: usize, poses: &[SmoothedPose]) -> std::io::Result<()> {
        let line = FrameLine {
            frame,
            poses: poses.iter().map(PoseRecord::from).collect(),
        };
        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }
}
