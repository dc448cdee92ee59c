use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

use facetag_core::overlay::domain::smoothed_pose::SmoothedPose;
use facetag_core::pipeline::infrastructure::threaded_frame_worker::{
    ThreadedFrameWorker, WorkerError,
};
use facetag_core::pipeline::track_faces_use_case::{FrameInput, TrackFacesUseCase};
use facetag_core::shared::constants::TARGET_DETECTION_FPS;
use facetag_core::shared::display_geometry::DisplayGeometry;

use crate::frame_source::FrameSource;
use crate::pose_sink::PoseSink;

/// Where frames are processed: inline, or on a dedicated worker thread.
pub enum FrameRunner {
    Direct(TrackFacesUseCase),
    Threaded(ThreadedFrameWorker),
}

impl FrameRunner {
    fn process(
        &mut self,
        input: FrameInput,
        now: Instant,
    ) -> Result<Vec<SmoothedPose>, WorkerError> {
        match self {
            FrameRunner::Direct(use_case) => Ok(use_case.process_frame_at(&input, now)),
            FrameRunner::Threaded(worker) => {
                worker.submit_at(input, now)?;
                Ok(worker.recv()?.poses)
            }
        }
    }

    fn finish(self) -> Result<TrackFacesUseCase, WorkerError> {
        match self {
            FrameRunner::Direct(use_case) => Ok(use_case),
            FrameRunner::Threaded(worker) => worker.shutdown(),
        }
    }
}

/// Feeds every recorded frame through the tracker and writes the poses.
///
/// Frames without a timestamp are spaced at the target detection rate.
pub fn replay<R: BufRead, W: Write>(
    source: FrameSource<R>,
    mut runner: FrameRunner,
    mut geometry: DisplayGeometry,
    sink: &mut PoseSink<W>,
) -> Result<TrackFacesUseCase, Box<dyn std::error::Error>> {
    let base = Instant::now();

    for (index, record) in source.enumerate() {
        let record = record?;
        if let Some(display) = record.display {
            geometry = display.into();
            log::debug!("Frame {index}: layout changed to {geometry:?}");
        }
        let offset = record
            .timestamp_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| frame_offset(index));

        let input = FrameInput {
            faces: record.landmarks(),
            geometry,
        };
        let poses = runner.process(input, base + offset)?;
        sink.write_frame(index, &poses)?;
    }

    sink.flush()?;
    Ok(runner.finish()?)
}

/// Offset of frame `index` at the target detection rate.
fn frame_offset(index: usize) -> Duration {
    Duration::from_secs_f64(index as f64 / TARGET_DETECTION_FPS)
}
