use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;

use crate::overlay::domain::smoothed_pose::SmoothedPose;
use crate::pipeline::track_faces_use_case::{FrameInput, TrackFacesUseCase};

const DEFAULT_CHANNEL_CAPACITY: usize = 4;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WorkerError {
    #[error("tracking worker has stopped")]
    Disconnected,
    #[error("tracking worker panicked")]
    Panicked,
}

/// Poses for one submitted frame, tagged with its submission index.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameOutput {
    pub index: usize,
    pub poses: Vec<SmoothedPose>,
}

enum Command {
    Frame(FrameInput, Option<Instant>),
    Reset,
}

/// Runs a `TrackFacesUseCase` on its own thread.
///
/// Layout: `caller → [commands] → worker → [outputs] → caller`
///
/// All registry and engine state lives on the worker thread. Commands are
/// handled strictly in submission order, so a reset always falls between
/// two whole frames.
pub struct ThreadedFrameWorker {
    command_tx: Option<Sender<Command>>,
    output_rx: Receiver<FrameOutput>,
    handle: Option<JoinHandle<TrackFacesUseCase>>,
}

impl ThreadedFrameWorker {
    pub fn spawn(use_case: TrackFacesUseCase) -> Self {
        Self::with_capacity(use_case, DEFAULT_CHANNEL_CAPACITY)
    }

    /// `capacity` bounds the queued commands; outputs are unbounded so the
    /// worker never blocks on a slow reader.
    pub fn with_capacity(use_case: TrackFacesUseCase, capacity: usize) -> Self {
        let (command_tx, command_rx) = crossbeam_channel::bounded::<Command>(capacity.max(1));
        let (output_tx, output_rx) = crossbeam_channel::unbounded::<FrameOutput>();
        let handle = spawn_worker(use_case, command_rx, output_tx);
        Self {
            command_tx: Some(command_tx),
            output_rx,
            handle: Some(handle),
        }
    }

    pub fn submit(&self, input: FrameInput) -> Result<(), WorkerError> {
        self.send(Command::Frame(input, None))
    }

    /// Like `submit`, with an explicit frame timestamp for track ageing.
    pub fn submit_at(&self, input: FrameInput, now: Instant) -> Result<(), WorkerError> {
        self.send(Command::Frame(input, Some(now)))
    }

    pub fn reset(&self) -> Result<(), WorkerError> {
        self.send(Command::Reset)
    }

    /// Blocks until the next frame's poses are ready.
    pub fn recv(&self) -> Result<FrameOutput, WorkerError> {
        self.output_rx.recv().map_err(|_| WorkerError::Disconnected)
    }

    /// Stops accepting work, waits for queued frames, and returns the use case.
    ///
    /// Outputs not yet received are discarded.
    pub fn shutdown(mut self) -> Result<TrackFacesUseCase, WorkerError> {
        self.command_tx.take();
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| WorkerError::Panicked),
            None => Err(WorkerError::Disconnected),
        }
    }

    fn send(&self, command: Command) -> Result<(), WorkerError> {
        self.command_tx
            .as_ref()
            .ok_or(WorkerError::Disconnected)?
            .send(command)
            .map_err(|_| WorkerError::Disconnected)
    }
}

impl Drop for ThreadedFrameWorker {
    fn drop(&mut self) {
        self.command_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Tracking worker panicked during shutdown");
            }
        }
    }
}

fn spawn_worker(
    mut use_case: TrackFacesUseCase,
    command_rx: Receiver<Command>,
    output_tx: Sender<FrameOutput>,
) -> JoinHandle<TrackFacesUseCase> {
    std::thread::spawn(move || {
        let mut index = 0;
        for command in command_rx {
            match command {
                Command::Frame(input, now) => {
                    let poses = match now {
                        Some(now) => use_case.process_frame_at(&input, now),
                        None => use_case.process_frame(&input),
                    };
                    // A gone receiver still lets queued frames update state.
                    let _ = output_tx.send(FrameOutput { index, poses });
                    index += 1;
                }
                Command::Reset => use_case.reset(),
            }
        }
        use_case
    })
}
