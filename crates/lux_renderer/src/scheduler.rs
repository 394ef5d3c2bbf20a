//! The render pool: partitions the image across workers and assembles
//! results as they arrive.
//!
//! One pool is constructed per render session; there is no global state.
//! The pool broadcasts the serialized scene to every worker once, then
//! drives a greedy dispatch loop: a single monotone cursor carves the pixel
//! space into row-bounded chunks, each idle worker immediately receives the
//! next one, and completed chunks go straight to the compositor regardless
//! of completion order. Pausing is cooperative: in-flight chunks still land,
//! no new ones are assigned, and the cursor survives for resumption.

use crate::chunk::{ChunkCursor, PixelRange};
use crate::worker::{spawn_worker, WorkerReply, WorkerRequest};
use crate::Camera;
use crossbeam_channel::{unbounded, Receiver, Sender};
use lux_core::asset::AssetLoader;
use lux_core::describe::SceneDesc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use thiserror::Error;

/// Receives finished row segments. The pool has no opinion on presentation;
/// anything that can accept `(row, column offset, RGBA bytes)` qualifies.
pub trait Compositor {
    fn write_span(&mut self, row: u32, column: u32, rgba: &[u8]);
}

/// Errors surfaced by the render pool.
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Failed to encode scene: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Worker {worker} rejected the scene: {reason}")]
    BuildRejected { worker: usize, reason: String },

    #[error("No scene has been built")]
    NoScene,

    #[error("Worker channel disconnected")]
    WorkerLost,
}

/// Cooperative pause switch, shared with whoever controls the render.
#[derive(Clone)]
pub struct PauseHandle(Arc<AtomicBool>);

impl PauseHandle {
    /// Stop assigning new chunks. In-flight chunks still complete and are
    /// composited.
    pub fn pause(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Allow dispatch again; the next `render` call continues from the
    /// cursor.
    pub fn resume(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Snapshot of how far a render has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderProgress {
    pub pixels_completed: usize,
    pub pixels_total: usize,
    /// Chunks whose worker reported a failure; they are not retried and
    /// their pixels stay missing.
    pub failed_chunks: usize,
}

impl RenderProgress {
    pub fn is_complete(&self) -> bool {
        self.failed_chunks == 0 && self.pixels_completed == self.pixels_total
    }
}

struct WorkerSlot {
    requests: Sender<WorkerRequest>,
    handle: JoinHandle<()>,
    busy: Option<PixelRange>,
}

/// A pool of render workers plus the scheduling state that drives them.
pub struct RenderPool {
    workers: Vec<WorkerSlot>,
    replies: Receiver<WorkerReply>,
    pause: Arc<AtomicBool>,
    chunk_size: usize,
    cursor: Option<ChunkCursor>,
    image_width: u32,
    pixels_completed: usize,
    failed_chunks: usize,
}

impl RenderPool {
    /// Default number of pixels per chunk.
    pub const DEFAULT_CHUNK_SIZE: usize = 1024;

    /// Spawn `worker_count` workers, each resolving assets through its own
    /// handle to `loader`.
    pub fn new(worker_count: usize, loader: Arc<dyn AssetLoader>) -> Self {
        let worker_count = worker_count.max(1);
        let (reply_tx, reply_rx) = unbounded();

        let workers = (0..worker_count)
            .map(|id| {
                let (req_tx, req_rx) = unbounded();
                let handle = spawn_worker(id, loader.clone(), req_rx, reply_tx.clone());
                WorkerSlot {
                    requests: req_tx,
                    handle,
                    busy: None,
                }
            })
            .collect();

        log::info!("render pool started with {} workers", worker_count);

        Self {
            workers,
            replies: reply_rx,
            pause: Arc::new(AtomicBool::new(false)),
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
            cursor: None,
            image_width: 0,
            pixels_completed: 0,
            failed_chunks: 0,
        }
    }

    /// Override the chunk size (pixels per task).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn pause_handle(&self) -> PauseHandle {
        PauseHandle(self.pause.clone())
    }

    pub fn progress(&self) -> RenderProgress {
        RenderProgress {
            pixels_completed: self.pixels_completed,
            pixels_total: self.cursor.as_ref().map_or(0, |c| c.total()),
            failed_chunks: self.failed_chunks,
        }
    }

    /// Broadcast the scene to every worker and wait until all of them have
    /// rebuilt it (including deferred asset loads). Starts a new render
    /// session: the cursor returns to pixel zero.
    pub fn build_scene(&mut self, desc: &SceneDesc) -> Result<(), PoolError> {
        let payload = serde_json::to_string(desc)?;

        for slot in &self.workers {
            slot.requests
                .send(WorkerRequest::BuildScene {
                    payload: payload.clone(),
                })
                .map_err(|_| PoolError::WorkerLost)?;
        }

        // Wait for every worker to acknowledge before any dispatch.
        let mut failure: Option<(usize, String)> = None;
        let mut acknowledged = 0;
        while acknowledged < self.workers.len() {
            match self.replies.recv().map_err(|_| PoolError::WorkerLost)? {
                WorkerReply::SceneReady { worker, result } => {
                    acknowledged += 1;
                    if let Err(reason) = result {
                        log::warn!("worker {} rejected scene: {}", worker, reason);
                        failure.get_or_insert((worker, reason));
                    }
                }
                WorkerReply::ChunkDone { worker, .. } => {
                    // Stale result from an abandoned session.
                    log::debug!("discarding stale chunk from worker {}", worker);
                }
            }
        }

        if let Some((worker, reason)) = failure {
            return Err(PoolError::BuildRejected { worker, reason });
        }

        let width = desc.camera.image_width;
        let height = Camera::height_for(desc.camera.aspect_ratio, width);
        self.image_width = width;
        self.cursor = Some(ChunkCursor::new(width, height, self.chunk_size));
        self.pixels_completed = 0;
        self.failed_chunks = 0;

        log::info!(
            "scene distributed to {} workers; {}x{} pixels pending",
            self.workers.len(),
            width,
            height
        );
        Ok(())
    }

    /// Drive the dispatch loop until the image is finished or a pause is
    /// requested. In-flight chunks are always drained before returning, so
    /// no result is lost across a pause. Call again after a pause to resume
    /// from the same cursor.
    pub fn render(&mut self, compositor: &mut dyn Compositor) -> Result<RenderProgress, PoolError> {
        if self.cursor.is_none() {
            return Err(PoolError::NoScene);
        }

        loop {
            // Greedy assignment: keep every worker busy while running.
            if !self.pause.load(Ordering::Relaxed) {
                for slot in self.workers.iter_mut().filter(|s| s.busy.is_none()) {
                    let Some(cursor) = self.cursor.as_mut() else { break };
                    let Some(task) = cursor.next_chunk() else { break };

                    log::trace!("assigning pixels [{}, {})", task.start, task.end);
                    slot.requests
                        .send(WorkerRequest::RenderChunk { task })
                        .map_err(|_| PoolError::WorkerLost)?;
                    slot.busy = Some(task);
                }
            }

            if self.workers.iter().all(|s| s.busy.is_none()) {
                // Nothing in flight: either the image is done or we are
                // paused with everything drained.
                break;
            }

            match self.replies.recv().map_err(|_| PoolError::WorkerLost)? {
                WorkerReply::ChunkDone {
                    worker,
                    task,
                    result,
                } => {
                    self.workers[worker].busy = None;
                    match result {
                        Ok(bytes) => {
                            compositor.write_span(
                                task.row(self.image_width),
                                task.column(self.image_width),
                                &bytes,
                            );
                            self.pixels_completed += task.len();
                        }
                        Err(reason) => {
                            // No retry policy: the chunk is recorded as
                            // permanently missing.
                            log::warn!(
                                "worker {} failed chunk [{}, {}): {}",
                                worker,
                                task.start,
                                task.end,
                                reason
                            );
                            self.failed_chunks += 1;
                        }
                    }
                }
                WorkerReply::SceneReady { worker, .. } => {
                    log::debug!("unexpected scene ack from worker {}", worker);
                }
            }
        }

        Ok(self.progress())
    }

    /// Stop all workers and wait for them to exit.
    pub fn shutdown(self) {
        for slot in &self.workers {
            let _ = slot.requests.send(WorkerRequest::Shutdown);
        }
        for slot in self.workers {
            if slot.handle.join().is_err() {
                log::warn!("a worker thread panicked before shutdown");
            }
        }
        log::info!("render pool shut down");
    }
}

/// Compositor assembling spans into a full RGBA frame.
pub struct ImageCompositor {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl ImageCompositor {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The assembled frame, row-major RGBA.
    pub fn rgba(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.pixels
    }
}

impl Compositor for ImageCompositor {
    fn write_span(&mut self, row: u32, column: u32, rgba: &[u8]) {
        if row >= self.height {
            return;
        }
        let start = ((row * self.width + column) * 4) as usize;
        if start >= self.pixels.len() {
            return;
        }
        let end = (start + rgba.len()).min(self.pixels.len());
        self.pixels[start..end].copy_from_slice(&rgba[..end - start]);
    }
}
