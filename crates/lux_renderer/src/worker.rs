//! Render worker: owns a private copy of the scene and renders pixel
//! ranges on request.
//!
//! Workers share nothing with the scheduler; the serialized scene and the
//! finished pixel buffers are the only data that crosses the channel.

use crate::chunk::PixelRange;
use crate::renderer::{color_to_rgba, render_pixel};
use crate::scene::{build_scene_from_json, BuiltScene};
use crossbeam_channel::{Receiver, Sender};
use lux_core::asset::AssetLoader;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Scheduler -> worker messages.
pub enum WorkerRequest {
    /// Serialized scene, sent exactly once per render session.
    BuildScene { payload: String },
    /// Render a pixel range and reply with its RGBA bytes.
    RenderChunk { task: PixelRange },
    Shutdown,
}

/// Worker -> scheduler messages.
pub enum WorkerReply {
    /// Acknowledges (or rejects) a scene build.
    SceneReady {
        worker: usize,
        result: Result<(), String>,
    },
    /// A finished (or failed) chunk. Success carries `4 * len` bytes of
    /// row-major RGBA with gamma already applied.
    ChunkDone {
        worker: usize,
        task: PixelRange,
        result: Result<Vec<u8>, String>,
    },
}

/// Spawn a worker thread.
///
/// The worker exits when it receives `Shutdown` or when the request channel
/// disconnects.
pub fn spawn_worker(
    id: usize,
    loader: Arc<dyn AssetLoader>,
    requests: Receiver<WorkerRequest>,
    replies: Sender<WorkerReply>,
) -> JoinHandle<()> {
    std::thread::Builder::new()
        .name(format!("lux-worker-{}", id))
        .spawn(move || worker_loop(id, loader, requests, replies))
        .expect("failed to spawn worker thread")
}

fn worker_loop(
    id: usize,
    loader: Arc<dyn AssetLoader>,
    requests: Receiver<WorkerRequest>,
    replies: Sender<WorkerReply>,
) {
    let mut scene: Option<BuiltScene> = None;
    let mut rng = StdRng::from_entropy();

    while let Ok(request) = requests.recv() {
        match request {
            WorkerRequest::BuildScene { payload } => {
                let result = match build_scene_from_json(&payload, loader.clone()) {
                    Ok(built) => {
                        scene = Some(built);
                        Ok(())
                    }
                    Err(e) => {
                        scene = None;
                        Err(e.to_string())
                    }
                };
                if replies.send(WorkerReply::SceneReady { worker: id, result }).is_err() {
                    break;
                }
            }

            WorkerRequest::RenderChunk { task } => {
                let result = match &scene {
                    Some(scene) => Ok(render_chunk(scene, task, &mut rng)),
                    None => Err("no scene built".to_string()),
                };
                if replies
                    .send(WorkerReply::ChunkDone {
                        worker: id,
                        task,
                        result,
                    })
                    .is_err()
                {
                    break;
                }
            }

            WorkerRequest::Shutdown => break,
        }
    }
}

/// Render a pixel range into display-ready RGBA bytes.
fn render_chunk(scene: &BuiltScene, task: PixelRange, rng: &mut StdRng) -> Vec<u8> {
    let width = scene.camera.image_width;
    let lights = scene.lights.as_deref();

    let mut bytes = Vec::with_capacity(task.len() * 4);
    for index in task.start..task.end {
        let x = (index % width as usize) as u32;
        let y = (index / width as usize) as u32;
        let color = render_pixel(&scene.camera, &scene.world, lights, x, y, rng);
        bytes.extend_from_slice(&color_to_rgba(color));
    }
    bytes
}
