// THEORY:
// Tracking is stateless, so independent frames can be processed concurrently as
// long as no two invocations share a frame buffer. The parallel pipeline makes
// that guarantee structural: every `FrameTask` owns its frame, a dispatcher hands
// tasks round-robin to a fixed set of workers, and each worker runs the CPU-bound
// tracking call on the blocking pool before replying over a oneshot channel with
// the (mask-rendered) frame and its result.
//
// Workers share one immutable `ObjectTracker`; nothing crosses from one frame to
// the next. Batches come back in submission order.

use crate::error::{Result, TrackerError};
use crate::pipeline::{ObjectTracker, Thresholds, TrackerConfig, TrackingResult};
use futures::future::try_join_all;
use image::DynamicImage;
use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

pub type FrameOutput = (DynamicImage, TrackingResult);

pub struct FrameTask {
    pub frame: DynamicImage,
    pub thresholds: Thresholds,
    pub result_sender: oneshot::Sender<FrameOutput>,
}

pub struct WorkerPool {
    task_sender: mpsc::UnboundedSender<FrameTask>,
    dispatcher: JoinHandle<()>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns the dispatcher and `worker_count` workers on the current Tokio runtime.
    pub fn new(tracker: ObjectTracker, worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let tracker = Arc::new(tracker);
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<FrameTask>();

        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..worker_count)
            .map(|_| mpsc::unbounded_channel::<FrameTask>())
            .unzip();

        // Spawn dispatcher
        let dispatcher = tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                if worker_senders[worker_idx].send(task).is_err() {
                    warn!("worker {worker_idx} is gone, stopping dispatch");
                    break;
                }
                worker_idx = (worker_idx + 1) % worker_count;
            }
        });

        // Spawn workers
        let mut workers = Vec::with_capacity(worker_count);
        for (worker_id, mut worker_receiver) in worker_receivers.into_iter().enumerate() {
            let tracker = Arc::clone(&tracker);

            let worker = tokio::spawn(async move {
                while let Some(task) = worker_receiver.recv().await {
                    let FrameTask {
                        mut frame,
                        thresholds,
                        result_sender,
                    } = task;
                    let tracker = Arc::clone(&tracker);

                    let outcome = tokio::task::spawn_blocking(move || {
                        let result = tracker.track(&mut frame, &thresholds);
                        (frame, result)
                    })
                    .await;

                    match outcome {
                        Ok(output) => {
                            debug!("worker {worker_id} finished frame: {:?}", output.1.status);
                            let _ = result_sender.send(output);
                        }
                        // Dropping the sender surfaces as `WorkerDropped` to the caller.
                        Err(error) => warn!("worker {worker_id} lost a frame: {error}"),
                    }
                }
            });

            workers.push(worker);
        }

        Self {
            task_sender,
            dispatcher,
            workers,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub async fn process_frame(&self, frame: DynamicImage, thresholds: Thresholds) -> Result<FrameOutput> {
        let (result_sender, result_receiver) = oneshot::channel();

        let task = FrameTask {
            frame,
            thresholds,
            result_sender,
        };

        self.task_sender
            .send(task)
            .map_err(|_| TrackerError::WorkerUnavailable)?;

        result_receiver.await.map_err(|_| TrackerError::WorkerDropped)
    }

    /// Stops accepting tasks and waits for in-flight frames to finish.
    pub async fn shutdown(self) {
        drop(self.task_sender);
        let _ = self.dispatcher.await;
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

/// Concurrent front end for the tracker. Must be created inside a Tokio runtime.
pub struct ParallelTracker {
    config: TrackerConfig,
    worker_pool: WorkerPool,
}

impl ParallelTracker {
    /// One worker per logical CPU.
    pub fn new(config: TrackerConfig) -> Result<Self> {
        Self::with_workers(config, num_cpus::get())
    }

    pub fn with_workers(config: TrackerConfig, worker_count: usize) -> Result<Self> {
        let tracker = ObjectTracker::new(config.clone())?;
        let worker_pool = WorkerPool::new(tracker, worker_count);
        debug!("parallel tracker started with {} workers", worker_pool.worker_count());
        Ok(Self { config, worker_pool })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn worker_count(&self) -> usize {
        self.worker_pool.worker_count()
    }

    pub async fn process_frame(&self, frame: DynamicImage, thresholds: Thresholds) -> Result<FrameOutput> {
        self.worker_pool.process_frame(frame, thresholds).await
    }

    /// Tracks every frame concurrently; outputs keep the input order.
    pub async fn process_batch(&self, frames: Vec<(DynamicImage, Thresholds)>) -> Result<Vec<FrameOutput>> {
        try_join_all(
            frames
                .into_iter()
                .map(|(frame, thresholds)| self.process_frame(frame, thresholds)),
        )
        .await
    }

    pub async fn shutdown(self) {
        self.worker_pool.shutdown().await;
    }
}
