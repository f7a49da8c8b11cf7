//! Job dispatchers: where generation jobs run.
//!
//! The controller only talks to the [`JobDispatcher`] trait. [`WorkerPool`]
//! runs jobs on background threads; [`InlineDispatcher`] runs them
//! synchronously on dispatch, which keeps tests deterministic.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};

use crate::job::{GenerationJob, JobId, JobResult};

/// Accepts generation jobs and hands back their results.
pub trait JobDispatcher {
    /// Queue `job` for execution. Never blocks on the job itself.
    fn dispatch(&mut self, job: GenerationJob) -> JobId;

    /// Take every result completed since the last drain, in completion order.
    fn drain(&mut self) -> Vec<JobResult>;

    /// Jobs dispatched whose results have not been drained yet.
    fn in_flight(&self) -> usize;
}

/// Background thread pool for generation jobs.
///
/// Jobs go out over an unbounded channel, so dispatching never blocks;
/// results come back over a second channel and are collected by
/// [`drain`](JobDispatcher::drain) on the control thread.
pub struct WorkerPool {
    job_sender: Option<Sender<(JobId, GenerationJob)>>,
    result_receiver: Receiver<JobResult>,
    worker_handles: Vec<JoinHandle<()>>,
    in_flight: Arc<AtomicUsize>,
    next_id: u64,
}

impl WorkerPool {
    /// Spawn `worker_count` named worker threads (at least one).
    pub fn new(worker_count: usize) -> std::io::Result<Self> {
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<(JobId, GenerationJob)>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<JobResult>();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let worker_count = worker_count.max(1);
        let mut handles = Vec::with_capacity(worker_count);
        for i in 0..worker_count {
            let rx = job_rx.clone();
            let tx = result_tx.clone();

            let handle = std::thread::Builder::new()
                .name(format!("terrain-gen-{i}"))
                .spawn(move || {
                    while let Ok((id, job)) = rx.recv() {
                        let start = std::time::Instant::now();
                        let result = job.run(id);
                        tracing::trace!(
                            job = job.kind(),
                            coord = %result.coord,
                            elapsed_us = start.elapsed().as_micros() as u64,
                            "generation job finished"
                        );
                        // The pool may already be shut down; nobody is listening then.
                        let _ = tx.send(result);
                    }
                })?;
            handles.push(handle);
        }

        tracing::debug!(workers = worker_count, "terrain worker pool started");

        Ok(Self {
            job_sender: Some(job_tx),
            result_receiver: result_rx,
            worker_handles: handles,
            in_flight,
            next_id: 0,
        })
    }

    /// Create a pool sized to the machine, leaving one core for the control thread.
    pub fn with_defaults() -> std::io::Result<Self> {
        let cpus = num_cpus::get().max(2);
        Self::new(cpus - 1)
    }

    pub fn worker_count(&self) -> usize {
        self.worker_handles.len()
    }

    /// Shut down all worker threads, finishing queued jobs first.
    ///
    /// Drops the job sender to close the channel, then joins all threads.
    pub fn shutdown(&mut self) {
        self.job_sender.take();
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl JobDispatcher for WorkerPool {
    fn dispatch(&mut self, job: GenerationJob) -> JobId {
        let id = JobId(self.next_id);
        self.next_id += 1;

        let Some(sender) = &self.job_sender else {
            tracing::warn!(job = job.kind(), coord = %job.coord(), "worker pool is shut down, job dropped");
            return id;
        };
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        if let Err(err) = sender.send((id, job)) {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            let (_, job) = err.into_inner();
            tracing::warn!(job = job.kind(), coord = %job.coord(), "failed to queue generation job");
        }
        id
    }

    fn drain(&mut self) -> Vec<JobResult> {
        let results: Vec<JobResult> = self.result_receiver.try_iter().collect();
        self.in_flight.fetch_sub(results.len(), Ordering::Relaxed);
        results
    }

    fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Runs each job immediately on the dispatching thread and queues the result
/// for the next drain.
#[derive(Default)]
pub struct InlineDispatcher {
    results: VecDeque<JobResult>,
    next_id: u64,
}

impl InlineDispatcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobDispatcher for InlineDispatcher {
    fn dispatch(&mut self, job: GenerationJob) -> JobId {
        let id = JobId(self.next_id);
        self.next_id += 1;
        self.results.push_back(job.run(id));
        id
    }

    fn drain(&mut self) -> Vec<JobResult> {
        self.results.drain(..).collect()
    }

    fn in_flight(&self) -> usize {
        self.results.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use ridge_terrain::{ErosionSettings, HeightMapSettings};
    use std::time::{Duration, Instant};

    use crate::coord::ChunkCoord;
    use crate::job::JobOutput;

    fn height_job(x: i32) -> GenerationJob {
        GenerationJob::Height {
            coord: ChunkCoord::new(x, 0),
            num_verts_per_line: 29,
            settings: Arc::new(HeightMapSettings::default()),
            erosion: Arc::new(ErosionSettings {
                num_iterations: 200,
                ..Default::default()
            }),
            sample_center: Vec2::new(x as f32 * 26.0, 0.0),
        }
    }

    fn drain_until(pool: &mut WorkerPool, count: usize) -> Vec<JobResult> {
        let start = Instant::now();
        let mut results = Vec::new();
        while results.len() < count {
            results.extend(pool.drain());
            assert!(
                start.elapsed().as_secs() < 10,
                "timed out waiting for job results"
            );
            std::thread::sleep(Duration::from_millis(1));
        }
        results
    }

    /// Every dispatched job comes back exactly once with its own id.
    #[test]
    fn test_worker_pool_delivers_all_results() {
        let mut pool = WorkerPool::new(3).unwrap();
        let ids: Vec<JobId> = (0..6).map(|x| pool.dispatch(height_job(x))).collect();

        let mut results = drain_until(&mut pool, ids.len());
        results.sort_by_key(|r| r.id);
        assert_eq!(results.iter().map(|r| r.id).collect::<Vec<_>>(), ids);
        for result in &results {
            assert_eq!(result.coord, ChunkCoord::new(result.id.0 as i32, 0));
            assert!(matches!(result.output, JobOutput::Height(Ok(_))));
        }
        assert_eq!(pool.in_flight(), 0);
    }

    /// Pool output matches running the same job inline.
    #[test]
    fn test_worker_pool_matches_inline() {
        let mut pool = WorkerPool::new(2).unwrap();
        let mut inline = InlineDispatcher::new();
        pool.dispatch(height_job(3));
        inline.dispatch(height_job(3));

        let pooled = drain_until(&mut pool, 1).remove(0);
        let direct = inline.drain().remove(0);
        match (pooled.output, direct.output) {
            (JobOutput::Height(Ok(a)), JobOutput::Height(Ok(b))) => assert_eq!(a, b),
            other => panic!("unexpected outputs {other:?}"),
        }
    }

    #[test]
    fn test_shutdown_drops_new_jobs() {
        let mut pool = WorkerPool::new(1).unwrap();
        pool.shutdown();
        assert_eq!(pool.worker_count(), 0);
        let id = pool.dispatch(height_job(0));
        assert_eq!(id, JobId(0));
        assert_eq!(pool.in_flight(), 0);
        assert!(pool.drain().is_empty());
    }

    #[test]
    fn test_inline_dispatcher_queues_until_drained() {
        let mut inline = InlineDispatcher::new();
        let a = inline.dispatch(height_job(0));
        let b = inline.dispatch(height_job(1));
        assert_ne!(a, b);
        assert_eq!(inline.in_flight(), 2);
        let results = inline.drain();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, a);
        assert_eq!(inline.in_flight(), 0);
    }
}
