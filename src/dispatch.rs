//! Fixed pool of workers, each bound to one engine and draining one bounded
//! queue.
//!
//! Admission is a random-probe heuristic: up to `N` random queues are tried
//! and the first one with a free slot wins. It is not least-loaded selection
//! and may be unfair under skewed load. When every probe fails the request is
//! refused with [`GecError::NoCapacity`] instead of blocking. Capacity is
//! enforced by the queue itself, so a caller that loses a race for the last
//! slot is refused the same way.
//!
//! A submitted request blocks until its worker answers. There is no timeout:
//! a stalled engine stalls its callers.

use crate::config::PoolConfig;
use crate::engine::{Engine, EngineFactory};
use crate::error::{GecError, Result};
use crate::GibbScores;
use rand::Rng;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Correct { text: String, units: Vec<String> },
    Score { texts: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionResult {
    pub corrected_text: String,
    pub service_time: f64,
    pub worker: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Corrected(CorrectionResult),
    Scored(Vec<GibbScores>),
}

/// A task plus the single-use slot its answer is written to.
pub struct WorkItem {
    task: Task,
    response: oneshot::Sender<Result<Outcome>>,
}

pub struct Dispatcher {
    queues: Vec<mpsc::Sender<WorkItem>>,
    workers: Vec<JoinHandle<()>>,
    capacity: usize,
}

impl Dispatcher {
    /// Starts `pool.workers` workers. Returns only after every worker has
    /// opened its engine; if any fail, the others are stopped and all
    /// failures are reported together.
    pub fn start(pool: &PoolConfig, factory: Arc<EngineFactory>) -> Result<Self> {
        if pool.workers == 0 || pool.queue_capacity == 0 {
            return Err(GecError::Config(
                "worker pool needs at least one worker and one queue slot".into(),
            ));
        }

        let (ready_tx, ready_rx) = std::sync::mpsc::channel();
        let mut queues = Vec::with_capacity(pool.workers);
        let mut workers = Vec::with_capacity(pool.workers);
        let mut failures = Vec::new();

        for id in 0..pool.workers {
            let (tx, rx) = mpsc::channel(pool.queue_capacity);
            let factory = Arc::clone(&factory);
            let ready = ready_tx.clone();

            let spawned = thread::Builder::new()
                .name(format!("gec-worker-{}", id))
                .spawn(move || {
                    // Every worker reports exactly once, even when its factory panics.
                    match panic::catch_unwind(AssertUnwindSafe(|| factory(id))) {
                        Ok(Ok(engine)) => {
                            let _ = ready.send(Ok(id));
                            drop(ready);
                            run_worker(id, engine, rx);
                        }
                        Ok(Err(e)) => {
                            let _ = ready.send(Err(format!("worker {}: {}", id, e)));
                        }
                        Err(_) => {
                            let _ = ready.send(Err(format!("worker {}: engine factory panicked", id)));
                        }
                    }
                });

            match spawned {
                Ok(handle) => {
                    queues.push(tx);
                    workers.push(handle);
                }
                Err(e) => failures.push(format!("worker {}: failed to spawn thread: {}", id, e)),
            }
        }
        drop(ready_tx);

        for _ in 0..workers.len() {
            match ready_rx.recv() {
                Ok(Ok(id)) => debug!("Worker {} ready", id),
                Ok(Err(msg)) => failures.push(msg),
                Err(_) => {
                    failures.push("a worker exited before reporting readiness".into());
                    break;
                }
            }
        }

        let dispatcher = Self {
            queues,
            workers,
            capacity: pool.queue_capacity,
        };

        if !failures.is_empty() {
            error!("Worker pool failed to start: {}", failures.join("; "));
            drop(dispatcher);
            return Err(GecError::Startup(failures));
        }

        info!(
            "Started {} worker(s), queue capacity {}",
            dispatcher.workers(),
            dispatcher.capacity
        );
        Ok(dispatcher)
    }

    pub fn workers(&self) -> usize {
        self.queues.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items waiting in queue `index` (not counting one in flight).
    pub fn depth(&self, index: usize) -> usize {
        self.queues
            .get(index)
            .map(|q| self.capacity.saturating_sub(q.capacity()))
            .unwrap_or(0)
    }

    /// Probes up to `N` random queues and returns the first with room.
    pub fn pick_queue(&self) -> Option<usize> {
        let n = self.queues.len();
        let mut rng = rand::thread_rng();
        for _ in 0..n {
            let choice = rng.gen_range(0..n);
            if self.queues[choice].capacity() > 0 {
                return Some(choice);
            }
        }
        None
    }

    fn enqueue(&self, task: Task) -> Result<oneshot::Receiver<Result<Outcome>>> {
        let index = self.pick_queue().ok_or_else(|| {
            warn!("No queue has capacity; refusing request");
            GecError::NoCapacity
        })?;

        let (response, slot) = oneshot::channel();
        match self.queues[index].try_send(WorkItem { task, response }) {
            Ok(()) => {
                debug!("Sent work item to queue {}", index);
                Ok(slot)
            }
            Err(TrySendError::Full(_)) => {
                warn!("Queue {} filled up before the request landed", index);
                Err(GecError::NoCapacity)
            }
            Err(TrySendError::Closed(_)) => Err(GecError::WorkerGone),
        }
    }

    /// Submits a task and blocks the calling thread until it is answered.
    ///
    /// Must not be called from inside an async runtime; use
    /// [`Dispatcher::submit_async`] there.
    pub fn submit(&self, task: Task) -> Result<Outcome> {
        let slot = self.enqueue(task)?;
        slot.blocking_recv().map_err(|_| GecError::WorkerGone)?
    }

    pub async fn submit_async(&self, task: Task) -> Result<Outcome> {
        let slot = self.enqueue(task)?;
        slot.await.map_err(|_| GecError::WorkerGone)?
    }

    pub fn correct(&self, text: &str, units: Vec<String>) -> Result<CorrectionResult> {
        let task = Task::Correct {
            text: text.to_string(),
            units,
        };
        match self.submit(task)? {
            Outcome::Corrected(result) => Ok(result),
            Outcome::Scored(_) => Err(GecError::Engine("worker answered with scores".into())),
        }
    }

    pub fn score(&self, texts: Vec<String>) -> Result<Vec<GibbScores>> {
        match self.submit(Task::Score { texts })? {
            Outcome::Scored(scores) => Ok(scores),
            Outcome::Corrected(_) => Err(GecError::Engine("worker answered with a correction".into())),
        }
    }

    /// Closes every queue and waits for the workers to drain them.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.queues.clear();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("A worker panicked");
            }
        }
    }
}

fn run_worker(id: usize, mut engine: Box<dyn Engine>, mut queue: mpsc::Receiver<WorkItem>) {
    info!("Worker {} serving with {} engine", id, engine.name());

    while let Some(WorkItem { task, response }) = queue.blocking_recv() {
        let outcome = match task {
            Task::Correct { text, units } => {
                let started = Instant::now();
                engine.correct(&text, &units).map(|corrected_text| {
                    debug!("Worker {} result: {:?}", id, corrected_text);
                    Outcome::Corrected(CorrectionResult {
                        corrected_text,
                        service_time: started.elapsed().as_secs_f64(),
                        worker: id,
                    })
                })
            }
            Task::Score { texts } => engine.score(&texts).map(Outcome::Scored),
        };

        if response.send(outcome).is_err() {
            debug!("Worker {}: requester went away before the answer", id);
        }
    }

    debug!("Worker {} stopped", id);
}
