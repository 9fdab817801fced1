//! Task bridge: synchronous facade over an asynchronous worker pool
//!
//! HTTP handlers never do their own work. They `submit` a named
//! operation with positional arguments, then block on `await_result`
//! with a mandatory timeout while a worker pulled from a shared queue
//! executes the operation and pushes back a `(payload, status)` pair.
//! Request-handling concurrency and work-execution concurrency scale
//! independently; the queue is the only coupling.
//!
//! Delivery contract:
//! - at-least-once execution: a caller timeout abandons the envelope
//!   but does not cancel the worker, whose side effects may still land;
//! - at-most-once result delivery: the correlation map pairs each
//!   envelope with exactly one waiter, and a result arriving for a
//!   correlation id that is no longer pending is dropped.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Unit of work: a stable operation name plus positional arguments
#[derive(Debug, Clone)]
pub struct TaskEnvelope {
    pub op: String,
    pub args: Vec<Value>,
    pub correlation_id: Uuid,
}

/// Worker output delivered back to the waiter
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub payload: Value,
    pub status: u16,
}

/// Executes one operation; implemented by the service dispatcher
#[async_trait]
pub trait TaskHandler: Send + Sync + 'static {
    async fn handle(&self, op: &str, args: &[Value]) -> TaskResult;
}

/// Bridge-level failures observed by the waiter
#[derive(Error, Debug)]
pub enum BridgeError {
    /// No result arrived before the caller's deadline; the envelope is
    /// abandoned, not retried
    #[error("timed out waiting for task result")]
    Timeout,
    /// The worker faulted (panic or broken result channel)
    #[error("worker failed: {0}")]
    Worker(String),
    /// The worker pool has shut down
    #[error("task queue closed")]
    QueueClosed,
}

/// Reply sent through the correlation map; `Err` carries a worker fault
type WorkerReply = Result<TaskResult, String>;

type PendingMap = Arc<Mutex<HashMap<Uuid, oneshot::Sender<WorkerReply>>>>;

/// Handle returned by `submit`, consumed by `await_result`
pub struct TaskHandle {
    correlation_id: Uuid,
    rx: oneshot::Receiver<WorkerReply>,
}

impl TaskHandle {
    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// The submit/await bridge
///
/// Cheap to clone: a queue sender plus the shared correlation map.
#[derive(Clone)]
pub struct TaskBridge {
    tx: mpsc::Sender<TaskEnvelope>,
    pending: PendingMap,
}

impl TaskBridge {
    /// Spawn `workers` tasks pulling from a bounded queue and return
    /// the bridge that feeds them
    pub fn start(handler: Arc<dyn TaskHandler>, workers: usize, queue_depth: usize) -> Self {
        let (tx, rx) = mpsc::channel::<TaskEnvelope>(queue_depth.max(1));
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        for worker_id in 0..workers.max(1) {
            let rx = Arc::clone(&rx);
            let pending = Arc::clone(&pending);
            let handler = Arc::clone(&handler);
            tokio::spawn(worker_loop(worker_id, rx, pending, handler));
        }

        Self { tx, pending }
    }

    /// Enqueue an operation, returning the handle its result will be
    /// delivered through
    pub async fn submit(
        &self,
        op: &str,
        args: Vec<Value>,
    ) -> Result<TaskHandle, BridgeError> {
        let correlation_id = Uuid::new_v4();
        let (reply_tx, reply_rx) = oneshot::channel();

        self.pending
            .lock()
            .expect("pending map lock poisoned")
            .insert(correlation_id, reply_tx);

        let envelope = TaskEnvelope {
            op: op.to_string(),
            args,
            correlation_id,
        };

        if self.tx.send(envelope).await.is_err() {
            // Workers are gone; nothing will ever answer
            self.forget(correlation_id);
            return Err(BridgeError::QueueClosed);
        }

        debug!(%correlation_id, op, "task submitted");
        Ok(TaskHandle {
            correlation_id,
            rx: reply_rx,
        })
    }

    /// Block until the result arrives or the timeout elapses
    ///
    /// On timeout the correlation entry is removed, so a late worker
    /// result finds no waiter and is dropped.
    pub async fn await_result(
        &self,
        handle: TaskHandle,
        timeout: Duration,
    ) -> Result<TaskResult, BridgeError> {
        match tokio::time::timeout(timeout, handle.rx).await {
            Ok(Ok(Ok(result))) => Ok(result),
            Ok(Ok(Err(fault))) => Err(BridgeError::Worker(fault)),
            Ok(Err(_closed)) => Err(BridgeError::Worker(
                "result channel closed before delivery".to_string(),
            )),
            Err(_elapsed) => {
                self.forget(handle.correlation_id);
                warn!(correlation_id = %handle.correlation_id, "task abandoned after timeout");
                Err(BridgeError::Timeout)
            }
        }
    }

    /// Number of envelopes still awaiting a result
    pub fn pending_count(&self) -> usize {
        self.pending.lock().expect("pending map lock poisoned").len()
    }

    fn forget(&self, correlation_id: Uuid) {
        self.pending
            .lock()
            .expect("pending map lock poisoned")
            .remove(&correlation_id);
    }
}

/// Worker loop: pull, execute, deliver
async fn worker_loop(
    worker_id: usize,
    rx: Arc<tokio::sync::Mutex<mpsc::Receiver<TaskEnvelope>>>,
    pending: PendingMap,
    handler: Arc<dyn TaskHandler>,
) {
    loop {
        // Hold the queue lock only for the pull itself
        let envelope = match rx.lock().await.recv().await {
            Some(envelope) => envelope,
            None => break,
        };

        let correlation_id = envelope.correlation_id;
        debug!(worker_id, %correlation_id, op = %envelope.op, "task picked up");

        // Isolate each envelope in its own task so a panic fells the
        // operation, not the worker
        let run = {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move { handler.handle(&envelope.op, &envelope.args).await })
        };

        let reply: WorkerReply = match run.await {
            Ok(result) => Ok(result),
            Err(join_err) => {
                error!(worker_id, %correlation_id, "worker task failed: {}", join_err);
                Err(format!("operation aborted: {}", join_err))
            }
        };

        deliver(&pending, correlation_id, reply);
    }
    debug!(worker_id, "worker shutting down");
}

/// Deliver a reply to its waiter, or drop it if the waiter is gone
fn deliver(pending: &PendingMap, correlation_id: Uuid, reply: WorkerReply) {
    let sender = pending
        .lock()
        .expect("pending map lock poisoned")
        .remove(&correlation_id);

    match sender {
        Some(sender) => {
            // The waiter may drop its receiver between removal and send
            if sender.send(reply).is_err() {
                debug!(%correlation_id, "waiter gone, result dropped");
            }
        }
        None => {
            // Unknown or already-delivered correlation id
            debug!(%correlation_id, "late result dropped");
        }
    }
}
