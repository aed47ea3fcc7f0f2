//! Bounded mail worker pool.
//!
//! A fixed set of named threads drains a bounded queue. Submission never
//! blocks: when the queue is full the message is rejected and the caller
//! decides what to do (usually log and carry on).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::transport::{MailMessage, MailTransport};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("mail queue is full")]
    QueueFull,

    #[error("mail pool is shut down")]
    ShutDown,

    #[error("failed to start mail worker: {0}")]
    Spawn(String),
}

#[derive(Debug, Clone)]
pub struct MailPoolConfig {
    pub workers: usize,
    pub queue_capacity: usize,
    /// Worker thread name prefix.
    pub name: String,
}

impl Default for MailPoolConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            queue_capacity: 100,
            name: "mail-sender".to_string(),
        }
    }
}

impl MailPoolConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }
}

/// Pool runtime statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub delivered: u64,
    pub failed: u64,
    pub rejected: u64,
}

#[derive(Debug, Default)]
struct Counters {
    delivered: AtomicU64,
    failed: AtomicU64,
    rejected: AtomicU64,
}

pub struct MailDispatchPool {
    sender: Mutex<Option<SyncSender<MailMessage>>>,
    workers: Mutex<Vec<thread::JoinHandle<()>>>,
    counters: Arc<Counters>,
}

impl core::fmt::Debug for MailDispatchPool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MailDispatchPool")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl MailDispatchPool {
    /// Spawn `config.workers` threads (at least one) in front of `transport`.
    pub fn start(
        transport: Arc<dyn MailTransport>,
        config: MailPoolConfig,
    ) -> Result<Self, DispatchError> {
        let (tx, rx) = mpsc::sync_channel::<MailMessage>(config.queue_capacity);
        let rx = Arc::new(Mutex::new(rx));
        let counters = Arc::new(Counters::default());

        let pool = Self {
            sender: Mutex::new(Some(tx)),
            workers: Mutex::new(Vec::new()),
            counters,
        };

        for i in 0..config.workers.max(1) {
            let rx = rx.clone();
            let transport = transport.clone();
            let counters = pool.counters.clone();
            let join = thread::Builder::new()
                .name(format!("{}-{i}", config.name))
                .spawn(move || worker_loop(rx, transport, counters))
                .map_err(|e| DispatchError::Spawn(e.to_string()))?;
            pool.workers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(join);
        }

        info!(
            workers = config.workers.max(1),
            queue_capacity = config.queue_capacity,
            "mail dispatch pool started"
        );
        Ok(pool)
    }

    /// Queue a message without blocking.
    pub fn try_dispatch(&self, message: MailMessage) -> Result<(), DispatchError> {
        let guard = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = guard.as_ref() else {
            return Err(DispatchError::ShutDown);
        };

        match sender.try_send(message) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                Err(DispatchError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => Err(DispatchError::ShutDown),
        }
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
        }
    }

    /// Stop accepting messages, let workers drain the queue, and join them.
    pub fn shutdown(&self) {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if sender.is_none() {
            return;
        }
        drop(sender);

        let workers: Vec<_> = self
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for join in workers {
            let _ = join.join();
        }
        debug!("mail dispatch pool stopped");
    }
}

impl Drop for MailDispatchPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(
    rx: Arc<Mutex<Receiver<MailMessage>>>,
    transport: Arc<dyn MailTransport>,
    counters: Arc<Counters>,
) {
    loop {
        // The guard is released as soon as a message is taken.
        let next = rx.lock().unwrap_or_else(PoisonError::into_inner).recv();
        let Ok(message) = next else {
            break;
        };

        match transport.send(&message) {
            Ok(()) => {
                counters.delivered.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(to = %message.to, error = %e, "mail delivery failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::{Receiver, Sender};
    use std::time::Duration;

    use crate::mail::transport::TransportError;

    /// Signals when a send starts, then waits for permission to finish.
    struct GatedTransport {
        started: Mutex<Sender<()>>,
        gate: Mutex<Receiver<()>>,
    }

    impl MailTransport for GatedTransport {
        fn send(&self, _: &MailMessage) -> Result<(), TransportError> {
            let _ = self.started.lock().unwrap().send(());
            let _ = self.gate.lock().unwrap().recv();
            Ok(())
        }
    }

    struct FailingTransport;

    impl MailTransport for FailingTransport {
        fn send(&self, _: &MailMessage) -> Result<(), TransportError> {
            Err(TransportError("smtp down".to_string()))
        }
    }

    fn message(n: usize) -> MailMessage {
        MailMessage {
            to: format!("user{n}@x.com"),
            subject: "s".to_string(),
            body: "b".to_string(),
        }
    }

    #[test]
    fn saturated_pool_rejects() {
        let (started_tx, started_rx) = mpsc::channel();
        let (gate_tx, gate_rx) = mpsc::channel();
        let transport = Arc::new(GatedTransport {
            started: Mutex::new(started_tx),
            gate: Mutex::new(gate_rx),
        });

        let pool = MailDispatchPool::start(
            transport,
            MailPoolConfig::default().with_workers(1).with_queue_capacity(1),
        )
        .unwrap();

        pool.try_dispatch(message(1)).unwrap();
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        pool.try_dispatch(message(2)).unwrap();
        assert_eq!(pool.try_dispatch(message(3)), Err(DispatchError::QueueFull));

        gate_tx.send(()).unwrap();
        gate_tx.send(()).unwrap();
        pool.shutdown();

        assert_eq!(
            pool.stats(),
            PoolStats {
                delivered: 2,
                failed: 0,
                rejected: 1
            }
        );
    }

    #[test]
    fn transport_failures_are_counted() {
        let pool = MailDispatchPool::start(Arc::new(FailingTransport), MailPoolConfig::default()).unwrap();
        pool.try_dispatch(message(1)).unwrap();
        pool.shutdown();
        assert_eq!(pool.stats().failed, 1);
    }

    #[test]
    fn dispatch_after_shutdown_fails() {
        let pool = MailDispatchPool::start(
            Arc::new(crate::mail::LogTransport),
            MailPoolConfig::default(),
        )
        .unwrap();
        pool.shutdown();
        assert_eq!(pool.try_dispatch(message(1)), Err(DispatchError::ShutDown));
    }
}
