// src/warmer/pool.rs
// =============================================================================
// The request pool: GET every queued URL with at most N requests in flight.
//
// How it works:
// 1. Start min(N, number of URLs) workers inside one spawned task
// 2. Each worker pulls the next URL from a shared cursor (in queue order)
// 3. It awaits the request, hands the outcome to the observer, then pulls again
// 4. A worker stops when the cursor is empty or the run is cancelled
// 5. The WarmHandle resolves once every worker has stopped
//
// A panicking observer does not take the other workers down with it: the
// first panic is held until every worker has stopped, then re-raised.
//
// Because each worker refills its own slot as soon as it finishes, the pool
// stays saturated at N outstanding requests until the queue drains.
//
// Rust concepts:
// - Arc<dyn Trait>: shared, type-erased transport and observer
// - Mutex: the cursor is the only shared mutable state (held for O(1) work)
// - Atomics: lock-free counters for the active count and the tallies
// - Implementing Future by hand: WarmHandle wraps a JoinHandle
// =============================================================================

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::observer::{Observer, RequestOutcome};
use crate::transport::Transport;

/// Schedules requests for one warming run at a time.
#[derive(Clone)]
pub struct RequestPool {
    transport: Arc<dyn Transport>,
    observer: Arc<dyn Observer>,
    concurrency: usize,
}

impl RequestPool {
    /// `concurrency` must be at least 1; the warmer validates it.
    pub fn new(
        transport: Arc<dyn Transport>,
        observer: Arc<dyn Observer>,
        concurrency: usize,
    ) -> Self {
        debug_assert!(concurrency > 0);
        Self {
            transport,
            observer,
            concurrency,
        }
    }

    /// Starts warming `urls` in the background and returns immediately.
    ///
    /// An empty list yields an already-resolved handle and needs no runtime.
    /// Otherwise this must be called from within a tokio runtime.
    pub fn spawn(&self, urls: Vec<String>, cancel: CancellationToken) -> WarmHandle {
        if urls.is_empty() {
            debug!("nothing to warm");
            return WarmHandle {
                task: None,
                cancel,
            };
        }

        let workers = self.concurrency.min(urls.len());
        let run = Run {
            transport: self.transport.clone(),
            observer: self.observer.clone(),
            total: urls.len(),
            cursor: Mutex::new(urls.into_iter()),
            active: AtomicUsize::new(0),
            fulfilled: AtomicUsize::new(0),
            rejected: AtomicUsize::new(0),
            panic: Mutex::new(None),
        };

        let token = cancel.clone();
        let task = tokio::spawn(async move { run.drive(workers, &token).await });

        WarmHandle {
            task: Some(task),
            cancel,
        }
    }
}

// State shared by the workers of one run
struct Run {
    transport: Arc<dyn Transport>,
    observer: Arc<dyn Observer>,
    total: usize,
    cursor: Mutex<std::vec::IntoIter<String>>,
    active: AtomicUsize,
    fulfilled: AtomicUsize,
    rejected: AtomicUsize,
    panic: Mutex<Option<Box<dyn Any + Send>>>,
}

impl Run {
    async fn drive(&self, workers: usize, cancel: &CancellationToken) {
        info!(urls = self.total, workers, "warming started");

        join_all((0..workers).map(|_| self.worker(cancel))).await;

        let fulfilled = self.fulfilled.load(Ordering::Relaxed);
        let rejected = self.rejected.load(Ordering::Relaxed);
        if cancel.is_cancelled() {
            info!(
                fulfilled,
                rejected,
                skipped = self.total - fulfilled - rejected,
                "warming cancelled"
            );
        } else {
            info!(fulfilled, rejected, "warming finished");
        }

        let held = self.panic.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(payload) = held {
            panic::resume_unwind(payload);
        }
    }

    async fn worker(&self, cancel: &CancellationToken) {
        while let Some(url) = self.next_url(cancel) {
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            debug!(%url, active, "request dispatched");

            let result = self.transport.get(&url).await;
            let outcome = RequestOutcome::new(url, result);

            match &outcome {
                RequestOutcome::Fulfilled { url, response } => {
                    self.fulfilled.fetch_add(1, Ordering::Relaxed);
                    debug!(%url, status = response.status.as_u16(), "request fulfilled");
                }
                RequestOutcome::Rejected { url, error } => {
                    self.rejected.fetch_add(1, Ordering::Relaxed);
                    debug!(%url, kind = ?error.kind, %error, "request rejected");
                }
            }

            // The observer runs before the slot is released, so the refill
            // below never overtakes the callback.
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| {
                outcome.deliver(self.observer.as_ref())
            }));
            self.active.fetch_sub(1, Ordering::SeqCst);

            if let Err(payload) = delivered {
                error!("observer panicked; re-raising once the run has drained");
                let mut slot = self.panic.lock().unwrap_or_else(PoisonError::into_inner);
                if slot.is_none() {
                    *slot = Some(payload);
                }
            }
        }
    }

    fn next_url(&self, cancel: &CancellationToken) -> Option<String> {
        if cancel.is_cancelled() {
            return None;
        }
        self.cursor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next()
    }
}

/// Resolves once every dispatched request has been reported.
///
/// Awaiting it never fails because of request outcomes. If an observer
/// callback panicked, the other URLs are still reported and then the first
/// panic resumes in the task awaiting the handle.
/// Dropping the handle does not stop the run.
#[must_use = "a WarmHandle does nothing unless awaited; drop it to detach the run"]
pub struct WarmHandle {
    task: Option<JoinHandle<()>>,
    cancel: CancellationToken,
}

impl WarmHandle {
    /// Stops dispatching new URLs. In-flight requests still complete and
    /// are reported, then the handle resolves.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Future for WarmHandle {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let Some(task) = self.task.as_mut() else {
            return Poll::Ready(());
        };

        match Pin::new(task).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(result) => {
                self.task = None;
                if let Err(err) = result {
                    if err.is_panic() {
                        std::panic::resume_unwind(err.into_panic());
                    }
                }
                Poll::Ready(())
            }
        }
    }
}
