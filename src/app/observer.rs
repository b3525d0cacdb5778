//! Subscription that keeps a derived package list in sync with its inputs.
//!
//! One tokio task per subscription owns the recomputation loop, so snapshots,
//! config changes and refresh requests are handled strictly one at a time and
//! in arrival order.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::select;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::logic::{Collation, recompute};
use crate::sources::PackageMetadata;
use crate::state::{PackageKey, SelectionSet, Snapshot, SortConfig};

/// Inputs the list worker reads on every recomputation.
pub struct ListInputs<M: ?Sized> {
    /// Snapshot stream, e.g. from [`crate::sources::PackageCatalog::subscribe`].
    pub snapshots: mpsc::UnboundedReceiver<Snapshot>,
    /// Current sort configuration; a change triggers recomputation.
    pub config: watch::Receiver<SortConfig>,
    /// Live checked-key set, copied at the start of every pass.
    pub selection: SelectionSet,
    /// Metadata lookups for filtering and sorting.
    pub metadata: Arc<M>,
    /// Locale rules for text comparison.
    pub collation: Arc<Collation>,
}

/// State shared between the worker task and its [`Subscription`] handle.
#[derive(Default)]
struct Shared {
    /// Set once by `unsubscribe`; read under `delivery` before each callback.
    cancelled: AtomicBool,
    /// Held across the cancelled-check and the callback invocation.
    delivery: Mutex<()>,
    /// Most recently delivered list.
    current: RwLock<Vec<PackageKey>>,
}

thread_local! {
    /// Address of the [`Shared`] whose callback is running on this thread, or 0.
    static DELIVERING: Cell<usize> = const { Cell::new(0) };
}

/// Marks the current thread as inside a subscription's callback until dropped.
struct DeliveryMark;

impl DeliveryMark {
    fn enter(shared: &Arc<Shared>) -> Self {
        DELIVERING.with(|d| d.set(Arc::as_ptr(shared).addr()));
        Self
    }
}

impl Drop for DeliveryMark {
    fn drop(&mut self) {
        DELIVERING.with(|d| d.set(0));
    }
}

/// Handle to a running list worker.
///
/// Dropping the handle unsubscribes.
pub struct Subscription {
    shared: Arc<Shared>,
    stop_tx: Option<oneshot::Sender<()>>,
    refresh_tx: mpsc::UnboundedSender<()>,
    handle: Option<JoinHandle<()>>,
}

/// What: Start a list worker that recomputes and delivers the derived list.
///
/// Inputs:
/// - `inputs`: Snapshot stream, config watch, selection, metadata and collation
/// - `on_update`: Display callback, invoked with every newly derived list.
///   It may drop or unsubscribe its own [`Subscription`]; it must not block
///   on another subscription's `unsubscribe` whose callback could be waiting
///   on this one.
///
/// Output:
/// - [`Subscription`] used to refresh, read the current list, or unsubscribe
///
/// Details:
/// - Recomputes on every snapshot, on every config change (once a snapshot has
///   arrived), and on [`Subscription::refresh`].
/// - The selection is copied once per pass, so toggles made while a pass runs
///   apply to the next one.
/// - If the snapshot stream closes, the worker keeps serving config changes and
///   refreshes against the last snapshot until unsubscribed.
/// - Must be called from within a tokio runtime.
pub fn subscribe<M, F>(inputs: ListInputs<M>, on_update: F) -> Subscription
where
    M: PackageMetadata + ?Sized + 'static,
    F: FnMut(&[PackageKey]) + Send + 'static,
{
    let shared = Arc::new(Shared::default());
    let (stop_tx, stop_rx) = oneshot::channel();
    let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(run_worker(
        inputs,
        Arc::clone(&shared),
        stop_rx,
        refresh_rx,
        on_update,
    ));
    tracing::debug!("list subscription started");
    Subscription {
        shared,
        stop_tx: Some(stop_tx),
        refresh_tx,
        handle: Some(handle),
    }
}

/// Event loop body of the list worker.
async fn run_worker<M, F>(
    inputs: ListInputs<M>,
    shared: Arc<Shared>,
    mut stop_rx: oneshot::Receiver<()>,
    mut refresh_rx: mpsc::UnboundedReceiver<()>,
    mut on_update: F,
) where
    M: PackageMetadata + ?Sized,
    F: FnMut(&[PackageKey]),
{
    let ListInputs {
        mut snapshots,
        mut config,
        selection,
        metadata,
        collation,
    } = inputs;
    let mut latest: Option<Snapshot> = None;
    let mut source_open = true;
    let mut config_open = true;
    loop {
        select! {
            biased;
            _ = &mut stop_rx => break,
            next = snapshots.recv(), if source_open => match next {
                Some(snap) => latest = Some(snap),
                None => {
                    tracing::debug!("snapshot source closed");
                    source_open = false;
                    continue;
                }
            },
            changed = config.changed(), if config_open => {
                if changed.is_err() {
                    config_open = false;
                    continue;
                }
            }
            Some(()) = refresh_rx.recv() => {}
        }
        let Some(snapshot) = latest.as_ref() else {
            continue;
        };
        let cfg = *config.borrow_and_update();
        let view = selection.view();
        let derived = recompute(snapshot, &view, &cfg, metadata.as_ref(), &collation);

        let _gate = shared
            .delivery
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if shared.cancelled.load(Ordering::Acquire) {
            break;
        }
        shared
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clone_from(&derived);
        let _mark = DeliveryMark::enter(&shared);
        on_update(&derived);
    }
    tracing::debug!("list worker stopped");
}

impl Subscription {
    /// Request a recomputation against the last snapshot (e.g. after a selection toggle).
    pub fn refresh(&self) {
        if !self.is_active() {
            return;
        }
        let _ = self.refresh_tx.send(());
    }

    /// Most recently delivered list (empty before the first delivery).
    pub fn current(&self) -> Vec<PackageKey> {
        self.shared
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the subscription still delivers updates.
    pub fn is_active(&self) -> bool {
        !self.shared.cancelled.load(Ordering::Acquire)
    }

    /// What: Stop delivering updates.
    ///
    /// Details:
    /// - Waits for an in-progress callback to return, then marks the
    ///   subscription cancelled, so no callback runs after this returns.
    /// - An in-flight recomputation may still finish; its result is dropped.
    /// - Safe to call from inside this subscription's own callback; the
    ///   callback in progress is the last one.
    /// - Idempotent.
    pub fn unsubscribe(&mut self) {
        let reentrant = DELIVERING.with(Cell::get) == Arc::as_ptr(&self.shared).addr();
        if reentrant {
            // The worker already holds the delivery gate for this callback.
            self.shared.cancelled.store(true, Ordering::Release);
        } else {
            let _gate = self
                .shared
                .delivery
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            self.shared.cancelled.store(true, Ordering::Release);
        }
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
            tracing::debug!("list subscription cancelled");
        }
    }

    /// Unsubscribe and wait for the worker task to exit.
    pub async fn shutdown(mut self) {
        self.unsubscribe();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            tracing::warn!(error = %e, "list worker ended abnormally");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
