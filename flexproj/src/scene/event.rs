//! Batched change notification for the scene tree.
//!
//! Mutating scene operations return a [`SceneChange`] descriptor; the
//! owner of the tree feeds those into a [`ChangeBroadcaster`], which
//! forwards them to registered listeners. A [`ChangeBatch`] guard batches
//! a compound mutation into a single merged event, nests correctly, and
//! can be aborted. Notifications raised from inside a listener are merged
//! and delivered after the current delivery pass instead of recursing.

use parking_lot::Mutex;

/// Flags describing what aspects of the scene tree changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneChange {
    /// Children were added, removed, replaced or reordered, or geometry
    /// was mutated.
    pub structure: bool,
    /// Selection state of one or more objects changed.
    pub selection: bool,
    /// Visibility of one or more objects changed.
    pub visibility: bool,
}

impl SceneChange {
    /// No change.
    pub const NONE: Self = Self {
        structure: false,
        selection: false,
        visibility: false,
    };
    /// Structural change.
    pub const STRUCTURE: Self = Self {
        structure: true,
        selection: false,
        visibility: false,
    };
    /// Selection change.
    pub const SELECTION: Self = Self {
        structure: false,
        selection: true,
        visibility: false,
    };
    /// Visibility change.
    pub const VISIBILITY: Self = Self {
        structure: false,
        selection: false,
        visibility: true,
    };

    /// Union of two change descriptors.
    pub fn merge(self, other: Self) -> Self {
        Self {
            structure: self.structure || other.structure,
            selection: self.selection || other.selection,
            visibility: self.visibility || other.visibility,
        }
    }

    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// Listener callback invoked with the merged change descriptor.
pub type ChangeListener = Box<dyn FnMut(SceneChange) + Send>;

/// Handle for removing a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct BroadcasterState {
    batch_depth: usize,
    pending: SceneChange,
    aborted: bool,
    delivering: bool,
    deferred: SceneChange,
}

/// Broadcasts scene changes to listeners, with nesting batch support.
#[derive(Default)]
pub struct ChangeBroadcaster {
    // Two locks so that a listener raising a change only touches `state`.
    listeners: Mutex<Vec<(ListenerId, ChangeListener)>>,
    state: Mutex<BroadcasterState>,
    next_listener_id: std::sync::atomic::AtomicU64,
}

impl std::fmt::Debug for ChangeBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeBroadcaster").finish_non_exhaustive()
    }
}

impl ChangeBroadcaster {
    /// Creates a broadcaster with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener.
    ///
    /// Listeners must not register or remove listeners from inside the
    /// callback; raising further changes from the callback is fine and is
    /// delivered after the current pass.
    pub fn add_listener(&self, listener: impl FnMut(SceneChange) + Send + 'static) -> ListenerId {
        let id = ListenerId(
            self.next_listener_id
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed),
        );
        self.listeners.lock().push((id, Box::new(listener)));
        id
    }

    /// Removes a previously registered listener.
    pub fn remove_listener(&self, id: ListenerId) {
        self.listeners.lock().retain(|(lid, _)| *lid != id);
    }

    /// Reports a change. Delivered immediately unless a batch is open or
    /// a delivery pass is already running.
    pub fn notify(&self, change: SceneChange) {
        if change.is_empty() {
            return;
        }

        {
            let mut state = self.state.lock();
            if state.batch_depth > 0 {
                state.pending = state.pending.merge(change);
                return;
            }
            if state.delivering {
                state.deferred = state.deferred.merge(change);
                return;
            }
            state.delivering = true;
        }

        self.deliver(change);
    }

    fn deliver(&self, change: SceneChange) {
        let mut change = change;
        loop {
            {
                let mut listeners = self.listeners.lock();
                for (_, listener) in listeners.iter_mut() {
                    listener(change);
                }
            }

            let mut state = self.state.lock();
            if state.deferred.is_empty() || state.batch_depth > 0 {
                state.delivering = false;
                return;
            }
            change = std::mem::take(&mut state.deferred);
        }
    }

    /// Opens a change batch. All changes notified until the returned guard
    /// is dropped are merged into one event, delivered when the outermost
    /// batch closes. See [`ChangeBatch`].
    pub fn batch(&self) -> ChangeBatch<'_> {
        self.state.lock().batch_depth += 1;
        ChangeBatch { broadcaster: self }
    }
}

/// Scoped guard of an open change batch.
///
/// Batches nest: an inner batch closing does not deliver anything while an
/// outer batch is still open. Dropping the outermost guard delivers the
/// single merged event; [`ChangeBatch::abort`] discards everything
/// accumulated so far instead.
pub struct ChangeBatch<'a> {
    broadcaster: &'a ChangeBroadcaster,
}

impl ChangeBatch<'_> {
    /// Discards the accumulated changes and closes the batch without
    /// delivering an event.
    pub fn abort(self) {
        self.broadcaster.state.lock().aborted = true;
        // Drop runs next and observes the flag.
    }
}

impl Drop for ChangeBatch<'_> {
    fn drop(&mut self) {
        let to_deliver = {
            let mut state = self.broadcaster.state.lock();
            state.batch_depth -= 1;
            if state.aborted {
                state.pending = SceneChange::NONE;
                if state.batch_depth == 0 {
                    state.aborted = false;
                }
                return;
            }
            if state.batch_depth > 0 {
                return;
            }
            if state.delivering {
                // Batch closed from inside a listener; hand the pending
                // changes to the running delivery pass.
                let pending = std::mem::take(&mut state.pending);
                state.deferred = state.deferred.merge(pending);
                return;
            }

            let pending = std::mem::take(&mut state.pending);
            if pending.is_empty() {
                return;
            }
            state.delivering = true;
            pending
        };

        self.broadcaster.deliver(to_deliver);
    }
}
