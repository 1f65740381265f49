//! Shared-source registry: tracks the live virtual cursors over each root source.
//!
//! Several virtual cursors (possibly stacked on top of each other) can present
//! views of the same underlying root source. The registry keeps, per root, the set
//! of cursors that are still open, and closes the root exactly once, when the last
//! of them is released.
//!
//! # Thread Safety
//!
//! All bookkeeping happens under a single `Mutex`. Registration, removal and the
//! removal-triggered close of the root run as one critical section, so concurrent
//! releases can neither both observe the "last wrapper gone" transition nor miss a
//! registration that races with it.
//!
//! # Identity
//!
//! Roots are keyed by [`SourceId`], the address of the shared allocation. The
//! registry never holds a reference to a root: every registered cursor keeps its
//! root alive, and an entry is removed as soon as its last cursor is released, so
//! an address cannot be reused while its entry exists.

use std::sync::{
    Arc, Mutex, OnceLock,
    atomic::{AtomicU64, Ordering},
};

use ahash::{AHashMap, AHashSet};
use rowview_source::{RowSource, SourceId};

/// Unique identity of a registered wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WrapperId(u64);

impl WrapperId {
    /// Allocates a process-unique id.
    pub fn next() -> WrapperId {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        WrapperId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Outcome of removing a wrapper from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Other wrappers still track the root.
    Shared { remaining: usize },
    /// The wrapper was the last one; the root entry is gone.
    Orphaned,
    /// The root had no entry at all.
    Untracked,
}

impl Release {
    /// Returns `true` if nothing tracks the root anymore.
    pub fn is_orphaned(&self) -> bool {
        !matches!(self, Release::Shared { .. })
    }
}

/// Registry of root sources and the wrappers currently open over them.
#[derive(Default)]
pub struct SourceRegistry {
    roots: Mutex<AHashMap<SourceId, AHashSet<WrapperId>>>,
}

impl SourceRegistry {
    pub fn new() -> SourceRegistry {
        SourceRegistry::default()
    }

    /// Returns the process-wide registry.
    pub fn global() -> Arc<SourceRegistry> {
        static GLOBAL: OnceLock<Arc<SourceRegistry>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(SourceRegistry::new())))
    }

    /// Records `wrapper` as an open view over `root`.
    pub fn register(&self, root: &Arc<dyn RowSource>, wrapper: WrapperId) {
        let id = SourceId::of(root);
        let mut roots = self.roots.lock().expect("registry lock");
        let wrappers = roots.entry(id).or_insert_with(|| {
            log::debug!("tracking root source {id:?}");
            AHashSet::new()
        });
        wrappers.insert(wrapper);
    }

    /// Removes `wrapper` from the set tracked for `root`, dropping the entry when
    /// the set becomes empty. The root itself is left untouched.
    pub fn unregister(&self, root: &Arc<dyn RowSource>, wrapper: WrapperId) -> Release {
        let mut roots = self.roots.lock().expect("registry lock");
        Self::unregister_locked(&mut roots, SourceId::of(root), wrapper)
    }

    /// Removes `wrapper` and closes `root` if nothing tracks it anymore.
    ///
    /// A root without any entry is closed as well; that state means the
    /// bookkeeping was bypassed and is reported with a warning.
    pub fn release(&self, root: &Arc<dyn RowSource>, wrapper: WrapperId) -> Release {
        let id = SourceId::of(root);
        let mut roots = self.roots.lock().expect("registry lock");
        let outcome = Self::unregister_locked(&mut roots, id, wrapper);
        match outcome {
            Release::Shared { remaining } => {
                log::trace!("root source {id:?} still has {remaining} open wrapper(s)");
            }
            Release::Orphaned => {
                log::debug!("closing root source {id:?}: last wrapper {wrapper:?} released");
                root.close();
            }
            Release::Untracked => {
                log::warn!(
                    "wrapper {wrapper:?} released root source {id:?} which has no registry entry; \
                     closing it directly"
                );
                root.close();
            }
        }
        outcome
    }

    /// Number of open wrappers tracked for `root`.
    pub fn wrapper_count(&self, root: &Arc<dyn RowSource>) -> usize {
        self.roots
            .lock()
            .expect("registry lock")
            .get(&SourceId::of(root))
            .map_or(0, |wrappers| wrappers.len())
    }

    /// Number of roots with at least one open wrapper.
    pub fn tracked_roots(&self) -> usize {
        self.roots.lock().expect("registry lock").len()
    }

    fn unregister_locked(
        roots: &mut AHashMap<SourceId, AHashSet<WrapperId>>,
        id: SourceId,
        wrapper: WrapperId,
    ) -> Release {
        let Some(wrappers) = roots.get_mut(&id) else {
            return Release::Untracked;
        };
        wrappers.remove(&wrapper);
        if wrappers.is_empty() {
            roots.remove(&id);
            Release::Orphaned
        } else {
            Release::Shared {
                remaining: wrappers.len(),
            }
        }
    }
}
