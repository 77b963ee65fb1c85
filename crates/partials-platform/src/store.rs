//! Snapshot hand-off between the control sampler and its readers.
//!
//! [`ParamStore`] holds the latest published [`ControlParams`] as an
//! immutable snapshot behind an `ArcSwap`. Publishing swaps in a whole new
//! snapshot; loading copies the current one out. A reader therefore always
//! sees all four fields from the same publish, and the audio thread never
//! waits on a lock held by the control thread.
//!
//! Clones share the same underlying store.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use partials_core::ControlParams;

/// One published parameter record and its publish sequence number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    /// The parameter record.
    pub params: ControlParams,
    /// 0 for the initial record, then 1, 2, ... per publish.
    pub sequence: u64,
}

struct StoreInner {
    current: ArcSwap<Snapshot>,
    publishes: AtomicU64,
}

/// Shared, atomically replaced control parameter record.
///
/// Intended for a single publisher (the control sampler) and any number of
/// readers.
///
/// # Example
///
/// ```rust
/// use partials_core::ControlParams;
/// use partials_platform::ParamStore;
///
/// let store = ParamStore::new(ControlParams::default());
/// let reader = store.clone();
///
/// store.publish(ControlParams::new(880.0, 0.5, 2.0, 1.5));
/// assert_eq!(reader.load().frequency, 880.0);
/// assert_eq!(reader.load_snapshot().sequence, 1);
/// ```
#[derive(Clone)]
pub struct ParamStore {
    inner: Arc<StoreInner>,
}

impl ParamStore {
    /// Create a store holding `initial` as sequence 0.
    pub fn new(initial: ControlParams) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                current: ArcSwap::from_pointee(Snapshot {
                    params: initial,
                    sequence: 0,
                }),
                publishes: AtomicU64::new(0),
            }),
        }
    }

    /// Copy of the latest published record.
    #[inline]
    pub fn load(&self) -> ControlParams {
        self.inner.current.load().params
    }

    /// Copy of the latest snapshot including its sequence number.
    #[inline]
    pub fn load_snapshot(&self) -> Snapshot {
        **self.inner.current.load()
    }

    /// Replace the record as a whole and return its sequence number.
    pub fn publish(&self, params: ControlParams) -> u64 {
        let sequence = self.inner.publishes.fetch_add(1, Ordering::AcqRel) + 1;
        self.inner
            .current
            .store(Arc::new(Snapshot { params, sequence }));
        sequence
    }

    /// Number of publishes since creation.
    pub fn publish_count(&self) -> u64 {
        self.inner.publishes.load(Ordering::Acquire)
    }
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new(ControlParams::default())
    }
}

impl std::fmt::Debug for ParamStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamStore")
            .field("current", &self.load_snapshot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_snapshot_is_sequence_zero() {
        let store = ParamStore::new(ControlParams::new(100.0, 0.1, 1.0, 1.2));
        let snap = store.load_snapshot();
        assert_eq!(snap.sequence, 0);
        assert_eq!(snap.params.frequency, 100.0);
        assert_eq!(store.publish_count(), 0);
    }

    #[test]
    fn publish_replaces_whole_record() {
        let store = ParamStore::default();
        let next = ControlParams::new(1500.0, 0.7, 3.0, 3.5);
        assert_eq!(store.publish(next), 1);
        assert_eq!(store.load(), next);
        assert_eq!(store.publish(ControlParams::default()), 2);
        assert_eq!(store.publish_count(), 2);
    }

    #[test]
    fn clones_share_state() {
        let writer = ParamStore::default();
        let reader = writer.clone();
        writer.publish(ControlParams::splat(3.0));
        assert_eq!(reader.load(), ControlParams::splat(3.0));
        assert_eq!(reader.load_snapshot().sequence, 1);
    }
}
