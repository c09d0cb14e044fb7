//! Same-thread reentry detection for holders.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HOLDER_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
  // Holders whose lock this thread currently holds for a create or a drop.
  static IN_FLIGHT: RefCell<HashSet<HolderId>> = RefCell::new(HashSet::new());
}

/// Process-unique identity of a holder.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HolderId(u64);

impl HolderId {
  pub(crate) fn next() -> Self {
    Self(NEXT_HOLDER_ID.fetch_add(1, Ordering::Relaxed))
  }
}

impl fmt::Debug for HolderId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "HolderId({})", self.0)
  }
}

impl fmt::Display for HolderId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// An RAII marker that a holder is being created or dropped on this thread.
///
/// `enter` must run before the holder's lock is taken: a thread that already
/// holds that lock would otherwise block on itself.
pub(crate) struct ReentryGuard {
  id: HolderId,
}

impl ReentryGuard {
  /// Returns `None` when this thread is already inside `id`.
  pub(crate) fn enter(id: HolderId) -> Option<Self> {
    let inserted = IN_FLIGHT.with(|set| set.borrow_mut().insert(id));
    inserted.then(|| Self { id })
  }
}

impl Drop for ReentryGuard {
  fn drop(&mut self) {
    IN_FLIGHT.with(|set| {
      set.borrow_mut().remove(&self.id);
    });
  }
}
