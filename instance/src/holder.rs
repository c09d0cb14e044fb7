//! The lazily-created, thread-safe single-instance holder.

use crate::definition::Definition;
use crate::error::{Error, Result};
use crate::guard::{HolderId, ReentryGuard};
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const EMPTY: u8 = 0;
const CREATING: u8 = 1;
const READY: u8 = 2;

/// Where a holder is in its create/drop cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolderState {
  /// Nothing published. The next `get` or `create` builds a fresh instance.
  Empty,
  /// A thread holds the lock and is running the creation function.
  Creating,
  /// An instance is published and served lock-free.
  Ready,
}

impl HolderState {
  fn from_raw(raw: u8) -> Self {
    match raw {
      CREATING => HolderState::Creating,
      READY => HolderState::Ready,
      _ => HolderState::Empty,
    }
  }
}

/// Holds at most one instance of `V`, built on first use from a [`Definition`].
///
/// Readers take a lock-free fast path once the instance is published. Writers
/// (`create` and `drop_instance`) serialize on a lock that belongs to this
/// holder alone, so unrelated holders never wait on each other.
///
/// The context `C` is passed through to the creation function untouched.
pub struct InstanceHolder<V, C = ()> {
  id: HolderId,
  definition: Arc<Definition<V, C>>,
  value: ArcSwapOption<V>,
  state: AtomicU8,
  lock: Mutex<()>,
}

impl<V, C> InstanceHolder<V, C> {
  pub fn new(definition: Definition<V, C>) -> Self {
    Self::from_shared(Arc::new(definition))
  }

  /// A holder over a definition that is also referenced elsewhere.
  pub fn from_shared(definition: Arc<Definition<V, C>>) -> Self {
    Self {
      id: HolderId::next(),
      definition,
      value: ArcSwapOption::empty(),
      state: AtomicU8::new(EMPTY),
      lock: Mutex::new(()),
    }
  }

  pub fn id(&self) -> HolderId {
    self.id
  }

  pub fn definition(&self) -> &Definition<V, C> {
    &self.definition
  }

  /// Whether an instance is currently published. Never blocks.
  pub fn is_created(&self) -> bool {
    self.value.load().is_some()
  }

  /// Never blocks. May be stale by the time the caller looks at it.
  ///
  /// The instance is published just before the state moves to `Ready`, so
  /// `state()` can briefly report `Creating` while `is_created()` is already
  /// true.
  pub fn state(&self) -> HolderState {
    HolderState::from_raw(self.state.load(Ordering::Acquire))
  }

  /// Returns the published instance, creating it first if there is none.
  pub fn get(&self, ctx: &C) -> Result<Arc<V>> {
    if let Some(value) = self.value.load_full() {
      return Ok(value);
    }
    self.create(ctx)
  }

  /// Builds and publishes the instance unless another thread already did.
  ///
  /// The creation function runs at most once per empty-to-ready cycle. On
  /// failure nothing is published and the holder stays `Empty`; callers that
  /// were waiting on the lock then attempt creation themselves.
  ///
  /// # Errors
  ///
  /// [`Error::Creation`] when the creation function fails, and
  /// [`Error::ReentrantCreation`] when this thread is already creating or
  /// dropping this holder.
  pub fn create(&self, ctx: &C) -> Result<Arc<V>> {
    let _reentry = ReentryGuard::enter(self.id).ok_or_else(|| {
      tracing::warn!(
        definition = self.definition.name(),
        holder = %self.id,
        "reentrant creation refused"
      );
      Error::ReentrantCreation {
        definition: self.definition.name().to_owned(),
      }
    })?;
    let _lock = self.lock.lock();

    if let Some(value) = self.value.load_full() {
      tracing::trace!(
        definition = self.definition.name(),
        holder = %self.id,
        "instance was published while waiting for the lock"
      );
      return Ok(value);
    }

    let creating = CreatingState::begin(&self.state);
    let value = self.definition.build(ctx).map_err(|source| {
      tracing::warn!(
        definition = self.definition.name(),
        holder = %self.id,
        error = %source,
        "instance creation failed"
      );
      Error::Creation {
        definition: self.definition.name().to_owned(),
        source,
      }
    })?;

    let value = Arc::new(value);
    self.value.store(Some(Arc::clone(&value)));
    creating.finish();
    tracing::debug!(
      definition = self.definition.name(),
      holder = %self.id,
      "instance created"
    );
    Ok(value)
  }

  /// Tears down the instance and returns the holder to `Empty`.
  ///
  /// The release callback sees the previous instance, or `None` if nothing
  /// was created. The cache is cleared before the callback runs, so the holder
  /// ends up `Empty` whether or not the callback succeeds.
  ///
  /// # Errors
  ///
  /// [`Error::Callback`] when the release callback fails, and
  /// [`Error::ReentrantDrop`] when called from inside this holder's own
  /// creation function or release callback.
  pub fn drop_instance(&self) -> Result<()> {
    let _reentry = ReentryGuard::enter(self.id).ok_or_else(|| {
      tracing::warn!(
        definition = self.definition.name(),
        holder = %self.id,
        "reentrant drop refused"
      );
      Error::ReentrantDrop {
        definition: self.definition.name().to_owned(),
      }
    })?;
    let _lock = self.lock.lock();

    let previous = self.value.swap(None);
    self.state.store(EMPTY, Ordering::Release);
    let had_instance = previous.is_some();

    self.definition.release(previous).map_err(|source| {
      tracing::warn!(
        definition = self.definition.name(),
        holder = %self.id,
        error = %source,
        "release callback failed"
      );
      Error::Callback {
        definition: self.definition.name().to_owned(),
        source,
      }
    })?;

    tracing::debug!(
      definition = self.definition.name(),
      holder = %self.id,
      had_instance,
      "instance dropped"
    );
    Ok(())
  }
}

impl<V, C> fmt::Debug for InstanceHolder<V, C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("InstanceHolder")
      .field("id", &self.id)
      .field("definition", &self.definition.name())
      .field("state", &self.state())
      .finish()
  }
}

// Marks the holder `Creating` for as long as it lives. Falls back to `Empty`
// unless `finish` is called, which also covers a panicking creation function.
struct CreatingState<'a> {
  state: &'a AtomicU8,
  finished: bool,
}

impl<'a> CreatingState<'a> {
  fn begin(state: &'a AtomicU8) -> Self {
    state.store(CREATING, Ordering::Release);
    Self {
      state,
      finished: false,
    }
  }

  fn finish(mut self) {
    self.state.store(READY, Ordering::Release);
    self.finished = true;
  }
}

impl Drop for CreatingState<'_> {
  fn drop(&mut self) {
    if !self.finished {
      self.state.store(EMPTY, Ordering::Release);
    }
  }
}
