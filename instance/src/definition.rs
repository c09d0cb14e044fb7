//! How a managed value is built and released.

use crate::error::BoxError;
use std::fmt;
use std::sync::Arc;

pub(crate) type CreateFn<V, C> = dyn Fn(&C) -> Result<V, BoxError> + Send + Sync;
pub(crate) type CloseFn<V> = dyn Fn(Option<Arc<V>>) -> Result<(), BoxError> + Send + Sync;

/// Describes one managed value: a creation function and an optional release callback.
///
/// The creation function receives the caller's context unchanged. The release
/// callback receives the instance being torn down, or `None` when the holder
/// was dropped before anything was created.
///
/// # Examples
///
/// ```
/// use fibre_instance::{Definition, InstanceHolder};
///
/// struct Pool {
///   size: usize,
/// }
///
/// let definition = Definition::new(|size: &usize| Pool { size: *size })
///   .named("pool")
///   .on_close(|pool| {
///     if let Some(pool) = pool {
///       println!("closing pool of {}", pool.size);
///     }
///   });
///
/// let holder = InstanceHolder::new(definition);
/// assert_eq!(holder.get(&8).unwrap().size, 8);
/// holder.drop_instance().unwrap();
/// assert!(!holder.is_created());
/// ```
pub struct Definition<V, C = ()> {
  name: String,
  create: Box<CreateFn<V, C>>,
  on_close: Option<Box<CloseFn<V>>>,
  created_at_start: bool,
}

impl<V, C> Definition<V, C> {
  /// A definition with an infallible creation function.
  pub fn new(create: impl Fn(&C) -> V + Send + Sync + 'static) -> Self {
    Self::try_new(move |ctx| Ok(create(ctx)))
  }

  /// A definition whose creation function may fail.
  pub fn try_new(create: impl Fn(&C) -> Result<V, BoxError> + Send + Sync + 'static) -> Self {
    Self {
      name: std::any::type_name::<V>().to_owned(),
      create: Box::new(create),
      on_close: None,
      created_at_start: false,
    }
  }

  /// Overrides the name used in errors and logs. Defaults to the type name of `V`.
  pub fn named(mut self, name: impl Into<String>) -> Self {
    self.name = name.into();
    self
  }

  /// Sets an infallible release callback.
  pub fn on_close(mut self, callback: impl Fn(Option<Arc<V>>) + Send + Sync + 'static) -> Self {
    self.on_close = Some(Box::new(move |value| {
      callback(value);
      Ok(())
    }));
    self
  }

  /// Sets a release callback that may fail.
  pub fn try_on_close(
    mut self,
    callback: impl Fn(Option<Arc<V>>) -> Result<(), BoxError> + Send + Sync + 'static,
  ) -> Self {
    self.on_close = Some(Box::new(callback));
    self
  }

  /// Marks the definition for eager creation by `Container::create_eager_instances`.
  pub fn created_at_start(mut self, eager: bool) -> Self {
    self.created_at_start = eager;
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn is_created_at_start(&self) -> bool {
    self.created_at_start
  }

  pub fn has_close_callback(&self) -> bool {
    self.on_close.is_some()
  }

  pub(crate) fn build(&self, ctx: &C) -> Result<V, BoxError> {
    (self.create)(ctx)
  }

  /// Runs the release callback, if any. `Ok` when none is declared.
  pub(crate) fn release(&self, value: Option<Arc<V>>) -> Result<(), BoxError> {
    match &self.on_close {
      Some(callback) => callback(value),
      None => Ok(()),
    }
  }
}

impl<V, C> fmt::Debug for Definition<V, C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Definition")
      .field("name", &self.name)
      .field("on_close", &self.on_close.is_some())
      .field("created_at_start", &self.created_at_start)
      .finish()
  }
}
