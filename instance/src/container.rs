//! The `Container` struct and its associated methods.

use crate::context::{Context, Parameters};
use crate::core::{InjectionKey, Provider, TransientProvider};
use crate::definition::Definition;
use crate::error::{Error, Result};
use crate::holder::InstanceHolder;
use dashmap::DashMap;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A thread-safe registry of instance holders, keyed by type and optional name.
///
/// Cloning is cheap and every clone sees the same registrations. The container
/// only maps keys to providers: creation, publication and teardown are the
/// holders' job.
///
/// [`close`](Container::close) is terminal: afterwards resolution fails with
/// [`Error::Closed`] and new registrations are ignored.
///
/// ```
/// use fibre_instance::Container;
///
/// struct Config {
///   url: String,
/// }
/// struct Database {
///   url: String,
/// }
///
/// let container = Container::new();
/// container.add_singleton(|_| Config { url: "postgres://localhost".into() });
/// container.add_singleton(|ctx| {
///   let config = ctx.get::<Config>().unwrap();
///   Database { url: config.url.clone() }
/// });
///
/// let db = container.get::<Database>(None).unwrap();
/// assert_eq!(db.url, "postgres://localhost");
/// assert!(container.is_created::<Config>(None));
/// ```
#[derive(Clone, Default)]
pub struct Container {
  providers: Arc<DashMap<InjectionKey, Arc<dyn Provider>>>,
  closed: Arc<AtomicBool>,
}

impl Container {
  /// Creates a new, empty `Container`.
  pub fn new() -> Self {
    Self::default()
  }

  // --- PRIVATE HELPERS ---

  fn register(&self, key: InjectionKey, provider: Arc<dyn Provider>) {
    let definition = provider.name().to_owned();
    if self.is_closed() {
      tracing::warn!(
        key = %key,
        definition = %definition,
        "registration on a closed container ignored"
      );
      return;
    }
    if self.providers.insert(key.clone(), provider).is_some() {
      tracing::debug!(key = %key, definition = %definition, "definition replaced");
    } else {
      tracing::debug!(key = %key, definition = %definition, "definition registered");
    }
  }

  fn declare_internal<T: Any + Send + Sync>(
    &self,
    name: Option<&str>,
    definition: Definition<T, Context>,
  ) {
    let key = InjectionKey::new::<T>(name);
    self.register(key, Arc::new(InstanceHolder::new(definition)));
  }

  fn add_transient_internal<T: Any + Send + Sync>(
    &self,
    name: Option<&str>,
    definition: Definition<T, Context>,
  ) {
    let key = InjectionKey::new::<T>(name);
    self.register(key, Arc::new(TransientProvider::new(definition)));
  }

  // Clones the provider out so no shard lock is held while factories run.
  fn provider<T: Any>(&self, name: Option<&str>) -> Result<(InjectionKey, Arc<dyn Provider>)> {
    let key = InjectionKey::new::<T>(name);
    match self.providers.get(&key) {
      Some(entry) => {
        let provider = Arc::clone(entry.value());
        Ok((key, provider))
      }
      None => Err(Error::NotRegistered {
        key: key.to_string(),
      }),
    }
  }

  fn context(&self, parameters: Parameters) -> Context {
    Context::new(self.clone(), parameters)
  }

  // --- PUBLIC API ---

  // --- Singleton Registration ---
  pub fn add_singleton<T: Any + Send + Sync>(
    &self,
    factory: impl Fn(&Context) -> T + Send + Sync + 'static,
  ) {
    self.declare_internal(None, Definition::new(factory));
  }
  pub fn add_singleton_with_name<T: Any + Send + Sync>(
    &self,
    name: &str,
    factory: impl Fn(&Context) -> T + Send + Sync + 'static,
  ) {
    self.declare_internal(Some(name), Definition::new(factory));
  }

  /// Registers a singleton from a full [`Definition`], with release callback
  /// and eager flag.
  pub fn declare<T: Any + Send + Sync>(&self, definition: Definition<T, Context>) {
    self.declare_internal(None, definition);
  }
  pub fn declare_with_name<T: Any + Send + Sync>(
    &self,
    name: &str,
    definition: Definition<T, Context>,
  ) {
    self.declare_internal(Some(name), definition);
  }

  // --- Transient Registration ---
  pub fn add_transient<T: Any + Send + Sync>(
    &self,
    factory: impl Fn(&Context) -> T + Send + Sync + 'static,
  ) {
    self.add_transient_internal(None, Definition::new(factory));
  }
  pub fn add_transient_with_name<T: Any + Send + Sync>(
    &self,
    name: &str,
    factory: impl Fn(&Context) -> T + Send + Sync + 'static,
  ) {
    self.add_transient_internal(Some(name), Definition::new(factory));
  }

  // --- Resolution ---

  /// Resolves a service from the container.
  pub fn get<T: Any + Send + Sync>(&self, name: Option<&str>) -> Result<Arc<T>> {
    self.get_with(name, Parameters::default())
  }

  /// Resolves a service, handing `parameters` to its creation function.
  ///
  /// Parameters only matter when this call is the one that creates the
  /// instance; a published singleton is returned as is.
  pub fn get_with<T: Any + Send + Sync>(
    &self,
    name: Option<&str>,
    parameters: Parameters,
  ) -> Result<Arc<T>> {
    if self.is_closed() {
      return Err(Error::Closed);
    }
    let (key, provider) = self.provider::<T>(name)?;
    let instance = provider.resolve(&self.context(parameters))?;

    // `close` raises the flag before it sweeps, so an instance built after the
    // sweep reached this provider is caught here.
    if self.is_closed() {
      if provider.is_created() {
        if let Err(err) = provider.release() {
          tracing::warn!(
            key = %key,
            error = %err,
            "failed to release instance built during close"
          );
        }
      }
      return Err(Error::Closed);
    }

    instance.downcast::<T>().map_err(|_| Error::NotRegistered {
      key: key.to_string(),
    })
  }

  pub fn contains<T: Any>(&self, name: Option<&str>) -> bool {
    self.providers.contains_key(&InjectionKey::new::<T>(name))
  }

  /// Whether the singleton for this key currently holds an instance.
  /// `false` for transients and unknown keys.
  pub fn is_created<T: Any>(&self, name: Option<&str>) -> bool {
    self
      .provider::<T>(name)
      .map(|(_, provider)| provider.is_created())
      .unwrap_or(false)
  }

  pub fn len(&self) -> usize {
    self.providers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.providers.is_empty()
  }

  pub fn is_closed(&self) -> bool {
    self.closed.load(Ordering::SeqCst)
  }

  // --- Lifecycle ---

  /// Drops the instance held for this key, running its release callback.
  /// The registration stays; the next `get` builds a fresh instance.
  pub fn drop_instance<T: Any>(&self, name: Option<&str>) -> Result<()> {
    let (_, provider) = self.provider::<T>(name)?;
    provider.release()
  }

  /// Creates every singleton declared with `created_at_start(true)`.
  ///
  /// A failing definition does not stop the pass; every failure is returned
  /// together in [`Error::EagerCreation`].
  pub fn create_eager_instances(&self) -> Result<()> {
    let eager: Vec<Arc<dyn Provider>> = self
      .providers
      .iter()
      .filter(|entry| entry.value().is_created_at_start())
      .map(|entry| Arc::clone(entry.value()))
      .collect();

    tracing::debug!(count = eager.len(), "creating eager instances");
    let ctx = self.context(Parameters::default());
    let failures: Vec<Error> = eager
      .into_iter()
      .filter_map(|provider| provider.resolve(&ctx).err())
      .collect();

    if failures.is_empty() {
      Ok(())
    } else {
      tracing::warn!(failed = failures.len(), "eager instance creation failed");
      Err(Error::EagerCreation { failures })
    }
  }

  /// Drops every instance and removes every registration.
  ///
  /// All holders are released even when some release callbacks fail; the
  /// failures are returned together. Resolutions still in flight when the
  /// container closes release what they built and return [`Error::Closed`].
  pub fn close(&self) -> Result<()> {
    self.closed.store(true, Ordering::SeqCst);
    let keys: Vec<InjectionKey> = self.providers.iter().map(|entry| entry.key().clone()).collect();

    let mut released = 0;
    let mut failures = Vec::new();
    for key in keys {
      let Some((key, provider)) = self.providers.remove(&key) else {
        continue;
      };
      released += 1;
      if let Err(err) = provider.release() {
        tracing::warn!(key = %key, error = %err, "failed to release instance on close");
        failures.push(err);
      }
    }

    tracing::debug!(released, failed = failures.len(), "container closed");
    if failures.is_empty() {
      Ok(())
    } else {
      Err(Error::Close { failures })
    }
  }
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Container")
      .field("registrations", &self.providers.len())
      .field("closed", &self.is_closed())
      .finish()
  }
}
