//! Core, non-public data structures for the container.

use crate::context::Context;
use crate::definition::Definition;
use crate::error::{Error, Result};
use crate::holder::InstanceHolder;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

pub(crate) type AnyInstance = Arc<dyn Any + Send + Sync>;

#[derive(Clone, PartialEq, Eq, Hash)]
pub(crate) struct InjectionKey {
  type_id: TypeId,
  type_name: &'static str,
  name: Option<String>,
}

impl InjectionKey {
  pub(crate) fn new<T: Any>(name: Option<&str>) -> Self {
    Self {
      type_id: TypeId::of::<T>(),
      type_name: std::any::type_name::<T>(),
      name: name.map(str::to_owned),
    }
  }
}

impl fmt::Debug for InjectionKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.name {
      Some(name) => write!(f, "Key({}, Name({}))", self.type_name, name),
      None => write!(f, "Key({})", self.type_name),
    }
  }
}

impl fmt::Display for InjectionKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.name {
      Some(name) => write!(f, "'{}' named '{}'", self.type_name, name),
      None => write!(f, "'{}'", self.type_name),
    }
  }
}

/// What the container stores per key. Erases the instance type.
pub(crate) trait Provider: Send + Sync {
  fn name(&self) -> &str;
  fn resolve(&self, ctx: &Context) -> Result<AnyInstance>;
  fn is_created(&self) -> bool;
  fn is_created_at_start(&self) -> bool;
  fn release(&self) -> Result<()>;
}

impl<V: Any + Send + Sync> Provider for InstanceHolder<V, Context> {
  fn name(&self) -> &str {
    self.definition().name()
  }

  fn resolve(&self, ctx: &Context) -> Result<AnyInstance> {
    let instance: AnyInstance = self.get(ctx)?;
    Ok(instance)
  }

  fn is_created(&self) -> bool {
    InstanceHolder::is_created(self)
  }

  fn is_created_at_start(&self) -> bool {
    self.definition().is_created_at_start()
  }

  fn release(&self) -> Result<()> {
    self.drop_instance()
  }
}

/// Builds a new instance on every resolution. Nothing is cached or released.
pub(crate) struct TransientProvider<V> {
  definition: Definition<V, Context>,
}

impl<V> TransientProvider<V> {
  pub(crate) fn new(definition: Definition<V, Context>) -> Self {
    Self { definition }
  }
}

impl<V: Any + Send + Sync> Provider for TransientProvider<V> {
  fn name(&self) -> &str {
    self.definition.name()
  }

  fn resolve(&self, ctx: &Context) -> Result<AnyInstance> {
    match self.definition.build(ctx) {
      Ok(value) => Ok(Arc::new(value)),
      Err(source) => Err(Error::Creation {
        definition: self.definition.name().to_owned(),
        source,
      }),
    }
  }

  fn is_created(&self) -> bool {
    false
  }

  fn is_created_at_start(&self) -> bool {
    false
  }

  fn release(&self) -> Result<()> {
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn keys_differ_by_type_and_name() {
    let mut keys = HashSet::new();
    keys.insert(InjectionKey::new::<String>(None));
    keys.insert(InjectionKey::new::<String>(Some("a")));
    keys.insert(InjectionKey::new::<u32>(Some("a")));
    keys.insert(InjectionKey::new::<String>(None));
    assert_eq!(keys.len(), 3);
  }

  #[test]
  fn key_display_names_type_and_qualifier() {
    assert_eq!(InjectionKey::new::<u32>(None).to_string(), "'u32'");
    assert_eq!(
      InjectionKey::new::<u32>(Some("port")).to_string(),
      "'u32' named 'port'"
    );
  }
}
