//! What a creation function receives when the container drives a holder.

use crate::container::Container;
use crate::error::Result;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Resolution context handed to creation functions registered on a [`Container`].
///
/// Lets a factory pull its own dependencies from the same container and read
/// the parameters the caller passed to [`Container::get_with`].
#[derive(Clone)]
pub struct Context {
  container: Container,
  parameters: Parameters,
}

impl Context {
  pub(crate) fn new(container: Container, parameters: Parameters) -> Self {
    Self {
      container,
      parameters,
    }
  }

  /// Resolves an unnamed dependency.
  pub fn get<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
    self.container.get::<T>(None)
  }

  /// Resolves a named dependency.
  pub fn get_named<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
    self.container.get::<T>(Some(name))
  }

  pub fn parameters(&self) -> &Parameters {
    &self.parameters
  }

  pub fn container(&self) -> &Container {
    &self.container
  }
}

impl fmt::Debug for Context {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Context")
      .field("parameters", &self.parameters)
      .finish_non_exhaustive()
  }
}

/// Ordered, type-erased values passed through to a creation function.
///
/// ```
/// use fibre_instance::Parameters;
///
/// let params = Parameters::new().with(8080_u16).with(String::from("localhost"));
/// assert_eq!(params.get::<u16>(0), Some(&8080));
/// assert_eq!(params.find::<String>().map(String::as_str), Some("localhost"));
/// assert_eq!(params.get::<String>(0), None);
/// ```
#[derive(Clone, Default)]
pub struct Parameters {
  values: Vec<Arc<dyn Any + Send + Sync>>,
}

impl Parameters {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
    self.values.push(Arc::new(value));
    self
  }

  /// The value at `index`, if there is one and it is a `T`.
  pub fn get<T: Any>(&self, index: usize) -> Option<&T> {
    self.values.get(index)?.downcast_ref::<T>()
  }

  /// The first value of type `T`.
  pub fn find<T: Any>(&self) -> Option<&T> {
    self.values.iter().find_map(|value| value.downcast_ref::<T>())
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

impl fmt::Debug for Parameters {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Parameters")
      .field("len", &self.values.len())
      .finish()
  }
}
