//! Error types for holders and the container.

use thiserror::Error;

/// Boxed error type accepted from creation functions and release callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type for holder and container operations.
#[derive(Debug, Error)]
pub enum Error {
  #[error("Failed to create instance of '{definition}': {source}")]
  Creation {
    definition: String,
    #[source]
    source: BoxError,
  },

  #[error("Release callback of '{definition}' failed: {source}")]
  Callback {
    definition: String,
    #[source]
    source: BoxError,
  },

  #[error("Reentrant creation of '{definition}' detected on the same thread")]
  ReentrantCreation { definition: String },

  #[error("'{definition}' was dropped from inside its own creation or release")]
  ReentrantDrop { definition: String },

  #[error("No definition registered for {key}")]
  NotRegistered { key: String },

  #[error("{} eager instance(s) failed to create", .failures.len())]
  EagerCreation { failures: Vec<Error> },

  #[error("{} instance(s) failed to release while closing the container", .failures.len())]
  Close { failures: Vec<Error> },

  #[error("The container has been closed")]
  Closed,
}

/// A specialized `Result` type for `fibre_instance` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
