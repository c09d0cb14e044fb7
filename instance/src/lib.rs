//! # Fibre Instance
//!
//! Lazily-created, thread-safe single instances with explicit teardown.
//!
//! The heart of the crate is [`InstanceHolder`]: it builds its value at most
//! once per lifecycle, no matter how many threads ask for it at the same time,
//! serves the published value without locking, and can be dropped and rebuilt
//! any number of times.
//!
//! ## Core Concepts
//!
//! - **Definition**: how to build a value from a context, and optionally how to
//!   release it.
//! - **Holder**: owns the cached value of one definition. Each holder has its own
//!   lock, so unrelated holders construct in parallel.
//! - **Container**: a thin registry of holders keyed by type and optional name,
//!   with a [`Context`] that lets factories resolve their own dependencies.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_instance::{Definition, InstanceHolder};
//! use std::sync::Arc;
//!
//! struct Connection {
//!   host: String,
//! }
//!
//! let holder = InstanceHolder::new(
//!   Definition::new(|host: &String| Connection { host: host.clone() })
//!     .on_close(|conn| println!("closing {:?}", conn.map(|c| c.host.clone()))),
//! );
//!
//! let ctx = String::from("db.internal");
//! let first = holder.get(&ctx).unwrap();
//! let second = holder.get(&ctx).unwrap();
//! assert!(Arc::ptr_eq(&first, &second));
//!
//! holder.drop_instance().unwrap();
//! assert!(!holder.is_created());
//!
//! // A fresh cycle builds a new instance.
//! let third = holder.get(&ctx).unwrap();
//! assert!(!Arc::ptr_eq(&first, &third));
//! ```

mod container;
mod context;
mod core;
mod definition;
mod error;
mod guard;
mod holder;

pub use container::Container;
pub use context::{Context, Parameters};
pub use definition::Definition;
pub use error::{BoxError, Error, Result};
pub use guard::HolderId;
pub use holder::{HolderState, InstanceHolder};
