#![allow(dead_code)]

use rand::Rng;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub const MAX_SLEEP_MS: u64 = 1000;
pub const STRESS_WORKERS: usize = 64;
pub const STRESS_ITERATIONS: usize = 256;
pub const SIGNAL_TIMEOUT: Duration = Duration::from_secs(5);

/// Routes library logs to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
}

pub fn random_sleep() {
  let millis = rand::rng().random_range(0..MAX_SLEEP_MS);
  std::thread::sleep(Duration::from_millis(millis));
}

/// Walks the `source()` chain of `err` looking for a `fibre_instance::Error` matching `pred`.
pub fn has_cause(
  err: &(dyn std::error::Error + 'static),
  pred: impl Fn(&fibre_instance::Error) -> bool,
) -> bool {
  let mut current = Some(err);
  while let Some(err) = current {
    if err.downcast_ref::<fibre_instance::Error>().is_some_and(&pred) {
      return true;
    }
    current = err.source();
  }
  false
}
