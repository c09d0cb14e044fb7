use fibre_instance::{Definition, InstanceHolder};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use std::thread;

// A simple service that gets a unique ID upon creation.
struct RequestTracker {
  id: usize,
}

// A global, thread-safe counter to generate unique IDs.
static ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn main() {
  // --- Holder Setup ---
  // The creation function runs once per lifecycle, however many threads ask.
  let holder = InstanceHolder::new(
    Definition::new(|_: &()| {
      println!("Creating RequestTracker...");
      RequestTracker {
        id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
      }
    })
    .named("request_tracker")
    .on_close(|tracker| match tracker {
      Some(tracker) => println!("Releasing RequestTracker {}", tracker.id),
      None => println!("Nothing to release"),
    }),
  );

  println!("--- Resolving from 8 threads ---");
  let trackers: Vec<Arc<RequestTracker>> = thread::scope(|s| {
    let handles: Vec<_> = (0..8)
      .map(|_| s.spawn(|| holder.get(&()).expect("creation succeeds")))
      .collect();
    handles
      .into_iter()
      .map(|h| h.join().expect("worker panicked"))
      .collect()
  });
  assert!(trackers.iter().all(|t| Arc::ptr_eq(t, &trackers[0])));
  println!("All threads saw tracker {}.\n", trackers[0].id);

  println!("--- Dropping and recreating ---");
  holder.drop_instance().expect("release succeeds");
  assert!(!holder.is_created());
  let fresh = holder.get(&()).expect("creation succeeds");
  println!("Fresh tracker has ID {}.", fresh.id);
  assert_eq!(fresh.id, 1);
  assert!(!Arc::ptr_eq(&fresh, &trackers[0]));

  // Dropping twice hands the callback `None` the second time.
  holder.drop_instance().expect("release succeeds");
  holder.drop_instance().expect("release succeeds");
}
