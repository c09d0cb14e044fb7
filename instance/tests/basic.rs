use fibre_instance::{Container, Definition, Error, Parameters};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// --- Test Fixtures ---

#[derive(Debug, PartialEq, Eq)]
struct SimpleService {
  id: u32,
}

// --- Basic Tests ---

#[test]
fn test_unnamed_singleton_factory() {
  // Arrange
  let container = Container::new();
  container.add_singleton(|_| SimpleService { id: 101 });

  // Act
  let r1 = container.get::<SimpleService>(None).unwrap();
  let r2 = container.get::<SimpleService>(None).unwrap();

  // Assert
  assert_eq!(r1.id, 101);
  // Ensure it's a singleton by checking pointer equality.
  assert!(Arc::ptr_eq(&r1, &r2));
}

#[test]
fn test_named_singletons_are_independent() {
  let container = Container::new();
  container.add_singleton_with_name("primary", |_| SimpleService { id: 1 });
  container.add_singleton_with_name("replica", |_| SimpleService { id: 2 });

  let primary = container.get::<SimpleService>(Some("primary")).unwrap();
  let replica = container.get::<SimpleService>(Some("replica")).unwrap();

  assert_eq!(primary.id, 1);
  assert_eq!(replica.id, 2);
  assert!(container.get::<SimpleService>(None).is_err());
}

#[test]
fn test_factories_resolve_named_dependencies() {
  struct Replicated {
    ids: (u32, u32),
  }
  let container = Container::new();
  container.add_singleton_with_name("primary", |_| SimpleService { id: 1 });
  container.add_singleton_with_name("replica", |_| SimpleService { id: 2 });
  container.add_singleton(|ctx| {
    let primary = ctx.get_named::<SimpleService>("primary").unwrap();
    let replica = ctx.get_named::<SimpleService>("replica").unwrap();
    Replicated {
      ids: (primary.id, replica.id),
    }
  });

  assert_eq!(container.get::<Replicated>(None).unwrap().ids, (1, 2));
}

#[test]
fn test_unnamed_transient_factory() {
  let container = Container::new();
  container.add_transient(|_| SimpleService { id: 303 });

  let r1 = container.get::<SimpleService>(None).unwrap();
  let r2 = container.get::<SimpleService>(None).unwrap();

  assert_eq!(r1.id, 303);
  assert_eq!(r2.id, 303);
  // Ensure it's a transient by checking the pointers are different.
  assert!(!Arc::ptr_eq(&r1, &r2));
  assert!(!container.is_created::<SimpleService>(None));
}

#[test]
fn test_missing_service_reports_its_key() {
  #[derive(Debug)]
  struct MissingService;
  let container = Container::new();

  let err = container.get::<MissingService>(Some("nowhere")).unwrap_err();
  assert!(matches!(err, Error::NotRegistered { .. }));
  assert!(err.to_string().contains("MissingService"));
  assert!(err.to_string().contains("named 'nowhere'"));
  assert!(container.drop_instance::<MissingService>(None).is_err());
  assert!(!container.is_created::<MissingService>(None));
}

#[test]
fn test_is_created_tracks_singleton_lifecycle() {
  let container = Container::new();
  container.add_singleton(|_| SimpleService { id: 7 });

  assert!(container.contains::<SimpleService>(None));
  assert!(!container.is_created::<SimpleService>(None));
  container.get::<SimpleService>(None).unwrap();
  assert!(container.is_created::<SimpleService>(None));
  container.drop_instance::<SimpleService>(None).unwrap();
  assert!(!container.is_created::<SimpleService>(None));
  // The registration survives a drop.
  assert!(container.contains::<SimpleService>(None));
}

#[test]
fn test_drop_instance_runs_release_callback_and_recreates() {
  static BUILT: AtomicUsize = AtomicUsize::new(0);
  let released: Arc<Mutex<Vec<u32>>> = Arc::default();
  let sink = Arc::clone(&released);

  let container = Container::new();
  container.declare(
    Definition::new(|_| SimpleService {
      id: BUILT.fetch_add(1, Ordering::SeqCst) as u32,
    })
    .on_close(move |service| {
      if let Some(service) = service {
        sink.lock().unwrap().push(service.id);
      }
    }),
  );

  let first = container.get::<SimpleService>(None).unwrap();
  container.drop_instance::<SimpleService>(None).unwrap();
  let second = container.get::<SimpleService>(None).unwrap();

  assert_eq!(*released.lock().unwrap(), vec![first.id]);
  assert_ne!(first.id, second.id);
  assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn test_parameters_reach_the_creating_call() {
  struct Endpoint {
    host: String,
    port: u16,
  }
  let container = Container::new();
  container.add_singleton(|ctx| Endpoint {
    host: ctx.parameters().find::<String>().cloned().unwrap_or_default(),
    port: ctx.parameters().get::<u16>(1).copied().unwrap_or(80),
  });

  let params = Parameters::new()
    .with(String::from("api.internal"))
    .with(8443_u16);
  let endpoint = container.get_with::<Endpoint>(None, params).unwrap();
  assert_eq!(endpoint.host, "api.internal");
  assert_eq!(endpoint.port, 8443);

  // Already published: later parameters are not consulted.
  let again = container
    .get_with::<Endpoint>(None, Parameters::new().with(1_u16))
    .unwrap();
  assert!(Arc::ptr_eq(&endpoint, &again));
}
