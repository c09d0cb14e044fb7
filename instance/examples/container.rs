use fibre_instance::{Container, Context, Definition};
use std::sync::Arc;

struct Settings {
  greeting: String,
}

struct Greeter {
  settings: Arc<Settings>,
}

impl Greeter {
  fn greet(&self, name: &str) -> String {
    format!("{}, {}!", self.settings.greeting, name)
  }
}

// Accepting a `&Container` lets callers hand in a controlled environment.
fn configure(container: &Container) {
  container.declare(
    Definition::new(|_: &Context| Settings {
      greeting: "Hello".to_string(),
    })
    .created_at_start(true),
  );
  container.declare(
    Definition::try_new(|ctx: &Context| {
      Ok(Greeter {
        settings: ctx.get()?,
      })
    })
    .on_close(|_| println!("Greeter released")),
  );
}

fn main() {
  let container = Container::new();
  configure(&container);

  container
    .create_eager_instances()
    .expect("eager instances build");
  println!("Settings created eagerly: {}", container.is_created::<Settings>(None));
  println!("Greeter created yet: {}", container.is_created::<Greeter>(None));

  let greeter = container.get::<Greeter>(None).expect("greeter resolves");
  println!("{}", greeter.greet("World"));
  assert_eq!(greeter.greet("World"), "Hello, World!");

  // A separate container shares nothing with the first.
  let other = Container::new();
  assert!(other.get::<Greeter>(None).is_err());

  container.close().expect("every instance releases");
  assert!(container.is_empty());
}
