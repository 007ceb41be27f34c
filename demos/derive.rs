//! Struct binding with #[derive(Inject)]
//!
//! Run with:
//!   cargo run --example derive --features derive

use std::sync::Arc;
use type_injector::{DiError, Inject, Injector, interface};

#[allow(dead_code)]
struct Database {
    url: String,
}

struct Cache {
    size: usize,
}

trait Logger: Send + Sync {
    fn level(&self) -> &str;
}
interface!(Logger);

struct StdoutLogger;

impl Logger for StdoutLogger {
    fn level(&self) -> &str {
        "DEBUG"
    }
}

#[derive(Inject)]
struct UserService {
    #[inject]
    db: Arc<Database>,
    #[inject]
    cache: Arc<Cache>,
    #[inject(optional)]
    logger: Option<Arc<dyn Logger>>,
    // Untagged: Default when constructed, untouched by apply
    request_count: u64,
}

impl UserService {
    fn describe(&self) -> String {
        let logger_status = match &self.logger {
            Some(logger) => format!("logging at {}", logger.level()),
            None => "without logging".to_string(),
        };
        format!(
            "UserService on {} with cache size {} ({}, requests: {})",
            self.db.url, self.cache.size, logger_status, self.request_count
        )
    }
}

#[derive(Inject, Default)]
struct Handler {
    #[inject]
    users: Option<Arc<UserService>>,
    served: u32,
}

fn main() -> Result<(), DiError> {
    println!("=== type-injector derive demo ===\n");

    let injector = Injector::new();
    injector
        .map(Database {
            url: "postgres://localhost:5432/myapp".into(),
        })
        .map(Cache { size: 1024 });
    // Logger is not bound yet, so the optional field stays None

    println!("Constructing UserService from its fields...");
    let users = injector.construct::<UserService>()?;
    println!("  {}\n", users.describe());

    injector.map_to::<dyn Logger>(Arc::new(StdoutLogger));
    println!("Constructing again with a Logger bound...");
    println!("  {}\n", UserService::from_injector(&injector)?.describe());

    println!("Deferring a Handler until UserService is provided...");
    let handler = injector.construct_later::<Handler>();
    match injector.finish_construct() {
        Err(err) => println!("  first pass: {err}"),
        Ok(()) => println!("  first pass succeeded"),
    }

    injector.provide(|db: Arc<Database>, cache: Arc<Cache>, logger: Option<Arc<dyn Logger>>| {
        Arc::new(UserService {
            db,
            cache,
            logger,
            request_count: 1,
        })
    });
    injector.finish_construct()?;

    if let Some(handler) = handler.get() {
        let users = handler.users.as_ref().map(|u| u.describe());
        println!("  second pass: served {} via {:?}", handler.served, users);
    }

    println!("\nApplying to an existing Handler...");
    let mut existing = Handler {
        served: 41,
        ..Default::default()
    };
    injector.apply(&mut existing)?;
    println!("  bound: {}, served: {}", existing.users.is_some(), existing.served);

    println!("\n=== Demo Complete ===");
    Ok(())
}
