//! Tracing output of an injector
//!
//! Run with JSON logging (production):
//! ```bash
//! cargo run --example logging --features logging-json
//! ```
//!
//! Run with pretty logging (development):
//! ```bash
//! cargo run --example logging --features logging-pretty
//! ```

use std::sync::Arc;
use type_injector::{Injector, TypeKey};

#[allow(dead_code)]
struct Database {
    url: String,
}

#[allow(dead_code)]
struct UserService {
    db: Arc<Database>,
}

#[allow(dead_code)]
struct RequestContext {
    request_id: String,
}

fn main() {
    // JSON with logging-json, pretty with logging-pretty, nothing otherwise
    type_injector::logging::builder().trace().injector_only().init();

    println!("=== type-injector logging demo ===\n");

    // "Creating new injector"
    let injector = Injector::new();

    // "Binding value", "Registering provider"
    injector
        .map(Database {
            url: "postgres://localhost/mydb".into(),
        })
        .provide(|db: Arc<Database>| Arc::new(UserService { db }));

    // "Invoking provider", then "Value resolved from type store" on reuse
    let _users = injector.resolve::<UserService>();
    let _users_again = injector.resolve::<UserService>();

    // "Value not found"
    assert!(injector.get(TypeKey::of::<i32>()).is_none());

    // "Setting parent injector", then delegation for Database
    let request = injector.child();
    request.map(RequestContext {
        request_id: "req-12345".into(),
    });
    let _ctx = request.resolve::<RequestContext>();
    let _db_from_parent = request.resolve::<Database>();

    // "Finishing deferred construction", "Deferred target failed to construct"
    let _later = request.construct_later::<i64>();
    let _ = request.finish_construct();

    println!("\n=== Demo Complete ===");
    println!("\nTip: Use --features logging-json for production (JSON output)");
    println!("     Use --features logging-pretty for development (colorful output)");
}
