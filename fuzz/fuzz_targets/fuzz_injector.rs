#![no_main]

//! Fuzz target for injector operations
//!
//! Drives binding, providers, parent chains and deferred construction with
//! arbitrary operation sequences and checks the invariants that must hold
//! after each step.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;
use type_injector::{Constructible, DiError, Injector, TypeKey, interface};

#[derive(Debug, Arbitrary)]
struct Config {
    port: u16,
    name: String,
}

struct Service {
    port: u16,
}

impl Constructible for Config {}
impl Constructible for Service {}

trait Named: Send + Sync {
    fn name(&self) -> &str;
}
interface!(Named);

impl Named for Config {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Arbitrary)]
enum InjectorOp {
    MapConfig(Config),
    MapNamed(Config),
    ProvideService,
    ProvideFailing,
    ResolveConfig,
    ResolveService,
    ResolveNamed,
    Invoke,
    Construct,
    ConstructLater,
    Finish,
    PushChild,
    PopChild,
}

fuzz_target!(|ops: Vec<InjectorOp>| {
    let root = Injector::new();
    let mut chain = vec![root];
    let mut deferred = Vec::new();

    for op in ops {
        let Some(injector) = chain.last().cloned() else {
            break;
        };

        match op {
            InjectorOp::MapConfig(config) => {
                let port = config.port;
                injector.map(config);
                assert_eq!(injector.resolve::<Config>().unwrap().port, port);
            }
            InjectorOp::MapNamed(config) => {
                let name = config.name.clone();
                injector.map_to::<dyn Named>(Arc::new(config));
                assert_eq!(injector.resolve::<dyn Named>().unwrap().name(), name);
            }
            InjectorOp::ProvideService => {
                injector.provide(|config: Arc<Config>| Arc::new(Service { port: config.port }));
            }
            InjectorOp::ProvideFailing => {
                injector.provide(|| -> Result<Arc<Service>, &'static str> { Err("refused") });
            }
            InjectorOp::ResolveConfig => {
                let _ = injector.resolve::<Config>();
            }
            InjectorOp::ResolveService => {
                if injector.resolve::<Service>().is_ok() {
                    assert!(injector.get(TypeKey::of::<Service>()).is_some());
                }
            }
            InjectorOp::ResolveNamed => {
                // Interface bindings never leak into concrete keys
                if injector.resolve::<Config>().is_err() {
                    let _ = injector.resolve::<dyn Named>();
                    assert!(injector.resolve::<Config>().is_err());
                }
            }
            InjectorOp::Invoke => {
                let mut called = false;
                let result = injector.invoke(|config: Arc<Config>| {
                    called = true;
                    config.port
                });
                assert_eq!(called, result.is_ok());
            }
            InjectorOp::Construct => match injector.construct::<Config>() {
                Ok(_) => unreachable!("Config has no provider or fields"),
                Err(err) => assert!(matches!(err, DiError::NotConstructible { .. })),
            },
            InjectorOp::ConstructLater => {
                deferred.push(injector.construct_later::<Service>());
            }
            InjectorOp::Finish => {
                let pending = injector.pending();
                match injector.finish_construct() {
                    Ok(()) => assert_eq!(injector.pending(), 0),
                    Err(DiError::Finalize(errors)) => {
                        assert!(errors.len() <= pending);
                        assert_eq!(injector.pending(), errors.len());
                    }
                    Err(other) => panic!("unexpected error: {other}"),
                }
            }
            InjectorOp::PushChild => {
                if chain.len() < 16 {
                    chain.push(injector.child());
                }
            }
            InjectorOp::PopChild => {
                if chain.len() > 1 {
                    chain.pop();
                }
            }
        }
    }

    for handle in deferred {
        let _ = handle.get();
    }
});
