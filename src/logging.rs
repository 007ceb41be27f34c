//! Subscriber setup for the injector's tracing output
//!
//! Every event the injector emits uses the `type_injector` target: value
//! binding and lookups at TRACE, provider registration, parent changes and
//! deferred construction failures at DEBUG.
//!
//! | Feature          | Effect                                      |
//! |------------------|---------------------------------------------|
//! | `logging`        | emit events (default)                       |
//! | `logging-json`   | [`init`] installs a JSON subscriber         |
//! | `logging-pretty` | [`init`] installs a human-readable one      |
//!
//! Without either subscriber feature the `init*` functions do nothing and
//! the application installs its own subscriber.
//!
//! ```rust,ignore
//! use type_injector::logging;
//!
//! logging::builder()
//!     .trace()
//!     .injector_only()
//!     .compact()
//!     .init();
//! ```

use tracing::Level;

/// Target used by every event this crate emits
pub const TARGET: &str = "type_injector";

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
    Compact,
}

/// Subscriber configuration, applied by [`LoggingBuilder::init`].
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: Level,
    format: LogFormat,
    target: Option<&'static str>,
    with_file: bool,
    with_line_number: bool,
    with_thread_ids: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            format: if cfg!(feature = "logging-json") {
                LogFormat::Json
            } else {
                LogFormat::Pretty
            },
            target: None,
            with_file: false,
            with_line_number: false,
            with_thread_ids: false,
        }
    }
}

impl LoggingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Show every lookup and binding
    pub fn trace(self) -> Self {
        self.with_level(Level::TRACE)
    }

    pub fn debug(self) -> Self {
        self.with_level(Level::DEBUG)
    }

    /// Only show events from `target`
    pub fn with_target_filter(mut self, target: &'static str) -> Self {
        self.target = Some(target);
        self
    }

    /// Only show this crate's events
    pub fn injector_only(self) -> Self {
        self.with_target_filter(TARGET)
    }

    pub fn with_file(mut self) -> Self {
        self.with_file = true;
        self
    }

    pub fn with_line_number(mut self) -> Self {
        self.with_line_number = true;
        self
    }

    pub fn with_thread_ids(mut self) -> Self {
        self.with_thread_ids = true;
        self
    }

    /// JSON output; needs `logging-json`, otherwise falls back to pretty
    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.format = LogFormat::Pretty;
        self
    }

    pub fn compact(mut self) -> Self {
        self.format = LogFormat::Compact;
        self
    }

    /// The `EnvFilter` directive this builder installs
    pub fn directive(&self) -> String {
        match self.target {
            Some(target) => format!("{target}={}", self.level),
            None => self.level.to_string(),
        }
    }

    /// Install the global subscriber.
    ///
    /// Does nothing if a global subscriber is already set.
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    pub fn init(self) {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let filter = EnvFilter::new(self.directive());
        let layer = fmt::layer()
            .with_file(self.with_file)
            .with_line_number(self.with_line_number)
            .with_thread_ids(self.with_thread_ids)
            .with_target(true);

        let registry = tracing_subscriber::registry().with(filter);
        let installed = match self.format {
            #[cfg(feature = "logging-json")]
            LogFormat::Json => registry.with(layer.json()).try_init(),
            #[cfg(not(feature = "logging-json"))]
            LogFormat::Json => registry.with(layer.pretty()).try_init(),
            LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
            LogFormat::Compact => registry.with(layer.compact()).try_init(),
        };

        if let Err(err) = installed {
            tracing::debug!(
                target: "type_injector",
                error = %err,
                format = ?self.format,
                "Global subscriber already set, keeping the existing one"
            );
        }
    }

    #[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
    pub fn init(self) {}
}

pub fn builder() -> LoggingBuilder {
    LoggingBuilder::new()
}

/// Install a DEBUG subscriber in the feature-selected format.
pub fn init() {
    builder().debug().init();
}

pub fn init_json() {
    builder().json().debug().init();
}

pub fn init_pretty() {
    builder().pretty().debug().init();
}

/// Install a DEBUG subscriber that drops events from other crates.
pub fn init_injector_only() {
    builder().injector_only().debug().init();
}
