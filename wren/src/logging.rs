// Logging for wren
//
// Thin layer over the `tracing` ecosystem. The runtime itself only emits
// events; installing a subscriber is left to the application through the
// `init*` functions below.
//
// # Usage Examples
//
// ```rust
// use wren::logging;
//
// // INFO level, human readable console output
// logging::init_default();
//
// // Or pick the fields yourself
// let config = logging::LogConfig {
//     level: tracing::Level::DEBUG,
//     json_format: false,
//     ..Default::default()
// };
// logging::init(config);
// ```
//
// Worker threads are spawned by the runtime; they capture the dispatcher
// that is current when the system starts, so a scoped subscriber set with
// `tracing::subscriber::with_default` also covers the workers.

use std::io;
use std::sync::Once;

use tracing::{Level, Subscriber};
use tracing_subscriber::{fmt, prelude::*, registry::LookupSpan, EnvFilter, Layer};

/// Configuration for the wren logging setup
///
/// # Examples
///
/// ```rust
/// use wren::logging::LogConfig;
/// use tracing::Level;
///
/// let custom_config = LogConfig {
///     level: Level::DEBUG,
///     json_format: true,
///     show_file_line: false,
///     show_thread_info: true,
///     show_time: true,
///     target_filters: Some("wren=debug,wren::scheduler=trace".to_string()),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: Level,
    /// Whether to use JSON format for logs
    pub json_format: bool,
    /// Whether to include file and line information
    pub show_file_line: bool,
    /// Whether to include thread name/id; worker threads are named after
    /// `SystemConfig::thread_name_prefix`
    pub show_thread_info: bool,
    /// Whether to include timestamps
    pub show_time: bool,
    /// Target filter expressions (format: "target=level,target2=level2,...")
    pub target_filters: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            show_file_line: true,
            show_thread_info: true,
            show_time: true,
            target_filters: None,
        }
    }
}

// Initialization guard to ensure we only initialize once
static INIT: Once = Once::new();

fn build_filter(config: &LogConfig) -> EnvFilter {
    let mut env_filter = EnvFilter::from_default_env().add_directive(config.level.into());

    if let Some(filters) = &config.target_filters {
        for filter in filters.split(',') {
            if let Ok(directive) = filter.trim().parse() {
                env_filter = env_filter.add_directive(directive);
            }
        }
    }

    env_filter
}

fn console_layer<S>(config: &LogConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    if config.json_format {
        let layer = fmt::layer()
            .json()
            .flatten_event(true)
            .with_file(config.show_file_line)
            .with_line_number(config.show_file_line)
            .with_thread_names(config.show_thread_info)
            .with_thread_ids(config.show_thread_info);
        return if config.show_time {
            layer.boxed()
        } else {
            layer.without_time().boxed()
        };
    }

    let layer = fmt::layer()
        .with_ansi(atty::is(atty::Stream::Stdout))
        .with_file(config.show_file_line)
        .with_line_number(config.show_file_line)
        .with_thread_names(config.show_thread_info)
        .with_thread_ids(config.show_thread_info);
    if config.show_time {
        layer.boxed()
    } else {
        layer.without_time().boxed()
    }
}

/// Initialize the logging system with the given configuration
///
/// Safe to call multiple times; only the first call takes effect.
pub fn init(config: LogConfig) {
    INIT.call_once(|| {
        let subscriber = tracing_subscriber::registry()
            .with(build_filter(&config))
            .with(console_layer(&config));

        set_global_subscriber(subscriber);
    });
}

// Helper function to set the global subscriber
fn set_global_subscriber<S>(subscriber: S)
where
    S: Subscriber + Send + Sync + 'static,
{
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error setting global tracing subscriber: {}", err);
    }
}

/// Opens `path` in append mode, creating it if needed.
pub fn file_writer(path: &str) -> io::Result<Box<dyn io::Write + Send + Sync + 'static>> {
    use std::fs::OpenOptions;

    let file = OpenOptions::new().create(true).append(true).open(path)?;

    Ok(Box::new(file))
}

/// Initialize logging with both console and file output
///
/// File output is always plain text with file, line and thread details.
///
/// # Errors
/// Returns an error if the log file cannot be opened or created.
pub fn init_with_file(config: LogConfig, log_file: &str) -> Result<(), io::Error> {
    // Fail early instead of silently falling back to stderr later.
    file_writer(log_file)?;

    INIT.call_once(|| {
        let log_file_path = log_file.to_string();

        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_writer(move || match file_writer(&log_file_path) {
                Ok(writer) => writer,
                Err(_) => Box::new(std::io::stderr()),
            })
            .with_file(true)
            .with_line_number(true)
            .with_thread_names(true)
            .with_thread_ids(true);

        let subscriber = tracing_subscriber::registry()
            .with(build_filter(&config))
            .with(console_layer(&config))
            .with(file_layer);

        set_global_subscriber(subscriber);
    });

    Ok(())
}

/// INFO level, human readable console output.
pub fn init_default() {
    init(LogConfig::default());
}

/// Initialize logging optimized for development environments
///
/// DEBUG everywhere, TRACE for the scheduler, colors and file/line info.
pub fn init_development() {
    let config = LogConfig {
        level: Level::DEBUG,
        json_format: false,
        show_file_line: true,
        show_thread_info: true,
        show_time: true,
        target_filters: Some("wren=debug,wren::scheduler=trace".to_string()),
    };
    init(config);
}

/// Initialize logging optimized for production environments
///
/// JSON output for log aggregators, no file/line information.
pub fn init_production() {
    let config = LogConfig {
        level: Level::INFO,
        json_format: true,
        show_file_line: false,
        show_thread_info: true,
        show_time: true,
        target_filters: None,
    };
    init(config);
}

/// Initialize logging for testing
///
/// Only warnings and errors, without thread info or timestamps, to keep
/// test output compact.
///
/// ```rust
/// #[test]
/// fn my_test() {
///     wren::logging::init_test();
///     // ...
/// }
/// ```
pub fn init_test() {
    let config = LogConfig {
        level: Level::WARN,
        json_format: false,
        show_file_line: true,
        show_thread_info: false,
        show_time: false,
        target_filters: None,
    };
    init(config);
}

/// Create a span covering work done on behalf of one actor
///
/// ```rust
/// use wren::actor_span;
///
/// let span = actor_span!("adder", 7u64);
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! actor_span {
    ($actor_name:expr, $actor_id:expr) => {
        tracing::info_span!("actor", name = $actor_name, id = $actor_id)
    };
    ($actor_name:expr, $actor_id:expr, $($fields:tt)*) => {
        tracing::info_span!("actor", name = $actor_name, id = $actor_id, $($fields)*)
    };
}

/// Create a span for the handling of one envelope
#[macro_export]
macro_rules! message_span {
    ($message_type:expr) => {
        tracing::debug_span!("message", message = $message_type)
    };
    ($message_type:expr, $($fields:tt)*) => {
        tracing::debug_span!("message", message = $message_type, $($fields)*)
    };
}

/// Log actor lifecycle events (spawned, terminated, ...)
///
/// ```rust
/// use wren::log_lifecycle;
///
/// log_lifecycle!("adder", 7u64, "terminated", reason = "normal");
/// ```
#[macro_export]
macro_rules! log_lifecycle {
    ($actor_name:expr, $actor_id:expr, $event:expr) => {
        tracing::info!(actor_name = $actor_name, actor_id = $actor_id, event = $event);
    };
    ($actor_name:expr, $actor_id:expr, $event:expr, $($fields:tt)*) => {
        tracing::info!(actor_name = $actor_name, actor_id = $actor_id, event = $event, $($fields)*);
    };
}

/// Log error events
///
/// ```rust
/// use wren::log_error;
///
/// let error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
/// log_error!(error, component = "mailbox");
/// ```
#[macro_export]
macro_rules! log_error {
    ($error:expr) => {
        tracing::error!(error = %$error);
    };
    ($error:expr, $($fields:tt)*) => {
        tracing::error!(error = %$error, $($fields)*);
    };
}

/// Log scheduling events
#[macro_export]
macro_rules! log_scheduler {
    ($scheduler:expr, $event:expr) => {
        tracing::debug!(scheduler = $scheduler, event = $event);
    };
    ($scheduler:expr, $event:expr, $($fields:tt)*) => {
        tracing::debug!(scheduler = $scheduler, event = $event, $($fields)*);
    };
}

/// Get the current tracing dispatcher
///
/// The scheduler hands this to every worker thread it spawns.
#[inline]
pub fn current_subscriber() -> tracing::Dispatch {
    tracing::dispatcher::get_default(|d| d.clone())
}

// Re-export the most commonly used tracing macros for convenience
pub use tracing::{debug, error, info, trace, warn};
