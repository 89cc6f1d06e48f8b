//! `kvlog-observability` — a [`Logger`](kvlog_core::Logger) adapter over
//! `tracing`.
//!
//! ```no_run
//! use kvlog_core::{Context, ContextLogger, args, error};
//! use kvlog_observability::{new, production};
//!
//! # fn main() -> Result<(), kvlog_observability::InitializationError> {
//! let logger = new("billing", [production()])?;
//! let ctx = Context::background().with_execution_id("exec-1");
//! let failure = std::io::Error::other("disk full");
//!
//! logger.error(Some(&ctx), "invoice export failed", args!["invoice", 42, error(failure)]);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod config;
pub mod engine;
pub mod error;
pub mod fields;
pub mod format;
pub mod tracing;

pub use adapter::{Adapter, FATAL_EXIT_CODE};
pub use config::{
    LoggerConfig, LoggerOpt, Output, production, with_execution_id_context_key,
    with_execution_id_key, with_filter, with_level, with_name_key,
    with_omit_execution_id_when_missing, with_output, with_writer,
};
pub use engine::{Engine, Entry};
pub use error::{InitResult, InitializationError};
pub use fields::expand_fields;
pub use format::JsonLine;
pub use self::tracing::{EngineSettings, LEVEL_ENV, TARGET, TracingEngine};

use std::panic::Location;

use kvlog_core::Value;

/// The reference logger: the adapter over [`TracingEngine`].
pub type TracingLogger = Adapter<TracingEngine>;

/// Builds a logger named `name`, applying `opts` in order.
///
/// Without options the logger is in development mode: human-readable output
/// on stderr. The name is bound under the configured name key.
#[track_caller]
pub fn new(
    name: impl Into<String>,
    opts: impl IntoIterator<Item = LoggerOpt>,
) -> InitResult<TracingLogger> {
    let mut conf = LoggerConfig::from_opts(opts);
    let engine = TracingEngine::build(EngineSettings {
        production: conf.production,
        level: conf.level,
        filter: conf.filter.clone(),
        output: std::mem::take(&mut conf.output),
    })?;
    let engine = engine.with(
        vec![Value::Str(conf.name_key.clone()), Value::Str(name.into())],
        Location::caller(),
    );
    Ok(Adapter::from_engine(engine, conf))
}
