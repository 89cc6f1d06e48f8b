//! Adapter from the [`Logger`] contract onto an [`Engine`].
//!
//! Per call, the adapter:
//! 1. resolves the execution id from the context (context-bound calls only),
//! 2. prepends `(execution_id_key, id)` unless omission applies,
//! 3. expands fields into plain key/value pairs,
//! 4. writes the entry at the matching severity, then exits or panics for
//!    `fatal` and `panic`.

use std::panic::Location;
use std::sync::Arc;

use kvlog_core::{
    Arg, Context, ContextLogger, Logger, MISSING_EXECUTION_ID, NoContextLogger, Severity, Value,
};

use crate::config::LoggerConfig;
use crate::engine::{Engine, Entry};
use crate::fields::expand_into;

/// Exit status used by `fatal`.
pub const FATAL_EXIT_CODE: i32 = 1;

/// A [`Logger`] over engine `E`.
///
/// Cloning and decorating are cheap: the configuration is shared behind an
/// `Arc` and never changes after construction.
#[derive(Debug, Clone)]
pub struct Adapter<E> {
    engine: E,
    conf: Arc<LoggerConfig>,
}

impl<E: Engine> Adapter<E> {
    /// Wraps an already-built engine. Engine-related settings in `conf`
    /// (mode, level, output) are not consulted.
    pub fn from_engine(engine: E, conf: LoggerConfig) -> Self {
        Self {
            engine,
            conf: Arc::new(conf),
        }
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.conf
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Like [`Logger::with`], without erasing the concrete type.
    #[track_caller]
    pub fn with_fields(&self, kv: &[Arg]) -> Self {
        let mut bound = Vec::with_capacity(kv.len() * 2);
        expand_into(&mut bound, kv);
        Self {
            engine: self.engine.with(bound, Location::caller()),
            conf: Arc::clone(&self.conf),
        }
    }

    fn resolve_execution_id<'c>(&self, ctx: Option<&'c Context>) -> Option<&'c str> {
        ctx?.str_value(&self.conf.execution_id_context_key)
    }

    fn write(
        &self,
        severity: Severity,
        ctx: Option<Option<&Context>>,
        msg: &str,
        kv: &[Arg],
        caller: &'static Location<'static>,
    ) {
        let mut normalized = Vec::with_capacity(kv.len() * 2 + 2);
        if let Some(ctx) = ctx {
            let id = self.resolve_execution_id(ctx).unwrap_or(MISSING_EXECUTION_ID);
            if id != MISSING_EXECUTION_ID || !self.conf.omit_execution_id_when_missing {
                normalized.push(Value::Str(self.conf.execution_id_key.clone()));
                normalized.push(Value::from(id));
            }
        }
        expand_into(&mut normalized, kv);

        self.engine.write(&Entry {
            severity,
            message: msg,
            kv: &normalized,
            caller,
        });
    }
}

impl<E: Engine> ContextLogger for Adapter<E> {
    #[track_caller]
    fn fatal(&self, ctx: Option<&Context>, msg: &str, kv: &[Arg]) -> ! {
        self.write(Severity::Fatal, Some(ctx), msg, kv, Location::caller());
        std::process::exit(FATAL_EXIT_CODE)
    }

    #[track_caller]
    fn panic(&self, ctx: Option<&Context>, msg: &str, kv: &[Arg]) -> ! {
        self.write(Severity::Panic, Some(ctx), msg, kv, Location::caller());
        panic!("{msg}")
    }

    #[track_caller]
    fn error(&self, ctx: Option<&Context>, msg: &str, kv: &[Arg]) {
        self.write(Severity::Error, Some(ctx), msg, kv, Location::caller());
    }

    #[track_caller]
    fn warn(&self, ctx: Option<&Context>, msg: &str, kv: &[Arg]) {
        self.write(Severity::Warn, Some(ctx), msg, kv, Location::caller());
    }

    #[track_caller]
    fn info(&self, ctx: Option<&Context>, msg: &str, kv: &[Arg]) {
        self.write(Severity::Info, Some(ctx), msg, kv, Location::caller());
    }

    #[track_caller]
    fn debug(&self, ctx: Option<&Context>, msg: &str, kv: &[Arg]) {
        self.write(Severity::Debug, Some(ctx), msg, kv, Location::caller());
    }
}

impl<E: Engine> NoContextLogger for Adapter<E> {
    #[track_caller]
    fn fatal_nc(&self, msg: &str, kv: &[Arg]) -> ! {
        self.write(Severity::Fatal, None, msg, kv, Location::caller());
        std::process::exit(FATAL_EXIT_CODE)
    }

    #[track_caller]
    fn panic_nc(&self, msg: &str, kv: &[Arg]) -> ! {
        self.write(Severity::Panic, None, msg, kv, Location::caller());
        panic!("{msg}")
    }

    #[track_caller]
    fn error_nc(&self, msg: &str, kv: &[Arg]) {
        self.write(Severity::Error, None, msg, kv, Location::caller());
    }

    #[track_caller]
    fn warn_nc(&self, msg: &str, kv: &[Arg]) {
        self.write(Severity::Warn, None, msg, kv, Location::caller());
    }

    #[track_caller]
    fn info_nc(&self, msg: &str, kv: &[Arg]) {
        self.write(Severity::Info, None, msg, kv, Location::caller());
    }

    #[track_caller]
    fn debug_nc(&self, msg: &str, kv: &[Arg]) {
        self.write(Severity::Debug, None, msg, kv, Location::caller());
    }
}

impl<E: Engine> Logger for Adapter<E> {
    #[track_caller]
    fn with(&self, kv: &[Arg]) -> Box<dyn Logger> {
        Box::new(self.with_fields(kv))
    }

    fn execution_id_from(&self, ctx: Option<&Context>) -> String {
        self.resolve_execution_id(ctx)
            .unwrap_or(MISSING_EXECUTION_ID)
            .to_string()
    }
}
