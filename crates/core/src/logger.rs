//! The logger contract.
//!
//! The contract is split into two capability sets, [`ContextLogger`] and
//! [`NoContextLogger`], composed into [`Logger`] together with decoration
//! ([`Logger::with`]) and execution id lookup ([`Logger::execution_id_from`]).
//!
//! ## Severities
//!
//! - `fatal` logs, then terminates the process. It never returns.
//! - `panic` logs, then panics. The unwind can be caught by the caller
//!   (`std::panic::catch_unwind`), unlike `fatal`.
//! - `error`, `warn`, `info` and `debug` only log.
//!
//! Do not use `fatal` or `panic` for ordinary error reporting.
//!
//! ## Key/value lists
//!
//! Every method takes a `&[Arg]` that alternates keys and values, holds
//! [`Field`](crate::Field)s, or mixes both. Build one with [`args!`](crate::args).
//!
//! ## Thread safety
//!
//! Loggers are immutable from the caller's side and must be `Send + Sync`:
//! decoration returns a new logger instead of mutating the receiver.
//!
//! ## Call sites
//!
//! All logging methods are `#[track_caller]`, so implementations can report
//! the location of the code that called the logger rather than their own.

use std::sync::Arc;

use crate::context::Context;
use crate::field::Arg;

/// Logging bound to an execution context.
///
/// A `None` context is legal and behaves like a context without an
/// execution id.
pub trait ContextLogger: Send + Sync {
    #[track_caller]
    fn fatal(&self, ctx: Option<&Context>, msg: &str, kv: &[Arg]) -> !;
    #[track_caller]
    fn panic(&self, ctx: Option<&Context>, msg: &str, kv: &[Arg]) -> !;
    #[track_caller]
    fn error(&self, ctx: Option<&Context>, msg: &str, kv: &[Arg]);
    #[track_caller]
    fn warn(&self, ctx: Option<&Context>, msg: &str, kv: &[Arg]);
    #[track_caller]
    fn info(&self, ctx: Option<&Context>, msg: &str, kv: &[Arg]);
    #[track_caller]
    fn debug(&self, ctx: Option<&Context>, msg: &str, kv: &[Arg]);
}

/// Logging without an execution context. These calls are never enriched
/// with an execution id.
pub trait NoContextLogger: Send + Sync {
    #[track_caller]
    fn fatal_nc(&self, msg: &str, kv: &[Arg]) -> !;
    #[track_caller]
    fn panic_nc(&self, msg: &str, kv: &[Arg]) -> !;
    #[track_caller]
    fn error_nc(&self, msg: &str, kv: &[Arg]);
    #[track_caller]
    fn warn_nc(&self, msg: &str, kv: &[Arg]);
    #[track_caller]
    fn info_nc(&self, msg: &str, kv: &[Arg]);
    #[track_caller]
    fn debug_nc(&self, msg: &str, kv: &[Arg]);
}

/// The full logger capability.
pub trait Logger: ContextLogger + NoContextLogger {
    /// Returns a new logger with `kv` bound to every subsequent call.
    ///
    /// The receiver is left untouched; the returned logger shares its
    /// configuration and engine. Malformed pairs in `kv` are reported once,
    /// here, and dropped from the binding.
    #[track_caller]
    fn with(&self, kv: &[Arg]) -> Box<dyn Logger>;

    /// The execution id this logger would attach for `ctx`, or
    /// [`MISSING_EXECUTION_ID`](crate::MISSING_EXECUTION_ID).
    fn execution_id_from(&self, ctx: Option<&Context>) -> String;
}

macro_rules! forward_logger {
    ($($wrapper:ident),+) => {
        $(
            impl<L: ContextLogger + ?Sized> ContextLogger for $wrapper<L> {
                #[track_caller]
                fn fatal(&self, ctx: Option<&Context>, msg: &str, kv: &[Arg]) -> ! {
                    (**self).fatal(ctx, msg, kv)
                }

                #[track_caller]
                fn panic(&self, ctx: Option<&Context>, msg: &str, kv: &[Arg]) -> ! {
                    (**self).panic(ctx, msg, kv)
                }

                #[track_caller]
                fn error(&self, ctx: Option<&Context>, msg: &str, kv: &[Arg]) {
                    (**self).error(ctx, msg, kv)
                }

                #[track_caller]
                fn warn(&self, ctx: Option<&Context>, msg: &str, kv: &[Arg]) {
                    (**self).warn(ctx, msg, kv)
                }

                #[track_caller]
                fn info(&self, ctx: Option<&Context>, msg: &str, kv: &[Arg]) {
                    (**self).info(ctx, msg, kv)
                }

                #[track_caller]
                fn debug(&self, ctx: Option<&Context>, msg: &str, kv: &[Arg]) {
                    (**self).debug(ctx, msg, kv)
                }
            }

            impl<L: NoContextLogger + ?Sized> NoContextLogger for $wrapper<L> {
                #[track_caller]
                fn fatal_nc(&self, msg: &str, kv: &[Arg]) -> ! {
                    (**self).fatal_nc(msg, kv)
                }

                #[track_caller]
                fn panic_nc(&self, msg: &str, kv: &[Arg]) -> ! {
                    (**self).panic_nc(msg, kv)
                }

                #[track_caller]
                fn error_nc(&self, msg: &str, kv: &[Arg]) {
                    (**self).error_nc(msg, kv)
                }

                #[track_caller]
                fn warn_nc(&self, msg: &str, kv: &[Arg]) {
                    (**self).warn_nc(msg, kv)
                }

                #[track_caller]
                fn info_nc(&self, msg: &str, kv: &[Arg]) {
                    (**self).info_nc(msg, kv)
                }

                #[track_caller]
                fn debug_nc(&self, msg: &str, kv: &[Arg]) {
                    (**self).debug_nc(msg, kv)
                }
            }

            impl<L: Logger + ?Sized> Logger for $wrapper<L> {
                #[track_caller]
                fn with(&self, kv: &[Arg]) -> Box<dyn Logger> {
                    (**self).with(kv)
                }

                fn execution_id_from(&self, ctx: Option<&Context>) -> String {
                    (**self).execution_id_from(ctx)
                }
            }
        )+
    };
}

forward_logger!(Arc, Box);
