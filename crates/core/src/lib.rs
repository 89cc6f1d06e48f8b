//! `kvlog-core` — the structured logging contract.
//!
//! This crate defines **what** a logger offers (leveled, context-aware
//! logging over key/value lists) without tying callers to any backend.
//! Adapters such as `kvlog-observability` implement [`Logger`] atop a
//! concrete logging engine.

pub mod context;
pub mod field;
pub mod logger;
pub mod severity;
pub mod value;

pub use context::{Context, ContextKey, EXECUTION_ID_KEY, MISSING_EXECUTION_ID, new_execution_id};
pub use field::{Arg, Field, error};
pub use logger::{ContextLogger, Logger, NoContextLogger};
pub use severity::{ParseSeverityError, Severity};
pub use value::{SharedError, Value};
