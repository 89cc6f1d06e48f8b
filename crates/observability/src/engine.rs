//! Boundary between the adapter and the structured logging engine.

use std::panic::Location;

use kvlog_core::{Severity, Value};

/// One normalized log call, as handed to an [`Engine`].
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    pub severity: Severity,
    pub message: &'a str,
    /// Alternating keys and values, already stripped of fields.
    pub kv: &'a [Value],
    /// Where the logger method was called from.
    pub caller: &'static Location<'static>,
}

/// A structured logging engine the adapter can delegate to.
///
/// Engines only write: terminating the process or unwinding after a
/// `fatal`/`panic` entry is the adapter's job. Engines are responsible for
/// flagging malformed key/value lists (odd length, non-string keys). A list
/// bound through [`Engine::with`] is paired on its own when it is bound, so
/// a malformed binding never shifts the pairing of later entries.
///
/// Engines must be safe for concurrent writes.
pub trait Engine: Send + Sync + Sized + 'static {
    fn write(&self, entry: &Entry<'_>);

    /// Returns a handle with `kv` bound to every subsequent entry, after
    /// any pairs already bound to `self`. Problems with `kv` are reported
    /// against `caller`, the site that bound it.
    fn with(&self, kv: Vec<Value>, caller: &'static Location<'static>) -> Self;
}
