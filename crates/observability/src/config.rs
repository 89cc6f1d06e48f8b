//! Logger configuration and its functional options.
//!
//! Options are applied left to right over [`LoggerConfig::default`]; a later
//! option wins over an earlier one touching the same setting.

use std::path::PathBuf;

use kvlog_core::{ContextKey, EXECUTION_ID_KEY, Severity};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriter};

/// Where the engine writes encoded entries.
#[derive(Default)]
pub enum Output {
    #[default]
    Stderr,
    Stdout,
    /// Appends to the file, creating it if needed.
    File(PathBuf),
    Writer(BoxMakeWriter),
}

impl core::fmt::Debug for Output {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Output::Stderr => f.write_str("Stderr"),
            Output::Stdout => f.write_str("Stdout"),
            Output::File(path) => f.debug_tuple("File").field(path).finish(),
            Output::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

/// Resolved logger configuration.
///
/// Shared read-only by a logger and every logger decorated from it.
#[derive(Debug)]
pub struct LoggerConfig {
    pub(crate) production: bool,
    pub(crate) name_key: String,
    pub(crate) execution_id_key: String,
    pub(crate) execution_id_context_key: ContextKey,
    pub(crate) omit_execution_id_when_missing: bool,
    pub(crate) level: Option<Severity>,
    pub(crate) filter: Option<String>,
    /// Handed over to the engine at construction.
    pub(crate) output: Output,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            production: false,
            name_key: "service".to_string(),
            execution_id_key: EXECUTION_ID_KEY.as_str().to_string(),
            execution_id_context_key: EXECUTION_ID_KEY,
            omit_execution_id_when_missing: false,
            level: None,
            filter: None,
            output: Output::default(),
        }
    }
}

impl LoggerConfig {
    pub fn production(&self) -> bool {
        self.production
    }

    pub fn name_key(&self) -> &str {
        &self.name_key
    }

    pub fn execution_id_key(&self) -> &str {
        &self.execution_id_key
    }

    pub fn execution_id_context_key(&self) -> &ContextKey {
        &self.execution_id_context_key
    }

    pub fn omit_execution_id_when_missing(&self) -> bool {
        self.omit_execution_id_when_missing
    }

    pub fn level(&self) -> Option<Severity> {
        self.level
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Applies `opts` in order over the default configuration.
    pub fn from_opts(opts: impl IntoIterator<Item = LoggerOpt>) -> Self {
        opts.into_iter()
            .fold(LoggerConfig::default(), |conf, opt| opt(conf))
    }
}

/// A single configuration step.
pub type LoggerOpt = Box<dyn FnOnce(LoggerConfig) -> LoggerConfig + Send>;

/// JSON encoding with ISO 8601 timestamps; default level info.
pub fn production() -> LoggerOpt {
    Box::new(|mut conf| {
        conf.production = true;
        conf
    })
}

/// Key under which the logger's name is bound.
pub fn with_name_key(name_key: impl Into<String>) -> LoggerOpt {
    let name_key = name_key.into();
    Box::new(move |mut conf| {
        conf.name_key = name_key;
        conf
    })
}

/// Key under which the execution id is logged.
pub fn with_execution_id_key(key: impl Into<String>) -> LoggerOpt {
    let key = key.into();
    Box::new(move |mut conf| {
        conf.execution_id_key = key;
        conf
    })
}

/// Key used to look the execution id up in a [`Context`](kvlog_core::Context).
pub fn with_execution_id_context_key(key: impl Into<ContextKey>) -> LoggerOpt {
    let key = key.into();
    Box::new(move |mut conf| {
        conf.execution_id_context_key = key;
        conf
    })
}

/// Skip the execution id entirely when the context does not carry one.
pub fn with_omit_execution_id_when_missing() -> LoggerOpt {
    Box::new(|mut conf| {
        conf.omit_execution_id_when_missing = true;
        conf
    })
}

/// Minimum severity written. Overrides `KVLOG_LEVEL` and `RUST_LOG`.
///
/// Gating is by [`Severity`], so `with_level(Severity::Panic)` drops plain
/// errors even though panic entries share tracing's ERROR level.
pub fn with_level(level: Severity) -> LoggerOpt {
    Box::new(move |mut conf| {
        conf.level = Some(level);
        conf
    })
}

/// `EnvFilter` directives, e.g. `"kvlog=warn"`. Takes precedence over
/// [`with_level`] and `RUST_LOG`.
pub fn with_filter(directives: impl Into<String>) -> LoggerOpt {
    let directives = directives.into();
    Box::new(move |mut conf| {
        conf.filter = Some(directives);
        conf
    })
}

pub fn with_output(output: Output) -> LoggerOpt {
    Box::new(move |mut conf| {
        conf.output = output;
        conf
    })
}

/// Writes entries to any `MakeWriter` (in-memory buffers, test writers).
pub fn with_writer<M>(make_writer: M) -> LoggerOpt
where
    M: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    with_output(Output::Writer(BoxMakeWriter::new(make_writer)))
}
