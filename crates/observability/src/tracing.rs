//! `tracing`-backed logging engine.
//!
//! Each engine owns its own [`Dispatch`]; nothing is installed as the global
//! default, so independent loggers can write to independent sinks. Entries
//! are emitted with target [`TARGET`], which is what filter directives match.

use std::fs::OpenOptions;
use std::panic::Location;
use std::sync::{Arc, Mutex};

use kvlog_core::{Severity, Value};
use tracing::{Dispatch, Level};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::Output;
use crate::engine::{Engine, Entry};
use crate::error::{InitResult, InitializationError};
use crate::format::JsonLine;

/// Target of every event written by [`TracingEngine`].
pub const TARGET: &str = "kvlog";

/// Minimum severity to log when no level is configured, e.g. `KVLOG_LEVEL=warn`.
pub const LEVEL_ENV: &str = "KVLOG_LEVEL";

/// What the engine needs to know at construction.
#[derive(Debug, Default)]
pub struct EngineSettings {
    pub production: bool,
    pub level: Option<Severity>,
    pub filter: Option<String>,
    pub output: Output,
}

/// Engine handle. Clones and decorated handles share one dispatcher.
#[derive(Clone)]
pub struct TracingEngine {
    dispatch: Dispatch,
    production: bool,
    min_severity: Option<Severity>,
    bound: Arc<[(String, Value)]>,
}

impl TracingEngine {
    /// Builds a development (human-readable) or production (JSON, ISO 8601
    /// timestamps) engine.
    ///
    /// The minimum severity comes from, in order: filter directives, the
    /// configured level, [`LEVEL_ENV`], `RUST_LOG`, then the mode default
    /// (info in production, debug in development).
    pub fn build(settings: EngineSettings) -> InitResult<Self> {
        let level = resolve_level(settings.level, std::env::var(LEVEL_ENV).ok())?;
        let filter = build_filter(settings.filter.as_deref(), level, settings.production)?;
        let ansi = matches!(settings.output, Output::Stderr | Output::Stdout);
        let writer = build_writer(settings.output)?;

        let dispatch = if settings.production {
            Dispatch::new(
                tracing_subscriber::fmt()
                    .event_format(JsonLine)
                    .with_env_filter(filter)
                    .with_writer(writer)
                    .finish(),
            )
        } else {
            Dispatch::new(
                tracing_subscriber::fmt()
                    .with_target(false)
                    .with_ansi(ansi)
                    .with_env_filter(filter)
                    .with_writer(writer)
                    .finish(),
            )
        };

        Ok(Self {
            dispatch,
            production: settings.production,
            min_severity: settings.filter.is_none().then_some(level).flatten(),
            bound: Arc::from(Vec::new()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.production
    }

    /// Pairs bound through [`Engine::with`], in binding order.
    pub fn bound(&self) -> &[(String, Value)] {
        &self.bound
    }

    /// Entries below this severity are dropped before reaching the filter.
    pub fn min_severity(&self) -> Option<Severity> {
        self.min_severity
    }

    fn report(&self, issues: &[Issue<'_>], caller: &Caller) {
        if issues.is_empty() {
            return;
        }
        tracing::dispatcher::with_default(&self.dispatch, || {
            for issue in issues {
                issue.report(caller, self.production);
            }
        });
    }
}

impl core::fmt::Debug for TracingEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TracingEngine")
            .field("production", &self.production)
            .field("min_severity", &self.min_severity)
            .field("bound", &self.bound)
            .finish_non_exhaustive()
    }
}

/// A configured level wins over the environment.
fn resolve_level(
    configured: Option<Severity>,
    from_env: Option<String>,
) -> InitResult<Option<Severity>> {
    if configured.is_some() {
        return Ok(configured);
    }
    from_env
        .map(|value| {
            value
                .parse()
                .map_err(|source| InitializationError::Level {
                    var: LEVEL_ENV,
                    value,
                    source,
                })
        })
        .transpose()
}

fn build_filter(
    directives: Option<&str>,
    level: Option<Severity>,
    production: bool,
) -> InitResult<EnvFilter> {
    if let Some(directives) = directives {
        return EnvFilter::try_new(directives).map_err(|source| InitializationError::Filter {
            directives: directives.to_string(),
            source,
        });
    }
    if let Some(level) = level {
        return Ok(EnvFilter::new(level_directive(level)));
    }

    let fallback = if production { "info" } else { "debug" };
    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
}

/// `tracing` has no level above ERROR: panic and fatal minimums let ERROR
/// events through the filter and are enforced by [`TracingEngine`] itself.
fn level_directive(level: Severity) -> &'static str {
    match level {
        Severity::Debug => "debug",
        Severity::Info => "info",
        Severity::Warn => "warn",
        Severity::Error | Severity::Panic | Severity::Fatal => "error",
    }
}

fn build_writer(output: Output) -> InitResult<BoxMakeWriter> {
    Ok(match output {
        Output::Stderr => BoxMakeWriter::new(std::io::stderr),
        Output::Stdout => BoxMakeWriter::new(std::io::stdout),
        Output::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|source| InitializationError::Sink { path, source })?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        Output::Writer(make_writer) => make_writer,
    })
}

macro_rules! emit {
    ($level:expr, $severity:expr, $caller:expr, $fields:expr, $message:expr) => {
        tracing::event!(
            target: TARGET,
            $level,
            severity = $severity,
            caller = %$caller,
            fields = %$fields,
            "{}",
            $message
        )
    };
}

impl Engine for TracingEngine {
    fn write(&self, entry: &Entry<'_>) {
        if self.min_severity.is_some_and(|min| entry.severity < min) {
            return;
        }

        let (call_pairs, issues) = pair_up(entry.kv.iter());
        let pairs: Vec<(&str, &Value)> = self
            .bound
            .iter()
            .map(|(key, value)| (key.as_str(), value))
            .chain(call_pairs)
            .collect();
        let caller = Caller(entry.caller);
        let fields = Rendered {
            pairs: &pairs,
            json: self.production,
        };
        let severity = entry.severity.as_str();

        self.report(&issues, &caller);
        tracing::dispatcher::with_default(&self.dispatch, || match entry.severity {
            Severity::Debug => emit!(Level::DEBUG, severity, caller, fields, entry.message),
            Severity::Info => emit!(Level::INFO, severity, caller, fields, entry.message),
            Severity::Warn => emit!(Level::WARN, severity, caller, fields, entry.message),
            Severity::Error | Severity::Panic | Severity::Fatal => {
                emit!(Level::ERROR, severity, caller, fields, entry.message)
            }
        });
    }

    fn with(&self, kv: Vec<Value>, caller: &'static Location<'static>) -> Self {
        let (pairs, issues) = pair_up(kv.iter());
        self.report(&issues, &Caller(caller));

        let mut bound = self.bound.to_vec();
        bound.extend(
            pairs
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.clone())),
        );
        Self {
            dispatch: self.dispatch.clone(),
            production: self.production,
            min_severity: self.min_severity,
            bound: Arc::from(bound),
        }
    }
}

struct Caller(&'static Location<'static>);

impl core::fmt::Display for Caller {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.0.file(), self.0.line())
    }
}

/// A malformed part of a key/value list.
#[derive(Debug, PartialEq)]
enum Issue<'a> {
    /// Odd-length list: the last key has no value.
    DanglingKey(&'a Value),
    /// `(position, key, value)` of every pair whose key is not a string.
    NonStringKeys(Vec<(usize, &'a Value, &'a Value)>),
}

impl Issue<'_> {
    fn report(&self, caller: &Caller, production: bool) {
        let (message, key, value) = match self {
            Issue::DanglingKey(key) => {
                ("Ignored key without a value.", "ignored", (*key).clone())
            }
            Issue::NonStringKeys(pairs) => {
                let invalid = pairs
                    .iter()
                    .map(|(position, key, value)| {
                        serde_json::json!({
                            "position": position,
                            "key": key.to_json(),
                            "value": value.to_json(),
                        })
                    })
                    .collect();
                (
                    "Ignored key-value pairs with non-string keys.",
                    "invalid",
                    Value::Json(serde_json::Value::Array(invalid)),
                )
            }
        };
        let pairs = [(key, &value)];
        let fields = Rendered {
            pairs: &pairs,
            json: production,
        };
        emit!(Level::ERROR, "error", caller, fields, message);
    }
}

fn pair_up<'a>(
    kv: impl Iterator<Item = &'a Value>,
) -> (Vec<(&'a str, &'a Value)>, Vec<Issue<'a>>) {
    let kv: Vec<&Value> = kv.collect();
    let mut pairs = Vec::with_capacity(kv.len() / 2);
    let mut non_string = Vec::new();
    let mut issues = Vec::new();

    for (i, chunk) in kv.chunks(2).enumerate() {
        match *chunk {
            [key, value] => match key.as_str() {
                Some(name) => pairs.push((name, value)),
                None => non_string.push((i * 2, key, value)),
            },
            [key] => issues.push(Issue::DanglingKey(key)),
            _ => {}
        }
    }
    if !non_string.is_empty() {
        issues.push(Issue::NonStringKeys(non_string));
    }

    (pairs, issues)
}

/// `k=v` pairs in development mode; in production, a JSON array of
/// `[key, value]` pairs for [`JsonLine`] to lay out.
struct Rendered<'a> {
    pairs: &'a [(&'a str, &'a Value)],
    json: bool,
}

impl core::fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.json {
            let pairs = self
                .pairs
                .iter()
                .map(|(key, value)| serde_json::json!([key, value.to_json()]))
                .collect();
            return write!(f, "{}", serde_json::Value::Array(pairs));
        }

        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match value {
                Value::Str(s) if s.is_empty() || s.contains(char::is_whitespace) => {
                    write!(f, "{key}={s:?}")?
                }
                other => write!(f, "{key}={other}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(raw: &[Value]) -> Vec<&Value> {
        raw.iter().collect()
    }

    #[test]
    fn well_formed_lists_pair_cleanly() {
        let raw = vec![Value::from("a"), Value::from(1), Value::from("b"), Value::from(true)];
        let (pairs, issues) = pair_up(values(&raw).into_iter());
        assert_eq!(pairs, vec![("a", &raw[1]), ("b", &raw[3])]);
        assert!(issues.is_empty());
    }

    #[test]
    fn trailing_key_is_flagged() {
        let raw = vec![Value::from("a"), Value::from(1), Value::from("orphan")];
        let (pairs, issues) = pair_up(values(&raw).into_iter());
        assert_eq!(pairs.len(), 1);
        assert_eq!(issues, vec![Issue::DanglingKey(&raw[2])]);
    }

    #[test]
    fn non_string_keys_are_flagged_with_position() {
        let raw = vec![Value::from("a"), Value::from(1), Value::from(7), Value::from("x")];
        let (pairs, issues) = pair_up(values(&raw).into_iter());
        assert_eq!(pairs, vec![("a", &raw[1])]);
        assert_eq!(issues, vec![Issue::NonStringKeys(vec![(2, &raw[2], &raw[3])])]);
    }

    #[test]
    fn development_rendering_quotes_strings_with_spaces() {
        let hello = Value::from("hello world");
        let count = Value::from(3);
        let pairs = [("greeting", &hello), ("count", &count)];
        let rendered = Rendered { pairs: &pairs, json: false }.to_string();
        assert_eq!(rendered, "greeting=\"hello world\" count=3");
    }

    #[test]
    fn production_rendering_keeps_every_pair_in_order() {
        let first = Value::from(1);
        let a = Value::from("x");
        let second = Value::from(2);
        let pairs = [("z", &first), ("a", &a), ("z", &second)];
        let rendered = Rendered { pairs: &pairs, json: true }.to_string();
        assert_eq!(rendered, r#"[["z",1],["a","x"],["z",2]]"#);
    }

    #[test]
    fn with_appends_after_existing_bindings() {
        let engine = TracingEngine::build(EngineSettings::default()).unwrap();
        let engine = engine
            .with(vec![Value::from("a"), Value::from(1)], Location::caller())
            .with(vec![Value::from("b"), Value::from(2)], Location::caller());
        assert_eq!(
            engine.bound(),
            &[
                ("a".to_string(), Value::from(1)),
                ("b".to_string(), Value::from(2)),
            ]
        );
    }

    #[test]
    fn with_keeps_only_well_formed_pairs() {
        let engine = TracingEngine::build(EngineSettings::default()).unwrap();
        let engine = engine
            .with(vec![Value::from("orphan")], Location::caller())
            .with(vec![Value::from(7), Value::from("x")], Location::caller())
            .with(vec![Value::from("k"), Value::from("v")], Location::caller());
        assert_eq!(engine.bound(), &[("k".to_string(), Value::from("v"))]);
    }

    #[test]
    fn configured_level_wins_over_the_environment() {
        assert_eq!(
            resolve_level(Some(Severity::Error), Some("debug".to_string())).unwrap(),
            Some(Severity::Error)
        );
        assert_eq!(
            resolve_level(None, Some("warn".to_string())).unwrap(),
            Some(Severity::Warn)
        );
        assert_eq!(resolve_level(None, None).unwrap(), None);
    }

    #[test]
    fn unknown_environment_level_is_an_initialization_error() {
        let err = resolve_level(None, Some("verbose".to_string())).unwrap_err();
        match err {
            InitializationError::Level { var, value, .. } => {
                assert_eq!(var, LEVEL_ENV);
                assert_eq!(value, "verbose");
            }
            other => panic!("expected level error, got {other:?}"),
        }
    }

    #[test]
    fn level_gating_applies_only_without_filter_directives() {
        let engine = TracingEngine::build(EngineSettings {
            level: Some(Severity::Panic),
            ..EngineSettings::default()
        })
        .unwrap();
        assert_eq!(engine.min_severity(), Some(Severity::Panic));

        let engine = TracingEngine::build(EngineSettings {
            level: Some(Severity::Panic),
            filter: Some("kvlog=debug".to_string()),
            ..EngineSettings::default()
        })
        .unwrap();
        assert_eq!(engine.min_severity(), None);
    }
}
