//! Production line format: one JSON object per entry.
//!
//! The envelope (`timestamp`, `level`, `severity`, `caller`, `message`) comes
//! first, followed by the entry's key/value pairs as top-level keys in the
//! order they were logged. Repeated keys are written as many times as they
//! occur.

use core::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// ISO 8601, UTC, millisecond precision.
pub(crate) const ISO8601: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Formats events emitted by [`TracingEngine`](crate::TracingEngine) in
/// production mode. The `fields` event field is expected to hold a JSON
/// array of `[key, value]` pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLine;

impl<S, N> FormatEvent<S, N> for JsonLine
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let line = Line {
            timestamp: chrono::Utc::now().format(ISO8601).to_string(),
            level: event.metadata().level(),
            pairs: visitor.pairs(),
            visitor: &visitor,
        };
        let json = serde_json::to_string(&line).map_err(|_| fmt::Error)?;
        writeln!(writer, "{json}")
    }
}

#[derive(Debug, Default)]
struct LineVisitor {
    message: Option<String>,
    severity: Option<String>,
    caller: Option<String>,
    fields: Option<String>,
}

impl LineVisitor {
    /// Pairs carried in `fields`. Text that is not a pair list is kept as a
    /// single `fields` string.
    fn pairs(&self) -> Vec<(String, serde_json::Value)> {
        let Some(raw) = &self.fields else {
            return Vec::new();
        };
        serde_json::from_str(raw).unwrap_or_else(|_| {
            vec![("fields".to_string(), serde_json::Value::String(raw.clone()))]
        })
    }

    fn record(&mut self, field: &Field, value: String) {
        let slot = match field.name() {
            "message" => &mut self.message,
            "severity" => &mut self.severity,
            "caller" => &mut self.caller,
            "fields" => &mut self.fields,
            _ => return,
        };
        *slot = Some(value);
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record(field, format!("{value:?}"));
    }
}

struct Line<'a> {
    timestamp: String,
    level: &'a Level,
    visitor: &'a LineVisitor,
    pairs: Vec<(String, serde_json::Value)>,
}

impl Serialize for Line<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        map.serialize_entry("level", self.level.as_str())?;
        if let Some(severity) = &self.visitor.severity {
            map.serialize_entry("severity", severity)?;
        }
        if let Some(caller) = &self.visitor.caller {
            map.serialize_entry("caller", caller)?;
        }
        map.serialize_entry("message", self.visitor.message.as_deref().unwrap_or_default())?;
        for (key, value) in &self.pairs {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
