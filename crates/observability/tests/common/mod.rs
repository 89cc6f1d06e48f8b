#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use kvlog_core::Severity;
use kvlog_observability::{LoggerOpt, TracingLogger, production, with_level, with_writer};

/// In-memory sink shared between the logger and the test.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    /// Every written line, parsed as JSON.
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.contents()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn capture(buf: &SharedBuf) -> LoggerOpt {
    let buf = buf.clone();
    with_writer(move || buf.clone())
}

/// A production (JSON) logger writing everything from debug up into a buffer.
pub fn json_logger(name: &str, extra: Vec<LoggerOpt>) -> (TracingLogger, SharedBuf) {
    let buf = SharedBuf::default();
    let mut opts = vec![production(), with_level(Severity::Debug), capture(&buf)];
    opts.extend(extra);
    let logger = kvlog_observability::new(name, opts).unwrap();
    (logger, buf)
}

/// Keys every JSON line starts with.
pub const ENVELOPE: [&str; 5] = ["timestamp", "level", "severity", "caller", "message"];

/// The logged pairs of a JSON line (everything past the envelope), with key
/// order preserved.
pub fn fields_of(line: &serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    line.as_object()
        .unwrap()
        .iter()
        .filter(|(key, _)| !ENVELOPE.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

pub fn keys_of(line: &serde_json::Value) -> Vec<String> {
    fields_of(line).keys().cloned().collect()
}
