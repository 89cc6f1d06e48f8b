//! Request-scoped execution context.
//!
//! A [`Context`] is an immutable lookup bag carried alongside a unit of work
//! (a request, a job, a message). Adding a value never mutates the receiver:
//! it returns a new context whose lookups fall back to the parent chain.

use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

/// Key under which a value is stored in a [`Context`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextKey(Cow<'static, str>);

impl ContextKey {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ContextKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ContextKey {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for ContextKey {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Well-known key for the execution id, both in a [`Context`] and as the
/// default tag on log lines.
pub const EXECUTION_ID_KEY: ContextKey = ContextKey::from_static("executionID");

/// Placeholder used whenever an execution id cannot be determined.
pub const MISSING_EXECUTION_ID: &str = "missing_execution_id";

struct Entry {
    key: ContextKey,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Entry>>,
}

/// Immutable, cheaply clonable key/value carrier.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Entry>>,
}

impl Context {
    /// An empty context.
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a child context that also maps `key` to `value`.
    ///
    /// The newest binding for a key shadows older ones.
    pub fn with_value<V>(&self, key: impl Into<ContextKey>, value: V) -> Self
    where
        V: Any + Send + Sync,
    {
        Self {
            head: Some(Arc::new(Entry {
                key: key.into(),
                value: Arc::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// Stores `id` under [`EXECUTION_ID_KEY`].
    pub fn with_execution_id(&self, id: impl Into<String>) -> Self {
        self.with_value(EXECUTION_ID_KEY, id.into())
    }

    pub fn value(&self, key: &ContextKey) -> Option<&(dyn Any + Send + Sync)> {
        let mut cursor = self.head.as_deref();
        while let Some(entry) = cursor {
            if &entry.key == key {
                return Some(entry.value.as_ref());
            }
            cursor = entry.parent.as_deref();
        }
        None
    }

    /// Looks up `key` and returns it if the stored value is a string.
    pub fn str_value(&self, key: &ContextKey) -> Option<&str> {
        let value = self.value(key)?;
        if let Some(s) = value.downcast_ref::<String>() {
            return Some(s);
        }
        value.downcast_ref::<&'static str>().copied()
    }
}

impl core::fmt::Debug for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut keys = Vec::new();
        let mut cursor = self.head.as_deref();
        while let Some(entry) = cursor {
            keys.push(entry.key.as_str());
            cursor = entry.parent.as_deref();
        }
        f.debug_struct("Context").field("keys", &keys).finish()
    }
}

/// Mints a fresh, time-ordered execution id.
pub fn new_execution_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_is_empty() {
        let ctx = Context::background();
        assert!(ctx.value(&EXECUTION_ID_KEY).is_none());
    }

    #[test]
    fn child_does_not_affect_parent() {
        let parent = Context::background().with_value("tenant", "acme");
        let child = parent.with_execution_id("exec-1");

        assert_eq!(child.str_value(&EXECUTION_ID_KEY), Some("exec-1"));
        assert_eq!(child.str_value(&ContextKey::from_static("tenant")), Some("acme"));
        assert!(parent.value(&EXECUTION_ID_KEY).is_none());
    }

    #[test]
    fn newest_binding_shadows_older_ones() {
        let ctx = Context::background()
            .with_execution_id("first")
            .with_execution_id("second");
        assert_eq!(ctx.str_value(&EXECUTION_ID_KEY), Some("second"));
    }

    #[test]
    fn non_string_values_are_not_strings() {
        let ctx = Context::background().with_value(EXECUTION_ID_KEY, 42u32);
        assert!(ctx.value(&EXECUTION_ID_KEY).is_some());
        assert_eq!(ctx.str_value(&EXECUTION_ID_KEY), None);
    }

    #[test]
    fn owned_and_static_keys_are_equal() {
        let ctx = Context::background().with_value(ContextKey::new("request"), "r-1".to_string());
        assert_eq!(ctx.str_value(&ContextKey::from_static("request")), Some("r-1"));
    }

    #[test]
    fn execution_ids_are_unique() {
        assert_ne!(new_execution_id(), new_execution_id());
    }
}
