//! Named log attributes and the argument type accepted by loggers.

use crate::value::{SharedError, Value};

/// A named log attribute, usable in place of a literal key/value pair.
///
/// Adapters expand every `Field` into its name followed by its value, so
/// `Field::new("n", v)` logs exactly like the pair `"n", v`. No validation is
/// applied: the name may be empty and the value may be null.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: Value,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Attaches a failure to a log line under the `"error"` key.
pub fn error<E>(err: E) -> Field
where
    E: std::error::Error + Send + Sync + 'static,
{
    Field::new("error", Value::from_error(err))
}

/// One element of the key/value list passed to a logging call.
///
/// A list may alternate keys and values, consist of [`Field`]s, or mix both.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Value(Value),
    Field(Field),
}

impl From<Field> for Arg {
    fn from(field: Field) -> Self {
        Arg::Field(field)
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(value)
    }
}

macro_rules! impl_arg_from_value {
    ($($t:ty),+ $(,)?) => {
        $(
            impl From<$t> for Arg {
                fn from(value: $t) -> Self {
                    Arg::Value(Value::from(value))
                }
            }
        )+
    };
}

impl_arg_from_value!(
    bool,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    char,
    &str,
    String,
    &String,
    (),
    chrono::DateTime<chrono::Utc>,
    uuid::Uuid,
    serde_json::Value,
    SharedError,
);

impl<T: Into<Value>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        Arg::Value(Value::from(value))
    }
}

/// Builds a `&[Arg]` from heterogeneous keys, values and fields.
///
/// ```
/// use kvlog_core::{args, Field};
///
/// let kv = args!["user", "ada", Field::new("attempt", 3)];
/// assert_eq!(kv.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        &[] as &[$crate::Arg]
    };
    ($($arg:expr),+ $(,)?) => {
        &[$($crate::Arg::from($arg)),+][..]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Timeout;

    impl core::fmt::Display for Timeout {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.write_str("upstream timed out")
        }
    }

    impl std::error::Error for Timeout {}

    #[test]
    fn error_field_uses_error_key() {
        let field = error(Timeout);
        assert_eq!(field.name, "error");
        assert_eq!(field.value.to_string(), "upstream timed out");
    }

    #[test]
    fn fields_accept_empty_names_and_null_values() {
        let field = Field::new("", ());
        assert!(field.name.is_empty());
        assert!(field.value.is_null());
    }

    #[test]
    fn args_macro_preserves_order_and_kinds() {
        let kv = args!["a", 1, Field::new("b", 2), None::<i32>];
        assert_eq!(
            kv,
            &[
                Arg::Value(Value::from("a")),
                Arg::Value(Value::I64(1)),
                Arg::Field(Field::new("b", 2)),
                Arg::Value(Value::Null),
            ]
        );
        assert!(args![].is_empty());
    }
}
