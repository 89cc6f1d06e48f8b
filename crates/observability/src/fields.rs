//! Key/value list normalization.

use kvlog_core::{Arg, Value};

/// Flattens `args` into a plain key/value list.
///
/// Each [`Field`](kvlog_core::Field) becomes its name followed by its value;
/// every other element passes through. Relative order is preserved and the
/// result is not checked for pairing.
pub fn expand_fields(args: &[Arg]) -> Vec<Value> {
    let mut out = Vec::with_capacity(args.len() * 2);
    expand_into(&mut out, args);
    out
}

pub(crate) fn expand_into(out: &mut Vec<Value>, args: &[Arg]) {
    for arg in args {
        match arg {
            Arg::Field(field) => {
                out.push(Value::Str(field.name.clone()));
                out.push(field.value.clone());
            }
            Arg::Value(value) => out.push(value.clone()),
        }
    }
}
