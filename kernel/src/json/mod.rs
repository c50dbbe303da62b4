//! Shared plumbing for the JSON codecs: typed field accessors that produce the kernel's exact
//! decode errors, and the serializer entry points used by every encoder in the crate.

use std::io;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{Error, KernelResult};

mod formatter;

pub use formatter::IndentedFormatter;

/// Borrow `value` as a JSON object, or fail with a "non-object" error naming `what`.
pub(crate) fn as_object<'a>(
    what: &'static str,
    value: &'a Value,
) -> KernelResult<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| Error::non_object(what, value))
}

/// Fetch a required field of any type.
pub(crate) fn get<'a>(property: &str, node: &'a Map<String, Value>) -> KernelResult<&'a Value> {
    node.get(property)
        .ok_or_else(|| Error::missing_field("field", property))
}

pub(crate) fn get_string<'a>(
    property: &str,
    node: &'a Map<String, Value>,
) -> KernelResult<&'a str> {
    let value = node
        .get(property)
        .ok_or_else(|| Error::missing_field("string", property))?;
    value
        .as_str()
        .ok_or_else(|| Error::invalid_field_value("a string", property, value))
}

pub(crate) fn get_string_or_null<'a>(
    property: &str,
    node: &'a Map<String, Value>,
) -> KernelResult<Option<&'a str>> {
    match node.get(property) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => get_string(property, node).map(Some),
    }
}

pub(crate) fn get_long(property: &str, node: &Map<String, Value>) -> KernelResult<i64> {
    let value = node
        .get(property)
        .ok_or_else(|| Error::missing_field("long", property))?;
    value
        .as_i64()
        .ok_or_else(|| Error::invalid_field_value("a long", property, value))
}

/// Like [`get_long`], but for quantities that can never be negative (counts, sizes, durations).
pub(crate) fn get_unsigned_long(property: &str, node: &Map<String, Value>) -> KernelResult<u64> {
    let value = node
        .get(property)
        .ok_or_else(|| Error::missing_field("long", property))?;
    value
        .as_u64()
        .ok_or_else(|| Error::invalid_field_value("a long", property, value))
}

pub(crate) fn get_int(property: &str, node: &Map<String, Value>) -> KernelResult<i32> {
    let value = node
        .get(property)
        .ok_or_else(|| Error::missing_field("int", property))?;
    value
        .as_i64()
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| Error::invalid_field_value("an integer", property, value))
}

pub(crate) fn get_int_or_null(
    property: &str,
    node: &Map<String, Value>,
) -> KernelResult<Option<i32>> {
    match node.get(property) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => get_int(property, node).map(Some),
    }
}

pub(crate) fn get_bool(property: &str, node: &Map<String, Value>) -> KernelResult<bool> {
    let value = node
        .get(property)
        .ok_or_else(|| Error::missing_field("boolean", property))?;
    value
        .as_bool()
        .ok_or_else(|| Error::invalid_field_value("a boolean", property, value))
}

/// Serialize `value` into `writer`, either compact or with the kernel's indented layout.
pub(crate) fn write_to<W, T>(writer: W, value: &T, pretty: bool) -> KernelResult<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    // encoding failures are values JSON cannot represent, not malformed input
    if pretty {
        let mut ser = serde_json::Serializer::with_formatter(writer, IndentedFormatter::new());
        value.serialize(&mut ser).map_err(Error::generic)
    } else {
        let mut ser = serde_json::Serializer::new(writer);
        value.serialize(&mut ser).map_err(Error::generic)
    }
}

/// Serialize `value` to a string, either compact or with the kernel's indented layout.
pub(crate) fn to_string<T: ?Sized + Serialize>(value: &T, pretty: bool) -> KernelResult<String> {
    let mut buf = Vec::with_capacity(256);
    write_to(&mut buf, value, pretty)?;
    // serde_json only ever emits valid UTF-8
    String::from_utf8(buf).map_err(Error::generic)
}
