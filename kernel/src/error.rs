//! Definitions of errors that the scan report kernel can encounter

use serde_json::Value;

/// A [`std::result::Result`] that has the kernel [`Error`] as the error variant
pub type KernelResult<T, E = Error> = std::result::Result<T, E>;

/// All the types of errors that the kernel can run into.
///
/// The `Display` output of the decode variants is part of the wire compatibility contract.
/// Consumers match on these messages, so they must not change.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The document handed to the decoder was JSON `null`.
    #[error("Cannot parse scan report from null object")]
    NullReport,

    /// A JSON value that must be an object was something else.
    #[error("Cannot parse {what} from non-object: {value}")]
    NonObject { what: &'static str, value: Value },

    /// A required key was absent. `kind` names the expected type, e.g. `string` or `long`.
    #[error("Cannot parse missing {kind}: {field}")]
    MissingField { kind: &'static str, field: String },

    /// A key was present but held a value of the wrong JSON type.
    #[error("Cannot parse to {kind} value: {field}: {value}")]
    InvalidFieldValue {
        kind: &'static str,
        field: String,
        value: Value,
    },

    /// A schema type was neither a primitive type name nor a nested type object.
    #[error("Cannot parse type from json: {0}")]
    InvalidType(Value),

    /// A [`ScanReport`](crate::metrics::ScanReport) builder was missing required attributes.
    #[error("Cannot build ScanReport, some of required attributes are not set [{0}]")]
    MissingAttributes(String),

    /// The input text was not JSON at all.
    #[error("Invalid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    /// An error with an arbitrary message.
    #[error("{0}")]
    Generic(String),
}

// Convenience constructors for Error types that take a String argument
impl Error {
    pub fn generic(msg: impl ToString) -> Self {
        Self::Generic(msg.to_string())
    }

    pub(crate) fn non_object(what: &'static str, value: &Value) -> Self {
        Self::NonObject {
            what,
            value: value.clone(),
        }
    }

    pub(crate) fn missing_field(kind: &'static str, field: impl ToString) -> Self {
        Self::MissingField {
            kind,
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid_field_value(
        kind: &'static str,
        field: impl ToString,
        value: &Value,
    ) -> Self {
        Self::InvalidFieldValue {
            kind,
            field: field.to_string(),
            value: value.clone(),
        }
    }
}
