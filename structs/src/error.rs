use thiserror::Error;

/// Errors from decoding the textual wire formats exchanged between roles.
#[derive(Debug, Error, PartialEq)]
pub enum FormatError {
    #[error("missing field '{field}' in '{input}'")]
    MissingField { field: &'static str, input: String },

    #[error("bad number '{value}' for field '{field}'")]
    BadNumber { field: &'static str, value: String },

    #[error("malformed spec '{0}'")]
    Malformed(String),
}
