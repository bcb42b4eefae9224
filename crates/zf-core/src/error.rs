use thiserror::Error;

pub type ZfResult<T> = Result<T, ZfError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ZfError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invariant violated: {what}")]
    Invariant { what: String },
}

impl ZfError {
    pub fn invalid_arg(what: impl Into<String>) -> Self {
        ZfError::InvalidArg { what: what.into() }
    }

    pub fn invariant(what: impl Into<String>) -> Self {
        ZfError::Invariant { what: what.into() }
    }
}
