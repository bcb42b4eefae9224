//! Fluid property errors.

use thiserror::Error;
use zf_core::ZfError;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Non-physical values (negative density, heat capacity, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Value out of valid range.
    #[error("Value out of range for {what}")]
    OutOfRange { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

impl From<FluidError> for ZfError {
    fn from(err: FluidError) -> Self {
        match err {
            FluidError::NonPhysical { what } => {
                ZfError::invariant(format!("Non-physical fluid value: {}", what))
            }
            FluidError::OutOfRange { what } => {
                ZfError::invalid_arg(format!("Fluid value out of range: {}", what))
            }
            FluidError::InvalidArg { what } => {
                ZfError::invalid_arg(format!("Invalid fluid argument: {}", what))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FluidError::NonPhysical { what: "density" };
        assert!(err.to_string().contains("density"));
    }

    #[test]
    fn error_to_zf_error() {
        let err: ZfError = FluidError::InvalidArg { what: "spline" }.into();
        assert!(matches!(err, ZfError::InvalidArg { .. }));
    }
}
