//! Error types for component operations.

use thiserror::Error;
use zf_core::error::ZfError;
use zf_fluids::FluidError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },

    #[error("Fluid property error: {message}")]
    Fluid { message: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<FluidError> for ComponentError {
    fn from(e: FluidError) -> Self {
        ComponentError::Fluid {
            message: e.to_string(),
        }
    }
}

impl From<ComponentError> for ZfError {
    fn from(e: ComponentError) -> Self {
        ZfError::invalid_arg(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ComponentError::NonPhysical { what: "density" };
        assert!(err.to_string().contains("density"));
    }

    #[test]
    fn error_conversion() {
        let comp_err = ComponentError::InvalidArg { what: "test" };
        let zf_err: ZfError = comp_err.into();
        assert!(matches!(zf_err, ZfError::InvalidArg { .. }));
    }
}
