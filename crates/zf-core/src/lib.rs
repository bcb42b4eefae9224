//! zf-core: stable foundation for zoneflow.
//!
//! Contains:
//! - units (uom SI types, constructors and physical constants)
//! - numeric (Real + tolerances + float helpers)
//! - ids (compact ids for network graph objects, project object ids)
//! - error (shared error type)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{ZfError, ZfResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
