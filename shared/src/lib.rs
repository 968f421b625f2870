//! Shared types and models for MapStronaut
//!
//! Geometry, index bucketing, feature encoding and field state used by the
//! backend and, through WASM, by the map frontend.

pub mod geometry;
pub mod models;
pub mod types;
pub mod validation;

pub use geometry::*;
pub use models::*;
pub use types::*;
pub use validation::*;
