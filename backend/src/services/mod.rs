//! Business logic services for MapStronaut

pub mod decision;
pub mod field;

pub use decision::{DecisionSource, IrrigationDecisionEngine};
pub use field::{FieldService, SessionView};
