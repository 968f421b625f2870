//! Domain models for field monitoring and irrigation decisions

mod assistant;
mod decision;
mod features;
mod field;
mod indices;
mod session;
mod weather;

pub use assistant::*;
pub use decision::*;
pub use features::*;
pub use field::*;
pub use indices::*;
pub use session::*;
pub use weather::*;
