//! HTTP handlers

mod fields;
mod health;
mod sessions;

pub use fields::*;
pub use health::*;
pub use sessions::*;
