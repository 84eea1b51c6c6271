//! HTTP handlers.

pub mod cars;
pub use cars::*;
