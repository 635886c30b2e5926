//! Domain models for the Dialyze system.

mod patch;
mod patient;
mod risk;

pub use patch::*;
pub use patient::*;
pub use risk::*;
