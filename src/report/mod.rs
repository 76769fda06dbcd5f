//! Human-readable rendering of a parsed model. Out of the core's scope by
//! design: nothing here feeds back into parsing.
pub mod summary;
pub mod tables;

pub use summary::*;
pub use tables::*;
