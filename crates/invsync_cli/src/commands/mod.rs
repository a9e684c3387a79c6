//! Command implementations.

pub mod assemble;
pub mod inspect;
pub mod sync;
