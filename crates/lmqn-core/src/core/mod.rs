//! Foundational types shared by every other module.

pub mod cost_function;
pub mod error;
pub mod types;
