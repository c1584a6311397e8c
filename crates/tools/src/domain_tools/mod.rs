//! Domain tools for the partner program

pub mod tools;

pub use tools::*;
