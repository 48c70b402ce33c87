//! Utility modules for the bundle compiler.

pub mod exec;
pub mod minify;
pub mod path;
