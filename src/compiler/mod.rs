//! File discovery and the filesystem steps of a build.
//!
//! - **filter**: decide which paths belong to an asset class
//! - **walk**: breadth-first discovery under configured roots
//! - **dedupe**: collapse repeated discoveries
//! - **combine**: concatenate a file list into one bundle
//! - **mirror**: copy static trees verbatim
//!
//! # Flow
//!
//! ```text
//! walk(libs) ++ walk(dirs) ──► dedupe ──► combine_files() ──► Minifier
//!
//! plan_mapping(static) ──► copy_jobs()
//! ```

pub mod combine;
pub mod dedupe;
pub mod filter;
pub mod mirror;
pub mod walk;

pub use combine::combine_files;
pub use dedupe::Uniqueness;
pub use filter::{Exclusions, FileType};
pub use mirror::{copy_jobs, plan_mapping};
pub use walk::walk;
