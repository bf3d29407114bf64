//! services/api/src/lib.rs
//!
//! Library half of the education form service; the binaries in `src/bin`
//! wire these modules together.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
