//! Git Integration Module
//!
//! Each notebook is backed by its own Git repository:
//! - Cell-level commits on save
//! - Tags for named versions
//! - Forced checkout of historical revisions for restore

mod repository;
pub mod revision;

pub use repository::*;
