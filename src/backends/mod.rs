//! Backends module - Filesystem integrations
//!
//! Provides:
//! - scan: Page discovery with the ignore crate

pub mod scan;
