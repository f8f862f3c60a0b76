//! Input/output helpers.
//!
//! - CSV plumbing shared by the loaders (`table`)
//! - smoothed profile exports to CSV (`export`)
//! - profile JSON read/write (`profile`)
//! - two-column profile CSV ingest (`observations`)

pub mod export;
pub mod observations;
pub mod profile;
pub mod table;

pub use export::*;
pub use observations::*;
pub use profile::*;
