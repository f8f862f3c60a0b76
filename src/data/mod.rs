//! Dataset ingest.
//!
//! - `field`: the Harvard Forest and Yale Myers Forest campaign tables
//! - `synthesis`: the published stem flux compilation
//! - `height`: free-text height parsing shared by both
//! - `synthetic`: seeded demo profiles

pub mod field;
pub mod height;
pub mod synthesis;
pub mod synthetic;

pub use field::{FieldDataset, SiteTable, load_field};
pub use synthesis::{SynthesisDataset, load_synthesis};
pub use synthetic::{SyntheticSpec, generate_profile};
