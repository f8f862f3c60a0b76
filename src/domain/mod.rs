//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - measurement records (`FieldMeasurement`, `SynthesisObservation`)
//! - classification enums (`Component`, `Ecosystem`)
//! - estimator inputs/outputs (`ObservationSet`, `SmoothedProfile`)
//! - run configuration (`DataConfig`, `ProfileConfig`) and the JSON export schema

pub mod types;

pub use types::*;
