//! `stem-flux` library crate.
//!
//! The binary (`stemflux`) is a thin wrapper around this library so that:
//!
//! - the smoother, loaders and statistics are testable without spawning processes
//! - the profile estimator can be reused on any height/flux table

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
pub mod smooth;
