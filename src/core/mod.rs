// This module serves as the hub for lambdagen's shared infrastructure: the fatal error
// type used by both build phases, the diagnostic log that collects recoverable signature
// problems, and the generator configuration describing the dispatcher package and the
// deployment settings. Everything else in the crate builds on these three pieces.

//! Core lambdagen infrastructure.
//!
//! # Key Components
//!
//! ## Errors (`error`)
//! - Fatal failures of the analysis and packaging phases
//!
//! ## Diagnostics (`diagnostics`)
//! - Located, severity-tagged messages that never abort a build
//!
//! ## Configuration (`config`)
//! - Dispatcher package identifiers and deployment settings

pub mod config;
pub mod diagnostics;
pub mod error;

pub use config::{DispatcherConfig, GeneratorConfig, PackagingConfig};
pub use diagnostics::{Diagnostic, DiagnosticLog, Location, Severity};
pub use error::{GenError, GenResult};
