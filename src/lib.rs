//! lambdagen - serverless handler registration for compiled programs.
//!
//! lambdagen finds functions annotated as AWS Lambda handlers, checks their
//! signatures, generates a proxy for each one plus an entry point that
//! registers them with the runtime dispatcher, and packages the compiled
//! executable for deployment.
//!
//! # Primary Usage
//!
//! ```ignore
//! use lambdagen::{outline, pipeline, package::ArtifactPackager, GeneratorConfig};
//!
//! let config = GeneratorConfig::default();
//! let mut program = outline::parse_outline(&text)?;
//!
//! // Analysis phase: mutates the program, returns the registered handlers.
//! let analysis = pipeline::run(&mut program, &config.dispatcher)?;
//!
//! // Packaging phase, once the executable exists.
//! ArtifactPackager::new(&config).package(&exe, &program, &analysis.generated, &mut stdout)?;
//! ```
//!
//! # Architecture
//!
//! - [`program`] - Program model, edits, rendering and the tree rewriter
//! - [`validate`] - Handler signature rules
//! - [`codegen`] - Synthesis primitives, proxies and the entry point
//! - [`pipeline`] - Discovery, validation and registration
//! - [`package`] - Deployment archive and operator instructions
//! - [`outline`] - Text format for describing programs
//! - [`core`] - Errors, diagnostics and configuration

pub mod codegen;
pub mod core;
pub mod outline;
pub mod package;
pub mod pipeline;
pub mod program;
pub mod validate;

pub use crate::core::{
    Diagnostic, DiagnosticLog, DispatcherConfig, GenError, GenResult, GeneratorConfig, Location,
    PackagingConfig, Severity,
};
pub use package::ArtifactPackager;
pub use pipeline::{analyze, run, Analysis, AnalysisStats, GeneratedHandlers};
pub use program::{Program, ProgramEdit};
