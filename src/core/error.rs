// This module defines the fatal error types for lambdagen using the thiserror crate for
// idiomatic Rust error handling. GenError is the main error enum covering the failures that
// abort a build step: the dispatcher package or one of its entry points cannot be resolved
// (an inconsistent program, since the handler annotation cannot exist without its package),
// a program edit that points at a function that does not exist, archive creation failures
// during packaging, and malformed outline input. Recoverable signature problems are not
// errors here; they are reported as diagnostics by the validator. The module also provides
// GenResult<T> as a convenience alias for Result<T, GenError>.

//! Error types for lambdagen.
//!
//! Using thiserror for more idiomatic error handling.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the analysis and packaging phases.
#[derive(Error, Debug)]
pub enum GenError {
    #[error("Dispatcher package {org}/{package} cannot be resolved")]
    DispatcherPackageUnresolved {
        org: String,
        package: String,
    },

    #[error("Symbol {symbol} not found in dispatcher package {package}")]
    DispatcherSymbolUnresolved {
        package: String,
        symbol: String,
    },

    #[error("Function #{id} does not exist in the program")]
    UnknownFunction {
        id: u32,
    },

    #[error("Document #{id} does not exist in the program")]
    UnknownDocument {
        id: u32,
    },

    #[error("Error generating AWS lambda zip file {}: {source}", path.display())]
    Packaging {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error writing AWS lambda zip archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Executable path {} has no file name", path.display())]
    InvalidExecutable {
        path: PathBuf,
    },

    #[error("Outline line {line}: {reason}")]
    Outline {
        line: usize,
        reason: String,
    },
}

/// Result type alias for generator operations.
pub type GenResult<T> = Result<T, GenError>;
