//! Program outlines: a small text format for describing programs.
//!
//! Outlines stand in for a front end in tests and in the command line
//! driver. They carry exactly what the generator looks at (imports with their
//! exported symbols, annotations, signatures) and keep function bodies as
//! opaque statements.
//!
//! # Outline Format
//!
//! ```text
//! ; Comments start with semicolon
//! module acme/greeter;
//! import ballerinax/awslambda { Context, Function, __register, __process };
//! import ballerina/io as io;
//! type Person;
//!
//! document "main.bal" {
//!     @awslambda:Function
//!     public function echo(awslambda:Context ctx, json input) returns json|error {
//!         return input;
//!     }
//! }
//! ```

pub mod parser;

use crate::core::GenResult;
use crate::program::Program;

/// Parse outline text into a program.
pub fn parse_outline(text: &str) -> GenResult<Program> {
    parser::parse(text)
}
