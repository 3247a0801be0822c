//! Handler signature validation.
//!
//! A handler must have the shape
//! `(dispatcher:Context, <payload>) returns json|error|()`:
//!
//! 1. exactly two required parameters, no defaultable and no rest parameter
//! 2. the first parameter is the dispatcher package's `Context` type
//! 3. the second parameter has a resolvable type
//! 4. the return type is `json`, `error`, `()` or a union of only those
//!
//! Rules are checked in that order and the first violation is reported.

use thiserror::Error;

use crate::core::{Diagnostic, DispatcherConfig};
use crate::program::printer::render_type;
use crate::program::{Function, Program, TypeDesc};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureViolation {
    #[error(
        "expected 2 required parameters and no defaultable or rest parameters, \
         found {required} required, {defaultable} defaultable, rest parameter: {rest}"
    )]
    ParameterShape {
        required: usize,
        defaultable: usize,
        rest: bool,
    },

    #[error("first parameter must be of type {expected}, found {found}")]
    ContextType { expected: String, found: String },

    #[error("type of parameter '{param}' cannot be resolved")]
    UnresolvedPayload { param: String },

    #[error("return type {found} may only contain json, error and ()")]
    ReturnType { found: String },
}

pub fn validate_handler(
    program: &Program,
    function: &Function,
    config: &DispatcherConfig,
) -> Result<(), SignatureViolation> {
    let required = function.required_params().count();
    let defaultable = function.defaultable_params().count();
    let rest = function.rest_param.is_some();
    if required != 2 || defaultable > 0 || rest {
        return Err(SignatureViolation::ParameterShape {
            required,
            defaultable,
            rest,
        });
    }

    let context = &function.params[0];
    if !context
        .ty
        .is_named(&config.org, &config.package, &config.context_type)
    {
        return Err(SignatureViolation::ContextType {
            expected: format!("{}/{}:{}", config.org, config.package, config.context_type),
            found: render_type(program, &context.ty),
        });
    }

    let payload = &function.params[1];
    if !payload.ty.is_resolved() {
        return Err(SignatureViolation::UnresolvedPayload {
            param: payload.name.clone(),
        });
    }

    let ret = function.declared_return();
    let allowed = ret
        .members()
        .iter()
        .all(|m| matches!(m, TypeDesc::Json | TypeDesc::Error | TypeDesc::Nil));
    if !allowed {
        return Err(SignatureViolation::ReturnType {
            found: render_type(program, &ret),
        });
    }
    Ok(())
}

/// Error diagnostic for a handler that failed validation.
pub fn signature_diagnostic(
    function: &Function,
    violation: &SignatureViolation,
    config: &DispatcherConfig,
) -> Diagnostic {
    Diagnostic::error(
        function.location.clone(),
        format!(
            "Invalid function signature for an AWS lambda function: {}, it should be \
             'public function ({}:{}, anydata) returns json|error': {}",
            function.name, config.package, config.context_type, violation
        ),
    )
}
