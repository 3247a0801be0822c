//! Entry point synthesis.
//!
//! The entry point body is owned by the generator once any handler exists:
//! one registration call per handler in discovery order, then exactly one
//! process call. Whatever the user wrote in `main` is discarded.

use thiserror::Error;

use crate::core::{DispatcherConfig, GenResult, Location};
use crate::pipeline::GeneratedHandlers;
use crate::program::{DocumentId, FuncId, Function, Import, Mutation, Program, Symbol, TypeDesc};

use super::{block, expression_stmt, function, function_ref, package_invocation, string_literal, typedesc_expr};

/// A validated handler paired with its proxy.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'a> {
    pub handler: &'a Function,
    pub proxy: &'a Function,
}

/// An existing function holds the entry point name but cannot be the entry point.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryPointConflict {
    #[error("function '{name}' is an AWS lambda function and cannot also be the entry point")]
    Handler { name: String, location: Location },

    #[error("function '{name}' takes parameters and cannot be the entry point")]
    Parameterized { name: String, location: Location },
}

impl EntryPointConflict {
    pub fn location(&self) -> &Location {
        match self {
            EntryPointConflict::Handler { location, .. }
            | EntryPointConflict::Parameterized { location, .. } => location,
        }
    }
}

/// The existing entry point, if any.
///
/// Only a parameterless function that is not itself a handler qualifies.
pub fn locate_entry_point(
    program: &Program,
    config: &DispatcherConfig,
) -> Result<Option<FuncId>, EntryPointConflict> {
    let Some(id) = program.find_function(&config.entry_point) else {
        return Ok(None);
    };
    let Some(existing) = program.function(id) else {
        return Ok(None);
    };
    if existing.has_annotation(&config.org, &config.package, &config.annotation) {
        return Err(EntryPointConflict::Handler {
            name: existing.name.clone(),
            location: existing.location.clone(),
        });
    }
    if !existing.params.is_empty() || existing.rest_param.is_some() {
        return Err(EntryPointConflict::Parameterized {
            name: existing.name.clone(),
            location: existing.location.clone(),
        });
    }
    Ok(Some(id))
}

/// Build the entry point mutation for `registrations`.
///
/// The body of `existing` is replaced when given; otherwise a new entry point
/// is added to `document`. Handler names are recorded in `generated` only once
/// the body has been built.
pub fn synthesize_entry_point(
    program: &Program,
    dispatcher: &Import,
    registrations: &[Registration<'_>],
    existing: Option<FuncId>,
    document: DocumentId,
    config: &DispatcherConfig,
    generated: &mut GeneratedHandlers,
) -> GenResult<Mutation> {
    let mut stmts = Vec::with_capacity(registrations.len() + 1);
    for reg in registrations {
        let proxy = Symbol::new(program.package.clone(), reg.proxy.name.clone());
        let args = vec![
            string_literal(reg.handler.name.clone()),
            function_ref(proxy),
            typedesc_expr(reg.handler.params[1].ty.clone()),
        ];
        let call = package_invocation(dispatcher, &config.register_function, args, TypeDesc::Nil)?;
        stmts.push(expression_stmt(call));
    }
    let process = package_invocation(dispatcher, &config.process_function, Vec::new(), TypeDesc::Nil)?;
    stmts.push(expression_stmt(process));
    let body = block(stmts);

    for reg in registrations {
        generated.record(reg.handler.name.clone());
    }

    match existing {
        Some(id) => {
            if let Some(main) = program.function(id) {
                log::debug!("clearing {} statements from {}", main.body.len(), main.name);
            }
            Ok(Mutation::ReplaceBody { function: id, body })
        }
        None => {
            let doc_name = program
                .document(document)
                .map(|d| d.name.clone())
                .unwrap_or_default();
            let mut main = function(
                config.entry_point.clone(),
                Location::new(doc_name, 0, 0),
                Vec::new(),
                None,
            );
            main.body = body;
            log::debug!("synthesized {} in document #{}", main.name, document.0);
            Ok(Mutation::AddFunction {
                document,
                function: main,
            })
        }
    }
}
