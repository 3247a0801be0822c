// This module implements the registration pipeline, the analysis phase of a build. It scans
// every top-level function for the handler annotation in declaration order, validates each
// candidate's signature (failures become diagnostics and the candidate is skipped), resolves
// the dispatcher package, synthesizes one proxy per valid handler and then the entry point
// that registers them all and starts processing. The phase produces a ProgramEdit plus the
// GeneratedHandlers list; the latter is handed explicitly to the packaging phase instead of
// living in process-wide state, so two builds in one process never see each other's handlers.

//! Handler discovery, validation and registration.

use crate::codegen::entry_point::Registration;
use crate::codegen::{locate_entry_point, synthesize_entry_point, synthesize_proxy};
use crate::core::{Diagnostic, DiagnosticLog, DispatcherConfig, GenError, GenResult};
use crate::program::{
    rewrite_documents, DocumentId, FuncId, Function, Mutation, Program, ProgramEdit, SourceCommit,
    Stmt,
};
use crate::validate::{signature_diagnostic, validate_handler};

/// Names of the handlers registered by one analysis run, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedHandlers {
    names: Vec<String>,
}

impl GeneratedHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: impl Into<String>) {
        self.names.push(name.into());
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisStats {
    /// Functions carrying the handler annotation.
    pub candidates: usize,
    pub rejected: usize,
    pub registered: usize,
}

/// Result of the analysis phase.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub edit: ProgramEdit,
    pub generated: GeneratedHandlers,
    pub diagnostics: DiagnosticLog,
    pub stats: AnalysisStats,
}

/// Functions annotated as handlers, in declaration order.
pub fn discover_handlers(program: &Program, config: &DispatcherConfig) -> Vec<FuncId> {
    program
        .functions()
        .filter(|(_, f)| f.has_annotation(&config.org, &config.package, &config.annotation))
        .map(|(id, _)| id)
        .collect()
}

/// Run discovery, validation and synthesis without touching the program.
pub fn analyze(program: &Program, config: &DispatcherConfig) -> GenResult<Analysis> {
    let mut analysis = Analysis::default();
    let candidates = discover_handlers(program, config);
    analysis.stats.candidates = candidates.len();

    let mut handlers: Vec<(FuncId, &Function)> = Vec::with_capacity(candidates.len());
    for id in candidates {
        let function = program
            .function(id)
            .ok_or(GenError::UnknownFunction { id: id.0 })?;
        match validate_handler(program, function, config) {
            Ok(()) => handlers.push((id, function)),
            Err(violation) => {
                log::warn!("skipping handler {}: {}", function.name, violation);
                analysis.stats.rejected += 1;
                analysis
                    .diagnostics
                    .log(signature_diagnostic(function, &violation, config));
            }
        }
    }

    if handlers.is_empty() {
        log::debug!("no valid handlers; program left unchanged");
        return Ok(analysis);
    }

    // The annotation resolved to this package, so the import has to be there.
    let dispatcher = program
        .import_of(&config.org, &config.package)
        .ok_or_else(|| GenError::DispatcherPackageUnresolved {
            org: config.org.clone(),
            package: config.package.clone(),
        })?;

    let existing_entry = match locate_entry_point(program, config) {
        Ok(entry) => entry,
        Err(conflict) => {
            log::warn!("not registering handlers: {conflict}");
            analysis
                .diagnostics
                .log(Diagnostic::error(conflict.location().clone(), conflict.to_string()));
            return Ok(analysis);
        }
    };
    if let Some(main) = existing_entry.and_then(|id| program.function(id)) {
        if main.body.iter().any(|s| matches!(s, Stmt::Source(_))) {
            analysis.diagnostics.log(Diagnostic::warning(
                main.location.clone(),
                format!(
                    "statements in '{}' are replaced by the generated handler registration",
                    main.name
                ),
            ));
        }
    }

    let mut proxies = Vec::with_capacity(handlers.len());
    for &(id, handler) in &handlers {
        let proxy = synthesize_proxy(program, handler, config);
        let mutation = match program.find_function(&proxy.name) {
            Some(existing) => Mutation::ReplaceFunction {
                function: existing,
                replacement: proxy.clone(),
            },
            None => Mutation::AddFunction {
                document: program.document_of(id).unwrap_or(DocumentId(0)),
                function: proxy.clone(),
            },
        };
        analysis.edit.push(mutation);
        proxies.push(proxy);
    }

    let registrations: Vec<Registration<'_>> = handlers
        .iter()
        .zip(&proxies)
        .map(|(&(_, handler), proxy)| Registration { handler, proxy })
        .collect();
    let entry_document = program
        .document_of(handlers[0].0)
        .unwrap_or(DocumentId(0));
    let entry = synthesize_entry_point(
        program,
        dispatcher,
        &registrations,
        existing_entry,
        entry_document,
        config,
        &mut analysis.generated,
    )?;
    analysis.edit.push(entry);

    analysis.stats.registered = analysis.generated.len();
    log::info!(
        "registered {} handler(s): {}",
        analysis.generated.len(),
        analysis.generated.names().join(", ")
    );
    Ok(analysis)
}

/// Analyze, apply the edit, and commit the rendered source of every document.
///
/// When no handler is registered the program is not touched at all.
pub fn run(program: &mut Program, config: &DispatcherConfig) -> GenResult<Analysis> {
    let analysis = analyze(program, config)?;
    if analysis.edit.is_empty() {
        return Ok(analysis);
    }
    program.apply(analysis.edit.clone())?;
    *program = rewrite_documents(program, &mut SourceCommit);
    Ok(analysis)
}
