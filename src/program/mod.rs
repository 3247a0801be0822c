// This module defines the in-memory program model the generator walks and edits. A Program
// owns every function in a flat arena addressed by FuncId, groups them into documents by id,
// and carries the imports (each with the symbol scope of the imported package) used to
// resolve annotations, types and dispatcher entry points. Nodes never point back at their
// owners: a function knows its document only through the document's id list, and symbols
// are plain (package, name) values. Changes are described as immutable Mutation records
// collected in a ProgramEdit and applied in one step, so analysis can run against a shared
// borrow of the program and the caller decides when to commit.

//! Program model: documents, functions, imports and the edits applied to them.
//!
//! # Layout
//!
//! ```text
//! Program
//!  ├─ imports[]      Import { package, prefix, scope }
//!  ├─ documents[]    Document { name, functions: [FuncId], source }
//!  └─ functions[]    arena, addressed by FuncId
//! ```

use hashbrown::HashMap;

use crate::core::{GenError, GenResult, Location};

pub mod printer;
pub mod rewriter;
pub mod types;

pub use rewriter::{rewrite_documents, SourceCommit, TreeVisitor};
pub use types::{PackageId, TypeDesc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FuncId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u32);

/// A package-level symbol: owning package plus name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub package: PackageId,
    pub name: String,
}

impl Symbol {
    pub fn new(package: PackageId, name: impl Into<String>) -> Self {
        Self {
            package,
            name: name.into(),
        }
    }
}

/// An import declaration together with the imported package's symbol table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub package: PackageId,
    pub prefix: String,
    scope: HashMap<String, Symbol>,
}

impl Import {
    /// Import using the package name as prefix.
    pub fn new(package: PackageId) -> Self {
        let prefix = package.name.clone();
        Self::with_prefix(package, prefix)
    }

    pub fn with_prefix(package: PackageId, prefix: impl Into<String>) -> Self {
        Self {
            package,
            prefix: prefix.into(),
            scope: HashMap::new(),
        }
    }

    pub fn export(mut self, name: impl Into<String>) -> Self {
        self.define(name);
        self
    }

    pub fn define(&mut self, name: impl Into<String>) {
        let name = name.into();
        let symbol = Symbol::new(self.package.clone(), name.clone());
        self.scope.insert(name, symbol);
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scope.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub package: PackageId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: TypeDesc,
    /// Default value expression; present only for defaultable parameters.
    pub default: Option<String>,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeDesc) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    pub fn is_defaultable(&self) -> bool {
        self.default.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Written by the user.
    Source,
    /// Synthesized by the generator.
    Virtual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub public: bool,
    pub annotations: Vec<Annotation>,
    pub params: Vec<Param>,
    pub rest_param: Option<Param>,
    /// `None` when the function declares no return type.
    pub return_type: Option<TypeDesc>,
    pub body: Vec<Stmt>,
    pub location: Location,
    pub origin: Origin,
}

impl Function {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            public: false,
            annotations: Vec::new(),
            params: Vec::new(),
            rest_param: None,
            return_type: None,
            body: Vec::new(),
            location,
            origin: Origin::Source,
        }
    }

    pub fn required_params(&self) -> impl Iterator<Item = &Param> {
        self.params.iter().filter(|p| !p.is_defaultable())
    }

    pub fn defaultable_params(&self) -> impl Iterator<Item = &Param> {
        self.params.iter().filter(|p| p.is_defaultable())
    }

    pub fn has_annotation(&self, org: &str, package: &str, name: &str) -> bool {
        self.annotations
            .iter()
            .any(|a| a.package.matches(org, package) && a.name == name)
    }

    /// Declared return type; an absent declaration means `()`.
    pub fn declared_return(&self) -> TypeDesc {
        self.return_type.clone().unwrap_or(TypeDesc::Nil)
    }
}

/// What a variable reference resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarTarget {
    /// Parameter of the enclosing function, by position.
    Param(usize),
    /// A package-level function used as a value.
    Function(Symbol),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Module prefix written in front of the call, if any.
    pub prefix: Option<String>,
    pub name: String,
    pub target: Symbol,
    pub args: Vec<Expr>,
    /// Result type of the call.
    pub ty: TypeDesc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    StringLiteral(String),
    VarRef { name: String, target: VarTarget },
    TypeDesc(TypeDesc),
    Invocation(Invocation),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Expr(Expr),
    Return(Expr),
    /// A user statement carried through verbatim.
    Source(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub functions: Vec<FuncId>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    AddFunction {
        document: DocumentId,
        function: Function,
    },
    ReplaceBody {
        function: FuncId,
        body: Vec<Stmt>,
    },
    /// Swap a whole function in place, keeping its id and document position.
    ReplaceFunction {
        function: FuncId,
        replacement: Function,
    },
}

/// Ordered list of mutations produced by analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramEdit {
    mutations: Vec<Mutation>,
}

impl ProgramEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mutation> {
        self.mutations.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub package: PackageId,
    imports: Vec<Import>,
    types: Vec<String>,
    documents: Vec<Document>,
    functions: Vec<Function>,
}

impl Program {
    pub fn new(package: PackageId) -> Self {
        Self {
            package,
            imports: Vec::new(),
            types: Vec::new(),
            documents: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn add_import(&mut self, import: Import) {
        self.imports.push(import);
    }

    pub fn imports(&self) -> &[Import] {
        &self.imports
    }

    /// Import of the package identified by `org`/`name`.
    pub fn import_of(&self, org: &str, name: &str) -> Option<&Import> {
        self.imports.iter().find(|i| i.package.matches(org, name))
    }

    pub fn import_by_prefix(&self, prefix: &str) -> Option<&Import> {
        self.imports.iter().find(|i| i.prefix == prefix)
    }

    pub fn declare_type(&mut self, name: impl Into<String>) {
        self.types.push(name.into());
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.types.iter().any(|t| t == name)
    }

    pub fn add_document(&mut self, name: impl Into<String>, source: impl Into<String>) -> DocumentId {
        let id = DocumentId(self.documents.len() as u32);
        self.documents.push(Document {
            name: name.into(),
            functions: Vec::new(),
            source: source.into(),
        });
        id
    }

    pub fn add_function(&mut self, document: DocumentId, function: Function) -> GenResult<FuncId> {
        let id = FuncId(self.functions.len() as u32);
        let doc = self
            .documents
            .get_mut(document.0 as usize)
            .ok_or(GenError::UnknownDocument { id: document.0 })?;
        doc.functions.push(id);
        self.functions.push(function);
        Ok(id)
    }

    pub fn function(&self, id: FuncId) -> Option<&Function> {
        self.functions.get(id.0 as usize)
    }

    pub(crate) fn function_mut(&mut self, id: FuncId) -> Option<&mut Function> {
        self.functions.get_mut(id.0 as usize)
    }

    /// All functions in declaration order: document order, then position in the document.
    pub fn functions(&self) -> impl Iterator<Item = (FuncId, &Function)> + '_ {
        self.documents
            .iter()
            .flat_map(|doc| doc.functions.iter())
            .map(move |&id| (id, &self.functions[id.0 as usize]))
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn find_function(&self, name: &str) -> Option<FuncId> {
        self.functions()
            .find(|(_, f)| f.name == name)
            .map(|(id, _)| id)
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(id.0 as usize)
    }

    pub fn documents(&self) -> impl Iterator<Item = (DocumentId, &Document)> {
        self.documents
            .iter()
            .enumerate()
            .map(|(i, doc)| (DocumentId(i as u32), doc))
    }

    pub fn document_of(&self, function: FuncId) -> Option<DocumentId> {
        self.documents()
            .find(|(_, doc)| doc.functions.contains(&function))
            .map(|(id, _)| id)
    }

    pub(crate) fn set_document_source(&mut self, id: DocumentId, source: String) {
        if let Some(doc) = self.documents.get_mut(id.0 as usize) {
            doc.source = source;
        }
    }

    /// Render a document's imports and functions back to source text.
    pub fn render_document(&self, id: DocumentId) -> String {
        printer::render_document(self, id)
    }

    /// Apply an edit. All targets are checked before anything changes.
    ///
    /// Returns the ids of the functions added, in edit order.
    pub fn apply(&mut self, edit: ProgramEdit) -> GenResult<Vec<FuncId>> {
        for mutation in edit.iter() {
            match mutation {
                Mutation::AddFunction { document, .. } => {
                    if self.document(*document).is_none() {
                        return Err(GenError::UnknownDocument { id: document.0 });
                    }
                }
                Mutation::ReplaceBody { function, .. }
                | Mutation::ReplaceFunction { function, .. } => {
                    if self.function(*function).is_none() {
                        return Err(GenError::UnknownFunction { id: function.0 });
                    }
                }
            }
        }

        let mut added = Vec::new();
        for mutation in edit.mutations {
            match mutation {
                Mutation::AddFunction { document, function } => {
                    log::trace!("adding function {}", function.name);
                    added.push(self.add_function(document, function)?);
                }
                Mutation::ReplaceBody { function, body } => {
                    let target = self
                        .function_mut(function)
                        .ok_or(GenError::UnknownFunction { id: function.0 })?;
                    log::trace!("replacing body of {}", target.name);
                    target.body = body;
                }
                Mutation::ReplaceFunction {
                    function,
                    replacement,
                } => {
                    let target = self
                        .function_mut(function)
                        .ok_or(GenError::UnknownFunction { id: function.0 })?;
                    log::trace!("replacing function {}", target.name);
                    *target = replacement;
                }
            }
        }
        Ok(added)
    }
}
