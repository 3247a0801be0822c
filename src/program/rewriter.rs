//! Whole-program function rewriting.
//!
//! [`rewrite_documents`] walks every document in order, hands each function
//! declaration to a [`TreeVisitor`], and commits the rendered source of the
//! transformed document. The input program is not modified; a new program is
//! returned.

use super::{Function, Program};

/// One capability per node kind. Only function declarations are visited today.
pub trait TreeVisitor {
    fn transform_function(&mut self, function: Function) -> Function {
        function
    }
}

/// Leaves every function unchanged; rewriting with it only commits rendered source.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceCommit;

impl TreeVisitor for SourceCommit {}

pub fn rewrite_documents<V>(program: &Program, visitor: &mut V) -> Program
where
    V: TreeVisitor + ?Sized,
{
    let mut rewritten = program.clone();
    let documents: Vec<_> = program
        .documents()
        .map(|(id, doc)| (id, doc.functions.clone()))
        .collect();

    for (doc_id, functions) in documents {
        for func_id in functions {
            if let Some(slot) = rewritten.function_mut(func_id) {
                let original = slot.clone();
                *slot = visitor.transform_function(original);
            }
        }
        let source = rewritten.render_document(doc_id);
        log::trace!("committing {} bytes to document #{}", source.len(), doc_id.0);
        rewritten.set_document_source(doc_id, source);
    }
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Location;
    use crate::program::PackageId;

    struct Suffixer {
        seen: Vec<String>,
    }

    impl TreeVisitor for Suffixer {
        fn transform_function(&mut self, mut function: Function) -> Function {
            self.seen.push(function.name.clone());
            function.name.push_str("_v2");
            function
        }
    }

    fn sample() -> Program {
        let mut program = Program::new(PackageId::new("acme", "app"));
        let a = program.add_document("a.bal", "function a() {}");
        let b = program.add_document("b.bal", "function b() {}\nfunction c() {}");
        program.add_function(a, Function::new("a", Location::default())).unwrap();
        program.add_function(b, Function::new("b", Location::default())).unwrap();
        program.add_function(b, Function::new("c", Location::default())).unwrap();
        program
    }

    #[test]
    fn test_visits_in_document_order_and_commits_source() {
        let program = sample();
        let mut visitor = Suffixer { seen: Vec::new() };
        let rewritten = rewrite_documents(&program, &mut visitor);

        assert_eq!(visitor.seen, vec!["a", "b", "c"]);
        let sources: Vec<&str> = rewritten.documents().map(|(_, d)| d.source.as_str()).collect();
        assert_eq!(sources[0], "function a_v2() {\n}\n");
        assert_eq!(sources[1], "function b_v2() {\n}\n\nfunction c_v2() {\n}\n");

        // The input is left alone.
        assert_eq!(program.function(crate::program::FuncId(0)).unwrap().name, "a");
        assert_eq!(program.documents().next().unwrap().1.source, "function a() {}");
    }

    #[test]
    fn test_source_commit_keeps_functions() {
        let program = sample();
        let rewritten = rewrite_documents(&program, &mut SourceCommit);
        let names: Vec<&str> = rewritten.functions().map(|(_, f)| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
