//! Source rendering for program documents.
//!
//! Output is canonical rather than faithful: imports first, then every
//! function of the document in order, separated by blank lines.

use std::fmt::Write as _;

use super::{
    Annotation, DocumentId, Expr, Function, Invocation, Param, PackageId, Program, Stmt, TypeDesc,
};

const INDENT: &str = "    ";

pub fn render_document(program: &Program, id: DocumentId) -> String {
    let mut out = String::new();
    let Some(document) = program.document(id) else {
        return out;
    };

    for import in program.imports() {
        let _ = write!(out, "import {}", import.package);
        if import.prefix != import.package.name {
            let _ = write!(out, " as {}", import.prefix);
        }
        out.push_str(";\n");
    }

    for &func_id in &document.functions {
        if let Some(function) = program.function(func_id) {
            if !out.is_empty() {
                out.push('\n');
            }
            render_function(program, function, &mut out);
        }
    }
    out
}

pub fn render_function(program: &Program, function: &Function, out: &mut String) {
    for annotation in &function.annotations {
        let _ = writeln!(out, "@{}", annotation_name(program, annotation));
    }
    if function.public {
        out.push_str("public ");
    }
    let _ = write!(out, "function {}(", function.name);

    let mut params: Vec<String> = function.params.iter().map(|p| render_param(program, p)).collect();
    if let Some(rest) = &function.rest_param {
        params.push(format!("{}... {}", render_type(program, &rest.ty), rest.name));
    }
    out.push_str(&params.join(", "));
    out.push(')');

    if let Some(ret) = &function.return_type {
        let _ = write!(out, " returns {}", render_type(program, ret));
    }
    out.push_str(" {\n");
    for stmt in &function.body {
        out.push_str(INDENT);
        out.push_str(&render_stmt(program, stmt));
        out.push('\n');
    }
    out.push_str("}\n");
}

fn render_param(program: &Program, param: &Param) -> String {
    let mut text = format!("{} {}", render_type(program, &param.ty), param.name);
    if let Some(default) = &param.default {
        let _ = write!(text, " = {default}");
    }
    text
}

pub fn render_stmt(program: &Program, stmt: &Stmt) -> String {
    match stmt {
        Stmt::Expr(expr) => format!("{};", render_expr(program, expr)),
        Stmt::Return(expr) => format!("return {};", render_expr(program, expr)),
        Stmt::Source(text) => text.clone(),
    }
}

pub fn render_expr(program: &Program, expr: &Expr) -> String {
    match expr {
        Expr::StringLiteral(value) => {
            let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
            format!("\"{escaped}\"")
        }
        Expr::VarRef { name, .. } => name.clone(),
        Expr::TypeDesc(ty) => render_type(program, ty),
        Expr::Invocation(inv) => render_invocation(program, inv),
    }
}

fn render_invocation(program: &Program, inv: &Invocation) -> String {
    let args: Vec<String> = inv.args.iter().map(|a| render_expr(program, a)).collect();
    match &inv.prefix {
        Some(prefix) => format!("{prefix}:{}({})", inv.name, args.join(", ")),
        None => format!("{}({})", inv.name, args.join(", ")),
    }
}

pub fn render_type(program: &Program, ty: &TypeDesc) -> String {
    if let Some(name) = ty.builtin_name() {
        return name.to_string();
    }
    match ty {
        TypeDesc::Named { package, name } => qualified(program, package, name),
        TypeDesc::Union(members) => members
            .iter()
            .map(|m| render_type(program, m))
            .collect::<Vec<_>>()
            .join("|"),
        TypeDesc::Array(element) => match element.as_ref() {
            TypeDesc::Union(_) => format!("({})[]", render_type(program, element)),
            _ => format!("{}[]", render_type(program, element)),
        },
        TypeDesc::Map(element) => format!("map<{}>", render_type(program, element)),
        TypeDesc::Record(text) | TypeDesc::Unresolved(text) => text.clone(),
        _ => String::new(),
    }
}

fn annotation_name(program: &Program, annotation: &Annotation) -> String {
    qualified(program, &annotation.package, &annotation.name)
}

fn qualified(program: &Program, package: &PackageId, name: &str) -> String {
    if *package == program.package {
        return name.to_string();
    }
    match program.import_of(&package.org, &package.name) {
        Some(import) => format!("{}:{}", import.prefix, name),
        None => format!("{}/{}:{}", package.org, package.name, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Location;
    use crate::program::{Import, VarTarget, Symbol};

    #[test]
    fn test_render_annotated_function() {
        let lambda = PackageId::new("ballerinax", "awslambda");
        let mut program = Program::new(PackageId::new("acme", "app"));
        program.add_import(Import::with_prefix(lambda.clone(), "aws"));
        let doc = program.add_document("main.bal", "");

        let mut func = Function::new("echo", Location::default());
        func.public = true;
        func.annotations.push(Annotation {
            package: lambda.clone(),
            name: "Function".to_string(),
        });
        func.params.push(Param::new("ctx", TypeDesc::named(lambda.clone(), "Context")));
        func.params.push(Param::new("input", TypeDesc::Json));
        func.return_type = Some(TypeDesc::union(vec![TypeDesc::Json, TypeDesc::Error]));
        func.body.push(Stmt::Expr(Expr::Invocation(Invocation {
            prefix: Some("aws".to_string()),
            name: "__register".to_string(),
            target: Symbol::new(lambda, "__register"),
            args: vec![
                Expr::StringLiteral("say \"hi\"".to_string()),
                Expr::VarRef {
                    name: "input".to_string(),
                    target: VarTarget::Param(1),
                },
            ],
            ty: TypeDesc::Nil,
        })));
        program.add_function(doc, func).unwrap();

        let text = program.render_document(doc);
        assert_eq!(
            text,
            "import ballerinax/awslambda as aws;\n\n\
             @aws:Function\n\
             public function echo(aws:Context ctx, json input) returns json|error {\n\
             \x20   aws:__register(\"say \\\"hi\\\"\", input);\n\
             }\n"
        );
    }

    #[test]
    fn test_render_structured_types() {
        let program = Program::new(PackageId::new("acme", "app"));
        let order = TypeDesc::named(PackageId::new("acme", "app"), "Order");
        let cases = [
            (TypeDesc::Array(Box::new(TypeDesc::Json)), "json[]"),
            (TypeDesc::Array(Box::new(TypeDesc::Array(Box::new(order)))), "Order[][]"),
            (
                TypeDesc::Array(Box::new(TypeDesc::union(vec![TypeDesc::Int, TypeDesc::String]))),
                "(int|string)[]",
            ),
            (TypeDesc::Map(Box::new(TypeDesc::Json)), "map<json>"),
            (TypeDesc::Xml, "xml"),
            (TypeDesc::Record("record {| string a; |}".into()), "record {| string a; |}"),
        ];
        for (ty, expected) in cases {
            assert_eq!(render_type(&program, &ty), expected);
        }
    }
}
