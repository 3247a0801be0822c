// This module provides the low-level constructors for synthesized program fragments: string
// literals, type-descriptor expressions, references to parameters and package functions,
// invocations against resolved symbols, return and expression statements, blocks, and
// virtual functions with a given signature. Every constructor returns a plain value; nothing
// is attached to a program until the pipeline applies its edit. The proxy and entry point
// synthesizers in the submodules are built entirely from these primitives.

//! Synthesis primitives for generated code.

use crate::core::{GenError, GenResult, Location};
use crate::program::{Expr, Function, Import, Invocation, Origin, Param, Stmt, Symbol, TypeDesc, VarTarget};

pub mod entry_point;
pub mod proxy;

pub use entry_point::{locate_entry_point, synthesize_entry_point, EntryPointConflict};
pub use proxy::synthesize_proxy;

pub fn string_literal(value: impl Into<String>) -> Expr {
    Expr::StringLiteral(value.into())
}

pub fn typedesc_expr(ty: TypeDesc) -> Expr {
    Expr::TypeDesc(ty)
}

/// Reference to parameter `index` of `function`.
///
/// Returns `None` when the function has no such parameter.
pub fn param_ref(function: &Function, index: usize) -> Option<Expr> {
    function.params.get(index).map(|param| Expr::VarRef {
        name: param.name.clone(),
        target: VarTarget::Param(index),
    })
}

/// Reference to a package-level function used as a value.
pub fn function_ref(symbol: Symbol) -> Expr {
    Expr::VarRef {
        name: symbol.name.clone(),
        target: VarTarget::Function(symbol),
    }
}

pub fn invocation(prefix: Option<&str>, target: Symbol, args: Vec<Expr>, ty: TypeDesc) -> Expr {
    Expr::Invocation(Invocation {
        prefix: prefix.map(str::to_string),
        name: target.name.clone(),
        target,
        args,
        ty,
    })
}

/// Call `name` from an imported package, resolving it in the package's scope.
pub fn package_invocation(
    import: &Import,
    name: &str,
    args: Vec<Expr>,
    ty: TypeDesc,
) -> GenResult<Expr> {
    let symbol = import
        .lookup(name)
        .cloned()
        .ok_or_else(|| GenError::DispatcherSymbolUnresolved {
            package: import.package.to_string(),
            symbol: name.to_string(),
        })?;
    Ok(invocation(Some(&import.prefix), symbol, args, ty))
}

pub fn expression_stmt(expr: Expr) -> Stmt {
    Stmt::Expr(expr)
}

pub fn return_stmt(expr: Expr) -> Stmt {
    Stmt::Return(expr)
}

pub fn block(stmts: impl IntoIterator<Item = Stmt>) -> Vec<Stmt> {
    stmts.into_iter().collect()
}

/// A public, virtual function with the given signature and an empty body.
pub fn function(
    name: impl Into<String>,
    location: Location,
    params: Vec<Param>,
    return_type: Option<TypeDesc>,
) -> Function {
    let mut func = Function::new(name, location);
    func.public = true;
    func.params = params;
    func.return_type = return_type;
    func.origin = Origin::Virtual;
    func
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::PackageId;

    #[test]
    fn test_package_invocation_resolves_in_scope() {
        let import = Import::with_prefix(PackageId::new("ballerinax", "awslambda"), "aws")
            .export("__process");

        let Expr::Invocation(inv) =
            package_invocation(&import, "__process", Vec::new(), TypeDesc::Nil).unwrap()
        else {
            panic!("expected invocation");
        };
        assert_eq!(inv.prefix.as_deref(), Some("aws"));
        assert_eq!(inv.target.package, PackageId::new("ballerinax", "awslambda"));
        assert!(inv.args.is_empty());

        let err = package_invocation(&import, "__register", Vec::new(), TypeDesc::Nil).unwrap_err();
        assert!(matches!(err, GenError::DispatcherSymbolUnresolved { .. }));
    }

    #[test]
    fn test_function_is_public_and_virtual() {
        let f = function(
            "gen",
            Location::default(),
            vec![Param::new("x", TypeDesc::Int)],
            None,
        );
        assert!(f.public);
        assert_eq!(f.origin, Origin::Virtual);
        assert_eq!(param_ref(&f, 0), Some(Expr::VarRef {
            name: "x".to_string(),
            target: VarTarget::Param(0),
        }));
        assert_eq!(param_ref(&f, 1), None);
    }
}
