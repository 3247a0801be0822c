//! Package identities and resolved type descriptors.

use std::fmt;

/// Organization-qualified package identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageId {
    pub org: String,
    pub name: String,
    pub version: String,
}

impl PackageId {
    pub fn new(org: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            name: name.into(),
            version: "0.0.0".to_string(),
        }
    }

    /// Organization and package name match; the version is not compared.
    pub fn matches(&self, org: &str, name: &str) -> bool {
        self.org == org && self.name == name
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org, self.name)
    }
}

/// A declared type after resolution against the program's imports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    Json,
    Error,
    /// The "no value" type `()`.
    Nil,
    Anydata,
    String,
    Int,
    Float,
    Boolean,
    Decimal,
    Byte,
    /// A type defined by a package, identified by its owner and name.
    Named { package: PackageId, name: String },
    Union(Vec<TypeDesc>),
    /// `T[]`
    Array(Box<TypeDesc>),
    /// `map<T>`
    Map(Box<TypeDesc>),
    Xml,
    /// Structural record type, kept as written.
    Record(String),
    /// A name that did not resolve to any known type.
    Unresolved(String),
}

impl TypeDesc {
    pub fn builtin(name: &str) -> Option<Self> {
        let ty = match name {
            "json" => TypeDesc::Json,
            "error" => TypeDesc::Error,
            "()" => TypeDesc::Nil,
            "anydata" => TypeDesc::Anydata,
            "string" => TypeDesc::String,
            "int" => TypeDesc::Int,
            "float" => TypeDesc::Float,
            "boolean" => TypeDesc::Boolean,
            "decimal" => TypeDesc::Decimal,
            "byte" => TypeDesc::Byte,
            "xml" => TypeDesc::Xml,
            _ => return None,
        };
        Some(ty)
    }

    pub fn builtin_name(&self) -> Option<&'static str> {
        let name = match self {
            TypeDesc::Json => "json",
            TypeDesc::Error => "error",
            TypeDesc::Nil => "()",
            TypeDesc::Anydata => "anydata",
            TypeDesc::String => "string",
            TypeDesc::Int => "int",
            TypeDesc::Float => "float",
            TypeDesc::Boolean => "boolean",
            TypeDesc::Decimal => "decimal",
            TypeDesc::Byte => "byte",
            TypeDesc::Xml => "xml",
            _ => return None,
        };
        Some(name)
    }

    pub fn named(package: PackageId, name: impl Into<String>) -> Self {
        TypeDesc::Named {
            package,
            name: name.into(),
        }
    }

    /// Build a union, flattening nested unions. A single member is returned as is.
    pub fn union(members: Vec<TypeDesc>) -> Self {
        let mut flat = Vec::with_capacity(members.len());
        for member in members {
            match member {
                TypeDesc::Union(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            flat.remove(0)
        } else {
            TypeDesc::Union(flat)
        }
    }

    /// Members of this type, with nested unions flattened. A non-union type is its own member.
    pub fn members(&self) -> Vec<&TypeDesc> {
        match self {
            TypeDesc::Union(members) => members.iter().flat_map(|m| m.members()).collect(),
            other => vec![other],
        }
    }

    pub fn is_named(&self, org: &str, package: &str, name: &str) -> bool {
        match self {
            TypeDesc::Named { package: owner, name: type_name } => {
                owner.matches(org, package) && type_name == name
            }
            _ => false,
        }
    }

    /// No unresolved name appears anywhere in the type, element types included.
    pub fn is_resolved(&self) -> bool {
        self.members().iter().all(|m| match m {
            TypeDesc::Unresolved(_) => false,
            TypeDesc::Array(element) | TypeDesc::Map(element) => element.is_resolved(),
            _ => true,
        })
    }
}
