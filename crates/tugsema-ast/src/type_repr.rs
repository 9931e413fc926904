//! Type references as written in source.

use serde::{Deserialize, Serialize};

use crate::ids::{DeclId, TypeReprId};
use crate::source::{SourceLoc, SourceRange};
use crate::Identifier;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRepr {
    pub kind: TypeReprKind,
    pub loc: Option<SourceLoc>,
    pub range: Option<SourceRange>,
}

impl TypeRepr {
    pub fn new(kind: TypeReprKind, range: Option<SourceRange>) -> Self {
        TypeRepr {
            kind,
            loc: range.map(|r| r.start),
            range,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeReprKind {
    /// `Name` or `Name<Args>`
    Ident {
        name: Identifier,
        name_loc: Option<SourceLoc>,
        /// Entity the name resolved to: a type declaration or a module.
        bound: Option<DeclId>,
        #[serde(default)]
        generic_args: Vec<TypeReprId>,
    },
    /// `A.B.C`, each component an `Ident`.
    Compound {
        components: Vec<TypeReprId>,
    },
    Tuple {
        elements: Vec<TypeReprId>,
    },
    Function {
        params: Vec<TypeReprId>,
        result: TypeReprId,
    },
    Array {
        element: TypeReprId,
    },
    Dictionary {
        key: TypeReprId,
        value: TypeReprId,
    },
    Optional {
        wrapped: TypeReprId,
    },
    /// `A & B`
    Composition {
        types: Vec<TypeReprId>,
    },
    /// `@escaping T`, `inout T`, ...
    Attributed {
        attrs: Vec<String>,
        base: TypeReprId,
    },
}
