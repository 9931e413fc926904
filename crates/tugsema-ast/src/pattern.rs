//! Patterns.

use serde::{Deserialize, Serialize};

use crate::ids::{DeclId, ExprId, PatternId, TypeId, TypeReprId};
use crate::source::SourceLoc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub kind: PatternKind,
    pub loc: Option<SourceLoc>,
    #[serde(default)]
    pub implicit: bool,
    #[serde(default)]
    pub ty: Option<TypeId>,
}

impl Pattern {
    pub fn new(kind: PatternKind, loc: Option<SourceLoc>) -> Self {
        Pattern {
            kind,
            loc,
            implicit: false,
            ty: None,
        }
    }

    pub fn implicit(mut self) -> Self {
        self.implicit = true;
        self
    }

    pub fn with_type(mut self, ty: TypeId) -> Self {
        self.ty = Some(ty);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingIntroducer {
    Let,
    Var,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Binds a variable.
    Named {
        var: DeclId,
    },
    /// `_`
    Any,
    /// `sub: Type`
    Typed {
        sub: PatternId,
        type_repr: Option<TypeReprId>,
        /// The annotation was copied from elsewhere rather than written here.
        #[serde(default)]
        propagated: bool,
    },
    Tuple {
        elements: Vec<PatternId>,
    },
    Paren {
        sub: PatternId,
    },
    /// `.case(sub)` or `Type.case(sub)`
    EnumElement {
        parent_type: Option<TypeReprId>,
        element: Option<DeclId>,
        sub: Option<PatternId>,
    },
    /// Matches by `~=` against an expression.
    Expr {
        expr: ExprId,
    },
    Binding {
        introducer: BindingIntroducer,
        sub: PatternId,
    },
    /// `is Type` or `sub as Type`
    Is {
        cast_type: Option<TypeReprId>,
        sub: Option<PatternId>,
    },
    Bool {
        value: bool,
    },
    /// `sub?`
    OptionalSome {
        sub: PatternId,
    },
}
