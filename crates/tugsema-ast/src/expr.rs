//! Expressions, argument lists and key-path components.

use serde::{Deserialize, Serialize};

use crate::ids::{DeclId, ExprId, StmtId, TypeId, TypeReprId};
use crate::source::{SourceLoc, SourceRange};
use crate::Identifier;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    /// Anchor location: the name for references, the operator for binary
    /// expressions, the open bracket for subscripts.
    pub loc: Option<SourceLoc>,
    pub range: Option<SourceRange>,
    #[serde(default)]
    pub implicit: bool,
    #[serde(default)]
    pub ty: Option<TypeId>,
}

impl Expr {
    pub fn new(kind: ExprKind, loc: Option<SourceLoc>, range: Option<SourceRange>) -> Self {
        Expr {
            kind,
            loc,
            range,
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
pub enum LiteralKind {
    Integer,
    Float,
    String,
    Boolean,
    Nil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Array,
    Dictionary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    /// A name resolved to a declaration.
    DeclRef {
        decl: DeclId,
        name_loc: Option<SourceLoc>,
    },
    /// `base.member`
    MemberRef {
        base: ExprId,
        member: DeclId,
        name_loc: Option<SourceLoc>,
    },
    /// `base.member` looked up dynamically.
    DynamicMemberRef {
        base: ExprId,
        member: DeclId,
        name_loc: Option<SourceLoc>,
    },
    /// `self.init` / `super.init` inside an initializer.
    OtherConstructorRef {
        decl: DeclId,
        ctor_loc: Option<SourceLoc>,
    },
    /// `base[args]`
    Subscript {
        base: ExprId,
        args: ArgumentList,
        decl: Option<DeclId>,
    },
    /// `\Root.path`
    KeyPath {
        root: Option<TypeReprId>,
        components: Vec<KeyPathComponent>,
    },
    /// `lhs op rhs`; `op` is the operator function reference.
    Binary {
        lhs: ExprId,
        op: ExprId,
        rhs: ExprId,
    },
    Assign {
        dest: Option<ExprId>,
        src: Option<ExprId>,
    },
    /// `&sub`
    InOut {
        sub: ExprId,
    },
    /// Lvalue-to-rvalue conversion.
    Load {
        sub: ExprId,
    },
    /// Opens `existential` as `opaque_value` while evaluating `sub`.
    OpenExistential {
        opaque_value: ExprId,
        existential: ExprId,
        sub: ExprId,
    },
    /// Placeholder for a value bound by an enclosing construct.
    OpaqueValue,
    /// `withoutActuallyEscaping(closure) { body }`; `sub` is the call of the
    /// body with `opaque_value`.
    MakeTemporarilyEscapable {
        nonescaping_closure: ExprId,
        opaque_value: ExprId,
        sub: ExprId,
    },
    CollectionUpcast {
        sub: ExprId,
    },
    Literal {
        kind: LiteralKind,
        /// Initializer used to build the literal's type, if not builtin.
        initializer: Option<DeclId>,
    },
    Collection {
        kind: CollectionKind,
        elements: Vec<ExprId>,
        initializer: Option<DeclId>,
    },
    Call {
        func: ExprId,
        args: ArgumentList,
    },
    /// `base.method` applied to its base.
    DotSyntaxCall {
        func: ExprId,
        base: ExprId,
    },
    /// `Type.init` applied to the type.
    ConstructorRefCall {
        func: ExprId,
        base: ExprId,
    },
    AutoClosure {
        body: ExprId,
        /// Original expression when this closure is a synthesized curry thunk.
        curry_thunk: Option<ExprId>,
    },
    Closure {
        params: Vec<DeclId>,
        body: StmtId,
    },
    /// A type used as a value.
    Type {
        repr: Option<TypeReprId>,
    },
    Paren {
        sub: ExprId,
    },
    Tuple {
        elements: Vec<ExprId>,
    },
    Ternary {
        condition: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
    },
    Try {
        sub: ExprId,
    },
    Await {
        sub: ExprId,
    },
    ForceValue {
        sub: ExprId,
    },
    /// `sub as Type`
    Coerce {
        sub: ExprId,
        cast_type: Option<TypeReprId>,
    },
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub label: Option<Identifier>,
    pub label_loc: Option<SourceLoc>,
    pub expr: ExprId,
}

impl Argument {
    pub fn unlabeled(expr: ExprId) -> Self {
        Argument {
            label: None,
            label_loc: None,
            expr,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentList {
    pub args: Vec<Argument>,
    #[serde(default)]
    pub implicit: bool,
    #[serde(default)]
    pub l_bracket: Option<SourceLoc>,
    #[serde(default)]
    pub r_bracket: Option<SourceLoc>,
}

impl ArgumentList {
    pub fn new(args: Vec<Argument>) -> Self {
        ArgumentList {
            args,
            ..Default::default()
        }
    }

    pub fn implicit(mut self) -> Self {
        self.implicit = true;
        self
    }

    pub fn with_brackets(mut self, l_bracket: SourceLoc, r_bracket: SourceLoc) -> Self {
        self.l_bracket = Some(l_bracket);
        self.r_bracket = Some(r_bracket);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPathComponent {
    pub kind: KeyPathComponentKind,
    pub loc: Option<SourceLoc>,
    #[serde(default)]
    pub ty: Option<TypeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPathComponentKind {
    Property { decl: DeclId },
    Subscript { decl: DeclId, args: ArgumentList },
    TupleElement { index: u32 },
    OptionalChain,
    OptionalWrap,
    OptionalForce,
    Identity,
    DictionaryKey,
    Invalid,
    UnresolvedProperty { name: Identifier },
    UnresolvedSubscript { args: ArgumentList },
    CodeCompletion,
}

impl KeyPathComponentKind {
    /// Member resolved by this component, for property and subscript components.
    pub fn resolved_decl(&self) -> Option<DeclId> {
        match self {
            KeyPathComponentKind::Property { decl }
            | KeyPathComponentKind::Subscript { decl, .. } => Some(*decl),
            KeyPathComponentKind::TupleElement { .. }
            | KeyPathComponentKind::OptionalChain
            | KeyPathComponentKind::OptionalWrap
            | KeyPathComponentKind::OptionalForce
            | KeyPathComponentKind::Identity
            | KeyPathComponentKind::DictionaryKey
            | KeyPathComponentKind::Invalid
            | KeyPathComponentKind::UnresolvedProperty { .. }
            | KeyPathComponentKind::UnresolvedSubscript { .. }
            | KeyPathComponentKind::CodeCompletion => None,
        }
    }

    /// Argument list carried by subscript components.
    pub fn args(&self) -> Option<&ArgumentList> {
        match self {
            KeyPathComponentKind::Subscript { args, .. }
            | KeyPathComponentKind::UnresolvedSubscript { args } => Some(args),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_property_and_subscript_components_resolve() {
        let prop = KeyPathComponentKind::Property { decl: DeclId(4) };
        let sub = KeyPathComponentKind::Subscript {
            decl: DeclId(5),
            args: ArgumentList::default(),
        };
        assert_eq!(prop.resolved_decl(), Some(DeclId(4)));
        assert_eq!(sub.resolved_decl(), Some(DeclId(5)));
        assert_eq!(KeyPathComponentKind::OptionalChain.resolved_decl(), None);
        assert_eq!(
            KeyPathComponentKind::UnresolvedProperty {
                name: "x".to_string()
            }
            .resolved_decl(),
            None
        );
    }

    #[test]
    fn argument_list_builders() {
        let list = ArgumentList::new(vec![Argument::unlabeled(ExprId(0))])
            .implicit()
            .with_brackets(SourceLoc(1), SourceLoc(3));
        assert!(list.implicit);
        assert_eq!(list.l_bracket, Some(SourceLoc(1)));
        assert_eq!(list.args[0].label, None);
    }
}
