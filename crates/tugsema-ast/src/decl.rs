//! Declarations.

use serde::{Deserialize, Serialize};

use crate::context::AstNode;
use crate::expr::ArgumentList;
use crate::ids::{DeclId, ExprId, ModuleId, PatternId, StmtId, TypeReprId};
use crate::source::{SourceLoc, SourceRange};
use crate::Identifier;

/// Declared access level, ordered from most to least restrictive.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Private,
    FilePrivate,
    #[default]
    Internal,
    Public,
    Open,
}

/// A user-defined attribute such as `@Wrapper(arg: 1)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomAttr {
    /// The attribute name written as a type.
    pub type_repr: Option<TypeReprId>,
    /// Arguments as written, if any.
    #[serde(default)]
    pub args: Option<ArgumentList>,
    /// Type-checked initializer call built from the attribute and its arguments.
    #[serde(default)]
    pub semantic_init: Option<ExprId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decl {
    pub kind: DeclKind,
    /// Location of the declared name (or the introducing keyword for
    /// declarations without a name).
    pub loc: Option<SourceLoc>,
    pub range: Option<SourceRange>,
    #[serde(default)]
    pub implicit: bool,
    #[serde(default)]
    pub access: AccessLevel,
    #[serde(default)]
    pub attrs: Vec<CustomAttr>,
}

impl Decl {
    pub fn new(kind: DeclKind, loc: Option<SourceLoc>) -> Self {
        Decl {
            kind,
            loc,
            range: loc.map(SourceRange::point),
            implicit: false,
            access: AccessLevel::default(),
            attrs: Vec::new(),
        }
    }

    pub fn with_range(mut self, range: SourceRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn implicit(mut self) -> Self {
        self.implicit = true;
        self
    }

    pub fn with_access(mut self, access: AccessLevel) -> Self {
        self.access = access;
        self
    }

    pub fn with_attr(mut self, attr: CustomAttr) -> Self {
        self.attrs.push(attr);
        self
    }

    /// Declared name. Constructors and subscripts report their keyword;
    /// unnamed declarations report `None`. Module declarations are named by
    /// their module and are answered by [`AstContext::decl_name`](crate::AstContext::decl_name).
    pub fn name(&self) -> Option<&str> {
        let name = match &self.kind {
            DeclKind::Func(func) => &func.name,
            DeclKind::Constructor { .. } => return Some("init"),
            DeclKind::Subscript { .. } => return Some("subscript"),
            DeclKind::Param { name, .. }
            | DeclKind::Var { name, .. }
            | DeclKind::Nominal { name, .. }
            | DeclKind::EnumElement { name, .. }
            | DeclKind::Protocol { name, .. }
            | DeclKind::AssociatedType { name, .. }
            | DeclKind::TypeAlias { name, .. }
            | DeclKind::GenericTypeParam { name, .. }
            | DeclKind::Operator { name, .. }
            | DeclKind::PrecedenceGroup { name } => name,
            _ => return None,
        };
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// True for declarations that introduce a named value or type.
    pub fn is_value_decl(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Func(_)
                | DeclKind::Constructor { .. }
                | DeclKind::Subscript { .. }
                | DeclKind::Param { .. }
                | DeclKind::Var { .. }
                | DeclKind::Nominal { .. }
                | DeclKind::EnumElement { .. }
                | DeclKind::Protocol { .. }
                | DeclKind::AssociatedType { .. }
                | DeclKind::TypeAlias { .. }
                | DeclKind::GenericTypeParam { .. }
                | DeclKind::Module { .. }
        )
    }

    /// True for declarations that introduce a type.
    pub fn is_type_decl(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Nominal { .. }
                | DeclKind::Protocol { .. }
                | DeclKind::AssociatedType { .. }
                | DeclKind::TypeAlias { .. }
                | DeclKind::GenericTypeParam { .. }
                | DeclKind::Module { .. }
        )
    }

    pub fn is_constructor(&self) -> bool {
        matches!(self.kind, DeclKind::Constructor { .. })
    }

    pub fn is_subscript(&self) -> bool {
        matches!(self.kind, DeclKind::Subscript { .. })
    }

    /// Parameter list of functions, constructors and subscripts.
    pub fn params(&self) -> Option<&[DeclId]> {
        match &self.kind {
            DeclKind::Func(func) => Some(&func.params),
            DeclKind::Constructor { params, .. } | DeclKind::Subscript { params, .. } => {
                Some(params)
            }
            _ => None,
        }
    }

    /// Generic parameter list, for declarations that can carry one.
    pub fn generic_params(&self) -> &[DeclId] {
        match &self.kind {
            DeclKind::Func(func) => &func.generic_params,
            DeclKind::Constructor { generic_params, .. }
            | DeclKind::Subscript { generic_params, .. }
            | DeclKind::Nominal { generic_params, .. }
            | DeclKind::TypeAlias { generic_params, .. } => generic_params,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Func(FuncDecl),
    Constructor {
        #[serde(default)]
        generic_params: Vec<DeclId>,
        params: Vec<DeclId>,
        body: Option<StmtId>,
    },
    Subscript {
        #[serde(default)]
        generic_params: Vec<DeclId>,
        params: Vec<DeclId>,
        element_type: Option<TypeReprId>,
        #[serde(default)]
        accessors: Vec<DeclId>,
    },
    Param {
        name: Identifier,
        /// External label; `None` when the parameter has no label.
        argument_name: Option<Identifier>,
        argument_name_loc: Option<SourceLoc>,
        type_repr: Option<TypeReprId>,
        default_value: Option<ExprId>,
    },
    Var {
        name: Identifier,
        #[serde(default)]
        accessors: Vec<DeclId>,
    },
    PatternBinding {
        entries: Vec<PatternBindingEntry>,
        /// Variables bound by the entries' patterns.
        vars: Vec<DeclId>,
    },
    Nominal {
        kind: NominalKind,
        name: Identifier,
        #[serde(default)]
        generic_params: Vec<DeclId>,
        #[serde(default)]
        inherited: Vec<TypeReprId>,
        members: Vec<DeclId>,
    },
    EnumCase {
        elements: Vec<DeclId>,
    },
    EnumElement {
        name: Identifier,
        #[serde(default)]
        params: Vec<DeclId>,
        raw_value: Option<ExprId>,
    },
    Protocol {
        name: Identifier,
        #[serde(default)]
        primary_associated_types: Vec<PrimaryAssociatedType>,
        #[serde(default)]
        inherited: Vec<TypeReprId>,
        members: Vec<DeclId>,
    },
    AssociatedType {
        name: Identifier,
        #[serde(default)]
        inherited: Vec<TypeReprId>,
        default_type: Option<TypeReprId>,
    },
    TypeAlias {
        name: Identifier,
        #[serde(default)]
        generic_params: Vec<DeclId>,
        underlying: Option<TypeReprId>,
    },
    GenericTypeParam {
        name: Identifier,
        #[serde(default)]
        inherited: Vec<TypeReprId>,
    },
    Extension {
        extended_type: Option<TypeReprId>,
        #[serde(default)]
        inherited: Vec<TypeReprId>,
        members: Vec<DeclId>,
    },
    Import {
        path: Vec<ImportPathElement>,
        /// The resolved module.
        module: Option<ModuleId>,
        /// Declarations named by a scoped import (`import struct Foo.Bar`).
        #[serde(default)]
        decls: Vec<DeclId>,
        end_loc: Option<SourceLoc>,
    },
    Operator {
        name: Identifier,
        fixity: Fixity,
    },
    PrecedenceGroup {
        name: Identifier,
    },
    IfConfig {
        clauses: Vec<IfConfigClause>,
    },
    TopLevelCode {
        body: StmtId,
    },
    Module {
        module: ModuleId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: Identifier,
    #[serde(default)]
    pub generic_params: Vec<DeclId>,
    pub params: Vec<DeclId>,
    pub result: Option<TypeReprId>,
    pub body: Option<StmtId>,
    /// Declared inside a type or extension.
    #[serde(default)]
    pub is_method: bool,
}

impl FuncDecl {
    /// Methods named `callAsFunction` are invoked by applying the value itself.
    pub fn is_call_as_function(&self) -> bool {
        self.is_method && self.name == "callAsFunction"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternBindingEntry {
    pub pattern: PatternId,
    pub init: Option<ExprId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NominalKind {
    Struct,
    Class,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryAssociatedType {
    pub name: Identifier,
    pub loc: SourceLoc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportPathElement {
    pub name: Identifier,
    pub loc: Option<SourceLoc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fixity {
    Prefix,
    Infix,
    Postfix,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfConfigClause {
    pub condition: Option<ExprId>,
    pub elements: Vec<AstNode>,
    pub is_active: bool,
}

impl DeclKind {
    /// The single bound variable of a pattern binding, if there is exactly one.
    pub fn single_var(&self) -> Option<DeclId> {
        match self {
            DeclKind::PatternBinding { vars, .. } if vars.len() == 1 => Some(vars[0]),
            _ => None,
        }
    }
}
