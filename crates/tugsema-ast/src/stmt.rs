//! Statements.

use serde::{Deserialize, Serialize};

use crate::context::AstNode;
use crate::ids::{DeclId, ExprId, PatternId, StmtId};
use crate::source::SourceRange;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub range: Option<SourceRange>,
    #[serde(default)]
    pub implicit: bool,
}

impl Stmt {
    pub fn new(kind: StmtKind, range: Option<SourceRange>) -> Self {
        Stmt {
            kind,
            range,
            implicit: false,
        }
    }

    pub fn implicit(mut self) -> Self {
        self.implicit = true;
        self
    }
}

/// One element of an `if`/`guard`/`while` condition list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionElement {
    Boolean(ExprId),
    /// `let pattern = init`
    Binding { pattern: PatternId, init: ExprId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseLabelItem {
    pub pattern: PatternId,
    pub guard_expr: Option<ExprId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StmtKind {
    Brace {
        elements: Vec<AstNode>,
    },
    Return {
        result: Option<ExprId>,
    },
    Throw {
        error: ExprId,
    },
    If {
        conditions: Vec<ConditionElement>,
        then_stmt: StmtId,
        else_stmt: Option<StmtId>,
    },
    Guard {
        conditions: Vec<ConditionElement>,
        body: StmtId,
    },
    While {
        conditions: Vec<ConditionElement>,
        body: StmtId,
    },
    RepeatWhile {
        body: StmtId,
        condition: ExprId,
    },
    ForEach {
        pattern: PatternId,
        sequence: ExprId,
        where_clause: Option<ExprId>,
        body: StmtId,
    },
    Switch {
        subject: ExprId,
        /// `Case` statements.
        cases: Vec<StmtId>,
    },
    Case {
        labels: Vec<CaseLabelItem>,
        body: StmtId,
    },
    Do {
        body: StmtId,
    },
    DoCatch {
        body: StmtId,
        /// `Case` statements.
        catches: Vec<StmtId>,
    },
    /// `defer { ... }`; the body is held by an implicit function declaration.
    Defer {
        body_fn: DeclId,
    },
    Break,
    Continue,
    Fallthrough,
}
