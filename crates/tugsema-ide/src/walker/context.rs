//! Per-walk traversal state.

use std::collections::{HashMap, HashSet};
use std::ops::ControlFlow;

use tugsema_ast::{DeclId, ExprId};

use super::traits::AccessKind;

/// The walk was cancelled by the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cancelled;

/// Result of one traversal step. `Break` always means the walk is cancelled.
pub(crate) type Walk<T = ()> = ControlFlow<Cancelled, T>;

pub(crate) const CONTINUE: Walk = ControlFlow::Continue(());

#[derive(Debug, Default)]
pub(crate) struct TraversalContext {
    cancelled: bool,
    /// Enclosing constructor-ref call expressions, innermost last.
    pub(crate) ctor_refs: Vec<ExprId>,
    /// Enclosing extension declarations, innermost last.
    pub(crate) ext_decls: Vec<DeclId>,
    pub(crate) op_access: Option<AccessKind>,
    /// Opaque placeholder -> the value it stands for, while the opening
    /// expression is being walked.
    pub(crate) opaque_values: HashMap<ExprId, ExprId>,
    /// Expressions already walked out of order.
    pub(crate) exprs_to_skip: HashSet<ExprId>,
}

impl TraversalContext {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Mark the walk cancelled and start unwinding.
    pub(crate) fn stop<T>(&mut self) -> Walk<T> {
        self.cancelled = true;
        ControlFlow::Break(Cancelled)
    }

    /// Unwind if a previous step cancelled.
    pub(crate) fn check(&self) -> Walk {
        if self.cancelled {
            ControlFlow::Break(Cancelled)
        } else {
            CONTINUE
        }
    }

    /// Continue if the observer said so, otherwise cancel.
    pub(crate) fn proceed(&mut self, keep_going: bool) -> Walk {
        if keep_going {
            CONTINUE
        } else {
            self.stop()
        }
    }
}
