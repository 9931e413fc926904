//! Arena handles.
//!
//! Every node kind gets its own newtype so a statement id can never be used
//! where an expression id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_ids {
    (
        $(
            $(#[$meta:meta])*
            $name:ident => $prefix:literal
        ),* $(,)?
    ) => {
        $(
            $(#[$meta])*
            #[derive(
                Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            )]
            #[serde(transparent)]
            pub struct $name(pub u32);

            impl $name {
                /// Index into the owning arena.
                pub fn index(self) -> usize {
                    self.0 as usize
                }

                pub(crate) fn from_index(index: usize) -> Self {
                    $name(index as u32)
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}#{}", $prefix, self.0)
                }
            }
        )*
    };
}

define_ids! {
    /// Handle to a [`Decl`](crate::Decl).
    DeclId => "decl",
    /// Handle to a [`Stmt`](crate::Stmt).
    StmtId => "stmt",
    /// Handle to an [`Expr`](crate::Expr).
    ExprId => "expr",
    /// Handle to a [`Pattern`](crate::Pattern).
    PatternId => "pattern",
    /// Handle to a [`TypeRepr`](crate::TypeRepr).
    TypeReprId => "type_repr",
    /// Handle to a [`Module`](crate::Module).
    ModuleId => "module",
    /// Handle to a [`SourceFile`](crate::SourceFile).
    FileId => "file",
    /// Handle to a resolved [`TypeInfo`](crate::TypeInfo).
    TypeId => "type",
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_with_kind_prefix() {
        assert_eq!(DeclId(3).to_string(), "decl#3");
        assert_eq!(TypeReprId(0).to_string(), "type_repr#0");
    }

    #[test]
    fn ids_serialize_as_bare_numbers() {
        assert_eq!(serde_json::to_string(&ExprId(12)).unwrap(), "12");
        let id: StmtId = serde_json::from_str("4").unwrap();
        assert_eq!(id, StmtId(4));
    }
}
