//! Modules, source files and resolved types.

use serde::{Deserialize, Serialize};

use crate::ids::{DeclId, FileId, ModuleId};
use crate::Identifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    /// Built from source in this language.
    Native,
    /// Imported from a foreign module system, which may nest sub-modules.
    Foreign { parent: Option<ModuleId> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: Identifier,
    pub kind: ModuleKind,
    #[serde(default)]
    pub files: Vec<FileId>,
}

impl Module {
    pub fn new(name: impl Into<Identifier>, kind: ModuleKind) -> Self {
        Module {
            name: name.into(),
            kind,
            files: Vec::new(),
        }
    }

    /// The parent module when this is a sub-module of a foreign module.
    pub fn foreign_parent(&self) -> Option<ModuleId> {
        match self.kind {
            ModuleKind::Foreign { parent } => parent,
            ModuleKind::Native => None,
        }
    }

    pub fn is_foreign_submodule(&self) -> bool {
        self.foreign_parent().is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    #[default]
    Source,
    /// Deserialized from a pre-compiled module.
    Serialized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    #[serde(default)]
    pub kind: FileKind,
    pub module: ModuleId,
    /// Top-level declarations in source order.
    pub decls: Vec<DeclId>,
}

/// A resolved type, carried on expressions and references for observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub name: String,
}
