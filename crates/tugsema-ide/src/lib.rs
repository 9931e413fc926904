//! Source-entity traversal for tugsema.
//!
//! This crate walks a resolved tree from `tugsema-ast` and reports every
//! entity occurrence in source order:
//! - [`walker`]: the observer contract ([`SourceEntityWalker`]), the driver and
//!   the `walk` entry points
//! - [`collector`]: a ready-made observer that records every event
//!
//! [`SourceEntityWalker`]: walker::SourceEntityWalker

pub mod collector;
pub mod walker;

pub use collector::{CollectorOptions, EventCollector, WalkEvent, WalkReport};
pub use walker::{
    walk, AccessKind, DeclContext, DeclReference, ReferenceKind, ReferenceMetaData,
    SourceEntityWalker, WalkRoot,
};
