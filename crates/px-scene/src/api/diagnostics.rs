//! Diagnostics sink injected into a [`Scene`](crate::Scene).
//!
//! The scene never fails on bad input; it degrades and reports here instead.
//! The default sink discards everything.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::api::types::EntityId;

/// A non-fatal condition the scene recovered from.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// An entity's asset failed to decode and it draws a placeholder.
    AssetFallback { entity: EntityId, reason: String },
    /// A camera fit met a zero-size box and fell back to the default scale.
    DegenerateFit { entity: Option<EntityId> },
    /// An effect or a direct sequence action targeted an entity the scene does
    /// not own.
    MissingTarget { entity: EntityId },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::AssetFallback { entity, reason } => {
                write!(f, "entity {entity:?} draws a placeholder: {reason}")
            }
            Diagnostic::DegenerateFit { entity: Some(entity) } => {
                write!(f, "entity {entity:?} has no extent; camera reset to default scale")
            }
            Diagnostic::DegenerateFit { entity: None } => {
                write!(f, "scene bounds have no extent; camera reset to default scale")
            }
            Diagnostic::MissingTarget { entity } => {
                write!(f, "entity {entity:?} is not owned by this scene")
            }
        }
    }
}

/// Receives diagnostics from a scene.
pub trait DiagnosticSink: Send {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Discards every diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}

/// Forwards diagnostics to the `log` facade at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
    }
}

/// Collects diagnostics in memory. Clones share the same buffer, so keep one
/// clone and hand the other to the scene.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<Diagnostic>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(
            &mut *self
                .records
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(diagnostic);
    }
}
