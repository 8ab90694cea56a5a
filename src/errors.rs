//! Error types and advisory diagnostics.
//!
//! Geometry construction errors are fatal: a non-finite coordinate or a
//! zero-sized target means the caller handed over corrupt data and nothing
//! sensible can be drawn. Everything the resolution pipeline itself fails at
//! is advisory: the engine keeps the best point it found and records what
//! happened in a [`RenderReport`] so a caller (or a test harness) can inspect
//! crowded spots without rendering being interrupted.

use glam::DVec2;
use miette::Diagnostic;
use thiserror::Error;

use crate::types::{EdgeId, VertexId};

/// Fatal errors raised at target construction or diagram assembly time.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum InvalidGeometry {
    #[error("non-finite coordinate in {context}")]
    #[diagnostic(code(bondline::geometry::non_finite))]
    NonFinite { context: &'static str },

    #[error("zero or negative size in {context}")]
    #[diagnostic(code(bondline::geometry::non_positive_size))]
    NonPositiveSize { context: &'static str },

    #[error("composite target has no parts")]
    #[diagnostic(code(bondline::geometry::empty_composite))]
    EmptyComposite,

    #[error("bond references unknown vertex {vertex}")]
    #[diagnostic(code(bondline::diagram::unknown_vertex))]
    UnknownVertex { vertex: VertexId },
}

/// Advisory diagnostics. Never thrown; collected into a [`RenderReport`].
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    /// Legality retreat ran out of room (reached the bond origin) or the
    /// minimum-bond-length guard was hit during overlap avoidance. The point
    /// carried here is the best one found and is what gets rendered.
    CollisionUnresolved { at: DVec2 },

    /// Target-gap retreat exhausted its iteration budget before reaching the
    /// gap tolerance. `achieved_gap` is the gap of the best point seen.
    GapConvergenceIncomplete { at: DVec2, achieved_gap: f64 },
}

/// One report entry, tagged with the bond it was raised for when known.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub edge: Option<EdgeId>,
    pub advisory: Advisory,
}

/// Per-diagram collection of advisory diagnostics.
///
/// The driver sets the edge scope before resolving each bond so that entries
/// raised deep inside the retreat loops can still be traced back to a bond.
#[derive(Debug, Clone, Default)]
pub struct RenderReport {
    entries: Vec<ReportEntry>,
    scope: Option<EdgeId>,
}

impl RenderReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the edge all subsequent advisories are attributed to.
    pub fn enter_edge(&mut self, edge: EdgeId) {
        self.scope = Some(edge);
    }

    /// Clear the edge scope (advisories become unattributed).
    pub fn clear_scope(&mut self) {
        self.scope = None;
    }

    /// Record an advisory under the current scope.
    pub fn advise(&mut self, advisory: Advisory) {
        self.entries.push(ReportEntry {
            edge: self.scope,
            advisory,
        });
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn is_clean(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries attributed to one bond.
    pub fn for_edge(&self, edge: EdgeId) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(move |e| e.edge == Some(edge))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    #[test]
    fn report_scopes_entries_to_edges() {
        let mut report = RenderReport::new();
        report.enter_edge(EdgeId(3));
        report.advise(Advisory::CollisionUnresolved {
            at: dvec2(1.0, 2.0),
        });
        report.clear_scope();
        report.advise(Advisory::GapConvergenceIncomplete {
            at: dvec2(0.0, 0.0),
            achieved_gap: 0.9,
        });

        assert!(!report.is_clean());
        assert_eq!(report.for_edge(EdgeId(3)).count(), 1);
        assert_eq!(report.entries()[1].edge, None);
    }
}
