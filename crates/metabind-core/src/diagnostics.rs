//! Diagnostics collected during a run.
//!
//! Every locally recovered failure (a dropped declaration, a rejected
//! injection, an ambiguous overload order) becomes one [`Diagnostic`].
//! Each diagnostic pushed into [`Diagnostics`] is also emitted as a
//! `tracing` event at the matching level, so hosts that install a
//! subscriber see the stream live.

use std::fmt;

use crate::SourceLocation;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// What went wrong, for filtering without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    UnresolvedType,
    DuplicateTypeEntry,
    /// A type rule names something that cannot be a type.
    InvalidTypeName,
    MalformedInjection,
    ArrayModificationConflict,
    AmbiguousOverloadOrder,
    CyclicClassDependency,
    /// Dropped by a rejection rule.
    Rejected,
    DuplicateFunction,
    /// Declared in C++ but absent from the type system.
    MissingTypeSystemEntry,
    UnknownBaseClass,
    /// A modification rule matched nothing.
    UnmatchedModification,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::UnresolvedType => "unresolved-type",
            DiagnosticKind::DuplicateTypeEntry => "duplicate-type-entry",
            DiagnosticKind::InvalidTypeName => "invalid-type-name",
            DiagnosticKind::MalformedInjection => "malformed-injection",
            DiagnosticKind::ArrayModificationConflict => "array-modification-conflict",
            DiagnosticKind::AmbiguousOverloadOrder => "ambiguous-overload-order",
            DiagnosticKind::CyclicClassDependency => "cyclic-class-dependency",
            DiagnosticKind::Rejected => "rejected",
            DiagnosticKind::DuplicateFunction => "duplicate-function",
            DiagnosticKind::MissingTypeSystemEntry => "missing-type-system-entry",
            DiagnosticKind::UnknownBaseClass => "unknown-base-class",
            DiagnosticKind::UnmatchedModification => "unmatched-modification",
        }
    }
}

/// A single diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    /// Where the offending declaration came from, if known.
    pub location: Option<SourceLocation>,
    /// Graphviz rendering of the graph involved (cycle reports only).
    pub graph: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
            location: None,
            graph: None,
        }
    }

    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, kind, message)
    }

    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, kind, message)
    }

    pub fn info(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, kind, message)
    }

    /// Attach a location. Unknown locations are ignored.
    pub fn at(mut self, location: &SourceLocation) -> Self {
        if location.is_known() {
            self.location = Some(location.clone());
        }
        self
    }

    pub fn with_graph(mut self, dot: impl Into<String>) -> Self {
        self.graph = Some(dot.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{location}: ")?;
        }
        write!(
            f,
            "{} [{}]: {}",
            self.severity.as_str(),
            self.kind.as_str(),
            self.message
        )
    }
}

/// Ordered collection of diagnostics for one run.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and mirror it to `tracing`.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        let kind = diagnostic.kind.as_str();
        let location = diagnostic
            .location
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        match diagnostic.severity {
            Severity::Error => {
                tracing::error!(target: "metabind", kind, %location, "{}", diagnostic.message)
            }
            Severity::Warning => {
                tracing::warn!(target: "metabind", kind, %location, "{}", diagnostic.message)
            }
            Severity::Info => {
                tracing::info!(target: "metabind", kind, %location, "{}", diagnostic.message)
            }
        }
        self.items.push(diagnostic);
    }

    /// Append every diagnostic from `other`, preserving order.
    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.kind == kind)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.items {
            writeln!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_severity() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::error(DiagnosticKind::UnresolvedType, "unknown 'QFoo'"));
        diags.push(Diagnostic::warning(DiagnosticKind::AmbiguousOverloadOrder, "cycle"));
        diags.push(Diagnostic::info(DiagnosticKind::Rejected, "skipped"));

        assert!(diags.has_errors());
        assert_eq!(diags.len(), 3);
        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.warnings().count(), 1);
        assert_eq!(diags.of_kind(DiagnosticKind::Rejected).count(), 1);
    }

    #[test]
    fn display_includes_location() {
        let diag = Diagnostic::error(DiagnosticKind::UnresolvedType, "unknown 'QFoo'")
            .at(&SourceLocation::new("widget.h", 12));
        assert_eq!(
            diag.to_string(),
            "widget.h:12: error [unresolved-type]: unknown 'QFoo'"
        );
    }

    #[test]
    fn unknown_location_is_dropped() {
        let diag = Diagnostic::warning(DiagnosticKind::UnknownBaseClass, "base")
            .at(&SourceLocation::default());
        assert!(diag.location.is_none());
    }
}
