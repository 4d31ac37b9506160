//! Error types for every stage of model building.
//!
//! ## Error Hierarchy
//!
//! ```text
//! MetabindError (top-level wrapper)
//! ├── ParseError          - type strings and added-function signatures
//! ├── RegistrationError   - type entry registration
//! └── ModelError          - semantic model building
//!     └── ArrayModificationError
//! ```
//!
//! Every stage recovers locally: the offending declaration, injection or
//! modification is dropped and reported as a [`Diagnostic`](crate::Diagnostic).
//! Only [`MetabindError::EmptyDeclarationTree`] ends a run.

use thiserror::Error;

use crate::{SourceLocation, Span};

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A type name was expected.
    ExpectedType,
    /// An identifier was expected.
    ExpectedIdentifier,
    /// A token did not fit the grammar at this point.
    UnexpectedToken,
    /// Input ended in the middle of a construct.
    UnexpectedEof,
    /// Unbalanced `<>`, `()`, `[]` or `{}`.
    MismatchedDelimiter,
    /// Unpaired `@` name marker.
    MismatchedMarker,
    /// An array dimension was not a valid size.
    InvalidArrayDimension,
    /// Unparsed text after a complete type.
    TrailingInput,
}

impl ParseErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedType => "expected type",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::UnexpectedEof => "unexpected end of input",
            ParseErrorKind::MismatchedDelimiter => "mismatched delimiter",
            ParseErrorKind::MismatchedMarker => "mismatched name marker",
            ParseErrorKind::InvalidArrayDimension => "invalid array dimension",
            ParseErrorKind::TrailingInput => "trailing input",
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parse error with kind, position and message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {span}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Prefix the message with context (e.g. the signature being parsed).
    pub fn with_context(mut self, context: impl AsRef<str>) -> Self {
        self.message = format!("{}{}", context.as_ref(), self.message);
        self
    }
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while registering type entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Two different definitions claim the same qualified name.
    #[error("duplicate type entry '{name}': already registered as {existing}, new definition is {new}")]
    DuplicateTypeEntry {
        name: String,
        existing: &'static str,
        new: &'static str,
    },

    /// The name cannot be used as a type name.
    #[error("invalid type name '{0}'")]
    InvalidName(String),
}

// ============================================================================
// Model Errors
// ============================================================================

/// Reasons an array-view modification is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArrayModificationError {
    #[error("array modification already applied")]
    AlreadyArray,
    #[error("type already has an array element type")]
    ElementTypeExists,
    #[error("type has no indirections to strip")]
    NoIndirections,
}

/// Errors raised while building the semantic model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A referenced type name has no entry.
    #[error("unresolved type '{name}' in {context}")]
    UnresolvedType { name: String, context: String },

    /// An added-function signature failed to parse or resolve.
    #[error("malformed added function '{signature}': {reason}")]
    MalformedInjection { signature: String, reason: String },

    /// Array-view modification refused; the original type is kept.
    #[error("cannot apply array modification to argument {position} of {function}: {source}")]
    ArrayModificationConflict {
        function: String,
        position: usize,
        #[source]
        source: ArrayModificationError,
    },

    /// An added function duplicates an existing signature.
    #[error("duplicate function signature '{0}'")]
    DuplicateFunction(String),

    /// A class referenced by a rule or base list does not exist.
    #[error("unknown class '{0}'")]
    UnknownClass(String),
}

impl ModelError {
    /// Check if this is an unresolved type error.
    pub fn is_unresolved_type(&self) -> bool {
        matches!(self, ModelError::UnresolvedType { .. })
    }
}

// ============================================================================
// Top-level Error
// ============================================================================

/// Top-level error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetabindError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Model(#[from] ModelError),

    /// The front end produced no declarations at all.
    #[error("no declarations to process{}", .0.as_ref().map(|l| format!(" ({l})")).unwrap_or_default())]
    EmptyDeclarationTree(Option<SourceLocation>),
}

impl MetabindError {
    /// Whether this error ends the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MetabindError::EmptyDeclarationTree(_))
    }
}
