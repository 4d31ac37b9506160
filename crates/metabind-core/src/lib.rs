//! Metabind core types.
//!
//! The shared vocabulary of the binding model: type entries, use-site meta
//! types, the semantic model, the declaration and type-system inputs, and
//! the error and diagnostic types every stage reports through.
//!
//! ## Modules
//!
//! - [`entries`]: Registry entries (`TypeEntry` and kind payloads)
//! - [`meta_type`]: `MetaType` with usage-pattern decision and array views
//! - [`model`]: Meta functions, classes, fields and enums
//! - [`decl`]: Declaration tree from the C++ front end
//! - [`typesystem`]: Type rules, modifications, injections and rejections
//! - [`diagnostics`]: Diagnostic stream mirrored to `tracing`
//! - [`error`]: Typed errors for every stage

pub mod decl;
pub mod diagnostics;
pub mod entries;
pub mod error;
pub mod meta_type;
pub mod model;
pub mod options;
mod qualified_name;
mod span;
mod type_hash;
pub mod typesystem;
mod usage;

pub use decl::{
    ArgumentDecl, ClassDecl, Declaration, EnumDecl, FieldDecl, FunctionDecl, NamespaceDecl,
    TypedefDecl,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use entries::{
    CHARACTER_TYPES, ComplexEntry, ContainerEntry, ContainerKind, EntryDetail, EnumEntry,
    FLOATING_TYPES, FlagsEntry, Ownership, PrimitiveEntry, PrimitiveFamilies,
    SIGNED_INTEGER_TYPES, SmartPointerEntry, SmartPointerKind, TypeEntry, TypeEntryRef, TypeKind,
    UNSIGNED_INTEGER_TYPES, builtin_primitive_names,
};
pub use error::{
    ArrayModificationError, MetabindError, ModelError, ParseError, ParseErrorKind,
    RegistrationError,
};
pub use meta_type::MetaType;
pub use model::{
    Access, ClassAttributes, DependencyEdge, FunctionAttributes, FunctionKind, MetaArgument,
    MetaClass, MetaEnum, MetaEnumValue, MetaField, MetaFunction,
};
pub use options::{BuildOptions, CatchAllNames};
pub use qualified_name::QualifiedName;
pub use span::{SourceLocation, Span};
pub use type_hash::{TypeHash, hash_constants};
pub use typesystem::{
    AddedFunctionRule, ArgumentModification, FunctionModification, ImplicitConversionRule,
    Rejection, TypeSystem,
};
pub use usage::{Indirection, ReferenceKind, TypeUsagePattern};
