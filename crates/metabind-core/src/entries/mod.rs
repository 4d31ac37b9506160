//! Registry entry types.
//!
//! - [`TypeEntry`] - one canonical type description, with a kind-specific [`EntryDetail`]
//! - [`PrimitiveEntry`] - builtin and aliased primitives, plus the family tables
//! - [`ComplexEntry`] - value and object type details
//! - [`ContainerEntry`], [`SmartPointerEntry`] - template wrappers
//! - [`EnumEntry`], [`FlagsEntry`] - enumerations

mod complex;
mod container;
mod enum_entry;
mod primitive;
mod type_entry;

pub use complex::ComplexEntry;
pub use container::{ContainerEntry, ContainerKind, SmartPointerEntry, SmartPointerKind};
pub use enum_entry::{EnumEntry, FlagsEntry};
pub use primitive::{
    CHARACTER_TYPES, FLOATING_TYPES, PrimitiveEntry, PrimitiveFamilies, SIGNED_INTEGER_TYPES,
    UNSIGNED_INTEGER_TYPES, builtin_primitive_names,
};
pub use type_entry::{EntryDetail, Ownership, TypeEntry, TypeEntryRef, TypeKind};
