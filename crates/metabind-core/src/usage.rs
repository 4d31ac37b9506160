//! Usage patterns and the pointer/reference shape of a type use.

use std::fmt;

/// How a type is passed and converted at one declaration site.
///
/// Derived from the entry kind plus the indirection, reference and const shape
/// of a [`MetaType`](crate::MetaType). See [`MetaType::determine_usage_pattern`](crate::MetaType::determine_usage_pattern).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeUsagePattern {
    Primitive,
    Flags,
    Enum,
    /// Passed by value (or by const reference to a value).
    Value,
    /// Pointer to a value type.
    ValuePointer,
    /// Object type passed by pointer or reference.
    Object,
    NativePointer,
    /// Pointer argument exposed as an array view.
    NativePointerAsArray,
    Container,
    SmartPointer,
    Void,
    Varargs,
    /// Fixed-size C array.
    Array,
    TemplateArgument,
    NonTypeTemplateArgument,
}

impl TypeUsagePattern {
    /// Returns a human-readable name for this pattern.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeUsagePattern::Primitive => "primitive",
            TypeUsagePattern::Flags => "flags",
            TypeUsagePattern::Enum => "enum",
            TypeUsagePattern::Value => "value",
            TypeUsagePattern::ValuePointer => "value-pointer",
            TypeUsagePattern::Object => "object",
            TypeUsagePattern::NativePointer => "native-pointer",
            TypeUsagePattern::NativePointerAsArray => "native-pointer-as-array",
            TypeUsagePattern::Container => "container",
            TypeUsagePattern::SmartPointer => "smart-pointer",
            TypeUsagePattern::Void => "void",
            TypeUsagePattern::Varargs => "varargs",
            TypeUsagePattern::Array => "array",
            TypeUsagePattern::TemplateArgument => "template-argument",
            TypeUsagePattern::NonTypeTemplateArgument => "non-type-template-argument",
        }
    }
}

impl fmt::Display for TypeUsagePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference qualifier of a type use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReferenceKind {
    #[default]
    None,
    /// `T&`
    LValue,
    /// `T&&`
    RValue,
}

impl ReferenceKind {
    pub fn is_reference(self) -> bool {
        self != ReferenceKind::None
    }

    /// Spelling as it appears after the type.
    pub fn as_str(self) -> &'static str {
        match self {
            ReferenceKind::None => "",
            ReferenceKind::LValue => "&",
            ReferenceKind::RValue => "&&",
        }
    }
}

/// One level of pointer indirection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indirection {
    /// `*`
    Pointer,
    /// `* const`
    ConstPointer,
}

impl Indirection {
    /// Keyword used when formatting a signature.
    pub fn keyword(self) -> &'static str {
        match self {
            Indirection::Pointer => "*",
            Indirection::ConstPointer => "*const",
        }
    }
}
