//! TypeEntry: canonical, name-keyed description of a C++ type.
//!
//! A `TypeEntry` is created once per distinct type name and shared through
//! [`TypeEntryRef`] handles. Every [`MetaType`](crate::MetaType) naming the type
//! points at the same entry; entries are never copied into their uses.

use std::fmt;
use std::sync::Arc;

use crate::{QualifiedName, TypeHash};

use super::{
    ComplexEntry, ContainerEntry, ContainerKind, EnumEntry, FlagsEntry, PrimitiveEntry,
    SmartPointerEntry,
};

/// Shared handle to a registered entry.
pub type TypeEntryRef = Arc<TypeEntry>;

/// Kind tag of a type entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive,
    Void,
    Varargs,
    Enum,
    Flags,
    /// Plain value type (copied across the boundary).
    Value,
    /// Identity-bearing object type (passed by pointer).
    Object,
    Container,
    SmartPointer,
    Typedef,
    ConstantValue,
    TemplateArgument,
    Array,
    Namespace,
}

impl TypeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeKind::Primitive => "primitive",
            TypeKind::Void => "void",
            TypeKind::Varargs => "varargs",
            TypeKind::Enum => "enum",
            TypeKind::Flags => "flags",
            TypeKind::Value => "value",
            TypeKind::Object => "object",
            TypeKind::Container => "container",
            TypeKind::SmartPointer => "smart-pointer",
            TypeKind::Typedef => "typedef",
            TypeKind::ConstantValue => "constant-value",
            TypeKind::TemplateArgument => "template-argument",
            TypeKind::Array => "array",
            TypeKind::Namespace => "namespace",
        }
    }
}

/// Who owns a native object handed across the boundary, unless a function says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Ownership {
    #[default]
    Default,
    TargetLangOwns,
    NativeOwns,
}

/// Kind-specific payload of a [`TypeEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryDetail {
    Primitive(PrimitiveEntry),
    Void,
    Varargs,
    Enum(EnumEntry),
    Flags(FlagsEntry),
    Value(ComplexEntry),
    Object(ComplexEntry),
    Container(ContainerEntry),
    SmartPointer(SmartPointerEntry),
    /// Alias of another type, kept as source text until resolution.
    Typedef { source: String },
    /// Non-type template argument (`std::array<int, 3>`).
    ConstantValue,
    /// Template parameter of an enclosing class template.
    TemplateArgument { ordinal: usize },
    /// Fixed-size C array of the element entry.
    Array { element: TypeEntryRef },
    Namespace,
}

/// Registry entry for one type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    /// Structured name.
    pub name: QualifiedName,
    /// Fully qualified spelling (`Qt::Alignment`).
    pub qualified_name: String,
    /// Identity derived from the qualified spelling.
    pub type_hash: TypeHash,
    /// Package or module the type lives in on the target side.
    pub target_package: Option<String>,
    /// Default ownership for values of this type.
    pub ownership: Ownership,
    /// Kind-specific payload.
    pub detail: EntryDetail,
}

impl TypeEntry {
    /// Create an entry from a qualified name and payload.
    pub fn new(name: impl Into<QualifiedName>, detail: EntryDetail) -> Self {
        let name = name.into();
        let qualified_name = name.to_string();
        let type_hash = TypeHash::from_name(&qualified_name);
        Self {
            name,
            qualified_name,
            type_hash,
            target_package: None,
            ownership: Ownership::Default,
            detail,
        }
    }

    /// A builtin primitive, classified by its spelling.
    pub fn primitive(name: &str) -> Self {
        Self::new(name, EntryDetail::Primitive(PrimitiveEntry::builtin(name)))
    }

    /// A primitive declared by the type system, possibly aliasing a builtin.
    pub fn primitive_with(name: &str, entry: PrimitiveEntry) -> Self {
        Self::new(name, EntryDetail::Primitive(entry))
    }

    pub fn void() -> Self {
        Self::new("void", EntryDetail::Void)
    }

    pub fn varargs() -> Self {
        Self::new("...", EntryDetail::Varargs)
    }

    pub fn value(name: &str) -> Self {
        Self::new(name, EntryDetail::Value(ComplexEntry::new()))
    }

    pub fn object(name: &str) -> Self {
        Self::new(name, EntryDetail::Object(ComplexEntry::new()))
    }

    pub fn enumeration(name: &str) -> Self {
        Self::new(name, EntryDetail::Enum(EnumEntry::new()))
    }

    pub fn flags(name: &str, enum_name: &str) -> Self {
        Self::new(name, EntryDetail::Flags(FlagsEntry::new(enum_name)))
    }

    pub fn container(name: &str, kind: ContainerKind) -> Self {
        Self::new(name, EntryDetail::Container(ContainerEntry::new(kind)))
    }

    pub fn smart_pointer(name: &str, entry: SmartPointerEntry) -> Self {
        Self::new(name, EntryDetail::SmartPointer(entry))
    }

    pub fn typedef(name: &str, source: impl Into<String>) -> Self {
        Self::new(
            name,
            EntryDetail::Typedef {
                source: source.into(),
            },
        )
    }

    pub fn namespace(name: &str) -> Self {
        Self::new(name, EntryDetail::Namespace)
    }

    /// Entry for a literal used as a template argument (`3` in `std::array<int, 3>`).
    ///
    /// The literal is kept verbatim; it is never split on `::`.
    pub fn constant_value(text: &str) -> Self {
        Self::new(QualifiedName::global(text), EntryDetail::ConstantValue)
    }

    /// Entry for template parameter `name` at position `ordinal`.
    pub fn template_argument(name: &str, ordinal: usize) -> Self {
        Self::new(
            QualifiedName::global(name),
            EntryDetail::TemplateArgument { ordinal },
        )
    }

    /// Entry for a fixed-size array of `element`.
    pub fn array(element: TypeEntryRef) -> Self {
        let name = format!("{}[]", element.qualified_name);
        Self::new(QualifiedName::global(name), EntryDetail::Array { element })
    }

    // === Builder Methods ===

    pub fn with_target_package(mut self, package: impl Into<String>) -> Self {
        self.target_package = Some(package.into());
        self
    }

    pub fn with_ownership(mut self, ownership: Ownership) -> Self {
        self.ownership = ownership;
        self
    }

    /// Replace the value/object payload. No-op for other kinds.
    pub fn with_complex(mut self, complex: ComplexEntry) -> Self {
        match &mut self.detail {
            EntryDetail::Value(c) | EntryDetail::Object(c) => *c = complex,
            _ => {}
        }
        self
    }

    /// Replace the enum payload. No-op for other kinds.
    pub fn with_enum(mut self, entry: EnumEntry) -> Self {
        if let EntryDetail::Enum(e) = &mut self.detail {
            *e = entry;
        }
        self
    }

    /// Replace the container payload. No-op for other kinds.
    pub fn with_container(mut self, entry: ContainerEntry) -> Self {
        if let EntryDetail::Container(c) = &mut self.detail {
            *c = entry;
        }
        self
    }

    // === Accessors ===

    /// Fully qualified spelling.
    pub fn name(&self) -> &str {
        &self.qualified_name
    }

    /// Unqualified name.
    pub fn simple_name(&self) -> &str {
        &self.name.name
    }

    /// Kind tag derived from the payload.
    pub fn kind(&self) -> TypeKind {
        match &self.detail {
            EntryDetail::Primitive(_) => TypeKind::Primitive,
            EntryDetail::Void => TypeKind::Void,
            EntryDetail::Varargs => TypeKind::Varargs,
            EntryDetail::Enum(_) => TypeKind::Enum,
            EntryDetail::Flags(_) => TypeKind::Flags,
            EntryDetail::Value(_) => TypeKind::Value,
            EntryDetail::Object(_) => TypeKind::Object,
            EntryDetail::Container(_) => TypeKind::Container,
            EntryDetail::SmartPointer(_) => TypeKind::SmartPointer,
            EntryDetail::Typedef { .. } => TypeKind::Typedef,
            EntryDetail::ConstantValue => TypeKind::ConstantValue,
            EntryDetail::TemplateArgument { .. } => TypeKind::TemplateArgument,
            EntryDetail::Array { .. } => TypeKind::Array,
            EntryDetail::Namespace => TypeKind::Namespace,
        }
    }

    /// Whether two handles denote the same type.
    pub fn is_same(&self, other: &TypeEntry) -> bool {
        self.type_hash == other.type_hash
    }

    // === Type Checks ===

    pub fn is_primitive(&self) -> bool {
        matches!(self.detail, EntryDetail::Primitive(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self.detail, EntryDetail::Void)
    }

    pub fn is_varargs(&self) -> bool {
        matches!(self.detail, EntryDetail::Varargs)
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.detail, EntryDetail::Enum(_))
    }

    pub fn is_flags(&self) -> bool {
        matches!(self.detail, EntryDetail::Flags(_))
    }

    pub fn is_value(&self) -> bool {
        matches!(self.detail, EntryDetail::Value(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self.detail, EntryDetail::Object(_))
    }

    /// Value or object: something with a class behind it.
    pub fn is_complex(&self) -> bool {
        self.is_value() || self.is_object()
    }

    pub fn is_container(&self) -> bool {
        matches!(self.detail, EntryDetail::Container(_))
    }

    pub fn is_smart_pointer(&self) -> bool {
        matches!(self.detail, EntryDetail::SmartPointer(_))
    }

    pub fn is_typedef(&self) -> bool {
        matches!(self.detail, EntryDetail::Typedef { .. })
    }

    pub fn is_namespace(&self) -> bool {
        matches!(self.detail, EntryDetail::Namespace)
    }

    // === Payload Access ===

    pub fn as_primitive(&self) -> Option<&PrimitiveEntry> {
        match &self.detail {
            EntryDetail::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<&ComplexEntry> {
        match &self.detail {
            EntryDetail::Value(c) | EntryDetail::Object(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumEntry> {
        match &self.detail {
            EntryDetail::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_flags(&self) -> Option<&FlagsEntry> {
        match &self.detail {
            EntryDetail::Flags(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&ContainerEntry> {
        match &self.detail {
            EntryDetail::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_smart_pointer(&self) -> Option<&SmartPointerEntry> {
        match &self.detail {
            EntryDetail::SmartPointer(s) => Some(s),
            _ => None,
        }
    }

    /// Element entry of an array entry.
    pub fn array_element(&self) -> Option<&TypeEntryRef> {
        match &self.detail {
            EntryDetail::Array { element } => Some(element),
            _ => None,
        }
    }

    /// Position of a template parameter entry.
    pub fn template_ordinal(&self) -> Option<usize> {
        match &self.detail {
            EntryDetail::TemplateArgument { ordinal } => Some(*ordinal),
            _ => None,
        }
    }
}

impl fmt::Display for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.qualified_name, self.kind().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_payload() {
        assert_eq!(TypeEntry::primitive("int").kind(), TypeKind::Primitive);
        assert_eq!(TypeEntry::value("QPoint").kind(), TypeKind::Value);
        assert_eq!(TypeEntry::object("QObject").kind(), TypeKind::Object);
        assert_eq!(
            TypeEntry::container("QList", ContainerKind::List).kind(),
            TypeKind::Container
        );
        assert_eq!(TypeEntry::void().kind(), TypeKind::Void);
    }

    #[test]
    fn qualified_names_and_hash() {
        let entry = TypeEntry::enumeration("Qt::AlignmentFlag");
        assert_eq!(entry.name(), "Qt::AlignmentFlag");
        assert_eq!(entry.simple_name(), "AlignmentFlag");
        assert_eq!(entry.type_hash, TypeHash::from_name("Qt::AlignmentFlag"));
    }

    #[test]
    fn payload_accessors() {
        let list = TypeEntry::container("QList", ContainerKind::List);
        assert!(list.as_container().is_some());
        assert!(list.as_complex().is_none());

        let point = TypeEntry::value("QPoint")
            .with_complex(ComplexEntry::new().with_default_constructor("QPoint()"));
        assert_eq!(
            point.as_complex().and_then(|c| c.default_constructor.as_deref()),
            Some("QPoint()")
        );
    }

    #[test]
    fn array_entry_names_element() {
        let int = Arc::new(TypeEntry::primitive("int"));
        let array = TypeEntry::array(int.clone());
        assert_eq!(array.name(), "int[]");
        assert!(array.array_element().is_some_and(|e| e.is_same(&int)));
    }

    #[test]
    fn constant_value_keeps_literal() {
        let entry = TypeEntry::constant_value("3");
        assert_eq!(entry.name(), "3");
        assert_eq!(entry.kind(), TypeKind::ConstantValue);
    }
}
