//! MetaType: one concrete use of a type entry at a declaration site.
//!
//! A `MetaType` pairs a shared [`TypeEntry`] handle with the shape of the use:
//! template instantiations, pointer indirections, reference kind, cv-qualifiers
//! and array information. The [`TypeUsagePattern`] is derived from that shape
//! and is recomputed by every mutator, so it can never go stale.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use metabind_core::{Indirection, MetaType, ReferenceKind, TypeEntry, TypeUsagePattern};
//!
//! let widget = Arc::new(TypeEntry::object("QWidget"));
//!
//! let by_value = MetaType::new(widget.clone());
//! assert_eq!(by_value.pattern(), TypeUsagePattern::Value);
//!
//! let by_pointer = MetaType::new(widget).with_indirection(Indirection::Pointer);
//! assert_eq!(by_pointer.pattern(), TypeUsagePattern::Object);
//! assert_eq!(by_pointer.cpp_signature(), "QWidget *");
//! ```

use std::fmt;

use crate::{
    ArrayModificationError, Indirection, ReferenceKind, TypeEntryRef, TypeKind, TypeUsagePattern,
};

/// A use of a type entry with its indirection/reference/const shape.
#[derive(Debug, Clone)]
pub struct MetaType {
    entry: TypeEntryRef,
    instantiations: Vec<MetaType>,
    indirections: Vec<Indirection>,
    reference: ReferenceKind,
    constant: bool,
    volatile: bool,
    array_element: Option<Box<MetaType>>,
    array_count: Option<usize>,
    /// Set once the array-view modification has been applied.
    array_view: bool,
    pattern: TypeUsagePattern,
}

impl MetaType {
    /// A plain use of `entry`: no qualifiers, no indirections.
    pub fn new(entry: TypeEntryRef) -> Self {
        let mut ty = Self {
            entry,
            instantiations: Vec::new(),
            indirections: Vec::new(),
            reference: ReferenceKind::None,
            constant: false,
            volatile: false,
            array_element: None,
            array_count: None,
            array_view: false,
            pattern: TypeUsagePattern::Void,
        };
        ty.decide_usage_pattern();
        ty
    }

    /// A fixed-size array (`T[count]`) whose entry is an array entry.
    pub fn fixed_array(array_entry: TypeEntryRef, element: MetaType, count: Option<usize>) -> Self {
        let mut ty = Self::new(array_entry);
        ty.array_element = Some(Box::new(element));
        ty.array_count = count;
        ty.decide_usage_pattern();
        ty
    }

    // ==========================================================================
    // Usage pattern
    // ==========================================================================

    /// Classify this use. Pure: depends only on the entry kind and the shape.
    pub fn determine_usage_pattern(&self) -> TypeUsagePattern {
        use TypeUsagePattern as P;

        if self.array_view {
            return P::NativePointerAsArray;
        }

        let indirections = self.indirections.len();
        let lvalue = self.reference == ReferenceKind::LValue;
        let actual_indirections = indirections + usize::from(lvalue);
        let pass_by_const_ref = self.constant && lvalue && indirections == 0;
        let plain = actual_indirections == 0 || pass_by_const_ref;

        match self.entry.kind() {
            TypeKind::TemplateArgument => P::TemplateArgument,
            TypeKind::ConstantValue => P::NonTypeTemplateArgument,
            TypeKind::Primitive if plain => P::Primitive,
            TypeKind::Void
                if self.array_count.is_none()
                    && self.reference == ReferenceKind::None
                    && indirections == 0
                    && !self.constant
                    && !self.volatile =>
            {
                P::Void
            }
            TypeKind::Varargs => P::Varargs,
            TypeKind::Enum if plain => P::Enum,
            TypeKind::Object => {
                if indirections == 0 && self.reference == ReferenceKind::None {
                    P::Value
                } else {
                    P::Object
                }
            }
            TypeKind::Container if indirections == 0 => P::Container,
            TypeKind::SmartPointer if indirections == 0 => P::SmartPointer,
            TypeKind::Flags if plain => P::Flags,
            TypeKind::Array => P::Array,
            TypeKind::Value => {
                if indirections == 1 {
                    P::ValuePointer
                } else {
                    P::Value
                }
            }
            _ => P::NativePointer,
        }
    }

    /// Recompute the pattern, normalizing `const T*&` on object types to `T*`.
    fn decide_usage_pattern(&mut self) {
        let mut pattern = self.determine_usage_pattern();
        if self.entry.is_object()
            && self.indirections.len() == 1
            && self.reference == ReferenceKind::LValue
            && self.constant
        {
            self.reference = ReferenceKind::None;
            self.constant = false;
            pattern = TypeUsagePattern::Object;
        }
        self.pattern = pattern;
    }

    /// Expose a pointer argument as an array view over its pointee.
    ///
    /// Fails, leaving `self` untouched, if the view was already applied,
    /// if an element type exists, or if there is no indirection to strip.
    pub fn apply_array_modification(&mut self) -> Result<(), ArrayModificationError> {
        if self.pattern == TypeUsagePattern::NativePointerAsArray {
            return Err(ArrayModificationError::AlreadyArray);
        }
        if self.array_element.is_some() {
            return Err(ArrayModificationError::ElementTypeExists);
        }
        if self.indirections.is_empty() {
            return Err(ArrayModificationError::NoIndirections);
        }

        let mut element = self.clone();
        element.indirections.remove(0);
        element.constant = false;
        element.volatile = false;
        element.decide_usage_pattern();

        self.array_element = Some(Box::new(element));
        self.array_view = true;
        self.decide_usage_pattern();
        Ok(())
    }

    // ==========================================================================
    // Mutators (each recomputes the pattern)
    // ==========================================================================

    pub fn set_constant(&mut self, constant: bool) {
        self.constant = constant;
        self.decide_usage_pattern();
    }

    pub fn set_volatile(&mut self, volatile: bool) {
        self.volatile = volatile;
        self.decide_usage_pattern();
    }

    pub fn set_reference(&mut self, reference: ReferenceKind) {
        self.reference = reference;
        self.decide_usage_pattern();
    }

    pub fn set_indirections(&mut self, indirections: Vec<Indirection>) {
        self.indirections = indirections;
        self.decide_usage_pattern();
    }

    pub fn add_indirection(&mut self, indirection: Indirection) {
        self.indirections.push(indirection);
        self.decide_usage_pattern();
    }

    pub fn clear_indirections(&mut self) {
        self.indirections.clear();
        self.decide_usage_pattern();
    }

    pub fn set_instantiations(&mut self, instantiations: Vec<MetaType>) {
        self.instantiations = instantiations;
        self.decide_usage_pattern();
    }

    pub fn add_instantiation(&mut self, instantiation: MetaType) {
        self.instantiations.push(instantiation);
        self.decide_usage_pattern();
    }

    pub fn with_const(mut self) -> Self {
        self.set_constant(true);
        self
    }

    pub fn with_reference(mut self, reference: ReferenceKind) -> Self {
        self.set_reference(reference);
        self
    }

    pub fn with_indirection(mut self, indirection: Indirection) -> Self {
        self.add_indirection(indirection);
        self
    }

    pub fn with_instantiation(mut self, instantiation: MetaType) -> Self {
        self.add_instantiation(instantiation);
        self
    }

    // ==========================================================================
    // Accessors
    // ==========================================================================

    pub fn entry(&self) -> &TypeEntryRef {
        &self.entry
    }

    pub fn pattern(&self) -> TypeUsagePattern {
        self.pattern
    }

    pub fn instantiations(&self) -> &[MetaType] {
        &self.instantiations
    }

    pub fn has_instantiations(&self) -> bool {
        !self.instantiations.is_empty()
    }

    pub fn indirections(&self) -> &[Indirection] {
        &self.indirections
    }

    pub fn reference(&self) -> ReferenceKind {
        self.reference
    }

    pub fn is_constant(&self) -> bool {
        self.constant
    }

    pub fn is_volatile(&self) -> bool {
        self.volatile
    }

    pub fn array_element(&self) -> Option<&MetaType> {
        self.array_element.as_deref()
    }

    pub fn array_count(&self) -> Option<usize> {
        self.array_count
    }

    /// Unqualified name of the entry.
    pub fn name(&self) -> &str {
        self.entry.simple_name()
    }

    /// Indirections, counting an lvalue reference as one more.
    pub fn actual_indirections(&self) -> usize {
        self.indirections.len() + usize::from(self.reference == ReferenceKind::LValue)
    }

    pub fn pass_by_value(&self) -> bool {
        self.reference == ReferenceKind::None && self.indirections.is_empty()
    }

    pub fn pass_by_const_ref(&self) -> bool {
        self.constant && self.reference == ReferenceKind::LValue && self.indirections.is_empty()
    }

    // === Pattern checks ===

    pub fn is_primitive(&self) -> bool {
        self.pattern == TypeUsagePattern::Primitive
    }

    pub fn is_enum(&self) -> bool {
        self.pattern == TypeUsagePattern::Enum
    }

    pub fn is_flags(&self) -> bool {
        self.pattern == TypeUsagePattern::Flags
    }

    pub fn is_value(&self) -> bool {
        self.pattern == TypeUsagePattern::Value
    }

    pub fn is_value_pointer(&self) -> bool {
        self.pattern == TypeUsagePattern::ValuePointer
    }

    pub fn is_object(&self) -> bool {
        self.pattern == TypeUsagePattern::Object
    }

    pub fn is_native_pointer(&self) -> bool {
        self.pattern == TypeUsagePattern::NativePointer
    }

    pub fn is_container(&self) -> bool {
        self.pattern == TypeUsagePattern::Container
    }

    pub fn is_smart_pointer(&self) -> bool {
        self.pattern == TypeUsagePattern::SmartPointer
    }

    pub fn is_void(&self) -> bool {
        self.pattern == TypeUsagePattern::Void
    }

    pub fn is_varargs(&self) -> bool {
        self.pattern == TypeUsagePattern::Varargs
    }

    pub fn is_array(&self) -> bool {
        self.pattern == TypeUsagePattern::Array
    }

    pub fn is_template_argument(&self) -> bool {
        self.pattern == TypeUsagePattern::TemplateArgument
    }

    /// Any pointer-like use.
    pub fn is_pointer(&self) -> bool {
        !self.indirections.is_empty() || self.is_native_pointer() || self.is_value_pointer()
    }

    /// `char*` / `const char*`.
    pub fn is_cstring(&self) -> bool {
        self.is_native_pointer() && self.indirections.len() == 1 && self.name() == "char"
    }

    /// `void*`.
    pub fn is_void_pointer(&self) -> bool {
        self.is_native_pointer() && self.indirections.len() == 1 && self.name() == "void"
    }

    // ==========================================================================
    // Comparison
    // ==========================================================================

    /// Equal up to const, volatile and reference qualifiers.
    pub fn is_equivalent(&self, other: &MetaType) -> bool {
        self.entry.is_same(&other.entry)
            && self.indirections == other.indirections
            && self.array_count == other.array_count
            && self.array_view == other.array_view
            && self.instantiations == other.instantiations
            && match (&self.array_element, &other.array_element) {
                (None, None) => true,
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
    }

    // ==========================================================================
    // Formatting
    // ==========================================================================

    /// Full C++ spelling, e.g. `const QList<int > &`.
    pub fn cpp_signature(&self) -> String {
        self.format_signature(false)
    }

    /// Compact spelling used for signature matching, e.g. `const QList< int >&`.
    pub fn minimal_signature(&self) -> String {
        self.format_signature(true)
    }

    fn format_signature(&self, minimal: bool) -> String {
        let mut result = String::new();
        if self.constant {
            result.push_str("const ");
        }
        if self.volatile {
            result.push_str("volatile ");
        }

        match (&self.array_element, self.pattern) {
            (Some(element), TypeUsagePattern::Array) => {
                result.push_str(&element.minimal_signature());
                let size = format_array_size(self.array_count);
                match result.find('[') {
                    Some(pos) => result.insert_str(pos, &size),
                    None => result.push_str(&size),
                }
            }
            _ => result.push_str(self.entry.name()),
        }

        if !self.instantiations.is_empty() {
            result.push('<');
            if minimal {
                result.push(' ');
            }
            for (i, instantiation) in self.instantiations.iter().enumerate() {
                if i > 0 {
                    result.push(',');
                }
                result.push_str(&instantiation.minimal_signature());
            }
            result.push_str(" >");
        }

        if !minimal && (!self.indirections.is_empty() || self.reference.is_reference()) {
            result.push(' ');
        }
        for indirection in &self.indirections {
            result.push_str(indirection.keyword());
        }
        result.push_str(self.reference.as_str());
        result
    }
}

fn format_array_size(count: Option<usize>) -> String {
    match count {
        Some(n) => format!("[{n}]"),
        None => "[]".to_string(),
    }
}

impl PartialEq for MetaType {
    fn eq(&self, other: &Self) -> bool {
        self.constant == other.constant
            && self.volatile == other.volatile
            && self.reference == other.reference
            && self.is_equivalent(other)
    }
}

impl Eq for MetaType {}

impl fmt::Display for MetaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cpp_signature())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContainerKind, TypeEntry};
    use std::sync::Arc;

    fn entry(e: TypeEntry) -> TypeEntryRef {
        Arc::new(e)
    }

    #[test]
    fn primitive_patterns() {
        let int = entry(TypeEntry::primitive("int"));
        assert_eq!(MetaType::new(int.clone()).pattern(), TypeUsagePattern::Primitive);

        let const_ref = MetaType::new(int.clone())
            .with_const()
            .with_reference(ReferenceKind::LValue);
        assert_eq!(const_ref.pattern(), TypeUsagePattern::Primitive);
        assert!(const_ref.pass_by_const_ref());

        let mutable_ref = MetaType::new(int.clone()).with_reference(ReferenceKind::LValue);
        assert_eq!(mutable_ref.pattern(), TypeUsagePattern::NativePointer);

        let pointer = MetaType::new(int).with_indirection(Indirection::Pointer);
        assert_eq!(pointer.pattern(), TypeUsagePattern::NativePointer);
    }

    #[test]
    fn void_patterns() {
        let void = entry(TypeEntry::void());
        assert!(MetaType::new(void.clone()).is_void());

        let void_ptr = MetaType::new(void).with_indirection(Indirection::Pointer);
        assert!(void_ptr.is_native_pointer());
        assert!(void_ptr.is_void_pointer());
    }

    #[test]
    fn object_patterns() {
        let obj = entry(TypeEntry::object("QObject"));
        assert!(MetaType::new(obj.clone()).is_value());
        assert!(
            MetaType::new(obj.clone())
                .with_reference(ReferenceKind::LValue)
                .is_object()
        );
        assert!(
            MetaType::new(obj)
                .with_indirection(Indirection::Pointer)
                .is_object()
        );
    }

    #[test]
    fn const_ref_to_object_pointer_is_normalized() {
        let obj = entry(TypeEntry::object("QObject"));
        let mut ty = MetaType::new(obj).with_indirection(Indirection::Pointer);
        ty.set_reference(ReferenceKind::LValue);
        ty.set_constant(true);

        assert_eq!(ty.reference(), ReferenceKind::None);
        assert!(!ty.is_constant());
        assert_eq!(ty.pattern(), TypeUsagePattern::Object);
    }

    #[test]
    fn value_patterns() {
        let point = entry(TypeEntry::value("QPoint"));
        assert!(MetaType::new(point.clone()).is_value());
        assert!(
            MetaType::new(point.clone())
                .with_indirection(Indirection::Pointer)
                .is_value_pointer()
        );
        let double_ptr = MetaType::new(point)
            .with_indirection(Indirection::Pointer)
            .with_indirection(Indirection::Pointer);
        assert!(double_ptr.is_value());
    }

    #[test]
    fn container_and_enum_patterns() {
        let list = entry(TypeEntry::container("QList", ContainerKind::List));
        let int = entry(TypeEntry::primitive("int"));
        let ty = MetaType::new(list.clone()).with_instantiation(MetaType::new(int));
        assert!(ty.is_container());
        assert!(
            MetaType::new(list)
                .with_indirection(Indirection::Pointer)
                .is_native_pointer()
        );

        let color = entry(TypeEntry::enumeration("Qt::GlobalColor"));
        assert!(MetaType::new(color).is_enum());
    }

    #[test]
    fn pattern_is_stable() {
        let obj = entry(TypeEntry::object("QObject"));
        let ty = MetaType::new(obj).with_indirection(Indirection::Pointer);
        assert_eq!(ty.determine_usage_pattern(), ty.determine_usage_pattern());
        assert_eq!(ty.determine_usage_pattern(), ty.pattern());
    }

    #[test]
    fn array_modification_applies_once() {
        let int = entry(TypeEntry::primitive("int"));
        let mut ty = MetaType::new(int.clone()).with_indirection(Indirection::Pointer);

        assert_eq!(ty.apply_array_modification(), Ok(()));
        assert_eq!(ty.pattern(), TypeUsagePattern::NativePointerAsArray);
        assert_eq!(ty.array_element(), Some(&MetaType::new(int)));

        assert_eq!(
            ty.apply_array_modification(),
            Err(ArrayModificationError::AlreadyArray)
        );
    }

    #[test]
    fn array_modification_needs_indirection() {
        let int = entry(TypeEntry::primitive("int"));
        let mut ty = MetaType::new(int);
        assert_eq!(
            ty.apply_array_modification(),
            Err(ArrayModificationError::NoIndirections)
        );
        assert!(ty.is_primitive());
    }

    #[test]
    fn array_modification_rejects_fixed_arrays() {
        let int = entry(TypeEntry::primitive("int"));
        let array_entry = entry(TypeEntry::array(int.clone()));
        let mut ty = MetaType::fixed_array(array_entry, MetaType::new(int), Some(3));
        let before = ty.clone();
        assert_eq!(
            ty.apply_array_modification(),
            Err(ArrayModificationError::ElementTypeExists)
        );
        assert_eq!(ty, before);
        assert_eq!(ty.array_count(), Some(3));
        assert!(ty.is_array());
    }

    #[test]
    fn signatures() {
        let list = entry(TypeEntry::container("QList", ContainerKind::List));
        let int = entry(TypeEntry::primitive("int"));
        let ty = MetaType::new(list)
            .with_instantiation(MetaType::new(int))
            .with_const()
            .with_reference(ReferenceKind::LValue);
        assert_eq!(ty.cpp_signature(), "const QList<int > &");
        assert_eq!(ty.minimal_signature(), "const QList< int >&");

        let chr = entry(TypeEntry::primitive("char"));
        let cstr = MetaType::new(chr).with_const().with_indirection(Indirection::Pointer);
        assert_eq!(cstr.cpp_signature(), "const char *");
        assert!(cstr.is_cstring());
    }

    #[test]
    fn fixed_array_signature() {
        let int = entry(TypeEntry::primitive("int"));
        let array_entry = entry(TypeEntry::array(int.clone()));
        let ty = MetaType::fixed_array(array_entry, MetaType::new(int), Some(3));
        assert!(ty.is_array());
        assert_eq!(ty.cpp_signature(), "int[3]");
    }

    #[test]
    fn equality_and_equivalence() {
        let int = entry(TypeEntry::primitive("int"));
        let plain = MetaType::new(int.clone());
        let const_ref = MetaType::new(int)
            .with_const()
            .with_reference(ReferenceKind::LValue);
        assert_ne!(plain, const_ref);
        assert!(plain.is_equivalent(&const_ref));
    }
}
