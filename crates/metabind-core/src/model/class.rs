//! Meta classes, fields and inheritance edges.

use std::sync::Arc;

use bitflags::bitflags;

use crate::{Access, MetaEnum, MetaFunction, MetaType, QualifiedName, SourceLocation, TypeEntryRef};

bitflags! {
    /// Class-level attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClassAttributes: u8 {
        const ABSTRACT = 1 << 0;
        const FINAL = 1 << 1;
        const POLYMORPHIC = 1 << 2;
        const NAMESPACE = 1 << 3;
        const PRIVATE_DESTRUCTOR = 1 << 4;
        const HAS_VIRTUAL_DESTRUCTOR = 1 << 5;
    }
}

/// A data member.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaField {
    pub name: String,
    pub ty: MetaType,
    pub access: Access,
    pub is_static: bool,
    pub location: SourceLocation,
}

/// A class, struct or namespace in the semantic model.
#[derive(Debug, Clone)]
pub struct MetaClass {
    pub name: QualifiedName,
    pub entry: TypeEntryRef,
    pub functions: Vec<Arc<MetaFunction>>,
    pub fields: Vec<MetaField>,
    pub enums: Vec<MetaEnum>,
    /// Base class names as written.
    pub base_names: Vec<String>,
    /// Resolved direct bases.
    pub bases: Vec<QualifiedName>,
    /// Every ancestor: each base followed by its own ancestors, deduplicated.
    pub ancestors: Vec<QualifiedName>,
    pub template_parameters: Vec<String>,
    pub attributes: ClassAttributes,
    pub location: SourceLocation,
}

impl MetaClass {
    pub fn new(entry: TypeEntryRef) -> Self {
        let attributes = if entry.is_namespace() {
            ClassAttributes::NAMESPACE
        } else {
            ClassAttributes::empty()
        };
        Self {
            name: entry.name.clone(),
            entry,
            functions: Vec::new(),
            fields: Vec::new(),
            enums: Vec::new(),
            base_names: Vec::new(),
            bases: Vec::new(),
            ancestors: Vec::new(),
            template_parameters: Vec::new(),
            attributes,
            location: SourceLocation::default(),
        }
    }

    pub fn qualified_name(&self) -> &str {
        self.entry.name()
    }

    pub fn simple_name(&self) -> &str {
        self.name.simple_name()
    }

    pub fn is_namespace(&self) -> bool {
        self.attributes.contains(ClassAttributes::NAMESPACE)
    }

    pub fn is_abstract(&self) -> bool {
        self.attributes.contains(ClassAttributes::ABSTRACT)
    }

    pub fn is_polymorphic(&self) -> bool {
        self.attributes.contains(ClassAttributes::POLYMORPHIC)
    }

    /// Whether `other` appears in the transitive ancestor set.
    pub fn inherits_from(&self, other: &QualifiedName) -> bool {
        self.ancestors.iter().any(|a| a == other)
    }

    pub fn add_function(&mut self, function: MetaFunction) {
        self.functions.push(Arc::new(function));
    }

    pub fn functions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Arc<MetaFunction>> {
        self.functions.iter().filter(move |f| f.name == name)
    }

    pub fn constructors(&self) -> impl Iterator<Item = &Arc<MetaFunction>> {
        self.functions.iter().filter(|f| f.is_constructor())
    }

    pub fn conversion_operators(&self) -> impl Iterator<Item = &Arc<MetaFunction>> {
        self.functions.iter().filter(|f| f.is_conversion_operator())
    }

    /// Function names in first-declaration order.
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for function in &self.functions {
            if !names.contains(&function.name.as_str()) {
                names.push(&function.name);
            }
        }
        names
    }

    pub fn find_field(&self, name: &str) -> Option<&MetaField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Inheritance edge: `parent` must be emitted before `child`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyEdge {
    pub parent: QualifiedName,
    pub child: QualifiedName,
}

impl DependencyEdge {
    pub fn new(parent: QualifiedName, child: QualifiedName) -> Self {
        Self { parent, child }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FunctionKind, TypeEntry};

    #[test]
    fn namespace_entries_mark_class() {
        let ns = MetaClass::new(Arc::new(TypeEntry::namespace("Qt")));
        assert!(ns.is_namespace());

        let cls = MetaClass::new(Arc::new(TypeEntry::object("QObject")));
        assert!(!cls.is_namespace());
        assert_eq!(cls.qualified_name(), "QObject");
    }

    #[test]
    fn function_names_keep_first_order() {
        let mut cls = MetaClass::new(Arc::new(TypeEntry::value("QPoint")));
        cls.add_function(MetaFunction::new("setX", FunctionKind::Normal));
        cls.add_function(MetaFunction::new("x", FunctionKind::Normal));
        cls.add_function(MetaFunction::new("setX", FunctionKind::Normal));
        assert_eq!(cls.function_names(), vec!["setX", "x"]);
        assert_eq!(cls.functions_named("setX").count(), 2);
    }

    #[test]
    fn ancestry_uses_explicit_set() {
        let mut cls = MetaClass::new(Arc::new(TypeEntry::object("QWidget")));
        cls.ancestors.push(QualifiedName::global("QObject"));
        assert!(cls.inherits_from(&QualifiedName::global("QObject")));
        assert!(!cls.inherits_from(&QualifiedName::global("QPaintDevice")));
    }
}
