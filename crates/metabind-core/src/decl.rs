//! Declaration tree produced by the C++ front end.
//!
//! Types are carried as text (`const QList<int> &`) and resolved by the
//! builder. Every item records where it was declared.
//!
//! ```
//! use metabind_core::{ClassDecl, Declaration, FunctionDecl};
//!
//! let point = ClassDecl::new("QPoint")
//!     .function(FunctionDecl::new("QPoint", "").arg("int", "x").arg("int", "y"))
//!     .function(FunctionDecl::new("x", "int").constant());
//! let tree = vec![Declaration::Class(point)];
//! assert_eq!(tree.len(), 1);
//! ```

use crate::{Access, FunctionAttributes, FunctionKind, SourceLocation};

/// One top-level or namespace-level item.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Namespace(NamespaceDecl),
    Class(ClassDecl),
    Function(FunctionDecl),
    Enum(EnumDecl),
    Typedef(TypedefDecl),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Namespace(d) => &d.name,
            Declaration::Class(d) => &d.name,
            Declaration::Function(d) => &d.name,
            Declaration::Enum(d) => &d.name,
            Declaration::Typedef(d) => &d.name,
        }
    }

    pub fn location(&self) -> &SourceLocation {
        match self {
            Declaration::Namespace(d) => &d.location,
            Declaration::Class(d) => &d.location,
            Declaration::Function(d) => &d.location,
            Declaration::Enum(d) => &d.location,
            Declaration::Typedef(d) => &d.location,
        }
    }

    /// Number of items in this subtree, including itself.
    pub fn item_count(&self) -> usize {
        match self {
            Declaration::Namespace(ns) => 1 + ns.items.iter().map(Declaration::item_count).sum::<usize>(),
            Declaration::Class(cls) => cls.item_count(),
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamespaceDecl {
    pub name: String,
    pub items: Vec<Declaration>,
    pub location: SourceLocation,
}

impl NamespaceDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn item(mut self, item: Declaration) -> Self {
        self.items.push(item);
        self
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }
}

/// A class or struct, possibly a template.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassDecl {
    pub name: String,
    pub bases: Vec<String>,
    pub template_parameters: Vec<String>,
    pub functions: Vec<FunctionDecl>,
    pub fields: Vec<FieldDecl>,
    pub enums: Vec<EnumDecl>,
    pub classes: Vec<ClassDecl>,
    pub typedefs: Vec<TypedefDecl>,
    pub is_final: bool,
    pub has_private_destructor: bool,
    pub has_virtual_destructor: bool,
    pub location: SourceLocation,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn base(mut self, name: impl Into<String>) -> Self {
        self.bases.push(name.into());
        self
    }

    pub fn template_parameter(mut self, name: impl Into<String>) -> Self {
        self.template_parameters.push(name.into());
        self
    }

    pub fn function(mut self, function: FunctionDecl) -> Self {
        self.functions.push(function);
        self
    }

    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn enumeration(mut self, decl: EnumDecl) -> Self {
        self.enums.push(decl);
        self
    }

    pub fn nested(mut self, class: ClassDecl) -> Self {
        self.classes.push(class);
        self
    }

    pub fn typedef(mut self, decl: TypedefDecl) -> Self {
        self.typedefs.push(decl);
        self
    }

    pub fn final_class(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn virtual_destructor(mut self) -> Self {
        self.has_virtual_destructor = true;
        self
    }

    pub fn private_destructor(mut self) -> Self {
        self.has_private_destructor = true;
        self
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    fn item_count(&self) -> usize {
        1 + self.functions.len()
            + self.fields.len()
            + self.enums.len()
            + self.typedefs.len()
            + self.classes.iter().map(ClassDecl::item_count).sum::<usize>()
    }
}

/// A function, method, constructor or operator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionDecl {
    pub name: String,
    /// Return type text; empty for constructors and destructors.
    pub return_type: String,
    pub arguments: Vec<ArgumentDecl>,
    pub attributes: FunctionAttributes,
    pub access: Access,
    /// Overrides name-based classification (signals, for instance).
    pub kind: Option<FunctionKind>,
    pub location: SourceLocation,
}

impl FunctionDecl {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, type_text: impl Into<String>, name: impl Into<String>) -> Self {
        self.arguments.push(ArgumentDecl::new(type_text, name));
        self
    }

    pub fn arg_with_default(
        mut self,
        type_text: impl Into<String>,
        name: impl Into<String>,
        default_value: impl Into<String>,
    ) -> Self {
        self.arguments
            .push(ArgumentDecl::new(type_text, name).with_default(default_value));
        self
    }

    pub fn constant(mut self) -> Self {
        self.attributes |= FunctionAttributes::CONST;
        self
    }

    pub fn static_function(mut self) -> Self {
        self.attributes |= FunctionAttributes::STATIC;
        self
    }

    pub fn virtual_function(mut self) -> Self {
        self.attributes |= FunctionAttributes::VIRTUAL;
        self
    }

    pub fn pure_virtual(mut self) -> Self {
        self.attributes |= FunctionAttributes::VIRTUAL | FunctionAttributes::ABSTRACT;
        self
    }

    pub fn explicit(mut self) -> Self {
        self.attributes |= FunctionAttributes::EXPLICIT;
        self
    }

    pub fn access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn kind(mut self, kind: FunctionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArgumentDecl {
    pub name: String,
    pub type_text: String,
    pub default_value: Option<String>,
}

impl ArgumentDecl {
    pub fn new(type_text: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_text: type_text.into(),
            default_value: None,
        }
    }

    pub fn with_default(mut self, expr: impl Into<String>) -> Self {
        self.default_value = Some(expr.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldDecl {
    pub name: String,
    pub type_text: String,
    pub access: Access,
    pub is_static: bool,
    pub location: SourceLocation,
}

impl FieldDecl {
    pub fn new(type_text: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_text: type_text.into(),
            ..Default::default()
        }
    }

    pub fn access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn static_field(mut self) -> Self {
        self.is_static = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnumDecl {
    pub name: String,
    pub values: Vec<(String, i64)>,
    pub scoped: bool,
    pub location: SourceLocation,
}

impl EnumDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn value(mut self, name: impl Into<String>, value: i64) -> Self {
        self.values.push((name.into(), value));
        self
    }

    pub fn scoped(mut self) -> Self {
        self.scoped = true;
        self
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypedefDecl {
    pub name: String,
    pub target: String,
    pub location: SourceLocation,
}

impl TypedefDecl {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            location: SourceLocation::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_count_walks_tree() {
        let tree = Declaration::Namespace(
            NamespaceDecl::new("Qt")
                .item(Declaration::Enum(EnumDecl::new("AlignmentFlag").value("AlignLeft", 1)))
                .item(Declaration::Class(
                    ClassDecl::new("QPoint")
                        .function(FunctionDecl::new("x", "int").constant())
                        .field(FieldDecl::new("int", "xp")),
                )),
        );
        assert_eq!(tree.item_count(), 5);
        assert_eq!(tree.name(), "Qt");
    }

    #[test]
    fn function_builder_sets_attributes() {
        let f = FunctionDecl::new("create", "QObject *")
            .static_function()
            .arg_with_default("QObject *", "parent", "nullptr");
        assert!(f.attributes.contains(FunctionAttributes::STATIC));
        assert_eq!(f.arguments[0].default_value.as_deref(), Some("nullptr"));
    }
}
