//! Meta functions and their arguments.

use bitflags::bitflags;

use crate::{MetaType, QualifiedName, ReferenceKind, SourceLocation};

bitflags! {
    /// Declaration attributes of a function.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FunctionAttributes: u16 {
        const STATIC = 1 << 0;
        const CONST = 1 << 1;
        const VIRTUAL = 1 << 2;
        const ABSTRACT = 1 << 3;
        const FINAL = 1 << 4;
        const EXPLICIT = 1 << 5;
        /// Bound as a class-level method on the target side.
        const CLASS_METHOD = 1 << 6;
        /// Injected from an added-function rule.
        const ADDED = 1 << 7;
        /// Synthesized from an implicit-conversion rule.
        const DECLARED_CONVERSION = 1 << 8;
        const DEPRECATED = 1 << 9;
    }
}

/// Role of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FunctionKind {
    #[default]
    Normal,
    Constructor,
    CopyConstructor,
    MoveConstructor,
    Destructor,
    /// `operator T()`
    ConversionOperator,
    /// `operator()`
    CallOperator,
    /// Any other `operatorX`.
    Operator,
    Signal,
}

impl FunctionKind {
    /// Classify a function from its name and the simple name of its owner.
    ///
    /// Copy and move constructors need argument types and are refined later.
    pub fn classify(name: &str, owner: Option<&str>) -> Self {
        if owner.is_some_and(|o| o == name) {
            return FunctionKind::Constructor;
        }
        if name.starts_with('~') {
            return FunctionKind::Destructor;
        }
        let Some(rest) = name.strip_prefix("operator") else {
            return FunctionKind::Normal;
        };
        let rest_trimmed = rest.trim_start();
        if rest_trimmed.starts_with("()") {
            return FunctionKind::CallOperator;
        }
        let is_word = rest_trimmed
            .chars()
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_');
        if rest.starts_with(char::is_whitespace) && is_word {
            let word = rest_trimmed
                .split(|c: char| !(c.is_alphanumeric() || c == '_'))
                .next()
                .unwrap_or_default();
            if matches!(word, "new" | "delete" | "co_await") {
                return FunctionKind::Operator;
            }
            return FunctionKind::ConversionOperator;
        }
        if rest.is_empty() || is_word {
            // `operatorFoo` is an ordinary identifier
            return FunctionKind::Normal;
        }
        FunctionKind::Operator
    }
}

/// Member access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Access {
    #[default]
    Public,
    Protected,
    Private,
}

/// One argument of a meta function.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaArgument {
    pub name: String,
    /// Position in the native signature (0-based).
    pub position: usize,
    pub ty: MetaType,
    /// Replacement type from a modification rule.
    pub modified_type: Option<MetaType>,
    /// Current default-value expression.
    pub default_value: Option<String>,
    /// Default value as declared, before modifications.
    pub original_default_value: Option<String>,
    /// Hidden from the target signature but still passed natively.
    pub removed: bool,
}

impl MetaArgument {
    pub fn new(name: impl Into<String>, ty: MetaType, position: usize) -> Self {
        Self {
            name: name.into(),
            position,
            ty,
            modified_type: None,
            default_value: None,
            original_default_value: None,
            removed: false,
        }
    }

    pub fn with_default(mut self, expr: impl Into<String>) -> Self {
        let expr = expr.into();
        self.original_default_value = Some(expr.clone());
        self.default_value = Some(expr);
        self
    }

    /// Type used for dispatch: the replacement if any, else the declared type.
    pub fn modified_type(&self) -> &MetaType {
        self.modified_type.as_ref().unwrap_or(&self.ty)
    }

    pub fn is_type_modified(&self) -> bool {
        self.modified_type.is_some()
    }

    pub fn has_default_value(&self) -> bool {
        self.default_value.is_some()
    }
}

/// A function or method in the semantic model.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaFunction {
    /// Exposed name (after renames).
    pub name: String,
    /// Name as declared in C++.
    pub original_name: String,
    pub kind: FunctionKind,
    pub attributes: FunctionAttributes,
    pub access: Access,
    pub arguments: Vec<MetaArgument>,
    /// `None` for `void` and for constructors.
    pub return_type: Option<MetaType>,
    /// Return type spelling from a modification rule.
    pub modified_return_type: Option<String>,
    /// Owning class; `None` for free functions.
    pub owner: Option<QualifiedName>,
    /// Explicit dispatch-order hint.
    pub overload_number: Option<u32>,
    pub location: SourceLocation,
}

impl MetaFunction {
    pub fn new(name: impl Into<String>, kind: FunctionKind) -> Self {
        let name = name.into();
        Self {
            original_name: name.clone(),
            name,
            kind,
            attributes: FunctionAttributes::empty(),
            access: Access::Public,
            arguments: Vec::new(),
            return_type: None,
            modified_return_type: None,
            owner: None,
            overload_number: None,
            location: SourceLocation::default(),
        }
    }

    // === Builder Methods ===

    pub fn with_argument(mut self, arg: MetaArgument) -> Self {
        self.arguments.push(arg);
        self
    }

    pub fn with_return_type(mut self, ty: MetaType) -> Self {
        self.return_type = if ty.is_void() { None } else { Some(ty) };
        self
    }

    pub fn with_owner(mut self, owner: QualifiedName) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_attributes(mut self, attributes: FunctionAttributes) -> Self {
        self.attributes |= attributes;
        self
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn with_overload_number(mut self, number: u32) -> Self {
        self.overload_number = Some(number);
        self
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    // === Attribute Queries ===

    pub fn is_static(&self) -> bool {
        self.attributes.contains(FunctionAttributes::STATIC)
    }

    pub fn is_const(&self) -> bool {
        self.attributes.contains(FunctionAttributes::CONST)
    }

    pub fn is_virtual(&self) -> bool {
        self.attributes.contains(FunctionAttributes::VIRTUAL)
    }

    pub fn is_abstract(&self) -> bool {
        self.attributes.contains(FunctionAttributes::ABSTRACT)
    }

    pub fn is_explicit(&self) -> bool {
        self.attributes.contains(FunctionAttributes::EXPLICIT)
    }

    pub fn is_class_method(&self) -> bool {
        self.attributes.contains(FunctionAttributes::CLASS_METHOD)
    }

    pub fn is_added(&self) -> bool {
        self.attributes.contains(FunctionAttributes::ADDED)
    }

    pub fn is_declared_conversion(&self) -> bool {
        self.attributes.contains(FunctionAttributes::DECLARED_CONVERSION)
    }

    pub fn is_public(&self) -> bool {
        self.access == Access::Public
    }

    // === Kind Queries ===

    pub fn is_constructor(&self) -> bool {
        matches!(
            self.kind,
            FunctionKind::Constructor | FunctionKind::CopyConstructor | FunctionKind::MoveConstructor
        )
    }

    pub fn is_copy_constructor(&self) -> bool {
        self.kind == FunctionKind::CopyConstructor
    }

    pub fn is_move_constructor(&self) -> bool {
        self.kind == FunctionKind::MoveConstructor
    }

    pub fn is_conversion_operator(&self) -> bool {
        self.kind == FunctionKind::ConversionOperator
    }

    pub fn is_call_operator(&self) -> bool {
        self.kind == FunctionKind::CallOperator
    }

    /// Operator overloads never share dispatch nodes.
    pub fn is_operator_overload(&self) -> bool {
        matches!(self.kind, FunctionKind::Operator | FunctionKind::CallOperator)
    }

    // === Arguments ===

    /// Arguments visible on the target side.
    pub fn visible_arguments(&self) -> impl Iterator<Item = &MetaArgument> {
        self.arguments.iter().filter(|a| !a.removed)
    }

    pub fn removed_argument_count(&self) -> usize {
        self.arguments.iter().filter(|a| a.removed).count()
    }

    /// Whether the argument at native position `index` is removed.
    pub fn argument_removed(&self, index: usize) -> bool {
        self.arguments.get(index).is_some_and(|a| a.removed)
    }

    pub fn has_rvalue_reference_argument(&self) -> bool {
        self.arguments
            .iter()
            .any(|a| a.ty.reference() == ReferenceKind::RValue)
    }

    /// Whether any visible argument carries a default value.
    pub fn has_default_argument(&self) -> bool {
        self.visible_arguments().any(MetaArgument::has_default_value)
    }

    /// Number of visible arguments the caller must supply, and the total visible.
    pub fn min_max_arguments(&self) -> (usize, usize) {
        let mut first_default = None;
        let mut count = 0;
        for arg in self.visible_arguments() {
            if first_default.is_none() && arg.has_default_value() {
                first_default = Some(count);
            }
            count += 1;
        }
        (first_default.unwrap_or(count), count)
    }

    // === Naming ===

    /// `Owner::name` or just `name`.
    pub fn qualified_name(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{}::{}", owner, self.name),
            None => self.name.clone(),
        }
    }

    /// `Owner.name` as shown in diagnostics.
    pub fn display_name(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{}.{}", owner.simple_name(), self.name),
            None => self.name.clone(),
        }
    }

    /// Signature used to match modification rules: `name(const QLine*,int)const`.
    pub fn minimal_signature(&self) -> String {
        let args: Vec<String> = self
            .arguments
            .iter()
            .map(|a| a.ty.minimal_signature())
            .collect();
        let mut sig = format!("{}({})", self.original_name, args.join(","));
        if self.is_const() {
            sig.push_str("const");
        }
        sig
    }

    /// Same name, same arity and equal types at every position. Owner,
    /// constness, argument names and defaults do not take part.
    pub fn has_same_signature(&self, other: &MetaFunction) -> bool {
        self.name == other.name
            && self.arguments.len() == other.arguments.len()
            && self
                .arguments
                .iter()
                .zip(&other.arguments)
                .all(|(a, b)| a.ty == b.ty)
    }

    /// Readable C++ signature with argument names and defaults.
    pub fn signature(&self) -> String {
        let args: Vec<String> = self
            .arguments
            .iter()
            .map(|a| {
                let mut s = a.ty.cpp_signature();
                if !a.name.is_empty() {
                    s.push(' ');
                    s.push_str(&a.name);
                }
                if let Some(default) = &a.default_value {
                    s.push_str(" = ");
                    s.push_str(default);
                }
                s
            })
            .collect();
        let mut sig = format!("{}({})", self.name, args.join(", "));
        if self.is_const() {
            sig.push_str(" const");
        }
        sig
    }

    /// Whether the function returns something other than `void`.
    pub fn has_non_void_return(&self) -> bool {
        match &self.modified_return_type {
            Some(name) => name != "void",
            None => self.return_type.as_ref().is_some_and(|t| !t.is_void()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Indirection, TypeEntry};
    use std::sync::Arc;

    fn int() -> MetaType {
        MetaType::new(Arc::new(TypeEntry::primitive("int")))
    }

    #[test]
    fn classify_function_kinds() {
        assert_eq!(FunctionKind::classify("QPoint", Some("QPoint")), FunctionKind::Constructor);
        assert_eq!(FunctionKind::classify("~QPoint", Some("QPoint")), FunctionKind::Destructor);
        assert_eq!(FunctionKind::classify("operator()", None), FunctionKind::CallOperator);
        assert_eq!(FunctionKind::classify("operator+", None), FunctionKind::Operator);
        assert_eq!(
            FunctionKind::classify("operator QString", Some("QUrl")),
            FunctionKind::ConversionOperator
        );
        assert_eq!(FunctionKind::classify("operator new", None), FunctionKind::Operator);
        assert_eq!(FunctionKind::classify("operatorName", None), FunctionKind::Normal);
        assert_eq!(FunctionKind::classify("move", Some("QPoint")), FunctionKind::Normal);
    }

    #[test]
    fn same_signature_ignores_names_defaults_and_constness() {
        let owner = QualifiedName::global("QPoint");
        let a = MetaFunction::new("setX", FunctionKind::Normal)
            .with_owner(owner.clone())
            .with_argument(MetaArgument::new("x", int(), 0));
        let b = MetaFunction::new("setX", FunctionKind::Normal)
            .with_owner(owner)
            .with_argument(MetaArgument::new("value", int(), 0).with_default("0"));
        assert!(a.has_same_signature(&b));

        let constant = a.clone().with_attributes(FunctionAttributes::CONST);
        assert!(a.has_same_signature(&constant));

        let pointer = MetaFunction::new("setX", FunctionKind::Normal)
            .with_argument(MetaArgument::new("x", int().with_indirection(Indirection::Pointer), 0));
        assert!(!a.has_same_signature(&pointer));

        let wider = a.clone().with_argument(MetaArgument::new("y", int(), 1));
        assert!(!a.has_same_signature(&wider));
        let renamed = MetaFunction::new("setY", FunctionKind::Normal)
            .with_argument(MetaArgument::new("x", int(), 0));
        assert!(!a.has_same_signature(&renamed));
    }

    #[test]
    fn min_max_arguments_skip_removed() {
        let mut removed = MetaArgument::new("ctx", int(), 1);
        removed.removed = true;
        let func = MetaFunction::new("f", FunctionKind::Normal)
            .with_argument(MetaArgument::new("a", int(), 0))
            .with_argument(removed)
            .with_argument(MetaArgument::new("b", int(), 2).with_default("1"));
        assert_eq!(func.min_max_arguments(), (1, 2));
        assert_eq!(func.removed_argument_count(), 1);
        assert!(func.argument_removed(1));
        assert!(func.has_default_argument());
    }

    #[test]
    fn minimal_signature_matches_modification_syntax() {
        let chr = Arc::new(TypeEntry::primitive("char"));
        let cstr = MetaType::new(chr).with_const().with_indirection(Indirection::Pointer);
        let func = MetaFunction::new("setText", FunctionKind::Normal)
            .with_argument(MetaArgument::new("text", cstr, 0))
            .with_argument(MetaArgument::new("len", int(), 1))
            .with_attributes(FunctionAttributes::CONST);
        assert_eq!(func.minimal_signature(), "setText(const char*,int)const");
        assert_eq!(func.signature(), "setText(const char * text, int len) const");
    }

    #[test]
    fn display_name_uses_owner() {
        let func = MetaFunction::new("move", FunctionKind::Normal)
            .with_owner(QualifiedName::from_qualified_string("ns::QPoint"));
        assert_eq!(func.display_name(), "QPoint.move");
        assert_eq!(func.qualified_name(), "ns::QPoint::move");
    }

    #[test]
    fn void_return_is_not_stored() {
        let void = MetaType::new(Arc::new(TypeEntry::void()));
        let func = MetaFunction::new("clear", FunctionKind::Normal).with_return_type(void);
        assert!(func.return_type.is_none());
        assert!(!func.has_non_void_return());

        let func = MetaFunction::new("x", FunctionKind::Normal).with_return_type(int());
        assert!(func.has_non_void_return());
    }
}
