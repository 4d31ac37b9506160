//! Type-system description: how each C++ entity is exposed.
//!
//! A [`TypeSystem`] holds type rules (turned into registry entries), function
//! modifications, added functions, declared implicit conversions and
//! rejection patterns.
//!
//! ```
//! use metabind_core::{ArgumentModification, FunctionModification, TypeSystem};
//!
//! let ts = TypeSystem::new()
//!     .value_type("QPoint")
//!     .object_type("QPainter")
//!     .modify(
//!         FunctionModification::new(Some("QPainter"), "drawLines(const QLine*,int)")
//!             .argument(ArgumentModification::new(0).array())
//!             .argument(ArgumentModification::new(1).remove()),
//!     );
//! assert_eq!(ts.entries.len(), 2);
//! ```

use regex::Regex;

use crate::{
    Access, ComplexEntry, ContainerEntry, ContainerKind, EnumEntry, Ownership, PrimitiveEntry,
    SmartPointerEntry, TypeEntry,
};

/// All rules for one run.
#[derive(Debug, Clone, Default)]
pub struct TypeSystem {
    /// Target-side package assigned to every entry without one.
    pub package: Option<String>,
    pub entries: Vec<TypeEntry>,
    pub modifications: Vec<FunctionModification>,
    pub added_functions: Vec<AddedFunctionRule>,
    pub conversions: Vec<ImplicitConversionRule>,
    pub rejections: Vec<Rejection>,
}

impl TypeSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    // === Type Rules ===

    pub fn entry(mut self, entry: TypeEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// A primitive; `referenced` names the builtin it aliases (`qreal` -> `double`).
    pub fn primitive_type(self, name: &str, referenced: Option<&str>) -> Self {
        let detail = match referenced {
            Some(target) => PrimitiveEntry::alias_of(target),
            None => PrimitiveEntry::builtin(name),
        };
        self.entry(TypeEntry::primitive_with(name, detail))
    }

    pub fn value_type(self, name: &str) -> Self {
        self.entry(TypeEntry::value(name))
    }

    pub fn value_type_with(self, name: &str, complex: ComplexEntry) -> Self {
        self.entry(TypeEntry::value(name).with_complex(complex))
    }

    pub fn object_type(self, name: &str) -> Self {
        self.entry(TypeEntry::object(name))
    }

    pub fn object_type_with(self, name: &str, complex: ComplexEntry, ownership: Ownership) -> Self {
        self.entry(
            TypeEntry::object(name)
                .with_complex(complex)
                .with_ownership(ownership),
        )
    }

    pub fn container_type(self, name: &str, kind: ContainerKind) -> Self {
        self.entry(TypeEntry::container(name, kind))
    }

    pub fn container_type_with(self, name: &str, entry: ContainerEntry) -> Self {
        self.entry(TypeEntry::container(name, entry.kind).with_container(entry))
    }

    pub fn smart_pointer_type(self, name: &str, entry: SmartPointerEntry) -> Self {
        self.entry(TypeEntry::smart_pointer(name, entry))
    }

    /// An enum, plus its flags type when `flags` is given.
    pub fn enum_type(self, name: &str, flags: Option<&str>) -> Self {
        match flags {
            Some(flags_name) => self
                .entry(TypeEntry::enumeration(name).with_enum(EnumEntry::new().with_flags(flags_name)))
                .entry(TypeEntry::flags(flags_name, name)),
            None => self.entry(TypeEntry::enumeration(name)),
        }
    }

    pub fn typedef_type(self, name: &str, source: &str) -> Self {
        self.entry(TypeEntry::typedef(name, source))
    }

    pub fn namespace_type(self, name: &str) -> Self {
        self.entry(TypeEntry::namespace(name))
    }

    // === Function Rules ===

    pub fn modify(mut self, modification: FunctionModification) -> Self {
        self.modifications.push(modification);
        self
    }

    pub fn add_function(mut self, rule: AddedFunctionRule) -> Self {
        self.added_functions.push(rule);
        self
    }

    pub fn implicit_conversion(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.conversions.push(ImplicitConversionRule {
            source: source.into(),
            target: target.into(),
        });
        self
    }

    pub fn reject(mut self, rejection: Rejection) -> Self {
        self.rejections.push(rejection);
        self
    }

    // === Queries ===

    pub fn is_class_rejected(&self, class_name: &str) -> bool {
        self.rejections.iter().any(|r| r.rejects_class(class_name))
    }

    pub fn is_function_rejected(&self, class_name: &str, function_name: &str) -> bool {
        self.rejections
            .iter()
            .any(|r| r.rejects_function(class_name, function_name))
    }

    pub fn is_field_rejected(&self, class_name: &str, field_name: &str) -> bool {
        self.rejections
            .iter()
            .any(|r| r.rejects_field(class_name, field_name))
    }

    /// Modifications for `owner` (`None` for globals) matching `function`.
    pub fn modifications_for<'a>(
        &'a self,
        owner: Option<&'a str>,
        name: &'a str,
        minimal_signature: &'a str,
    ) -> impl Iterator<Item = &'a FunctionModification> {
        self.modifications
            .iter()
            .filter(move |m| m.owner.as_deref() == owner && m.matches(name, minimal_signature))
    }
}

/// Changes applied to matching functions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionModification {
    /// Qualified owner class; `None` for global functions.
    pub owner: Option<String>,
    /// Minimal signature (`drawLines(const QLine*,int)`) or a bare name.
    pub signature: String,
    pub rename: Option<String>,
    pub remove: bool,
    pub access: Option<Access>,
    pub overload_number: Option<u32>,
    pub arguments: Vec<ArgumentModification>,
}

impl FunctionModification {
    pub fn new(owner: Option<&str>, signature: impl Into<String>) -> Self {
        Self {
            owner: owner.map(str::to_string),
            signature: signature.into(),
            ..Default::default()
        }
    }

    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.rename = Some(name.into());
        self
    }

    pub fn remove(mut self) -> Self {
        self.remove = true;
        self
    }

    pub fn access(mut self, access: Access) -> Self {
        self.access = Some(access);
        self
    }

    pub fn overload_number(mut self, number: u32) -> Self {
        self.overload_number = Some(number);
        self
    }

    pub fn argument(mut self, modification: ArgumentModification) -> Self {
        self.arguments.push(modification);
        self
    }

    /// Whether the rule names every overload rather than one signature.
    pub fn is_name_only(&self) -> bool {
        !self.signature.contains('(')
    }

    /// Match by name, or by whitespace-insensitive minimal signature.
    pub fn matches(&self, name: &str, minimal_signature: &str) -> bool {
        if self.is_name_only() {
            return self.signature.trim() == name;
        }
        let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
        strip(&self.signature) == strip(minimal_signature)
    }
}

/// Changes applied to one argument (0-based native position).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArgumentModification {
    pub index: usize,
    pub remove: bool,
    pub default_value: Option<String>,
    pub remove_default: bool,
    pub replace_type: Option<String>,
    pub rename: Option<String>,
    /// Treat a pointer argument as an array view.
    pub array: bool,
}

impl ArgumentModification {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    pub fn remove(mut self) -> Self {
        self.remove = true;
        self
    }

    pub fn default_value(mut self, expr: impl Into<String>) -> Self {
        self.default_value = Some(expr.into());
        self
    }

    pub fn remove_default(mut self) -> Self {
        self.remove_default = true;
        self
    }

    pub fn replace_type(mut self, type_text: impl Into<String>) -> Self {
        self.replace_type = Some(type_text.into());
        self
    }

    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.rename = Some(name.into());
        self
    }

    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }
}

/// A function injected from text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AddedFunctionRule {
    /// Qualified owner class; `None` for a global function.
    pub owner: Option<String>,
    pub signature: String,
    pub return_type: String,
    pub is_static: bool,
    pub is_class_method: bool,
    pub access: Access,
}

impl AddedFunctionRule {
    pub fn new(owner: Option<&str>, signature: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            owner: owner.map(str::to_string),
            signature: signature.into(),
            return_type: return_type.into(),
            ..Default::default()
        }
    }

    pub fn static_function(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn class_method(mut self) -> Self {
        self.is_class_method = true;
        self
    }

    pub fn access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }
}

/// `source` converts implicitly to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplicitConversionRule {
    pub source: String,
    pub target: String,
}

/// Drops classes, functions or fields whose names match.
///
/// Patterns are regular expressions matched against the whole name.
#[derive(Debug, Clone)]
pub struct Rejection {
    class: Regex,
    function: Option<Regex>,
    field: Option<Regex>,
}

impl Rejection {
    /// Reject whole classes matching `pattern`.
    pub fn class(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            class: anchored(pattern)?,
            function: None,
            field: None,
        })
    }

    /// Reject functions named `function` in classes matching `class`.
    ///
    /// A class pattern of `*` matches every class and global functions.
    pub fn function(class: &str, function: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            class: anchored(class)?,
            function: Some(anchored(function)?),
            field: None,
        })
    }

    pub fn field(class: &str, field: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            class: anchored(class)?,
            function: None,
            field: Some(anchored(field)?),
        })
    }

    fn is_class_rule(&self) -> bool {
        self.function.is_none() && self.field.is_none()
    }

    pub fn rejects_class(&self, class_name: &str) -> bool {
        self.is_class_rule() && self.class.is_match(class_name)
    }

    pub fn rejects_function(&self, class_name: &str, function_name: &str) -> bool {
        self.function
            .as_ref()
            .is_some_and(|f| self.class.is_match(class_name) && f.is_match(function_name))
    }

    pub fn rejects_field(&self, class_name: &str, field_name: &str) -> bool {
        self.field
            .as_ref()
            .is_some_and(|f| self.class.is_match(class_name) && f.is_match(field_name))
    }
}

fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    let pattern = if pattern == "*" { ".*" } else { pattern };
    Regex::new(&format!("^(?:{pattern})$"))
}
