//! Parsed, unresolved type references.

use std::fmt;

use metabind_core::{Indirection, ParseError, ReferenceKind};

use crate::type_parser::TypeParser;

/// A type reference as written, before registry lookup.
///
/// `const QList<int> *` parses to name `["QList"]`, one instantiation,
/// one pointer indirection and `constant = true`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeInfo {
    /// Name segments (`["Qt", "Alignment"]`). Multi-word builtins are one segment.
    pub name: Vec<String>,
    pub instantiations: Vec<TypeInfo>,
    pub indirections: Vec<Indirection>,
    pub reference: ReferenceKind,
    pub constant: bool,
    pub volatile: bool,
    /// Fixed array dimensions; `None` for `[]`.
    pub array_dimensions: Vec<Option<usize>>,
    /// `...`
    pub is_varargs: bool,
    /// A numeric non-type template argument.
    pub is_literal: bool,
}

impl TypeInfo {
    /// Parse a type reference.
    ///
    /// ```
    /// use metabind_parser::TypeInfo;
    ///
    /// let ty = TypeInfo::parse("const QMap<QString, int> &").unwrap();
    /// assert_eq!(ty.qualified_name(), "QMap");
    /// assert_eq!(ty.instantiations.len(), 2);
    /// assert!(ty.constant);
    /// ```
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        TypeParser::new(text).parse_complete()
    }

    /// A plain named type.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: vec![name.into()],
            ..Default::default()
        }
    }

    pub fn varargs() -> Self {
        Self {
            name: vec!["...".to_string()],
            is_varargs: true,
            ..Default::default()
        }
    }

    pub fn void() -> Self {
        Self::named("void")
    }

    /// Name segments joined with `::`.
    pub fn qualified_name(&self) -> String {
        self.name.join("::")
    }

    pub fn simple_name(&self) -> &str {
        self.name.last().map(String::as_str).unwrap_or_default()
    }

    /// Plain `void`: no pointer, reference or qualifier.
    pub fn is_void(&self) -> bool {
        self.name.len() == 1
            && self.name[0] == "void"
            && self.indirections.is_empty()
            && !self.reference.is_reference()
            && !self.constant
    }

    pub fn has_instantiations(&self) -> bool {
        !self.instantiations.is_empty()
    }

    /// Rename the leading segment, keeping the shape. Used for typedef expansion.
    pub fn with_name(mut self, name: Vec<String>) -> Self {
        self.name = name;
        self
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_varargs {
            return f.write_str("...");
        }
        if self.constant {
            f.write_str("const ")?;
        }
        if self.volatile {
            f.write_str("volatile ")?;
        }
        f.write_str(&self.qualified_name())?;
        if !self.instantiations.is_empty() {
            f.write_str("<")?;
            for (i, inst) in self.instantiations.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{inst}")?;
            }
            f.write_str(">")?;
        }
        if !self.indirections.is_empty() || self.reference.is_reference() {
            f.write_str(" ")?;
        }
        for indirection in &self.indirections {
            f.write_str(indirection.keyword())?;
        }
        f.write_str(self.reference.as_str())?;
        for dim in &self.array_dimensions {
            match dim {
                Some(n) => write!(f, "[{n}]")?,
                None => f.write_str("[]")?,
            }
        }
        Ok(())
    }
}
