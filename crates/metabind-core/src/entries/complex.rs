//! Payload shared by value and object type entries.

/// Class-like type details declared in the type system.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComplexEntry {
    /// Root of a polymorphic hierarchy (enables runtime type discovery).
    pub polymorphic_base: bool,
    /// Expression used to default-construct a value, if any.
    pub default_constructor: Option<String>,
    /// Whether bindings are generated for this type at all.
    pub generate: bool,
    /// Whether the type may be copied across the boundary.
    pub copyable: Option<bool>,
}

impl ComplexEntry {
    pub fn new() -> Self {
        Self {
            generate: true,
            ..Self::default()
        }
    }

    pub fn as_polymorphic_base(mut self) -> Self {
        self.polymorphic_base = true;
        self
    }

    pub fn with_default_constructor(mut self, expr: impl Into<String>) -> Self {
        self.default_constructor = Some(expr.into());
        self
    }

    pub fn with_copyable(mut self, copyable: bool) -> Self {
        self.copyable = Some(copyable);
        self
    }

    /// Known to the model but no bindings generated.
    pub fn without_generation(mut self) -> Self {
        self.generate = false;
        self
    }
}
