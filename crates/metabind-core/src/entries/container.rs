//! Container and smart-pointer type entries.

/// Kind of a container template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    List,
    Set,
    Map,
    MultiMap,
    Pair,
    /// Non-owning contiguous view (`std::span`).
    Span,
}

impl ContainerKind {
    /// Whether push/pop-style operations make sense downstream.
    pub fn is_growable(self) -> bool {
        matches!(
            self,
            ContainerKind::List | ContainerKind::Set | ContainerKind::Map | ContainerKind::MultiMap
        )
    }

    /// Number of template parameters the container expects.
    pub fn parameter_count(self) -> usize {
        match self {
            ContainerKind::List | ContainerKind::Set | ContainerKind::Span => 1,
            ContainerKind::Map | ContainerKind::MultiMap | ContainerKind::Pair => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContainerKind::List => "list",
            ContainerKind::Set => "set",
            ContainerKind::Map => "map",
            ContainerKind::MultiMap => "multi-map",
            ContainerKind::Pair => "pair",
            ContainerKind::Span => "span",
        }
    }
}

/// Registry payload for a container template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerEntry {
    pub kind: ContainerKind,
    /// Instantiations the type system allows. Empty means any.
    pub allowed_instantiations: Vec<String>,
}

impl ContainerEntry {
    pub fn new(kind: ContainerKind) -> Self {
        Self {
            kind,
            allowed_instantiations: Vec::new(),
        }
    }

    pub fn with_instantiation(mut self, name: impl Into<String>) -> Self {
        self.allowed_instantiations.push(name.into());
        self
    }

    /// Whether `name` is an allowed instantiation argument.
    pub fn allows(&self, name: &str) -> bool {
        self.allowed_instantiations.is_empty()
            || self.allowed_instantiations.iter().any(|n| n == name)
    }
}

/// Ownership model of a smart pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SmartPointerKind {
    #[default]
    Shared,
    Unique,
    /// Non-owning handle (weak pointer style).
    Handle,
    /// Handle that behaves like a value when copied.
    ValueHandle,
}

/// Registry payload for a smart-pointer template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartPointerEntry {
    pub kind: SmartPointerKind,
    /// Method returning the raw pointee (`get`, `data`).
    pub getter: String,
    /// Method releasing or resetting the pointee.
    pub reset_method: Option<String>,
    /// Method returning the reference count.
    pub ref_count_method: Option<String>,
    /// Method testing for null.
    pub null_check_method: Option<String>,
    /// Pointee types the type system allows. Empty means any.
    pub allowed_instantiations: Vec<String>,
}

impl SmartPointerEntry {
    pub fn new(kind: SmartPointerKind, getter: impl Into<String>) -> Self {
        Self {
            kind,
            getter: getter.into(),
            reset_method: None,
            ref_count_method: None,
            null_check_method: None,
            allowed_instantiations: Vec::new(),
        }
    }

    pub fn with_reset_method(mut self, name: impl Into<String>) -> Self {
        self.reset_method = Some(name.into());
        self
    }

    pub fn with_ref_count_method(mut self, name: impl Into<String>) -> Self {
        self.ref_count_method = Some(name.into());
        self
    }

    pub fn with_null_check_method(mut self, name: impl Into<String>) -> Self {
        self.null_check_method = Some(name.into());
        self
    }

    pub fn with_instantiation(mut self, name: impl Into<String>) -> Self {
        self.allowed_instantiations.push(name.into());
        self
    }
}
