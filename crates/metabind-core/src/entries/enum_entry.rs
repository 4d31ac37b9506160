//! Enum and flags type entries.

/// Registry payload for an enum.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumEntry {
    /// Name of the flags type wrapping this enum (`Qt::Alignment`).
    pub flags: Option<String>,
    /// `enum class`.
    pub scoped: bool,
}

impl EnumEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flags(mut self, flags: impl Into<String>) -> Self {
        self.flags = Some(flags.into());
        self
    }

    pub fn as_scoped(mut self) -> Self {
        self.scoped = true;
        self
    }
}

/// Registry payload for a flags type (`QFlags<Enum>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagsEntry {
    /// Qualified name of the wrapped enum.
    pub enum_name: String,
}

impl FlagsEntry {
    pub fn new(enum_name: impl Into<String>) -> Self {
        Self {
            enum_name: enum_name.into(),
        }
    }
}
