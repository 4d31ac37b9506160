use crate::{QualifiedName, SourceLocation, TypeEntryRef};

/// One enumerator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaEnumValue {
    pub name: String,
    pub value: i64,
}

/// An enumeration in the semantic model.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaEnum {
    pub name: QualifiedName,
    pub entry: TypeEntryRef,
    pub values: Vec<MetaEnumValue>,
    pub scoped: bool,
    /// Name of the flags type wrapping this enum.
    pub flags: Option<String>,
    pub location: SourceLocation,
}

impl MetaEnum {
    pub fn new(entry: TypeEntryRef) -> Self {
        let (scoped, flags) = entry
            .as_enum()
            .map(|e| (e.scoped, e.flags.clone()))
            .unwrap_or_default();
        Self {
            name: entry.name.clone(),
            entry,
            values: Vec::new(),
            scoped,
            flags,
            location: SourceLocation::default(),
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, value: i64) -> Self {
        self.values.push(MetaEnumValue {
            name: name.into(),
            value,
        });
        self
    }

    pub fn find_value(&self, name: &str) -> Option<&MetaEnumValue> {
        self.values.iter().find(|v| v.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EnumEntry, TypeEntry};
    use std::sync::Arc;

    #[test]
    fn enum_picks_up_entry_flags() {
        let entry = TypeEntry::enumeration("Qt::AlignmentFlag")
            .with_enum(EnumEntry::new().with_flags("Qt::Alignment"));
        let meta = MetaEnum::new(Arc::new(entry))
            .with_value("AlignLeft", 1)
            .with_value("AlignRight", 2);
        assert_eq!(meta.flags.as_deref(), Some("Qt::Alignment"));
        assert_eq!(meta.find_value("AlignRight").map(|v| v.value), Some(2));
        assert_eq!(meta.name.simple_name(), "AlignmentFlag");
    }
}
