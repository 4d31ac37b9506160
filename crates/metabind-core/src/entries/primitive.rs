//! Primitive type entry and the closed primitive family sets.
//!
//! The family sets drive promotion-order rules in overload sorting, so they are
//! fixed tables rather than something the type system can extend.

use bitflags::bitflags;

/// Signed integer spellings.
pub const SIGNED_INTEGER_TYPES: &[&str] = &[
    "char",
    "signed char",
    "short",
    "short int",
    "signed short",
    "signed short int",
    "int",
    "signed int",
    "long",
    "long int",
    "signed long",
    "signed long int",
    "long long",
    "long long int",
    "signed long long",
    "signed long long int",
    "ptrdiff_t",
];

/// Unsigned integer spellings.
pub const UNSIGNED_INTEGER_TYPES: &[&str] = &[
    "unsigned char",
    "unsigned short",
    "unsigned short int",
    "unsigned",
    "unsigned int",
    "unsigned long",
    "unsigned long int",
    "unsigned long long",
    "unsigned long long int",
    "size_t",
];

/// Floating point spellings.
pub const FLOATING_TYPES: &[&str] = &["float", "double", "long double"];

/// Character spellings.
pub const CHARACTER_TYPES: &[&str] = &[
    "char",
    "signed char",
    "unsigned char",
    "wchar_t",
    "char16_t",
    "char32_t",
];

bitflags! {
    /// Families a primitive belongs to. `char` is both a signed integer and a character.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PrimitiveFamilies: u8 {
        const SIGNED_INTEGER = 1 << 0;
        const UNSIGNED_INTEGER = 1 << 1;
        const FLOATING = 1 << 2;
        const CHARACTER = 1 << 3;
        const BOOLEAN = 1 << 4;
    }
}

impl PrimitiveFamilies {
    /// Classify a builtin spelling. Unknown names have no family.
    pub fn of(name: &str) -> Self {
        let mut families = Self::empty();
        if SIGNED_INTEGER_TYPES.contains(&name) {
            families |= Self::SIGNED_INTEGER;
        }
        if UNSIGNED_INTEGER_TYPES.contains(&name) {
            families |= Self::UNSIGNED_INTEGER;
        }
        if FLOATING_TYPES.contains(&name) {
            families |= Self::FLOATING;
        }
        if CHARACTER_TYPES.contains(&name) {
            families |= Self::CHARACTER;
        }
        if name == "bool" {
            families |= Self::BOOLEAN;
        }
        families
    }

    pub fn is_integral(self) -> bool {
        self.intersects(Self::SIGNED_INTEGER | Self::UNSIGNED_INTEGER | Self::BOOLEAN)
    }
}

/// Every builtin primitive seeded into a fresh registry.
pub fn builtin_primitive_names() -> impl Iterator<Item = &'static str> {
    let mut seen: Vec<&'static str> = Vec::new();
    SIGNED_INTEGER_TYPES
        .iter()
        .chain(UNSIGNED_INTEGER_TYPES)
        .chain(FLOATING_TYPES)
        .chain(CHARACTER_TYPES)
        .copied()
        .chain(std::iter::once("bool"))
        .filter(move |name| {
            if seen.contains(name) {
                false
            } else {
                seen.push(*name);
                true
            }
        })
}

/// Registry payload for a primitive type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrimitiveEntry {
    /// The primitive this one is an alias of (`qreal` -> `double`).
    pub referenced: Option<String>,
    /// Name on the target side, when it differs.
    pub target_name: Option<String>,
    /// Family membership of the basic referenced primitive.
    pub families: PrimitiveFamilies,
}

impl PrimitiveEntry {
    /// A builtin primitive classified by its own spelling.
    pub fn builtin(name: &str) -> Self {
        Self {
            referenced: None,
            target_name: None,
            families: PrimitiveFamilies::of(name),
        }
    }

    /// A primitive aliasing another one. Families are filled in on registration.
    pub fn alias_of(referenced: impl Into<String>) -> Self {
        Self {
            referenced: Some(referenced.into()),
            target_name: None,
            families: PrimitiveFamilies::empty(),
        }
    }

    pub fn with_target_name(mut self, name: impl Into<String>) -> Self {
        self.target_name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_is_signed_and_character() {
        let families = PrimitiveFamilies::of("char");
        assert!(families.contains(PrimitiveFamilies::SIGNED_INTEGER));
        assert!(families.contains(PrimitiveFamilies::CHARACTER));
        assert!(families.is_integral());
    }

    #[test]
    fn floating_is_not_integral() {
        let families = PrimitiveFamilies::of("double");
        assert_eq!(families, PrimitiveFamilies::FLOATING);
        assert!(!families.is_integral());
        assert!(PrimitiveFamilies::of("QString").is_empty());
    }

    #[test]
    fn builtins_are_unique() {
        let names: Vec<_> = builtin_primitive_names().collect();
        assert!(names.contains(&"unsigned long long"));
        assert!(names.contains(&"bool"));
        assert_eq!(names.iter().filter(|n| **n == "char").count(), 1);
    }
}
