//! TypeDatabase - the single source of truth for type entries.
//!
//! Every type name the model refers to resolves to exactly one shared
//! [`TypeEntry`]. Entries are registered once, never mutated afterwards and
//! handed out as [`TypeEntryRef`] clones.
//!
//! A fresh database is seeded with the builtin primitives, `void` and `...`.
//!
//! # Example
//!
//! ```
//! use metabind_core::TypeEntry;
//! use metabind_registry::TypeDatabase;
//!
//! let mut db = TypeDatabase::new();
//! db.register(TypeEntry::value("QPoint")).unwrap();
//!
//! assert!(db.find("QPoint").is_some());
//! assert!(db.find("::QPoint").is_some());
//! assert!(db.is_signed_integer("int"));
//! ```

use std::sync::Arc;

use metabind_core::{
    EntryDetail, PrimitiveFamilies, RegistrationError, TypeEntry, TypeEntryRef, TypeKind,
    builtin_primitive_names,
};
use rustc_hash::FxHashMap;

/// Longest typedef or primitive alias chain followed before giving up.
const MAX_ALIAS_DEPTH: usize = 16;

/// Registry of all type entries for one run.
#[derive(Debug, Clone)]
pub struct TypeDatabase {
    by_name: FxHashMap<String, TypeEntryRef>,
    /// Registration order, for deterministic iteration.
    order: Vec<TypeEntryRef>,
}

impl Default for TypeDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeDatabase {
    /// A database seeded with builtin primitives, `void` and `...`.
    pub fn new() -> Self {
        let mut db = Self::empty();
        for name in builtin_primitive_names() {
            db.insert(TypeEntry::primitive(name));
        }
        db.insert(TypeEntry::void());
        db.insert(TypeEntry::varargs());
        db
    }

    /// A database with no entries at all.
    pub fn empty() -> Self {
        Self {
            by_name: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    fn insert(&mut self, entry: TypeEntry) -> TypeEntryRef {
        let entry = Arc::new(entry);
        self.by_name
            .insert(entry.qualified_name.clone(), Arc::clone(&entry));
        self.order.push(Arc::clone(&entry));
        entry
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register an entry.
    ///
    /// Registering an identical definition again returns the existing handle.
    /// A different definition under the same name is an error.
    pub fn register(&mut self, mut entry: TypeEntry) -> Result<TypeEntryRef, RegistrationError> {
        let name = entry.qualified_name.clone();
        if name.trim().is_empty() {
            return Err(RegistrationError::InvalidName(name));
        }

        // Aliased primitives inherit the families of what they alias.
        let referenced = entry.as_primitive().and_then(|p| p.referenced.clone());
        if let Some(referenced) = referenced {
            let families = PrimitiveFamilies::of(&self.basic_primitive_name(&referenced));
            if let EntryDetail::Primitive(prim) = &mut entry.detail {
                prim.families = families;
            }
        }

        if let Some(existing) = self.by_name.get(&name) {
            if **existing == entry {
                return Ok(Arc::clone(existing));
            }
            return Err(RegistrationError::DuplicateTypeEntry {
                name,
                existing: existing.kind().as_str(),
                new: entry.kind().as_str(),
            });
        }

        tracing::trace!(target: "metabind", name = %name, kind = entry.kind().as_str(), "registered type entry");
        Ok(self.insert(entry))
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Find an entry by qualified name, following typedefs.
    pub fn find(&self, name: &str) -> Option<TypeEntryRef> {
        let mut entry = self.find_exact(name)?;
        for _ in 0..MAX_ALIAS_DEPTH {
            let EntryDetail::Typedef { source } = &entry.detail else {
                return Some(entry);
            };
            entry = self.find_exact(source)?;
        }
        None
    }

    /// Find an entry by qualified name without following typedefs.
    pub fn find_exact(&self, name: &str) -> Option<TypeEntryRef> {
        let name = name.trim();
        let name = name.strip_prefix("::").unwrap_or(name);
        self.by_name.get(name).cloned()
    }

    /// Find `name` from inside `namespace`, innermost scope first.
    pub fn find_in_scope(&self, name: &str, namespace: &[String]) -> Option<TypeEntryRef> {
        if name.starts_with("::") {
            return self.find(name);
        }
        for depth in (1..=namespace.len()).rev() {
            let candidate = format!("{}::{}", namespace[..depth].join("::"), name);
            if let Some(entry) = self.find(&candidate) {
                return Some(entry);
            }
        }
        self.find(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find_exact(name).is_some()
    }

    pub fn find_container(&self, name: &str) -> Option<TypeEntryRef> {
        self.find(name).filter(|e| e.is_container())
    }

    pub fn find_smart_pointer(&self, name: &str) -> Option<TypeEntryRef> {
        self.find(name).filter(|e| e.is_smart_pointer())
    }

    /// Name of a template instantiation: `QMap<QString, int>`.
    pub fn instantiation_name(template: &str, arguments: &[&str]) -> String {
        format!("{}<{}>", template, arguments.join(", "))
    }

    // ==========================================================================
    // Primitives
    // ==========================================================================

    /// Follow the primitive alias chain (`qreal` -> `double`) to its end.
    pub fn basic_referenced_primitive(&self, entry: &TypeEntryRef) -> TypeEntryRef {
        let mut current = Arc::clone(entry);
        for _ in 0..MAX_ALIAS_DEPTH {
            let next = current
                .as_primitive()
                .and_then(|p| p.referenced.as_deref())
                .and_then(|name| self.find(name));
            match next {
                Some(next) if next.is_primitive() => current = next,
                _ => break,
            }
        }
        current
    }

    fn basic_primitive_name(&self, name: &str) -> String {
        match self.find(name) {
            Some(entry) => self.basic_referenced_primitive(&entry).qualified_name.clone(),
            None => name.to_string(),
        }
    }

    fn families_of(&self, name: &str) -> PrimitiveFamilies {
        self.find(name)
            .and_then(|e| e.as_primitive().map(|p| p.families))
            .unwrap_or_else(|| PrimitiveFamilies::of(name))
    }

    pub fn is_signed_integer(&self, name: &str) -> bool {
        self.families_of(name)
            .contains(PrimitiveFamilies::SIGNED_INTEGER)
    }

    pub fn is_unsigned_integer(&self, name: &str) -> bool {
        self.families_of(name)
            .contains(PrimitiveFamilies::UNSIGNED_INTEGER)
    }

    pub fn is_floating(&self, name: &str) -> bool {
        self.families_of(name).contains(PrimitiveFamilies::FLOATING)
    }

    pub fn is_character(&self, name: &str) -> bool {
        self.families_of(name).contains(PrimitiveFamilies::CHARACTER)
    }

    // ==========================================================================
    // Iteration
    // ==========================================================================

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeEntryRef> {
        self.order.iter()
    }

    pub fn entries_of_kind(&self, kind: TypeKind) -> impl Iterator<Item = &TypeEntryRef> {
        self.order.iter().filter(move |e| e.kind() == kind)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
