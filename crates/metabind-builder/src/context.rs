//! BuildContext - everything one run shares between passes.
//!
//! Replaces process-wide state: the registry, the type-from-string cache,
//! the options and the diagnostic stream all live here and are dropped
//! when the run ends. Nothing in the cache is ever invalidated mid-run.

use metabind_core::{
    BuildOptions, Diagnostic, Diagnostics, MetaType, TypeEntry, TypeEntryRef,
};
use metabind_registry::TypeDatabase;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Cache key: the lookup scope (namespace plus template parameters) and the text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TypeKey {
    scope: String,
    text: String,
}

/// Per-run build state.
#[derive(Debug)]
pub struct BuildContext {
    registry: TypeDatabase,
    type_cache: FxHashMap<TypeKey, MetaType>,
    /// Entries made up during resolution (template parameters, literals,
    /// array wrappers). Shared so every use points at the same handle.
    synthesized: FxHashMap<String, TypeEntryRef>,
    options: BuildOptions,
    diagnostics: Diagnostics,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::new(TypeDatabase::new(), BuildOptions::default())
    }
}

impl BuildContext {
    pub fn new(registry: TypeDatabase, options: BuildOptions) -> Self {
        Self {
            registry,
            type_cache: FxHashMap::default(),
            synthesized: FxHashMap::default(),
            options,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn registry(&self) -> &TypeDatabase {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TypeDatabase {
        &mut self.registry
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    // ==========================================================================
    // Diagnostics
    // ==========================================================================

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Move the diagnostics collected so far out of the context.
    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }

    // ==========================================================================
    // Caches
    // ==========================================================================

    pub(crate) fn cached_type(&self, scope: &str, text: &str) -> Option<MetaType> {
        self.type_cache
            .get(&TypeKey {
                scope: scope.to_string(),
                text: text.to_string(),
            })
            .cloned()
    }

    pub(crate) fn cache_type(&mut self, scope: &str, text: &str, ty: MetaType) {
        self.type_cache.insert(
            TypeKey {
                scope: scope.to_string(),
                text: text.to_string(),
            },
            ty,
        );
    }

    pub fn cached_type_count(&self) -> usize {
        self.type_cache.len()
    }

    /// Shared handle for an entry that is not part of the registry.
    pub(crate) fn synthesized_entry(
        &mut self,
        key: &str,
        make: impl FnOnce() -> TypeEntry,
    ) -> TypeEntryRef {
        Arc::clone(
            self.synthesized
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(make())),
        )
    }

    /// Split into the registry and the diagnostics at the end of a run.
    pub fn into_parts(self) -> (TypeDatabase, Diagnostics) {
        (self.registry, self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metabind_core::DiagnosticKind;

    #[test]
    fn synthesized_entries_are_shared() {
        let mut ctx = BuildContext::default();
        let a = ctx.synthesized_entry("T#0", || TypeEntry::template_argument("T", 0));
        let b = ctx.synthesized_entry("T#0", || TypeEntry::template_argument("T", 1));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.template_ordinal(), Some(0));
    }

    #[test]
    fn diagnostics_can_be_taken() {
        let mut ctx = BuildContext::default();
        ctx.report(Diagnostic::warning(DiagnosticKind::UnknownBaseClass, "QFoo"));
        assert_eq!(ctx.diagnostics().len(), 1);
        let taken = ctx.take_diagnostics();
        assert_eq!(taken.len(), 1);
        assert!(ctx.diagnostics().is_empty());
    }
}
