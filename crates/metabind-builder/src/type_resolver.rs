//! Type resolution from type text to [`MetaType`].
//!
//! ## Lookup order
//!
//! 1. `...` resolves to the varargs entry
//! 2. Numeric literals become constant-value entries
//! 3. Template parameters of the enclosing class become template-argument entries
//! 4. Names are looked up from the innermost enclosing scope outwards
//! 5. Typedefs whose source has a shape of its own (`typedef QList<int> IntList`)
//!    are expanded and the use-site shape is layered on top
//!
//! Resolved text is cached per scope for the rest of the run.

use metabind_core::{EntryDetail, MetaType, MetabindError, ModelError, TypeEntry, TypeEntryRef};
use metabind_parser::TypeInfo;

use crate::context::BuildContext;

/// Longest typedef chain expanded before giving up.
const MAX_TYPEDEF_DEPTH: usize = 16;

/// Resolves type text inside one lookup scope.
pub struct TypeResolver<'a> {
    ctx: &'a mut BuildContext,
    namespace: &'a [String],
    template_parameters: &'a [String],
}

impl<'a> TypeResolver<'a> {
    /// A resolver looking up names from `namespace` outwards.
    pub fn new(ctx: &'a mut BuildContext, namespace: &'a [String]) -> Self {
        Self {
            ctx,
            namespace,
            template_parameters: &[],
        }
    }

    /// Names in `parameters` resolve to template-argument entries.
    pub fn with_template_parameters(mut self, parameters: &'a [String]) -> Self {
        self.template_parameters = parameters;
        self
    }

    /// Parse and resolve `text`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve_text(&mut self, text: &str) -> Result<MetaType, MetabindError> {
        let scope = self.scope_key();
        if let Some(ty) = self.ctx.cached_type(&scope, text) {
            return Ok(ty);
        }
        let info = TypeInfo::parse(text)?;
        let ty = self.resolve(&info)?;
        self.ctx.cache_type(&scope, text, ty.clone());
        Ok(ty)
    }

    /// Resolve an already parsed type.
    pub fn resolve(&mut self, info: &TypeInfo) -> Result<MetaType, ModelError> {
        self.resolve_with_depth(info, 0)
    }

    fn resolve_with_depth(&mut self, info: &TypeInfo, depth: usize) -> Result<MetaType, ModelError> {
        let entry = match self.resolve_entry(info)? {
            Resolved::Entry(entry) => entry,
            Resolved::Typedef(source) => {
                if depth >= MAX_TYPEDEF_DEPTH {
                    return Err(self.unresolved(info));
                }
                let expanded = layer_shape(source, info);
                return self.resolve_with_depth(&expanded, depth + 1);
            }
        };

        let mut ty = MetaType::new(entry);
        let mut instantiations = Vec::with_capacity(info.instantiations.len());
        for instantiation in &info.instantiations {
            instantiations.push(self.resolve_with_depth(instantiation, depth)?);
        }
        if !instantiations.is_empty() {
            ty.set_instantiations(instantiations);
        }
        if !info.indirections.is_empty() {
            ty.set_indirections(info.indirections.clone());
        }
        if info.reference.is_reference() {
            ty.set_reference(info.reference);
        }
        if info.volatile {
            ty.set_volatile(true);
        }
        // Last, so const object pointers by reference are normalized.
        if info.constant {
            ty.set_constant(true);
        }

        for dimension in info.array_dimensions.iter().rev() {
            let element_entry = ty.entry().clone();
            let key = format!("{}[]", element_entry.qualified_name);
            let array_entry = self
                .ctx
                .synthesized_entry(&key, || TypeEntry::array(element_entry));
            ty = MetaType::fixed_array(array_entry, ty, *dimension);
        }
        Ok(ty)
    }

    fn resolve_entry(&mut self, info: &TypeInfo) -> Result<Resolved, ModelError> {
        if info.is_varargs {
            return self
                .ctx
                .registry()
                .find("...")
                .map(Resolved::Entry)
                .ok_or_else(|| self.unresolved(info));
        }

        let name = info.qualified_name();
        if info.is_literal {
            let entry = self
                .ctx
                .synthesized_entry(&format!("#{name}"), || TypeEntry::constant_value(&name));
            return Ok(Resolved::Entry(entry));
        }

        if info.name.len() == 1 {
            if let Some(ordinal) = self.template_parameters.iter().position(|p| *p == name) {
                let key = format!("{}#{}", name, ordinal);
                let entry = self
                    .ctx
                    .synthesized_entry(&key, || TypeEntry::template_argument(&name, ordinal));
                return Ok(Resolved::Entry(entry));
            }
        }

        let entry = self.find_in_scope(&name).ok_or_else(|| self.unresolved(info))?;
        if let EntryDetail::Typedef { source } = &entry.detail {
            let source = TypeInfo::parse(source).map_err(|e| ModelError::UnresolvedType {
                name: name.clone(),
                context: e.to_string(),
            })?;
            return Ok(Resolved::Typedef(source));
        }
        Ok(Resolved::Entry(entry))
    }

    /// Exact lookup walking enclosing scopes, without following typedefs.
    fn find_in_scope(&self, name: &str) -> Option<TypeEntryRef> {
        let registry = self.ctx.registry();
        if name.starts_with("::") {
            return registry.find_exact(name);
        }
        for depth in (1..=self.namespace.len()).rev() {
            let candidate = format!("{}::{}", self.namespace[..depth].join("::"), name);
            if let Some(entry) = registry.find_exact(&candidate) {
                return Some(entry);
            }
        }
        registry.find_exact(name)
    }

    fn scope_key(&self) -> String {
        format!(
            "{}<{}>",
            self.namespace.join("::"),
            self.template_parameters.join(",")
        )
    }

    fn unresolved(&self, info: &TypeInfo) -> ModelError {
        let context = if self.namespace.is_empty() {
            "global scope".to_string()
        } else {
            self.namespace.join("::")
        };
        ModelError::UnresolvedType {
            name: info.qualified_name(),
            context,
        }
    }
}

enum Resolved {
    Entry(TypeEntryRef),
    Typedef(TypeInfo),
}

/// Put the use-site qualifiers of `usage` on top of a typedef's source.
fn layer_shape(mut source: TypeInfo, usage: &TypeInfo) -> TypeInfo {
    source.constant |= usage.constant;
    source.volatile |= usage.volatile;
    source.indirections.extend(usage.indirections.iter().copied());
    if usage.reference.is_reference() {
        source.reference = usage.reference;
    }
    source
        .array_dimensions
        .extend(usage.array_dimensions.iter().copied());
    source
}
