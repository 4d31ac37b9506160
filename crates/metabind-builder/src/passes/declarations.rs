//! Declaration pass - build classes, functions, fields and enums from the
//! declaration tree.
//!
//! ## Responsibilities
//!
//! - Namespaces with a type-system entry become namespace classes; their
//!   functions and enums attach to that class. Other namespaces only scope
//!   lookups and their members go global.
//! - Classes need a Value, Object or Namespace entry. Undeclared classes are
//!   skipped with a warning unless the options ask for auto-registration.
//! - Every type text is resolved from the innermost scope outwards. A function
//!   or field whose type does not resolve is dropped with an error.
//! - Rejection rules drop classes, functions and fields with an info note.

use std::sync::Arc;

use metabind_core::{
    ClassAttributes, ClassDecl, Declaration, Diagnostic, DiagnosticKind, EnumDecl, EnumEntry,
    FunctionAttributes, FunctionDecl, FunctionKind, MetaArgument, MetaClass, MetaEnum, MetaField,
    MetaFunction, MetaType, NamespaceDecl, QualifiedName, ReferenceKind, SourceLocation, TypeEntry,
    TypeEntryRef, TypeKind, TypeSystem, TypedefDecl,
};

use crate::context::BuildContext;
use crate::model::ApiModel;
use crate::type_resolver::TypeResolver;

/// Counts of what the pass added to the model.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeclarationOutput {
    pub classes: usize,
    pub functions: usize,
    pub fields: usize,
    pub enums: usize,
    /// Declarations dropped by rejection, missing entries or unresolved types.
    pub skipped: usize,
}

pub struct DeclarationPass<'a> {
    ctx: &'a mut BuildContext,
    typesystem: &'a TypeSystem,
    output: DeclarationOutput,
}

impl<'a> DeclarationPass<'a> {
    pub fn new(ctx: &'a mut BuildContext, typesystem: &'a TypeSystem) -> Self {
        Self {
            ctx,
            typesystem,
            output: DeclarationOutput::default(),
        }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, declarations: &[Declaration], model: &mut ApiModel) -> DeclarationOutput {
        self.visit_items(declarations, &[], None, model);
        tracing::debug!(
            target: "metabind",
            classes = self.output.classes,
            functions = self.output.functions,
            fields = self.output.fields,
            enums = self.output.enums,
            skipped = self.output.skipped,
            "declarations processed"
        );
        self.output
    }

    fn visit_items(
        &mut self,
        items: &[Declaration],
        scope: &[String],
        owner: Option<&QualifiedName>,
        model: &mut ApiModel,
    ) {
        // Typedefs first so later items in the same scope can use them.
        for item in items {
            if let Declaration::Typedef(decl) = item {
                self.register_typedef(decl, scope);
            }
        }
        for item in items {
            match item {
                Declaration::Namespace(ns) => self.visit_namespace(ns, scope, model),
                Declaration::Class(class) => self.visit_class(class, scope, model),
                Declaration::Function(function) => {
                    self.add_scope_function(function, scope, owner, model)
                }
                Declaration::Enum(decl) => self.add_scope_enum(decl, scope, owner, model),
                Declaration::Typedef(_) => {}
            }
        }
    }

    // ==========================================================================
    // Namespaces
    // ==========================================================================

    fn visit_namespace(&mut self, ns: &NamespaceDecl, scope: &[String], model: &mut ApiModel) {
        let mut inner = scope.to_vec();
        inner.push(ns.name.clone());
        let qualified = inner.join("::");

        let owner = match self.ctx.registry().find_exact(&qualified) {
            Some(entry) if entry.is_namespace() => {
                // Reopened namespaces reuse the class made the first time.
                if !model.contains_class(&qualified) {
                    let mut class = MetaClass::new(Arc::clone(&entry));
                    class.location = ns.location.clone();
                    model.add_class(class);
                    self.output.classes += 1;
                }
                Some(entry.name.clone())
            }
            _ => None,
        };
        self.visit_items(&ns.items, &inner, owner.as_ref(), model);
    }

    fn add_scope_function(
        &mut self,
        decl: &FunctionDecl,
        scope: &[String],
        owner: Option<&QualifiedName>,
        model: &mut ApiModel,
    ) {
        let Some(mut function) = self.build_function(decl, owner, None, scope, &[]) else {
            return;
        };
        self.output.functions += 1;
        match owner.and_then(|o| model.find_class_mut(&o.to_string())) {
            Some(class) => {
                function.attributes |= FunctionAttributes::STATIC;
                class.add_function(function);
            }
            None => model.global_functions.push(Arc::new(function)),
        }
    }

    fn add_scope_enum(
        &mut self,
        decl: &EnumDecl,
        scope: &[String],
        owner: Option<&QualifiedName>,
        model: &mut ApiModel,
    ) {
        let Some(meta) = self.build_enum(decl, scope) else {
            return;
        };
        match owner.and_then(|o| model.find_class_mut(&o.to_string())) {
            Some(class) => class.enums.push(meta),
            None => model.global_enums.push(meta),
        }
    }

    // ==========================================================================
    // Classes
    // ==========================================================================

    fn visit_class(&mut self, decl: &ClassDecl, scope: &[String], model: &mut ApiModel) {
        let mut class_scope = scope.to_vec();
        class_scope.push(decl.name.clone());
        let qualified = class_scope.join("::");

        if self.typesystem.is_class_rejected(&qualified) {
            self.reject(format!("{qualified}: class rejected"), &decl.location);
            return;
        }
        let Some(entry) = self.entry_for(&qualified, &decl.location, || TypeEntry::object(&qualified))
        else {
            return;
        };
        if !matches!(entry.kind(), TypeKind::Value | TypeKind::Object | TypeKind::Namespace) {
            tracing::debug!(target: "metabind", class = %qualified, kind = entry.kind().as_str(), "not a class entry, skipped");
            return;
        }
        if model.contains_class(&qualified) {
            tracing::debug!(target: "metabind", class = %qualified, "class declared twice, keeping the first");
            return;
        }

        for typedef in &decl.typedefs {
            self.register_typedef(typedef, &class_scope);
        }

        let mut class = MetaClass::new(Arc::clone(&entry));
        class.base_names = decl.bases.clone();
        class.template_parameters = decl.template_parameters.clone();
        class.location = decl.location.clone();
        if decl.is_final {
            class.attributes |= ClassAttributes::FINAL;
        }
        if decl.has_private_destructor {
            class.attributes |= ClassAttributes::PRIVATE_DESTRUCTOR;
        }
        if decl.has_virtual_destructor {
            class.attributes |= ClassAttributes::HAS_VIRTUAL_DESTRUCTOR;
        }

        for enum_decl in &decl.enums {
            if let Some(meta) = self.build_enum(enum_decl, &class_scope) {
                class.enums.push(meta);
            }
        }

        let mut has_virtual = false;
        for function_decl in &decl.functions {
            has_virtual |= function_decl.attributes.contains(FunctionAttributes::VIRTUAL);
            if let Some(function) = self.build_function(
                function_decl,
                Some(&class.name),
                Some(&decl.name),
                &class_scope,
                &decl.template_parameters,
            ) {
                class.add_function(function);
                self.output.functions += 1;
            }
        }
        if class.functions.iter().any(|f| f.is_abstract()) {
            class.attributes |= ClassAttributes::ABSTRACT;
        }
        let polymorphic_base = entry.as_complex().is_some_and(|c| c.polymorphic_base);
        if has_virtual || decl.has_virtual_destructor || polymorphic_base {
            class.attributes |= ClassAttributes::POLYMORPHIC;
        }

        for field in &decl.fields {
            if self.typesystem.is_field_rejected(&qualified, &field.name) {
                self.reject(format!("{qualified}::{}: field rejected", field.name), &field.location);
                continue;
            }
            let what = format!("{qualified}::{}", field.name);
            let Some(ty) = self.resolve(
                &field.type_text,
                &class_scope,
                &decl.template_parameters,
                &what,
                &field.location,
            ) else {
                continue;
            };
            class.fields.push(MetaField {
                name: field.name.clone(),
                ty,
                access: field.access,
                is_static: field.is_static,
                location: field.location.clone(),
            });
            self.output.fields += 1;
        }

        model.add_class(class);
        self.output.classes += 1;

        for nested in &decl.classes {
            self.visit_class(nested, &class_scope, model);
        }
    }

    // ==========================================================================
    // Functions
    // ==========================================================================

    fn build_function(
        &mut self,
        decl: &FunctionDecl,
        owner: Option<&QualifiedName>,
        class_name: Option<&str>,
        scope: &[String],
        template_parameters: &[String],
    ) -> Option<MetaFunction> {
        let owner_text = owner.map(ToString::to_string).unwrap_or_default();
        let display = if owner_text.is_empty() {
            decl.name.clone()
        } else {
            format!("{owner_text}::{}", decl.name)
        };

        if self.typesystem.is_function_rejected(&owner_text, &decl.name) {
            self.reject(format!("{display}: function rejected"), &decl.location);
            return None;
        }

        let kind = decl
            .kind
            .unwrap_or_else(|| FunctionKind::classify(&decl.name, class_name));
        if kind == FunctionKind::Destructor {
            return None;
        }

        let mut function = MetaFunction::new(&decl.name, kind)
            .with_attributes(decl.attributes)
            .with_access(decl.access)
            .at(decl.location.clone());
        if let Some(owner) = owner {
            function = function.with_owner(owner.clone());
        }

        for (position, arg) in decl.arguments.iter().enumerate() {
            let ty = self.resolve(&arg.type_text, scope, template_parameters, &display, &decl.location)?;
            let mut argument = MetaArgument::new(&arg.name, ty, position);
            if let Some(default) = &arg.default_value {
                argument = argument.with_default(default.clone());
            }
            function.arguments.push(argument);
        }

        let return_text = match kind {
            FunctionKind::ConversionOperator if decl.return_type.trim().is_empty() => decl
                .name
                .trim_start_matches("operator")
                .trim()
                .to_string(),
            _ => decl.return_type.clone(),
        };
        if !return_text.trim().is_empty() {
            let ty = self.resolve(&return_text, scope, template_parameters, &display, &decl.location)?;
            function = function.with_return_type(ty);
        }

        refine_constructor_kind(&mut function, &owner_text);
        Some(function)
    }

    // ==========================================================================
    // Enums and typedefs
    // ==========================================================================

    fn build_enum(&mut self, decl: &EnumDecl, scope: &[String]) -> Option<MetaEnum> {
        let mut path = scope.to_vec();
        path.push(decl.name.clone());
        let qualified = path.join("::");

        let entry = self.entry_for(&qualified, &decl.location, || {
            let detail = if decl.scoped {
                EnumEntry::new().as_scoped()
            } else {
                EnumEntry::new()
            };
            TypeEntry::enumeration(&qualified).with_enum(detail)
        })?;
        if !entry.is_enum() {
            tracing::debug!(target: "metabind", name = %qualified, "not an enum entry, skipped");
            return None;
        }

        let mut meta = MetaEnum::new(entry);
        meta.scoped |= decl.scoped;
        meta.location = decl.location.clone();
        for (name, value) in &decl.values {
            meta = meta.with_value(name.clone(), *value);
        }
        self.output.enums += 1;
        Some(meta)
    }

    fn register_typedef(&mut self, decl: &TypedefDecl, scope: &[String]) {
        let mut path = scope.to_vec();
        path.push(decl.name.clone());
        let qualified = path.join("::");
        if self.ctx.registry().contains(&qualified) {
            return;
        }
        if let Err(err) = self
            .ctx
            .registry_mut()
            .register(TypeEntry::typedef(&qualified, decl.target.clone()))
        {
            self.ctx
                .report(Diagnostic::error(DiagnosticKind::InvalidTypeName, err.to_string()).at(&decl.location));
        }
    }

    // ==========================================================================
    // Helpers
    // ==========================================================================

    /// The entry for a declared class or enum, auto-registering it when the
    /// options allow it.
    fn entry_for(
        &mut self,
        qualified: &str,
        location: &SourceLocation,
        make: impl FnOnce() -> TypeEntry,
    ) -> Option<TypeEntryRef> {
        if let Some(entry) = self.ctx.registry().find_exact(qualified) {
            return Some(entry);
        }
        if self.ctx.options().skip_undeclared_classes {
            self.output.skipped += 1;
            self.ctx.report(
                Diagnostic::warning(
                    DiagnosticKind::MissingTypeSystemEntry,
                    format!("{qualified}: no type-system entry, skipped"),
                )
                .at(location),
            );
            return None;
        }

        let mut entry = make();
        if let Some(package) = &self.typesystem.package {
            entry = entry.with_target_package(package.clone());
        }
        match self.ctx.registry_mut().register(entry) {
            Ok(entry) => Some(entry),
            Err(err) => {
                self.ctx
                    .report(Diagnostic::error(DiagnosticKind::InvalidTypeName, err.to_string()).at(location));
                None
            }
        }
    }

    fn resolve(
        &mut self,
        text: &str,
        scope: &[String],
        template_parameters: &[String],
        what: &str,
        location: &SourceLocation,
    ) -> Option<MetaType> {
        let result = TypeResolver::new(self.ctx, scope)
            .with_template_parameters(template_parameters)
            .resolve_text(text);
        match result {
            Ok(ty) => Some(ty),
            Err(err) => {
                self.output.skipped += 1;
                self.ctx.report(
                    Diagnostic::error(DiagnosticKind::UnresolvedType, format!("{what}: {err}"))
                        .at(location),
                );
                None
            }
        }
    }

    fn reject(&mut self, message: String, location: &SourceLocation) {
        self.output.skipped += 1;
        self.ctx
            .report(Diagnostic::info(DiagnosticKind::Rejected, message).at(location));
    }
}

/// A constructor taking its own class by reference, with every other
/// argument defaulted, is a copy (`&`) or move (`&&`) constructor.
pub(crate) fn refine_constructor_kind(function: &mut MetaFunction, owner: &str) {
    if function.kind != FunctionKind::Constructor || owner.is_empty() {
        return;
    }
    let Some(first) = function.arguments.first() else {
        return;
    };
    let (min_args, _) = function.min_max_arguments();
    if min_args > 1 || first.ty.entry().name() != owner || !first.ty.indirections().is_empty() {
        return;
    }
    match first.ty.reference() {
        ReferenceKind::LValue => function.kind = FunctionKind::CopyConstructor,
        ReferenceKind::RValue => function.kind = FunctionKind::MoveConstructor,
        ReferenceKind::None => {}
    }
}
