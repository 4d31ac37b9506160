//! Modification pass - apply function modification rules.
//!
//! A rule matches functions of its owner (or the globals) by minimal
//! signature, or every overload when it names only the function. Rules that
//! match nothing are reported so typos in the type system do not go unnoticed.

use std::sync::Arc;

use metabind_core::{
    ArgumentModification, Diagnostic, DiagnosticKind, FunctionModification, MetaFunction,
    ModelError, TypeSystem,
};

use crate::context::BuildContext;
use crate::model::ApiModel;
use crate::passes::scope_of;
use crate::type_resolver::TypeResolver;

pub struct ModificationPass<'a> {
    ctx: &'a mut BuildContext,
    typesystem: &'a TypeSystem,
    /// Which rules matched at least one function, by rule index.
    matched: Vec<bool>,
}

impl<'a> ModificationPass<'a> {
    pub fn new(ctx: &'a mut BuildContext, typesystem: &'a TypeSystem) -> Self {
        Self {
            ctx,
            typesystem,
            matched: vec![false; typesystem.modifications.len()],
        }
    }

    /// Apply every rule. Returns the number of functions touched.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, model: &mut ApiModel) -> usize {
        let mut modified = 0;

        for class in &mut model.classes {
            let owner = class.qualified_name().to_string();
            let scope = scope_of(&class.name);
            modified += self.modify_all(Some(&owner), &scope, &mut class.functions);
        }
        modified += self.modify_all(None, &[], &mut model.global_functions);

        for (rule, matched) in self.typesystem.modifications.iter().zip(&self.matched) {
            if !matched {
                let target = match &rule.owner {
                    Some(owner) => format!("{owner}::{}", rule.signature),
                    None => rule.signature.clone(),
                };
                self.ctx.report(Diagnostic::warning(
                    DiagnosticKind::UnmatchedModification,
                    format!("modification of '{target}' matches no function"),
                ));
            }
        }

        tracing::debug!(target: "metabind", modified, "function modifications applied");
        modified
    }

    fn modify_all(
        &mut self,
        owner: Option<&str>,
        scope: &[String],
        functions: &mut Vec<Arc<MetaFunction>>,
    ) -> usize {
        let typesystem = self.typesystem;
        let mut modified = 0;
        let mut removed = Vec::new();

        for (index, function) in functions.iter_mut().enumerate() {
            let signature = function.minimal_signature();
            let rules: Vec<usize> = typesystem
                .modifications_for(owner, &function.original_name, &signature)
                .filter_map(|rule| self.rule_index(rule))
                .collect();
            if rules.is_empty() {
                continue;
            }

            let function = Arc::make_mut(function);
            for rule_index in rules {
                self.matched[rule_index] = true;
                let rule = &typesystem.modifications[rule_index];
                if rule.remove {
                    removed.push(index);
                }
                self.apply(rule, function, scope);
            }
            modified += 1;
        }

        if !removed.is_empty() {
            let mut index = 0;
            functions.retain(|_| {
                let keep = !removed.contains(&index);
                index += 1;
                keep
            });
        }
        modified
    }

    fn rule_index(&self, rule: &FunctionModification) -> Option<usize> {
        self.typesystem
            .modifications
            .iter()
            .position(|candidate| std::ptr::eq(candidate, rule))
    }

    fn apply(&mut self, rule: &FunctionModification, function: &mut MetaFunction, scope: &[String]) {
        if let Some(name) = &rule.rename {
            function.name = name.clone();
        }
        if let Some(access) = rule.access {
            function.access = access;
        }
        if let Some(number) = rule.overload_number {
            function.overload_number = Some(number);
        }
        for modification in &rule.arguments {
            self.apply_argument(modification, function, scope);
        }
    }

    fn apply_argument(
        &mut self,
        modification: &ArgumentModification,
        function: &mut MetaFunction,
        scope: &[String],
    ) {
        let display = function.qualified_name();
        let location = function.location.clone();
        let Some(argument) = function.arguments.get_mut(modification.index) else {
            self.ctx.report(
                Diagnostic::warning(
                    DiagnosticKind::UnmatchedModification,
                    format!("{display}: no argument at index {}", modification.index),
                )
                .at(&location),
            );
            return;
        };

        if modification.remove {
            argument.removed = true;
        }
        if modification.remove_default {
            argument.default_value = None;
        }
        if let Some(default) = &modification.default_value {
            argument.default_value = Some(default.clone());
        }
        if let Some(name) = &modification.rename {
            argument.name = name.clone();
        }
        if let Some(text) = &modification.replace_type {
            match TypeResolver::new(self.ctx, scope).resolve_text(text) {
                Ok(ty) => argument.modified_type = Some(ty),
                Err(err) => {
                    self.ctx.report(
                        Diagnostic::error(DiagnosticKind::UnresolvedType, format!("{display}: {err}"))
                            .at(&location),
                    );
                }
            }
        }
        if modification.array {
            let target = argument.modified_type.as_mut().unwrap_or(&mut argument.ty);
            if let Err(source) = target.apply_array_modification() {
                let err = ModelError::ArrayModificationConflict {
                    function: display,
                    position: modification.index,
                    source,
                };
                self.ctx.report(
                    Diagnostic::warning(DiagnosticKind::ArrayModificationConflict, err.to_string())
                        .at(&location),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metabind_core::{
        Access, ClassDecl, Declaration, FunctionDecl, TypeUsagePattern,
    };

    use crate::passes::{DeclarationPass, RegistrationPass};

    fn build(ts: &TypeSystem, decls: Vec<Declaration>) -> (ApiModel, BuildContext) {
        let mut ctx = BuildContext::default();
        RegistrationPass::new(&mut ctx, ts).run();
        let mut model = ApiModel::new();
        DeclarationPass::new(&mut ctx, ts).run(&decls, &mut model);
        ModificationPass::new(&mut ctx, ts).run(&mut model);
        (model, ctx)
    }

    fn painter() -> Vec<Declaration> {
        vec![Declaration::Class(
            ClassDecl::new("QPainter")
                .function(
                    FunctionDecl::new("drawLines", "void")
                        .arg("const QLine *", "lines")
                        .arg("int", "count"),
                )
                .function(FunctionDecl::new("drawText", "void").arg_with_default("int", "flags", "0"))
                .function(FunctionDecl::new("end", "bool"))
                .function(FunctionDecl::new("device", "int")),
        )]
    }

    fn typesystem() -> TypeSystem {
        TypeSystem::new().object_type("QPainter").value_type("QLine")
    }

    #[test]
    fn argument_modifications() {
        let ts = typesystem()
            .modify(
                FunctionModification::new(Some("QPainter"), "drawLines(const QLine*,int)")
                    .argument(ArgumentModification::new(0).array().rename("data"))
                    .argument(ArgumentModification::new(1).remove()),
            )
            .modify(
                FunctionModification::new(Some("QPainter"), "drawText")
                    .argument(ArgumentModification::new(0).remove_default())
                    .overload_number(2),
            );
        let (model, ctx) = build(&ts, painter());
        assert!(ctx.diagnostics().is_empty(), "{}", ctx.diagnostics());

        let painter = model.find_class("QPainter").unwrap();
        let draw = painter.functions_named("drawLines").next().unwrap();
        assert_eq!(draw.arguments[0].name, "data");
        assert_eq!(draw.arguments[0].ty.pattern(), TypeUsagePattern::NativePointerAsArray);
        assert!(draw.arguments[1].removed);
        assert_eq!(draw.min_max_arguments(), (1, 1));

        let text = painter.functions_named("drawText").next().unwrap();
        assert!(!text.arguments[0].has_default_value());
        assert_eq!(text.arguments[0].original_default_value.as_deref(), Some("0"));
        assert_eq!(text.overload_number, Some(2));
    }

    #[test]
    fn remove_rename_and_access() {
        let ts = typesystem()
            .modify(FunctionModification::new(Some("QPainter"), "end()").remove())
            .modify(FunctionModification::new(Some("QPainter"), "device").rename("paintDevice"))
            .modify(FunctionModification::new(Some("QPainter"), "drawText").access(Access::Private));
        let (model, _) = build(&ts, painter());

        let painter = model.find_class("QPainter").unwrap();
        assert_eq!(painter.function_names(), vec!["drawLines", "drawText", "paintDevice"]);
        let renamed = painter.functions_named("paintDevice").next().unwrap();
        assert_eq!(renamed.original_name, "device");
        assert_eq!(painter.functions_named("drawText").next().unwrap().access, Access::Private);
    }

    #[test]
    fn replaced_types_feed_dispatch() {
        let ts = typesystem().modify(
            FunctionModification::new(Some("QPainter"), "drawText")
                .argument(ArgumentModification::new(0).replace_type("QLine")),
        );
        let (model, _) = build(&ts, painter());
        let text = model
            .find_class("QPainter")
            .unwrap()
            .functions_named("drawText")
            .next()
            .unwrap();
        assert!(text.arguments[0].is_type_modified());
        assert_eq!(text.arguments[0].modified_type().name(), "QLine");
        assert_eq!(text.arguments[0].ty.name(), "int");
    }

    #[test]
    fn conflicts_and_unmatched_rules_warn() {
        let ts = typesystem()
            .modify(
                FunctionModification::new(Some("QPainter"), "drawText")
                    .argument(ArgumentModification::new(0).array())
                    .argument(ArgumentModification::new(4).remove()),
            )
            .modify(FunctionModification::new(Some("QPainter"), "drawPolygon"));
        let (model, ctx) = build(&ts, painter());

        let diags = ctx.diagnostics();
        let conflicts: Vec<_> = diags.of_kind(DiagnosticKind::ArrayModificationConflict).collect();
        assert_eq!(conflicts.len(), 1);
        assert!(conflicts[0].message.contains("no indirections"));
        assert_eq!(diags.of_kind(DiagnosticKind::UnmatchedModification).count(), 2);
        assert!(!diags.has_errors());

        let text = model
            .find_class("QPainter")
            .unwrap()
            .functions_named("drawText")
            .next()
            .unwrap();
        assert!(text.arguments[0].ty.is_primitive());
    }
}
