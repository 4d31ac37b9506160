//! Conversion pass - synthesize functions for declared implicit conversions.
//!
//! Each rule `source -> target` becomes a one-argument constructor of the
//! target flagged [`FunctionAttributes::DECLARED_CONVERSION`]. The overload
//! planner treats it like any other conversion into the target.

use std::sync::Arc;

use metabind_core::{
    Diagnostic, DiagnosticKind, FunctionAttributes, FunctionKind, ImplicitConversionRule,
    MetaArgument, MetaFunction, MetabindError, QualifiedName, TypeSystem,
};

use crate::context::BuildContext;
use crate::model::ApiModel;
use crate::type_resolver::TypeResolver;

pub struct ConversionPass<'a> {
    ctx: &'a mut BuildContext,
    typesystem: &'a TypeSystem,
}

impl<'a> ConversionPass<'a> {
    pub fn new(ctx: &'a mut BuildContext, typesystem: &'a TypeSystem) -> Self {
        Self { ctx, typesystem }
    }

    /// Returns the number of conversions added.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, model: &mut ApiModel) -> usize {
        let mut added = 0;
        for rule in &self.typesystem.conversions {
            match synthesize(self.ctx, rule) {
                Ok(function) => {
                    model.declared_conversions.push(Arc::new(function));
                    added += 1;
                }
                Err(err) => self.ctx.report(Diagnostic::error(
                    DiagnosticKind::UnresolvedType,
                    format!("implicit conversion {} -> {}: {err}", rule.source, rule.target),
                )),
            }
        }

        tracing::debug!(target: "metabind", added, "declared conversions synthesized");
        added
    }
}

fn synthesize(
    ctx: &mut BuildContext,
    rule: &ImplicitConversionRule,
) -> Result<MetaFunction, MetabindError> {
    let mut resolver = TypeResolver::new(ctx, &[]);
    let source = resolver.resolve_text(&rule.source)?;
    let target = resolver.resolve_text(&rule.target)?;

    let owner = QualifiedName::from_qualified_string(target.entry().name());
    Ok(MetaFunction::new(target.name(), FunctionKind::Constructor)
        .with_attributes(FunctionAttributes::DECLARED_CONVERSION)
        .with_owner(owner)
        .with_argument(MetaArgument::new("value", source, 0))
        .with_return_type(target))
}
