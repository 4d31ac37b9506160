//! Model-building passes.
//!
//! - [`registration`]: type-system rules become registry entries
//! - [`declarations`]: the declaration tree becomes classes, functions, fields and enums
//! - [`modifications`]: function modifications (rename, remove, argument changes)
//! - [`injection`]: added functions parsed from text
//! - [`conversions`]: declared implicit conversions
//! - [`inheritance`]: base resolution, ancestor sets and dependency edges
//!
//! The passes run in that order over one [`BuildContext`]; later passes see
//! what earlier ones produced.

pub mod conversions;
pub mod declarations;
pub mod inheritance;
pub mod injection;
pub mod modifications;
pub mod registration;

pub use conversions::ConversionPass;
pub use declarations::{DeclarationOutput, DeclarationPass};
pub use inheritance::InheritancePass;
pub use injection::InjectionPass;
pub use modifications::ModificationPass;
pub use registration::RegistrationPass;

use metabind_core::{Declaration, QualifiedName, TypeSystem};

use crate::context::BuildContext;
use crate::model::ApiModel;

/// Runs every pass in order and returns the finished model.
pub struct ModelBuilder<'a> {
    ctx: &'a mut BuildContext,
    typesystem: &'a TypeSystem,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(ctx: &'a mut BuildContext, typesystem: &'a TypeSystem) -> Self {
        Self { ctx, typesystem }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build(self, declarations: &[Declaration]) -> ApiModel {
        let _span = tracing::debug_span!("build_model").entered();

        let registered = RegistrationPass::new(self.ctx, self.typesystem).run();

        let mut model = ApiModel::new();
        let declared = DeclarationPass::new(self.ctx, self.typesystem).run(declarations, &mut model);
        let modified = ModificationPass::new(self.ctx, self.typesystem).run(&mut model);
        let injected = InjectionPass::new(self.ctx, self.typesystem).run(&mut model);
        let conversions = ConversionPass::new(self.ctx, self.typesystem).run(&mut model);
        let edges = InheritancePass::new(self.ctx).run(&mut model);

        tracing::debug!(
            target: "metabind",
            registered,
            classes = declared.classes,
            functions = declared.functions,
            modified,
            injected,
            conversions,
            edges,
            "model built"
        );
        model
    }
}

/// Lookup scope inside a class or namespace: its enclosing scopes plus itself.
pub(crate) fn scope_of(name: &QualifiedName) -> Vec<String> {
    let mut scope = name.namespace.clone();
    scope.push(name.name.clone());
    scope
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_includes_the_name_itself() {
        let name = QualifiedName::from_qualified_string("Qt::Widgets::QWidget");
        assert_eq!(scope_of(&name), vec!["Qt", "Widgets", "QWidget"]);
    }
}
