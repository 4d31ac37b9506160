//! Registration pass - turn type-system rules into registry entries.
//!
//! Entries without a target package inherit the type system's package.
//! A conflicting redefinition is reported and the first definition kept.

use metabind_core::{Diagnostic, DiagnosticKind, RegistrationError, TypeSystem};

use crate::context::BuildContext;

pub struct RegistrationPass<'a> {
    ctx: &'a mut BuildContext,
    typesystem: &'a TypeSystem,
}

impl<'a> RegistrationPass<'a> {
    pub fn new(ctx: &'a mut BuildContext, typesystem: &'a TypeSystem) -> Self {
        Self { ctx, typesystem }
    }

    /// Register every rule. Returns the number of entries accepted.
    pub fn run(mut self) -> usize {
        let mut registered = 0;
        for rule in &self.typesystem.entries {
            let mut entry = rule.clone();
            if entry.target_package.is_none() {
                if let Some(package) = &self.typesystem.package {
                    entry = entry.with_target_package(package.clone());
                }
            }

            match self.ctx.registry_mut().register(entry) {
                Ok(_) => registered += 1,
                Err(err) => {
                    let kind = match err {
                        RegistrationError::DuplicateTypeEntry { .. } => {
                            DiagnosticKind::DuplicateTypeEntry
                        }
                        RegistrationError::InvalidName(_) => DiagnosticKind::InvalidTypeName,
                    };
                    self.ctx.report(Diagnostic::error(kind, err.to_string()));
                }
            }
        }

        tracing::debug!(target: "metabind", registered, "type-system entries registered");
        registered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metabind_core::TypeEntry;

    #[test]
    fn rules_become_entries_with_package() {
        let ts = TypeSystem::new()
            .package("PySide6.QtCore")
            .value_type("QPoint")
            .entry(TypeEntry::object("QObject").with_target_package("Custom"));
        let mut ctx = BuildContext::default();
        assert_eq!(RegistrationPass::new(&mut ctx, &ts).run(), 2);

        let point = ctx.registry().find("QPoint").unwrap();
        assert_eq!(point.target_package.as_deref(), Some("PySide6.QtCore"));
        let object = ctx.registry().find("QObject").unwrap();
        assert_eq!(object.target_package.as_deref(), Some("Custom"));
    }

    #[test]
    fn conflicts_are_reported_and_skipped() {
        let ts = TypeSystem::new()
            .value_type("QPoint")
            .object_type("QPoint")
            .value_type(" ");
        let mut ctx = BuildContext::default();
        assert_eq!(RegistrationPass::new(&mut ctx, &ts).run(), 1);

        assert!(ctx.registry().find("QPoint").unwrap().is_value());
        assert_eq!(ctx.diagnostics().of_kind(DiagnosticKind::DuplicateTypeEntry).count(), 1);
        assert_eq!(ctx.diagnostics().of_kind(DiagnosticKind::InvalidTypeName).count(), 1);
        assert!(ctx.diagnostics().has_errors());
    }
}
