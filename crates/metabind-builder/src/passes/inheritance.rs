//! Inheritance pass - resolve bases, compute ancestor sets and dependency edges.
//!
//! ## Responsibilities
//!
//! - Resolve each written base name from the class's enclosing scope outwards;
//!   bases outside the model are reported and dropped
//! - Ancestors are each direct base followed by that base's own ancestors,
//!   first occurrence kept
//! - One `ancestor -> class` edge per ancestor, consumed by the class sorter
//! - A class deriving from a polymorphic class is polymorphic itself

use metabind_core::{ClassAttributes, DependencyEdge, Diagnostic, DiagnosticKind, QualifiedName};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::context::BuildContext;
use crate::model::ApiModel;

pub struct InheritancePass<'a> {
    ctx: &'a mut BuildContext,
}

impl<'a> InheritancePass<'a> {
    pub fn new(ctx: &'a mut BuildContext) -> Self {
        Self { ctx }
    }

    /// Returns the number of dependency edges recorded.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, model: &mut ApiModel) -> usize {
        self.resolve_bases(model);

        let bases: FxHashMap<QualifiedName, Vec<QualifiedName>> = model
            .classes
            .iter()
            .map(|class| (class.name.clone(), class.bases.clone()))
            .collect();
        let mut memo = FxHashMap::default();
        for class in &model.classes {
            let mut visiting = FxHashSet::default();
            ancestors_of(&class.name, &bases, &mut memo, &mut visiting);
        }

        let polymorphic: FxHashSet<QualifiedName> = model
            .classes
            .iter()
            .filter(|class| class.is_polymorphic())
            .map(|class| class.name.clone())
            .collect();

        let mut edges = Vec::new();
        for class in &mut model.classes {
            let ancestors = memo.get(&class.name).cloned().unwrap_or_default();
            for ancestor in &ancestors {
                edges.push(DependencyEdge::new(ancestor.clone(), class.name.clone()));
            }
            if ancestors.iter().any(|a| polymorphic.contains(a)) {
                class.attributes |= ClassAttributes::POLYMORPHIC;
            }
            class.ancestors = ancestors;
        }

        let count = edges.len();
        model.dependency_edges = edges;
        tracing::debug!(target: "metabind", edges = count, "inheritance resolved");
        count
    }

    fn resolve_bases(&mut self, model: &mut ApiModel) {
        let mut resolved = Vec::with_capacity(model.classes.len());
        for class in &model.classes {
            let mut bases = Vec::new();
            for written in &class.base_names {
                let lookup = written.split('<').next().unwrap_or(written).trim();
                let found = self
                    .ctx
                    .registry()
                    .find_in_scope(lookup, &class.name.namespace)
                    .map(|entry| entry.name.clone())
                    .filter(|name| *name != class.name && model.contains_class(&name.to_string()));
                match found {
                    Some(name) => {
                        if !bases.contains(&name) {
                            bases.push(name);
                        }
                    }
                    None => self.ctx.report(
                        Diagnostic::warning(
                            DiagnosticKind::UnknownBaseClass,
                            format!("{}: unknown base class '{written}'", class.name),
                        )
                        .at(&class.location),
                    ),
                }
            }
            resolved.push(bases);
        }
        for (class, bases) in model.classes.iter_mut().zip(resolved) {
            class.bases = bases;
        }
    }
}

/// Ancestors of `name`, memoized. A class already on the current path
/// contributes nothing, so inheritance cycles terminate.
fn ancestors_of(
    name: &QualifiedName,
    bases: &FxHashMap<QualifiedName, Vec<QualifiedName>>,
    memo: &mut FxHashMap<QualifiedName, Vec<QualifiedName>>,
    visiting: &mut FxHashSet<QualifiedName>,
) -> Vec<QualifiedName> {
    if let Some(done) = memo.get(name) {
        return done.clone();
    }
    if !visiting.insert(name.clone()) {
        return Vec::new();
    }

    let mut result: Vec<QualifiedName> = Vec::new();
    for base in bases.get(name).map(Vec::as_slice).unwrap_or_default() {
        if !result.contains(base) {
            result.push(base.clone());
        }
        for ancestor in ancestors_of(base, bases, memo, visiting) {
            if ancestor != *name && !result.contains(&ancestor) {
                result.push(ancestor);
            }
        }
    }

    visiting.remove(name);
    memo.insert(name.clone(), result.clone());
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use metabind_core::{ClassDecl, Declaration, FunctionDecl, NamespaceDecl, TypeSystem};

    use crate::passes::{DeclarationPass, RegistrationPass};

    fn run(ts: &TypeSystem, decls: Vec<Declaration>) -> (ApiModel, BuildContext, usize) {
        let mut ctx = BuildContext::default();
        RegistrationPass::new(&mut ctx, ts).run();
        let mut model = ApiModel::new();
        DeclarationPass::new(&mut ctx, ts).run(&decls, &mut model);
        let edges = InheritancePass::new(&mut ctx).run(&mut model);
        (model, ctx, edges)
    }

    fn global(name: &str) -> QualifiedName {
        QualifiedName::global(name)
    }

    #[test]
    fn ancestors_and_edges() {
        let ts = TypeSystem::new()
            .object_type("QObject")
            .object_type("QPaintDevice")
            .object_type("QWidget")
            .object_type("QAbstractButton")
            .object_type("QPushButton");
        let decls = vec![
            Declaration::Class(
                ClassDecl::new("QObject").function(FunctionDecl::new("event", "bool").virtual_function()),
            ),
            Declaration::Class(ClassDecl::new("QPaintDevice")),
            Declaration::Class(ClassDecl::new("QWidget").base("QObject").base("QPaintDevice")),
            Declaration::Class(ClassDecl::new("QAbstractButton").base("QWidget")),
            Declaration::Class(ClassDecl::new("QPushButton").base("QAbstractButton")),
        ];
        let (model, ctx, edges) = run(&ts, decls);
        assert!(ctx.diagnostics().is_empty(), "{}", ctx.diagnostics());

        let button = model.find_class("QPushButton").unwrap();
        assert_eq!(button.bases, vec![global("QAbstractButton")]);
        assert_eq!(
            button.ancestors,
            vec![
                global("QAbstractButton"),
                global("QWidget"),
                global("QObject"),
                global("QPaintDevice"),
            ]
        );
        assert!(button.is_polymorphic());
        assert!(!model.find_class("QPaintDevice").unwrap().is_polymorphic());
        assert!(model.is_ancestor(&global("QObject"), "QPushButton"));

        assert_eq!(edges, 2 + 3 + 4);
        assert!(model
            .dependency_edges
            .contains(&DependencyEdge::new(global("QObject"), global("QPushButton"))));
    }

    #[test]
    fn scoped_and_unknown_bases() {
        let ts = TypeSystem::new()
            .object_type("Gui::Base")
            .object_type("Gui::Derived");
        let decls = vec![
            Declaration::Namespace(
                NamespaceDecl::new("Gui")
                    .item(Declaration::Class(ClassDecl::new("Base")))
                    .item(Declaration::Class(
                        ClassDecl::new("Derived").base("Base").base("QMissing"),
                    )),
            ),
        ];
        let (model, ctx, edges) = run(&ts, decls);

        let derived = model.find_class("Gui::Derived").unwrap();
        assert_eq!(derived.bases, vec![QualifiedName::from_qualified_string("Gui::Base")]);
        assert_eq!(edges, 1);

        let unknown: Vec<_> = ctx.diagnostics().of_kind(DiagnosticKind::UnknownBaseClass).collect();
        assert_eq!(unknown.len(), 1);
        assert!(unknown[0].message.contains("QMissing"));
    }

    #[test]
    fn inheritance_cycles_terminate() {
        let ts = TypeSystem::new().object_type("A").object_type("B");
        let decls = vec![
            Declaration::Class(ClassDecl::new("A").base("B")),
            Declaration::Class(ClassDecl::new("B").base("A")),
        ];
        let (model, _, _) = run(&ts, decls);
        assert_eq!(model.find_class("A").unwrap().ancestors, vec![global("B")]);
        assert_eq!(model.find_class("B").unwrap().ancestors, vec![global("A")]);
    }
}
