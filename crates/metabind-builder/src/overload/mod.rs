//! Overload planning.
//!
//! Every overload group becomes an [`OverloadData`] decision tree whose
//! sibling branches are ordered for first-match dispatch.
//!
//! ## Algorithm
//!
//! 1. Build the tree: one level per visible argument, siblings merged when
//!    their argument types are equal (operators never merge).
//! 2. Sort every level, deepest first. If every function of the group has
//!    an explicit overload number, siblings are ordered by the number of
//!    their first function. Otherwise a precedence graph over the sibling
//!    type names decides:
//!    - the source of an implicit conversion precedes its target
//!    - a derived class precedes its ancestors
//!    - a container precedes containers of types its elements convert from
//!    - catch-all placeholders come last
//!    - enums precede primitives and types constructible from an integer
//!    - float, double and bool precede signed integers
//! 3. A cycle keeps the declaration order of that level and is reported as
//!    [`DiagnosticKind::AmbiguousOverloadOrder`](metabind_core::DiagnosticKind).

mod data;
mod sorting;

pub use data::{OverloadData, OverloadNode};
pub use sorting::{implicit_conversion_type_name, type_name};

use std::sync::Arc;

use metabind_core::{BuildOptions, Diagnostics, MetaFunction, QualifiedName};
use metabind_registry::TypeDatabase;

use crate::model::{ApiModel, OverloadGroup};
use sorting::SiblingSorter;

/// The sorted decision tree of one overload group.
#[derive(Debug, Clone)]
pub struct OverloadPlan {
    pub owner: Option<QualifiedName>,
    pub name: String,
    pub data: OverloadData,
}

/// Plans overload dispatch against a finished model.
pub struct OverloadPlanner<'a> {
    model: &'a ApiModel,
    registry: &'a TypeDatabase,
    options: &'a BuildOptions,
}

impl<'a> OverloadPlanner<'a> {
    pub fn new(model: &'a ApiModel, registry: &'a TypeDatabase, options: &'a BuildOptions) -> Self {
        Self {
            model,
            registry,
            options,
        }
    }

    /// Build and sort the decision tree for one group.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn plan(&self, functions: &[Arc<MetaFunction>], diagnostics: &mut Diagnostics) -> OverloadData {
        let mut data = OverloadData::build(functions);
        let all_numbered =
            !functions.is_empty() && functions.iter().all(|f| f.overload_number.is_some());

        let mut sorter = SiblingSorter {
            model: self.model,
            registry: self.registry,
            catch_all: &self.options.catch_all,
            dump_graphs: self.options.dump_cyclic_graphs,
            all_numbered,
            diagnostics,
        };
        sorter.sort(&mut data.children);
        data
    }

    /// Plan every group, in group order.
    pub fn plan_all(&self, groups: &[OverloadGroup], diagnostics: &mut Diagnostics) -> Vec<OverloadPlan> {
        let _span = tracing::debug_span!("plan_overloads", groups = groups.len()).entered();

        let plans: Vec<OverloadPlan> = groups
            .iter()
            .map(|group| OverloadPlan {
                owner: group.owner.clone(),
                name: group.name.clone(),
                data: self.plan(&group.functions, diagnostics),
            })
            .collect();

        tracing::debug!(target: "metabind", plans = plans.len(), "overloads planned");
        plans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metabind_core::{
        ClassDecl, Declaration, DiagnosticKind, FunctionDecl, FunctionKind, MetaArgument, MetaType,
        TypeEntry, TypeSystem,
    };

    use crate::context::BuildContext;
    use crate::passes::ModelBuilder;

    fn plan(ts: &TypeSystem, decls: Vec<Declaration>, name: &str) -> (OverloadData, Diagnostics) {
        plan_with(ts, decls, name, BuildOptions::default())
    }

    fn plan_with(
        ts: &TypeSystem,
        decls: Vec<Declaration>,
        name: &str,
        options: BuildOptions,
    ) -> (OverloadData, Diagnostics) {
        let mut ctx = BuildContext::new(TypeDatabase::new(), options.clone());
        let model = ModelBuilder::new(&mut ctx, ts).build(&decls);
        let (registry, mut diagnostics) = ctx.into_parts();

        let group = model
            .overload_groups()
            .into_iter()
            .find(|g| g.name == name)
            .unwrap();
        let data = OverloadPlanner::new(&model, &registry, &options).plan(&group.functions, &mut diagnostics);
        (data, diagnostics)
    }

    fn order(data: &OverloadData) -> Vec<String> {
        data.children()
            .iter()
            .map(|node| node.modified_arg_type().name().to_string())
            .collect()
    }

    fn widget(functions: Vec<FunctionDecl>) -> Declaration {
        let mut class = ClassDecl::new("Widget");
        for f in functions {
            class = class.function(f);
        }
        Declaration::Class(class)
    }

    #[test]
    fn derived_classes_come_before_their_bases() {
        let ts = TypeSystem::new()
            .object_type("Base")
            .object_type("Derived")
            .object_type("Widget");
        let decls = vec![
            Declaration::Class(ClassDecl::new("Base")),
            Declaration::Class(ClassDecl::new("Derived").base("Base")),
            widget(vec![
                FunctionDecl::new("take", "void").arg("Base*", "b"),
                FunctionDecl::new("take", "void").arg("Derived*", "d"),
            ]),
        ];
        let (data, diagnostics) = plan(&ts, decls, "take");
        assert!(diagnostics.is_empty(), "{diagnostics}");
        assert_eq!(order(&data), vec!["Derived", "Base"]);
    }

    #[test]
    fn floating_point_precedes_integer_unless_converted() {
        let decls = || {
            vec![widget(vec![
                FunctionDecl::new("set", "void").arg("int", "i"),
                FunctionDecl::new("set", "void").arg("double", "d"),
            ])]
        };

        let ts = TypeSystem::new().object_type("Widget");
        let (data, _) = plan(&ts, decls(), "set");
        assert_eq!(order(&data), vec!["double", "int"]);

        let ts = TypeSystem::new()
            .object_type("Widget")
            .implicit_conversion("int", "double");
        let (data, _) = plan(&ts, decls(), "set");
        assert_eq!(order(&data), vec!["int", "double"]);
    }

    #[test]
    fn enums_come_first() {
        let ts = TypeSystem::new()
            .object_type("Widget")
            .enum_type("Qt::AlignmentFlag", None);
        let decls = vec![widget(vec![
            FunctionDecl::new("align", "void").arg("int", "value"),
            FunctionDecl::new("align", "void").arg("Qt::AlignmentFlag", "flag"),
        ])];
        let (data, _) = plan(&ts, decls, "align");
        assert_eq!(order(&data), vec!["AlignmentFlag", "int"]);
    }

    #[test]
    fn catch_all_placeholders_come_last() {
        let ts = TypeSystem::new()
            .object_type("Widget")
            .object_type("PyObject")
            .value_type("QPoint");
        let decls = vec![
            Declaration::Class(ClassDecl::new("QPoint")),
            widget(vec![
                FunctionDecl::new("put", "void").arg("PyObject*", "any"),
                FunctionDecl::new("put", "void").arg("const QPoint&", "point"),
            ]),
        ];
        let (data, _) = plan(&ts, decls, "put");
        assert_eq!(order(&data), vec!["QPoint", "PyObject"]);
    }

    #[test]
    fn overload_numbers_take_precedence() {
        let registry = TypeDatabase::new();
        let model = ApiModel::new();
        let options = BuildOptions::default();
        let numbered = |t: &str, number: u32| {
            Arc::new(
                MetaFunction::new("f", FunctionKind::Normal)
                    .with_argument(MetaArgument::new("a", MetaType::new(Arc::new(TypeEntry::primitive(t))), 0))
                    .with_overload_number(number),
            )
        };

        let mut diagnostics = Diagnostics::new();
        let functions = [numbered("int", 1), numbered("double", 0)];
        let data = OverloadPlanner::new(&model, &registry, &options).plan(&functions, &mut diagnostics);
        assert_eq!(order(&data), vec!["double", "int"]);

        let functions = [numbered("double", 0), numbered("int", 1)];
        let data = OverloadPlanner::new(&model, &registry, &options).plan(&functions, &mut diagnostics);
        assert_eq!(order(&data), vec!["double", "int"]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn conversion_cycles_are_reported() {
        let ts = TypeSystem::new()
            .value_type("A")
            .value_type("B")
            .value_type("C")
            .object_type("Widget");
        let decls = vec![
            Declaration::Class(ClassDecl::new("A").function(FunctionDecl::new("A", "").arg("const B&", "b"))),
            Declaration::Class(ClassDecl::new("B").function(FunctionDecl::new("B", "").arg("const C&", "c"))),
            Declaration::Class(ClassDecl::new("C").function(FunctionDecl::new("C", "").arg("const A&", "a"))),
            widget(vec![
                FunctionDecl::new("use", "void").arg("const A&", "a"),
                FunctionDecl::new("use", "void").arg("const B&", "b"),
                FunctionDecl::new("use", "void").arg("const C&", "c"),
            ]),
        ];

        let (data, diagnostics) = plan(&ts, decls.clone(), "use");
        assert_eq!(order(&data), vec!["A", "B", "C"]);

        let cycles: Vec<_> = diagnostics.of_kind(DiagnosticKind::AmbiguousOverloadOrder).collect();
        assert_eq!(cycles.len(), 1);
        assert!(cycles[0].message.contains("Widget.use"));
        assert!(cycles[0].message.contains("implicit conversions"));
        assert!(cycles[0].graph.as_deref().is_some_and(|dot| dot.contains("\"A\" -> \"C\"")));

        let options = BuildOptions::default().with_cyclic_graphs(false);
        let (_, diagnostics) = plan_with(&ts, decls, "use", options);
        let cycle = diagnostics.of_kind(DiagnosticKind::AmbiguousOverloadOrder).next().unwrap();
        assert!(cycle.graph.is_none());
    }

    #[test]
    fn every_group_is_planned() {
        let ts = TypeSystem::new().object_type("Widget");
        let decls = vec![
            widget(vec![
                FunctionDecl::new("show", "void"),
                FunctionDecl::new("resize", "void").arg("int", "w").arg("int", "h"),
            ]),
            Declaration::Function(FunctionDecl::new("qMax", "int").arg("int", "a").arg("int", "b")),
        ];
        let mut ctx = BuildContext::default();
        let model = ModelBuilder::new(&mut ctx, &ts).build(&decls);
        let (registry, mut diagnostics) = ctx.into_parts();
        let options = BuildOptions::default();

        let plans = OverloadPlanner::new(&model, &registry, &options)
            .plan_all(&model.overload_groups(), &mut diagnostics);
        let names: Vec<_> = plans.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["show", "resize", "qMax"]);
        assert!(plans[2].owner.is_none());
        assert_eq!(plans[1].data.max_args(), 2);
    }
}
