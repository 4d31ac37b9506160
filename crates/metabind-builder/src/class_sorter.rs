//! Class dependency ordering.
//!
//! Classes are emitted so that every ancestor precedes its descendants. The
//! order comes from [`Graph::topological_sort`] over the inheritance edges; a
//! cycle is reported and the cyclic classes are appended in their original
//! order so emission can still proceed.

use metabind_core::{DependencyEdge, Diagnostic, DiagnosticKind, QualifiedName};
use metabind_registry::Graph;

use crate::context::BuildContext;

/// Result of [`ClassSorter::sort`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassOrder {
    /// Every input class: processed ones first, then the cyclic remainder.
    pub classes: Vec<QualifiedName>,
    /// Classes on or behind a cycle.
    pub cyclic: Vec<QualifiedName>,
}

impl ClassOrder {
    pub fn is_complete(&self) -> bool {
        self.cyclic.is_empty()
    }

    pub fn position(&self, name: &QualifiedName) -> Option<usize> {
        self.classes.iter().position(|c| c == name)
    }
}

/// Sorts classes by inheritance.
pub struct ClassSorter;

impl ClassSorter {
    /// Order `classes` so that for every edge the parent comes first.
    ///
    /// Edges naming classes outside `classes`, and self edges, are ignored.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn sort(
        classes: &[QualifiedName],
        edges: &[DependencyEdge],
        ctx: &mut BuildContext,
    ) -> ClassOrder {
        let mut graph = Graph::from_nodes(classes.iter().cloned());
        for edge in edges {
            if edge.parent != edge.child {
                graph.add_edge(&edge.parent, &edge.child);
            }
        }

        let result = graph.topological_sort();
        if result.is_valid() {
            return ClassOrder {
                classes: result.order,
                cyclic: Vec::new(),
            };
        }

        let names: Vec<String> = result.cyclic.iter().map(ToString::to_string).collect();
        let mut diagnostic = Diagnostic::warning(
            DiagnosticKind::CyclicClassDependency,
            format!("cyclic dependency between classes: {}", names.join(", ")),
        );
        if ctx.options().dump_cyclic_graphs {
            diagnostic = diagnostic.with_graph(graph.to_dot("ClassDependencies"));
        }
        ctx.report(diagnostic);

        let mut ordered = result.order;
        ordered.extend(result.cyclic.iter().cloned());
        ClassOrder {
            classes: ordered,
            cyclic: result.cyclic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<QualifiedName> {
        list.iter().map(|n| QualifiedName::global(*n)).collect()
    }

    fn edge(parent: &str, child: &str) -> DependencyEdge {
        DependencyEdge::new(QualifiedName::global(parent), QualifiedName::global(child))
    }

    #[test]
    fn ancestors_come_first() {
        let mut ctx = BuildContext::default();
        let classes = names(&["QWidget", "QPushButton", "QObject", "QAbstractButton"]);
        let edges = [
            edge("QObject", "QWidget"),
            edge("QWidget", "QAbstractButton"),
            edge("QAbstractButton", "QPushButton"),
            edge("QObject", "QPushButton"),
            edge("QObject", "QAbstractButton"),
            edge("QWidget", "QPushButton"),
        ];
        let order = ClassSorter::sort(&classes, &edges, &mut ctx);
        assert!(order.is_complete());
        for e in &edges {
            assert!(order.position(&e.parent) < order.position(&e.child));
        }
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn foreign_and_self_edges_are_ignored() {
        let mut ctx = BuildContext::default();
        let classes = names(&["A", "B"]);
        let order = ClassSorter::sort(
            &classes,
            &[edge("Outside", "A"), edge("B", "B"), edge("A", "B")],
            &mut ctx,
        );
        assert_eq!(order.classes, names(&["A", "B"]));
    }

    #[test]
    fn cycle_keeps_every_class() {
        let mut ctx = BuildContext::default();
        let classes = names(&["Root", "A", "B"]);
        let order = ClassSorter::sort(&classes, &[edge("A", "B"), edge("B", "A")], &mut ctx);

        assert_eq!(order.classes, names(&["Root", "A", "B"]));
        assert_eq!(order.cyclic, names(&["A", "B"]));

        let reported: Vec<_> = ctx
            .diagnostics()
            .of_kind(DiagnosticKind::CyclicClassDependency)
            .collect();
        assert_eq!(reported.len(), 1);
        assert!(reported[0].message.contains("A, B"));
        assert!(reported[0].graph.is_some());
    }
}
