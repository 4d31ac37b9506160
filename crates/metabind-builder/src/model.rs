//! ApiModel - the semantic model the passes build.

use std::sync::Arc;

use metabind_core::{Access, DependencyEdge, MetaClass, MetaEnum, MetaFunction, QualifiedName};
use rustc_hash::FxHashMap;

/// Functions sharing one name inside one scope.
#[derive(Debug, Clone)]
pub struct OverloadGroup {
    /// Owning class; `None` for global functions.
    pub owner: Option<QualifiedName>,
    pub name: String,
    pub functions: Vec<Arc<MetaFunction>>,
}

/// Classes, global functions and enums of one run.
#[derive(Debug, Clone, Default)]
pub struct ApiModel {
    /// Classes and namespaces, in dependency order once sorted.
    pub classes: Vec<MetaClass>,
    pub global_functions: Vec<Arc<MetaFunction>>,
    pub global_enums: Vec<MetaEnum>,
    /// Conversions synthesized from implicit-conversion rules.
    pub declared_conversions: Vec<Arc<MetaFunction>>,
    /// Ancestor-to-descendant edges.
    pub dependency_edges: Vec<DependencyEdge>,
    index: FxHashMap<String, usize>,
}

impl ApiModel {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Classes
    // ==========================================================================

    /// Add a class. Returns `false`, leaving the model untouched, if the name is taken.
    pub fn add_class(&mut self, class: MetaClass) -> bool {
        let name = class.qualified_name().to_string();
        if self.index.contains_key(&name) {
            return false;
        }
        self.index.insert(name, self.classes.len());
        self.classes.push(class);
        true
    }

    pub fn find_class(&self, name: &str) -> Option<&MetaClass> {
        let name = name.strip_prefix("::").unwrap_or(name);
        self.index.get(name).map(|&i| &self.classes[i])
    }

    pub fn find_class_mut(&mut self, name: &str) -> Option<&mut MetaClass> {
        let name = name.strip_prefix("::").unwrap_or(name);
        match self.index.get(name) {
            Some(&i) => Some(&mut self.classes[i]),
            None => None,
        }
    }

    pub fn contains_class(&self, name: &str) -> bool {
        self.find_class(name).is_some()
    }

    /// Whether `ancestor` is in the transitive ancestor set of `descendant`.
    pub fn is_ancestor(&self, ancestor: &QualifiedName, descendant: &str) -> bool {
        self.find_class(descendant)
            .is_some_and(|class| class.inherits_from(ancestor))
    }

    /// Reorder the classes. Names missing from `order` keep their relative
    /// order after the listed ones.
    pub fn reorder_classes(&mut self, order: &[QualifiedName]) {
        let mut slots: Vec<Option<MetaClass>> = self.classes.drain(..).map(Some).collect();
        let mut reordered = Vec::with_capacity(slots.len());
        for name in order {
            if let Some(&i) = self.index.get(&name.to_string()) {
                if let Some(class) = slots[i].take() {
                    reordered.push(class);
                }
            }
        }
        reordered.extend(slots.into_iter().flatten());

        self.index.clear();
        for (i, class) in reordered.iter().enumerate() {
            self.index.insert(class.qualified_name().to_string(), i);
        }
        self.classes = reordered;
    }

    // ==========================================================================
    // Functions and enums
    // ==========================================================================

    pub fn find_global_enum(&self, name: &str) -> Option<&MetaEnum> {
        self.global_enums.iter().find(|e| e.name.to_string() == name)
    }

    /// Overload groups of every class, then of the global functions.
    ///
    /// Private functions are never dispatched and are left out.
    pub fn overload_groups(&self) -> Vec<OverloadGroup> {
        let mut groups = Vec::new();
        for class in &self.classes {
            collect_groups(Some(&class.name), &class.functions, &mut groups);
        }
        collect_groups(None, &self.global_functions, &mut groups);
        groups
    }

    pub fn function_count(&self) -> usize {
        self.global_functions.len()
            + self
                .classes
                .iter()
                .map(|c| c.functions.len())
                .sum::<usize>()
    }
}

fn collect_groups(
    owner: Option<&QualifiedName>,
    functions: &[Arc<MetaFunction>],
    groups: &mut Vec<OverloadGroup>,
) {
    let mut by_name: FxHashMap<&str, usize> = FxHashMap::default();
    for function in functions {
        if function.access == Access::Private {
            continue;
        }
        let slot = *by_name.entry(function.name.as_str()).or_insert_with(|| {
            groups.push(OverloadGroup {
                owner: owner.cloned(),
                name: function.name.clone(),
                functions: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].functions.push(Arc::clone(function));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metabind_core::{FunctionKind, TypeEntry};

    fn class(name: &str) -> MetaClass {
        MetaClass::new(Arc::new(TypeEntry::object(name)))
    }

    #[test]
    fn class_index() {
        let mut model = ApiModel::new();
        assert!(model.add_class(class("QObject")));
        assert!(!model.add_class(class("QObject")));
        assert!(model.find_class("::QObject").is_some());
        assert!(model.find_class("QWidget").is_none());
    }

    #[test]
    fn reorder_keeps_unlisted_classes() {
        let mut model = ApiModel::new();
        model.add_class(class("A"));
        model.add_class(class("B"));
        model.add_class(class("C"));
        model.reorder_classes(&[QualifiedName::global("C"), QualifiedName::global("A")]);
        let names: Vec<_> = model.classes.iter().map(|c| c.qualified_name()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
        assert!(model.find_class("B").is_some());
    }

    #[test]
    fn groups_follow_first_declaration() {
        let mut model = ApiModel::new();
        let mut widget = class("QWidget");
        widget.add_function(MetaFunction::new("resize", FunctionKind::Normal));
        widget.add_function(MetaFunction::new("show", FunctionKind::Normal));
        widget.add_function(MetaFunction::new("resize", FunctionKind::Normal));
        widget.add_function(
            MetaFunction::new("hidden", FunctionKind::Normal).with_access(Access::Private),
        );
        model.add_class(widget);
        model
            .global_functions
            .push(Arc::new(MetaFunction::new("qAbs", FunctionKind::Normal)));

        let groups = model.overload_groups();
        let summary: Vec<_> = groups
            .iter()
            .map(|g| (g.name.as_str(), g.functions.len(), g.owner.is_some()))
            .collect();
        assert_eq!(
            summary,
            vec![("resize", 2, true), ("show", 1, true), ("qAbs", 1, false)]
        );
    }
}
