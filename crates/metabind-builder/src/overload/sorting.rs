//! Sibling ordering for overload decision trees.
//!
//! Siblings are tried in order at runtime and the first whose type check
//! passes wins, so a branch must come before every branch that would also
//! accept its arguments. The sorter builds a "must precede" graph over the
//! sibling type names and replaces the siblings with its topological order.

use std::sync::Arc;

use metabind_core::{CatchAllNames, Diagnostic, DiagnosticKind, Diagnostics, MetaFunction, MetaType};
use metabind_registry::{Graph, TypeDatabase};
use rustc_hash::FxHashMap;

use super::data::OverloadNode;
use crate::conversion::implicit_conversions;
use crate::model::ApiModel;

/// Primitives an enum branch must precede, in check order.
const PRIMITIVE_TYPES: &[&str] = &[
    "int",
    "unsigned int",
    "long",
    "unsigned long",
    "short",
    "unsigned short",
    "bool",
    "unsigned char",
    "char",
    "float",
    "double",
    "const char*",
];

const SIGNED_INTEGERS: &[&str] = &["int", "short", "long", "long long"];

/// Primitives a signed integer literal also converts to.
const NON_INTEGERS: &[&str] = &["float", "double", "bool"];

/// Sorts every level of a decision tree, children before parents.
pub(crate) struct SiblingSorter<'a> {
    pub(crate) model: &'a ApiModel,
    pub(crate) registry: &'a TypeDatabase,
    pub(crate) catch_all: &'a CatchAllNames,
    pub(crate) dump_graphs: bool,
    /// Every function of the group has an explicit overload number.
    pub(crate) all_numbered: bool,
    pub(crate) diagnostics: &'a mut Diagnostics,
}

/// Which catch-all placeholders appear among the siblings.
#[derive(Default)]
struct CatchAllFlags {
    any_object: bool,
    sequence: bool,
    buffer: bool,
    variant: bool,
    string: bool,
}

impl SiblingSorter<'_> {
    pub(crate) fn sort(&mut self, siblings: &mut Vec<OverloadNode>) {
        for node in siblings.iter_mut() {
            self.sort(&mut node.children);
        }

        if siblings.len() <= 1 {
            return;
        }
        if self.all_numbered {
            siblings.sort_by_key(|node| node.reference_function().overload_number);
            return;
        }
        self.sort_by_dependencies(siblings);
    }

    fn sort_by_dependencies(&mut self, siblings: &mut Vec<OverloadNode>) {
        let registry = self.registry;
        let names = self.catch_all;

        let mut graph: Graph<String> = Graph::new();
        let mut groups: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        let mut flags = CatchAllFlags::default();

        for (index, node) in siblings.iter().enumerate() {
            let name = type_name(node.modified_arg_type(), registry);
            graph.add_node(name.clone());
            groups.entry(name.clone()).or_default().push(index);

            if !flags.any_object && name == names.any_object {
                flags.any_object = true;
            } else if !flags.sequence && name == names.sequence {
                flags.sequence = true;
            } else if !flags.buffer && name == names.buffer {
                flags.buffer = true;
            } else if !flags.variant && name == names.variant {
                flags.variant = true;
            } else if !flags.string && name == names.string {
                flags.string = true;
            }

            let container = node.arg_type();
            for instantiation in container.instantiations() {
                graph.add_node(type_name(instantiation, registry));
                if self.is_signed_integer(instantiation) {
                    for primitive in NON_INTEGERS {
                        graph.add_node(implicit_conversion_type_name(
                            container,
                            instantiation,
                            primitive,
                            registry,
                        ));
                    }
                } else {
                    for conversion in implicit_conversions(self.model, instantiation) {
                        graph.add_node(implicit_conversion_type_name(
                            container,
                            instantiation,
                            &convertible_type_name(&conversion, registry),
                            registry,
                        ));
                    }
                }
            }
        }

        let found_primitives: Vec<String> = PRIMITIVE_TYPES
            .iter()
            .map(|p| p.to_string())
            .filter(|p| graph.has_node(p))
            .collect();

        if flags.sequence && flags.any_object {
            graph.add_edge(&names.sequence, &names.any_object);
        }

        let mut integer_convertible: Vec<String> = Vec::new();
        let mut involved: Vec<Arc<MetaFunction>> = Vec::new();

        for node in siblings.iter() {
            let target_type = node.arg_type();
            let target = type_name(node.modified_arg_type(), registry);

            // Implicit conversions into the target: the source is tried first.
            for conversion in implicit_conversions(self.model, target_type) {
                let source = convertible_type_name(&conversion, registry);
                if source == "int" || source == "unsigned int" {
                    integer_convertible.push(target.clone());
                }
                if source == target || !graph.has_node(&source) {
                    continue;
                }
                graph.remove_edge(&target, &source);
                graph.add_edge(&source, &target);
                involved.push(conversion);
            }

            // Derived classes before their ancestors.
            if target_type.is_value() || target_type.is_object() {
                if let Some(class) = self.model.find_class(target_type.entry().name()) {
                    for ancestor in &class.ancestors {
                        let ancestor = ancestor.to_string();
                        if !graph.has_node(&ancestor) {
                            continue;
                        }
                        graph.remove_edge(&ancestor, &target);
                        graph.add_edge(&target, &ancestor);
                    }
                }
            }

            // Containers after their element types and after containers of
            // more convertible elements.
            for instantiation in target_type.instantiations() {
                let element = type_name(instantiation, registry);
                if !graph.has_node(&element) {
                    continue;
                }
                if !graph.contains_edge(&target, &element) {
                    graph.add_edge(&element, &target);
                }

                if self.is_signed_integer(instantiation) {
                    for primitive in NON_INTEGERS {
                        let synthesized =
                            implicit_conversion_type_name(target_type, instantiation, primitive, registry);
                        if !graph.contains_edge(&target, &synthesized) {
                            graph.add_edge(&synthesized, &target);
                        }
                    }
                } else {
                    for conversion in implicit_conversions(self.model, instantiation) {
                        let synthesized = implicit_conversion_type_name(
                            target_type,
                            instantiation,
                            &convertible_type_name(&conversion, registry),
                            registry,
                        );
                        if !graph.contains_edge(&target, &synthesized)
                            && graph.add_edge(&synthesized, &target)
                        {
                            involved.push(conversion);
                        }
                    }
                }
            }

            // Catch-all placeholders go last.
            let is_placeholder = target.contains(names.any_object.as_str())
                || target.contains(names.buffer.as_str())
                || target.contains(names.sequence.as_str());
            if (flags.sequence || flags.any_object || flags.buffer) && !is_placeholder {
                if flags.sequence {
                    graph.add_edge(&target, &names.sequence);
                } else if flags.buffer {
                    graph.add_edge(&target, &names.buffer);
                } else {
                    graph.add_edge(&target, &names.any_object);
                }
            } else if flags.variant && target != names.variant {
                if !graph.contains_edge(&names.variant, &target) {
                    graph.add_edge(&target, &names.variant);
                }
            } else if flags.string
                && target_type.is_pointer()
                && target != names.string
                && target != names.byte_array
                && (!flags.any_object || target != names.any_object)
                && !graph.contains_edge(&names.string, &target)
            {
                graph.add_edge(&target, &names.string);
            }

            if target_type.is_enum() {
                for primitive in &found_primitives {
                    graph.add_edge(&target, primitive);
                }
            }
        }

        if graph.has_node(&names.string) && graph.has_node(&names.byte_array) {
            graph.add_edge(&names.string, &names.byte_array);
        }

        // Enums before anything constructible from an integer.
        for node in siblings.iter() {
            if !node.arg_type().is_enum() {
                continue;
            }
            let target = type_name(node.arg_type(), registry);
            for convertible in &integer_convertible {
                if *convertible != target {
                    graph.add_edge(&target, convertible);
                }
            }
        }

        // An integer argument also matches float, double and bool, so those
        // are tried first unless a conversion already says otherwise.
        for integer in SIGNED_INTEGERS {
            let integer = integer.to_string();
            if !graph.has_node(&integer) {
                continue;
            }
            for other in NON_INTEGERS {
                let other = other.to_string();
                if graph.has_node(&other) && !graph.contains_edge(&integer, &other) {
                    graph.add_edge(&other, &integer);
                }
            }
        }

        let result = graph.topological_sort();
        if !result.is_valid() {
            self.report_cycle(siblings, &graph, &result.cyclic, &groups, &involved);
            return;
        }

        let mut slots: Vec<Option<OverloadNode>> = std::mem::take(siblings).into_iter().map(Some).collect();
        for name in &result.order {
            if let Some(indices) = groups.get(name) {
                for &index in indices.iter().rev() {
                    if let Some(node) = slots[index].take() {
                        siblings.push(node);
                    }
                }
            }
        }
    }

    fn report_cycle(
        &mut self,
        siblings: &[OverloadNode],
        graph: &Graph<String>,
        cyclic: &[String],
        groups: &FxHashMap<String, Vec<usize>>,
        involved: &[Arc<MetaFunction>],
    ) {
        let reference = siblings[0].reference_function();
        let function_name = reference.display_name();

        let functions: Vec<String> = cyclic
            .iter()
            .filter_map(|name| groups.get(name))
            .map(|indices| siblings[indices[0]].reference_function().signature())
            .collect();
        let conversions: Vec<String> = involved.iter().map(|f| f.qualified_name()).collect();

        let mut message = format!(
            "cyclic dependency in overload order of '{function_name}': types {}; functions {}",
            cyclic.join(", "),
            functions.join(", ")
        );
        if !conversions.is_empty() {
            message.push_str(&format!("; implicit conversions {}", conversions.join(", ")));
        }

        let mut diagnostic =
            Diagnostic::warning(DiagnosticKind::AmbiguousOverloadOrder, message).at(&reference.location);
        if self.dump_graphs {
            diagnostic = diagnostic.with_graph(graph.to_dot(&function_name));
        }
        self.diagnostics.push(diagnostic);
    }

    fn is_signed_integer(&self, ty: &MetaType) -> bool {
        ty.is_primitive() && SIGNED_INTEGERS.contains(&type_name(ty, self.registry).as_str())
    }
}

/// Graph node name of a type: primitives by their basic referenced
/// primitive, containers with their instantiations (`QList<int >`).
pub fn type_name(ty: &MetaType, registry: &TypeDatabase) -> String {
    let mut name = entry_name(ty, registry);
    if ty.entry().is_container() {
        let elements: Vec<String> = ty
            .instantiations()
            .iter()
            .map(|instantiation| entry_name(instantiation, registry))
            .collect();
        name.push('<');
        name.push_str(&elements.join(","));
        name.push_str(" >");
    }
    name
}

fn entry_name(ty: &MetaType, registry: &TypeDatabase) -> String {
    let entry = ty.entry();
    if entry.is_primitive() {
        registry.basic_referenced_primitive(entry).name().to_string()
    } else {
        entry.name().to_string()
    }
}

/// Name of `container` with `instantiation` swapped for `replacement`:
/// `QList<double >` for a `QList<int>` whose element converts from double.
pub fn implicit_conversion_type_name(
    container: &MetaType,
    instantiation: &MetaType,
    replacement: &str,
    registry: &TypeDatabase,
) -> String {
    let elements: Vec<String> = container
        .instantiations()
        .iter()
        .map(|other| {
            if other == instantiation {
                replacement.to_string()
            } else {
                type_name(other, registry)
            }
        })
        .collect();
    format!("{}<{} >", container.entry().name(), elements.join(", "))
}

/// Type a conversion accepts, named the way graph nodes are.
fn convertible_type_name(conversion: &MetaFunction, registry: &TypeDatabase) -> String {
    if conversion.is_conversion_operator() {
        return conversion
            .owner
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
    }
    conversion
        .arguments
        .first()
        .map(|argument| type_name(&argument.ty, registry))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use metabind_core::{ContainerKind, PrimitiveEntry, TypeEntry};

    #[test]
    fn type_names() {
        let mut registry = TypeDatabase::new();
        registry
            .register(TypeEntry::container("QList", ContainerKind::List))
            .unwrap();
        let qreal = registry
            .register(TypeEntry::primitive_with("qreal", PrimitiveEntry::alias_of("double")))
            .unwrap();
        let int = registry.find("int").unwrap();
        let list = registry.find("QList").unwrap();

        assert_eq!(type_name(&MetaType::new(Arc::clone(&qreal)), &registry), "double");

        let list_of_int = MetaType::new(Arc::clone(&list)).with_instantiation(MetaType::new(Arc::clone(&int)));
        assert_eq!(type_name(&list_of_int, &registry), "QList<int >");

        let element = MetaType::new(int);
        assert_eq!(
            implicit_conversion_type_name(&list_of_int, &element, "double", &registry),
            "QList<double >"
        );
    }
}
