//! Overload decision trees.
//!
//! The root holds every function of one overload group. Each level below it
//! is one visible argument position; siblings at a level partition the
//! functions that reach it by distinct argument type.
//!
//! ```text
//! addStuff(double, PyObject *)
//! addStuff(double, int)
//!
//! root - double - PyObject *
//!              \- int
//! ```

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::sync::Arc;

use metabind_core::{MetaArgument, MetaFunction, MetaType};

// ============================================================================
// OverloadNode
// ============================================================================

/// One branch of the decision tree: an argument position and the type that
/// tells its functions apart from the siblings.
#[derive(Debug, Clone)]
pub struct OverloadNode {
    arg_pos: usize,
    argument: MetaArgument,
    overloads: Vec<Arc<MetaFunction>>,
    pub(crate) children: Vec<OverloadNode>,
}

impl OverloadNode {
    fn new(function: &Arc<MetaFunction>, argument: &MetaArgument, arg_pos: usize) -> Self {
        Self {
            arg_pos,
            argument: argument.clone(),
            overloads: vec![Arc::clone(function)],
            children: Vec::new(),
        }
    }

    /// Visible argument position (0-based, removed arguments not counted).
    pub fn arg_pos(&self) -> usize {
        self.arg_pos
    }

    /// The argument of the function that created this node.
    pub fn argument(&self) -> &MetaArgument {
        &self.argument
    }

    pub fn arg_type(&self) -> &MetaType {
        &self.argument.ty
    }

    /// Type used for dispatch.
    pub fn modified_arg_type(&self) -> &MetaType {
        self.argument.modified_type()
    }

    pub fn is_type_modified(&self) -> bool {
        self.argument.is_type_modified()
    }

    pub fn overloads(&self) -> &[Arc<MetaFunction>] {
        &self.overloads
    }

    pub fn children(&self) -> &[OverloadNode] {
        &self.children
    }

    /// First function that reached this node.
    pub fn reference_function(&self) -> &Arc<MetaFunction> {
        &self.overloads[0]
    }

    pub fn contains(&self, function: &Arc<MetaFunction>) -> bool {
        self.overloads.iter().any(|f| Arc::ptr_eq(f, function))
    }

    /// The argument of `function` this node stands for.
    pub fn overload_argument<'f>(&self, function: &'f Arc<MetaFunction>) -> Option<&'f MetaArgument> {
        if !self.contains(function) {
            return None;
        }
        function.visible_arguments().nth(self.arg_pos)
    }

    /// A function whose argument at this position has a default value.
    pub fn function_with_default_value(&self) -> Option<&Arc<MetaFunction>> {
        self.overloads.iter().find(|function| {
            self.overload_argument(function)
                .is_some_and(MetaArgument::has_default_value)
        })
    }

    /// Whether no child carries `function` any further.
    pub fn is_final_occurrence(&self, function: &Arc<MetaFunction>) -> bool {
        is_final_occurrence(&self.children, function)
    }

    pub fn next_argument_has_default_value(&self) -> bool {
        self.children
            .iter()
            .any(|child| child.function_with_default_value().is_some())
    }

    /// The nearest node, this one or below, at which some function has a default.
    pub fn find_next_arg_with_default(&self) -> Option<&OverloadNode> {
        if self.function_with_default_value().is_some() {
            return Some(self);
        }
        find_next_arg_with_default(&self.children)
    }
}

// ============================================================================
// OverloadData
// ============================================================================

/// Decision tree of one overload group.
#[derive(Debug, Clone, Default)]
pub struct OverloadData {
    overloads: Vec<Arc<MetaFunction>>,
    pub(crate) children: Vec<OverloadNode>,
    min_args: usize,
    max_args: usize,
}

impl OverloadData {
    /// Build the unsorted tree for `functions`.
    ///
    /// At each position a function joins the sibling whose dispatch type is
    /// equal to its own argument's, or opens a new sibling. Operator
    /// overloads never join.
    pub fn build(functions: &[Arc<MetaFunction>]) -> Self {
        let mut min_args = usize::MAX;
        let mut max_args = 0;
        let mut children = Vec::new();

        for function in functions {
            let (min, max) = function.min_max_arguments();
            min_args = min_args.min(min);
            max_args = max_args.max(max);

            let mut level = &mut children;
            let mut parent_pos = None;
            for argument in function.visible_arguments() {
                let index = add_node(level, parent_pos, function, argument);
                parent_pos = Some(level[index].arg_pos);
                level = &mut level[index].children;
            }
        }

        Self {
            overloads: functions.to_vec(),
            children,
            min_args: if functions.is_empty() { 0 } else { min_args },
            max_args,
        }
    }

    pub fn overloads(&self) -> &[Arc<MetaFunction>] {
        &self.overloads
    }

    /// Branches for the first visible argument.
    pub fn children(&self) -> &[OverloadNode] {
        &self.children
    }

    pub fn reference_function(&self) -> Option<&Arc<MetaFunction>> {
        self.overloads.first()
    }

    pub fn min_args(&self) -> usize {
        self.min_args
    }

    pub fn max_args(&self) -> usize {
        self.max_args
    }

    /// Index of `function` in the group, used to label dumps.
    pub fn function_number(&self, function: &Arc<MetaFunction>) -> Option<usize> {
        self.overloads.iter().position(|f| Arc::ptr_eq(f, function))
    }

    // ==========================================================================
    // Calling convention
    // ==========================================================================

    /// Whether the wrapper must take its arguments as one list rather than a
    /// fixed number of parameters.
    pub fn uses_list_of_arguments(&self) -> bool {
        let Some(reference) = self.reference_function() else {
            return false;
        };
        if reference.is_call_operator() {
            return true;
        }
        if reference.is_operator_overload() {
            return false;
        }
        self.min_args != self.max_args
            || self.max_args > 1
            || reference.is_constructor()
            || self.has_argument_with_default_value()
    }

    /// Argument counts between the bounds that no function accepts.
    pub fn invalid_argument_lengths(&self) -> Vec<usize> {
        let mut valid = BTreeSet::new();
        for function in &self.overloads {
            let mut count = 0;
            for argument in function.visible_arguments() {
                if argument.has_default_value() {
                    valid.insert(count);
                }
                count += 1;
            }
            valid.insert(count);
        }
        ((self.min_args + 1)..self.max_args)
            .filter(|len| !valid.contains(len))
            .collect()
    }

    pub fn has_varargs(&self) -> bool {
        self.overloads.iter().any(|f| {
            f.arguments.len() > 1 && f.arguments.last().is_some_and(|a| a.ty.is_varargs())
        })
    }

    pub fn has_non_void_return_type(&self) -> bool {
        self.overloads.iter().any(|f| f.has_non_void_return())
    }

    pub fn has_argument_with_default_value(&self) -> bool {
        self.max_args > 0 && self.overloads.iter().any(|f| f.has_default_argument())
    }

    // ==========================================================================
    // Static and instance functions
    // ==========================================================================

    pub fn has_static_function(&self) -> bool {
        self.overloads.iter().any(|f| f.is_static())
    }

    pub fn has_class_method(&self) -> bool {
        self.overloads.iter().any(|f| f.is_class_method())
    }

    pub fn has_instance_function(&self) -> bool {
        self.overloads.iter().any(|f| !f.is_static())
    }

    /// Mixed groups need both a static and a bound dispatch path.
    pub fn has_static_and_instance_functions(&self) -> bool {
        self.has_static_function() && self.has_instance_function()
    }

    // ==========================================================================
    // Tree queries
    // ==========================================================================

    pub fn is_final_occurrence(&self, function: &Arc<MetaFunction>) -> bool {
        is_final_occurrence(&self.children, function)
    }

    pub fn next_argument_has_default_value(&self) -> bool {
        self.children
            .iter()
            .any(|child| child.function_with_default_value().is_some())
    }

    pub fn find_next_arg_with_default(&self) -> Option<&OverloadNode> {
        find_next_arg_with_default(&self.children)
    }

    /// Visible arguments of `function` that have a default value.
    pub fn arguments_with_default_values(function: &MetaFunction) -> Vec<&MetaArgument> {
        function
            .visible_arguments()
            .filter(|a| a.has_default_value())
            .collect()
    }

    pub fn number_of_removed_arguments(function: &MetaFunction) -> usize {
        function.removed_argument_count()
    }

    /// Removed arguments among the native arguments before `final_arg_pos`,
    /// counting each removed one as extending the window by one.
    pub fn removed_arguments_before(function: &MetaFunction, final_arg_pos: usize) -> usize {
        let mut removed = 0;
        let mut i = 0;
        while i < function.arguments.len().min(final_arg_pos + removed) {
            if function.arguments[i].removed {
                removed += 1;
            }
            i += 1;
        }
        removed
    }

    // ==========================================================================
    // Graphviz
    // ==========================================================================

    /// Render the tree in Graphviz DOT syntax.
    pub fn dump_graph(&self) -> String {
        let mut out = String::new();
        let Some(reference) = self.reference_function() else {
            out.push_str("digraph OverloadedFunction {\n}\n");
            return out;
        };

        out.push_str("digraph OverloadedFunction {\n");
        out.push_str(
            "    graph [fontsize=12 fontname=freemono labelloc=t splines=true overlap=false rankdir=LR];\n",
        );

        out.push_str("legend [fontsize=9 fontname=freemono shape=rect label=\"");
        for (number, function) in self.overloads.iter().enumerate() {
            let _ = write!(
                out,
                "f{number} : {} {}\\l",
                html(&return_signature(function)),
                html(&function.minimal_signature())
            );
        }
        out.push_str("\"];\n");

        let title = &reference.name;
        let _ = write!(
            out,
            "    \"{title}\" [shape=plaintext style=\"filled,bold\" margin=0 fontname=freemono \
             fillcolor=white penwidth=1 label=<<table border=\"0\" cellborder=\"0\" \
             cellpadding=\"3\" bgcolor=\"white\">"
        );
        out.push_str(
            "<tr><td bgcolor=\"black\" align=\"center\" cellpadding=\"6\" colspan=\"2\"><font color=\"white\">",
        );
        if let Some(owner) = &reference.owner {
            let _ = write!(out, "{}::", owner.simple_name());
        }
        out.push_str(&html(title));
        out.push_str("</font>");
        if reference.is_virtual() {
            out.push_str("<br/><font color=\"white\" point-size=\"10\">&lt;&lt;");
            if reference.is_abstract() {
                out.push_str("pure ");
            }
            out.push_str("virtual&gt;&gt;</font>");
        }
        out.push_str("</td></tr>");
        row(&mut out, "original type", &html(&return_signature(reference)));
        for (number, function) in self.overloads.iter().enumerate() {
            if let Some(modified) = &function.modified_return_type {
                row(&mut out, &format!("f{number}-type"), &html(modified));
            }
        }
        row(&mut out, "minArgs", &self.min_args.to_string());
        row(&mut out, "maxArgs", &self.max_args.to_string());
        row(&mut out, "overloads", &self.numbers(&self.overloads));
        out.push_str("</table>> ];\n");

        let mut next_id = 0;
        for child in &self.children {
            let _ = write!(out, "    \"{title}\" -> ");
            self.dump_node(child, &mut out, &mut next_id);
        }
        out.push_str("}\n");
        out
    }

    fn dump_node(&self, node: &OverloadNode, out: &mut String, next_id: &mut usize) {
        let id = format!("arg_{next_id}");
        *next_id += 1;
        let _ = writeln!(out, "{id};");

        let _ = write!(
            out,
            "    \"{id}\" [shape=\"plaintext\" style=\"filled,bold\" margin=\"0\" fontname=\"freemono\" \
             fillcolor=\"white\" penwidth=1 label=<<table border=\"0\" cellborder=\"0\" \
             cellpadding=\"3\" bgcolor=\"white\">"
        );
        let _ = write!(
            out,
            "<tr><td bgcolor=\"black\" align=\"left\" cellpadding=\"2\" colspan=\"2\">\
             <font color=\"white\" point-size=\"11\">arg #{}</font></td></tr>",
            node.arg_pos
        );
        row(out, "type", &html(&node.modified_arg_type().cpp_signature()));
        if node.is_type_modified() {
            row(out, "orig. type", &html(&node.arg_type().cpp_signature()));
        }
        row(out, "overloads", &self.numbers(&node.overloads));

        for function in &node.overloads {
            let Some(argument) = node.overload_argument(function) else {
                continue;
            };
            let number = self.function_number(function).unwrap_or_default();
            let current = argument.default_value.as_deref().unwrap_or_default();
            let original = argument.original_default_value.as_deref().unwrap_or_default();
            if !current.is_empty() || current != original {
                row(out, &format!("f{number}-default"), &html(current));
            }
            if current != original {
                row(out, &format!("f{number}-orig-default"), &html(original));
            }
        }
        out.push_str("</table>>];\n");

        for child in &node.children {
            let _ = write!(out, "    {id} -> ");
            self.dump_node(child, out, next_id);
        }
    }

    fn numbers(&self, functions: &[Arc<MetaFunction>]) -> String {
        let mut text = String::new();
        for function in functions {
            if let Some(number) = self.function_number(function) {
                let _ = write!(text, "f{number} ");
            }
        }
        text
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Add `function` under `siblings` for `argument`; returns the node index.
fn add_node(
    siblings: &mut Vec<OverloadNode>,
    parent_pos: Option<usize>,
    function: &Arc<MetaFunction>,
    argument: &MetaArgument,
) -> usize {
    if !function.is_operator_overload() {
        let existing = siblings
            .iter()
            .position(|node| node.modified_arg_type() == argument.modified_type());
        if let Some(index) = existing {
            siblings[index].overloads.push(Arc::clone(function));
            return index;
        }
    }

    let arg_pos = parent_pos.map_or(0, |pos| pos + 1);
    siblings.push(OverloadNode::new(function, argument, arg_pos));
    siblings.len() - 1
}

fn is_final_occurrence(children: &[OverloadNode], function: &Arc<MetaFunction>) -> bool {
    !children.iter().any(|child| child.contains(function))
}

fn find_next_arg_with_default(children: &[OverloadNode]) -> Option<&OverloadNode> {
    children
        .iter()
        .filter_map(OverloadNode::find_next_arg_with_default)
        .min_by_key(|node| node.arg_pos)
}

fn return_signature(function: &MetaFunction) -> String {
    function
        .return_type
        .as_ref()
        .map(MetaType::cpp_signature)
        .unwrap_or_else(|| "void".to_string())
}

fn row(out: &mut String, label: &str, value: &str) {
    let _ = write!(
        out,
        "<tr><td bgcolor=\"gray\" align=\"right\">{label}</td>\
         <td bgcolor=\"gray\" align=\"left\">{value}</td></tr>"
    );
}

fn html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use metabind_core::{FunctionAttributes, FunctionKind, Indirection, QualifiedName, TypeEntry};

    fn ty(name: &str) -> MetaType {
        MetaType::new(Arc::new(TypeEntry::primitive(name)))
    }

    fn function(name: &str, args: &[(&str, Option<&str>)]) -> Arc<MetaFunction> {
        let mut f = MetaFunction::new(name, FunctionKind::Normal);
        for (i, (t, default)) in args.iter().enumerate() {
            let mut arg = MetaArgument::new(format!("a{i}"), ty(t), i);
            if let Some(default) = default {
                arg = arg.with_default(*default);
            }
            f.arguments.push(arg);
        }
        Arc::new(f)
    }

    #[test]
    fn equal_types_share_a_node() {
        let a = function("f", &[("int", None), ("double", None)]);
        let b = function("f", &[("int", None), ("bool", None)]);
        let c = function("f", &[("double", None)]);
        let data = OverloadData::build(&[a.clone(), b.clone(), c]);

        assert_eq!(data.children().len(), 2);
        let int_node = &data.children()[0];
        assert_eq!(int_node.modified_arg_type().name(), "int");
        assert_eq!(int_node.overloads().len(), 2);
        assert_eq!(int_node.children().len(), 2);
        assert_eq!(int_node.children()[1].arg_pos(), 1);
        assert!(!int_node.is_final_occurrence(&a));
        assert!(int_node.children()[0].is_final_occurrence(&a));
        assert!(std::ptr::eq(
            int_node.children()[1].overload_argument(&b).unwrap(),
            &b.arguments[1]
        ));
    }

    #[test]
    fn operators_never_merge() {
        let op = |t: &str| {
            Arc::new(
                MetaFunction::new("operator+", FunctionKind::Operator)
                    .with_argument(MetaArgument::new("o", ty(t), 0)),
            )
        };
        let data = OverloadData::build(&[op("int"), op("int")]);
        assert_eq!(data.children().len(), 2);
        assert!(!data.uses_list_of_arguments());
    }

    #[test]
    fn different_shapes_do_not_merge() {
        let pointer = Arc::new(
            MetaFunction::new("f", FunctionKind::Normal).with_argument(MetaArgument::new(
                "p",
                ty("int").with_indirection(Indirection::Pointer),
                0,
            )),
        );
        let data = OverloadData::build(&[pointer, function("f", &[("int", None)])]);
        assert_eq!(data.children().len(), 2);
    }

    #[test]
    fn arity_and_defaults() {
        let a = function("f", &[("int", None), ("int", Some("0")), ("int", Some("1"))]);
        let b = function("f", &[("double", None), ("double", None), ("double", None), ("double", None), ("double", None)]);
        let data = OverloadData::build(&[a.clone(), b]);

        assert_eq!((data.min_args(), data.max_args()), (1, 5));
        assert_eq!(data.invalid_argument_lengths(), vec![4]);
        assert!(data.uses_list_of_arguments());
        assert!(data.has_argument_with_default_value());
        assert_eq!(OverloadData::arguments_with_default_values(&a).len(), 2);

        let next = data.find_next_arg_with_default().unwrap();
        assert_eq!(next.arg_pos(), 1);
        assert!(Arc::ptr_eq(next.function_with_default_value().unwrap(), &a));
        assert!(data.children()[0].next_argument_has_default_value());
    }

    #[test]
    fn removed_arguments_are_skipped() {
        let mut f = MetaFunction::new("f", FunctionKind::Normal);
        f.arguments.push(MetaArgument::new("a", ty("int"), 0));
        let mut hidden = MetaArgument::new("b", ty("bool"), 1);
        hidden.removed = true;
        f.arguments.push(hidden);
        f.arguments.push(MetaArgument::new("c", ty("double"), 2));
        let f = Arc::new(f);
        let data = OverloadData::build(&[f.clone()]);

        assert_eq!((data.min_args(), data.max_args()), (2, 2));
        let second = &data.children()[0].children()[0];
        assert_eq!(second.arg_pos(), 1);
        assert_eq!(second.overload_argument(&f).unwrap().name, "c");
        assert_eq!(OverloadData::number_of_removed_arguments(&f), 1);
        assert_eq!(OverloadData::removed_arguments_before(&f, 1), 0);
        assert_eq!(OverloadData::removed_arguments_before(&f, 2), 1);
    }

    #[test]
    fn single_argument_groups_use_fixed_arity() {
        let data = OverloadData::build(&[function("f", &[("int", None)])]);
        assert!(!data.uses_list_of_arguments());
        assert!(data.invalid_argument_lengths().is_empty());

        let ctor = Arc::new(
            MetaFunction::new("QPoint", FunctionKind::Constructor)
                .with_owner(QualifiedName::global("QPoint"))
                .with_argument(MetaArgument::new("x", ty("int"), 0)),
        );
        assert!(OverloadData::build(&[ctor]).uses_list_of_arguments());

        let call = Arc::new(MetaFunction::new("operator()", FunctionKind::CallOperator));
        assert!(OverloadData::build(&[call]).uses_list_of_arguments());
    }

    #[test]
    fn static_and_instance_queries() {
        let instance = function("f", &[]);
        let class_method = Arc::new(
            MetaFunction::new("f", FunctionKind::Normal)
                .with_attributes(FunctionAttributes::STATIC | FunctionAttributes::CLASS_METHOD),
        );
        let data = OverloadData::build(&[instance, class_method]);
        assert!(data.has_static_function());
        assert!(data.has_class_method());
        assert!(data.has_instance_function());
        assert!(data.has_static_and_instance_functions());
        assert!(!data.has_non_void_return_type());
        assert!(!data.has_varargs());
    }

    #[test]
    fn empty_group() {
        let data = OverloadData::build(&[]);
        assert_eq!((data.min_args(), data.max_args()), (0, 0));
        assert!(!data.uses_list_of_arguments());
        assert!(data.dump_graph().starts_with("digraph OverloadedFunction"));
    }

    #[test]
    fn graph_dump_lists_functions_and_nodes() {
        let a = function("f", &[("int", Some("0"))]);
        let b = function("f", &[("double", None)]);
        let dot = OverloadData::build(&[a, b]).dump_graph();

        assert!(dot.contains("f0 : void f(int)\\l"));
        assert!(dot.contains("f1 : void f(double)\\l"));
        assert!(dot.contains("\"f\" -> arg_0;"));
        assert!(dot.contains("arg #0"));
        assert!(dot.contains(">f0-default<"));
        assert!(dot.contains("\"arg_1\""));
        assert!(dot.ends_with("}\n"));
    }
}
