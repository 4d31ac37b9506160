//! metabind
//!
//! Builds a canonical model of a C++ API from its declarations and a
//! type-system description, then plans a deterministic dispatch tree for
//! every overloaded function name.
//!
//! # Example
//!
//! ```
//! use metabind::{ApiExtractor, ClassDecl, Declaration, FunctionDecl, TypeSystem};
//!
//! let typesystem = TypeSystem::new()
//!     .object_type("Base")
//!     .object_type("Derived")
//!     .object_type("Canvas");
//! let declarations = vec![
//!     Declaration::Class(ClassDecl::new("Base")),
//!     Declaration::Class(ClassDecl::new("Derived").base("Base")),
//!     Declaration::Class(
//!         ClassDecl::new("Canvas")
//!             .function(FunctionDecl::new("draw", "void").arg("Base*", "item"))
//!             .function(FunctionDecl::new("draw", "void").arg("Derived*", "item")),
//!     ),
//! ];
//!
//! let result = ApiExtractor::new(&typesystem).run(&declarations).unwrap();
//! let draw = result.plan("Canvas", "draw").unwrap();
//! assert_eq!(draw.data.children()[0].arg_type().name(), "Derived");
//! ```
//!
//! ## Crates
//!
//! - [`metabind_core`]: entries, meta types, the model types, inputs, errors
//! - [`metabind_parser`]: type references and added-function signatures
//! - [`metabind_registry`]: the type database and the dependency graph
//! - [`metabind_builder`]: model passes, class ordering, overload planning

pub use metabind_builder::{
    ApiModel, BuildContext, ClassOrder, ClassSorter, ModelBuilder, OverloadData, OverloadGroup,
    OverloadNode, OverloadPlan, OverloadPlanner, implicit_conversions,
};
pub use metabind_core::*;
pub use metabind_parser::{AddedFunction, TypeInfo, parse_added_function};
pub use metabind_registry::{Graph, TopoSortResult, TypeDatabase};

/// Everything one run produces.
#[derive(Debug)]
pub struct ApiResult {
    /// Classes in dependency order, global functions and enums.
    pub model: ApiModel,
    /// Every type entry the run registered or synthesized.
    pub registry: TypeDatabase,
    /// One sorted decision tree per overload group.
    pub plans: Vec<OverloadPlan>,
    pub diagnostics: Diagnostics,
}

impl ApiResult {
    /// The plan for `name` in `owner`; an empty owner selects global functions.
    pub fn plan(&self, owner: &str, name: &str) -> Option<&OverloadPlan> {
        self.plans.iter().find(|plan| {
            plan.name == name
                && match &plan.owner {
                    Some(class) => class.to_string() == owner,
                    None => owner.is_empty(),
                }
        })
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// Runs the whole pipeline over one declaration tree.
pub struct ApiExtractor<'a> {
    typesystem: &'a TypeSystem,
    options: BuildOptions,
}

impl<'a> ApiExtractor<'a> {
    pub fn new(typesystem: &'a TypeSystem) -> Self {
        Self {
            typesystem,
            options: BuildOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build the model, order its classes and plan every overload group.
    ///
    /// Local failures end up in [`ApiResult::diagnostics`]; the only error
    /// is an input without any declaration.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(&self, declarations: &[Declaration]) -> Result<ApiResult, MetabindError> {
        if declarations.is_empty() {
            return Err(MetabindError::EmptyDeclarationTree(None));
        }
        let _span = tracing::debug_span!("extract", declarations = declarations.len()).entered();

        let mut ctx = BuildContext::new(TypeDatabase::new(), self.options.clone());
        let mut model = ModelBuilder::new(&mut ctx, self.typesystem).build(declarations);

        let classes: Vec<QualifiedName> = model.classes.iter().map(|class| class.name.clone()).collect();
        let order = ClassSorter::sort(&classes, &model.dependency_edges, &mut ctx);
        model.reorder_classes(&order.classes);

        let (registry, mut diagnostics) = ctx.into_parts();
        let plans = OverloadPlanner::new(&model, &registry, &self.options)
            .plan_all(&model.overload_groups(), &mut diagnostics);

        tracing::debug!(
            target: "metabind",
            classes = model.classes.len(),
            functions = model.function_count(),
            plans = plans.len(),
            errors = diagnostics.error_count(),
            "extraction finished"
        );
        Ok(ApiResult {
            model,
            registry,
            plans,
            diagnostics,
        })
    }
}
