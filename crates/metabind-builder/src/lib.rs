//! Metabind builder
//!
//! Turns a declaration tree and a type system into a binding model and plans
//! overload dispatch over it.
//!
//! ## Architecture
//!
//! - **Model building**: ordered passes register types, read declarations,
//!   apply modifications, inject functions, synthesize conversions and
//!   resolve inheritance
//! - **Class ordering**: classes sorted so ancestors come first
//! - **Overload planning**: one sorted decision tree per overload group
//!
//! ## Modules
//!
//! - [`context`]: Per-run state (registry, type cache, diagnostics)
//! - [`type_resolver`]: Type text and parsed type references to meta types
//! - [`model`]: The semantic model the passes fill in
//! - [`conversion`]: Implicit conversion discovery
//! - [`class_sorter`]: Inheritance ordering of classes
//! - [`passes`]: The model-building passes
//! - [`overload`]: Overload decision trees and their sibling ordering

pub mod class_sorter;
pub mod context;
pub mod conversion;
pub mod model;
pub mod overload;
pub mod passes;
pub mod type_resolver;

pub use class_sorter::{ClassOrder, ClassSorter};
pub use context::BuildContext;
pub use conversion::{conversion_source_name, implicit_conversions};
pub use model::{ApiModel, OverloadGroup};
pub use overload::{OverloadData, OverloadNode, OverloadPlan, OverloadPlanner};
pub use passes::{DeclarationOutput, ModelBuilder};
pub use type_resolver::TypeResolver;
