//! The semantic model: functions, classes, fields and enums.

mod class;
mod enums;
mod function;

pub use class::{ClassAttributes, DependencyEdge, MetaClass, MetaField};
pub use enums::{MetaEnum, MetaEnumValue};
pub use function::{Access, FunctionAttributes, FunctionKind, MetaArgument, MetaFunction};
