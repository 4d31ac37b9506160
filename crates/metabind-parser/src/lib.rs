//! Metabind parser crate.
//!
//! Parses the two kinds of text the binding model receives:
//! - C++ type references (`const QList<int> &`) into [`TypeInfo`]
//! - Added-function signatures from type-system rules into [`AddedFunction`]
//!
//! # Example
//!
//! ```
//! use metabind_parser::parse_added_function;
//!
//! let f = parse_added_function("foo(int a=5, QList<X,Y> &@list@={1,2})", "void").unwrap();
//! assert_eq!(f.name, "foo");
//! assert_eq!(f.arguments[1].name.as_deref(), Some("list"));
//! assert_eq!(f.arguments[1].default_value.as_deref(), Some("{1,2}"));
//! ```

mod cursor;
pub mod signature;
pub mod type_info;
mod type_parser;

pub use signature::{AddedArgument, AddedFunction, ParameterToken, parse_added_function, split_parameters};
pub use type_info::TypeInfo;
pub use type_parser::TypeParser;
