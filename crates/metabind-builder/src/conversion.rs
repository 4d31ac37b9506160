//! Implicit conversion discovery.
//!
//! A value type `T` can be produced implicitly from:
//!
//! - a public, non-explicit constructor of `T` taking one argument (or one
//!   required argument), other than the copy and move constructors
//! - a public, non-explicit `operator T()` of another class
//!
//! Conversions declared in the type system apply to every kind of target.

use std::sync::Arc;

use metabind_core::{MetaFunction, MetaType};

use crate::model::ApiModel;

/// Functions that convert some other type into `target`.
///
/// Constructors come first in declaration order, then conversion operators in
/// class order, then declared conversions.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn implicit_conversions(model: &ApiModel, target: &MetaType) -> Vec<Arc<MetaFunction>> {
    let entry = target.entry();
    let mut result = Vec::new();

    if entry.is_value() {
        if let Some(class) = model.find_class(entry.name()) {
            result.extend(
                class
                    .constructors()
                    .filter(|ctor| is_converting_constructor(ctor))
                    .cloned(),
            );
        }

        for class in &model.classes {
            if class.entry.is_same(entry) {
                continue;
            }
            result.extend(
                class
                    .conversion_operators()
                    .filter(|op| op.is_public() && !op.is_explicit())
                    .filter(|op| returns(op, target))
                    .cloned(),
            );
        }
    }

    result.extend(
        model
            .declared_conversions
            .iter()
            .filter(|conv| returns(conv, target))
            .cloned(),
    );
    result
}

fn is_converting_constructor(ctor: &MetaFunction) -> bool {
    let (min_args, _) = ctor.min_max_arguments();
    (min_args == 1 || ctor.arguments.len() == 1)
        && !ctor.is_explicit()
        && !ctor.is_copy_constructor()
        && !ctor.is_move_constructor()
        && !ctor.has_rvalue_reference_argument()
        && ctor.is_public()
}

fn returns(function: &MetaFunction, target: &MetaType) -> bool {
    function
        .return_type
        .as_ref()
        .is_some_and(|ty| ty.entry().is_same(target.entry()))
}

/// Name of the type a conversion accepts: the owner of a conversion
/// operator, otherwise the first argument's type.
pub fn conversion_source_name(function: &MetaFunction) -> Option<String> {
    if function.is_conversion_operator() {
        return function.owner.as_ref().map(ToString::to_string);
    }
    function
        .arguments
        .first()
        .map(|arg| arg.ty.entry().name().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use metabind_core::{
        Access, FunctionAttributes, FunctionKind, MetaArgument, MetaClass, QualifiedName,
        ReferenceKind, TypeEntry,
    };

    fn ty(entry: &Arc<TypeEntry>) -> MetaType {
        MetaType::new(Arc::clone(entry))
    }

    fn ctor(class: &str, arg: MetaType) -> MetaFunction {
        MetaFunction::new(class, FunctionKind::Constructor)
            .with_owner(QualifiedName::global(class))
            .with_argument(MetaArgument::new("v", arg, 0))
    }

    #[test]
    fn constructors_and_operators() {
        let int = Arc::new(TypeEntry::primitive("int"));
        let size = Arc::new(TypeEntry::value("QSize"));
        let rect = Arc::new(TypeEntry::value("QRect"));

        let mut size_class = MetaClass::new(Arc::clone(&size));
        size_class.add_function(ctor("QSize", ty(&int)));
        size_class.add_function(ctor("QSize", ty(&rect)).with_attributes(FunctionAttributes::EXPLICIT));
        size_class.add_function(ctor("QSize", ty(&size)).with_access(Access::Private));
        size_class.add_function(
            ctor("QSize", ty(&size).with_reference(ReferenceKind::RValue)),
        );

        let mut rect_class = MetaClass::new(Arc::clone(&rect));
        rect_class.add_function(
            MetaFunction::new("operator QSize", FunctionKind::ConversionOperator)
                .with_owner(QualifiedName::global("QRect"))
                .with_return_type(ty(&size)),
        );

        let mut model = ApiModel::new();
        model.add_class(size_class);
        model.add_class(rect_class);

        let found = implicit_conversions(&model, &ty(&size));
        let sources: Vec<_> = found
            .iter()
            .filter_map(|f| conversion_source_name(f))
            .collect();
        assert_eq!(sources, vec!["int", "QRect"]);
    }

    #[test]
    fn declared_conversions_apply_to_primitives() {
        let int = Arc::new(TypeEntry::primitive("int"));
        let double = Arc::new(TypeEntry::primitive("double"));
        let mut model = ApiModel::new();
        model.declared_conversions.push(Arc::new(
            MetaFunction::new("double", FunctionKind::Constructor)
                .with_argument(MetaArgument::new("v", ty(&int), 0))
                .with_return_type(ty(&double))
                .with_attributes(FunctionAttributes::DECLARED_CONVERSION),
        ));

        assert_eq!(implicit_conversions(&model, &ty(&double)).len(), 1);
        assert!(implicit_conversions(&model, &ty(&int)).is_empty());
    }
}
