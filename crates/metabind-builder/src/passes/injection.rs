//! Injection pass - add functions declared as text in the type system.
//!
//! ## Responsibilities
//!
//! - Parse each added-function signature and resolve its types in the
//!   owner's scope (template parameters included)
//! - Attach the function to its owner class, or to the globals
//! - Refuse injections that duplicate an existing signature
//!
//! A rule that fails at any step is dropped with a diagnostic; the run goes on.

use std::sync::Arc;

use metabind_core::{
    AddedFunctionRule, Diagnostic, DiagnosticKind, FunctionAttributes, FunctionKind, MetaArgument,
    MetaFunction, ModelError, QualifiedName, TypeSystem,
};
use metabind_parser::{AddedFunction, parse_added_function};

use crate::context::BuildContext;
use crate::model::ApiModel;
use crate::passes::declarations::refine_constructor_kind;
use crate::passes::scope_of;
use crate::type_resolver::TypeResolver;

pub struct InjectionPass<'a> {
    ctx: &'a mut BuildContext,
    typesystem: &'a TypeSystem,
}

impl<'a> InjectionPass<'a> {
    pub fn new(ctx: &'a mut BuildContext, typesystem: &'a TypeSystem) -> Self {
        Self { ctx, typesystem }
    }

    /// Inject every added function. Returns the number injected.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, model: &mut ApiModel) -> usize {
        let typesystem = self.typesystem;
        let mut injected = 0;
        for rule in &typesystem.added_functions {
            match self.inject(rule, model) {
                Ok(()) => injected += 1,
                Err(err) => {
                    let kind = match err {
                        ModelError::DuplicateFunction(_) => DiagnosticKind::DuplicateFunction,
                        _ => DiagnosticKind::MalformedInjection,
                    };
                    let diagnostic = if kind == DiagnosticKind::DuplicateFunction {
                        Diagnostic::warning(kind, err.to_string())
                    } else {
                        Diagnostic::error(kind, err.to_string())
                    };
                    self.ctx.report(diagnostic);
                }
            }
        }

        tracing::debug!(target: "metabind", injected, "added functions injected");
        injected
    }

    fn inject(&mut self, rule: &AddedFunctionRule, model: &mut ApiModel) -> Result<(), ModelError> {
        let malformed = |reason: String| ModelError::MalformedInjection {
            signature: rule.signature.clone(),
            reason,
        };

        let parsed = parse_added_function(&rule.signature, &rule.return_type)
            .map_err(|e| malformed(e.to_string()))?
            .with_static(rule.is_static)
            .with_class_method(rule.is_class_method);

        let (owner, scope, template_parameters) = match rule.owner.as_deref() {
            Some(owner) => {
                let class = model
                    .find_class(owner)
                    .ok_or_else(|| malformed(ModelError::UnknownClass(owner.to_string()).to_string()))?;
                (
                    Some(class.name.clone()),
                    scope_of(&class.name),
                    class.template_parameters.clone(),
                )
            }
            None => (None, Vec::new(), Vec::new()),
        };

        let function = self
            .build(&parsed, rule, owner.as_ref(), &scope, &template_parameters)
            .map_err(|e| malformed(e.to_string()))?;

        let existing = match &owner {
            Some(owner) => model
                .find_class(&owner.to_string())
                .map(|class| class.functions.as_slice())
                .unwrap_or_default(),
            None => model.global_functions.as_slice(),
        };
        if existing.iter().any(|f| f.has_same_signature(&function)) {
            return Err(ModelError::DuplicateFunction(function.minimal_signature()));
        }

        let function = Arc::new(function);
        match &owner {
            Some(owner) => {
                if let Some(class) = model.find_class_mut(&owner.to_string()) {
                    class.functions.push(function);
                }
            }
            None => model.global_functions.push(function),
        }
        Ok(())
    }

    fn build(
        &mut self,
        parsed: &AddedFunction,
        rule: &AddedFunctionRule,
        owner: Option<&QualifiedName>,
        scope: &[String],
        template_parameters: &[String],
    ) -> Result<MetaFunction, ModelError> {
        let kind = FunctionKind::classify(&parsed.name, owner.map(QualifiedName::simple_name));
        let mut attributes = FunctionAttributes::ADDED;
        if parsed.is_static {
            attributes |= FunctionAttributes::STATIC;
        }
        if parsed.is_class_method {
            attributes |= FunctionAttributes::CLASS_METHOD;
        }
        if parsed.is_constant {
            attributes |= FunctionAttributes::CONST;
        }

        let mut function = MetaFunction::new(&parsed.name, kind)
            .with_attributes(attributes)
            .with_access(rule.access);
        if let Some(owner) = owner {
            function = function.with_owner(owner.clone());
        }

        let mut resolver =
            TypeResolver::new(self.ctx, scope).with_template_parameters(template_parameters);
        for (position, arg) in parsed.arguments.iter().enumerate() {
            let ty = resolver.resolve(&arg.type_info)?;
            let mut argument = MetaArgument::new(arg.name.clone().unwrap_or_default(), ty, position);
            if let Some(default) = &arg.default_value {
                argument = argument.with_default(default.clone());
            }
            function.arguments.push(argument);
        }
        if !parsed.return_type.is_void() {
            function = function.with_return_type(resolver.resolve(&parsed.return_type)?);
        }

        if let Some(owner) = owner {
            refine_constructor_kind(&mut function, &owner.to_string());
        }
        Ok(function)
    }
}
