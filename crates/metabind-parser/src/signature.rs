//! Added-function signature parsing.
//!
//! Type-system rules inject functions as text:
//!
//! ```text
//! foo(const QList<X,Y> &@list@ = QList<X,Y>{1,2}, int b = 5, ...) const
//! ```
//!
//! Parameter names are either wrapped in `@` markers or given as a trailing
//! identifier. Defaults follow the last `=` of each parameter.

use metabind_core::{ParseError, ParseErrorKind, Span};

use crate::cursor::{is_ident_continue, is_ident_start};
use crate::type_info::TypeInfo;

const CALL_OPERATOR: &str = "operator()";

/// Words that never name a parameter when they end a type.
const TYPE_WORDS: &[&str] = &[
    "const", "volatile", "unsigned", "signed", "short", "long", "int", "char", "double", "float",
    "bool", "void", "wchar_t", "char16_t", "char32_t",
];

/// One parameter split out of a parameter list, before type parsing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterToken {
    pub type_text: String,
    pub name: Option<String>,
    pub default_value: Option<String>,
}

/// A parsed added-function argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedArgument {
    pub type_info: TypeInfo,
    /// The type as written, with name and default removed.
    pub type_text: String,
    pub name: Option<String>,
    pub default_value: Option<String>,
}

/// A parsed added function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedFunction {
    pub name: String,
    pub arguments: Vec<AddedArgument>,
    pub return_type: TypeInfo,
    pub is_constant: bool,
    pub is_static: bool,
    pub is_class_method: bool,
}

impl AddedFunction {
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_class_method(mut self, is_class_method: bool) -> Self {
        self.is_class_method = is_class_method;
        self
    }
}

/// Parse an added-function signature and its return type.
///
/// ```
/// use metabind_parser::parse_added_function;
///
/// let f = parse_added_function("bar() const", "").unwrap();
/// assert_eq!(f.name, "bar");
/// assert!(f.arguments.is_empty());
/// assert!(f.is_constant);
/// assert!(f.return_type.is_void());
/// ```
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn parse_added_function(signature: &str, return_type: &str) -> Result<AddedFunction, ParseError> {
    let context = format!("Unable to parse added function {signature}: ");
    let return_type = if return_type.trim().is_empty() {
        TypeInfo::void()
    } else {
        TypeInfo::parse(return_type.trim()).map_err(|e| e.with_context(&context))?
    };

    let trimmed = signature.trim();
    let search_start = if trimmed.starts_with(CALL_OPERATOR) {
        CALL_OPERATOR.len()
    } else {
        0
    };

    let Some(open) = trimmed[search_start..].find('(').map(|p| p + search_start) else {
        return Ok(AddedFunction {
            name: trimmed.to_string(),
            arguments: Vec::new(),
            return_type,
            is_constant: false,
            is_static: false,
            is_class_method: false,
        });
    };

    let name = trimmed[..open].trim();
    if name.is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::ExpectedIdentifier,
            Span::point(1, 1),
            "missing function name",
        )
        .with_context(&context));
    }

    let close = match trimmed.rfind(')') {
        Some(close) if close > open => close,
        _ => {
            return Err(ParseError::new(
                ParseErrorKind::MismatchedDelimiter,
                Span::point(1, open as u32 + 1),
                "Missing closing parenthesis",
            )
            .with_context(&context));
        }
    };

    let qualifier = &trimmed[close + 1..];
    let is_constant = qualifier.split_whitespace().any(|word| word == "const");

    let params = &trimmed[open + 1..close];
    let tokens = split_parameters(params).map_err(|e| e.with_context(&context))?;

    let mut arguments = Vec::with_capacity(tokens.len());
    for token in tokens {
        let type_info = if token.type_text == "..." {
            TypeInfo::varargs()
        } else {
            TypeInfo::parse(&token.type_text).map_err(|e| e.with_context(&context))?
        };
        arguments.push(AddedArgument {
            type_info,
            type_text: token.type_text,
            name: token.name,
            default_value: token.default_value,
        });
    }

    if arguments.len() == 1 && arguments[0].type_info.is_void() && arguments[0].name.is_none() {
        arguments.clear();
    }

    Ok(AddedFunction {
        name: name.to_string(),
        arguments,
        return_type,
        is_constant,
        is_static: false,
        is_class_method: false,
    })
}

/// Split a parameter list into parameter tokens.
///
/// Commas only separate parameters at nesting depth zero, with depth counted
/// over `<{([` and their closers.
pub fn split_parameters(params: &str) -> Result<Vec<ParameterToken>, ParseError> {
    let mut tokens = Vec::new();
    for raw in split_top_level(params) {
        tokens.push(parse_parameter(raw, params)?);
    }
    Ok(tokens)
}

fn split_top_level(params: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in params.char_indices() {
        match c {
            '<' | '{' | '(' | '[' => depth += 1,
            '>' | '}' | ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                pieces.push(params[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < params.len() {
        pieces.push(params[start..].trim());
    }
    pieces
}

fn parse_parameter(raw: &str, params: &str) -> Result<ParameterToken, ParseError> {
    let (type_part, default_value) = match raw.rfind('=') {
        Some(eq) => (&raw[..eq], Some(raw[eq + 1..].trim().to_string())),
        None => (raw, None),
    };

    let mut type_text = type_part.trim().to_string();
    let mut name = None;

    if let Some(at) = type_text.find('@') {
        let Some(end) = type_text[at + 1..].find('@').map(|p| p + at + 1) else {
            let col = params.find(raw).map(|p| p + at + 1).unwrap_or(at + 1);
            return Err(ParseError::new(
                ParseErrorKind::MismatchedMarker,
                Span::new(1, col as u32, 1),
                format!("Mismatched @ in \"{params}\""),
            ));
        };
        name = Some(type_text[at + 1..end].trim().to_string());
        type_text.replace_range(at..=end, "");
        type_text = type_text.trim().to_string();
    } else if let Some((rest, ident)) = split_trailing_name(&type_text) {
        name = Some(ident.to_string());
        type_text = rest.to_string();
    }

    Ok(ParameterToken {
        type_text,
        name,
        default_value,
    })
}

/// Split `const QString &text` into (`const QString &`, `text`).
fn split_trailing_name(text: &str) -> Option<(&str, &str)> {
    let start = text
        .char_indices()
        .rev()
        .find(|&(_, c)| !is_ident_continue(c))
        .map(|(p, c)| p + c.len_utf8())?;
    let ident = &text[start..];
    let rest = text[..start].trim_end();
    let first = ident.chars().next()?;
    if !is_ident_start(first) || TYPE_WORDS.contains(&ident) {
        return None;
    }
    if rest.ends_with("::") || rest.ends_with('<') || rest.ends_with(',') {
        return None;
    }
    let has_type = rest
        .split(|c: char| c.is_whitespace() || c == '*' || c == '&')
        .any(|word| !word.is_empty() && word != "const" && word != "volatile");
    has_type.then_some((rest, ident))
}

#[cfg(test)]
mod tests {
    use super::*;
    use metabind_core::ReferenceKind;

    #[test]
    fn split_parameters_with_markers() {
        let tokens =
            split_parameters("const QList<X,Y> &@list@ = QList<X,Y>{1,2}, int @b@=5, ...").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].type_text, "const QList<X,Y> &");
        assert_eq!(tokens[0].name.as_deref(), Some("list"));
        assert_eq!(tokens[0].default_value.as_deref(), Some("QList<X,Y>{1,2}"));
        assert_eq!(tokens[1].type_text, "int");
        assert_eq!(tokens[1].default_value.as_deref(), Some("5"));
        assert_eq!(tokens[2].type_text, "...");
        assert!(tokens[2].name.is_none());
    }

    #[test]
    fn split_empty_list() {
        assert!(split_parameters("").unwrap().is_empty());
    }

    #[test]
    fn trailing_identifier_names() {
        let tokens = split_parameters("int a, unsigned int, const QString &text, Qt::Alignment").unwrap();
        assert_eq!(tokens[0].name.as_deref(), Some("a"));
        assert_eq!(tokens[0].type_text, "int");
        assert!(tokens[1].name.is_none());
        assert_eq!(tokens[1].type_text, "unsigned int");
        assert_eq!(tokens[2].name.as_deref(), Some("text"));
        assert_eq!(tokens[2].type_text, "const QString &");
        assert!(tokens[3].name.is_none());
    }

    #[test]
    fn mismatched_marker() {
        let err = split_parameters("int @a=5").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MismatchedMarker);
    }

    #[test]
    fn parses_function_with_defaults() {
        let f = parse_added_function("foo(int a=5, QList<X,Y> &@list@={1,2})", "void").unwrap();
        assert_eq!(f.name, "foo");
        assert!(!f.is_constant);
        assert_eq!(f.arguments.len(), 2);

        let a = &f.arguments[0];
        assert_eq!(a.type_text, "int");
        assert_eq!(a.name.as_deref(), Some("a"));
        assert_eq!(a.default_value.as_deref(), Some("5"));

        let list = &f.arguments[1];
        assert_eq!(list.type_text, "QList<X,Y> &");
        assert_eq!(list.name.as_deref(), Some("list"));
        assert_eq!(list.default_value.as_deref(), Some("{1,2}"));
        assert_eq!(list.type_info.qualified_name(), "QList");
        assert_eq!(list.type_info.instantiations.len(), 2);
        assert_eq!(list.type_info.reference, ReferenceKind::LValue);
    }

    #[test]
    fn parses_const_function() {
        let f = parse_added_function("bar() const", "void").unwrap();
        assert_eq!(f.name, "bar");
        assert!(f.arguments.is_empty());
        assert!(f.is_constant);
    }

    #[test]
    fn call_operator_skips_its_parentheses() {
        let f = parse_added_function("operator()(int x, int y)", "int").unwrap();
        assert_eq!(f.name, "operator()");
        assert_eq!(f.arguments.len(), 2);
        assert_eq!(f.return_type.qualified_name(), "int");
    }

    #[test]
    fn name_without_parameters() {
        let f = parse_added_function("  reset  ", "").unwrap();
        assert_eq!(f.name, "reset");
        assert!(f.arguments.is_empty());
    }

    #[test]
    fn void_parameter_list_is_empty() {
        let f = parse_added_function("clear(void)", "").unwrap();
        assert!(f.arguments.is_empty());
    }

    #[test]
    fn varargs_argument() {
        let f = parse_added_function("printf(const char *fmt, ...)", "int").unwrap();
        assert!(f.arguments[1].type_info.is_varargs);
        assert_eq!(f.arguments[0].name.as_deref(), Some("fmt"));
    }

    #[test]
    fn missing_closing_parenthesis() {
        let err = parse_added_function("foo(int", "").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MismatchedDelimiter);
        assert!(err.message.starts_with("Unable to parse added function foo(int: "));
        assert!(err.message.ends_with("Missing closing parenthesis"));
    }

    #[test]
    fn bad_type_names_the_signature() {
        let err = parse_added_function("foo(QList<int)", "").unwrap_err();
        assert!(err.message.contains("foo(QList<int)"));
    }

    #[test]
    fn non_ascii_parameters_are_rejected() {
        let err = parse_added_function("foo(Straße)", "void").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TrailingInput);
        assert!(err.message.contains("foo(Straße)"));

        assert!(parse_added_function("foo(int café)", "void").is_err());
        assert!(parse_added_function("foo(const QString &größe = 1)", "void").is_err());
    }
}
