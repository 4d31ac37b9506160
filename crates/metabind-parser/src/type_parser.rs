//! Recursive-descent parser for C++ type references.
//!
//! Grammar, informally:
//!
//! ```text
//! type     := cv* (literal | '...' | builtin | name) cv* ptr* ref? array*
//! name     := '::'? segment ('::' segment)*
//! segment  := ident ('<' type (',' type)* '>')?
//! builtin  := ('unsigned' | 'signed' | 'short' | 'long') builtin-word*
//! ptr      := '*' 'const'?
//! ref      := '&' | '&&'
//! array    := '[' digits? ']'
//! ```

use metabind_core::{Indirection, ParseError, ParseErrorKind, ReferenceKind};

use crate::cursor::{Cursor, is_ident_continue, is_ident_start};
use crate::type_info::TypeInfo;

/// Words that may follow a sign/size modifier in a multi-word builtin.
const BUILTIN_WORDS: &[&str] = &["unsigned", "signed", "short", "long", "int", "char", "double"];

/// Words that start a multi-word builtin.
const BUILTIN_MODIFIERS: &[&str] = &["unsigned", "signed", "short", "long"];

/// Parses one type reference out of a string.
pub struct TypeParser<'src> {
    cursor: Cursor<'src>,
}

impl<'src> TypeParser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Parse a type that must span the whole input.
    pub fn parse_complete(mut self) -> Result<TypeInfo, ParseError> {
        let ty = self.parse_type()?;
        self.cursor.skip_whitespace();
        if !self.cursor.is_eof() {
            return Err(ParseError::new(
                ParseErrorKind::TrailingInput,
                self.cursor.here(),
                format!("unexpected '{}' after type", self.cursor.rest()),
            ));
        }
        Ok(ty)
    }

    fn parse_type(&mut self) -> Result<TypeInfo, ParseError> {
        let mut ty = TypeInfo::default();
        self.parse_cv(&mut ty);
        self.cursor.skip_whitespace();

        if self.cursor.eat_str("...") {
            return Ok(TypeInfo::varargs());
        }

        if self.cursor.check(|c| c.is_ascii_digit() || c == '-') {
            let start = self.cursor.offset();
            self.cursor.eat('-');
            let digits = self.cursor.eat_while(|c| c.is_ascii_alphanumeric());
            if digits.is_empty() {
                return Err(ParseError::new(
                    ParseErrorKind::ExpectedType,
                    self.cursor.span_from(start),
                    "expected a number",
                ));
            }
            ty.name = vec![self.cursor.slice_from(start).to_string()];
            ty.is_literal = true;
            return Ok(ty);
        }

        self.parse_name(&mut ty)?;
        self.parse_cv(&mut ty);
        self.parse_declarator(&mut ty)?;
        Ok(ty)
    }

    /// Consume `const`/`volatile` keywords.
    fn parse_cv(&mut self, ty: &mut TypeInfo) {
        loop {
            self.cursor.skip_whitespace();
            if self.eat_keyword("const") {
                ty.constant = true;
            } else if self.eat_keyword("volatile") {
                ty.volatile = true;
            } else {
                break;
            }
        }
    }

    fn parse_name(&mut self, ty: &mut TypeInfo) -> Result<(), ParseError> {
        self.cursor.eat_str("::");
        let start = self.cursor.offset();
        let Some(first) = self.peek_ident() else {
            return Err(ParseError::new(
                ParseErrorKind::ExpectedType,
                self.cursor.here(),
                match self.cursor.peek() {
                    Some(c) => format!("expected type name, found '{c}'"),
                    None => "expected type name".to_string(),
                },
            ));
        };

        if BUILTIN_MODIFIERS.contains(&first) {
            let mut words = Vec::new();
            loop {
                self.cursor.skip_whitespace();
                match self.peek_ident() {
                    Some(word) if BUILTIN_WORDS.contains(&word) => {
                        self.cursor.eat_str(word);
                        words.push(word);
                    }
                    _ => break,
                }
            }
            ty.name = vec![words.join(" ")];
            return Ok(());
        }

        loop {
            let Some(segment) = self.peek_ident() else {
                return Err(ParseError::new(
                    ParseErrorKind::ExpectedIdentifier,
                    self.cursor.here(),
                    format!("expected identifier after '{}'", self.cursor.slice_from(start)),
                ));
            };
            self.cursor.eat_str(segment);
            self.cursor.skip_whitespace();

            let mut segment = segment.to_string();
            if self.cursor.check_str("<") {
                let args = self.parse_template_arguments()?;
                if self.cursor.check_str("::") {
                    // Arguments on an enclosing scope stay part of its name.
                    let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
                    segment = format!("{}<{}>", segment, rendered.join(", "));
                } else {
                    ty.instantiations = args;
                }
            }
            ty.name.push(segment);

            self.cursor.skip_whitespace();
            if !self.cursor.eat_str("::") {
                break;
            }
            self.cursor.skip_whitespace();
        }
        Ok(())
    }

    fn parse_template_arguments(&mut self) -> Result<Vec<TypeInfo>, ParseError> {
        let open = self.cursor.offset();
        self.cursor.eat('<');
        let mut args = Vec::new();
        self.cursor.skip_whitespace();
        if self.cursor.eat('>') {
            return Ok(args);
        }
        loop {
            args.push(self.parse_type()?);
            self.cursor.skip_whitespace();
            if self.cursor.eat(',') {
                continue;
            }
            if self.cursor.eat('>') {
                return Ok(args);
            }
            return Err(match self.cursor.peek() {
                None => ParseError::new(
                    ParseErrorKind::MismatchedDelimiter,
                    self.cursor.span_from(open),
                    "missing '>' to close template arguments",
                ),
                Some(c) => ParseError::new(
                    ParseErrorKind::UnexpectedToken,
                    self.cursor.here(),
                    format!("unexpected '{c}' in template arguments"),
                ),
            });
        }
    }

    /// Pointers, reference and array dimensions after the name.
    fn parse_declarator(&mut self, ty: &mut TypeInfo) -> Result<(), ParseError> {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.eat('*') {
                self.cursor.skip_whitespace();
                if self.eat_keyword("const") {
                    ty.indirections.push(Indirection::ConstPointer);
                } else {
                    ty.indirections.push(Indirection::Pointer);
                }
                continue;
            }
            break;
        }

        self.cursor.skip_whitespace();
        let ref_start = self.cursor.offset();
        if self.cursor.eat_str("&&") {
            ty.reference = ReferenceKind::RValue;
        } else if self.cursor.eat('&') {
            ty.reference = ReferenceKind::LValue;
        }
        if ty.reference.is_reference() {
            self.cursor.skip_whitespace();
            if self.cursor.check_str("&") || self.cursor.check_str("*") {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedToken,
                    self.cursor.span_from(ref_start),
                    "pointer or reference to a reference",
                ));
            }
        }

        loop {
            self.cursor.skip_whitespace();
            let open = self.cursor.offset();
            if !self.cursor.eat('[') {
                break;
            }
            let digits = self.cursor.eat_while(|c| !matches!(c, ']'));
            if !self.cursor.eat(']') {
                return Err(ParseError::new(
                    ParseErrorKind::MismatchedDelimiter,
                    self.cursor.span_from(open),
                    "missing ']'",
                ));
            }
            let digits = digits.trim();
            if digits.is_empty() {
                ty.array_dimensions.push(None);
            } else {
                let size = digits.parse::<usize>().map_err(|_| {
                    ParseError::new(
                        ParseErrorKind::InvalidArrayDimension,
                        self.cursor.span_from(open),
                        format!("'{digits}' is not an array size"),
                    )
                })?;
                ty.array_dimensions.push(Some(size));
            }
        }
        Ok(())
    }

    fn peek_ident(&self) -> Option<&'src str> {
        let rest = self.cursor.rest();
        if !rest.starts_with(is_ident_start) {
            return None;
        }
        let len = rest
            .find(|c: char| !is_ident_continue(c))
            .unwrap_or(rest.len());
        Some(&rest[..len])
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_ident() == Some(keyword) {
            self.cursor.eat_str(keyword);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> TypeInfo {
        TypeInfo::parse(text).unwrap()
    }

    #[test]
    fn plain_and_qualified_names() {
        assert_eq!(parse("int").name, vec!["int"]);
        assert_eq!(parse("Qt::Alignment").name, vec!["Qt", "Alignment"]);
        assert_eq!(parse("::QObject").name, vec!["QObject"]);
    }

    #[test]
    fn multi_word_builtins() {
        assert_eq!(parse("unsigned int").name, vec!["unsigned int"]);
        assert_eq!(parse("long long").name, vec!["long long"]);
        assert_eq!(parse("unsigned   char *").name, vec!["unsigned char"]);
        assert_eq!(parse("const unsigned short &").name, vec!["unsigned short"]);
    }

    #[test]
    fn cv_before_and_after_name() {
        let before = parse("const char *");
        let after = parse("char const *");
        assert_eq!(before, after);
        assert!(before.constant);
        assert_eq!(before.indirections, vec![Indirection::Pointer]);

        let vol = parse("volatile int");
        assert!(vol.volatile);
    }

    #[test]
    fn pointers_and_references() {
        let ty = parse("QObject * const *");
        assert_eq!(
            ty.indirections,
            vec![Indirection::ConstPointer, Indirection::Pointer]
        );
        assert_eq!(parse("QString &").reference, ReferenceKind::LValue);
        assert_eq!(parse("QString&&").reference, ReferenceKind::RValue);
    }

    #[test]
    fn nested_templates() {
        let ty = parse("QMap<QString, QList<int>>");
        assert_eq!(ty.instantiations.len(), 2);
        assert_eq!(ty.instantiations[1].name, vec!["QList"]);
        assert_eq!(ty.instantiations[1].instantiations[0].name, vec!["int"]);
    }

    #[test]
    fn non_type_template_arguments() {
        let ty = parse("std::array<int, 4>");
        assert_eq!(ty.name, vec!["std", "array"]);
        assert!(ty.instantiations[1].is_literal);
        assert_eq!(ty.instantiations[1].name, vec!["4"]);
    }

    #[test]
    fn scope_templates_stay_in_name() {
        let ty = parse("QList<int>::iterator");
        assert_eq!(ty.name, vec!["QList<int>", "iterator"]);
        assert!(ty.instantiations.is_empty());
    }

    #[test]
    fn array_dimensions() {
        let ty = parse("int[3][]");
        assert_eq!(ty.array_dimensions, vec![Some(3), None]);

        let err = TypeInfo::parse("int[x]").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidArrayDimension);
    }

    #[test]
    fn varargs() {
        assert!(parse("...").is_varargs);
    }

    #[test]
    fn errors() {
        let err = TypeInfo::parse("QList<int").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MismatchedDelimiter);

        let err = TypeInfo::parse("").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ExpectedType);

        let err = TypeInfo::parse("int x").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TrailingInput);

        let err = TypeInfo::parse("Qt::").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ExpectedIdentifier);

        let err = TypeInfo::parse("int & &").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
    }
}
