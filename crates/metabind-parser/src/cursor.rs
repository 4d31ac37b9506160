use metabind_core::Span;

/// A cursor over signature or type text.
///
/// Signatures are single-line, so only the byte offset is tracked; spans
/// report it as a 1-indexed column on line 1.
pub struct Cursor<'src> {
    source: &'src str,
    /// Remaining text (slice starting at the current position).
    rest: &'src str,
    offset: u32,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            offset: 0,
        }
    }

    #[inline]
    pub fn source(&self) -> &'src str {
        self.source
    }

    #[inline]
    pub fn rest(&self) -> &'src str {
        self.rest
    }

    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.rest.is_empty()
    }

    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    #[inline]
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    #[inline]
    pub fn check(&self, f: impl Fn(char) -> bool) -> bool {
        self.peek().is_some_and(f)
    }

    #[inline]
    pub fn check_str(&self, s: &str) -> bool {
        self.rest.starts_with(s)
    }

    /// Consume one character.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.rest.chars().next()?;
        let len = ch.len_utf8();
        self.rest = &self.rest[len..];
        self.offset += len as u32;
        Some(ch)
    }

    /// Consume `s` if the remaining text starts with it.
    pub fn eat_str(&mut self, s: &str) -> bool {
        if self.check_str(s) {
            self.rest = &self.rest[s.len()..];
            self.offset += s.len() as u32;
            true
        } else {
            false
        }
    }

    pub fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume characters while the predicate matches; returns the consumed slice.
    pub fn eat_while(&mut self, f: impl Fn(char) -> bool) -> &'src str {
        let start = self.offset;
        while self.check(&f) {
            self.advance();
        }
        self.slice_from(start)
    }

    pub fn skip_whitespace(&mut self) {
        self.eat_while(char::is_whitespace);
    }

    #[inline]
    pub fn slice_from(&self, start: u32) -> &'src str {
        &self.source[start as usize..self.offset as usize]
    }

    /// Span from `start` to the current position.
    pub fn span_from(&self, start: u32) -> Span {
        Span::new(1, start + 1, self.offset - start)
    }

    /// Zero-width span at the current position.
    pub fn here(&self) -> Span {
        Span::point(1, self.offset + 1)
    }
}

#[inline]
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
pub fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_basics() {
        let mut cursor = Cursor::new("int *");
        assert_eq!(cursor.peek(), Some('i'));
        assert_eq!(cursor.eat_while(is_ident_continue), "int");
        cursor.skip_whitespace();
        assert_eq!(cursor.offset(), 4);
        assert!(cursor.eat('*'));
        assert!(cursor.is_eof());
    }

    #[test]
    fn cursor_eat_str() {
        let mut cursor = Cursor::new("...)");
        assert!(cursor.eat_str("..."));
        assert!(!cursor.eat_str("..."));
        assert_eq!(cursor.rest(), ")");
    }

    #[test]
    fn cursor_spans_are_one_indexed() {
        let mut cursor = Cursor::new("QList<int>");
        let start = cursor.offset();
        cursor.eat_while(is_ident_continue);
        let span = cursor.span_from(start);
        assert_eq!((span.line, span.col, span.len), (1, 1, 5));
        assert_eq!(cursor.here().col, 6);
    }

    #[test]
    fn ident_predicates() {
        assert!(is_ident_start('_'));
        assert!(!is_ident_start('7'));
        assert!(is_ident_continue('7'));
        assert!(!is_ident_continue(':'));
    }
}
