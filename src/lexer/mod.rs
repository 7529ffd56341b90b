use std::iter::Peekable;
use std::str::CharIndices;

use crate::errors::TranslateError;

/// One word or quoted literal of a source line.
///
/// `text` borrows from the source line. A quoted literal keeps its quotes so
/// that it can be emitted verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub column: usize,
    pub quoted: bool,
}

impl<'a> Token<'a> {
    pub fn is(&self, word: &str) -> bool {
        !self.quoted && self.text == word
    }
}

/// A tokenized logical line: the leading keyword and what follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    pub number: usize,
    pub keyword: Token<'a>,
    pub operands: Vec<Token<'a>>,
}

/// Yields `(line_number, indent, trimmed_text)` for every line that carries
/// a statement. Blank lines and `#` comments are dropped here so the lexer
/// never sees them.
pub fn logical_lines(source: &str) -> impl Iterator<Item = (usize, usize, &str)> {
    source
        .lines()
        .enumerate()
        .map(|(i, raw)| {
            let rest = raw.trim_start();
            let indent = raw[..raw.len() - rest.len()].chars().count();
            (i + 1, indent, rest.trim_end())
        })
        .filter(|(_, _, text)| !text.is_empty() && !text.starts_with('#'))
}

pub struct Lexer<'a> {
    text: &'a str,
    input: Peekable<CharIndices<'a>>,
    line: usize,
    // Column of `text[0]` within the untrimmed source line
    offset: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str, line: usize) -> Self {
        Lexer {
            text,
            input: text.char_indices().peekable(),
            line,
            offset: 1,
        }
    }

    /// Report columns relative to the untrimmed line `text` was cut from.
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.offset = indent + 1;
        self
    }

    fn column(&self, byte: usize) -> usize {
        self.offset + self.text[..byte].chars().count()
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, ch)) = self.input.peek() {
            if ch.is_whitespace() {
                self.input.next();
            } else {
                break;
            }
        }
    }

    fn read_word(&mut self, start: usize) -> Token<'a> {
        let mut end = self.text.len();
        while let Some(&(i, ch)) = self.input.peek() {
            if ch.is_whitespace() || ch == '"' {
                end = i;
                break;
            }
            self.input.next();
        }
        Token {
            text: &self.text[start..end],
            column: self.column(start),
            quoted: false,
        }
    }

    fn read_quoted(&mut self, start: usize) -> Result<Token<'a>, TranslateError> {
        // Opening quote has already been consumed
        for (i, ch) in self.input.by_ref() {
            if ch == '"' {
                return Ok(Token {
                    text: &self.text[start..i + 1],
                    column: self.offset + self.text[..start].chars().count(),
                    quoted: true,
                });
            }
        }
        Err(TranslateError::Lex {
            line: self.line,
            column: self.column(start),
        })
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token<'a>>, TranslateError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            let token = match self.input.next() {
                None => break,
                Some((start, '"')) => self.read_quoted(start)?,
                Some((start, _)) => self.read_word(start),
            };
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Tokenize and split off the leading keyword. Returns `None` for a
    /// line with no tokens.
    pub fn line(mut self) -> Result<Option<Line<'a>>, TranslateError> {
        let number = self.line;
        let mut tokens = self.tokenize()?.into_iter();
        Ok(tokens.next().map(|keyword| Line {
            number,
            keyword,
            operands: tokens.collect(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &str) -> Vec<&str> {
        Lexer::new(line, 1)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_bare_words() {
        assert_eq!(texts("set x to 5"), vec!["set", "x", "to", "5"]);
        assert_eq!(texts("list nums is 1,2,3"), vec!["list", "nums", "is", "1,2,3"]);
    }

    #[test]
    fn test_quoted_literal_is_one_token() {
        let tokens = Lexer::new(r#"say "hello   world" name"#, 1).tokenize().unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].text, "\"hello   world\"");
        assert!(tokens[1].quoted);
        assert!(!tokens[2].quoted);
    }

    #[test]
    fn test_quote_splits_adjacent_word() {
        assert_eq!(texts(r#"say abc"def"ghi"#), vec!["say", "abc", "\"def\"", "ghi"]);
    }

    #[test]
    fn test_empty_quotes() {
        assert_eq!(texts(r#"set s to """#), vec!["set", "s", "to", "\"\""]);
    }

    #[test]
    fn test_columns() {
        let tokens = Lexer::new(r#"say "a b" c"#, 1).with_indent(4).tokenize().unwrap();
        assert_eq!(tokens[0].column, 5);
        assert_eq!(tokens[1].column, 9);
        assert_eq!(tokens[2].column, 15);
    }

    #[test]
    fn test_unterminated_quote() {
        let err = Lexer::new(r#"say "oops"#, 7).tokenize().unwrap_err();
        assert_eq!(err, TranslateError::Lex { line: 7, column: 5 });
    }

    #[test]
    fn test_line_splits_keyword() {
        let line = Lexer::new("inc counter", 3).line().unwrap().unwrap();
        assert_eq!(line.number, 3);
        assert_eq!(line.keyword.text, "inc");
        assert_eq!(line.operands.len(), 1);
        assert!(line.operands[0].is("counter"));
    }

    #[test]
    fn test_logical_lines_skip_blanks_and_comments() {
        let source = "say 1\n\n   # note\n  say 2  \n";
        let lines: Vec<_> = logical_lines(source).collect();
        assert_eq!(lines, vec![(1, 0, "say 1"), (4, 2, "say 2")]);
    }
}
