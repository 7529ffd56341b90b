use std::fmt;

use thiserror::Error;

use crate::parser::blocks::BlockKind;

#[derive(Debug, Clone)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub line_content: String,
}

impl SourceLocation {
    pub fn new(file: &str, line: usize, column: usize, line_content: &str) -> Self {
        SourceLocation {
            file: file.to_string(),
            line,
            column,
            line_content: line_content.to_string(),
        }
    }
}

/// Why a name lookup or declaration was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScopeFault {
    #[error("use of undeclared name")]
    Undeclared,
    #[error("redeclaration in the same scope of")]
    Redeclared,
}

/// Everything that can stop a translation. Any of these aborts the whole
/// unit before a single line of output exists.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranslateError {
    #[error("line {line}: unterminated string literal starting at column {column}")]
    Lex { line: usize, column: usize },

    #[error("line {line}: {fault} `{name}`")]
    Scope {
        line: usize,
        name: String,
        fault: ScopeFault,
    },

    #[error("line {line}: {message}")]
    BlockMismatch { line: usize, message: String },

    #[error("line {line}: `{kind}` block is never closed with `end`")]
    UnterminatedBlock { line: usize, kind: BlockKind },

    #[error("line {line}: unknown statement `{keyword}`")]
    UnknownStatement {
        line: usize,
        keyword: String,
        suggestion: Option<String>,
    },

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
}

impl TranslateError {
    pub fn line(&self) -> usize {
        match self {
            TranslateError::Lex { line, .. }
            | TranslateError::Scope { line, .. }
            | TranslateError::BlockMismatch { line, .. }
            | TranslateError::UnterminatedBlock { line, .. }
            | TranslateError::UnknownStatement { line, .. }
            | TranslateError::Syntax { line, .. } => *line,
        }
    }

    fn column(&self) -> Option<usize> {
        match self {
            TranslateError::Lex { column, .. } => Some(*column),
            _ => None,
        }
    }

    fn suggestion(&self) -> Option<&str> {
        match self {
            TranslateError::UnknownStatement { suggestion, .. } => suggestion.as_deref(),
            _ => None,
        }
    }
}

/// Renders a [`TranslateError`] against the file it came from.
pub struct Diagnostic<'a> {
    pub error: &'a TranslateError,
    pub source: &'a SourceFile,
}

impl<'a> Diagnostic<'a> {
    pub fn new(error: &'a TranslateError, source: &'a SourceFile) -> Self {
        Diagnostic { error, source }
    }

    fn location(&self) -> SourceLocation {
        let line = self.error.line();
        let column = self.error.column().unwrap_or_else(|| {
            // Point at the first non-blank character of the line
            self.source
                .get_line(line)
                .map(|l| l.len() - l.trim_start().len() + 1)
                .unwrap_or(1)
        });
        self.source.make_location(line, column)
    }
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // ANSI color codes
        const RED: &str = "\x1b[1;31m";
        const BLUE: &str = "\x1b[1;34m";
        const YELLOW: &str = "\x1b[1;33m";
        const GREEN: &str = "\x1b[1;32m";
        const RESET: &str = "\x1b[0m";
        const BOLD: &str = "\x1b[1m";

        writeln!(f, "{}error{}: {}{}{}", RED, RESET, BOLD, self.error, RESET)?;

        let loc = self.location();
        writeln!(f, "  {}-->{} {}:{}:{}", BLUE, RESET, loc.file, loc.line, loc.column)?;

        let line_num_width = loc.line.to_string().len();
        writeln!(f, "  {:width$} {}|{}", "", BLUE, RESET, width = line_num_width)?;
        writeln!(
            f,
            "  {}{}{} {}|{} {}",
            BLUE,
            loc.line,
            RESET,
            BLUE,
            RESET,
            loc.line_content.trim_end()
        )?;

        let spaces = " ".repeat(loc.column.saturating_sub(1));
        writeln!(
            f,
            "  {:width$} {}|{} {}{}^--- here{}",
            "", BLUE, RESET, spaces, RED, RESET, width = line_num_width
        )?;

        if let Some(suggestion) = self.error.suggestion() {
            writeln!(f, "  {}help{}: did you mean `{}{}{}`?", GREEN, RESET, YELLOW, suggestion, RESET)?;
        }

        Ok(())
    }
}

pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();
    let a_chars: Vec<char> = a_lower.chars().collect();
    let b_chars: Vec<char> = b_lower.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 { return n; }
    if n == 0 { return m; }

    let mut dp = vec![vec![0usize; n + 1]; m + 1];

    for (i, row) in dp.iter_mut().enumerate() { row[0] = i; }
    for j in 0..=n { dp[0][j] = j; }

    for i in 1..=m {
        for j in 1..=n {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
            dp[i][j] = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + cost);
        }
    }

    dp[m][n]
}

pub fn find_similar_keyword(word: &str, keywords: &[&str]) -> Option<String> {
    let mut best_match: Option<(String, usize)> = None;

    // Two-letter words are too ambiguous to correct
    if word.len() <= 2 {
        return None;
    }

    for &keyword in keywords {
        let len_diff = word.len().abs_diff(keyword.len());
        if len_diff > 2 {
            continue;
        }

        let distance = levenshtein_distance(word, keyword);
        if distance == 0 {
            return None;
        }

        let max_distance = if word.len() >= 4 { 2 } else { 1 };
        if distance <= max_distance {
            match &best_match {
                Some((_, best_dist)) if distance >= *best_dist => {}
                _ => best_match = Some((keyword.to_string(), distance)),
            }
        }
    }

    best_match.map(|(s, _)| s)
}

/// Every leading keyword the translator dispatches on.
pub const STATEMENT_KEYWORDS: &[&str] = &[
    "say", "wait", "clear", "exit", "system",
    "set", "inc", "dec", "add", "subtract", "multiply", "divide", "modulo",
    "if", "elif", "else", "while", "end", "repeat", "each",
    "list", "push", "get", "map", "put", "key",
    "define", "run",
    "ask", "write", "read", "exists", "fetch", "json", "random",
];

pub struct SourceFile {
    pub filename: String,
    lines: Vec<String>,
}

impl SourceFile {
    pub fn new(filename: &str, content: &str) -> Self {
        let lines: Vec<String> = content.lines().map(|s| s.to_string()).collect();
        SourceFile {
            filename: filename.to_string(),
            lines,
        }
    }

    pub fn get_line(&self, line_num: usize) -> Option<&str> {
        if line_num > 0 && line_num <= self.lines.len() {
            Some(&self.lines[line_num - 1])
        } else {
            None
        }
    }

    pub fn make_location(&self, line: usize, column: usize) -> SourceLocation {
        let line_content = self.get_line(line).unwrap_or("").to_string();
        SourceLocation::new(&self.filename, line, column, &line_content)
    }
}
