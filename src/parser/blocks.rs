//! Block nesting validation.
//!
//! Every opening keyword pushes an [`OpenBlock`]; `elif`/`else` move to the
//! next arm of the `if` on top; `end` pops and folds the finished body into a
//! single [`Statement`] in the enclosing body. Any structural mistake is
//! reported before a line of output exists.

use std::fmt;

use crate::errors::TranslateError;
use super::ast::{Arm, Binding, Condition, Expr, Statement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    If,
    While,
    Repeat,
    Each,
    Define,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            BlockKind::If => "if",
            BlockKind::While => "while",
            BlockKind::Repeat => "repeat",
            BlockKind::Each => "each",
            BlockKind::Define => "define",
        };
        f.write_str(word)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub origin_line: usize,
}

/// What the opening line of a block said, kept until its `end`.
#[derive(Debug, Clone, PartialEq)]
pub enum Header {
    If {
        arms: Vec<Arm>,
        // Condition of the arm being filled; `None` once inside `else`
        current: Option<Condition>,
    },
    While(Condition),
    Repeat {
        count: Expr,
        counter: usize,
    },
    Each {
        item: String,
        binding: Binding,
        list: Expr,
    },
    Define {
        name: String,
        params: Vec<String>,
    },
}

impl Header {
    pub fn kind(&self) -> BlockKind {
        match self {
            Header::If { .. } => BlockKind::If,
            Header::While(_) => BlockKind::While,
            Header::Repeat { .. } => BlockKind::Repeat,
            Header::Each { .. } => BlockKind::Each,
            Header::Define { .. } => BlockKind::Define,
        }
    }
}

#[derive(Debug)]
struct OpenBlock {
    block: Block,
    header: Header,
    body: Vec<Statement>,
}

/// A block popped by `end`, ready to become a statement.
#[derive(Debug)]
pub struct ClosedBlock {
    pub block: Block,
    header: Header,
    body: Vec<Statement>,
}

impl ClosedBlock {
    pub fn kind(&self) -> BlockKind {
        self.block.kind
    }

    /// `locals` is only meaningful for `define` blocks: the names the
    /// function scope declared besides its parameters.
    pub fn into_statement(self, locals: Vec<String>) -> Statement {
        let body = self.body;
        match self.header {
            Header::If { mut arms, current } => {
                let otherwise = match current {
                    Some(condition) => {
                        arms.push(Arm { condition, body });
                        None
                    }
                    None => Some(body),
                };
                Statement::If { arms, otherwise }
            }
            Header::While(condition) => Statement::While { condition, body },
            Header::Repeat { count, counter } => Statement::Repeat { count, counter, body },
            Header::Each { item, binding, list } => Statement::Each { item, binding, list, body },
            Header::Define { name, params } => {
                let locals = locals.into_iter().filter(|n| !params.contains(n)).collect();
                Statement::Define { name, params, locals, body }
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct BlockStack {
    root: Vec<Statement>,
    open: Vec<OpenBlock>,
}

impl BlockStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Appends to the body of the innermost open block, or the program.
    pub fn push_statement(&mut self, statement: Statement) {
        match self.open.last_mut() {
            Some(open) => open.body.push(statement),
            None => self.root.push(statement),
        }
    }

    pub fn open(&mut self, header: Header, line: usize) {
        let block = Block { kind: header.kind(), origin_line: line };
        self.open.push(OpenBlock { block, header, body: Vec::new() });
    }

    fn check_if_on_top(&self, keyword: &str, line: usize) -> Result<(), TranslateError> {
        let open = match self.open.last() {
            Some(open) => open,
            None => {
                return Err(TranslateError::BlockMismatch {
                    line,
                    message: format!("`{}` without an open `if` block", keyword),
                })
            }
        };
        let message = match &open.header {
            Header::If { current: Some(_), .. } => return Ok(()),
            Header::If { current: None, .. } => format!(
                "`{}` after `else` in the `if` block opened on line {}",
                keyword, open.block.origin_line
            ),
            other => format!(
                "`{}` cannot continue the `{}` block opened on line {}",
                keyword,
                other.kind(),
                open.block.origin_line
            ),
        };
        Err(TranslateError::BlockMismatch { line, message })
    }

    /// Ends the current `if`/`elif` arm and starts a new conditional one.
    pub fn elif(&mut self, condition: Condition, line: usize) -> Result<(), TranslateError> {
        self.check_if_on_top("elif", line)?;
        if let Some(open) = self.open.last_mut() {
            let body = std::mem::take(&mut open.body);
            if let Header::If { arms, current } = &mut open.header {
                if let Some(done) = current.replace(condition) {
                    arms.push(Arm { condition: done, body });
                }
            }
        }
        Ok(())
    }

    /// Ends the current arm and starts the unconditional one.
    pub fn otherwise(&mut self, line: usize) -> Result<(), TranslateError> {
        self.check_if_on_top("else", line)?;
        if let Some(open) = self.open.last_mut() {
            let body = std::mem::take(&mut open.body);
            if let Header::If { arms, current } = &mut open.header {
                if let Some(done) = current.take() {
                    arms.push(Arm { condition: done, body });
                }
            }
        }
        Ok(())
    }

    pub fn close(&mut self, line: usize) -> Result<ClosedBlock, TranslateError> {
        match self.open.pop() {
            Some(OpenBlock { block, header, body }) => Ok(ClosedBlock { block, header, body }),
            None => Err(TranslateError::BlockMismatch {
                line,
                message: "`end` without an open block".to_string(),
            }),
        }
    }

    /// Consumes the stack at end of input. Fails if anything is still open.
    pub fn finish(self) -> Result<Vec<Statement>, TranslateError> {
        match self.open.last() {
            Some(open) => Err(TranslateError::UnterminatedBlock {
                line: open.block.origin_line,
                kind: open.block.kind,
            }),
            None => Ok(self.root),
        }
    }
}
