pub mod ast;
pub mod blocks;

use log::{debug, warn};

use crate::analyzer::SymbolTable;
use crate::errors::{find_similar_keyword, TranslateError, STATEMENT_KEYWORDS};
use crate::lexer::{logical_lines, Lexer, Line, Token};
use ast::*;
use blocks::{BlockKind, BlockStack, Header};

/// Line-at-a-time translator from `.simple` source to the statement model.
///
/// One `Translator` serves exactly one translation: its symbol table and
/// block stack are created empty and consumed by [`Translator::translate`].
pub struct Translator {
    symbols: SymbolTable,
    blocks: BlockStack,
    strict: bool,
    repeat_counter: usize,
}

impl Translator {
    pub fn new() -> Self {
        Translator {
            symbols: SymbolTable::new(),
            blocks: BlockStack::new(),
            strict: true,
            repeat_counter: 0,
        }
    }

    /// In non-strict mode an unknown leading keyword is skipped with a
    /// warning instead of failing the translation.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn translate(mut self, source: &str) -> Result<Program, TranslateError> {
        for (number, indent, text) in logical_lines(source) {
            let line = match Lexer::new(text, number).with_indent(indent).line()? {
                Some(line) => line,
                None => continue,
            };
            debug!("line {}: `{}` with {} operand(s)", number, line.keyword.text, line.operands.len());
            self.parse_statement(&line)?;
        }

        let statements = self.blocks.finish()?;
        Ok(Program::new(self.symbols.globals().to_vec(), statements))
    }

    fn parse_statement(&mut self, line: &Line) -> Result<(), TranslateError> {
        if line.keyword.quoted {
            return self.unknown_statement(line);
        }

        let statement = match line.keyword.text {
            "say" => self.parse_say(line)?,
            "wait" => Statement::Wait(self.parse_single(line, "wait <seconds>")?),
            "clear" => {
                expect_count(line, 0, "clear")?;
                Statement::Clear
            }
            "exit" => {
                expect_count(line, 0, "exit")?;
                Statement::Exit
            }
            "system" => Statement::System(self.parse_single(line, "system <command>")?),
            "set" => self.parse_set(line)?,
            "inc" | "dec" => self.parse_step(line)?,
            "add" | "subtract" | "multiply" | "divide" => self.parse_update(line)?,
            "modulo" => self.parse_modulo(line)?,
            "if" => {
                let condition = self.parse_condition(line)?;
                self.blocks.open(Header::If { arms: Vec::new(), current: Some(condition) }, line.number);
                return Ok(());
            }
            "elif" => {
                let condition = self.parse_condition(line)?;
                return self.blocks.elif(condition, line.number);
            }
            "else" => {
                expect_count(line, 0, "else")?;
                return self.blocks.otherwise(line.number);
            }
            "while" => {
                let condition = self.parse_condition(line)?;
                self.blocks.open(Header::While(condition), line.number);
                return Ok(());
            }
            "repeat" => {
                let count = self.parse_single(line, "repeat <count>")?;
                self.repeat_counter += 1;
                let header = Header::Repeat { count, counter: self.repeat_counter };
                self.blocks.open(header, line.number);
                return Ok(());
            }
            "each" => return self.parse_each(line),
            "define" => return self.parse_define(line),
            "end" => return self.parse_end(line),
            "list" => self.parse_list(line)?,
            "push" => self.parse_push(line)?,
            "get" => self.parse_lookup(line, "get <target> from <list> at <index>")?,
            "map" => {
                expect_count(line, 1, "map <name>")?;
                let target = name(line, &line.operands[0])?;
                self.bind(target, Value::EmptyMap)
            }
            "put" => self.parse_put(line)?,
            "key" => self.parse_lookup(line, "key <target> from <map> at <key>")?,
            "run" => self.parse_run(line)?,
            "ask" => self.parse_ask(line)?,
            "write" => self.parse_write(line)?,
            "read" | "exists" | "fetch" | "json" => self.parse_into(line)?,
            "random" => self.parse_random(line)?,
            _ => return self.unknown_statement(line),
        };

        self.blocks.push_statement(statement);
        Ok(())
    }

    fn unknown_statement(&mut self, line: &Line) -> Result<(), TranslateError> {
        let keyword = line.keyword.text;
        if self.strict {
            return Err(TranslateError::UnknownStatement {
                line: line.number,
                keyword: keyword.to_string(),
                suggestion: find_similar_keyword(keyword, STATEMENT_KEYWORDS),
            });
        }
        warn!("line {}: skipping unknown statement `{}`", line.number, keyword);
        Ok(())
    }

    /// Declare-or-assign `target`, after its value has been resolved.
    fn bind(&mut self, target: String, value: Value) -> Statement {
        let binding = self.symbols.bind(&target);
        Statement::Bind { target, binding, value }
    }

    fn operand(&self, line: &Line, token: &Token) -> Result<Expr, TranslateError> {
        self.value(line.number, token.text, token.quoted)
    }

    fn value(&self, number: usize, text: &str, quoted: bool) -> Result<Expr, TranslateError> {
        if quoted {
            return Ok(Expr::Str(text.to_string()));
        }
        match text {
            "true" => return Ok(Expr::Bool(true)),
            "false" => return Ok(Expr::Bool(false)),
            _ => {}
        }
        if is_number(text) {
            return if text.contains('.') {
                // Overflow parses as infinity, which has no literal form
                text.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(Expr::Float)
                    .ok_or_else(|| out_of_range(number, text))
            } else {
                text.parse().map(Expr::Int).map_err(|_| out_of_range(number, text))
            };
        }
        if is_identifier(text) {
            self.symbols.resolve(text).map_err(|fault| TranslateError::Scope {
                line: number,
                name: text.to_string(),
                fault,
            })?;
            return Ok(Expr::Var(text.to_string()));
        }
        Err(TranslateError::Syntax {
            line: number,
            message: format!("`{}` is not a value", text),
        })
    }

    /// A name that must already be visible, such as the target of `inc`.
    fn existing(&self, line: &Line, token: &Token) -> Result<String, TranslateError> {
        let target = name(line, token)?;
        self.symbols.resolve(&target).map_err(|fault| TranslateError::Scope {
            line: line.number,
            name: target.clone(),
            fault,
        })?;
        Ok(target)
    }

    fn declare(&mut self, line: &Line, name: &str) -> Result<(), TranslateError> {
        self.symbols.declare(name).map_err(|fault| TranslateError::Scope {
            line: line.number,
            name: name.to_string(),
            fault,
        })
    }

    fn parse_single(&self, line: &Line, shape: &str) -> Result<Expr, TranslateError> {
        expect_count(line, 1, shape)?;
        self.operand(line, &line.operands[0])
    }

    fn parse_say(&self, line: &Line) -> Result<Statement, TranslateError> {
        const SHAPE: &str = "say <value> [+] <value>...";
        if line.operands.is_empty() {
            return Err(shape_error(line, SHAPE));
        }

        let mut groups: Vec<Vec<Expr>> = Vec::new();
        let mut glue = false;
        for token in &line.operands {
            if token.is("+") {
                if groups.is_empty() || glue {
                    return Err(shape_error(line, SHAPE));
                }
                glue = true;
                continue;
            }
            let expr = self.operand(line, token)?;
            match groups.last_mut() {
                Some(group) if glue => group.push(expr),
                _ => groups.push(vec![expr]),
            }
            glue = false;
        }
        if glue {
            return Err(shape_error(line, SHAPE));
        }

        Ok(Statement::Say(groups))
    }

    fn parse_set(&mut self, line: &Line) -> Result<Statement, TranslateError> {
        const SHAPE: &str = "set <name> to <value> [<op> <value>]";
        let ops = &line.operands;
        if !(ops.len() == 3 || ops.len() == 5) {
            return Err(shape_error(line, SHAPE));
        }
        expect_word(line, 1, "to", SHAPE)?;

        let value = if ops.len() == 5 {
            let op = ArithOp::from_symbol(ops[3].text)
                .filter(|_| !ops[3].quoted)
                .ok_or_else(|| TranslateError::Syntax {
                    line: line.number,
                    message: format!("unknown operator `{}`, expected one of + - * /", ops[3].text),
                })?;
            Value::Arith {
                left: self.operand(line, &ops[2])?,
                op,
                right: self.operand(line, &ops[4])?,
            }
        } else {
            Value::Expr(self.operand(line, &ops[2])?)
        };

        let target = name(line, &ops[0])?;
        Ok(self.bind(target, value))
    }

    fn parse_step(&self, line: &Line) -> Result<Statement, TranslateError> {
        let (op, shape) = match line.keyword.text {
            "inc" => (ArithOp::Add, "inc <name>"),
            _ => (ArithOp::Subtract, "dec <name>"),
        };
        expect_count(line, 1, shape)?;
        Ok(Statement::Update {
            target: self.existing(line, &line.operands[0])?,
            op,
            operand: Expr::Int(1),
        })
    }

    fn parse_update(&self, line: &Line) -> Result<Statement, TranslateError> {
        let (op, preposition, shape) = match line.keyword.text {
            "add" => (ArithOp::Add, "to", "add <value> to <name>"),
            "subtract" => (ArithOp::Subtract, "from", "subtract <value> from <name>"),
            "multiply" => (ArithOp::Multiply, "by", "multiply <value> by <name>"),
            _ => (ArithOp::Divide, "by", "divide <value> by <name>"),
        };
        expect_count(line, 3, shape)?;
        expect_word(line, 1, preposition, shape)?;
        Ok(Statement::Update {
            operand: self.operand(line, &line.operands[0])?,
            op,
            target: self.existing(line, &line.operands[2])?,
        })
    }

    fn parse_modulo(&mut self, line: &Line) -> Result<Statement, TranslateError> {
        const SHAPE: &str = "modulo <value> by <value> into <target>";
        expect_count(line, 5, SHAPE)?;
        expect_word(line, 1, "by", SHAPE)?;
        expect_word(line, 3, "into", SHAPE)?;
        let ops = &line.operands;
        let value = Value::Arith {
            left: self.operand(line, &ops[0])?,
            op: ArithOp::Modulo,
            right: self.operand(line, &ops[2])?,
        };
        let target = name(line, &ops[4])?;
        Ok(self.bind(target, value))
    }

    fn parse_condition(&self, line: &Line) -> Result<Condition, TranslateError> {
        let shape = format!("{} <value> <is|is_not|>|<|contains> <value>", line.keyword.text);
        expect_count(line, 3, &shape)?;
        let ops = &line.operands;
        let op = CompareOp::from_word(ops[1].text)
            .filter(|_| !ops[1].quoted)
            .ok_or_else(|| TranslateError::Syntax {
                line: line.number,
                message: format!(
                    "unknown comparison `{}`, expected one of is is_not > < contains",
                    ops[1].text
                ),
            })?;
        Ok(Condition {
            left: self.operand(line, &ops[0])?,
            op,
            right: self.operand(line, &ops[2])?,
        })
    }

    fn parse_each(&mut self, line: &Line) -> Result<(), TranslateError> {
        const SHAPE: &str = "each <item> in <list>";
        expect_count(line, 3, SHAPE)?;
        expect_word(line, 1, "in", SHAPE)?;
        let list = self.operand(line, &line.operands[2])?;
        let item = name(line, &line.operands[0])?;
        let binding = self.symbols.bind(&item);
        self.blocks.open(Header::Each { item, binding, list }, line.number);
        Ok(())
    }

    fn parse_define(&mut self, line: &Line) -> Result<(), TranslateError> {
        const SHAPE: &str = "define <name> [with <param>...]";
        let ops = &line.operands;
        if ops.is_empty() || ops.len() == 2 {
            return Err(shape_error(line, SHAPE));
        }
        if ops.len() > 2 {
            expect_word(line, 1, "with", SHAPE)?;
        }

        let function = name(line, &ops[0])?;
        let params = ops
            .iter()
            .skip(2)
            .map(|token| name(line, token))
            .collect::<Result<Vec<_>, _>>()?;

        // The function is visible to its own body for recursion
        self.declare(line, &function)?;
        self.symbols.push_scope();
        for param in &params {
            self.declare(line, param)?;
        }

        debug!(
            "line {}: function `{}` opens scope depth {}",
            line.number,
            function,
            self.symbols.depth()
        );
        self.blocks.open(Header::Define { name: function, params }, line.number);
        Ok(())
    }

    fn parse_end(&mut self, line: &Line) -> Result<(), TranslateError> {
        expect_count(line, 0, "end")?;
        let closed = self.blocks.close(line.number)?;
        let locals = if closed.kind() == BlockKind::Define {
            self.symbols.pop_scope()
        } else {
            Vec::new()
        };
        debug!(
            "line {}: closed `{}` from line {}, {} block(s) still open",
            line.number,
            closed.kind(),
            closed.block.origin_line,
            self.blocks.depth()
        );
        self.blocks.push_statement(closed.into_statement(locals));
        Ok(())
    }

    fn parse_list(&mut self, line: &Line) -> Result<Statement, TranslateError> {
        const SHAPE: &str = "list <name> is [<item>, ...]";
        if line.operands.len() < 2 {
            return Err(shape_error(line, SHAPE));
        }
        expect_word(line, 1, "is", SHAPE)?;

        let mut items = Vec::new();
        for token in &line.operands[2..] {
            if token.quoted {
                items.push(self.operand(line, token)?);
                continue;
            }
            for piece in token.text.split(',') {
                let piece = piece.trim_start_matches('[').trim_end_matches(']');
                if !piece.is_empty() {
                    items.push(self.value(line.number, piece, false)?);
                }
            }
        }

        let target = name(line, &line.operands[0])?;
        Ok(self.bind(target, Value::List(items)))
    }

    fn parse_push(&self, line: &Line) -> Result<Statement, TranslateError> {
        const SHAPE: &str = "push <value> to <list>";
        expect_count(line, 3, SHAPE)?;
        expect_word(line, 1, "to", SHAPE)?;
        Ok(Statement::Push {
            value: self.operand(line, &line.operands[0])?,
            list: self.existing(line, &line.operands[2])?,
        })
    }

    fn parse_put(&self, line: &Line) -> Result<Statement, TranslateError> {
        const SHAPE: &str = "put <value> in <map> at <key>";
        expect_count(line, 5, SHAPE)?;
        expect_word(line, 1, "in", SHAPE)?;
        expect_word(line, 3, "at", SHAPE)?;
        let ops = &line.operands;
        Ok(Statement::Put {
            value: self.operand(line, &ops[0])?,
            map: self.existing(line, &ops[2])?,
            key: self.operand(line, &ops[4])?,
        })
    }

    /// `get` and `key`: `<target> from <container> at <index-or-key>`.
    fn parse_lookup(&mut self, line: &Line, shape: &str) -> Result<Statement, TranslateError> {
        expect_count(line, 5, shape)?;
        expect_word(line, 1, "from", shape)?;
        expect_word(line, 3, "at", shape)?;
        let ops = &line.operands;
        let container = Expr::Var(self.existing(line, &ops[2])?);
        let at = self.operand(line, &ops[4])?;
        let value = if line.keyword.text == "get" {
            Value::Index { list: container, index: at }
        } else {
            Value::Key { map: container, key: at }
        };
        let target = name(line, &ops[0])?;
        Ok(self.bind(target, value))
    }

    fn parse_run(&self, line: &Line) -> Result<Statement, TranslateError> {
        const SHAPE: &str = "run <name> [with <arg>...]";
        let ops = &line.operands;
        if ops.is_empty() || ops.len() == 2 {
            return Err(shape_error(line, SHAPE));
        }
        if ops.len() > 2 {
            expect_word(line, 1, "with", SHAPE)?;
        }
        let args = ops
            .iter()
            .skip(2)
            .map(|token| self.operand(line, token))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Statement::Run {
            name: self.existing(line, &ops[0])?,
            args,
        })
    }

    fn parse_ask(&mut self, line: &Line) -> Result<Statement, TranslateError> {
        const SHAPE: &str = "ask <number|text> <name> <prompt>";
        expect_count(line, 3, SHAPE)?;
        let ops = &line.operands;
        let kind = match ops[0].text {
            "number" if !ops[0].quoted => AskKind::Number,
            "text" if !ops[0].quoted => AskKind::Text,
            _ => return Err(shape_error(line, SHAPE)),
        };
        let prompt = self.operand(line, &ops[2])?;
        let target = name(line, &ops[1])?;
        Ok(self.bind(target, Value::Ask { kind, prompt }))
    }

    fn parse_write(&self, line: &Line) -> Result<Statement, TranslateError> {
        const SHAPE: &str = "write <value> to <path>";
        expect_count(line, 3, SHAPE)?;
        expect_word(line, 1, "to", SHAPE)?;
        Ok(Statement::Write {
            value: self.operand(line, &line.operands[0])?,
            path: self.operand(line, &line.operands[2])?,
        })
    }

    /// `read`, `exists`, `fetch`, `json`: `<source> into <name>`.
    fn parse_into(&mut self, line: &Line) -> Result<Statement, TranslateError> {
        let keyword = line.keyword.text;
        let shape = format!("{} <value> into <name>", keyword);
        expect_count(line, 3, &shape)?;
        expect_word(line, 1, "into", &shape)?;
        let source = self.operand(line, &line.operands[0])?;
        let value = match keyword {
            "read" => Value::ReadFile(source),
            "exists" => Value::FileExists(source),
            "fetch" => Value::Fetch(source),
            _ => Value::ParseJson(source),
        };
        let target = name(line, &line.operands[2])?;
        Ok(self.bind(target, value))
    }

    fn parse_random(&mut self, line: &Line) -> Result<Statement, TranslateError> {
        const SHAPE: &str = "random <target> between <min> <max>";
        expect_count(line, 4, SHAPE)?;
        expect_word(line, 1, "between", SHAPE)?;
        let ops = &line.operands;
        let value = Value::Random {
            min: self.operand(line, &ops[2])?,
            max: self.operand(line, &ops[3])?,
        };
        let target = name(line, &ops[0])?;
        Ok(self.bind(target, value))
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

fn shape_error(line: &Line, shape: &str) -> TranslateError {
    TranslateError::Syntax {
        line: line.number,
        message: format!("expected `{}`", shape),
    }
}

fn out_of_range(number: usize, text: &str) -> TranslateError {
    TranslateError::Syntax {
        line: number,
        message: format!("number `{}` is out of range", text),
    }
}

fn expect_count(line: &Line, count: usize, shape: &str) -> Result<(), TranslateError> {
    if line.operands.len() == count {
        Ok(())
    } else {
        Err(shape_error(line, shape))
    }
}

fn expect_word(line: &Line, index: usize, word: &str, shape: &str) -> Result<(), TranslateError> {
    match line.operands.get(index) {
        Some(token) if token.is(word) => Ok(()),
        _ => Err(shape_error(line, shape)),
    }
}

/// A token in name position: assignment targets, parameters, functions.
fn name(line: &Line, token: &Token) -> Result<String, TranslateError> {
    if !token.quoted && is_identifier(token.text) {
        Ok(token.text.to_string())
    } else {
        Err(TranslateError::Syntax {
            line: line.number,
            message: format!("`{}` is not a valid name", token.text),
        })
    }
}

pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_number(text: &str) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let mut parts = unsigned.splitn(2, '.');
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    match (parts.next(), parts.next()) {
        (Some(whole), None) => all_digits(whole),
        (Some(whole), Some(fraction)) => all_digits(whole) && all_digits(fraction),
        _ => false,
    }
}
