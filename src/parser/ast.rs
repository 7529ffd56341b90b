pub use crate::analyzer::Binding;

/// A single operand in value position.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    /// Quoted literal, quotes included, passed through as written.
    Str(String),
    Bool(bool),
    Var(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl ArithOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(ArithOp::Add),
            "-" => Some(ArithOp::Subtract),
            "*" => Some(ArithOp::Multiply),
            "/" => Some(ArithOp::Divide),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Is,
    IsNot,
    Greater,
    Less,
    Contains,
}

impl CompareOp {
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "is" => Some(CompareOp::Is),
            "is_not" => Some(CompareOp::IsNot),
            ">" => Some(CompareOp::Greater),
            "<" => Some(CompareOp::Less),
            "contains" => Some(CompareOp::Contains),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub left: Expr,
    pub op: CompareOp,
    pub right: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskKind {
    Number,
    Text,
}

/// Right-hand side of a binding statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Expr(Expr),
    // Both operands are coerced to numbers first
    Arith {
        left: Expr,
        op: ArithOp,
        right: Expr,
    },
    List(Vec<Expr>),
    EmptyMap,
    Index {
        list: Expr,
        index: Expr,
    },
    Key {
        map: Expr,
        key: Expr,
    },
    Ask {
        kind: AskKind,
        prompt: Expr,
    },
    ReadFile(Expr),
    FileExists(Expr),
    Fetch(Expr),
    ParseJson(Expr),
    Random {
        min: Expr,
        max: Expr,
    },
}

/// One `if` or `elif` arm.
#[derive(Debug, Clone, PartialEq)]
pub struct Arm {
    pub condition: Condition,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Groups are printed space separated; the parts of a group are glued.
    Say(Vec<Vec<Expr>>),
    Wait(Expr),
    Clear,
    Exit,
    System(Expr),

    Bind {
        target: String,
        binding: Binding,
        value: Value,
    },

    // inc/dec/add/subtract/multiply/divide on an existing name
    Update {
        target: String,
        op: ArithOp,
        operand: Expr,
    },

    If {
        arms: Vec<Arm>,
        otherwise: Option<Vec<Statement>>,
    },

    While {
        condition: Condition,
        body: Vec<Statement>,
    },

    Repeat {
        count: Expr,
        // Unique per translation, names the hidden loop counter
        counter: usize,
        body: Vec<Statement>,
    },

    Each {
        item: String,
        binding: Binding,
        list: Expr,
        body: Vec<Statement>,
    },

    Push {
        value: Expr,
        list: String,
    },

    Put {
        value: Expr,
        map: String,
        key: Expr,
    },

    Define {
        name: String,
        params: Vec<String>,
        // Names first bound inside the body, excluding params
        locals: Vec<String>,
        body: Vec<Statement>,
    },

    Run {
        name: String,
        args: Vec<Expr>,
    },

    Write {
        value: Expr,
        path: Expr,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    /// Names declared in the global scope, in first-declaration order.
    pub globals: Vec<String>,
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(globals: Vec<String>, statements: Vec<Statement>) -> Self {
        Program { globals, statements }
    }
}
