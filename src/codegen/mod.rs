use log::debug;

use crate::parser::ast::*;

/// Runtime support functions shared by every generated Go program.
const GO_RUNTIME: &str = include_str!("runtime.go");

const GO_IMPORTS: &[&str] = &[
    "bufio",
    "encoding/json",
    "fmt",
    "io",
    "math/rand",
    "net/http",
    "os",
    "os/exec",
    "runtime",
    "strconv",
    "strings",
    "time",
];

/// A host language the statement model can be printed as.
pub trait Target {
    /// Extension of the emitted source file, without the dot.
    fn extension(&self) -> &'static str;

    fn generate(&mut self, program: &Program) -> String;
}

/// Prints a [`Program`] as a single self-contained Go `main` package.
///
/// Every DSL value is a Go `any`. Names are prefixed with `v_` and each
/// frame's declarations are hoisted to the top of `main` or of the function
/// literal, so Go's block scoping never hides a binding.
pub struct GoTarget {
    output: String,
    indent: usize,
}

impl GoTarget {
    pub fn new() -> Self {
        GoTarget {
            output: String::new(),
            indent: 0,
        }
    }

    fn emit_line(&mut self, code: &str) {
        for _ in 0..self.indent {
            self.output.push('\t');
        }
        self.output.push_str(code);
        self.output.push('\n');
    }

    fn emit_block<F>(&mut self, open: &str, body: F)
    where
        F: FnOnce(&mut Self),
    {
        self.emit_line(open);
        self.indent += 1;
        body(self);
        self.indent -= 1;
        self.emit_line("}");
    }

    fn emit_hoisted(&mut self, names: &[String]) {
        for name in names {
            self.emit_line(&format!("var {} any", ident(name)));
            self.emit_line(&format!("_ = {}", ident(name)));
        }
    }

    fn generate_body(&mut self, statements: &[Statement]) {
        for statement in statements {
            self.generate_statement(statement);
        }
    }

    fn generate_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Say(groups) => {
                let parts: Vec<String> = groups.iter().map(|g| say_group(g)).collect();
                self.emit_line(&format!("fmt.Println({})", parts.join(", ")));
            }
            Statement::Wait(seconds) => self.emit_line(&format!("sleepSeconds({})", expr(seconds))),
            Statement::Clear => self.emit_line("clearScreen()"),
            Statement::Exit => self.emit_line("os.Exit(0)"),
            Statement::System(command) => self.emit_line(&format!("runShell({})", expr(command))),

            // Declarations are hoisted, so both bindings print as assignment
            Statement::Bind { target, value, .. } => {
                self.emit_line(&format!("{} = {}", ident(target), value_expr(value)));
            }

            Statement::Update { target, op, operand } => {
                let name = ident(target);
                self.emit_line(&format!("{} = {}", name, arith(&Expr::Var(target.clone()), *op, operand)));
            }

            Statement::If { arms, otherwise } => {
                for (i, arm) in arms.iter().enumerate() {
                    let cond = condition(&arm.condition);
                    let head = if i == 0 {
                        format!("if {} {{", cond)
                    } else {
                        format!("}} else if {} {{", cond)
                    };
                    self.emit_line(&head);
                    self.indent += 1;
                    self.generate_body(&arm.body);
                    self.indent -= 1;
                }
                // A closed `if` always has its first arm
                if let Some(body) = otherwise {
                    self.emit_line("} else {");
                    self.indent += 1;
                    self.generate_body(body);
                    self.indent -= 1;
                }
                self.emit_line("}");
            }

            Statement::While { condition: cond, body } => {
                self.emit_block(&format!("for {} {{", condition(cond)), |g| g.generate_body(body));
            }

            Statement::Repeat { count, counter, body } => {
                let head = format!(
                    "for _i{c}, _n{c} := 0, toInt({}); _i{c} < _n{c}; _i{c}++ {{",
                    expr(count),
                    c = counter
                );
                self.emit_block(&head, |g| g.generate_body(body));
            }

            Statement::Each { item, list, body, .. } => {
                let head = format!("for _, {} = range asList({}, \"each\") {{", ident(item), expr(list));
                self.emit_block(&head, |g| g.generate_body(body));
            }

            Statement::Push { value, list } => {
                let name = ident(list);
                self.emit_line(&format!("{} = push({}, {})", name, name, expr(value)));
            }

            Statement::Put { value, map, key } => {
                self.emit_line(&format!("mapPut({}, {}, {})", ident(map), expr(key), expr(value)));
            }

            Statement::Define { name, params, locals, body } => {
                debug!("emitting function `{}` ({} params, {} locals)", name, params.len(), locals.len());
                self.emit_block(&format!("{} = func(args ...any) {{", ident(name)), |g| {
                    for (i, param) in params.iter().enumerate() {
                        g.emit_line(&format!("var {} any = arg(args, {})", ident(param), i));
                        g.emit_line(&format!("_ = {}", ident(param)));
                    }
                    g.emit_hoisted(locals);
                    g.generate_body(body);
                });
            }

            Statement::Run { name, args } => {
                let mut call = vec![ident(name)];
                call.extend(args.iter().map(expr));
                self.emit_line(&format!("call({})", call.join(", ")));
            }

            Statement::Write { value, path } => {
                self.emit_line(&format!("writeFile({}, {})", expr(path), expr(value)));
            }
        }
    }
}

impl Default for GoTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl Target for GoTarget {
    fn extension(&self) -> &'static str {
        "go"
    }

    fn generate(&mut self, program: &Program) -> String {
        self.output.clear();
        self.indent = 0;

        let mut result = String::new();
        result.push_str("// Code generated by simplec. DO NOT EDIT.\n\n");
        result.push_str("package main\n\n");
        result.push_str("import (\n");
        for import in GO_IMPORTS {
            result.push_str(&format!("\t\"{}\"\n", import));
        }
        result.push_str(")\n\n");
        result.push_str(GO_RUNTIME);
        result.push('\n');

        self.emit_block("func main() {", |g| {
            g.emit_hoisted(&program.globals);
            g.generate_body(&program.statements);
        });
        result.push_str(&self.output);
        result
    }
}

fn ident(name: &str) -> String {
    format!("v_{}", name)
}

fn expr(e: &Expr) -> String {
    match e {
        Expr::Int(n) => n.to_string(),
        // Debug keeps the fraction so Go reads a float constant
        Expr::Float(f) => format!("{:?}", f),
        Expr::Str(s) => s.clone(),
        Expr::Bool(b) => b.to_string(),
        Expr::Var(name) => ident(name),
    }
}

fn exprs(items: &[Expr]) -> String {
    items.iter().map(expr).collect::<Vec<_>>().join(", ")
}

fn say_group(group: &[Expr]) -> String {
    match group {
        [single] => expr(single),
        parts => format!("cat({})", exprs(parts)),
    }
}

fn arith(left: &Expr, op: ArithOp, right: &Expr) -> String {
    let symbol = match op {
        ArithOp::Add => "+",
        ArithOp::Subtract => "-",
        ArithOp::Multiply => "*",
        ArithOp::Divide => "/",
        ArithOp::Modulo => "%",
    };
    format!("toInt({}) {} toInt({})", expr(left), symbol, expr(right))
}

fn condition(c: &Condition) -> String {
    let (left, right) = (expr(&c.left), expr(&c.right));
    match c.op {
        CompareOp::Is => format!("equal({}, {})", left, right),
        CompareOp::IsNot => format!("!equal({}, {})", left, right),
        CompareOp::Greater => format!("toInt({}) > toInt({})", left, right),
        CompareOp::Less => format!("toInt({}) < toInt({})", left, right),
        CompareOp::Contains => format!("contains({}, {})", left, right),
    }
}

fn value_expr(value: &Value) -> String {
    match value {
        Value::Expr(e) => expr(e),
        Value::Arith { left, op, right } => arith(left, *op, right),
        Value::List(items) => format!("[]any{{{}}}", exprs(items)),
        Value::EmptyMap => "map[string]any{}".to_string(),
        Value::Index { list, index } => format!("listAt({}, {})", expr(list), expr(index)),
        Value::Key { map, key } => format!("mapGet({}, {})", expr(map), expr(key)),
        Value::Ask { kind: AskKind::Number, prompt } => format!("askNumber({})", expr(prompt)),
        Value::Ask { kind: AskKind::Text, prompt } => format!("askText({})", expr(prompt)),
        Value::ReadFile(path) => format!("readFile({})", expr(path)),
        Value::FileExists(path) => format!("fileExists({})", expr(path)),
        Value::Fetch(url) => format!("fetchUrl({})", expr(url)),
        Value::ParseJson(text) => format!("parseJson({})", expr(text)),
        Value::Random { min, max } => format!("randomBetween({}, {})", expr(min), expr(max)),
    }
}
