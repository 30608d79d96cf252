//! Module for generating random JavaScript programs for property-based testing.
//!
//! `JsProgram` is a small statement/expression tree covering the constructs scope
//! resolution cares about: `var`/`let`/`const`, object destructuring, function and
//! class declarations with fields, nested blocks, `for` loops with lexical heads,
//! `try`/`catch`, arrows, plain and optional member access, and object literals. `to_code` renders it as source that tree-sitter-javascript parses
//! without errors.
//!
//! Names are mostly drawn from a small pool so that declarations, shadowing and
//! references collide often. Generation depth is bounded to keep programs small.

use quickcheck::{Arbitrary, Gen};
use std::fmt;

/// Declaration keyword of a variable statement or loop head.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclKind {
    Var,
    Let,
    Const,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Lt,
    StrictEq,
    And,
    Or,
}

#[derive(Clone, Debug)]
pub enum JsExpr {
    Ident(String),
    Number(u16),
    Str(String),
    Binary { op: BinOp, left: Box<JsExpr>, right: Box<JsExpr> },
    Assign { target: String, value: Box<JsExpr> },
    /// `optional` renders `?.` instead of `.`.
    Member { object: Box<JsExpr>, property: String, optional: bool },
    Call { callee: Box<JsExpr>, args: Vec<JsExpr> },
    /// Keys are identifiers; `None` values render as shorthand `{ key }`.
    Object(Vec<(String, Option<JsExpr>)>),
    Array(Vec<JsExpr>),
    Arrow { params: Vec<String>, body: Box<JsExpr> },
}

#[derive(Clone, Debug)]
pub enum JsStmt {
    VarDecl { kind: DeclKind, name: String, init: Option<JsExpr> },
    /// `kind {key: name, other} = init;` where a `None` name is shorthand.
    Destructure { kind: DeclKind, props: Vec<(String, Option<String>)>, init: JsExpr },
    Function { name: String, params: Vec<String>, body: Vec<JsStmt>, ret: Option<JsExpr> },
    Class { name: String, fields: Vec<JsField>, methods: Vec<JsMethod> },
    Block(Vec<JsStmt>),
    If { cond: JsExpr, then: Vec<JsStmt>, otherwise: Option<Vec<JsStmt>> },
    For { kind: DeclKind, counter: String, limit: JsExpr, body: Vec<JsStmt> },
    Try { body: Vec<JsStmt>, param: Option<String>, handler: Vec<JsStmt> },
    Expr(JsExpr),
}

/// Class field, `name = value;` or bare `name;`.
#[derive(Clone, Debug)]
pub struct JsField {
    pub name: String,
    pub value: Option<JsExpr>,
}

#[derive(Clone, Debug)]
pub struct JsMethod {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<JsStmt>,
}

/// A whole script.
#[derive(Clone, Debug)]
pub struct JsProgram {
    pub body: Vec<JsStmt>,
}

/// Maximum recursion depth for generation.
const MAX_DEPTH: usize = 4;

/// Names that collide often.
const NAME_POOL: &[&str] = &["a", "b", "c", "x", "y", "foo", "bar", "item", "count", "value"];

/// Reserved and contextual words avoided in generated names.
const RESERVED_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "from", "function", "get",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null", "of", "package",
    "private", "protected", "public", "return", "set", "static", "super", "switch", "this", "throw", "true",
    "try", "typeof", "var", "void", "while", "with", "yield",
];

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinOp::Add => write!(f, "+"),
            BinOp::Sub => write!(f, "-"),
            BinOp::Mul => write!(f, "*"),
            BinOp::Lt => write!(f, "<"),
            BinOp::StrictEq => write!(f, "==="),
            BinOp::And => write!(f, "&&"),
            BinOp::Or => write!(f, "||"),
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclKind::Var => write!(f, "var"),
            DeclKind::Let => write!(f, "let"),
            DeclKind::Const => write!(f, "const"),
        }
    }
}

/// Generates a random number in the range [min, max] inclusive.
fn gen_range(g: &mut Gen, min: u32, max: u32) -> u32 {
    min + (u32::arbitrary(g) % (max - min + 1))
}

/// Generates a variable name that is not a reserved word, usually from the pool.
fn gen_var_name(g: &mut Gen) -> String {
    if gen_range(g, 0, 9) < 8 {
        let index = gen_range(g, 0, NAME_POOL.len() as u32 - 1) as usize;
        return NAME_POOL[index].to_string();
    }
    let starters: Vec<char> = "abcdefghijklmnopqrstuvwxyz_$".chars().collect();
    let continuers: Vec<char> = "abcdefghijklmnopqrstuvwxyz0123456789_".chars().collect();
    loop {
        let len = gen_range(g, 1, 8);
        let mut name = String::new();
        name.push(*g.choose(&starters).unwrap());
        for _ in 1..len {
            name.push(*g.choose(&continuers).unwrap());
        }
        if !RESERVED_KEYWORDS.iter().any(|&kw| kw == name.as_str()) {
            return name;
        }
    }
}

/// Alphanumeric string literal content.
fn gen_string_content(g: &mut Gen) -> String {
    let chars: Vec<char> = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789".chars().collect();
    let len = gen_range(g, 0, 6);
    (0..len).map(|_| *g.choose(&chars).unwrap()).collect()
}

fn gen_names(g: &mut Gen, max: u32) -> Vec<String> {
    (0..gen_range(g, 0, max)).map(|_| gen_var_name(g)).collect()
}

fn gen_decl_kind(g: &mut Gen) -> DeclKind {
    *g.choose(&[DeclKind::Var, DeclKind::Let, DeclKind::Const]).unwrap()
}

fn gen_leaf_expr(g: &mut Gen) -> JsExpr {
    match gen_range(g, 0, 5) {
        0 => JsExpr::Number(u16::arbitrary(g)),
        1 => JsExpr::Str(gen_string_content(g)),
        _ => JsExpr::Ident(gen_var_name(g)),
    }
}

fn gen_expr(g: &mut Gen, depth: usize) -> JsExpr {
    if depth == 0 {
        return gen_leaf_expr(g);
    }
    let choices = ["leaf", "leaf", "binary", "assign", "member", "call", "object", "array", "arrow"];
    match *g.choose(&choices).unwrap() {
        "leaf" => gen_leaf_expr(g),
        "binary" => JsExpr::Binary {
            op: BinOp::arbitrary(g),
            left: Box::new(gen_expr(g, depth - 1)),
            right: Box::new(gen_expr(g, depth - 1)),
        },
        "assign" => JsExpr::Assign { target: gen_var_name(g), value: Box::new(gen_expr(g, depth - 1)) },
        "member" => JsExpr::Member {
            object: Box::new(gen_expr(g, depth - 1)),
            property: gen_var_name(g),
            optional: gen_range(g, 0, 3) == 0,
        },
        "call" => JsExpr::Call {
            callee: Box::new(gen_expr(g, depth - 1)),
            args: (0..gen_range(g, 0, 3)).map(|_| gen_expr(g, depth - 1)).collect(),
        },
        "object" => JsExpr::Object(
            (0..gen_range(g, 0, 3))
                .map(|_| {
                    let value = if bool::arbitrary(g) { Some(gen_expr(g, depth - 1)) } else { None };
                    (gen_var_name(g), value)
                })
                .collect(),
        ),
        "array" => JsExpr::Array((0..gen_range(g, 0, 3)).map(|_| gen_expr(g, depth - 1)).collect()),
        "arrow" => JsExpr::Arrow { params: gen_names(g, 2), body: Box::new(gen_expr(g, depth - 1)) },
        _ => unreachable!(),
    }
}

fn gen_block(g: &mut Gen, depth: usize) -> Vec<JsStmt> {
    (0..gen_range(g, 0, 3)).map(|_| gen_stmt(g, depth)).collect()
}

fn gen_stmt(g: &mut Gen, depth: usize) -> JsStmt {
    if depth == 0 {
        return match gen_range(g, 0, 1) {
            0 => gen_var_decl(g, 0),
            _ => JsStmt::Expr(gen_expr(g, 0)),
        };
    }
    let choices = ["var", "var", "destructure", "expr", "expr", "function", "class", "block", "if", "for", "try"];
    match *g.choose(&choices).unwrap() {
        "var" => gen_var_decl(g, depth - 1),
        "destructure" => JsStmt::Destructure {
            kind: gen_decl_kind(g),
            props: (0..gen_range(g, 1, 3))
                .map(|_| (gen_var_name(g), if bool::arbitrary(g) { Some(gen_var_name(g)) } else { None }))
                .collect(),
            init: gen_expr(g, depth - 1),
        },
        "expr" => JsStmt::Expr(gen_expr(g, depth - 1)),
        "function" => JsStmt::Function {
            name: gen_var_name(g),
            params: gen_names(g, 3),
            body: gen_block(g, depth - 1),
            ret: if bool::arbitrary(g) { Some(gen_expr(g, depth - 1)) } else { None },
        },
        "class" => JsStmt::Class {
            name: gen_var_name(g),
            fields: (0..gen_range(g, 0, 2))
                .map(|_| JsField {
                    name: gen_var_name(g),
                    value: if bool::arbitrary(g) { Some(gen_expr(g, depth - 1)) } else { None },
                })
                .collect(),
            methods: (0..gen_range(g, 0, 2))
                .map(|_| JsMethod { name: gen_var_name(g), params: gen_names(g, 2), body: gen_block(g, depth - 1) })
                .collect(),
        },
        "block" => JsStmt::Block(gen_block(g, depth - 1)),
        "if" => JsStmt::If {
            cond: gen_expr(g, depth - 1),
            then: gen_block(g, depth - 1),
            otherwise: if bool::arbitrary(g) { Some(gen_block(g, depth - 1)) } else { None },
        },
        "for" => JsStmt::For {
            kind: if bool::arbitrary(g) { DeclKind::Let } else { DeclKind::Var },
            counter: gen_var_name(g),
            limit: gen_expr(g, depth - 1),
            body: gen_block(g, depth - 1),
        },
        "try" => JsStmt::Try {
            body: gen_block(g, depth - 1),
            param: if bool::arbitrary(g) { Some(gen_var_name(g)) } else { None },
            handler: gen_block(g, depth - 1),
        },
        _ => unreachable!(),
    }
}

fn gen_var_decl(g: &mut Gen, depth: usize) -> JsStmt {
    let kind = gen_decl_kind(g);
    let init = if kind == DeclKind::Const || bool::arbitrary(g) { Some(gen_expr(g, depth)) } else { None };
    JsStmt::VarDecl { kind, name: gen_var_name(g), init }
}

impl Arbitrary for BinOp {
    fn arbitrary(g: &mut Gen) -> Self {
        const CHOICES: &[BinOp] =
            &[BinOp::Add, BinOp::Sub, BinOp::Mul, BinOp::Lt, BinOp::StrictEq, BinOp::And, BinOp::Or];
        *g.choose(CHOICES).unwrap()
    }
}

impl Arbitrary for JsExpr {
    fn arbitrary(g: &mut Gen) -> Self {
        gen_expr(g, g.size().min(MAX_DEPTH))
    }
}

impl Arbitrary for JsStmt {
    fn arbitrary(g: &mut Gen) -> Self {
        gen_stmt(g, g.size().min(MAX_DEPTH))
    }
}

impl Arbitrary for JsProgram {
    fn arbitrary(g: &mut Gen) -> Self {
        let depth = g.size().min(MAX_DEPTH);
        JsProgram { body: (0..gen_range(g, 1, 6)).map(|_| gen_stmt(g, depth)).collect() }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.body.shrink().filter(|body| !body.is_empty()).map(|body| JsProgram { body }))
    }
}

fn params_code(params: &[String]) -> String {
    params.join(", ")
}

fn block_code(stmts: &[JsStmt], indent: usize) -> String {
    block_code_with(stmts, indent, None)
}

/// Braced block, optionally ending with an extra pre-rendered line.
fn block_code_with(stmts: &[JsStmt], indent: usize, tail: Option<String>) -> String {
    if stmts.is_empty() && tail.is_none() {
        return "{}".to_string();
    }
    let pad = "  ".repeat(indent + 1);
    let mut code = String::from("{\n");
    for line in stmts.iter().map(|stmt| stmt.to_code(indent + 1)).chain(tail) {
        code.push_str(&pad);
        code.push_str(&line);
        code.push('\n');
    }
    code.push_str(&"  ".repeat(indent));
    code.push('}');
    code
}

impl JsExpr {
    pub fn to_code(&self) -> String {
        match self {
            JsExpr::Ident(name) => name.clone(),
            JsExpr::Number(n) => n.to_string(),
            JsExpr::Str(s) => format!("\"{}\"", s),
            JsExpr::Binary { op, left, right } => format!("({} {} {})", left.to_code(), op, right.to_code()),
            JsExpr::Assign { target, value } => format!("({} = {})", target, value.to_code()),
            JsExpr::Member { object, property, optional } => {
                let dot = if *optional { "?." } else { "." };
                format!("{}{}{}", object.to_callee_code(), dot, property)
            }
            JsExpr::Call { callee, args } => {
                let args = args.iter().map(JsExpr::to_code).collect::<Vec<_>>().join(", ");
                format!("{}({})", callee.to_callee_code(), args)
            }
            JsExpr::Object(props) => {
                let props = props
                    .iter()
                    .map(|(key, value)| match value {
                        Some(value) => format!("{}: {}", key, value.to_code()),
                        None => key.clone(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{}}}", props)
            }
            JsExpr::Array(items) => {
                format!("[{}]", items.iter().map(JsExpr::to_code).collect::<Vec<_>>().join(", "))
            }
            JsExpr::Arrow { params, body } => format!("(({}) => ({}))", params_code(params), body.to_code()),
        }
    }

    /// Operand position of `.` and `(...)`: anything but a name, member or call is
    /// parenthesized.
    fn to_callee_code(&self) -> String {
        match self {
            JsExpr::Ident(_) | JsExpr::Member { .. } | JsExpr::Call { .. } => self.to_code(),
            _ => format!("({})", self.to_code()),
        }
    }
}

impl JsStmt {
    pub fn to_code(&self, indent: usize) -> String {
        match self {
            JsStmt::VarDecl { kind, name, init } => match init {
                Some(init) => format!("{} {} = {};", kind, name, init.to_code()),
                None => format!("{} {};", kind, name),
            },
            JsStmt::Destructure { kind, props, init } => {
                let props = props
                    .iter()
                    .map(|(key, name)| match name {
                        Some(name) => format!("{}: {}", key, name),
                        None => key.clone(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{} {{{}}} = {};", kind, props, init.to_code())
            }
            JsStmt::Function { name, params, body, ret } => {
                let ret = ret.as_ref().map(|ret| format!("return {};", ret.to_code()));
                format!("function {}({}) {}", name, params_code(params), block_code_with(body, indent, ret))
            }
            JsStmt::Class { name, fields, methods } => {
                if fields.is_empty() && methods.is_empty() {
                    return format!("class {} {{}}", name);
                }
                let pad = "  ".repeat(indent + 1);
                let mut code = format!("class {} {{\n", name);
                for field in fields {
                    match &field.value {
                        Some(value) => code.push_str(&format!("{}{} = {};\n", pad, field.name, value.to_code())),
                        None => code.push_str(&format!("{}{};\n", pad, field.name)),
                    }
                }
                for method in methods {
                    code.push_str(&format!(
                        "{}{}({}) {}\n",
                        pad,
                        method.name,
                        params_code(&method.params),
                        block_code(&method.body, indent + 1)
                    ));
                }
                code.push_str(&"  ".repeat(indent));
                code.push('}');
                code
            }
            JsStmt::Block(stmts) => block_code(stmts, indent),
            JsStmt::If { cond, then, otherwise } => {
                let mut code = format!("if ({}) {}", cond.to_code(), block_code(then, indent));
                if let Some(otherwise) = otherwise {
                    code.push_str(&format!(" else {}", block_code(otherwise, indent)));
                }
                code
            }
            JsStmt::For { kind, counter, limit, body } => format!(
                "for ({} {} = 0; {} < {}; {}++) {}",
                kind,
                counter,
                counter,
                limit.to_code(),
                counter,
                block_code(body, indent)
            ),
            JsStmt::Try { body, param, handler } => {
                let catch = match param {
                    Some(param) => format!("catch ({})", param),
                    None => "catch".to_string(),
                };
                format!("try {} {} {}", block_code(body, indent), catch, block_code(handler, indent))
            }
            JsStmt::Expr(expr) => {
                let code = expr.to_code();
                if code.starts_with('{') { format!("({});", code) } else { format!("{};", code) }
            }
        }
    }
}

impl JsProgram {
    pub fn to_code(&self) -> String {
        self.body.iter().map(|stmt| stmt.to_code(0)).collect::<Vec<_>>().join("\n") + "\n"
    }
}
