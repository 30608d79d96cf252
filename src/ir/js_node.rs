//! Typed JavaScript syntax tree
//!
//! This module defines the abstract syntax tree produced by
//! [`crate::parsers::javascript::parse_program`] and consumed by the indexer and the
//! scope resolver.
//!
//! # Positions
//!
//! Every node carries a [`Span`] of **1-based, half-open byte offsets** into the
//! source text. Offset `0` means "no position": nodes synthesized during error
//! recovery (missing tokens) carry `Span::default()` and are skipped by the indexer.
//!
//! # Generic traversal
//!
//! Consumers that do not care about node shapes (the indexer, the S-expression
//! printer) walk the tree through the [`AstNode`] trait, whose `children()` method
//! lists child nodes in source order. The typed enums ([`Stmt`], [`Expr`],
//! [`Pattern`], ...) are not nodes themselves; `as_node()` yields the node they wrap.

use std::fmt;

/// Half-open byte range, 1-based. `(0, 0)` is the degenerate "no position" span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// True for the synthesized "no position" span.
    pub fn is_degenerate(&self) -> bool {
        self.start == 0 && self.end == 0
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Half-open containment test for a 1-based offset.
    pub fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Smallest span covering both `self` and `other`, ignoring degenerate spans.
    pub fn cover(self, other: Span) -> Span {
        if self.is_degenerate() {
            return other;
        }
        if other.is_degenerate() {
            return self;
        }
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// Kind tag of an AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Program,
    ExpressionStatement,
    VariableDeclaration,
    VariableDeclarator,
    FunctionDeclaration,
    FunctionExpression,
    ArrowFunction,
    ClassDeclaration,
    ClassExpression,
    MethodDefinition,
    FieldDefinition,
    StaticBlock,
    BlockStatement,
    IfStatement,
    ForStatement,
    ForInStatement,
    ForOfStatement,
    WhileStatement,
    DoWhileStatement,
    TryStatement,
    CatchClause,
    ReturnStatement,
    ThrowStatement,
    SwitchStatement,
    SwitchCase,
    LabeledStatement,
    BreakStatement,
    ContinueStatement,
    EmptyStatement,
    DebuggerStatement,
    WithStatement,
    ImportDeclaration,
    ExportDeclaration,
    Identifier,
    Label,
    PrivateName,
    NumberLiteral,
    StringLiteral,
    BooleanLiteral,
    NullLiteral,
    RegExpLiteral,
    TemplateLiteral,
    TaggedTemplate,
    ThisExpression,
    SuperExpression,
    MetaProperty,
    ArrayLiteral,
    ObjectLiteral,
    Property,
    SpreadElement,
    UnaryExpression,
    UpdateExpression,
    AwaitExpression,
    YieldExpression,
    BinaryExpression,
    AssignExpression,
    ConditionalExpression,
    CallExpression,
    NewExpression,
    MemberExpression,
    IndexExpression,
    SequenceExpression,
    ParenthesizedExpression,
    ObjectPattern,
    ArrayPattern,
    PropertyPattern,
    RestElement,
    AssignPattern,
    BadStatement,
    BadExpression,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Program => "Program",
            NodeKind::ExpressionStatement => "ExpressionStatement",
            NodeKind::VariableDeclaration => "VariableDeclaration",
            NodeKind::VariableDeclarator => "VariableDeclarator",
            NodeKind::FunctionDeclaration => "FunctionDeclaration",
            NodeKind::FunctionExpression => "FunctionExpression",
            NodeKind::ArrowFunction => "ArrowFunction",
            NodeKind::ClassDeclaration => "ClassDeclaration",
            NodeKind::ClassExpression => "ClassExpression",
            NodeKind::MethodDefinition => "MethodDefinition",
            NodeKind::FieldDefinition => "FieldDefinition",
            NodeKind::StaticBlock => "StaticBlock",
            NodeKind::BlockStatement => "BlockStatement",
            NodeKind::IfStatement => "IfStatement",
            NodeKind::ForStatement => "ForStatement",
            NodeKind::ForInStatement => "ForInStatement",
            NodeKind::ForOfStatement => "ForOfStatement",
            NodeKind::WhileStatement => "WhileStatement",
            NodeKind::DoWhileStatement => "DoWhileStatement",
            NodeKind::TryStatement => "TryStatement",
            NodeKind::CatchClause => "CatchClause",
            NodeKind::ReturnStatement => "ReturnStatement",
            NodeKind::ThrowStatement => "ThrowStatement",
            NodeKind::SwitchStatement => "SwitchStatement",
            NodeKind::SwitchCase => "SwitchCase",
            NodeKind::LabeledStatement => "LabeledStatement",
            NodeKind::BreakStatement => "BreakStatement",
            NodeKind::ContinueStatement => "ContinueStatement",
            NodeKind::EmptyStatement => "EmptyStatement",
            NodeKind::DebuggerStatement => "DebuggerStatement",
            NodeKind::WithStatement => "WithStatement",
            NodeKind::ImportDeclaration => "ImportDeclaration",
            NodeKind::ExportDeclaration => "ExportDeclaration",
            NodeKind::Identifier => "Identifier",
            NodeKind::Label => "Label",
            NodeKind::PrivateName => "PrivateName",
            NodeKind::NumberLiteral => "NumberLiteral",
            NodeKind::StringLiteral => "StringLiteral",
            NodeKind::BooleanLiteral => "BooleanLiteral",
            NodeKind::NullLiteral => "NullLiteral",
            NodeKind::RegExpLiteral => "RegExpLiteral",
            NodeKind::TemplateLiteral => "TemplateLiteral",
            NodeKind::TaggedTemplate => "TaggedTemplate",
            NodeKind::ThisExpression => "ThisExpression",
            NodeKind::SuperExpression => "SuperExpression",
            NodeKind::MetaProperty => "MetaProperty",
            NodeKind::ArrayLiteral => "ArrayLiteral",
            NodeKind::ObjectLiteral => "ObjectLiteral",
            NodeKind::Property => "Property",
            NodeKind::SpreadElement => "SpreadElement",
            NodeKind::UnaryExpression => "UnaryExpression",
            NodeKind::UpdateExpression => "UpdateExpression",
            NodeKind::AwaitExpression => "AwaitExpression",
            NodeKind::YieldExpression => "YieldExpression",
            NodeKind::BinaryExpression => "BinaryExpression",
            NodeKind::AssignExpression => "AssignExpression",
            NodeKind::ConditionalExpression => "ConditionalExpression",
            NodeKind::CallExpression => "CallExpression",
            NodeKind::NewExpression => "NewExpression",
            NodeKind::MemberExpression => "MemberExpression",
            NodeKind::IndexExpression => "IndexExpression",
            NodeKind::SequenceExpression => "SequenceExpression",
            NodeKind::ParenthesizedExpression => "ParenthesizedExpression",
            NodeKind::ObjectPattern => "ObjectPattern",
            NodeKind::ArrayPattern => "ArrayPattern",
            NodeKind::PropertyPattern => "PropertyPattern",
            NodeKind::RestElement => "RestElement",
            NodeKind::AssignPattern => "AssignPattern",
            NodeKind::BadStatement => "BadStatement",
            NodeKind::BadExpression => "BadExpression",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generic view over a syntax-tree node.
///
/// This is the only capability the indexer needs: any tree that can report a kind,
/// a span and its children in source order can be indexed.
pub trait AstNode {
    fn kind(&self) -> NodeKind;

    fn span(&self) -> Span;

    /// Short display rendering (quoted name, literal text, operator token).
    fn label(&self) -> String {
        String::new()
    }

    /// Bare identifier or property-key name, when the node carries one.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Child nodes in source order. Leaves return an empty vector.
    fn children(&self) -> Vec<&dyn AstNode>;
}

const LABEL_MAX_CHARS: usize = 24;

fn quoted(name: &str) -> String {
    format!("\"{}\"", name)
}

fn truncated(raw: &str) -> String {
    if raw.chars().count() <= LABEL_MAX_CHARS {
        raw.to_string()
    } else {
        let head: String = raw.chars().take(LABEL_MAX_CHARS).collect();
        format!("{}...", head)
    }
}

fn push_opt<'a, T: AstNode>(out: &mut Vec<&'a dyn AstNode>, node: &'a Option<T>) {
    if let Some(node) = node {
        out.push(node);
    }
}

// ==============================================================================
// Leaves
// ==============================================================================

/// A name in binding or reference position (also used for property keys).
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub span: Span,
    pub name: String,
}

impl Ident {
    pub fn new(span: Span, name: impl Into<String>) -> Self {
        Self { span, name: name.into() }
    }
}

impl AstNode for Ident {
    fn kind(&self) -> NodeKind {
        NodeKind::Identifier
    }
    fn span(&self) -> Span {
        self.span
    }
    fn label(&self) -> String {
        quoted(&self.name)
    }
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        Vec::new()
    }
}

/// Statement label (`outer:` / `break outer`). Never resolved as a variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub span: Span,
    pub name: String,
}

impl AstNode for Label {
    fn kind(&self) -> NodeKind {
        NodeKind::Label
    }
    fn span(&self) -> Span {
        self.span
    }
    fn label(&self) -> String {
        quoted(&self.name)
    }
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        Vec::new()
    }
}

/// `#field` class member name.
#[derive(Debug, Clone, PartialEq)]
pub struct PrivateName {
    pub span: Span,
    pub name: String,
}

impl AstNode for PrivateName {
    fn kind(&self) -> NodeKind {
        NodeKind::PrivateName
    }
    fn span(&self) -> Span {
        self.span
    }
    fn label(&self) -> String {
        quoted(&self.name)
    }
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        Vec::new()
    }
}

/// Childless node identified only by its kind (`this`, `super`, `;`, `debugger`, `new.target`).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub span: Span,
    pub kind: NodeKind,
}

impl AstNode for Token {
    fn kind(&self) -> NodeKind {
        self.kind
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Number,
    String,
    Bool,
    Null,
    RegExp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub span: Span,
    pub kind: LitKind,
    pub raw: String,
}

impl Literal {
    /// String value without surrounding quotes; the raw text for other literals.
    pub fn value(&self) -> &str {
        if self.kind == LitKind::String && self.raw.len() >= 2 {
            let bytes = self.raw.as_bytes();
            let first = bytes[0];
            if (first == b'"' || first == b'\'') && bytes[bytes.len() - 1] == first {
                return &self.raw[1..self.raw.len() - 1];
            }
        }
        &self.raw
    }
}

impl AstNode for Literal {
    fn kind(&self) -> NodeKind {
        match self.kind {
            LitKind::Number => NodeKind::NumberLiteral,
            LitKind::String => NodeKind::StringLiteral,
            LitKind::Bool => NodeKind::BooleanLiteral,
            LitKind::Null => NodeKind::NullLiteral,
            LitKind::RegExp => NodeKind::RegExpLiteral,
        }
    }
    fn span(&self) -> Span {
        self.span
    }
    fn label(&self) -> String {
        truncated(&self.raw)
    }
    fn name(&self) -> Option<&str> {
        match self.kind {
            LitKind::String | LitKind::Number => Some(self.value()),
            _ => None,
        }
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        Vec::new()
    }
}

// ==============================================================================
// Program and statements
// ==============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub span: Span,
    pub body: Vec<Stmt>,
}

impl AstNode for Program {
    fn kind(&self) -> NodeKind {
        NodeKind::Program
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        self.body.iter().map(Stmt::as_node).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(ExprStmt),
    Var(VarDecl),
    Function(Box<Function>),
    Class(Box<Class>),
    Block(Block),
    If(Box<IfStmt>),
    For(Box<ForStmt>),
    ForIn(Box<ForInStmt>),
    While(Box<WhileStmt>),
    Try(Box<TryStmt>),
    Return(ArgStmt),
    Throw(ArgStmt),
    Switch(Box<SwitchStmt>),
    Labeled(Box<LabeledStmt>),
    Jump(JumpStmt),
    With(Box<WithStmt>),
    Module(ModuleDecl),
    Empty(Token),
    Debugger(Token),
    Bad(BadStmt),
}

impl Stmt {
    pub fn as_node(&self) -> &dyn AstNode {
        match self {
            Stmt::Expr(s) => s,
            Stmt::Var(s) => s,
            Stmt::Function(s) => &**s,
            Stmt::Class(s) => &**s,
            Stmt::Block(s) => s,
            Stmt::If(s) => &**s,
            Stmt::For(s) => &**s,
            Stmt::ForIn(s) => &**s,
            Stmt::While(s) => &**s,
            Stmt::Try(s) => &**s,
            Stmt::Return(s) | Stmt::Throw(s) => s,
            Stmt::Switch(s) => &**s,
            Stmt::Labeled(s) => &**s,
            Stmt::Jump(s) => s,
            Stmt::With(s) => &**s,
            Stmt::Module(s) => s,
            Stmt::Empty(s) | Stmt::Debugger(s) => s,
            Stmt::Bad(s) => s,
        }
    }

    pub fn span(&self) -> Span {
        self.as_node().span()
    }

    /// True for `let`/`const`/`class` declarations, which need a block scope.
    pub fn is_lexical_declaration(&self) -> bool {
        match self {
            Stmt::Var(decl) => decl.kind != DeclKind::Var,
            Stmt::Class(_) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub span: Span,
    pub expr: Expr,
}

impl AstNode for ExprStmt {
    fn kind(&self) -> NodeKind {
        NodeKind::ExpressionStatement
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        vec![self.expr.as_node()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Var,
    Let,
    Const,
}

impl DeclKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Var => "var",
            DeclKind::Let => "let",
            DeclKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub span: Span,
    pub kind: DeclKind,
    pub declarators: Vec<Declarator>,
}

impl AstNode for VarDecl {
    fn kind(&self) -> NodeKind {
        NodeKind::VariableDeclaration
    }
    fn span(&self) -> Span {
        self.span
    }
    fn label(&self) -> String {
        self.kind.as_str().to_string()
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        self.declarators.iter().map(|d| d as &dyn AstNode).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub span: Span,
    pub name: Pattern,
    pub init: Option<Expr>,
}

impl AstNode for Declarator {
    fn kind(&self) -> NodeKind {
        NodeKind::VariableDeclarator
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        let mut out = vec![self.name.as_node()];
        if let Some(init) = &self.init {
            out.push(init.as_node());
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub span: Span,
    pub body: Vec<Stmt>,
}

impl Block {
    pub fn has_lexical_declarations(&self) -> bool {
        self.body.iter().any(Stmt::is_lexical_declaration)
    }
}

impl AstNode for Block {
    fn kind(&self) -> NodeKind {
        NodeKind::BlockStatement
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        self.body.iter().map(Stmt::as_node).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub span: Span,
    pub test: Expr,
    pub consequent: Stmt,
    pub alternate: Option<Stmt>,
}

impl AstNode for IfStmt {
    fn kind(&self) -> NodeKind {
        NodeKind::IfStatement
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        let mut out = vec![self.test.as_node(), self.consequent.as_node()];
        if let Some(alt) = &self.alternate {
            out.push(alt.as_node());
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Var(VarDecl),
    Expr(Expr),
}

impl ForInit {
    pub fn as_node(&self) -> &dyn AstNode {
        match self {
            ForInit::Var(decl) => decl,
            ForInit::Expr(expr) => expr.as_node(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub span: Span,
    pub init: Option<ForInit>,
    pub test: Option<Expr>,
    pub update: Option<Expr>,
    pub body: Stmt,
}

impl ForStmt {
    pub fn has_lexical_head(&self) -> bool {
        matches!(&self.init, Some(ForInit::Var(decl)) if decl.kind != DeclKind::Var)
    }
}

impl AstNode for ForStmt {
    fn kind(&self) -> NodeKind {
        NodeKind::ForStatement
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        let mut out = Vec::new();
        if let Some(init) = &self.init {
            out.push(init.as_node());
        }
        if let Some(test) = &self.test {
            out.push(test.as_node());
        }
        if let Some(update) = &self.update {
            out.push(update.as_node());
        }
        out.push(self.body.as_node());
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForHead {
    Var(VarDecl),
    Pattern(Pattern),
}

impl ForHead {
    pub fn as_node(&self) -> &dyn AstNode {
        match self {
            ForHead::Var(decl) => decl,
            ForHead::Pattern(pat) => pat.as_node(),
        }
    }
}

/// `for (left in right)` / `for (left of right)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForInStmt {
    pub span: Span,
    pub left: ForHead,
    pub right: Expr,
    pub body: Stmt,
    pub is_of: bool,
}

impl ForInStmt {
    pub fn has_lexical_head(&self) -> bool {
        matches!(&self.left, ForHead::Var(decl) if decl.kind != DeclKind::Var)
    }
}

impl AstNode for ForInStmt {
    fn kind(&self) -> NodeKind {
        if self.is_of { NodeKind::ForOfStatement } else { NodeKind::ForInStatement }
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        vec![self.left.as_node(), self.right.as_node(), self.body.as_node()]
    }
}

/// `while (test) body` or, with `do_while`, `do body while (test)`.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub span: Span,
    pub test: Expr,
    pub body: Stmt,
    pub do_while: bool,
}

impl AstNode for WhileStmt {
    fn kind(&self) -> NodeKind {
        if self.do_while { NodeKind::DoWhileStatement } else { NodeKind::WhileStatement }
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        if self.do_while {
            vec![self.body.as_node(), self.test.as_node()]
        } else {
            vec![self.test.as_node(), self.body.as_node()]
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt {
    pub span: Span,
    pub block: Block,
    pub handler: Option<CatchClause>,
    pub finalizer: Option<Block>,
}

impl AstNode for TryStmt {
    fn kind(&self) -> NodeKind {
        NodeKind::TryStatement
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        let mut out: Vec<&dyn AstNode> = vec![&self.block];
        push_opt(&mut out, &self.handler);
        push_opt(&mut out, &self.finalizer);
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub span: Span,
    pub param: Option<Pattern>,
    pub body: Block,
}

impl AstNode for CatchClause {
    fn kind(&self) -> NodeKind {
        NodeKind::CatchClause
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        let mut out = Vec::new();
        if let Some(param) = &self.param {
            out.push(param.as_node());
        }
        out.push(&self.body as &dyn AstNode);
        out
    }
}

/// `return arg` or `throw arg`, distinguished by `kind`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgStmt {
    pub span: Span,
    pub kind: NodeKind,
    pub arg: Option<Expr>,
}

impl AstNode for ArgStmt {
    fn kind(&self) -> NodeKind {
        self.kind
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        self.arg.iter().map(Expr::as_node).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub span: Span,
    pub discriminant: Expr,
    pub cases: Vec<SwitchCase>,
}

impl SwitchStmt {
    pub fn has_lexical_declarations(&self) -> bool {
        self.cases.iter().any(|case| case.body.iter().any(Stmt::is_lexical_declaration))
    }
}

impl AstNode for SwitchStmt {
    fn kind(&self) -> NodeKind {
        NodeKind::SwitchStatement
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        let mut out = vec![self.discriminant.as_node()];
        out.extend(self.cases.iter().map(|c| c as &dyn AstNode));
        out
    }
}

/// `case test:` or, without `test`, `default:`.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub span: Span,
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
}

impl AstNode for SwitchCase {
    fn kind(&self) -> NodeKind {
        NodeKind::SwitchCase
    }
    fn span(&self) -> Span {
        self.span
    }
    fn label(&self) -> String {
        if self.test.is_some() { "case".to_string() } else { "default".to_string() }
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        let mut out: Vec<&dyn AstNode> = self.test.iter().map(Expr::as_node).collect();
        out.extend(self.body.iter().map(Stmt::as_node));
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledStmt {
    pub span: Span,
    pub label: Label,
    pub body: Stmt,
}

impl AstNode for LabeledStmt {
    fn kind(&self) -> NodeKind {
        NodeKind::LabeledStatement
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        vec![&self.label, self.body.as_node()]
    }
}

/// `break`/`continue`, with an optional label.
#[derive(Debug, Clone, PartialEq)]
pub struct JumpStmt {
    pub span: Span,
    pub kind: NodeKind,
    pub label: Option<Label>,
}

impl AstNode for JumpStmt {
    fn kind(&self) -> NodeKind {
        self.kind
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        let mut out = Vec::new();
        push_opt(&mut out, &self.label);
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithStmt {
    pub span: Span,
    pub object: Expr,
    pub body: Stmt,
}

impl AstNode for WithStmt {
    fn kind(&self) -> NodeKind {
        NodeKind::WithStatement
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        vec![self.object.as_node(), self.body.as_node()]
    }
}

/// `import` or `export` clause.
///
/// For imports `names` are the local bindings introduced; for `export { a as b }`
/// they are the local names referenced (empty when re-exporting from another module).
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDecl {
    pub span: Span,
    pub kind: NodeKind,
    pub names: Vec<Ident>,
    pub source: Option<Literal>,
}

impl AstNode for ModuleDecl {
    fn kind(&self) -> NodeKind {
        self.kind
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        let mut out: Vec<&dyn AstNode> = self.names.iter().map(|n| n as &dyn AstNode).collect();
        push_opt(&mut out, &self.source);
        out
    }
}

/// Error-recovered statement region. `items` holds whatever could still be lowered.
#[derive(Debug, Clone, PartialEq)]
pub struct BadStmt {
    pub span: Span,
    pub items: Vec<Stmt>,
}

impl AstNode for BadStmt {
    fn kind(&self) -> NodeKind {
        NodeKind::BadStatement
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        self.items.iter().map(Stmt::as_node).collect()
    }
}

// ==============================================================================
// Functions and classes
// ==============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub span: Span,
    pub name: Option<Ident>,
    pub params: Vec<Pattern>,
    pub body: Block,
    pub is_async: bool,
    pub is_generator: bool,
    /// Declaration (`function f() {}` statement) as opposed to an expression.
    pub is_decl: bool,
}

impl AstNode for Function {
    fn kind(&self) -> NodeKind {
        if self.is_decl { NodeKind::FunctionDeclaration } else { NodeKind::FunctionExpression }
    }
    fn span(&self) -> Span {
        self.span
    }
    fn label(&self) -> String {
        self.name.as_ref().map(|n| quoted(&n.name)).unwrap_or_default()
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        let mut out = Vec::new();
        push_opt(&mut out, &self.name);
        out.extend(self.params.iter().map(Pattern::as_node));
        out.push(&self.body as &dyn AstNode);
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    Block(Block),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrowFunction {
    pub span: Span,
    pub params: Vec<Pattern>,
    pub body: ArrowBody,
    pub is_async: bool,
}

impl AstNode for ArrowFunction {
    fn kind(&self) -> NodeKind {
        NodeKind::ArrowFunction
    }
    fn span(&self) -> Span {
        self.span
    }
    fn label(&self) -> String {
        "=>".to_string()
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        let mut out: Vec<&dyn AstNode> = self.params.iter().map(Pattern::as_node).collect();
        match &self.body {
            ArrowBody::Block(block) => out.push(block),
            ArrowBody::Expr(expr) => out.push(expr.as_node()),
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub span: Span,
    pub name: Option<Ident>,
    pub super_class: Option<Expr>,
    pub members: Vec<ClassMember>,
    pub is_decl: bool,
}

impl AstNode for Class {
    fn kind(&self) -> NodeKind {
        if self.is_decl { NodeKind::ClassDeclaration } else { NodeKind::ClassExpression }
    }
    fn span(&self) -> Span {
        self.span
    }
    fn label(&self) -> String {
        self.name.as_ref().map(|n| quoted(&n.name)).unwrap_or_default()
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        let mut out = Vec::new();
        push_opt(&mut out, &self.name);
        if let Some(sup) = &self.super_class {
            out.push(sup.as_node());
        }
        out.extend(self.members.iter().map(ClassMember::as_node));
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Method(MethodDef),
    Field(FieldDef),
    StaticBlock(StaticBlock),
}

impl ClassMember {
    pub fn as_node(&self) -> &dyn AstNode {
        match self {
            ClassMember::Method(m) => m,
            ClassMember::Field(f) => f,
            ClassMember::StaticBlock(b) => b,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Method,
    Getter,
    Setter,
}

/// Method in a class body or object literal. `function` carries params and body.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef {
    pub span: Span,
    pub key: PropKey,
    pub function: Function,
    pub kind: MethodKind,
    pub is_static: bool,
}

impl AstNode for MethodDef {
    fn kind(&self) -> NodeKind {
        NodeKind::MethodDefinition
    }
    fn span(&self) -> Span {
        self.span
    }
    fn label(&self) -> String {
        match self.kind {
            MethodKind::Method => String::new(),
            MethodKind::Getter => "get".to_string(),
            MethodKind::Setter => "set".to_string(),
        }
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        vec![self.key.as_node(), &self.function]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub span: Span,
    pub key: PropKey,
    pub value: Option<Expr>,
    pub is_static: bool,
}

impl AstNode for FieldDef {
    fn kind(&self) -> NodeKind {
        NodeKind::FieldDefinition
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        let mut out = vec![self.key.as_node()];
        if let Some(value) = &self.value {
            out.push(value.as_node());
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticBlock {
    pub span: Span,
    pub body: Block,
}

impl AstNode for StaticBlock {
    fn kind(&self) -> NodeKind {
        NodeKind::StaticBlock
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        vec![&self.body]
    }
}

/// Property key in object literals, patterns and class bodies.
#[derive(Debug, Clone, PartialEq)]
pub enum PropKey {
    Ident(Ident),
    Str(Literal),
    Num(Literal),
    Private(PrivateName),
    Computed(Box<Expr>),
}

impl PropKey {
    pub fn as_node(&self) -> &dyn AstNode {
        match self {
            PropKey::Ident(i) => i,
            PropKey::Str(l) | PropKey::Num(l) => l,
            PropKey::Private(p) => p,
            PropKey::Computed(e) => e.as_node(),
        }
    }

    /// Static key name; `None` for computed keys.
    pub fn static_name(&self) -> Option<&str> {
        match self {
            PropKey::Ident(i) => Some(&i.name),
            PropKey::Str(l) | PropKey::Num(l) => Some(l.value()),
            PropKey::Private(p) => Some(&p.name),
            PropKey::Computed(_) => None,
        }
    }
}

// ==============================================================================
// Expressions
// ==============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(Ident),
    Lit(Literal),
    Template(TemplateLit),
    TaggedTemplate(Box<TaggedTemplate>),
    This(Token),
    Super(Token),
    Meta(Token),
    Array(ArrayLit),
    Object(ObjectLit),
    Function(Box<Function>),
    Arrow(Box<ArrowFunction>),
    Class(Box<Class>),
    Unary(Box<UnaryExpr>),
    Binary(Box<BinaryExpr>),
    Assign(Box<AssignExpr>),
    Cond(Box<CondExpr>),
    Call(Box<CallExpr>),
    Member(Box<MemberExpr>),
    Seq(SeqExpr),
    Paren(Box<ParenExpr>),
    Bad(BadExpr),
}

impl Expr {
    pub fn as_node(&self) -> &dyn AstNode {
        match self {
            Expr::Ident(e) => e,
            Expr::Lit(e) => e,
            Expr::Template(e) => e,
            Expr::TaggedTemplate(e) => &**e,
            Expr::This(e) | Expr::Super(e) | Expr::Meta(e) => e,
            Expr::Array(e) => e,
            Expr::Object(e) => e,
            Expr::Function(e) => &**e,
            Expr::Arrow(e) => &**e,
            Expr::Class(e) => &**e,
            Expr::Unary(e) => &**e,
            Expr::Binary(e) => &**e,
            Expr::Assign(e) => &**e,
            Expr::Cond(e) => &**e,
            Expr::Call(e) => &**e,
            Expr::Member(e) => &**e,
            Expr::Seq(e) => e,
            Expr::Paren(e) => &**e,
            Expr::Bad(e) => e,
        }
    }

    pub fn span(&self) -> Span {
        self.as_node().span()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLit {
    pub span: Span,
    pub exprs: Vec<Expr>,
}

impl AstNode for TemplateLit {
    fn kind(&self) -> NodeKind {
        NodeKind::TemplateLiteral
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        self.exprs.iter().map(Expr::as_node).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaggedTemplate {
    pub span: Span,
    pub tag: Expr,
    pub quasi: TemplateLit,
}

impl AstNode for TaggedTemplate {
    fn kind(&self) -> NodeKind {
        NodeKind::TaggedTemplate
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        vec![self.tag.as_node(), &self.quasi]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLit {
    pub span: Span,
    pub elements: Vec<Expr>,
}

impl AstNode for ArrayLit {
    fn kind(&self) -> NodeKind {
        NodeKind::ArrayLiteral
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        self.elements.iter().map(Expr::as_node).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLit {
    pub span: Span,
    pub props: Vec<Prop>,
}

impl AstNode for ObjectLit {
    fn kind(&self) -> NodeKind {
        NodeKind::ObjectLiteral
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        self.props.iter().map(Prop::as_node).collect()
    }
}

/// Object-literal member. Shorthand `{x}` is a bare identifier that is both the
/// key and a variable reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Prop {
    KeyValue(KeyValueProp),
    Shorthand(Ident),
    Method(MethodDef),
    Spread(UnaryExpr),
}

impl Prop {
    pub fn as_node(&self) -> &dyn AstNode {
        match self {
            Prop::KeyValue(p) => p,
            Prop::Shorthand(i) => i,
            Prop::Method(m) => m,
            Prop::Spread(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyValueProp {
    pub span: Span,
    pub key: PropKey,
    pub value: Expr,
}

impl AstNode for KeyValueProp {
    fn kind(&self) -> NodeKind {
        NodeKind::Property
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        vec![self.key.as_node(), self.value.as_node()]
    }
}

/// One-operand expression: unary, update, `await`, `yield`, spread.
/// `kind` selects which; `arg` is optional only for bare `yield`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub span: Span,
    pub kind: NodeKind,
    pub op: String,
    pub prefix: bool,
    pub arg: Option<Expr>,
}

impl AstNode for UnaryExpr {
    fn kind(&self) -> NodeKind {
        self.kind
    }
    fn span(&self) -> Span {
        self.span
    }
    fn label(&self) -> String {
        self.op.clone()
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        self.arg.iter().map(Expr::as_node).collect()
    }
}

/// Binary and logical operators.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub span: Span,
    pub op: String,
    pub left: Expr,
    pub right: Expr,
}

impl AstNode for BinaryExpr {
    fn kind(&self) -> NodeKind {
        NodeKind::BinaryExpression
    }
    fn span(&self) -> Span {
        self.span
    }
    fn label(&self) -> String {
        self.op.clone()
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        vec![self.left.as_node(), self.right.as_node()]
    }
}

/// `left op right` for `=` and compound assignment operators.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignExpr {
    pub span: Span,
    pub op: String,
    pub left: Pattern,
    pub right: Expr,
}

impl AstNode for AssignExpr {
    fn kind(&self) -> NodeKind {
        NodeKind::AssignExpression
    }
    fn span(&self) -> Span {
        self.span
    }
    fn label(&self) -> String {
        self.op.clone()
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        vec![self.left.as_node(), self.right.as_node()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CondExpr {
    pub span: Span,
    pub test: Expr,
    pub consequent: Expr,
    pub alternate: Expr,
}

impl AstNode for CondExpr {
    fn kind(&self) -> NodeKind {
        NodeKind::ConditionalExpression
    }
    fn span(&self) -> Span {
        self.span
    }
    fn label(&self) -> String {
        "?:".to_string()
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        vec![self.test.as_node(), self.consequent.as_node(), self.alternate.as_node()]
    }
}

/// Call or `new` expression (`is_new`).
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub span: Span,
    pub callee: Expr,
    pub args: Vec<Expr>,
    pub is_new: bool,
    pub optional: bool,
}

impl AstNode for CallExpr {
    fn kind(&self) -> NodeKind {
        if self.is_new { NodeKind::NewExpression } else { NodeKind::CallExpression }
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        let mut out = vec![self.callee.as_node()];
        out.extend(self.args.iter().map(Expr::as_node));
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberProp {
    Ident(Ident),
    Private(PrivateName),
    Computed(Expr),
}

impl MemberProp {
    pub fn as_node(&self) -> &dyn AstNode {
        match self {
            MemberProp::Ident(i) => i,
            MemberProp::Private(p) => p,
            MemberProp::Computed(e) => e.as_node(),
        }
    }
}

/// `object.property`, `object?.property`, `object[index]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr {
    pub span: Span,
    pub object: Expr,
    pub property: MemberProp,
    pub optional: bool,
}

impl AstNode for MemberExpr {
    fn kind(&self) -> NodeKind {
        match self.property {
            MemberProp::Computed(_) => NodeKind::IndexExpression,
            _ => NodeKind::MemberExpression,
        }
    }
    fn span(&self) -> Span {
        self.span
    }
    fn label(&self) -> String {
        match (&self.property, self.optional) {
            (MemberProp::Computed(_), _) => "[]".to_string(),
            (_, true) => "?.".to_string(),
            (_, false) => ".".to_string(),
        }
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        vec![self.object.as_node(), self.property.as_node()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeqExpr {
    pub span: Span,
    pub exprs: Vec<Expr>,
}

impl AstNode for SeqExpr {
    fn kind(&self) -> NodeKind {
        NodeKind::SequenceExpression
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        self.exprs.iter().map(Expr::as_node).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr {
    pub span: Span,
    pub expr: Expr,
}

impl AstNode for ParenExpr {
    fn kind(&self) -> NodeKind {
        NodeKind::ParenthesizedExpression
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        vec![self.expr.as_node()]
    }
}

/// Error-recovered expression region ("bad expression").
#[derive(Debug, Clone, PartialEq)]
pub struct BadExpr {
    pub span: Span,
    pub items: Vec<Expr>,
}

impl AstNode for BadExpr {
    fn kind(&self) -> NodeKind {
        NodeKind::BadExpression
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        self.items.iter().map(Expr::as_node).collect()
    }
}

// ==============================================================================
// Patterns
// ==============================================================================

/// Binding or assignment target.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Ident(Ident),
    Object(ObjectPat),
    Array(ArrayPat),
    Rest(Box<RestPat>),
    Assign(Box<AssignPat>),
    /// Non-binding assignment target such as `a.b` in `a.b = 1`.
    Expr(Box<Expr>),
}

impl Pattern {
    pub fn as_node(&self) -> &dyn AstNode {
        match self {
            Pattern::Ident(i) => i,
            Pattern::Object(o) => o,
            Pattern::Array(a) => a,
            Pattern::Rest(r) => &**r,
            Pattern::Assign(a) => &**a,
            Pattern::Expr(e) => e.as_node(),
        }
    }

    pub fn span(&self) -> Span {
        self.as_node().span()
    }

    /// Leaf identifiers bound by this pattern, in source order.
    pub fn bound_idents(&self) -> Vec<&Ident> {
        let mut out = Vec::new();
        self.collect_bound_idents(&mut out);
        out
    }

    fn collect_bound_idents<'a>(&'a self, out: &mut Vec<&'a Ident>) {
        match self {
            Pattern::Ident(ident) => out.push(ident),
            Pattern::Object(obj) => {
                for prop in &obj.props {
                    match prop {
                        ObjectPatProp::KeyValue(kv) => kv.value.collect_bound_idents(out),
                        ObjectPatProp::Shorthand(pat) => pat.collect_bound_idents(out),
                        ObjectPatProp::Rest(rest) => rest.arg.collect_bound_idents(out),
                    }
                }
            }
            Pattern::Array(arr) => {
                for element in &arr.elements {
                    element.collect_bound_idents(out);
                }
            }
            Pattern::Rest(rest) => rest.arg.collect_bound_idents(out),
            Pattern::Assign(assign) => assign.left.collect_bound_idents(out),
            Pattern::Expr(_) => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPat {
    pub span: Span,
    pub props: Vec<ObjectPatProp>,
}

impl AstNode for ObjectPat {
    fn kind(&self) -> NodeKind {
        NodeKind::ObjectPattern
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        self.props.iter().map(ObjectPatProp::as_node).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectPatProp {
    KeyValue(PatProp),
    /// `{a}` or `{a = 1}`: an identifier or assignment pattern.
    Shorthand(Pattern),
    Rest(RestPat),
}

impl ObjectPatProp {
    pub fn as_node(&self) -> &dyn AstNode {
        match self {
            ObjectPatProp::KeyValue(p) => p,
            ObjectPatProp::Shorthand(p) => p.as_node(),
            ObjectPatProp::Rest(r) => r,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatProp {
    pub span: Span,
    pub key: PropKey,
    pub value: Pattern,
}

impl AstNode for PatProp {
    fn kind(&self) -> NodeKind {
        NodeKind::PropertyPattern
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        vec![self.key.as_node(), self.value.as_node()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPat {
    pub span: Span,
    pub elements: Vec<Pattern>,
}

impl AstNode for ArrayPat {
    fn kind(&self) -> NodeKind {
        NodeKind::ArrayPattern
    }
    fn span(&self) -> Span {
        self.span
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        self.elements.iter().map(Pattern::as_node).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestPat {
    pub span: Span,
    pub arg: Pattern,
}

impl AstNode for RestPat {
    fn kind(&self) -> NodeKind {
        NodeKind::RestElement
    }
    fn span(&self) -> Span {
        self.span
    }
    fn label(&self) -> String {
        "...".to_string()
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        vec![self.arg.as_node()]
    }
}

/// `left = right` default in a pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignPat {
    pub span: Span,
    pub left: Pattern,
    pub right: Expr,
}

impl AstNode for AssignPat {
    fn kind(&self) -> NodeKind {
        NodeKind::AssignPattern
    }
    fn span(&self) -> Span {
        self.span
    }
    fn label(&self) -> String {
        "=".to_string()
    }
    fn children(&self) -> Vec<&dyn AstNode> {
        vec![self.left.as_node(), self.right.as_node()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(start: u32, name: &str) -> Ident {
        Ident::new(Span::new(start, start + name.len() as u32), name)
    }

    #[test]
    fn test_span_contains_is_half_open() {
        let span = Span::new(3, 6);
        assert!(!span.contains(2));
        assert!(span.contains(3));
        assert!(span.contains(5));
        assert!(!span.contains(6));
    }

    #[test]
    fn test_degenerate_span() {
        assert!(Span::default().is_degenerate());
        assert!(!Span::new(1, 1).is_degenerate());
        assert_eq!(Span::default().cover(Span::new(2, 4)), Span::new(2, 4));
    }

    #[test]
    fn test_string_literal_value_strips_quotes() {
        let lit = Literal { span: Span::new(1, 6), kind: LitKind::String, raw: "'foo'".to_string() };
        assert_eq!(lit.value(), "foo");
        assert_eq!(lit.name(), Some("foo"));
        assert_eq!(lit.kind(), NodeKind::StringLiteral);
    }

    #[test]
    fn test_bound_idents_expands_destructuring() {
        // const {a, b: [c, ...d], e = 1} = ...
        let pattern = Pattern::Object(ObjectPat {
            span: Span::new(7, 30),
            props: vec![
                ObjectPatProp::Shorthand(Pattern::Ident(ident(8, "a"))),
                ObjectPatProp::KeyValue(PatProp {
                    span: Span::new(11, 22),
                    key: PropKey::Ident(ident(11, "b")),
                    value: Pattern::Array(ArrayPat {
                        span: Span::new(14, 22),
                        elements: vec![
                            Pattern::Ident(ident(15, "c")),
                            Pattern::Rest(Box::new(RestPat {
                                span: Span::new(18, 22),
                                arg: Pattern::Ident(ident(21, "d")),
                            })),
                        ],
                    }),
                }),
                ObjectPatProp::Shorthand(Pattern::Assign(Box::new(AssignPat {
                    span: Span::new(24, 29),
                    left: Pattern::Ident(ident(24, "e")),
                    right: Expr::Lit(Literal { span: Span::new(28, 29), kind: LitKind::Number, raw: "1".into() }),
                }))),
            ],
        });
        let names: Vec<&str> = pattern.bound_idents().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "d", "e"]);
    }

    #[test]
    fn test_member_children_in_source_order() {
        let member = MemberExpr {
            span: Span::new(1, 12),
            object: Expr::Ident(ident(1, "console")),
            property: MemberProp::Ident(ident(9, "log")),
            optional: false,
        };
        let kinds: Vec<NodeKind> = member.children().iter().map(|c| c.kind()).collect();
        assert_eq!(kinds, vec![NodeKind::Identifier, NodeKind::Identifier]);
        assert_eq!(member.label(), ".");
        assert_eq!(member.kind(), NodeKind::MemberExpression);
    }
}
