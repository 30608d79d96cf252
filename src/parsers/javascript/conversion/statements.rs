//! Statement and declaration lowering

use tree_sitter::Node as TSNode;
use tracing::trace;

use crate::ir::js_node::{
    ArgStmt, BadStmt, Block, CatchClause, Class, ClassMember, DeclKind, Declarator, Expr,
    ExprStmt, FieldDef, ForHead, ForInStmt, ForInit, ForStmt, Function, IfStmt, JumpStmt, Label,
    LabeledStmt, LitKind, Literal, MethodDef, MethodKind, ModuleDecl, NodeKind, Pattern, PropKey,
    Span, StaticBlock, Stmt, SwitchCase, SwitchStmt, Token, TryStmt, VarDecl, WhileStmt, WithStmt,
};

use super::super::helpers::{
    fielded_children, first_named, has_token, is_statement_kind, named_children, span_between,
    span_of, token_child,
};
use super::{Lowerer, empty_block, missing_expr, missing_stmt};

impl<'a> Lowerer<'a> {
    /// Lowers the statement children of `node`, dropping comments and unlowerable nodes.
    pub(super) fn statements(&self, node: TSNode) -> Vec<Stmt> {
        named_children(node).into_iter().filter_map(|child| self.stmt(child)).collect()
    }

    pub(super) fn stmt(&self, node: TSNode) -> Option<Stmt> {
        let span = span_of(node);
        let stmt = match node.kind() {
            "expression_statement" => {
                let expr = first_named(node).map(|e| self.expr(e)).unwrap_or_else(missing_expr);
                Stmt::Expr(ExprStmt { span, expr })
            }
            "variable_declaration" | "lexical_declaration" => Stmt::Var(self.var_decl(node)),
            "function_declaration" | "generator_function_declaration" => {
                Stmt::Function(Box::new(self.function(node, true)))
            }
            "class_declaration" => Stmt::Class(Box::new(self.class(node, true))),
            "statement_block" => Stmt::Block(self.block(node)),
            "if_statement" => {
                let alternate = node.child_by_field_name("alternative").and_then(|alt| {
                    if alt.kind() == "else_clause" {
                        first_named(alt).and_then(|s| self.stmt(s))
                    } else {
                        self.stmt(alt)
                    }
                });
                Stmt::If(Box::new(IfStmt {
                    span,
                    test: self.condition(node, "condition"),
                    consequent: self.field_stmt(node, "consequence"),
                    alternate,
                }))
            }
            "for_statement" => Stmt::For(Box::new(self.for_stmt(node))),
            "for_in_statement" => Stmt::ForIn(Box::new(self.for_in_stmt(node))),
            "while_statement" => Stmt::While(Box::new(WhileStmt {
                span,
                test: self.condition(node, "condition"),
                body: self.field_stmt(node, "body"),
                do_while: false,
            })),
            "do_statement" => Stmt::While(Box::new(WhileStmt {
                span,
                test: self.condition(node, "condition"),
                body: self.field_stmt(node, "body"),
                do_while: true,
            })),
            "try_statement" => {
                let handler = node.child_by_field_name("handler").map(|h| CatchClause {
                    span: span_of(h),
                    param: h.child_by_field_name("parameter").map(|p| self.pattern(p)),
                    body: self.field_block(h, "body"),
                });
                let finalizer = node
                    .child_by_field_name("finalizer")
                    .map(|f| self.field_block(f, "body"));
                Stmt::Try(Box::new(TryStmt {
                    span,
                    block: self.field_block(node, "body"),
                    handler,
                    finalizer,
                }))
            }
            "return_statement" | "throw_statement" => {
                let kind = if node.kind() == "return_statement" {
                    NodeKind::ReturnStatement
                } else {
                    NodeKind::ThrowStatement
                };
                let stmt = ArgStmt { span, kind, arg: first_named(node).map(|e| self.expr(e)) };
                if kind == NodeKind::ReturnStatement { Stmt::Return(stmt) } else { Stmt::Throw(stmt) }
            }
            "break_statement" | "continue_statement" => Stmt::Jump(JumpStmt {
                span,
                kind: if node.kind() == "break_statement" {
                    NodeKind::BreakStatement
                } else {
                    NodeKind::ContinueStatement
                },
                label: node.child_by_field_name("label").map(|l| self.label(l)),
            }),
            "labeled_statement" => Stmt::Labeled(Box::new(LabeledStmt {
                span,
                label: node
                    .child_by_field_name("label")
                    .map(|l| self.label(l))
                    .unwrap_or(Label { span: Span::default(), name: String::new() }),
                body: self.field_stmt(node, "body"),
            })),
            "switch_statement" => Stmt::Switch(Box::new(self.switch_stmt(node))),
            "with_statement" => Stmt::With(Box::new(WithStmt {
                span,
                object: self.condition(node, "object"),
                body: self.field_stmt(node, "body"),
            })),
            "empty_statement" => Stmt::Empty(Token { span, kind: NodeKind::EmptyStatement }),
            "debugger_statement" => {
                Stmt::Debugger(Token { span, kind: NodeKind::DebuggerStatement })
            }
            "import_statement" => Stmt::Module(self.import_decl(node)),
            "export_statement" => return self.export_decl(node),
            "ERROR" => {
                let items = named_children(node)
                    .into_iter()
                    .filter_map(|child| self.stmt_or_expr(child))
                    .collect::<Vec<_>>();
                trace!("Lowered ERROR region {:?} with {} recovered items", span, items.len());
                Stmt::Bad(BadStmt { span, items })
            }
            "comment" | "html_comment" | "hash_bang_line" => return None,
            _ => Stmt::Expr(ExprStmt { span, expr: self.expr(node) }),
        };
        Some(stmt)
    }

    /// Statement-level lowering for a child of an error region: statements stay
    /// statements, anything else is wrapped as an expression statement.
    fn stmt_or_expr(&self, node: TSNode) -> Option<Stmt> {
        if is_statement_kind(node.kind()) || node.kind() == "ERROR" {
            self.stmt(node)
        } else if !node.is_named() || node.kind() == "comment" {
            None
        } else {
            Some(Stmt::Expr(ExprStmt { span: span_of(node), expr: self.expr(node) }))
        }
    }

    pub(super) fn block(&self, node: TSNode) -> Block {
        Block { span: span_of(node), body: self.statements(node) }
    }

    fn field_block(&self, node: TSNode, field: &str) -> Block {
        node.child_by_field_name(field).map(|b| self.block(b)).unwrap_or_else(empty_block)
    }

    fn field_stmt(&self, node: TSNode, field: &str) -> Stmt {
        node.child_by_field_name(field).and_then(|s| self.stmt(s)).unwrap_or_else(missing_stmt)
    }

    fn label(&self, node: TSNode) -> Label {
        Label { span: span_of(node), name: self.text(node).to_string() }
    }

    pub(super) fn var_decl(&self, node: TSNode) -> VarDecl {
        let kind = if node.kind() == "variable_declaration" {
            DeclKind::Var
        } else {
            node.child_by_field_name("kind")
                .or_else(|| token_child(node, &["let", "const"]))
                .map(|k| decl_kind(self.text(k)))
                .unwrap_or(DeclKind::Let)
        };
        let declarators = named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "variable_declarator")
            .map(|d| Declarator {
                span: span_of(d),
                name: d
                    .child_by_field_name("name")
                    .map(|n| self.pattern(n))
                    .unwrap_or_else(|| Pattern::Expr(Box::new(missing_expr()))),
                init: d.child_by_field_name("value").map(|v| self.expr(v)),
            })
            .collect();
        VarDecl { span: span_of(node), kind, declarators }
    }

    fn for_stmt(&self, node: TSNode) -> ForStmt {
        let mut init = None;
        let mut test = None;
        let mut update = None;
        let mut body = None;

        // Punctuation inside the header can carry the same field name as the
        // clause it terminates, so a later `;` must not clear an earlier clause.
        for (field, child) in fielded_children(node) {
            match field {
                Some("initializer") => {
                    if let Some(clause) = self.for_init(child) {
                        init = Some(clause);
                    }
                }
                Some("condition") => {
                    if let Some(clause) = self.optional_clause(child) {
                        test = Some(clause);
                    }
                }
                Some("increment") => {
                    if let Some(clause) = self.optional_clause(child) {
                        update = Some(clause);
                    }
                }
                Some("body") => body = self.stmt(child),
                _ => {}
            }
        }

        ForStmt {
            span: span_of(node),
            init,
            test,
            update,
            body: body.unwrap_or_else(missing_stmt),
        }
    }

    fn for_init(&self, node: TSNode) -> Option<ForInit> {
        match node.kind() {
            "lexical_declaration" | "variable_declaration" => Some(ForInit::Var(self.var_decl(node))),
            _ => self.optional_clause(node).map(ForInit::Expr),
        }
    }

    fn optional_clause(&self, node: TSNode) -> Option<Expr> {
        match node.kind() {
            "expression_statement" => first_named(node).map(|e| self.expr(e)),
            "empty_statement" | "comment" => None,
            _ if !node.is_named() => None,
            _ => Some(self.expr(node)),
        }
    }

    fn for_in_stmt(&self, node: TSNode) -> ForInStmt {
        let kind_node = node
            .child_by_field_name("kind")
            .or_else(|| token_child(node, &["var", "let", "const"]));
        let left_node = node.child_by_field_name("left");

        let left = match (kind_node, left_node) {
            (Some(kind_node), Some(left_node)) => {
                let declarator = Declarator {
                    span: span_of(left_node),
                    name: self.pattern(left_node),
                    init: None,
                };
                ForHead::Var(VarDecl {
                    span: span_between(span_of(kind_node), span_of(left_node)),
                    kind: decl_kind(self.text(kind_node)),
                    declarators: vec![declarator],
                })
            }
            (None, Some(left_node)) => ForHead::Pattern(self.pattern(left_node)),
            _ => ForHead::Pattern(Pattern::Expr(Box::new(missing_expr()))),
        };

        ForInStmt {
            span: span_of(node),
            left,
            right: node
                .child_by_field_name("right")
                .map(|r| self.expr(r))
                .unwrap_or_else(missing_expr),
            body: self.field_stmt(node, "body"),
            is_of: token_child(node, &["of"]).is_some(),
        }
    }

    fn switch_stmt(&self, node: TSNode) -> SwitchStmt {
        let cases = node
            .child_by_field_name("body")
            .map(|body| {
                named_children(body)
                    .into_iter()
                    .filter(|c| matches!(c.kind(), "switch_case" | "switch_default"))
                    .map(|case| {
                        let mut test = None;
                        let mut body = Vec::new();
                        for (field, child) in fielded_children(case) {
                            match field {
                                Some("value") => test = Some(self.expr(child)),
                                Some("body") => body.extend(self.stmt(child)),
                                _ => {}
                            }
                        }
                        SwitchCase { span: span_of(case), test, body }
                    })
                    .collect()
            })
            .unwrap_or_default();

        SwitchStmt {
            span: span_of(node),
            discriminant: self.condition(node, "value"),
            cases,
        }
    }

    pub(super) fn function(&self, node: TSNode, is_decl: bool) -> Function {
        Function {
            span: span_of(node),
            name: node.child_by_field_name("name").map(|n| self.ident(n)),
            params: node
                .child_by_field_name("parameters")
                .map(|p| self.params(p))
                .unwrap_or_default(),
            body: self.field_block(node, "body"),
            is_async: has_token(node, "async"),
            is_generator: has_token(node, "*"),
            is_decl,
        }
    }

    pub(super) fn params(&self, node: TSNode) -> Vec<Pattern> {
        named_children(node).into_iter().map(|p| self.pattern(p)).collect()
    }

    pub(super) fn class(&self, node: TSNode, is_decl: bool) -> Class {
        let super_class = named_children(node)
            .into_iter()
            .find(|c| c.kind() == "class_heritage")
            .and_then(first_named)
            .map(|e| self.expr(e));
        let members = node
            .child_by_field_name("body")
            .map(|body| {
                named_children(body)
                    .into_iter()
                    .filter_map(|m| self.class_member(m))
                    .collect()
            })
            .unwrap_or_default();

        Class {
            span: span_of(node),
            name: node.child_by_field_name("name").map(|n| self.ident(n)),
            super_class,
            members,
            is_decl,
        }
    }

    fn class_member(&self, node: TSNode) -> Option<ClassMember> {
        match node.kind() {
            "method_definition" => Some(ClassMember::Method(self.method(node))),
            "field_definition" => {
                let key = node
                    .child_by_field_name("property")
                    .map(|k| self.prop_key(k))?;
                Some(ClassMember::Field(FieldDef {
                    span: span_of(node),
                    key,
                    value: node.child_by_field_name("value").map(|v| self.expr(v)),
                    is_static: has_token(node, "static"),
                }))
            }
            "class_static_block" => Some(ClassMember::StaticBlock(StaticBlock {
                span: span_of(node),
                body: self.field_block(node, "body"),
            })),
            _ => None,
        }
    }

    /// Method in a class body or object literal. The inner function spans
    /// parameters and body only, so the key stays a sibling of it.
    pub(super) fn method(&self, node: TSNode) -> MethodDef {
        let params_node = node.child_by_field_name("parameters");
        let body = self.field_block(node, "body");
        let function_span = match params_node {
            Some(p) => span_between(span_of(p), body.span),
            None => body.span,
        };
        let kind = match token_child(node, &["get", "set"]).map(|t| t.kind()) {
            Some("get") => MethodKind::Getter,
            Some("set") => MethodKind::Setter,
            _ => MethodKind::Method,
        };

        MethodDef {
            span: span_of(node),
            key: node
                .child_by_field_name("name")
                .map(|k| self.prop_key(k))
                .unwrap_or_else(|| PropKey::Computed(Box::new(missing_expr()))),
            function: Function {
                span: function_span,
                name: None,
                params: params_node.map(|p| self.params(p)).unwrap_or_default(),
                body,
                is_async: has_token(node, "async"),
                is_generator: has_token(node, "*"),
                is_decl: false,
            },
            kind,
            is_static: has_token(node, "static"),
        }
    }

    fn import_decl(&self, node: TSNode) -> ModuleDecl {
        let mut names = Vec::new();
        if let Some(clause) = named_children(node).into_iter().find(|c| c.kind() == "import_clause") {
            for child in named_children(clause) {
                match child.kind() {
                    "identifier" => names.push(self.ident(child)),
                    "namespace_import" => {
                        if let Some(local) = first_named(child) {
                            names.push(self.ident(local));
                        }
                    }
                    "named_imports" => {
                        for spec in named_children(child) {
                            let local = spec
                                .child_by_field_name("alias")
                                .or_else(|| spec.child_by_field_name("name"));
                            if let Some(local) = local.filter(|l| l.kind() == "identifier") {
                                names.push(self.ident(local));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        ModuleDecl {
            span: span_of(node),
            kind: NodeKind::ImportDeclaration,
            names,
            source: self.module_source(node),
        }
    }

    /// `export <declaration>` lowers to the declaration itself, `export default expr`
    /// to an expression statement, and export clauses to a module declaration.
    fn export_decl(&self, node: TSNode) -> Option<Stmt> {
        let span = span_of(node);
        if let Some(decl) = node.child_by_field_name("declaration") {
            return self.stmt(decl).or_else(|| {
                Some(Stmt::Expr(ExprStmt { span: span_of(decl), expr: self.expr(decl) }))
            });
        }
        if let Some(value) = node.child_by_field_name("value") {
            return Some(Stmt::Expr(ExprStmt { span, expr: self.expr(value) }));
        }

        let source = self.module_source(node);
        let mut names = Vec::new();
        if source.is_none() {
            if let Some(clause) = named_children(node).into_iter().find(|c| c.kind() == "export_clause") {
                for spec in named_children(clause) {
                    if let Some(local) = spec.child_by_field_name("name").filter(|n| n.kind() == "identifier") {
                        names.push(self.ident(local));
                    }
                }
            }
        }

        Some(Stmt::Module(ModuleDecl { span, kind: NodeKind::ExportDeclaration, names, source }))
    }

    fn module_source(&self, node: TSNode) -> Option<Literal> {
        node.child_by_field_name("source").map(|s| Literal {
            span: span_of(s),
            kind: LitKind::String,
            raw: self.text(s).to_string(),
        })
    }
}

pub(super) fn decl_kind(text: &str) -> DeclKind {
    match text {
        "const" => DeclKind::Const,
        "let" => DeclKind::Let,
        _ => DeclKind::Var,
    }
}
