//! Scope resolution for JavaScript programs
//!
//! Builds a [`Resolution`] for a typed [`Program`] whose nodes have been indexed.
//! Identifier nodes are mapped to index records through their `(kind, span)` key, so
//! the program passed here must be the one the [`Index`] was built from.
//!
//! # Passes
//!
//! The same traversal runs twice:
//!
//! 1. [`Pass::Declare`] creates scopes and registers every declaration. `var` and
//!    function declarations hoist to the nearest function-or-global scope; `let`,
//!    `const`, classes, parameters and catch parameters bind where they appear.
//! 2. [`Pass::Resolve`] re-enters the same scopes in the same order and resolves every
//!    identifier in expression position against the scope chain.
//!
//! Because all declarations exist before any reference is resolved, forward
//! references to hoisted names (and to later `let`/`const` in the same scope)
//! resolve to the declaration.
//!
//! # Scope creation
//!
//! Only constructs that introduce names get a scope:
//! - functions, arrows, methods, field initialisers and static blocks: `Function`
//! - `{}` blocks and switch bodies that directly declare `let`/`const`/`class`: `Block`
//! - `for`/`for-in`/`for-of` with a `let`/`const` head: `For`
//! - `catch (param)`: `Catch`
//! - named class expressions: a `Block` scope holding the class name

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::ir::index::{Index, NodeId};
use crate::ir::js_node::{
    ArrowBody, ArrowFunction, Block, Class, ClassMember, DeclKind, Expr, ForHead, ForInit, Function,
    Ident, MemberProp, NodeKind, ObjectPatProp, Pattern, Program, Prop, PropKey, Span, Stmt,
    VarDecl,
};
use crate::ir::scope::{
    BindingId, BindingKind, BindingRecord, Resolution, ScopeId, ScopeKind, ScopeRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Declare,
    Resolve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionRole {
    Declaration,
    Expression,
    Method,
}

/// Resolves every binding and reference in `program`.
///
/// Never fails. Nodes missing from `index` (degenerate spans from error recovery)
/// are ignored, so malformed programs simply yield fewer bindings.
pub fn resolve(program: &Program, index: &Index) -> Resolution {
    let mut resolver = ScopeResolver::new(index, program.span);

    resolver.visit_stmts(&program.body);

    resolver.pass = Pass::Resolve;
    resolver.current = resolver.root;
    resolver.replay = 0;
    resolver.visit_stmts(&program.body);

    resolver.finish()
}

struct ScopeResolver<'i> {
    index: &'i Index,
    pass: Pass,
    scopes: Vec<ScopeRecord>,
    bindings: Vec<BindingRecord>,
    node_binding: FxHashMap<NodeId, BindingId>,
    unresolved: Vec<NodeId>,
    declarations: FxHashSet<NodeId>,
    /// Scopes in the order pass 1 entered them; pass 2 replays this sequence.
    scope_order: Vec<ScopeId>,
    replay: usize,
    root: ScopeId,
    current: ScopeId,
}

impl<'i> ScopeResolver<'i> {
    fn new(index: &'i Index, program_span: Span) -> Self {
        let global = ScopeRecord {
            id: 0,
            parent_id: None,
            kind: ScopeKind::Global,
            start: program_span.start,
            end: program_span.end,
            bindings: Default::default(),
            children: Vec::new(),
        };
        Self {
            index,
            pass: Pass::Declare,
            scopes: vec![global],
            bindings: Vec::new(),
            node_binding: FxHashMap::default(),
            unresolved: Vec::new(),
            declarations: FxHashSet::default(),
            scope_order: Vec::new(),
            replay: 0,
            root: 0,
            current: 0,
        }
    }

    fn finish(self) -> Resolution {
        debug!(
            "Resolved {} scopes, {} bindings, {} references, {} unresolved",
            self.scopes.len(),
            self.bindings.len(),
            self.bindings.iter().map(|b| b.references.len()).sum::<usize>(),
            self.unresolved.len()
        );
        Resolution {
            scopes: self.scopes,
            bindings: self.bindings,
            root_scope_id: self.root,
            node_binding: self.node_binding,
            unresolved: self.unresolved,
            declarations: self.declarations,
        }
    }

    // ==========================================================================
    // Scope bookkeeping
    // ==========================================================================

    /// Runs `f` inside a child scope of the current one.
    fn scoped(&mut self, kind: ScopeKind, span: Span, f: impl FnOnce(&mut Self)) {
        let scope = match self.pass {
            Pass::Declare => {
                let id = self.create_scope(kind, span);
                self.scope_order.push(id);
                id
            }
            Pass::Resolve => {
                let replayed = self.scope_order.get(self.replay).copied();
                self.replay += 1;
                match replayed {
                    Some(id) => id,
                    None => self.create_scope(kind, span),
                }
            }
        };
        let outer = self.current;
        self.current = scope;
        f(self);
        self.current = outer;
    }

    fn create_scope(&mut self, kind: ScopeKind, span: Span) -> ScopeId {
        let id = self.scopes.len();
        let parent = self.current;
        // Missing constructs inherit the extent of their parent.
        let (start, end) = if span.is_degenerate() {
            (self.scopes[parent].start, self.scopes[parent].end)
        } else {
            (span.start, span.end)
        };
        self.scopes.push(ScopeRecord {
            id,
            parent_id: Some(parent),
            kind,
            start,
            end,
            bindings: Default::default(),
            children: Vec::new(),
        });
        self.scopes[parent].children.push(id);
        trace!("Created {} scope {} at {}..{}", kind.as_str(), id, start, end);
        id
    }

    /// Nearest function-or-global scope, starting at the current one.
    fn hoist_target(&self) -> ScopeId {
        let mut scope = self.current;
        while !self.scopes[scope].kind.is_hoist_target() {
            match self.scopes[scope].parent_id {
                Some(parent) => scope = parent,
                None => break,
            }
        }
        scope
    }

    fn lookup_from(&self, scope: ScopeId, name: &str) -> Option<BindingId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let record = &self.scopes[id];
            if let Some(binding) = record.bindings.get(name) {
                return Some(*binding);
            }
            current = record.parent_id;
        }
        None
    }

    /// Index record of an identifier, if it was indexed.
    fn ident_node(&self, ident: &Ident) -> Option<NodeId> {
        if ident.name.is_empty() || ident.span.is_degenerate() {
            return None;
        }
        self.index.node_id_for(NodeKind::Identifier, ident.span)
    }

    // ==========================================================================
    // Declarations and references
    // ==========================================================================

    /// Registers a declaration (pass 1 only).
    fn declare(&mut self, ident: &Ident, kind: BindingKind) {
        if self.pass != Pass::Declare {
            return;
        }
        let Some(node) = self.ident_node(ident) else { return };
        let scope = if kind.is_hoisted() { self.hoist_target() } else { self.current };
        self.bind(scope, node, &ident.name, kind);
    }

    fn bind(&mut self, scope: ScopeId, node: NodeId, name: &str, kind: BindingKind) -> BindingId {
        let binding = match self.scopes[scope].bindings.get(name).copied() {
            Some(existing) => {
                // Redeclaration shares the record; a function declaration takes over
                // the declaration site.
                if kind == BindingKind::Function {
                    let record = &mut self.bindings[existing];
                    record.decl_node_id = node;
                    record.kind = BindingKind::Function;
                }
                existing
            }
            None => {
                let id = self.bindings.len();
                self.bindings.push(BindingRecord {
                    id,
                    name: name.to_string(),
                    kind,
                    decl_node_id: node,
                    scope_id: scope,
                    references: Vec::new(),
                });
                self.scopes[scope].bindings.insert(name.to_string(), id);
                id
            }
        };
        self.node_binding.insert(node, binding);
        self.declarations.insert(node);
        binding
    }

    /// Resolves an identifier read (pass 2 only).
    fn reference(&mut self, ident: &Ident) {
        if self.pass != Pass::Resolve {
            return;
        }
        let Some(node) = self.ident_node(ident) else { return };
        if self.declarations.contains(&node) || self.node_binding.contains_key(&node) {
            return;
        }
        match self.lookup_from(self.current, &ident.name) {
            Some(binding) => self.add_reference(node, binding),
            None => {
                trace!("Unresolved reference to {:?}", ident.name);
                self.unresolved.push(node);
            }
        }
    }

    fn add_reference(&mut self, node: NodeId, binding: BindingId) {
        self.bindings[binding].references.push(node);
        self.node_binding.insert(node, binding);
    }

    /// A named function expression sees its own name only when no outer scope
    /// already binds it; otherwise the name refers to the outer binding.
    fn bind_function_expression_name(&mut self, name: &Ident) {
        let Some(node) = self.ident_node(name) else { return };
        let scope = self.current;
        let outer = self.scopes[scope].parent_id.and_then(|p| self.lookup_from(p, &name.name));
        if let Some(binding) = outer {
            self.add_reference(node, binding);
        } else if let Some(binding) = self.scopes[scope].bindings.get(&name.name).copied() {
            self.add_reference(node, binding);
        } else {
            self.bind(scope, node, &name.name, BindingKind::Function);
        }
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn visit_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(s) => self.visit_expr(&s.expr),
            Stmt::Var(decl) => self.visit_var_decl(decl),
            Stmt::Function(f) => self.visit_function(f, FunctionRole::Declaration),
            Stmt::Class(c) => self.visit_class(c),
            Stmt::Block(block) => self.visit_stmt_block(block),
            Stmt::If(s) => {
                self.visit_expr(&s.test);
                self.visit_stmt(&s.consequent);
                if let Some(alt) = &s.alternate {
                    self.visit_stmt(alt);
                }
            }
            Stmt::For(s) => {
                let visit = |this: &mut Self| {
                    match &s.init {
                        Some(ForInit::Var(decl)) => this.visit_var_decl(decl),
                        Some(ForInit::Expr(expr)) => this.visit_expr(expr),
                        None => {}
                    }
                    if let Some(test) = &s.test {
                        this.visit_expr(test);
                    }
                    if let Some(update) = &s.update {
                        this.visit_expr(update);
                    }
                    this.visit_stmt(&s.body);
                };
                if s.has_lexical_head() {
                    self.scoped(ScopeKind::For, s.span, visit);
                } else {
                    visit(self);
                }
            }
            Stmt::ForIn(s) => {
                let visit = |this: &mut Self| {
                    match &s.left {
                        ForHead::Var(decl) => this.visit_var_decl(decl),
                        ForHead::Pattern(pattern) => this.visit_pattern(pattern, None),
                    }
                    this.visit_expr(&s.right);
                    this.visit_stmt(&s.body);
                };
                if s.has_lexical_head() {
                    self.scoped(ScopeKind::For, s.span, visit);
                } else {
                    visit(self);
                }
            }
            Stmt::While(s) => {
                if s.do_while {
                    self.visit_stmt(&s.body);
                    self.visit_expr(&s.test);
                } else {
                    self.visit_expr(&s.test);
                    self.visit_stmt(&s.body);
                }
            }
            Stmt::Try(s) => {
                self.visit_stmt_block(&s.block);
                if let Some(handler) = &s.handler {
                    match &handler.param {
                        Some(param) => self.scoped(ScopeKind::Catch, handler.span, |this| {
                            this.visit_pattern(param, Some(BindingKind::CatchParameter));
                            this.visit_stmt_block(&handler.body);
                        }),
                        None => self.visit_stmt_block(&handler.body),
                    }
                }
                if let Some(finalizer) = &s.finalizer {
                    self.visit_stmt_block(finalizer);
                }
            }
            Stmt::Return(s) | Stmt::Throw(s) => {
                if let Some(arg) = &s.arg {
                    self.visit_expr(arg);
                }
            }
            Stmt::Switch(s) => {
                self.visit_expr(&s.discriminant);
                let visit = |this: &mut Self| {
                    for case in &s.cases {
                        if let Some(test) = &case.test {
                            this.visit_expr(test);
                        }
                        this.visit_stmts(&case.body);
                    }
                };
                if s.has_lexical_declarations() {
                    self.scoped(ScopeKind::Block, s.span, visit);
                } else {
                    visit(self);
                }
            }
            Stmt::Labeled(s) => self.visit_stmt(&s.body),
            Stmt::With(s) => {
                self.visit_expr(&s.object);
                self.visit_stmt(&s.body);
            }
            Stmt::Module(decl) => {
                for name in &decl.names {
                    if decl.kind == NodeKind::ImportDeclaration {
                        self.declare(name, BindingKind::Const);
                    } else {
                        self.reference(name);
                    }
                }
            }
            Stmt::Bad(bad) => self.visit_stmts(&bad.items),
            Stmt::Jump(_) | Stmt::Empty(_) | Stmt::Debugger(_) => {}
        }
    }

    /// A `{}` block that is not a function body.
    fn visit_stmt_block(&mut self, block: &Block) {
        if block.has_lexical_declarations() {
            self.scoped(ScopeKind::Block, block.span, |this| this.visit_stmts(&block.body));
        } else {
            self.visit_stmts(&block.body);
        }
    }

    fn visit_var_decl(&mut self, decl: &VarDecl) {
        let kind = match decl.kind {
            DeclKind::Var => BindingKind::Var,
            DeclKind::Let => BindingKind::Let,
            DeclKind::Const => BindingKind::Const,
        };
        for declarator in &decl.declarators {
            self.visit_pattern(&declarator.name, Some(kind));
            if let Some(init) = &declarator.init {
                self.visit_expr(init);
            }
        }
    }

    // ==========================================================================
    // Functions and classes
    // ==========================================================================

    fn visit_function(&mut self, function: &Function, role: FunctionRole) {
        if role == FunctionRole::Declaration {
            if let Some(name) = &function.name {
                self.declare(name, BindingKind::Function);
            }
        }
        self.scoped(ScopeKind::Function, function.span, |this| {
            if role == FunctionRole::Expression && this.pass == Pass::Resolve {
                if let Some(name) = &function.name {
                    this.bind_function_expression_name(name);
                }
            }
            for param in &function.params {
                this.visit_pattern(param, Some(BindingKind::Parameter));
            }
            // The body shares the function scope.
            this.visit_stmts(&function.body.body);
        });
    }

    fn visit_arrow(&mut self, arrow: &ArrowFunction) {
        self.scoped(ScopeKind::Function, arrow.span, |this| {
            for param in &arrow.params {
                this.visit_pattern(param, Some(BindingKind::Parameter));
            }
            match &arrow.body {
                ArrowBody::Block(block) => this.visit_stmts(&block.body),
                ArrowBody::Expr(expr) => this.visit_expr(expr),
            }
        });
    }

    fn visit_class(&mut self, class: &Class) {
        if class.is_decl {
            if let Some(name) = &class.name {
                self.declare(name, BindingKind::Class);
            }
            self.visit_class_body(class);
            return;
        }
        match &class.name {
            Some(name) => self.scoped(ScopeKind::Block, class.span, |this| {
                this.declare(name, BindingKind::Class);
                this.visit_class_body(class);
            }),
            None => self.visit_class_body(class),
        }
    }

    fn visit_class_body(&mut self, class: &Class) {
        if let Some(super_class) = &class.super_class {
            self.visit_expr(super_class);
        }
        for member in &class.members {
            match member {
                ClassMember::Method(method) => {
                    self.visit_prop_key(&method.key);
                    self.visit_function(&method.function, FunctionRole::Method);
                }
                ClassMember::Field(field) => {
                    self.visit_prop_key(&field.key);
                    if let Some(value) = &field.value {
                        self.scoped(ScopeKind::Function, field.span, |this| this.visit_expr(value));
                    }
                }
                ClassMember::StaticBlock(block) => {
                    self.scoped(ScopeKind::Function, block.span, |this| {
                        this.visit_stmts(&block.body.body)
                    });
                }
            }
        }
    }

    // ==========================================================================
    // Expressions and patterns
    // ==========================================================================

    /// Property keys are never resolved; computed keys are ordinary expressions.
    fn visit_prop_key(&mut self, key: &PropKey) {
        if let PropKey::Computed(expr) = key {
            self.visit_expr(expr);
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(ident) => self.reference(ident),
            Expr::Lit(_) | Expr::This(_) | Expr::Super(_) | Expr::Meta(_) => {}
            Expr::Template(template) => {
                for e in &template.exprs {
                    self.visit_expr(e);
                }
            }
            Expr::TaggedTemplate(tagged) => {
                self.visit_expr(&tagged.tag);
                for e in &tagged.quasi.exprs {
                    self.visit_expr(e);
                }
            }
            Expr::Array(array) => {
                for e in &array.elements {
                    self.visit_expr(e);
                }
            }
            Expr::Object(object) => {
                for prop in &object.props {
                    match prop {
                        Prop::KeyValue(kv) => {
                            self.visit_prop_key(&kv.key);
                            self.visit_expr(&kv.value);
                        }
                        // `{x}` reads the variable `x`.
                        Prop::Shorthand(ident) => self.reference(ident),
                        Prop::Method(method) => {
                            self.visit_prop_key(&method.key);
                            self.visit_function(&method.function, FunctionRole::Method);
                        }
                        Prop::Spread(spread) => {
                            if let Some(arg) = &spread.arg {
                                self.visit_expr(arg);
                            }
                        }
                    }
                }
            }
            Expr::Function(function) => self.visit_function(function, FunctionRole::Expression),
            Expr::Arrow(arrow) => self.visit_arrow(arrow),
            Expr::Class(class) => self.visit_class(class),
            Expr::Unary(unary) => {
                if let Some(arg) = &unary.arg {
                    self.visit_expr(arg);
                }
            }
            Expr::Binary(binary) => {
                self.visit_expr(&binary.left);
                self.visit_expr(&binary.right);
            }
            Expr::Assign(assign) => {
                self.visit_pattern(&assign.left, None);
                self.visit_expr(&assign.right);
            }
            Expr::Cond(cond) => {
                self.visit_expr(&cond.test);
                self.visit_expr(&cond.consequent);
                self.visit_expr(&cond.alternate);
            }
            Expr::Call(call) => {
                self.visit_expr(&call.callee);
                for arg in &call.args {
                    self.visit_expr(arg);
                }
            }
            Expr::Member(member) => {
                self.visit_expr(&member.object);
                // `.name` and `.#name` are property slots, not variables.
                if let MemberProp::Computed(index) = &member.property {
                    self.visit_expr(index);
                }
            }
            Expr::Seq(seq) => {
                for e in &seq.exprs {
                    self.visit_expr(e);
                }
            }
            Expr::Paren(paren) => self.visit_expr(&paren.expr),
            Expr::Bad(bad) => {
                for e in &bad.items {
                    self.visit_expr(e);
                }
            }
        }
    }

    /// Visits a binding pattern. With `kind` the leaf identifiers are declarations;
    /// without it the pattern is an assignment target and its identifiers are reads.
    fn visit_pattern(&mut self, pattern: &Pattern, kind: Option<BindingKind>) {
        match pattern {
            Pattern::Ident(ident) => match kind {
                Some(kind) => self.declare(ident, kind),
                None => self.reference(ident),
            },
            Pattern::Object(object) => {
                for prop in &object.props {
                    match prop {
                        ObjectPatProp::KeyValue(kv) => {
                            self.visit_prop_key(&kv.key);
                            self.visit_pattern(&kv.value, kind);
                        }
                        ObjectPatProp::Shorthand(inner) => self.visit_pattern(inner, kind),
                        ObjectPatProp::Rest(rest) => self.visit_pattern(&rest.arg, kind),
                    }
                }
            }
            Pattern::Array(array) => {
                for element in &array.elements {
                    self.visit_pattern(element, kind);
                }
            }
            Pattern::Rest(rest) => self.visit_pattern(&rest.arg, kind),
            Pattern::Assign(assign) => {
                self.visit_pattern(&assign.left, kind);
                self.visit_expr(&assign.right);
            }
            Pattern::Expr(expr) => self.visit_expr(expr),
        }
    }
}
