//! Expression lowering

use tree_sitter::Node as TSNode;

use crate::ir::js_node::{
    ArrayLit, ArrowBody, ArrowFunction, AssignExpr, BadExpr, BinaryExpr, CallExpr, CondExpr, Expr,
    Ident, KeyValueProp, LitKind, Literal, MemberExpr, MemberProp, NodeKind, ObjectLit,
    ParenExpr, Pattern, PrivateName, Prop, PropKey, SeqExpr, Span, TaggedTemplate, TemplateLit, Token,
    UnaryExpr,
};

use super::super::helpers::{first_named, has_token, named_children, span_of, token_child};
use super::{Lowerer, empty_block, missing_expr};

impl<'a> Lowerer<'a> {
    pub(super) fn expr(&self, node: TSNode) -> Expr {
        let span = span_of(node);
        match node.kind() {
            "identifier" | "undefined" | "shorthand_property_identifier" => {
                Expr::Ident(self.ident(node))
            }
            "number" => Expr::Lit(self.literal(node, LitKind::Number)),
            "string" => Expr::Lit(self.literal(node, LitKind::String)),
            "regex" => Expr::Lit(self.literal(node, LitKind::RegExp)),
            "true" | "false" => Expr::Lit(self.literal(node, LitKind::Bool)),
            "null" => Expr::Lit(self.literal(node, LitKind::Null)),
            "template_string" => Expr::Template(self.template(node)),
            "this" => Expr::This(Token { span, kind: NodeKind::ThisExpression }),
            "super" => Expr::Super(Token { span, kind: NodeKind::SuperExpression }),
            "meta_property" | "import" => Expr::Meta(Token { span, kind: NodeKind::MetaProperty }),
            "array" => Expr::Array(ArrayLit {
                span,
                elements: named_children(node).into_iter().map(|e| self.expr(e)).collect(),
            }),
            "object" => Expr::Object(self.object(node)),
            "function_expression" | "function" | "generator_function" => {
                Expr::Function(Box::new(self.function(node, false)))
            }
            "arrow_function" => Expr::Arrow(Box::new(self.arrow(node))),
            "class" => Expr::Class(Box::new(self.class(node, false))),
            "unary_expression" => self.unary(
                node,
                NodeKind::UnaryExpression,
                node.child_by_field_name("argument"),
            ),
            "update_expression" => {
                let argument = node.child_by_field_name("argument");
                let operator = node.child_by_field_name("operator");
                let prefix = match (operator, argument) {
                    (Some(op), Some(arg)) => op.start_byte() < arg.start_byte(),
                    _ => true,
                };
                Expr::Unary(Box::new(UnaryExpr {
                    span,
                    kind: NodeKind::UpdateExpression,
                    op: operator.map(|o| self.text(o).to_string()).unwrap_or_default(),
                    prefix,
                    arg: argument.map(|a| self.expr(a)),
                }))
            }
            "await_expression" => self.unary(node, NodeKind::AwaitExpression, first_named(node)),
            "yield_expression" => self.unary(node, NodeKind::YieldExpression, first_named(node)),
            "spread_element" => Expr::Unary(Box::new(self.spread(node))),
            "binary_expression" => Expr::Binary(Box::new(BinaryExpr {
                span,
                op: node
                    .child_by_field_name("operator")
                    .map(|o| self.text(o).to_string())
                    .unwrap_or_default(),
                left: self.field_expr(node, "left"),
                right: self.field_expr(node, "right"),
            })),
            "assignment_expression" | "augmented_assignment_expression" => {
                let op = if node.kind() == "assignment_expression" {
                    "=".to_string()
                } else {
                    node.child_by_field_name("operator")
                        .map(|o| self.text(o).to_string())
                        .unwrap_or_default()
                };
                Expr::Assign(Box::new(AssignExpr {
                    span,
                    op,
                    left: node
                        .child_by_field_name("left")
                        .map(|l| self.pattern(l))
                        .unwrap_or_else(|| Pattern::Expr(Box::new(missing_expr()))),
                    right: self.field_expr(node, "right"),
                }))
            }
            "ternary_expression" => Expr::Cond(Box::new(CondExpr {
                span,
                test: self.field_expr(node, "condition"),
                consequent: self.field_expr(node, "consequence"),
                alternate: self.field_expr(node, "alternative"),
            })),
            "call_expression" => self.call(node),
            "new_expression" => Expr::Call(Box::new(CallExpr {
                span,
                callee: self.field_expr(node, "constructor"),
                args: node
                    .child_by_field_name("arguments")
                    .map(|a| self.arguments(a))
                    .unwrap_or_default(),
                is_new: true,
                optional: false,
            })),
            "member_expression" => {
                let property = match node.child_by_field_name("property") {
                    Some(p) if p.kind() == "private_property_identifier" => {
                        MemberProp::Private(self.private_name(p))
                    }
                    Some(p) => MemberProp::Ident(self.ident(p)),
                    None => MemberProp::Ident(Ident::new(Span::default(), "")),
                };
                Expr::Member(Box::new(MemberExpr {
                    span,
                    object: self.field_expr(node, "object"),
                    property,
                    optional: is_optional(node),
                }))
            }
            "subscript_expression" => Expr::Member(Box::new(MemberExpr {
                span,
                object: self.field_expr(node, "object"),
                property: MemberProp::Computed(self.field_expr(node, "index")),
                optional: is_optional(node),
            })),
            "sequence_expression" => {
                let mut exprs = Vec::new();
                self.flatten_sequence(node, &mut exprs);
                Expr::Seq(SeqExpr { span, exprs })
            }
            "parenthesized_expression" => Expr::Paren(Box::new(ParenExpr {
                span,
                expr: first_named(node).map(|e| self.expr(e)).unwrap_or_else(missing_expr),
            })),
            _ => {
                // ERROR regions and constructs without a dedicated node (JSX and
                // friends) keep their recoverable sub-expressions.
                let items = named_children(node)
                    .into_iter()
                    .filter(|child| {
                        !matches!(
                            child.kind(),
                            "property_identifier" | "private_property_identifier" | "statement_identifier"
                        )
                    })
                    .map(|child| self.expr(child))
                    .collect();
                Expr::Bad(BadExpr { span, items })
            }
        }
    }

    pub(super) fn field_expr(&self, node: TSNode, field: &str) -> Expr {
        node.child_by_field_name(field).map(|e| self.expr(e)).unwrap_or_else(missing_expr)
    }

    /// Field expression with a surrounding `( ... )` stripped, as in `if (...)`.
    pub(super) fn condition(&self, node: TSNode, field: &str) -> Expr {
        match node.child_by_field_name(field) {
            Some(cond) if cond.kind() == "parenthesized_expression" => {
                first_named(cond).map(|e| self.expr(e)).unwrap_or_else(missing_expr)
            }
            Some(cond) => self.expr(cond),
            None => missing_expr(),
        }
    }

    fn literal(&self, node: TSNode, kind: LitKind) -> Literal {
        Literal { span: span_of(node), kind, raw: self.text(node).to_string() }
    }

    fn private_name(&self, node: TSNode) -> PrivateName {
        PrivateName { span: span_of(node), name: self.text(node).to_string() }
    }

    fn template(&self, node: TSNode) -> TemplateLit {
        TemplateLit {
            span: span_of(node),
            exprs: named_children(node)
                .into_iter()
                .filter(|c| c.kind() == "template_substitution")
                .filter_map(first_named)
                .map(|e| self.expr(e))
                .collect(),
        }
    }

    fn unary(&self, node: TSNode, kind: NodeKind, arg: Option<TSNode>) -> Expr {
        let op = match kind {
            NodeKind::AwaitExpression => "await".to_string(),
            NodeKind::YieldExpression if has_token(node, "*") => "yield*".to_string(),
            NodeKind::YieldExpression => "yield".to_string(),
            _ => node
                .child_by_field_name("operator")
                .map(|o| self.text(o).to_string())
                .unwrap_or_default(),
        };
        Expr::Unary(Box::new(UnaryExpr {
            span: span_of(node),
            kind,
            op,
            prefix: true,
            arg: arg.map(|a| self.expr(a)),
        }))
    }

    pub(super) fn spread(&self, node: TSNode) -> UnaryExpr {
        UnaryExpr {
            span: span_of(node),
            kind: NodeKind::SpreadElement,
            op: "...".to_string(),
            prefix: true,
            arg: Some(first_named(node).map(|e| self.expr(e)).unwrap_or_else(missing_expr)),
        }
    }

    fn call(&self, node: TSNode) -> Expr {
        let span = span_of(node);
        let callee = self.field_expr(node, "function");
        match node.child_by_field_name("arguments") {
            Some(args) if args.kind() == "template_string" => {
                Expr::TaggedTemplate(Box::new(TaggedTemplate { span, tag: callee, quasi: self.template(args) }))
            }
            args => Expr::Call(Box::new(CallExpr {
                span,
                callee,
                args: args.map(|a| self.arguments(a)).unwrap_or_default(),
                is_new: false,
                optional: is_optional(node),
            })),
        }
    }

    fn arguments(&self, node: TSNode) -> Vec<Expr> {
        named_children(node).into_iter().map(|a| self.expr(a)).collect()
    }

    fn flatten_sequence(&self, node: TSNode, out: &mut Vec<Expr>) {
        for child in named_children(node) {
            if child.kind() == "sequence_expression" {
                self.flatten_sequence(child, out);
            } else {
                out.push(self.expr(child));
            }
        }
    }

    fn arrow(&self, node: TSNode) -> ArrowFunction {
        let params = match node.child_by_field_name("parameter") {
            Some(param) => vec![self.pattern(param)],
            None => node
                .child_by_field_name("parameters")
                .map(|p| self.params(p))
                .unwrap_or_default(),
        };
        let body = match node.child_by_field_name("body") {
            Some(body) if body.kind() == "statement_block" => ArrowBody::Block(self.block(body)),
            Some(body) => ArrowBody::Expr(Box::new(self.expr(body))),
            None => ArrowBody::Block(empty_block()),
        };
        ArrowFunction { span: span_of(node), params, body, is_async: has_token(node, "async") }
    }

    fn object(&self, node: TSNode) -> ObjectLit {
        let props = named_children(node)
            .into_iter()
            .filter_map(|child| match child.kind() {
                "pair" => Some(Prop::KeyValue(KeyValueProp {
                    span: span_of(child),
                    key: child
                        .child_by_field_name("key")
                        .map(|k| self.prop_key(k))
                        .unwrap_or_else(|| PropKey::Computed(Box::new(missing_expr()))),
                    value: self.field_expr(child, "value"),
                })),
                "shorthand_property_identifier" => Some(Prop::Shorthand(self.ident(child))),
                "method_definition" => Some(Prop::Method(self.method(child))),
                "spread_element" => Some(Prop::Spread(self.spread(child))),
                _ => None,
            })
            .collect();
        ObjectLit { span: span_of(node), props }
    }

    pub(super) fn prop_key(&self, node: TSNode) -> PropKey {
        match node.kind() {
            "property_identifier" | "identifier" => PropKey::Ident(self.ident(node)),
            "private_property_identifier" => PropKey::Private(self.private_name(node)),
            "string" => PropKey::Str(self.literal(node, LitKind::String)),
            "number" => PropKey::Num(self.literal(node, LitKind::Number)),
            "computed_property_name" => PropKey::Computed(Box::new(
                first_named(node).map(|e| self.expr(e)).unwrap_or_else(missing_expr),
            )),
            _ => PropKey::Ident(self.ident(node)),
        }
    }
}

/// `?.` marks the access as optional, whether exposed as a field, a named node or a token.
fn is_optional(node: TSNode) -> bool {
    node.child_by_field_name("optional_chain").is_some()
        || named_children(node).iter().any(|c| c.kind() == "optional_chain")
        || token_child(node, &["?."]).is_some()
}
