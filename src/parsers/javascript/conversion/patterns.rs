//! Binding and assignment-target lowering

use tree_sitter::Node as TSNode;

use crate::ir::js_node::{
    ArrayPat, AssignPat, ObjectPat, ObjectPatProp, PatProp, Pattern, PropKey, RestPat,
};

use super::super::helpers::{first_named, named_children, span_of};
use super::{Lowerer, missing_expr};

impl<'a> Lowerer<'a> {
    pub(super) fn pattern(&self, node: TSNode) -> Pattern {
        match node.kind() {
            "identifier" | "shorthand_property_identifier_pattern" | "undefined" => {
                Pattern::Ident(self.ident(node))
            }
            "object_pattern" => Pattern::Object(ObjectPat {
                span: span_of(node),
                props: named_children(node)
                    .into_iter()
                    .filter_map(|child| self.object_pattern_prop(child))
                    .collect(),
            }),
            "array_pattern" => Pattern::Array(ArrayPat {
                span: span_of(node),
                elements: named_children(node).into_iter().map(|e| self.pattern(e)).collect(),
            }),
            "assignment_pattern" | "object_assignment_pattern" => {
                Pattern::Assign(Box::new(self.assign_pattern(node)))
            }
            "rest_pattern" => Pattern::Rest(Box::new(self.rest_pattern(node))),
            _ => Pattern::Expr(Box::new(self.expr(node))),
        }
    }

    fn object_pattern_prop(&self, node: TSNode) -> Option<ObjectPatProp> {
        let prop = match node.kind() {
            "pair_pattern" => ObjectPatProp::KeyValue(PatProp {
                span: span_of(node),
                key: node
                    .child_by_field_name("key")
                    .map(|k| self.prop_key(k))
                    .unwrap_or_else(|| PropKey::Computed(Box::new(missing_expr()))),
                value: node
                    .child_by_field_name("value")
                    .map(|v| self.pattern(v))
                    .unwrap_or_else(|| Pattern::Expr(Box::new(missing_expr()))),
            }),
            "shorthand_property_identifier_pattern" => {
                ObjectPatProp::Shorthand(Pattern::Ident(self.ident(node)))
            }
            "object_assignment_pattern" => {
                ObjectPatProp::Shorthand(Pattern::Assign(Box::new(self.assign_pattern(node))))
            }
            "rest_pattern" => ObjectPatProp::Rest(self.rest_pattern(node)),
            _ => return None,
        };
        Some(prop)
    }

    fn assign_pattern(&self, node: TSNode) -> AssignPat {
        AssignPat {
            span: span_of(node),
            left: node
                .child_by_field_name("left")
                .map(|l| self.pattern(l))
                .unwrap_or_else(|| Pattern::Expr(Box::new(missing_expr()))),
            right: self.field_expr(node, "right"),
        }
    }

    fn rest_pattern(&self, node: TSNode) -> RestPat {
        RestPat {
            span: span_of(node),
            arg: first_named(node)
                .map(|a| self.pattern(a))
                .unwrap_or_else(|| Pattern::Expr(Box::new(missing_expr()))),
        }
    }
}
