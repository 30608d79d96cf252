pub mod scope_resolver;
pub mod sexpr_printer;
