//! Static member tables for JavaScript built-in globals
//!
//! Property completion on a well-known global (`console.`, `Math.`) answers from these
//! tables without consulting the resolver.

use super::candidates::{CandidateKind, CompletionCandidate};

/// Members every object inherits from `Object.prototype`.
pub const OBJECT_FLOOR: &[&str] = &["hasOwnProperty", "toString", "valueOf"];

/// Globals offered in identifier position even when nothing declares them.
pub const WELL_KNOWN_GLOBALS: &[&str] = &[
    "Array",
    "Boolean",
    "Date",
    "Error",
    "JSON",
    "Map",
    "Math",
    "Number",
    "Object",
    "Promise",
    "RegExp",
    "Set",
    "String",
    "Symbol",
    "console",
    "globalThis",
    "isNaN",
    "parseFloat",
    "parseInt",
    "undefined",
];

pub const ARRAY_METHODS: &[&str] = &[
    "at",
    "concat",
    "every",
    "filter",
    "find",
    "findIndex",
    "flat",
    "flatMap",
    "forEach",
    "includes",
    "indexOf",
    "join",
    "keys",
    "length",
    "map",
    "pop",
    "push",
    "reduce",
    "reverse",
    "shift",
    "slice",
    "some",
    "sort",
    "splice",
    "unshift",
];

const CONSOLE: &[&str] = &[
    "log", "error", "warn", "info", "debug", "trace", "table", "dir", "group", "groupEnd", "time",
    "timeEnd", "assert", "count", "clear",
];

const MATH: &[&str] = &[
    "abs", "ceil", "cos", "exp", "floor", "hypot", "log", "max", "min", "pow", "random", "round",
    "sign", "sin", "sqrt", "tan", "trunc",
];
const MATH_CONSTANTS: &[&str] = &["E", "LN2", "LN10", "PI", "SQRT2"];

const JSON: &[&str] = &["parse", "stringify"];

const OBJECT: &[&str] = &[
    "assign", "create", "defineProperty", "entries", "freeze", "fromEntries", "getPrototypeOf",
    "is", "keys", "values",
];

const ARRAY_STATICS: &[&str] = &["from", "isArray", "of"];

const PROMISE: &[&str] = &["all", "allSettled", "any", "race", "reject", "resolve"];

const NUMBER: &[&str] = &["isFinite", "isInteger", "isNaN", "isSafeInteger", "parseFloat", "parseInt"];
const NUMBER_CONSTANTS: &[&str] =
    &["EPSILON", "MAX_SAFE_INTEGER", "MAX_VALUE", "MIN_SAFE_INTEGER", "MIN_VALUE", "NaN"];

const STRING: &[&str] = &["fromCharCode", "fromCodePoint", "raw"];

const DATE: &[&str] = &["now", "parse", "UTC"];

/// Member table of a well-known global, or `None` if `name` is not one.
pub fn global_members(name: &str) -> Option<Vec<CompletionCandidate>> {
    let (methods, constants): (&[&str], &[&str]) = match name {
        "console" => (CONSOLE, &[]),
        "Math" => (MATH, MATH_CONSTANTS),
        "JSON" => (JSON, &[]),
        "Object" => (OBJECT, &[]),
        "Array" => (ARRAY_STATICS, &[]),
        "Promise" => (PROMISE, &[]),
        "Number" => (NUMBER, NUMBER_CONSTANTS),
        "String" => (STRING, &[]),
        "Date" => (DATE, &[]),
        _ => return None,
    };
    let mut members = Vec::with_capacity(methods.len() + constants.len());
    members.extend(methods.iter().map(|m| CompletionCandidate::new(*m, CandidateKind::Method, name)));
    members.extend(constants.iter().map(|c| CompletionCandidate::new(*c, CandidateKind::Property, name)));
    Some(members)
}

pub fn array_methods() -> Vec<CompletionCandidate> {
    ARRAY_METHODS
        .iter()
        .map(|m| {
            let kind = if *m == "length" { CandidateKind::Property } else { CandidateKind::Method };
            CompletionCandidate::new(*m, kind, "Array.prototype")
        })
        .collect()
}

pub fn object_floor() -> impl Iterator<Item = CompletionCandidate> {
    OBJECT_FLOOR.iter().map(|m| CompletionCandidate::new(*m, CandidateKind::Method, "Object.prototype"))
}

pub fn well_known_globals() -> impl Iterator<Item = CompletionCandidate> {
    WELL_KNOWN_GLOBALS.iter().map(|g| {
        let kind = match *g {
            "isNaN" | "parseFloat" | "parseInt" => CandidateKind::Function,
            _ => CandidateKind::Variable,
        };
        CompletionCandidate::new(*g, kind, "global")
    })
}

const KEYWORDS: &[&str] = &[
    "async", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "export", "extends", "false", "finally", "for", "function",
    "if", "import", "in", "instanceof", "let", "new", "null", "of", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Reserved words, as a static completion source.
pub fn keyword_candidates() -> Vec<CompletionCandidate> {
    KEYWORDS.iter().map(|k| CompletionCandidate::new(*k, CandidateKind::Keyword, "keyword")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_table() {
        let members = global_members("console").unwrap();
        assert_eq!(members.len(), 15);
        assert!(members.iter().any(|m| m.label == "log" && m.kind == CandidateKind::Method));
    }

    #[test]
    fn test_unknown_global_has_no_table() {
        assert!(global_members("window").is_none());
        assert!(global_members("obj").is_none());
    }

    #[test]
    fn test_math_has_constants() {
        let members = global_members("Math").unwrap();
        let pi = members.iter().find(|m| m.label == "PI").unwrap();
        assert_eq!(pi.kind, CandidateKind::Property);
        assert_eq!(pi.detail, "Math");
    }
}
