//! One complete analysis of a document
//!
//! Source text, the typed AST's index with its scope resolution attached, the CST
//! snapshot and syntax diagnostics, all from a single tree-sitter parse.

use tracing::{debug, info_span};

use crate::completion::{CompletionCandidate, CompletionContext, extract_context, resolve_candidates};
use crate::config::AnalysisConfig;
use crate::error::ParseError;
use crate::ir::index::{Index, build_index};
use crate::ir::scope::Resolution;
use crate::ir::transforms::scope_resolver::resolve;
use crate::parsers::javascript::{ParseDiagnostic, lower_tree, parse_tree};
use crate::snapshot::{SnapshotNode, snapshot_tree};

#[derive(Debug)]
pub struct Analysis {
    sequence: u64,
    source: String,
    index: Index,
    snapshot: SnapshotNode,
    diagnostics: Vec<ParseDiagnostic>,
    max_results: usize,
}

impl Analysis {
    /// Parses and analyses `source`. `sequence` tags the result for staleness checks.
    pub fn build(source: &str, sequence: u64, config: &AnalysisConfig) -> Result<Self, ParseError> {
        let _span = info_span!("analysis", sequence, bytes = source.len()).entered();
        let tree = parse_tree(source)?;
        let parsed = lower_tree(&tree, source);
        let snapshot = snapshot_tree(&tree, source.as_bytes(), config.snapshot_max_depth);

        let mut index = build_index(&parsed.program, source);
        let resolution = resolve(&parsed.program, &index);
        index.attach_resolution(resolution);

        debug!(
            "Analysis #{}: {} nodes, {} diagnostics",
            sequence,
            index.len(),
            parsed.diagnostics.len()
        );
        Ok(Self {
            sequence,
            source: source.to_string(),
            index,
            snapshot,
            diagnostics: parsed.diagnostics,
            max_results: config.completion.max_results,
        })
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Mutable access for the `expanded` display flags.
    pub fn index_mut(&mut self) -> &mut Index {
        &mut self.index
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.index.resolution()
    }

    pub fn snapshot(&self) -> &SnapshotNode {
        &self.snapshot
    }

    pub fn diagnostics(&self) -> &[ParseDiagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty() || self.snapshot.has_error()
    }

    /// Context and candidates at 0-based `(row, col)`, capped at the configured limit.
    pub fn complete_at(
        &self,
        row: usize,
        col: usize,
        secondary: Option<&SnapshotNode>,
    ) -> (CompletionContext, Vec<CompletionCandidate>) {
        let context = extract_context(&self.snapshot, &self.source, row, col);
        let mut candidates = resolve_candidates(&context, &self.index, secondary);
        candidates.truncate(self.max_results);
        (context, candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::ContextKind;

    fn analyse(source: &str) -> Analysis {
        Analysis::build(source, 1, &AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn test_bundle_is_consistent() {
        let analysis = analyse("let a = 1;\nfunction f(b) { return a + b; }");
        assert_eq!(analysis.sequence(), 1);
        assert!(!analysis.has_errors());
        let resolution = analysis.resolution().unwrap();
        assert_eq!(resolution.bindings.len(), 3);
        assert!(resolution.unresolved.is_empty());
        assert_eq!(analysis.snapshot().kind, "program");
    }

    #[test]
    fn test_complete_at_object_keys() {
        let source = "const obj = {foo:1,bar:2}; obj.";
        let analysis = analyse(source);
        let (context, candidates) = analysis.complete_at(0, source.len(), None);
        assert_eq!(context.kind, ContextKind::Property);
        assert_eq!(context.base_expr, "obj");
        let labels: Vec<&str> = candidates.iter().map(|c| c.label.as_str()).collect();
        for expected in ["foo", "bar", "hasOwnProperty", "toString", "valueOf"] {
            assert!(labels.contains(&expected), "missing {expected} in {labels:?}");
        }
    }

    #[test]
    fn test_max_results_caps_candidates() {
        let mut config = AnalysisConfig::default();
        config.completion.max_results = 2;
        let analysis = Analysis::build("Math.", 1, &config).unwrap();
        let (_, candidates) = analysis.complete_at(0, 5, None);
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_syntax_errors_are_reported_not_fatal() {
        let analysis = analyse("let x = ;\nx;");
        assert!(analysis.has_errors());
        assert!(analysis.index().len() > 1);
    }
}
