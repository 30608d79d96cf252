//! Merging completion lists from several sources
//!
//! A REPL answers from the static analysis, from module aliases and from the live
//! runtime. When the same label comes from more than one source, the entry from the
//! source with the lowest priority number is kept whole.
//!
//! Output order:
//! 1. Source priority (static, then module alias, then runtime)
//! 2. Label, case-insensitively

use rustc_hash::FxHashMap;
use tracing::debug;

use super::candidates::CompletionCandidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CandidateSource {
    Static,
    ModuleAlias,
    Runtime,
}

impl CandidateSource {
    pub fn priority(&self) -> u8 {
        match self {
            CandidateSource::Static => 0,
            CandidateSource::ModuleAlias => 1,
            CandidateSource::Runtime => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedCandidate {
    pub candidate: CompletionCandidate,
    pub source: CandidateSource,
    pub priority: u8,
}

/// Merges candidate lists; each label appears once.
pub fn merge_ranked<I>(sources: I) -> Vec<RankedCandidate>
where
    I: IntoIterator<Item = (CandidateSource, Vec<CompletionCandidate>)>,
{
    let mut best: FxHashMap<String, RankedCandidate> = FxHashMap::default();
    for (source, candidates) in sources {
        let priority = source.priority();
        for candidate in candidates {
            match best.get(&candidate.label) {
                Some(existing) if existing.priority <= priority => {}
                _ => {
                    best.insert(candidate.label.clone(), RankedCandidate { candidate, source, priority });
                }
            }
        }
    }

    let mut ranked: Vec<RankedCandidate> = best.into_values().collect();
    ranked.sort_by_cached_key(|r| (r.priority, r.candidate.label.to_lowercase(), r.candidate.label.clone()));
    debug!("Merged {} ranked candidates", ranked.len());
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::candidates::CandidateKind;

    fn candidate(label: &str, detail: &str) -> CompletionCandidate {
        CompletionCandidate::new(label, CandidateKind::Variable, detail)
    }

    #[test]
    fn test_lower_priority_wins_whole_entry() {
        let merged = merge_ranked(vec![
            (CandidateSource::Runtime, vec![candidate("fetch", "runtime"), candidate("x", "runtime")]),
            (CandidateSource::Static, vec![candidate("x", "let")]),
        ]);
        let x = merged.iter().find(|r| r.candidate.label == "x").unwrap();
        assert_eq!(x.source, CandidateSource::Static);
        assert_eq!(x.candidate.detail, "let");
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_sorted_by_priority_then_label() {
        let merged = merge_ranked(vec![
            (CandidateSource::Runtime, vec![candidate("alpha", "")]),
            (CandidateSource::ModuleAlias, vec![candidate("fs", ""), candidate("Path", "")]),
            (CandidateSource::Static, vec![candidate("zeta", ""), candidate("Beta", "")]),
        ]);
        let labels: Vec<&str> = merged.iter().map(|r| r.candidate.label.as_str()).collect();
        assert_eq!(labels, vec!["Beta", "zeta", "fs", "Path", "alpha"]);
    }

    #[test]
    fn test_first_entry_kept_within_same_source() {
        let merged = merge_ranked(vec![(
            CandidateSource::Static,
            vec![candidate("dup", "first"), candidate("dup", "second")],
        )]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].candidate.detail, "first");
    }
}
