//! Dispatch trace types for debugging matcher resolution.
//!
//! Trace types mirror the dispatch loop of
//! [`MatcherRegistry::match_url`](crate::MatcherRegistry::match_url) but
//! capture what happened to each candidate. Use
//! [`match_url_with_trace`](crate::MatcherRegistry::match_url_with_trace)
//! for full visibility into why a URL did or did not match.

use crate::{MatchError, MatchResult};

/// Which candidate group an entry was drawn from.
///
/// The group order — exact host, base domain, scheme, wildcard — is the
/// dispatch contract; priority sorting applies only within one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateGroup {
    /// Registered under the context's exact hostname.
    ExactHost,
    /// Registered under the base domain of the context's hostname.
    BaseDomain,
    /// Registered for the context's non-HTTP URI scheme.
    Scheme,
    /// No declared domains; consulted last.
    Wildcard,
}

impl CandidateGroup {
    /// Short lowercase label (`"exact-host"`, `"base-domain"`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExactHost => "exact-host",
            Self::BaseDomain => "base-domain",
            Self::Scheme => "scheme",
            Self::Wildcard => "wildcard",
        }
    }
}

impl std::fmt::Display for CandidateGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened when one candidate was inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// `can_match` returned `false`; `parse` was never called.
    Skipped,
    /// `parse` succeeded — this candidate won and dispatch stopped.
    Parsed,
    /// `parse` failed non-fatally; dispatch moved to the next candidate.
    Failed(MatchError),
    /// `parse` failed fatally; dispatch aborted here.
    Fatal(MatchError),
}

/// One candidate's inspection in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep {
    /// Name of the inspected matcher.
    pub matcher: String,
    /// Group the candidate was drawn from.
    pub group: CandidateGroup,
    /// Outcome of the inspection.
    pub outcome: StepOutcome,
}

/// A dispatch result plus the path taken to reach it.
///
/// `result` always equals what `match_url` returns for the same input.
/// Steps stop at the winning candidate (or the fatal error); candidates that
/// were never reached produce no step.
#[derive(Debug)]
pub struct MatchTrace {
    /// The final result (identical to what `match_url` returns).
    pub result: MatchResult,
    /// One step per candidate inspected, in dispatch order.
    pub steps: Vec<TraceStep>,
}

impl MatchTrace {
    /// Returns `true` if dispatch found a winner.
    #[must_use]
    pub fn matched(&self) -> bool {
        self.result.is_ok()
    }
}
