//! `MatcherRegistry` — Indexed dispatch from URLs to matchers
//!
//! The registry holds matchers in four indexes: domain map, scheme map, name
//! map, and a wildcard list. Dispatch resolves candidates in four fixed
//! groups — exact host, base domain, URI scheme, wildcard — and priority
//! sorting applies only *within* a group. The grouped order is a hard
//! contract (custom resolvers observe it); it is never re-sorted globally.
//!
//! A registry is immutable after construction. [`with`](MatcherRegistry::with)
//! and [`without`](MatcherRegistry::without) rebuild every index from scratch
//! and return a new instance: composition happens at configuration time, not
//! per request, so correctness beats incremental index maintenance.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use crate::{
    base_domain, CandidateGroup, EmbedOptions, EmbedOutput, MatchContext, MatchError, MatchResult,
    MatchTrace, Matcher, MediaData, StepOutcome, TraceStep,
};

/// Custom winner selection over the ordered candidate list.
///
/// Receives the candidates in dispatch order plus the raw input, and returns
/// at most one winner. When a resolver declines, dispatch fails with
/// `NoMatch` — there is no fallback iteration.
pub type Resolver = dyn Fn(&[Arc<dyn Matcher>], &str) -> Option<Arc<dyn Matcher>> + Send + Sync;

/// A successful dispatch: the winning matcher and its parsed data.
#[derive(Debug, Clone)]
pub struct MatchOk {
    /// The matcher that claimed the input.
    pub matcher: Arc<dyn Matcher>,
    /// The parsed media identity.
    pub data: MediaData,
}

/// A registered matcher with its priority and registration order.
///
/// Immutable after registration. Higher priority wins within a candidate
/// group; ties keep registration order (stable sort).
#[derive(Clone)]
pub struct MatcherEntry {
    matcher: Arc<dyn Matcher>,
    priority: i32,
    seq: usize,
}

impl MatcherEntry {
    /// The registered matcher.
    #[must_use]
    pub fn matcher(&self) -> &Arc<dyn Matcher> {
        &self.matcher
    }

    /// The matcher's unique name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.matcher.name()
    }

    /// Registration priority (default 0, higher wins ties within a group).
    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }
}

impl Debug for MatcherEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatcherEntry")
            .field("name", &self.name())
            .field("priority", &self.priority)
            .field("seq", &self.seq)
            .finish()
    }
}

/// Builder for a [`MatcherRegistry`].
///
/// Registration order matters: it is the tie-break within equal priorities,
/// and the last registration of a name wins.
pub struct RegistryBuilder {
    entries: Vec<(Arc<dyn Matcher>, i32)>,
    resolver: Option<Arc<Resolver>>,
}

impl RegistryBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            resolver: None,
        }
    }

    /// Register a matcher with default priority 0.
    #[must_use]
    pub fn matcher(self, matcher: impl Matcher + 'static) -> Self {
        self.matcher_arc(Arc::new(matcher), 0)
    }

    /// Register a matcher with an explicit priority.
    #[must_use]
    pub fn matcher_with_priority(self, matcher: impl Matcher + 'static, priority: i32) -> Self {
        self.matcher_arc(Arc::new(matcher), priority)
    }

    /// Register an already-shared matcher.
    #[must_use]
    pub fn matcher_arc(mut self, matcher: Arc<dyn Matcher>, priority: i32) -> Self {
        self.entries.push((matcher, priority));
        self
    }

    /// Install a custom [`Resolver`].
    #[must_use]
    pub fn resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&[Arc<dyn Matcher>], &str) -> Option<Arc<dyn Matcher>> + Send + Sync + 'static,
    {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Freeze into an immutable registry.
    #[must_use]
    pub fn build(self) -> MatcherRegistry {
        MatcherRegistry::from_parts(self.entries, self.resolver)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable, indexed dispatch structure.
///
/// Freely shareable: `Clone` copies index structure only (matchers are
/// `Arc`-shared), and a registry is `Send + Sync`.
#[derive(Clone)]
pub struct MatcherRegistry {
    /// All entries in registration order — the rebuild source of truth.
    entries: Vec<MatcherEntry>,
    by_domain: HashMap<String, Vec<MatcherEntry>>,
    by_scheme: HashMap<String, Vec<MatcherEntry>>,
    by_name: HashMap<String, MatcherEntry>,
    wildcards: Vec<MatcherEntry>,
    resolver: Option<Arc<Resolver>>,
}

impl MatcherRegistry {
    /// A registry with no matchers.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_parts(Vec::new(), None)
    }

    /// Start building a registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// A registry loaded with the built-in provider set.
    #[cfg(feature = "providers")]
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut builder = RegistryBuilder::new();
        for matcher in crate::providers::defaults() {
            builder = builder.matcher_arc(matcher, 0);
        }
        builder.build()
    }

    fn from_parts(list: Vec<(Arc<dyn Matcher>, i32)>, resolver: Option<Arc<Resolver>>) -> Self {
        // Name uniqueness: the last registration of a name wins, and the
        // earlier entry is dropped entirely.
        let mut pairs: Vec<(Arc<dyn Matcher>, i32)> = Vec::with_capacity(list.len());
        for (matcher, priority) in list {
            if let Some(pos) = pairs.iter().position(|(m, _)| m.name() == matcher.name()) {
                pairs.remove(pos);
            }
            pairs.push((matcher, priority));
        }
        let entries: Vec<MatcherEntry> = pairs
            .into_iter()
            .enumerate()
            .map(|(seq, (matcher, priority))| MatcherEntry {
                matcher,
                priority,
                seq,
            })
            .collect();

        let mut by_domain: HashMap<String, Vec<MatcherEntry>> = HashMap::new();
        let mut by_scheme: HashMap<String, Vec<MatcherEntry>> = HashMap::new();
        let mut by_name: HashMap<String, MatcherEntry> = HashMap::new();
        let mut wildcards: Vec<MatcherEntry> = Vec::new();

        for entry in &entries {
            by_name.insert(entry.name().to_owned(), entry.clone());
            match entry.matcher.domains() {
                Some(domains) => {
                    for domain in domains {
                        by_domain
                            .entry(domain.to_ascii_lowercase())
                            .or_default()
                            .push(entry.clone());
                    }
                }
                None => wildcards.push(entry.clone()),
            }
            for scheme in entry.matcher.schemes() {
                by_scheme
                    .entry(scheme.to_ascii_lowercase())
                    .or_default()
                    .push(entry.clone());
            }
        }

        for list in by_domain.values_mut() {
            sort_by_priority(list);
        }
        for list in by_scheme.values_mut() {
            sort_by_priority(list);
        }
        sort_by_priority(&mut wildcards);

        Self {
            entries,
            by_domain,
            by_scheme,
            by_name,
            wildcards,
            resolver,
        }
    }

    // ── Dispatch ─────────────────────────────────────────────────────────

    /// Match a raw URL/URI string.
    ///
    /// Builds a [`MatchContext`] (a parse failure short-circuits with its
    /// `ParseError`), then dispatches over the candidate groups. The first
    /// candidate whose `can_match` and `parse` both succeed wins; a fatal
    /// parse error aborts the search; exhaustion is `NoMatch`.
    pub fn match_url(&self, url: &str) -> MatchResult {
        let ctx = MatchContext::parse(url)?;
        self.match_context(&ctx)
    }

    /// Match a pre-built context.
    pub fn match_context(&self, ctx: &MatchContext) -> MatchResult {
        if let Some(resolver) = &self.resolver {
            let list: Vec<Arc<dyn Matcher>> = self
                .grouped_candidates(ctx)
                .into_iter()
                .map(|(entry, _)| entry.matcher.clone())
                .collect();
            let Some(winner) = resolver(&list, ctx.raw()) else {
                return Err(MatchError::no_match());
            };
            let data = winner.parse(ctx)?;
            return Ok(MatchOk {
                matcher: winner,
                data,
            });
        }

        for (entry, _) in self.grouped_candidates(ctx) {
            if !entry.matcher.can_match(ctx) {
                continue;
            }
            match entry.matcher.parse(ctx) {
                Ok(data) => {
                    return Ok(MatchOk {
                        matcher: entry.matcher.clone(),
                        data,
                    })
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(_) => {}
            }
        }
        Err(MatchError::no_match())
    }

    /// Match with a full dispatch trace.
    ///
    /// `trace.result` always equals what [`match_url`](Self::match_url)
    /// returns for the same input. With a custom resolver installed the
    /// candidate iteration is bypassed, so `steps` is empty.
    pub fn match_url_with_trace(&self, url: &str) -> MatchTrace {
        match MatchContext::parse(url) {
            Ok(ctx) => self.match_context_with_trace(&ctx),
            Err(err) => MatchTrace {
                result: Err(err),
                steps: Vec::new(),
            },
        }
    }

    /// Match a pre-built context with a full dispatch trace.
    pub fn match_context_with_trace(&self, ctx: &MatchContext) -> MatchTrace {
        if self.resolver.is_some() {
            return MatchTrace {
                result: self.match_context(ctx),
                steps: Vec::new(),
            };
        }

        let mut steps = Vec::new();
        for (entry, group) in self.grouped_candidates(ctx) {
            if !entry.matcher.can_match(ctx) {
                steps.push(TraceStep {
                    matcher: entry.name().to_owned(),
                    group,
                    outcome: StepOutcome::Skipped,
                });
                continue;
            }
            match entry.matcher.parse(ctx) {
                Ok(data) => {
                    steps.push(TraceStep {
                        matcher: entry.name().to_owned(),
                        group,
                        outcome: StepOutcome::Parsed,
                    });
                    return MatchTrace {
                        result: Ok(MatchOk {
                            matcher: entry.matcher.clone(),
                            data,
                        }),
                        steps,
                    };
                }
                Err(err) if err.is_fatal() => {
                    steps.push(TraceStep {
                        matcher: entry.name().to_owned(),
                        group,
                        outcome: StepOutcome::Fatal(err.clone()),
                    });
                    return MatchTrace {
                        result: Err(err),
                        steps,
                    };
                }
                Err(err) => {
                    steps.push(TraceStep {
                        matcher: entry.name().to_owned(),
                        group,
                        outcome: StepOutcome::Failed(err),
                    });
                }
            }
        }
        MatchTrace {
            result: Err(MatchError::no_match()),
            steps,
        }
    }

    /// The ordered candidate list for a context — the dispatch contract,
    /// observable. Exact host first, then base domain, then scheme (non-HTTP
    /// inputs only), then wildcards; deduplicated by name.
    #[must_use]
    pub fn candidates(&self, ctx: &MatchContext) -> Vec<MatcherEntry> {
        self.grouped_candidates(ctx)
            .into_iter()
            .map(|(entry, _)| entry)
            .collect()
    }

    fn grouped_candidates(&self, ctx: &MatchContext) -> Vec<(MatcherEntry, CandidateGroup)> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut out: Vec<(MatcherEntry, CandidateGroup)> = Vec::new();

        let mut push = |entry: &MatcherEntry, group: CandidateGroup| {
            if seen.insert(entry.name().to_owned()) {
                out.push((entry.clone(), group));
            }
        };

        if let Some(host) = ctx.host() {
            if let Some(list) = self.by_domain.get(host) {
                for entry in list {
                    push(entry, CandidateGroup::ExactHost);
                }
            }
            let base = base_domain(host);
            if base != host {
                if let Some(list) = self.by_domain.get(&base) {
                    for entry in list {
                        push(entry, CandidateGroup::BaseDomain);
                    }
                }
            }
        }

        if let Some(scheme) = ctx.scheme() {
            if scheme != "http" && scheme != "https" {
                if let Some(list) = self.by_scheme.get(scheme) {
                    for entry in list {
                        push(entry, CandidateGroup::Scheme);
                    }
                }
            }
        }

        for entry in &self.wildcards {
            push(entry, CandidateGroup::Wildcard);
        }

        out
    }

    // ── Convenience wrappers ─────────────────────────────────────────────

    /// The winning matcher's embed URL, or `None` on any failure.
    ///
    /// Error detail is discarded by design; call [`match_url`](Self::match_url)
    /// when the failure reason matters.
    #[must_use]
    pub fn embed_url(&self, url: &str, options: &EmbedOptions) -> Option<String> {
        let hit = self.match_url(url).ok()?;
        Some(hit.matcher.embed_url(&hit.data, options))
    }

    /// The winning matcher's structured output, or `None` on any failure.
    ///
    /// Error detail is discarded by design, as with [`embed_url`](Self::embed_url).
    #[must_use]
    pub fn output(&self, url: &str, options: &EmbedOptions) -> Option<EmbedOutput> {
        let hit = self.match_url(url).ok()?;
        Some(hit.matcher.output(&hit.data, options))
    }

    // ── Composition ──────────────────────────────────────────────────────

    /// A new registry with this matcher added at priority 0. An existing
    /// entry with the same name is replaced. The receiver is unchanged.
    #[must_use]
    pub fn with(&self, matcher: impl Matcher + 'static) -> Self {
        self.with_entry(Arc::new(matcher), 0)
    }

    /// A new registry with this matcher added at the given priority.
    #[must_use]
    pub fn with_entry(&self, matcher: Arc<dyn Matcher>, priority: i32) -> Self {
        let mut pairs = self.entry_pairs();
        pairs.push((matcher, priority));
        Self::from_parts(pairs, self.resolver.clone())
    }

    /// A new registry without the named matcher. The receiver is unchanged;
    /// an absent name yields an equivalent registry.
    #[must_use]
    pub fn without(&self, name: &str) -> Self {
        let pairs = self
            .entry_pairs()
            .into_iter()
            .filter(|(m, _)| m.name() != name)
            .collect();
        Self::from_parts(pairs, self.resolver.clone())
    }

    fn entry_pairs(&self) -> Vec<(Arc<dyn Matcher>, i32)> {
        self.entries
            .iter()
            .map(|e| (e.matcher.clone(), e.priority))
            .collect()
    }

    // ── Introspection ────────────────────────────────────────────────────

    /// All entries in registration order.
    #[must_use]
    pub fn list(&self) -> &[MatcherEntry] {
        &self.entries
    }

    /// Look up a matcher by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Matcher>> {
        self.by_name.get(name).map(|e| &e.matcher)
    }

    /// Returns `true` if a matcher with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Number of registered matchers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no matchers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered matcher names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

// The resolver closure is not Debug; summarize the index shape instead.
impl Debug for MatcherRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatcherRegistry")
            .field("matchers", &self.entries.len())
            .field("domains", &self.by_domain.len())
            .field("schemes", &self.by_scheme.len())
            .field("wildcards", &self.wildcards.len())
            .field("has_resolver", &self.resolver.is_some())
            .finish()
    }
}

/// Stable sort by priority descending; ties keep registration order.
fn sort_by_priority(list: &mut [MatcherEntry]) {
    list.sort_by(|a, b| b.priority.cmp(&a.priority));
}
