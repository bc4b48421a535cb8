//! embedo - media-URL recognition and embed generation
//!
//! Given an arbitrary media URL (YouTube, Vimeo, Spotify, ...), identify the
//! provider, extract its identifier, and produce an iframe-embeddable URL or
//! structured render output.
//!
//! # Architecture
//!
//! - [`MatchContext`] — Normalized input (host, scheme, path, query), built once per lookup
//! - [`Matcher`] — Provider contract: recognize, parse, render (trait object, stateless)
//! - [`PatternMatcher`] — Data-driven matcher: regexes + embed template, covers every built-in
//! - [`MatcherRegistry`] — Indexed dispatch: domain/scheme maps + wildcard list, immutable
//! - [`RegistryStore`] — Mutable holder with subscribe/notify for reactive consumers
//! - [`EmbedOutput`] — Structured render result (iframe spec, HTML blobs, script requests)
//!
//! # Key Design Insights
//!
//! 1. **Normalize once, match many**: a `MatchContext` is built a single time and
//!    shared across every candidate matcher.
//!
//! 2. **Indexed dispatch, grouped ordering**: candidates are resolved in four fixed
//!    groups — exact host, base domain, URI scheme, wildcard — with priority sorting
//!    applied only *within* a group. A subdomain-specific matcher beats a base-domain
//!    one by construction, not by global priority comparison.
//!
//! 3. **Errors are values**: every failure on the match path is a [`MatchError`]
//!    carrying a [`MatchErrorCode`] and a `fatal` flag. A fatal error aborts the
//!    candidate search; a non-fatal one moves to the next candidate.
//!
//! # Example
//!
//! ```
//! use embedo::prelude::*;
//!
//! let registry = MatcherRegistry::with_defaults();
//!
//! let hit = registry.match_url("https://youtu.be/dQw4w9WgXcQ").unwrap();
//! assert_eq!(hit.matcher.name(), "YouTube");
//! assert_eq!(hit.data.id, "dQw4w9WgXcQ");
//!
//! let embed = registry.embed_url("https://youtu.be/dQw4w9WgXcQ", &EmbedOptions::new());
//! assert_eq!(embed.as_deref(), Some("https://www.youtube.com/embed/dQw4w9WgXcQ"));
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod context;
mod matcher;
mod output;
mod pattern;
mod registry;
mod store;
mod trace;

#[cfg(feature = "providers")]
pub mod providers;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use context::{base_domain, host_matches, MatchContext};
pub use matcher::{EmbedOptions, Matcher, MediaData};
pub use output::{EmbedNode, EmbedOutput, IframeSpec, ScriptRequest};
pub use pattern::{PatternMatcher, PatternMatcherBuilder, UrlPattern};
pub use registry::{MatchOk, MatcherEntry, MatcherRegistry, RegistryBuilder, Resolver};
pub use store::{RegistryStore, Subscription};
pub use trace::{CandidateGroup, MatchTrace, StepOutcome, TraceStep};

#[cfg(feature = "serde")]
pub use pattern::PatternConfig;

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use embedo::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        CandidateGroup,
        EmbedNode,
        EmbedOptions,
        EmbedOutput,
        IframeSpec,
        MatchContext,
        MatchError,
        MatchErrorCode,
        MatchOk,
        MatchResult,
        MatchTrace,
        Matcher,
        MatcherEntry,
        MatcherRegistry,
        MediaData,
        PatternError,
        PatternMatcher,
        RegistryBuilder,
        RegistryStore,
        ScriptRequest,
        StepOutcome,
        TraceStep,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum accepted input length for [`MatchContext::parse`], in bytes.
///
/// Anything longer is rejected with a `ParseError` before any regex runs.
/// Media URLs are short; a multi-kilobyte "URL" is either garbage or an
/// attempted pathological input.
pub const MAX_INPUT_LENGTH: usize = 2048;

/// Maximum length for user-supplied match patterns.
///
/// Regex compilation is expensive even with the linear-time Rust `regex`
/// crate, and compiled program size grows with pattern length. Enforced by
/// [`UrlPattern::new`] at construction time.
pub const MAX_PATTERN_LENGTH: usize = 4096;

// ═══════════════════════════════════════════════════════════════════════════════
// Match errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Classification of a match failure.
///
/// Serialized (under the `serde` feature) in wire form: `NO_MATCH`,
/// `INVALID_FORMAT`, `MISSING_ID`, `PARSE_ERROR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum MatchErrorCode {
    /// No matcher recognized the input.
    NoMatch,
    /// A matcher recognized the URL shape but found it malformed.
    InvalidFormat,
    /// A matcher recognized the URL shape but no identifier was present.
    MissingId,
    /// The input itself could not be parsed (empty, too long, unparseable).
    ParseError,
}

impl MatchErrorCode {
    /// Wire-format name of this code.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoMatch => "NO_MATCH",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::MissingId => "MISSING_ID",
            Self::ParseError => "PARSE_ERROR",
        }
    }
}

impl std::fmt::Display for MatchErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A match failure as a value.
///
/// `fatal` distinguishes "this input is not mine, keep trying other matchers"
/// (`false`, the default) from "this URL is unambiguously mine and it is
/// broken — stop the search" (`true`). The registry honors the flag during
/// candidate iteration: a fatal error aborts dispatch and surfaces directly.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchError {
    /// Failure classification.
    pub code: MatchErrorCode,
    /// Human-readable description.
    pub message: String,
    /// Whether this error should abort the candidate search.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "is_false"))]
    pub fatal: bool,
}

#[cfg(feature = "serde")]
fn is_false(b: &bool) -> bool {
    !*b
}

impl MatchError {
    /// Create an error with the given code and message.
    pub fn new(code: MatchErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            fatal: false,
        }
    }

    /// The terminal "nothing claimed this input" error.
    #[must_use]
    pub fn no_match() -> Self {
        Self::new(MatchErrorCode::NoMatch, "no matcher recognized the input")
    }

    /// Input parsing failed before any matcher was consulted.
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(MatchErrorCode::ParseError, message)
    }

    /// URL shape recognized but malformed.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::new(MatchErrorCode::InvalidFormat, message)
    }

    /// URL shape recognized but the identifier is missing.
    pub fn missing_id(message: impl Into<String>) -> Self {
        Self::new(MatchErrorCode::MissingId, message)
    }

    /// Mark this error fatal: the registry stops trying other candidates.
    #[must_use]
    pub fn fatal(mut self) -> Self {
        self.fatal = true;
        self
    }

    /// Returns `true` if this error aborts the candidate search.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.fatal
    }
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if self.fatal {
            write!(f, " (fatal)")?;
        }
        Ok(())
    }
}

impl std::error::Error for MatchError {}

/// Result of a registry dispatch: a [`MatchOk`] or a [`MatchError`].
pub type MatchResult = Result<MatchOk, MatchError>;

// ═══════════════════════════════════════════════════════════════════════════════
// Pattern construction errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from [`PatternMatcher`] construction.
///
/// These are caught when a matcher is built, not at match time. Fix the
/// pattern definition and rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// A regex pattern failed to compile.
    InvalidPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// The underlying error message.
        source: String,
    },
    /// A pattern has no `id` named capture group.
    MissingIdGroup {
        /// The offending pattern.
        pattern: String,
    },
    /// A pattern exceeds [`MAX_PATTERN_LENGTH`].
    PatternTooLong {
        /// Actual length of the pattern.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// The matcher was built without any patterns.
    NoPatterns {
        /// Name of the matcher being built.
        name: String,
    },
    /// The matcher was built without an embed-URL template.
    MissingTemplate {
        /// Name of the matcher being built.
        name: String,
    },
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPattern { pattern, source } => {
                write!(f, "invalid pattern \"{pattern}\": {source}")
            }
            Self::MissingIdGroup { pattern } => {
                write!(
                    f,
                    "pattern \"{pattern}\" has no (?P<id>...) capture group"
                )
            }
            Self::PatternTooLong { len, max } => {
                write!(f, "pattern length is {len}, but maximum allowed is {max}")
            }
            Self::NoPatterns { name } => {
                write!(f, "matcher \"{name}\" declares no URL patterns")
            }
            Self::MissingTemplate { name } => {
                write!(f, "matcher \"{name}\" declares no embed-URL template")
            }
        }
    }
}

impl std::error::Error for PatternError {}
