//! `Matcher` — The provider contract
//!
//! A matcher is a long-lived, stateless unit able to recognize and parse
//! URLs for one media provider and describe how to embed the result.
//! Matchers share no mutable state; the registry holds them as
//! `Arc<dyn Matcher>` trait objects.

use std::fmt::Debug;

use crate::{EmbedOutput, IframeSpec, MatchContext, MatchError};

/// A provider-specific recognizer and embed generator.
///
/// Implementations declare the hostnames and URI schemes they claim, a cheap
/// pre-filter (`can_match`), and full extraction (`parse`). The registry
/// drives dispatch; matchers never see URLs outside their claimed groups
/// unless they are wildcards.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`: a [`MatcherRegistry`]
/// (crate::MatcherRegistry) is freely shareable across threads.
///
/// # Example
///
/// ```
/// use embedo::prelude::*;
///
/// let youtube = PatternMatcher::builder("YouTube")
///     .domain("youtube.com")
///     .domain("youtu.be")
///     .pattern(r"youtu\.be/(?P<id>[A-Za-z0-9_-]{11})")
///     .embed("https://www.youtube.com/embed/{id}")
///     .build()
///     .unwrap();
///
/// let ctx = MatchContext::parse("https://youtu.be/dQw4w9WgXcQ").unwrap();
/// assert!(youtube.can_match(&ctx));
/// assert_eq!(youtube.parse(&ctx).unwrap().id, "dQw4w9WgXcQ");
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Matcher`",
    label = "this type cannot recognize media URLs",
    note = "use PatternMatcher::builder(..) for data-driven matchers, or implement name/domains/can_match/parse/embed_url"
)]
pub trait Matcher: Send + Sync + Debug {
    /// Unique name of this matcher; the registry key.
    fn name(&self) -> &str;

    /// Hostnames this matcher claims. `None` means wildcard: the matcher is
    /// consulted for every URL as a last resort.
    fn domains(&self) -> Option<&[String]>;

    /// Non-HTTP URI schemes this matcher claims (e.g. `spotify`).
    fn schemes(&self) -> &[String] {
        &[]
    }

    /// Cheap pre-filter. `parse` is only invoked when this returns `true`.
    fn can_match(&self, ctx: &MatchContext) -> bool;

    /// Full pattern extraction.
    ///
    /// # Errors
    ///
    /// Returns a [`MatchError`] when the context is not this provider's or
    /// is recognized but broken. A `fatal` error aborts the whole dispatch.
    fn parse(&self, ctx: &MatchContext) -> Result<MediaData, MatchError>;

    /// The provider's canonical iframe-embeddable URL for parsed data.
    fn embed_url(&self, data: &MediaData, options: &EmbedOptions) -> String;

    /// Structured render output for parsed data.
    ///
    /// Default: a single iframe node pointing at [`embed_url`](Self::embed_url).
    fn output(&self, data: &MediaData, options: &EmbedOptions) -> EmbedOutput {
        EmbedOutput::from_iframe(IframeSpec::new(self.embed_url(data, options)).apply(options))
    }
}

// Blanket implementation so boxed matchers satisfy the trait too.
#[diagnostic::do_not_recommend]
impl Matcher for Box<dyn Matcher> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn domains(&self) -> Option<&[String]> {
        (**self).domains()
    }

    fn schemes(&self) -> &[String] {
        (**self).schemes()
    }

    fn can_match(&self, ctx: &MatchContext) -> bool {
        (**self).can_match(ctx)
    }

    fn parse(&self, ctx: &MatchContext) -> Result<MediaData, MatchError> {
        (**self).parse(ctx)
    }

    fn embed_url(&self, data: &MediaData, options: &EmbedOptions) -> String {
        (**self).embed_url(data, options)
    }

    fn output(&self, data: &MediaData, options: &EmbedOptions) -> EmbedOutput {
        (**self).output(data, options)
    }
}

/// Parsed media identity produced by [`Matcher::parse`].
///
/// A uniform value type across providers: `id` is the provider identifier,
/// `kind` the content kind for providers that distinguish one (Spotify
/// tracks vs. playlists), and `params` provider extras (start offsets) that
/// feed back into the embed URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaData {
    /// Provider identifier (video id, track id, media hash).
    pub id: String,
    /// Content kind, for providers with more than one.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub kind: Option<String>,
    /// Extra query parameters for the embed URL, in order.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub params: Vec<(String, String)>,
}

impl MediaData {
    /// Data carrying only an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: None,
            params: Vec::new(),
        }
    }

    /// Data carrying a content kind and an identifier.
    pub fn with_kind(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: Some(kind.into()),
            params: Vec::new(),
        }
    }

    /// Append an extra embed-URL parameter (builder pattern).
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }
}

/// Render-time options threaded through `embed_url` and `output`.
///
/// Everything is optional; providers fall back to their own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmbedOptions {
    /// Iframe width (`"560"`, `"100%"`).
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub width: Option<String>,
    /// Iframe height.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub height: Option<String>,
    /// Accessible title for the iframe.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub title: Option<String>,
    /// `allow` feature policy attribute.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub allow: Option<String>,
    /// Additional iframe attributes, in order.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub attrs: Vec<(String, String)>,
    /// Additional embed-URL query parameters, in order.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub params: Vec<(String, String)>,
}

impl EmbedOptions {
    /// Options with every field unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the iframe width.
    #[must_use]
    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    /// Set the iframe height.
    #[must_use]
    pub fn height(mut self, height: impl Into<String>) -> Self {
        self.height = Some(height.into());
        self
    }

    /// Set the iframe title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the `allow` feature policy.
    #[must_use]
    pub fn allow(mut self, allow: impl Into<String>) -> Self {
        self.allow = Some(allow.into());
        self
    }

    /// Append an iframe attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Append an embed-URL query parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }
}
