//! `PatternMatcher` — Data-driven provider matcher
//!
//! Every built-in provider is an instance of this type: a name, the claimed
//! domains/schemes, one or more extraction regexes, and an embed-URL
//! template. Patterns use named capture groups — `(?P<id>...)` is required,
//! `(?P<kind>...)` optional — and are applied against the raw input, so one
//! pattern set covers full URLs, protocol-less fragments, and bare URIs
//! alike.
//!
//! Construction is fallible and validated up front; matching never fails on
//! a bad pattern because a bad pattern never becomes a matcher.

use regex::Regex;
use url::form_urlencoded;

use crate::{
    host_matches, EmbedOptions, EmbedOutput, IframeSpec, MatchContext, MatchError, Matcher,
    MediaData, PatternError, ScriptRequest, MAX_PATTERN_LENGTH,
};

/// One compiled extraction pattern.
///
/// Wraps a linear-time regex with an `id` named capture group and an
/// optional `kind` group.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    pattern: String,
    regex: Regex,
}

impl UrlPattern {
    /// Compile a pattern.
    ///
    /// # Errors
    ///
    /// [`PatternError::PatternTooLong`] beyond [`MAX_PATTERN_LENGTH`],
    /// [`PatternError::InvalidPattern`] when the regex does not compile, and
    /// [`PatternError::MissingIdGroup`] when there is no `(?P<id>...)`.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        if pattern.len() > MAX_PATTERN_LENGTH {
            return Err(PatternError::PatternTooLong {
                len: pattern.len(),
                max: MAX_PATTERN_LENGTH,
            });
        }
        let regex = Regex::new(pattern).map_err(|e| PatternError::InvalidPattern {
            pattern: pattern.to_owned(),
            source: e.to_string(),
        })?;
        if !regex.capture_names().flatten().any(|n| n == "id") {
            return Err(PatternError::MissingIdGroup {
                pattern: pattern.to_owned(),
            });
        }
        Ok(Self {
            pattern: pattern.to_owned(),
            regex,
        })
    }

    /// The source pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Quick containment probe without extraction.
    #[must_use]
    pub fn is_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }

    /// Extract `id` (and `kind`, when captured) from the input.
    #[must_use]
    pub fn extract(&self, input: &str) -> Option<MediaData> {
        let caps = self.regex.captures(input)?;
        let id = caps.name("id")?.as_str().to_owned();
        Some(MediaData {
            id,
            kind: caps.name("kind").map(|m| m.as_str().to_owned()),
            params: Vec::new(),
        })
    }
}

/// A provider matcher assembled from data.
///
/// Built through [`PatternMatcher::builder`]; see the crate-level example.
/// `fatal_on_mismatch` turns "I claim this URL but cannot extract an id"
/// into a fatal error that stops the registry's candidate search.
#[derive(Debug)]
pub struct PatternMatcher {
    name: String,
    domains: Option<Vec<String>>,
    schemes: Vec<String>,
    patterns: Vec<UrlPattern>,
    embed_template: String,
    html_template: Option<String>,
    scripts: Vec<ScriptRequest>,
    styles: Vec<String>,
    forward_params: Vec<(String, String)>,
    fatal_on_mismatch: bool,
}

impl PatternMatcher {
    /// Start building a matcher with the given unique name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> PatternMatcherBuilder {
        PatternMatcherBuilder {
            name: name.into(),
            domains: None,
            schemes: Vec::new(),
            patterns: Vec::new(),
            embed_template: None,
            html_template: None,
            scripts: Vec::new(),
            styles: Vec::new(),
            forward_params: Vec::new(),
            fatal_on_mismatch: false,
        }
    }

    /// The compiled extraction patterns.
    #[must_use]
    pub fn patterns(&self) -> &[UrlPattern] {
        &self.patterns
    }

    fn first_extract(&self, input: &str) -> Option<MediaData> {
        self.patterns.iter().find_map(|p| p.extract(input))
    }
}

/// Substitute `{id}` and `{kind}` placeholders.
fn fill_template(template: &str, data: &MediaData, escape: bool) -> String {
    let id: String = if escape {
        html_escape::encode_double_quoted_attribute(&data.id).into_owned()
    } else {
        data.id.clone()
    };
    let kind = data.kind.as_deref().unwrap_or("");
    let kind: String = if escape {
        html_escape::encode_double_quoted_attribute(kind).into_owned()
    } else {
        kind.to_owned()
    };
    template.replace("{id}", &id).replace("{kind}", &kind)
}

impl Matcher for PatternMatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn domains(&self) -> Option<&[String]> {
        self.domains.as_deref()
    }

    fn schemes(&self) -> &[String] {
        &self.schemes
    }

    fn can_match(&self, ctx: &MatchContext) -> bool {
        if let (Some(domains), Some(host)) = (&self.domains, ctx.host()) {
            if host_matches(host, domains) {
                return true;
            }
        }
        if let Some(scheme) = ctx.scheme() {
            if !matches!(scheme, "http" | "https") && self.schemes.iter().any(|s| s == scheme) {
                return true;
            }
        }
        // Wildcard matchers probe their patterns directly.
        if self.domains.is_none() {
            return self.patterns.iter().any(|p| p.is_match(ctx.raw()));
        }
        false
    }

    fn parse(&self, ctx: &MatchContext) -> Result<MediaData, MatchError> {
        if let Some(mut data) = self.first_extract(ctx.raw()) {
            for (from, to) in &self.forward_params {
                if let Some(value) = ctx.query_param(from) {
                    data.params.push((to.clone(), value.to_owned()));
                }
            }
            return Ok(data);
        }
        let err = MatchError::missing_id(format!(
            "no {} identifier found in \"{}\"",
            self.name,
            ctx.raw()
        ));
        Err(if self.fatal_on_mismatch {
            err.fatal()
        } else {
            err
        })
    }

    fn embed_url(&self, data: &MediaData, options: &EmbedOptions) -> String {
        let mut url = fill_template(&self.embed_template, data, false);
        let params: Vec<_> = data.params.iter().chain(options.params.iter()).collect();
        if !params.is_empty() {
            let mut qs = form_urlencoded::Serializer::new(String::new());
            for (key, value) in params {
                qs.append_pair(key, value);
            }
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&qs.finish());
        }
        url
    }

    fn output(&self, data: &MediaData, options: &EmbedOptions) -> EmbedOutput {
        let Some(html_template) = &self.html_template else {
            return EmbedOutput::from_iframe(
                IframeSpec::new(self.embed_url(data, options)).apply(options),
            );
        };
        let mut out = EmbedOutput::from_html(fill_template(html_template, data, true));
        out.scripts.extend(self.scripts.iter().cloned());
        out.styles.extend(self.styles.iter().cloned());
        out
    }
}

/// Builder for [`PatternMatcher`]. All validation happens in
/// [`build()`](Self::build).
#[derive(Debug)]
pub struct PatternMatcherBuilder {
    name: String,
    domains: Option<Vec<String>>,
    schemes: Vec<String>,
    patterns: Vec<String>,
    embed_template: Option<String>,
    html_template: Option<String>,
    scripts: Vec<ScriptRequest>,
    styles: Vec<String>,
    forward_params: Vec<(String, String)>,
    fatal_on_mismatch: bool,
}

impl PatternMatcherBuilder {
    /// Claim a hostname (and its subdomains). Never calling this produces a
    /// wildcard matcher.
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domains
            .get_or_insert_with(Vec::new)
            .push(domain.into().to_ascii_lowercase());
        self
    }

    /// Claim a non-HTTP URI scheme.
    #[must_use]
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.schemes.push(scheme.into().to_ascii_lowercase());
        self
    }

    /// Add an extraction pattern (compiled at build time; must contain
    /// `(?P<id>...)`).
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Set the embed-URL template (`{id}`/`{kind}` placeholders).
    #[must_use]
    pub fn embed(mut self, template: impl Into<String>) -> Self {
        self.embed_template = Some(template.into());
        self
    }

    /// Set an HTML template for hydration-style output. Placeholders are
    /// attribute-escaped on substitution.
    #[must_use]
    pub fn html(mut self, template: impl Into<String>) -> Self {
        self.html_template = Some(template.into());
        self
    }

    /// Request a script alongside the HTML output.
    #[must_use]
    pub fn script(mut self, src: impl Into<String>) -> Self {
        self.scripts.push(ScriptRequest::new(src));
        self
    }

    /// Attach a style chunk to the output.
    #[must_use]
    pub fn style(mut self, css: impl Into<String>) -> Self {
        self.styles.push(css.into());
        self
    }

    /// Forward an input query parameter onto the embed URL, renamed.
    /// `forward_param("t", "start")` turns `...?t=42` into `...?start=42`.
    #[must_use]
    pub fn forward_param(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.forward_params.push((from.into(), to.into()));
        self
    }

    /// When `true`, a claimed URL that yields no identifier aborts the whole
    /// registry search instead of falling through to other candidates.
    #[must_use]
    pub fn fatal_on_mismatch(mut self, fatal: bool) -> Self {
        self.fatal_on_mismatch = fatal;
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// [`PatternError::NoPatterns`] or [`PatternError::MissingTemplate`]
    /// when the definition is incomplete, plus every [`UrlPattern::new`]
    /// error for the individual patterns.
    pub fn build(self) -> Result<PatternMatcher, PatternError> {
        if self.patterns.is_empty() {
            return Err(PatternError::NoPatterns { name: self.name });
        }
        let Some(embed_template) = self.embed_template else {
            return Err(PatternError::MissingTemplate { name: self.name });
        };
        let patterns = self
            .patterns
            .iter()
            .map(|p| UrlPattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PatternMatcher {
            name: self.name,
            domains: self.domains,
            schemes: self.schemes,
            patterns,
            embed_template,
            html_template: self.html_template,
            scripts: self.scripts,
            styles: self.styles,
            forward_params: self.forward_params,
            fatal_on_mismatch: self.fatal_on_mismatch,
        })
    }
}

/// Declarative matcher definition for config-driven loading.
///
/// Mirrors [`PatternMatcherBuilder`] field for field so registries can be
/// extended from JSON or YAML documents.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PatternConfig {
    /// Unique matcher name.
    pub name: String,
    /// Claimed hostnames; omit entirely for a wildcard matcher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<Vec<String>>,
    /// Claimed non-HTTP URI schemes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,
    /// Extraction patterns.
    pub patterns: Vec<String>,
    /// Embed-URL template.
    pub embed: String,
    /// Optional HTML hydration template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    /// Scripts requested alongside HTML output.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<String>,
    /// Style chunks attached to the output.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub styles: Vec<String>,
    /// Query parameters forwarded onto the embed URL, as `(from, to)` pairs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forward_params: Vec<(String, String)>,
    /// Abort dispatch when a claimed URL yields no identifier.
    #[serde(default)]
    pub fatal: bool,
}

#[cfg(feature = "serde")]
impl PatternConfig {
    /// Compile this definition into a matcher.
    ///
    /// # Errors
    ///
    /// Same as [`PatternMatcherBuilder::build`].
    pub fn build(self) -> Result<PatternMatcher, PatternError> {
        let mut builder = PatternMatcher::builder(self.name);
        if let Some(domains) = self.domains {
            for domain in domains {
                builder = builder.domain(domain);
            }
        }
        for scheme in self.schemes {
            builder = builder.scheme(scheme);
        }
        for pattern in self.patterns {
            builder = builder.pattern(pattern);
        }
        builder = builder.embed(self.embed);
        if let Some(html) = self.html {
            builder = builder.html(html);
        }
        for script in self.scripts {
            builder = builder.script(script);
        }
        for style in self.styles {
            builder = builder.style(style);
        }
        for (from, to) in self.forward_params {
            builder = builder.forward_param(from, to);
        }
        builder.fatal_on_mismatch(self.fatal).build()
    }
}
