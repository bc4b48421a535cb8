//! `MatchContext` — Normalized input for a single lookup
//!
//! A context is built once per `match_url` call and shared across every
//! candidate matcher. Parsing tries three strategies in order: bare URI
//! scheme detection (`spotify:track:...`), strict URL parsing via the `url`
//! crate, and a permissive regex fallback for protocol-less fragments like
//! `youtu.be/abc`.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::{MatchError, MAX_INPUT_LENGTH};

/// Scheme-colon prefix where the remainder does not start with `//`.
static BARE_SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*):(.*)$").expect("bare scheme pattern"));

/// Permissive URL shape: optional scheme, host-like segment, path, query, fragment.
static LOOSE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:([A-Za-z][A-Za-z0-9+.\-]*)://)?([^/?#]+)([^?#]*)(?:\?([^#]*))?(?:#(.*))?$")
        .expect("loose url pattern")
});

/// The normalized, pre-parsed representation of one input URL/URI.
///
/// Ephemeral: owned solely by the lookup that created it. The original input
/// is kept verbatim in `raw`; `host` and `scheme` are lowercased when
/// present. Non-URL inputs (bare URI schemes) have no host.
///
/// # Example
///
/// ```
/// use embedo::MatchContext;
///
/// let ctx = MatchContext::parse("https://Open.Spotify.com/track/4cOdK2wGLETKBW3PvgPWqT").unwrap();
/// assert_eq!(ctx.host(), Some("open.spotify.com"));
/// assert_eq!(ctx.scheme(), Some("https"));
///
/// let ctx = MatchContext::parse("spotify:track:4cOdK2wGLETKBW3PvgPWqT").unwrap();
/// assert_eq!(ctx.host(), None);
/// assert_eq!(ctx.scheme(), Some("spotify"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchContext {
    raw: String,
    scheme: Option<String>,
    host: Option<String>,
    path: Option<String>,
    query: Vec<(String, String)>,
    fragment: Option<String>,
}

impl MatchContext {
    /// Parse an input string into a context.
    ///
    /// Deterministic and side-effect free: the same input always produces a
    /// structurally equal context.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` [`MatchError`] when the input is empty, longer
    /// than [`MAX_INPUT_LENGTH`] bytes, or yields no host-like segment under
    /// any parsing strategy.
    pub fn parse(input: &str) -> Result<Self, MatchError> {
        if input.is_empty() {
            return Err(MatchError::parse_error("input is empty"));
        }
        if input.len() > MAX_INPUT_LENGTH {
            return Err(MatchError::parse_error(format!(
                "input is {} bytes, maximum is {MAX_INPUT_LENGTH}",
                input.len()
            )));
        }

        if let Some(ctx) = Self::from_bare_scheme(input) {
            return Ok(ctx);
        }
        if let Ok(url) = Url::parse(input) {
            return Ok(Self::from_url(input, &url));
        }
        Self::from_loose(input)
    }

    /// Bare URI scheme (`scheme:opaque`, no `//`): scheme set, host absent.
    fn from_bare_scheme(input: &str) -> Option<Self> {
        let caps = BARE_SCHEME_RE.captures(input)?;
        let rest = caps.get(2).map_or("", |m| m.as_str());
        if rest.starts_with("//") {
            return None;
        }
        Some(Self {
            raw: input.to_owned(),
            scheme: Some(caps[1].to_ascii_lowercase()),
            host: None,
            path: (!rest.is_empty()).then(|| rest.to_owned()),
            query: Vec::new(),
            fragment: None,
        })
    }

    /// Strict parse result. The `url` crate already lowercases scheme and
    /// host; query pairs arrive percent-decoded.
    fn from_url(raw: &str, url: &Url) -> Self {
        Self {
            raw: raw.to_owned(),
            scheme: Some(url.scheme().to_owned()),
            host: url.host_str().map(|h| h.to_ascii_lowercase()),
            path: Some(url.path().to_owned()),
            query: url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
            fragment: url.fragment().map(str::to_owned),
        }
    }

    /// Permissive fallback for partial inputs (`youtu.be/abc`,
    /// `www.youtube.com/watch?v=x`). Query pairs are split without
    /// percent-decoding.
    fn from_loose(input: &str) -> Result<Self, MatchError> {
        let caps = LOOSE_URL_RE
            .captures(input)
            .ok_or_else(|| MatchError::parse_error("input is not URL-like"))?;

        let mut host = caps.get(2).map_or("", |m| m.as_str());
        if host.chars().any(char::is_whitespace) {
            return Err(MatchError::parse_error("host segment contains whitespace"));
        }
        // Strip a trailing :port from the host-like segment.
        if let Some((h, port)) = host.rsplit_once(':') {
            if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) {
                host = h;
            }
        }
        if host.is_empty() {
            return Err(MatchError::parse_error("no host-like segment found"));
        }

        let query = caps.get(4).map_or_else(Vec::new, |m| {
            m.as_str()
                .split('&')
                .filter(|p| !p.is_empty())
                .map(|p| match p.split_once('=') {
                    Some((k, v)) => (k.to_owned(), v.to_owned()),
                    None => (p.to_owned(), String::new()),
                })
                .collect()
        });

        Ok(Self {
            raw: input.to_owned(),
            scheme: caps.get(1).map(|m| m.as_str().to_ascii_lowercase()),
            host: Some(host.to_ascii_lowercase()),
            path: caps
                .get(3)
                .map(|m| m.as_str())
                .filter(|p| !p.is_empty())
                .map(str::to_owned),
            query,
            fragment: caps.get(5).map(|m| m.as_str().to_owned()),
        })
    }

    /// The original input, verbatim.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Lowercased URI scheme without the trailing colon, if present.
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Lowercased hostname. Absent for bare URI schemes.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Path component, if present.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Query parameters in input order.
    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// First value of the named query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Fragment component (without `#`), if present.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }
}

/// Last two dot-separated labels of a hostname, lowercased.
///
/// Naive registrable-domain heuristic: hostnames with two or fewer labels
/// are returned unchanged, and multi-part TLDs (`.co.uk`) are not handled —
/// a documented limitation, not a bug.
///
/// ```
/// use embedo::base_domain;
///
/// assert_eq!(base_domain("open.spotify.com"), "spotify.com");
/// assert_eq!(base_domain("youtu.be"), "youtu.be");
/// ```
#[must_use]
pub fn base_domain(host: &str) -> String {
    let lower = host.to_ascii_lowercase();
    match lower.rmatch_indices('.').nth(1) {
        Some((idx, _)) => lower[idx + 1..].to_owned(),
        None => lower,
    }
}

/// True if `host` equals any candidate domain or is a strict subdomain of
/// one, case-insensitively.
#[must_use]
pub fn host_matches(host: &str, domains: &[String]) -> bool {
    domains.iter().any(|d| domain_claims(host, d))
}

fn domain_claims(host: &str, domain: &str) -> bool {
    if host.eq_ignore_ascii_case(domain) {
        return true;
    }
    let Some(dot) = host.len().checked_sub(domain.len() + 1) else {
        return false;
    };
    host.is_char_boundary(dot)
        && host.as_bytes()[dot] == b'.'
        && host[dot + 1..].eq_ignore_ascii_case(domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchErrorCode;

    #[test]
    fn rejects_empty_input() {
        let err = MatchContext::parse("").unwrap_err();
        assert_eq!(err.code, MatchErrorCode::ParseError);
    }

    #[test]
    fn rejects_over_length_input() {
        let err = MatchContext::parse(&"a".repeat(MAX_INPUT_LENGTH + 1)).unwrap_err();
        assert_eq!(err.code, MatchErrorCode::ParseError);
        assert!(err.message.contains("2049"));
    }

    #[test]
    fn accepts_input_at_length_limit() {
        // At exactly the limit, only non-length parse reasons may reject.
        let input = "a".repeat(MAX_INPUT_LENGTH);
        let ctx = MatchContext::parse(&input).unwrap();
        assert_eq!(ctx.host(), Some(input.as_str()));
    }

    #[test]
    fn strict_url_lowercases_host_and_scheme() {
        let ctx = MatchContext::parse("HTTPS://WWW.YouTube.COM/watch?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(ctx.scheme(), Some("https"));
        assert_eq!(ctx.host(), Some("www.youtube.com"));
        assert_eq!(ctx.path(), Some("/watch"));
        assert_eq!(ctx.query_param("v"), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn bare_scheme_has_no_host() {
        let ctx = MatchContext::parse("spotify:track:4cOdK2wGLETKBW3PvgPWqT").unwrap();
        assert_eq!(ctx.scheme(), Some("spotify"));
        assert_eq!(ctx.host(), None);
        assert_eq!(ctx.path(), Some("track:4cOdK2wGLETKBW3PvgPWqT"));
    }

    #[test]
    fn scheme_with_slashes_is_not_bare() {
        let ctx = MatchContext::parse("https://example.com/x").unwrap();
        assert_eq!(ctx.host(), Some("example.com"));
    }

    #[test]
    fn loose_fallback_handles_protocol_less_input() {
        let ctx = MatchContext::parse("youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(ctx.scheme(), None);
        assert_eq!(ctx.host(), Some("youtu.be"));
        assert_eq!(ctx.path(), Some("/dQw4w9WgXcQ"));
    }

    #[test]
    fn loose_fallback_parses_query_and_fragment() {
        let ctx = MatchContext::parse("www.youtube.com/watch?v=abc123def45&t=10#top").unwrap();
        assert_eq!(ctx.host(), Some("www.youtube.com"));
        assert_eq!(ctx.query_param("v"), Some("abc123def45"));
        assert_eq!(ctx.query_param("t"), Some("10"));
        assert_eq!(ctx.fragment(), Some("top"));
    }

    #[test]
    fn loose_fallback_strips_port() {
        // A digit-leading host cannot be mistaken for a URI scheme.
        let ctx = MatchContext::parse("9media.example.com:8080/clip/1").unwrap();
        assert_eq!(ctx.host(), Some("9media.example.com"));
    }

    #[test]
    fn dotted_prefix_before_colon_reads_as_scheme() {
        // Dots are legal in URI schemes, so `host:port` inputs with an
        // alphabetic first character parse as bare schemes (URL-standard
        // behavior, same as browsers).
        let ctx = MatchContext::parse("media.example.com:8080/clip/1").unwrap();
        assert_eq!(ctx.scheme(), Some("media.example.com"));
        assert_eq!(ctx.host(), None);
    }

    #[test]
    fn loose_fallback_rejects_whitespace_host() {
        let err = MatchContext::parse("not a url").unwrap_err();
        assert_eq!(err.code, MatchErrorCode::ParseError);
    }

    #[test]
    fn parse_is_deterministic() {
        let a = MatchContext::parse("https://youtu.be/dQw4w9WgXcQ?t=42").unwrap();
        let b = MatchContext::parse("https://youtu.be/dQw4w9WgXcQ?t=42").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn raw_is_preserved_verbatim() {
        let input = "HTTPS://YouTu.be/AbC";
        let ctx = MatchContext::parse(input).unwrap();
        assert_eq!(ctx.raw(), input);
    }

    #[test]
    fn base_domain_takes_last_two_labels() {
        assert_eq!(base_domain("open.spotify.com"), "spotify.com");
        assert_eq!(base_domain("a.b.c.example.org"), "example.org");
        assert_eq!(base_domain("youtube.com"), "youtube.com");
        assert_eq!(base_domain("localhost"), "localhost");
        assert_eq!(base_domain("OPEN.SPOTIFY.COM"), "spotify.com");
    }

    #[test]
    fn host_matches_exact_and_subdomain() {
        let domains = vec!["youtube.com".to_owned()];
        assert!(host_matches("youtube.com", &domains));
        assert!(host_matches("www.youtube.com", &domains));
        assert!(host_matches("m.youtube.com", &domains));
        assert!(!host_matches("notyoutube.com", &domains));
        assert!(!host_matches("youtube.com.evil.example", &domains));
    }

    #[test]
    fn host_matches_is_case_insensitive() {
        let domains = vec!["YouTube.com".to_owned()];
        assert!(host_matches("www.youtube.com", &domains));
    }
}
