//! `EmbedOutput` — Structured render result
//!
//! `toOutput`-style consumers get data, not markup: an ordered list of nodes
//! (iframe descriptor or pre-escaped HTML blob), script requests for
//! hydration-based embeds, and optional style chunks. A plain-HTML rendering
//! is available via `to_html()` for callers that just want a string.

use std::fmt::Write as _;

use html_escape::encode_double_quoted_attribute;

use crate::EmbedOptions;

/// Default iframe width when neither provider nor caller sets one.
pub const DEFAULT_WIDTH: &str = "560";

/// Default iframe height when neither provider nor caller sets one.
pub const DEFAULT_HEIGHT: &str = "315";

/// Declarative description of one embeddable iframe.
///
/// All attribute values are escaped at render time; `attrs` may carry
/// arbitrary extra attributes in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IframeSpec {
    /// Iframe `src` URL.
    pub src: String,
    /// Width attribute; [`DEFAULT_WIDTH`] when unset.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub width: Option<String>,
    /// Height attribute; [`DEFAULT_HEIGHT`] when unset.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub height: Option<String>,
    /// Accessible title.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub title: Option<String>,
    /// `allow` feature policy.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub allow: Option<String>,
    /// Whether the `allowfullscreen` attribute is emitted.
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub allow_fullscreen: bool,
    /// Extra attributes, in order.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub attrs: Vec<(String, String)>,
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

impl IframeSpec {
    /// An iframe spec for the given `src`, fullscreen-enabled.
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            width: None,
            height: None,
            title: None,
            allow: None,
            allow_fullscreen: true,
            attrs: Vec::new(),
        }
    }

    /// Set the width attribute.
    #[must_use]
    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    /// Set the height attribute.
    #[must_use]
    pub fn height(mut self, height: impl Into<String>) -> Self {
        self.height = Some(height.into());
        self
    }

    /// Set the accessible title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Copy every set field from caller options onto this spec.
    #[must_use]
    pub fn apply(mut self, options: &EmbedOptions) -> Self {
        if let Some(width) = &options.width {
            self.width = Some(width.clone());
        }
        if let Some(height) = &options.height {
            self.height = Some(height.clone());
        }
        if let Some(title) = &options.title {
            self.title = Some(title.clone());
        }
        if let Some(allow) = &options.allow {
            self.allow = Some(allow.clone());
        }
        self.attrs.extend(options.attrs.iter().cloned());
        self
    }

    /// Render this spec as an `<iframe>` element.
    ///
    /// Every attribute value passes through double-quoted attribute
    /// escaping, including `attrs` entries.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::with_capacity(128);
        let _ = write!(
            html,
            r#"<iframe src="{}" width="{}" height="{}" frameborder="0""#,
            encode_double_quoted_attribute(&self.src),
            encode_double_quoted_attribute(self.width.as_deref().unwrap_or(DEFAULT_WIDTH)),
            encode_double_quoted_attribute(self.height.as_deref().unwrap_or(DEFAULT_HEIGHT)),
        );
        if let Some(title) = &self.title {
            let _ = write!(html, r#" title="{}""#, encode_double_quoted_attribute(title));
        }
        if let Some(allow) = &self.allow {
            let _ = write!(html, r#" allow="{}""#, encode_double_quoted_attribute(allow));
        }
        for (name, value) in &self.attrs {
            let _ = write!(
                html,
                r#" {}="{}""#,
                name,
                encode_double_quoted_attribute(value)
            );
        }
        if self.allow_fullscreen {
            html.push_str(" allowfullscreen");
        }
        html.push_str("></iframe>");
        html
    }
}

/// One render node of an [`EmbedOutput`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EmbedNode {
    /// An iframe to render.
    Iframe(IframeSpec),
    /// A pre-escaped HTML blob, emitted verbatim.
    Html(String),
}

impl EmbedNode {
    /// Render this node as HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        match self {
            Self::Iframe(spec) => spec.to_html(),
            Self::Html(html) => html.clone(),
        }
    }
}

/// A script the embed needs loaded for hydration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptRequest {
    /// Script URL.
    pub src: String,
    /// Whether to load with the `async` attribute.
    #[cfg_attr(feature = "serde", serde(default))]
    pub asynchronous: bool,
}

impl ScriptRequest {
    /// An async script request for the given URL.
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            asynchronous: true,
        }
    }

    /// Render this request as a `<script>` element.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = format!(
            r#"<script src="{}""#,
            encode_double_quoted_attribute(&self.src)
        );
        if self.asynchronous {
            html.push_str(" async");
        }
        html.push_str("></script>");
        html
    }
}

/// Plain-data result of rendering a matched URL.
///
/// Value semantics throughout; consumed immediately by a renderer. Nodes are
/// ordered; scripts and styles are optional extras for hydration-based
/// providers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmbedOutput {
    /// Render nodes, in order.
    pub nodes: Vec<EmbedNode>,
    /// Scripts to load for hydration.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub scripts: Vec<ScriptRequest>,
    /// Style chunks (CSS text).
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub styles: Vec<String>,
}

impl EmbedOutput {
    /// Output consisting of a single iframe node.
    #[must_use]
    pub fn from_iframe(spec: IframeSpec) -> Self {
        Self {
            nodes: vec![EmbedNode::Iframe(spec)],
            scripts: Vec::new(),
            styles: Vec::new(),
        }
    }

    /// Output consisting of a single pre-escaped HTML node.
    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            nodes: vec![EmbedNode::Html(html.into())],
            scripts: Vec::new(),
            styles: Vec::new(),
        }
    }

    /// Append a script request (builder pattern).
    #[must_use]
    pub fn with_script(mut self, script: ScriptRequest) -> Self {
        self.scripts.push(script);
        self
    }

    /// Append a style chunk (builder pattern).
    #[must_use]
    pub fn with_style(mut self, css: impl Into<String>) -> Self {
        self.styles.push(css.into());
        self
    }

    /// Render the whole output — styles, nodes, then scripts — as HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for css in &self.styles {
            let _ = write!(html, "<style>{css}</style>");
        }
        for node in &self.nodes {
            html.push_str(&node.to_html());
        }
        for script in &self.scripts {
            html.push_str(&script.to_html());
        }
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iframe_renders_with_defaults() {
        let html = IframeSpec::new("https://player.vimeo.com/video/76979871").to_html();
        assert_eq!(
            html,
            r#"<iframe src="https://player.vimeo.com/video/76979871" width="560" height="315" frameborder="0" allowfullscreen></iframe>"#
        );
    }

    #[test]
    fn iframe_escapes_attribute_values() {
        let html = IframeSpec::new(r#"https://example.com/?a="1""#)
            .title("a \"quoted\" title")
            .to_html();
        assert!(!html.contains(r#"="1""#), "quote must be escaped: {html}");
        assert!(html.contains("&quot;"));
    }

    #[test]
    fn iframe_applies_caller_options() {
        let opts = crate::EmbedOptions::new()
            .width("100%")
            .height("480")
            .attr("loading", "lazy");
        let html = IframeSpec::new("https://x.test/e").apply(&opts).to_html();
        assert!(html.contains(r#"width="100%""#));
        assert!(html.contains(r#"height="480""#));
        assert!(html.contains(r#"loading="lazy""#));
    }

    #[test]
    fn script_request_renders_async() {
        let html = ScriptRequest::new("https://fast.wistia.com/assets/external/E-v1.js").to_html();
        assert_eq!(
            html,
            r#"<script src="https://fast.wistia.com/assets/external/E-v1.js" async></script>"#
        );
    }

    #[test]
    fn output_concatenates_styles_nodes_scripts() {
        let out = EmbedOutput::from_html("<div>x</div>")
            .with_script(ScriptRequest::new("https://s.test/a.js"))
            .with_style(".e{display:block}");
        let html = out.to_html();
        let style_at = html.find("<style>").unwrap();
        let div_at = html.find("<div>").unwrap();
        let script_at = html.find("<script").unwrap();
        assert!(style_at < div_at && div_at < script_at);
    }
}
