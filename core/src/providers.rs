//! Built-in provider matchers.
//!
//! Every provider here is data: a [`PatternMatcher`] definition, no custom
//! logic. Patterns run against the raw input, so each provider recognizes
//! its full URLs, protocol-less fragments, and (for Spotify) bare URIs with
//! one pattern set.
//!
//! Patterns are compiled with `expect` — they are static and covered by the
//! tests below; user-supplied definitions go through the fallible builder
//! instead.

use std::sync::Arc;

use crate::{Matcher, PatternMatcher};

/// YouTube: watch/embed/shorts/live URLs and `youtu.be` short links.
/// A `t=`/`start=` query parameter is forwarded as the embed start offset.
#[must_use]
pub fn youtube() -> PatternMatcher {
    PatternMatcher::builder("YouTube")
        .domain("youtube.com")
        .domain("youtu.be")
        .domain("youtube-nocookie.com")
        .pattern(
            r"(?:youtube(?:-nocookie)?\.com/(?:watch\?(?:[^#\s]*&)?v=|embed/|shorts/|live/|v/)|youtu\.be/)(?P<id>[A-Za-z0-9_-]{11})",
        )
        .embed("https://www.youtube.com/embed/{id}")
        .forward_param("t", "start")
        .forward_param("start", "start")
        .build()
        .expect("built-in YouTube pattern")
}

/// Vimeo: plain, channel, and group video URLs; numeric ids.
#[must_use]
pub fn vimeo() -> PatternMatcher {
    PatternMatcher::builder("Vimeo")
        .domain("vimeo.com")
        .pattern(r"vimeo\.com/(?:video/|channels/[\w-]+/|groups/[\w-]+/videos/)?(?P<id>\d+)")
        .embed("https://player.vimeo.com/video/{id}")
        .build()
        .expect("built-in Vimeo pattern")
}

/// Spotify: `open.spotify.com` content URLs and `spotify:` URIs. The
/// content kind (track, album, ...) is part of the embed URL.
#[must_use]
pub fn spotify() -> PatternMatcher {
    PatternMatcher::builder("Spotify")
        .domain("spotify.com")
        .scheme("spotify")
        .pattern(
            r"open\.spotify\.com/(?:embed/)?(?P<kind>track|album|playlist|episode|show|artist)/(?P<id>[A-Za-z0-9]+)",
        )
        .pattern(r"^spotify:(?P<kind>track|album|playlist|episode|show|artist):(?P<id>[A-Za-z0-9]+)$")
        .embed("https://open.spotify.com/embed/{kind}/{id}")
        .build()
        .expect("built-in Spotify pattern")
}

/// DailyMotion: video URLs and `dai.ly` short links.
#[must_use]
pub fn dailymotion() -> PatternMatcher {
    PatternMatcher::builder("DailyMotion")
        .domain("dailymotion.com")
        .domain("dai.ly")
        .pattern(r"(?:dailymotion\.com/(?:video|embed/video)/|dai\.ly/)(?P<id>[A-Za-z0-9]+)")
        .embed("https://www.dailymotion.com/embed/video/{id}")
        .build()
        .expect("built-in DailyMotion pattern")
}

/// Loom: share/embed URLs with 32-hex-digit recording ids.
#[must_use]
pub fn loom() -> PatternMatcher {
    PatternMatcher::builder("Loom")
        .domain("loom.com")
        .pattern(r"loom\.com/(?:share|embed)/(?P<id>[0-9a-f]{32})")
        .embed("https://www.loom.com/embed/{id}")
        .build()
        .expect("built-in Loom pattern")
}

/// Wistia: media/embed URLs. Output is the hydration-style async div plus
/// the player script, matching Wistia's own embed snippet.
#[must_use]
pub fn wistia() -> PatternMatcher {
    PatternMatcher::builder("Wistia")
        .domain("wistia.com")
        .domain("wistia.net")
        .domain("wi.st")
        .pattern(r"(?:wistia\.(?:com|net)|wi\.st)/(?:medias|embed/(?:iframe|medias))/(?P<id>[A-Za-z0-9]+)")
        .embed("https://fast.wistia.net/embed/iframe/{id}")
        .html(r#"<div class="wistia_embed wistia_async_{id}" style="height:315px;width:560px">&nbsp;</div>"#)
        .script("https://fast.wistia.com/assets/external/E-v1.js")
        .build()
        .expect("built-in Wistia pattern")
}

/// EdPuzzle: media URLs with hex media ids.
#[must_use]
pub fn edpuzzle() -> PatternMatcher {
    PatternMatcher::builder("EdPuzzle")
        .domain("edpuzzle.com")
        .pattern(r"edpuzzle\.com/(?:media|embed/media)/(?P<id>[0-9a-f]+)")
        .embed("https://edpuzzle.com/embed/media/{id}")
        .build()
        .expect("built-in EdPuzzle pattern")
}

/// The full built-in provider set, in default registration order.
#[must_use]
pub fn defaults() -> Vec<Arc<dyn Matcher>> {
    vec![
        Arc::new(youtube()),
        Arc::new(vimeo()),
        Arc::new(spotify()),
        Arc::new(dailymotion()),
        Arc::new(loom()),
        Arc::new(wistia()),
        Arc::new(edpuzzle()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EmbedOptions, MatchContext, MatcherRegistry};

    fn embed(url: &str) -> Option<String> {
        MatcherRegistry::with_defaults().embed_url(url, &EmbedOptions::new())
    }

    #[test]
    fn youtube_url_shapes() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?list=PL1&v=dQw4w9WgXcQ",
            "https://youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "youtu.be/dQw4w9WgXcQ",
        ] {
            assert_eq!(
                embed(url).as_deref(),
                Some("https://www.youtube.com/embed/dQw4w9WgXcQ"),
                "failed on {url}"
            );
        }
    }

    #[test]
    fn youtube_forwards_start_offset() {
        assert_eq!(
            embed("https://youtu.be/dQw4w9WgXcQ?t=42").as_deref(),
            Some("https://www.youtube.com/embed/dQw4w9WgXcQ?start=42")
        );
    }

    #[test]
    fn vimeo_url_shapes() {
        for url in [
            "https://vimeo.com/76979871",
            "https://vimeo.com/video/76979871",
            "https://player.vimeo.com/video/76979871",
            "https://vimeo.com/channels/staffpicks/76979871",
        ] {
            assert_eq!(
                embed(url).as_deref(),
                Some("https://player.vimeo.com/video/76979871"),
                "failed on {url}"
            );
        }
    }

    #[test]
    fn spotify_url_and_uri_shapes() {
        let expected = "https://open.spotify.com/embed/track/4cOdK2wGLETKBW3PvgPWqT";
        for url in [
            "https://open.spotify.com/track/4cOdK2wGLETKBW3PvgPWqT",
            "https://open.spotify.com/embed/track/4cOdK2wGLETKBW3PvgPWqT",
            "spotify:track:4cOdK2wGLETKBW3PvgPWqT",
        ] {
            assert_eq!(embed(url).as_deref(), Some(expected), "failed on {url}");
        }

        assert_eq!(
            embed("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M").as_deref(),
            Some("https://open.spotify.com/embed/playlist/37i9dQZF1DXcBWIGoYBM5M")
        );
    }

    #[test]
    fn dailymotion_url_shapes() {
        for url in [
            "https://www.dailymotion.com/video/x8k2j3m",
            "https://dai.ly/x8k2j3m",
        ] {
            assert_eq!(
                embed(url).as_deref(),
                Some("https://www.dailymotion.com/embed/video/x8k2j3m"),
                "failed on {url}"
            );
        }
    }

    #[test]
    fn loom_url_shapes() {
        let id = "0281766fa2d04bb788eaf19e65135184";
        assert_eq!(
            embed(&format!("https://www.loom.com/share/{id}")).as_deref(),
            Some(format!("https://www.loom.com/embed/{id}").as_str())
        );
    }

    #[test]
    fn wistia_output_is_hydration_style() {
        let out = MatcherRegistry::with_defaults()
            .output("https://support.wistia.com/medias/26sk4lmiix", &EmbedOptions::new())
            .unwrap();
        assert_eq!(out.scripts.len(), 1);
        let html = out.to_html();
        assert!(html.contains("wistia_async_26sk4lmiix"), "html: {html}");
        assert!(html.contains("E-v1.js"));
    }

    #[test]
    fn wistia_embed_url_is_iframe_endpoint() {
        assert_eq!(
            embed("https://fast.wistia.net/embed/iframe/26sk4lmiix").as_deref(),
            Some("https://fast.wistia.net/embed/iframe/26sk4lmiix")
        );
    }

    #[test]
    fn edpuzzle_url_shapes() {
        assert_eq!(
            embed("https://edpuzzle.com/media/5d9d4e8f2f5a1b3e0c1a2b3c").as_deref(),
            Some("https://edpuzzle.com/embed/media/5d9d4e8f2f5a1b3e0c1a2b3c")
        );
    }

    #[test]
    fn defaults_register_every_provider_once() {
        let registry = MatcherRegistry::with_defaults();
        assert_eq!(registry.len(), 7);
        for name in [
            "YouTube",
            "Vimeo",
            "Spotify",
            "DailyMotion",
            "Loom",
            "Wistia",
            "EdPuzzle",
        ] {
            assert!(registry.contains(name), "missing {name}");
        }
    }

    #[test]
    fn providers_claim_only_their_hosts() {
        let registry = MatcherRegistry::with_defaults();
        let ctx = MatchContext::parse("https://example.com/watch?v=dQw4w9WgXcQ").unwrap();
        // No provider claims example.com; no wildcards are registered.
        assert!(registry.candidates(&ctx).is_empty());
    }
}
