//! Raw-markup patterns used when structural selectors find nothing.
//!
//! The same ordered cascade serves two callers: result extraction falls back
//! to it when no selector matched, and the embed resolver uses it as its last
//! strategy. Patterns are compiled once and shared.

use regex::Regex;
use std::sync::OnceLock;

/// One entry of the raw-markup pattern cascade, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupPattern {
    /// `src` of any iframe.
    IframeSrc,
    /// Anchor whose `href` mentions `embed` or `player`.
    EmbedLink,
    /// Any `src` pointing at an `.m3u8` playlist.
    HlsStream,
    /// Any `src` pointing at an `.mp4` file.
    Mp4Video,
    /// Generic `data-url` attribute.
    DataUrl,
}

impl MarkupPattern {
    /// The cascade, highest priority first.
    pub const CASCADE: [MarkupPattern; 5] = [
        Self::IframeSrc,
        Self::EmbedLink,
        Self::HlsStream,
        Self::Mp4Video,
        Self::DataUrl,
    ];

    /// Human-readable name, used to annotate synthesized titles.
    pub fn name(&self) -> &'static str {
        match self {
            Self::IframeSrc => "iframe src",
            Self::EmbedLink => "embed link",
            Self::HlsStream => "HLS stream",
            Self::Mp4Video => "MP4 video",
            Self::DataUrl => "data-url attribute",
        }
    }

    fn source(&self) -> &'static str {
        match self {
            Self::IframeSrc => r#"iframe[^>]*src=["']([^"']+)["']"#,
            Self::EmbedLink => r#"<a[^>]*href=["']([^"']*(?:embed|player)[^"']*)["']"#,
            Self::HlsStream => r#"src=["']([^"']*\.m3u8[^"']*)["']"#,
            Self::Mp4Video => r#"src=["']([^"']*\.mp4[^"']*)["']"#,
            Self::DataUrl => r#"data-url=["']([^"']+)["']"#,
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::IframeSrc => 0,
            Self::EmbedLink => 1,
            Self::HlsStream => 2,
            Self::Mp4Video => 3,
            Self::DataUrl => 4,
        }
    }

    fn regex(&self) -> Option<&'static Regex> {
        static COMPILED: [OnceLock<Option<Regex>>; 5] = [
            OnceLock::new(),
            OnceLock::new(),
            OnceLock::new(),
            OnceLock::new(),
            OnceLock::new(),
        ];
        COMPILED[self.index()]
            .get_or_init(|| compile(self.source()))
            .as_ref()
    }

    /// Every captured URL this pattern finds in `html`, in document order.
    pub fn find_all<'h>(&self, html: &'h str) -> Vec<&'h str> {
        let Some(re) = self.regex() else {
            return Vec::new();
        };
        re.captures_iter(html)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect()
    }

    /// First captured URL of this pattern in `html`, if any.
    pub fn find_first<'h>(&self, html: &'h str) -> Option<&'h str> {
        self.regex()?
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// First bare absolute URL ending in `.m3u8` or `.mp4` anywhere in `html`.
pub fn find_direct_media_url(html: &str) -> Option<&str> {
    static DIRECT: OnceLock<Option<Regex>> = OnceLock::new();
    DIRECT
        .get_or_init(|| compile(r#"https?://[^\s'"]+\.(?:m3u8|mp4)"#))
        .as_ref()?
        .find(html)
        .map(|m| m.as_str())
}

fn compile(source: &str) -> Option<Regex> {
    match Regex::new(source) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(pattern = source, error = %e, "invalid markup pattern");
            None
        }
    }
}
