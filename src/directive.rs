//! Parsing of meme directives embedded in freeform chat text.
//!
//! Model replies may carry an instruction to attach an image in one of three
//! legacy surface forms: `[MEME: keywords]`, `[IMAGE: keywords]`, or Markdown
//! image syntax `![keywords]` with an optional parenthesized URL (which is
//! ignored). Matching is case-insensitive and leftmost-first-match only;
//! additional directives in the same reply are silently dropped.
//!
//! User messages get a related but simpler scan: the first URL that looks
//! like an image file or lives on a known GIF host is treated as an attached
//! image for that message.

use std::sync::OnceLock;

use regex::Regex;

fn directive_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\[(?:MEME|IMAGE):\s*([^\]]+)\]|!\[([^\]]+)\](?:\([^)]*\))?")
            .expect("directive regex is valid")
    })
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://\S+").expect("url regex is valid"))
}

fn image_ext_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\.(gif|jpg|jpeg|png|webp)($|\?|#)").expect("image ext regex is valid")
    })
}

/// A model reply split into display text and an optional meme instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    /// The text to display, with the matched directive stripped and trimmed
    pub text: String,
    /// Keyword phrase extracted from the directive, if one was present
    pub keywords: Option<String>,
}

/// Parses a model's raw reply text for an embedded meme directive.
///
/// On a match the entire matched substring is removed from the displayed
/// text and the remainder trimmed. Absence of a match leaves the text
/// unchanged and requests no image lookup.
pub fn parse_reply(raw: &str) -> ParsedReply {
    let Some(caps) = directive_regex().captures(raw) else {
        return ParsedReply {
            text: raw.to_string(),
            keywords: None,
        };
    };

    // Group 1 is the MEME/IMAGE tag body, group 2 the Markdown alt text.
    let keywords = caps
        .get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().trim().to_string())
        .filter(|k| !k.is_empty());

    let whole = caps.get(0).expect("capture 0 always present");
    let mut text = String::with_capacity(raw.len() - whole.len());
    text.push_str(&raw[..whole.start()]);
    text.push_str(&raw[whole.end()..]);

    ParsedReply {
        text: text.trim().to_string(),
        keywords,
    }
}

/// Finds the first URL in user text that should count as an attached image.
///
/// A URL qualifies when it ends in an image-file extension or is hosted on a
/// known GIF domain. The URL is not fetched here; reachability is checked
/// only when the image payload is actually needed.
pub fn find_image_url(text: &str) -> Option<String> {
    let url = url_regex().find(text)?.as_str();
    let is_image = image_ext_regex().is_match(url)
        || url.contains("giphy.com")
        || url.contains("tenor.com");
    is_image.then(|| url.to_string())
}
