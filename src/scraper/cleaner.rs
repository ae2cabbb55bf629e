use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;
use url::Url;

static RE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2}):(\d{2})\s*([ap]m)\b").expect("invalid regex: time")
});

// ── Text ──────────────────────────────────────────────────────────────────────

/// Collapse whitespace runs (CR/LF included) to one space and trim.
/// "  Kya\r\n   Aap  " → "Kya Aap"
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text content of an HTML fragment: tags dropped, entities decoded, normalised.
/// `<b>CID</b> &amp; Co` → "CID & Co"
pub fn fragment_text(html: &str) -> String {
    let frag = Html::parse_fragment(html);
    normalize_whitespace(&frag.root_element().text().collect::<String>())
}

/// Like [`fragment_text`], but empty text is `None`.
pub fn non_empty_text(html: &str) -> Option<String> {
    let text = fragment_text(html);
    if text.is_empty() { None } else { Some(text) }
}

// ── Time ──────────────────────────────────────────────────────────────────────

/// First `H:MM am|pm` in the cell, as "HH:MM AM|PM".
/// "<td>7:30pm</td>" → "07:30 PM"
pub fn parse_time(s: &str) -> Option<String> {
    let caps = RE_TIME.captures(s)?;
    let hour: u32 = caps[1].parse().ok()?;
    Some(format!(
        "{:02}:{} {}",
        hour,
        &caps[2],
        caps[3].to_ascii_uppercase()
    ))
}

// ── Links ─────────────────────────────────────────────────────────────────────

/// Join `href` onto `base`. Absolute URLs pass through; if there is no usable
/// base or the join fails, `href` is returned as written.
pub fn resolve_url(base: Option<&Url>, href: &str) -> String {
    let href = href.trim();
    base.and_then(|b| b.join(href).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| href.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
