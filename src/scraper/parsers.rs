//! Schedule page → listing records.
//!
//! The page carries its schedule as the rows of the first `<tbody>`. Each row
//! opens with a time cell, followed either by a linked title or by a
//! `class="text"` cell. Parsing is regex-driven over the whitespace-normalised
//! document; unexpected markup yields partially filled records, never an error.

use crate::models::ListingRecord;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::cleaner::{fragment_text, non_empty_text, normalize_whitespace, parse_time, resolve_url};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("schedule page is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),
}

static RE_TBODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<tbody\b[^>]*>(.*?)</tbody\s*>").expect("invalid regex: tbody")
});

static RE_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr\s*>").expect("invalid regex: row")
});

static RE_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<td\b[^>]*>(.*?)</td\s*>").expect("invalid regex: cell")
});

static RE_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>(.*?)</a\s*>"#)
        .expect("invalid regex: anchor")
});

static RE_TEXT_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?is)<td\b[^>]*?\bclass\s*=\s*"#,
        r#"(?:"(?:[^"]*\s)?text(?:\s[^"]*)?"|'(?:[^']*\s)?text(?:\s[^']*)?')"#,
        r#"[^>]*>(.*?)</td\s*>"#,
    ))
    .expect("invalid regex: text cell")
});

// ── Entry points ──────────────────────────────────────────────────────────────

/// Parse a raw response body. Only a non-UTF-8 payload is an error.
pub fn extract(raw: &[u8], base_url: &str) -> Result<Vec<ListingRecord>, ParseError> {
    let html = std::str::from_utf8(raw)?;
    Ok(extract_str(html, base_url))
}

/// Parse an already decoded page. A page without a `<tbody>` has no listings.
pub fn extract_str(html: &str, base_url: &str) -> Vec<ListingRecord> {
    let base = Url::parse(base_url).ok();
    let doc = normalize_whitespace(html);

    let Some(body) = table_body(&doc) else {
        debug!("No <tbody> in schedule page");
        return Vec::new();
    };

    let listings: Vec<ListingRecord> = rows(body)
        .map(|row| parse_row(row, base.as_ref()))
        .collect();

    debug!("{} listing rows parsed", listings.len());
    listings
}

// ── Fragments ─────────────────────────────────────────────────────────────────

/// Inner HTML of the first `<tbody>`.
pub fn table_body(doc: &str) -> Option<&str> {
    RE_TBODY
        .captures(doc)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Row fragments of a table body, consumed front to back.
pub fn rows(body: &str) -> Rows<'_> {
    Rows { rest: body }
}

/// Single-pass iterator over the `<tr>` fragments left in `rest`.
#[derive(Debug, Clone)]
pub struct Rows<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Rows<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let caps = RE_ROW.captures(self.rest)?;
        let whole = caps.get(0)?;
        let inner = caps.get(1)?;
        self.rest = &self.rest[whole.end()..];
        Some(inner.as_str())
    }
}

impl std::iter::FusedIterator for Rows<'_> {}

// ── Rows ──────────────────────────────────────────────────────────────────────

/// One record per row; missing pieces stay `None`.
pub fn parse_row(row: &str, base: Option<&Url>) -> ListingRecord {
    let row = normalize_whitespace(row);

    // The leading cell holds the start time.
    let (time, rest) = match RE_CELL.captures(&row) {
        Some(caps) => {
            let cell = caps.get(1).map_or("", |m| m.as_str());
            let end = caps.get(0).map_or(0, |m| m.end());
            (parse_time(&fragment_text(cell)), &row[end..])
        }
        None => (None, row.as_str()),
    };

    if let Some(caps) = RE_ANCHOR.captures(rest) {
        // double- or single-quoted href
        let href = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        let text = caps.get(3).map_or("", |m| m.as_str());
        return ListingRecord {
            time,
            title: non_empty_text(text),
            url: Some(resolve_url(base, href)),
        };
    }

    let title = RE_TEXT_CELL
        .captures(rest)
        .and_then(|caps| caps.get(1))
        .and_then(|m| non_empty_text(m.as_str()));

    ListingRecord {
        time,
        title,
        url: None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://www.setasia.tv";

    const PAGE: &str = r#"
<html><body>
  <h1>Schedule</h1>
  <table class="schedule">
    <thead><tr><th>Time</th><th>Programme</th></tr></thead>
    <tbody>
      <tr class="odd">
        <td class="time">
          07:30 PM
        </td>
        <td class="title"><a href="/en-gb/shows/cid">
            CID
        </a></td>
      </tr>
      <tr class="even">
        <td class="time">8:00am</td>
        <td class="text">  Kya   Aap Paanchvi
          Pass Se Tez Hain? </td>
      </tr>
    </tbody>
  </table>
</body></html>
"#;

    #[test]
    fn test_extract_linked_and_text_rows() {
        let listings = extract(PAGE.as_bytes(), BASE).unwrap();
        assert_eq!(
            listings,
            vec![
                ListingRecord {
                    time: Some("07:30 PM".into()),
                    title: Some("CID".into()),
                    url: Some("http://www.setasia.tv/en-gb/shows/cid".into()),
                },
                ListingRecord {
                    time: Some("08:00 AM".into()),
                    title: Some("Kya Aap Paanchvi Pass Se Tez Hain?".into()),
                    url: None,
                },
            ]
        );
    }

    #[test]
    fn test_missing_tbody_is_empty() {
        let html = "<html><body><table><tr><td>07:30 PM</td></tr></table></body></html>";
        assert!(extract(html.as_bytes(), BASE).unwrap().is_empty());
        assert!(extract(b"", BASE).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let raw = [b'<', b't', 0xff, 0xfe];
        assert!(matches!(
            extract(&raw, BASE),
            Err(ParseError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_rows_consumed_in_order() {
        let body = "<tr><td>a</td></tr> junk <TR id=x><td>b</td></TR><tr><td>c";
        let got: Vec<&str> = rows(body).collect();
        assert_eq!(got, vec!["<td>a</td>", "<td>b</td>"]);
    }

    #[test]
    fn test_single_quoted_attributes() {
        let html = "<tbody>\
            <tr><td>9:00 PM</td><td><a href='/en-gb/shows/cid'>CID</a></td></tr>\
            <tr><td>9:30 PM</td><td class='text'>Crime Patrol</td></tr>\
            </tbody>";
        let listings = extract_str(html, BASE);
        assert_eq!(listings[0].title.as_deref(), Some("CID"));
        assert_eq!(
            listings[0].url.as_deref(),
            Some("http://www.setasia.tv/en-gb/shows/cid")
        );
        assert_eq!(listings[1].title.as_deref(), Some("Crime Patrol"));
        assert_eq!(listings[1].url, None);
    }

    #[test]
    fn test_time_split_across_tags() {
        let rec = parse_row(
            "<td><span>7:30</span> <span>PM</span></td><td class=\"text\">CID</td>",
            None,
        );
        assert_eq!(rec.time.as_deref(), Some("07:30 PM"));
        assert_eq!(rec.title.as_deref(), Some("CID"));
    }

    #[test]
    fn test_row_degrades_gracefully() {
        let base = Url::parse(BASE).unwrap();

        // no time, no title
        let rec = parse_row("<td>TBA</td><td>nothing here</td>", Some(&base));
        assert_eq!(rec, ListingRecord::default());

        // no cells at all, still a record
        let rec = parse_row("just text", Some(&base));
        assert_eq!(rec, ListingRecord::default());

        // time but no title
        let rec = parse_row("<td>11:15 pm</td>", Some(&base));
        assert_eq!(rec.time.as_deref(), Some("11:15 PM"));
        assert_eq!(rec.title, None);
        assert_eq!(rec.url, None);
    }

    #[test]
    fn test_absolute_href_passes_through() {
        let html = r#"<tbody><tr><td>10:00 AM</td><td><a class="x" href="https://other.example/show">Other <b>Show</b></a></td></tr></tbody>"#;
        let listings = extract_str(html, BASE);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].url.as_deref(), Some("https://other.example/show"));
        assert_eq!(listings[0].title.as_deref(), Some("Other Show"));
    }

    #[test]
    fn test_anchor_preferred_over_text_cell() {
        let html = r#"<tbody><tr><td>10:00 AM</td><td class="text">Plain</td><td><a href="/x">Linked</a></td></tr></tbody>"#;
        let listings = extract_str(html, BASE);
        assert_eq!(listings[0].title.as_deref(), Some("Linked"));
        assert_eq!(listings[0].url.as_deref(), Some("http://www.setasia.tv/x"));
    }

    #[test]
    fn test_text_class_among_others() {
        let html = r#"<tbody><tr><td>1:05 PM</td><td class="cell text big">Crime Patrol</td></tr></tbody>"#;
        let listings = extract_str(html, BASE);
        assert_eq!(listings[0].title.as_deref(), Some("Crime Patrol"));

        // "textual" is not the "text" class
        let html = r#"<tbody><tr><td>1:05 PM</td><td class="textual">Crime Patrol</td></tr></tbody>"#;
        assert_eq!(extract_str(html, BASE)[0].title, None);
    }

    #[test]
    fn test_only_first_tbody_used() {
        let html = "<tbody><tr><td>1:00 PM</td></tr></tbody><tbody><tr><td>2:00 PM</td></tr></tbody>";
        let listings = extract_str(html, BASE);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].time.as_deref(), Some("01:00 PM"));
    }
}
