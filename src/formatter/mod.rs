use crate::models::ListingRecord;

pub const SEPARATOR: &str = "----------------------------------------";

/// Plain-text listing, four lines per record in collection order.
pub fn render(listings: &[ListingRecord]) -> String {
    listings.iter().map(render_record).collect()
}

fn render_record(rec: &ListingRecord) -> String {
    format!(
        "Start Time: {}\nTitle: {}\nURL: {}\n{SEPARATOR}\n",
        rec.time.as_deref().unwrap_or(""),
        rec.title.as_deref().unwrap_or(""),
        rec.url_or_missing(),
    )
}

pub fn render_json(listings: &[ListingRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(listings)
}
