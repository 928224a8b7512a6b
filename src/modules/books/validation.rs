use chrono::NaiveDate;

use super::models::NewBook;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Names of required fields left empty, in declaration order.
///
/// `num_pages` is optional and never reported.
pub fn check_required_fields(book: &NewBook) -> Vec<&'static str> {
    let mut empty_fields = Vec::new();
    if book.title.is_empty() {
        empty_fields.push("title");
    }
    if book.author.is_empty() {
        empty_fields.push("author");
    }
    if book.pub_date.is_empty() {
        empty_fields.push("pub_date");
    }
    empty_fields
}

/// Strict `YYYY-MM-DD` check: zero-padded, `-` separated, calendar valid.
pub fn validate_date(date: &str) -> bool {
    let shape_ok = date.len() == 10
        && date.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });

    shape_ok && NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok()
}

pub fn check_page_count(num_pages: Option<i64>) -> bool {
    num_pages.map_or(true, |pages| pages >= 0)
}
