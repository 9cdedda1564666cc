//! Common utilities for document generation.
//!
//! Shared helpers for filenames, receipt numbers, amounts, and HTML text.

use crate::models::{Bill, Notice};

/// Width receipt numbers are zero-padded to for display and filenames.
pub const RECEIPT_DISPLAY_WIDTH: usize = 6;

/// Extension of exported documents.
pub const EXPORT_EXTENSION: &str = "pdf";

/// Placeholder shown for fields a preview has not filled in yet.
pub const EMPTY_PLACEHOLDER: &str = "—";

/// Zero-pad a receipt number for display, e.g. `7` -> `000007`.
///
/// Longer values are returned unchanged.
pub fn pad_receipt_number(receipt_number: &str) -> String {
    format!(
        "{:0>width$}",
        receipt_number.trim(),
        width = RECEIPT_DISPLAY_WIDTH
    )
}

/// `Notice_<noticeNumber>_<date>.pdf`
pub fn notice_filename(notice: &Notice) -> String {
    format!(
        "Notice_{}_{}.{}",
        notice.notice_number, notice.date, EXPORT_EXTENSION
    )
}

/// `Receipt_<receiptNumber padded to 6>_<date>.pdf`
pub fn receipt_filename(bill: &Bill) -> String {
    format!(
        "Receipt_{}_{}.{}",
        pad_receipt_number(&bill.receipt_number),
        bill.date,
        EXPORT_EXTENSION
    )
}

/// Make a generated filename safe to place on disk and in a URL path.
///
/// Names that are already safe come back unchanged.
pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let options = sanitize_filename::Options {
        replacement: "-",
        ..Default::default()
    };
    let cleaned = sanitize_filename::sanitize_with_options(name.trim(), options)
        .replace([' ', '#', '?', '%'], "-");

    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

/// Format an amount the way Indian rupee figures are written: the last three
/// digits form a group, then groups of two (`150000` -> `1,50,000`).
///
/// Up to two decimals are kept; trailing zeros are dropped.
pub fn format_inr(amount: f64) -> String {
    if !amount.is_finite() {
        return "0".to_string();
    }

    let negative = amount < 0.0;
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::new();
    let head_len = digits.len().saturating_sub(3);
    for (i, ch) in digits[..head_len].iter().enumerate() {
        if i > 0 && (head_len - i) % 2 == 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }
    if head_len > 0 {
        grouped.push(',');
    }
    grouped.extend(&digits[head_len..]);

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Escape text for safe inclusion in HTML element content or attributes.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escaped text, or the placeholder when the field is blank.
pub fn escape_or_placeholder(value: &str) -> String {
    if value.trim().is_empty() {
        EMPTY_PLACEHOLDER.to_string()
    } else {
        escape_html(value)
    }
}

/// Drop tags and decode the few entities an editor emits for whitespace, leaving
/// only the visible text.
pub fn strip_markup(markup: &str) -> String {
    let mut text = String::with_capacity(markup.len());
    let mut in_tag = false;
    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text.replace("&nbsp;", " ").replace('\u{a0}', " ")
}

/// Elements that show something on the page without any text inside them.
const EMBEDDED_ELEMENTS: &[&str] = &[
    "img", "svg", "video", "audio", "iframe", "embed", "object", "picture", "canvas",
];

/// Whether editor markup would put anything on the page: visible text or an
/// embedded element such as an image.
pub fn has_visible_content(markup: &str) -> bool {
    if !strip_markup(markup).trim().is_empty() {
        return true;
    }

    let lower = markup.to_ascii_lowercase();
    lower.match_indices('<').any(|(start, _)| {
        let tag = &lower[start + 1..];
        EMBEDDED_ELEMENTS.iter().any(|name| {
            tag.strip_prefix(name).is_some_and(|rest| {
                rest.is_empty()
                    || rest.starts_with(|c: char| c.is_ascii_whitespace() || c == '/' || c == '>')
            })
        })
    })
}

/// Check that exported bytes are actually a PDF.
pub fn is_pdf(data: &[u8]) -> bool {
    data.starts_with(b"%PDF")
}
