//! Deterministic text extraction shared by the agents: tokenizing, stop-word
//! filtering, and the product-id / order-id scans.

use shoptalk_core::domain::product::ProductId;

/// Filler words stripped from search queries before matching.
const SEARCH_STOP_WORDS: [&str; 13] = [
    "search", "find", "show", "me", "products", "look", "for", "a", "an", "the", "in", "with",
    "please",
];

/// Demo product ids start with one of these family prefixes.
const PRODUCT_ID_PREFIXES: [&str; 3] = ["ELEC", "HOME", "SPORT"];

pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
}

pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_ascii_alphanumeric()).to_string())
        .filter(|token| !token.is_empty())
        .collect()
}

pub fn search_terms(query: &str) -> Vec<String> {
    tokenize(&normalize_text(query))
        .into_iter()
        .filter(|token| !SEARCH_STOP_WORDS.contains(&token.as_str()))
        .collect()
}

/// True when any keyword occurs as a substring of the lowercased message,
/// which is how the demo's coordinator classifies messages.
pub fn mentions_any(message: &str, keywords: &[&str]) -> bool {
    let lower = normalize_text(message);
    keywords.iter().any(|keyword| lower.contains(keyword))
}

/// First token that looks like a demo product id, uppercased.
pub fn extract_product_id(message: &str) -> Option<ProductId> {
    message
        .split_whitespace()
        .map(|token| {
            token.trim_matches(|c: char| !c.is_ascii_alphanumeric()).to_ascii_uppercase()
        })
        .find(|token| PRODUCT_ID_PREFIXES.iter().any(|prefix| token.starts_with(prefix)))
        .map(ProductId)
}

/// First `ORD-<digits>-<digits>` substring, matched case-insensitively.
pub fn extract_order_id(message: &str) -> Option<String> {
    let upper = message.to_ascii_uppercase();
    let bytes = upper.as_bytes();
    let mut search_from = 0;

    while let Some(offset) = upper[search_from..].find("ORD-") {
        let begin = search_from + offset;
        let mut cursor = begin + 4;

        let date_start = cursor;
        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }

        if cursor > date_start && bytes.get(cursor) == Some(&b'-') {
            cursor += 1;
            let sequence_start = cursor;
            while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
                cursor += 1;
            }
            if cursor > sequence_start {
                return Some(upper[begin..cursor].to_string());
            }
        }

        search_from = begin + 4;
    }

    None
}
