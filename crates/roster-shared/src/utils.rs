//! Utility functions

use regex::Regex;
use std::sync::OnceLock;

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$").expect("static slug regex"))
}

/// Lowercases and drops everything outside `[a-z0-9-]`.
pub fn normalize_slug(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

pub fn is_valid_slug(slug: &str) -> bool {
    slug.len() >= 2 && slug_pattern().is_match(slug)
}

/// Month key in `YYYY-MM` form.
pub fn is_valid_month_key(month: &str) -> bool {
    let bytes = month.as_bytes();
    bytes.len() == 7
        && bytes[4] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..].iter().all(u8::is_ascii_digit)
        && matches!(&month[5..], "01" | "02" | "03" | "04" | "05" | "06" | "07" | "08" | "09" | "10" | "11" | "12")
}

pub fn mask_email(email: &str) -> String {
    if let Some(at_pos) = email.find('@') {
        let (local, domain) = email.split_at(at_pos);
        if local.len() <= 2 {
            format!("{}***{}", &local[..1.min(local.len())], domain)
        } else {
            format!("{}***{}", &local[..2], domain)
        }
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_slug() {
        assert_eq!(normalize_slug("  Acme Corp_1 "), "acmecorp1");
        assert_eq!(normalize_slug("north-wing"), "north-wing");
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("acme"));
        assert!(is_valid_slug("north-wing-2"));
        assert!(!is_valid_slug("a"));
        assert!(!is_valid_slug("-acme"));
        assert!(!is_valid_slug("Acme"));
    }

    #[test]
    fn test_month_key_validation() {
        assert!(is_valid_month_key("2024-11"));
        assert!(!is_valid_month_key("2024-13"));
        assert!(!is_valid_month_key("Nov"));
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("alice@example.com"), "al***@example.com");
        assert_eq!(mask_email("a@example.com"), "a***@example.com");
        assert_eq!(mask_email("nope"), "***");
    }
}
