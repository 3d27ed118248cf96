//! Quote identifiers: `DEV-<YYYYMMDD>-<6 uppercase alphanumerics>`.
//!
//! The suffix is random and nothing checks it against files already on disk,
//! so two quotes generated the same day may in principle collide.

use chrono::{NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

pub const QUOTE_PREFIX: &str = "DEV";
pub const PDF_EXTENSION: &str = "pdf";

const SUFFIX_LEN: usize = 6;

lazy_static! {
    static ref QUOTE_NUMBER_RE: Regex = Regex::new(r"^DEV-\d{8}-[A-Z0-9]{6}$").unwrap();
}

/// Allocate a fresh identifier for today's UTC date.
pub fn generate_quote_number() -> String {
    generate_quote_number_for(Utc::now().date_naive())
}

pub fn generate_quote_number_for(date: NaiveDate) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(SUFFIX_LEN)
        .collect::<String>()
        .to_ascii_uppercase();

    format!("{}-{}-{}", QUOTE_PREFIX, date.format("%Y%m%d"), suffix)
}

pub fn is_quote_number(value: &str) -> bool {
    QUOTE_NUMBER_RE.is_match(value)
}

pub fn pdf_filename(numero: &str) -> String {
    format!("{}.{}", numero, PDF_EXTENSION)
}

/// Extract the identifier from a download filename, if it has the generated form.
pub fn quote_number_from_filename(filename: &str) -> Option<&str> {
    filename
        .strip_suffix(PDF_EXTENSION)
        .and_then(|stem| stem.strip_suffix('.'))
        .filter(|stem| is_quote_number(stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_number_matches_pattern() {
        for _ in 0..200 {
            let numero = generate_quote_number();
            assert!(is_quote_number(&numero), "unexpected identifier {}", numero);
        }
    }

    #[test]
    fn test_number_embeds_given_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        let numero = generate_quote_number_for(date);
        assert!(numero.starts_with("DEV-20250307-"));
        assert_eq!(numero.len(), "DEV-20250307-".len() + 6);
    }

    #[test]
    fn test_numbers_are_mostly_distinct() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let numbers: HashSet<String> = (0..100).map(|_| generate_quote_number_for(date)).collect();
        assert!(numbers.len() > 95);
    }

    #[test]
    fn test_is_quote_number_rejects_other_forms() {
        assert!(is_quote_number("DEV-20250101-A1B2C3"));
        assert!(!is_quote_number("DEV-20250101-a1b2c3"));
        assert!(!is_quote_number("FAC-20250101-A1B2C3"));
        assert!(!is_quote_number("DEV-2025011-A1B2C3"));
        assert!(!is_quote_number("DEV-20250101-A1B2C"));
        assert!(!is_quote_number("DEV-20250101-A1B2C3D"));
        assert!(!is_quote_number(""));
    }

    #[test]
    fn test_quote_number_from_filename() {
        assert_eq!(
            quote_number_from_filename("DEV-20250101-A1B2C3.pdf"),
            Some("DEV-20250101-A1B2C3")
        );
        assert_eq!(quote_number_from_filename("DEV-20250101-A1B2C3.docx"), None);
        assert_eq!(quote_number_from_filename("DEV-20250101-A1B2C3pdf"), None);
        assert_eq!(quote_number_from_filename("../../etc/passwd"), None);
        assert_eq!(quote_number_from_filename("../DEV-20250101-A1B2C3.pdf"), None);
    }

    #[test]
    fn test_pdf_filename() {
        assert_eq!(pdf_filename("DEV-20250101-A1B2C3"), "DEV-20250101-A1B2C3.pdf");
    }
}
