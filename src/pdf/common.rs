//! Text helpers shared by the PDF templates.

use chrono::NaiveDate;

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Shorten `text` to at most `max_chars` characters, ending with `...`.
pub fn truncate(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

/// Split `text` into at most two lines of `width` characters, word by word.
/// Whatever does not fit on the first line goes to the second, truncated.
pub fn wrap_two_lines(text: &str, width: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if text.chars().count() <= width {
        return vec![text.to_string()];
    }

    let mut first = String::new();
    let mut rest = String::new();
    for word in text.split_whitespace() {
        let candidate_len = first.chars().count() + word.chars().count() + usize::from(!first.is_empty());
        if rest.is_empty() && candidate_len <= width {
            if !first.is_empty() {
                first.push(' ');
            }
            first.push_str(word);
        } else {
            if !rest.is_empty() {
                rest.push(' ');
            }
            rest.push_str(word);
        }
    }

    if first.is_empty() {
        return vec![truncate(text, width)];
    }

    let mut lines = vec![first];
    if !rest.is_empty() {
        lines.push(truncate(&rest, width));
    }
    lines
}

/// `adresse, cp_ville`, skipping empty parts.
pub fn join_address(adresse: &str, cp_ville: &str) -> String {
    [adresse.trim(), cp_ville.trim()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

/// Display a percentage without a spurious trailing `.0`.
pub fn format_rate(rate: f64) -> String {
    format!("{}%", rate)
}
