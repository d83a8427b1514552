//! Zero-width character handling shared by matching and editing.
//!
//! Bridges sometimes pad names with invisible characters (U+200B..=U+200D,
//! U+FEFF). Patterns run over the cleaned text, so every prefix the
//! classifier reports is measured in cleaned characters.

#[inline]
pub fn is_zero_width(ch: char) -> bool {
    matches!(ch, '\u{200B}'..='\u{200D}' | '\u{FEFF}')
}

pub fn strip_zero_width(text: &str) -> String {
    text.chars().filter(|c| !is_zero_width(*c)).collect()
}

/// Number of visible (non-zero-width) characters in `text`.
pub fn cleaned_len(text: &str) -> usize {
    text.chars().filter(|c| !is_zero_width(*c)).count()
}

/// Byte offset in `text` just past the first `visible` cleaned characters.
///
/// Zero-width characters before that point are consumed with it; any that
/// follow are left in place. Returns `text.len()` when `text` has fewer
/// visible characters.
pub fn offset_after_visible(text: &str, visible: usize) -> usize {
    if visible == 0 {
        return 0;
    }
    let mut seen = 0;
    for (idx, ch) in text.char_indices() {
        if is_zero_width(ch) {
            continue;
        }
        seen += 1;
        if seen == visible {
            return idx + ch.len_utf8();
        }
    }
    text.len()
}

/// Everything in `full` before the last occurrence of `body`.
///
/// Using the last occurrence keeps bodies that repeat part of the prefix
/// (`[Bob] Bob`) from cutting the prefix short.
pub fn prefix_before_body<'a>(full: &'a str, body: &str) -> &'a str {
    match full.rfind(body) {
        Some(end) => &full[..end],
        None => full,
    }
}

/// Everything in `text` before the last occurrence of `message`, for rules
/// that locate the relayed body themselves. Empty when `message` is absent,
/// so a wrong guess strips nothing.
pub fn prefix_before_message<'a>(text: &'a str, message: &str) -> &'a str {
    text.rfind(message).map_or("", |start| &text[..start])
}
