use crate::fonts::FontHandle;

/// Characters after which an overlong word is preferably broken.
const BREAK_AFTER: &[char] = &[',', '.', ';', ':', '，', '。', '；', '：'];

/// Greedy word wrap. Always returns at least one line; empty input yields `[""]`.
pub fn wrap(text: &str, font: &FontHandle, max_width: f32) -> Vec<String> {
    if font.measure(text) <= max_width {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() {
            let candidate = format!("{current} {word}");
            if font.measure(&candidate) <= max_width {
                current = candidate;
                continue;
            }
            lines.push(std::mem::take(&mut current));
        }

        if font.measure(word) <= max_width {
            current.push_str(word);
        } else {
            let mut fragments = split_long_word(word, font, max_width);
            current = fragments.pop().unwrap_or_default();
            lines.extend(fragments);
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Break a word that is wider than `max_width` into fragments that each fit.
///
/// Characters are packed until the next one would overflow. A fragment of more
/// than one character is cut after its last `BREAK_AFTER` mark when it has one,
/// otherwise at the width limit. A single character that alone overflows
/// becomes its own fragment.
pub fn split_long_word(word: &str, font: &FontHandle, max_width: f32) -> Vec<String> {
    let mut fragments: Vec<String> = Vec::new();
    let mut current = String::new();

    for ch in word.chars() {
        loop {
            let mut candidate = current.clone();
            candidate.push(ch);
            if current.is_empty() || font.measure(&candidate) <= max_width {
                current = candidate;
                break;
            }
            let cut = punctuation_cut(&current).unwrap_or(current.len());
            let rest = current.split_off(cut);
            fragments.push(std::mem::replace(&mut current, rest));
        }
    }

    if !current.is_empty() {
        fragments.push(current);
    }
    if fragments.is_empty() {
        fragments.push(word.to_string());
    }
    fragments
}

/// Byte offset just after the last break mark, when that mark is not the fragment's final char.
fn punctuation_cut(fragment: &str) -> Option<usize> {
    if fragment.chars().nth(1).is_none() {
        return None;
    }
    fragment
        .char_indices()
        .filter(|(_, c)| BREAK_AFTER.contains(c))
        .map(|(i, c)| i + c.len_utf8())
        .filter(|&end| end < fragment.len())
        .last()
}
