//! Matching a line count predicted during layout against the wrap computed at paint time.
//!
//! This is the only place where the two passes may disagree. The rules:
//!
//! * no prediction: the natural wrap is used;
//! * a prediction of one line: the whole text is one line;
//! * natural and predicted within one line of each other: the text is forced
//!   to exactly the predicted count, splitting words by count or merging
//!   natural lines;
//! * anything further apart: the prediction is stale and the natural wrap wins.

use crate::fonts::FontHandle;
use crate::wrap::wrap;

pub fn reconcile(
    text: &str,
    font: &FontHandle,
    max_width: f32,
    predicted: Option<usize>,
) -> Vec<String> {
    let natural = wrap(text, font, max_width);
    let Some(predicted) = predicted else {
        return natural;
    };
    let predicted = predicted.max(1);

    // A one-line slot never takes a second line, however far the natural wrap runs.
    if predicted == 1 {
        if natural.len() != 1 {
            log::debug!(
                "reconcile: keeping {} natural lines as a single line",
                natural.len()
            );
        }
        return vec![text.to_string()];
    }

    if natural.len().abs_diff(predicted) > 1 {
        log::debug!(
            "reconcile: prediction {predicted} is stale against {} natural lines",
            natural.len()
        );
        return natural;
    }

    if natural.len() < predicted {
        let words: Vec<&str> = text.split_whitespace().collect();
        split_into_lines(&words, predicted)
    } else if natural.len() > predicted {
        merge_into_lines(&natural, predicted)
    } else {
        natural
    }
}

/// Distribute words over `target` lines by count; the last line absorbs the remainder.
/// Empty groups are dropped, but at least one (possibly empty) line is returned.
pub fn split_into_lines(words: &[&str], target: usize) -> Vec<String> {
    let target = target.max(1);
    let per_line = (words.len() / target).max(1);

    let mut lines: Vec<String> = (0..target)
        .map(|i| {
            let start = (i * per_line).min(words.len());
            let end = if i == target - 1 {
                words.len()
            } else {
                ((i + 1) * per_line).min(words.len())
            };
            words[start..end].join(" ")
        })
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Merge adjacent lines into `target` lines. Group `k` ends once the running
/// count of consumed lines reaches `floor((k + 1) * len / target)`.
pub fn merge_into_lines(lines: &[String], target: usize) -> Vec<String> {
    let target = target.max(1);
    if target >= lines.len() {
        return lines.to_vec();
    }

    let mut merged: Vec<String> = Vec::with_capacity(target);
    let mut current = String::new();
    let mut consumed = 0usize;

    for (i, line) in lines.iter().enumerate() {
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(line);
        consumed += 1;

        let running_target = (merged.len() + 1) * lines.len() / target;
        if consumed >= running_target || i == lines.len() - 1 {
            merged.push(std::mem::take(&mut current));
        }
    }
    merged
}
