mod common;

use common::heuristic_font;
use notice_canvas::fonts::{heuristic_width, is_cjk};
use notice_canvas::wrap::{split_long_word, wrap};
use notice_canvas::{GlyphMetrics, TextRole, FontWeight};

#[test]
fn empty_text_is_one_empty_line() {
    assert_eq!(wrap("", &heuristic_font(), 800.0), vec![String::new()]);
    assert_eq!(wrap("", &heuristic_font(), 1.0), vec![String::new()]);
}

#[test]
fn text_that_fits_is_returned_verbatim() {
    let font = heuristic_font();
    // 11 chars * 18px = 198px
    assert_eq!(font.measure("hello world"), 198.0);
    assert_eq!(wrap("hello world", &font, 198.0), vec!["hello world"]);
    assert_eq!(wrap("  padded  ", &font, 800.0), vec!["  padded  "]);
}

#[test]
fn greedy_packing_fills_each_line() {
    // "aaaa aaaa" = 162px fits in 200, a third word does not
    let lines = wrap("aaaa aaaa aaaa aaaa aaaa", &heuristic_font(), 200.0);
    assert_eq!(lines, vec!["aaaa aaaa", "aaaa aaaa", "aaaa"]);
}

#[test]
fn overlong_word_is_split_at_the_width_limit() {
    // five 18px chars fit in 100px, six do not
    let lines = wrap("abcdefghij", &heuristic_font(), 100.0);
    assert_eq!(lines, vec!["abcde", "fghij"]);
}

#[test]
fn overlong_word_after_a_short_one_starts_its_own_line() {
    let lines = wrap("aa abcdefghij", &heuristic_font(), 100.0);
    assert_eq!(lines, vec!["aa", "abcde", "fghij"]);
}

#[test]
fn split_prefers_breaking_after_punctuation() {
    let font = heuristic_font();
    assert_eq!(split_long_word("abc,defghij", &font, 100.0), vec!["abc,", "defgh", "ij"]);
    assert_eq!(split_long_word("가，나다라", &font, 100.0), vec!["가，", "나다라"]);
}

#[test]
fn trailing_punctuation_breaks_at_the_width_limit() {
    let font = heuristic_font();
    assert_eq!(split_long_word("가나，다라마바", &font, 100.0), vec!["가나，", "다라마", "바"]);
}

#[test]
fn a_single_overflowing_character_gets_its_own_fragment() {
    assert_eq!(split_long_word("ab", &heuristic_font(), 10.0), vec!["a", "b"]);
    assert_eq!(wrap("ab", &heuristic_font(), 10.0), vec!["a", "b"]);
}

#[test]
fn every_wrapped_line_fits_unless_it_is_a_single_character() {
    let font = heuristic_font();
    let text = "주의사항 안내문은 세대 내부 시설물 사용 시 반드시 확인해야 합니다. \
                Keep balcony drains clear,and do not block the ventilation ducts at any time.";
    for width in [120.0, 250.0, 400.0, 800.0] {
        for line in wrap(text, &font, width) {
            assert!(
                font.measure(&line) <= width || line.chars().count() == 1,
                "{line:?} overflows {width}"
            );
        }
    }
}

#[test]
fn wrapping_keeps_every_word() {
    let text = "one two three four five six seven eight nine ten eleven twelve";
    let lines = wrap(text, &heuristic_font(), 150.0);
    assert_eq!(lines.join(" "), text);
}

#[test]
fn heuristic_model_counts_cjk_and_other_glyphs() {
    assert!(is_cjk('가'));
    assert!(is_cjk('漢'));
    assert!(!is_cjk('a'));
    assert_eq!(heuristic_width("가a"), 48.0);
    assert_eq!(heuristic_width("세대 유의"), 4.0 * 30.0 + 18.0);
}

#[test]
fn heuristic_metrics_measure_without_fonts() {
    let metrics = GlyphMetrics::heuristic();
    let font = metrics.resolve_font(TextRole::Body, FontWeight::Regular, 28.0);
    assert!(!font.is_available());
    assert!(!font.is_true_bold());
    assert_eq!(metrics.measure("abc", TextRole::Title, FontWeight::Bold, 36.0), 54.0);
}
