//! Text helpers: counting, truncation and snippet cleanup.

use std::sync::OnceLock;

use regex::Regex;

/// Characters per page used by [`estimate_pages`]
pub const CHARS_PER_PAGE: f64 = 1800.0;

/// Share of the budget past which a sentence boundary is accepted
const SENTENCE_BACKOFF_RATIO: f64 = 0.6;

static HTML_TAG: OnceLock<Regex> = OnceLock::new();

/// Count whitespace-delimited tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Count characters (Unicode scalar values)
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Estimate a page count as `chars / 1800`, rounded to one decimal.
///
/// Rounds the exact binary value of the quotient, ties to even, so
/// 270 characters give 0.1 pages and 450 give 0.2.
pub fn estimate_pages(chars: usize) -> f64 {
    let pages = chars as f64 / CHARS_PER_PAGE;
    format!("{:.1}", pages).parse().unwrap_or(pages)
}

/// Keep at most `max_chars` characters, never splitting a code point
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Cut `text` to `max_chars` characters, preferring to end on a full stop.
///
/// The cut backs off to the last `.` only when that period lies past 60% of
/// the budget; otherwise the raw character boundary is kept. Returns the
/// text unchanged when it already fits.
pub fn truncate_at_sentence(text: &str, max_chars: usize) -> &str {
    let cut = truncate_chars(text, max_chars);
    if cut.len() == text.len() {
        return text;
    }

    if let Some(dot) = cut.rfind('.') {
        let dot_chars = char_count(&cut[..dot]);
        if dot_chars as f64 > max_chars as f64 * SENTENCE_BACKOFF_RATIO {
            return &cut[..dot + 1];
        }
    }

    cut
}

/// Strip HTML tags and decode the handful of entities search snippets use
pub fn clean_snippet(snippet: &str) -> String {
    let re = HTML_TAG.get_or_init(|| Regex::new(r"<[^>]+>").unwrap());
    re.replace_all(snippet, "")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let text = "Фотосинтез —  процесс\nобразования\tвеществ";
        assert_eq!(word_count(text), 5);
        assert_eq!(char_count("привет"), 6);
        assert_eq!(word_count("   "), 0);
    }

    #[test]
    fn test_estimate_pages() {
        assert_eq!(estimate_pages(0), 0.0);
        assert_eq!(estimate_pages(1800), 1.0);
        assert_eq!(estimate_pages(2700), 1.5);
        assert_eq!(estimate_pages(1000), 0.6);
        assert_eq!(estimate_pages(9000), 5.0);
    }

    #[test]
    fn test_estimate_pages_ties() {
        // quotients ending in 5 at the second decimal
        assert_eq!(estimate_pages(270), 0.1);
        assert_eq!(estimate_pages(450), 0.2);
        assert_eq!(estimate_pages(630), 0.3);
        assert_eq!(estimate_pages(810), 0.5);
        assert_eq!(estimate_pages(2250), 1.2);
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("абвгд", 3), "абв");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_truncate_at_sentence_backs_off() {
        let text = "First sentence here. Second sentence goes on and on";
        // budget 30: cut is "First sentence here. Second se", period at 19 chars > 18
        assert_eq!(truncate_at_sentence(text, 30), "First sentence here.");
    }

    #[test]
    fn test_truncate_at_sentence_keeps_raw_cut_when_period_too_early() {
        let text = "Short. Then a very long clause without any full stop at all";
        // period at 5 chars, well under 60% of 40
        let cut = truncate_at_sentence(text, 40);
        assert_eq!(char_count(cut), 40);
        assert!(!cut.ends_with('.'));
    }

    #[test]
    fn test_truncate_at_sentence_fits() {
        assert_eq!(truncate_at_sentence("Fits.", 100), "Fits.");
    }

    #[test]
    fn test_clean_snippet() {
        let raw = r#"<span class="searchmatch">Photosynthesis</span> is &quot;light&quot; &amp; more&nbsp;"#;
        assert_eq!(clean_snippet(raw), "Photosynthesis is \"light\" & more ");
    }
}
