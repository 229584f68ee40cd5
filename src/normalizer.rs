//! Text clean-up around translation calls
//!
//! Everything here is a pure string transform. Pre-processing runs on the
//! source text before it is sent to a backend; post-processing runs on the
//! backend's output before it is published.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::CorrectionDictionary;

/// Character that would notify an account on the publishing platform
pub const MENTION_SIGIL: char = '@';

/// Stand-in for [`MENTION_SIGIL`] so relayed text never mentions anyone
pub const PLACEHOLDER_SIGIL: char = '+';

/// Whitespace between the last placeholder sigil and a trailing word run
static PLACEHOLDER_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.*\+)\s*(\w{1,15}.+)$").unwrap());

/// Which way the `pre` correction dictionary is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Replace keys with values
    Forward,
    /// Replace values with keys
    Reverse,
}

impl Direction {
    /// Forward when translating into the language the dictionary was written for
    pub fn for_target(dictionary: &CorrectionDictionary, target_lang: &str) -> Self {
        if dictionary.pre_target_lang.eq_ignore_ascii_case(target_lang) {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }
}

/// Prepare source text for translation
///
/// Replaces every mention sigil with the placeholder, then applies the `pre`
/// dictionary entries in order.
pub fn pre_process(text: &str, dictionary: &CorrectionDictionary, direction: Direction) -> String {
    let mut text = text.replace(MENTION_SIGIL, &PLACEHOLDER_SIGIL.to_string());
    for (from, to) in &dictionary.pre {
        let (find, replace) = match direction {
            Direction::Forward => (from, to),
            Direction::Reverse => (to, from),
        };
        if find.is_empty() {
            continue;
        }
        text = text.replace(find.as_str(), replace);
    }
    text
}

/// Source text with its links taken out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashedText {
    /// Text to send to the translation backend
    pub text: String,
    /// Links to put back after translation
    pub urls: Vec<String>,
}

/// Remove links (and the whitespace around them) before translation
///
/// Entity URLs are stashed so they can be appended to the translation;
/// media URLs are dropped since the permalink already points at the media.
pub fn stash_urls(text: &str, urls: &[String], media_urls: &[String]) -> StashedText {
    let mut text = text.to_string();
    for url in urls.iter().chain(media_urls) {
        text = strip_url(&text, url);
    }
    StashedText {
        text,
        urls: urls.to_vec(),
    }
}

fn strip_url(text: &str, url: &str) -> String {
    if url.is_empty() {
        return text.to_string();
    }
    match Regex::new(&format!(r"\s*{}\s*", regex::escape(url))) {
        Ok(re) => re.replace_all(text, "").into_owned(),
        Err(_) => text.replace(url, ""),
    }
}

/// Put stashed links back after a non-empty translation
pub fn restore_urls(translated: String, urls: &[String]) -> String {
    if translated.is_empty() || urls.is_empty() {
        return translated;
    }
    format!("{} {}", translated, urls.join(" "))
}

/// Clean up a backend's output
///
/// Applies the `post` dictionary literally in order, decodes HTML entities,
/// turns the full-width number sign into `#`, and removes the whitespace a
/// translator inserts between the last placeholder sigil and the word that
/// followed it. Empty input is returned as is.
pub fn post_process(text: &str, dictionary: &CorrectionDictionary) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut text = text.to_string();
    for (wrong, right) in &dictionary.post {
        if wrong.is_empty() {
            continue;
        }
        text = text.replace(wrong.as_str(), right);
    }

    let text = html_escape::decode_html_entities(&text).replace('＃', "#");

    // The gap may also end right before a single trailing newline
    let (body, newline) = match text.strip_suffix('\n') {
        Some(body) => (body, "\n"),
        None => (text.as_str(), ""),
    };
    match PLACEHOLDER_GAP.captures(body) {
        Some(caps) => {
            let start = caps.get(0).map_or(0, |m| m.start());
            format!("{}{}{}{}", &body[..start], &caps[1], &caps[2], newline)
        }
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary() -> CorrectionDictionary {
        CorrectionDictionary {
            pre: vec![
                ("프리파라".to_string(), "プリパラ".to_string()),
                ("라라".to_string(), "らぁら".to_string()),
            ],
            post: vec![
                ("プリパラ TV".to_string(), "プリパラTV".to_string()),
                ("ガールル".to_string(), "ガァルル".to_string()),
                ("ファールル".to_string(), "ファルル".to_string()),
            ],
            pre_target_lang: "ja".to_string(),
        }
    }

    // ========== Pre-process Tests ==========

    #[test]
    fn test_pre_process_replaces_mentions() {
        let dict = CorrectionDictionary::default();
        assert_eq!(
            pre_process("@PRIPARA_TV 안녕 @anidong3282", &dict, Direction::Forward),
            "+PRIPARA_TV 안녕 +anidong3282"
        );
    }

    #[test]
    fn test_pre_process_forward_dictionary() {
        assert_eq!(
            pre_process("프리파라 라라 방송", &dictionary(), Direction::Forward),
            "プリパラ らぁら 방송"
        );
    }

    #[test]
    fn test_pre_process_reverse_dictionary() {
        assert_eq!(
            pre_process("プリパラ らぁら", &dictionary(), Direction::Reverse),
            "프리파라 라라"
        );
    }

    #[test]
    fn test_pre_process_applies_entries_in_order() {
        let dict = CorrectionDictionary {
            pre: vec![
                ("ab".to_string(), "c".to_string()),
                ("c".to_string(), "d".to_string()),
            ],
            ..Default::default()
        };
        assert_eq!(pre_process("ab", &dict, Direction::Forward), "d");
    }

    #[test]
    fn test_direction_for_target() {
        let dict = dictionary();
        assert_eq!(Direction::for_target(&dict, "ja"), Direction::Forward);
        assert_eq!(Direction::for_target(&dict, "JA"), Direction::Forward);
        assert_eq!(Direction::for_target(&dict, "ko"), Direction::Reverse);
    }

    // ========== URL Stash Tests ==========

    #[test]
    fn test_stash_urls_removes_links_and_spacing() {
        let urls = vec!["https://t.co/abc".to_string()];
        let stashed = stash_urls("방송 시작 https://t.co/abc 보세요", &urls, &[]);
        assert_eq!(stashed.text, "방송 시작보세요");
        assert_eq!(stashed.urls, urls);
    }

    #[test]
    fn test_stash_urls_drops_media_links() {
        let media = vec!["https://t.co/pic".to_string()];
        let stashed = stash_urls("사진 https://t.co/pic", &[], &media);
        assert_eq!(stashed.text, "사진");
        assert!(stashed.urls.is_empty());
    }

    #[test]
    fn test_stash_urls_can_empty_the_text() {
        let urls = vec!["https://t.co/a".to_string()];
        let media = vec!["https://t.co/b".to_string()];
        let stashed = stash_urls(" https://t.co/a https://t.co/b ", &urls, &media);
        assert_eq!(stashed.text, "");
    }

    #[test]
    fn test_stash_urls_escapes_regex_characters() {
        let urls = vec!["https://example.com/a?b=(c)".to_string()];
        let stashed = stash_urls("x https://example.com/a?b=(c)", &urls, &[]);
        assert_eq!(stashed.text, "x");
    }

    #[test]
    fn test_restore_urls() {
        let urls = vec!["https://t.co/a".to_string(), "https://t.co/b".to_string()];
        assert_eq!(
            restore_urls("放送開始".to_string(), &urls),
            "放送開始 https://t.co/a https://t.co/b"
        );
        assert_eq!(restore_urls(String::new(), &urls), "");
        assert_eq!(restore_urls("x".to_string(), &[]), "x");
    }

    // ========== Post-process Tests ==========

    #[test]
    fn test_post_process_empty_input() {
        assert_eq!(post_process("", &dictionary()), "");
    }

    #[test]
    fn test_post_process_applies_each_dictionary_entry() {
        let dict = dictionary();
        assert_eq!(post_process("プリパラ TV", &dict), "プリパラTV");
        assert_eq!(post_process("ガールル", &dict), "ガァルル");
        assert_eq!(post_process("ファールル", &dict), "ファルル");
    }

    #[test]
    fn test_post_process_unescapes_html() {
        let dict = CorrectionDictionary::default();
        assert_eq!(
            post_process("&quot;ライブ&quot; &amp; &lt;3", &dict),
            "\"ライブ\" & <3"
        );
    }

    #[test]
    fn test_post_process_normalizes_number_sign() {
        let dict = CorrectionDictionary::default();
        assert_eq!(post_process("＃プリパラ", &dict), "#プリパラ");
    }

    #[test]
    fn test_post_process_closes_placeholder_gap() {
        let dict = CorrectionDictionary::default();
        assert_eq!(
            post_process("こんにちは+ PRIPARA_TV さん", &dict),
            "こんにちは+PRIPARA_TV さん"
        );
    }

    #[test]
    fn test_post_process_uses_last_placeholder() {
        let dict = CorrectionDictionary::default();
        assert_eq!(post_process("+a と+ bc です", &dict), "+a と+bc です");
    }

    #[test]
    fn test_post_process_keeps_earlier_lines() {
        let dict = CorrectionDictionary::default();
        assert_eq!(
            post_process("一行目\n二行目+ name です", &dict),
            "一行目\n二行目+name です"
        );
    }

    #[test]
    fn test_post_process_closes_gap_before_trailing_newline() {
        let dict = CorrectionDictionary::default();
        assert_eq!(
            post_process("こんにちは+ PRIPARA_TV さん\n", &dict),
            "こんにちは+PRIPARA_TV さん\n"
        );
        // Only one trailing newline is looked through
        assert_eq!(
            post_process("こんにちは+ PRIPARA_TV さん\n\n", &dict),
            "こんにちは+ PRIPARA_TV さん\n\n"
        );
    }

    #[test]
    fn test_post_process_without_placeholder_is_unchanged() {
        let dict = CorrectionDictionary::default();
        assert_eq!(post_process("普通の文章です", &dict), "普通の文章です");
    }
}
