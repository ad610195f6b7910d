//! Reversible identifier obfuscation used for share links and tenant keys.
//!
//! The substitution step only keeps tokens from being trivially readable as
//! `storeId|bucket`; it is obfuscation and offers no confidentiality.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use once_cell::sync::Lazy;
use regex::Regex;

pub const LINK_MARKER: &str = "b-";

static URL_SAFE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("URL_SAFE_TOKEN is a valid regex pattern"));

fn substitute(ch: char) -> char {
    match ch {
        'A' => 'Z',
        'B'..='V' => shift(ch, 3),
        'W'..='Z' => shift(ch, -22),
        'a' => 'z',
        'b'..='v' => shift(ch, 3),
        'w'..='z' => shift(ch, -22),
        '0'..='9' => swap_digit(ch),
        _ => ch,
    }
}

fn unsubstitute(ch: char) -> char {
    match ch {
        'Z' => 'A',
        'E'..='Y' => shift(ch, -3),
        'A'..='D' => shift(ch, 22),
        'z' => 'a',
        'e'..='y' => shift(ch, -3),
        'a'..='d' => shift(ch, 22),
        // the digit table is its own inverse
        '0'..='9' => swap_digit(ch),
        _ => ch,
    }
}

fn shift(ch: char, by: i8) -> char {
    ((ch as u8 as i16) + by as i16) as u8 as char
}

fn swap_digit(ch: char) -> char {
    match ch {
        '1' => '9',
        '9' => '1',
        '2' => '3',
        '3' => '2',
        '4' => '5',
        '5' => '4',
        '6' => '0',
        '0' => '6',
        '7' => '8',
        '8' => '7',
        other => other,
    }
}

pub fn is_url_safe_token(value: &str) -> bool {
    URL_SAFE_TOKEN.is_match(value)
}

/// Substitutes then base64url-encodes (unpadded) the input.
pub fn encode_identifier(text: &str) -> String {
    let secured: String = text.chars().map(substitute).collect();
    URL_SAFE_NO_PAD.encode(secured.as_bytes())
}

/// Inverse of [`encode_identifier`]. Anything that is not a decodable token is
/// treated as plaintext and returned unchanged.
pub fn decode_identifier(token: &str) -> String {
    if !is_url_safe_token(token) {
        return token.to_string();
    }

    let Ok(bytes) = URL_SAFE_NO_PAD.decode(token) else {
        return token.to_string();
    };

    match String::from_utf8(bytes) {
        Ok(decoded) => decoded.chars().map(unsubstitute).collect(),
        Err(_) => token.to_string(),
    }
}

pub fn tenant_key(store_id: &str, bucket: &str) -> String {
    encode_identifier(&format!("{}|{}", store_id, bucket))
}

pub fn is_prefixed(value: &str) -> bool {
    value
        .strip_prefix(LINK_MARKER)
        .is_some_and(is_url_safe_token)
}

pub fn strip_prefix(value: &str) -> &str {
    value.strip_prefix(LINK_MARKER).unwrap_or(value)
}

/// Resolves one share-link segment. Unprefixed segments predate link
/// obfuscation and are used literally.
pub fn resolve_segment(raw: &str) -> String {
    if is_prefixed(raw) {
        decode_identifier(strip_prefix(raw))
    } else {
        raw.to_string()
    }
}

/// Legacy single-segment tenant encoding of `storeId:bucket`.
pub fn decode_tenant(encoded: &str) -> (String, String) {
    let stripped = strip_prefix(encoded);
    let mut raw = stripped.to_string();

    if is_url_safe_token(stripped) {
        let maybe = decode_identifier(stripped);
        if maybe.contains(':') {
            raw = maybe;
        }
    }

    match raw.split_once(':') {
        Some((store_id, rest)) => {
            let bucket = rest.split(':').next().unwrap_or_default();
            (store_id.to_string(), bucket.to_string())
        }
        None => (raw, String::new()),
    }
}

pub fn encode_segment(value: &str) -> String {
    format!("{}{}", LINK_MARKER, encode_identifier(value))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub store_id: String,
    pub bucket: String,
    pub quiz_id: String,
}

impl ShareLink {
    pub fn new(store_id: &str, bucket: &str, quiz_id: &str) -> Self {
        Self {
            store_id: store_id.to_string(),
            bucket: bucket.to_string(),
            quiz_id: quiz_id.to_string(),
        }
    }

    pub fn from_segments(store_segment: &str, bucket_segment: &str, quiz_id: &str) -> Self {
        Self {
            store_id: resolve_segment(store_segment),
            bucket: resolve_segment(bucket_segment),
            quiz_id: quiz_id.to_string(),
        }
    }

    pub fn path(&self) -> String {
        format!(
            "/q/{}/{}/{}",
            encode_segment(&self.store_id),
            encode_segment(&self.bucket),
            self.quiz_id
        )
    }

    pub fn url(&self, public_base: &str) -> String {
        format!("{}{}", public_base.trim_end_matches('/'), self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_matches_known_vector() {
        // "ab" substitutes to "ze", which is "emU" in unpadded base64url
        assert_eq!(encode_identifier("ab"), "emU");
        assert_eq!(decode_identifier("emU"), "ab");
    }

    #[test]
    fn round_trips_printable_ascii() {
        let printable: String = (0x20u8..0x7f).map(|b| b as char).collect();
        for window in printable.as_bytes().chunks(7) {
            let s = std::str::from_utf8(window).unwrap();
            assert_eq!(decode_identifier(&encode_identifier(s)), s, "input {:?}", s);
        }
        assert_eq!(decode_identifier(&encode_identifier(&printable)), printable);
    }

    #[test]
    fn round_trips_text_outside_substitution_tables() {
        let input = "pantry-42|bücket ✓";
        assert_eq!(decode_identifier(&encode_identifier(input)), input);
    }

    #[test]
    fn empty_string_round_trips() {
        assert_eq!(encode_identifier(""), "");
        assert_eq!(decode_identifier(""), "");
    }

    #[test]
    fn decode_returns_non_token_input_unchanged() {
        assert_eq!(decode_identifier("not a token!"), "not a token!");
        assert_eq!(decode_identifier("abc=="), "abc==");
        assert_eq!(decode_identifier("a+b/c"), "a+b/c");
    }

    #[test]
    fn decode_returns_undecodable_token_unchanged() {
        // a single base64 character can never be a complete encoding
        assert_eq!(decode_identifier("A"), "A");
    }

    #[test]
    fn tenant_key_is_deterministic_and_distinct() {
        let pairs = [
            ("store-1", "fantoms"),
            ("store-1", "other"),
            ("store-2", "fantoms"),
            ("store", "-1|fantoms"),
            ("", ""),
        ];
        let keys: Vec<String> = pairs.iter().map(|(s, b)| tenant_key(s, b)).collect();

        for ((s, b), key) in pairs.iter().zip(&keys) {
            assert_eq!(&tenant_key(s, b), key);
        }

        let mut unique = keys.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), keys.len());
    }

    #[test]
    fn prefix_detection() {
        assert!(is_prefixed("b-abc123"));
        assert!(!is_prefixed("abc123"));
        assert!(!is_prefixed("b-"));
        assert!(!is_prefixed("b-abc/123"));
        assert_eq!(strip_prefix("b-abc"), "abc");
        assert_eq!(strip_prefix("abc"), "abc");
    }

    #[test]
    fn resolve_segment_falls_back_to_plaintext() {
        assert_eq!(resolve_segment(&encode_segment("my-pantry")), "my-pantry");
        assert_eq!(resolve_segment("my-pantry"), "my-pantry");
        assert_eq!(resolve_segment("b-***"), "b-***");
    }

    #[test]
    fn decode_tenant_handles_encoded_and_plain_forms() {
        let encoded = encode_identifier("store-9:fantoms");
        assert_eq!(
            decode_tenant(&encoded),
            ("store-9".to_string(), "fantoms".to_string())
        );
        assert_eq!(
            decode_tenant("plainstore"),
            ("plainstore".to_string(), String::new())
        );
    }

    #[test]
    fn share_link_round_trips_through_segments() {
        let link = ShareLink::new("pantry-uuid-1", "fantoms", "quiz-7");
        let path = link.path();
        assert!(path.starts_with("/q/b-"));

        let segments: Vec<&str> = path.trim_start_matches("/q/").split('/').collect();
        assert_eq!(segments.len(), 3);

        let parsed = ShareLink::from_segments(segments[0], segments[1], segments[2]);
        assert_eq!(parsed, link);
        assert_eq!(
            link.url("https://quiz.example.com/"),
            format!("https://quiz.example.com{}", path)
        );
    }
}
