//! Surrogate-safe JSON decoding.
//!
//! A Rust `str` can never hold a surrogate code point, so surrogates only
//! reach this system as `\uD800`..`\uDFFF` escapes inside JSON text:
//! completion replies, content-source blocks, backend records, request
//! bodies and model-produced argument payloads. `serde_json` rejects a lone
//! escape in that range, failing the whole document, so raw text is passed
//! through [`strip_surrogates`] before it is decoded.
//!
//! A high escape directly followed by a low escape encodes a real character
//! and is kept. `\\` is an escaped backslash, so `\\uD800` is plain text.

use std::borrow::Cow;

use serde::de::DeserializeOwned;

const HIGH_SURROGATES: std::ops::RangeInclusive<u32> = 0xD800..=0xDBFF;
const LOW_SURROGATES: std::ops::RangeInclusive<u32> = 0xDC00..=0xDFFF;

/// Length of one `\uXXXX` escape.
const ESCAPE_LEN: usize = 6;

/// Parse a `\uXXXX` escape at the start of `s`.
fn escape_at(s: &str) -> Option<u32> {
    let digits = s.strip_prefix("\\u")?.get(..4)?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Remove every unpaired surrogate escape from `s`.
///
/// Returns the input unchanged (borrowed) when there is nothing to remove.
pub fn strip_surrogates(s: &str) -> Cow<'_, str> {
    if !s.contains("\\u") {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut removed = false;
    let mut i = 0;

    while i < s.len() {
        let rest = &s[i..];

        if rest.starts_with("\\\\") {
            out.push_str("\\\\");
            i += 2;
            continue;
        }

        match escape_at(rest) {
            Some(code) if HIGH_SURROGATES.contains(&code) => {
                let paired = rest
                    .get(ESCAPE_LEN..)
                    .and_then(escape_at)
                    .is_some_and(|next| LOW_SURROGATES.contains(&next));
                if paired {
                    out.push_str(&rest[..ESCAPE_LEN * 2]);
                    i += ESCAPE_LEN * 2;
                } else {
                    removed = true;
                    i += ESCAPE_LEN;
                }
            }
            Some(code) if LOW_SURROGATES.contains(&code) => {
                removed = true;
                i += ESCAPE_LEN;
            }
            Some(_) => {
                out.push_str(&rest[..ESCAPE_LEN]);
                i += ESCAPE_LEN;
            }
            None => {
                // `rest` is non-empty and starts on a char boundary
                let ch = rest.chars().next().unwrap_or_default();
                out.push(ch);
                i += ch.len_utf8();
            }
        }
    }

    if removed {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(s)
    }
}

/// Decode JSON text after removing its unpaired surrogate escapes.
///
/// Stripping works on the whole document, so keys and values at every depth
/// are covered.
pub fn from_json_str<T: DeserializeOwned>(raw: &str) -> serde_json::Result<T> {
    serde_json::from_str(&strip_surrogates(raw))
}

/// [`from_json_str`] for a raw body. Invalid UTF-8 is replaced with U+FFFD.
pub fn from_json_slice<T: DeserializeOwned>(raw: &[u8]) -> serde_json::Result<T> {
    from_json_str(&String::from_utf8_lossy(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_clean_text_is_borrowed() {
        assert!(matches!(strip_surrogates("hello 세계"), Cow::Borrowed(_)));
        assert!(matches!(strip_surrogates("\\u0041"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_lone_surrogates_removed() {
        assert_eq!(strip_surrogates("a\\uD800b"), "ab");
        assert_eq!(strip_surrogates("a\\udfffb"), "ab");
        assert_eq!(strip_surrogates("\\uD83D"), "");
    }

    #[test]
    fn test_valid_pair_kept() {
        assert_eq!(strip_surrogates("x\\uD83D\\uDE00y"), "x\\uD83D\\uDE00y");
        assert_eq!(strip_surrogates("\\uD83D\\uD83D\\uDE00"), "\\uD83D\\uDE00");
    }

    #[test]
    fn test_escaped_backslash_is_text() {
        assert_eq!(strip_surrogates("\\\\uD800"), "\\\\uD800");
        assert_eq!(strip_surrogates("\\\\\\uD800"), "\\\\");
    }

    #[test]
    fn test_other_code_points_untouched() {
        let input = "C:\\path \\n \\u00e9 💡 \\uE000 \\uzzzz";
        assert_eq!(strip_surrogates(input), input);
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "a\\uD800\\uD800\\uDC00b",
            "\\uDC00\\uD800",
            "\\\\\\uDBFF\\uDFFF\\uDFFF",
            "plain",
        ] {
            let once = strip_surrogates(input).into_owned();
            assert_eq!(strip_surrogates(&once), once.as_str());
        }
    }

    #[test]
    fn test_lone_escape_decodes() {
        let raw = r#"{"query": "notes\ud83d on X"}"#;
        assert!(serde_json::from_str::<Value>(raw).is_err());

        let value: Value = from_json_str(raw).unwrap();
        assert_eq!(value["query"], "notes on X");
    }

    #[test]
    fn test_keys_and_nested_values_decoded() {
        let raw = r#"{"k\uD800ey": ["a\uDC00", {"inner": "b\uD800"}], "n": 3, "ok": "\uD83D\uDE00"}"#;
        let value: Value = from_json_str(raw).unwrap();
        assert_eq!(
            value,
            json!({"key": ["a", {"inner": "b"}], "n": 3, "ok": "😀"})
        );
    }

    #[test]
    fn test_escaped_backslash_survives_decoding() {
        let value: Value = from_json_slice(br#"{"text": "escape \\uD800 here"}"#).unwrap();
        assert_eq!(value["text"], "escape \\uD800 here");
    }

    #[test]
    fn test_from_json_slice_invalid_utf8() {
        let value: Value = from_json_slice(b"{\"t\": \"a\xffb\"}").unwrap();
        assert_eq!(value["t"], "a\u{FFFD}b");
    }

    #[test]
    fn test_malformed_json_still_fails() {
        assert!(from_json_str::<Value>("{\"a\": ").is_err());
    }
}
