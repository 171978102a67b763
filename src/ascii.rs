//! ASCII to HID keycode translation (US layout).
//!
//! Pure functions, no state. Usable in `const` context so static macro
//! tables can be expanded at compile time.
//!
//! Supported: `a-z`, `A-Z` (with left shift), `0-9`, space, newline (Enter),
//! tab, and the US-layout punctuation set plus its shifted variants.
//! Anything else translates to `None` and is skipped by text expansion.

use crate::event::KeyEvent;
use crate::hid::{usage_id, KeyboardUsage as K, Modifiers};

const SHIFT: Modifiers = Modifiers::LEFT_SHIFT;
const PLAIN: Modifiers = Modifiers::empty();

const LETTER_A: u8 = usage_id(K::KeyboardAa);
const DIGIT_1: u8 = usage_id(K::Keyboard1Exclamation);

/// Translate one character to `(modifier, usage ID)`.
///
/// Returns `None` for characters with no US-layout key (non-ASCII,
/// control characters other than `\n` and `\t`).
#[inline]
pub const fn translate(c: char) -> Option<(Modifiers, u8)> {
    if c.is_ascii() {
        translate_byte(c as u8)
    } else {
        None
    }
}

/// Byte form of [`translate`]. Bytes >= 0x80 are never supported.
pub const fn translate_byte(b: u8) -> Option<(Modifiers, u8)> {
    let (modifier, usage) = match b {
        // Letters and 1-9 are contiguous usage blocks
        b'a'..=b'z' => return Some((PLAIN, LETTER_A + (b - b'a'))),
        b'A'..=b'Z' => return Some((SHIFT, LETTER_A + (b - b'A'))),
        b'1'..=b'9' => return Some((PLAIN, DIGIT_1 + (b - b'1'))),
        b'0' => (PLAIN, K::Keyboard0CloseParens),

        b' ' => (PLAIN, K::KeyboardSpacebar),
        b'\n' => (PLAIN, K::KeyboardEnter),
        b'\t' => (PLAIN, K::KeyboardTab),
        b'-' => (PLAIN, K::KeyboardDashUnderscore),
        b'=' => (PLAIN, K::KeyboardEqualPlus),
        b'[' => (PLAIN, K::KeyboardOpenBracketBrace),
        b']' => (PLAIN, K::KeyboardCloseBracketBrace),
        b'\\' => (PLAIN, K::KeyboardBackslashBar),
        b';' => (PLAIN, K::KeyboardSemiColon),
        b'\'' => (PLAIN, K::KeyboardSingleDoubleQuote),
        b'`' => (PLAIN, K::KeyboardBacktickTilde),
        b',' => (PLAIN, K::KeyboardCommaLess),
        b'.' => (PLAIN, K::KeyboardPeriodGreater),
        b'/' => (PLAIN, K::KeyboardSlashQuestion),

        b'!' => (SHIFT, K::Keyboard1Exclamation),
        b'@' => (SHIFT, K::Keyboard2At),
        b'#' => (SHIFT, K::Keyboard3Hash),
        b'$' => (SHIFT, K::Keyboard4Dollar),
        b'%' => (SHIFT, K::Keyboard5Percent),
        b'^' => (SHIFT, K::Keyboard6Caret),
        b'&' => (SHIFT, K::Keyboard7Ampersand),
        b'*' => (SHIFT, K::Keyboard8Asterisk),
        b'(' => (SHIFT, K::Keyboard9OpenParens),
        b')' => (SHIFT, K::Keyboard0CloseParens),
        b'_' => (SHIFT, K::KeyboardDashUnderscore),
        b'+' => (SHIFT, K::KeyboardEqualPlus),
        b'{' => (SHIFT, K::KeyboardOpenBracketBrace),
        b'}' => (SHIFT, K::KeyboardCloseBracketBrace),
        b'|' => (SHIFT, K::KeyboardBackslashBar),
        b':' => (SHIFT, K::KeyboardSemiColon),
        b'"' => (SHIFT, K::KeyboardSingleDoubleQuote),
        b'~' => (SHIFT, K::KeyboardBacktickTilde),
        b'<' => (SHIFT, K::KeyboardCommaLess),
        b'>' => (SHIFT, K::KeyboardPeriodGreater),
        b'?' => (SHIFT, K::KeyboardSlashQuestion),

        _ => return None,
    };
    Some((modifier, usage_id(usage)))
}

/// Reverse mapping: the character a `(modifier, usage ID)` pair types.
///
/// Only pairs produced by [`translate`] map back; everything else is `None`.
pub fn to_ascii(modifier: Modifiers, keycode: u8) -> Option<char> {
    (0u8..0x80)
        .find(|&b| matches!(translate_byte(b), Some(k) if k == (modifier, keycode)))
        .map(char::from)
}

/// Expand text into key events, skipping untranslatable characters.
pub fn expand(text: &str) -> impl Iterator<Item = KeyEvent> + '_ {
    text.chars()
        .filter_map(translate)
        .map(|(modifier, keycode)| KeyEvent::new(modifier, keycode, 0))
}

/// Number of characters in `text` that [`expand`] would emit.
pub const fn translatable_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut i = 0;
    let mut n = 0;
    while i < bytes.len() {
        if translate_byte(bytes[i]).is_some() {
            n += 1;
        }
        i += 1;
    }
    n
}

/// Compile-time text expansion into a fixed array.
///
/// `L` must equal [`translatable_len`] of `text`; a mismatch fails const
/// evaluation.
///
/// ```
/// use touch_hid_panel::ascii::text_events;
/// use touch_hid_panel::event::KeyEvent;
///
/// const HI: [KeyEvent; 3] = text_events("Hi!");
/// assert_eq!(HI.len(), 3);
/// ```
pub const fn text_events<const L: usize>(text: &str) -> [KeyEvent; L] {
    let bytes = text.as_bytes();
    let mut out = [KeyEvent::EMPTY; L];
    let mut i = 0;
    let mut n = 0;
    while i < bytes.len() {
        if let Some((modifier, keycode)) = translate_byte(bytes[i]) {
            assert!(n < L, "text expands to more events than the array holds");
            out[n] = KeyEvent::new(modifier, keycode, 0);
            n += 1;
        }
        i += 1;
    }
    assert!(n == L, "text expands to fewer events than the array holds");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters() {
        assert_eq!(translate('a'), Some((PLAIN, usage_id(K::KeyboardAa))));
        assert_eq!(translate('z'), Some((PLAIN, usage_id(K::KeyboardZz))));
        assert_eq!(translate('A'), Some((SHIFT, usage_id(K::KeyboardAa))));
        assert_eq!(translate('Q'), Some((SHIFT, usage_id(K::KeyboardQq))));
    }

    #[test]
    fn test_digits() {
        assert_eq!(translate('1'), Some((PLAIN, usage_id(K::Keyboard1Exclamation))));
        assert_eq!(translate('9'), Some((PLAIN, usage_id(K::Keyboard9OpenParens))));
        assert_eq!(translate('0'), Some((PLAIN, usage_id(K::Keyboard0CloseParens))));
    }

    #[test]
    fn test_whitespace() {
        assert_eq!(translate(' '), Some((PLAIN, usage_id(K::KeyboardSpacebar))));
        assert_eq!(translate('\n'), Some((PLAIN, usage_id(K::KeyboardEnter))));
        assert_eq!(translate('\t'), Some((PLAIN, usage_id(K::KeyboardTab))));
        assert_eq!(translate('\r'), None);
    }

    #[test]
    fn test_shifted_punctuation_shares_base_key() {
        for (plain, shifted) in [('1', '!'), ('-', '_'), ('/', '?'), ('`', '~'), ('\'', '"')] {
            let (m0, k0) = translate(plain).unwrap();
            let (m1, k1) = translate(shifted).unwrap();
            assert_eq!(k0, k1, "{plain} and {shifted} share a key");
            assert_eq!(m0, PLAIN);
            assert_eq!(m1, SHIFT);
        }
    }

    #[test]
    fn test_unsupported() {
        assert_eq!(translate('é'), None);
        assert_eq!(translate('€'), None);
        assert_eq!(translate('\x07'), None);
        assert_eq!(translate('\x7f'), None);
    }

    #[test]
    fn test_round_trip_all_supported() {
        let mut supported = 0;
        for b in 0u8..0x80 {
            let c = char::from(b);
            if let Some((m, k)) = translate(c) {
                assert_eq!(to_ascii(m, k), Some(c), "round trip of {:?}", c);
                supported += 1;
            }
        }
        // 26 + 26 letters, 10 digits, 3 whitespace, 32 punctuation
        assert_eq!(supported, 97);
    }

    #[test]
    fn test_reverse_unknown() {
        assert_eq!(to_ascii(PLAIN, usage_id(K::KeyboardF1)), None);
        assert_eq!(to_ascii(Modifiers::LEFT_CTRL, usage_id(K::KeyboardAa)), None);
    }

    #[test]
    fn test_expand_skips_unsupported() {
        let events: Vec<_> = expand("a\u{e9}b\rc").collect();
        assert_eq!(
            events,
            vec![KeyEvent::key(K::KeyboardAa), KeyEvent::key(K::KeyboardBb), KeyEvent::key(K::KeyboardCc)]
        );
    }

    #[test]
    fn test_const_expansion_matches_runtime() {
        const TEXT: &str = "user@example.com";
        const EVENTS: [KeyEvent; translatable_len(TEXT)] = text_events(TEXT);
        let runtime: Vec<_> = expand(TEXT).collect();
        assert_eq!(&EVENTS[..], &runtime[..]);
    }

    #[test]
    fn test_translatable_len_ignores_unsupported() {
        assert_eq!(translatable_len("h\u{e9}llo"), 4);
        assert_eq!(translatable_len(""), 0);
    }
}
