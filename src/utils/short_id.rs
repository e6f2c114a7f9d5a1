//! Deterministic short id generation and id path validation.
//!
//! Ids are a pure function of the normalized URL. The id space is small, so
//! two different URLs can map to the same id; the write path treats that as
//! a conflict.

use regex::Regex;

const HASH_SEED: u32 = 5381;
const HASH_MULTIPLIER: u32 = 33;
const PAD_CHAR: char = '0';

/// Hashes `normalized_url` into an id of exactly `length` characters in `[0-9a-z]`.
///
/// Multiplicative rolling hash over the UTF-16 code units, last unit first,
/// XOR-folded per unit and kept to 32 bits. The result is base-36 encoded,
/// right-padded with `'0'` and truncated.
pub fn id_for(normalized_url: &str, length: usize) -> String {
    let units: Vec<u16> = normalized_url.encode_utf16().collect();
    let hash = units.iter().rev().fold(HASH_SEED, |hash, &unit| {
        hash.wrapping_mul(HASH_MULTIPLIER) ^ u32::from(unit)
    });

    let mut id = to_base36(hash);
    while id.len() < length {
        id.push(PAD_CHAR);
    }
    id.truncate(length);
    id
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Validates id path segments against `^[A-Za-z0-9_-]{length}$`.
///
/// Built once at startup from the configured id length and shared read-only.
#[derive(Debug, Clone)]
pub struct IdMatcher {
    pattern: Regex,
}

impl IdMatcher {
    /// # Errors
    ///
    /// Returns the regex build error, which only happens for absurd lengths.
    pub fn new(length: usize) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!("^[A-Za-z0-9_-]{{{}}}$", length))?;
        Ok(Self { pattern })
    }

    pub fn is_valid(&self, candidate: &str) -> bool {
        self.pattern.is_match(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_deterministic() {
        let url = "https://example.com/some/path?q=1";
        let first = id_for(url, 14);

        for _ in 0..10 {
            assert_eq!(id_for(url, 14), first);
        }
    }

    #[test]
    fn test_id_has_exact_length_and_alphabet() {
        for length in [10, 14, 20, 64] {
            let id = id_for("https://example.com/", length);
            assert_eq!(id.len(), length);
            assert!(
                id.chars()
                    .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
            );
        }
    }

    #[test]
    fn test_short_hash_is_right_padded() {
        // 5381 * 33 ^ 'a' = 177573 ^ 97 = 177604
        assert_eq!(to_base36(177_604), "3t1g");
        assert_eq!(id_for("a", 10), "3t1g000000");
    }

    #[test]
    fn test_units_are_folded_last_first() {
        assert_eq!(id_for("ab", 10), "3hmfa00000");
        assert_eq!(id_for("ba", 10), "3hmau00000");
    }

    #[test]
    fn test_hash_runs_over_utf16_units() {
        assert_eq!(id_for("https://example.com/é", 10), "wb6b6d0000");
        // Surrogate pair: two units.
        assert_eq!(id_for("https://example.com/\u{1F600}", 10), "kbxzfl0000");
    }

    #[test]
    fn test_empty_input_uses_seed() {
        assert_eq!(id_for("", 10), format!("{:0<10}", to_base36(HASH_SEED)));
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(u32::MAX), "1z141z3");
    }

    #[test]
    fn test_different_urls_usually_differ() {
        assert_ne!(
            id_for("https://example.com/a", 14),
            id_for("https://example.com/b", 14)
        );
    }

    #[test]
    fn test_id_matcher() {
        let matcher = IdMatcher::new(10).unwrap();

        assert!(matcher.is_valid("abcDEF_-09"));
        assert!(!matcher.is_valid("abc"));
        assert!(!matcher.is_valid("abcdefghijk"));
        assert!(!matcher.is_valid("abcdefghi!"));
        assert!(!matcher.is_valid("abcdefghi/"));
    }
}
