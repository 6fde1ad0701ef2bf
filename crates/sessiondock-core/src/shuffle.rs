//! Reversible URL shuffling.
//!
//! A [`ShuffleDictionary`] is a permutation of [`BASE_ALPHABET`]. Each
//! alphabet character is replaced by the dictionary character at its base
//! index offset by its position in the string, so the same character maps
//! differently along the URL. Percent escapes and characters outside the
//! alphabet pass through untouched.
//!
//! Shuffled strings carry the [`SHUFFLED_PREFIX`] marker; shuffling is
//! idempotent and unshuffling a string without the marker is a no-op.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Characters the shuffler substitutes.
pub const BASE_ALPHABET: &str = "0123456789abcdefghijklmnopqrstuvwxyz~-";

/// Marker prepended to shuffled strings.
pub const SHUFFLED_PREFIX: &str = "_rhs";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ShuffleError {
    #[error("shuffle dictionary must have {expected} characters, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("shuffle dictionary is not a permutation of the base alphabet (offending {0:?})")]
    NotAPermutation(char),
}

/// Server-provided substitution table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShuffleDictionary {
    chars: Vec<char>,
}

impl ShuffleDictionary {
    /// Validate a dictionary string.
    pub fn new(dictionary: &str) -> Result<Self, ShuffleError> {
        let chars: Vec<char> = dictionary.chars().collect();
        let expected = BASE_ALPHABET.len();
        if chars.len() != expected {
            return Err(ShuffleError::WrongLength {
                expected,
                actual: chars.len(),
            });
        }

        let mut seen = Vec::with_capacity(expected);
        for &c in &chars {
            if !BASE_ALPHABET.contains(c) || seen.contains(&c) {
                return Err(ShuffleError::NotAPermutation(c));
            }
            seen.push(c);
        }

        Ok(Self { chars })
    }

    /// A random permutation of the base alphabet.
    pub fn generate() -> Self {
        let mut chars: Vec<char> = BASE_ALPHABET.chars().collect();
        chars.shuffle(&mut rand::thread_rng());
        Self { chars }
    }

    /// The dictionary that maps every character to itself.
    pub fn identity() -> Self {
        Self {
            chars: BASE_ALPHABET.chars().collect(),
        }
    }

    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }

    fn index_of(&self, c: char) -> Option<usize> {
        self.chars.iter().position(|&d| d == c)
    }
}

impl TryFrom<String> for ShuffleDictionary {
    type Error = ShuffleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ShuffleDictionary> for String {
    fn from(value: ShuffleDictionary) -> Self {
        value.as_string()
    }
}

/// Applies a [`ShuffleDictionary`] to strings.
#[derive(Debug, Clone)]
pub struct StrShuffler {
    dictionary: ShuffleDictionary,
    base: Vec<char>,
}

impl StrShuffler {
    pub fn new(dictionary: ShuffleDictionary) -> Self {
        Self {
            dictionary,
            base: BASE_ALPHABET.chars().collect(),
        }
    }

    /// Obfuscate `input`. Already shuffled input is returned unchanged.
    pub fn shuffle(&self, input: &str) -> String {
        if input.starts_with(SHUFFLED_PREFIX) {
            return input.to_string();
        }

        let len = self.base.len();
        let mapped = map_chars(input, |c, i| {
            let idx = self.base.iter().position(|&b| b == c)?;
            Some(self.dictionary.chars[(idx + i) % len])
        });

        format!("{SHUFFLED_PREFIX}{mapped}")
    }

    /// Reverse [`shuffle`](Self::shuffle). Input without the marker is returned unchanged.
    pub fn unshuffle(&self, input: &str) -> String {
        let Some(body) = input.strip_prefix(SHUFFLED_PREFIX) else {
            return input.to_string();
        };

        let len = self.base.len();
        map_chars(body, |c, i| {
            let idx = self.dictionary.index_of(c)?;
            Some(self.base[(idx + len - i % len) % len])
        })
    }
}

/// Walk `input`, substituting characters via `f(char, position)`.
///
/// Positions count UTF-16 code units so offsets agree with the server for
/// text outside the BMP. `%XX` escapes are copied verbatim; `None` from `f`
/// keeps the character.
fn map_chars(input: &str, f: impl Fn(char, usize) -> Option<char>) -> String {
    let total: usize = input.encode_utf16().count();
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    let mut pos = 0;

    while let Some(c) = chars.next() {
        if c == '%' && total - pos >= 3 {
            out.push(c);
            pos += 1;
            for escaped in chars.by_ref().take(2) {
                out.push(escaped);
                pos += escaped.len_utf16();
            }
            continue;
        }

        out.push(f(c, pos).unwrap_or(c));
        pos += c.len_utf16();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.example.com/search?q=rust%20lang&page=2";

    mod dictionary {
        use super::*;

        #[test]
        fn generated_dictionary_is_valid() {
            let dict = ShuffleDictionary::generate();
            assert!(ShuffleDictionary::new(&dict.as_string()).is_ok());
        }

        #[test]
        fn rejects_wrong_length() {
            let err = ShuffleDictionary::new("abc").unwrap_err();
            assert_eq!(
                err,
                ShuffleError::WrongLength {
                    expected: 38,
                    actual: 3
                }
            );
        }

        #[test]
        fn rejects_duplicates() {
            let mut dict = BASE_ALPHABET.to_string();
            dict.replace_range(0..1, "1");
            assert_eq!(
                ShuffleDictionary::new(&dict).unwrap_err(),
                ShuffleError::NotAPermutation('1')
            );
        }

        #[test]
        fn rejects_foreign_characters() {
            let mut dict = BASE_ALPHABET.to_string();
            dict.replace_range(0..1, "Z");
            assert_eq!(
                ShuffleDictionary::new(&dict).unwrap_err(),
                ShuffleError::NotAPermutation('Z')
            );
        }

        #[test]
        fn deserializes_from_json_string() {
            let json = serde_json::to_string(BASE_ALPHABET).unwrap();
            let dict: ShuffleDictionary = serde_json::from_str(&json).unwrap();
            assert_eq!(dict, ShuffleDictionary::identity());
        }

        #[test]
        fn invalid_json_dictionary_fails() {
            assert!(serde_json::from_str::<ShuffleDictionary>(r#""short""#).is_err());
        }
    }

    mod shuffler {
        use super::*;

        #[test]
        fn round_trip_with_random_dictionary() {
            let shuffler = StrShuffler::new(ShuffleDictionary::generate());
            let shuffled = shuffler.shuffle(URL);

            assert!(shuffled.starts_with(SHUFFLED_PREFIX));
            assert_eq!(shuffler.unshuffle(&shuffled), URL);
        }

        #[test]
        fn shuffled_output_differs_from_input() {
            let shuffler = StrShuffler::new(ShuffleDictionary::generate());
            let shuffled = shuffler.shuffle(URL);

            assert_ne!(&shuffled[SHUFFLED_PREFIX.len()..], URL);
        }

        #[test]
        fn identity_dictionary_still_rotates_by_position() {
            let shuffler = StrShuffler::new(ShuffleDictionary::identity());
            // '0' at 0 stays '0', '0' at 1 becomes '1', '0' at 2 becomes '2'
            assert_eq!(shuffler.shuffle("000"), "_rhs012");
        }

        #[test]
        fn percent_escapes_and_symbols_pass_through() {
            let shuffler = StrShuffler::new(ShuffleDictionary::generate());
            let shuffled = shuffler.shuffle("%2F:/?");
            assert_eq!(shuffled, "_rhs%2F:/?");
        }

        #[test]
        fn uppercase_is_untouched() {
            let shuffler = StrShuffler::new(ShuffleDictionary::generate());
            assert_eq!(shuffler.shuffle("ABC"), "_rhsABC");
        }

        #[test]
        fn shuffle_is_idempotent() {
            let shuffler = StrShuffler::new(ShuffleDictionary::generate());
            let once = shuffler.shuffle(URL);
            assert_eq!(shuffler.shuffle(&once), once);
        }

        #[test]
        fn unshuffle_without_marker_is_noop() {
            let shuffler = StrShuffler::new(ShuffleDictionary::generate());
            assert_eq!(shuffler.unshuffle(URL), URL);
        }

        #[test]
        fn trailing_percent_is_substituted_as_plain_char() {
            let shuffler = StrShuffler::new(ShuffleDictionary::generate());
            let shuffled = shuffler.shuffle("ab%");
            assert!(shuffled.ends_with('%'));
            assert_eq!(shuffler.unshuffle(&shuffled), "ab%");
        }

        #[test]
        fn astral_chars_count_as_two_positions() {
            let shuffler = StrShuffler::new(ShuffleDictionary::identity());
            // the emoji is two UTF-16 units, so 'a' sits at 2 and 'b' at 3
            assert_eq!(shuffler.shuffle("\u{1F600}ab"), "_rhs\u{1F600}ce");
            assert_eq!(shuffler.unshuffle("_rhs\u{1F600}ce"), "\u{1F600}ab");
        }

        #[test]
        fn escape_after_astral_char_keeps_offsets() {
            let shuffler = StrShuffler::new(ShuffleDictionary::identity());
            assert_eq!(shuffler.shuffle("\u{1F600}%2F0"), "_rhs\u{1F600}%2F5");
        }

        #[test]
        fn round_trip_with_non_bmp_text() {
            let shuffler = StrShuffler::new(ShuffleDictionary::generate());
            let url = "https://example.com/\u{1F600}/caf\u{e9}?q=a%20b";
            assert_eq!(shuffler.unshuffle(&shuffler.shuffle(url)), url);
        }
    }
}
