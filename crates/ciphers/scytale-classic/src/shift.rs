//! Single-letter substitution ciphers
//!
//! Caesar, Atbash, Vigenère/Belaso, Trithemius.
//!
//! Every cipher here walks the text one character at a time. Characters
//! outside the alphabet pass through (uppercased) and do not advance the
//! key stream.

use scytale_core::alphabet::upper;
use scytale_core::{Alphabet, Error, Mode, Result, Step, Trace};

use crate::{Cipher, CipherKind};

/// What happens to one in-alphabet character
pub(crate) struct Substitution {
    pub index: usize,
    pub key: Option<char>,
    pub shift: Option<i64>,
}

/// Shared walk: `f(position, index)` decides the substitution for the
/// `position`-th transformed character.
pub(crate) fn substitute<F>(text: &str, alphabet: &Alphabet, trace: &mut Trace, mut f: F) -> String
where
    F: FnMut(usize, usize) -> Substitution,
{
    let mut position = 0;
    text.chars()
        .map(|c| {
            let Some(index) = alphabet.index_of(c) else {
                return upper(c);
            };
            let sub = f(position, index);
            let out = alphabet.chars()[sub.index];

            let mut step = Step::new(alphabet.normalize(c).to_string(), out.to_string());
            if let Some(k) = sub.key {
                step = step.with_key(k.to_string());
            }
            if let Some(s) = sub.shift {
                step = step.with_shift(s);
            }
            trace.record(step);

            position += 1;
            out
        })
        .collect()
}

/// Additive shift of `index` by `delta`, wrapped into the alphabet
fn shifted(alphabet: &Alphabet, index: usize, delta: i64) -> usize {
    scytale_core::modulo(index as i64 + delta, alphabet.modulus()) as usize
}

/// Parse a keyword into `(letter, index)` pairs.
///
/// Whitespace is ignored; any other character must normalize into the
/// alphabet.
pub fn parse_keyword(keyword: &str, alphabet: &Alphabet) -> Result<Vec<(char, usize)>> {
    let mut parsed = Vec::new();
    for c in keyword.chars().filter(|c| !c.is_whitespace()) {
        let normalized = alphabet.normalize(c);
        match alphabet.index_of(normalized) {
            Some(index) => parsed.push((normalized, index)),
            None => {
                tracing::debug!("keyword character '{}' not in {}", c, alphabet.name());
                return Err(Error::KeyCharacter { ch: c });
            }
        }
    }
    if parsed.is_empty() {
        return Err(Error::EmptyKey);
    }
    Ok(parsed)
}

// ═══════════════════════════════════════════════════════════
// CAESAR CIPHER
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct Caesar {
    shift: i64,
    alphabet: Alphabet,
}

impl Caesar {
    /// `shift` must lie in `[1, m-1]`
    pub fn new(shift: i64, alphabet: Alphabet) -> Result<Self> {
        if !(1..alphabet.modulus()).contains(&shift) {
            return Err(Error::ShiftOutOfRange {
                shift,
                modulus: alphabet.len(),
            });
        }
        Ok(Self { shift, alphabet })
    }

    pub fn shift(&self) -> i64 {
        self.shift
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// The substitution row: plain letter i maps to this string's i-th char
    pub fn shifted_alphabet(&self) -> String {
        (0..self.alphabet.len())
            .map(|i| self.alphabet.shift(i, self.shift))
            .collect()
    }

    /// Decrypt with every shift, 0 included
    pub fn bruteforce(text: &str, alphabet: &Alphabet) -> Vec<(i64, String)> {
        (0..alphabet.modulus())
            .map(|shift| {
                let mut trace = Trace::new(false);
                let plain = substitute(text, alphabet, &mut trace, |_, index| Substitution {
                    index: shifted(alphabet, index, -shift),
                    key: None,
                    shift: None,
                });
                (shift, plain)
            })
            .collect()
    }
}

impl Cipher for Caesar {
    fn kind(&self) -> CipherKind {
        CipherKind::Caesar
    }

    fn transform(&self, text: &str, mode: Mode, trace: &mut Trace) -> Result<String> {
        let delta = mode.sign() * self.shift;
        Ok(substitute(text, &self.alphabet, trace, |_, index| Substitution {
            index: shifted(&self.alphabet, index, delta),
            key: None,
            shift: Some(delta),
        }))
    }
}

// ═══════════════════════════════════════════════════════════
// ATBASH CIPHER
// ═══════════════════════════════════════════════════════════

/// Mirror substitution; its own inverse
#[derive(Debug, Clone)]
pub struct Atbash {
    alphabet: Alphabet,
}

impl Atbash {
    pub fn new(alphabet: Alphabet) -> Self {
        Self { alphabet }
    }
}

impl Cipher for Atbash {
    fn kind(&self) -> CipherKind {
        CipherKind::Atbash
    }

    fn transform(&self, text: &str, _mode: Mode, trace: &mut Trace) -> Result<String> {
        let last = self.alphabet.len() - 1;
        Ok(substitute(text, &self.alphabet, trace, |_, index| Substitution {
            index: last - index,
            key: None,
            shift: None,
        }))
    }
}

// ═══════════════════════════════════════════════════════════
// VIGENÈRE / BELASO CIPHER
// ═══════════════════════════════════════════════════════════

/// Keyword cipher: the i-th transformed letter is shifted by the index
/// of the (i mod len)-th keyword letter.
///
/// Belaso's cipher is the same transform under its original name; the
/// two differ only in the [`CipherKind`] they report.
#[derive(Debug, Clone)]
pub struct Vigenere {
    keyword: Vec<(char, usize)>,
    alphabet: Alphabet,
    kind: CipherKind,
}

impl Vigenere {
    pub fn new(keyword: &str, alphabet: Alphabet) -> Result<Self> {
        Ok(Self {
            keyword: parse_keyword(keyword, &alphabet)?,
            alphabet,
            kind: CipherKind::Vigenere,
        })
    }

    pub fn belaso(keyword: &str, alphabet: Alphabet) -> Result<Self> {
        Ok(Self {
            kind: CipherKind::Belaso,
            ..Self::new(keyword, alphabet)?
        })
    }

    /// The normalized keyword
    pub fn keyword(&self) -> String {
        self.keyword.iter().map(|(c, _)| c).collect()
    }
}

impl Cipher for Vigenere {
    fn kind(&self) -> CipherKind {
        self.kind
    }

    fn transform(&self, text: &str, mode: Mode, trace: &mut Trace) -> Result<String> {
        let sign = mode.sign();
        Ok(substitute(text, &self.alphabet, trace, |position, index| {
            let (key_char, key_index) = self.keyword[position % self.keyword.len()];
            let delta = sign * key_index as i64;
            Substitution {
                index: shifted(&self.alphabet, index, delta),
                key: Some(key_char),
                shift: Some(delta),
            }
        }))
    }
}

// ═══════════════════════════════════════════════════════════
// TRITHEMIUS CIPHER
// ═══════════════════════════════════════════════════════════

/// Keyless progressive shift: the i-th transformed letter moves by i
#[derive(Debug, Clone)]
pub struct Trithemius {
    alphabet: Alphabet,
}

impl Trithemius {
    pub fn new(alphabet: Alphabet) -> Self {
        Self { alphabet }
    }
}

impl Cipher for Trithemius {
    fn kind(&self) -> CipherKind {
        CipherKind::Trithemius
    }

    fn transform(&self, text: &str, mode: Mode, trace: &mut Trace) -> Result<String> {
        let sign = mode.sign();
        Ok(substitute(text, &self.alphabet, trace, |position, index| {
            let delta = sign * position as i64;
            Substitution {
                index: shifted(&self.alphabet, index, delta),
                key: None,
                shift: Some(delta),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scytale_core::AlphabetId;

    fn en() -> Alphabet {
        AlphabetId::En26.alphabet()
    }

    #[test]
    fn test_caesar() {
        let caesar = Caesar::new(3, en()).unwrap();
        assert_eq!(caesar.encrypt("HELLO").unwrap().output, "KHOOR");
        assert_eq!(caesar.decrypt("KHOOR").unwrap().output, "HELLO");
    }

    #[test]
    fn test_caesar_russian() {
        let caesar = Caesar::new(3, AlphabetId::Ru33.alphabet()).unwrap();
        assert_eq!(caesar.encrypt("ЯЮЭ").unwrap().output, "ВБА");
    }

    #[test]
    fn test_caesar_shift_range() {
        assert!(Caesar::new(0, en()).is_err());
        assert!(Caesar::new(26, en()).is_err());
        assert_eq!(
            Caesar::new(-1, en()).unwrap_err(),
            Error::ShiftOutOfRange {
                shift: -1,
                modulus: 26
            }
        );
        assert!(Caesar::new(25, en()).is_ok());
    }

    #[test]
    fn test_caesar_shifted_alphabet() {
        let caesar = Caesar::new(13, en()).unwrap();
        assert_eq!(caesar.shifted_alphabet(), "NOPQRSTUVWXYZABCDEFGHIJKLM");
    }

    #[test]
    fn test_rot13_is_involution() {
        let rot13 = Caesar::new(13, en()).unwrap();
        let once = rot13.encrypt("Why did the chicken?").unwrap().output;
        assert_eq!(rot13.encrypt(&once).unwrap().output, "WHY DID THE CHICKEN?");
    }

    #[test]
    fn test_caesar_bruteforce() {
        let candidates = Caesar::bruteforce("KHOOR", &en());
        assert_eq!(candidates.len(), 26);
        assert_eq!(candidates[0], (0, "KHOOR".to_string()));
        assert_eq!(candidates[3], (3, "HELLO".to_string()));
    }

    #[test]
    fn test_passthrough_keeps_position() {
        let caesar = Caesar::new(1, en()).unwrap();
        let out = caesar.encrypt("a-b, c! 42").unwrap();
        assert_eq!(out.output, "B-C, D! 42");
        assert_eq!(out.steps.len(), 3);
    }

    #[test]
    fn test_atbash() {
        let atbash = Atbash::new(en());
        assert_eq!(atbash.encrypt("HELLO").unwrap().output, "SVOOL");
        assert_eq!(atbash.decrypt("SVOOL").unwrap().output, "HELLO");
    }

    #[test]
    fn test_atbash_involution_all_alphabets() {
        for id in AlphabetId::ALL {
            let alphabet = id.alphabet();
            let text: String = alphabet.chars().iter().collect();
            let atbash = Atbash::new(alphabet);
            let once = atbash.encrypt(&text).unwrap().output;
            assert_eq!(once, text.chars().rev().collect::<String>());
            assert_eq!(atbash.encrypt(&once).unwrap().output, text);
        }
    }

    #[test]
    fn test_atbash_folds_yo() {
        let atbash = Atbash::new(AlphabetId::Ru32.alphabet());
        // Ё folds to Е (index 5), mirrored to index 26 = Ъ
        assert_eq!(atbash.encrypt("ё").unwrap().output, "Ъ");
    }

    #[test]
    fn test_vigenere() {
        let v = Vigenere::new("KEY", en()).unwrap();
        assert_eq!(v.encrypt("HELLO").unwrap().output, "RIJVS");
        assert_eq!(v.decrypt("RIJVS").unwrap().output, "HELLO");
    }

    #[test]
    fn test_vigenere_attack_at_dawn() {
        let v = Vigenere::new("KEY", en()).unwrap();
        let out = v.encrypt("ATTACKATDAWN").unwrap();
        assert_eq!(out.output, "KXRKGIKXBKAL");
        assert!(out.output.starts_with('K'));
        assert_eq!(out.steps[0].key.as_deref(), Some("K"));
        assert_eq!(out.steps[0].shift, Some(10));
    }

    #[test]
    fn test_vigenere_key_skips_passthrough() {
        let v = Vigenere::new("KEY", en()).unwrap();
        let spaced = v.encrypt("ATT ACK").unwrap().output;
        let packed = v.encrypt("ATTACK").unwrap().output;
        assert_eq!(spaced.replace(' ', ""), packed);
    }

    #[test]
    fn test_vigenere_key_validation() {
        assert_eq!(Vigenere::new("", en()).unwrap_err(), Error::EmptyKey);
        assert_eq!(Vigenere::new("   ", en()).unwrap_err(), Error::EmptyKey);
        assert_eq!(
            Vigenere::new("KE1", en()).unwrap_err(),
            Error::KeyCharacter { ch: '1' }
        );
        assert_eq!(Vigenere::new("k e y", en()).unwrap().keyword(), "KEY");
    }

    #[test]
    fn test_belaso_matches_vigenere() {
        let ru = AlphabetId::Ru33.alphabet();
        let belaso = Vigenere::belaso("КЛЮЧ", ru.clone()).unwrap();
        let vigenere = Vigenere::new("КЛЮЧ", ru).unwrap();
        assert_eq!(belaso.kind(), CipherKind::Belaso);
        let text = "КРИПТОГРАФИЯ";
        let enc = belaso.encrypt(text).unwrap().output;
        assert_eq!(enc, vigenere.encrypt(text).unwrap().output);
        assert_eq!(belaso.decrypt(&enc).unwrap().output, text);
    }

    #[test]
    fn test_trithemius() {
        let t = Trithemius::new(en());
        assert_eq!(t.encrypt("AAAA").unwrap().output, "ABCD");
        assert_eq!(t.decrypt("ABCD").unwrap().output, "AAAA");
    }

    #[test]
    fn test_trithemius_shift_grows_past_modulus() {
        let t = Trithemius::new(en());
        let text = "A".repeat(30);
        let out = t.encrypt(&text).unwrap();
        assert_eq!(out.steps[29].shift, Some(29));
        assert!(out.output.ends_with("ABCD"));
        assert_eq!(t.decrypt(&out.output).unwrap().output, text);
    }

    #[test]
    fn test_roundtrip_all_alphabets() {
        for id in AlphabetId::ALL {
            let alphabet = id.alphabet();
            let text: String = alphabet.chars().iter().cycle().take(70).collect();
            let key: String = alphabet.chars()[3..7].iter().collect();
            let ciphers: Vec<Box<dyn Cipher>> = vec![
                Box::new(Caesar::new(7, alphabet.clone()).unwrap()),
                Box::new(Vigenere::new(&key, alphabet.clone()).unwrap()),
                Box::new(Trithemius::new(alphabet.clone())),
                Box::new(Atbash::new(alphabet.clone())),
            ];
            for cipher in &ciphers {
                let enc = cipher.encrypt(&text).unwrap().output;
                assert_eq!(cipher.decrypt(&enc).unwrap().output, text, "{id} {:?}", cipher.kind());
            }
        }
    }

    #[test]
    fn test_roundtrip_normalizes_case_and_yo() {
        let v = Vigenere::new("шифр", AlphabetId::Ru32.alphabet()).unwrap();
        let enc = v.encrypt("Ёлка, ёж!").unwrap().output;
        assert_eq!(v.decrypt(&enc).unwrap().output, "ЕЛКА, ЕЖ!");
    }
}
