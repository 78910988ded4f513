//! One-time pad (Vernam) over an alphabet
//!
//! Like Vigenère with a key at least as long as the text: the i-th
//! transformed letter is shifted by the i-th key letter and the key is
//! never reused.

use rand::Rng;

use scytale_core::{Alphabet, Error, Mode, Result, Trace};

use crate::shift::{substitute, Substitution};
use crate::{Cipher, CipherKind};

#[derive(Debug, Clone)]
pub struct OneTimePad {
    key: Vec<(char, usize)>,
    alphabet: Alphabet,
}

impl OneTimePad {
    /// Key letters are normalized; spaces and punctuation in the key are
    /// ignored, letters from another alphabet are rejected.
    pub fn new(key: &str, alphabet: Alphabet) -> Result<Self> {
        let mut parsed = Vec::new();
        for c in key.chars() {
            match alphabet.index_of(c) {
                Some(index) => parsed.push((alphabet.normalize(c), index)),
                None if c.is_alphabetic() => return Err(Error::KeyCharacter { ch: c }),
                None => {}
            }
        }
        if parsed.is_empty() {
            return Err(Error::EmptyKey);
        }
        Ok(Self {
            key: parsed,
            alphabet,
        })
    }

    /// Random pad of `len` letters
    pub fn generate_key(len: usize, alphabet: &Alphabet) -> String {
        Self::generate_key_with(len, alphabet, &mut rand::thread_rng())
    }

    pub fn generate_key_with<R: Rng + ?Sized>(
        len: usize,
        alphabet: &Alphabet,
        rng: &mut R,
    ) -> String {
        (0..len)
            .map(|_| alphabet.chars()[rng.gen_range(0..alphabet.len())])
            .collect()
    }

    pub fn key(&self) -> String {
        self.key.iter().map(|(c, _)| c).collect()
    }

    /// Key length in alphabet letters
    pub fn key_len(&self) -> usize {
        self.key.len()
    }
}

impl Cipher for OneTimePad {
    fn kind(&self) -> CipherKind {
        CipherKind::OneTimePad
    }

    fn transform(&self, text: &str, mode: Mode, trace: &mut Trace) -> Result<String> {
        let required = self.alphabet.indices(text).len();
        if required > self.key.len() {
            tracing::warn!(
                "one-time pad key has {} letters, text needs {}",
                self.key.len(),
                required
            );
            return Err(Error::InsufficientKeyLength {
                required,
                provided: self.key.len(),
            });
        }

        let sign = mode.sign();
        let m = self.alphabet.modulus();
        Ok(substitute(text, &self.alphabet, trace, |position, index| {
            let (key_char, key_index) = self.key[position];
            let delta = sign * key_index as i64;
            Substitution {
                index: scytale_core::modulo(index as i64 + delta, m) as usize,
                key: Some(key_char),
                shift: Some(delta),
            }
        }))
    }
}
