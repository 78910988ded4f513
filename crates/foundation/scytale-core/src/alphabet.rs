//! Alphabets and normalization
//!
//! An alphabet is an ordered set of characters; a character's index is
//! its numeric value for every cipher. Letters the alphabet leaves out
//! can be folded onto a present letter (Ё → Е for the 32-letter
//! Russian alphabet, J → I for 25-letter squares).

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::arith::modulo;
use crate::{Error, Result};

pub const RU33: &str = "АБВГДЕЁЖЗИЙКЛМНОПРСТУФХЦЧШЩЪЫЬЭЮЯ";
pub const RU32: &str = "АБВГДЕЖЗИЙКЛМНОПРСТУФХЦЧШЩЪЫЬЭЮЯ";
pub const EN26: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Built-in alphabets for the stream and block ciphers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlphabetId {
    #[default]
    Ru33,
    Ru32,
    En26,
}

impl AlphabetId {
    pub const ALL: [AlphabetId; 3] = [AlphabetId::Ru33, AlphabetId::Ru32, AlphabetId::En26];

    pub fn name(&self) -> &'static str {
        match self {
            AlphabetId::Ru33 => "RU-33 (with Ё)",
            AlphabetId::Ru32 => "RU-32 (without Ё)",
            AlphabetId::En26 => "EN-26",
        }
    }

    pub fn chars(&self) -> &'static str {
        match self {
            AlphabetId::Ru33 => RU33,
            AlphabetId::Ru32 => RU32,
            AlphabetId::En26 => EN26,
        }
    }

    pub fn folds(&self) -> &'static [(char, char)] {
        match self {
            AlphabetId::Ru32 => &[('Ё', 'Е')],
            AlphabetId::Ru33 | AlphabetId::En26 => &[],
        }
    }

    /// Build the alphabet value
    pub fn alphabet(&self) -> Alphabet {
        Alphabet::from_parts(self.name(), self.chars(), self.folds())
    }
}

impl fmt::Display for AlphabetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for AlphabetId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "ru33" | "ru" => Ok(AlphabetId::Ru33),
            "ru32" => Ok(AlphabetId::Ru32),
            "en26" | "en" => Ok(AlphabetId::En26),
            other => Err(format!("unknown alphabet: {other} (use ru33, ru32, en26)")),
        }
    }
}

/// Ordered, duplicate-free character set with fold rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    name: String,
    chars: Vec<char>,
    index: HashMap<char, usize>,
    folds: HashMap<char, char>,
}

impl Alphabet {
    /// Build and validate an alphabet.
    ///
    /// Fails on duplicate characters, on a fold whose source is already
    /// present, and on a fold whose target is missing.
    pub fn new(name: impl Into<String>, chars: &str, folds: &[(char, char)]) -> Result<Self> {
        let mut index = HashMap::new();
        for (i, c) in chars.chars().enumerate() {
            if index.insert(c, i).is_some() {
                return Err(Error::DuplicateCharacter(c));
            }
        }
        if index.is_empty() {
            return Err(Error::EmptyAlphabet);
        }
        for &(from, to) in folds {
            if index.contains_key(&from) || !index.contains_key(&to) {
                return Err(Error::InvalidFold { from, to });
            }
        }
        Ok(Self::from_parts(name, chars, folds))
    }

    fn from_parts(name: impl Into<String>, chars: &str, folds: &[(char, char)]) -> Self {
        let chars: Vec<char> = chars.chars().collect();
        let index = chars.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        Self {
            name: name.into(),
            chars,
            index,
            folds: folds.iter().copied().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Alphabet size as the arithmetic modulus
    pub fn modulus(&self) -> i64 {
        self.chars.len() as i64
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn first(&self) -> char {
        self.chars[0]
    }

    pub fn char_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    /// Character at `index + delta`, wrapped into the alphabet
    pub fn shift(&self, index: usize, delta: i64) -> char {
        self.chars[modulo(index as i64 + delta, self.modulus()) as usize]
    }

    /// Exact membership, no normalization
    pub fn contains(&self, c: char) -> bool {
        self.index.contains_key(&c)
    }

    pub fn folds(&self) -> impl Iterator<Item = (char, char)> + '_ {
        self.folds.iter().map(|(&from, &to)| (from, to))
    }

    /// Uppercase, then apply the fold table
    pub fn normalize(&self, c: char) -> char {
        let up = upper(c);
        self.folds.get(&up).copied().unwrap_or(up)
    }

    /// Index of the normalized character
    pub fn index_of(&self, c: char) -> Option<usize> {
        self.index.get(&self.normalize(c)).copied()
    }

    /// Normalize every character, keeping the ones outside the alphabet
    pub fn normalize_text(&self, text: &str) -> String {
        text.chars().map(|c| self.normalize(c)).collect()
    }

    /// Normalized text with everything outside the alphabet removed
    pub fn filter(&self, text: &str) -> String {
        text.chars()
            .map(|c| self.normalize(c))
            .filter(|c| self.contains(*c))
            .collect()
    }

    /// Indices of the in-alphabet characters of `text`
    pub fn indices(&self, text: &str) -> Vec<usize> {
        text.chars().filter_map(|c| self.index_of(c)).collect()
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.chars {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Single-character uppercase; characters whose uppercase form expands
/// (ß → SS) are left as they are so positions stay aligned.
pub fn upper(c: char) -> char {
    let mut up = c.to_uppercase();
    match (up.next(), up.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}
