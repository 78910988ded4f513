//! Playfair digraph cipher
//!
//! Pairs of letters are looked up in a keyed square:
//! - same row: each letter moves one cell right (left to decrypt)
//! - same column: each letter moves one cell down (up to decrypt)
//! - otherwise: each letter takes the other's column (rectangle rule)

use serde::{Deserialize, Serialize};

use scytale_core::{Alphabet, Mode, Result, Step, Trace};

use crate::square::{Dims, Square};
use crate::{Cipher, CipherKind};

pub const PLAYFAIR_RU: &str = "АБВГДЕЖЗИЙКЛМНОПРСТУФХЦЧШЩЫЬЭЮЯ_";
pub const PLAYFAIR_EN: &str = "ABCDEFGHIKLMNOPQRSTUVWXYZ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlayfairVariant {
    /// 32 symbols in 4 rows of 8, without Ё and Ъ
    #[default]
    Ru,
    /// 5x5, I and J share a cell
    En,
}

impl PlayfairVariant {
    pub fn name(&self) -> &'static str {
        match self {
            PlayfairVariant::Ru => "RU 4×8 (no Ё, Ъ)",
            PlayfairVariant::En => "EN 5×5 (I=J)",
        }
    }

    pub fn dims(&self) -> Dims {
        match self {
            PlayfairVariant::Ru => Dims::new(4, 8),
            PlayfairVariant::En => Dims::square(5),
        }
    }

    pub fn chars(&self) -> &'static str {
        match self {
            PlayfairVariant::Ru => PLAYFAIR_RU,
            PlayfairVariant::En => PLAYFAIR_EN,
        }
    }

    pub fn filler(&self) -> char {
        match self {
            PlayfairVariant::Ru => 'Х',
            PlayfairVariant::En => 'X',
        }
    }

    pub fn folds(&self) -> &'static [(char, char)] {
        match self {
            PlayfairVariant::Ru => &[('Ё', 'Е'), ('Ъ', 'Ь')],
            PlayfairVariant::En => &[('J', 'I')],
        }
    }

    pub fn alphabet(&self) -> Result<Alphabet> {
        Alphabet::new(self.name(), self.chars(), self.folds())
    }
}

impl std::str::FromStr for PlayfairVariant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ru" | "ru32" => Ok(PlayfairVariant::Ru),
            "en" | "en25" => Ok(PlayfairVariant::En),
            other => Err(format!("unknown playfair variant: {other} (use ru, en)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Playfair {
    variant: PlayfairVariant,
    square: Square,
}

impl Playfair {
    pub fn new(keyword: &str, variant: PlayfairVariant) -> Result<Self> {
        let alphabet = variant.alphabet()?;
        let square = Square::build(keyword, &alphabet, variant.dims())?;
        Ok(Self { variant, square })
    }

    pub fn variant(&self) -> PlayfairVariant {
        self.variant
    }

    pub fn square(&self) -> &Square {
        &self.square
    }

    /// Split plaintext into digraphs.
    ///
    /// A doubled letter gets the filler after its first half and the
    /// second letter starts the next pair; a lone last letter is padded.
    pub fn digraphs(&self, text: &str) -> Vec<(char, char)> {
        let filler = self.variant.filler();
        let letters: Vec<char> = self.square.alphabet().filter(text).chars().collect();

        let mut pairs = Vec::with_capacity(letters.len() / 2 + 1);
        let mut i = 0;
        while i < letters.len() {
            let first = letters[i];
            match letters.get(i + 1) {
                Some(&second) if second != first => {
                    pairs.push((first, second));
                    i += 2;
                }
                _ => {
                    pairs.push((first, filler));
                    i += 1;
                }
            }
        }
        pairs
    }

    /// Remove fillers sitting between two equal letters or at the very end.
    ///
    /// Display helper for decrypted text; a genuine filler letter in those
    /// positions is removed too.
    pub fn strip_fillers(&self, text: &str) -> String {
        let filler = self.variant.filler();
        let letters: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
        let last = letters.len().saturating_sub(1);

        letters
            .iter()
            .enumerate()
            .filter(|&(i, &c)| {
                if c != filler {
                    return true;
                }
                let between_equal = i > 0 && i < last && letters[i - 1] == letters[i + 1];
                !(between_equal || (i == last && i > 0))
            })
            .map(|(_, &c)| c)
            .collect()
    }

    fn transform_pair(&self, a: char, b: char, mode: Mode, trace: &mut Trace) -> String {
        let (Some((r1, c1)), Some((r2, c2))) = (self.square.position(a), self.square.position(b))
        else {
            return format!("{a}{b}");
        };
        let delta = mode.sign();

        let (x, y, rule, shift) = if r1 == r2 {
            (
                self.square.step_in_row(r1, c1, delta),
                self.square.step_in_row(r2, c2, delta),
                "row",
                Some(delta),
            )
        } else if c1 == c2 {
            (
                self.square.step_in_col(r1, c1, delta),
                self.square.step_in_col(r2, c2, delta),
                "column",
                Some(delta),
            )
        } else {
            (self.square.at(r1, c2), self.square.at(r2, c1), "rectangle", None)
        };

        // both variants fill their grid, so every corner exists
        let out = format!("{}{}", x.unwrap_or(a), y.unwrap_or(b));

        let mut step = Step::new(format!("{a}{b}"), out.clone()).with_detail(rule);
        if let Some(s) = shift {
            step = step.with_shift(s);
        }
        trace.record(step);
        out
    }
}

impl Cipher for Playfair {
    fn kind(&self) -> CipherKind {
        CipherKind::Playfair
    }

    fn transform(&self, text: &str, mode: Mode, trace: &mut Trace) -> Result<String> {
        let groups: Vec<String> = match mode {
            Mode::Encrypt => self
                .digraphs(text)
                .into_iter()
                .map(|(a, b)| self.transform_pair(a, b, mode, trace))
                .collect(),
            Mode::Decrypt => {
                let letters: Vec<char> = self.square.alphabet().filter(text).chars().collect();
                letters
                    .chunks(2)
                    .map(|pair| match pair {
                        [a, b] => self.transform_pair(*a, *b, mode, trace),
                        _ => pair.iter().collect(),
                    })
                    .collect()
            }
        };
        Ok(groups.join(" "))
    }
}
