//! Polybius square: letters become two-digit coordinates
//!
//! Encrypting emits one `"{row}{col}"` token per letter (1-based) and a
//! bare space token for each space of the input. Decrypting reads the
//! first two digits of each whitespace-separated token; tokens that
//! don't point at an occupied cell are dropped.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use scytale_core::{Alphabet, Mode, Result, Step, Trace};

use crate::square::{Dims, Square};
use crate::{Cipher, CipherKind};

lazy_static! {
    static ref NOT_DIGIT_OR_SPACE: Regex = Regex::new(r"[^0-9\s]").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PolybiusLayout {
    /// 6x6: 32 letters without Ё, plus a hyphen
    #[default]
    Ru32,
    /// 5 rows of 6: no Ё, Й, Ъ
    Ru30,
    /// 5x5, I and J share a cell
    En25,
}

impl PolybiusLayout {
    pub const ALL: [PolybiusLayout; 3] = [
        PolybiusLayout::Ru32,
        PolybiusLayout::Ru30,
        PolybiusLayout::En25,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PolybiusLayout::Ru32 => "RU 6×6 (32 letters + hyphen)",
            PolybiusLayout::Ru30 => "RU 6×5 (30 letters)",
            PolybiusLayout::En25 => "EN 5×5 (I=J)",
        }
    }

    pub fn chars(&self) -> &'static str {
        match self {
            PolybiusLayout::Ru32 => "АБВГДЕЖЗИЙКЛМНОПРСТУФХЦЧШЩЪЫЬЭЮЯ-",
            PolybiusLayout::Ru30 => "АБВГДЕЖЗИКЛМНОПРСТУФХЦЧШЩЫЬЭЮЯ",
            PolybiusLayout::En25 => "ABCDEFGHIKLMNOPQRSTUVWXYZ",
        }
    }

    pub fn dims(&self) -> Dims {
        match self {
            PolybiusLayout::Ru32 => Dims::square(6),
            PolybiusLayout::Ru30 => Dims::new(5, 6),
            PolybiusLayout::En25 => Dims::square(5),
        }
    }

    pub fn folds(&self) -> &'static [(char, char)] {
        match self {
            PolybiusLayout::Ru32 => &[('Ё', 'Е')],
            PolybiusLayout::Ru30 => &[('Ё', 'Е'), ('Й', 'И'), ('Ъ', 'Ь')],
            PolybiusLayout::En25 => &[('J', 'I')],
        }
    }

    pub fn alphabet(&self) -> Result<Alphabet> {
        Alphabet::new(self.name(), self.chars(), self.folds())
    }
}

impl std::str::FromStr for PolybiusLayout {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "ru32" | "ru" => Ok(PolybiusLayout::Ru32),
            "ru30" => Ok(PolybiusLayout::Ru30),
            "en25" | "en" => Ok(PolybiusLayout::En25),
            other => Err(format!(
                "unknown polybius layout: {other} (use ru32, ru30, en25)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Polybius {
    layout: PolybiusLayout,
    square: Square,
}

impl Polybius {
    /// Square for `layout`, keyed by `keyword` (empty for the plain square)
    pub fn new(keyword: &str, layout: PolybiusLayout) -> Result<Self> {
        let alphabet = layout.alphabet()?;
        let square = Square::build(keyword, &alphabet, layout.dims())?;
        Ok(Self { layout, square })
    }

    pub fn layout(&self) -> PolybiusLayout {
        self.layout
    }

    pub fn square(&self) -> &Square {
        &self.square
    }

    fn encode(&self, text: &str, trace: &mut Trace) -> String {
        let mut tokens = Vec::new();
        for c in text.chars() {
            if c == ' ' {
                tokens.push(" ".to_string());
                continue;
            }
            let Some((row, col)) = self.square.position(c) else {
                continue;
            };
            let token = format!("{}{}", row + 1, col + 1);
            trace.record(
                Step::new(self.square.alphabet().normalize(c).to_string(), token.clone())
                    .with_detail(format!("row {}, col {}", row + 1, col + 1)),
            );
            tokens.push(token);
        }
        tokens.join(" ")
    }

    fn decode(&self, text: &str, trace: &mut Trace) -> String {
        let cleaned = NOT_DIGIT_OR_SPACE.replace_all(text, "");
        let mut out = String::new();

        for token in cleaned.split_whitespace() {
            let mut digits = token.chars().filter_map(|c| c.to_digit(10));
            let (Some(row), Some(col)) = (digits.next(), digits.next()) else {
                tracing::debug!("polybius: skipping short token '{}'", token);
                continue;
            };
            let cell = match (row.checked_sub(1), col.checked_sub(1)) {
                (Some(r), Some(c)) => self.square.at(r as usize, c as usize),
                _ => None,
            };
            match cell {
                Some(ch) => {
                    trace.record(
                        Step::new(token, ch.to_string())
                            .with_detail(format!("row {row}, col {col}")),
                    );
                    out.push(ch);
                }
                None => tracing::debug!("polybius: no cell at {}{}", row, col),
            }
        }
        out
    }
}

impl Cipher for Polybius {
    fn kind(&self) -> CipherKind {
        CipherKind::Polybius
    }

    fn transform(&self, text: &str, mode: Mode, trace: &mut Trace) -> Result<String> {
        Ok(match mode {
            Mode::Encrypt => self.encode(text, trace),
            Mode::Decrypt => self.decode(text, trace),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_en() {
        let p = Polybius::new("", PolybiusLayout::En25).unwrap();
        assert_eq!(p.encrypt("HELLO").unwrap().output, "23 15 31 31 34");
        assert_eq!(p.encrypt("J").unwrap().output, "24");
    }

    #[test]
    fn test_decrypt_en() {
        let p = Polybius::new("", PolybiusLayout::En25).unwrap();
        assert_eq!(p.decrypt("23 15 31 31 34").unwrap().output, "HELLO");
    }

    #[test]
    fn test_space_token_and_dropped_chars() {
        let p = Polybius::new("", PolybiusLayout::En25).unwrap();
        let out = p.encrypt("A B, 7").unwrap();
        assert_eq!(out.output, "11   12  ");
        assert_eq!(out.steps.len(), 2);
        assert_eq!(p.decrypt(&out.output).unwrap().output, "AB");
    }

    #[test]
    fn test_decrypt_is_lenient() {
        let p = Polybius::new("", PolybiusLayout::En25).unwrap();
        // 66 and 09 are off the grid, "1" is too short, letters are stripped
        let out = p.decrypt("11 66 1 09 x12 155").unwrap();
        assert_eq!(out.output, "ABE");
        assert_eq!(out.steps.len(), 3);
    }

    #[test]
    fn test_ru32_ragged_last_row() {
        let p = Polybius::new("", PolybiusLayout::Ru32).unwrap();
        assert_eq!(p.encrypt("Я-").unwrap().output, "62 63");
        assert_eq!(p.encrypt("Ё").unwrap().output, "16");
        // row 6 only has three cells
        assert_eq!(p.decrypt("64 61").unwrap().output, "Ю");
    }

    #[test]
    fn test_ru30_folds() {
        let p = Polybius::new("", PolybiusLayout::Ru30).unwrap();
        assert_eq!(p.encrypt("Й").unwrap().output, p.encrypt("И").unwrap().output);
        assert_eq!(p.encrypt("Ъ").unwrap().output, p.encrypt("Ь").unwrap().output);
        assert_eq!(p.encrypt("Я").unwrap().output, "56");
    }

    #[test]
    fn test_keyed_square() {
        let p = Polybius::new("ZEBRA", PolybiusLayout::En25).unwrap();
        assert_eq!(p.encrypt("Z").unwrap().output, "11");
        assert_eq!(p.encrypt("C").unwrap().output, "21");
    }

    #[test]
    fn test_roundtrip_all_layouts() {
        for layout in PolybiusLayout::ALL {
            let p = Polybius::new("КЛЮЧ KEY", layout).unwrap();
            let text = layout.chars();
            let enc = p.encrypt(text).unwrap().output;
            assert_eq!(p.decrypt(&enc).unwrap().output, text, "{:?}", layout);
        }
    }
}
