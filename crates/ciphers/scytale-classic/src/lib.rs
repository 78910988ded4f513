//! Scytale classical cipher engines
//!
//! Teaching-grade symmetric ciphers over configurable alphabets.
//!
//! # Modules
//! - `shift` - Caesar, Atbash, Vigenère, Belaso, Trithemius
//! - `square` - keyed letter grids shared by Playfair and Polybius
//! - `playfair` - digraph substitution on a keyed square
//! - `polybius` - coordinate encoding
//! - `hill` - matrix block cipher over Z_m
//! - `transposition` - keyed columnar transposition
//! - `otp` - one-time pad / running key
//! - `gamma` - byte XOR with a manual or LFSR gamma
//! - `analysis` - letter frequencies, IoC, Kasiski
//!
//! ```
//! use scytale_classic::{Caesar, Cipher};
//! use scytale_core::AlphabetId;
//!
//! let caesar = Caesar::new(3, AlphabetId::En26.alphabet()).unwrap();
//! assert_eq!(caesar.encrypt("HELLO").unwrap().output, "KHOOR");
//! ```

pub mod analysis;
pub mod gamma;
pub mod hill;
pub mod otp;
pub mod playfair;
pub mod polybius;
pub mod shift;
pub mod square;
pub mod transposition;

pub use analysis::FrequencyAnalysis;
pub use gamma::{Gamma, Lfsr};
pub use hill::HillCipher;
pub use otp::OneTimePad;
pub use playfair::{Playfair, PlayfairVariant};
pub use polybius::{Polybius, PolybiusLayout};
pub use shift::{Atbash, Caesar, Trithemius, Vigenere};
pub use square::{Dims, Square};
pub use transposition::ColumnarTransposition;

pub use scytale_core::{
    Alphabet, AlphabetId, CipherOutput, Error, Matrix, Mode, Result, Step, Trace,
};

use serde::{Deserialize, Serialize};

/// All supported ciphers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CipherKind {
    Caesar,
    Atbash,
    Vigenere,
    Belaso,
    Trithemius,
    Playfair,
    Polybius,
    Hill,
    Columnar,
    OneTimePad,
    Gamma,
}

impl CipherKind {
    pub const ALL: [CipherKind; 11] = [
        CipherKind::Caesar,
        CipherKind::Atbash,
        CipherKind::Vigenere,
        CipherKind::Belaso,
        CipherKind::Trithemius,
        CipherKind::Playfair,
        CipherKind::Polybius,
        CipherKind::Hill,
        CipherKind::Columnar,
        CipherKind::OneTimePad,
        CipherKind::Gamma,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CipherKind::Caesar => "Caesar Cipher",
            CipherKind::Atbash => "Atbash Cipher",
            CipherKind::Vigenere => "Vigenère Cipher",
            CipherKind::Belaso => "Belaso Cipher",
            CipherKind::Trithemius => "Trithemius Cipher",
            CipherKind::Playfair => "Playfair Cipher",
            CipherKind::Polybius => "Polybius Square",
            CipherKind::Hill => "Hill Cipher",
            CipherKind::Columnar => "Columnar Transposition",
            CipherKind::OneTimePad => "One-Time Pad",
            CipherKind::Gamma => "Gamma (XOR) Cipher",
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            CipherKind::Caesar | CipherKind::Atbash => "Substitution",

            CipherKind::Vigenere | CipherKind::Belaso | CipherKind::Trithemius => "Polyalphabetic",

            CipherKind::Playfair | CipherKind::Hill => "Polygraphic",

            CipherKind::Polybius => "Symbol",

            CipherKind::Columnar => "Transposition",

            CipherKind::OneTimePad | CipherKind::Gamma => "Stream",
        }
    }
}

impl std::str::FromStr for CipherKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "caesar" => Ok(CipherKind::Caesar),
            "atbash" => Ok(CipherKind::Atbash),
            "vigenere" => Ok(CipherKind::Vigenere),
            "belaso" => Ok(CipherKind::Belaso),
            "trithemius" => Ok(CipherKind::Trithemius),
            "playfair" => Ok(CipherKind::Playfair),
            "polybius" => Ok(CipherKind::Polybius),
            "hill" => Ok(CipherKind::Hill),
            "columnar" | "vertical" => Ok(CipherKind::Columnar),
            "otp" | "onetimepad" | "vernam" => Ok(CipherKind::OneTimePad),
            "gamma" | "xor" => Ok(CipherKind::Gamma),
            other => Err(format!("unknown cipher: {other}")),
        }
    }
}

/// A configured cipher: key and alphabet already validated.
///
/// Implementors only provide [`Cipher::transform`]; the trace is
/// threaded through so every engine reports its units the same way.
pub trait Cipher {
    fn kind(&self) -> CipherKind;

    /// Run the transform, recording each unit into `trace`
    fn transform(&self, text: &str, mode: Mode, trace: &mut Trace) -> Result<String>;

    fn apply(&self, text: &str, mode: Mode, record_steps: bool) -> Result<CipherOutput> {
        let mut trace = Trace::new(record_steps);
        let output = self.transform(text, mode, &mut trace)?;
        tracing::debug!(
            "{} {}: {} units",
            self.kind().name(),
            mode.name(),
            trace.len()
        );
        Ok(trace.finish(output))
    }

    fn encrypt(&self, text: &str) -> Result<CipherOutput> {
        self.apply(text, Mode::Encrypt, true)
    }

    fn decrypt(&self, text: &str) -> Result<CipherOutput> {
        self.apply(text, Mode::Decrypt, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip_through_name() {
        for kind in CipherKind::ALL {
            let key = format!("{kind:?}").to_lowercase();
            assert_eq!(key.parse::<CipherKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(CipherKind::Hill.category(), "Polygraphic");
        assert_eq!(CipherKind::Columnar.category(), "Transposition");
        assert_eq!(CipherKind::OneTimePad.category(), "Stream");
    }

    #[test]
    fn test_dyn_dispatch() {
        let en = AlphabetId::En26.alphabet();
        let ciphers: Vec<Box<dyn Cipher>> = vec![
            Box::new(Caesar::new(3, en.clone()).unwrap()),
            Box::new(Atbash::new(en.clone())),
            Box::new(Vigenere::new("KEY", en.clone()).unwrap()),
            Box::new(Trithemius::new(en)),
        ];
        for cipher in &ciphers {
            let enc = cipher.encrypt("ATTACK AT DAWN").unwrap();
            let dec = cipher.decrypt(&enc.output).unwrap();
            assert_eq!(dec.output, "ATTACK AT DAWN", "{}", cipher.kind().name());
        }
    }

    #[test]
    fn test_apply_without_steps() {
        let caesar = Caesar::new(1, AlphabetId::En26.alphabet()).unwrap();
        let out = caesar.apply("ABC", Mode::Encrypt, false).unwrap();
        assert_eq!(out.output, "BCD");
        assert!(out.steps.is_empty());
    }
}
