//! Gamma (XOR) cipher
//!
//! Works on bytes, not letters: the UTF-8 plaintext is XORed with a
//! gamma that is either typed in as hex (and repeated) or produced by a
//! 32-bit LFSR. Ciphertext is written as upper-case hex bytes.
//!
//! The LFSR shifts the register as an unsigned `u32`, so bit 31 always
//! holds the latest feedback bit. A register shifted as a signed 32-bit
//! integer keeps bit 31 set once it is set; the two keystreams agree only
//! for the first 26 bytes of the default seed.

use serde::{Deserialize, Serialize};

use scytale_core::{Error, Mode, Result, Step, Trace};

use crate::{Cipher, CipherKind};

/// 32-bit Fibonacci LFSR, one byte per clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lfsr {
    state: u32,
}

impl Lfsr {
    /// Seed used when the caller passes 0 (an all-zero register never moves)
    pub const DEFAULT_SEED: u32 = 0x1234_5678;

    pub fn new(seed: u32) -> Self {
        let state = if seed == 0 { Self::DEFAULT_SEED } else { seed };
        Self { state }
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

impl Iterator for Lfsr {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let s = self.state;
        let bit = (s ^ (s >> 2) ^ (s >> 3) ^ (s >> 5)) & 1;
        self.state = (s >> 1) | (bit << 31);
        Some((self.state & 0xFF) as u8)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GammaSource {
    /// Repeated key bytes
    Manual(Vec<u8>),
    /// LFSR seed
    Lfsr(u32),
}

#[derive(Debug, Clone)]
pub struct Gamma {
    source: GammaSource,
}

impl Gamma {
    /// Gamma from a hex string such as `"AB CD EF"`
    pub fn manual(hex_key: &str) -> Result<Self> {
        let bytes = parse_hex(hex_key)?;
        if bytes.is_empty() {
            return Err(Error::EmptyKey);
        }
        Ok(Self {
            source: GammaSource::Manual(bytes),
        })
    }

    pub fn lfsr(seed: u32) -> Self {
        Self {
            source: GammaSource::Lfsr(Lfsr::new(seed).state()),
        }
    }

    pub fn source(&self) -> &GammaSource {
        &self.source
    }

    /// First `len` gamma bytes
    pub fn keystream(&self, len: usize) -> Vec<u8> {
        match &self.source {
            GammaSource::Manual(bytes) => bytes.iter().copied().cycle().take(len).collect(),
            GammaSource::Lfsr(seed) => Lfsr::new(*seed).take(len).collect(),
        }
    }

    fn xor(&self, data: &[u8], trace: &mut Trace) -> Vec<u8> {
        data.iter()
            .zip(self.keystream(data.len()))
            .map(|(&byte, g)| {
                let out = byte ^ g;
                trace.record(
                    Step::new(format!("{byte:02X}"), format!("{out:02X}"))
                        .with_key(format!("{g:02X}")),
                );
                out
            })
            .collect()
    }
}

impl Cipher for Gamma {
    fn kind(&self) -> CipherKind {
        CipherKind::Gamma
    }

    fn transform(&self, text: &str, mode: Mode, trace: &mut Trace) -> Result<String> {
        match mode {
            Mode::Encrypt => Ok(format_hex(&self.xor(text.as_bytes(), trace))),
            Mode::Decrypt => {
                let data = parse_hex(text)?;
                let plain = self.xor(&data, trace);
                Ok(String::from_utf8_lossy(&plain).into_owned())
            }
        }
    }
}

/// Parse hex, ignoring whitespace
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&compact).map_err(|e| Error::MalformedHex(e.to_string()))
}

/// Upper-case hex bytes separated by spaces
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lfsr_sequence() {
        let bytes: Vec<u8> = Lfsr::new(Lfsr::DEFAULT_SEED).take(3).collect();
        assert_eq!(bytes, vec![0x3C, 0x9E, 0xCF]);
    }

    #[test]
    fn test_lfsr_top_bit_follows_feedback() {
        let mut lfsr = Lfsr::new(Lfsr::DEFAULT_SEED);
        let top_bits: Vec<bool> = (0..64)
            .map(|_| {
                lfsr.next();
                lfsr.state() >> 31 == 1
            })
            .collect();
        let first_set = top_bits.iter().position(|&b| b).unwrap();
        assert!(top_bits[first_set..].contains(&false));
    }

    #[test]
    fn test_lfsr_zero_seed_uses_default() {
        let zero: Vec<u8> = Lfsr::new(0).take(16).collect();
        let default: Vec<u8> = Lfsr::new(Lfsr::DEFAULT_SEED).take(16).collect();
        assert_eq!(zero, default);
    }

    #[test]
    fn test_manual_gamma() {
        let gamma = Gamma::manual("AB CD").unwrap();
        let enc = gamma.encrypt("AB").unwrap();
        assert_eq!(enc.output, "EA 8F");
        assert_eq!(enc.steps[1].key.as_deref(), Some("CD"));
        assert_eq!(gamma.decrypt("EA 8F").unwrap().output, "AB");
    }

    #[test]
    fn test_manual_gamma_repeats() {
        let gamma = Gamma::manual("00").unwrap();
        assert_eq!(gamma.encrypt("AAA").unwrap().output, "41 41 41");
    }

    #[test]
    fn test_utf8_roundtrip() {
        let gamma = Gamma::lfsr(0);
        let enc = gamma.encrypt("СЕКРЕТ").unwrap();
        // 6 Cyrillic letters, 2 bytes each
        assert_eq!(enc.steps.len(), 12);
        assert_eq!(gamma.decrypt(&enc.output).unwrap().output, "СЕКРЕТ");
    }

    #[test]
    fn test_malformed_hex() {
        assert!(matches!(Gamma::manual("ABC"), Err(Error::MalformedHex(_))));
        assert!(matches!(Gamma::manual("ZZ"), Err(Error::MalformedHex(_))));
        assert_eq!(Gamma::manual("  ").unwrap_err(), Error::EmptyKey);

        let gamma = Gamma::lfsr(7);
        assert!(matches!(gamma.decrypt("4"), Err(Error::MalformedHex(_))));
    }

    #[test]
    fn test_lossy_decrypt() {
        // 0xFF is never valid UTF-8
        let gamma = Gamma::manual("00").unwrap();
        assert_eq!(gamma.decrypt("FF").unwrap().output, "\u{FFFD}");
    }

    #[test]
    fn test_format_hex() {
        assert_eq!(format_hex(&[0x0A, 0xFF]), "0A FF");
        assert_eq!(parse_hex("0a ff").unwrap(), vec![0x0A, 0xFF]);
    }
}
