//! # Scytale Core
//!
//! Shared foundation for the classical cipher engines.
//!
//! ```text
//! Alphabet ──► index / normalize ──► cipher transform ──► Trace ──► CipherOutput
//!                     │
//!                     └── arith + matrix (Z_m kernel, Hill inversion)
//! ```
//!
//! Everything here is a plain value: alphabets, matrices and traces are
//! built per call and never shared mutably.

pub mod alphabet;
pub mod arith;
pub mod matrix;
pub mod trace;

pub use alphabet::{Alphabet, AlphabetId};
pub use arith::{extended_gcd, gcd, mod_inverse, modulo};
pub use matrix::{invert_matrix_mod, Matrix, MAX_MATRIX_SIZE};
pub use trace::{CipherOutput, Step, Trace};

use serde::{Deserialize, Serialize};

/// Result type for scytale operations
pub type Result<T> = std::result::Result<T, Error>;

/// Key and configuration failures.
///
/// Per-character anomalies (unknown characters, malformed ciphertext
/// units) are not errors: they pass through or are skipped inline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Irreversible key: gcd({det}, {modulus}) != 1")]
    InvalidKey { det: i64, modulus: i64 },

    #[error("Key too short: need {required} characters, got {provided}")]
    InsufficientKeyLength { required: usize, provided: usize },

    #[error("Matrix must be {expected}x{expected}, got {rows}x{cols}")]
    DimensionMismatch {
        expected: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Block size {0} is outside 2..={max}", max = MAX_MATRIX_SIZE)]
    BlockSizeOutOfRange(usize),

    #[error("Shift {shift} is outside 1..{modulus}")]
    ShiftOutOfRange { shift: i64, modulus: usize },

    #[error("Key must not be empty")]
    EmptyKey,

    #[error("Key character '{ch}' is not in the alphabet")]
    KeyCharacter { ch: char },

    #[error("Alphabet must not be empty")]
    EmptyAlphabet,

    #[error("Alphabet contains '{0}' more than once")]
    DuplicateCharacter(char),

    #[error("Invalid fold {from} -> {to}")]
    InvalidFold { from: char, to: char },

    #[error("Square {rows}x{cols} cannot hold {needed} characters")]
    SquareTooSmall {
        rows: usize,
        cols: usize,
        needed: usize,
    },

    #[error("Malformed hex: {0}")]
    MalformedHex(String),
}

/// Direction of a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Encrypt,
    Decrypt,
}

impl Mode {
    /// +1 for encryption, -1 for decryption
    pub fn sign(&self) -> i64 {
        match self {
            Mode::Encrypt => 1,
            Mode::Decrypt => -1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Encrypt => "encrypt",
            Mode::Decrypt => "decrypt",
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "encrypt" | "enc" | "e" => Ok(Mode::Encrypt),
            "decrypt" | "dec" | "d" => Ok(Mode::Decrypt),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}
