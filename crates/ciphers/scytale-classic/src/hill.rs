//! Hill cipher
//!
//! Text is stripped to the alphabet, padded with the alphabet's first
//! letter to a whole number of blocks, and every block vector `v` is
//! replaced by `K·v mod m`. Decryption uses `K⁻¹ mod m`, which only
//! exists when `gcd(det K, m) == 1`.

use rand::Rng;

use scytale_core::{
    invert_matrix_mod, Alphabet, Error, Matrix, Mode, Result, Step, Trace, MAX_MATRIX_SIZE,
};

use crate::{Cipher, CipherKind};

#[derive(Debug, Clone)]
pub struct HillCipher {
    key: Matrix,
    alphabet: Alphabet,
}

impl HillCipher {
    /// Key entries are reduced into `[0, m)`
    pub fn new(key: Matrix, alphabet: Alphabet) -> Result<Self> {
        if key.size() < 2 {
            return Err(Error::BlockSizeOutOfRange(key.size()));
        }
        Ok(Self {
            key: key.reduce(alphabet.modulus()),
            alphabet,
        })
    }

    /// Build from rows, checking they form a `block_size` square
    pub fn from_rows(block_size: usize, rows: Vec<Vec<i64>>, alphabet: Alphabet) -> Result<Self> {
        if !(2..=MAX_MATRIX_SIZE).contains(&block_size) {
            return Err(Error::BlockSizeOutOfRange(block_size));
        }
        let bad_row = rows.iter().find(|r| r.len() != block_size);
        if rows.len() != block_size || bad_row.is_some() {
            return Err(Error::DimensionMismatch {
                expected: block_size,
                rows: rows.len(),
                cols: bad_row.or(rows.first()).map_or(0, |r| r.len()),
            });
        }
        Self::new(Matrix::new(rows)?, alphabet)
    }

    /// Random invertible key
    pub fn random(block_size: usize, alphabet: Alphabet) -> Result<Self> {
        Self::random_with(block_size, alphabet, &mut rand::thread_rng())
    }

    pub fn random_with<R: Rng + ?Sized>(
        block_size: usize,
        alphabet: Alphabet,
        rng: &mut R,
    ) -> Result<Self> {
        if block_size < 2 {
            return Err(Error::BlockSizeOutOfRange(block_size));
        }
        let key = Matrix::random_invertible(block_size, alphabet.modulus(), rng)?;
        Self::new(key, alphabet)
    }

    pub fn key(&self) -> &Matrix {
        &self.key
    }

    pub fn block_size(&self) -> usize {
        self.key.size()
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn determinant_mod(&self) -> i64 {
        self.key.determinant_mod(self.alphabet.modulus())
    }

    pub fn is_invertible(&self) -> bool {
        self.key.is_invertible_mod(self.alphabet.modulus())
    }

    /// Decryption matrix
    pub fn inverse_key(&self) -> Result<Matrix> {
        let m = self.alphabet.modulus();
        invert_matrix_mod(&self.key, m).ok_or_else(|| {
            let det = self.determinant_mod();
            tracing::debug!("hill key not invertible: det {} mod {}", det, m);
            Error::InvalidKey { det, modulus: m }
        })
    }

    fn letters(&self, indices: &[i64]) -> String {
        indices
            .iter()
            .filter_map(|&i| self.alphabet.char_at(i as usize))
            .collect()
    }
}

impl Cipher for HillCipher {
    fn kind(&self) -> CipherKind {
        CipherKind::Hill
    }

    fn transform(&self, text: &str, mode: Mode, trace: &mut Trace) -> Result<String> {
        let inverse;
        let matrix = match mode {
            Mode::Encrypt => &self.key,
            Mode::Decrypt => {
                inverse = self.inverse_key()?;
                &inverse
            }
        };

        let n = self.block_size();
        let m = self.alphabet.modulus();
        let mut indices: Vec<i64> = self
            .alphabet
            .indices(text)
            .into_iter()
            .map(|i| i as i64)
            .collect();
        while indices.len() % n != 0 {
            indices.push(0);
        }

        let mut out = String::with_capacity(indices.len());
        for block in indices.chunks(n) {
            let result = matrix.mul_vector_mod(block, m);
            let output = self.letters(&result);
            trace.record(
                Step::new(self.letters(block), output.clone())
                    .with_detail(format!("{block:?} -> {result:?}")),
            );
            out.push_str(&output);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scytale_core::AlphabetId;

    fn classic() -> HillCipher {
        HillCipher::from_rows(2, vec![vec![3, 5], vec![2, 7]], AlphabetId::En26.alphabet()).unwrap()
    }

    #[test]
    fn test_encrypt_blocks() {
        let hill = classic();
        let out = hill.encrypt("help").unwrap();
        assert_eq!(out.output, "PQEX");
        assert_eq!(out.steps.len(), 2);
        assert_eq!(out.steps[0].detail.as_deref(), Some("[7, 4] -> [15, 16]"));
    }

    #[test]
    fn test_decrypt() {
        assert_eq!(classic().decrypt("PQEX").unwrap().output, "HELP");
    }

    #[test]
    fn test_padding_with_first_letter() {
        let hill = classic();
        let enc = hill.encrypt("HEL").unwrap().output;
        assert_eq!(enc, "PQHW");
        assert_eq!(hill.decrypt(&enc).unwrap().output, "HELA");
    }

    #[test]
    fn test_strips_non_alphabet() {
        let hill = classic();
        assert_eq!(
            hill.encrypt("H-E L!P").unwrap().output,
            hill.encrypt("HELP").unwrap().output
        );
    }

    #[test]
    fn test_singular_key() {
        let hill =
            HillCipher::from_rows(2, vec![vec![2, 4], vec![1, 2]], AlphabetId::En26.alphabet())
                .unwrap();
        assert!(!hill.is_invertible());
        assert!(hill.encrypt("HELP").is_ok());
        assert_eq!(
            hill.decrypt("HELP").unwrap_err(),
            Error::InvalidKey { det: 0, modulus: 26 }
        );
    }

    #[test]
    fn test_invertibility_depends_on_modulus() {
        // det 11 is a unit mod 26 but shares a factor with 33
        let hill =
            HillCipher::from_rows(2, vec![vec![3, 5], vec![2, 7]], AlphabetId::Ru33.alphabet())
                .unwrap();
        assert!(!hill.is_invertible());
        let err = hill.decrypt("АБ").unwrap_err();
        assert_eq!(err.to_string(), "Irreversible key: gcd(11, 33) != 1");
    }

    #[test]
    fn test_dimension_checks() {
        let en = AlphabetId::En26.alphabet();
        assert_eq!(
            HillCipher::from_rows(3, vec![vec![1, 2], vec![3, 4]], en.clone()).unwrap_err(),
            Error::DimensionMismatch {
                expected: 3,
                rows: 2,
                cols: 2
            }
        );
        assert_eq!(
            HillCipher::from_rows(2, vec![vec![1, 2], vec![3]], en.clone()).unwrap_err(),
            Error::DimensionMismatch {
                expected: 2,
                rows: 2,
                cols: 1
            }
        );
        assert_eq!(
            HillCipher::from_rows(1, vec![vec![1]], en.clone()).unwrap_err(),
            Error::BlockSizeOutOfRange(1)
        );
        assert_eq!(
            HillCipher::random(11, en).unwrap_err(),
            Error::BlockSizeOutOfRange(11)
        );
    }

    #[test]
    fn test_negative_entries_reduced() {
        let hill =
            HillCipher::from_rows(2, vec![vec![-23, 5], vec![2, -19]], AlphabetId::En26.alphabet())
                .unwrap();
        assert_eq!(hill.key(), classic().key());
    }

    #[test]
    fn test_random_roundtrip() {
        for id in AlphabetId::ALL {
            for n in [2, 3, 5, 10] {
                let hill = HillCipher::random(n, id.alphabet()).unwrap();
                assert!(hill.is_invertible());
                let text: String = id.alphabet().chars().iter().cycle().take(n * 3).collect();
                let enc = hill.encrypt(&text).unwrap().output;
                assert_eq!(hill.decrypt(&enc).unwrap().output, text, "{id} n={n}");
            }
        }
    }
}
