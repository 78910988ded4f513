//! Square integer matrices and their inverses over Z_m
//!
//! Determinants use Laplace (cofactor) expansion with an `i128`
//! accumulator and no floating point. Sub-determinants are memoized on
//! the set of columns still available, which keeps a 10x10 adjugate cheap.
//!
//! The `_mod` operations reduce entries into `[0, m)` before expanding, so
//! they hold for any `i64` entries. [`Matrix::determinant`] works on the
//! raw entries and is exact only while the expansion fits in `i128`.

use std::fmt;

use rand::Rng;
use serde::Serialize;

use crate::arith::{mod_inverse, modulo};
use crate::{Error, Result};

/// Largest supported matrix (and Hill block) size
pub const MAX_MATRIX_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Matrix {
    rows: Vec<Vec<i64>>,
}

impl Matrix {
    /// Build a square matrix from rows
    pub fn new(rows: Vec<Vec<i64>>) -> Result<Self> {
        let n = rows.len();
        if n == 0 || n > MAX_MATRIX_SIZE {
            return Err(Error::BlockSizeOutOfRange(n));
        }
        if let Some(bad) = rows.iter().find(|r| r.len() != n) {
            return Err(Error::DimensionMismatch {
                expected: n,
                rows: n,
                cols: bad.len(),
            });
        }
        Ok(Self { rows })
    }

    pub fn identity(n: usize) -> Result<Self> {
        Self::new(
            (0..n)
                .map(|i| (0..n).map(|j| i64::from(i == j)).collect())
                .collect(),
        )
    }

    /// Random matrix with entries in `[0, m)` that is invertible mod `m`
    pub fn random_invertible<R: Rng + ?Sized>(n: usize, m: i64, rng: &mut R) -> Result<Self> {
        if n == 0 || n > MAX_MATRIX_SIZE {
            return Err(Error::BlockSizeOutOfRange(n));
        }
        if m < 2 {
            return Err(Error::InvalidKey { det: 0, modulus: m });
        }
        let mut attempt = 0;
        loop {
            attempt += 1;
            let rows = (0..n)
                .map(|_| (0..n).map(|_| rng.gen_range(0..m)).collect())
                .collect();
            let candidate = Self { rows };
            if candidate.is_invertible_mod(m) {
                tracing::debug!("random {}x{} key mod {} after {} draws", n, n, m, attempt);
                return Ok(candidate);
            }
        }
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<i64>] {
        &self.rows
    }

    pub fn get(&self, row: usize, col: usize) -> i64 {
        self.rows[row][col]
    }

    /// Integer determinant of the raw entries.
    ///
    /// Overflows `i128` for large entries; use [`Matrix::determinant_mod`]
    /// for key checks.
    pub fn determinant(&self) -> i128 {
        let idx: Vec<usize> = (0..self.size()).collect();
        laplace(&self.rows, &idx, &idx)
    }

    /// Determinant reduced into `[0, m)`; 0 when `m < 2`
    pub fn determinant_mod(&self, m: i64) -> i64 {
        if m < 2 {
            return 0;
        }
        let reduced = self.reduce(m);
        let idx: Vec<usize> = (0..self.size()).collect();
        laplace_mod(&reduced.rows, &idx, &idx, m)
    }

    pub fn is_invertible_mod(&self, m: i64) -> bool {
        mod_inverse(self.determinant_mod(m), m).is_some()
    }

    /// Matrix with `row` and `col` removed
    pub fn minor(&self, row: usize, col: usize) -> Matrix {
        let rows = self
            .rows
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != row)
            .map(|(_, r)| {
                r.iter()
                    .enumerate()
                    .filter(|(j, _)| *j != col)
                    .map(|(_, &v)| v)
                    .collect()
            })
            .collect();
        Matrix { rows }
    }

    /// Signed minors, reduced mod `m` (`m` must be at least 2)
    pub fn cofactor_matrix_mod(&self, m: i64) -> Matrix {
        let n = self.size();
        let reduced = self.reduce(m);
        let rows = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| {
                        let keep_rows: Vec<usize> = (0..n).filter(|&r| r != i).collect();
                        let keep_cols: Vec<usize> = (0..n).filter(|&c| c != j).collect();
                        let minor = laplace_mod(&reduced.rows, &keep_rows, &keep_cols, m);
                        if (i + j) % 2 == 0 {
                            minor
                        } else {
                            modulo(-minor, m)
                        }
                    })
                    .collect()
            })
            .collect();
        Matrix { rows }
    }

    pub fn transpose(&self) -> Matrix {
        let n = self.size();
        Matrix {
            rows: (0..n)
                .map(|i| (0..n).map(|j| self.rows[j][i]).collect())
                .collect(),
        }
    }

    /// Every entry reduced into `[0, m)`
    pub fn reduce(&self, m: i64) -> Matrix {
        Matrix {
            rows: self
                .rows
                .iter()
                .map(|r| r.iter().map(|&v| modulo(v, m)).collect())
                .collect(),
        }
    }

    /// `(self · v) mod m`
    pub fn mul_vector_mod(&self, v: &[i64], m: i64) -> Vec<i64> {
        self.rows
            .iter()
            .map(|row| {
                let sum: i128 = row
                    .iter()
                    .zip(v)
                    .map(|(&a, &b)| a as i128 * b as i128)
                    .sum();
                sum.rem_euclid(m as i128) as i64
            })
            .collect()
    }

    /// `(self · other) mod m`
    pub fn mul_mod(&self, other: &Matrix, m: i64) -> Matrix {
        let n = self.size();
        let columns = other.transpose();
        Matrix {
            rows: (0..n)
                .map(|i| {
                    (0..n)
                        .map(|j| {
                            let sum: i128 = self.rows[i]
                                .iter()
                                .zip(&columns.rows[j])
                                .map(|(&a, &b)| a as i128 * b as i128)
                                .sum();
                            sum.rem_euclid(m as i128) as i64
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|v| format!("{v:>4}")).collect();
            writeln!(f, "[{}]", cells.join(""))?;
        }
        Ok(())
    }
}

/// `M⁻¹ mod m` via the adjugate, or `None` when `det` has no inverse
/// (always `None` for `m < 2`)
pub fn invert_matrix_mod(matrix: &Matrix, m: i64) -> Option<Matrix> {
    if m < 2 {
        return None;
    }
    let det = matrix.determinant_mod(m);
    let Some(det_inv) = mod_inverse(det, m) else {
        tracing::debug!("matrix not invertible: det {} shares a factor with {}", det, m);
        return None;
    };
    let adjugate = matrix.cofactor_matrix_mod(m).transpose();
    Some(Matrix {
        rows: adjugate
            .rows
            .iter()
            .map(|r| {
                r.iter()
                    .map(|&v| (v as i128 * det_inv as i128).rem_euclid(m as i128) as i64)
                    .collect()
            })
            .collect(),
    })
}

/// Determinant mod `m` of the submatrix picked by `rows` x `cols`.
/// Entries must already lie in `[0, m)`.
fn laplace_mod(m: &[Vec<i64>], rows: &[usize], cols: &[usize], modulus: i64) -> i64 {
    let k = cols.len();
    if k == 0 {
        return modulo(1, modulus);
    }
    let mut memo = vec![None; 1 << k];
    expand_mod(m, rows, cols, (1 << k) - 1, modulus as i128, &mut memo) as i64
}

fn expand_mod(
    m: &[Vec<i64>],
    rows: &[usize],
    cols: &[usize],
    available: usize,
    modulus: i128,
    memo: &mut [Option<i128>],
) -> i128 {
    if available == 0 {
        return 1 % modulus;
    }
    if let Some(det) = memo[available] {
        return det;
    }

    let depth = cols.len() - available.count_ones() as usize;
    let row = &m[rows[depth]];

    let mut det = 0i128;
    let mut sign = 1i128;
    for (j, &col) in cols.iter().enumerate() {
        if available & (1 << j) == 0 {
            continue;
        }
        let entry = row[col] as i128;
        if entry != 0 {
            let sub = expand_mod(m, rows, cols, available & !(1 << j), modulus, memo);
            det = (det + sign * entry * sub).rem_euclid(modulus);
        }
        sign = -sign;
    }

    memo[available] = Some(det);
    det
}

/// Determinant of the submatrix picked by `rows` x `cols`
fn laplace(m: &[Vec<i64>], rows: &[usize], cols: &[usize]) -> i128 {
    let k = cols.len();
    if k == 0 {
        return 1;
    }
    let mut memo = vec![None; 1 << k];
    expand(m, rows, cols, (1 << k) - 1, &mut memo)
}

fn expand(
    m: &[Vec<i64>],
    rows: &[usize],
    cols: &[usize],
    available: usize,
    memo: &mut [Option<i128>],
) -> i128 {
    if available == 0 {
        return 1;
    }
    if let Some(det) = memo[available] {
        return det;
    }

    // one row is consumed per used column
    let depth = cols.len() - available.count_ones() as usize;
    let row = &m[rows[depth]];

    let mut det = 0i128;
    let mut sign = 1i128;
    for (j, &col) in cols.iter().enumerate() {
        if available & (1 << j) == 0 {
            continue;
        }
        let entry = row[col] as i128;
        if entry != 0 {
            det += sign * entry * expand(m, rows, cols, available & !(1 << j), memo);
        }
        sign = -sign;
    }

    memo[available] = Some(det);
    det
}
