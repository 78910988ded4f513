//! Keyed letter squares
//!
//! Shared by Playfair and Polybius. The keyword's letters come first (in
//! order, duplicates skipped), then the rest of the alphabet, laid out
//! row-major. The last row may be short when the alphabet does not fill
//! the grid; row and column walks then wrap within the occupied cells.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use scytale_core::{modulo, Alphabet, Error, Result};

/// Grid dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dims {
    pub rows: usize,
    pub cols: usize,
}

impl Dims {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn square(n: usize) -> Self {
        Self { rows: n, cols: n }
    }

    pub fn cells(&self) -> usize {
        self.rows * self.cols
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.rows, self.cols)
    }
}

#[derive(Debug, Clone)]
pub struct Square {
    dims: Dims,
    cells: Vec<char>,
    positions: HashMap<char, (usize, usize)>,
    alphabet: Alphabet,
}

impl Square {
    /// Build a keyed square.
    ///
    /// Keyword characters are normalized through the alphabet; anything
    /// still outside it is skipped.
    pub fn build(keyword: &str, alphabet: &Alphabet, dims: Dims) -> Result<Self> {
        if dims.cols == 0 || dims.cells() < alphabet.len() {
            return Err(Error::SquareTooSmall {
                rows: dims.rows,
                cols: dims.cols,
                needed: alphabet.len(),
            });
        }

        let mut cells = Vec::with_capacity(alphabet.len());
        let mut positions = HashMap::with_capacity(alphabet.len());

        let keyed = keyword.chars().map(|c| alphabet.normalize(c));
        for c in keyed.chain(alphabet.chars().iter().copied()) {
            if !alphabet.contains(c) {
                tracing::debug!("square keyword: skipping '{}'", c);
                continue;
            }
            if positions.contains_key(&c) {
                continue;
            }
            let i = cells.len();
            positions.insert(c, (i / dims.cols, i % dims.cols));
            cells.push(c);
        }

        Ok(Self {
            dims,
            cells,
            positions,
            alphabet: alphabet.clone(),
        })
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Cells in row-major order
    pub fn chars(&self) -> &[char] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every cell is occupied
    pub fn is_full(&self) -> bool {
        self.cells.len() == self.dims.cells()
    }

    /// `(row, col)` of a character, after normalization
    pub fn position(&self, c: char) -> Option<(usize, usize)> {
        self.positions.get(&self.alphabet.normalize(c)).copied()
    }

    pub fn at(&self, row: usize, col: usize) -> Option<char> {
        if col >= self.dims.cols {
            return None;
        }
        self.cells.get(row * self.dims.cols + col).copied()
    }

    /// Occupied cells in `row`
    pub fn row_len(&self, row: usize) -> usize {
        let start = row * self.dims.cols;
        self.cells.len().saturating_sub(start).min(self.dims.cols)
    }

    /// Occupied cells in `col`
    pub fn col_len(&self, col: usize) -> usize {
        if col >= self.dims.cols || col >= self.cells.len() {
            return 0;
        }
        (self.cells.len() - col - 1) / self.dims.cols + 1
    }

    /// Character `delta` cells along the row, wrapping
    pub fn step_in_row(&self, row: usize, col: usize, delta: i64) -> Option<char> {
        let len = self.row_len(row) as i64;
        if len == 0 {
            return None;
        }
        self.at(row, modulo(col as i64 + delta, len) as usize)
    }

    /// Character `delta` cells down the column, wrapping
    pub fn step_in_col(&self, row: usize, col: usize, delta: i64) -> Option<char> {
        let len = self.col_len(col) as i64;
        if len == 0 {
            return None;
        }
        self.at(modulo(row as i64 + delta, len) as usize, col)
    }

    /// Rows as slices; the last may be short
    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        self.cells.chunks(self.dims.cols)
    }

    /// Grid with 1-based coordinates along the edges
    pub fn render(&self) -> String {
        let mut out = String::from("     ");
        for col in 1..=self.dims.cols {
            out.push_str(&format!("{col:<3}"));
        }
        out.push('\n');
        for (i, row) in self.rows().enumerate() {
            out.push_str(&format!("  {}  ", i + 1));
            for c in row {
                out.push_str(&format!("{c:<3}"));
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scytale_core::AlphabetId;

    fn en25() -> Alphabet {
        Alphabet::new("EN-25", "ABCDEFGHIKLMNOPQRSTUVWXYZ", &[('J', 'I')]).unwrap()
    }

    #[test]
    fn test_keyword_first() {
        let sq = Square::build("KEYWORD", &en25(), Dims::square(5)).unwrap();
        let first: String = sq.chars()[..10].iter().collect();
        assert_eq!(first, "KEYWORDABC");
        assert_eq!(sq.position('K'), Some((0, 0)));
        assert_eq!(sq.position('r'), Some((1, 0)));
        assert!(sq.is_full());
    }

    #[test]
    fn test_duplicates_and_folds_in_keyword() {
        let sq = Square::build("JIJI balloon", &en25(), Dims::square(5)).unwrap();
        let first: String = sq.chars()[..5].iter().collect();
        assert_eq!(first, "IBALO");
        assert_eq!(sq.position('J'), sq.position('I'));
        assert_eq!(sq.len(), 25);
    }

    #[test]
    fn test_lookup_is_total() {
        let alphabet = AlphabetId::Ru33.alphabet();
        let sq = Square::build("ШИФР", &alphabet, Dims::square(6)).unwrap();
        for &c in alphabet.chars() {
            let (r, col) = sq.position(c).unwrap();
            assert_eq!(sq.at(r, col), Some(c));
        }
    }

    #[test]
    fn test_too_small() {
        let alphabet = AlphabetId::Ru33.alphabet();
        assert_eq!(
            Square::build("", &alphabet, Dims::square(5)).unwrap_err(),
            Error::SquareTooSmall {
                rows: 5,
                cols: 5,
                needed: 33
            }
        );
    }

    #[test]
    fn test_ragged_wrapping() {
        // 33 chars in 6x6: last row holds 3 cells
        let alphabet = AlphabetId::Ru33.alphabet();
        let sq = Square::build("", &alphabet, Dims::square(6)).unwrap();
        assert!(!sq.is_full());
        assert_eq!(sq.row_len(5), 3);
        assert_eq!(sq.row_len(6), 0);
        assert_eq!(sq.col_len(2), 6);
        assert_eq!(sq.col_len(3), 5);
        assert_eq!(sq.at(5, 3), None);

        // last row is Э Ю Я
        assert_eq!(sq.step_in_row(5, 2, 1), Some('Э'));
        // column 4 has 5 cells, walking down from row 4 wraps to row 0
        assert_eq!(sq.step_in_col(4, 4, 1), Some('Д'));
    }

    #[test]
    fn test_render_has_coordinates() {
        let sq = Square::build("", &en25(), Dims::square(5)).unwrap();
        let text = sq.render();
        assert_eq!(text.lines().count(), 6);
        assert!(text.lines().nth(1).unwrap().starts_with("  1  A"));
    }
}
