//! Keyed columnar (vertical) transposition
//!
//! The text is written row by row under the keyword and read out column
//! by column, in the alphabetical order of the keyword letters. Equal
//! letters keep their left-to-right order.

use scytale_core::{Alphabet, Mode, Result, Step, Trace};

use crate::shift::parse_keyword;
use crate::{Cipher, CipherKind};

#[derive(Debug, Clone)]
pub struct ColumnarTransposition {
    keyword: Vec<(char, usize)>,
    /// Column indices in reading order
    order: Vec<usize>,
    alphabet: Alphabet,
}

impl ColumnarTransposition {
    pub fn new(keyword: &str, alphabet: Alphabet) -> Result<Self> {
        let keyword = parse_keyword(keyword, &alphabet)?;
        let mut order: Vec<usize> = (0..keyword.len()).collect();
        order.sort_by_key(|&col| keyword[col].1);
        Ok(Self {
            keyword,
            order,
            alphabet,
        })
    }

    pub fn columns(&self) -> usize {
        self.keyword.len()
    }

    /// Column indices in the order they are read out
    pub fn column_order(&self) -> &[usize] {
        &self.order
    }

    /// Reading rank of every column, left to right
    pub fn ranks(&self) -> Vec<usize> {
        let mut ranks = vec![0; self.order.len()];
        for (rank, &col) in self.order.iter().enumerate() {
            ranks[col] = rank;
        }
        ranks
    }

    /// Plaintext grid, row-major; the last row may be short
    pub fn grid(&self, text: &str) -> Vec<Vec<char>> {
        let letters: Vec<char> = self.alphabet.filter(text).chars().collect();
        letters.chunks(self.columns()).map(|r| r.to_vec()).collect()
    }

    fn record_column(&self, col: usize, chars: &str, trace: &mut Trace) {
        trace.record(
            Step::new(chars, chars)
                .with_key(self.keyword[col].0.to_string())
                .with_detail(format!("column {}", col + 1)),
        );
    }

    fn encrypt_text(&self, text: &str, trace: &mut Trace) -> String {
        let grid = self.grid(text);
        if grid.is_empty() {
            return String::new();
        }

        let columns: Vec<String> = self
            .order
            .iter()
            .map(|&col| {
                let column: String = grid.iter().filter_map(|row| row.get(col)).collect();
                self.record_column(col, &column, trace);
                column
            })
            .collect();
        columns.join(" ")
    }

    /// Column contents in reading order.
    ///
    /// One space-separated group per column gives exact lengths; anything
    /// else gets `rows` characters per column.
    fn split_columns(&self, text: &str) -> Vec<Vec<char>> {
        let cols = self.columns();
        let groups: Vec<&str> = text.split(' ').collect();
        if groups.len() == cols {
            return groups
                .iter()
                .map(|g| self.alphabet.filter(g).chars().collect())
                .collect();
        }

        let letters: Vec<char> = self.alphabet.filter(text).chars().collect();
        if letters.len() % cols != 0 {
            tracing::warn!(
                "columnar decrypt: {} letters over {} columns without group separators, \
                 assuming full columns",
                letters.len(),
                cols
            );
        }
        let rows = letters.len().div_ceil(cols);
        (0..cols)
            .map(|i| {
                let start = (i * rows).min(letters.len());
                let end = (start + rows).min(letters.len());
                letters[start..end].to_vec()
            })
            .collect()
    }

    fn decrypt_text(&self, text: &str, trace: &mut Trace) -> String {
        let mut columns = vec![Vec::new(); self.columns()];
        for (chars, &col) in self.split_columns(text).into_iter().zip(&self.order) {
            let column: String = chars.iter().collect();
            self.record_column(col, &column, trace);
            columns[col] = chars;
        }

        let rows = columns.iter().map(Vec::len).max().unwrap_or(0);
        let mut out = String::new();
        for r in 0..rows {
            out.extend(columns.iter().filter_map(|c| c.get(r)));
        }
        out
    }
}

impl Cipher for ColumnarTransposition {
    fn kind(&self) -> CipherKind {
        CipherKind::Columnar
    }

    fn transform(&self, text: &str, mode: Mode, trace: &mut Trace) -> Result<String> {
        Ok(match mode {
            Mode::Encrypt => self.encrypt_text(text, trace),
            Mode::Decrypt => self.decrypt_text(text, trace),
        })
    }
}
