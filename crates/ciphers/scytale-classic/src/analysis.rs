//! Letter statistics for ciphertext inspection
//!
//! Frequencies over an alphabet, index of coincidence, and a Kasiski
//! examination for guessing Vigenère key lengths.

use std::collections::HashMap;

use serde::Serialize;

use scytale_core::alphabet::upper;
use scytale_core::Alphabet;

/// Letter counts over one alphabet
#[derive(Debug, Clone, Serialize)]
pub struct FrequencyAnalysis {
    /// `(letter, count)` in alphabet order, zeros included
    pub counts: Vec<(char, usize)>,
    pub total: usize,
    #[serde(skip)]
    letters: Vec<char>,
}

impl FrequencyAnalysis {
    /// Count the in-alphabet letters of `text` (after normalization)
    pub fn analyze(text: &str, alphabet: &Alphabet) -> Self {
        let mut counts: Vec<(char, usize)> = alphabet.chars().iter().map(|&c| (c, 0)).collect();
        let mut letters = Vec::new();
        for index in alphabet.indices(text) {
            counts[index].1 += 1;
            letters.push(counts[index].0);
        }

        Self {
            total: letters.len(),
            counts,
            letters,
        }
    }

    pub fn count(&self, c: char) -> usize {
        let c = upper(c);
        self.counts
            .iter()
            .find(|(letter, _)| *letter == c)
            .map_or(0, |&(_, n)| n)
    }

    /// Share of `c` in percent, rounded to one decimal
    pub fn percent(&self, c: char) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let pct = self.count(c) as f64 * 100.0 / self.total as f64;
        (pct * 10.0).round() / 10.0
    }

    /// Most frequent letters; ties keep alphabet order
    pub fn top(&self, n: usize) -> Vec<(char, usize)> {
        let mut present: Vec<(char, usize)> =
            self.counts.iter().copied().filter(|&(_, k)| k > 0).collect();
        present.sort_by(|a, b| b.1.cmp(&a.1));
        present.truncate(n);
        present
    }

    /// Chance that two letters drawn at random are equal.
    /// English prose sits near 0.066, Russian near 0.053.
    pub fn index_of_coincidence(&self) -> f64 {
        let n = self.total;
        if n < 2 {
            return 0.0;
        }
        let pairs: usize = self.counts.iter().map(|&(_, k)| k * k.saturating_sub(1)).sum();
        pairs as f64 / (n * (n - 1)) as f64
    }

    /// Likely key lengths, best first.
    ///
    /// Distances between repeated trigrams are tallied by their divisors
    /// in `2..=20`; the five most common divisors are returned.
    pub fn kasiski_examination(&self) -> Vec<usize> {
        let mut seen: HashMap<&[char], Vec<usize>> = HashMap::new();
        for (i, trigram) in self.letters.windows(3).enumerate() {
            seen.entry(trigram).or_default().push(i);
        }

        let mut divisors: HashMap<usize, usize> = HashMap::new();
        for positions in seen.values().filter(|p| p.len() > 1) {
            for pair in positions.windows(2) {
                let distance = pair[1] - pair[0];
                for d in (2..=distance.min(20)).filter(|d| distance % d == 0) {
                    *divisors.entry(d).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(usize, usize)> = divisors.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.into_iter().take(5).map(|(d, _)| d).collect()
    }

    /// Bar chart, one line per alphabet letter
    pub fn render_ascii(&self) -> String {
        let mut lines = vec!["LETTER FREQUENCIES".to_string(), "═".repeat(44)];

        let max = self.counts.iter().map(|&(_, k)| k).max().unwrap_or(0).max(1);
        for &(c, k) in &self.counts {
            let bar = "█".repeat(k * 30 / max);
            lines.push(format!("{c}: {:5.1}% {:>4} |{bar}", self.percent(c), k));
        }

        lines.push(String::new());
        lines.push(format!("Letters: {}", self.total));
        lines.push(format!("Index of coincidence: {:.4}", self.index_of_coincidence()));
        lines.join("\n")
    }
}
