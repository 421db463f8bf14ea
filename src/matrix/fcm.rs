use std::collections::HashMap;

use ahash::RandomState;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TokensError};
use crate::matrix::CscMatrix;
use crate::tokens::{TokenId, TokensObject, PADDING};

/// Parameters of `TokensObject::fcm`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FcmOptions {
    /// largest distance between co-occurring tokens
    pub window: usize,
    /// weight of each distance `1..=window`, 1.0 when absent
    pub weights: Option<Vec<f64>>,
    /// keep (left, right) orientation instead of folding into the upper triangle
    pub ordered: bool,
    /// count each pair at most once per document
    pub boolean: bool,
}

impl Default for FcmOptions {
    fn default() -> Self {
        Self {
            window: 5,
            weights: None,
            ordered: false,
            boolean: false,
        }
    }
}

impl FcmOptions {
    pub fn window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn ordered(mut self, ordered: bool) -> Self {
        self.ordered = ordered;
        self
    }

    pub fn boolean(mut self, boolean: bool) -> Self {
        self.boolean = boolean;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(TokensError::value("window must be positive"));
        }
        if let Some(w) = &self.weights {
            if w.len() != self.window {
                return Err(TokensError::value(format!(
                    "{} weights for a window of {}",
                    w.len(),
                    self.window
                )));
            }
        }
        Ok(())
    }

    #[inline]
    fn weight(&self, distance: usize) -> f64 {
        self.weights.as_ref().map_or(1.0, |w| w[distance - 1])
    }
}

type PairCounts = HashMap<(TokenId, TokenId), f64, RandomState>;

impl TokensObject {
    /// Feature co-occurrence matrix
    ///
    /// The object is recompiled first; feature `i` is row and column `i - 1`.
    /// Padding never co-occurs with anything.
    ///
    /// # Errors
    /// * `TokensError::Value` - zero window, or weights not matching the window
    pub fn fcm(&mut self, options: &FcmOptions) -> Result<CscMatrix<f64>> {
        options.validate()?;
        self.recompile();

        // phase 1: pair counts of each document
        let per_doc: Vec<PairCounts> = self.exec.map(&self.texts, |_, text| cooccurrence(text, options));

        // phase 2: merge in document order
        let mut total: PairCounts = HashMap::with_hasher(RandomState::new());
        for counts in per_doc {
            for (pair, v) in counts {
                *total.entry(pair).or_insert(0.0) += v;
            }
        }

        let mut entries: Vec<((TokenId, TokenId), f64)> = total.into_iter().collect();
        // column major
        entries.sort_unstable_by_key(|&((row, col), _)| (col, row));

        let nfeat = self.vocab.len();
        let mut col_ptr = vec![0usize; nfeat + 1];
        let mut row_ind = Vec::with_capacity(entries.len());
        let mut values = Vec::with_capacity(entries.len());
        for ((row, col), v) in entries {
            col_ptr[col as usize] += 1;
            row_ind.push(row - 1);
            values.push(v);
        }
        for j in 1..=nfeat {
            col_ptr[j] += col_ptr[j - 1];
        }

        let names: Vec<Box<str>> = self.vocab.as_slice().to_vec();
        debug!(nfeat, nnz = values.len(), window = options.window, "built feature co-occurrence matrix");
        Ok(CscMatrix {
            shape: (nfeat, nfeat),
            col_ptr,
            row_ind,
            values,
            row_names: names.clone(),
            col_names: Some(names),
        })
    }
}

/// Weighted pair counts of one document, keyed by 1-based (row, col) ids
fn cooccurrence(text: &[TokenId], options: &FcmOptions) -> PairCounts {
    let mut counts: PairCounts = HashMap::with_hasher(RandomState::new());
    for (i, &a) in text.iter().enumerate() {
        if a == PADDING {
            continue;
        }
        for d in 1..=options.window {
            let Some(&b) = text.get(i + d) else { break };
            if b == PADDING {
                continue;
            }
            let pair = if options.ordered || a <= b { (a, b) } else { (b, a) };
            if options.boolean {
                counts.insert(pair, 1.0);
            } else {
                *counts.entry(pair).or_insert(0.0) += options.weight(d);
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Threads, TokensConfig};

    fn corpus() -> TokensObject {
        // a b c a
        TokensObject::new(vec![vec![1, 2, 3, 1]], ["a", "b", "c"]).unwrap()
    }

    #[test]
    fn counts_within_window() {
        let mut toks = corpus();
        let m = toks.fcm(&FcmOptions::default().window(1)).unwrap();
        assert_eq!(m.shape, (3, 3));
        // a-b, b-c, c-a folded to a-c
        assert_eq!(m.get(0, 1), 1.0);
        assert_eq!(m.get(1, 2), 1.0);
        assert_eq!(m.get(0, 2), 1.0);
        assert_eq!(m.get(2, 0), 0.0);
        assert_eq!(m.nnz(), 3);
        assert!(m.col_names.is_some());
    }

    #[test]
    fn ordered_keeps_direction() {
        let mut toks = corpus();
        let m = toks.fcm(&FcmOptions::default().window(1).ordered(true)).unwrap();
        assert_eq!(m.get(2, 0), 1.0);
        assert_eq!(m.get(0, 2), 0.0);
    }

    #[test]
    fn weights_and_boolean() {
        let mut toks = corpus();
        let m = toks.fcm(&FcmOptions::default().window(3).weights(vec![1.0, 0.5, 0.25])).unwrap();
        // a..a at distance 3
        assert_eq!(m.get(0, 0), 0.25);
        // a-c at distances 2 and 1
        assert_eq!(m.get(0, 2), 1.5);

        let mut toks = corpus();
        let m = toks.fcm(&FcmOptions::default().window(3).boolean(true)).unwrap();
        assert_eq!(m.get(0, 2), 1.0);
    }

    #[test]
    fn padding_is_ignored() {
        let mut toks = TokensObject::new(vec![vec![1, 0, 2]], ["a", "b"]).unwrap();
        let m = toks.fcm(&FcmOptions::default().window(1)).unwrap();
        assert_eq!(m.nnz(), 0);
        assert_eq!(m.col_ptr, vec![0, 0, 0]);
    }

    #[test]
    fn invalid_options() {
        let mut toks = corpus();
        assert!(toks.fcm(&FcmOptions::default().window(0)).is_err());
        assert!(toks.fcm(&FcmOptions::default().window(2).weights(vec![1.0])).is_err());
    }

    #[test]
    fn same_result_for_every_thread_setting() {
        let texts: Vec<Vec<TokenId>> = (0..120u32).map(|d| (0..60).map(|i| (d + i * 11) % 30).collect()).collect();
        let types: Vec<String> = (1..=30).map(|i| format!("f{i}")).collect();
        let options = FcmOptions::default().weights(vec![1.0, 0.5, 0.3, 0.2, 0.1]);
        let mut results = Vec::new();
        for threads in [Threads::Sequential, Threads::Auto, Threads::Fixed(2)] {
            let mut toks = TokensObject::new(texts.clone(), &types)
                .unwrap()
                .with_config(TokensConfig::new().threads(threads))
                .unwrap();
            results.push(toks.fcm(&options).unwrap());
        }
        assert_eq!(results[0], results[1]);
        assert_eq!(results[0], results[2]);
    }
}
