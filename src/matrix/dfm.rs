use num::{FromPrimitive, Num};
use tracing::debug;

use crate::error::{Result, TokensError};
use crate::matrix::CscMatrix;
use crate::tokens::{TokenId, TokensObject, PADDING};
use crate::utils::sort::radix_sort_ids;

impl TokensObject {
    /// Document-feature matrix with `f64` counts
    /// see `dfm_as`
    pub fn dfm(&mut self, asis: bool) -> Result<CscMatrix<f64>> {
        self.dfm_as(asis)
    }

    /// Document-feature matrix
    /// rows are features, columns are documents, values are counts.
    ///
    /// Unless `asis`, the object is recompiled first, which makes feature ids
    /// dense and ordered by first occurrence. With `asis` the current ids are
    /// used verbatim and every vocabulary entry gets a row, used or not.
    ///
    /// When padding occurs anywhere, row 0 is the padding row named `""`
    /// and feature `i` is row `i`; otherwise feature `i` is row `i - 1`.
    ///
    /// # Errors
    /// * `TokensError::Value` - a count does not fit in `N`
    pub fn dfm_as<N>(&mut self, asis: bool) -> Result<CscMatrix<N>>
    where
        N: Num + Copy + FromPrimitive + Send,
    {
        if !asis {
            self.recompile();
        }
        let has_pad = self
            .exec
            .map(&self.texts, |_, text| text.contains(&PADDING))
            .into_iter()
            .any(|p| p);
        let shift: TokenId = if has_pad { 0 } else { 1 };

        let columns: Vec<(Vec<u32>, Vec<N>)> = self.exec.try_map(&self.texts, |_, text| {
            let mut ids = text.clone();
            radix_sort_ids(&mut ids);
            let mut rows = Vec::new();
            let mut counts = Vec::new();
            let mut i = 0;
            while i < ids.len() {
                let id = ids[i];
                let run = ids[i..].iter().take_while(|&&x| x == id).count();
                rows.push(id - shift);
                counts.push(N::from_usize(run).ok_or_else(|| {
                    TokensError::value(format!("count {run} is not representable in the value type"))
                })?);
                i += run;
            }
            Ok((rows, counts))
        })?;

        let nnz: usize = columns.iter().map(|(r, _)| r.len()).sum();
        let mut col_ptr = Vec::with_capacity(columns.len() + 1);
        let mut row_ind = Vec::with_capacity(nnz);
        let mut values = Vec::with_capacity(nnz);
        col_ptr.push(0);
        for (rows, counts) in columns {
            row_ind.extend(rows);
            values.extend(counts);
            col_ptr.push(row_ind.len());
        }

        let mut row_names: Vec<Box<str>> = Vec::with_capacity(self.vocab.len() + 1);
        if has_pad {
            row_names.push("".into());
        }
        row_names.extend(self.vocab.as_slice().iter().cloned());

        debug!(nrow = row_names.len(), ncol = self.texts.len(), nnz, asis, "built document-feature matrix");
        Ok(CscMatrix {
            shape: (row_names.len(), self.texts.len()),
            col_ptr,
            row_ind,
            values,
            row_names,
            col_names: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Threads, TokensConfig};

    #[test]
    fn counts_without_padding() {
        let mut toks = TokensObject::new(vec![vec![2, 1, 2], vec![3, 3]], ["a", "b", "c"]).unwrap();
        let m = toks.dfm(false).unwrap();
        // recompiled: b a c
        let names: Vec<&str> = m.row_names.iter().map(|s| s.as_ref()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(m.shape, (3, 2));
        assert_eq!(m.col_ptr, vec![0, 2, 3]);
        assert_eq!(m.row_ind, vec![0, 1, 2]);
        assert_eq!(m.values, vec![2.0, 1.0, 2.0]);
    }

    #[test]
    fn padding_row_comes_first() {
        let mut toks = TokensObject::new(vec![vec![1, 0, 0], vec![2]], ["a", "b"]).unwrap();
        let m = toks.dfm_as::<u32>(false).unwrap();
        assert_eq!(m.row_names[0].as_ref(), "");
        assert_eq!(m.shape, (3, 2));
        assert_eq!(m.get(0, 0), 2);
        assert_eq!(m.get(1, 0), 1);
        assert_eq!(m.get(2, 1), 1);
    }

    #[test]
    fn asis_keeps_unused_and_duplicated_types() {
        let mut toks = TokensObject::new(vec![vec![3, 1]], ["a", "unused", "a"]).unwrap();
        let m = toks.dfm_as::<u32>(true).unwrap();
        assert_eq!(m.shape, (3, 1));
        assert_eq!(m.row_ind, vec![0, 2]);
        assert!(!toks.is_recompiled());
    }

    #[test]
    fn column_sums_are_document_lengths() {
        let mut toks = TokensObject::from_strings(&[vec!["x", "y", "x", "z"], vec![], vec!["z"]]);
        let m = toks.dfm(false).unwrap();
        assert_eq!(m.col_sums(), vec![4.0, 0.0, 1.0]);
        for c in m.columns() {
            assert!(c.rows.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn narrow_value_type_overflows() {
        let mut toks = TokensObject::new(vec![vec![1; 300]], ["a"]).unwrap();
        assert!(matches!(toks.dfm_as::<u8>(false), Err(TokensError::Value(_))));
        assert_eq!(toks.dfm_as::<u16>(false).unwrap().values, vec![300]);
    }

    #[test]
    fn same_result_for_every_thread_setting() {
        let texts: Vec<Vec<TokenId>> = (0..150u32).map(|d| (0..80).map(|i| (d * 3 + i * i) % 50).collect()).collect();
        let types: Vec<String> = (1..=50).map(|i| format!("f{i}")).collect();
        let mut results = Vec::new();
        for threads in [Threads::Sequential, Threads::Auto, Threads::Fixed(3)] {
            let mut toks = TokensObject::new(texts.clone(), &types)
                .unwrap()
                .with_config(TokensConfig::new().threads(threads))
                .unwrap();
            results.push(toks.dfm(false).unwrap());
        }
        assert_eq!(results[0], results[1]);
        assert_eq!(results[0], results[2]);
    }
}
