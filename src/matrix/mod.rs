pub mod dfm;
pub mod fcm;

use num::Num;
use serde::{Deserialize, Serialize};

/// Compressed sparse column matrix
///
/// Column `j` holds the entries `col_ptr[j]..col_ptr[j + 1]` of `row_ind`
/// and `values`; row indices are strictly ascending within a column.
/// Rows are features, named by `row_names`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CscMatrix<N = f64>
where
    N: Num + Copy,
{
    /// (rows, columns)
    pub shape: (usize, usize),
    /// `ncol + 1` cumulative offsets
    pub col_ptr: Vec<usize>,
    pub row_ind: Vec<u32>,
    pub values: Vec<N>,
    pub row_names: Vec<Box<str>>,
    /// column names when columns are features too (co-occurrence matrices)
    pub col_names: Option<Vec<Box<str>>>,
}

/// Non-zero entries of one column
#[derive(Debug, Clone, Copy)]
pub struct Column<'a, N> {
    pub rows: &'a [u32],
    pub values: &'a [N],
}

impl<'a, N: Copy> Column<'a, N> {
    pub fn iter(&self) -> impl Iterator<Item = (u32, N)> + 'a {
        self.rows.iter().copied().zip(self.values.iter().copied())
    }
}

impl<N> CscMatrix<N>
where
    N: Num + Copy,
{
    #[inline]
    pub fn nrow(&self) -> usize {
        self.shape.0
    }

    #[inline]
    pub fn ncol(&self) -> usize {
        self.shape.1
    }

    /// number of stored entries
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Entries of column `j`
    ///
    /// # Panics
    /// when `j >= ncol`
    pub fn column(&self, j: usize) -> Column<'_, N> {
        let range = self.col_ptr[j]..self.col_ptr[j + 1];
        Column {
            rows: &self.row_ind[range.clone()],
            values: &self.values[range],
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = Column<'_, N>> {
        (0..self.ncol()).map(|j| self.column(j))
    }

    /// Value at `(row, col)`, zero when not stored or out of range
    pub fn get(&self, row: usize, col: usize) -> N {
        if col >= self.ncol() {
            return N::zero();
        }
        let column = self.column(col);
        match column.rows.binary_search(&(row as u32)) {
            Ok(i) => column.values[i],
            Err(_) => N::zero(),
        }
    }

    /// Sum of every column
    pub fn col_sums(&self) -> Vec<N> {
        self.columns()
            .map(|c| c.values.iter().fold(N::zero(), |acc, &v| acc + v))
            .collect()
    }

    /// Sum of every row
    pub fn row_sums(&self) -> Vec<N> {
        let mut sums = vec![N::zero(); self.nrow()];
        for (&r, &v) in self.row_ind.iter().zip(&self.values) {
            sums[r as usize] = sums[r as usize] + v;
        }
        sums
    }
}
