//! Dense integer matrices and the helpers around them.
//!
//! The parallel engine only needs the [`Matrix`] type and the row kernel in
//! [`naive_ijk`]. Generation and printing live here too since every front end
//! needs them.

pub mod display;
pub mod generate;
pub mod naive_ijk;

use crate::error::{MatmulError, Result};

/// Row-major `rows × cols` grid of `i32`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<i32>,
}

impl Matrix {
    /// Zero-filled matrix, used for the output of a product.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0; rows * cols],
        }
    }

    /// Wraps a row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`MatmulError::ShapeMismatch`] if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<i32>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(MatmulError::ShapeMismatch(format!(
                "expected {}x{}={} elements, got {}",
                rows,
                cols,
                rows * cols,
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Builds a matrix from nested rows. Ragged input is rejected.
    ///
    /// ```
    /// use matmul_monitor::Matrix;
    ///
    /// let m = Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
    /// assert_eq!(m.get(1, 0), 3);
    /// ```
    pub fn from_rows(rows: Vec<Vec<i32>>) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(MatmulError::ShapeMismatch(format!(
                    "row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    n_cols
                )));
            }
            data.extend(row);
        }
        Ok(Self {
            rows: n_rows,
            cols: n_cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Element at `(i, j)`. Panics when out of bounds, like slice indexing.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> i32 {
        assert!(i < self.rows && j < self.cols, "index ({}, {}) out of bounds", i, j);
        self.data[i * self.cols + j]
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[i32] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [i32] {
        &mut self.data
    }

    /// Nested-row copy, handy for assertions and printing.
    pub fn to_rows(&self) -> Vec<Vec<i32>> {
        self.data.chunks(self.cols.max(1)).map(<[i32]>::to_vec).collect()
    }
}

/// Checks `A.cols == B.rows` and that neither operand is empty.
pub fn check_product_shapes(a: &Matrix, b: &Matrix) -> Result<()> {
    crate::error::check_dimensions(a.rows(), a.cols(), b.cols())?;
    if a.cols() != b.rows() {
        return Err(MatmulError::ShapeMismatch(format!(
            "A is {}x{} but B is {}x{}",
            a.rows(),
            a.cols(),
            b.rows(),
            b.cols()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_rejects_bad_length() {
        assert!(Matrix::from_vec(2, 2, vec![1, 2, 3]).is_err());
        assert!(Matrix::from_vec(2, 2, vec![1, 2, 3, 4]).is_ok());
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let err = Matrix::from_rows(vec![vec![1, 2], vec![3]]).unwrap_err();
        assert!(matches!(err, MatmulError::ShapeMismatch(_)));
    }

    #[test]
    fn test_row_access() {
        let m = Matrix::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(m.row(1), &[4, 5, 6]);
        assert_eq!(m.get(0, 2), 3);
        assert_eq!(m.to_rows(), vec![vec![1, 2, 3], vec![4, 5, 6]]);
    }

    #[test]
    fn test_shape_check() {
        let a = Matrix::zeros(2, 3);
        let b = Matrix::zeros(3, 4);
        assert!(check_product_shapes(&a, &b).is_ok());
        assert!(check_product_shapes(&b, &a).is_err());
        assert!(check_product_shapes(&Matrix::zeros(0, 3), &b).is_err());
    }
}
