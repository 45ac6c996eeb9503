use super::{Matrix, check_product_shapes};
use crate::error::Result;

/// One row of C = A × B using the textbook i-j-k order.
///
/// `out` must hold exactly `b.cols()` elements. Accumulation wraps on
/// overflow instead of panicking in debug builds.
///
/// Workers call this once per assigned row, so the parallel and sequential
/// products share the same arithmetic.
#[inline]
pub fn row_product(a: &Matrix, b: &Matrix, i: usize, out: &mut [i32]) {
    debug_assert_eq!(out.len(), b.cols());
    let a_row = a.row(i);
    let n = b.cols();
    let bd = b.as_slice();
    for (j, cell) in out.iter_mut().enumerate() {
        let mut sum: i32 = 0;
        for (p, &av) in a_row.iter().enumerate() {
            sum = sum.wrapping_add(av.wrapping_mul(bd[p * n + j]));
        }
        *cell = sum;
    }
}

/// Single-threaded reference product.
///
/// This is the correctness oracle for the parallel engine and the
/// sequential baseline for `--compare`.
///
/// # Errors
///
/// Fails when either matrix is empty or `a.cols() != b.rows()`.
pub fn multiply_reference(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    check_product_shapes(a, b)?;
    let mut c = Matrix::zeros(a.rows(), b.cols());
    let n = b.cols();
    for (i, out) in c.as_mut_slice().chunks_mut(n).enumerate() {
        row_product(a, b, i, out);
    }
    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_2x2() {
        let a = Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        let b = Matrix::from_rows(vec![vec![5, 6], vec![7, 8]]).unwrap();
        let c = multiply_reference(&a, &b).unwrap();
        assert_eq!(c.to_rows(), vec![vec![19, 22], vec![43, 50]]);
    }

    #[test]
    fn test_reference_non_square() {
        let a = Matrix::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        let b = Matrix::from_rows(vec![vec![7, 8], vec![9, 10], vec![11, 12]]).unwrap();
        let c = multiply_reference(&a, &b).unwrap();
        assert_eq!(c.to_rows(), vec![vec![58, 64], vec![139, 154]]);
    }

    #[test]
    fn test_overflow_wraps() {
        let a = Matrix::from_rows(vec![vec![i32::MAX, 1]]).unwrap();
        let b = Matrix::from_rows(vec![vec![1], vec![1]]).unwrap();
        let c = multiply_reference(&a, &b).unwrap();
        assert_eq!(c.get(0, 0), i32::MIN);
    }
}
