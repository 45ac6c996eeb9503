use std::fmt::Write;

use super::Matrix;

/// Renders a small matrix as an indented block with width-4 cells.
///
/// ```
/// use matmul_monitor::Matrix;
/// use matmul_monitor::matrix::display::format_matrix;
///
/// let m = Matrix::from_rows(vec![vec![1, 22]]).unwrap();
/// assert_eq!(format_matrix(&m, "A"), "\nMatrix A:\n     1    22  \n");
/// ```
pub fn format_matrix(m: &Matrix, name: &str) -> String {
    let mut out = format!("\nMatrix {}:\n", name);
    for i in 0..m.rows() {
        out.push_str("  ");
        for v in m.row(i) {
            let _ = write!(out, "{:>4}  ", v);
        }
        out.push('\n');
    }
    out
}

/// Whether a product is small enough to print in full.
pub fn fits_print_limit(rows: usize, cols: usize, limit: usize) -> bool {
    rows <= limit && cols <= limit
}
