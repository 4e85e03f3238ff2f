//! C source rendering for numeric matrices.

use std::fmt::Write;

use nalgebra::DMatrix;

/// Digits after the decimal point in generated literals.
pub const LITERAL_PRECISION: usize = 8;

/// Format like C's `%.{precision}e`: signed exponent, at least two digits.
pub fn format_sci(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf".into() } else { "-inf".into() };
    }

    let raw = format!("{value:.precision$e}");
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(d) => ('-', d),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

/// Render `matrix` as a `double name[rows][cols] = {...};` declaration,
/// followed by a blank line.
pub fn format_c_matrix(matrix: &DMatrix<f64>, name: &str) -> String {
    let (rows, cols) = matrix.shape();
    let mut out = String::new();
    let _ = writeln!(out, "double {name}[{rows}][{cols}] = {{");
    for i in 0..rows {
        let cells: Vec<String> = (0..cols)
            .map(|j| format_sci(matrix[(i, j)], LITERAL_PRECISION))
            .collect();
        let sep = if i + 1 < rows { "," } else { "" };
        let _ = writeln!(out, "    {{{}}}{sep}", cells.join(", "));
    }
    out.push_str("};\n\n");
    out
}

/// Human-readable grid, one row per line.
pub fn format_grid(matrix: &DMatrix<f64>) -> String {
    let mut out = String::new();
    for row in matrix.row_iter() {
        let cells: Vec<String> = row.iter().map(|v| format!("{:>16}", format_sci(*v, 6))).collect();
        let _ = writeln!(out, "[{}]", cells.join(" "));
    }
    out
}
