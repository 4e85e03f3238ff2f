use std::fmt::Write;

use nalgebra::DMatrix;

use crate::error::{CalibError, CalibResult};
use crate::symbolic::{Polynomial, SymbolicMatrix};

/// Variable names used in the generated statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeNames {
    /// Input array, indexed `input[row][col]`.
    pub input: String,
    /// Output array receiving the inverse.
    pub output: String,
    /// Scalar holding the determinant.
    pub det: String,
}

impl Default for CodeNames {
    fn default() -> Self {
        Self {
            input: "a".into(),
            output: "res".into(),
            det: "det".into(),
        }
    }
}

/// Closed-form inverse of a general square matrix, kept as
/// `determinant` plus `adjugate = inverse * determinant` so the division is
/// left to the generated code.
#[derive(Debug, Clone)]
pub struct InverseFormulas {
    pub determinant: Polynomial,
    pub adjugate: SymbolicMatrix,
}

impl InverseFormulas {
    pub fn derive(dim: usize) -> CalibResult<Self> {
        let matrix = SymbolicMatrix::symbols(dim)?;
        let determinant = matrix.determinant();
        let adjugate = matrix.adjugate();
        tracing::debug!(
            dim,
            det_terms = determinant.term_count(),
            "derived symbolic inverse"
        );
        Ok(Self {
            determinant,
            adjugate,
        })
    }

    pub fn dim(&self) -> usize {
        self.adjugate.dim()
    }

    /// Evaluate the formulas on a concrete matrix: `(det, inverse)`.
    pub fn evaluate(&self, values: &DMatrix<f64>) -> (f64, DMatrix<f64>) {
        let at = |r: usize, c: usize| values[(r, c)];
        let det = self.determinant.eval(at);
        let dim = self.dim();
        let inverse = DMatrix::from_fn(dim, dim, |r, c| self.adjugate.get(r, c).eval(at) / det);
        (det, inverse)
    }

    /// Compare against `nalgebra` on `sample` with relative tolerance `tol`.
    pub fn verify(&self, sample: &DMatrix<f64>, tol: f64) -> CalibResult<()> {
        let dim = self.dim();
        if sample.shape() != (dim, dim) {
            return Err(CalibError::VerificationFailed(format!(
                "sample is {:?}, formulas are {dim}x{dim}",
                sample.shape()
            )));
        }

        let expected_det = sample.determinant();
        let expected_inv = sample.clone().try_inverse().ok_or_else(|| {
            CalibError::VerificationFailed("sample matrix is singular".into())
        })?;
        let (det, inverse) = self.evaluate(sample);

        if !close(det, expected_det, tol) {
            return Err(CalibError::VerificationFailed(format!(
                "determinant {det} != {expected_det}"
            )));
        }
        for r in 0..dim {
            for c in 0..dim {
                let (got, want) = (inverse[(r, c)], expected_inv[(r, c)]);
                if !close(got, want, tol) {
                    return Err(CalibError::VerificationFailed(format!(
                        "inverse[{r}][{c}] {got} != {want}"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol * a.abs().max(b.abs()).max(1.0)
}

/// Diagonally dominant, hence invertible, test matrix with no symmetry that
/// could hide an index mix-up.
pub fn sample_matrix(dim: usize) -> DMatrix<f64> {
    DMatrix::from_fn(dim, dim, |r, c| {
        if r == c {
            (dim as f64) * 2.0 + r as f64
        } else {
            ((r * 7 + c * 3) % 5) as f64 * 0.25 - 0.5
        }
    })
}

/// C statements: the determinant, then one division per inverse entry.
pub fn render_inverse(formulas: &InverseFormulas, names: &CodeNames) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "double {} = {};",
        names.det,
        formulas.determinant.to_c(&names.input)
    );
    let dim = formulas.dim();
    for r in 0..dim {
        for c in 0..dim {
            let _ = writeln!(
                out,
                "{}[{r}][{c}] = ({}) / {};",
                names.output,
                formulas.adjugate.get(r, c).to_c(&names.input),
                names.det
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_2x2() {
        let formulas = InverseFormulas::derive(2).unwrap();
        let text = render_inverse(&formulas, &CodeNames::default());
        let expected = "double det = a[0][0]*a[1][1] - a[0][1]*a[1][0];\n\
                        res[0][0] = (a[1][1]) / det;\n\
                        res[0][1] = (-a[0][1]) / det;\n\
                        res[1][0] = (-a[1][0]) / det;\n\
                        res[1][1] = (a[0][0]) / det;\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_1x1() {
        let formulas = InverseFormulas::derive(1).unwrap();
        let text = render_inverse(&formulas, &CodeNames::default());
        assert_eq!(text, "double det = a[0][0];\nres[0][0] = (1) / det;\n");
    }

    #[test]
    fn test_render_3x3_shape() {
        let formulas = InverseFormulas::derive(3).unwrap();
        let names = CodeNames {
            input: "m".into(),
            output: "out".into(),
            det: "d".into(),
        };
        let text = render_inverse(&formulas, &names);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert!(lines[0].starts_with("double d = m[0][0]*m[1][1]*m[2][2]"));
        assert_eq!(lines[1], "out[0][0] = (m[1][1]*m[2][2] - m[1][2]*m[2][1]) / d;");
        assert_eq!(lines[2], "out[0][1] = (-m[0][1]*m[2][2] + m[0][2]*m[2][1]) / d;");
        assert!(lines.iter().skip(1).all(|l| l.ends_with(") / d;")));
    }

    #[test]
    fn test_formulas_match_numeric_inverse() {
        for dim in 1..=5 {
            let formulas = InverseFormulas::derive(dim).unwrap();
            formulas.verify(&sample_matrix(dim), 1e-9).unwrap();
        }
    }

    #[test]
    fn test_formulas_on_arbitrary_matrix() {
        let m = DMatrix::from_row_slice(
            3,
            3,
            &[4.0, -2.0, 1.0, 0.5, 3.0, -1.5, 2.0, 1.0, 5.0],
        );
        let formulas = InverseFormulas::derive(3).unwrap();
        let (det, inverse) = formulas.evaluate(&m);
        assert!((det - m.determinant()).abs() < 1e-9);
        let identity = &m * &inverse;
        for r in 0..3 {
            for c in 0..3 {
                let want = if r == c { 1.0 } else { 0.0 };
                assert!((identity[(r, c)] - want).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_verify_rejects_wrong_shape_and_singular() {
        let formulas = InverseFormulas::derive(2).unwrap();
        assert!(formulas.verify(&sample_matrix(3), 1e-9).is_err());
        let singular = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        assert!(matches!(
            formulas.verify(&singular, 1e-9),
            Err(CalibError::VerificationFailed(_))
        ));
    }

    #[test]
    fn test_sample_matrix_is_invertible() {
        for dim in 1..=6 {
            assert!(sample_matrix(dim).try_inverse().is_some());
        }
    }

    #[test]
    fn test_derive_rejects_large_dimension() {
        assert!(matches!(
            InverseFormulas::derive(7),
            Err(CalibError::DimensionTooLarge { .. })
        ));
    }
}
