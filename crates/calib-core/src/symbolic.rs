//! Exact polynomial algebra over the entries of a square matrix.
//!
//! A [`Polynomial`] is always stored expanded with like terms merged and zero
//! terms dropped, so equality and rendering are canonical. That canonical form
//! is the only simplification the generator needs: determinants and cofactors
//! of a matrix of independent symbols are polynomials with integer
//! coefficients.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::ops::{Add, Mul, Neg, Sub};

use crate::error::{CalibError, CalibResult};

/// Largest dimension the generator accepts. Term count grows as n!.
pub const MAX_DIMENSION: usize = 6;

// ---------------------------------------------------------------------------
// Symbol / Monomial
// ---------------------------------------------------------------------------

/// Matrix entry `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    pub row: usize,
    pub col: usize,
}

/// Product of symbols, kept sorted. Repeated symbols encode powers.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Monomial(Vec<Symbol>);

impl Monomial {
    pub fn one() -> Self {
        Self(Vec::new())
    }

    fn times(&self, other: &Monomial) -> Monomial {
        let mut merged = Vec::with_capacity(self.0.len() + other.0.len());
        merged.extend_from_slice(&self.0);
        merged.extend_from_slice(&other.0);
        merged.sort_unstable();
        Monomial(merged)
    }
}

// ---------------------------------------------------------------------------
// Polynomial
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Polynomial {
    terms: BTreeMap<Monomial, i64>,
}

impl Polynomial {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn constant(c: i64) -> Self {
        let mut p = Self::zero();
        p.add_term(Monomial::one(), c);
        p
    }

    pub fn symbol(row: usize, col: usize) -> Self {
        let mut p = Self::zero();
        p.add_term(Monomial(vec![Symbol { row, col }]), 1);
        p
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    fn add_term(&mut self, monomial: Monomial, coeff: i64) {
        if coeff == 0 {
            return;
        }
        match self.terms.entry(monomial) {
            Entry::Vacant(slot) => {
                slot.insert(coeff);
            }
            Entry::Occupied(mut slot) => {
                *slot.get_mut() += coeff;
                if *slot.get() == 0 {
                    slot.remove();
                }
            }
        }
    }

    /// Evaluate with `value(row, col)` substituted for each symbol.
    pub fn eval<F>(&self, value: F) -> f64
    where
        F: Fn(usize, usize) -> f64,
    {
        self.terms
            .iter()
            .map(|(m, c)| {
                m.0.iter()
                    .fold(*c as f64, |acc, s| acc * value(s.row, s.col))
            })
            .sum()
    }

    /// Render as a C expression, indexing symbols as `name[row][col]`.
    pub fn to_c(&self, name: &str) -> String {
        if self.is_zero() {
            return "0".into();
        }

        let mut out = String::new();
        for (i, (monomial, coeff)) in self.terms.iter().enumerate() {
            let magnitude = coeff.unsigned_abs();
            match (i, *coeff < 0) {
                (0, true) => out.push('-'),
                (0, false) => {}
                (_, true) => out.push_str(" - "),
                (_, false) => out.push_str(" + "),
            }

            let factors: Vec<String> = monomial
                .0
                .iter()
                .map(|s| format!("{name}[{}][{}]", s.row, s.col))
                .collect();
            match (magnitude, factors.is_empty()) {
                (m, true) => out.push_str(&m.to_string()),
                (1, false) => out.push_str(&factors.join("*")),
                (m, false) => {
                    out.push_str(&m.to_string());
                    out.push('*');
                    out.push_str(&factors.join("*"));
                }
            }
        }
        out
    }
}

impl Add for &Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: Self) -> Polynomial {
        let mut out = self.clone();
        for (m, c) in &rhs.terms {
            out.add_term(m.clone(), *c);
        }
        out
    }
}

impl Sub for &Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: Self) -> Polynomial {
        self + &(-rhs)
    }
}

impl Neg for &Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        Polynomial {
            terms: self.terms.iter().map(|(m, c)| (m.clone(), -c)).collect(),
        }
    }
}

impl Mul for &Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: Self) -> Polynomial {
        let mut out = Polynomial::zero();
        for (ma, ca) in &self.terms {
            for (mb, cb) in &rhs.terms {
                out.add_term(ma.times(mb), ca * cb);
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// SymbolicMatrix
// ---------------------------------------------------------------------------

/// Square matrix of polynomials, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolicMatrix {
    dim: usize,
    entries: Vec<Polynomial>,
}

impl SymbolicMatrix {
    /// `dim`×`dim` matrix whose entry (i, j) is the symbol `a[i][j]`.
    pub fn symbols(dim: usize) -> CalibResult<Self> {
        check_dimension(dim)?;
        let entries = (0..dim * dim)
            .map(|k| Polynomial::symbol(k / dim, k % dim))
            .collect();
        Ok(Self { dim, entries })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, row: usize, col: usize) -> &Polynomial {
        &self.entries[row * self.dim + col]
    }

    /// Copy with row `skip_row` and column `skip_col` removed.
    pub fn minor(&self, skip_row: usize, skip_col: usize) -> SymbolicMatrix {
        let dim = self.dim - 1;
        let mut entries = Vec::with_capacity(dim * dim);
        for r in (0..self.dim).filter(|r| *r != skip_row) {
            for c in (0..self.dim).filter(|c| *c != skip_col) {
                entries.push(self.get(r, c).clone());
            }
        }
        SymbolicMatrix { dim, entries }
    }

    /// Laplace expansion along the first row.
    pub fn determinant(&self) -> Polynomial {
        match self.dim {
            0 => Polynomial::constant(1),
            1 => self.get(0, 0).clone(),
            2 => &(self.get(0, 0) * self.get(1, 1)) - &(self.get(0, 1) * self.get(1, 0)),
            _ => {
                let mut det = Polynomial::zero();
                for col in 0..self.dim {
                    let term = self.get(0, col) * &self.minor(0, col).determinant();
                    det = if col % 2 == 0 {
                        &det + &term
                    } else {
                        &det - &term
                    };
                }
                det
            }
        }
    }

    /// Signed minor `(-1)^(row+col) * det(minor(row, col))`.
    pub fn cofactor(&self, row: usize, col: usize) -> Polynomial {
        let det = self.minor(row, col).determinant();
        if (row + col) % 2 == 0 {
            det
        } else {
            -&det
        }
    }

    /// Transpose of the cofactor matrix, i.e. `det * inverse`.
    pub fn adjugate(&self) -> SymbolicMatrix {
        let dim = self.dim;
        let entries = (0..dim * dim)
            .map(|k| self.cofactor(k % dim, k / dim))
            .collect();
        SymbolicMatrix { dim, entries }
    }
}

fn check_dimension(dim: usize) -> CalibResult<()> {
    if dim == 0 {
        return Err(CalibError::InvalidDimension(dim));
    }
    if dim > MAX_DIMENSION {
        return Err(CalibError::DimensionTooLarge {
            got: dim,
            max: MAX_DIMENSION,
        });
    }
    Ok(())
}
