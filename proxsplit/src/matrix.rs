//! Conversions and inspections of square matrices for post-processing

use num_traits::{Float, Zero};
use totsu::MatBuild;
use totsu_core::{LinAlgEx, MatType};

/// Magnitude at or below which an entry is regarded as an exact zero.
pub const ZERO_SNAP_TOL: f64 = 1e-4;

/// Shape errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeError
{
    /// The length is not a square of any integer.
    NotSquare { len: usize },
    /// The length differs from the expected one.
    LenMismatch { expected: usize, found: usize },
}

impl core::fmt::Display for ShapeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self {
            ShapeError::NotSquare { len } =>
                write!(f, "NotSquare: length {} is not q * q for any q", len),
            ShapeError::LenMismatch { expected, found } =>
                write!(f, "LenMismatch: length {}, expected {}", found, expected),
        }
    }
}

impl std::error::Error for ShapeError {}

//

/// Side length of a flattened square matrix.
/// 
/// Returns `q` such that `q * q == len`, or `Err` with [`ShapeError::NotSquare`].
pub fn square_side(len: usize) -> Result<usize, ShapeError>
{
    let q = (len as f64).sqrt().round() as usize;

    if q * q == len {
        Ok(q)
    }
    else {
        Err(ShapeError::NotSquare { len })
    }
}

/// Reshapes a column-major flattened vector into a square matrix.
/// 
/// Returns a [`MatType::General`] matrix whose element `(r, c)` is `v[c * q + r]`.
pub fn colvec_to_square<L: LinAlgEx>(v: &[L::F]) -> Result<MatBuild<L>, ShapeError>
{
    let q = square_side(v.len())?;

    Ok(MatBuild::new(MatType::General(q, q)).iter_colmaj(v))
}

/// Flattens a square matrix in column-major order.
/// 
/// A [`MatType::SymPack`] matrix is expanded to both triangles.
pub fn square_to_colvec<L: LinAlgEx>(mat: &MatBuild<L>) -> Result<Vec<L::F>, ShapeError>
{
    let (nr, nc) = mat.size();
    if nr != nc {
        return Err(ShapeError::NotSquare { len: nr * nc });
    }

    let mut v = Vec::with_capacity(nr * nc);
    for c in 0.. nc {
        for r in 0.. nr {
            v.push(mat[(r, c)]);
        }
    }
    Ok(v)
}

/// Sets every entry with magnitude `<= tol` to exactly zero.
pub fn snap_zeros<L: LinAlgEx>(mat: &mut MatBuild<L>, tol: L::F)
{
    let f0 = L::F::zero();

    for e in mat.as_mut() {
        if e.abs() <= tol {
            *e = f0;
        }
    }
}

/// Counts the nonzero entries of the whole matrix, both triangles for [`MatType::SymPack`].
pub fn count_nonzeros<L: LinAlgEx>(mat: &MatBuild<L>) -> usize
{
    let f0 = L::F::zero();
    let (nr, nc) = mat.size();

    let mut cnt = 0;
    for c in 0.. nc {
        for r in 0.. nr {
            if mat[(r, c)] != f0 {
                cnt += 1;
            }
        }
    }
    cnt
}

/// Checks if the matrix is square and \\(|a_{rc} - a_{cr}| \le {\rm tol}\\) for all entries.
pub fn is_symmetric<L: LinAlgEx>(mat: &MatBuild<L>, tol: L::F) -> bool
{
    let (nr, nc) = mat.size();
    if nr != nc {
        return false;
    }
    if mat.is_sympack() {
        return true;
    }

    for c in 0.. nc {
        for r in 0.. c {
            if (mat[(r, c)] - mat[(c, r)]).abs() > tol {
                return false;
            }
        }
    }
    true
}

//

#[test]
fn test_matrix_roundtrip()
{
    use totsu_core::FloatGeneric;

    type L = FloatGeneric<f64>;

    let v: Vec<f64> = (0.. 9).map(|i| i as f64 * 0.5 - 1.).collect();
    let mat = colvec_to_square::<L>(&v).unwrap();

    assert_eq!(mat.size(), (3, 3));
    assert_eq!(mat[(2, 0)], v[2]);
    assert_eq!(mat[(0, 2)], v[6]);
    assert_eq!(square_to_colvec(&mat).unwrap(), v);

    assert_eq!(colvec_to_square::<L>(&[1.; 8]).err(), Some(ShapeError::NotSquare { len: 8 }));
    assert_eq!(colvec_to_square::<L>(&[]).map(|m| m.size()), Ok((0, 0)));
}

#[test]
fn test_matrix_snap_zeros()
{
    use totsu_core::FloatGeneric;

    type L = FloatGeneric<f64>;

    let v = [1., 5e-5, -2e-5, 3., -1e-4, 0., 2e-4, 1e-3, -4.];
    let mut mat = colvec_to_square::<L>(&v).unwrap();

    snap_zeros(&mut mat, ZERO_SNAP_TOL);
    let once = square_to_colvec(&mat).unwrap();
    assert_eq!(once, vec![1., 0., 0., 3., 0., 0., 2e-4, 1e-3, -4.]);
    assert_eq!(count_nonzeros(&mat), 5);

    snap_zeros(&mut mat, ZERO_SNAP_TOL);
    assert_eq!(square_to_colvec(&mat).unwrap(), once);

    assert!(!is_symmetric(&mat, 1e-12));
    let sym = MatBuild::<L>::new(MatType::SymPack(3)).by_fn(|r, c| (r + c) as f64);
    assert!(is_symmetric(&sym, 0.));
    assert_eq!(count_nonzeros(&sym), 8);
}
