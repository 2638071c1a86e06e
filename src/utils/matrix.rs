//! Matrix utility functions.
//!
//! Dense helpers shared by the constraint and distribution code. The
//! factorizations lean on `faer`'s QR; row reduction, triangular solves and
//! Gram-Schmidt are written out by hand so the tolerances stay explicit.

use faer::{Col, Mat};

/// Copy of an `nrows x ncols` block of `m` starting at `(row, col)`.
pub fn block(m: &Mat<f64>, row: usize, col: usize, nrows: usize, ncols: usize) -> Mat<f64> {
    Mat::from_fn(nrows, ncols, |i, j| m[(row + i, col + j)])
}

/// Contiguous segment of a column vector.
pub fn segment(v: &Col<f64>, start: usize, len: usize) -> Col<f64> {
    Col::from_fn(len, |i| v[start + i])
}

/// Vertical concatenation; both inputs must have the same column count.
pub fn vstack(top: &Mat<f64>, bottom: &Mat<f64>) -> Mat<f64> {
    debug_assert_eq!(top.ncols(), bottom.ncols());
    let split = top.nrows();
    Mat::from_fn(split + bottom.nrows(), top.ncols(), |i, j| {
        if i < split {
            top[(i, j)]
        } else {
            bottom[(i - split, j)]
        }
    })
}

/// Concatenation of two column vectors.
pub fn concat(top: &Col<f64>, bottom: &Col<f64>) -> Col<f64> {
    let split = top.nrows();
    Col::from_fn(split + bottom.nrows(), |i| {
        if i < split {
            top[i]
        } else {
            bottom[i - split]
        }
    })
}

/// Numerical rank from the non-increasing diagonal of the column-pivoted QR
/// factor.
pub fn rank(m: &Mat<f64>, tolerance: f64) -> usize {
    if m.nrows() == 0 || m.ncols() == 0 {
        return 0;
    }
    let qr = m.col_piv_qr();
    let r = qr.R();
    let mut rank = 0;
    for i in 0..m.nrows().min(m.ncols()) {
        if r[(i, i)].abs() > tolerance {
            rank += 1;
        } else {
            break;
        }
    }
    rank
}

/// Reduced row-echelon form with partial pivoting.
///
/// Returns the reduced matrix together with the pivot column indices; the
/// pivot count is the numerical rank at the given tolerance.
pub fn rref_with_pivots(m: &Mat<f64>, tolerance: f64) -> (Mat<f64>, Vec<usize>) {
    let nrows = m.nrows();
    let ncols = m.ncols();
    let mut a = m.clone();
    let mut pivots = Vec::new();
    let mut row = 0;

    for col in 0..ncols {
        if row >= nrows {
            break;
        }
        let mut best = row;
        for r in (row + 1)..nrows {
            if a[(r, col)].abs() > a[(best, col)].abs() {
                best = r;
            }
        }
        if a[(best, col)].abs() <= tolerance {
            continue;
        }
        if best != row {
            for j in 0..ncols {
                let tmp = a[(row, j)];
                a[(row, j)] = a[(best, j)];
                a[(best, j)] = tmp;
            }
        }
        let pivot = a[(row, col)];
        for j in 0..ncols {
            a[(row, j)] /= pivot;
        }
        a[(row, col)] = 1.0;
        for r in 0..nrows {
            if r == row {
                continue;
            }
            let factor = a[(r, col)];
            if factor != 0.0 {
                for j in 0..ncols {
                    a[(r, j)] -= factor * a[(row, j)];
                }
                a[(r, col)] = 0.0;
            }
        }
        pivots.push(col);
        row += 1;
    }

    (a, pivots)
}

/// Moore-Penrose pseudo-inverse through the rank factorization `A = C F`,
/// where `C` collects the pivot columns of `A` and `F` the non-zero rows of
/// its reduced row-echelon form; then `A⁺ = Fᵀ (F Fᵀ)⁻¹ (Cᵀ C)⁻¹ Cᵀ`.
///
/// For square full-rank input this coincides with the ordinary inverse.
pub fn pseudo_inverse(m: &Mat<f64>, tolerance: f64) -> Result<Mat<f64>, &'static str> {
    let nrows = m.nrows();
    let ncols = m.ncols();
    let (reduced, pivots) = rref_with_pivots(m, tolerance);
    let rank = pivots.len();
    if rank == 0 {
        return Ok(Mat::zeros(ncols, nrows));
    }
    let c = Mat::from_fn(nrows, rank, |i, j| m[(i, pivots[j])]);
    let f = Mat::from_fn(rank, ncols, |i, j| reduced[(i, j)]);
    let ctc_inv = invert_qr(&(c.transpose() * &c))?;
    let fft_inv = invert_qr(&(&f * f.transpose()))?;
    Ok(f.transpose() * fft_inv * ctc_inv * c.transpose())
}

/// Inverse of a square full-rank matrix via its QR factorization.
///
/// Solves `R X = Qᵀ` column by column with back-substitution.
pub fn invert_qr(m: &Mat<f64>) -> Result<Mat<f64>, &'static str> {
    let n = m.nrows();
    if n != m.ncols() {
        return Err("matrix must be square");
    }
    if n == 0 {
        return Ok(Mat::zeros(0, 0));
    }

    let qr = m.qr();
    let q = qr.compute_Q();
    let r = qr.R();

    let mut scale = 0.0_f64;
    for i in 0..n {
        scale = scale.max(r[(i, i)].abs());
    }
    if scale == 0.0 {
        return Err("matrix is singular");
    }
    for i in 0..n {
        if r[(i, i)].abs() < scale * 1e-13 {
            return Err("matrix is singular");
        }
    }

    // Solve R * X = Q' for each column of the identity to get the inverse
    let mut inv = Mat::zeros(n, n);
    let qt = q.transpose();
    for col in 0..n {
        for i in (0..n).rev() {
            let mut sum = qt[(i, col)];
            for j in (i + 1)..n {
                sum -= r[(i, j)] * inv[(j, col)];
            }
            inv[(i, col)] = sum / r[(i, i)];
        }
    }

    Ok(inv)
}

/// Lower-triangular Cholesky factor of a symmetric positive-definite matrix.
pub fn cholesky_lower(m: &Mat<f64>) -> Result<Mat<f64>, &'static str> {
    let n = m.nrows();
    if n != m.ncols() {
        return Err("matrix must be square");
    }
    let mut scale = 0.0_f64;
    for i in 0..n {
        scale = scale.max(m[(i, i)].abs());
    }
    let floor = if scale == 0.0 {
        f64::MIN_POSITIVE
    } else {
        scale * 1e-13
    };

    let mut l = Mat::zeros(n, n);
    for i in 0..n {
        for j in 0..=i {
            let mut sum = m[(i, j)];
            for p in 0..j {
                sum -= l[(i, p)] * l[(j, p)];
            }
            if i == j {
                if sum <= floor {
                    return Err("matrix is not positive definite");
                }
                l[(i, i)] = sum.sqrt();
            } else {
                l[(i, j)] = sum / l[(j, j)];
            }
        }
    }
    Ok(l)
}

/// Forward substitution `L x = b` for lower-triangular `L`.
pub fn forward_substitute(l: &Mat<f64>, b: &Col<f64>) -> Col<f64> {
    let n = l.nrows();
    let mut x = Col::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[(i, j)] * x[j];
        }
        x[i] = sum / l[(i, i)];
    }
    x
}

/// Orthonormal basis, as rows, of the null space of `r`.
///
/// `r` must have full row rank with fewer rows than columns. The identity is
/// projected onto the orthogonal complement of the row space and the
/// projected rows are orthonormalized by Gram-Schmidt.
pub fn null_space_basis(r: &Mat<f64>) -> Result<Mat<f64>, &'static str> {
    let q = r.nrows();
    let k = r.ncols();
    if q >= k {
        return Err("constraint rows leave no free directions");
    }

    let rrt_inv = invert_qr(&(r * r.transpose()))?;
    let back = r.transpose() * &rrt_inv * r;
    let projector = Mat::from_fn(k, k, |i, j| {
        let id = if i == j { 1.0 } else { 0.0 };
        id - back[(i, j)]
    });

    let mut basis: Vec<Col<f64>> = Vec::with_capacity(k - q);
    for row in 0..k {
        let mut v = Col::from_fn(k, |j| projector[(row, j)]);
        for b in &basis {
            let dot: f64 = (0..k).map(|j| b[j] * v[j]).sum();
            for j in 0..k {
                v[j] -= dot * b[j];
            }
        }
        let norm = (0..k).map(|j| v[j] * v[j]).sum::<f64>().sqrt();
        if norm > 1e-8 {
            for j in 0..k {
                v[j] /= norm;
            }
            basis.push(v);
            if basis.len() == k - q {
                break;
            }
        }
    }

    if basis.len() != k - q {
        return Err("null space basis is incomplete");
    }
    Ok(Mat::from_fn(k - q, k, |i, j| basis[i][j]))
}
