/// Solves `(XᵀX + diag(penalty)) β = Xᵀy` by Gaussian elimination with
/// partial pivoting.
///
/// Returns `None` when the system is singular even after the penalty is
/// applied, or when the inputs have inconsistent shapes.
pub(crate) fn ridge_solve(x: &[Vec<f64>], y: &[f64], penalty: &[f64]) -> Option<Vec<f64>> {
    let n = x.len();
    if n == 0 || n != y.len() {
        return None;
    }
    let p = x[0].len();
    if p == 0 || penalty.len() != p || x.iter().any(|row| row.len() != p) {
        return None;
    }

    let mut a = vec![vec![0.0; p]; p];
    let mut b = vec![0.0; p];
    for (row, &yi) in x.iter().zip(y) {
        for i in 0..p {
            b[i] += row[i] * yi;
            for j in 0..p {
                a[i][j] += row[i] * row[j];
            }
        }
    }
    for (d, lambda) in penalty.iter().enumerate() {
        a[d][d] += lambda;
    }

    for col in 0..p {
        let pivot_row = (col..p).max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))?;
        if a[pivot_row][col].abs() < 1e-14 {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        let inv = 1.0 / a[col][col];
        for j in col..p {
            a[col][j] *= inv;
        }
        b[col] *= inv;

        for r in 0..p {
            if r == col {
                continue;
            }
            let factor = a[r][col];
            if factor == 0.0 {
                continue;
            }
            for j in col..p {
                a[r][j] -= factor * a[col][j];
            }
            b[r] -= factor * b[col];
        }
    }

    Some(b)
}

pub(crate) fn dot(row: &[f64], beta: &[f64]) -> f64 {
    row.iter().zip(beta).map(|(x, b)| x * b).sum()
}

/// Mean squared residual of `y` against `X β`.
pub(crate) fn residual_variance(x: &[Vec<f64>], y: &[f64], beta: &[f64]) -> f64 {
    if y.is_empty() {
        return 0.0;
    }
    x.iter()
        .zip(y)
        .map(|(row, yi)| (yi - dot(row, beta)).powi(2))
        .sum::<f64>()
        / y.len() as f64
}
