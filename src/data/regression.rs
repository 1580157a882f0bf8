//! Ordinary least squares with an intercept

use serde::{Deserialize, Serialize};

use super::DataError;

/// Pivots smaller than this fraction of the largest diagonal entry are treated as zero
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// A fitted linear model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coef: Vec<f64>,
    pub intercept: f64,
    /// Feature columns the model was trained on, in coefficient order
    #[serde(default)]
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub target: String,
}

/// Goodness of fit on the training data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitMetrics {
    pub r2: f64,
    pub mse: f64,
}

impl LinearModel {
    /// Fits `target ~ features` on row-major feature vectors
    pub fn fit(
        feature_names: Vec<String>,
        target: impl Into<String>,
        rows: &[Vec<f64>],
        y: &[f64],
    ) -> Result<Self, DataError> {
        let p = feature_names.len();
        if p == 0 {
            return Err(DataError::Regression(
                "at least one feature column is required".to_string(),
            ));
        }
        if rows.is_empty() {
            return Err(DataError::Regression("dataset has no rows".to_string()));
        }
        if rows.len() != y.len() {
            return Err(DataError::Regression(format!(
                "{} feature rows but {} target values",
                rows.len(),
                y.len()
            )));
        }
        if let Some(row) = rows.iter().find(|r| r.len() != p) {
            return Err(DataError::Regression(format!(
                "expected {} features per row, found {}",
                p,
                row.len()
            )));
        }

        let n = rows.len() as f64;
        let x_mean: Vec<f64> = (0..p)
            .map(|j| rows.iter().map(|r| r[j]).sum::<f64>() / n)
            .collect();
        let y_mean = y.iter().sum::<f64>() / n;

        // Normal equations on centred data: (XᵀX) β = Xᵀy
        let mut xtx = vec![vec![0.0; p]; p];
        let mut xty = vec![0.0; p];
        for (row, &target_value) in rows.iter().zip(y) {
            let centred: Vec<f64> = row.iter().zip(&x_mean).map(|(x, m)| x - m).collect();
            let dy = target_value - y_mean;
            for i in 0..p {
                xty[i] += centred[i] * dy;
                for j in 0..p {
                    xtx[i][j] += centred[i] * centred[j];
                }
            }
        }

        let coef = solve(xtx, xty).ok_or_else(|| {
            DataError::Regression(
                "feature matrix is singular (constant or collinear features)".to_string(),
            )
        })?;

        let intercept = y_mean - coef.iter().zip(&x_mean).map(|(c, m)| c * m).sum::<f64>();

        Ok(Self {
            coef,
            intercept,
            feature_names,
            target: target.into(),
        })
    }

    pub fn num_features(&self) -> usize {
        self.coef.len()
    }

    pub fn predict_one(&self, row: &[f64]) -> Result<f64, DataError> {
        if row.len() != self.coef.len() {
            return Err(DataError::Regression(format!(
                "model expects {} features per row, got {}",
                self.coef.len(),
                row.len()
            )));
        }
        Ok(self.intercept + row.iter().zip(&self.coef).map(|(x, c)| x * c).sum::<f64>())
    }

    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, DataError> {
        rows.iter().map(|row| self.predict_one(row)).collect()
    }

    pub fn evaluate(&self, rows: &[Vec<f64>], y: &[f64]) -> Result<FitMetrics, DataError> {
        let predicted = self.predict(rows)?;
        Ok(fit_metrics(y, &predicted))
    }
}

/// R² and mean squared error of `predicted` against `actual`
pub fn fit_metrics(actual: &[f64], predicted: &[f64]) -> FitMetrics {
    let n = actual.len() as f64;
    if actual.is_empty() {
        return FitMetrics { r2: 0.0, mse: 0.0 };
    }

    let mean = actual.iter().sum::<f64>() / n;
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    let r2 = if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    };

    FitMetrics { r2, mse: ss_res / n }
}

/// Gaussian elimination with partial pivoting. Returns `None` for singular systems.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    let scale = (0..n).map(|i| a[i][i].abs()).fold(0.0_f64, f64::max);
    if scale == 0.0 {
        return None;
    }
    let tolerance = scale * SINGULAR_TOLERANCE;

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() <= tolerance {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        let pivot_row = a[col].clone();
        let pivot_b = b[col];
        for row in col + 1..n {
            let factor = a[row][col] / pivot_row[col];
            if factor == 0.0 {
                continue;
            }
            for (k, pivot_value) in pivot_row.iter().enumerate().skip(col) {
                a[row][k] -= factor * pivot_value;
            }
            b[row] -= factor * pivot_b;
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}
