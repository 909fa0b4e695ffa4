use std::{fmt, str::FromStr};

use ndarray::{Array1, ArrayView1, Zip};
use serde::{Deserialize, Serialize};

use crate::error::{invalid, Error, Result};

/// Combination rule used when propagating margins of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoeMode {
    /// Sum of independent estimates.
    #[default]
    Sum,
    /// Mean of estimates; each MOE is halved before combination.
    Mean,
    /// Ratio of two estimates (elementwise, four parallel arrays).
    Proportion,
}

impl MoeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoeMode::Sum => "sum",
            MoeMode::Mean => "mean",
            MoeMode::Proportion => "proportion",
        }
    }
}

impl fmt::Display for MoeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sum" => Ok(MoeMode::Sum),
            "mean" => Ok(MoeMode::Mean),
            "proportion" => Ok(MoeMode::Proportion),
            other => Err(invalid!("MOE mode must be either 'sum', 'mean', or 'proportion', got {other:?}")),
        }
    }
}

/// Round half to even, to `decimals` places.
#[inline]
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

/// Propagate margins of error over a single array of estimates.
///
/// `Sum` combines in quadrature, `Mean` halves each MOE first. Both round to
/// a whole number. `Proportion` needs four parallel arrays; use
/// [`propagate_proportion`] instead.
pub fn propagate(values: &[f64], mode: MoeMode) -> Result<f64> {
    let scale = match mode {
        MoeMode::Sum => 1.0,
        MoeMode::Mean => 0.5,
        MoeMode::Proportion => {
            return Err(invalid!("'proportion' requires denominator, proportion, numerator MOE and denominator MOE arrays"));
        }
    };

    let view = ArrayView1::from(values);
    let squares = view.mapv(|v| (v * scale).powi(2)).sum();
    Ok(round_to(squares.sqrt(), 0))
}

/// Propagate the MOE of a derived proportion `p = numerator / denominator`.
///
/// Where `num_moe² - p²·den_moe²` is negative, the ratio formula
/// `num_moe² + p²·den_moe²` is used for that element instead.
pub fn propagate_proportion(
    denominator: &[f64],
    proportion: &[f64],
    numerator_moe: &[f64],
    denominator_moe: &[f64],
) -> Result<Array1<f64>> {
    let n = denominator.len();
    if [proportion.len(), numerator_moe.len(), denominator_moe.len()].iter().any(|&len| len != n) {
        return Err(invalid!(
            "proportion arrays must have equal lengths, got {}, {}, {}, {}",
            n, proportion.len(), numerator_moe.len(), denominator_moe.len()
        ));
    }

    Ok(Zip::from(ArrayView1::from(denominator))
        .and(ArrayView1::from(proportion))
        .and(ArrayView1::from(numerator_moe))
        .and(ArrayView1::from(denominator_moe))
        .map_collect(|&den, &p, &x_moe, &y_moe| {
            let mut term2 = x_moe.powi(2) - p.powi(2) * y_moe.powi(2);
            if term2 < 0.0 {
                term2 = x_moe.powi(2) + p.powi(2) * y_moe.powi(2);
            }
            (1.0 / den) * term2.sqrt()
        }))
}
