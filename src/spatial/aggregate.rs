use polars::frame::DataFrame;
use serde::{Deserialize, Serialize};

use crate::{
    census::{propagate, MoeMode},
    error::{invalid, Error, Result},
    frame::is_aggregatable,
};

/// How a column is reduced when rows are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    Sum,
    Mean,
    /// Margin-of-error propagation under the given rule.
    Moe(MoeMode),
}

impl Reducer {
    /// Reduce one group. Nulls are skipped; an all-null group sums to zero
    /// and has no mean or margin of error.
    pub fn reduce(&self, values: &[Option<f64>]) -> Result<Option<f64>> {
        let present = values.iter().flatten().copied().collect::<Vec<_>>();

        match self {
            Reducer::Sum => Ok(Some(present.iter().sum())),
            Reducer::Mean if present.is_empty() => Ok(None),
            Reducer::Mean => Ok(Some(present.iter().sum::<f64>() / present.len() as f64)),
            Reducer::Moe(_) if present.is_empty() => Ok(None),
            Reducer::Moe(mode) => propagate(&present, *mode).map(Some),
        }
    }
}

/// Ordered column → reducer mapping applied by [`apportion`](crate::apportion).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregationPlan {
    entries: Vec<(String, Reducer)>,
}

impl AggregationPlan {
    pub fn new(entries: Vec<(String, Reducer)>) -> Self {
        Self { entries }
    }

    /// The reducer for `column`, if planned.
    pub fn get(&self, column: &str) -> Option<Reducer> {
        self.entries.iter()
            .find(|(name, _)| name == column)
            .map(|&(_, reducer)| reducer)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Reducer)> {
        self.entries.iter().map(|(name, reducer)| (name.as_str(), *reducer))
    }

    #[inline] pub fn len(&self) -> usize { self.entries.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

/// Build an aggregation plan covering every numeric column of `data`.
///
/// `exclude` columns are dropped first and must exist. Only Float32, Float64
/// and Int32 columns are planned. Columns ending in `_M` are margins of error
/// and propagate under `default`; all others use the plain `default` reducer.
pub fn build_aggregator(data: &DataFrame, exclude: &[&str], default: MoeMode) -> Result<AggregationPlan> {
    for &name in exclude {
        if data.column(name).is_err() {
            return Err(Error::MissingColumn(name.to_owned()));
        }
    }

    let plain = match default {
        MoeMode::Sum => Reducer::Sum,
        MoeMode::Mean => Reducer::Mean,
        MoeMode::Proportion => {
            return Err(invalid!("'proportion' is an elementwise MOE rule and cannot aggregate a group"));
        }
    };

    let entries = data.get_columns().iter()
        .filter(|column| !exclude.contains(&column.name().as_str()))
        .filter(|column| is_aggregatable(column.dtype()))
        .map(|column| {
            let name = column.name().to_string();
            let reducer = if name.ends_with("_M") { Reducer::Moe(default) } else { plain };
            (name, reducer)
        })
        .collect();

    Ok(AggregationPlan::new(entries))
}
