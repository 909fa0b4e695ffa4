use ahash::AHashMap;
use polars::prelude::{Column, DataType};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{invalid, Result},
    frame::{gather, string_values, GeoFrame},
    geom::ensure_same_crs,
    spatial::gaps::{fill_from_nearest, ReferencePredicate},
};

/// How the transferred field is typed in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastAs {
    /// Text.
    #[default]
    String,
    /// 64-bit float.
    Float64,
    /// 64-bit integer (fractions truncated).
    Int64,
    /// Nullable integer rendered as text, so `3.0` becomes `"3"` and nulls stay null.
    IntString,
}

impl CastAs {
    pub(crate) fn apply(&self, column: &Column) -> Result<Column> {
        Ok(match self {
            CastAs::String => column.cast(&DataType::String)?,
            CastAs::Float64 => column.cast(&DataType::Float64)?,
            CastAs::Int64 => column.cast(&DataType::Int64)?,
            CastAs::IntString => column.cast(&DataType::Int64)?.cast(&DataType::String)?,
        })
    }
}

/// Options for [`largest_overlap`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlapOptions {
    /// Column of the join collection to copy over.
    pub transfer_field: String,
    /// Name of the new column on the target.
    pub new_name: String,
    #[serde(default)]
    pub cast_as: CastAs,
    /// When set, unmatched rows satisfying the predicate are filled from the nearest join shape.
    #[serde(default)]
    pub fix_missing: Option<ReferencePredicate>,
}

impl OverlapOptions {
    pub fn new(transfer_field: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            transfer_field: transfer_field.into(),
            new_name: new_name.into(),
            cast_as: CastAs::default(),
            fix_missing: None,
        }
    }

    pub fn cast_as(mut self, cast_as: CastAs) -> Self {
        self.cast_as = cast_as;
        self
    }

    pub fn fix_missing(mut self, reference: ReferencePredicate) -> Self {
        self.fix_missing = Some(reference);
        self
    }
}

/// Relative difference under which two fragment areas count as equal.
const AREA_TOLERANCE: f64 = 1e-9;

/// Rows sharing a key compete as one group; a row with a null key stands alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Group<'a> {
    Key(&'a str),
    Row(usize),
}

/// For every target row, the join row with the largest overlap among all rows
/// sharing its `target_key` value. Equal areas go to the earlier join row.
pub(crate) fn largest_overlap_rows(target: &GeoFrame, target_key: &str, join: &GeoFrame) -> Result<Vec<Option<usize>>> {
    ensure_same_crs(target.epsg(), join.epsg())?;
    let groups = string_values(target.data(), target_key)?;
    let groups = groups.iter().enumerate()
        .map(|(i, key)| key.as_deref().map_or(Group::Row(i), Group::Key))
        .collect::<Vec<_>>();

    let mut best: AHashMap<Group, (usize, f64)> = AHashMap::new();
    let mut fragments = 0usize;
    for (i, &group) in groups.iter().enumerate() {
        for (j, area) in target.geoms().overlaps_with(i, join.geoms()) {
            fragments += 1;
            best.entry(group)
                .and_modify(|(row, best_area)| {
                    let tolerance = AREA_TOLERANCE * area.max(*best_area);
                    let larger = area > *best_area + tolerance;
                    let tied = (area - *best_area).abs() <= tolerance;
                    if larger || (tied && j < *row) {
                        *row = j;
                        *best_area = area;
                    }
                })
                .or_insert((j, area));
        }
    }
    debug!("[largest_overlap] {fragments} fragments over {} target rows, {} groups matched", groups.len(), best.len());

    Ok(groups.iter().map(|group| best.get(group).map(|&(row, _)| row)).collect())
}

/// Spatial 1:1 join: each `target` row takes `transfer_field` from the `join`
/// polygon it overlaps most, under the name `new_name`.
///
/// Rows that overlap nothing get null. The output has exactly one row per target row.
pub fn largest_overlap(target: &GeoFrame, target_key: &str, join: &GeoFrame, options: &OverlapOptions) -> Result<GeoFrame> {
    if target.column(&options.new_name).is_ok() {
        return Err(invalid!("target already has a column named {:?}", options.new_name));
    }

    let transfer = options.cast_as.apply(join.column(&options.transfer_field)?)?;
    let rows = largest_overlap_rows(target, target_key, join)?;

    let mut output = target.clone();
    output.set_column(gather(&transfer, &rows, &options.new_name)?)?;

    // Fix joins that failed to match but must be filled by definition
    if let Some(reference) = &options.fix_missing {
        fill_from_nearest(&mut output, join.geoms(), &transfer, reference, &options.new_name)?;
    }

    Ok(output)
}
