use polars::prelude::Column;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{invalid, Result},
    frame::{null_mask, patch, string_values, GeoFrame},
    geom::{ensure_same_crs, Geometries},
};

/// Rows where `field == value` are required to carry a joined value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferencePredicate {
    pub field: String,
    pub value: String,
}

impl ReferencePredicate {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self { field: field.into(), value: value.into() }
    }
}

impl Default for ReferencePredicate {
    /// Parcels whose city is Cleveland.
    fn default() -> Self {
        Self::new("par_city", "CLEVELAND")
    }
}

/// Fill nulls in `test_field` that `reference` says should not be null, copying
/// `real_field` from the nearest `join` shape. Returns a new frame.
pub fn fix_missing_sjoins(
    target: &GeoFrame,
    join: &GeoFrame,
    reference: &ReferencePredicate,
    test_field: Option<&str>,
    real_field: Option<&str>,
) -> Result<GeoFrame> {
    let mut output = target.clone();
    fix_missing_sjoins_in_place(&mut output, join, reference, test_field, real_field)?;
    Ok(output)
}

/// In-place variant of [`fix_missing_sjoins`]. Returns the number of patched rows.
pub fn fix_missing_sjoins_in_place(
    target: &mut GeoFrame,
    join: &GeoFrame,
    reference: &ReferencePredicate,
    test_field: Option<&str>,
    real_field: Option<&str>,
) -> Result<usize> {
    let test_field = test_field
        .ok_or_else(|| invalid!("a test field is required: the column to check for missing joins"))?;
    let real_field = real_field
        .ok_or_else(|| invalid!("a real field is required: the join column to copy values from"))?;
    ensure_same_crs(target.epsg(), join.epsg())?;

    fill_from_nearest(target, join.geoms(), join.column(real_field)?, reference, test_field)
}

/// Patch `test_field` on rows matching `reference` whose value is null, taking
/// `real[j]` for the nearest shape `j` of `join`. Rows whose nearest value is
/// itself null are left alone and not counted.
pub(crate) fn fill_from_nearest(
    target: &mut GeoFrame,
    join: &Geometries,
    real: &Column,
    reference: &ReferencePredicate,
    test_field: &str,
) -> Result<usize> {
    let references = string_values(target.data(), &reference.field)?;
    let missing = null_mask(target.column(test_field)?)?;
    let real_missing = null_mask(real)?;

    let updates = (0..target.len())
        .filter(|&i| missing[i] && references[i].as_deref() == Some(reference.value.as_str()))
        .filter_map(|i| join.nearest(&target.shapes()[i]).map(|j| (i, j)))
        .filter(|&(_, j)| !real_missing[j])
        .collect::<Vec<_>>();
    debug!("[fix_missing_sjoins] patching {} rows of {test_field:?}", updates.len());

    if updates.is_empty() { return Ok(0) }

    let patched = patch(target.column(test_field)?, real, &updates)?;
    target.set_column(patched)?;
    Ok(updates.len())
}
