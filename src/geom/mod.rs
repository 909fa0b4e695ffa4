mod adjacency;
mod bbox;
mod buffer;
mod geom;

use bbox::BoundingBox;
pub(crate) use bbox::envelope;
pub use buffer::{circle, DEFAULT_SEGMENTS};
pub use geom::Geometries;

/// Reject collections whose EPSG codes are both known and different.
pub(crate) fn ensure_same_crs(left: Option<u32>, right: Option<u32>) -> crate::Result<()> {
    match (left, right) {
        (Some(left), Some(right)) if left != right => Err(crate::Error::CrsMismatch { left, right }),
        _ => Ok(()),
    }
}
