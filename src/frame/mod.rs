mod column;
mod frame;

pub(crate) use column::*;
pub use frame::{GeoFrame, PointFrame};
