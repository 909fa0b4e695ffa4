#![doc = "civic-geo public API"]
pub mod census;
pub mod config;
mod error;
mod frame;
mod geom;
mod graph;
mod spatial;

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use frame::{GeoFrame, PointFrame};

#[doc(inline)]
pub use geom::{circle, Geometries};

#[doc(inline)]
pub use graph::NeighborMap;

#[doc(inline)]
pub use spatial::{
    apportion, build_aggregator, fix_missing_sjoins, fix_missing_sjoins_in_place, largest_overlap,
    optimal_single_location, AggregationPlan, CastAs, Coverage, OverlapOptions, ReferencePredicate,
    Reducer, SearchMethod, SiteSearch,
};
