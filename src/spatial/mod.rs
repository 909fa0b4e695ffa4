mod aggregate;
mod apportion;
mod gaps;
mod overlap;
mod siting;

pub use aggregate::{build_aggregator, AggregationPlan, Reducer};
pub use apportion::apportion;
pub use gaps::{fix_missing_sjoins, fix_missing_sjoins_in_place, ReferencePredicate};
pub use overlap::{largest_overlap, CastAs, OverlapOptions};
pub use siting::{optimal_single_location, Coverage, SearchMethod, SiteSearch};
