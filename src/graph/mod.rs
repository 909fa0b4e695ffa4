mod graph;

pub use graph::NeighborMap;
