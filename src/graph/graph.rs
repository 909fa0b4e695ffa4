/// An unweighted, undirected neighbor map in compressed sparse row format.
#[derive(Debug, Default, Clone)]
pub struct NeighborMap {
    size: usize,
    offsets: Vec<u32>,
    edges: Vec<u32>,
}

impl NeighborMap {
    /// Construct a neighbor map from adjacency lists (one list per node).
    pub fn new(edges: &[Vec<u32>]) -> Self {
        Self {
            size: edges.len(),
            offsets: std::iter::once(0u32).chain(
                edges.iter()
                    .map(|v| v.len() as u32)
                    .scan(0u32, |acc, len| {*acc += len; Some(*acc)})
            ).collect::<Vec<u32>>(),
            edges: edges.iter().flatten().copied().collect(),
        }
    }

    /// Get the number of nodes in the map.
    #[inline] pub fn node_count(&self) -> usize { self.size }

    /// Get the number of directed edge entries in the map.
    #[inline] pub fn edge_count(&self) -> usize { self.edges.len() }

    /// Get the range of edges for a given node.
    #[inline]
    fn range(&self, node: usize) -> std::ops::Range<usize> {
        self.offsets[node] as usize .. self.offsets[node + 1] as usize
    }

    /// Get the degree (number of neighbors) of a given node.
    #[inline] pub fn degree(&self, node: usize) -> usize { self.range(node).len() }

    /// Get an iterator over the neighbors of a given node.
    #[inline]
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.range(node).map(move |v| self.edges[v] as usize)
    }
}
